// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use luotain_scanner::classifier;
use luotain_scanner::config::CrawlSettings;
use luotain_scanner::discovery::CrawlDiscoverer;
use luotain_scanner::scan::ScanPipeline;
use luotain_scanner::types::ScanResult;

#[derive(Parser)]
#[command(name = "luotain", about = "Luotain - website safety scanner", version)]
struct Cli {
    /// Emit results as JSON instead of a text report
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan a single URL
    Scan {
        url: String,

        /// Discover same-site pages first and scan each of them
        #[arg(long)]
        crawl: bool,

        /// Page cap for --crawl
        #[arg(long, default_value_t = 5)]
        max_pages: usize,
    },
    /// Scan several URLs sequentially
    Bulk { urls: Vec<String> },
    /// List same-site pages reachable from a URL without scanning them
    Discover {
        url: String,

        #[arg(long, default_value_t = 5)]
        max_pages: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();

    if !cli.json {
        println!("Luotain Website Safety Scanner");
        println!("(c) 2026 Bountyy Oy");
        println!();
    }

    match cli.command {
        Command::Scan {
            url,
            crawl,
            max_pages,
        } => {
            let pipeline = ScanPipeline::single()?;

            let targets = if crawl {
                let discoverer = CrawlDiscoverer::new(CrawlSettings::with_max_pages(max_pages))?;
                let pages = discoverer.discover(&url).await?;
                info!("Discovered {} pages under {}", pages.len(), url);
                pages
            } else {
                vec![url]
            };

            for target in &targets {
                match pipeline.run(target).await {
                    Ok(result) => render(&result, cli.json)?,
                    Err(e) => eprintln!("{}: scan failed: {}", target, e),
                }
            }
        }
        Command::Bulk { urls } => {
            let pipeline = ScanPipeline::bulk()?;
            for (url, outcome) in urls.iter().zip(pipeline.run_many(&urls).await) {
                match outcome {
                    Ok(result) => render(&result, cli.json)?,
                    Err(e) => eprintln!("{}: scan failed: {}", url, e),
                }
            }
        }
        Command::Discover { url, max_pages } => {
            let discoverer = CrawlDiscoverer::new(CrawlSettings::with_max_pages(max_pages))?;
            let pages = discoverer.discover(&url).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&pages)?);
            } else {
                for page in pages {
                    println!("{}", page);
                }
            }
        }
    }

    Ok(())
}

fn render(result: &ScanResult, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }

    let rating = classifier::classify(&result.findings);

    println!("== {} ==", result.url);
    println!(
        "rating: {}  |  findings: {} (critical {}, high {}, medium {}, low {}, info {})  |  {}ms",
        rating,
        result.summary.total,
        result.summary.critical,
        result.summary.high,
        result.summary.medium,
        result.summary.low,
        result.summary.info,
        result.duration_ms
    );

    for finding in &result.findings {
        println!("  [{}] {}", finding.severity, finding.title);
        if let Some(evidence) = &finding.evidence {
            println!("         {}", evidence);
        }
    }
    println!();

    Ok(())
}
