// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use anyhow::{Context, Result};
use reqwest::Client;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::debug;

/// Fixed identifying user-agent. Targets are third parties; the scanner
/// announces itself rather than impersonating a browser.
const SCANNER_USER_AGENT: &str = "Mozilla/5.0 (compatible; Luotain/1.0; +https://bountyy.com/luotain)";

const MAX_REDIRECTS: usize = 5;

/// HTTP client that never buffers more than its configured byte budget.
///
/// Remote targets are untrusted: a response may be adversarially large,
/// slowly trickled, or mis-chunked. The wall-clock timeout bounds time and
/// the decoded-byte cap bounds memory, independent of what the peer sends.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    timeout: Duration,
    max_body_bytes: usize,
}

/// Captured snapshot of one response: status, headers, capped decoded body,
/// and the final URL after redirects.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
    pub final_url: String,
    pub duration_ms: u64,
}

impl HttpResponse {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        let wanted = name.to_lowercase();
        self.headers
            .iter()
            .find(|(k, _)| k.to_lowercase() == wanted)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_html(&self) -> bool {
        self.header("content-type")
            .map(|ct| ct.to_lowercase().contains("text/html"))
            .unwrap_or(false)
    }
}

impl HttpClient {
    pub fn new(timeout: Duration, max_body_bytes: usize) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .user_agent(SCANNER_USER_AGENT)
            .tcp_keepalive(Duration::from_secs(60))
            .tcp_nodelay(true)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            timeout,
            max_body_bytes,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Send a GET request and capture at most `max_body_bytes` of decoded body.
    ///
    /// The body is read chunk by chunk; once the budget is reached the last
    /// chunk is truncated to the exact remaining bytes and the connection is
    /// dropped, so a multi-megabyte response still yields its full first
    /// `max_body_bytes` of analyzable content.
    pub async fn get(&self, url: &str) -> Result<HttpResponse> {
        let started = Instant::now();

        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?;

        let status_code = response.status().as_u16();
        let final_url = response.url().to_string();

        let headers = {
            let raw = response.headers();
            let mut map = HashMap::with_capacity(raw.len());
            for (k, v) in raw.iter() {
                if let Ok(value_str) = v.to_str() {
                    map.insert(k.as_str().to_string(), value_str.to_string());
                }
            }
            map
        };

        let mut collected: Vec<u8> = Vec::new();
        loop {
            let chunk = match response.chunk().await {
                Ok(Some(chunk)) => chunk,
                Ok(None) => break,
                Err(e) => {
                    // Partial bodies are still analyzable; only a fully
                    // failed first read is worth surfacing.
                    if collected.is_empty() {
                        return Err(e).with_context(|| format!("Reading body of {} failed", url));
                    }
                    debug!("Body read of {} ended early: {}", url, e);
                    break;
                }
            };

            let remaining = self.max_body_bytes - collected.len();
            if chunk.len() >= remaining {
                collected.extend_from_slice(&chunk[..remaining]);
                debug!(
                    "Body of {} truncated at {} byte budget",
                    url, self.max_body_bytes
                );
                break;
            }
            collected.extend_from_slice(&chunk);
        }

        let body = String::from_utf8_lossy(&collected).to_string();

        Ok(HttpResponse {
            status_code,
            headers,
            body,
            final_url,
            duration_ms: started.elapsed().as_millis() as u64,
        })
    }
}
