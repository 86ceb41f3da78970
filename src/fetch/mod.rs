//! HTTP plumbing for pulling trip tables.

mod basic;
mod client;
pub mod auth;

pub use auth::ApiKey;
pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::Result;

/// GETs `url` and returns the body. Non-2xx responses are errors carrying
/// the status and body text.
pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>> {
    let req = reqwest::Request::new(reqwest::Method::GET, url.parse()?);

    let resp = client.execute(req).await?;
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        anyhow::bail!("GET {url} returned status {status}: {body}");
    }

    Ok(resp.bytes().await?.to_vec())
}
