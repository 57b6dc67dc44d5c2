use std::ops::Deref;

use anyhow::Context;
use url::Url;

use crate::web::{html_to_text, PageLoader};

/// Fetches web pages over HTTP and extracts their text.
pub struct WebPageLoader(pub reqwest::Client);

impl Deref for WebPageLoader {
    type Target = reqwest::Client;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl WebPageLoader {
    /// `accept_invalid_certs` disables TLS certificate verification.
    pub fn new(accept_invalid_certs: bool) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(Self::USER_AGENT)
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self(client))
    }
}

impl PageLoader for WebPageLoader {
    const USER_AGENT: &'static str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 13_5_1) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/116.0.0.0 Safari/537.36";

    #[tracing::instrument(skip_all, fields(url = %url))]
    async fn load_text(&self, url: &Url) -> anyhow::Result<String> {
        let resp = self
            .get(url.clone())
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to make http request"))?;

        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("{url} responded with {status}");
        }

        let html = resp.text().await?;
        let text = html_to_text(&html);
        tracing::debug!(html_len = html.len(), text_len = text.len(), "Extracted page text");

        Ok(text)
    }
}
