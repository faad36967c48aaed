use crate::config::NetworkConfig;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;

/// HTML of a fetched page together with the URL it was finally served from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSnapshot {
    pub url: String,
    pub html: String,
}

#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<PageSnapshot>;
}

pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    pub fn new(network: &NetworkConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(network.timeout())
            .connect_timeout(network.timeout())
            .user_agent(network.user_agent.clone())
            .redirect(reqwest::redirect::Policy::limited(network.max_redirects))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageSource for PageFetcher {
    async fn fetch(&self, url: &str) -> Result<PageSnapshot> {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(anyhow!("Not an HTTP(S) URL: {url}"));
        }

        // Error statuses still carry a page worth inspecting
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let final_url = response.url().to_string();
        let html = response.text().await?;
        log::debug!("Fetched {final_url} ({status}, {} bytes)", html.len());

        Ok(PageSnapshot {
            url: final_url,
            html,
        })
    }
}
