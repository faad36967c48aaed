use crate::config::{NetworkConfig, TrafficRankConfig};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use std::sync::OnceLock;

/// Global popularity rank of a host; lower is more popular
#[async_trait]
pub trait TrafficRankSource: Send + Sync {
    async fn rank(&self, hostname: &str) -> Result<u64>;
}

/// Queries an Alexa-style XML endpoint and reads `<REACH RANK="n"/>`
pub struct TrafficRankClient {
    client: Client,
    endpoint: String,
}

impl TrafficRankClient {
    pub fn new(
        network: &NetworkConfig,
        config: &TrafficRankConfig,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(network.timeout())
            .connect_timeout(network.timeout())
            .user_agent(network.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    pub fn lookup_url(&self, hostname: &str) -> String {
        self.endpoint.replace("{domain}", hostname)
    }
}

#[async_trait]
impl TrafficRankSource for TrafficRankClient {
    async fn rank(&self, hostname: &str) -> Result<u64> {
        if hostname.is_empty() {
            return Err(anyhow!("No hostname to rank"));
        }

        let url = self.lookup_url(hostname);
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("Traffic rank lookup returned {status}"));
        }

        let body = response.text().await?;
        parse_reach_rank(&body).ok_or_else(|| anyhow!("No REACH rank in response for {hostname}"))
    }
}

/// Rank attribute of the first `<REACH>` element
pub fn parse_reach_rank(xml: &str) -> Option<u64> {
    static REACH: OnceLock<Option<Regex>> = OnceLock::new();
    let regex = REACH
        .get_or_init(|| Regex::new(r#"<REACH\b[^>]*\bRANK\s*=\s*["'](\d+)["']"#).ok())
        .as_ref()?;
    regex.captures(xml)?.get(1)?.as_str().parse().ok()
}
