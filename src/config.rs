use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// JSON model file loaded at startup; a missing or broken file leaves
    /// the detector without a classifier
    pub model_path: String,
    /// Skip every live lookup; network-bound signals take their fallback
    #[serde(default)]
    pub offline: bool,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub traffic_rank: TrafficRankConfig,
    #[serde(default)]
    pub verdict: VerdictConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub timeout_seconds: u64,
    pub user_agent: String,
    pub max_redirects: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrafficRankConfig {
    /// Lookup URL template; `{domain}` is replaced with the hostname
    pub endpoint: String,
    /// Ranks strictly below this count as popular
    pub max_rank: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerdictConfig {
    pub suspicious_threshold: f64,
    pub phishing_threshold: f64,
    /// Case-sensitive substrings that force a Safe verdict
    pub safe_domains: Vec<String>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 3,
            user_agent: format!("phishcheck/{}", env!("CARGO_PKG_VERSION")),
            max_redirects: 5,
        }
    }
}

impl NetworkConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Default for TrafficRankConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://data.alexa.com/data?cli=10&dat=s&url={domain}".to_string(),
            max_rank: 100_000,
        }
    }
}

impl Default for VerdictConfig {
    fn default() -> Self {
        Self {
            suspicious_threshold: 60.0,
            phishing_threshold: 85.0,
            safe_domains: vec![
                "github.com".to_string(),
                "google.com".to_string(),
                "wikipedia.org".to_string(),
                "youtube.com".to_string(),
                "linkedin.com".to_string(),
            ],
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            model_path: "model/model.json".to_string(),
            offline: false,
            network: NetworkConfig::default(),
            traffic_rank: TrafficRankConfig::default(),
            verdict: VerdictConfig::default(),
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML config: {path}"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_file(&self, path: &str) -> anyhow::Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {path}"))?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let verdict = &self.verdict;
        if !(0.0..=100.0).contains(&verdict.suspicious_threshold)
            || !(0.0..=100.0).contains(&verdict.phishing_threshold)
        {
            anyhow::bail!("Verdict thresholds must lie within 0..=100");
        }
        if verdict.suspicious_threshold > verdict.phishing_threshold {
            anyhow::bail!(
                "suspicious_threshold ({}) must not exceed phishing_threshold ({})",
                verdict.suspicious_threshold,
                verdict.phishing_threshold
            );
        }
        if self.network.timeout_seconds == 0 {
            anyhow::bail!("network.timeout_seconds must be at least 1");
        }
        if !self.traffic_rank.endpoint.contains("{domain}") {
            anyhow::bail!("traffic_rank.endpoint must contain a {{domain}} placeholder");
        }
        Ok(())
    }
}
