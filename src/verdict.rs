use crate::config::VerdictConfig;
use crate::domain_utils::DomainUtils;
use anyhow::{bail, Result};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    Safe,
    Suspicious,
    Phishing,
    Invalid,
    ModelUnavailable,
    ExtractionError,
}

impl Verdict {
    pub fn label(self) -> &'static str {
        match self {
            Verdict::Safe => "Safe Website",
            Verdict::Suspicious => "Suspicious Website",
            Verdict::Phishing => "Phishing Website",
            Verdict::Invalid => "Invalid URL",
            Verdict::ModelUnavailable => "Model not loaded",
            Verdict::ExtractionError => "Error processing URL",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Final answer for one URL: a verdict and a probability in `0.0..=100.0`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Assessment {
    pub verdict: Verdict,
    pub probability: f64,
}

impl Assessment {
    /// Terminal verdicts that never reach the classifier
    pub fn unscored(verdict: Verdict) -> Self {
        Self {
            verdict,
            probability: 0.0,
        }
    }
}

impl Serialize for Assessment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Assessment", 2)?;
        state.serialize_field("prediction", self.verdict.label())?;
        state.serialize_field("probability", &self.probability)?;
        state.end()
    }
}

/// Maps a classifier probability to a verdict
#[derive(Debug, Clone)]
pub struct VerdictPolicy {
    suspicious_threshold: f64,
    phishing_threshold: f64,
    safe_domains: Vec<String>,
}

impl Default for VerdictPolicy {
    fn default() -> Self {
        Self::from_config(&VerdictConfig::default())
    }
}

impl VerdictPolicy {
    pub fn from_config(config: &VerdictConfig) -> Self {
        Self {
            suspicious_threshold: config.suspicious_threshold,
            phishing_threshold: config.phishing_threshold,
            safe_domains: config.safe_domains.clone(),
        }
    }

    /// Clamp to `0..=1`, scale to a percentage and round to two decimals
    pub fn probability_percent(probability: f64) -> Result<f64> {
        if !probability.is_finite() {
            bail!("Classifier returned a non-finite probability: {probability}");
        }
        let percent = probability.clamp(0.0, 1.0) * 100.0;
        Ok((percent * 100.0).round() / 100.0)
    }

    pub fn verdict_for(&self, percent: f64) -> Verdict {
        if percent >= self.phishing_threshold {
            Verdict::Phishing
        } else if percent >= self.suspicious_threshold {
            Verdict::Suspicious
        } else {
            Verdict::Safe
        }
    }

    pub fn whitelisted(&self, url: &str) -> Option<String> {
        DomainUtils::contains_any(url, &self.safe_domains)
    }

    /// Threshold the raw classifier output. A safe domain wins over whatever
    /// the classifier said, a non-finite probability included.
    pub fn decide(&self, url: &str, probability: f64) -> Result<Assessment> {
        if let Some(domain) = self.whitelisted(url) {
            log::debug!("{url} matches safe domain {domain}, overriding p = {probability}");
            return Ok(Assessment::unscored(Verdict::Safe));
        }

        let percent = Self::probability_percent(probability)?;
        Ok(Assessment {
            verdict: self.verdict_for(percent),
            probability: percent,
        })
    }
}
