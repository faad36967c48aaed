pub mod domain;
pub mod lexical;
pub mod page_content;

use crate::config::Config;
use crate::page_fetch::{PageFetcher, PageSnapshot, PageSource};
use crate::signal::{FeatureVector, Signal, FEATURE_COUNT};
use crate::target::UrlTarget;
use crate::traffic_rank::{TrafficRankClient, TrafficRankSource};
use crate::whois::{WhoisClient, WhoisRecord, WhoisSource};
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// One position of the feature vector.
///
/// Declaration order is the vector schema the classifier was trained on and
/// must not change. Placeholder features are kept in place with a constant
/// benign score; they are not computed from live data yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    HavingIpAddress,
    UrlLength,
    ShorteningService,
    HavingAtSymbol,
    DoubleSlashRedirecting,
    PrefixSuffix,
    HavingSubDomain,
    SslFinalState,
    DomainRegistrationLength,
    Favicon,
    RequestUrl,
    UrlOfAnchor,
    LinksInTags,
    Sfh,
    SubmittingToEmail,
    AbnormalUrl,
    Redirect,
    OnMouseover,
    RightClick,
    PopupWindow,
    Iframe,
    AgeOfDomain,
    DnsRecord,
    WebTraffic,
    PageRank,
    LinksPointingToPage,
}

/// Where a feature gets its input from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalSource {
    Lexical,
    Whois,
    Page,
    TrafficRank,
    Placeholder,
}

impl Feature {
    pub const ALL: [Feature; FEATURE_COUNT] = [
        Feature::HavingIpAddress,
        Feature::UrlLength,
        Feature::ShorteningService,
        Feature::HavingAtSymbol,
        Feature::DoubleSlashRedirecting,
        Feature::PrefixSuffix,
        Feature::HavingSubDomain,
        Feature::SslFinalState,
        Feature::DomainRegistrationLength,
        Feature::Favicon,
        Feature::RequestUrl,
        Feature::UrlOfAnchor,
        Feature::LinksInTags,
        Feature::Sfh,
        Feature::SubmittingToEmail,
        Feature::AbnormalUrl,
        Feature::Redirect,
        Feature::OnMouseover,
        Feature::RightClick,
        Feature::PopupWindow,
        Feature::Iframe,
        Feature::AgeOfDomain,
        Feature::DnsRecord,
        Feature::WebTraffic,
        Feature::PageRank,
        Feature::LinksPointingToPage,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Feature::HavingIpAddress => "having_ip_address",
            Feature::UrlLength => "url_length",
            Feature::ShorteningService => "shortening_service",
            Feature::HavingAtSymbol => "having_at_symbol",
            Feature::DoubleSlashRedirecting => "double_slash_redirecting",
            Feature::PrefixSuffix => "prefix_suffix",
            Feature::HavingSubDomain => "having_sub_domain",
            Feature::SslFinalState => "ssl_final_state",
            Feature::DomainRegistrationLength => "domain_registration_length",
            Feature::Favicon => "favicon",
            Feature::RequestUrl => "request_url",
            Feature::UrlOfAnchor => "url_of_anchor",
            Feature::LinksInTags => "links_in_tags",
            Feature::Sfh => "sfh",
            Feature::SubmittingToEmail => "submitting_to_email",
            Feature::AbnormalUrl => "abnormal_url",
            Feature::Redirect => "redirect",
            Feature::OnMouseover => "on_mouseover",
            Feature::RightClick => "right_click",
            Feature::PopupWindow => "popup_window",
            Feature::Iframe => "iframe",
            Feature::AgeOfDomain => "age_of_domain",
            Feature::DnsRecord => "dns_record",
            Feature::WebTraffic => "web_traffic",
            Feature::PageRank => "page_rank",
            Feature::LinksPointingToPage => "links_pointing_to_page",
        }
    }

    pub fn source(self) -> SignalSource {
        match self {
            Feature::DomainRegistrationLength | Feature::AgeOfDomain => SignalSource::Whois,
            Feature::Favicon | Feature::RequestUrl => SignalSource::Page,
            Feature::WebTraffic => SignalSource::TrafficRank,
            Feature::UrlOfAnchor
            | Feature::LinksInTags
            | Feature::Sfh
            | Feature::AbnormalUrl
            | Feature::OnMouseover
            | Feature::RightClick
            | Feature::PopupWindow
            | Feature::Iframe
            | Feature::DnsRecord
            | Feature::PageRank
            | Feature::LinksPointingToPage => SignalSource::Placeholder,
            _ => SignalSource::Lexical,
        }
    }

    pub fn is_placeholder(self) -> bool {
        self.source() == SignalSource::Placeholder
    }

    pub fn score(self, input: &ScoringInput<'_>) -> Signal {
        let target = input.target;
        let evidence = input.evidence;
        match self {
            Feature::HavingIpAddress => lexical::having_ip_address(&target.url),
            Feature::UrlLength => lexical::url_length(target.char_len()),
            Feature::ShorteningService => lexical::shortening_service(&target.url),
            Feature::HavingAtSymbol => lexical::having_at_symbol(&target.url),
            Feature::DoubleSlashRedirecting => lexical::double_slash_redirecting(&target.url),
            Feature::PrefixSuffix => lexical::prefix_suffix(&target.hostname),
            Feature::HavingSubDomain => lexical::having_sub_domain(&target.hostname),
            Feature::SslFinalState => lexical::ssl_final_state(&target.url),
            Feature::DomainRegistrationLength => {
                domain::domain_registration_length(evidence.whois.as_ref())
            }
            Feature::Favicon => page_content::favicon(evidence.page.as_ref(), &target.hostname),
            Feature::RequestUrl => {
                page_content::request_url(evidence.page.as_ref(), &target.hostname)
            }
            Feature::SubmittingToEmail => lexical::submitting_to_email(&target.url),
            Feature::Redirect => lexical::redirect(&target.url),
            Feature::AgeOfDomain => domain::age_of_domain(evidence.whois.as_ref(), input.today),
            Feature::WebTraffic => domain::web_traffic(evidence.traffic_rank, input.max_rank),
            Feature::UrlOfAnchor
            | Feature::LinksInTags
            | Feature::Sfh
            | Feature::AbnormalUrl
            | Feature::OnMouseover
            | Feature::RightClick
            | Feature::PopupWindow
            | Feature::Iframe
            | Feature::DnsRecord
            | Feature::PageRank
            | Feature::LinksPointingToPage => Signal::Benign,
        }
    }
}

/// Results of the live lookups for one request. `None` means the lookup
/// failed and every feature reading it falls back to suspicious.
#[derive(Debug, Clone, Default)]
pub struct NetworkEvidence {
    pub whois: Option<WhoisRecord>,
    pub page: Option<PageSnapshot>,
    pub traffic_rank: Option<u64>,
}

pub struct ScoringInput<'a> {
    pub target: &'a UrlTarget,
    pub evidence: &'a NetworkEvidence,
    pub today: NaiveDate,
    pub max_rank: u64,
}

/// Score every feature in schema order
pub fn assemble(input: &ScoringInput<'_>) -> FeatureVector {
    FeatureVector::new(Feature::ALL.map(|feature| feature.score(input)))
}

#[derive(Debug, Clone, Serialize)]
pub struct NamedSignal {
    pub feature: Feature,
    pub signal: Signal,
}

/// Feature vector plus what went into it, for reporting
#[derive(Debug, Clone)]
pub struct FeatureAnalysis {
    pub target: UrlTarget,
    pub evidence: NetworkEvidence,
    pub vector: FeatureVector,
}

impl FeatureAnalysis {
    pub fn named_signals(&self) -> Vec<NamedSignal> {
        Feature::ALL
            .iter()
            .zip(self.vector.signals())
            .map(|(&feature, &signal)| NamedSignal { feature, signal })
            .collect()
    }
}

/// Builds feature vectors, fanning out to the live lookups
pub struct FeatureEngine {
    whois: Arc<dyn WhoisSource>,
    pages: Arc<dyn PageSource>,
    traffic: Arc<dyn TrafficRankSource>,
    lookup_deadline: Duration,
    max_rank: u64,
    offline: bool,
}

impl FeatureEngine {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let network = &config.network;
        let engine = Self::with_sources(
            Arc::new(WhoisClient::new(network.timeout())),
            Arc::new(PageFetcher::new(network)?),
            Arc::new(TrafficRankClient::new(network, &config.traffic_rank)?),
            network.timeout(),
            config.traffic_rank.max_rank,
        );
        Ok(engine.offline(config.offline))
    }

    pub fn with_sources(
        whois: Arc<dyn WhoisSource>,
        pages: Arc<dyn PageSource>,
        traffic: Arc<dyn TrafficRankSource>,
        lookup_deadline: Duration,
        max_rank: u64,
    ) -> Self {
        Self {
            whois,
            pages,
            traffic,
            lookup_deadline,
            max_rank,
            offline: false,
        }
    }

    /// Skip every network lookup; only the lexical signals are computed
    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    pub async fn extract(&self, url: &str) -> FeatureVector {
        self.analyze(url).await.vector
    }

    pub async fn analyze(&self, url: &str) -> FeatureAnalysis {
        self.analyze_at(url, Utc::now().date_naive()).await
    }

    /// Like `analyze`, with the date used for the domain age check supplied
    pub async fn analyze_at(&self, url: &str, today: NaiveDate) -> FeatureAnalysis {
        let target = UrlTarget::parse(url);
        let evidence = self.gather_evidence(&target).await;
        let vector = assemble(&ScoringInput {
            target: &target,
            evidence: &evidence,
            today,
            max_rank: self.max_rank,
        });

        log::debug!("Feature vector for {}: {vector}", target.url);
        FeatureAnalysis {
            target,
            evidence,
            vector,
        }
    }

    /// Run the three lookups concurrently. Each failure or timeout is logged
    /// and becomes `None`; nothing here can fail the request.
    pub async fn gather_evidence(&self, target: &UrlTarget) -> NetworkEvidence {
        if self.offline {
            log::debug!("Offline mode, skipping lookups for {}", target.url);
            return NetworkEvidence::default();
        }
        if !target.has_hostname() {
            log::debug!("No hostname in '{}', skipping lookups", target.url);
            return NetworkEvidence::default();
        }

        let hostname = target.hostname.as_str();
        let (whois, page, traffic_rank) = tokio::join!(
            self.bounded("WHOIS", hostname, self.whois.lookup(hostname)),
            self.bounded("page fetch", &target.url, self.pages.fetch(&target.url)),
            self.bounded("traffic rank", hostname, self.traffic.rank(hostname)),
        );

        NetworkEvidence {
            whois,
            page,
            traffic_rank,
        }
    }

    async fn bounded<T>(
        &self,
        lookup: &str,
        subject: &str,
        fut: impl Future<Output = anyhow::Result<T>>,
    ) -> Option<T> {
        match tokio::time::timeout(self.lookup_deadline, fut).await {
            Ok(Ok(value)) => Some(value),
            Ok(Err(e)) => {
                log::debug!("{lookup} failed for '{subject}': {e:#}");
                None
            }
            Err(_) => {
                log::debug!(
                    "{lookup} for '{subject}' timed out after {:?}",
                    self.lookup_deadline
                );
                None
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Lookup stub that either answers, fails, or hangs
    pub enum Behaviour<T> {
        Answer(T),
        Fail,
        Hang,
    }

    pub struct StubSource<T> {
        behaviour: Behaviour<T>,
        pub calls: AtomicUsize,
    }

    impl<T: Clone + Send + Sync> StubSource<T> {
        pub fn new(behaviour: Behaviour<T>) -> Arc<Self> {
            Arc::new(Self {
                behaviour,
                calls: AtomicUsize::new(0),
            })
        }

        async fn respond(&self) -> Result<T> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.behaviour {
                Behaviour::Answer(value) => Ok(value.clone()),
                Behaviour::Fail => Err(anyhow!("stub lookup failure")),
                Behaviour::Hang => {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Err(anyhow!("stub lookup woke up"))
                }
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl WhoisSource for StubSource<WhoisRecord> {
        async fn lookup(&self, _hostname: &str) -> Result<WhoisRecord> {
            self.respond().await
        }
    }

    #[async_trait]
    impl PageSource for StubSource<PageSnapshot> {
        async fn fetch(&self, _url: &str) -> Result<PageSnapshot> {
            self.respond().await
        }
    }

    #[async_trait]
    impl TrafficRankSource for StubSource<u64> {
        async fn rank(&self, _hostname: &str) -> Result<u64> {
            self.respond().await
        }
    }

    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    pub fn established_whois() -> WhoisRecord {
        WhoisRecord {
            domain: "example.com".to_string(),
            creation_date: Some(date(2001, 5, 1)),
            expiration_date: Some(date(2030, 5, 1)),
        }
    }

    pub fn clean_page() -> PageSnapshot {
        PageSnapshot {
            url: "https://www.example.com/".to_string(),
            html: concat!(
                r#"<link rel="icon" href="/favicon.ico">"#,
                r#"<img src="https://www.example.com/logo.png">"#,
            )
            .to_string(),
        }
    }

    pub fn healthy_engine() -> FeatureEngine {
        FeatureEngine::with_sources(
            StubSource::new(Behaviour::Answer(established_whois())),
            StubSource::new(Behaviour::Answer(clean_page())),
            StubSource::new(Behaviour::Answer(1_500u64)),
            Duration::from_millis(200),
            100_000,
        )
    }

    pub fn unreachable_engine() -> FeatureEngine {
        FeatureEngine::with_sources(
            StubSource::<WhoisRecord>::new(Behaviour::Fail),
            StubSource::<PageSnapshot>::new(Behaviour::Hang),
            StubSource::<u64>::new(Behaviour::Fail),
            Duration::from_millis(50),
            100_000,
        )
    }
}
