use crate::domain_utils::DomainUtils;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::OnceLock;
use std::time::Duration;

const IANA_WHOIS: &str = "whois.iana.org";

/// Registration dates for one registrable domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhoisRecord {
    pub domain: String,
    pub creation_date: Option<NaiveDate>,
    pub expiration_date: Option<NaiveDate>,
}

impl WhoisRecord {
    /// Days between creation and expiration, if both are known
    pub fn registration_days(&self) -> Option<i64> {
        Some((self.expiration_date? - self.creation_date?).num_days())
    }

    pub fn age_days(&self, today: NaiveDate) -> Option<i64> {
        Some((today - self.creation_date?).num_days())
    }
}

/// Anything that can answer a WHOIS question for a hostname
#[async_trait]
pub trait WhoisSource: Send + Sync {
    async fn lookup(&self, hostname: &str) -> Result<WhoisRecord>;
}

/// Direct WHOIS client speaking the port 43 protocol
#[derive(Debug, Clone)]
pub struct WhoisClient {
    timeout: Duration,
}

impl WhoisClient {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Known WHOIS servers by TLD
    pub fn whois_server_for(tld: &str) -> Option<&'static str> {
        let server = match tld {
            "com" | "net" => "whois.verisign-grs.com",
            "org" => "whois.pir.org",
            "info" => "whois.afilias.net",
            "biz" => "whois.neulevel.biz",
            "us" => "whois.nic.us",
            "uk" => "whois.nic.uk",
            "de" => "whois.denic.de",
            "fr" => "whois.afnic.fr",
            "it" => "whois.nic.it",
            "nl" => "whois.domain-registry.nl",
            "au" => "whois.auda.org.au",
            "ca" => "whois.cira.ca",
            "jp" => "whois.jprs.jp",
            "cn" => "whois.cnnic.cn",
            "ru" => "whois.tcinet.ru",
            "br" => "whois.registro.br",
            "mx" => "whois.mx",
            "io" => "whois.nic.io",
            "co" => "whois.nic.co",
            "xyz" => "whois.nic.xyz",
            _ => return None,
        };
        Some(server)
    }

    async fn resolve_server(&self, domain: &str) -> Result<String> {
        let tld = DomainUtils::tld(domain);
        if let Some(server) = Self::whois_server_for(tld) {
            return Ok(server.to_string());
        }

        log::debug!("No known WHOIS server for .{tld}, asking {IANA_WHOIS}");
        let response = self.query_whois_server(IANA_WHOIS, tld).await?;
        parse_referral(&response)
            .ok_or_else(|| anyhow!("IANA has no WHOIS referral for .{tld}"))
    }

    /// Query a WHOIS server directly using TCP port 43
    async fn query_whois_server(&self, server: &str, query: &str) -> Result<String> {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::TcpStream;
        use tokio::time::timeout;

        log::debug!("Connecting to WHOIS server: {server}:43");

        let mut stream = timeout(self.timeout, TcpStream::connect(format!("{server}:43")))
            .await
            .with_context(|| format!("Timed out connecting to {server}"))??;

        stream.write_all(format!("{query}\r\n").as_bytes()).await?;

        let mut response = Vec::new();
        timeout(self.timeout, stream.read_to_end(&mut response))
            .await
            .with_context(|| format!("Timed out reading from {server}"))??;

        if response.is_empty() {
            return Err(anyhow!("Empty WHOIS response from {server}"));
        }

        Ok(String::from_utf8_lossy(&response).into_owned())
    }
}

#[async_trait]
impl WhoisSource for WhoisClient {
    async fn lookup(&self, hostname: &str) -> Result<WhoisRecord> {
        let domain = DomainUtils::root_domain(hostname);
        if !DomainUtils::is_queryable(&domain) {
            return Err(anyhow!("Not a queryable domain: '{domain}' (from '{hostname}')"));
        }

        let server = self.resolve_server(&domain).await?;
        log::debug!("Using WHOIS server {server} for {domain}");

        let text = self.query_whois_server(&server, &domain).await?;
        log::debug!("Got WHOIS response ({} chars)", text.len());
        parse_whois_text(&text, &domain)
    }
}

const CREATION_PATTERNS: &[&str] = &[
    r"(?i)creation\s*date[:\s]+([^\r\n]+)",
    r"(?i)domain\s*created[:\s]+([^\r\n]+)",
    r"(?i)registration\s*date[:\s]+([^\r\n]+)",
    r"(?i)registration\s*time[:\s]+([^\r\n]+)",
    r"(?i)registered\s*on[:\s]+([^\r\n]+)",
    r"(?i)created\s*on[:\s]+([^\r\n]+)",
    r"(?i)created[:\s]+([^\r\n]+)",
    r"(?i)registered[:\s]+([^\r\n]+)",
    r"(?i)domain_date_created[:\s]+([^\r\n]+)",
    r"(?i)create_date[:\s]+([^\r\n]+)",
    r"(?i)created_date[:\s]+([^\r\n]+)",
];

const EXPIRATION_PATTERNS: &[&str] = &[
    r"(?i)registry\s*expiry\s*date[:\s]+([^\r\n]+)",
    r"(?i)registrar\s*registration\s*expiration\s*date[:\s]+([^\r\n]+)",
    r"(?i)expiration\s*date[:\s]+([^\r\n]+)",
    r"(?i)expiry\s*date[:\s]+([^\r\n]+)",
    r"(?i)expiration\s*time[:\s]+([^\r\n]+)",
    r"(?i)expires\s*on[:\s]+([^\r\n]+)",
    r"(?i)expires[:\s]+([^\r\n]+)",
    r"(?i)paid-till[:\s]+([^\r\n]+)",
    r"(?i)domain_date_expires[:\s]+([^\r\n]+)",
];

fn compiled(
    patterns: &'static [&'static str],
    cell: &'static OnceLock<Vec<Regex>>,
) -> &'static [Regex] {
    cell.get_or_init(|| patterns.iter().filter_map(|p| Regex::new(p).ok()).collect())
}

fn first_date(text: &str, patterns: &[Regex]) -> Option<NaiveDate> {
    for regex in patterns {
        for captures in regex.captures_iter(text) {
            let Some(date_match) = captures.get(1) else {
                continue;
            };
            let date_str = date_match.as_str().trim();
            match parse_date_string(date_str) {
                Some(date) => return Some(date),
                None => log::debug!("Could not parse date format: '{date_str}'"),
            }
        }
    }
    None
}

/// Pull creation and expiration dates out of a free-text WHOIS response
pub fn parse_whois_text(text: &str, domain: &str) -> Result<WhoisRecord> {
    static CREATION: OnceLock<Vec<Regex>> = OnceLock::new();
    static EXPIRATION: OnceLock<Vec<Regex>> = OnceLock::new();

    let creation_date = first_date(text, compiled(CREATION_PATTERNS, &CREATION));
    let expiration_date = first_date(text, compiled(EXPIRATION_PATTERNS, &EXPIRATION));

    if creation_date.is_none() && expiration_date.is_none() {
        let preview: String = text.chars().take(500).collect();
        log::debug!("No registration dates in WHOIS response for {domain}. Preview: {preview}");
        return Err(anyhow!("Could not find registration dates for {domain}"));
    }

    log::debug!("WHOIS {domain}: created {creation_date:?}, expires {expiration_date:?}");
    Ok(WhoisRecord {
        domain: domain.to_string(),
        creation_date,
        expiration_date,
    })
}

/// `whois:` line of an IANA answer
pub fn parse_referral(text: &str) -> Option<String> {
    static REFERRAL: OnceLock<Option<Regex>> = OnceLock::new();
    let regex = REFERRAL
        .get_or_init(|| Regex::new(r"(?im)^\s*(?:whois|refer):\s*(\S+)").ok())
        .as_ref()?;
    regex
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_lowercase())
}

/// Parse the date formats seen in WHOIS responses
pub fn parse_date_string(date_str: &str) -> Option<NaiveDate> {
    let date_str = date_str.trim();
    let first_token = date_str.split_whitespace().next().unwrap_or(date_str);

    for candidate in [date_str, first_token] {
        if let Ok(parsed) = DateTime::parse_from_rfc3339(candidate) {
            return Some(parsed.date_naive());
        }

        for format in [
            "%Y-%m-%dT%H:%M:%SZ",
            "%Y-%m-%dT%H:%M:%S%.fZ",
            "%Y-%m-%d %H:%M:%S",
            "%Y.%m.%d %H:%M:%S",
            "%d-%b-%Y %H:%M:%S",
        ] {
            if let Ok(parsed) = NaiveDateTime::parse_from_str(candidate, format) {
                return Some(parsed.date());
            }
        }

        for format in [
            "%Y-%m-%d", "%d-%b-%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y.%m.%d", "%Y/%m/%d", "%m/%d/%Y",
        ] {
            if let Ok(parsed) = NaiveDate::parse_from_str(candidate, format) {
                return Some(parsed);
            }
        }
    }

    // Embedded ISO date inside otherwise unknown text
    static ISO: OnceLock<Option<Regex>> = OnceLock::new();
    let iso = ISO
        .get_or_init(|| Regex::new(r"(\d{4})-(\d{2})-(\d{2})").ok())
        .as_ref()?;
    let captures = iso.captures(date_str)?;
    NaiveDate::from_ymd_opt(
        captures[1].parse().ok()?,
        captures[2].parse().ok()?,
        captures[3].parse().ok()?,
    )
}
