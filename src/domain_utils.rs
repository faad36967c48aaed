/// Minimal domain hierarchy utilities
pub struct DomainUtils;

const TWO_PART_SUFFIXES: [&str; 17] = [
    "co.uk", "com.au", "co.jp", "co.kr", "com.br", "co.za", "com.mx", "co.in", "com.sg", "co.nz",
    "com.ar", "co.il", "org.uk", "net.au", "gov.uk", "ac.uk", "edu.au",
];

impl DomainUtils {
    /// Registrable root of a hostname, used for WHOIS queries.
    /// e.g. "login.secure.example.co.uk" -> "example.co.uk"
    pub fn root_domain(hostname: &str) -> String {
        let hostname = hostname.trim_end_matches('.').to_lowercase();
        let parts: Vec<&str> = hostname.split('.').collect();

        if parts.len() < 2 || Self::is_ipv4_literal(&hostname) {
            return hostname;
        }

        let suffix = format!("{}.{}", parts[parts.len() - 2], parts[parts.len() - 1]);
        if parts.len() >= 3 && TWO_PART_SUFFIXES.contains(&suffix.as_str()) {
            return format!("{}.{}", parts[parts.len() - 3], suffix);
        }

        suffix
    }

    pub fn tld(domain: &str) -> &str {
        domain.rsplit('.').next().unwrap_or(domain)
    }

    /// Whether a name is worth sending to a WHOIS server at all
    pub fn is_queryable(domain: &str) -> bool {
        !domain.is_empty()
            && domain.contains('.')
            && domain.len() < 255
            && domain
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
            && !Self::is_ipv4_literal(domain)
    }

    pub fn is_ipv4_literal(host: &str) -> bool {
        host.parse::<std::net::Ipv4Addr>().is_ok()
    }

    /// Case-sensitive substring match against a domain list
    pub fn contains_any(haystack: &str, domains: &[String]) -> Option<String> {
        domains
            .iter()
            .find(|d| !d.is_empty() && haystack.contains(d.as_str()))
            .cloned()
    }
}
