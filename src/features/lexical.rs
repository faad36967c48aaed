//! Extractors that only look at the URL string and its hostname.

use crate::signal::Signal;
use regex::Regex;
use std::sync::OnceLock;

const IPV4_PATTERN: &str = r"(\d{1,3}\.){3}\d{1,3}";
const SHORTENER_PATTERN: &str = r"bit\.ly|goo\.gl|tinyurl|ow\.ly|t\.co|bitly|is\.gd|buff\.ly";

/// Offset after which a `//` counts as an embedded redirect ("https://" is 8 chars)
const REDIRECT_SCAN_OFFSET: usize = 7;

fn ipv4_regex() -> Option<&'static Regex> {
    static IPV4: OnceLock<Option<Regex>> = OnceLock::new();
    IPV4.get_or_init(|| Regex::new(IPV4_PATTERN).ok()).as_ref()
}

fn shortener_regex() -> Option<&'static Regex> {
    static SHORTENER: OnceLock<Option<Regex>> = OnceLock::new();
    SHORTENER
        .get_or_init(|| Regex::new(SHORTENER_PATTERN).ok())
        .as_ref()
}

/// Dotted quad anywhere in the URL
pub fn having_ip_address(url: &str) -> Signal {
    Signal::suspicious_if(ipv4_regex().is_some_and(|re| re.is_match(url)))
}

pub fn url_length(char_len: usize) -> Signal {
    match char_len {
        0..=53 => Signal::Benign,
        54..=75 => Signal::Neutral,
        _ => Signal::Suspicious,
    }
}

pub fn shortening_service(url: &str) -> Signal {
    Signal::suspicious_if(shortener_regex().is_some_and(|re| re.is_match(url)))
}

pub fn having_at_symbol(url: &str) -> Signal {
    Signal::suspicious_if(url.contains('@'))
}

pub fn double_slash_redirecting(url: &str) -> Signal {
    let embedded = url
        .char_indices()
        .nth(REDIRECT_SCAN_OFFSET)
        .is_some_and(|(offset, _)| url[offset..].contains("//"));
    Signal::suspicious_if(embedded)
}

pub fn prefix_suffix(hostname: &str) -> Signal {
    Signal::suspicious_if(hostname.contains('-'))
}

/// One dot is a plain domain, two is a single sub-domain, anything else
/// (including an unparsable, empty hostname) is suspicious
pub fn having_sub_domain(hostname: &str) -> Signal {
    if hostname.is_empty() {
        return Signal::Suspicious;
    }
    match hostname.matches('.').count() {
        1 => Signal::Benign,
        2 => Signal::Neutral,
        _ => Signal::Suspicious,
    }
}

/// Lexical scheme check only; certificates are not inspected
pub fn ssl_final_state(url: &str) -> Signal {
    if url.starts_with("https") {
        Signal::Benign
    } else {
        Signal::Suspicious
    }
}

pub fn submitting_to_email(url: &str) -> Signal {
    Signal::suspicious_if(url.contains("mailto:") || url.contains("mail()"))
}

pub fn redirect(url: &str) -> Signal {
    Signal::suspicious_if(url.matches("//").count() > 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_having_ip_address() {
        assert_eq!(
            having_ip_address("http://192.168.1.1/login"),
            Signal::Suspicious
        );
        assert_eq!(
            having_ip_address("https://example.com/?next=10.0.0.1"),
            Signal::Suspicious
        );
        assert_eq!(having_ip_address("https://example.com/"), Signal::Benign);
        assert_eq!(having_ip_address("http://1.2.3/"), Signal::Benign);
    }

    #[test]
    fn test_url_length_boundaries() {
        assert_eq!(url_length(0), Signal::Benign);
        assert_eq!(url_length(53), Signal::Benign);
        assert_eq!(url_length(54), Signal::Neutral);
        assert_eq!(url_length(75), Signal::Neutral);
        assert_eq!(url_length(76), Signal::Suspicious);
    }

    #[test]
    fn test_shortening_service() {
        assert_eq!(shortening_service("http://bit.ly/xyz"), Signal::Suspicious);
        assert_eq!(
            shortening_service("https://tinyurl.com/abc"),
            Signal::Suspicious
        );
        assert_eq!(shortening_service("https://is.gd/q"), Signal::Suspicious);
        assert_eq!(shortening_service("https://example.com/"), Signal::Benign);
    }

    #[test]
    fn test_at_symbol() {
        assert_eq!(
            having_at_symbol("http://paypal.com@evil.example/"),
            Signal::Suspicious
        );
        assert_eq!(having_at_symbol("http://example.com/"), Signal::Benign);
    }

    #[test]
    fn test_double_slash_redirecting() {
        assert_eq!(
            double_slash_redirecting("https://example.com/"),
            Signal::Benign
        );
        assert_eq!(double_slash_redirecting("http://example.com/"), Signal::Benign);
        assert_eq!(
            double_slash_redirecting("http://example.com//evil.example"),
            Signal::Suspicious
        );
        assert_eq!(double_slash_redirecting("http://"), Signal::Benign);
        assert_eq!(double_slash_redirecting(""), Signal::Benign);
    }

    #[test]
    fn test_prefix_suffix() {
        assert_eq!(prefix_suffix("secure-paypal.com"), Signal::Suspicious);
        assert_eq!(prefix_suffix("paypal.com"), Signal::Benign);
    }

    #[test]
    fn test_having_sub_domain() {
        assert_eq!(having_sub_domain("example.com"), Signal::Benign);
        assert_eq!(having_sub_domain("www.example.com"), Signal::Neutral);
        assert_eq!(having_sub_domain("a.b.example.com"), Signal::Suspicious);
        assert_eq!(having_sub_domain("localhost"), Signal::Suspicious);
        assert_eq!(having_sub_domain(""), Signal::Suspicious);
    }

    #[test]
    fn test_ssl_final_state() {
        assert_eq!(ssl_final_state("https://example.com"), Signal::Benign);
        assert_eq!(ssl_final_state("http://example.com"), Signal::Suspicious);
    }

    #[test]
    fn test_submitting_to_email() {
        assert_eq!(
            submitting_to_email("mailto:someone@example.com"),
            Signal::Suspicious
        );
        assert_eq!(
            submitting_to_email("http://example.com/form?action=mail()"),
            Signal::Suspicious
        );
        assert_eq!(submitting_to_email("http://example.com/"), Signal::Benign);
    }

    #[test]
    fn test_redirect() {
        assert_eq!(redirect("https://example.com/"), Signal::Benign);
        assert_eq!(
            redirect("https://example.com/r?u=https://evil.example"),
            Signal::Suspicious
        );
    }
}
