use url::Url;

/// A URL under inspection, parsed once into the parts the extractors read.
///
/// Parsing never fails: anything `Url` rejects (including scheme-less input
/// such as `example.com/login`) keeps the raw string but gets an empty
/// hostname and path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTarget {
    pub url: String,
    pub hostname: String,
    pub path: String,
}

impl UrlTarget {
    pub fn parse(url: &str) -> Self {
        let (hostname, path) = match Url::parse(url) {
            Ok(parsed) => {
                let hostname = parsed
                    .host_str()
                    .map(|h| h.trim_start_matches('[').trim_end_matches(']').to_lowercase())
                    .unwrap_or_default();
                let path = if parsed.cannot_be_a_base() {
                    String::new()
                } else {
                    parsed.path().to_string()
                };
                (hostname, path)
            }
            Err(e) => {
                log::debug!("Could not parse URL '{url}': {e}");
                (String::new(), String::new())
            }
        };

        Self {
            url: url.to_string(),
            hostname,
            path,
        }
    }

    /// Length in characters, not bytes
    pub fn char_len(&self) -> usize {
        self.url.chars().count()
    }

    pub fn has_hostname(&self) -> bool {
        !self.hostname.is_empty()
    }
}
