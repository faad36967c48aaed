//! Extractors that inspect the HTML of the fetched page.
//!
//! A failed fetch reaches these as `None` and scores as suspicious.

use crate::page_fetch::PageSnapshot;
use crate::signal::Signal;
use scraper::{Html, Selector};
use url::Url;

/// Every `<link rel="...icon...">` must resolve to the requested host or to
/// the host the page was finally served from after redirects
pub fn favicon(page: Option<&PageSnapshot>, hostname: &str) -> Signal {
    let Some(page) = page else {
        return Signal::Suspicious;
    };
    let Ok(selector) = Selector::parse("link[rel]") else {
        return Signal::Suspicious;
    };
    let base = Url::parse(&page.url).ok();
    let served_host = base
        .as_ref()
        .and_then(|url| url.host_str())
        .map(str::to_lowercase);
    let document = Html::parse_document(&page.html);

    let foreign_icon = document
        .select(&selector)
        .filter(|link| {
            link.value()
                .attr("rel")
                .is_some_and(|rel| rel.to_lowercase().contains("icon"))
        })
        .any(|link| {
            let icon_host = link
                .value()
                .attr("href")
                .and_then(|href| resolve_host(base.as_ref(), href));
            match icon_host.as_deref() {
                Some(host) => host != hostname && served_host.as_deref() != Some(host),
                None => true,
            }
        });

    Signal::suspicious_if(foreign_icon)
}

fn resolve_host(base: Option<&Url>, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    let resolved = match base {
        Some(base) => base.join(href).ok()?,
        None => Url::parse(href).ok()?,
    };
    resolved.host_str().map(|h| h.to_lowercase())
}

/// Share of `<img src>` that reference the page's hostname
pub fn request_url(page: Option<&PageSnapshot>, hostname: &str) -> Signal {
    let Some(page) = page else {
        return Signal::Suspicious;
    };
    let Ok(selector) = Selector::parse("img[src]") else {
        return Signal::Suspicious;
    };
    let document = Html::parse_document(&page.html);

    let mut total = 0usize;
    let mut linked = 0usize;
    for img in document.select(&selector) {
        total += 1;
        if img.value().attr("src").is_some_and(|src| src.contains(hostname)) {
            linked += 1;
        }
    }

    if total == 0 || linked as f64 / total as f64 >= 0.5 {
        Signal::Benign
    } else {
        Signal::Suspicious
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(html: &str) -> PageSnapshot {
        PageSnapshot {
            url: "https://shop.example.com/login".to_string(),
            html: html.to_string(),
        }
    }

    #[test]
    fn test_favicon_same_origin() {
        let snapshot = page(
            r#"<html><head>
            <link rel="icon" href="https://shop.example.com/favicon.ico">
            <link rel="Apple-Touch-Icon" href="/touch.png">
            <link rel="stylesheet" href="https://cdn.other.net/site.css">
            </head></html>"#,
        );
        assert_eq!(favicon(Some(&snapshot), "shop.example.com"), Signal::Benign);
    }

    #[test]
    fn test_favicon_after_redirect_matches_served_host() {
        let snapshot = PageSnapshot {
            url: "https://www.example.com/".to_string(),
            html: r#"<link rel="icon" href="/favicon.ico">"#.to_string(),
        };
        assert_eq!(favicon(Some(&snapshot), "example.com"), Signal::Benign);

        let elsewhere = PageSnapshot {
            url: "https://www.example.com/".to_string(),
            html: r#"<link rel="icon" href="https://evil.example.net/f.ico">"#.to_string(),
        };
        assert_eq!(
            favicon(Some(&elsewhere), "example.com"),
            Signal::Suspicious
        );
    }

    #[test]
    fn test_favicon_foreign_origin() {
        let snapshot = page(
            r#"<link rel="shortcut icon" href="https://paypal.com/favicon.ico">"#,
        );
        assert_eq!(
            favicon(Some(&snapshot), "shop.example.com"),
            Signal::Suspicious
        );
    }

    #[test]
    fn test_favicon_without_href_is_suspicious() {
        let snapshot = page(r#"<link rel="icon">"#);
        assert_eq!(
            favicon(Some(&snapshot), "shop.example.com"),
            Signal::Suspicious
        );
    }

    #[test]
    fn test_favicon_no_icons_is_benign() {
        let snapshot = page("<html><body>hello</body></html>");
        assert_eq!(favicon(Some(&snapshot), "shop.example.com"), Signal::Benign);
    }

    #[test]
    fn test_favicon_fetch_failure() {
        assert_eq!(favicon(None, "shop.example.com"), Signal::Suspicious);
    }

    #[test]
    fn test_request_url_ratio() {
        let mostly_local = page(
            r#"<img src="https://shop.example.com/a.png">
               <img src="https://shop.example.com/b.png">
               <img src="https://cdn.other.net/c.png">
               <img alt="no source">"#,
        );
        assert_eq!(
            request_url(Some(&mostly_local), "shop.example.com"),
            Signal::Benign
        );

        let half = page(
            r#"<img src="https://shop.example.com/a.png"><img src="https://cdn.other.net/c.png">"#,
        );
        assert_eq!(request_url(Some(&half), "shop.example.com"), Signal::Benign);

        let mostly_foreign = page(
            r#"<img src="/local.png"><img src="https://cdn.other.net/c.png">
               <img src="https://paypal.com/logo.png">"#,
        );
        assert_eq!(
            request_url(Some(&mostly_foreign), "shop.example.com"),
            Signal::Suspicious
        );
    }

    #[test]
    fn test_request_url_no_images_is_benign() {
        let snapshot = page("<p>text only</p>");
        assert_eq!(
            request_url(Some(&snapshot), "shop.example.com"),
            Signal::Benign
        );
    }

    #[test]
    fn test_request_url_fetch_failure() {
        assert_eq!(request_url(None, "shop.example.com"), Signal::Suspicious);
    }
}
