#![allow(clippy::uninlined_format_args)]

use phishcheck::config::Config;
use phishcheck::page_fetch::{PageFetcher, PageSource};
use phishcheck::traffic_rank::{TrafficRankClient, TrafficRankSource};
use phishcheck::whois::{WhoisClient, WhoisSource};
use phishcheck::FeatureEngine;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    println!("Testing REAL network lookups (no stubs)...");

    let config = Config::default();
    let whois = WhoisClient::new(config.network.timeout());
    let pages = PageFetcher::new(&config.network)?;
    let traffic = TrafficRankClient::new(&config.network, &config.traffic_rank)?;
    let engine = FeatureEngine::from_config(&config)?;

    let test_urls = vec![
        "https://www.google.com/",
        "https://example.com/",
        "https://github.com/",
        "http://192.168.1.1/login",
    ];

    for url in test_urls {
        let target = phishcheck::target::UrlTarget::parse(url);
        println!("\n=== {} (host: {}) ===", url, target.hostname);

        match whois.lookup(&target.hostname).await {
            Ok(record) => {
                println!("✅ WHOIS {}", record.domain);
                println!("  Created: {:?}", record.creation_date);
                println!("  Expires: {:?}", record.expiration_date);
            }
            Err(e) => println!("❌ WHOIS failed: {:#}", e),
        }

        match pages.fetch(url).await {
            Ok(page) => println!("✅ Page {} ({} bytes)", page.url, page.html.len()),
            Err(e) => println!("❌ Page fetch failed: {:#}", e),
        }

        match traffic.rank(&target.hostname).await {
            Ok(rank) => println!("✅ Traffic rank: {}", rank),
            Err(e) => println!("❌ Traffic rank failed: {:#}", e),
        }

        let vector = engine.extract(url).await;
        println!("  Feature vector: {}", vector);
    }

    println!("\n=== Live Lookup Testing Complete ===");
    Ok(())
}
