use anyhow::Context;
use clap::{Arg, ArgAction, Command};
use log::LevelFilter;
use phishcheck::detector::{load_classifier, Detector, Inspection};
use phishcheck::features::SignalSource;
use phishcheck::{Config, Verdict};
use std::process;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let matches = Command::new("phishcheck")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Classify URLs as safe, suspicious or phishing")
        .long_about(
            "phishcheck derives a 26-signal feature vector from a URL (lexical checks, \n\
             WHOIS registration data, page content and popularity rank) and scores it \n\
             with a pre-trained classifier.",
        )
        .arg(
            Arg::new("urls")
                .value_name("URL")
                .help("URLs to classify")
                .num_args(0..)
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("/etc/phishcheck.yaml"),
        )
        .arg(
            Arg::new("model")
                .short('m')
                .long("model")
                .value_name("FILE")
                .help("Model file (overrides model_path from the configuration)")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("url-file")
                .long("url-file")
                .value_name("FILE")
                .help("Read URLs to classify from a file, one per line")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("generate-config")
                .long("generate-config")
                .value_name("FILE")
                .help("Generate a default configuration file")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("test-config")
                .long("test-config")
                .help("Validate the configuration and model, then exit")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("features")
                .long("features")
                .help("Show every signal of the feature vector")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print one JSON object per URL")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("offline")
                .long("offline")
                .help("Skip WHOIS, page and traffic lookups")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let log_level = if matches.get_flag("verbose") {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    if let Some(generate_path) = matches.get_one::<String>("generate-config") {
        generate_default_config(generate_path);
        return;
    }

    let config_path = matches
        .get_one::<String>("config")
        .map(String::as_str)
        .unwrap_or("/etc/phishcheck.yaml");

    let mut config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {e:#}");
            process::exit(1);
        }
    };

    if let Some(model) = matches.get_one::<String>("model") {
        config.model_path = model.clone();
    }
    if matches.get_flag("offline") {
        config.offline = true;
    }

    if matches.get_flag("test-config") {
        test_config(&config);
        return;
    }

    let urls = match collect_urls(&matches) {
        Ok(urls) => urls,
        Err(e) => {
            eprintln!("Error reading URLs: {e:#}");
            process::exit(1);
        }
    };
    if urls.is_empty() {
        eprintln!("No URLs given. Pass URLs as arguments or use --url-file FILE.");
        process::exit(2);
    }

    let detector = match Detector::from_config(&config) {
        Ok(detector) => Arc::new(detector),
        Err(e) => {
            eprintln!("Error creating detector: {e:#}");
            process::exit(1);
        }
    };
    if !detector.has_classifier() {
        log::warn!("Running without a model; every URL will report 'Model not loaded'");
    }

    let mut tasks = tokio::task::JoinSet::new();
    for (index, url) in urls.iter().cloned().enumerate() {
        let detector = Arc::clone(&detector);
        tasks.spawn(async move {
            let inspection = detector.inspect(&url).await;
            (index, url, inspection)
        });
    }

    let mut results = Vec::with_capacity(urls.len());
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(result) => results.push(result),
            Err(e) => log::error!("URL task failed: {e}"),
        }
    }
    results.sort_by_key(|(index, _, _)| *index);

    let show_features = matches.get_flag("features");
    for (_, url, inspection) in &results {
        if matches.get_flag("json") {
            print_json(url, inspection, show_features);
        } else {
            print_report(url, inspection, show_features);
        }
    }
}

fn load_config(path: &str) -> anyhow::Result<Config> {
    if std::path::Path::new(path).exists() {
        Config::from_file(path)
    } else {
        log::warn!("Configuration file '{path}' not found, using default configuration");
        Ok(Config::default())
    }
}

fn generate_default_config(path: &str) {
    let config = Config::default();
    match config.to_file(path) {
        Ok(()) => {
            println!("Default configuration written to: {path}");
            println!("Please edit the configuration file to suit your needs.");
        }
        Err(e) => {
            eprintln!("Error writing configuration file: {e:#}");
            process::exit(1);
        }
    }
}

fn test_config(config: &Config) {
    println!("🔍 Testing configuration...");
    println!();

    if let Err(e) = config.validate() {
        println!("❌ Configuration validation failed:");
        println!("Error: {e:#}");
        process::exit(1);
    }

    println!("Model file: {}", config.model_path);
    println!("Network timeout: {}s", config.network.timeout_seconds);
    println!("Offline mode: {}", config.offline);
    println!("Traffic rank endpoint: {}", config.traffic_rank.endpoint);
    println!(
        "Thresholds: suspicious >= {}, phishing >= {}",
        config.verdict.suspicious_threshold, config.verdict.phishing_threshold
    );
    println!("Safe domains: {}", config.verdict.safe_domains.join(", "));
    println!();

    match load_classifier(&config.model_path) {
        Some(classifier) => println!("✅ Model '{}' loaded", classifier.name()),
        None => {
            println!("❌ Model could not be loaded from {}", config.model_path);
            process::exit(1);
        }
    }
}

fn collect_urls(matches: &clap::ArgMatches) -> anyhow::Result<Vec<String>> {
    let mut urls: Vec<String> = matches
        .get_many::<String>("urls")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();

    if let Some(path) = matches.get_one::<String>("url-file") {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("Failed to read {path}"))?;
        urls.extend(
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#'))
                .map(str::to_string),
        );
    }

    Ok(urls)
}

fn verdict_icon(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Safe => "✅",
        Verdict::Suspicious => "⚠️",
        Verdict::Phishing => "🚨",
        Verdict::Invalid | Verdict::ModelUnavailable | Verdict::ExtractionError => "❌",
    }
}

fn print_report(url: &str, inspection: &Inspection, show_features: bool) {
    let assessment = &inspection.assessment;
    println!("🔗 {url}");
    println!(
        "   {} {} ({:.2}%)",
        verdict_icon(assessment.verdict),
        assessment.verdict,
        assessment.probability
    );

    if !show_features {
        println!();
        return;
    }

    match &inspection.analysis {
        Some(analysis) => {
            println!("   Hostname: {}", display_or_dash(&analysis.target.hostname));
            println!("   Path: {}", display_or_dash(&analysis.target.path));
            println!("   Vector: {}", analysis.vector);
            for named in analysis.named_signals() {
                let note = match named.feature.source() {
                    SignalSource::Placeholder => " (placeholder)",
                    SignalSource::Whois if analysis.evidence.whois.is_none() => " (lookup failed)",
                    SignalSource::Page if analysis.evidence.page.is_none() => " (fetch failed)",
                    SignalSource::TrafficRank if analysis.evidence.traffic_rank.is_none() => {
                        " (lookup failed)"
                    }
                    _ => "",
                };
                println!(
                    "     {:>2}  {:<28} {:>2}{}",
                    named.feature.index() + 1,
                    named.feature.name(),
                    named.signal,
                    note
                );
            }
        }
        None => println!("   No features extracted"),
    }
    println!();
}

fn print_json(url: &str, inspection: &Inspection, show_features: bool) {
    let mut value = serde_json::json!({
        "url": url,
        "prediction": inspection.assessment.verdict.label(),
        "probability": inspection.assessment.probability,
    });

    if show_features {
        if let Some(analysis) = &inspection.analysis {
            value["features"] = serde_json::json!(analysis.vector);
            value["signals"] = serde_json::json!(analysis.named_signals());
        }
    }

    println!("{value}");
}

fn display_or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}
