pub mod classifier;
pub mod config;
pub mod detector;
pub mod domain_utils;
pub mod features;
pub mod page_fetch;
pub mod signal;
pub mod target;
pub mod traffic_rank;
pub mod verdict;
pub mod whois;

pub use classifier::{Classifier, LogisticModel};
pub use config::Config;
pub use detector::{Detector, Inspection};
pub use features::{Feature, FeatureAnalysis, FeatureEngine};
pub use signal::{FeatureVector, Signal, FEATURE_COUNT};
pub use verdict::{Assessment, Verdict, VerdictPolicy};
