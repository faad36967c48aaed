use serde::{Serialize, Serializer};
use std::fmt;

/// Number of positions in the feature vector schema.
pub const FEATURE_COUNT: usize = 26;

/// Discrete score produced by one feature extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i8)]
pub enum Signal {
    Suspicious = -1,
    Neutral = 0,
    Benign = 1,
}

impl Signal {
    pub fn value(self) -> i8 {
        self as i8
    }

    /// Map a boolean "looks suspicious" check onto the binary signal pair
    pub fn suspicious_if(condition: bool) -> Self {
        if condition {
            Signal::Suspicious
        } else {
            Signal::Benign
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.value(), f)
    }
}

impl Serialize for Signal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i8(self.value())
    }
}

/// Fixed-order vector of signals handed to the classifier.
///
/// The length is part of the type, so a vector can never be assembled short
/// even when individual lookups fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeatureVector([Signal; FEATURE_COUNT]);

impl FeatureVector {
    pub fn new(signals: [Signal; FEATURE_COUNT]) -> Self {
        Self(signals)
    }

    pub fn signals(&self) -> &[Signal; FEATURE_COUNT] {
        &self.0
    }

    pub fn get(&self, index: usize) -> Option<Signal> {
        self.0.get(index).copied()
    }

    pub fn values(&self) -> [i8; FEATURE_COUNT] {
        self.0.map(Signal::value)
    }

    /// Numeric form consumed by classifiers
    pub fn to_f64(&self) -> [f64; FEATURE_COUNT] {
        self.0.map(|s| f64::from(s.value()))
    }
}

impl fmt::Display for FeatureVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|s| s.to_string()).collect();
        write!(f, "[{}]", parts.join(", "))
    }
}
