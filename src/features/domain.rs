//! Extractors backed by registration and popularity lookups.

use crate::signal::Signal;
use crate::whois::WhoisRecord;
use chrono::NaiveDate;

pub const MIN_REGISTRATION_DAYS: i64 = 365;
pub const MIN_DOMAIN_AGE_DAYS: i64 = 180;

pub fn domain_registration_length(whois: Option<&WhoisRecord>) -> Signal {
    match whois.and_then(WhoisRecord::registration_days) {
        Some(days) if days >= MIN_REGISTRATION_DAYS => Signal::Benign,
        _ => Signal::Suspicious,
    }
}

pub fn age_of_domain(whois: Option<&WhoisRecord>, today: NaiveDate) -> Signal {
    match whois.and_then(|record| record.age_days(today)) {
        Some(days) if days >= MIN_DOMAIN_AGE_DAYS => Signal::Benign,
        _ => Signal::Suspicious,
    }
}

pub fn web_traffic(rank: Option<u64>, max_rank: u64) -> Signal {
    match rank {
        Some(rank) if rank < max_rank => Signal::Benign,
        _ => Signal::Suspicious,
    }
}
