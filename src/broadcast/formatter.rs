use chrono::{DateTime, Utc};

use crate::domain::CurrencyPair;

/// Subject and HTML body of the rate newsletter.
#[derive(Debug, Clone)]
pub struct RateFormatter {
    pair: CurrencyPair,
}

impl RateFormatter {
    pub fn new(pair: CurrencyPair) -> RateFormatter {
        RateFormatter { pair }
    }

    pub fn subject(&self) -> String {
        format!("{} to {} rate exchange", self.pair.base, self.pair.target)
    }

    pub fn format(&self, rate: f32, at: DateTime<Utc>) -> String {
        format!(
            "Latest exchange rate as for {}: 1 {} worth {:.2} {}",
            at.format("%Y-%m-%d %H:%M:%S"),
            self.pair.base,
            rate,
            self.pair.target
        )
    }
}
