/// The conversion every rate provider is asked for, e.g. 1 USD in UAH.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyPair {
    pub base: String,
    pub target: String,
}

impl CurrencyPair {
    pub fn new(base: impl Into<String>, target: impl Into<String>) -> CurrencyPair {
        CurrencyPair {
            base: base.into().to_uppercase(),
            target: target.into().to_uppercase(),
        }
    }
}

impl Default for CurrencyPair {
    fn default() -> Self {
        CurrencyPair::new("USD", "UAH")
    }
}

impl std::fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}->{}", self.base, self.target)
    }
}
