/// Closing prices for one symbol, index-aligned with their epoch-second
/// timestamps.
///
/// `timestamps.len()` is the series' data count. `prices` is filled from a
/// separate JSON array and may be shorter (or empty) even when `valid` is set,
/// so readers index it with `get`.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    pub symbol: String,
    pub timestamps: Vec<i64>,
    pub prices: Vec<f64>,
    pub valid: bool,
}

impl TimeSeries {
    pub fn empty(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            timestamps: Vec::new(),
            prices: Vec::new(),
            valid: false,
        }
    }

    pub fn data_count(&self) -> usize {
        self.timestamps.len()
    }

    /// Valid and holding at least one point.
    pub fn qualifies(&self) -> bool {
        self.valid && self.data_count() > 0
    }

    pub fn price_at(&self, idx: usize) -> Option<f64> {
        self.prices.get(idx).copied()
    }

    /// Price at the last timestamp slot, 0.0 when the price array is short.
    pub fn last_price(&self) -> f64 {
        self.data_count()
            .checked_sub(1)
            .and_then(|idx| self.price_at(idx))
            .unwrap_or(0.0)
    }
}

/// Current price and day change for one symbol, as shown by the ticker.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub symbol: String,
    pub price: f64,
    pub change_pct: f64,
    pub valid: bool,
}

impl Quote {
    pub fn empty(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            price: 0.0,
            change_pct: 0.0,
            valid: false,
        }
    }

    pub fn display_symbol(&self) -> &str {
        display_symbol(&self.symbol)
    }
}

/// Strips a trailing `=...` suffix, e.g. `EURUSD=X` -> `EURUSD`.
pub fn display_symbol(symbol: &str) -> &str {
    match symbol.find('=') {
        Some(pos) => &symbol[..pos],
        None => symbol,
    }
}
