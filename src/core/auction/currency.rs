//! Minimal currency normalisation for winner selection. No live FX feed is wired up — see `DESIGN.md` for why a fixed table
//! is an acceptable stand-in here.

use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct CurrencyConverter {
    /// `rates[FROM][TO]` multiplies an amount in `FROM` into `TO`.
    rates: HashMap<(String, String), f64>,
}

impl Default for CurrencyConverter {
    fn default() -> Self {
        Self {
            rates: HashMap::new(),
        }
    }
}

impl CurrencyConverter {
    pub fn with_rate(mut self, from: &str, to: &str, rate: f64) -> Self {
        self.rates
            .insert((from.to_ascii_uppercase(), to.to_ascii_uppercase()), rate);
        self
    }

    /// Converts `amount` from `from` into `to`. Same currency (case
    /// insensitive) is always 1:1. An unknown pair falls back to 1:1 rather
    /// than discarding the bid — see `DESIGN.md`.
    pub fn convert(&self, amount: f64, from: &str, to: &str) -> f64 {
        let (from, to) = (from.to_ascii_uppercase(), to.to_ascii_uppercase());
        if from == to {
            return amount;
        }
        match self.rates.get(&(from.clone(), to.clone())) {
            Some(rate) => amount * rate,
            None => match self.rates.get(&(to, from)) {
                Some(rate) if *rate != 0.0 => amount / rate,
                _ => amount,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_currency_is_identity() {
        let conv = CurrencyConverter::default();
        assert_eq!(conv.convert(1.5, "USD", "USD"), 1.5);
    }

    #[test]
    fn configured_rate_applies_in_both_directions() {
        let conv = CurrencyConverter::default().with_rate("EUR", "USD", 1.1);
        assert_eq!(conv.convert(10.0, "EUR", "USD"), 11.0);
        assert!((conv.convert(11.0, "USD", "EUR") - 10.0).abs() < 1e-9);
    }
}
