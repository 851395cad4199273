use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Price(i64);  // Fixed-point with 8 decimal places

impl Price {
    const MULTIPLIER: i64 = 100_000_000;  // 10^8

    /// Rounds to the nearest representable value (half away from zero).
    /// `None` for NaN, infinities and anything outside the i64 range.
    pub fn from_f64(value: f64) -> Option<Self> {
        let scaled = (value * Self::MULTIPLIER as f64).round();
        if scaled >= i64::MIN as f64 && scaled < i64::MAX as f64 {
            Some(Price(scaled as i64))
        } else {
            None
        }
    }

    /// Rounds `value` to `dp` decimal places before converting, so two
    /// quotes that agree to `dp` places compare equal.
    pub fn from_f64_rounded(value: f64, dp: u32) -> Option<Self> {
        let scale = 10f64.powi(dp as i32);
        Self::from_f64((value * scale).round() / scale)
    }

    pub fn to_f64(&self) -> f64 {
        self.0 as f64 / Self::MULTIPLIER as f64
    }

    /// `12345678.9` -> `12,345,678.90`
    pub fn to_grouped_string(&self) -> String {
        let cents = (self.0 as i128 * 100 + (Self::MULTIPLIER as i128 / 2) * self.0.signum() as i128)
            / Self::MULTIPLIER as i128;
        let sign = if cents < 0 { "-" } else { "" };
        let cents = cents.unsigned_abs();
        let whole = (cents / 100).to_string();
        let frac = cents % 100;

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, ch) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }

        format!("{}{}.{:02}", sign, grouped, frac)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.to_f64())
    }
}
