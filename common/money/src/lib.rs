use serde::{Deserialize, Serialize};

/// Monetary amount in integral minor currency units (e.g. cents).
///
/// Prices and totals are carried as whole minor units end to end; no
/// floating point anywhere in the money path, so equality and threshold
/// comparisons are exact.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(transparent)]
pub struct Minor(i64);

impl Minor {
    pub const ZERO: Minor = Minor(0);

    pub fn new(units: i64) -> Self {
        Self(units)
    }

    pub fn units(self) -> i64 {
        self.0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn checked_add(self, other: Minor) -> Option<Minor> {
        self.0.checked_add(other.0).map(Minor)
    }

    pub fn checked_mul(self, factor: i64) -> Option<Minor> {
        self.0.checked_mul(factor).map(Minor)
    }
}

impl From<i64> for Minor {
    fn from(units: i64) -> Self {
        Self(units)
    }
}

impl std::fmt::Display for Minor {
    /// Renders as major.minor with two fractional digits, e.g. `-3.07`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}
