//! Project identifier format `PROJ-YYYY-NNN`.
//!
//! # Invariants
//! - `YYYY` is a four-digit year or the literal undated bucket `0000`.
//! - `NNN` is zero-padded to at least three digits and starts at 1.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

const CODE_PREFIX: &str = "PROJ";

/// Year partition that scopes identifier sequence numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum YearBucket {
    /// Calendar year taken from a project date.
    Year(i32),
    /// No usable date; rendered as `0000`.
    Undated,
}

impl YearBucket {
    /// Pattern prefix shared by every code in this bucket, e.g. `PROJ-2024-`.
    pub fn code_prefix(self) -> String {
        format!("{CODE_PREFIX}-{self}-")
    }
}

impl Display for YearBucket {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Year(year) => write!(f, "{year:04}"),
            Self::Undated => f.write_str("0000"),
        }
    }
}

/// Immutable project identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectCode(String);

impl ProjectCode {
    /// Builds the code for one sequence number inside a year bucket.
    pub fn new(bucket: YearBucket, sequence: u32) -> Self {
        Self(format!("{CODE_PREFIX}-{bucket}-{sequence:03}"))
    }

    /// Wraps a code read back from storage without reparsing it.
    ///
    /// Legacy rows may carry codes outside the canonical shape; those are
    /// kept as-is and simply ignored by sequence parsing.
    pub fn from_stored(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the sequence number when this code has the exact
    /// `PROJ-<bucket>-<digits>` shape for `bucket`.
    pub fn sequence_in(&self, bucket: YearBucket) -> Option<u32> {
        let mut parts = self.0.split('-');
        let (Some(prefix), Some(year), Some(number), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return None;
        };
        if prefix != CODE_PREFIX || year != bucket.to_string() {
            return None;
        }
        if number.is_empty() || !number.bytes().all(|byte| byte.is_ascii_digit()) {
            return None;
        }
        number.parse().ok()
    }
}

impl Display for ProjectCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::{ProjectCode, YearBucket};

    #[test]
    fn new_pads_sequence_to_three_digits() {
        assert_eq!(
            ProjectCode::new(YearBucket::Year(2024), 7).as_str(),
            "PROJ-2024-007"
        );
        assert_eq!(
            ProjectCode::new(YearBucket::Undated, 12).as_str(),
            "PROJ-0000-012"
        );
        assert_eq!(
            ProjectCode::new(YearBucket::Year(2024), 1234).as_str(),
            "PROJ-2024-1234"
        );
    }

    #[test]
    fn sequence_in_only_accepts_exact_shape() {
        let bucket = YearBucket::Year(2024);
        assert_eq!(ProjectCode::from_stored("PROJ-2024-015").sequence_in(bucket), Some(15));
        assert_eq!(ProjectCode::from_stored("PROJ-2024-015-b").sequence_in(bucket), None);
        assert_eq!(ProjectCode::from_stored("PROJ-2024-x1").sequence_in(bucket), None);
        assert_eq!(ProjectCode::from_stored("PROJ-2023-015").sequence_in(bucket), None);
        assert_eq!(ProjectCode::from_stored("TASK-2024-015").sequence_in(bucket), None);
        assert_eq!(ProjectCode::from_stored("PROJ-2024-").sequence_in(bucket), None);
    }
}
