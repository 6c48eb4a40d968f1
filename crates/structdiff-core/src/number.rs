use serde::{Deserialize, Serialize};
use serde_json::Number as JsonNumber;

use crate::{
    hash::{HashCode, HashFunction},
    CanonicalizeError,
};

/// A finite JSON number stored as an IEEE-754 double.
#[derive(Clone, Copy, Debug, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Number(f64);

impl Number {
    /// Creates a new [`Number`] after validating finiteness.
    ///
    /// ```
    /// # use structdiff_core::Number;
    /// let num = Number::new(42.0)?;
    /// assert_eq!(num.get(), 42.0);
    /// assert!(Number::new(f64::NAN).is_err());
    /// # Ok::<(), structdiff_core::CanonicalizeError>(())
    /// ```
    pub fn new(value: f64) -> Result<Self, CanonicalizeError> {
        if value.is_finite() {
            Ok(Self(value))
        } else {
            Err(CanonicalizeError::NotFinite { value })
        }
    }

    /// Returns the raw floating-point value.
    #[must_use]
    pub fn get(self) -> f64 {
        self.0
    }

    /// Hashes the little-endian bytes of the value.
    ///
    /// `-0.0` hashes like `0.0` since the two compare equal.
    #[must_use]
    pub fn hash_with<H: HashFunction + ?Sized>(self, hasher: &H) -> HashCode {
        let value = if self.0 == 0.0 { 0.0 } else { self.0 };
        hasher.hash(&value.to_le_bytes())
    }

    /// Converts the number into a `serde_json::Number`, preferring an integer
    /// representation for integral values.
    #[must_use]
    pub fn to_json_number(self) -> JsonNumber {
        if self.0.fract() == 0.0 && !(self.0 == 0.0 && self.0.is_sign_negative()) {
            if (i64::MIN as f64) <= self.0 && self.0 < (i64::MAX as f64) {
                return JsonNumber::from(self.0 as i64);
            }
            if self.0 >= 0.0 && self.0 < (u64::MAX as f64) {
                return JsonNumber::from(self.0 as u64);
            }
        }
        // Finite by construction.
        JsonNumber::from_f64(self.0).unwrap_or_else(|| JsonNumber::from(0))
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}
