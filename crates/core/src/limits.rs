//! Operational limits enforced at the api boundary
//!
//! Violations return `Error` variants from the api layer; nothing in the
//! engine re-checks them.
//!
//! ## Contract
//!
//! The default delta cap is FROZEN: the keyspace width rule (every positive
//! bucket wider than the cap) is what keeps cross-bucket moves adjacent, and
//! both sides of that inequality ship together.

use crate::error::{Error, Result};
use crate::keyspace::Keyspace;
use crate::types::{CustomerId, Score};

/// Default cap on per-update delta magnitude.
pub const MAX_DELTA_MAGNITUDE: Score = 1_000;

/// Limits applied to incoming operations
#[derive(Debug, Clone)]
pub struct Limits {
    /// Maximum absolute value of a single score delta (default: 1000)
    pub max_delta_magnitude: Score,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_delta_magnitude: MAX_DELTA_MAGNITUDE,
        }
    }
}

impl Limits {
    /// Validate a customer id
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidCustomerId` for ids <= 0.
    pub fn validate_customer_id(&self, customer_id: CustomerId) -> Result<()> {
        if customer_id <= 0 {
            return Err(Error::InvalidCustomerId(customer_id));
        }
        Ok(())
    }

    /// Validate a score delta
    ///
    /// # Errors
    ///
    /// Returns `Error::DeltaOutOfRange` when the magnitude exceeds the cap.
    pub fn validate_delta(&self, delta: Score) -> Result<()> {
        if delta.abs() > self.max_delta_magnitude {
            return Err(Error::DeltaOutOfRange {
                delta,
                max: self.max_delta_magnitude,
            });
        }
        Ok(())
    }

    /// Check that `keyspace` keeps every cross-bucket move adjacent under
    /// this delta cap.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidKeyspace` when some positive bucket is
    /// narrower than the delta cap.
    pub fn validate_keyspace(&self, keyspace: &Keyspace) -> Result<()> {
        if keyspace.min_positive_width() <= self.max_delta_magnitude {
            return Err(Error::InvalidKeyspace(format!(
                "narrowest bucket ({}) must exceed the delta cap ({})",
                keyspace.min_positive_width(),
                self.max_delta_magnitude
            )));
        }
        Ok(())
    }
}
