use std::fmt::Display;

use serde::Serialize;
use tracing::warn;

/// Remaining quota for a per-year capped resource, used as a hint before
/// submission. The authoritative check happens when the request is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Eligibility {
    pub max_per_year: Option<u32>,
    pub count: Option<u32>,
    pub remaining: Option<u32>,
    pub reached_max: bool,
}

impl Eligibility {
    /// No cap configured or the count could not be read.
    pub const fn unknown(max_per_year: Option<u32>) -> Self {
        Self {
            max_per_year,
            count: None,
            remaining: None,
            reached_max: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EligibilityGate {
    max_per_year: Option<u32>,
}

impl EligibilityGate {
    pub const fn new(max_per_year: Option<u32>) -> Self {
        Self { max_per_year }
    }

    pub const fn max_per_year(&self) -> Option<u32> {
        self.max_per_year
    }

    /// Evaluate a count query result. A failed count is treated as unknown
    /// rather than blocking.
    pub fn assess<E: Display>(&self, count: Result<u32, E>) -> Eligibility {
        let Some(max) = self.max_per_year else {
            return Eligibility {
                count: count.ok(),
                ..Eligibility::unknown(None)
            };
        };

        match count {
            Ok(count) => {
                let remaining = max.saturating_sub(count);
                Eligibility {
                    max_per_year: Some(max),
                    count: Some(count),
                    remaining: Some(remaining),
                    reached_max: remaining == 0,
                }
            }
            Err(err) => {
                warn!(error = %err, "advance count unavailable; eligibility unknown");
                Eligibility::unknown(Some(max))
            }
        }
    }

    /// Whether one more request fits under the cap given `count` existing ones.
    pub fn admits(&self, count: u32) -> bool {
        self.max_per_year.map_or(true, |max| count < max)
    }
}
