use std::collections::BTreeMap;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::workflows::contracts::domain::SalaryTerms;

/// Employee CNSS contribution rate (4.48 %).
pub const DEFAULT_CNSS_RATE: Decimal = Decimal::from_parts(448, 0, 0, false, 4);

const DECIMAL_PLACES: u32 = 2;

/// Inputs driving the gross/net derivation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SalaryInputs {
    pub base_salary: Option<Decimal>,
    #[serde(default)]
    pub primes: BTreeMap<String, Decimal>,
    #[serde(default)]
    pub cnss_affiliation: bool,
}

/// Derived salary figures, each rounded to two decimals half-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryBreakdown {
    pub gross: Decimal,
    pub deduction: Decimal,
    pub net: Decimal,
}

/// Pure gross/net calculator parameterised by the statutory deduction rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SalaryRecalculator {
    deduction_rate: Decimal,
}

impl Default for SalaryRecalculator {
    fn default() -> Self {
        Self::new(DEFAULT_CNSS_RATE)
    }
}

impl SalaryRecalculator {
    pub fn new(deduction_rate: Decimal) -> Self {
        let sanitized = if deduction_rate.is_sign_negative() || deduction_rate >= Decimal::ONE {
            DEFAULT_CNSS_RATE
        } else {
            deduction_rate
        };

        Self {
            deduction_rate: sanitized,
        }
    }

    pub fn deduction_rate(&self) -> Decimal {
        self.deduction_rate
    }

    /// Returns `None` when the base salary is missing or not strictly positive;
    /// callers keep their previous figures in that case.
    pub fn recalculate(&self, inputs: &SalaryInputs) -> Option<SalaryBreakdown> {
        let base = inputs
            .base_salary
            .filter(|base| *base > Decimal::ZERO)?;

        let gross = inputs
            .primes
            .values()
            .try_fold(base, |total, prime| total.checked_add(*prime))?;

        let deduction = if inputs.cnss_affiliation {
            gross.checked_mul(self.deduction_rate)?
        } else {
            Decimal::ZERO
        };
        let net = gross.checked_sub(deduction)?;

        Some(SalaryBreakdown {
            gross: round_money(gross),
            deduction: round_money(deduction),
            net: round_money(net),
        })
    }

    /// Writes `salary_brut` and `salary_net` when a breakdown can be derived.
    pub fn apply(&self, salary: &mut SalaryTerms) -> Option<SalaryBreakdown> {
        let breakdown = self.recalculate(&salary.inputs())?;
        salary.salary_brut = breakdown.gross;
        salary.salary_net = breakdown.net;
        Some(breakdown)
    }
}

pub(crate) fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}
