use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::workflows::contracts::domain::EmployeeId;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AdvanceId(pub String);

impl fmt::Display for AdvanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Salary advance (avance) or payroll installment paid ahead of the slip (acompte).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvanceKind {
    Avance,
    Acompte,
}

impl AdvanceKind {
    pub const fn label(self) -> &'static str {
        match self {
            AdvanceKind::Avance => "avance",
            AdvanceKind::Acompte => "acompte",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvanceStatus {
    Draft,
    Pending,
    Validated,
    Refused,
}

impl AdvanceStatus {
    pub const fn label(self) -> &'static str {
        match self {
            AdvanceStatus::Draft => "draft",
            AdvanceStatus::Pending => "pending",
            AdvanceStatus::Validated => "validated",
            AdvanceStatus::Refused => "refused",
        }
    }

    /// Refused requests release their slot in the yearly quota.
    pub const fn counts_toward_quota(self) -> bool {
        !matches!(self, AdvanceStatus::Refused)
    }
}

impl fmt::Display for AdvanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Pay period the advance is deducted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct PayPeriod {
    #[validate(range(min = 1, max = 12, message = "month must be between 1 and 12"))]
    pub month: u8,
    #[validate(range(min = 1, message = "year must be positive"))]
    pub year: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvanceRequest {
    pub id: AdvanceId,
    pub employee_id: EmployeeId,
    pub kind: AdvanceKind,
    pub amount: Decimal,
    pub request_date: NaiveDate,
    pub period: PayPeriod,
    pub status: AdvanceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refusal_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AdvanceRequest {
    /// Calendar year the request counts against.
    pub fn quota_year(&self) -> i32 {
        self.request_date.year()
    }
}

/// Creation payload for `POST /avances`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct AdvanceSubmission {
    pub employee_id: EmployeeId,
    pub kind: AdvanceKind,
    pub amount: Decimal,
    pub request_date: NaiveDate,
    #[validate(nested)]
    pub period: PayPeriod,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefusalRequest {
    pub reason: String,
}
