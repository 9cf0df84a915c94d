use std::borrow::Cow;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::http::StatusCode;
use chrono::{Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::{info, warn};
use validator::{Validate, ValidationError, ValidationErrors};

use super::domain::{AdvanceId, AdvanceRequest, AdvanceStatus, AdvanceSubmission};
use super::eligibility::{Eligibility, EligibilityGate};
use super::repository::{AdvanceRepository, QuotaInsert};
use crate::workflows::contracts::domain::EmployeeId;
use crate::workflows::RepositoryError;

pub struct AdvanceService<R> {
    repository: Arc<R>,
    gate: EligibilityGate,
}

static ADVANCE_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_advance_id() -> AdvanceId {
    let id = ADVANCE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    AdvanceId(format!("adv-{id:06}"))
}

impl<R> AdvanceService<R>
where
    R: AdvanceRepository + 'static,
{
    pub fn new(repository: Arc<R>, max_per_year: Option<u32>) -> Self {
        Self {
            repository,
            gate: EligibilityGate::new(max_per_year),
        }
    }

    pub fn max_per_year(&self) -> Option<u32> {
        self.gate.max_per_year()
    }

    /// Store a new request in draft, refusing it when the yearly cap is used up.
    pub fn create(&self, submission: AdvanceSubmission) -> Result<AdvanceRequest, AdvanceError> {
        validate_submission(&submission)?;

        let request = AdvanceRequest {
            id: next_advance_id(),
            employee_id: submission.employee_id,
            kind: submission.kind,
            amount: submission.amount,
            request_date: submission.request_date,
            period: submission.period,
            status: AdvanceStatus::Draft,
            refusal_reason: None,
            created_at: Utc::now(),
        };
        let year = request.quota_year();

        match self.repository.insert_within_quota(request, &self.gate)? {
            QuotaInsert::Inserted(stored) => {
                info!(
                    advance_id = %stored.id,
                    employee_id = %stored.employee_id,
                    kind = stored.kind.label(),
                    amount = %stored.amount,
                    "advance request created"
                );
                Ok(stored)
            }
            QuotaInsert::Exceeded { count } => {
                let max = self.gate.max_per_year().unwrap_or(count);
                warn!(year, count, max, "advance quota exceeded");
                Err(AdvanceError::QuotaExceeded { year, count, max })
            }
        }
    }

    pub fn submit(&self, id: &AdvanceId) -> Result<AdvanceRequest, AdvanceError> {
        self.transition(id, AdvanceStatus::Pending, None)
    }

    pub fn approve(&self, id: &AdvanceId) -> Result<AdvanceRequest, AdvanceError> {
        self.transition(id, AdvanceStatus::Validated, None)
    }

    pub fn refuse(&self, id: &AdvanceId, reason: &str) -> Result<AdvanceRequest, AdvanceError> {
        let reason = reason.trim();
        if reason.is_empty() {
            let mut errors = ValidationErrors::new();
            errors.add(
                "reason",
                ValidationError::new("required")
                    .with_message(Cow::Borrowed("a refusal reason is required")),
            );
            return Err(AdvanceError::Validation(errors));
        }
        self.transition(id, AdvanceStatus::Refused, Some(reason.to_string()))
    }

    pub fn get(&self, id: &AdvanceId) -> Result<AdvanceRequest, AdvanceError> {
        self.repository
            .fetch(id)?
            .ok_or_else(|| AdvanceError::NotFound(id.clone()))
    }

    pub fn count_for_year(&self, employee_id: &EmployeeId, year: i32) -> Result<u32, AdvanceError> {
        Ok(self.repository.count_for_year(employee_id, year)?)
    }

    /// Advisory quota for the calendar year of `date`; never fails.
    pub fn eligibility(&self, employee_id: &EmployeeId, date: NaiveDate) -> Eligibility {
        self.gate
            .assess(self.repository.count_for_year(employee_id, date.year()))
    }

    fn transition(
        &self,
        id: &AdvanceId,
        to: AdvanceStatus,
        refusal_reason: Option<String>,
    ) -> Result<AdvanceRequest, AdvanceError> {
        let mut request = self.get(id)?;
        let from = request.status;
        let allowed = matches!(
            (from, to),
            (AdvanceStatus::Draft, AdvanceStatus::Pending)
                | (AdvanceStatus::Pending, AdvanceStatus::Validated)
                | (AdvanceStatus::Pending, AdvanceStatus::Refused)
        );
        if !allowed {
            return Err(AdvanceError::InvalidTransition { from, to });
        }

        request.status = to;
        request.refusal_reason = refusal_reason;
        self.repository
            .update(request.clone(), from)
            .map_err(|err| {
                if err == RepositoryError::Conflict {
                    warn!(
                        advance_id = %request.id,
                        expected = from.label(),
                        "advance request changed since it was read; write rejected"
                    );
                }
                err
            })?;

        info!(
            advance_id = %request.id,
            from = from.label(),
            to = to.label(),
            "advance status changed"
        );
        Ok(request)
    }
}

fn validate_submission(submission: &AdvanceSubmission) -> Result<(), ValidationErrors> {
    let mut errors = match submission.validate() {
        Ok(()) => ValidationErrors::new(),
        Err(errors) => errors,
    };

    if submission.amount <= Decimal::ZERO {
        errors.add(
            "amount",
            ValidationError::new("positive")
                .with_message(Cow::Borrowed("amount must be greater than zero")),
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AdvanceError {
    #[error("invalid advance request: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("annual advance limit reached for {year}: {count} of {max} already requested")]
    QuotaExceeded { year: i32, count: u32, max: u32 },
    #[error("cannot move an advance request from {from} to {to}")]
    InvalidTransition {
        from: AdvanceStatus,
        to: AdvanceStatus,
    },
    #[error("advance request {0} not found")]
    NotFound(AdvanceId),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl AdvanceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AdvanceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AdvanceError::QuotaExceeded { .. }
            | AdvanceError::InvalidTransition { .. }
            | AdvanceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
            AdvanceError::NotFound(_) | AdvanceError::Repository(RepositoryError::NotFound) => {
                StatusCode::NOT_FOUND
            }
            AdvanceError::Repository(RepositoryError::Unavailable(_)) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
        }
    }
}
