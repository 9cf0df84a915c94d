use super::domain::{AdvanceId, AdvanceRequest, AdvanceStatus};
use super::eligibility::EligibilityGate;
use crate::workflows::contracts::domain::EmployeeId;
use crate::workflows::RepositoryError;

/// Outcome of a quota-checked insert.
#[derive(Debug, Clone, PartialEq)]
pub enum QuotaInsert {
    Inserted(AdvanceRequest),
    /// The employee already holds `count` counted requests for the year.
    Exceeded { count: u32 },
}

/// Storage abstraction for advance requests.
pub trait AdvanceRepository: Send + Sync {
    /// Count and insert under one critical section so concurrent submissions
    /// cannot both take the last slot.
    fn insert_within_quota(
        &self,
        request: AdvanceRequest,
        gate: &EligibilityGate,
    ) -> Result<QuotaInsert, RepositoryError>;
    /// Replace the stored request if it still holds `expected` status,
    /// otherwise fail with `Conflict`.
    fn update(&self, request: AdvanceRequest, expected: AdvanceStatus)
        -> Result<(), RepositoryError>;
    fn fetch(&self, id: &AdvanceId) -> Result<Option<AdvanceRequest>, RepositoryError>;
    /// Requests for `employee_id` dated in `year` that count toward the quota.
    fn count_for_year(&self, employee_id: &EmployeeId, year: i32) -> Result<u32, RepositoryError>;
}
