//! Salary advances (avances/acomptes) with a per-employee yearly cap.

pub mod domain;
pub mod eligibility;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    AdvanceId, AdvanceKind, AdvanceRequest, AdvanceStatus, AdvanceSubmission, PayPeriod,
    RefusalRequest,
};
pub use eligibility::{Eligibility, EligibilityGate};
pub use repository::{AdvanceRepository, QuotaInsert};
pub use router::advance_router;
pub use service::{AdvanceError, AdvanceService};
