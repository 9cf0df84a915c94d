use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde_json::Value;

use crate::workflows::advances::domain::{
    AdvanceId, AdvanceKind, AdvanceRequest, AdvanceStatus, AdvanceSubmission, PayPeriod,
};
use crate::workflows::advances::eligibility::EligibilityGate;
use crate::workflows::advances::repository::{AdvanceRepository, QuotaInsert};
use crate::workflows::advances::AdvanceService;
use crate::workflows::contracts::domain::EmployeeId;
use crate::workflows::RepositoryError;

pub(super) fn employee() -> EmployeeId {
    EmployeeId("emp-021".to_string())
}

pub(super) fn submission(day: u32) -> AdvanceSubmission {
    AdvanceSubmission {
        employee_id: employee(),
        kind: AdvanceKind::Avance,
        amount: Decimal::from(1_500),
        request_date: NaiveDate::from_ymd_opt(2025, 3, day).expect("valid date"),
        period: PayPeriod {
            month: 4,
            year: 2025,
        },
    }
}

pub(super) fn build_service(
    max_per_year: Option<u32>,
) -> (AdvanceService<MemoryAdvances>, Arc<MemoryAdvances>) {
    let repository = Arc::new(MemoryAdvances::default());
    let service = AdvanceService::new(repository.clone(), max_per_year);
    (service, repository)
}

type FetchHook = Box<dyn FnOnce() + Send>;

#[derive(Default)]
pub(super) struct MemoryAdvances {
    records: Mutex<HashMap<AdvanceId, AdvanceRequest>>,
    after_fetch: Mutex<Option<FetchHook>>,
}

impl MemoryAdvances {
    pub(super) fn seed(&self, request: AdvanceRequest) {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard.insert(request.id.clone(), request);
    }

    /// Run `action` once, right after the next read hands out a record, so it
    /// commits between that read and the write that follows.
    pub(super) fn after_next_fetch(&self, action: impl FnOnce() + Send + 'static) {
        *self.after_fetch.lock().expect("hook mutex poisoned") = Some(Box::new(action));
    }
}

fn counted(
    records: &HashMap<AdvanceId, AdvanceRequest>,
    employee_id: &EmployeeId,
    year: i32,
) -> u32 {
    let count = records
        .values()
        .filter(|request| {
            &request.employee_id == employee_id
                && request.quota_year() == year
                && request.status.counts_toward_quota()
        })
        .count();
    u32::try_from(count).unwrap_or(u32::MAX)
}

impl AdvanceRepository for MemoryAdvances {
    fn insert_within_quota(
        &self,
        request: AdvanceRequest,
        gate: &EligibilityGate,
    ) -> Result<QuotaInsert, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let count = counted(&guard, &request.employee_id, request.quota_year());
        if !gate.admits(count) {
            return Ok(QuotaInsert::Exceeded { count });
        }
        guard.insert(request.id.clone(), request.clone());
        Ok(QuotaInsert::Inserted(request))
    }

    fn update(
        &self,
        request: AdvanceRequest,
        expected: AdvanceStatus,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let stored = guard.get_mut(&request.id).ok_or(RepositoryError::NotFound)?;
        if stored.status != expected {
            return Err(RepositoryError::Conflict);
        }
        *stored = request;
        Ok(())
    }

    fn fetch(&self, id: &AdvanceId) -> Result<Option<AdvanceRequest>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let record = guard.get(id).cloned();
        drop(guard);
        let hook = self.after_fetch.lock().expect("hook mutex poisoned").take();
        if let Some(action) = hook {
            action();
        }
        Ok(record)
    }

    fn count_for_year(&self, employee_id: &EmployeeId, year: i32) -> Result<u32, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(counted(&guard, employee_id, year))
    }
}

pub(super) struct UnavailableAdvances;

impl AdvanceRepository for UnavailableAdvances {
    fn insert_within_quota(
        &self,
        _request: AdvanceRequest,
        _gate: &EligibilityGate,
    ) -> Result<QuotaInsert, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(
        &self,
        _request: AdvanceRequest,
        _expected: AdvanceStatus,
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &AdvanceId) -> Result<Option<AdvanceRequest>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn count_for_year(
        &self,
        _employee_id: &EmployeeId,
        _year: i32,
    ) -> Result<u32, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn stored_request(status: AdvanceStatus) -> AdvanceRequest {
    AdvanceRequest {
        id: AdvanceId(format!("adv-fixture-{}", status.label())),
        employee_id: employee(),
        kind: AdvanceKind::Acompte,
        amount: Decimal::from(800),
        request_date: NaiveDate::from_ymd_opt(2025, 6, 2).expect("valid date"),
        period: PayPeriod {
            month: 6,
            year: 2025,
        },
        status,
        refusal_reason: None,
        created_at: Utc::now(),
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 4096)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
