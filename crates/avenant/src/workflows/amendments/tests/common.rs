use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::workflows::amendments::document::{DocumentError, DocumentStore, GeneratedDocument};
use crate::workflows::amendments::domain::{
    Amendment, AmendmentDraft, AmendmentId, AmendmentStatus, ModificationCategory, ProposedChange,
    SalarySnapshot,
};
use crate::workflows::amendments::repository::AmendmentRepository;
use crate::workflows::amendments::{amendment_router, AmendmentService, SummaryPdfStore};
use crate::workflows::contracts::domain::{
    Contract, ContractId, ContractStatus, Department, DepartmentId, EmployeeId, EmployeeSummary,
    JobTerms, PaymentFrequency, PaymentMethod, SalaryTerms, ScheduleTerms, ScheduleType,
    WorkMode,
};
use crate::workflows::contracts::repository::ContractDirectory;
use crate::workflows::RepositoryError;

pub(super) const CONTRACT: &str = "ctr-001";

pub(super) fn contract_id() -> ContractId {
    ContractId(CONTRACT.to_string())
}

pub(super) fn contract() -> Contract {
    Contract {
        id: contract_id(),
        employee_id: EmployeeId("emp-014".to_string()),
        status: ContractStatus::Active,
        job: JobTerms {
            poste: "Comptable".to_string(),
            department_id: Some(DepartmentId("dep-fin".to_string())),
            classification: Some("Cadre".to_string()),
            work_mode: Some(WorkMode::Hybrid),
        },
        salary: SalaryTerms {
            base_salary: Some(Decimal::from(8_000)),
            primes: BTreeMap::new(),
            cnss_affiliation: false,
            salary_brut: Decimal::from(8_000),
            salary_net: Decimal::from(8_000),
            currency: "MAD".to_string(),
            payment_method: PaymentMethod::BankTransfer,
            payment_frequency: PaymentFrequency::Monthly,
        },
        schedule: ScheduleTerms {
            schedule_type: ScheduleType::FullTime,
            shift_work: false,
            annual_leave_days: 18,
            other_leaves: None,
        },
    }
}

pub(super) fn salary_draft(gross: i64) -> AmendmentDraft {
    AmendmentDraft {
        contract_id: contract_id(),
        effective_date: NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid date"),
        subject: "Revalorisation salariale".to_string(),
        reason: "Alignement sur la nouvelle grille".to_string(),
        justification: "Evaluation annuelle tres favorable".to_string(),
        type_modification: ModificationCategory::Salary,
        changes: ProposedChange::Salary(SalarySnapshot {
            salary_brut: Some(Decimal::from(gross)),
            currency: Some("MAD".to_string()),
            ..SalarySnapshot::default()
        }),
        manager_required: true,
        rh_required: false,
        notes: None,
    }
}

pub(super) type TestService =
    AmendmentService<MemoryContracts, MemoryAmendments, SummaryPdfStore>;

pub(super) fn build_service() -> (TestService, Arc<MemoryContracts>, Arc<MemoryAmendments>) {
    let contracts = Arc::new(MemoryContracts::with_contract(contract()));
    let amendments = Arc::new(MemoryAmendments::default());
    let service = AmendmentService::new(
        contracts.clone(),
        amendments.clone(),
        Arc::new(SummaryPdfStore),
    );
    (service, contracts, amendments)
}

pub(super) struct Interleaving {
    /// Service whose reads pause for the scheduled concurrent action.
    pub(super) editor: AmendmentService<MemoryContracts, InterleavedAmendments, SummaryPdfStore>,
    /// Second service over the same records, used as the concurrent writer.
    pub(super) reviewer: Arc<TestService>,
    pub(super) store: Arc<InterleavedAmendments>,
    pub(super) records: Arc<MemoryAmendments>,
}

pub(super) fn build_interleaving() -> Interleaving {
    let contracts = Arc::new(MemoryContracts::with_contract(contract()));
    let records = Arc::new(MemoryAmendments::default());
    let store = Arc::new(InterleavedAmendments::new(records.clone()));
    let reviewer = Arc::new(AmendmentService::new(
        contracts.clone(),
        records.clone(),
        Arc::new(SummaryPdfStore),
    ));
    let editor = AmendmentService::new(contracts, store.clone(), Arc::new(SummaryPdfStore));
    Interleaving {
        editor,
        reviewer,
        store,
        records,
    }
}

pub(super) fn router_with_service(service: TestService) -> axum::Router {
    amendment_router(Arc::new(service))
}

#[derive(Default)]
pub(super) struct MemoryContracts {
    contracts: Mutex<HashMap<ContractId, Contract>>,
}

impl MemoryContracts {
    pub(super) fn with_contract(contract: Contract) -> Self {
        let contracts = Self::default();
        contracts
            .contracts
            .lock()
            .expect("contract mutex poisoned")
            .insert(contract.id.clone(), contract);
        contracts
    }
}

impl ContractDirectory for MemoryContracts {
    fn contract(&self, id: &ContractId) -> Result<Option<Contract>, RepositoryError> {
        let guard = self.contracts.lock().expect("contract mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn save_contract(&self, contract: Contract) -> Result<(), RepositoryError> {
        let mut guard = self.contracts.lock().expect("contract mutex poisoned");
        guard.insert(contract.id.clone(), contract);
        Ok(())
    }

    fn departments(&self) -> Result<Vec<Department>, RepositoryError> {
        Ok(vec![Department {
            id: DepartmentId("dep-fin".to_string()),
            name: "Finance".to_string(),
        }])
    }

    fn employees(&self) -> Result<Vec<EmployeeSummary>, RepositoryError> {
        Ok(Vec::new())
    }
}

#[derive(Default)]
pub(super) struct MemoryAmendments {
    pub(super) records: Mutex<HashMap<AmendmentId, Amendment>>,
    sequences: Mutex<HashMap<ContractId, u32>>,
}

impl AmendmentRepository for MemoryAmendments {
    fn insert(&self, amendment: Amendment) -> Result<Amendment, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&amendment.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(amendment.id.clone(), amendment.clone());
        Ok(amendment)
    }

    fn update(
        &self,
        amendment: Amendment,
        expected: AmendmentStatus,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let stored = guard.get_mut(&amendment.id).ok_or(RepositoryError::NotFound)?;
        if stored.status != expected {
            return Err(RepositoryError::Conflict);
        }
        *stored = amendment;
        Ok(())
    }

    fn fetch(&self, id: &AmendmentId) -> Result<Option<Amendment>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn delete(&self, id: &AmendmentId, expected: AmendmentStatus) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        match guard.get(id) {
            None => Err(RepositoryError::NotFound),
            Some(stored) if stored.status != expected => Err(RepositoryError::Conflict),
            Some(_) => {
                guard.remove(id);
                Ok(())
            }
        }
    }

    fn list_for_contract(
        &self,
        contract_id: &ContractId,
    ) -> Result<Vec<Amendment>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|amendment| &amendment.contract_id == contract_id)
            .cloned()
            .collect())
    }

    fn next_numero(&self, contract_id: &ContractId) -> Result<u32, RepositoryError> {
        let mut guard = self.sequences.lock().expect("sequence mutex poisoned");
        let current = guard.entry(contract_id.clone()).or_insert(0);
        *current += 1;
        Ok(*current)
    }
}

type FetchHook = Box<dyn FnOnce() + Send>;

/// Store over `MemoryAmendments` that runs a one-shot action right after
/// handing out a record, so another writer commits between a read and the
/// write that follows it.
pub(super) struct InterleavedAmendments {
    inner: Arc<MemoryAmendments>,
    after_fetch: Mutex<Option<FetchHook>>,
}

impl InterleavedAmendments {
    pub(super) fn new(inner: Arc<MemoryAmendments>) -> Self {
        Self {
            inner,
            after_fetch: Mutex::new(None),
        }
    }

    pub(super) fn after_next_fetch(&self, action: impl FnOnce() + Send + 'static) {
        *self.after_fetch.lock().expect("hook mutex poisoned") = Some(Box::new(action));
    }
}

impl AmendmentRepository for InterleavedAmendments {
    fn insert(&self, amendment: Amendment) -> Result<Amendment, RepositoryError> {
        self.inner.insert(amendment)
    }

    fn update(
        &self,
        amendment: Amendment,
        expected: AmendmentStatus,
    ) -> Result<(), RepositoryError> {
        self.inner.update(amendment, expected)
    }

    fn fetch(&self, id: &AmendmentId) -> Result<Option<Amendment>, RepositoryError> {
        let record = self.inner.fetch(id)?;
        let hook = self.after_fetch.lock().expect("hook mutex poisoned").take();
        if let Some(action) = hook {
            action();
        }
        Ok(record)
    }

    fn delete(&self, id: &AmendmentId, expected: AmendmentStatus) -> Result<(), RepositoryError> {
        self.inner.delete(id, expected)
    }

    fn list_for_contract(
        &self,
        contract_id: &ContractId,
    ) -> Result<Vec<Amendment>, RepositoryError> {
        self.inner.list_for_contract(contract_id)
    }

    fn next_numero(&self, contract_id: &ContractId) -> Result<u32, RepositoryError> {
        self.inner.next_numero(contract_id)
    }
}

pub(super) struct UnavailableAmendments;

impl AmendmentRepository for UnavailableAmendments {
    fn insert(&self, _amendment: Amendment) -> Result<Amendment, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(
        &self,
        _amendment: Amendment,
        _expected: AmendmentStatus,
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &AmendmentId) -> Result<Option<Amendment>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn delete(&self, _id: &AmendmentId, _expected: AmendmentStatus) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list_for_contract(
        &self,
        _contract_id: &ContractId,
    ) -> Result<Vec<Amendment>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn next_numero(&self, _contract_id: &ContractId) -> Result<u32, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) struct OfflineDocuments;

impl DocumentStore for OfflineDocuments {
    fn generate(
        &self,
        _amendment: &Amendment,
        _contract: &Contract,
    ) -> Result<GeneratedDocument, DocumentError> {
        Err(DocumentError::Unavailable("renderer offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
