use avenant::workflows::advances::{
    AdvanceId, AdvanceRepository, AdvanceRequest, AdvanceStatus, EligibilityGate, QuotaInsert,
};
use avenant::workflows::amendments::{
    Amendment, AmendmentId, AmendmentRepository, AmendmentStatus,
};
use avenant::workflows::contracts::{
    Contract, ContractDirectory, ContractId, ContractStatus, Department, DepartmentId, EmployeeId,
    EmployeeSummary, JobTerms, PaymentFrequency, PaymentMethod, SalaryTerms, ScheduleTerms,
    ScheduleType, WorkMode,
};
use avenant::workflows::RepositoryError;
use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable("in-memory store poisoned".to_string()))
}

/// Contract directory seeded with demo records.
#[derive(Default)]
pub(crate) struct InMemoryContractDirectory {
    contracts: Mutex<HashMap<ContractId, Contract>>,
    departments: Vec<Department>,
    employees: Vec<EmployeeSummary>,
}

impl InMemoryContractDirectory {
    pub(crate) fn seeded() -> Self {
        let contracts = demo_contracts()
            .into_iter()
            .map(|contract| (contract.id.clone(), contract))
            .collect();

        Self {
            contracts: Mutex::new(contracts),
            departments: demo_departments(),
            employees: demo_employees(),
        }
    }
}

impl ContractDirectory for InMemoryContractDirectory {
    fn contract(&self, id: &ContractId) -> Result<Option<Contract>, RepositoryError> {
        Ok(lock(&self.contracts)?.get(id).cloned())
    }

    fn save_contract(&self, contract: Contract) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.contracts)?;
        if !guard.contains_key(&contract.id) {
            return Err(RepositoryError::NotFound);
        }
        guard.insert(contract.id.clone(), contract);
        Ok(())
    }

    fn departments(&self) -> Result<Vec<Department>, RepositoryError> {
        Ok(self.departments.clone())
    }

    fn employees(&self) -> Result<Vec<EmployeeSummary>, RepositoryError> {
        Ok(self.employees.clone())
    }
}

/// Amendment store with a per-contract numbering sequence that survives deletions.
#[derive(Default)]
pub(crate) struct InMemoryAmendmentRepository {
    records: Mutex<HashMap<AmendmentId, Amendment>>,
    sequences: Mutex<HashMap<ContractId, u32>>,
}

impl AmendmentRepository for InMemoryAmendmentRepository {
    fn insert(&self, amendment: Amendment) -> Result<Amendment, RepositoryError> {
        let mut guard = lock(&self.records)?;
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
        let mut guard = lock(&self.records)?;
        let stored = guard
            .get_mut(&amendment.id)
            .ok_or(RepositoryError::NotFound)?;
        if stored.status != expected {
            return Err(RepositoryError::Conflict);
        }
        *stored = amendment;
        Ok(())
    }

    fn fetch(&self, id: &AmendmentId) -> Result<Option<Amendment>, RepositoryError> {
        Ok(lock(&self.records)?.get(id).cloned())
    }

    fn delete(&self, id: &AmendmentId, expected: AmendmentStatus) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.records)?;
        match guard.get(id).map(|stored| stored.status) {
            None => Err(RepositoryError::NotFound),
            Some(status) if status != expected => Err(RepositoryError::Conflict),
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
        Ok(lock(&self.records)?
            .values()
            .filter(|amendment| &amendment.contract_id == contract_id)
            .cloned()
            .collect())
    }

    fn next_numero(&self, contract_id: &ContractId) -> Result<u32, RepositoryError> {
        let mut guard = lock(&self.sequences)?;
        let current = guard.entry(contract_id.clone()).or_insert(0);
        *current = current
            .checked_add(1)
            .ok_or_else(|| RepositoryError::Unavailable("numbering exhausted".to_string()))?;
        Ok(*current)
    }
}

/// Advance store; counting and inserting share one lock.
#[derive(Default)]
pub(crate) struct InMemoryAdvanceRepository {
    records: Mutex<HashMap<AdvanceId, AdvanceRequest>>,
}

fn counted_for_year(
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

impl AdvanceRepository for InMemoryAdvanceRepository {
    fn insert_within_quota(
        &self,
        request: AdvanceRequest,
        gate: &EligibilityGate,
    ) -> Result<QuotaInsert, RepositoryError> {
        let mut guard = lock(&self.records)?;
        if guard.contains_key(&request.id) {
            return Err(RepositoryError::Conflict);
        }

        let count = counted_for_year(&guard, &request.employee_id, request.quota_year());
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
        let mut guard = lock(&self.records)?;
        let stored = guard.get_mut(&request.id).ok_or(RepositoryError::NotFound)?;
        if stored.status != expected {
            return Err(RepositoryError::Conflict);
        }
        *stored = request;
        Ok(())
    }

    fn fetch(&self, id: &AdvanceId) -> Result<Option<AdvanceRequest>, RepositoryError> {
        Ok(lock(&self.records)?.get(id).cloned())
    }

    fn count_for_year(&self, employee_id: &EmployeeId, year: i32) -> Result<u32, RepositoryError> {
        Ok(counted_for_year(&*lock(&self.records)?, employee_id, year))
    }
}

pub(crate) fn demo_departments() -> Vec<Department> {
    [
        ("dep-fin", "Finance"),
        ("dep-ops", "Operations"),
        ("dep-rh", "Ressources humaines"),
    ]
    .into_iter()
    .map(|(id, name)| Department {
        id: DepartmentId(id.to_string()),
        name: name.to_string(),
    })
    .collect()
}

pub(crate) fn demo_employees() -> Vec<EmployeeSummary> {
    vec![
        EmployeeSummary {
            id: EmployeeId("emp-001".to_string()),
            full_name: "Salma Bennani".to_string(),
            matricule: "M-0001".to_string(),
        },
        EmployeeSummary {
            id: EmployeeId("emp-002".to_string()),
            full_name: "Youssef Alaoui".to_string(),
            matricule: "M-0002".to_string(),
        },
    ]
}

pub(crate) fn demo_contracts() -> Vec<Contract> {
    vec![
        Contract {
            id: ContractId("ctr-001".to_string()),
            employee_id: EmployeeId("emp-001".to_string()),
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
        },
        Contract {
            id: ContractId("ctr-002".to_string()),
            employee_id: EmployeeId("emp-002".to_string()),
            status: ContractStatus::Active,
            job: JobTerms {
                poste: "Technicien de maintenance".to_string(),
                department_id: Some(DepartmentId("dep-ops".to_string())),
                classification: None,
                work_mode: Some(WorkMode::OnSite),
            },
            salary: SalaryTerms {
                base_salary: Some(Decimal::from(6_500)),
                primes: BTreeMap::from([("panier".to_string(), Decimal::from(300))]),
                cnss_affiliation: true,
                salary_brut: Decimal::from(6_800),
                salary_net: Decimal::new(649536, 2),
                currency: "MAD".to_string(),
                payment_method: PaymentMethod::BankTransfer,
                payment_frequency: PaymentFrequency::Monthly,
            },
            schedule: ScheduleTerms {
                schedule_type: ScheduleType::FullTime,
                shift_work: true,
                annual_leave_days: 18,
                other_leaves: None,
            },
        },
    ]
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn parse_amount(raw: &str) -> Result<Decimal, String> {
    Decimal::from_str(raw.trim()).map_err(|err| format!("failed to parse '{raw}' as amount ({err})"))
}

/// Parse a `name=value` prime argument.
pub(crate) fn parse_prime(raw: &str) -> Result<(String, Decimal), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("prime name missing in '{raw}'"));
    }
    Ok((name.to_string(), parse_amount(value)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use avenant::workflows::advances::{AdvanceKind, PayPeriod};
    use avenant::workflows::payroll::SalaryRecalculator;
    use chrono::Utc;

    fn advance(id: &str, status: AdvanceStatus) -> AdvanceRequest {
        AdvanceRequest {
            id: AdvanceId(id.to_string()),
            employee_id: EmployeeId("emp-001".to_string()),
            kind: AdvanceKind::Avance,
            amount: Decimal::from(500),
            request_date: NaiveDate::from_ymd_opt(2025, 2, 1).expect("valid date"),
            period: PayPeriod {
                month: 2,
                year: 2025,
            },
            status,
            refusal_reason: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn seeded_contracts_carry_consistent_salaries() {
        let recalculator = SalaryRecalculator::default();
        for contract in demo_contracts() {
            let breakdown = recalculator
                .recalculate(&contract.salary_inputs())
                .expect("seeded base salary is positive");
            assert_eq!(breakdown.gross, contract.salary.salary_brut);
            assert_eq!(breakdown.net, contract.salary.salary_net);
        }
    }

    #[test]
    fn numbering_survives_deletion() {
        let repository = InMemoryAmendmentRepository::default();
        let contract = ContractId("ctr-001".to_string());
        assert_eq!(repository.next_numero(&contract), Ok(1));
        assert_eq!(repository.next_numero(&contract), Ok(2));
        assert_eq!(
            repository.next_numero(&ContractId("ctr-002".to_string())),
            Ok(1)
        );
        assert_eq!(repository.next_numero(&contract), Ok(3));
    }

    #[test]
    fn quota_insert_ignores_refused_requests() {
        let repository = InMemoryAdvanceRepository::default();
        let gate = EligibilityGate::new(Some(1));

        let refused = advance("adv-a", AdvanceStatus::Refused);
        repository
            .records
            .lock()
            .expect("lock")
            .insert(refused.id.clone(), refused);

        let inserted = repository
            .insert_within_quota(advance("adv-b", AdvanceStatus::Draft), &gate)
            .expect("insert succeeds");
        assert!(matches!(inserted, QuotaInsert::Inserted(_)));

        let exceeded = repository
            .insert_within_quota(advance("adv-c", AdvanceStatus::Draft), &gate)
            .expect("insert succeeds");
        assert_eq!(exceeded, QuotaInsert::Exceeded { count: 1 });
    }

    #[test]
    fn stale_advance_write_is_a_conflict() {
        let repository = InMemoryAdvanceRepository::default();
        let gate = EligibilityGate::new(None);
        let draft = advance("adv-d", AdvanceStatus::Draft);
        repository
            .insert_within_quota(draft.clone(), &gate)
            .expect("insert succeeds");

        let mut pending = draft.clone();
        pending.status = AdvanceStatus::Pending;
        assert_eq!(repository.update(pending, AdvanceStatus::Draft), Ok(()));

        let mut stale = draft;
        stale.status = AdvanceStatus::Pending;
        assert_eq!(
            repository.update(stale, AdvanceStatus::Draft),
            Err(RepositoryError::Conflict)
        );
        assert_eq!(
            repository.update(advance("adv-x", AdvanceStatus::Pending), AdvanceStatus::Draft),
            Err(RepositoryError::NotFound)
        );
    }

    #[test]
    fn parses_prime_arguments() {
        assert_eq!(
            parse_prime("transport=250.50"),
            Ok(("transport".to_string(), Decimal::new(25050, 2)))
        );
        assert!(parse_prime("transport").is_err());
        assert!(parse_prime("=12").is_err());
    }
}
