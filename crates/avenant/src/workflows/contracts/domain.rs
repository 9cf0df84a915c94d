use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::workflows::payroll::SalaryInputs;

/// Identifier wrapper for employment contracts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContractId(pub String);

/// Identifier wrapper for employees.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EmployeeId(pub String);

/// Identifier wrapper for departments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DepartmentId(pub String);

macro_rules! display_id {
    ($($id:ty),+) => {
        $(impl fmt::Display for $id {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        })+
    };
}

display_id!(ContractId, EmployeeId, DepartmentId);

/// Authoritative employment record. Amendments only read it and propose changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    pub id: ContractId,
    pub employee_id: EmployeeId,
    pub status: ContractStatus,
    pub job: JobTerms,
    pub salary: SalaryTerms,
    pub schedule: ScheduleTerms,
}

impl Contract {
    pub fn salary_inputs(&self) -> SalaryInputs {
        self.salary.inputs()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    Draft,
    Active,
    Terminated,
    Cancelled,
}

impl ContractStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ContractStatus::Draft => "draft",
            ContractStatus::Active => "active",
            ContractStatus::Terminated => "terminated",
            ContractStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobTerms {
    pub poste: String,
    pub department_id: Option<DepartmentId>,
    pub classification: Option<String>,
    pub work_mode: Option<WorkMode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkMode {
    OnSite,
    Remote,
    Hybrid,
}

/// Compensation terms. `salary_brut` and `salary_net` are derived from the
/// base salary, bonuses, and CNSS affiliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryTerms {
    pub base_salary: Option<Decimal>,
    #[serde(default)]
    pub primes: BTreeMap<String, Decimal>,
    #[serde(default)]
    pub cnss_affiliation: bool,
    pub salary_brut: Decimal,
    pub salary_net: Decimal,
    pub currency: String,
    pub payment_method: PaymentMethod,
    pub payment_frequency: PaymentFrequency,
}

impl SalaryTerms {
    pub fn inputs(&self) -> SalaryInputs {
        SalaryInputs {
            base_salary: self.base_salary,
            primes: self.primes.clone(),
            cnss_affiliation: self.cnss_affiliation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    BankTransfer,
    Cheque,
    Cash,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentFrequency {
    Monthly,
    Biweekly,
    Weekly,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleTerms {
    pub schedule_type: ScheduleType,
    #[serde(default)]
    pub shift_work: bool,
    pub annual_leave_days: u16,
    pub other_leaves: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleType {
    FullTime,
    PartTime,
    Flexible,
}

/// Department as exposed by `GET /departments`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: DepartmentId,
    pub name: String,
}

/// Row of `GET /employees/simple-list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeSummary {
    pub id: EmployeeId,
    pub full_name: String,
    pub matricule: String,
}
