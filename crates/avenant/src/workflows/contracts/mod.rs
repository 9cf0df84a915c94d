//! Contracts, departments, and employees as read from the HR backend.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{
    Contract, ContractId, ContractStatus, Department, DepartmentId, EmployeeId, EmployeeSummary,
    JobTerms, PaymentFrequency, PaymentMethod, SalaryTerms, ScheduleTerms, ScheduleType,
    WorkMode,
};
pub use repository::ContractDirectory;
pub use router::contract_router;
pub use service::{ContractService, ContractServiceError};
