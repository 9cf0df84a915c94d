use super::domain::{Contract, ContractId, Department, EmployeeSummary};
use crate::workflows::RepositoryError;

/// Read-mostly access to the records owned by the HR backend.
pub trait ContractDirectory: Send + Sync {
    fn contract(&self, id: &ContractId) -> Result<Option<Contract>, RepositoryError>;
    fn save_contract(&self, contract: Contract) -> Result<(), RepositoryError>;
    fn departments(&self) -> Result<Vec<Department>, RepositoryError>;
    fn employees(&self) -> Result<Vec<EmployeeSummary>, RepositoryError>;
}
