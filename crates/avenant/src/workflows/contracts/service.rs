use std::sync::Arc;

use axum::http::StatusCode;
use tracing::info;

use super::domain::{Contract, ContractId, Department, EmployeeSummary};
use super::repository::ContractDirectory;
use crate::workflows::payroll::{SalaryBreakdown, SalaryRecalculator};
use crate::workflows::RepositoryError;

/// Contract reads and updates. Updates recompute derived salary figures
/// before they reach the directory.
pub struct ContractService<C> {
    directory: Arc<C>,
    recalculator: SalaryRecalculator,
}

impl<C> ContractService<C>
where
    C: ContractDirectory + 'static,
{
    pub fn new(directory: Arc<C>, recalculator: SalaryRecalculator) -> Self {
        Self {
            directory,
            recalculator,
        }
    }

    pub fn recalculator(&self) -> SalaryRecalculator {
        self.recalculator
    }

    pub fn get(&self, id: &ContractId) -> Result<Contract, ContractServiceError> {
        self.directory
            .contract(id)?
            .ok_or_else(|| ContractServiceError::NotFound(id.clone()))
    }

    /// Replace the stored contract. The path identifier wins over the payload.
    pub fn update(
        &self,
        id: &ContractId,
        mut contract: Contract,
    ) -> Result<(Contract, Option<SalaryBreakdown>), ContractServiceError> {
        self.get(id)?;

        contract.id = id.clone();
        let breakdown = self.recalculator.apply(&mut contract.salary);
        self.directory.save_contract(contract.clone())?;

        info!(
            contract_id = %id,
            salary_brut = %contract.salary.salary_brut,
            salary_net = %contract.salary.salary_net,
            recalculated = breakdown.is_some(),
            "contract updated"
        );

        Ok((contract, breakdown))
    }

    pub fn departments(&self) -> Result<Vec<Department>, ContractServiceError> {
        Ok(self.directory.departments()?)
    }

    pub fn employees(&self) -> Result<Vec<EmployeeSummary>, ContractServiceError> {
        Ok(self.directory.employees()?)
    }
}

/// Error raised by the contract service.
#[derive(Debug, thiserror::Error)]
pub enum ContractServiceError {
    #[error("contract {0} not found")]
    NotFound(ContractId),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ContractServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ContractServiceError::NotFound(_)
            | ContractServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
            ContractServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
            ContractServiceError::Repository(RepositoryError::Unavailable(_)) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
        }
    }
}
