use super::domain::{Amendment, AmendmentId, AmendmentStatus};
use crate::workflows::contracts::domain::ContractId;
use crate::workflows::RepositoryError;

/// Storage abstraction for amendments.
pub trait AmendmentRepository: Send + Sync {
    fn insert(&self, amendment: Amendment) -> Result<Amendment, RepositoryError>;
    /// Replace the stored amendment if it still holds `expected` status,
    /// otherwise fail with `Conflict` and leave the record untouched.
    fn update(&self, amendment: Amendment, expected: AmendmentStatus)
        -> Result<(), RepositoryError>;
    fn fetch(&self, id: &AmendmentId) -> Result<Option<Amendment>, RepositoryError>;
    /// Remove the amendment if it still holds `expected` status.
    fn delete(&self, id: &AmendmentId, expected: AmendmentStatus) -> Result<(), RepositoryError>;
    fn list_for_contract(&self, contract_id: &ContractId)
        -> Result<Vec<Amendment>, RepositoryError>;

    /// Reserve the next sequence number for a contract. Numbers are never
    /// handed out twice, even after the amendment holding one is deleted.
    fn next_numero(&self, contract_id: &ContractId) -> Result<u32, RepositoryError>;
}
