use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::http::StatusCode;
use chrono::Utc;
use tracing::{debug, info, warn};
use validator::{Validate, ValidationError, ValidationErrors};

use super::document::{DocumentError, DocumentStore, GeneratedDocument};
use super::domain::{
    Amendment, AmendmentDraft, AmendmentId, AmendmentStatus, ChangeSet, ModificationCategory,
    ProposedChange, SignedDocument, SignedDocumentUpload,
};
use super::draft::AmendmentDraftBuilder;
use super::export::write_register;
use super::lifecycle::{LifecycleAction, LifecycleError};
use super::repository::AmendmentRepository;
use super::validation::validate_draft;
use crate::workflows::contracts::domain::{Contract, ContractId};
use crate::workflows::contracts::repository::ContractDirectory;
use crate::workflows::RepositoryError;

/// Boundary facade for amendments: the only path through which one is
/// created, edited, advanced or removed.
pub struct AmendmentService<C, R, D> {
    contracts: Arc<C>,
    repository: Arc<R>,
    documents: Arc<D>,
}

static AMENDMENT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_amendment_id() -> AmendmentId {
    let id = AMENDMENT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    AmendmentId(format!("avn-{id:06}"))
}

impl<C, R, D> AmendmentService<C, R, D>
where
    C: ContractDirectory + 'static,
    R: AmendmentRepository + 'static,
    D: DocumentStore + 'static,
{
    pub fn new(contracts: Arc<C>, repository: Arc<R>, documents: Arc<D>) -> Self {
        Self {
            contracts,
            repository,
            documents,
        }
    }

    /// Current contract values for `category`, ready to pre-fill a new draft.
    pub fn defaults(
        &self,
        contract_id: &ContractId,
        category: ModificationCategory,
    ) -> Result<ProposedChange, AmendmentError> {
        let contract = self.contract(contract_id)?;
        let departments = self.contracts.departments()?;
        Ok(AmendmentDraftBuilder::new(&contract, &departments).defaults(category))
    }

    pub fn create(
        &self,
        draft: AmendmentDraft,
        created_by: Option<String>,
    ) -> Result<Amendment, AmendmentError> {
        validate_draft(&draft)?;

        let contract = self.contract(&draft.contract_id)?;
        let departments = self.contracts.departments()?;
        let changes = AmendmentDraftBuilder::new(&contract, &departments)
            .build(draft.changes.clone(), None);
        self.record_draft(draft, changes, None, created_by)
    }

    /// Draft an amendment of `prior_id`. Its `before` is the prior amendment's
    /// `after` rather than the live contract terms.
    pub fn amend(
        &self,
        prior_id: &AmendmentId,
        draft: AmendmentDraft,
        created_by: Option<String>,
    ) -> Result<Amendment, AmendmentError> {
        validate_draft(&draft)?;

        let prior = self.fetch(prior_id)?;
        if draft.contract_id != prior.contract_id {
            return Err(rejected(
                "contract_id",
                "prior_contract",
                "an amendment can only amend one of the same contract",
            ));
        }

        let contract = self.contract(&prior.contract_id)?;
        let departments = self.contracts.departments()?;
        let changes = AmendmentDraftBuilder::new(&contract, &departments)
            .build_on(draft.changes.clone(), &prior.changes)
            .ok_or_else(|| {
                rejected(
                    "type_modification",
                    "prior_category",
                    "an amendment must change the category of the one it amends",
                )
            })?;
        self.record_draft(draft, changes, Some(prior.id), created_by)
    }

    fn record_draft(
        &self,
        draft: AmendmentDraft,
        changes: ChangeSet,
        amends: Option<AmendmentId>,
        created_by: Option<String>,
    ) -> Result<Amendment, AmendmentError> {
        let numero = self.repository.next_numero(&draft.contract_id)?;
        let now = Utc::now();

        let amendment = Amendment {
            id: next_amendment_id(),
            contract_id: draft.contract_id,
            numero,
            effective_date: draft.effective_date,
            subject: draft.subject,
            reason: draft.reason,
            justification: draft.justification,
            changes,
            manager_required: draft.manager_required,
            rh_required: draft.rh_required,
            notes: draft.notes,
            status: AmendmentStatus::Draft,
            created_by,
            created_at: now,
            updated_at: now,
            generated_document: None,
            signed_document: None,
            amends,
        };

        let stored = self.repository.insert(amendment)?;
        info!(
            amendment_id = %stored.id,
            contract_id = %stored.contract_id,
            numero = stored.numero,
            category = %stored.type_modification(),
            amends = stored.amends.as_ref().map(|id| id.0.as_str()),
            "amendment drafted"
        );
        Ok(stored)
    }

    /// Replace the editable fields of a draft. The contract, numero and the
    /// captured `before` snapshot are kept.
    pub fn update(
        &self,
        id: &AmendmentId,
        draft: AmendmentDraft,
    ) -> Result<Amendment, AmendmentError> {
        let mut amendment = self.fetch(id)?;
        let expected = amendment.status;
        expected.ensure_mutable()?;
        validate_draft(&draft)?;

        if draft.contract_id != amendment.contract_id {
            return Err(rejected(
                "contract_id",
                "immutable",
                "an amendment cannot move to another contract",
            ));
        }
        if amendment.amends.is_some() && draft.changes.category() != amendment.type_modification()
        {
            return Err(rejected(
                "type_modification",
                "prior_category",
                "an amendment must change the category of the one it amends",
            ));
        }

        let contract = self.contract(&amendment.contract_id)?;
        let departments = self.contracts.departments()?;
        amendment.changes = AmendmentDraftBuilder::new(&contract, &departments)
            .build(draft.changes, Some(&amendment.changes));
        amendment.effective_date = draft.effective_date;
        amendment.subject = draft.subject;
        amendment.reason = draft.reason;
        amendment.justification = draft.justification;
        amendment.manager_required = draft.manager_required;
        amendment.rh_required = draft.rh_required;
        amendment.notes = draft.notes;
        amendment.updated_at = Utc::now();

        self.store(&amendment, expected)?;
        debug!(amendment_id = %amendment.id, "amendment draft updated");
        Ok(amendment)
    }

    pub fn submit(&self, id: &AmendmentId) -> Result<Amendment, AmendmentError> {
        self.transition(id, LifecycleAction::Submit)
    }

    pub fn validate(&self, id: &AmendmentId) -> Result<Amendment, AmendmentError> {
        self.transition(id, LifecycleAction::Validate)
    }

    pub fn delete(&self, id: &AmendmentId) -> Result<(), AmendmentError> {
        let amendment = self.fetch(id)?;
        amendment.status.ensure_deletable()?;
        self.repository
            .delete(id, amendment.status)
            .map_err(|err| rejected_write(id, amendment.status, err))?;
        info!(
            amendment_id = %id,
            contract_id = %amendment.contract_id,
            numero = amendment.numero,
            "amendment deleted"
        );
        Ok(())
    }

    /// Render the amendment document and record its reference.
    pub fn generate_document(
        &self,
        id: &AmendmentId,
    ) -> Result<(Amendment, GeneratedDocument), AmendmentError> {
        let mut amendment = self.fetch(id)?;
        let expected = amendment.status;
        let next = expected.next(LifecycleAction::Generate)?;
        let contract = self.contract(&amendment.contract_id)?;

        let document = self.documents.generate(&amendment, &contract)?;
        amendment.status = next;
        amendment.generated_document = Some(document.reference.clone());
        amendment.updated_at = Utc::now();
        self.store(&amendment, expected)?;

        info!(
            amendment_id = %amendment.id,
            file_name = %document.reference.file_name,
            size_bytes = document.reference.size_bytes,
            "amendment document generated"
        );
        Ok((amendment, document))
    }

    pub fn attach_signed(
        &self,
        id: &AmendmentId,
        upload: SignedDocumentUpload,
    ) -> Result<Amendment, AmendmentError> {
        upload.validate()?;
        let mut amendment = self.fetch(id)?;
        let expected = amendment.status;
        amendment.status = expected.next(LifecycleAction::AttachSigned)?;

        let now = Utc::now();
        amendment.signed_document = Some(SignedDocument {
            url: upload.url,
            name: upload.name,
            uploaded_at: now,
        });
        amendment.updated_at = now;
        self.store(&amendment, expected)?;

        info!(amendment_id = %amendment.id, "signed amendment attached");
        Ok(amendment)
    }

    pub fn get(&self, id: &AmendmentId) -> Result<Amendment, AmendmentError> {
        self.fetch(id)
    }

    /// Amendments of a contract ordered by `numero`.
    pub fn list_for_contract(
        &self,
        contract_id: &ContractId,
    ) -> Result<Vec<Amendment>, AmendmentError> {
        let mut amendments = self.repository.list_for_contract(contract_id)?;
        amendments.sort_by_key(|amendment| amendment.numero);
        Ok(amendments)
    }

    /// CSV register of a contract's amendments.
    pub fn export_register(&self, contract_id: &ContractId) -> Result<String, AmendmentError> {
        self.contract(contract_id)?;
        let amendments = self.list_for_contract(contract_id)?;
        write_register(&amendments).map_err(|err| AmendmentError::Export(err.to_string()))
    }

    fn transition(
        &self,
        id: &AmendmentId,
        action: LifecycleAction,
    ) -> Result<Amendment, AmendmentError> {
        let mut amendment = self.fetch(id)?;
        let from = amendment.status;
        amendment.status = from.next(action)?;
        amendment.updated_at = Utc::now();
        self.store(&amendment, from)?;

        info!(
            amendment_id = %amendment.id,
            from = from.label(),
            to = amendment.status.label(),
            "amendment status changed"
        );
        Ok(amendment)
    }

    /// Write back an amendment read while it held `expected` status.
    fn store(
        &self,
        amendment: &Amendment,
        expected: AmendmentStatus,
    ) -> Result<(), AmendmentError> {
        self.repository
            .update(amendment.clone(), expected)
            .map_err(|err| rejected_write(&amendment.id, expected, err))
    }

    fn fetch(&self, id: &AmendmentId) -> Result<Amendment, AmendmentError> {
        self.repository
            .fetch(id)?
            .ok_or_else(|| AmendmentError::NotFound(id.clone()))
    }

    fn contract(&self, id: &ContractId) -> Result<Contract, AmendmentError> {
        self.contracts
            .contract(id)?
            .ok_or_else(|| AmendmentError::ContractNotFound(id.clone()))
    }
}

fn rejected_write(
    id: &AmendmentId,
    expected: AmendmentStatus,
    err: RepositoryError,
) -> AmendmentError {
    if err == RepositoryError::Conflict {
        warn!(
            amendment_id = %id,
            expected = expected.label(),
            "amendment changed since it was read; write rejected"
        );
    }
    AmendmentError::Repository(err)
}

fn rejected(field: &'static str, code: &'static str, message: &'static str) -> AmendmentError {
    let mut errors = ValidationErrors::new();
    errors.add(field, ValidationError::new(code).with_message(message.into()));
    AmendmentError::Validation(errors)
}

/// Error raised by the amendment service.
#[derive(Debug, thiserror::Error)]
pub enum AmendmentError {
    #[error("invalid amendment: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("cannot {action} an amendment in status {from}")]
    InvalidStateTransition {
        from: AmendmentStatus,
        action: LifecycleAction,
    },
    #[error("amendment is {status} and can no longer be edited")]
    Locked { status: AmendmentStatus },
    #[error("contract {0} not found")]
    ContractNotFound(ContractId),
    #[error("amendment {0} not found")]
    NotFound(AmendmentId),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error("register export failed: {0}")]
    Export(String),
}

impl From<LifecycleError> for AmendmentError {
    fn from(value: LifecycleError) -> Self {
        match value {
            LifecycleError::InvalidTransition { from, action } => {
                AmendmentError::InvalidStateTransition { from, action }
            }
            LifecycleError::Locked { status } => AmendmentError::Locked { status },
        }
    }
}

impl AmendmentError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AmendmentError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AmendmentError::InvalidStateTransition { .. }
            | AmendmentError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
            AmendmentError::Locked { .. } => StatusCode::LOCKED,
            AmendmentError::ContractNotFound(_)
            | AmendmentError::NotFound(_)
            | AmendmentError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
            AmendmentError::Repository(RepositoryError::Unavailable(_))
            | AmendmentError::Document(DocumentError::Unavailable(_)) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AmendmentError::Document(DocumentError::Rendering(_))
            | AmendmentError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
