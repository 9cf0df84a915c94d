//! Contract amendments (avenants): change tracking against the contract's
//! current terms, lifecycle, document generation and the per-contract register.

pub mod document;
pub mod domain;
pub mod draft;
pub mod export;
pub mod lifecycle;
pub mod repository;
pub mod router;
pub mod service;
pub mod validation;

#[cfg(test)]
mod tests;

pub use document::{DocumentError, DocumentStore, GeneratedDocument, SummaryPdfStore};
pub use domain::{
    Amendment, AmendmentDraft, AmendmentId, AmendmentStatus, AmendmentView, CategoryChange,
    ChangeSet, DocumentRef, JobSnapshot, ModificationCategory, ProposedChange, SalarySnapshot,
    ScheduleSnapshot, SignedDocument, SignedDocumentUpload,
};
pub use draft::AmendmentDraftBuilder;
pub use export::{write_register, ExportError};
pub use lifecycle::{LifecycleAction, LifecycleError};
pub use repository::AmendmentRepository;
pub use router::{amendment_router, USER_HEADER};
pub use service::{AmendmentError, AmendmentService};
pub use validation::validate_draft;
