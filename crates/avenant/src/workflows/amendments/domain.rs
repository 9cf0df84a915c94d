use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::workflows::contracts::domain::{ContractId, PaymentMethod, ScheduleType, WorkMode};

/// Identifier wrapper for amendments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AmendmentId(pub String);

impl fmt::Display for AmendmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The three mutually exclusive categories an amendment may modify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModificationCategory {
    Salary,
    Schedule,
    Job,
}

impl ModificationCategory {
    pub const fn ordered() -> [Self; 3] {
        [Self::Salary, Self::Schedule, Self::Job]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Salary => "salary",
            Self::Schedule => "schedule",
            Self::Job => "job",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|category| category.label().eq_ignore_ascii_case(raw.trim()))
    }
}

impl fmt::Display for ModificationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Salary fields tracked by an amendment. Absent fields are omitted on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalarySnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary_brut: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary_net: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
}

impl SalarySnapshot {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_type: Option<ScheduleType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shift_work: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annual_leave_days: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_leaves: Option<String>,
}

impl ScheduleSnapshot {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Job fields tracked by an amendment. `department` holds the display name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poste: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_mode: Option<WorkMode>,
}

impl JobSnapshot {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Before/after pair for a single category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryChange<T> {
    pub before: T,
    pub after: T,
}

/// Change set of an amendment. Serialized as `{ "<category>": { before, after } }`,
/// so exactly one category is ever present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeSet {
    Salary(CategoryChange<SalarySnapshot>),
    Schedule(CategoryChange<ScheduleSnapshot>),
    Job(CategoryChange<JobSnapshot>),
}

impl ChangeSet {
    pub fn category(&self) -> ModificationCategory {
        match self {
            ChangeSet::Salary(_) => ModificationCategory::Salary,
            ChangeSet::Schedule(_) => ModificationCategory::Schedule,
            ChangeSet::Job(_) => ModificationCategory::Job,
        }
    }

    pub fn before_value(&self) -> serde_json::Value {
        match self {
            ChangeSet::Salary(change) => serde_json::to_value(&change.before),
            ChangeSet::Schedule(change) => serde_json::to_value(&change.before),
            ChangeSet::Job(change) => serde_json::to_value(&change.before),
        }
        .unwrap_or_default()
    }

    pub fn after_value(&self) -> serde_json::Value {
        match self {
            ChangeSet::Salary(change) => serde_json::to_value(&change.after),
            ChangeSet::Schedule(change) => serde_json::to_value(&change.after),
            ChangeSet::Job(change) => serde_json::to_value(&change.after),
        }
        .unwrap_or_default()
    }
}

/// User-proposed `after` values for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposedChange {
    Salary(SalarySnapshot),
    Schedule(ScheduleSnapshot),
    Job(JobSnapshot),
}

impl ProposedChange {
    pub fn category(&self) -> ModificationCategory {
        match self {
            ProposedChange::Salary(_) => ModificationCategory::Salary,
            ProposedChange::Schedule(_) => ModificationCategory::Schedule,
            ProposedChange::Job(_) => ModificationCategory::Job,
        }
    }
}

/// Lifecycle state of an amendment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmendmentStatus {
    Draft,
    Pending,
    Validated,
    Generated,
    Signed,
}

impl AmendmentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            AmendmentStatus::Draft => "draft",
            AmendmentStatus::Pending => "pending",
            AmendmentStatus::Validated => "validated",
            AmendmentStatus::Generated => "generated",
            AmendmentStatus::Signed => "signed",
        }
    }
}

impl fmt::Display for AmendmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Reference to the last PDF generated for an amendment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: usize,
    pub generated_at: DateTime<Utc>,
}

/// Signed copy attached after validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedDocument {
    pub url: String,
    pub name: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Upload payload for `POST /avenants/:id/upload-signed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct SignedDocumentUpload {
    #[validate(length(min = 1, message = "signed document url cannot be empty"))]
    pub url: String,
    #[validate(length(min = 1, message = "signed document name cannot be empty"))]
    pub name: String,
}

/// Stored amendment record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Amendment {
    pub id: AmendmentId,
    pub contract_id: ContractId,
    pub numero: u32,
    pub effective_date: NaiveDate,
    pub subject: String,
    pub reason: String,
    pub justification: String,
    pub changes: ChangeSet,
    pub manager_required: bool,
    pub rh_required: bool,
    pub notes: Option<String>,
    pub status: AmendmentStatus,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub generated_document: Option<DocumentRef>,
    pub signed_document: Option<SignedDocument>,
    /// Amendment this one builds on; its `after` became this `before`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amends: Option<AmendmentId>,
}

impl Amendment {
    /// Derived from the change set, never stored separately.
    pub fn type_modification(&self) -> ModificationCategory {
        self.changes.category()
    }

    pub fn is_editable(&self) -> bool {
        self.status == AmendmentStatus::Draft
    }

    pub fn view(&self) -> AmendmentView {
        AmendmentView {
            type_modification: self.type_modification(),
            editable: self.is_editable(),
            amendment: self.clone(),
        }
    }
}

/// Wire representation returned by the amendment routes.
#[derive(Debug, Clone, Serialize)]
pub struct AmendmentView {
    pub type_modification: ModificationCategory,
    pub editable: bool,
    #[serde(flatten)]
    pub amendment: Amendment,
}

/// Form payload for creating or editing an amendment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct AmendmentDraft {
    pub contract_id: ContractId,
    pub effective_date: NaiveDate,
    #[validate(length(min = 10, message = "subject must be at least 10 characters"))]
    pub subject: String,
    #[validate(length(min = 20, message = "reason must be at least 20 characters"))]
    pub reason: String,
    #[validate(length(min = 20, message = "justification must be at least 20 characters"))]
    pub justification: String,
    pub type_modification: ModificationCategory,
    pub changes: ProposedChange,
    #[serde(default)]
    pub manager_required: bool,
    #[serde(default)]
    pub rh_required: bool,
    #[serde(default)]
    pub notes: Option<String>,
}
