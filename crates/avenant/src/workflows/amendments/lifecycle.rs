use std::fmt;

use serde::Serialize;

use super::domain::AmendmentStatus;

/// Operations that move or touch an amendment's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleAction {
    Submit,
    Validate,
    Generate,
    AttachSigned,
    Delete,
    Edit,
}

impl LifecycleAction {
    pub const fn label(self) -> &'static str {
        match self {
            LifecycleAction::Submit => "submit",
            LifecycleAction::Validate => "validate",
            LifecycleAction::Generate => "generate",
            LifecycleAction::AttachSigned => "attach_signed",
            LifecycleAction::Delete => "delete",
            LifecycleAction::Edit => "edit",
        }
    }
}

impl fmt::Display for LifecycleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    #[error("cannot {action} an amendment in status {from}")]
    InvalidTransition {
        from: AmendmentStatus,
        action: LifecycleAction,
    },
    #[error("amendment is {status} and can no longer be edited")]
    Locked { status: AmendmentStatus },
}

impl AmendmentStatus {
    /// Status reached after applying `action`. Generation and signing are
    /// repeatable; a signed amendment stays signed when regenerated.
    pub fn next(self, action: LifecycleAction) -> Result<AmendmentStatus, LifecycleError> {
        use AmendmentStatus::*;
        use LifecycleAction::*;

        match (self, action) {
            (Draft, Submit) => Ok(Pending),
            (Draft | Pending, Validate) => Ok(Validated),
            (Validated | Generated, Generate) => Ok(Generated),
            (Signed, Generate) => Ok(Signed),
            (Validated | Generated | Signed, AttachSigned) => Ok(Signed),
            (Draft, Edit) => Ok(Draft),
            (_, Edit) => Err(LifecycleError::Locked { status: self }),
            (from, action) => Err(LifecycleError::InvalidTransition { from, action }),
        }
    }

    pub fn ensure_mutable(self) -> Result<(), LifecycleError> {
        self.next(LifecycleAction::Edit).map(|_| ())
    }

    pub fn ensure_deletable(self) -> Result<(), LifecycleError> {
        match self {
            AmendmentStatus::Draft => Ok(()),
            from => Err(LifecycleError::InvalidTransition {
                from,
                action: LifecycleAction::Delete,
            }),
        }
    }
}
