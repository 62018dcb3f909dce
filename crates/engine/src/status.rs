//! Lifecycle status shared by every soft-deletable entity.

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Whether a row is live or kept only because something still references it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityStatus {
    #[default]
    Active,
    Deleted,
}

impl EntityStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Deleted => "deleted",
        }
    }

    pub fn is_active(self) -> bool {
        self == Self::Active
    }
}

impl TryFrom<&str> for EntityStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "active" => Ok(Self::Active),
            "deleted" => Ok(Self::Deleted),
            other => Err(EngineError::InvalidOperation(format!(
                "invalid entity status: {other}"
            ))),
        }
    }
}

/// Outcome of deleting a soft-deletable entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Removal {
    /// Nothing referenced the row, so it is gone.
    Removed,
    /// The row is still referenced and was marked [`EntityStatus::Deleted`].
    Archived,
}
