//! Form Records
//!
//! The two freight-quote form kinds and the trait the generic handlers and
//! stores work against.

mod origin;
mod rail_freight;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

pub use origin::{OriginForm, OriginFormInput};
pub use rail_freight::{RailFreightForm, RailFreightFormInput};

// == Record Metadata ==
/// Identity, ownership and timestamps shared by every form kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormMeta {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FormMeta {
    pub fn new(owner: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            created_by: owner.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

// == Form Record Trait ==
/// A form kind served by the generic CRUD handlers.
pub trait FormRecord: Serialize + Clone + Send + Sync + 'static {
    /// Request body accepted by create and edit. Every field is optional so
    /// the same shape serves as a partial patch.
    type Input: DeserializeOwned + Send + 'static;

    /// Cache key for the list of every form of this kind.
    const ALL_FORMS_KEY: &'static str;

    /// Prefix of the per-owner list cache key.
    const OWNER_KEY_PREFIX: &'static str;

    /// Builds a new record owned by `owner`, rejecting missing required fields.
    fn create(input: Self::Input, owner: &str) -> Result<Self, ApiError>;

    /// Applies the provided fields of `input` and re-validates.
    fn apply(&mut self, input: Self::Input) -> Result<(), ApiError>;

    fn meta(&self) -> &FormMeta;

    fn id(&self) -> Uuid {
        self.meta().id
    }

    fn owner(&self) -> &str {
        &self.meta().created_by
    }
}

/// Cache key for the forms owned by `owner`.
pub fn owner_cache_key<F: FormRecord>(owner: &str) -> String {
    format!("{}{}", F::OWNER_KEY_PREFIX, owner)
}

// == Validation Helpers ==
/// Returns the value of a required field, rejecting absent or blank input.
pub(crate) fn require(field: &str, value: Option<String>) -> Result<String, ApiError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ApiError::InvalidRequest(format!("Path `{}` is required.", field))),
    }
}

/// Rejects a required field that a patch blanked out.
pub(crate) fn ensure_present(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::InvalidRequest(format!("Path `{}` is required.", field)));
    }
    Ok(())
}

pub(crate) fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}
