//! Store-of-record Module
//!
//! The authoritative persistence seam the cache fronts. A document database
//! adapter implements `FormStore`; `InMemoryFormStore` is the bundled one.

mod memory;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StoreError;
use crate::forms::FormRecord;

pub use memory::InMemoryFormStore;

/// Persistence operations for one form kind.
#[async_trait]
pub trait FormStore<F: FormRecord>: Send + Sync {
    /// Persists a new record.
    async fn insert(&self, form: F) -> Result<F, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<F>, StoreError>;

    /// Every record, in insertion order.
    async fn find_all(&self) -> Result<Vec<F>, StoreError>;

    /// Records created by `owner`, in insertion order.
    async fn find_by_owner(&self, owner: &str) -> Result<Vec<F>, StoreError>;

    /// Replaces the stored record with the same id. Returns None if it no
    /// longer exists.
    async fn update(&self, form: F) -> Result<Option<F>, StoreError>;

    /// Removes a record, returning whether it existed.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}
