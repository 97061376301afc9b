//! In-memory form store.

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::FormStore;
use crate::error::StoreError;
use crate::forms::FormRecord;

/// Insertion-ordered store held in process memory.
#[derive(Debug)]
pub struct InMemoryFormStore<F> {
    forms: RwLock<Vec<F>>,
}

impl<F> InMemoryFormStore<F> {
    pub fn new() -> Self {
        Self {
            forms: RwLock::new(Vec::new()),
        }
    }
}

impl<F> Default for InMemoryFormStore<F> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<F: FormRecord> FormStore<F> for InMemoryFormStore<F> {
    async fn insert(&self, form: F) -> Result<F, StoreError> {
        let mut forms = self.forms.write().await;
        if forms.iter().any(|existing| existing.id() == form.id()) {
            return Err(StoreError::conflict(format!(
                "form {} already exists",
                form.id()
            )));
        }
        forms.push(form.clone());
        Ok(form)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<F>, StoreError> {
        let forms = self.forms.read().await;
        Ok(forms.iter().find(|form| form.id() == id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<F>, StoreError> {
        Ok(self.forms.read().await.clone())
    }

    async fn find_by_owner(&self, owner: &str) -> Result<Vec<F>, StoreError> {
        let forms = self.forms.read().await;
        Ok(forms
            .iter()
            .filter(|form| form.owner() == owner)
            .cloned()
            .collect())
    }

    async fn update(&self, form: F) -> Result<Option<F>, StoreError> {
        let mut forms = self.forms.write().await;
        match forms.iter_mut().find(|existing| existing.id() == form.id()) {
            Some(slot) => {
                *slot = form.clone();
                Ok(Some(form))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut forms = self.forms.write().await;
        let before = forms.len();
        forms.retain(|form| form.id() != id);
        Ok(forms.len() < before)
    }
}
