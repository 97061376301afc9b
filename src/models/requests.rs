//! Request DTOs for the forms API

use serde::Deserialize;

/// Query string accepted by the list endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    /// `refresh=true` bypasses the cache and repopulates it
    #[serde(default)]
    pub refresh: Option<String>,
}

impl ListQuery {
    /// Only the literal value `true` forces a refresh.
    pub fn force_refresh(&self) -> bool {
        self.refresh.as_deref() == Some("true")
    }
}
