//! API Handlers
//!
//! HTTP request handlers. Form handlers are generic over the form kind; list
//! handlers serve from the cache when it is fresh and every mutation
//! invalidates the aggregate and owner-scoped list keys before responding.

use std::future::Future;
use std::sync::Arc;

use axum::{
    extract::{FromRef, Path, Query, State},
    http::{
        header::{CACHE_CONTROL, EXPIRES, PRAGMA},
        HeaderName, StatusCode,
    },
    response::IntoResponse,
    Json,
};
use serde_json::Value;
use tracing::{debug, info};
use uuid::Uuid;

use super::auth::{AuthConfig, AuthUser};
use crate::cache::{CacheManager, CacheOptions};
use crate::config::Config;
use crate::error::{ApiError, Result, StoreError};
use crate::forms::{owner_cache_key, FormRecord, OriginForm, RailFreightForm};
use crate::models::{
    CacheStatsResponse, CreatedResponse, FlushResponse, HealthResponse, ListQuery,
    MessageResponse,
};
use crate::store::{FormStore, InMemoryFormStore};

/// Headers that keep browsers and intermediaries from caching list reads.
const NO_STORE_HEADERS: [(HeaderName, &str); 3] = [
    (
        CACHE_CONTROL,
        "no-store, no-cache, must-revalidate, proxy-revalidate",
    ),
    (PRAGMA, "no-cache"),
    (EXPIRES, "0"),
];

// == App State ==
/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// List cache shared by both form kinds
    pub cache: CacheManager<Value>,
    pub origin_forms: Arc<dyn FormStore<OriginForm>>,
    pub rail_freight_forms: Arc<dyn FormStore<RailFreightForm>>,
    pub auth: Arc<AuthConfig>,
}

impl AppState {
    pub fn new(
        cache: CacheManager<Value>,
        origin_forms: Arc<dyn FormStore<OriginForm>>,
        rail_freight_forms: Arc<dyn FormStore<RailFreightForm>>,
        auth: AuthConfig,
    ) -> Self {
        Self {
            cache,
            origin_forms,
            rail_freight_forms,
            auth: Arc::new(auth),
        }
    }

    /// Builds state with in-memory stores from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::in_memory(config.cache_options(), &config.jwt_secret)
    }

    /// State with empty in-memory stores.
    pub fn in_memory(options: CacheOptions, jwt_secret: &str) -> Self {
        Self::new(
            CacheManager::new(options),
            Arc::new(InMemoryFormStore::new()),
            Arc::new(InMemoryFormStore::new()),
            AuthConfig::new(jwt_secret),
        )
    }
}

impl FromRef<AppState> for Arc<AuthConfig> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.auth)
    }
}

/// Resolves the store backing a form kind.
pub trait StoreFor<F: FormRecord> {
    fn store(&self) -> Arc<dyn FormStore<F>>;
}

impl StoreFor<OriginForm> for AppState {
    fn store(&self) -> Arc<dyn FormStore<OriginForm>> {
        Arc::clone(&self.origin_forms)
    }
}

impl StoreFor<RailFreightForm> for AppState {
    fn store(&self) -> Arc<dyn FormStore<RailFreightForm>> {
        Arc::clone(&self.rail_freight_forms)
    }
}

// == Cache Policy ==
/// Drops the aggregate list and the owner's list so the next read refetches.
fn invalidate_form_cache<F: FormRecord>(cache: &CacheManager<Value>, owner: &str) {
    info!("Clearing form cache to force refresh on next request");
    cache.delete_cache(F::ALL_FORMS_KEY);
    cache.delete_cache(&owner_cache_key::<F>(owner));
}

/// Serves `key` from the cache when present and fresh, otherwise refreshes
/// it from the store. `force_refresh` always queries.
async fn cached_list<F, Q, Fut>(
    cache: &CacheManager<Value>,
    key: &str,
    force_refresh: bool,
    query: Q,
) -> Result<Value>
where
    F: FormRecord,
    Q: FnOnce() -> Fut,
    Fut: Future<Output = std::result::Result<Vec<F>, StoreError>>,
{
    if !force_refresh && !cache.is_stale(key) {
        if let Some(hit) = cache.get_cache(key) {
            debug!("Cache hit for '{}' (version {})", key, hit.metadata.version);
            return Ok(hit.data);
        }
    }

    debug!("Getting fresh data for '{}' from the store", key);
    cache
        .refresh_cache(
            key,
            move || async move {
                let forms = query().await?;
                Ok::<_, ApiError>(serde_json::to_value(forms)?)
            },
            None,
        )
        .await
}

// == Form Handlers ==
/// Handler for POST /create
pub async fn create_form<F>(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<F::Input>,
) -> Result<impl IntoResponse>
where
    F: FormRecord,
    AppState: StoreFor<F>,
{
    let form = F::create(input, &user.id)?;
    let form = state.store().insert(form).await?;

    invalidate_form_cache::<F>(&state.cache, &user.id);

    Ok((StatusCode::CREATED, Json(CreatedResponse::new(form))))
}

/// Loads a form and checks that `user` owns it.
async fn owned_form<F>(state: &AppState, id: Uuid, user: &AuthUser) -> Result<F>
where
    F: FormRecord,
    AppState: StoreFor<F>,
{
    let form = state
        .store()
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Form".to_string()))?;

    if form.owner() != user.id {
        return Err(ApiError::Forbidden);
    }
    Ok(form)
}

/// Handler for PUT /:id
pub async fn edit_form<F>(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(input): Json<F::Input>,
) -> Result<Json<F>>
where
    F: FormRecord,
    AppState: StoreFor<F>,
{
    let mut form: F = owned_form(&state, id, &user).await?;
    form.apply(input)?;

    let form = state
        .store()
        .update(form)
        .await?
        .ok_or_else(|| ApiError::NotFound("Form".to_string()))?;

    invalidate_form_cache::<F>(&state.cache, &user.id);

    Ok(Json(form))
}

/// Handler for DELETE /:id
pub async fn delete_form<F>(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>>
where
    F: FormRecord,
    AppState: StoreFor<F>,
{
    let form: F = owned_form(&state, id, &user).await?;
    state.store().delete(form.id()).await?;

    invalidate_form_cache::<F>(&state.cache, &user.id);

    Ok(Json(MessageResponse::new("Form deleted")))
}

/// Handler for GET /all
pub async fn list_all_forms<F>(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse>
where
    F: FormRecord,
    AppState: StoreFor<F>,
{
    let store = state.store();
    let forms = cached_list::<F, _, _>(
        &state.cache,
        F::ALL_FORMS_KEY,
        query.force_refresh(),
        || async move { store.find_all().await },
    )
    .await?;

    Ok((NO_STORE_HEADERS, Json(forms)))
}

/// Handler for GET /user
pub async fn list_user_forms<F>(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse>
where
    F: FormRecord,
    AppState: StoreFor<F>,
{
    let store = state.store();
    let key = owner_cache_key::<F>(&user.id);
    let owner = user.id;
    let forms = cached_list::<F, _, _>(&state.cache, &key, query.force_refresh(), || async move {
        store.find_by_owner(&owner).await
    })
    .await?;

    Ok((NO_STORE_HEADERS, Json(forms)))
}

// == Operational Handlers ==
/// Handler for GET /cache/stats
pub async fn cache_stats_handler(State(state): State<AppState>) -> Json<CacheStatsResponse> {
    Json(CacheStatsResponse::new(
        state.cache.stats(),
        state.cache.pending_retries(),
        state.cache.all_metadata(),
    ))
}

/// Handler for POST /cache/flush
pub async fn flush_cache_handler(
    State(state): State<AppState>,
    user: AuthUser,
) -> Json<FlushResponse> {
    info!("Cache flush requested by '{}'", user.id);
    Json(FlushResponse {
        flushed: state.cache.flush_cache(),
    })
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreErrorKind;
    use crate::forms::OriginFormInput;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn state() -> AppState {
        AppState::in_memory(CacheOptions::default(), "test-secret")
    }

    fn user(id: &str) -> AuthUser {
        AuthUser { id: id.to_string() }
    }

    fn origin_input(por: &str) -> OriginFormInput {
        OriginFormInput {
            por: Some(por.to_string()),
            pol: Some("Shanghai".to_string()),
            shipping_lines: Some("Maersk".to_string()),
            container_type: Some("40HQ".to_string()),
            ..OriginFormInput::default()
        }
    }

    async fn seed(state: &AppState, owner: &str, por: &str) -> OriginForm {
        let form = OriginForm::create(origin_input(por), owner).unwrap();
        state.origin_forms.insert(form).await.unwrap()
    }

    #[tokio::test]
    async fn test_cached_list_serves_hit_without_querying() {
        let state = state();
        let calls = AtomicUsize::new(0);
        seed(&state, "u1", "A").await;

        for _ in 0..3 {
            let value = cached_list::<OriginForm, _, _>(&state.cache, "all_forms", false, || {
                calls.fetch_add(1, Ordering::SeqCst);
                state.origin_forms.find_all()
            })
            .await
            .unwrap();
            assert_eq!(value.as_array().unwrap().len(), 1);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(state.cache.metadata("all_forms").unwrap().version, 1);
    }

    #[tokio::test]
    async fn test_cached_list_force_refresh_always_queries() {
        let state = state();
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            cached_list::<OriginForm, _, _>(&state.cache, "all_forms", true, || {
                calls.fetch_add(1, Ordering::SeqCst);
                state.origin_forms.find_all()
            })
            .await
            .unwrap();
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(state.cache.metadata("all_forms").unwrap().version, 2);
    }

    #[tokio::test]
    async fn test_cached_list_refetches_when_stale() {
        let options = CacheOptions {
            max_age: std::time::Duration::from_millis(0),
            ..CacheOptions::default()
        };
        let state = AppState::in_memory(options, "test-secret");
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            cached_list::<OriginForm, _, _>(&state.cache, "all_forms", false, || {
                calls.fetch_add(1, Ordering::SeqCst);
                state.origin_forms.find_all()
            })
            .await
            .unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_cached_list_store_failure_keeps_prior_value() {
        let state = state();
        state.cache.set_cache("all_forms", serde_json::json!(["prior"]), None);

        let result = cached_list::<OriginForm, _, _>(&state.cache, "all_forms", true, || async {
            Err(StoreError::unavailable("connection refused"))
        })
        .await;

        assert!(matches!(
            result,
            Err(ApiError::Store(StoreError {
                kind: StoreErrorKind::Unavailable,
                ..
            }))
        ));
        assert_eq!(
            state.cache.get_cache("all_forms").unwrap().data,
            serde_json::json!(["prior"])
        );
    }

    #[tokio::test]
    async fn test_create_invalidates_aggregate_and_owner_keys() {
        let state = state();
        state.cache.set_cache("all_forms", serde_json::json!([]), None);
        state.cache.set_cache("user_forms_u1", serde_json::json!([]), None);

        let result = create_form::<OriginForm>(
            State(state.clone()),
            user("u1"),
            Json(origin_input("Wuhan")),
        )
        .await;
        assert!(result.is_ok());

        assert!(state.cache.get_cache("all_forms").is_none());
        assert!(state.cache.get_cache("user_forms_u1").is_none());
        assert_eq!(state.cache.metadata("all_forms").unwrap().version, 2);
        assert_eq!(state.cache.metadata("user_forms_u1").unwrap().version, 2);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_body() {
        let state = state();

        let result = create_form::<OriginForm>(
            State(state.clone()),
            user("u1"),
            Json(OriginFormInput::default()),
        )
        .await;

        assert!(matches!(result, Err(ApiError::InvalidRequest(_))));
        assert!(state.cache.metadata("all_forms").is_none());
    }

    #[tokio::test]
    async fn test_edit_checks_ownership() {
        let state = state();
        let form = seed(&state, "owner", "A").await;

        let result = edit_form::<OriginForm>(
            State(state.clone()),
            user("intruder"),
            Path(form.id()),
            Json(OriginFormInput::default()),
        )
        .await;

        assert!(matches!(result, Err(ApiError::Forbidden)));
        assert!(state.cache.metadata("all_forms").is_none());
    }

    #[tokio::test]
    async fn test_edit_missing_form() {
        let state = state();

        let result = edit_form::<OriginForm>(
            State(state),
            user("u1"),
            Path(Uuid::new_v4()),
            Json(OriginFormInput::default()),
        )
        .await;

        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_edit_updates_and_invalidates() {
        let state = state();
        let form = seed(&state, "u1", "A").await;

        let Json(updated) = edit_form::<OriginForm>(
            State(state.clone()),
            user("u1"),
            Path(form.id()),
            Json(OriginFormInput {
                toll: Some("35".to_string()),
                ..OriginFormInput::default()
            }),
        )
        .await
        .unwrap();

        assert_eq!(updated.toll.as_deref(), Some("35"));
        assert_eq!(state.cache.metadata("user_forms_u1").unwrap().version, 1);
    }

    #[tokio::test]
    async fn test_delete_removes_and_invalidates() {
        let state = state();
        let form = seed(&state, "u1", "A").await;

        let result = delete_form::<OriginForm>(State(state.clone()), user("u1"), Path(form.id()))
            .await
            .unwrap();

        assert_eq!(result.message, "Form deleted");
        assert!(state.origin_forms.find_by_id(form.id()).await.unwrap().is_none());
        assert_eq!(state.cache.metadata("all_forms").unwrap().version, 1);
    }

    #[tokio::test]
    async fn test_flush_handler() {
        let state = state();
        state.cache.set_cache("all_forms", serde_json::json!([]), None);

        let response = flush_cache_handler(State(state.clone()), user("u1")).await;

        assert!(response.flushed);
        assert!(state.cache.all_metadata().is_empty());
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }
}
