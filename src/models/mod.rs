//! Request and Response models for the forms API
//!
//! DTOs for query strings and the operational endpoints. Form bodies live
//! with their form kinds in `crate::forms`.

pub mod requests;
pub mod responses;

pub use requests::ListQuery;
pub use responses::{
    CacheStatsResponse, CreatedResponse, FlushResponse, HealthResponse, MessageResponse,
};
