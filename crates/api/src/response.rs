//! Shared response envelope types for API handlers.
//!
//! Every outcome, success or failure, is wrapped in the same
//! `{ "code": 0 | non-zero, "msg": ..., "data": ... }` envelope. Use
//! [`ApiResponse::ok`] instead of ad-hoc `serde_json::json!` so success
//! payloads get compile-time type safety and consistent serialization.

use serde::Serialize;

/// Envelope code space. `0` is success; everything else names a failure
/// category mirrored by [`crate::error::AppError`].
pub mod codes {
    pub const OK: i32 = 0;
    pub const ACCESS_DENIED: i32 = 1001;
    pub const VALIDATION: i32 = 1002;
    pub const NOT_FOUND: i32 = 1003;
    pub const CONFLICT: i32 = 1004;
    pub const SERVER_ERROR: i32 = 1500;
}

/// Standard `{ "code": ..., "msg": ..., "data": ... }` response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub code: i32,
    pub msg: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Wrap a success payload.
    pub fn ok(data: T) -> Self {
        Self {
            code: codes::OK,
            msg: "ok".to_string(),
            data: Some(data),
        }
    }
}
