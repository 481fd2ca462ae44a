//! HTTP request, response and error types

pub mod error;
pub mod json;
pub mod translate;

pub use error::{ApiError, ApiErrorResponse, ApiErrorType};
pub use json::Json;
pub use translate::{TranslateRequest, TranslateResponse};
