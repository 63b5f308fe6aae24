//! 统一错误体系
//!
//! - [`ErrorCode`]: numeric codes shared with every client
//! - [`ErrorCategory`]: code ranges (order / payment / menu / table / system)
//! - [`AppError`]: code + message + optional details, rendered by axum
//! - [`ApiResponse`]: the JSON error body
//!
//! ```
//! use shared::error::{AppError, ErrorCode, ApiResponse};
//!
//! let err = AppError::with_message(ErrorCode::TableNotFound, "Table not found: 9")
//!     .with_detail("tableId", 9);
//! let body = ApiResponse::from(&err);
//! assert_eq!(body.code, 7001);
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{ApiResponse, AppError, AppResult};
