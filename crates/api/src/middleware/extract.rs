//! Body and path extractors whose rejections use the `AppError` JSON shape.
//!
//! axum's own `Json` and `Path` reject malformed input with a plain-text
//! body. These wrappers run the same extraction and convert the rejection
//! into [`AppError::BadRequest`].

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::AppError;

/// JSON request body. Use in place of `axum::Json` for handler inputs.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Path parameters. Use in place of `axum::extract::Path`.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);
