//! Request extractors.
//!
//! - [`auth::AuthUser`] -- the authenticated caller, from a JWT Bearer token.
//! - [`extract::AppJson`], [`extract::AppPath`] -- body and path extraction
//!   with JSON error responses.
//!
//! Role and ownership checks are not done here: handlers hand the caller to
//! the workflow, which applies `eventreg_core::roles::authorize` per action.

pub mod auth;
pub mod extract;
