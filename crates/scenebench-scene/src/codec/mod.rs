//! Scene-description text codec
//!
//! - [`encode`]: typed scene → text (lossless for every generated field)
//! - [`decode`]: any text → best-effort object list (never fails)
//! - [`validate_syntax`]: optional strict check of the minimal contract

mod decoder;
mod encoder;

pub use decoder::{decode, DecodedObject};
pub use encoder::{encode, encode_objects};

use crate::error::SyntaxError;

/// Version header every valid scene text starts with
pub const VERSION_HEADER: &str = "#usda";

/// Strict syntax check: version header plus at least one prim declaration
///
/// # Errors
///
/// Returns the first [`SyntaxError`] found.
pub fn validate_syntax(text: &str) -> Result<(), SyntaxError> {
    if text.trim().is_empty() {
        return Err(SyntaxError::Empty);
    }
    if !text.trim_start().starts_with(VERSION_HEADER) {
        return Err(SyntaxError::MissingVersionHeader);
    }
    if !text.lines().any(|line| decoder::DECLARATION.is_match(line)) {
        return Err(SyntaxError::NoPrimDeclaration);
    }
    Ok(())
}
