//! URL handling module for Rummage
//!
//! Pure helpers for validating, resolving, normalizing and filtering URLs.
//! Nothing here performs I/O; invalid inputs yield `false`/`None` rather
//! than errors.

mod matcher;
mod normalize;
mod validate;

pub use matcher::{is_backward_link, matches_paths};
pub use normalize::{normalize, normalize_str};
pub use validate::{is_relative_url, is_valid_absolute_url, resolve};
