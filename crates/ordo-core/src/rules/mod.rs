//! Validation and invariant rules for sibling sets

pub mod invariants;
pub mod validation;

pub use validation::{validate_optional_position, validate_position};
pub use invariants::{check_sibling_set, is_dense};
