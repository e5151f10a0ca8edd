//! Validation functionality
//!
//! Provides validation logic for:
//! - Document structure (tags, allowed children, coercible attribute values)
//! - Entity field values (lengths, coordinate ranges)

pub mod entity;
pub mod schema;

pub use entity::{EntityValidationError, EntityValidator, validate_entity};
pub use schema::validate_tree;
