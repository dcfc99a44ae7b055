//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod ride;

pub use ride::RideEntity;
