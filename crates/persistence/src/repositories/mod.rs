//! Repository implementations.

pub mod ride;

pub use ride::RideRepository;
