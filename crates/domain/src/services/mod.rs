//! Domain services for the rideshare backend.
//!
//! Services contain business logic that operates on domain models.

pub mod ride_store;
pub mod rides;

pub use ride_store::{InMemoryRideStore, RideFilter, RideStore, StoreError};
pub use rides::{CreatorIdPolicy, RideService, RideServiceOptions};
