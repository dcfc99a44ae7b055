//! Storage abstraction for rides.
//!
//! The lifecycle service only talks to storage through [`RideStore`], so the
//! PostgreSQL repository and the in-memory store are interchangeable.

use std::collections::HashMap;

use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::RideError;
use crate::models::Ride;

/// Errors reported by a ride store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The ride changed (or vanished) since it was read.
    #[error("Ride version conflict")]
    Conflict,

    #[error("{0}")]
    Backend(String),
}

impl From<StoreError> for RideError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict => RideError::ConcurrentModification,
            StoreError::Backend(msg) => RideError::Store(msg),
        }
    }
}

/// Selection criteria for listing rides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RideFilter {
    /// Exact match on the creator id.
    pub creator_id: Option<String>,
    /// Case-insensitive literal substring of the pickup location.
    pub pickup_contains: Option<String>,
    /// Case-insensitive literal substring of the destination.
    pub destination_contains: Option<String>,
    /// Skip rides with no seats left.
    pub exclude_full: bool,
}

impl RideFilter {
    /// Matches every ride.
    pub fn all() -> Self {
        Self::default()
    }

    /// Matches rides offered by `creator_id`.
    pub fn by_creator(creator_id: impl Into<String>) -> Self {
        Self {
            creator_id: Some(creator_id.into()),
            ..Self::default()
        }
    }

    /// Matches rides whose pickup and destination contain the given text.
    pub fn route(
        pickup: impl Into<String>,
        destination: impl Into<String>,
        exclude_full: bool,
    ) -> Self {
        Self {
            pickup_contains: Some(pickup.into()),
            destination_contains: Some(destination.into()),
            exclude_full,
            ..Self::default()
        }
    }

    /// Evaluates the filter against a ride.
    pub fn matches(&self, ride: &Ride) -> bool {
        if let Some(ref creator_id) = self.creator_id {
            if &ride.creator_id != creator_id {
                return false;
            }
        }
        if let Some(ref pickup) = self.pickup_contains {
            if !contains_ignore_case(&ride.pickup, pickup) {
                return false;
            }
        }
        if let Some(ref destination) = self.destination_contains {
            if !contains_ignore_case(&ride.destination, destination) {
                return false;
            }
        }
        !(self.exclude_full && ride.is_full)
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Persistence capability for rides.
///
/// One ride is one document: its join requests and passengers are stored
/// with it and written together.
#[async_trait::async_trait]
pub trait RideStore: Send + Sync {
    /// Persist a new ride.
    async fn insert(&self, ride: &Ride) -> Result<(), StoreError>;

    /// Rides matching `filter`, newest `created_at` first.
    async fn find(&self, filter: &RideFilter) -> Result<Vec<Ride>, StoreError>;

    /// Look up one ride.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Ride>, StoreError>;

    /// Write back the mutable state of a ride read earlier.
    ///
    /// Only `seats_available`, `is_full`, `pending_join_requests`,
    /// `joined_users` and `updated_at` are persisted; the offer itself
    /// (creator, route, time, notes, `created_at`) is immutable once
    /// inserted and may be ignored by implementations.
    ///
    /// Succeeds only if the stored version still equals `ride.version`, and
    /// returns the stored ride with its version bumped. Otherwise fails with
    /// [`StoreError::Conflict`].
    async fn save(&self, ride: &Ride) -> Result<Ride, StoreError>;

    /// Remove a ride. Returns whether anything was removed.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Check that the store is reachable.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// In-memory ride store for development and testing.
#[derive(Debug, Default)]
pub struct InMemoryRideStore {
    rides: RwLock<HashMap<Uuid, Ride>>,
    /// Whether to simulate failures for testing.
    simulate_failure: bool,
}

impl InMemoryRideStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store whose every operation fails.
    pub fn failing() -> Self {
        Self {
            rides: RwLock::default(),
            simulate_failure: true,
        }
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.simulate_failure {
            tracing::warn!("In-memory ride store simulating failure");
            return Err(StoreError::Backend("Simulated failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl RideStore for InMemoryRideStore {
    async fn insert(&self, ride: &Ride) -> Result<(), StoreError> {
        self.check()?;
        self.rides.write().await.insert(ride.id, ride.clone());
        Ok(())
    }

    async fn find(&self, filter: &RideFilter) -> Result<Vec<Ride>, StoreError> {
        self.check()?;
        let rides = self.rides.read().await;
        let mut matching: Vec<Ride> = rides
            .values()
            .filter(|ride| filter.matches(ride))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matching)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Ride>, StoreError> {
        self.check()?;
        Ok(self.rides.read().await.get(&id).cloned())
    }

    async fn save(&self, ride: &Ride) -> Result<Ride, StoreError> {
        self.check()?;
        let mut rides = self.rides.write().await;
        let stored = rides.get_mut(&ride.id).ok_or(StoreError::Conflict)?;
        if stored.version != ride.version {
            return Err(StoreError::Conflict);
        }

        let mut updated = ride.clone();
        updated.version += 1;
        *stored = updated.clone();
        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        self.check()?;
        Ok(self.rides.write().await.remove(&id).is_some())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.check()
    }
}
