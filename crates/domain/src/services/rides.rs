//! Ride lifecycle service.
//!
//! Creates, searches and deletes rides and drives the join request state
//! machine. Every mutation is one read-modify-write of a single ride; the
//! write is rejected if the ride changed in between.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use super::ride_store::{RideFilter, RideStore};
use crate::error::RideError;
use crate::models::ride::missing_fields_error;
use crate::models::{CreateRideRequest, JoinRequest, JoinRequestStatus, JoinRideRequest, Ride};

/// Who supplies the creator id of a new ride.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreatorIdPolicy {
    /// The client sends `creatorId`; it is required.
    #[default]
    Client,
    /// The server issues a random 6-digit id and ignores any supplied value.
    Server,
}

/// Behavior switches for [`RideService`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RideServiceOptions {
    pub creator_id_policy: CreatorIdPolicy,
    /// Return full rides from route searches as well.
    pub include_full_in_search: bool,
}

/// Addresses a join request within a ride.
#[derive(Debug, Clone, Copy)]
enum RequestRef {
    Index(usize),
    Id(Uuid),
}

/// The ride lifecycle store.
#[derive(Clone)]
pub struct RideService {
    store: Arc<dyn RideStore>,
    options: RideServiceOptions,
}

impl RideService {
    /// Creates a service over the given store.
    pub fn new(store: Arc<dyn RideStore>, options: RideServiceOptions) -> Self {
        Self { store, options }
    }

    /// Check that the underlying store is reachable.
    pub async fn ping(&self) -> Result<(), RideError> {
        Ok(self.store.ping().await?)
    }

    /// Create and persist a new ride.
    pub async fn create_ride(&self, mut request: CreateRideRequest) -> Result<Ride, RideError> {
        if self.options.creator_id_policy == CreatorIdPolicy::Server {
            request.creator_id = Some(shared::creator_id::generate_creator_id());
        }

        let missing = request.missing_fields();
        if !missing.is_empty() {
            warn!(missing = ?missing, "Ride creation rejected: missing fields");
            return Err(missing_fields_error(&missing));
        }
        request.validate()?;

        let ride = Ride::new(request.into_new_ride()?, Utc::now());
        self.store.insert(&ride).await?;

        info!(
            ride_id = %ride.id,
            creator_id = %ride.creator_id,
            seats = ride.seats_available,
            "Ride created"
        );
        Ok(ride)
    }

    /// All rides, newest first.
    pub async fn list_rides(&self) -> Result<Vec<Ride>, RideError> {
        Ok(self.store.find(&RideFilter::all()).await?)
    }

    /// Rides whose pickup and destination contain the given text.
    pub async fn find_rides(&self, pickup: &str, destination: &str) -> Result<Vec<Ride>, RideError> {
        let filter = RideFilter::route(pickup, destination, !self.options.include_full_in_search);
        Ok(self.store.find(&filter).await?)
    }

    /// Rides offered by one creator, newest first.
    pub async fn list_rides_by_creator(&self, creator_id: &str) -> Result<Vec<Ride>, RideError> {
        Ok(self.store.find(&RideFilter::by_creator(creator_id)).await?)
    }

    /// Look up one ride.
    pub async fn get_ride(&self, ride_id: Uuid) -> Result<Ride, RideError> {
        self.store
            .find_by_id(ride_id)
            .await?
            .ok_or(RideError::RideNotFound)
    }

    /// Delete a ride. Deleting a missing ride is not an error.
    ///
    /// Returns whether a ride was removed.
    pub async fn delete_ride(&self, ride_id: Uuid) -> Result<bool, RideError> {
        let deleted = self.store.delete(ride_id).await?;
        if deleted {
            info!(ride_id = %ride_id, "Ride deleted");
        } else {
            info!(ride_id = %ride_id, "Delete requested for unknown ride");
        }
        Ok(deleted)
    }

    /// File a pending join request on a ride.
    pub async fn request_join(
        &self,
        ride_id: Uuid,
        request: JoinRideRequest,
    ) -> Result<JoinRequest, RideError> {
        let mut ride = self.get_ride(ride_id).await?;

        let missing = request.missing_fields();
        if !missing.is_empty() {
            return Err(missing_fields_error(&missing));
        }
        request.validate()?;

        let join_request = match ride.add_join_request(
            request.name.unwrap_or_default(),
            request.contact.unwrap_or_default(),
            request.message,
            Utc::now(),
        ) {
            Ok(join_request) => join_request.clone(),
            Err(err) => {
                warn!(ride_id = %ride_id, error = %err, "Join request refused");
                return Err(err);
            }
        };

        self.store.save(&ride).await?;

        info!(
            ride_id = %ride_id,
            request_id = %join_request.id,
            "Join request added"
        );
        Ok(join_request)
    }

    /// Accept the join request at `request_index`.
    pub async fn accept_join_request(
        &self,
        ride_id: Uuid,
        request_index: usize,
    ) -> Result<Ride, RideError> {
        self.decide(ride_id, RequestRef::Index(request_index), JoinRequestStatus::Accepted)
            .await
    }

    /// Reject the join request at `request_index`.
    pub async fn reject_join_request(
        &self,
        ride_id: Uuid,
        request_index: usize,
    ) -> Result<Ride, RideError> {
        self.decide(ride_id, RequestRef::Index(request_index), JoinRequestStatus::Rejected)
            .await
    }

    /// Accept the join request with the given id.
    pub async fn accept_join_request_by_id(
        &self,
        ride_id: Uuid,
        request_id: Uuid,
    ) -> Result<Ride, RideError> {
        self.decide(ride_id, RequestRef::Id(request_id), JoinRequestStatus::Accepted)
            .await
    }

    /// Reject the join request with the given id.
    pub async fn reject_join_request_by_id(
        &self,
        ride_id: Uuid,
        request_id: Uuid,
    ) -> Result<Ride, RideError> {
        self.decide(ride_id, RequestRef::Id(request_id), JoinRequestStatus::Rejected)
            .await
    }

    async fn decide(
        &self,
        ride_id: Uuid,
        target: RequestRef,
        decision: JoinRequestStatus,
    ) -> Result<Ride, RideError> {
        let mut ride = self.get_ride(ride_id).await?;

        let index = match target {
            RequestRef::Index(index) => index,
            RequestRef::Id(request_id) => ride
                .request_index(request_id)
                .ok_or(RideError::JoinRequestNotFound)?,
        };

        let now = Utc::now();
        let outcome = match decision {
            JoinRequestStatus::Accepted => ride.accept_request(index, now),
            _ => ride.reject_request(index, now),
        };
        if let Err(err) = outcome {
            warn!(
                ride_id = %ride_id,
                request_index = index,
                decision = %decision,
                error = %err,
                "Join request decision refused"
            );
            return Err(err);
        }

        let saved = match self.store.save(&ride).await {
            Ok(saved) => saved,
            Err(err) => {
                warn!(ride_id = %ride_id, error = %err, "Join request decision not saved");
                return Err(err.into());
            }
        };

        info!(
            ride_id = %ride_id,
            request_index = index,
            decision = %decision,
            seats_available = saved.seats_available,
            is_full = saved.is_full,
            "Join request decided"
        );
        Ok(saved)
    }
}
