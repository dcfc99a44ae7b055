//! Ride domain model.
//!
//! A ride is one offered trip with a number of free seats. Prospective
//! passengers file join requests against it; the offering user accepts or
//! rejects each request exactly once.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use uuid::Uuid;
use validator::Validate;

use crate::error::RideError;

/// Seats offered when the creator does not say otherwise.
pub const DEFAULT_SEATS_AVAILABLE: i32 = 1;

// ============================================================================
// Join Request Status
// ============================================================================

/// Status of a join request.
///
/// `Pending` moves to either `Accepted` or `Rejected`; both are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinRequestStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

impl JoinRequestStatus {
    /// Returns the string representation used in payloads and storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            JoinRequestStatus::Pending => "pending",
            JoinRequestStatus::Accepted => "accepted",
            JoinRequestStatus::Rejected => "rejected",
        }
    }

    /// Check if transition to target status is valid.
    pub fn can_transition_to(&self, target: JoinRequestStatus) -> bool {
        matches!(
            (self, target),
            (JoinRequestStatus::Pending, JoinRequestStatus::Accepted)
                | (JoinRequestStatus::Pending, JoinRequestStatus::Rejected)
        )
    }
}

impl fmt::Display for JoinRequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Core Model
// ============================================================================

/// A latitude/longitude pair. Values are stored as given.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// A confirmed rider on a ride.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passenger {
    pub name: String,
    pub contact: String,
}

/// One user's request to join a ride.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequest {
    pub id: Uuid,
    pub name: String,
    pub contact: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub status: JoinRequestStatus,
    pub created_at: DateTime<Utc>,
}

impl JoinRequest {
    /// Creates a new pending request.
    pub fn new(name: String, contact: String, message: Option<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            contact,
            message,
            status: JoinRequestStatus::Pending,
            created_at: now,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == JoinRequestStatus::Pending
    }
}

/// Validated input for a new ride.
#[derive(Debug, Clone)]
pub struct NewRide {
    pub creator_id: String,
    pub name: String,
    pub contact: String,
    pub pickup: String,
    pub destination: String,
    pub pickup_coords: Option<Coordinates>,
    pub destination_coords: Option<Coordinates>,
    pub datetime: DateTime<Utc>,
    pub seats_available: i32,
    pub notes: Option<String>,
}

/// Represents an offered ride.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ride {
    pub id: Uuid,
    pub creator_id: String,
    pub name: String,
    pub contact: String,
    pub pickup: String,
    pub destination: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickup_coords: Option<Coordinates>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_coords: Option<Coordinates>,
    pub datetime: DateTime<Utc>,
    pub seats_available: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub is_full: bool,
    pub pending_join_requests: Vec<JoinRequest>,
    pub joined_users: Vec<Passenger>,
    /// Store revision used for optimistic concurrency; never leaves the server.
    #[serde(skip)]
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Ride {
    /// Creates a fresh ride with no requests and no passengers.
    pub fn new(input: NewRide, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            creator_id: input.creator_id,
            name: input.name,
            contact: input.contact,
            pickup: input.pickup,
            destination: input.destination,
            pickup_coords: input.pickup_coords,
            destination_coords: input.destination_coords,
            datetime: input.datetime,
            seats_available: input.seats_available,
            notes: input.notes,
            is_full: input.seats_available == 0,
            pending_join_requests: Vec::new(),
            joined_users: Vec::new(),
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns true if `contact` already has a pending request on this ride.
    pub fn has_pending_request_from(&self, contact: &str) -> bool {
        self.pending_join_requests
            .iter()
            .any(|r| r.is_pending() && r.contact == contact)
    }

    /// Position of the request with the given id.
    pub fn request_index(&self, request_id: Uuid) -> Option<usize> {
        self.pending_join_requests
            .iter()
            .position(|r| r.id == request_id)
    }

    /// Appends a pending join request.
    ///
    /// Full rides still take requests; only a pending request from the same
    /// contact blocks a new one.
    pub fn add_join_request(
        &mut self,
        name: String,
        contact: String,
        message: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<&JoinRequest, RideError> {
        if self.has_pending_request_from(&contact) {
            return Err(RideError::DuplicateRequest);
        }

        self.pending_join_requests
            .push(JoinRequest::new(name, contact, message, now));
        self.updated_at = now;

        Ok(&self.pending_join_requests[self.pending_join_requests.len() - 1])
    }

    /// Accepts the request at `index`, seating its sender.
    ///
    /// At zero seats the request is still accepted and the passenger still
    /// added; the seat counter stays at zero.
    pub fn accept_request(&mut self, index: usize, now: DateTime<Utc>) -> Result<(), RideError> {
        let request = self.transition(index, JoinRequestStatus::Accepted)?;
        let passenger = Passenger {
            name: request.name.clone(),
            contact: request.contact.clone(),
        };

        self.joined_users.push(passenger);
        if self.seats_available > 0 {
            self.seats_available -= 1;
        }
        self.is_full = self.seats_available == 0;
        self.updated_at = now;

        Ok(())
    }

    /// Rejects the request at `index`. Seats and passengers are untouched.
    pub fn reject_request(&mut self, index: usize, now: DateTime<Utc>) -> Result<(), RideError> {
        self.transition(index, JoinRequestStatus::Rejected)?;
        self.updated_at = now;
        Ok(())
    }

    fn transition(
        &mut self,
        index: usize,
        target: JoinRequestStatus,
    ) -> Result<&JoinRequest, RideError> {
        let request = self
            .pending_join_requests
            .get_mut(index)
            .ok_or(RideError::JoinRequestNotFound)?;

        if !request.status.can_transition_to(target) {
            return Err(RideError::InvalidTransition(request.status));
        }

        request.status = target;
        Ok(request)
    }
}

// ============================================================================
// Request DTOs
// ============================================================================

/// Coordinates as clients send them; either half may be absent or null.
#[derive(Debug, Default, Deserialize)]
struct PartialCoordinates {
    lat: Option<f64>,
    lng: Option<f64>,
}

/// Keeps a coordinate pair only when both halves are present.
fn lenient_coordinates<'de, D>(deserializer: D) -> Result<Option<Coordinates>, D::Error>
where
    D: Deserializer<'de>,
{
    let partial = Option::<PartialCoordinates>::deserialize(deserializer)?;
    Ok(partial.and_then(|c| match (c.lat, c.lng) {
        (Some(lat), Some(lng)) => Some(Coordinates { lat, lng }),
        _ => None,
    }))
}

const LOCAL_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parses a departure time.
///
/// RFC 3339 timestamps keep their offset. Zone-less date-times (as sent by
/// `datetime-local` inputs) and bare dates are read as UTC.
pub fn parse_departure_time(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    LOCAL_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}

fn lenient_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) => parse_departure_time(&raw)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid datetime: {}", raw))),
    }
}

/// Request payload for creating a ride.
///
/// Required fields are optional here so that a missing field is reported as
/// a validation error rather than a body parse failure.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRideRequest {
    #[validate(length(max = 100, message = "name must be at most 100 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 100, message = "contact must be at most 100 characters"))]
    pub contact: Option<String>,

    #[validate(length(max = 200, message = "pickup must be at most 200 characters"))]
    pub pickup: Option<String>,

    #[validate(length(max = 200, message = "destination must be at most 200 characters"))]
    pub destination: Option<String>,

    #[serde(default, deserialize_with = "lenient_datetime")]
    pub datetime: Option<DateTime<Utc>>,

    #[validate(range(min = 1, message = "seatsAvailable must be at least 1"))]
    pub seats_available: Option<i32>,

    #[validate(length(max = 1000, message = "notes must be at most 1000 characters"))]
    pub notes: Option<String>,

    #[serde(default, deserialize_with = "lenient_coordinates")]
    pub pickup_coords: Option<Coordinates>,

    #[serde(default, deserialize_with = "lenient_coordinates")]
    pub destination_coords: Option<Coordinates>,

    #[validate(length(max = 100, message = "creatorId must be at most 100 characters"))]
    pub creator_id: Option<String>,
}

impl CreateRideRequest {
    /// Names of required fields that are absent or blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = shared::validation::missing_fields(&[
            ("name", self.name.as_deref()),
            ("contact", self.contact.as_deref()),
            ("pickup", self.pickup.as_deref()),
            ("destination", self.destination.as_deref()),
            ("creatorId", self.creator_id.as_deref()),
        ]);
        if self.datetime.is_none() {
            missing.push("datetime");
        }
        missing
    }

    /// Converts the request into ride input, failing on absent required fields.
    pub fn into_new_ride(self) -> Result<NewRide, RideError> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(missing_fields_error(&missing));
        }

        Ok(NewRide {
            creator_id: self.creator_id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            contact: self.contact.unwrap_or_default(),
            pickup: self.pickup.unwrap_or_default(),
            destination: self.destination.unwrap_or_default(),
            pickup_coords: self.pickup_coords,
            destination_coords: self.destination_coords,
            datetime: self.datetime.unwrap_or_default(),
            seats_available: self.seats_available.unwrap_or(DEFAULT_SEATS_AVAILABLE),
            notes: self.notes,
        })
    }
}

/// Request payload for joining a ride.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct JoinRideRequest {
    #[validate(length(max = 100, message = "name must be at most 100 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 100, message = "contact must be at most 100 characters"))]
    pub contact: Option<String>,

    #[validate(length(max = 500, message = "message must be at most 500 characters"))]
    pub message: Option<String>,
}

impl JoinRideRequest {
    /// Names of required fields that are absent or blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        shared::validation::missing_fields(&[
            ("name", self.name.as_deref()),
            ("contact", self.contact.as_deref()),
        ])
    }
}

/// Request payload for searching rides by route.
///
/// Absent values match every ride.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindRidesRequest {
    #[serde(default)]
    pub pickup: String,
    #[serde(default)]
    pub destination: String,
}

/// Builds the validation error reported for absent required fields.
pub fn missing_fields_error(missing: &[&str]) -> RideError {
    RideError::Validation(format!("Missing required fields: {}", missing.join(", ")))
}

// ============================================================================
// Response DTOs
// ============================================================================

/// Plain acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Acknowledgement carrying the affected ride.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RideMessageResponse {
    pub message: String,
    pub ride: Ride,
}

/// Acknowledgement for a join request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRideResponse {
    pub message: String,
    pub request: JoinRequest,
}

// ============================================================================
// Tests
// ============================================================================
