//! Ride entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{Coordinates, JoinRequest, Passenger, Ride};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the rides table.
///
/// Coordinates are split into nullable latitude/longitude columns; join
/// requests and passengers are embedded JSONB arrays.
#[derive(Debug, Clone, FromRow)]
pub struct RideEntity {
    pub id: Uuid,
    pub creator_id: String,
    pub name: String,
    pub contact: String,
    pub pickup: String,
    pub destination: String,
    pub pickup_lat: Option<f64>,
    pub pickup_lng: Option<f64>,
    pub destination_lat: Option<f64>,
    pub destination_lng: Option<f64>,
    pub datetime: DateTime<Utc>,
    pub seats_available: i32,
    pub notes: Option<String>,
    pub is_full: bool,
    pub pending_join_requests: Json<Vec<JoinRequest>>,
    pub joined_users: Json<Vec<Passenger>>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Joins a nullable latitude/longitude column pair.
pub fn coordinates(lat: Option<f64>, lng: Option<f64>) -> Option<Coordinates> {
    match (lat, lng) {
        (Some(lat), Some(lng)) => Some(Coordinates { lat, lng }),
        _ => None,
    }
}

impl RideEntity {
    /// Convert to domain model.
    pub fn into_domain(self) -> Ride {
        Ride {
            id: self.id,
            creator_id: self.creator_id,
            name: self.name,
            contact: self.contact,
            pickup: self.pickup,
            destination: self.destination,
            pickup_coords: coordinates(self.pickup_lat, self.pickup_lng),
            destination_coords: coordinates(self.destination_lat, self.destination_lng),
            datetime: self.datetime,
            seats_available: self.seats_available,
            notes: self.notes,
            is_full: self.is_full,
            pending_join_requests: self.pending_join_requests.0,
            joined_users: self.joined_users.0,
            version: self.version,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl From<RideEntity> for Ride {
    fn from(entity: RideEntity) -> Self {
        entity.into_domain()
    }
}
