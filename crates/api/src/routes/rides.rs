//! Ride endpoint handlers.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use domain::models::{
    CreateRideRequest, FindRidesRequest, JoinRideRequest, JoinRideResponse, MessageResponse, Ride,
    RideMessageResponse,
};
use domain::RideError;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::{record_join_decision, record_join_request, record_ride_created};

/// An id that does not parse cannot name a stored ride.
fn parse_ride_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| RideError::RideNotFound.into())
}

fn parse_request_index(raw: &str) -> Result<usize, ApiError> {
    raw.parse::<usize>()
        .map_err(|_| RideError::JoinRequestNotFound.into())
}

fn parse_request_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| RideError::JoinRequestNotFound.into())
}

fn decision_response(message: &str, ride: Ride) -> Json<RideMessageResponse> {
    Json(RideMessageResponse {
        message: message.to_string(),
        ride,
    })
}

/// Create a ride.
///
/// POST /api/rides/add
pub async fn create_ride(
    State(state): State<AppState>,
    payload: Result<Json<CreateRideRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RideMessageResponse>), ApiError> {
    let Json(request) = payload?;
    let ride = state.rides.create_ride(request).await?;
    record_ride_created();

    Ok((
        StatusCode::CREATED,
        Json(RideMessageResponse {
            message: "Ride created successfully!".to_string(),
            ride,
        }),
    ))
}

/// List all rides, newest first.
///
/// GET /api/rides
pub async fn list_rides(State(state): State<AppState>) -> Result<Json<Vec<Ride>>, ApiError> {
    Ok(Json(state.rides.list_rides().await?))
}

/// Search rides by pickup and destination text.
///
/// POST /api/rides/find
pub async fn find_rides(
    State(state): State<AppState>,
    payload: Result<Json<FindRidesRequest>, JsonRejection>,
) -> Result<Json<Vec<Ride>>, ApiError> {
    let Json(request) = payload?;
    let rides = state
        .rides
        .find_rides(&request.pickup, &request.destination)
        .await?;
    Ok(Json(rides))
}

/// GET /api/rides/my/:creator_id
pub async fn list_rides_by_creator(
    State(state): State<AppState>,
    Path(creator_id): Path<String>,
) -> Result<Json<Vec<Ride>>, ApiError> {
    Ok(Json(state.rides.list_rides_by_creator(&creator_id).await?))
}

/// GET /api/rides/:ride_id
pub async fn get_ride(
    State(state): State<AppState>,
    Path(ride_id): Path<String>,
) -> Result<Json<Ride>, ApiError> {
    let ride_id = parse_ride_id(&ride_id)?;
    Ok(Json(state.rides.get_ride(ride_id).await?))
}

/// Delete a ride. Unknown ids succeed as well.
///
/// DELETE /api/rides/:ride_id
pub async fn delete_ride(
    State(state): State<AppState>,
    Path(ride_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    if let Ok(ride_id) = Uuid::parse_str(&ride_id) {
        state.rides.delete_ride(ride_id).await?;
    } else {
        tracing::info!(ride_id = %ride_id, "Delete requested for malformed ride id");
    }

    Ok(Json(MessageResponse {
        message: "Ride deleted successfully".to_string(),
    }))
}

/// Ask to join a ride.
///
/// POST /api/rides/:ride_id/request
pub async fn request_join(
    State(state): State<AppState>,
    Path(ride_id): Path<String>,
    payload: Result<Json<JoinRideRequest>, JsonRejection>,
) -> Result<Json<JoinRideResponse>, ApiError> {
    let ride_id = parse_ride_id(&ride_id)?;
    let Json(request) = payload?;
    let join_request = state.rides.request_join(ride_id, request).await?;
    record_join_request();

    Ok(Json(JoinRideResponse {
        message: "Join request sent!".to_string(),
        request: join_request,
    }))
}

/// PATCH /api/rides/:ride_id/accept/:request_index
pub async fn accept_join_request(
    State(state): State<AppState>,
    Path((ride_id, request_index)): Path<(String, String)>,
) -> Result<Json<RideMessageResponse>, ApiError> {
    let ride_id = parse_ride_id(&ride_id)?;
    let request_index = parse_request_index(&request_index)?;
    let ride = state
        .rides
        .accept_join_request(ride_id, request_index)
        .await?;
    record_join_decision("accepted");

    Ok(decision_response("Join request accepted!", ride))
}

/// PATCH /api/rides/:ride_id/reject/:request_index
pub async fn reject_join_request(
    State(state): State<AppState>,
    Path((ride_id, request_index)): Path<(String, String)>,
) -> Result<Json<RideMessageResponse>, ApiError> {
    let ride_id = parse_ride_id(&ride_id)?;
    let request_index = parse_request_index(&request_index)?;
    let ride = state
        .rides
        .reject_join_request(ride_id, request_index)
        .await?;
    record_join_decision("rejected");

    Ok(decision_response("Join request rejected!", ride))
}

/// PATCH /api/rides/:ride_id/requests/:request_id/accept
pub async fn accept_join_request_by_id(
    State(state): State<AppState>,
    Path((ride_id, request_id)): Path<(String, String)>,
) -> Result<Json<RideMessageResponse>, ApiError> {
    let ride_id = parse_ride_id(&ride_id)?;
    let request_id = parse_request_id(&request_id)?;
    let ride = state
        .rides
        .accept_join_request_by_id(ride_id, request_id)
        .await?;
    record_join_decision("accepted");

    Ok(decision_response("Join request accepted!", ride))
}

/// PATCH /api/rides/:ride_id/requests/:request_id/reject
pub async fn reject_join_request_by_id(
    State(state): State<AppState>,
    Path((ride_id, request_id)): Path<(String, String)>,
) -> Result<Json<RideMessageResponse>, ApiError> {
    let ride_id = parse_ride_id(&ride_id)?;
    let request_id = parse_request_id(&request_id)?;
    let ride = state
        .rides
        .reject_join_request_by_id(ride_id, request_id)
        .await?;
    record_join_decision("rejected");

    Ok(decision_response("Join request rejected!", ride))
}
