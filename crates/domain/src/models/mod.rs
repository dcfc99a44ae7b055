//! Domain models for the rideshare backend.

pub mod ride;

pub use ride::{
    Coordinates, CreateRideRequest, FindRidesRequest, JoinRequest, JoinRequestStatus,
    JoinRideRequest, JoinRideResponse, MessageResponse, NewRide, Passenger, Ride,
    RideMessageResponse,
};
