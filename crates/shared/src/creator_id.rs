//! Creator id generation.
//!
//! A creator id is an opaque token identifying the user who offered a ride.
//! When the server is configured to issue them, they are random 6-digit
//! numeric strings.

use rand::Rng;

/// Smallest creator id the server will issue.
pub const CREATOR_ID_MIN: u32 = 100_000;

/// Largest creator id the server will issue.
pub const CREATOR_ID_MAX: u32 = 999_999;

/// Generate a random 6-digit numeric creator id.
///
/// Ids are not guaranteed to be unique; they only group rides for listing.
pub fn generate_creator_id() -> String {
    let mut rng = rand::thread_rng();
    rng.gen_range(CREATOR_ID_MIN..=CREATOR_ID_MAX).to_string()
}

/// Returns true if the value has the shape of a server-issued creator id.
pub fn is_generated_creator_id(value: &str) -> bool {
    value.len() == 6
        && value.bytes().all(|b| b.is_ascii_digit())
        && !value.starts_with('0')
}
