//! Data Model
//!
//! Shapes exchanged with the Ponyracer API and the live race channel:
//! - `Pony` / `PonyWithPosition`: roster entries and their live positions
//! - `Race` / `LiveRaceUpdate`: race snapshots and streamed replacements
//! - `User` / `ScoreHistoryEntry`: session and money history

mod pony;
mod race;
mod user;

pub use pony::{EntityId, Pony, PonyColor, PonyId, PonyWithPosition};
pub use race::{race_channel, LiveRaceUpdate, Race, RaceId, RaceStatus};
pub use user::{Credentials, RegistrationRequest, ScoreHistoryEntry, User};
