//! Live Race
//!
//! Client-side tracking of one race while it is watched:
//! - [`LiveRaceController`]: snapshot load, live subscription, teardown
//! - [`BoostDetector`]: rapid-click boost gesture
//! - [`presentation`]: pure view mapping (offsets, winners, bet outcome)

mod boost;
mod controller;
pub mod presentation;

pub use boost::{BoostConfig, BoostDetector};
pub use controller::{
    LivePhase, LiveRaceController, LiveRaceState, BOOST_ERROR_MESSAGE, LIVE_ERROR_MESSAGE,
};
pub use presentation::{BetOutcome, PonyRow};

use thiserror::Error;

use crate::gateway::GatewayError;
use crate::models::RaceId;

/// Failures that prevent a live race view from being shown
///
/// Streaming and boost failures are not reported here; they become the
/// dismissible [`LiveRaceState::error_message`].
#[derive(Debug, Error)]
pub enum LiveError {
    #[error("Failed to load race {race_id}: {source}")]
    Load {
        race_id: RaceId,
        #[source]
        source: GatewayError,
    },

    #[error("Race already loaded")]
    AlreadyLoaded,
}
