//! # Ponyracer
//!
//! Client for the Ponyracer betting game: race listing, bets, user sessions
//! and live race tracking.
//!
//! ## Features
//!
//! - **REST client**: races, bets, boosts and accounts over HTTP
//! - **Live races**: STOMP-over-WebSocket subscription per race
//! - **Reconciliation**: every streamed update replaces the running ponies
//! - **Boost gesture**: five quick clicks on a pony boost it
//!
//! ## Modules
//!
//! - [`models`]: races, ponies, users
//! - [`gateway`]: backend seams and their HTTP/STOMP implementations
//! - [`live`]: live race controller, boost detection, view mapping
//! - [`session`]: logged-in user shared by all requests
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ponyracer::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default();
//!     let session = Session::restore(config.session.path())?;
//!
//!     let races = Arc::new(HttpGateway::new((&config.api).into(), session)?);
//!     let stream = Arc::new(StompGateway::new(config.stream.url.clone()));
//!
//!     let live = LiveRaceController::new(RaceId::from(12), races, stream, config.live.boost());
//!     live.load().await?;
//!
//!     let mut changes = live.watch();
//!     loop {
//!         let state = changes.borrow_and_update().clone();
//!         for row in state.pony_rows() {
//!             println!("{} at {}", row.pony.name, row.margin_left);
//!         }
//!         if state.is_finished() || changes.changed().await.is_err() {
//!             break;
//!         }
//!     }
//!
//!     live.unmount();
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod gateway;
pub mod live;
pub mod models;
pub mod session;
pub mod utils;

// Re-export top-level types for convenience
pub use config::{Config, ConfigError, LoggingConfig};

pub use gateway::{
    Connection, GatewayError, GatewayResult, HttpGateway, RaceGateway, StompGateway,
    StreamingGateway, UpdateHandler,
};

pub use live::{
    BetOutcome, BoostConfig, BoostDetector, LiveError, LivePhase, LiveRaceController,
    LiveRaceState, PonyRow,
};

pub use models::{
    Credentials, LiveRaceUpdate, Pony, PonyColor, PonyId, PonyWithPosition, Race, RaceId,
    RaceStatus, RegistrationRequest, ScoreHistoryEntry, User,
};

pub use session::{Session, SessionError};
