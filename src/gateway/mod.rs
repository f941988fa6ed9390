//! Backend Gateways
//!
//! The live race core talks to the backend through two narrow seams:
//! - [`RaceGateway`]: request/response race operations (REST)
//! - [`StreamingGateway`]: push subscriptions on a named channel (STOMP)
//!
//! Concrete implementations live in [`http`] and [`stomp`]; tests plug in
//! fakes behind the same traits.

mod error;
pub mod http;
pub mod stomp;

pub use error::{GatewayError, GatewayResult};
pub use http::HttpGateway;
pub use stomp::{StompConnection, StompFrame, StompGateway};

use async_trait::async_trait;

use crate::models::{LiveRaceUpdate, PonyId, Race, RaceId, RaceStatus};

/// Request/response operations on races
#[async_trait]
pub trait RaceGateway: Send + Sync {
    /// List the races in the given status
    async fn list(&self, status: RaceStatus) -> GatewayResult<Vec<Race>>;

    /// Fetch one race snapshot
    async fn get(&self, race_id: &RaceId) -> GatewayResult<Race>;

    /// Bet on a pony; returns the updated race
    async fn place_bet(&self, race_id: &RaceId, pony_id: &PonyId) -> GatewayResult<Race>;

    /// Withdraw the current bet on a race
    async fn cancel_bet(&self, race_id: &RaceId) -> GatewayResult<()>;

    /// Boost a running pony
    async fn boost(&self, race_id: &RaceId, pony_id: &PonyId) -> GatewayResult<()>;
}

/// Callback invoked for every message of a subscription
pub type UpdateHandler = Box<dyn FnMut(LiveRaceUpdate) + Send + 'static>;

/// Push subscriptions on named channels
pub trait StreamingGateway: Send + Sync {
    /// Open a subscription on `channel`
    ///
    /// Failing to open is reported synchronously. Once this returns, the
    /// handler may be invoked from another task until the connection is
    /// disconnected.
    fn subscribe(&self, channel: &str, on_message: UpdateHandler) -> GatewayResult<Box<dyn Connection>>;
}

/// Handle on an open subscription
pub trait Connection: Send {
    /// Close the subscription; consumes the handle so it can only happen once
    fn disconnect(self: Box<Self>);
}
