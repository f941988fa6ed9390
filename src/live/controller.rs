//! Live Race Controller
//!
//! Drives one watched race through `Loading -> Pending/Running -> Finished`.
//! The controller loads a snapshot, subscribes to `/race/{id}` unless the race
//! is already over, replaces the running ponies with every streamed update,
//! and closes the subscription exactly once: on the `FINISHED` update or on
//! teardown, whichever comes first.
//!
//! State is published through a `tokio::sync::watch` channel so any view can
//! read it ([`LiveRaceController::state`]) or await changes
//! ([`LiveRaceController::watch`]).

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::watch;

use super::boost::{BoostConfig, BoostDetector};
use super::presentation::{self, BetOutcome, PonyRow};
use super::LiveError;
use crate::gateway::{Connection, RaceGateway, StreamingGateway};
use crate::models::{LiveRaceUpdate, PonyId, PonyWithPosition, Race, RaceId, RaceStatus};

/// Shown when the live channel cannot be opened
pub const LIVE_ERROR_MESSAGE: &str = "A problem occurred during the live.";

/// Shown when a boost request is rejected
pub const BOOST_ERROR_MESSAGE: &str = "The boost failed, please try again.";

/// Where the view stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LivePhase {
    /// Waiting for the snapshot
    Loading,
    Pending,
    Running,
    Finished,
    /// A load failure, or a dismissible warning on top of the race
    Errored,
}

impl fmt::Display for LivePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LivePhase::Loading => "loading",
            LivePhase::Pending => "pending",
            LivePhase::Running => "running",
            LivePhase::Finished => "finished",
            LivePhase::Errored => "errored",
        };
        f.write_str(name)
    }
}

/// Observable state of a live race view
#[derive(Debug, Clone, PartialEq)]
pub struct LiveRaceState {
    pub race_id: RaceId,
    /// Snapshot, with its status kept current by the live channel
    pub race: Option<Race>,
    /// Ponies of the most recent update, in the order received
    pub running_ponies: Vec<PonyWithPosition>,
    /// Dismissible warning
    pub error_message: Option<String>,
    /// Why the snapshot could not be loaded
    pub load_error: Option<String>,
}

impl LiveRaceState {
    fn new(race_id: RaceId) -> Self {
        Self {
            race_id,
            race: None,
            running_ponies: Vec::new(),
            error_message: None,
            load_error: None,
        }
    }

    pub fn phase(&self) -> LivePhase {
        if self.load_error.is_some() || self.error_message.is_some() {
            return LivePhase::Errored;
        }
        match self.status() {
            None => LivePhase::Loading,
            Some(RaceStatus::Pending) => LivePhase::Pending,
            Some(RaceStatus::Running) => LivePhase::Running,
            Some(RaceStatus::Finished) => LivePhase::Finished,
        }
    }

    pub fn status(&self) -> Option<RaceStatus> {
        self.race.as_ref().map(|r| r.status)
    }

    pub fn is_running(&self) -> bool {
        self.status().is_some_and(presentation::is_running)
    }

    /// Whether the race is over, even while a warning is shown
    pub fn is_finished(&self) -> bool {
        self.status() == Some(RaceStatus::Finished)
    }

    /// Alert styling of [`LiveRaceState::error_message`], if one is shown
    pub fn error_variant(&self) -> Option<&'static str> {
        self.error_message
            .as_ref()
            .map(|_| presentation::ERROR_ALERT_VARIANT)
    }

    fn bet_pony_id(&self) -> Option<&PonyId> {
        self.race.as_ref().and_then(|r| r.bet_pony_id.as_ref())
    }

    /// Ponies sharing the best position among the running ponies
    pub fn winners(&self) -> Vec<&PonyWithPosition> {
        presentation::winners(&self.running_ponies)
    }

    /// Ponies to draw
    ///
    /// Once finished only the winners are shown. Before the first update the
    /// roster is shown at the starting line.
    pub fn pony_rows(&self) -> Vec<PonyRow> {
        let Some(race) = &self.race else {
            return Vec::new();
        };
        let bet = self.bet_pony_id();

        match race.status {
            RaceStatus::Finished => self
                .winners()
                .into_iter()
                .map(|p| PonyRow::new(p, bet, race.status))
                .collect(),
            status if self.running_ponies.is_empty() => race
                .ponies
                .iter()
                .map(|p| PonyRow::new(&p.clone().at(0.0), bet, status))
                .collect(),
            status => self
                .running_ponies
                .iter()
                .map(|p| PonyRow::new(p, bet, status))
                .collect(),
        }
    }

    /// Won/lost banner, only for a finished race
    pub fn outcome(&self) -> Option<BetOutcome> {
        if !self.is_finished() {
            return None;
        }
        presentation::bet_outcome(self.bet_pony_id(), &self.running_ponies)
    }
}

/// State shared with the live channel callback
struct Shared {
    state: watch::Sender<LiveRaceState>,
    connection: Mutex<Option<Box<dyn Connection>>>,
    mounted: AtomicBool,
    loaded: AtomicBool,
    boost: Mutex<BoostDetector>,
}

impl Shared {
    fn apply(&self, update: LiveRaceUpdate) {
        if !self.mounted.load(Ordering::Acquire) {
            tracing::debug!("Ignoring live update after teardown");
            return;
        }

        let mut finished = false;
        self.state.send_if_modified(|state| {
            let Some(race) = state.race.as_mut() else {
                return false;
            };
            if race.status == RaceStatus::Finished {
                return false;
            }
            state.running_ponies = update.ponies;
            race.status = race.status.max(update.status);
            finished = race.status == RaceStatus::Finished;
            true
        });

        if finished && self.disconnect() {
            tracing::info!(race_id = %self.state.borrow().race_id, "Race finished, live channel closed");
        }
    }

    /// Release the live channel; `false` if it was already released
    fn disconnect(&self) -> bool {
        let connection = self.connection.lock().take();
        match connection {
            Some(connection) => {
                connection.disconnect();
                true
            }
            None => false,
        }
    }

    fn set_error(&self, message: &str) {
        self.state.send_modify(|state| state.error_message = Some(message.to_string()));
    }
}

/// Controller of one live race view
pub struct LiveRaceController {
    race_id: RaceId,
    races: Arc<dyn RaceGateway>,
    stream: Arc<dyn StreamingGateway>,
    shared: Arc<Shared>,
}

impl LiveRaceController {
    /// Create a controller in the `Loading` phase
    pub fn new(
        race_id: RaceId,
        races: Arc<dyn RaceGateway>,
        stream: Arc<dyn StreamingGateway>,
        boost: BoostConfig,
    ) -> Self {
        let (state, _) = watch::channel(LiveRaceState::new(race_id.clone()));
        let shared = Arc::new(Shared {
            state,
            connection: Mutex::new(None),
            mounted: AtomicBool::new(true),
            loaded: AtomicBool::new(false),
            boost: Mutex::new(BoostDetector::new(boost)),
        });

        Self {
            race_id,
            races,
            stream,
            shared,
        }
    }

    /// Load the snapshot and, unless the race is over, go live
    ///
    /// Only a snapshot failure is returned; a failing subscription leaves the
    /// race displayed with a dismissible warning.
    pub async fn load(&self) -> Result<(), LiveError> {
        if self.shared.loaded.swap(true, Ordering::AcqRel) {
            return Err(LiveError::AlreadyLoaded);
        }

        let race = match self.races.get(&self.race_id).await {
            Ok(race) => race,
            Err(e) => {
                tracing::warn!(race_id = %self.race_id, error = %e, "Failed to load race");
                let message = e.to_string();
                self.shared
                    .state
                    .send_modify(|state| state.load_error = Some(message));
                return Err(LiveError::Load {
                    race_id: self.race_id.clone(),
                    source: e,
                });
            }
        };

        let status = race.status;
        let channel = race.channel();
        tracing::info!(race_id = %self.race_id, status = %status, "Race loaded");
        self.shared.state.send_modify(|state| state.race = Some(race));

        if status == RaceStatus::Finished {
            return Ok(());
        }
        self.go_live(&channel);
        Ok(())
    }

    fn go_live(&self, channel: &str) {
        let shared: Weak<Shared> = Arc::downgrade(&self.shared);
        let handler = Box::new(move |update: LiveRaceUpdate| match shared.upgrade() {
            Some(shared) => shared.apply(update),
            None => tracing::debug!("Ignoring live update for a dropped view"),
        });

        let connection = match self.stream.subscribe(channel, handler) {
            Ok(connection) => connection,
            Err(e) => {
                tracing::warn!(race_id = %self.race_id, channel = %channel, error = %e, "Failed to open live channel");
                self.shared.set_error(LIVE_ERROR_MESSAGE);
                return;
            }
        };

        let mut slot = self.shared.connection.lock();
        let over = self.shared.state.borrow().status() == Some(RaceStatus::Finished);
        if over || !self.shared.mounted.load(Ordering::Acquire) {
            // finished while subscribing
            drop(slot);
            connection.disconnect();
            return;
        }
        *slot = Some(connection);
        tracing::info!(race_id = %self.race_id, channel = %channel, "Live channel open");
    }

    pub fn race_id(&self) -> &RaceId {
        &self.race_id
    }

    /// Current state
    pub fn state(&self) -> LiveRaceState {
        self.shared.state.borrow().clone()
    }

    /// Receiver notified on every state change
    pub fn watch(&self) -> watch::Receiver<LiveRaceState> {
        self.shared.state.subscribe()
    }

    /// Whether a live channel is currently held
    pub fn is_live(&self) -> bool {
        self.shared.connection.lock().is_some()
    }

    /// Provide final positions for a race that was already over when loaded
    pub fn set_running_ponies(&self, ponies: Vec<PonyWithPosition>) {
        self.shared
            .state
            .send_modify(|state| state.running_ponies = ponies);
    }

    /// Clear the warning; nothing is retried
    pub fn dismiss_error(&self) {
        self.shared.state.send_if_modified(|state| state.error_message.take().is_some());
    }

    /// Select a pony now
    pub async fn select_pony(&self, pony_id: &PonyId) -> bool {
        self.select_pony_at(pony_id, Utc::now()).await
    }

    /// Select a pony at a given instant; returns `true` if a boost was requested
    ///
    /// A rejected boost becomes the dismissible warning.
    pub async fn select_pony_at(&self, pony_id: &PonyId, at: DateTime<Utc>) -> bool {
        let triggered = self.shared.boost.lock().record(pony_id, at);
        if !triggered {
            return false;
        }

        tracing::info!(race_id = %self.race_id, pony_id = %pony_id, "Boost requested");
        if let Err(e) = self.races.boost(&self.race_id, pony_id).await {
            tracing::warn!(race_id = %self.race_id, pony_id = %pony_id, error = %e, "Boost failed");
            self.shared.set_error(BOOST_ERROR_MESSAGE);
        }
        true
    }

    /// Leave the view, closing the live channel if still open
    pub fn unmount(self) {
        drop(self);
    }

    fn teardown(&self) {
        if !self.shared.mounted.swap(false, Ordering::AcqRel) {
            return;
        }
        if self.shared.disconnect() {
            tracing::info!(race_id = %self.race_id, "Live channel closed on teardown");
        }
    }
}

impl Drop for LiveRaceController {
    fn drop(&mut self) {
        self.teardown();
    }
}
