//! Presentation Mapping
//!
//! Pure functions turning live race state into what a view draws:
//! track offsets, bet highlighting, winners and the bet outcome banner.

use serde::Serialize;

use crate::models::{Pony, PonyId, PonyWithPosition, RaceStatus};

/// Left margin of a pony sprite, in percent of the track width
///
/// Maps the 0-100 position range onto the track with a 10%-wide sprite:
/// 0 -> -5, 30 -> 10, 50 -> 20.
pub fn margin_left(position: f64) -> f64 {
    position / 2.0 - 5.0
}

/// [`margin_left`] as a CSS percentage, e.g. `"10%"` or `"10.5%"`
pub fn margin_left_percent(position: f64) -> String {
    format!("{}%", margin_left(position))
}

/// Alert styling of the dismissible live warning
pub const ERROR_ALERT_VARIANT: &str = "danger";

/// Whether `pony_id` is the pony the user bet on
pub fn is_selected(pony_id: &PonyId, bet_pony_id: Option<&PonyId>) -> bool {
    bet_pony_id == Some(pony_id)
}

/// Ponies move only while the race is running
pub fn is_running(status: RaceStatus) -> bool {
    status == RaceStatus::Running
}

/// Ponies sharing the highest final position, in roster order
pub fn winners(ponies: &[PonyWithPosition]) -> Vec<&PonyWithPosition> {
    let Some(best) = ponies.iter().map(|p| p.position).reduce(f64::max) else {
        return Vec::new();
    };
    ponies.iter().filter(|p| p.position == best).collect()
}

/// Result of the user's bet once a race is over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BetOutcome {
    Won,
    Lost,
}

impl BetOutcome {
    /// Alert styling
    pub fn variant(&self) -> &'static str {
        match self {
            BetOutcome::Won => "success",
            BetOutcome::Lost => "warning",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            BetOutcome::Won => "You won your bet!",
            BetOutcome::Lost => "You lost your bet",
        }
    }
}

/// Outcome banner for a finished race
///
/// `None` without a bet, and also without final positions: the race is
/// then only announced as over.
pub fn bet_outcome(bet_pony_id: Option<&PonyId>, final_ponies: &[PonyWithPosition]) -> Option<BetOutcome> {
    let bet = bet_pony_id?;
    let winners = winners(final_ponies);
    if winners.is_empty() {
        return None;
    }
    if winners.iter().any(|p| p.id() == bet) {
        Some(BetOutcome::Won)
    } else {
        Some(BetOutcome::Lost)
    }
}

/// Everything a view needs to draw one pony
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PonyRow {
    pub pony: Pony,
    pub position: f64,
    pub boosted: bool,
    /// CSS `margin-left` of the pony's lane
    pub margin_left: String,
    /// The user bet on this pony
    pub selected: bool,
    pub running: bool,
}

impl PonyRow {
    pub fn new(pony: &PonyWithPosition, bet_pony_id: Option<&PonyId>, status: RaceStatus) -> Self {
        Self {
            pony: pony.pony.clone(),
            position: pony.position,
            boosted: pony.boosted,
            margin_left: margin_left_percent(pony.position),
            selected: is_selected(pony.id(), bet_pony_id),
            running: is_running(status),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PonyColor;

    fn pony(id: i64, position: f64) -> PonyWithPosition {
        Pony::new(id, format!("Pony {}", id), PonyColor::Blue).at(position)
    }

    #[test]
    fn test_margin_left() {
        assert_eq!(margin_left(30.0), 10.0);
        assert_eq!(margin_left(50.0), 20.0);
        assert_eq!(margin_left(0.0), -5.0);

        assert_eq!(margin_left_percent(30.0), "10%");
        assert_eq!(margin_left_percent(0.0), "-5%");
        assert_eq!(margin_left_percent(31.0), "10.5%");
        assert_eq!(margin_left_percent(110.0), "50%");
        assert_eq!(margin_left_percent(2e19), "10000000000000000000%");
    }

    #[test]
    fn test_is_selected() {
        let one = PonyId::from(1);
        let two = PonyId::from(2);

        assert!(is_selected(&one, Some(&one)));
        assert!(!is_selected(&two, Some(&one)));
        assert!(!is_selected(&one, None));
    }

    #[test]
    fn test_is_running() {
        assert!(!is_running(RaceStatus::Pending));
        assert!(is_running(RaceStatus::Running));
        assert!(!is_running(RaceStatus::Finished));
    }

    #[test]
    fn test_winners_keep_ties() {
        let ponies = vec![pony(1, 100.0), pony(2, 90.0), pony(3, 100.0)];

        let ids: Vec<_> = winners(&ponies).iter().map(|p| p.id().clone()).collect();
        assert_eq!(ids, vec![PonyId::from(1), PonyId::from(3)]);
        assert!(winners(&[]).is_empty());
    }

    #[test]
    fn test_bet_outcome() {
        let ponies = vec![pony(1, 100.0), pony(2, 90.0), pony(3, 100.0)];

        let won = bet_outcome(Some(&PonyId::from(1)), &ponies);
        assert_eq!(won, Some(BetOutcome::Won));
        assert_eq!(won.unwrap().variant(), "success");

        let lost = bet_outcome(Some(&PonyId::from(2)), &ponies);
        assert_eq!(lost, Some(BetOutcome::Lost));
        assert_eq!(lost.unwrap().message(), "You lost your bet");

        assert_eq!(bet_outcome(None, &ponies), None);
        assert_eq!(bet_outcome(Some(&PonyId::from(1)), &[]), None);
    }

    #[test]
    fn test_pony_row() {
        let row = PonyRow::new(&pony(1, 50.0).boosted(), Some(&PonyId::from(1)), RaceStatus::Running);

        assert_eq!(row.margin_left, "20%");
        assert!(row.selected);
        assert!(row.running);
        assert!(row.boosted);
    }
}
