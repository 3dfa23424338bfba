use crate::{
    bet::{
        Bet,
        GameStatus,
        Outcome,
    },
    history::HistoryEntry,
};
use rand::{
    Rng,
    SeedableRng,
    rngs::StdRng,
};
use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;
use std::collections::VecDeque;
use tokio::sync::mpsc;
use tracing::{
    debug,
    info,
};

/// Body of a wager submission: the bet plus the connection the outcome push
/// should be routed to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WagerRequest {
    #[serde(flatten)]
    pub bet: Bet,
    #[serde(rename = "socketId")]
    pub connection_id: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WagerResponse {
    pub accepted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl WagerResponse {
    pub fn accepted() -> Self {
        Self {
            accepted: true,
            reason: None,
        }
    }

    pub fn refused(reason: impl Into<String>) -> Self {
        Self {
            accepted: false,
            reason: Some(reason.into()),
        }
    }
}

/// Pushes initiated by the wager authority.
#[derive(Clone, Debug, PartialEq)]
pub enum WagerEvent {
    Outcome(Outcome),
    History(Vec<HistoryEntry>),
}

#[derive(Debug, Error)]
pub enum WagerError {
    #[error("wager service unavailable")]
    Unavailable,
}

/// The external authority that accepts bets and later pushes outcomes as
/// [`WagerEvent`]s on its own channel.
pub trait WagerService {
    fn submit(
        &mut self,
        request: WagerRequest,
    ) -> impl Future<Output = Result<WagerResponse, WagerError>>;

    /// Ask for the player's past results; answered with
    /// [`WagerEvent::History`].
    fn request_history(
        &mut self,
        username: &str,
    ) -> impl Future<Output = Result<(), WagerError>>;
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TableLimits {
    pub max_bet: f64,
    pub max_win: f64,
    pub max_multiplier: f64,
}

impl Default for TableLimits {
    fn default() -> Self {
        Self {
            max_bet: 1_000.0,
            max_win: 10_000.0,
            max_multiplier: 10_000.0,
        }
    }
}

pub const DEFAULT_HOUSE_EDGE: f64 = 0.04;

/// Past rounds the local house keeps for history requests.
pub const HOUSE_RECORD_CAPACITY: usize = 50;

/// In-process wager authority for offline play.
///
/// Draws `value = (1 - edge) / u` for `u` uniform in `(0, 1]`, capped at the
/// table's max multiplier and truncated to two places. The player wins when
/// the value exceeds the target; a win pays `stake * target` back as profit,
/// which covers the stake already debited.
pub struct LocalHouse {
    events: mpsc::UnboundedSender<WagerEvent>,
    rng: StdRng,
    house_edge: f64,
    limits: TableLimits,
    records: VecDeque<HistoryEntry>,
}

impl LocalHouse {
    pub fn new(
        events: mpsc::UnboundedSender<WagerEvent>,
        house_edge: f64,
        limits: TableLimits,
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            events,
            rng,
            house_edge,
            limits,
            records: VecDeque::with_capacity(HOUSE_RECORD_CAPACITY),
        }
    }

    pub fn limits(&self) -> TableLimits {
        self.limits
    }

    fn check_limits(&self, bet: &Bet) -> Option<String> {
        if bet.stake > self.limits.max_bet {
            return Some(format!("bet exceeds table limit of {:.2}", self.limits.max_bet));
        }
        if !(1.0..=self.limits.max_multiplier).contains(&bet.target_multiplier) {
            return Some(format!(
                "target multiplier must be between 1.00 and {:.2}",
                self.limits.max_multiplier
            ));
        }
        if bet.stake * bet.target_multiplier - bet.stake > self.limits.max_win {
            return Some(format!(
                "potential win exceeds table limit of {:.2}",
                self.limits.max_win
            ));
        }
        None
    }

    fn draw_multiplier(&mut self) -> f64 {
        let u = 1.0 - self.rng.random::<f64>();
        let raw = ((1.0 - self.house_edge) / u).min(self.limits.max_multiplier);
        (raw * 100.0).floor() / 100.0
    }

    fn decide(&mut self, bet: &Bet) -> Outcome {
        let value = self.draw_multiplier();
        if value > bet.target_multiplier {
            Outcome {
                value,
                status: GameStatus::Win,
                profit: bet.stake * bet.target_multiplier,
            }
        } else {
            Outcome {
                value,
                status: GameStatus::Lose,
                profit: 0.0,
            }
        }
    }

    fn record(&mut self, bet: &Bet, outcome: &Outcome) {
        let shown = match outcome.status {
            GameStatus::Win => bet.target_multiplier,
            GameStatus::Lose => 0.0,
        };
        self.records.push_front(HistoryEntry::new(format!("{shown:.2}")));
        self.records.truncate(HOUSE_RECORD_CAPACITY);
    }
}

impl WagerService for LocalHouse {
    async fn submit(&mut self, request: WagerRequest) -> Result<WagerResponse, WagerError> {
        let bet = request.bet;
        if let Some(reason) = self.check_limits(&bet) {
            debug!(%reason, "local house refused bet");
            return Ok(WagerResponse::refused(reason));
        }
        let outcome = self.decide(&bet);
        info!(
            connection = %request.connection_id,
            stake = bet.stake,
            multiplier = bet.target_multiplier,
            value = outcome.value,
            status = %outcome.status,
            "local house decided round"
        );
        self.record(&bet, &outcome);
        self.events
            .send(WagerEvent::Outcome(outcome))
            .map_err(|_| WagerError::Unavailable)?;
        Ok(WagerResponse::accepted())
    }

    async fn request_history(&mut self, username: &str) -> Result<(), WagerError> {
        debug!(username, records = self.records.len(), "serving history");
        self.events
            .send(WagerEvent::History(self.records.iter().cloned().collect()))
            .map_err(|_| WagerError::Unavailable)
    }
}
