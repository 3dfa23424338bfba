//! Round lifecycle: validate and submit a bet, wait for the authority's
//! outcome, reveal it, then settle balance and history.
//!
//! All state for a round, its status included, lives in the controller and is
//! handed to settlement explicitly. Nothing is carried between rounds outside
//! of it.

use crate::{
    balance::BalanceLedger,
    bet::{
        Bet,
        GameStatus,
        Outcome,
    },
    config::GameConfig,
    error::{
        RoundError,
        SubmissionError,
        ValidationError,
    },
    history::{
        HistoryEntry,
        HistoryLedger,
    },
    outcome::resolve,
    reveal::{
        RevealAnimator,
        RevealState,
        RevealTick,
    },
    wager::{
        WagerError,
        WagerRequest,
        WagerService,
    },
};
use std::{
    fmt,
    future,
    time::Duration,
};
use tokio::time::{
    self,
    Instant,
};
use tracing::{
    debug,
    error,
    info,
    warn,
};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct RoundId(u64);

impl fmt::Display for RoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Accepted {
    pub round_id: RoundId,
    pub stake: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Settlement {
    pub round_id: RoundId,
    pub bet: Bet,
    pub status: GameStatus,
    pub profit: f64,
    pub final_value: f64,
    pub history_text: String,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OutcomeDisposition {
    /// The outcome is now being revealed.
    Revealing(RoundId),
    /// No round was waiting for it, or the round already has its outcome.
    Ignored,
    /// The value cannot be revealed; the round keeps waiting.
    Invalid,
}

#[derive(Clone, Debug, PartialEq)]
pub enum RoundEvent {
    Progress(f64),
    Settled(Settlement),
    OutcomeTimedOut(RoundId),
}

#[derive(Clone, Debug)]
struct InFlightRound {
    id: RoundId,
    bet: Bet,
    submitted_at: Instant,
}

#[derive(Clone, Debug)]
struct RevealingRound {
    id: RoundId,
    bet: Bet,
    outcome: Outcome,
}

pub struct RoundController<W> {
    wager: W,
    connection_id: String,
    balance: BalanceLedger,
    history: HistoryLedger,
    reveal: RevealAnimator,
    reveal_duration: Duration,
    outcome_timeout: Option<Duration>,
    in_flight: Option<InFlightRound>,
    revealing: Option<RevealingRound>,
    last_settlement: Option<Settlement>,
    next_round: u64,
}

impl<W> RoundController<W> {
    pub fn new(config: &GameConfig, wager: W) -> Self {
        let history = match config.history_capacity {
            Some(cap) => HistoryLedger::with_capacity(cap),
            None => HistoryLedger::new(),
        };
        Self {
            wager,
            connection_id: config.connection_id.clone(),
            balance: BalanceLedger::new(config.starting_balance),
            history,
            reveal: RevealAnimator::new(config.tick),
            reveal_duration: config.reveal_duration,
            outcome_timeout: config.outcome_timeout,
            in_flight: None,
            revealing: None,
            last_settlement: None,
            next_round: 1,
        }
    }

    pub fn balance(&self) -> f64 {
        self.balance.balance()
    }

    pub fn history(&self) -> &HistoryLedger {
        &self.history
    }

    pub fn reveal_state(&self) -> RevealState {
        self.reveal.state()
    }

    /// Status of the most recently settled round, cleared when the next
    /// reveal starts.
    pub fn round_status(&self) -> Option<GameStatus> {
        if self.reveal.is_revealing() {
            return None;
        }
        self.last_settlement.as_ref().map(|s| s.status)
    }

    pub fn is_awaiting_outcome(&self) -> bool {
        self.in_flight.is_some()
    }

    fn validate(&self, bet: &Bet) -> Result<(), ValidationError> {
        if !bet.stake.is_finite() || bet.stake <= 0.0 {
            return Err(ValidationError::InvalidStake);
        }
        if !bet.target_multiplier.is_finite() || bet.target_multiplier < 1.0 {
            return Err(ValidationError::InvalidMultiplier);
        }
        let balance = self.balance.balance();
        if bet.stake > balance {
            return Err(ValidationError::InsufficientBalance {
                stake: bet.stake,
                balance,
            });
        }
        if self.in_flight.is_some() {
            return Err(ValidationError::RoundInProgress);
        }
        Ok(())
    }

    fn refund(&mut self, id: RoundId) {
        if let Some(round) = self.in_flight.take_if(|r| r.id == id) {
            self.balance.credit(round.bet.stake);
            debug!(round = %id, stake = round.bet.stake, "stake refunded");
        }
    }

    /// Handle an outcome push for the round awaiting one.
    ///
    /// The first push wins; repeats find no round waiting and are ignored. A
    /// reveal still running from an earlier round is settled on the spot
    /// before the new one starts, so its credit is never lost.
    pub fn on_outcome(&mut self, outcome: Outcome) -> OutcomeDisposition {
        if self.in_flight.is_none() {
            debug!(value = outcome.value, "no round awaiting an outcome, ignoring push");
            return OutcomeDisposition::Ignored;
        }
        if !outcome.is_revealable() {
            warn!(value = outcome.value, "unrevealable outcome value, ignoring push");
            return OutcomeDisposition::Invalid;
        }
        let Some(round) = self.in_flight.take() else {
            return OutcomeDisposition::Ignored;
        };
        if let Some(previous) = self.revealing.take() {
            self.reveal.cancel();
            let value = previous.outcome.value;
            self.settle(previous, value);
        }
        info!(
            round = %round.id,
            value = outcome.value,
            status = %outcome.status,
            "outcome received"
        );
        self.reveal.start(outcome.value, self.reveal_duration);
        self.revealing = Some(RevealingRound {
            id: round.id,
            bet: round.bet,
            outcome,
        });
        OutcomeDisposition::Revealing(round.id)
    }

    /// Seed history from the authority, only while none exists locally.
    pub fn on_history(&mut self, entries: Vec<HistoryEntry>) -> bool {
        if !self.history.is_empty() {
            debug!(len = entries.len(), "local history present, ignoring history push");
            return false;
        }
        if entries.is_empty() {
            return false;
        }
        self.history.bulk_load(entries);
        true
    }

    /// Wait for the next thing the round needs to act on: a reveal tick or
    /// the outcome deadline. Pends while neither is armed.
    pub async fn next_event(&mut self) -> RoundEvent {
        let deadline = self.outcome_deadline();
        let reveal = &mut self.reveal;
        tokio::select! {
            tick = reveal.next_tick() => self.apply_tick(tick),
            _ = wait_until(deadline) => self.abandon_in_flight(),
        }
    }

    /// `None` when no timeout is configured or the deadline is beyond what
    /// `Instant` can represent.
    fn outcome_deadline(&self) -> Option<Instant> {
        let timeout = self.outcome_timeout?;
        self.in_flight
            .as_ref()
            .and_then(|r| r.submitted_at.checked_add(timeout))
    }

    fn apply_tick(&mut self, tick: RevealTick) -> RoundEvent {
        match tick {
            RevealTick::Progress(value) => RoundEvent::Progress(value),
            RevealTick::Settled(value) => match self.revealing.take() {
                Some(round) => RoundEvent::Settled(self.settle(round, value)),
                None => RoundEvent::Progress(value),
            },
        }
    }

    fn abandon_in_flight(&mut self) -> RoundEvent {
        match self.in_flight.take() {
            Some(round) => {
                warn!(
                    round = %round.id,
                    stake = round.bet.stake,
                    "no outcome before deadline, abandoning round"
                );
                RoundEvent::OutcomeTimedOut(round.id)
            }
            None => RoundEvent::Progress(self.reveal.display_value()),
        }
    }

    fn settle(&mut self, round: RevealingRound, final_value: f64) -> Settlement {
        let RevealingRound {
            id,
            mut bet,
            outcome,
        } = round;
        let resolution = resolve(&bet, &outcome);
        bet.profit = resolution.profit;
        self.balance.credit(resolution.profit);
        let history_text = resolution.history_text();
        self.history.append(&history_text);
        info!(
            round = %id,
            status = %resolution.status,
            profit = resolution.profit,
            balance = self.balance.balance(),
            "round settled"
        );
        let settlement = Settlement {
            round_id: id,
            bet,
            status: resolution.status,
            profit: resolution.profit,
            final_value,
            history_text,
        };
        self.last_settlement = Some(settlement.clone());
        settlement
    }
}

impl<W: WagerService> RoundController<W> {
    /// Ask the authority for past results when no local history exists yet.
    /// The answer arrives later as a history push for [`Self::on_history`].
    pub async fn seed_history(&mut self, username: &str) -> Result<bool, WagerError> {
        if !self.history.is_empty() {
            return Ok(false);
        }
        self.wager.request_history(username).await?;
        Ok(true)
    }

    /// Validate, debit and forward a bet.
    ///
    /// Validation failures touch nothing. Once valid, the stake is debited
    /// before the request goes out and refunded if the service refuses or
    /// fails it.
    pub async fn submit_bet(&mut self, bet: Bet) -> Result<Accepted, RoundError> {
        self.validate(&bet)?;
        let id = RoundId(self.next_round);
        self.next_round += 1;
        let stake = bet.stake;
        self.balance.debit(stake);
        self.in_flight = Some(InFlightRound {
            id,
            bet: bet.clone(),
            submitted_at: Instant::now(),
        });
        let request = WagerRequest {
            bet,
            connection_id: self.connection_id.clone(),
        };
        match self.wager.submit(request).await {
            Ok(response) if response.accepted => {
                info!(round = %id, stake, "bet placed");
                Ok(Accepted {
                    round_id: id,
                    stake,
                })
            }
            Ok(response) => {
                warn!(round = %id, reason = ?response.reason, "bet not accepted");
                self.refund(id);
                Err(SubmissionError::NotAccepted {
                    reason: response.reason,
                }
                .into())
            }
            Err(e) => {
                error!(round = %id, error = %e, "bet submission failed");
                self.refund(id);
                Err(SubmissionError::Service(e).into())
            }
        }
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => time::sleep_until(deadline).await,
        None => future::pending().await,
    }
}
