use crate::ui;
use color_eyre::eyre::{
    Result,
    WrapErr,
};
use crossterm::event::EventStream;
use futures::StreamExt;
use limbo_client::{
    Bet,
    GameConfig,
    GameStatus,
    LocalHouse,
    Outcome,
    OutcomeDisposition,
    RevealPhase,
    RoundController,
    RoundError,
    RoundEvent,
    TableLimits,
    WagerEvent,
    WagerService,
};
use std::collections::VecDeque;
use tokio::sync::mpsc;
use tracing::{
    error,
    warn,
};

const MAX_NOTICES: usize = 5;

#[derive(Clone, Debug)]
pub struct AppSnapshot {
    pub balance: f64,
    pub phase: RevealPhase,
    pub display_value: f64,
    pub round_status: Option<GameStatus>,
    pub awaiting_outcome: bool,
    pub history: Vec<String>,
    pub limits: TableLimits,
    pub house_edge: f64,
    pub status: String,
    pub errors: Vec<String>,
}

/// Transient user-facing messages: a status line plus the last few errors.
#[derive(Debug, Default)]
struct Notices {
    status: String,
    errors: VecDeque<String>,
}

impl Notices {
    fn set_status(&mut self, message: impl Into<String>) {
        self.status = message.into();
    }

    fn push_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!(%message, "user notice");
        self.errors.push_back(message);
        while self.errors.len() > MAX_NOTICES {
            self.errors.pop_front();
        }
    }

    fn clear_errors(&mut self) {
        self.errors.clear();
    }
}

fn build_snapshot<W>(
    controller: &RoundController<W>,
    config: &GameConfig,
    notices: &Notices,
) -> AppSnapshot {
    let reveal = controller.reveal_state();
    AppSnapshot {
        balance: controller.balance(),
        phase: reveal.phase,
        display_value: reveal.display_value,
        round_status: controller.round_status(),
        awaiting_outcome: controller.is_awaiting_outcome(),
        history: controller
            .history()
            .entries()
            .map(|e| e.text.clone())
            .collect(),
        limits: config.limits,
        house_edge: config.house_edge,
        status: notices.status.clone(),
        errors: notices.errors.iter().cloned().collect(),
    }
}

pub async fn run_app(config: GameConfig) -> Result<()> {
    let (wager_tx, wager_rx) = mpsc::unbounded_channel();
    let house = LocalHouse::new(wager_tx, config.house_edge, config.limits, config.seed);
    let controller = RoundController::new(&config, house);
    let mut ui_state = ui::UiState::new(config.default_target_multiplier);

    tracing::info!("Starting UI");
    ui::terminal_enter(&mut ui_state)?;
    let res = run_loop(controller, &config, &mut ui_state, wager_rx).await;
    ui::terminal_exit()?;
    res
}

async fn place_bet<W: WagerService>(
    controller: &mut RoundController<W>,
    notices: &mut Notices,
    bet: Bet,
) {
    match controller.submit_bet(bet).await {
        Ok(accepted) => {
            notices.clear_errors();
            notices.set_status(format!(
                "Bet placed: {:.2} (round {})",
                accepted.stake, accepted.round_id
            ));
        }
        Err(RoundError::Validation(e)) => notices.push_error(e.to_string()),
        Err(RoundError::Submission(e)) => {
            error!(error = %e, "bet submission failed");
            notices.push_error(e.to_string());
        }
    }
}

fn apply_outcome<W>(controller: &mut RoundController<W>, notices: &mut Notices, outcome: Outcome) {
    match controller.on_outcome(outcome) {
        OutcomeDisposition::Revealing(_) | OutcomeDisposition::Ignored => {}
        OutcomeDisposition::Invalid => {
            notices.push_error("Received an invalid result, still waiting for the round");
        }
    }
}

fn apply_round_event(notices: &mut Notices, event: RoundEvent) {
    match event {
        RoundEvent::Progress(_) => {}
        RoundEvent::Settled(settlement) => {
            let message = match settlement.status {
                GameStatus::Win => format!(
                    "You win! Multiplier: {:.2}. Winnings: {:.2}",
                    settlement.final_value, settlement.profit
                ),
                GameStatus::Lose => {
                    format!("You lose. Multiplier: {:.2}", settlement.final_value)
                }
            };
            notices.set_status(message);
        }
        RoundEvent::OutcomeTimedOut(round_id) => {
            notices.push_error(format!("No result received for round {round_id}"));
        }
    }
}

async fn run_loop<W: WagerService>(
    mut controller: RoundController<W>,
    config: &GameConfig,
    ui_state: &mut ui::UiState,
    mut wager_events: mpsc::UnboundedReceiver<WagerEvent>,
) -> Result<()> {
    tracing::info!("Running app loop");
    let mut input = EventStream::new();
    let mut notices = Notices::default();
    notices.set_status("Ready");

    if let Err(e) = controller.seed_history(&config.username).await {
        warn!(error = %e, "history request failed");
    }

    loop {
        let snapshot = build_snapshot(&controller, config, &notices);
        ui::draw(ui_state, &snapshot).wrap_err("draw failed")?;

        tokio::select! {
            event = controller.next_event() => {
                apply_round_event(&mut notices, event);
            }
            Some(event) = wager_events.recv() => match event {
                WagerEvent::Outcome(outcome) => {
                    apply_outcome(&mut controller, &mut notices, outcome);
                }
                WagerEvent::History(entries) => {
                    controller.on_history(entries);
                }
            },
            raw = input.next() => {
                let Some(raw) = raw else {
                    warn!("input stream closed");
                    break;
                };
                let raw = raw.wrap_err("reading terminal input failed")?;
                let Some(ev) = ui::interpret_event(ui_state, raw) else {
                    continue;
                };
                match ev {
                    ui::UserEvent::Quit => break,
                    ui::UserEvent::Redraw => {}
                    ui::UserEvent::PlaceBet { stake, target_multiplier } => {
                        notices.set_status("Placing bet...");
                        ui::draw(ui_state, &build_snapshot(&controller, config, &notices))
                            .wrap_err("draw while submitting bet failed")?;
                        place_bet(
                            &mut controller,
                            &mut notices,
                            Bet::limbo(stake, target_multiplier),
                        )
                        .await;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    Ok(())
}
