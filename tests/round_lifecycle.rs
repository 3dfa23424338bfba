#![allow(non_snake_case)]
use limbo_client::{
    Bet,
    GameConfig,
    GameStatus,
    LocalHouse,
    Outcome,
    RevealPhase,
    RoundController,
    RoundEvent,
    Settlement,
    WagerError,
    WagerEvent,
    WagerRequest,
    WagerResponse,
    WagerService,
};
use std::time::Duration;
use tokio::{
    sync::mpsc,
    time::Instant,
};

/// Accepts every bet and forwards it to the test, which then plays the part
/// of the authority by pushing outcomes directly.
struct AcceptingService {
    requests: mpsc::UnboundedSender<WagerRequest>,
}

impl WagerService for AcceptingService {
    async fn submit(&mut self, request: WagerRequest) -> Result<WagerResponse, WagerError> {
        self.requests
            .send(request)
            .map_err(|_| WagerError::Unavailable)?;
        Ok(WagerResponse::accepted())
    }

    async fn request_history(&mut self, _username: &str) -> Result<(), WagerError> {
        Ok(())
    }
}

fn config(balance: f64) -> GameConfig {
    GameConfig {
        starting_balance: balance,
        connection_id: "socket-42".into(),
        ..GameConfig::default()
    }
}

fn controller(
    balance: f64,
) -> (
    RoundController<AcceptingService>,
    mpsc::UnboundedReceiver<WagerRequest>,
) {
    let (tx, rx) = mpsc::unbounded_channel();
    let controller = RoundController::new(&config(balance), AcceptingService { requests: tx });
    (controller, rx)
}

async fn reveal_to_end<W>(controller: &mut RoundController<W>) -> (Vec<f64>, Settlement) {
    let mut shown = Vec::new();
    loop {
        match controller.next_event().await {
            RoundEvent::Progress(v) => shown.push(v),
            RoundEvent::Settled(s) => {
                shown.push(s.final_value);
                return (shown, s);
            }
            RoundEvent::OutcomeTimedOut(id) => panic!("round {id} timed out"),
        }
    }
}

#[tokio::test(start_paused = true)]
async fn round__win_credits_profit_and_records_target_multiplier() {
    // given
    let (mut controller, mut requests) = controller(100.0);
    controller.submit_bet(Bet::limbo(10.0, 2.0)).await.unwrap();
    let sent = requests.recv().await.unwrap();
    assert_eq!(sent.connection_id, "socket-42");
    assert_eq!(controller.balance(), 90.0);

    // when
    let started = Instant::now();
    controller.on_outcome(Outcome {
        value: 3.0,
        status: GameStatus::Win,
        profit: 20.0,
    });
    let (shown, settlement) = reveal_to_end(&mut controller).await;

    // then
    assert_eq!(shown.len(), 100);
    assert!(shown.windows(2).all(|p| p[0] <= p[1]));
    assert_eq!(settlement.final_value, 3.0);
    assert_eq!(settlement.bet.profit, 20.0);
    assert!(started.elapsed() >= Duration::from_millis(1000));
    assert_eq!(controller.balance(), 110.0);
    assert_eq!(controller.round_status(), Some(GameStatus::Win));
    assert_eq!(controller.reveal_state().phase, RevealPhase::Settled);
    assert_eq!(controller.reveal_state().display_value, 3.0);
    let texts: Vec<_> = controller.history().entries().map(|e| e.text.as_str()).collect();
    assert_eq!(texts, vec!["2.00"]);
}

#[tokio::test(start_paused = true)]
async fn round__loss_keeps_debit_and_records_zero() {
    // given
    let (mut controller, _requests) = controller(100.0);
    controller.submit_bet(Bet::limbo(10.0, 2.0)).await.unwrap();

    // when
    controller.on_outcome(Outcome {
        value: 1.5,
        status: GameStatus::Lose,
        profit: 0.0,
    });
    let (_, settlement) = reveal_to_end(&mut controller).await;

    // then
    assert_eq!(settlement.status, GameStatus::Lose);
    assert_eq!(controller.balance(), 90.0);
    let texts: Vec<_> = controller.history().entries().map(|e| e.text.as_str()).collect();
    assert_eq!(texts, vec!["0.00"]);
}

#[tokio::test(start_paused = true)]
async fn round__zero_outcome_settles_after_one_tick() {
    let (mut controller, _requests) = controller(50.0);
    controller.submit_bet(Bet::limbo(5.0, 1.5)).await.unwrap();

    controller.on_outcome(Outcome {
        value: 0.0,
        status: GameStatus::Lose,
        profit: 0.0,
    });
    let (shown, _) = reveal_to_end(&mut controller).await;

    assert_eq!(shown, vec![0.0]);
    assert_eq!(controller.balance(), 45.0);
}

#[tokio::test(start_paused = true)]
async fn round__history_is_not_touched_until_settlement() {
    // given
    let (mut controller, _requests) = controller(100.0);
    controller.submit_bet(Bet::limbo(10.0, 2.0)).await.unwrap();
    controller.on_outcome(Outcome {
        value: 3.0,
        status: GameStatus::Win,
        profit: 20.0,
    });

    // when
    for _ in 0..50 {
        controller.next_event().await;
    }

    // then
    assert!(controller.history().is_empty());
    assert_eq!(controller.balance(), 90.0);
    assert_eq!(controller.round_status(), None);
    assert_eq!(controller.reveal_state().phase, RevealPhase::Revealing);
}

#[tokio::test(start_paused = true)]
async fn round__local_house_session_balances_out() {
    // given
    let config = GameConfig {
        seed: Some(2024),
        ..config(100.0)
    };
    let (tx, mut events) = mpsc::unbounded_channel();
    let house = LocalHouse::new(tx, config.house_edge, config.limits, config.seed);
    let mut controller = RoundController::new(&config, house);
    let mut expected = 100.0;

    for _ in 0..20 {
        // when
        controller.submit_bet(Bet::limbo(1.0, 1.5)).await.unwrap();
        expected -= 1.0;
        let Some(WagerEvent::Outcome(outcome)) = events.recv().await else {
            panic!("expected an outcome push");
        };
        controller.on_outcome(outcome);
        let (_, settlement) = reveal_to_end(&mut controller).await;

        // then
        expected += settlement.profit;
        assert_eq!(settlement.final_value, outcome.value);
        match outcome.status {
            GameStatus::Win => assert_eq!(settlement.profit, 1.5),
            GameStatus::Lose => assert_eq!(settlement.profit, 0.0),
        }
    }
    assert_eq!(controller.balance(), expected);
    assert_eq!(controller.history().len(), 20);
}
