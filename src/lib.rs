pub mod balance;

pub mod bet;

pub mod config;

pub mod error;

pub mod history;

pub mod outcome;

pub mod reveal;

pub mod round;

pub mod wager;

pub use balance::BalanceLedger;
pub use bet::{
    Bet,
    GameStatus,
    GameType,
    Outcome,
};
pub use config::GameConfig;
pub use error::{
    RoundError,
    SubmissionError,
    ValidationError,
};
pub use history::{
    HistoryEntry,
    HistoryLedger,
};
pub use reveal::{
    RevealAnimator,
    RevealPhase,
    RevealState,
    RevealTick,
};
pub use round::{
    Accepted,
    OutcomeDisposition,
    RoundController,
    RoundEvent,
    RoundId,
    Settlement,
};
pub use wager::{
    LocalHouse,
    TableLimits,
    WagerError,
    WagerEvent,
    WagerRequest,
    WagerResponse,
    WagerService,
};
