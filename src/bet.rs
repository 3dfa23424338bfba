use serde::{
    Deserialize,
    Serialize,
};
use std::fmt;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameType {
    #[default]
    Limbo,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Win,
    Lose,
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GameStatus::Win => "win",
            GameStatus::Lose => "lose",
        };
        write!(f, "{name}")
    }
}

/// A wager as the player committed it.
///
/// `profit` stays at zero until the round settles and is written exactly once.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bet {
    pub stake: f64,
    #[serde(rename = "multiplier")]
    pub target_multiplier: f64,
    pub game_type: GameType,
    #[serde(default)]
    pub profit: f64,
}

impl Bet {
    pub fn limbo(stake: f64, target_multiplier: f64) -> Self {
        Self {
            stake,
            target_multiplier,
            game_type: GameType::Limbo,
            profit: 0.0,
        }
    }
}

/// Result pushed by the wager authority. The client interprets it, it never
/// computes one.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    #[serde(rename = "result")]
    pub value: f64,
    pub status: GameStatus,
    #[serde(default)]
    pub profit: f64,
}

impl Outcome {
    /// Outcome values that can seed a reveal: finite and non-negative.
    pub fn is_revealable(&self) -> bool {
        self.value.is_finite() && self.value >= 0.0
    }
}
