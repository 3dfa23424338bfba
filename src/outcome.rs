use crate::bet::{
    Bet,
    GameStatus,
    Outcome,
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Resolution {
    pub status: GameStatus,
    pub profit: f64,
    pub target_multiplier: f64,
}

impl Resolution {
    /// Text recorded in round history: the target multiplier on a win,
    /// `0.00` on a loss.
    pub fn history_text(&self) -> String {
        let shown = match self.status {
            GameStatus::Win => self.target_multiplier,
            GameStatus::Lose => 0.0,
        };
        format!("{shown:.2}")
    }
}

/// Classify a round. Profit on a win is the authority's figure, passed through
/// untouched; a loss credits nothing.
pub fn resolve(bet: &Bet, outcome: &Outcome) -> Resolution {
    let profit = match outcome.status {
        GameStatus::Win if outcome.profit.is_finite() && outcome.profit > 0.0 => {
            outcome.profit
        }
        _ => 0.0,
    };
    Resolution {
        status: outcome.status,
        profit,
        target_multiplier: bet.target_multiplier,
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::*;

    #[test]
    fn resolve__win_passes_authority_profit_through() {
        // given
        let bet = Bet::limbo(10.0, 2.0);
        let outcome = Outcome {
            value: 3.0,
            status: GameStatus::Win,
            profit: 20.0,
        };

        // when
        let resolution = resolve(&bet, &outcome);

        // then
        assert_eq!(resolution.status, GameStatus::Win);
        assert_eq!(resolution.profit, 20.0);
        assert_eq!(resolution.history_text(), "2.00");
    }

    #[test]
    fn resolve__lose_credits_nothing() {
        let bet = Bet::limbo(10.0, 2.0);
        let outcome = Outcome {
            value: 1.5,
            status: GameStatus::Lose,
            profit: 7.0,
        };

        let resolution = resolve(&bet, &outcome);

        assert_eq!(resolution.profit, 0.0);
        assert_eq!(resolution.history_text(), "0.00");
    }

    #[test]
    fn resolve__non_finite_profit_is_zeroed() {
        let bet = Bet::limbo(10.0, 2.0);
        let outcome = Outcome {
            value: 5.0,
            status: GameStatus::Win,
            profit: f64::NAN,
        };

        assert_eq!(resolve(&bet, &outcome).profit, 0.0);
    }

    #[test]
    fn history_text__rounds_to_two_places() {
        let resolution = Resolution {
            status: GameStatus::Win,
            profit: 1.0,
            target_multiplier: 1.237,
        };

        assert_eq!(resolution.history_text(), "1.24");
    }
}
