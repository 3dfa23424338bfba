use tracing::debug;

/// The player's spendable balance.
///
/// Only the round controller writes here: one debit when a bet is submitted
/// and one credit when its round settles. Guarding against a negative result
/// is the caller's job.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BalanceLedger {
    balance: f64,
}

impl BalanceLedger {
    pub fn new(initial: f64) -> Self {
        Self { balance: initial }
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn debit(&mut self, amount: f64) {
        self.balance -= amount;
        debug!(amount, balance = self.balance, "balance debited");
    }

    pub fn credit(&mut self, amount: f64) {
        self.balance += amount;
        debug!(amount, balance = self.balance, "balance credited");
    }
}
