// Energy ledger: the builder's tick budget, refilled from its furnace.
//
// The balance counts energy ticks. Paying for an action burns fuel units one
// at a time until the balance covers the cost, then deducts the cost. If the
// fuel source runs dry first, the payment fails: energy credited from fuel
// already burned stays on the balance, nothing is deducted, and the caller
// aborts the action.
//
// Callers pay last. Movement and building run every other check (ground,
// collision, placement veto, material) before touching the ledger, so a
// rejected action never burns fuel.

use crate::error::BuilderError;
use crate::host::FuelSource;
use serde::{Deserialize, Serialize};

/// Stored energy, in ticks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnergyLedger {
    balance: u32,
}

impl EnergyLedger {
    pub const fn new() -> Self {
        Self { balance: 0 }
    }

    pub const fn with_balance(balance: u32) -> Self {
        Self { balance }
    }

    pub const fn balance(&self) -> u32 {
        self.balance
    }

    /// Pay `required` energy, burning fuel from `source` as needed.
    ///
    /// `source` is `None` when the furnace cell no longer exposes fuel; that
    /// counts as an empty source.
    pub fn use_energy(
        &mut self,
        required: u32,
        mut source: Option<&mut dyn FuelSource>,
    ) -> Result<(), BuilderError> {
        while self.balance < required {
            let granted = source.as_deref_mut().map_or(0, |s| s.consume_fuel());
            if granted == 0 {
                log::trace!("energy short: have {}, need {required}", self.balance);
                return Err(BuilderError::InsufficientEnergy);
            }
            self.balance = self.balance.saturating_add(granted);
        }
        self.balance -= required;
        Ok(())
    }
}
