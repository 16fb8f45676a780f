use advance_common::Collateral;
use soroban_sdk::{contracttype, Address, Vec};

const DAY_IN_LEDGERS: u32 = 17_280;
pub const INSTANCE_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
pub const INSTANCE_LIFETIME_THRESHOLD: u32 = INSTANCE_BUMP_AMOUNT - DAY_IN_LEDGERS;

#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum AdvanceState {
    /// Collateral escrowed, waiting for an advancer
    Pending = 0,
    /// Principal paid out, repayments outstanding
    Active = 1,
    /// Fully repaid, collateral released to the collateral receiver
    Repaid = 2,
    /// Withdrawn by the recipient, collateral returned
    Revoked = 3,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct Advance {
    /// Current lifecycle state
    pub state: AdvanceState,
    /// Factory that deployed this advance
    pub factory: Address,
    /// Owner of the collateral, receives the principal
    pub recipient: Address,
    /// Receives the collateral once fully repaid
    pub collateral_receiver: Address,
    /// Set when the advance is provided
    pub advancer: Option<Address>,
    pub payment_currency: Address,
    pub principal: i128,
    pub fee_ppm: u32,
    /// principal × (1 + fee_ppm / 1,000,000)
    pub recoupment_amount: i128,
    pub amount_repaid: i128,
    pub created_at: u64,
    /// Offer can no longer be taken after this timestamp
    pub expires_at: u64,
    pub collaterals: Vec<Collateral>,
}

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Initialized,
    Advance,
}
