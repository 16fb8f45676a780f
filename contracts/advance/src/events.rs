use soroban_sdk::{contracttype, Address};

#[contracttype]
#[derive(Clone, Debug)]
pub struct AdvanceCreatedEvent {
    pub recipient: Address,
    pub collateral_receiver: Address,
    pub principal: i128,
    pub recoupment_amount: i128,
    pub expires_at: u64,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct AdvanceProvidedEvent {
    pub advancer: Address,
    pub recipient: Address,
    pub principal: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct RepaymentProcessedEvent {
    pub advancer: Address,
    pub amount: i128,
    pub amount_repaid: i128,
    pub total_due: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct CollateralReleasedEvent {
    pub token: Address,
    pub to: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct AdvanceRevokedEvent {
    pub recipient: Address,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct ExcessReclaimedEvent {
    pub recipient: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct DistributionForwardedEvent {
    pub currency: Address,
    pub recipient: Address,
    pub amount: i128,
}
