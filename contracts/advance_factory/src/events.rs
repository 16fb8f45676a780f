use soroban_sdk::{contracttype, Address};

#[contracttype]
#[derive(Clone, Debug)]
pub struct AdvanceDeployedEvent {
    pub id: u64,
    pub advance: Address,
    pub recipient: Address,
    pub principal: i128,
    pub fee_ppm: u32,
    pub collateral_count: u32,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct PausedEvent {
    pub paused: bool,
}
