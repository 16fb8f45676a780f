use soroban_sdk::{contracttype, Address, BytesN, Env};

const DAY_IN_LEDGERS: u32 = 17_280;
pub const INSTANCE_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
pub const INSTANCE_LIFETIME_THRESHOLD: u32 = INSTANCE_BUMP_AMOUNT - DAY_IN_LEDGERS;
pub const INDEX_BUMP_AMOUNT: u32 = 120 * DAY_IN_LEDGERS;
pub const INDEX_LIFETIME_THRESHOLD: u32 = INDEX_BUMP_AMOUNT - DAY_IN_LEDGERS;

/// Settings every new advance is created with
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AdvanceConfig {
    /// Wasm hash of the advance contract to deploy
    pub template_hash: BytesN<32>,
    /// Currency principal and repayments are paid in
    pub payment_currency: Address,
    /// Oracle vetting collateral tokens
    pub collateral_registry: Address,
    /// Seconds an offer stays open after creation
    pub offer_duration: u64,
    pub max_collaterals_per_advance: u32,
}

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Initialized,
    Owner,
    Config,
    Paused,
    AdvanceCounter,
    Advance(u64), // Advance ID → contract address
}

pub fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

pub fn write_advance(env: &Env, id: u64, advance: &Address) {
    let key = DataKey::Advance(id);
    env.storage().persistent().set(&key, advance);
    env.storage()
        .persistent()
        .extend_ttl(&key, INDEX_LIFETIME_THRESHOLD, INDEX_BUMP_AMOUNT);
}

pub fn read_advance(env: &Env, id: u64) -> Option<Address> {
    let key = DataKey::Advance(id);
    let advance = env.storage().persistent().get(&key);
    if advance.is_some() {
        env.storage()
            .persistent()
            .extend_ttl(&key, INDEX_LIFETIME_THRESHOLD, INDEX_BUMP_AMOUNT);
    }
    advance
}
