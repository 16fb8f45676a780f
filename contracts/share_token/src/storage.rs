use soroban_sdk::{contracttype, Address, Env};

// Constants
pub const BASIS_POINTS: i128 = 10_000; // 100% = 10,000 basis points
pub const ACC_PRECISION: i128 = 1_000_000_000_000; // acc_per_share scale (1e12)
pub const MAX_CURRENCIES: u32 = 8;

const DAY_IN_LEDGERS: u32 = 17_280;
pub const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
pub const INSTANCE_LIFETIME_THRESHOLD: u32 = INSTANCE_BUMP_AMOUNT - DAY_IN_LEDGERS;
pub const BALANCE_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
pub const BALANCE_LIFETIME_THRESHOLD: u32 = BALANCE_BUMP_AMOUNT - DAY_IN_LEDGERS;

/// Per-currency fee settings
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FeeConfig {
    /// Cut of every observed deposit kept for the protocol
    pub payment_fee_bps: i128,
    /// Cut of a relayed claim paid to the relayer
    pub relayer_fee_bps: i128,
    /// Absolute cap on the relayer cut
    pub max_relayer_fee: i128,
}

/// Distribution state of one currency
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CurrencyAccumulator {
    /// Cumulative payout per share since inception, scaled by ACC_PRECISION
    pub acc_per_share: i128,
    /// Currency balance of the ledger at the last observation
    pub last_observed_balance: i128,
    /// Protocol fees accrued but not yet collected
    pub fee_reservoir: i128,
    /// Remainder of the last scaled division by supply
    pub residual: i128,
}

/// A holder's position against one currency accumulator
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct HolderCheckpoint {
    /// balance × acc_per_share already accounted for (scaled)
    pub debt: i128,
    /// Accrued value flushed on balance changes, not yet paid out
    pub credited: i128,
}

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Initialized,
    Admin,
    Name,
    Symbol,
    Decimals,
    FeeRecipient,
    RelationsRegistry,
    IssuanceClosed,
    TotalSupply,
    Currencies,
    FeeConfig(Address),            // currency → FeeConfig
    Accumulator(Address),          // currency → CurrencyAccumulator
    Balance(Address),              // holder → shares
    Checkpoint(Address, Address),  // (currency, holder) → HolderCheckpoint
}

pub fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

pub fn read_balance(env: &Env, holder: &Address) -> i128 {
    let key = DataKey::Balance(holder.clone());
    match env.storage().persistent().get::<DataKey, i128>(&key) {
        Some(balance) => {
            env.storage()
                .persistent()
                .extend_ttl(&key, BALANCE_LIFETIME_THRESHOLD, BALANCE_BUMP_AMOUNT);
            balance
        }
        None => 0,
    }
}

pub fn write_balance(env: &Env, holder: &Address, amount: i128) {
    let key = DataKey::Balance(holder.clone());
    if amount == 0 {
        env.storage().persistent().remove(&key);
        return;
    }
    env.storage().persistent().set(&key, &amount);
    env.storage()
        .persistent()
        .extend_ttl(&key, BALANCE_LIFETIME_THRESHOLD, BALANCE_BUMP_AMOUNT);
}

pub fn read_total_supply(env: &Env) -> i128 {
    env.storage()
        .instance()
        .get(&DataKey::TotalSupply)
        .unwrap_or(0)
}

pub fn write_total_supply(env: &Env, supply: i128) {
    env.storage().instance().set(&DataKey::TotalSupply, &supply);
}

pub fn read_accumulator(env: &Env, currency: &Address) -> CurrencyAccumulator {
    env.storage()
        .instance()
        .get(&DataKey::Accumulator(currency.clone()))
        .unwrap_or_default()
}

pub fn write_accumulator(env: &Env, currency: &Address, acc: &CurrencyAccumulator) {
    env.storage()
        .instance()
        .set(&DataKey::Accumulator(currency.clone()), acc);
}

pub fn read_checkpoint(env: &Env, currency: &Address, holder: &Address) -> HolderCheckpoint {
    let key = DataKey::Checkpoint(currency.clone(), holder.clone());
    match env
        .storage()
        .persistent()
        .get::<DataKey, HolderCheckpoint>(&key)
    {
        Some(checkpoint) => {
            env.storage()
                .persistent()
                .extend_ttl(&key, BALANCE_LIFETIME_THRESHOLD, BALANCE_BUMP_AMOUNT);
            checkpoint
        }
        None => HolderCheckpoint::default(),
    }
}

pub fn write_checkpoint(
    env: &Env,
    currency: &Address,
    holder: &Address,
    checkpoint: &HolderCheckpoint,
) {
    let key = DataKey::Checkpoint(currency.clone(), holder.clone());
    if *checkpoint == HolderCheckpoint::default() {
        env.storage().persistent().remove(&key);
        return;
    }
    env.storage().persistent().set(&key, checkpoint);
    env.storage()
        .persistent()
        .extend_ttl(&key, BALANCE_LIFETIME_THRESHOLD, BALANCE_BUMP_AMOUNT);
}
