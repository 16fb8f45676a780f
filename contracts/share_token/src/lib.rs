#![no_std]

mod distribution;
mod error;
mod events;
mod storage;


pub use error::Error;
pub use storage::{CurrencyAccumulator, FeeConfig};

use distribution::{accrue, claimable, settle, split_relayer_fee, validate_fee_config};
use events::*;
use storage::{
    bump_instance, read_accumulator, read_balance, read_checkpoint, read_total_supply,
    write_accumulator, write_balance, write_checkpoint, write_total_supply, DataKey,
    MAX_CURRENCIES,
};

use soroban_sdk::{
    contract, contractimpl, log, token, vec, Address, Env, String, Symbol, Vec,
};

#[contract]
pub struct ShareToken;

#[contractimpl]
impl ShareToken {
    // ============================================
    // INITIALIZATION & ADMIN
    // ============================================

    /// Initialize the share ledger
    ///
    /// # Errors
    /// - `AlreadyInitialized`: Contract already initialized
    pub fn initialize(
        env: Env,
        admin: Address,
        name: String,
        symbol: String,
        decimals: u32,
        fee_recipient: Address,
    ) -> Result<(), Error> {
        if env.storage().instance().has(&DataKey::Initialized) {
            return Err(Error::AlreadyInitialized);
        }

        admin.require_auth();

        env.storage().instance().set(&DataKey::Initialized, &true);
        env.storage().instance().set(&DataKey::Admin, &admin);
        env.storage().instance().set(&DataKey::Name, &name);
        env.storage().instance().set(&DataKey::Symbol, &symbol);
        env.storage().instance().set(&DataKey::Decimals, &decimals);
        env.storage()
            .instance()
            .set(&DataKey::FeeRecipient, &fee_recipient);
        env.storage().instance().set(&DataKey::IssuanceClosed, &false);
        env.storage()
            .instance()
            .set(&DataKey::Currencies, &Vec::<Address>::new(&env));
        bump_instance(&env);

        Ok(())
    }

    /// Mint shares while issuance is still open
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `IssuanceClosed`: Supply has been locked
    /// - `InvalidAmount`: Amount <= 0
    /// - `LedgerAsHolder`: `to` is this contract
    pub fn mint(env: Env, to: Address, amount: i128) -> Result<(), Error> {
        Self::admin(&env)?.require_auth();

        if Self::issuance_closed(&env) {
            return Err(Error::IssuanceClosed);
        }

        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }

        if to == env.current_contract_address() {
            return Err(Error::LedgerAsHolder);
        }

        let balance = read_balance(&env, &to);
        let new_balance = balance.checked_add(amount).ok_or(Error::Overflow)?;
        let new_supply = read_total_supply(&env)
            .checked_add(amount)
            .ok_or(Error::Overflow)?;

        Self::settle_holders(&env, &[(&to, balance, new_balance)])?;

        write_balance(&env, &to, new_balance);
        write_total_supply(&env, new_supply);
        bump_instance(&env);

        env.events().publish(
            (Symbol::new(&env, "mint"), to.clone()),
            MintEvent { to, amount },
        );

        Ok(())
    }

    /// Lock the total supply for the rest of the instrument's life
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    pub fn close_issuance(env: Env) -> Result<(), Error> {
        Self::admin(&env)?.require_auth();

        env.storage().instance().set(&DataKey::IssuanceClosed, &true);
        bump_instance(&env);
        Ok(())
    }

    /// Register (or update) the fee config of a payout currency
    ///
    /// Funds already received are observed under the previous rates first.
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `InvalidFeeConfig`: Rate above 100% or negative relayer cap
    /// - `TooManyCurrencies`: Currency limit reached
    pub fn set_fee_config(env: Env, currency: Address, config: FeeConfig) -> Result<(), Error> {
        Self::admin(&env)?.require_auth();
        validate_fee_config(&config)?;

        let mut currencies = Self::currencies(env.clone());
        if currencies.contains(&currency) {
            let previous = Self::fee_config(&env, &currency)?;
            Self::sync(&env, &currency, &previous)?;
        } else {
            if currencies.len() >= MAX_CURRENCIES {
                return Err(Error::TooManyCurrencies);
            }
            currencies.push_back(currency.clone());
            env.storage()
                .instance()
                .set(&DataKey::Currencies, &currencies);
        }

        env.storage()
            .instance()
            .set(&DataKey::FeeConfig(currency), &config);
        bump_instance(&env);

        Ok(())
    }

    /// Point transfers at a registry that detects cyclic ownership
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    pub fn set_relations_registry(env: Env, registry: Address) -> Result<(), Error> {
        Self::admin(&env)?.require_auth();

        env.storage()
            .instance()
            .set(&DataKey::RelationsRegistry, &registry);
        bump_instance(&env);
        Ok(())
    }

    // ============================================
    // SHARE LEDGER
    // ============================================

    /// Transfer shares between holders
    ///
    /// Both sides are settled against every payout currency with their
    /// pre-transfer balances before anything moves.
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `InvalidAmount`: Amount <= 0
    /// - `SelfTransfer`: `from == to`
    /// - `LedgerAsHolder`: `to` is this contract
    /// - `InsufficientBalance`: Not enough shares
    /// - `OwnershipCycle`: Receiver would end up holding itself
    pub fn transfer(env: Env, from: Address, to: Address, amount: i128) -> Result<(), Error> {
        if !env.storage().instance().has(&DataKey::Initialized) {
            return Err(Error::NotInitialized);
        }

        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }

        if from == to {
            return Err(Error::SelfTransfer);
        }

        if to == env.current_contract_address() {
            return Err(Error::LedgerAsHolder);
        }

        from.require_auth();

        let from_balance = read_balance(&env, &from);
        if from_balance < amount {
            return Err(Error::InsufficientBalance);
        }

        if let Some(registry) = env
            .storage()
            .instance()
            .get::<DataKey, Address>(&DataKey::RelationsRegistry)
        {
            let cyclic: bool = env.invoke_contract(
                &registry,
                &Symbol::new(&env, "would_create_cycle"),
                vec![
                    &env,
                    to.to_val(),
                    env.current_contract_address().to_val(),
                ],
            );
            if cyclic {
                return Err(Error::OwnershipCycle);
            }
        }

        let to_balance = read_balance(&env, &to);
        let new_from_balance = from_balance - amount;
        let new_to_balance = to_balance.checked_add(amount).ok_or(Error::Overflow)?;

        Self::settle_holders(
            &env,
            &[
                (&from, from_balance, new_from_balance),
                (&to, to_balance, new_to_balance),
            ],
        )?;

        write_balance(&env, &from, new_from_balance);
        write_balance(&env, &to, new_to_balance);
        bump_instance(&env);

        env.events().publish(
            (Symbol::new(&env, "transfer"), from.clone()),
            TransferEvent { from, to, amount },
        );

        Ok(())
    }

    // ============================================
    // DISTRIBUTION
    // ============================================

    /// Pick up funds received since the last observation
    ///
    /// # Errors
    /// - `CurrencyNotSupported`: No fee config for this currency
    pub fn observe(env: Env, currency: Address) -> Result<CurrencyAccumulator, Error> {
        let config = Self::fee_config(&env, &currency)?;
        Self::sync(&env, &currency, &config)
    }

    /// Amount `holder` could claim in `currency` right now
    pub fn get_claimable(env: Env, holder: Address, currency: Address) -> Result<i128, Error> {
        let config = match Self::fee_config(&env, &currency) {
            Ok(config) => config,
            Err(Error::CurrencyNotSupported) => return Ok(0),
            Err(e) => return Err(e),
        };
        let acc = Self::sync(&env, &currency, &config)?;

        claimable(
            read_balance(&env, &holder),
            acc.acc_per_share,
            &read_checkpoint(&env, &currency, &holder),
        )
    }

    /// Claim everything accrued to `holder` in `currency`
    ///
    /// # Errors
    /// - `CurrencyNotSupported`: No fee config for this currency
    /// - `NothingToClaim`: Nothing accrued
    pub fn claim(env: Env, holder: Address, currency: Address) -> Result<i128, Error> {
        holder.require_auth();

        let (amount, _) = Self::payout(&env, &holder, &currency, None)?;
        Ok(amount)
    }

    /// Claimable amount net of the relayer cut, and the cut itself
    pub fn get_claimable_with_relayer_fee(
        env: Env,
        holder: Address,
        currency: Address,
    ) -> Result<(i128, i128), Error> {
        let config = match Self::fee_config(&env, &currency) {
            Ok(config) => config,
            Err(Error::CurrencyNotSupported) => return Ok((0, 0)),
            Err(e) => return Err(e),
        };
        let raw = Self::get_claimable(env, holder, currency)?;
        split_relayer_fee(raw, &config)
    }

    /// Claim on behalf of `holder`, paying `relayer` a capped cut
    ///
    /// Only the relayer authorizes; proceeds always go to the holder.
    ///
    /// # Errors
    /// - `CurrencyNotSupported`: No fee config for this currency
    /// - `NothingToClaim`: Nothing accrued
    pub fn claim_with_relayer_fee(
        env: Env,
        holder: Address,
        currency: Address,
        relayer: Address,
    ) -> Result<(i128, i128), Error> {
        relayer.require_auth();

        Self::payout(&env, &holder, &currency, Some(&relayer))
    }

    /// Send the accrued protocol fee to the fee recipient
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `CurrencyNotSupported`: No fee config for this currency
    /// - `NothingToClaim`: Reservoir is empty
    pub fn collect_protocol_fee(env: Env, currency: Address) -> Result<i128, Error> {
        Self::admin(&env)?.require_auth();

        let config = Self::fee_config(&env, &currency)?;
        let mut acc = Self::sync(&env, &currency, &config)?;

        let amount = acc.fee_reservoir;
        if amount == 0 {
            return Err(Error::NothingToClaim);
        }

        acc.fee_reservoir = 0;
        acc.last_observed_balance -= amount;
        write_accumulator(&env, &currency, &acc);

        let recipient = Self::fee_recipient(env.clone())?;
        token::Client::new(&env, &currency).transfer(
            &env.current_contract_address(),
            &recipient,
            &amount,
        );

        log!(&env, "protocol fee collected", amount);
        env.events().publish(
            (Symbol::new(&env, "fee_collected"), currency.clone()),
            FeeCollectedEvent {
                currency,
                recipient,
                amount,
            },
        );

        Ok(amount)
    }

    // ============================================
    // VIEW FUNCTIONS
    // ============================================

    pub fn balance(env: Env, id: Address) -> i128 {
        read_balance(&env, &id)
    }

    pub fn total_supply(env: Env) -> i128 {
        read_total_supply(&env)
    }

    pub fn name(env: Env) -> Result<String, Error> {
        env.storage()
            .instance()
            .get(&DataKey::Name)
            .ok_or(Error::NotInitialized)
    }

    pub fn symbol(env: Env) -> Result<String, Error> {
        env.storage()
            .instance()
            .get(&DataKey::Symbol)
            .ok_or(Error::NotInitialized)
    }

    pub fn decimals(env: Env) -> Result<u32, Error> {
        env.storage()
            .instance()
            .get(&DataKey::Decimals)
            .ok_or(Error::NotInitialized)
    }

    pub fn fee_recipient(env: Env) -> Result<Address, Error> {
        env.storage()
            .instance()
            .get(&DataKey::FeeRecipient)
            .ok_or(Error::NotInitialized)
    }

    /// Payout currencies with a registered fee config
    pub fn currencies(env: Env) -> Vec<Address> {
        env.storage()
            .instance()
            .get(&DataKey::Currencies)
            .unwrap_or(Vec::new(&env))
    }

    pub fn get_fee_config(env: Env, currency: Address) -> Result<FeeConfig, Error> {
        Self::fee_config(&env, &currency)
    }

    /// Stored accumulator, as of the last observation
    pub fn get_accumulator(env: Env, currency: Address) -> CurrencyAccumulator {
        read_accumulator(&env, &currency)
    }
}

// ============================================
// INTERNAL HELPERS
// ============================================

impl ShareToken {
    fn admin(env: &Env) -> Result<Address, Error> {
        env.storage()
            .instance()
            .get(&DataKey::Admin)
            .ok_or(Error::NotInitialized)
    }

    fn issuance_closed(env: &Env) -> bool {
        env.storage()
            .instance()
            .get::<DataKey, bool>(&DataKey::IssuanceClosed)
            .unwrap_or(false)
    }

    fn fee_config(env: &Env, currency: &Address) -> Result<FeeConfig, Error> {
        env.storage()
            .instance()
            .get(&DataKey::FeeConfig(currency.clone()))
            .ok_or(Error::CurrencyNotSupported)
    }

    /// Checked update run before every accumulator read or write
    fn sync(
        env: &Env,
        currency: &Address,
        config: &FeeConfig,
    ) -> Result<CurrencyAccumulator, Error> {
        let mut acc = read_accumulator(env, currency);
        let current_balance =
            token::Client::new(env, currency).balance(&env.current_contract_address());

        if let Some(deposit) = accrue(
            &mut acc,
            current_balance,
            read_total_supply(env),
            config.payment_fee_bps,
        )? {
            write_accumulator(env, currency, &acc);

            env.events().publish(
                (Symbol::new(env, "deposit_observed"), currency.clone()),
                DepositObservedEvent {
                    currency: currency.clone(),
                    amount: deposit.amount,
                    fee: deposit.fee,
                    acc_per_share: acc.acc_per_share,
                },
            );
        }

        Ok(acc)
    }

    /// Flush accrued value for every (holder, old balance, new balance)
    /// against every payout currency. Must run before balances change.
    fn settle_holders(env: &Env, changes: &[(&Address, i128, i128)]) -> Result<(), Error> {
        for currency in Self::currencies(env.clone()).iter() {
            let config = Self::fee_config(env, &currency)?;
            let acc = Self::sync(env, &currency, &config)?;

            for (holder, old_balance, new_balance) in changes.iter() {
                let checkpoint = read_checkpoint(env, &currency, holder);
                let checkpoint = settle(&checkpoint, *old_balance, *new_balance, acc.acc_per_share)?;
                write_checkpoint(env, &currency, holder, &checkpoint);
            }
        }
        Ok(())
    }

    /// Pay out everything accrued to `holder`, optionally splitting off a
    /// relayer cut. Bookkeeping is written before any token moves.
    fn payout(
        env: &Env,
        holder: &Address,
        currency: &Address,
        relayer: Option<&Address>,
    ) -> Result<(i128, i128), Error> {
        let config = Self::fee_config(env, currency)?;
        let mut acc = Self::sync(env, currency, &config)?;

        let balance = read_balance(env, holder);
        let checkpoint = read_checkpoint(env, currency, holder);
        let mut checkpoint = settle(&checkpoint, balance, balance, acc.acc_per_share)?;

        let raw = checkpoint.credited;
        if raw == 0 {
            return Err(Error::NothingToClaim);
        }

        let (net, cut) = match relayer {
            Some(_) => split_relayer_fee(raw, &config)?,
            None => (raw, 0),
        };

        checkpoint.credited = 0;
        write_checkpoint(env, currency, holder, &checkpoint);
        acc.last_observed_balance -= raw;
        write_accumulator(env, currency, &acc);
        bump_instance(env);

        let client = token::Client::new(env, currency);
        let this = env.current_contract_address();
        if net > 0 {
            client.transfer(&this, holder, &net);
        }
        if let Some(relayer) = relayer {
            if cut > 0 {
                client.transfer(&this, relayer, &cut);
            }
        }

        env.events().publish(
            (Symbol::new(env, "claim"), holder.clone()),
            ClaimEvent {
                holder: holder.clone(),
                currency: currency.clone(),
                amount: net,
                relayer: relayer.cloned(),
                relayer_fee: cut,
            },
        );

        Ok((net, cut))
    }
}
