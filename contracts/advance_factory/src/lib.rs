#![no_std]

mod error;
mod events;
mod storage;
mod validation;


pub use error::Error;
pub use storage::AdvanceConfig;

use advance_common::{AdvanceTerms, Collateral};
use events::*;
use storage::{bump_instance, read_advance, write_advance, DataKey};
use validation::{
    check_address, check_max_collaterals, check_offer_duration, check_template_hash,
    validate_config, validate_creation,
};

use soroban_sdk::{
    contract, contractimpl, log, token, vec, Address, BytesN, Env, IntoVal, Symbol, Val, Vec,
};

#[contract]
pub struct AdvanceFactory;

#[contractimpl]
impl AdvanceFactory {
    // ============================================
    // INITIALIZATION & ADMIN
    // ============================================

    /// # Errors
    /// - `AlreadyInitialized`: Contract already initialized
    /// - `Zero*`: A config field holds its zero value
    pub fn initialize(env: Env, owner: Address, config: AdvanceConfig) -> Result<(), Error> {
        if env.storage().instance().has(&DataKey::Initialized) {
            return Err(Error::AlreadyInitialized);
        }

        owner.require_auth();
        validate_config(&env, &config)?;

        env.storage().instance().set(&DataKey::Initialized, &true);
        env.storage().instance().set(&DataKey::Owner, &owner);
        env.storage().instance().set(&DataKey::Config, &config);
        env.storage().instance().set(&DataKey::AdvanceCounter, &0u64);
        env.storage().instance().set(&DataKey::Paused, &false);
        bump_instance(&env);

        Ok(())
    }

    pub fn pause(env: Env) -> Result<(), Error> {
        Self::set_paused(&env, true)
    }

    pub fn unpause(env: Env) -> Result<(), Error> {
        Self::set_paused(&env, false)
    }

    // ============================================
    // CONFIGURATION SETTERS (owner only)
    // ============================================

    pub fn set_template_hash(env: Env, template_hash: BytesN<32>) -> Result<(), Error> {
        check_template_hash(&template_hash)?;
        Self::update_config(&env, "template_hash", template_hash.to_val(), |config| {
            config.template_hash = template_hash.clone()
        })
    }

    pub fn set_payment_currency(env: Env, payment_currency: Address) -> Result<(), Error> {
        check_address(&env, &payment_currency, Error::ZeroPaymentCurrencyAddress)?;
        Self::update_config(
            &env,
            "payment_currency",
            payment_currency.to_val(),
            |config| config.payment_currency = payment_currency.clone(),
        )
    }

    pub fn set_collateral_registry(env: Env, collateral_registry: Address) -> Result<(), Error> {
        check_address(
            &env,
            &collateral_registry,
            Error::ZeroCollateralRegistryAddress,
        )?;
        Self::update_config(
            &env,
            "collateral_registry",
            collateral_registry.to_val(),
            |config| config.collateral_registry = collateral_registry.clone(),
        )
    }

    pub fn set_offer_duration(env: Env, offer_duration: u64) -> Result<(), Error> {
        check_offer_duration(offer_duration)?;
        Self::update_config(
            &env,
            "offer_duration",
            offer_duration.into_val(&env),
            |config| config.offer_duration = offer_duration,
        )
    }

    pub fn set_max_collaterals_per_advance(env: Env, max_collaterals: u32) -> Result<(), Error> {
        check_max_collaterals(max_collaterals)?;
        Self::update_config(
            &env,
            "max_collaterals",
            max_collaterals.into_val(&env),
            |config| config.max_collaterals_per_advance = max_collaterals,
        )
    }

    // ============================================
    // CREATE ADVANCE
    // ============================================

    /// Deploy a pending advance and escrow the recipient's collateral in it
    ///
    /// Steps:
    /// 1. Validate the request against the current config
    /// 2. Index the advance under the next sequential id
    /// 3. Deploy the template with a salt derived from that id
    /// 4. Initialize the new contract with the terms
    /// 5. Move every collateral amount from the recipient into it
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `ContractPaused`: Creation is paused
    /// - Validation errors, in the order listed on `validate_creation`
    pub fn create_advance(
        env: Env,
        recipient: Address,
        collaterals: Vec<Collateral>,
        collateral_receiver: Address,
        principal: i128,
        fee_ppm: u32,
    ) -> Result<Address, Error> {
        let config = Self::config(&env)?;
        Self::check_not_paused(&env)?;

        recipient.require_auth();

        validate_creation(
            &env,
            &config,
            &collaterals,
            &collateral_receiver,
            principal,
            fee_ppm,
        )?;

        let id: u64 = env
            .storage()
            .instance()
            .get(&DataKey::AdvanceCounter)
            .unwrap_or(0);
        let next_id = id.checked_add(1).ok_or(Error::Overflow)?;

        let deployer = env.deployer().with_current_contract(Self::salt(&env, id));
        let advance = deployer.deployed_address();

        write_advance(&env, id, &advance);
        env.storage()
            .instance()
            .set(&DataKey::AdvanceCounter, &next_id);
        bump_instance(&env);

        deployer.deploy_v2(config.template_hash.clone(), ());

        let terms = AdvanceTerms {
            recipient: recipient.clone(),
            collateral_receiver,
            payment_currency: config.payment_currency,
            principal,
            fee_ppm,
            offer_duration: config.offer_duration,
            collaterals: collaterals.clone(),
        };
        let init_args: Vec<Val> = vec![
            &env,
            env.current_contract_address().to_val(),
            terms.into_val(&env),
        ];
        env.invoke_contract::<()>(&advance, &Symbol::new(&env, "initialize"), init_args);

        for collateral in collaterals.iter() {
            token::Client::new(&env, &collateral.token).transfer(
                &recipient,
                &advance,
                &collateral.amount,
            );
        }

        log!(&env, "advance deployed", advance.clone(), principal);
        env.events().publish(
            (Symbol::new(&env, "advance_deployed"), id),
            AdvanceDeployedEvent {
                id,
                advance: advance.clone(),
                recipient,
                principal,
                fee_ppm,
                collateral_count: collaterals.len(),
            },
        );

        Ok(advance)
    }

    // ============================================
    // VIEW FUNCTIONS
    // ============================================

    pub fn owner(env: Env) -> Result<Address, Error> {
        env.storage()
            .instance()
            .get(&DataKey::Owner)
            .ok_or(Error::NotInitialized)
    }

    pub fn get_config(env: Env) -> Result<AdvanceConfig, Error> {
        Self::config(&env)
    }

    pub fn is_paused(env: Env) -> bool {
        env.storage()
            .instance()
            .get(&DataKey::Paused)
            .unwrap_or(false)
    }

    /// Number of advances created so far; ids run from 0 to count - 1
    pub fn advance_count(env: Env) -> u64 {
        env.storage()
            .instance()
            .get(&DataKey::AdvanceCounter)
            .unwrap_or(0)
    }

    pub fn get_advance(env: Env, id: u64) -> Result<Address, Error> {
        read_advance(&env, id).ok_or(Error::AdvanceNotFound)
    }
}

// ============================================
// INTERNAL HELPERS
// ============================================

impl AdvanceFactory {
    fn config(env: &Env) -> Result<AdvanceConfig, Error> {
        env.storage()
            .instance()
            .get(&DataKey::Config)
            .ok_or(Error::NotInitialized)
    }

    fn check_not_paused(env: &Env) -> Result<(), Error> {
        let paused = env
            .storage()
            .instance()
            .get::<DataKey, bool>(&DataKey::Paused)
            .unwrap_or(false);

        if paused {
            return Err(Error::ContractPaused);
        }
        Ok(())
    }

    fn set_paused(env: &Env, paused: bool) -> Result<(), Error> {
        Self::owner(env.clone())?.require_auth();

        env.storage().instance().set(&DataKey::Paused, &paused);
        bump_instance(env);

        env.events()
            .publish((Symbol::new(env, "paused"),), PausedEvent { paused });
        Ok(())
    }

    /// Owner-gated read-modify-write of the config
    fn update_config(
        env: &Env,
        field: &str,
        value: Val,
        apply: impl FnOnce(&mut AdvanceConfig),
    ) -> Result<(), Error> {
        let mut config = Self::config(env)?;
        Self::owner(env.clone())?.require_auth();

        apply(&mut config);
        env.storage().instance().set(&DataKey::Config, &config);
        bump_instance(env);

        env.events().publish(
            (Symbol::new(env, "config_updated"), Symbol::new(env, field)),
            value,
        );
        Ok(())
    }

    /// Big-endian id in the low bytes, so every id maps to its own address
    fn salt(env: &Env, id: u64) -> BytesN<32> {
        let mut salt = [0u8; 32];
        salt[24..].copy_from_slice(&id.to_be_bytes());
        BytesN::from_array(env, &salt)
    }
}
