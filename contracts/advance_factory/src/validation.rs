use crate::error::Error;
use crate::storage::AdvanceConfig;
use advance_common::{Collateral, PPM_DENOMINATOR};
use soroban_sdk::{vec, Address, BytesN, Env, Symbol, Vec};

pub fn check_template_hash(hash: &BytesN<32>) -> Result<(), Error> {
    if hash.to_array() == [0u8; 32] {
        return Err(Error::ZeroTemplateHash);
    }
    Ok(())
}

/// The factory's own address is the null address: nothing legitimate is
/// ever paid to it or minted by it.
pub fn check_address(env: &Env, address: &Address, error: Error) -> Result<(), Error> {
    if *address == env.current_contract_address() {
        return Err(error);
    }
    Ok(())
}

pub fn check_offer_duration(offer_duration: u64) -> Result<(), Error> {
    if offer_duration == 0 {
        return Err(Error::ZeroOfferDuration);
    }
    Ok(())
}

pub fn check_max_collaterals(max_collaterals: u32) -> Result<(), Error> {
    if max_collaterals == 0 {
        return Err(Error::ZeroMaxCollateralsPerAdvance);
    }
    Ok(())
}

pub fn validate_config(env: &Env, config: &AdvanceConfig) -> Result<(), Error> {
    check_template_hash(&config.template_hash)?;
    check_address(env, &config.payment_currency, Error::ZeroPaymentCurrencyAddress)?;
    check_address(
        env,
        &config.collateral_registry,
        Error::ZeroCollateralRegistryAddress,
    )?;
    check_offer_duration(config.offer_duration)?;
    check_max_collaterals(config.max_collaterals_per_advance)
}

/// Vet a creation request. Checks run in a fixed order and the first
/// failure wins.
///
/// # Errors
/// - `NoCollateralsProvided`, `TooManyCollaterals`
/// - per collateral: `ZeroCollateralTokenAddress`, `CollateralNotRegistered`,
///   `CollateralNotCompatibleType`, `ZeroCollateralAmount`
/// - `ZeroCollateralReceiverAddress`, `ZeroAdvanceAmount`, `FeePpmTooHigh`
pub fn validate_creation(
    env: &Env,
    config: &AdvanceConfig,
    collaterals: &Vec<Collateral>,
    collateral_receiver: &Address,
    principal: i128,
    fee_ppm: u32,
) -> Result<(), Error> {
    if collaterals.is_empty() {
        return Err(Error::NoCollateralsProvided);
    }
    if collaterals.len() > config.max_collaterals_per_advance {
        return Err(Error::TooManyCollaterals);
    }

    for collateral in collaterals.iter() {
        check_address(env, &collateral.token, Error::ZeroCollateralTokenAddress)?;

        let registered: bool = env.invoke_contract(
            &config.collateral_registry,
            &Symbol::new(env, "is_registered"),
            vec![env, collateral.token.to_val()],
        );
        if !registered {
            return Err(Error::CollateralNotRegistered);
        }

        let share_ledger: bool = env.invoke_contract(
            &config.collateral_registry,
            &Symbol::new(env, "is_share_ledger"),
            vec![env, collateral.token.to_val()],
        );
        if !share_ledger {
            return Err(Error::CollateralNotCompatibleType);
        }

        if collateral.amount <= 0 {
            return Err(Error::ZeroCollateralAmount);
        }
    }

    check_address(env, collateral_receiver, Error::ZeroCollateralReceiverAddress)?;

    if principal <= 0 {
        return Err(Error::ZeroAdvanceAmount);
    }
    if fee_ppm > PPM_DENOMINATOR {
        return Err(Error::FeePpmTooHigh);
    }

    Ok(())
}
