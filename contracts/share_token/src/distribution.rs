use crate::error::Error;
use crate::storage::{
    CurrencyAccumulator, FeeConfig, HolderCheckpoint, ACC_PRECISION, BASIS_POINTS,
};

/// Funds picked up by one observation
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Deposit {
    pub amount: i128,
    pub fee: i128,
}

/// Fold newly arrived funds into the accumulator
///
/// Formula:
/// - delta = current_balance - last_observed_balance
/// - fee = delta × payment_fee_bps / 10,000
/// - acc_per_share += ((delta - fee) × PRECISION + residual) / total_supply
///
/// Example:
/// - supply 1,000, deposit 100, fee 10%
/// - fee = 10, distributable = 90
/// - acc_per_share = 90 / 1,000 = 0.09 per share
///
/// With zero supply nothing is observed; the funds stay pending until
/// there are holders to attribute them to.
pub fn accrue(
    acc: &mut CurrencyAccumulator,
    current_balance: i128,
    total_supply: i128,
    payment_fee_bps: i128,
) -> Result<Option<Deposit>, Error> {
    if total_supply <= 0 || current_balance <= acc.last_observed_balance {
        return Ok(None);
    }

    let delta = current_balance - acc.last_observed_balance;
    let fee = delta
        .checked_mul(payment_fee_bps)
        .ok_or(Error::Overflow)?
        / BASIS_POINTS;

    let scaled = (delta - fee)
        .checked_mul(ACC_PRECISION)
        .and_then(|v| v.checked_add(acc.residual))
        .ok_or(Error::Overflow)?;

    acc.acc_per_share = acc
        .acc_per_share
        .checked_add(scaled / total_supply)
        .ok_or(Error::Overflow)?;
    acc.residual = scaled % total_supply;
    acc.fee_reservoir = acc
        .fee_reservoir
        .checked_add(fee)
        .ok_or(Error::Overflow)?;
    acc.last_observed_balance = current_balance;

    Ok(Some(Deposit { amount: delta, fee }))
}

/// Scaled value accrued since the holder's last checkpoint
fn pending_scaled(
    balance: i128,
    acc_per_share: i128,
    checkpoint: &HolderCheckpoint,
) -> Result<i128, Error> {
    balance
        .checked_mul(acc_per_share)
        .and_then(|v| v.checked_sub(checkpoint.debt))
        .ok_or(Error::Overflow)
}

/// Amount a holder could withdraw right now
///
/// Formula: credited + (balance × acc_per_share - debt) / PRECISION
pub fn claimable(
    balance: i128,
    acc_per_share: i128,
    checkpoint: &HolderCheckpoint,
) -> Result<i128, Error> {
    let pending = pending_scaled(balance, acc_per_share, checkpoint)?;
    checkpoint
        .credited
        .checked_add(pending / ACC_PRECISION)
        .ok_or(Error::Overflow)
}

/// Flush accrued value into `credited` using the balance it was earned
/// with, then re-base the debt on the balance the holder ends up with.
///
/// The sub-unit remainder stays attached to the holder so repeated
/// settlements never round value away.
pub fn settle(
    checkpoint: &HolderCheckpoint,
    old_balance: i128,
    new_balance: i128,
    acc_per_share: i128,
) -> Result<HolderCheckpoint, Error> {
    let pending = pending_scaled(old_balance, acc_per_share, checkpoint)?;

    let credited = checkpoint
        .credited
        .checked_add(pending / ACC_PRECISION)
        .ok_or(Error::Overflow)?;
    let debt = new_balance
        .checked_mul(acc_per_share)
        .and_then(|v| v.checked_sub(pending % ACC_PRECISION))
        .ok_or(Error::Overflow)?;

    Ok(HolderCheckpoint { debt, credited })
}

/// Split a raw claim between holder and relayer
///
/// Formula: cut = min(raw × relayer_fee_bps / 10,000, max_relayer_fee)
///
/// Example:
/// - raw claim: 100, relayer fee: 20%, cap: 1
/// - cut: min(20, 1) = 1, holder receives 99
pub fn split_relayer_fee(raw: i128, config: &FeeConfig) -> Result<(i128, i128), Error> {
    let uncapped = raw
        .checked_mul(config.relayer_fee_bps)
        .ok_or(Error::Overflow)?
        / BASIS_POINTS;
    let cut = uncapped.min(config.max_relayer_fee);
    Ok((raw - cut, cut))
}

pub fn validate_fee_config(config: &FeeConfig) -> Result<(), Error> {
    let valid_bps = |bps: i128| (0..=BASIS_POINTS).contains(&bps);
    if !valid_bps(config.payment_fee_bps)
        || !valid_bps(config.relayer_fee_bps)
        || config.max_relayer_fee < 0
    {
        return Err(Error::InvalidFeeConfig);
    }
    Ok(())
}
