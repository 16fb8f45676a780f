#![no_std]

//! Contract types shared between the advance factory and the advance
//! contracts it deploys.

use soroban_sdk::{contracttype, Address, Vec};

/// 100% expressed in parts per million
pub const PPM_DENOMINATOR: u32 = 1_000_000;

/// Share tokens held in custody by an advance
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Collateral {
    /// Share token contract (one instrument per contract)
    pub token: Address,
    /// Number of shares escrowed
    pub amount: i128,
}

/// Terms an advance contract is initialized with
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AdvanceTerms {
    /// Owner of the collateral, receives the principal
    pub recipient: Address,
    /// Receives the collateral once the advance is fully repaid
    pub collateral_receiver: Address,
    /// Token the principal and repayments are denominated in
    pub payment_currency: Address,
    pub principal: i128,
    /// Fee on top of principal, in parts per million
    pub fee_ppm: u32,
    /// Seconds the offer stays open for an advancer
    pub offer_duration: u64,
    pub collaterals: Vec<Collateral>,
}
