use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    // ============================================
    // INITIALIZATION ERRORS (1-9)
    // ============================================
    /// Contract already initialized
    AlreadyInitialized = 1,
    /// Contract not initialized
    NotInitialized = 2,

    // ============================================
    // CREATION ERRORS (20-39)
    // ============================================
    /// Empty collateral list
    NoCollateralsProvided = 20,
    /// More collaterals than `max_collaterals_per_advance`
    TooManyCollaterals = 21,
    /// Collateral token is the null (factory) address
    ZeroCollateralTokenAddress = 22,
    /// Collateral token unknown to the registry
    CollateralNotRegistered = 23,
    /// Collateral token is not a share ledger
    CollateralNotCompatibleType = 24,
    /// Collateral amount must be positive
    ZeroCollateralAmount = 25,
    /// Collateral receiver is the null (factory) address
    ZeroCollateralReceiverAddress = 26,
    /// Principal must be positive
    ZeroAdvanceAmount = 27,
    /// Fee above 1,000,000 ppm (100%)
    FeePpmTooHigh = 28,

    // ============================================
    // CONFIGURATION ERRORS (40-49)
    // ============================================
    /// Template hash is all zeroes
    ZeroTemplateHash = 40,
    /// Payment currency is the null (factory) address
    ZeroPaymentCurrencyAddress = 41,
    /// Collateral registry is the null (factory) address
    ZeroCollateralRegistryAddress = 42,
    /// Offer duration must be positive
    ZeroOfferDuration = 43,
    /// Collateral limit must be positive
    ZeroMaxCollateralsPerAdvance = 44,

    // ============================================
    // OPERATIONAL ERRORS (50-59)
    // ============================================
    /// Contract is paused
    ContractPaused = 50,
    /// No advance under this id
    AdvanceNotFound = 51,
    /// Advance counter overflow
    Overflow = 52,
}
