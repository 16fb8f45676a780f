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
    // BALANCE ERRORS (20-29)
    // ============================================
    /// Holder doesn't have enough shares
    InsufficientBalance = 20,
    /// Amount must be positive
    InvalidAmount = 21,
    /// Sender and receiver are the same account
    SelfTransfer = 22,
    /// Supply is locked, no more shares can be minted
    IssuanceClosed = 23,
    /// Shares cannot be held by the ledger itself
    LedgerAsHolder = 24,

    // ============================================
    // DISTRIBUTION ERRORS (30-39)
    // ============================================
    /// Holder has nothing accrued in this currency
    NothingToClaim = 30,
    /// Currency has no fee config registered
    CurrencyNotSupported = 31,
    /// Currency limit reached
    TooManyCurrencies = 32,
    /// Fee rate above 100% or negative relayer cap
    InvalidFeeConfig = 33,
    /// Fixed-point arithmetic overflowed
    Overflow = 34,

    // ============================================
    // RELATIONS ERRORS (40-49)
    // ============================================
    /// Receiver would end up (transitively) holding itself
    OwnershipCycle = 40,
}
