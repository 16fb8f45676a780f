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
    /// Terms rejected (no collateral, non-positive amounts, fee above 100%)
    InvalidTerms = 3,

    // ============================================
    // AUTHORIZATION ERRORS (10-19)
    // ============================================
    /// Caller is not the recipient
    NotAuthorized = 10,

    // ============================================
    // STATE ERRORS (20-29)
    // ============================================
    /// Advance already provided
    AlreadyActive = 20,
    /// Advance revoked by the recipient
    AlreadyRevoked = 21,
    /// Operation requires an active advance
    NotActive = 22,
    /// Offer window has passed
    Expired = 23,
    /// Advance fully repaid
    AlreadyRepaid = 24,

    // ============================================
    // SETTLEMENT ERRORS (30-39)
    // ============================================
    /// No payment tokens held by the contract
    NothingToProcess = 30,
    /// Arithmetic overflow
    Overflow = 31,
}
