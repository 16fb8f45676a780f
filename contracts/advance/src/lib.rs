#![no_std]

mod error;
mod events;
mod recoupment;
mod storage;

#[cfg(test)]
mod test;

pub use error::Error;
pub use storage::{Advance, AdvanceState};

use advance_common::{AdvanceTerms, PPM_DENOMINATOR};
use events::*;
use recoupment::{calculate_recoupment, calculate_repayment};
use storage::{DataKey, INSTANCE_BUMP_AMOUNT, INSTANCE_LIFETIME_THRESHOLD};

use soroban_sdk::{contract, contractimpl, log, token, vec, Address, Env, Symbol, Vec};

#[contract]
pub struct AdvanceContract;

#[contractimpl]
impl AdvanceContract {
    // ============================================
    // INITIALIZATION
    // ============================================

    /// Set up a pending advance. Collateral is moved in by the factory
    /// right after this call.
    ///
    /// # Errors
    /// - `AlreadyInitialized`: Contract already initialized
    /// - `InvalidTerms`: No collateral, non-positive amounts or fee above 100%
    /// - `Overflow`: Recoupment or expiry overflows
    pub fn initialize(env: Env, factory: Address, terms: AdvanceTerms) -> Result<(), Error> {
        if env.storage().instance().has(&DataKey::Initialized) {
            return Err(Error::AlreadyInitialized);
        }

        factory.require_auth();

        if terms.collaterals.is_empty()
            || terms.collaterals.iter().any(|c| c.amount <= 0)
            || terms.principal <= 0
            || terms.fee_ppm > PPM_DENOMINATOR
        {
            return Err(Error::InvalidTerms);
        }

        let recoupment_amount =
            calculate_recoupment(terms.principal, terms.fee_ppm).ok_or(Error::Overflow)?;

        let created_at = env.ledger().timestamp();
        let expires_at = created_at
            .checked_add(terms.offer_duration)
            .ok_or(Error::Overflow)?;

        let advance = Advance {
            state: AdvanceState::Pending,
            factory,
            recipient: terms.recipient,
            collateral_receiver: terms.collateral_receiver,
            advancer: None,
            payment_currency: terms.payment_currency,
            principal: terms.principal,
            fee_ppm: terms.fee_ppm,
            recoupment_amount,
            amount_repaid: 0,
            created_at,
            expires_at,
            collaterals: terms.collaterals,
        };

        env.storage().instance().set(&DataKey::Initialized, &true);
        Self::save(&env, &advance);

        env.events().publish(
            (Symbol::new(&env, "advance_created"), advance.recipient.clone()),
            AdvanceCreatedEvent {
                recipient: advance.recipient.clone(),
                collateral_receiver: advance.collateral_receiver.clone(),
                principal: advance.principal,
                recoupment_amount,
                expires_at,
            },
        );

        Ok(())
    }

    // ============================================
    // PROVIDE ADVANCE
    // ============================================

    /// Pay the principal to the recipient and activate the advance
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `Expired`: Offer window has passed
    /// - `AlreadyRevoked`: Recipient withdrew the offer
    /// - `AlreadyActive`: Advance already provided
    /// - `AlreadyRepaid`: Advance already settled
    pub fn provide_advance(env: Env, advancer: Address) -> Result<(), Error> {
        let mut advance = Self::load(&env)?;

        advancer.require_auth();

        if env.ledger().timestamp() > advance.expires_at {
            return Err(Error::Expired);
        }

        match advance.state {
            AdvanceState::Pending => {}
            AdvanceState::Revoked => return Err(Error::AlreadyRevoked),
            AdvanceState::Active => return Err(Error::AlreadyActive),
            AdvanceState::Repaid => return Err(Error::AlreadyRepaid),
        }

        advance.state = AdvanceState::Active;
        advance.advancer = Some(advancer.clone());
        Self::save(&env, &advance);

        token::Client::new(&env, &advance.payment_currency).transfer(
            &advancer,
            &advance.recipient,
            &advance.principal,
        );

        log!(&env, "advance provided", advance.principal);
        env.events().publish(
            (Symbol::new(&env, "advance_provided"), advancer.clone()),
            AdvanceProvidedEvent {
                advancer,
                recipient: advance.recipient,
                principal: advance.principal,
            },
        );

        Ok(())
    }

    // ============================================
    // REPAYMENT
    // ============================================

    /// Forward payment tokens held by the contract to the advancer, up to
    /// what is still owed. Releases the collateral once fully repaid.
    ///
    /// Anyone can call this; repayments accumulate across calls.
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `NotActive`: Advance not active
    /// - `NothingToProcess`: No payment tokens held
    pub fn process_repayment(env: Env) -> Result<(), Error> {
        let mut advance = Self::load(&env)?;

        if advance.state != AdvanceState::Active {
            return Err(Error::NotActive);
        }
        let advancer = advance.advancer.clone().ok_or(Error::NotActive)?;

        let payment = token::Client::new(&env, &advance.payment_currency);
        let this = env.current_contract_address();
        let available = payment.balance(&this);
        if available <= 0 {
            return Err(Error::NothingToProcess);
        }

        let amount = calculate_repayment(
            available,
            advance.recoupment_amount,
            advance.amount_repaid,
        );
        advance.amount_repaid = advance
            .amount_repaid
            .checked_add(amount)
            .ok_or(Error::Overflow)?;

        let fully_repaid = advance.amount_repaid == advance.recoupment_amount;
        if fully_repaid {
            advance.state = AdvanceState::Repaid;
        }
        Self::save(&env, &advance);

        payment.transfer(&this, &advancer, &amount);

        log!(&env, "repayment processed", amount, advance.amount_repaid);
        env.events().publish(
            (Symbol::new(&env, "repayment_processed"), advancer.clone()),
            RepaymentProcessedEvent {
                advancer,
                amount,
                amount_repaid: advance.amount_repaid,
                total_due: advance.recoupment_amount - advance.amount_repaid,
            },
        );

        if fully_repaid {
            Self::release_collaterals(&env, &advance, &advance.collateral_receiver);
            env.events().publish(
                (Symbol::new(&env, "advance_repaid"),),
                advance.recoupment_amount,
            );
        }

        Ok(())
    }

    // ============================================
    // REVOKE
    // ============================================

    /// Withdraw a pending offer and take the collateral back
    ///
    /// Collateral always returns to the recipient, never to the
    /// collateral receiver.
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `NotAuthorized`: Caller is not the recipient
    /// - `AlreadyActive`: Advance already provided
    /// - `AlreadyRevoked`: Already revoked
    /// - `AlreadyRepaid`: Advance already settled
    pub fn revoke_advance(env: Env, caller: Address) -> Result<(), Error> {
        let mut advance = Self::load(&env)?;

        caller.require_auth();
        if caller != advance.recipient {
            return Err(Error::NotAuthorized);
        }

        match advance.state {
            AdvanceState::Pending => {}
            AdvanceState::Active => return Err(Error::AlreadyActive),
            AdvanceState::Revoked => return Err(Error::AlreadyRevoked),
            AdvanceState::Repaid => return Err(Error::AlreadyRepaid),
        }

        advance.state = AdvanceState::Revoked;
        Self::save(&env, &advance);

        Self::release_collaterals(&env, &advance, &advance.recipient);
        Self::sweep_payment_token(&env, &advance);

        env.events().publish(
            (Symbol::new(&env, "advance_revoked"), advance.recipient.clone()),
            AdvanceRevokedEvent {
                recipient: advance.recipient,
            },
        );

        Ok(())
    }

    /// Return payment tokens the contract holds beyond what is owed
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `AlreadyActive`: Repayments still outstanding
    /// - `AlreadyRevoked`: Revocation already swept the balance
    /// - `NothingToProcess`: No payment tokens held
    pub fn reclaim_excess_payment_token(env: Env) -> Result<(), Error> {
        let advance = Self::load(&env)?;

        match advance.state {
            AdvanceState::Pending | AdvanceState::Repaid => {}
            AdvanceState::Active => return Err(Error::AlreadyActive),
            AdvanceState::Revoked => return Err(Error::AlreadyRevoked),
        }

        if Self::sweep_payment_token(&env, &advance) == 0 {
            return Err(Error::NothingToProcess);
        }

        Ok(())
    }

    // ============================================
    // VIEW FUNCTIONS
    // ============================================

    /// Amount still owed: recoupment minus everything repaid so far
    pub fn total_due(env: Env) -> Result<i128, Error> {
        let advance = Self::load(&env)?;
        Ok(advance.recoupment_amount - advance.amount_repaid)
    }

    pub fn state(env: Env) -> Result<AdvanceState, Error> {
        Ok(Self::load(&env)?.state)
    }

    pub fn get_advance(env: Env) -> Result<Advance, Error> {
        Self::load(&env)
    }
}

// ============================================
// INTERNAL HELPERS
// ============================================

impl AdvanceContract {
    fn load(env: &Env) -> Result<Advance, Error> {
        env.storage()
            .instance()
            .get(&DataKey::Advance)
            .ok_or(Error::NotInitialized)
    }

    fn save(env: &Env, advance: &Advance) {
        env.storage().instance().set(&DataKey::Advance, advance);
        env.storage()
            .instance()
            .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
    }

    /// Claim what each collateral earned while in custody, then hand the
    /// shares to `to`. Callers must persist the terminal state first.
    ///
    /// Payouts in the payment currency stay on the contract (repayment or
    /// reclaim picks them up); every other currency goes to the recipient.
    fn release_collaterals(env: &Env, advance: &Advance, to: &Address) {
        let this = env.current_contract_address();

        for collateral in advance.collaterals.iter() {
            let currencies: Vec<Address> = env.invoke_contract(
                &collateral.token,
                &Symbol::new(env, "currencies"),
                vec![env],
            );

            for currency in currencies.iter() {
                Self::claim_distribution(env, &collateral.token, &currency);
                if currency != advance.payment_currency {
                    Self::forward_distribution(env, &currency, &advance.recipient);
                }
            }

            token::Client::new(env, &collateral.token).transfer(&this, to, &collateral.amount);

            env.events().publish(
                (Symbol::new(env, "collateral_released"), collateral.token.clone()),
                CollateralReleasedEvent {
                    token: collateral.token.clone(),
                    to: to.clone(),
                    amount: collateral.amount,
                },
            );
        }
    }

    fn claim_distribution(env: &Env, share_token: &Address, currency: &Address) {
        let this = env.current_contract_address();

        let accrued: i128 = env.invoke_contract(
            share_token,
            &Symbol::new(env, "get_claimable"),
            vec![env, this.to_val(), currency.to_val()],
        );
        if accrued > 0 {
            env.invoke_contract::<i128>(
                share_token,
                &Symbol::new(env, "claim"),
                vec![env, this.to_val(), currency.to_val()],
            );
        }
    }

    /// Send the whole balance of a non-payment currency to the recipient,
    /// including payouts relayed to the contract earlier
    fn forward_distribution(env: &Env, currency: &Address, recipient: &Address) {
        let client = token::Client::new(env, currency);
        let this = env.current_contract_address();

        let amount = client.balance(&this);
        if amount > 0 {
            client.transfer(&this, recipient, &amount);

            env.events().publish(
                (Symbol::new(env, "distribution_forwarded"), currency.clone()),
                DistributionForwardedEvent {
                    currency: currency.clone(),
                    recipient: recipient.clone(),
                    amount,
                },
            );
        }
    }

    /// Send the whole payment-token balance to the recipient
    fn sweep_payment_token(env: &Env, advance: &Advance) -> i128 {
        let payment = token::Client::new(env, &advance.payment_currency);
        let this = env.current_contract_address();

        let amount = payment.balance(&this);
        if amount > 0 {
            payment.transfer(&this, &advance.recipient, &amount);

            env.events().publish(
                (Symbol::new(env, "excess_reclaimed"), advance.recipient.clone()),
                ExcessReclaimedEvent {
                    recipient: advance.recipient.clone(),
                    amount,
                },
            );
        }
        amount
    }
}
