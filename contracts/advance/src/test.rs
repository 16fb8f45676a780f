#![cfg(test)]
extern crate std;

use super::*;
use advance_common::Collateral;
use share_token::{FeeConfig, ShareToken, ShareTokenClient};
use soroban_sdk::{
    testutils::{Address as _, Ledger},
    token, vec, Address, Env, String,
};

const COLLATERAL: i128 = 400;
const HOLDINGS: i128 = 1_000;

struct Setup<'a> {
    env: Env,
    recipient: Address,
    collateral_receiver: Address,
    advancer: Address,
    payment: token::Client<'a>,
    payment_admin: token::StellarAssetClient<'a>,
    shares: ShareTokenClient<'a>,
    advance: AdvanceContractClient<'a>,
}

impl<'a> Setup<'a> {
    /// Repayment funds landing on the advance contract
    fn send_to_advance(&self, amount: i128) {
        self.payment_admin.mint(&self.advance.address, &amount);
    }

    /// Revenue landing on the collateral instrument
    fn deposit_revenue(&self, amount: i128) {
        self.payment_admin.mint(&self.shares.address, &amount);
    }

    /// Register a second payout currency on the collateral instrument
    fn second_currency(&self) -> (token::Client<'a>, token::StellarAssetClient<'a>) {
        let sac = self
            .env
            .register_stellar_asset_contract_v2(Address::generate(&self.env));
        self.shares.set_fee_config(
            &sac.address(),
            &FeeConfig {
                payment_fee_bps: 0,
                relayer_fee_bps: 0,
                max_relayer_fee: 0,
            },
        );
        (
            token::Client::new(&self.env, &sac.address()),
            token::StellarAssetClient::new(&self.env, &sac.address()),
        )
    }

    fn set_time(&self, timestamp: u64) {
        self.env.ledger().with_mut(|li| {
            li.timestamp = timestamp;
        });
    }
}

/// Pending advance: principal 10, fee 20%, 400 of the recipient's 1,000
/// shares escrowed, offer open for 10 seconds.
fn setup<'a>() -> Setup<'a> {
    let env = Env::default();
    env.mock_all_auths();

    let factory = Address::generate(&env);
    let recipient = Address::generate(&env);
    let collateral_receiver = Address::generate(&env);
    let advancer = Address::generate(&env);

    let sac = env.register_stellar_asset_contract_v2(Address::generate(&env));
    let payment = token::Client::new(&env, &sac.address());
    let payment_admin = token::StellarAssetClient::new(&env, &sac.address());
    payment_admin.mint(&advancer, &1_000);

    let shares_id = env.register(ShareToken, ());
    let shares = ShareTokenClient::new(&env, &shares_id);
    shares.initialize(
        &Address::generate(&env),
        &String::from_str(&env, "Catalog Royalties"),
        &String::from_str(&env, "ROYAL"),
        &0,
        &Address::generate(&env),
    );
    shares.mint(&recipient, &HOLDINGS);
    shares.set_fee_config(
        &payment.address,
        &FeeConfig {
            payment_fee_bps: 0,
            relayer_fee_bps: 0,
            max_relayer_fee: 0,
        },
    );

    let advance_id = env.register(AdvanceContract, ());
    let advance = AdvanceContractClient::new(&env, &advance_id);
    advance.initialize(
        &factory,
        &AdvanceTerms {
            recipient: recipient.clone(),
            collateral_receiver: collateral_receiver.clone(),
            payment_currency: payment.address.clone(),
            principal: 10,
            fee_ppm: 200_000,
            offer_duration: 10,
            collaterals: vec![
                &env,
                Collateral {
                    token: shares_id.clone(),
                    amount: COLLATERAL,
                },
            ],
        },
    );
    shares.transfer(&recipient, &advance_id, &COLLATERAL);

    Setup {
        env,
        recipient,
        collateral_receiver,
        advancer,
        payment,
        payment_admin,
        shares,
        advance,
    }
}

#[test]
fn test_initialize_once() {
    let s = setup();
    let record = s.advance.get_advance();

    let result = s.advance.try_initialize(
        &record.factory,
        &AdvanceTerms {
            recipient: record.recipient,
            collateral_receiver: record.collateral_receiver,
            payment_currency: record.payment_currency,
            principal: 10,
            fee_ppm: 0,
            offer_duration: 10,
            collaterals: record.collaterals,
        },
    );
    assert_eq!(result, Err(Ok(Error::AlreadyInitialized)));
}

#[test]
fn test_initialize_rejects_invalid_terms() {
    let env = Env::default();
    env.mock_all_auths();

    let advance_id = env.register(AdvanceContract, ());
    let advance = AdvanceContractClient::new(&env, &advance_id);
    let token = Address::generate(&env);

    let terms = |principal: i128, fee_ppm: u32, amount: i128| AdvanceTerms {
        recipient: Address::generate(&env),
        collateral_receiver: Address::generate(&env),
        payment_currency: Address::generate(&env),
        principal,
        fee_ppm,
        offer_duration: 10,
        collaterals: vec![
            &env,
            Collateral {
                token: token.clone(),
                amount,
            },
        ],
    };
    let factory = Address::generate(&env);

    assert_eq!(
        advance.try_initialize(&factory, &terms(0, 0, 1)),
        Err(Ok(Error::InvalidTerms))
    );
    assert_eq!(
        advance.try_initialize(&factory, &terms(10, 1_000_001, 1)),
        Err(Ok(Error::InvalidTerms))
    );
    assert_eq!(
        advance.try_initialize(&factory, &terms(10, 0, 0)),
        Err(Ok(Error::InvalidTerms))
    );
    assert_eq!(advance.try_state(), Err(Ok(Error::NotInitialized)));
}

#[test]
fn test_pending_record() {
    let s = setup();
    let record = s.advance.get_advance();

    assert_eq!(record.state, AdvanceState::Pending);
    assert_eq!(record.recoupment_amount, 12);
    assert_eq!(record.amount_repaid, 0);
    assert_eq!(record.expires_at, record.created_at + 10);
    assert_eq!(record.advancer, None);
    assert_eq!(s.advance.total_due(), 12);
    assert_eq!(s.shares.balance(&s.advance.address), COLLATERAL);
}

#[test]
fn test_full_lifecycle() {
    let s = setup();

    s.advance.provide_advance(&s.advancer);
    assert_eq!(s.advance.state(), AdvanceState::Active);
    assert_eq!(s.payment.balance(&s.recipient), 10);
    assert_eq!(s.payment.balance(&s.advancer), 990);

    s.send_to_advance(5);
    s.advance.process_repayment();
    assert_eq!(s.advance.total_due(), 7);
    assert_eq!(s.advance.state(), AdvanceState::Active);

    s.send_to_advance(4);
    s.advance.process_repayment();
    assert_eq!(s.advance.total_due(), 3);

    s.send_to_advance(3);
    s.advance.process_repayment();
    assert_eq!(s.advance.total_due(), 0);
    assert_eq!(s.advance.state(), AdvanceState::Repaid);

    // 10 out, 12 back
    assert_eq!(s.payment.balance(&s.advancer), 1_002);
    assert_eq!(s.shares.balance(&s.collateral_receiver), COLLATERAL);
    assert_eq!(s.shares.balance(&s.advance.address), 0);
    assert_eq!(s.shares.balance(&s.recipient), HOLDINGS - COLLATERAL);

    assert_eq!(
        s.advance.try_process_repayment(),
        Err(Ok(Error::NotActive))
    );
}

#[test]
fn test_overpayment_is_reclaimable() {
    let s = setup();
    s.advance.provide_advance(&s.advancer);

    s.send_to_advance(20);
    s.advance.process_repayment();

    assert_eq!(s.advance.state(), AdvanceState::Repaid);
    assert_eq!(s.payment.balance(&s.advancer), 1_002);
    assert_eq!(s.payment.balance(&s.advance.address), 8);

    s.advance.reclaim_excess_payment_token();
    assert_eq!(s.payment.balance(&s.recipient), 10 + 8);
    assert_eq!(
        s.advance.try_reclaim_excess_payment_token(),
        Err(Ok(Error::NothingToProcess))
    );
}

#[test]
fn test_process_repayment_requires_active_and_funds() {
    let s = setup();

    s.send_to_advance(5);
    assert_eq!(
        s.advance.try_process_repayment(),
        Err(Ok(Error::NotActive))
    );

    let s = setup();
    s.advance.provide_advance(&s.advancer);
    assert_eq!(
        s.advance.try_process_repayment(),
        Err(Ok(Error::NothingToProcess))
    );
}

#[test]
fn test_expired_offer_can_still_be_revoked() {
    let s = setup();
    let created_at = s.advance.get_advance().created_at;

    s.set_time(created_at + 11);

    assert_eq!(
        s.advance.try_provide_advance(&s.advancer),
        Err(Ok(Error::Expired))
    );

    s.advance.revoke_advance(&s.recipient);
    assert_eq!(s.advance.state(), AdvanceState::Revoked);
    assert_eq!(s.shares.balance(&s.recipient), HOLDINGS);
    assert_eq!(s.shares.balance(&s.collateral_receiver), 0);
}

#[test]
fn test_offer_open_until_expiry() {
    let s = setup();
    let record = s.advance.get_advance();

    s.set_time(record.expires_at);
    s.advance.provide_advance(&s.advancer);
    assert_eq!(s.advance.state(), AdvanceState::Active);
}

#[test]
fn test_revoke_is_exclusive() {
    let s = setup();

    s.advance.revoke_advance(&s.recipient);

    assert_eq!(
        s.advance.try_revoke_advance(&s.recipient),
        Err(Ok(Error::AlreadyRevoked))
    );
    assert_eq!(
        s.advance.try_provide_advance(&s.advancer),
        Err(Ok(Error::AlreadyRevoked))
    );
    assert_eq!(
        s.advance.try_reclaim_excess_payment_token(),
        Err(Ok(Error::AlreadyRevoked))
    );
}

#[test]
fn test_revoke_only_by_recipient() {
    let s = setup();
    let stranger = Address::generate(&s.env);

    assert_eq!(
        s.advance.try_revoke_advance(&stranger),
        Err(Ok(Error::NotAuthorized))
    );
    assert_eq!(
        s.advance.try_revoke_advance(&s.collateral_receiver),
        Err(Ok(Error::NotAuthorized))
    );
    assert_eq!(s.advance.state(), AdvanceState::Pending);
}

#[test]
fn test_active_advance_cannot_be_revoked_or_provided_again() {
    let s = setup();
    s.advance.provide_advance(&s.advancer);

    assert_eq!(
        s.advance.try_revoke_advance(&s.recipient),
        Err(Ok(Error::AlreadyActive))
    );
    assert_eq!(
        s.advance.try_provide_advance(&Address::generate(&s.env)),
        Err(Ok(Error::AlreadyActive))
    );
    assert_eq!(
        s.advance.try_reclaim_excess_payment_token(),
        Err(Ok(Error::AlreadyActive))
    );
}

#[test]
fn test_repaid_advance_is_terminal() {
    let s = setup();
    s.advance.provide_advance(&s.advancer);
    s.send_to_advance(12);
    s.advance.process_repayment();

    assert_eq!(
        s.advance.try_revoke_advance(&s.recipient),
        Err(Ok(Error::AlreadyRepaid))
    );
    assert_eq!(
        s.advance.try_provide_advance(&s.advancer),
        Err(Ok(Error::AlreadyRepaid))
    );
}

#[test]
fn test_revoke_sweeps_stray_payment_tokens() {
    let s = setup();
    s.send_to_advance(7);

    s.advance.revoke_advance(&s.recipient);

    assert_eq!(s.payment.balance(&s.recipient), 7);
    assert_eq!(s.payment.balance(&s.advance.address), 0);
}

#[test]
fn test_reclaim_while_pending() {
    let s = setup();

    assert_eq!(
        s.advance.try_reclaim_excess_payment_token(),
        Err(Ok(Error::NothingToProcess))
    );

    s.send_to_advance(3);
    s.advance.reclaim_excess_payment_token();
    assert_eq!(s.payment.balance(&s.recipient), 3);
    assert_eq!(s.advance.state(), AdvanceState::Pending);
}

#[test]
fn test_escrowed_collateral_keeps_earning() {
    let s = setup();
    s.advance.provide_advance(&s.advancer);

    // 0.1 per share while 400 shares sit in escrow
    s.deposit_revenue(100);

    s.send_to_advance(12);
    s.advance.process_repayment();

    // Claimed on release, then left for the recipient to reclaim
    assert_eq!(s.payment.balance(&s.advance.address), 40);
    assert_eq!(s.shares.get_claimable(&s.collateral_receiver, &s.payment.address), 0);
    assert_eq!(s.shares.get_claimable(&s.advance.address, &s.payment.address), 0);

    s.advance.reclaim_excess_payment_token();
    assert_eq!(s.payment.balance(&s.recipient), 10 + 40);
    assert_eq!(s.shares.claim(&s.recipient, &s.payment.address), 60);
}

#[test]
fn test_revoke_returns_accrued_distributions() {
    let s = setup();
    s.deposit_revenue(100);

    s.advance.revoke_advance(&s.recipient);

    assert_eq!(s.payment.balance(&s.recipient), 40);
    assert_eq!(s.shares.get_claimable(&s.recipient, &s.payment.address), 60);
}

#[test]
fn test_relayed_distributions_count_towards_repayment() {
    let s = setup();
    let relayer = Address::generate(&s.env);
    s.advance.provide_advance(&s.advancer);

    s.deposit_revenue(100);
    assert_eq!(
        s.shares
            .claim_with_relayer_fee(&s.advance.address, &s.payment.address, &relayer),
        (40, 0)
    );

    s.advance.process_repayment();
    assert_eq!(s.advance.state(), AdvanceState::Repaid);
    assert_eq!(s.payment.balance(&s.advancer), 1_002);
    assert_eq!(s.payment.balance(&s.advance.address), 28);
}

#[test]
fn test_other_currency_earnings_go_to_recipient_on_repayment() {
    let s = setup();
    let (other, other_admin) = s.second_currency();
    s.advance.provide_advance(&s.advancer);

    other_admin.mint(&s.shares.address, &100);

    s.send_to_advance(12);
    s.advance.process_repayment();

    assert_eq!(other.balance(&s.recipient), 40);
    assert_eq!(other.balance(&s.advance.address), 0);
    assert_eq!(s.shares.get_claimable(&s.advance.address, &other.address), 0);
    assert_eq!(s.shares.get_claimable(&s.collateral_receiver, &other.address), 0);

    // Payment currency earnings are unaffected and nothing else is left behind
    assert_eq!(
        s.advance.try_reclaim_excess_payment_token(),
        Err(Ok(Error::NothingToProcess))
    );
}

#[test]
fn test_relayed_other_currency_is_forwarded_on_release() {
    let s = setup();
    let (other, other_admin) = s.second_currency();
    let relayer = Address::generate(&s.env);
    s.advance.provide_advance(&s.advancer);

    other_admin.mint(&s.shares.address, &100);
    s.shares
        .claim_with_relayer_fee(&s.advance.address, &other.address, &relayer);
    assert_eq!(other.balance(&s.advance.address), 40);

    s.send_to_advance(12);
    s.advance.process_repayment();

    assert_eq!(other.balance(&s.advance.address), 0);
    assert_eq!(other.balance(&s.recipient), 40);
}

#[test]
fn test_revoke_forwards_every_currency() {
    let s = setup();
    let (other, other_admin) = s.second_currency();

    s.deposit_revenue(100);
    other_admin.mint(&s.shares.address, &50);

    s.advance.revoke_advance(&s.recipient);

    assert_eq!(s.payment.balance(&s.recipient), 40);
    assert_eq!(other.balance(&s.recipient), 20);
    assert_eq!(other.balance(&s.advance.address), 0);
}
