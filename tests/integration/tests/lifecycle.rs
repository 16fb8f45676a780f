use revshare_integration_tests::{
    advance::{AdvanceContractClient, AdvanceState, Error as AdvanceError},
    advance_common::Collateral,
    advance_factory::{AdvanceConfig, AdvanceFactory, AdvanceFactoryClient},
    advance_wasm,
    share_token::{FeeConfig, ShareToken, ShareTokenClient},
};
use soroban_sdk::{
    contract, contractimpl,
    testutils::{Address as _, Ledger},
    token, vec, Address, Bytes, Env, String,
};

const OFFER_DURATION: u64 = 3_600;

/// Registry that recognises every token as a share ledger
#[contract]
pub struct OpenRegistry;

#[contractimpl]
impl OpenRegistry {
    pub fn is_registered(_env: Env, _token: Address) -> bool {
        true
    }

    pub fn is_share_ledger(_env: Env, _token: Address) -> bool {
        true
    }
}

struct TestContext<'a> {
    env: Env,
    recipient: Address,
    receiver: Address,
    advancer: Address,
    payment: token::Client<'a>,
    payment_admin: token::StellarAssetClient<'a>,
    shares: ShareTokenClient<'a>,
    factory: AdvanceFactoryClient<'a>,
}

impl<'a> TestContext<'a> {
    fn create_advance(&self, amount: i128) -> AdvanceContractClient<'a> {
        let advance = self.factory.create_advance(
            &self.recipient,
            &vec![
                &self.env,
                Collateral {
                    token: self.shares.address.clone(),
                    amount,
                },
            ],
            &self.receiver,
            &10,
            &200_000,
        );
        AdvanceContractClient::new(&self.env, &advance)
    }
}

fn setup_test<'a>() -> TestContext<'a> {
    let wasm = advance_wasm();

    let env = Env::default();
    env.mock_all_auths();

    let template_hash = env
        .deployer()
        .upload_contract_wasm(Bytes::from_slice(&env, &wasm));

    let recipient = Address::generate(&env);
    let receiver = Address::generate(&env);
    let advancer = Address::generate(&env);

    let sac = env.register_stellar_asset_contract_v2(Address::generate(&env));
    let payment = token::Client::new(&env, &sac.address());
    let payment_admin = token::StellarAssetClient::new(&env, &sac.address());
    payment_admin.mint(&advancer, &1_000);

    let shares = ShareTokenClient::new(&env, &env.register(ShareToken, ()));
    shares.initialize(
        &Address::generate(&env),
        &String::from_str(&env, "Catalog Royalties"),
        &String::from_str(&env, "ROYAL"),
        &0,
        &Address::generate(&env),
    );
    shares.mint(&recipient, &1_000);
    shares.set_fee_config(
        &payment.address,
        &FeeConfig {
            payment_fee_bps: 1_000,
            relayer_fee_bps: 0,
            max_relayer_fee: 0,
        },
    );

    let factory = AdvanceFactoryClient::new(&env, &env.register(AdvanceFactory, ()));
    factory.initialize(
        &Address::generate(&env),
        &AdvanceConfig {
            template_hash,
            payment_currency: payment.address.clone(),
            collateral_registry: env.register(OpenRegistry, ()),
            offer_duration: OFFER_DURATION,
            max_collaterals_per_advance: 4,
        },
    );

    TestContext {
        env,
        recipient,
        receiver,
        advancer,
        payment,
        payment_admin,
        shares,
        factory,
    }
}

#[test]
fn test_factory_advance_full_lifecycle() {
    let ctx = setup_test();

    let advance = ctx.create_advance(500);
    assert_eq!(ctx.factory.advance_count(), 1);
    assert_eq!(ctx.factory.get_advance(&0), advance.address);
    assert_eq!(advance.state(), AdvanceState::Pending);
    assert_eq!(advance.total_due(), 12);
    assert_eq!(ctx.shares.balance(&advance.address), 500);

    advance.provide_advance(&ctx.advancer);
    assert_eq!(ctx.payment.balance(&ctx.recipient), 10);

    // 100 of revenue, 10% fee: 0.09 per share, 45 earned in escrow
    ctx.payment_admin.mint(&ctx.shares.address, &100);

    for repayment in [5, 4, 3] {
        ctx.payment_admin.mint(&advance.address, &repayment);
        advance.process_repayment();
    }

    assert_eq!(advance.state(), AdvanceState::Repaid);
    assert_eq!(ctx.payment.balance(&ctx.advancer), 1_002);
    assert_eq!(ctx.shares.balance(&ctx.receiver), 500);
    assert_eq!(ctx.payment.balance(&advance.address), 45);
    assert_eq!(
        advance.try_process_repayment(),
        Err(Ok(AdvanceError::NotActive))
    );

    advance.reclaim_excess_payment_token();
    assert_eq!(ctx.payment.balance(&ctx.recipient), 10 + 45);
    assert_eq!(ctx.shares.claim(&ctx.recipient, &ctx.payment.address), 45);
}

#[test]
fn test_expired_offer_is_revocable() {
    let ctx = setup_test();

    let advance = ctx.create_advance(300);
    let expires_at = advance.get_advance().expires_at;

    ctx.env.ledger().with_mut(|li| {
        li.timestamp = expires_at + 1;
    });

    assert_eq!(
        advance.try_provide_advance(&ctx.advancer),
        Err(Ok(AdvanceError::Expired))
    );

    advance.revoke_advance(&ctx.recipient);
    assert_eq!(advance.state(), AdvanceState::Revoked);
    assert_eq!(ctx.shares.balance(&ctx.recipient), 1_000);
    assert_eq!(
        advance.try_provide_advance(&ctx.advancer),
        Err(Ok(AdvanceError::AlreadyRevoked))
    );
}

#[test]
fn test_each_advance_gets_its_own_contract() {
    let ctx = setup_test();

    let first = ctx.create_advance(100);
    let second = ctx.create_advance(200);

    assert_ne!(first.address, second.address);
    assert_eq!(ctx.factory.advance_count(), 2);
    assert_eq!(ctx.factory.get_advance(&1), second.address);
    assert_eq!(ctx.shares.balance(&first.address), 100);
    assert_eq!(ctx.shares.balance(&second.address), 200);
    assert_eq!(ctx.shares.balance(&ctx.recipient), 700);
}
