//! End-to-end withdrawal, shield and balance flows against chain and engine doubles.

mod common;

use alloy::primitives::U256;
use common::*;
use std::sync::atomic::Ordering;
use std::time::Duration;

use ghost_relayer::balance::ScanOutcome;
use ghost_relayer::fees::reimbursement_amount;
use ghost_relayer::lifecycle::{preload_wallet, Shutdown};
use ghost_relayer::paymaster::{PaymasterError, ReimbursementOutcome, SkipReason};
use ghost_relayer::shield::{derive_shield_private_key, ShieldError};
use ghost_relayer::withdrawal::{WithdrawalError, WithdrawalRequest, WithdrawalState};

const ONE_BNB: u128 = 1_000_000_000_000_000_000;

fn request(amount: u128) -> WithdrawalRequest {
    WithdrawalRequest::new("wallet-1", DESTINATION, U256::from(amount)).unwrap()
}

fn signature(byte: u8) -> String {
    format!("0x{}", alloy::hex::encode([byte; 65]))
}

#[tokio::test]
async fn test_withdrawal_confirms_and_claims_reimbursement() {
    let harness = Harness::with_paymaster();
    harness.chain.set_balance(PAYMASTER, U256::from(ONE_BNB));

    let outcome = harness.ctx.withdrawals.withdraw(request(ONE_BNB)).await.unwrap();

    assert_eq!(outcome.receipt.gas_used, GAS_USED);
    assert_eq!(
        outcome.receipt.confirmed_fee,
        reimbursement_amount(GAS_USED, MIN_GAS_PRICE)
    );
    // 30 bps of 1 BNB
    assert_eq!(outcome.relayer_fee, U256::from(3_000_000_000_000_000u128));

    let id = outcome.id;
    match outcome.reimbursement.outcome().await {
        ReimbursementOutcome::Claimed(claim) => {
            assert_eq!(claim.amount, reimbursement_amount(GAS_USED, MIN_GAS_PRICE));
        }
        other => panic!("expected a claim, got {other:?}"),
    }

    // Withdrawal first, then the claim, on consecutive nonces
    assert_eq!(harness.chain.broadcast_nonces(), vec![0, 1]);

    let record = harness.ctx.withdrawals.tracker().get(&id).unwrap();
    assert_eq!(record.state, WithdrawalState::ReimbursementAttempted);
    assert_eq!(record.proof_progress, 1.0);
    assert_eq!(record.reimbursement.as_deref(), Some("claimed"));
}

#[tokio::test]
async fn test_low_pool_skips_claim_but_withdrawal_succeeds() {
    let harness = Harness::with_paymaster();
    harness.chain.set_balance(PAYMASTER, U256::from(1_000u64));

    let outcome = harness.ctx.withdrawals.withdraw(request(ONE_BNB)).await.unwrap();

    let required = reimbursement_amount(GAS_USED, MIN_GAS_PRICE);
    assert_eq!(
        outcome.reimbursement.outcome().await,
        ReimbursementOutcome::Skipped(SkipReason::PoolTooLow {
            pool: U256::from(1_000u64),
            required,
        })
    );
    assert_eq!(harness.chain.broadcasts().len(), 1);
}

#[tokio::test]
async fn test_pool_exactly_covering_cost_is_claimed() {
    let harness = Harness::with_paymaster();
    harness
        .chain
        .set_balance(PAYMASTER, reimbursement_amount(GAS_USED, MIN_GAS_PRICE));

    let outcome = harness.ctx.withdrawals.withdraw(request(ONE_BNB)).await.unwrap();
    assert!(matches!(
        outcome.reimbursement.outcome().await,
        ReimbursementOutcome::Claimed(_)
    ));
}

#[tokio::test]
async fn test_unconfigured_paymaster_skips_reimbursement() {
    let harness = Harness::without_paymaster();

    let outcome = harness.ctx.withdrawals.withdraw(request(ONE_BNB)).await.unwrap();
    assert_eq!(
        outcome.reimbursement.outcome().await,
        ReimbursementOutcome::Skipped(SkipReason::NotConfigured)
    );
    assert_eq!(harness.chain.broadcasts().len(), 1);
}

#[tokio::test]
async fn test_failed_claim_does_not_fail_withdrawal() {
    let harness = Harness::with_paymaster();
    harness.chain.set_balance(PAYMASTER, U256::from(ONE_BNB));
    harness.chain.revert_nonce(1);

    let outcome = harness.ctx.withdrawals.withdraw(request(ONE_BNB)).await.unwrap();
    assert!(matches!(
        outcome.reimbursement.outcome().await,
        ReimbursementOutcome::Failed(_)
    ));
}

#[tokio::test]
async fn test_proof_failure_never_broadcasts() {
    let harness = Harness::with_paymaster();
    harness.engine.fail_proof.store(true, Ordering::SeqCst);

    let err = harness
        .ctx
        .withdrawals
        .withdraw(request(ONE_BNB))
        .await
        .unwrap_err();

    assert!(matches!(err, WithdrawalError::Proof(_)));
    assert_eq!(harness.engine.populations.load(Ordering::SeqCst), 0);
    assert!(harness.chain.broadcasts().is_empty());
    assert_eq!(harness.ctx.connector.submission_queue().jobs_received(), 0);
}

#[tokio::test]
async fn test_reverted_withdrawal_is_reported_without_claim() {
    let harness = Harness::with_paymaster();
    harness.chain.set_balance(PAYMASTER, U256::from(ONE_BNB));
    harness.chain.revert_nonce(0);

    let err = harness
        .ctx
        .withdrawals
        .withdraw(request(ONE_BNB))
        .await
        .unwrap_err();

    let tx_hash = harness.chain.broadcasts()[0].tx_hash;
    assert!(matches!(err, WithdrawalError::Reverted { tx_hash: h } if h == tx_hash));

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(harness.chain.broadcasts().len(), 1);
}

#[tokio::test]
async fn test_confirmation_timeout_reports_hash() {
    let harness = Harness::without_paymaster();
    harness.chain.withhold_receipts.store(true, Ordering::SeqCst);

    let err = harness
        .ctx
        .withdrawals
        .withdraw(request(ONE_BNB))
        .await
        .unwrap_err();

    let broadcast = harness.chain.broadcasts();
    assert_eq!(broadcast.len(), 1);
    match err {
        WithdrawalError::ConfirmationTimeout { tx_hash, secs } => {
            assert_eq!(tx_hash, broadcast[0].tx_hash);
            assert_eq!(secs, 1);
        }
        other => panic!("expected timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn test_abandoned_withdrawal_still_reaches_terminal_state() {
    let harness = Harness::without_paymaster();
    harness.chain.withhold_receipts.store(true, Ordering::SeqCst);

    // Caller gives up while the transaction waits for a receipt
    let abandoned = tokio::time::timeout(
        Duration::from_millis(300),
        harness.ctx.withdrawals.withdraw(request(ONE_BNB)),
    )
    .await;
    assert!(abandoned.is_err());
    assert_eq!(harness.ctx.withdrawals.tracker().in_flight(), 1);

    // Past the one second confirmation bound
    tokio::time::sleep(Duration::from_secs(2)).await;

    let tracker = harness.ctx.withdrawals.tracker();
    assert_eq!(harness.chain.broadcasts().len(), 1);
    assert_eq!(tracker.len(), 1);
    assert_eq!(tracker.in_flight(), 0);
}

#[tokio::test]
async fn test_abandoned_withdrawal_still_claims_reimbursement() {
    let harness = Harness::new(
        test_config(true),
        MockEngine::with_proof_delay(Duration::from_millis(500)),
    );
    harness.chain.set_balance(PAYMASTER, U256::from(ONE_BNB));

    // Caller gives up mid-proof
    let abandoned = tokio::time::timeout(
        Duration::from_millis(100),
        harness.ctx.withdrawals.withdraw(request(ONE_BNB)),
    )
    .await;
    assert!(abandoned.is_err());
    assert!(harness.chain.broadcasts().is_empty());

    tokio::time::sleep(Duration::from_millis(1_500)).await;

    assert_eq!(harness.chain.broadcast_nonces(), vec![0, 1]);
    assert_eq!(harness.ctx.withdrawals.tracker().in_flight(), 0);
}

#[tokio::test]
async fn test_invalid_requests_rejected_before_engine() {
    assert!(matches!(
        WithdrawalRequest::new("wallet-1", DESTINATION, U256::ZERO),
        Err(WithdrawalError::Validation(_))
    ));
    assert!(matches!(
        WithdrawalRequest::new("wallet-1", "0x1234", U256::from(1u64)),
        Err(WithdrawalError::Validation(_))
    ));
    assert!(matches!(
        WithdrawalRequest::new("", DESTINATION, U256::from(1u64)),
        Err(WithdrawalError::Validation(_))
    ));
}

#[tokio::test]
async fn test_concurrent_withdrawals_use_distinct_nonces() {
    let harness = Harness::new(
        test_config(false),
        MockEngine::with_proof_delay(Duration::from_millis(200)),
    );

    let mut tasks = Vec::new();
    for i in 0..5u128 {
        let ctx = harness.ctx.clone();
        tasks.push(tokio::spawn(async move {
            ctx.withdrawals.withdraw(request(ONE_BNB + i)).await
        }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let mut nonces = harness.chain.broadcast_nonces();
    nonces.sort_unstable();
    assert_eq!(nonces, vec![0, 1, 2, 3, 4]);
    assert_eq!(harness.ctx.connector.submission_queue().jobs_received(), 5);

    // Proofs overlapped; only the broadcast was serialized
    assert!(harness.engine.max_parallel_proofs.load(Ordering::SeqCst) > 1);
}

#[tokio::test]
async fn test_rejected_broadcast_recovers_nonce() {
    let harness = Harness::without_paymaster();
    harness.chain.reject_next.store(true, Ordering::SeqCst);

    let err = harness
        .ctx
        .withdrawals
        .withdraw(request(ONE_BNB))
        .await
        .unwrap_err();
    assert!(matches!(err, WithdrawalError::Submission(_)));

    harness.ctx.withdrawals.withdraw(request(ONE_BNB)).await.unwrap();
    assert_eq!(harness.chain.broadcast_nonces(), vec![0]);
}

#[tokio::test]
async fn test_failed_withdrawal_is_tracked() {
    let harness = Harness::without_paymaster();
    harness.engine.fail_proof.store(true, Ordering::SeqCst);

    let _ = harness.ctx.withdrawals.withdraw(request(ONE_BNB)).await;

    let tracker = harness.ctx.withdrawals.tracker();
    assert_eq!(tracker.len(), 1);
}

#[tokio::test]
async fn test_wallet_derivation_is_idempotent() {
    let harness = Harness::without_paymaster();
    let engine = &harness.ctx.engine;

    let first = engine.derive_wallet_from_mnemonic(MNEMONIC).await.unwrap();
    let second = engine.derive_wallet_from_mnemonic(MNEMONIC).await.unwrap();
    assert_eq!(first, second);

    let looked_up = engine.wallet_address(&first.id).await.unwrap();
    assert_eq!(looked_up.railgun_address, first.railgun_address);
}

#[tokio::test]
async fn test_shield_secret_is_deterministic() {
    let harness = Harness::without_paymaster();
    let wallet = harness
        .ctx
        .engine
        .derive_wallet_from_mnemonic(MNEMONIC)
        .await
        .unwrap();

    let amount = U256::from(ONE_BNB);
    let first = harness
        .ctx
        .shield
        .compose_shield(&wallet.railgun_address, &signature(7), amount)
        .await
        .unwrap();
    let second = harness
        .ctx
        .shield
        .compose_shield(&wallet.railgun_address, &signature(7), amount)
        .await
        .unwrap();
    assert_eq!(first.data, second.data);

    let params = harness.engine.last_shield.lock().unwrap().clone().unwrap();
    assert_eq!(params.shield_private_key, derive_shield_private_key(&[7u8; 65]));
    assert_eq!(params.token, WRAPPED_TOKEN);

    let other = harness
        .ctx
        .shield
        .compose_shield(&wallet.railgun_address, &signature(8), amount)
        .await
        .unwrap();
    assert_ne!(first.data, other.data);
}

#[tokio::test]
async fn test_shield_validation_precedes_engine() {
    let harness = Harness::without_paymaster();

    let err = harness
        .ctx
        .shield
        .compose_shield("0xnotprivate", &signature(7), U256::from(1u64))
        .await
        .unwrap_err();
    assert!(matches!(err, ShieldError::Validation(_)));

    let err = harness
        .ctx
        .shield
        .compose_shield("0zkabc", "0x1234", U256::from(1u64))
        .await
        .unwrap_err();
    assert!(matches!(err, ShieldError::Validation(_)));

    assert!(harness.engine.last_shield.lock().unwrap().is_none());
}

#[tokio::test]
async fn test_balance_read_never_fails() {
    let harness = Harness::without_paymaster();
    *harness.engine.shielded_balance.lock().unwrap() = U256::from(1_500_000_000_000_000_000u128);

    let balance = harness.ctx.balances.get_private_balance("wallet-1").await;
    assert_eq!(balance.balance_formatted, "1.500000");
    assert_eq!(balance.scan, ScanOutcome::Completed);

    harness.engine.fail_scan.store(true, Ordering::SeqCst);
    let balance = harness.ctx.balances.get_private_balance("wallet-1").await;
    assert_eq!(balance.balance_wei, U256::from(1_500_000_000_000_000_000u128));
    assert!(matches!(balance.scan, ScanOutcome::Stale(_)));

    harness.engine.fail_balance.store(true, Ordering::SeqCst);
    let balance = harness.ctx.balances.get_private_balance("wallet-1").await;
    assert_eq!(balance.balance_wei, U256::ZERO);
    assert_eq!(balance.balance_formatted, "0.000000");
    assert_eq!(balance.token_address, WRAPPED_TOKEN);
}

#[tokio::test]
async fn test_paymaster_reads() {
    let harness = Harness::with_paymaster();
    harness.chain.set_balance(PAYMASTER, U256::from(ONE_BNB));
    let gateway = harness.ctx.paymaster().unwrap();

    let state = gateway.info().await.unwrap();
    assert_eq!(state.relayer, relayer_address());
    assert_eq!(state.owner, OWNER);
    assert_eq!(state.fee_basis_points, U256::from(PAYMASTER_FEE_BPS));
    assert_eq!(state.pool_balance, U256::from(ONE_BNB));

    let fee = gateway.calculate_fee(U256::from(10_000u64)).await.unwrap();
    assert_eq!(fee, U256::from(PAYMASTER_FEE_BPS));
}

#[tokio::test]
async fn test_fund_paymaster() {
    let harness = Harness::with_paymaster();
    let gateway = harness.ctx.paymaster().unwrap();

    assert!(matches!(
        gateway.fund(U256::ZERO).await,
        Err(PaymasterError::Funding(_))
    ));
    assert!(harness.chain.broadcasts().is_empty());

    let tx_hash = gateway.fund(U256::from(ONE_BNB)).await.unwrap();
    assert_eq!(harness.chain.broadcasts()[0].tx_hash, tx_hash);
}

#[tokio::test]
async fn test_unconfigured_paymaster_is_reported() {
    let harness = Harness::without_paymaster();
    assert!(matches!(
        harness.ctx.paymaster(),
        Err(PaymasterError::NotConfigured)
    ));
}

#[tokio::test]
async fn test_preload_wallet_scans_once() {
    let harness = Harness::without_paymaster();
    let shutdown = Shutdown::new();

    let wallet = preload_wallet(harness.ctx.engine.clone(), MNEMONIC.to_string(), &shutdown)
        .await
        .unwrap()
        .unwrap();
    assert!(wallet.railgun_address.starts_with("0zk"));
    assert_eq!(harness.engine.scans.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_preload_wallet_with_bad_mnemonic_is_nonfatal() {
    let harness = Harness::without_paymaster();
    let shutdown = Shutdown::new();

    let wallet = preload_wallet(harness.ctx.engine.clone(), "too short".to_string(), &shutdown)
        .await
        .unwrap();
    assert!(wallet.is_none());
    assert_eq!(harness.engine.scans.load(Ordering::SeqCst), 0);
}
