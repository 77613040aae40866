//! End-to-end integration tests for Ada redemption.
//!
//! These tests drive the full redemption lifecycle from certificate to
//! broadcast: decryption, key parsing, address derivation, UTXO lookup,
//! claim signing and submission. They run against the in-memory ledger, which
//! verifies every claim the same way a real backend would and keeps spent
//! outputs spent.
//!
//! Each test stands alone with its own ledger. No shared state, no test
//! ordering dependencies.

use std::sync::Arc;

use async_trait::async_trait;

use ada_redemption::backend::{BackendError, ReceiverAddressProvider};
use ada_redemption::certificate::{
    derive_recovery_key, render_certificate, seal_with_credentials, seal_with_mnemonic,
};
use ada_redemption::config::KdfParams;
use ada_redemption::paper_vend::shield_key;
use ada_redemption::{
    Address, Certificate, ErrorKind, FixedReceiver, ForceVendedCredentials, InMemoryLedger,
    KeyInput, Network, RedemptionKey, RedemptionMnemonic, RedemptionRequest, RedemptionStage,
    Redeemer, ResolverConfig,
};

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

type TestRedeemer = Redeemer<Arc<InMemoryLedger>, FixedReceiver>;

/// Cheap Argon2 parameters so force-vended tests stay fast.
const TEST_KDF: KdfParams = KdfParams {
    memory_kib: 64,
    iterations: 1,
    parallelism: 1,
};

fn receiver() -> Address {
    Address::wallet(&[0xEE; 32], Network::Mainnet)
}

/// Mnemonic printed with the regular fixture certificate.
const FIXTURE_PHRASE: &str = "uncle bargain pistol obtain amount laugh explain type learn";

/// Redemption code embedded in the fixture certificates.
const FIXTURE_CODE: &str = "QkJCQkJCQkJCQkJCQkJCQkJCQkJCQkJCQkJCQkJCQkI=";

/// Mainnet redemption address owned by [`FIXTURE_CODE`].
const FIXTURE_ADDRESS: &str = "3dgbKTNtBKdfqx8H6BoE5EG2T3S2NuEAf2PyuMdSXCXNJ4";

fn fixture_mnemonic() -> RedemptionMnemonic {
    RedemptionMnemonic::parse(FIXTURE_PHRASE).unwrap()
}

fn fixture_key() -> RedemptionKey {
    RedemptionKey::from_bytes(&[0x42; 32])
}

fn other_mnemonic() -> RedemptionMnemonic {
    RedemptionMnemonic::from_entropy([0x11; 12])
}

fn force_vended_credentials() -> ForceVendedCredentials {
    ForceVendedCredentials::new("user@example.org", "123456", "12345")
}

/// A fresh ledger plus a redeemer paying out to [`receiver`].
fn setup() -> (Arc<InMemoryLedger>, TestRedeemer) {
    let ledger = Arc::new(InMemoryLedger::new());
    let redeemer = Redeemer::new(
        Arc::clone(&ledger),
        FixedReceiver(receiver()),
        ResolverConfig::new(Network::Mainnet),
    );
    (ledger, redeemer)
}

/// Funds the redemption address of `key` and returns it.
fn fund(ledger: &InMemoryLedger, key: &RedemptionKey, amount: u64) -> Address {
    let address = Address::from_redemption_key(key, Network::Mainnet);
    ledger.fund(address, amount);
    address
}

fn regular_request(certificate: Vec<u8>, passphrase: Option<String>) -> RedemptionRequest {
    RedemptionRequest::Regular {
        input: KeyInput::Certificate(Some(Certificate::new(certificate))),
        passphrase,
    }
}

// ---------------------------------------------------------------------------
// Happy paths
// ---------------------------------------------------------------------------

#[tokio::test]
async fn regular_certificate_redeems_full_amount() {
    let (ledger, redeemer) = setup();
    let key = fixture_key();
    assert_eq!(key.to_base64(), FIXTURE_CODE);
    let sender = fund(&ledger, &key, 1_000_000);
    assert_eq!(sender.to_base58(), FIXTURE_ADDRESS);

    let sealed = seal_with_mnemonic(
        &fixture_mnemonic(),
        render_certificate(FIXTURE_CODE).as_bytes(),
    )
    .unwrap();
    let request = regular_request(sealed, Some(FIXTURE_PHRASE.to_string()));
    assert_eq!(request.redemption_code().unwrap(), FIXTURE_CODE);

    let receipt = redeemer.redeem_with_receipt(request).await.unwrap();

    assert_eq!(receipt.amount, 1_000_000);
    assert_eq!(receipt.sender, sender);
    assert_eq!(receipt.receiver, receiver());
    assert_eq!(ledger.balance(&sender), 0);
    assert_eq!(ledger.balance(&receiver()), 1_000_000);
    assert_eq!(ledger.accepted_tx_ids(), vec![receipt.tx_id]);
}

#[tokio::test]
async fn force_vended_certificate_redeems() {
    let (ledger, redeemer) = setup();
    let key = RedemptionKey::generate();
    fund(&ledger, &key, 12_345_000_000);

    let sealed = seal_with_credentials(
        &force_vended_credentials(),
        &TEST_KDF,
        render_certificate(&key.to_base64()).as_bytes(),
    )
    .unwrap();

    let amount = redeemer
        .redeem(RedemptionRequest::ForceVended {
            input: KeyInput::Certificate(Some(Certificate::new(sealed))),
            credentials: Some(force_vended_credentials()),
        })
        .await
        .unwrap();

    assert_eq!(amount, 12_345_000_000);
    assert_eq!(ledger.balance(&receiver()), 12_345_000_000);
}

#[tokio::test]
async fn recovery_force_vended_uses_the_hex_key() {
    let (ledger, redeemer) = setup();
    let key = RedemptionKey::generate();
    fund(&ledger, &key, 77);

    let sealed = seal_with_credentials(
        &force_vended_credentials(),
        &TEST_KDF,
        render_certificate(&key.to_base64()).as_bytes(),
    )
    .unwrap();
    let decryption_key = derive_recovery_key(&force_vended_credentials(), &sealed).unwrap();

    let amount = redeemer
        .redeem(RedemptionRequest::RecoveryForceVended {
            input: KeyInput::Certificate(Some(Certificate::new(sealed))),
            decryption_key: Some(decryption_key),
        })
        .await
        .unwrap();
    assert_eq!(amount, 77);
}

#[tokio::test]
async fn recovery_regular_accepts_a_typed_code() {
    let (ledger, redeemer) = setup();
    let key = RedemptionKey::generate();
    fund(&ledger, &key, 5);

    let amount = redeemer
        .redeem(RedemptionRequest::RecoveryRegular {
            input: KeyInput::Code(format!("  {}\n", key.to_base64())),
            passphrase: None,
        })
        .await
        .unwrap();
    assert_eq!(amount, 5);
}

#[tokio::test]
async fn paper_vended_code_recovers_the_key() {
    let (ledger, redeemer) = setup();
    let key = fixture_key();
    fund(&ledger, &key, 400);

    let shielded_code = shield_key(&key, &fixture_mnemonic()).unwrap();
    let request = RedemptionRequest::PaperVended {
        shielded_code,
        mnemonic: FIXTURE_PHRASE.to_string(),
    };
    assert_eq!(request.redemption_key().unwrap().to_base64(), FIXTURE_CODE);
    assert_eq!(request.redemption_code().unwrap(), FIXTURE_CODE);

    let receipt = redeemer.redeem_with_receipt(request).await.unwrap();
    assert_eq!(receipt.amount, 400);
    assert_eq!(receipt.sender.to_base58(), FIXTURE_ADDRESS);
}

#[tokio::test]
async fn plain_certificate_ignores_a_bad_passphrase() {
    let (ledger, redeemer) = setup();
    let key = RedemptionKey::generate();
    fund(&ledger, &key, 9);

    let plain = render_certificate(&key.to_base64()).into_bytes();
    let amount = redeemer
        .redeem(regular_request(plain, Some("not a mnemonic at all".into())))
        .await
        .unwrap();
    assert_eq!(amount, 9);
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unfunded_key_is_already_used() {
    let (ledger, redeemer) = setup();
    let key = RedemptionKey::generate();

    let err = redeemer
        .redeem(RedemptionRequest::Regular {
            input: KeyInput::Code(key.to_base64()),
            passphrase: None,
        })
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::RedemptionKeyAlreadyUsed);
    assert_eq!(ledger.submission_count(), 0);
}

#[tokio::test]
async fn wrong_mnemonic_fails_decryption_before_any_lookup() {
    let (ledger, redeemer) = setup();
    let key = RedemptionKey::generate();
    fund(&ledger, &key, 1_000_000);

    let sealed = seal_with_mnemonic(
        &fixture_mnemonic(),
        render_certificate(&key.to_base64()).as_bytes(),
    )
    .unwrap();

    let err = redeemer
        .redeem(regular_request(sealed, Some(other_mnemonic().phrase())))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Decryption);
    assert_eq!(ledger.lookup_count(), 0);
    assert_eq!(ledger.submission_count(), 0);
}

#[tokio::test]
async fn wrong_mnemonic_on_paper_vended_code_is_invalid_mnemonic() {
    let (ledger, redeemer) = setup();
    let key = RedemptionKey::generate();
    fund(&ledger, &key, 400);

    let err = redeemer
        .redeem(RedemptionRequest::PaperVended {
            shielded_code: shield_key(&key, &fixture_mnemonic()).unwrap(),
            mnemonic: other_mnemonic().phrase(),
        })
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidMnemonic);
    assert_eq!(ledger.balance(&receiver()), 0);
}

#[tokio::test]
async fn wrong_force_vended_amount_fails_decryption() {
    let (_ledger, redeemer) = setup();
    let key = RedemptionKey::generate();
    let sealed = seal_with_credentials(
        &force_vended_credentials(),
        &TEST_KDF,
        render_certificate(&key.to_base64()).as_bytes(),
    )
    .unwrap();

    let err = redeemer
        .redeem(RedemptionRequest::ForceVended {
            input: KeyInput::Certificate(Some(Certificate::new(sealed))),
            credentials: Some(ForceVendedCredentials::new(
                "user@example.org",
                "123456",
                "12346",
            )),
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decryption);
}

#[tokio::test]
async fn missing_inputs_are_reported_per_variant() {
    let (_ledger, redeemer) = setup();

    let err = redeemer
        .redeem(RedemptionRequest::ForceVended {
            input: KeyInput::Certificate(None),
            credentials: Some(force_vended_credentials()),
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NoCertificate);

    let sealed = seal_with_mnemonic(&fixture_mnemonic(), b"whatever").unwrap();
    let err = redeemer
        .redeem(regular_request(sealed, None))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingCredential);
}

#[tokio::test]
async fn offline_backend_surfaces_lookup_failure() {
    let (ledger, redeemer) = setup();
    let key = RedemptionKey::generate();
    fund(&ledger, &key, 1);
    ledger.set_offline(true);

    let err = redeemer
        .redeem(RedemptionRequest::Regular {
            input: KeyInput::Code(key.to_base64()),
            passphrase: None,
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UtxoLookup);
}

struct NoReceiver;

#[async_trait]
impl ReceiverAddressProvider for NoReceiver {
    async fn receiver_address(&self) -> Result<Address, BackendError> {
        Err(BackendError::NoReceiver)
    }
}

#[tokio::test]
async fn missing_receiver_stops_before_broadcast() {
    let ledger = Arc::new(InMemoryLedger::new());
    let redeemer = Redeemer::new(
        Arc::clone(&ledger),
        NoReceiver,
        ResolverConfig::new(Network::Mainnet),
    );
    let key = RedemptionKey::generate();
    fund(&ledger, &key, 10);

    let err = redeemer
        .redeem(RedemptionRequest::Regular {
            input: KeyInput::Code(key.to_base64()),
            passphrase: None,
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Signing);
    assert_eq!(ledger.submission_count(), 0);
}

// ---------------------------------------------------------------------------
// Idempotence and concurrency
// ---------------------------------------------------------------------------

#[tokio::test]
async fn second_redemption_finds_nothing() {
    let (ledger, redeemer) = setup();
    let key = RedemptionKey::generate();
    fund(&ledger, &key, 1_000);

    let request = RedemptionRequest::Regular {
        input: KeyInput::Code(key.to_base64()),
        passphrase: None,
    };
    assert_eq!(redeemer.redeem(request.clone()).await.unwrap(), 1_000);

    let err = redeemer.redeem(request).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RedemptionKeyAlreadyUsed);
    assert_eq!(ledger.submission_count(), 1);
    assert_eq!(ledger.balance(&receiver()), 1_000);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_claims_pay_out_once() {
    let (ledger, redeemer) = setup();
    let redeemer = Arc::new(redeemer);
    let key = RedemptionKey::generate();
    fund(&ledger, &key, 2_500);
    let code = key.to_base64();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let redeemer = Arc::clone(&redeemer);
            let code = code.clone();
            tokio::spawn(async move {
                redeemer
                    .redeem(RedemptionRequest::Regular {
                        input: KeyInput::Code(code),
                        passphrase: None,
                    })
                    .await
            })
        })
        .collect();

    let mut successes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(amount) => {
                assert_eq!(amount, 2_500);
                successes += 1;
            }
            Err(err) => assert!(matches!(
                err.kind(),
                ErrorKind::RedemptionKeyAlreadyUsed | ErrorKind::Broadcast
            )),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(ledger.accepted_tx_ids().len(), 1);
    assert_eq!(ledger.balance(&receiver()), 2_500);
}

// ---------------------------------------------------------------------------
// Observation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn observer_sees_every_stage_in_order() {
    let (ledger, redeemer) = setup();
    let key = RedemptionKey::generate();
    fund(&ledger, &key, 3);

    let mut stages = Vec::new();
    redeemer
        .redeem_observed(
            RedemptionRequest::Regular {
                input: KeyInput::Code(key.to_base64()),
                passphrase: None,
            },
            |stage| stages.push(stage),
        )
        .await
        .unwrap();

    assert_eq!(
        stages,
        vec![
            RedemptionStage::AwaitingCredential,
            RedemptionStage::Decrypting,
            RedemptionStage::KeyDerived,
            RedemptionStage::ResolvingUtxo,
            RedemptionStage::Signing,
            RedemptionStage::Broadcasting,
            RedemptionStage::Completed,
        ]
    );
}

#[tokio::test]
async fn observer_ends_on_failure() {
    let (_ledger, redeemer) = setup();
    let key = RedemptionKey::generate();

    let mut stages = Vec::new();
    let result = redeemer
        .redeem_observed(
            RedemptionRequest::Regular {
                input: KeyInput::Code(key.to_base64()),
                passphrase: None,
            },
            |stage| stages.push(stage),
        )
        .await;

    assert!(result.is_err());
    assert_eq!(
        stages.last(),
        Some(&RedemptionStage::Failed(ErrorKind::RedemptionKeyAlreadyUsed))
    );
    assert!(!stages.contains(&RedemptionStage::Signing));
}
