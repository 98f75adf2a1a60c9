//! ZK Privacy Pool Client Demo
//!
//! # Flow
//!
//! ```text
//! ┌──────────────┐   gross deposit    ┌──────────────┐
//! │ Amount Math  │───────────────────▶│   Deposit    │
//! └──────────────┘                    └──────┬───────┘
//!                                            │ commitment
//!                                            ▼
//! ┌──────────────────────────────────────────────────────┐
//! │                 ProofCoordinator                      │
//! │  ragequit proof → withdrawal proof → verification     │
//! └──────────────────────────┬───────────────────────────┘
//!                            │ TaskMessage / ResultMessage
//!                            ▼
//!                 ┌──────────────────────┐
//!                 │ SimulatedProver      │  (blocking pool)
//!                 └──────────────────────┘
//! ```
//!
//! `RUST_LOG=zk_pool_client=trace` 로 progress 메시지까지 출력 가능

use num_bigint::BigUint;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use zk_pool_client::services::format::{parse_units, truncate_address};
use zk_pool_client::types::MerkleProof;
use zk_pool_client::{
    calculate_initial_deposit, fee_breakdown, AccountCommitment, Amount, Config, ProofCoordinator,
    SimulatedProver, WithdrawalProofInput,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 환경변수 로드
    dotenvy::dotenv().ok();

    // 로깅 초기화
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "zk_pool_client=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("🚀 Starting ZK Privacy Pool client demo");

    // 설정 로드
    let config = Config::from_env()?;
    tracing::info!(environment = ?config.environment, "📋 Configuration loaded");

    let decimals = config.asset_decimals;

    // 1. Deposit: 순입금 1.0 을 받으려면 얼마를 보내야 하는가
    let desired_net = parse_units("1", decimals)?;
    let gross = calculate_initial_deposit(&desired_net, &config.asp_fee_bps)?;
    let deposit = fee_breakdown(&gross, &config.asp_fee_bps)?;
    tracing::info!(
        gross = %Amount::new(deposit.amount.clone(), decimals),
        fee = %Amount::new(deposit.fee.clone(), decimals),
        net = %Amount::new(deposit.net.clone(), decimals),
        "💰 Deposit computed"
    );

    let commitment = sample_commitment(&deposit.net);
    tracing::info!(commitment = %truncate_address(&commitment.hash), "📦 Commitment created");

    // 2. 증명 coordinator (채널은 첫 요청에서 생성)
    let coordinator = ProofCoordinator::new(SimulatedProver::new(config.proof_step_delay));

    let ragequit = coordinator
        .generate_ragequit_proof(&commitment)
        .with_progress(|p| tracing::debug!("ragequit {} {:.0}%", p.phase, p.progress * 100.0))
        .await?;
    tracing::info!(signals = ragequit.public_signals.len(), "🔐 Ragequit proof generated");

    // 3. Withdrawal: 절반 인출, relayer fee 차감
    let withdrawn = &deposit.net / BigUint::from(2u32);
    let relay = fee_breakdown(&withdrawn, &config.relayer_fee_bps)?;
    tracing::info!(
        amount = %Amount::new(relay.amount.clone(), decimals),
        relayer_fee = %Amount::new(relay.fee.clone(), decimals),
        received = %Amount::new(relay.net.clone(), decimals),
        "💸 Withdrawal computed"
    );

    let input = sample_withdrawal_input(&commitment, &withdrawn);
    let proof = coordinator
        .generate_withdrawal_proof(&commitment, &input)
        .with_progress(|p| tracing::debug!("withdrawal {} {:.0}%", p.phase, p.progress * 100.0))
        .await?;
    tracing::info!(signals = proof.public_signals.len(), "🔐 Withdrawal proof generated");

    // 4. 검증
    let valid = coordinator.verify_withdrawal_proof(&proof).await?;
    tracing::info!(valid, "✅ Withdrawal proof verified");

    coordinator.shutdown();
    Ok(())
}

fn sample_commitment(value: &BigUint) -> AccountCommitment {
    let value = value.to_string();
    let label = SimulatedProver::hash(&["demo-label"]);
    AccountCommitment {
        hash: SimulatedProver::hash(&[&value, &label, "demo-secret"]),
        value,
        label,
        nullifier: "demo-nullifier".to_string(),
        secret: "demo-secret".to_string(),
        block_number: 0,
        tx_hash: SimulatedProver::hash(&["demo-deposit"]),
    }
}

fn sample_withdrawal_input(commitment: &AccountCommitment, amount: &BigUint) -> WithdrawalProofInput {
    let state_root = SimulatedProver::hash(&["state", &commitment.hash]);
    let asp_root = SimulatedProver::hash(&["asp", &commitment.label]);

    WithdrawalProofInput {
        context: SimulatedProver::hash(&["demo-context", &amount.to_string()]),
        withdrawal_amount: amount.to_string(),
        state_merkle_proof: MerkleProof {
            root: state_root.clone(),
            leaf: commitment.hash.clone(),
            index: 0,
            siblings: Vec::new(),
        },
        asp_merkle_proof: MerkleProof {
            root: asp_root.clone(),
            leaf: commitment.label.clone(),
            index: 0,
            siblings: Vec::new(),
        },
        state_root,
        state_tree_depth: 0,
        asp_root,
        asp_tree_depth: 0,
        new_secret: "demo-secret-2".to_string(),
        new_nullifier: "demo-nullifier-2".to_string(),
    }
}
