//! Amount Math
//!
//! Deposit / withdrawal 금액과 basis-point 수수료 계산.
//!
//! # Design Decision
//!
//! 모든 금액은 base unit 임의 정밀도 정수(`BigUint`)로만 계산.
//! 나눗셈은 정수 나눗셈(버림)이며 온체인 계산과 동일한 결과를 냄.
//! float 은 어디에도 사용하지 않음.
//!
//! ```text
//! fee     = floor(amount * fee_bps / 10000)
//! deposit = floor(input * 10000 / (10000 - fee_bps))
//! ```

use num_bigint::BigUint;

use crate::error::AmountError;

/// 10000 bps = 100%
pub const BPS_DENOMINATOR: u32 = 10_000;

/// 수수료 계산 결과 (review 화면용)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeBreakdown {
    pub amount: BigUint,
    pub fee: BigUint,
    /// amount - fee
    pub net: BigUint,
}

fn is_zero(value: &BigUint) -> bool {
    value.bits() == 0
}

/// fee_bps 가 100% 미만인지 확인
pub fn validate_fee_bps(fee_bps: &BigUint) -> Result<(), AmountError> {
    if fee_bps >= &BigUint::from(BPS_DENOMINATOR) {
        return Err(AmountError::FeeOutOfRange { fee_bps: fee_bps.clone() });
    }
    Ok(())
}

/// fee/quote 서비스가 주는 문자열 fee rate 파싱 (`"feeBPS": "50"`)
pub fn parse_fee_bps(raw: &str) -> Result<BigUint, AmountError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AmountError::InvalidAmount(format!("invalid fee rate '{}'", raw)));
    }

    let fee_bps: BigUint = trimmed
        .parse()
        .map_err(|e| AmountError::InvalidAmount(format!("invalid fee rate '{}': {}", raw, e)))?;

    validate_fee_bps(&fee_bps)?;
    Ok(fee_bps)
}

/// ASP 수수료 계산
///
/// 나머지는 버림. 작은 금액에서는 수수료가 0이 될 수 있음
/// (`calculate_asp_fee(100, 1) == 0`).
pub fn calculate_asp_fee(amount: &BigUint, fee_bps: &BigUint) -> BigUint {
    amount * fee_bps / BigUint::from(BPS_DENOMINATOR)
}

/// 수수료 차감 후 `input_amount` 가 남도록 하는 gross deposit 계산
///
/// # Errors
///
/// `fee_bps >= 10000` 이면 분모가 0 이하가 되므로 `AmountError::FeeOutOfRange`.
pub fn calculate_initial_deposit(
    input_amount: &BigUint,
    fee_bps: &BigUint,
) -> Result<BigUint, AmountError> {
    validate_fee_bps(fee_bps)?;

    if is_zero(fee_bps) {
        return Ok(input_amount.clone());
    }

    let denominator = BigUint::from(BPS_DENOMINATOR);
    Ok(input_amount * &denominator / (&denominator - fee_bps))
}

/// 금액 / 수수료 / 실수령액 분해
///
/// deposit 의 vetting fee 와 withdrawal 의 relayer fee 모두 같은 식을 사용
pub fn fee_breakdown(amount: &BigUint, fee_bps: &BigUint) -> Result<FeeBreakdown, AmountError> {
    validate_fee_bps(fee_bps)?;

    let fee = calculate_asp_fee(amount, fee_bps);
    let net = amount - &fee;

    Ok(FeeBreakdown {
        amount: amount.clone(),
        fee,
        net,
    })
}
