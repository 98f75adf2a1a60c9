//! Configuration Module
//!
//! 환경변수 기반 설정. 잘못된 fee 설정은 시작 시점에 바로 실패 (fail-fast).

use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use num_bigint::BigUint;

use crate::services::amount::parse_fee_bps;
use crate::services::format::validate_decimals;

/// 애플리케이션 설정
#[derive(Debug, Clone)]
pub struct Config {
    /// Deposit vetting fee (bps, 기본값: 100)
    pub asp_fee_bps: BigUint,

    /// Withdrawal relayer fee (bps, 기본값: 50)
    pub relayer_fee_bps: BigUint,

    /// 표시용 자산 decimals (기본값: 18)
    pub asset_decimals: u32,

    /// Simulated prover 단계별 지연 (기본값: 25ms)
    pub proof_step_delay: Duration,

    /// 환경 (development, staging, production)
    pub environment: Environment,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

impl Config {
    /// 환경변수에서 설정 로드
    ///
    /// # Optional Environment Variables
    ///
    /// - `ENVIRONMENT`: development | staging | production
    /// - `ASP_FEE_BPS`: deposit fee (bps)
    /// - `RELAYER_FEE_BPS`: withdrawal fee (bps)
    /// - `ASSET_DECIMALS`: 자산 decimals
    /// - `PROOF_STEP_DELAY_MS`: simulated prover 지연
    pub fn from_env() -> Result<Self> {
        let environment = match var_or("ENVIRONMENT", "development").to_lowercase().as_str() {
            "production" => Environment::Production,
            "staging" => Environment::Staging,
            _ => Environment::Development,
        };

        let asp_fee_bps = parse_fee_bps(&var_or("ASP_FEE_BPS", "100"))
            .context("ASP_FEE_BPS must be an integer below 10000")?;

        let relayer_fee_bps = parse_fee_bps(&var_or("RELAYER_FEE_BPS", "50"))
            .context("RELAYER_FEE_BPS must be an integer below 10000")?;

        let asset_decimals = var_or("ASSET_DECIMALS", "18")
            .parse()
            .context("ASSET_DECIMALS must be a valid number")?;
        let asset_decimals = validate_decimals(asset_decimals)
            .context("ASSET_DECIMALS must not exceed 77")?;

        let step_delay_ms: u64 = var_or("PROOF_STEP_DELAY_MS", "25")
            .parse()
            .context("PROOF_STEP_DELAY_MS must be a valid number")?;

        Ok(Config {
            asp_fee_bps,
            relayer_fee_bps,
            asset_decimals,
            proof_step_delay: Duration::from_millis(step_delay_ms),
            environment,
        })
    }

    /// 프로덕션 환경인지 확인
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        // 환경변수 없이 기본값으로 설정 생성
        let config = Config::from_env().unwrap();
        assert_eq!(config.asp_fee_bps, BigUint::from(100u32));
        assert_eq!(config.relayer_fee_bps, BigUint::from(50u32));
        assert_eq!(config.asset_decimals, 18);
        assert_eq!(config.environment, Environment::Development);
        assert!(!config.is_production());
    }

    #[test]
    fn test_decimals_bound_matches_config_check() {
        // from_env 와 같은 검사: 기본값은 통과, u32::MAX 는 거부
        assert_eq!(validate_decimals(18), Ok(18));
        assert!(validate_decimals(u32::MAX).is_err());
    }
}
