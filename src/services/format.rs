//! Display helpers
//!
//! base unit 금액 ↔ 10진수 문자열 변환, 주소 축약, 타임스탬프 표시.
//! 금액 변환은 문자열 자릿수 연산으로만 처리 (정밀도 손실 없음).

use chrono::{DateTime, Utc};
use num_bigint::BigUint;

use crate::error::AmountError;

/// 허용하는 최대 decimals (uint256 최댓값의 자릿수)
pub const MAX_DECIMALS: u32 = 77;

/// decimals 범위 검사
pub fn validate_decimals(decimals: u32) -> Result<u32, AmountError> {
    if decimals > MAX_DECIMALS {
        return Err(AmountError::DecimalsOutOfRange {
            decimals,
            max: MAX_DECIMALS,
        });
    }
    Ok(decimals)
}

/// base units → 10진수 문자열
///
/// 소수부 끝의 0은 제거 (`1500000, 6` → `"1.5"`)
pub fn format_units(amount: &BigUint, decimals: u32) -> String {
    let digits = amount.to_str_radix(10);
    if decimals == 0 {
        return digits;
    }

    let scale = decimals as usize;
    let (int_part, frac_part) = if digits.len() > scale {
        let split = digits.len() - scale;
        (digits[..split].to_string(), digits[split..].to_string())
    } else {
        ("0".to_string(), format!("{:0>width$}", digits, width = scale))
    };

    let frac_part = frac_part.trim_end_matches('0');
    if frac_part.is_empty() {
        int_part
    } else {
        format!("{}.{}", int_part, frac_part)
    }
}

/// 10진수 문자열 → base units
///
/// # Errors
///
/// - 빈 문자열, 숫자 외 문자, 음수
/// - `decimals` 보다 긴 소수부 (버림 대신 거부)
/// - `MAX_DECIMALS` 초과
pub fn parse_units(raw: &str, decimals: u32) -> Result<BigUint, AmountError> {
    validate_decimals(decimals)?;
    let trimmed = raw.trim();
    let invalid = || AmountError::InvalidAmount(format!("'{}' is not a decimal amount", raw));

    let (int_part, frac_part) = match trimmed.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (trimmed, ""),
    };

    if int_part.is_empty() && frac_part.is_empty() {
        return Err(invalid());
    }
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(int_part) || !all_digits(frac_part) {
        return Err(invalid());
    }

    if frac_part.len() > decimals as usize {
        return Err(AmountError::TooManyDecimals {
            found: frac_part.len(),
            decimals,
        });
    }

    let mut combined = String::with_capacity(int_part.len() + decimals as usize);
    combined.push_str(int_part);
    combined.push_str(frac_part);
    combined.extend(std::iter::repeat('0').take(decimals as usize - frac_part.len()));

    if combined.is_empty() {
        return Err(invalid());
    }
    combined.parse().map_err(|_| invalid())
}

/// `0x1234567890abcdef...` → `0x1234...5678`
///
/// 10자 이하는 그대로 반환
pub fn truncate_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 10 {
        return address.to_string();
    }

    let prefix: String = chars[..6].iter().collect();
    let suffix: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", prefix, suffix)
}

/// 초(10자리 이하) 또는 밀리초 타임스탬프 파싱
fn parse_timestamp(timestamp: &str) -> Option<DateTime<Utc>> {
    let trimmed = timestamp.trim();
    let value: i64 = trimmed.parse().ok()?;
    let millis = if trimmed.len() <= 10 {
        value.checked_mul(1000)?
    } else {
        value
    };
    DateTime::from_timestamp_millis(millis)
}

/// `dd/mm/yyyy HH:MM` (UTC), `full` 이면 ` UTC+0` 추가
///
/// 파싱 불가 → `"-"`
pub fn format_timestamp(timestamp: &str, full: bool) -> String {
    let Some(date) = parse_timestamp(timestamp) else {
        return "-".to_string();
    };

    let formatted = date.format("%d/%m/%Y %H:%M").to_string();
    if full {
        format!("{} UTC+0", formatted)
    } else {
        formatted
    }
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("{} {} ago", count, unit)
    } else {
        format!("{} {}s ago", count, unit)
    }
}

/// 상대 시간 표시 (`3 hours ago`)
///
/// 한 달 = 30일, 1년 = 365일
pub fn time_ago(timestamp: &str, now: DateTime<Utc>) -> String {
    let Some(date) = parse_timestamp(timestamp) else {
        return "-".to_string();
    };

    let diff = (now - date).num_seconds();
    match diff {
        d if d < 60 => "just now".to_string(),
        d if d < 3_600 => plural(d / 60, "minute"),
        d if d < 86_400 => plural(d / 3_600, "hour"),
        d if d < 2_592_000 => plural(d / 86_400, "day"),
        d if d < 31_536_000 => plural(d / 2_592_000, "month"),
        d => plural(d / 31_536_000, "year"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    fn units(s: &str) -> BigUint {
        s.parse().unwrap()
    }

    #[test]
    fn test_format_units() {
        assert_eq!(format_units(&units("1010101010101010101"), 18), "1.010101010101010101");
        assert_eq!(format_units(&units("10000000000000000"), 18), "0.01");
        assert_eq!(format_units(&units("2000000000000000000"), 18), "2");
        assert_eq!(format_units(&units("0"), 18), "0");
        assert_eq!(format_units(&units("1"), 6), "0.000001");
        assert_eq!(format_units(&units("12345"), 0), "12345");
    }

    #[test]
    fn test_parse_units() {
        assert_eq!(assert_ok!(parse_units("1", 18)), units("1000000000000000000"));
        assert_eq!(assert_ok!(parse_units("0.01", 18)), units("10000000000000000"));
        assert_eq!(assert_ok!(parse_units(".5", 6)), units("500000"));
        assert_eq!(assert_ok!(parse_units("1.", 6)), units("1000000"));
        assert_eq!(assert_ok!(parse_units("42", 0)), units("42"));
    }

    #[test]
    fn test_parse_units_rejects_bad_input() {
        assert_err!(parse_units("", 18));
        assert_err!(parse_units(".", 18));
        assert_err!(parse_units("-1", 18));
        assert_err!(parse_units("1e18", 18));
        assert_err!(parse_units("1.2.3", 18));

        let err = assert_err!(parse_units("1.0000001", 6));
        assert_eq!(err, AmountError::TooManyDecimals { found: 7, decimals: 6 });
    }

    #[test]
    fn test_parse_units_rejects_huge_decimals() {
        let err = assert_err!(parse_units("1", u32::MAX));
        assert_eq!(err, AmountError::DecimalsOutOfRange { decimals: u32::MAX, max: MAX_DECIMALS });

        assert_eq!(assert_ok!(validate_decimals(MAX_DECIMALS)), MAX_DECIMALS);
        assert_err!(validate_decimals(MAX_DECIMALS + 1));
        assert_ok!(parse_units("1", MAX_DECIMALS));
    }

    #[test]
    fn test_parse_format_inverse() {
        for (raw, decimals) in [("1010101010101010101", 18), ("5", 6), ("123456789", 3)] {
            let amount = units(raw);
            let shown = format_units(&amount, decimals);
            assert_eq!(assert_ok!(parse_units(&shown, decimals)), amount);
        }
    }

    #[test]
    fn test_truncate_address() {
        assert_eq!(
            truncate_address("0x1234567890abcdef1234567890abcdef12345678"),
            "0x1234...5678"
        );
        assert_eq!(truncate_address(""), "");
        assert_eq!(truncate_address("0x1"), "0x1");
        assert_eq!(truncate_address("0x12345678"), "0x12345678");
        assert_eq!(truncate_address("0x123456789"), "0x1234...6789");
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp("1705315800", false), "15/01/2024 10:50");
        assert_eq!(format_timestamp("1705315800000", false), "15/01/2024 10:50");
        assert_eq!(format_timestamp("1705315800000", true), "15/01/2024 10:50 UTC+0");
        assert_eq!(format_timestamp("1672531200", false), "01/01/2023 00:00");
        assert_eq!(format_timestamp("not-a-timestamp", false), "-");
        assert_eq!(format_timestamp("", true), "-");
    }

    #[test]
    fn test_time_ago() {
        let now = assert_ok!(DateTime::parse_from_rfc3339("2024-01-15T12:00:00Z")).with_timezone(&Utc);

        assert_eq!(time_ago("1705320000", now), "just now"); // 12:00:00
        assert_eq!(time_ago("1705319940", now), "1 minute ago");
        assert_eq!(time_ago("1705312800", now), "2 hours ago");
        assert_eq!(time_ago("1705233600", now), "1 day ago");
        assert_eq!(time_ago("1699920000", now), "2 months ago");
        assert_eq!(time_ago("1641038400", now), "2 years ago");
        assert_eq!(time_ago("garbage", now), "-");
    }
}
