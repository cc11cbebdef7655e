//! 점(`.`)으로 구분된 경로로 JSON 숫자 필드를 읽는 접근자.
//!
//! 시세 API 응답은 필드가 빠지거나 형식이 바뀌는 일이 잦습니다.
//! `extract`는 값이 없으면 `None`을 돌려주고, `extract_or_zero`는 이를
//! 0으로 채웁니다. 0 채움은 의도된 동작이며 해당 주기를 실패로 만들지 않습니다.

use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

/// `"BTC.price"` 같은 경로의 값을 `Decimal`로 읽습니다.
///
/// - 숫자: 그대로 변환 (지수 표기 포함)
/// - 문자열: 숫자로 파싱 가능하면 변환
/// - bool: `true` → 1, `false` → 0
/// - 그 외 (null, 객체, 배열, 경로 없음): `None`
pub fn extract(doc: &Value, path: &str) -> Option<Decimal> {
    let mut current = doc;
    for segment in path.split('.') {
        current = current.as_object()?.get(segment)?;
    }
    decimal_from_value(current)
}

/// `extract`와 같지만 값이 없으면 0을 반환합니다.
pub fn extract_or_zero(doc: &Value, path: &str) -> Decimal {
    extract(doc, path).unwrap_or(Decimal::ZERO)
}

/// 단일 JSON 값을 `Decimal`로 변환합니다.
pub fn decimal_from_value(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => parse_decimal(&n.to_string()),
        Value::String(s) => parse_decimal(s.trim()),
        Value::Bool(b) => Some(if *b { Decimal::ONE } else { Decimal::ZERO }),
        _ => None,
    }
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}
