//! 통화별 시세 집합.

use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// 저장 시 소수점 자릿수.
pub const PRICE_SCALE: u32 = 6;

/// 통화 코드 → 가격 매핑.
///
/// 한 번의 수집 주기마다 새로 만들어지고 캐시에 기록된 뒤 버려집니다.
/// 키 순서는 의미가 없지만 로그 출력을 위해 정렬된 상태로 유지합니다.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateSet {
    rates: BTreeMap<String, Decimal>,
}

impl RateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 가격을 추가합니다. 통화 코드는 대문자로 정규화됩니다.
    pub fn insert(&mut self, code: impl AsRef<str>, price: Decimal) {
        self.rates.insert(code.as_ref().to_uppercase(), price);
    }

    pub fn get(&self, code: &str) -> Option<Decimal> {
        self.rates.get(code).copied()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.rates.iter().map(|(code, price)| (code.as_str(), *price))
    }

    /// 캐시 해시 필드로 변환합니다 (`"COP" -> "260000000.000000"`).
    pub fn to_fields(&self) -> BTreeMap<String, String> {
        self.rates
            .iter()
            .map(|(code, price)| (code.clone(), format_price(*price)))
            .collect()
    }
}

impl FromIterator<(String, Decimal)> for RateSet {
    fn from_iter<I: IntoIterator<Item = (String, Decimal)>>(iter: I) -> Self {
        let mut set = RateSet::new();
        for (code, price) in iter {
            set.insert(code, price);
        }
        set
    }
}

/// 가격을 소수점 6자리 고정소수점 문자열로 포맷합니다.
///
/// 정수부가 22자리를 넘으면 `Decimal` 가수에 6자리 소수를 담을 수 없으므로
/// 문자열 단계에서 0을 채웁니다.
pub fn format_price(price: Decimal) -> String {
    let mut rounded = price.round_dp(PRICE_SCALE);
    if rounded.is_zero() {
        // -0 방지
        rounded = Decimal::ZERO;
    }
    format!("{:.prec$}", rounded, prec = PRICE_SCALE as usize)
}
