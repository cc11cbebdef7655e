//! 시세 제공자 모듈.
//!
//! - Yadio: 집계 API 응답에서 BTC/USD 가격과 USD 기준 환율을 곱해 교차 환율 계산
//! - CryptoCompare: BTC 가격을 대상 통화 목록으로 직접 조회

pub mod cryptocompare;
pub mod yadio;

pub use cryptocompare::CryptoCompareProvider;
pub use yadio::YadioProvider;

use crate::error::{DataError, Result};
use crate::rates::RateSet;
use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;

/// BTC/USD 가격에 USD 기준 환율을 곱해 계산하는 법정화폐 목록.
pub const CROSS_RATE_CURRENCIES: [&str; 42] = [
    "COP", "CLP", "DOP", "UYU", "BRL", "PEN", "ARS", "MXN", "GBP", "RUB", //
    "CNY", "JPY", "CAD", "AUD", "SGD", "CHF", "SEK", "KRW", "INR", "NOK", //
    "TTD", "PYG", "TRY", "GTQ", "CRC", "ILS", "PAB", "VND", "AED", "HKD", //
    "IDR", "DKK", "BOB", "NZD", "PHP", "CZK", "PLN", "PKR", "ZAR", "NAD", //
    "RON", "ANG",
];

/// 시세 제공자 트레잇.
#[async_trait]
pub trait RateProvider: Send + Sync {
    /// 제공자 이름 (로그용).
    fn name(&self) -> &str;

    /// 현재 시세를 조회합니다.
    async fn fetch(&self) -> Result<RateSet>;
}

/// 설정에서 선택 가능한 제공자 종류.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProviderKind {
    #[default]
    Yadio,
    CryptoCompare,
}

impl FromStr for ProviderKind {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "yadio" => Ok(Self::Yadio),
            "cryptocompare" | "crypto-compare" => Ok(Self::CryptoCompare),
            other => Err(DataError::ConfigError(format!("unknown rate provider: {}", other))),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yadio => write!(f, "yadio"),
            Self::CryptoCompare => write!(f, "cryptocompare"),
        }
    }
}

/// 응답 상태 코드를 확인하고 본문을 문자열로 읽습니다.
pub(crate) async fn read_success_body(response: reqwest::Response, source: &str) -> Result<String> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(DataError::FetchError(format!(
            "{} API 오류 [{}]: {}",
            source, status, body
        )));
    }
    Ok(response.text().await?)
}
