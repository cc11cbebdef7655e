//! Yadio 집계 API 클라이언트.
//!
//! `https://api.yadio.io/json` 응답은 자산 심볼별 객체로 구성됩니다.
//!
//! ```json
//! {
//!   "BTC": { "price": 65000.0, "eur": 60000.0, ... },
//!   "USD": { "COP": 4000.0, "CLP": 950.0, ... },
//!   "VES": { "price": 36.5, ... }
//! }
//! ```
//!
//! 추출 규칙:
//! - `VES` ← `VES.price`
//! - `USD` ← `BTC.price`
//! - `EUR` ← `BTC.eur`
//! - 교차 환율 `XXX` ← `BTC.price × USD.XXX`
//!
//! 필드가 없거나 형식이 잘못되면 해당 값은 0이 됩니다.

use super::{read_success_body, RateProvider, CROSS_RATE_CURRENCIES};
use crate::error::{DataError, Result};
use crate::json_path::extract_or_zero;
use crate::rates::RateSet;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Yadio API 기본 URL.
pub const YADIO_URL: &str = "https://api.yadio.io/json";

/// Yadio 시세 제공자.
#[derive(Clone)]
pub struct YadioProvider {
    client: reqwest::Client,
    url: String,
}

impl YadioProvider {
    /// 요청 타임아웃을 지정해 생성합니다.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DataError::ConfigError(format!("HTTP 클라이언트 생성 실패: {}", e)))?;

        Ok(Self {
            client,
            url: YADIO_URL.to_string(),
        })
    }

    /// 조회 URL을 바꿉니다 (테스트 서버 등).
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// 응답 본문에서 시세 집합을 계산합니다.
    ///
    /// JSON이 아닌 본문은 빈 문서로 취급하여 모든 값이 0이 됩니다.
    pub fn parse_rates(body: &str) -> RateSet {
        let doc: Value = serde_json::from_str(body).unwrap_or_else(|e| {
            warn!(error = %e, "Yadio 응답 JSON 파싱 실패, 모든 값을 0으로 처리");
            Value::Null
        });

        let mut rates = RateSet::new();
        rates.insert("VES", extract_or_zero(&doc, "VES.price"));

        let usd = extract_or_zero(&doc, "BTC.price");
        rates.insert("USD", usd);
        rates.insert("EUR", extract_or_zero(&doc, "BTC.eur"));

        for currency in CROSS_RATE_CURRENCIES {
            let multiplier = extract_or_zero(&doc, &format!("USD.{}", currency));
            let price = usd.checked_mul(multiplier).unwrap_or_else(|| {
                warn!(currency, %usd, %multiplier, "교차 환율 계산 오버플로, 0으로 처리");
                Decimal::ZERO
            });
            rates.insert(currency, price);
        }

        rates
    }
}

#[async_trait]
impl RateProvider for YadioProvider {
    fn name(&self) -> &str {
        "yadio"
    }

    async fn fetch(&self) -> Result<RateSet> {
        debug!(url = %self.url, "Yadio 시세 요청");

        let response = self
            .client
            .get(&self.url)
            .header("Accept", "application/json")
            .send()
            .await?;

        let body = read_success_body(response, "Yadio").await?;
        let rates = Self::parse_rates(&body);

        debug!(count = rates.len(), "Yadio 시세 수신");
        Ok(rates)
    }
}
