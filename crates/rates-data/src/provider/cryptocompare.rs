//! CryptoCompare 가격 비교 API 클라이언트.
//!
//! `GET /data/price?fsym=BTC&tsyms=USD,EUR,...` 한 번으로 기준 자산의
//! 대상 통화별 가격을 받아 그대로 시세 집합으로 변환합니다.

use super::{read_success_body, RateProvider, CROSS_RATE_CURRENCIES};
use crate::error::{DataError, Result};
use crate::json_path::decimal_from_value;
use crate::rates::RateSet;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// CryptoCompare API 기본 URL.
pub const CRYPTOCOMPARE_URL: &str = "https://min-api.cryptocompare.com";

/// 기준 자산.
pub const BASE_SYMBOL: &str = "BTC";

/// CryptoCompare 시세 제공자.
#[derive(Clone)]
pub struct CryptoCompareProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    targets: Vec<String>,
}

impl CryptoCompareProvider {
    /// 요청 타임아웃을 지정해 생성합니다.
    ///
    /// 대상 통화는 USD, EUR, VES와 교차 환율 통화 목록 전체입니다.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DataError::ConfigError(format!("HTTP 클라이언트 생성 실패: {}", e)))?;

        let targets = ["USD", "EUR", "VES"]
            .iter()
            .chain(CROSS_RATE_CURRENCIES.iter())
            .map(|s| s.to_string())
            .collect();

        Ok(Self {
            client,
            base_url: CRYPTOCOMPARE_URL.to_string(),
            api_key: None,
            targets,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    /// 응답 본문을 시세 집합으로 변환합니다.
    ///
    /// `{"Response":"Error","Message":...}` 형태의 API 오류는 에러로 반환합니다.
    pub fn parse_rates(body: &str) -> Result<RateSet> {
        let doc: Value = serde_json::from_str(body)?;
        let object = doc
            .as_object()
            .ok_or_else(|| DataError::ParseError("expected JSON object".to_string()))?;

        if object.get("Response").and_then(Value::as_str) == Some("Error") {
            let message = object
                .get("Message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            return Err(DataError::FetchError(format!("CryptoCompare: {}", message)));
        }

        let mut rates = RateSet::new();
        for (symbol, value) in object {
            if let Some(price) = decimal_from_value(value) {
                rates.insert(symbol, price);
            } else {
                warn!(symbol = %symbol, "숫자가 아닌 가격 무시");
            }
        }
        Ok(rates)
    }
}

#[async_trait]
impl RateProvider for CryptoCompareProvider {
    fn name(&self) -> &str {
        "cryptocompare"
    }

    async fn fetch(&self) -> Result<RateSet> {
        let url = format!("{}/data/price", self.base_url);
        let tsyms = self.targets.join(",");

        debug!(url = %url, fsym = BASE_SYMBOL, targets = self.targets.len(), "CryptoCompare 시세 요청");

        let mut request = self
            .client
            .get(&url)
            .query(&[("fsym", BASE_SYMBOL), ("tsyms", tsyms.as_str())])
            .header("Accept", "application/json");
        if let Some(key) = &self.api_key {
            request = request.header("authorization", format!("Apikey {}", key));
        }

        let response = request.send().await?;
        let body = read_success_body(response, "CryptoCompare").await?;
        let rates = Self::parse_rates(&body)?;

        debug!(count = rates.len(), "CryptoCompare 시세 수신");
        Ok(rates)
    }
}
