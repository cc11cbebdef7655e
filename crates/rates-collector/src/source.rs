//! 설정에 따른 시세 제공자 생성.

use crate::config::ProviderConfig;
use crate::Result;
use rates_data::{CryptoCompareProvider, ProviderKind, RateProvider, YadioProvider};

/// 설정된 제공자를 생성합니다.
pub fn build_provider(config: &ProviderConfig) -> Result<Box<dyn RateProvider>> {
    let timeout = config.http_timeout();

    let provider: Box<dyn RateProvider> = match config.kind {
        ProviderKind::Yadio => {
            let mut provider = YadioProvider::new(timeout)?;
            if let Some(url) = &config.base_url {
                provider = provider.with_url(url.clone());
            }
            Box::new(provider)
        }
        ProviderKind::CryptoCompare => {
            let mut provider =
                CryptoCompareProvider::new(timeout)?.with_api_key(config.api_key.clone());
            if let Some(url) = &config.base_url {
                provider = provider.with_base_url(url.clone());
            }
            Box::new(provider)
        }
    };

    tracing::debug!(provider = provider.name(), timeout_secs = timeout.as_secs(), "시세 제공자 생성");
    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider_config(kind: ProviderKind) -> ProviderConfig {
        ProviderConfig {
            kind,
            http_timeout_secs: 10,
            base_url: None,
            api_key: None,
        }
    }

    #[test]
    fn test_build_each_provider() {
        let yadio = build_provider(&provider_config(ProviderKind::Yadio)).unwrap();
        assert_eq!(yadio.name(), "yadio");

        let cc = build_provider(&provider_config(ProviderKind::CryptoCompare)).unwrap();
        assert_eq!(cc.name(), "cryptocompare");
    }
}
