//! Yadio mock 서버와 메모리 캐시로 폴링 주기 전체를 검증합니다.

use async_trait::async_trait;
use rates_collector::{CycleOutcome, FailurePolicy, PollSettings, Poller, Ticker};
use rates_data::{CacheWriter, MemoryStore, YadioProvider, CROSS_RATE_CURRENCIES};
use std::time::Duration;

const KEY: &str = "RATES:BTC";

const FIXTURE: &str = r#"{
    "VES": { "price": 36.5 },
    "BTC": { "price": 65000.0, "eur": 60000.0 },
    "USD": { "COP": 4000.0 }
}"#;

/// 대기 없이 바로 반환하는 ticker
struct NoWait;

#[async_trait]
impl Ticker for NoWait {
    async fn wait(&mut self, _period: Duration) {}
}

fn settings() -> PollSettings {
    PollSettings {
        key: KEY.to_string(),
        ttl_secs: 600,
        interval: Duration::from_secs(30),
        failure_policy: FailurePolicy::Continue,
    }
}

fn poller_for(server: &mockito::Server, store: MemoryStore) -> Poller<MemoryStore, NoWait> {
    let provider = YadioProvider::new(Duration::from_secs(10))
        .expect("HTTP client")
        .with_url(format!("{}/json", server.url()));
    Poller::new(Box::new(provider), CacheWriter::new(store), NoWait, settings())
}

#[tokio::test]
async fn test_cycle_caches_direct_and_cross_rates() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/json")
        .with_status(200)
        .with_body(FIXTURE)
        .create_async()
        .await;

    let mut poller = poller_for(&server, MemoryStore::new());
    let outcome = poller.run_cycle().await.unwrap();

    assert_eq!(
        outcome,
        CycleOutcome::Updated {
            fields: 3 + CROSS_RATE_CURRENCIES.len()
        }
    );

    let entry = poller.writer().read(KEY).await.unwrap();
    assert_eq!(entry.ttl_secs, Some(600));
    assert_eq!(entry.fields["VES"], "36.500000");
    assert_eq!(entry.fields["USD"], "65000.000000");
    assert_eq!(entry.fields["EUR"], "60000.000000");
    assert_eq!(entry.fields["COP"], "260000000.000000");
}

#[tokio::test]
async fn test_missing_btc_price_zero_fills_usd_and_cross_rates() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/json")
        .with_status(200)
        .with_body(r#"{ "VES": { "price": 36.5 }, "BTC": { "eur": 60000.0 }, "USD": { "COP": 4000.0 } }"#)
        .create_async()
        .await;

    let mut poller = poller_for(&server, MemoryStore::new());
    poller.run_cycle().await.unwrap();

    let entry = poller.writer().read(KEY).await.unwrap();
    assert_eq!(entry.fields["USD"], "0.000000");
    for currency in CROSS_RATE_CURRENCIES {
        assert_eq!(entry.fields[currency], "0.000000");
    }
}

#[tokio::test]
async fn test_upstream_failure_keeps_previous_entry() {
    let mut server = mockito::Server::new_async().await;
    let ok = server
        .mock("GET", "/json")
        .with_status(200)
        .with_body(FIXTURE)
        .expect(1)
        .create_async()
        .await;

    let store = MemoryStore::new();
    let mut poller = poller_for(&server, store.clone());
    poller.run_cycle().await.unwrap();
    ok.assert_async().await;
    ok.remove_async().await;

    let before = poller.writer().read(KEY).await.unwrap();

    let _failing = server
        .mock("GET", "/json")
        .with_status(502)
        .create_async()
        .await;
    let outcome = poller.run_cycle().await.unwrap();

    let after = poller.writer().read(KEY).await.unwrap();
    assert_eq!(outcome, CycleOutcome::FetchFailed);
    assert_eq!(before, after);
    assert_eq!(poller.stats().updated, 1);
    assert_eq!(poller.stats().fetch_errors, 1);
}

#[tokio::test]
async fn test_bounded_run_with_injected_ticker() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/json")
        .with_status(200)
        .with_body(FIXTURE)
        .expect(3)
        .create_async()
        .await;

    let mut poller = poller_for(&server, MemoryStore::new());
    poller.run_cycles(3).await.unwrap();

    mock.assert_async().await;
    assert_eq!(poller.stats().cycles, 3);
    assert_eq!(poller.stats().updated, 3);
}
