use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use serde_json::{json, Value};
use stockdash_lib::{PriceBar, Store};
use stockdash_server::{app, build_dashboard};
use wiremock::MockServer;

fn bars(closes: &[f64]) -> Vec<PriceBar> {
    let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| PriceBar {
            date: start + chrono::Days::new(i as u64),
            open: Some(c),
            high: Some(c),
            low: Some(c),
            close: Some(c),
            volume: Some(1),
        })
        .collect()
}

struct TestServer {
    base: String,
    store: Arc<Store>,
    _upstream: MockServer,
}

fn bundled_samples() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("sample")
}

/// Serve the real router on an ephemeral port. Both providers point at a
/// mock upstream with no routes mounted, so every live fetch fails.
async fn spawn(sample_dir: &Path, static_dir: &Path, seed: &[(&str, Vec<f64>)]) -> TestServer {
    let store = Store::open_in_memory().unwrap();
    store.init().unwrap();
    for (symbol, closes) in seed {
        store.upsert_prices(symbol, &bars(closes)).unwrap();
    }
    spawn_with_store(Arc::new(store), sample_dir, static_dir).await
}

async fn spawn_with_store(store: Arc<Store>, sample_dir: &Path, static_dir: &Path) -> TestServer {
    let upstream = MockServer::start().await;

    let dashboard = build_dashboard(
        Arc::clone(&store),
        &upstream.uri(),
        &upstream.uri(),
        sample_dir,
        Duration::from_secs(5),
    )
    .unwrap();
    let router = app(Arc::new(dashboard), static_dir, None);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestServer {
        base: format!("http://{addr}"),
        store,
        _upstream: upstream,
    }
}

async fn get(url: String) -> (u16, Value) {
    let resp = reqwest::get(url).await.unwrap();
    let status = resp.status().as_u16();
    (status, resp.json().await.unwrap())
}

#[tokio::test]
async fn health_is_ok() {
    let dir = tempfile::tempdir().unwrap();
    let srv = spawn(dir.path(), dir.path(), &[]).await;
    let (status, body) = get(format!("{}/health", srv.base)).await;
    assert_eq!(status, 200);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn companies_are_sorted_by_symbol() {
    let dir = tempfile::tempdir().unwrap();
    let srv = spawn(dir.path(), dir.path(), &[]).await;
    let (status, body) = get(format!("{}/api/companies", srv.base)).await;
    assert_eq!(status, 200);
    let symbols: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["symbol"].as_str().unwrap())
        .collect();
    assert_eq!(symbols.len(), 11);
    let mut sorted = symbols.clone();
    sorted.sort();
    assert_eq!(symbols, sorted);
    assert!(body[0]["name"].is_string());
}

#[tokio::test]
async fn unknown_api_path_is_json_404() {
    let dir = tempfile::tempdir().unwrap();
    let srv = spawn(dir.path(), dir.path(), &[]).await;
    let (status, body) = get(format!("{}/api/nope", srv.base)).await;
    assert_eq!(status, 404);
    assert_eq!(body, json!({"error": "not found"}));
}

#[tokio::test]
async fn prices_degrade_to_empty_series() {
    let dir = tempfile::tempdir().unwrap();
    let srv = spawn(dir.path(), dir.path(), &[]).await;
    let (status, body) = get(format!("{}/api/prices/ZZZZ", srv.base)).await;
    assert_eq!(status, 200);
    assert_eq!(
        body,
        json!({"symbol": "ZZZZ", "range": "6mo", "interval": "1d", "data": [], "stats": {}})
    );
}

#[tokio::test]
async fn prices_fall_back_to_cache() {
    let dir = tempfile::tempdir().unwrap();
    let srv = spawn(dir.path(), dir.path(), &[("MSFT", vec![1.0, 2.0, 3.0])]).await;
    let (status, body) = get(format!("{}/api/prices/MSFT?range=1mo&interval=1wk", srv.base)).await;
    assert_eq!(status, 200);
    assert_eq!(body["source"], "cache");
    assert_eq!(body["range"], "1mo");
    assert_eq!(body["interval"], "1wk");
    assert_eq!(body["stats"], json!({}));
    assert_eq!(body["data"].as_array().unwrap().len(), 3);
    assert_eq!(body["data"][0]["date"], "2024-03-01");
}

#[tokio::test]
async fn prices_fall_back_to_bundled_sample() {
    let dir = tempfile::tempdir().unwrap();
    let srv = spawn(&bundled_samples(), dir.path(), &[]).await;
    let (status, body) = get(format!("{}/api/prices/tsla", srv.base)).await;
    assert_eq!(status, 200);
    assert_eq!(body["source"], "sample");
    assert_eq!(body["symbol"], "TSLA");
    assert!(!body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn predict_without_enough_closes_is_400() {
    let dir = tempfile::tempdir().unwrap();
    let srv = spawn(dir.path(), dir.path(), &[("META", vec![1.0, 2.0])]).await;
    let (status, body) = get(format!("{}/api/predict/META?lookback=5", srv.base)).await;
    assert_eq!(status, 400);
    assert_eq!(body, json!({"error": "Not enough data"}));
}

#[tokio::test]
async fn predict_rejects_bad_lookback() {
    let dir = tempfile::tempdir().unwrap();
    let srv = spawn(dir.path(), dir.path(), &[]).await;
    for bad in ["0", "abc", "-1"] {
        let (status, body) = get(format!("{}/api/predict/AAPL?lookback={bad}", srv.base)).await;
        assert_eq!(status, 400, "lookback={bad}");
        assert_eq!(body, json!({"error": "Invalid lookback"}));
    }
}

#[tokio::test]
async fn predict_from_cached_closes() {
    let dir = tempfile::tempdir().unwrap();
    let srv = spawn(dir.path(), dir.path(), &[("AMD", vec![10.0, 12.0, 11.0, 13.0, 14.0])]).await;
    let (status, body) = get(format!("{}/api/predict/AMD", srv.base)).await;
    assert_eq!(status, 200);
    assert_eq!(
        body,
        json!({"symbol": "AMD", "lookback": 5, "predictedClose": 12.0, "std": 1.41})
    );
    assert_eq!(srv.store.read_closes("AMD").unwrap().len(), 5);
}

#[tokio::test]
async fn predict_from_bundled_sample() {
    let dir = tempfile::tempdir().unwrap();
    let srv = spawn(&bundled_samples(), dir.path(), &[]).await;
    let (status, body) = get(format!("{}/api/predict/nvda?lookback=10", srv.base)).await;
    assert_eq!(status, 200);
    assert_eq!(body["symbol"], "nvda");
    assert_eq!(body["lookback"], 10);
    assert!(body["predictedClose"].as_f64().unwrap() > 0.0);
    assert!(body["std"].as_f64().unwrap() >= 0.0);
}

#[tokio::test]
async fn non_api_paths_serve_the_client_build() {
    let samples = tempfile::tempdir().unwrap();
    let client = tempfile::tempdir().unwrap();
    std::fs::write(client.path().join("index.html"), "<div id=\"root\"></div>").unwrap();
    std::fs::write(client.path().join("app.js"), "console.log(1)").unwrap();
    let srv = spawn(samples.path(), client.path(), &[]).await;

    let resp = reqwest::get(format!("{}/app.js", srv.base)).await.unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(resp.text().await.unwrap(), "console.log(1)");

    let resp = reqwest::get(format!("{}/charts/AAPL", srv.base)).await.unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(resp.text().await.unwrap(), "<div id=\"root\"></div>");
}

#[tokio::test]
async fn predict_with_unreadable_cache_and_no_sample_is_500() {
    let samples = tempfile::tempdir().unwrap();
    let db_dir = tempfile::tempdir().unwrap();
    let db = db_dir.path().join("stocks.sqlite");
    let store = Store::open(&db).unwrap();
    store.init().unwrap();
    rusqlite::Connection::open(&db)
        .unwrap()
        .execute_batch("DROP TABLE prices;")
        .unwrap();

    let srv = spawn_with_store(Arc::new(store), samples.path(), samples.path()).await;
    let (status, body) = get(format!("{}/api/predict/AAPL", srv.base)).await;
    assert_eq!(status, 500);
    assert_eq!(body, json!({"error": "Prediction failed"}));
}
