use anyhow::Result;
use assert_fs::prelude::*;
use predicates::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use reqwest::Url;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use docseed::commands::{self, FailurePolicy};
use docseed::debugger::script::{self, Scenario, ScenarioConfig, DEBUG_KEY_PREFIX};
use docseed::debugger::{DebugClient, DebugCommand, DebugEndpoint};
use docseed::records::CreditScore;
use docseed::store::{DocumentStore, LocalStore, RestStore, StoreConfig, StoreError, UpsertOptions};

/// A request as seen by the stub server
#[derive(Debug, Clone)]
struct Recorded {
    path: String,
    query: HashMap<String, String>,
    body: String,
}

/// Minimal HTTP/1.1 responder: records each request and answers with the
/// next queued status (200 once the queue is empty).
struct StubServer {
    port: u16,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl StubServer {
    async fn start(statuses: Vec<u16>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let statuses = Arc::new(Mutex::new(VecDeque::from(statuses)));

        let recorded = requests.clone();
        tokio::spawn(async move {
            loop {
                let (stream, _) = match listener.accept().await {
                    Ok(conn) => conn,
                    Err(_) => break,
                };
                let status = statuses.lock().unwrap().pop_front().unwrap_or(200);
                let recorded = recorded.clone();
                tokio::spawn(handle(stream, status, recorded));
            }
        });

        Self { port, requests }
    }

    fn url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{}", self.port, path)
    }

    fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}

async fn handle(mut stream: TcpStream, status: u16, recorded: Arc<Mutex<Vec<Recorded>>>) -> Option<()> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let content_length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body = String::from_utf8_lossy(&buf[header_end..]).to_string();

    let target = head.lines().next()?.split_whitespace().nth(1)?.to_string();
    let url = Url::parse(&format!("http://stub{}", target)).ok()?;
    let query = url.query_pairs().into_owned().collect();

    // record before replying so the client never observes a reply first
    recorded.lock().unwrap().push(Recorded {
        path: url.path().to_string(),
        query,
        body,
    });

    let reply = format!("{{\"status\":{}}}", status);
    let response = format!(
        "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reply.len(),
        reply
    );
    stream.write_all(response.as_bytes()).await.ok()?;
    stream.shutdown().await.ok();
    Some(())
}

fn form_fields(body: &str) -> HashMap<String, String> {
    Url::parse(&format!("http://stub/?{}", body))
        .unwrap()
        .query_pairs()
        .into_owned()
        .collect()
}

fn fast_config(base_seq: u64) -> ScenarioConfig {
    ScenarioConfig {
        interval: Duration::ZERO,
        short_pause: Duration::ZERO,
        base_seq,
    }
}

#[tokio::test]
async fn test_query_command_matches_body_command() -> Result<()> {
    let server = StubServer::start(vec![]).await;
    let endpoint = DebugEndpoint::new(&server.url("/v8debug/"), "credit_score")?;
    let client = DebugClient::new(endpoint);

    let report = script::run(&client, None, Scenario::Probe, &fast_config(500), StdRng::seed_from_u64(1)).await?;
    assert_eq!(report.fired, DebugCommand::all().len());

    let requests = server.requests();
    assert_eq!(requests.len(), DebugCommand::all().len());
    let mut seqs = HashSet::new();
    for req in &requests {
        let body: serde_json::Value = serde_json::from_str(&req.body)?;
        assert_eq!(req.path, "/v8debug/");
        assert_eq!(req.query["appname"], "credit_score");
        assert_eq!(body["command"], req.query["command"].as_str());
        assert_eq!(body["type"], "request");
        seqs.insert(body["seq"].as_u64().unwrap());
    }
    assert_eq!(seqs, (500..509).collect::<HashSet<u64>>());

    Ok(())
}

#[tokio::test]
async fn test_reply_body_is_returned_verbatim() -> Result<()> {
    let server = StubServer::start(vec![500]).await;
    let client = DebugClient::new(DebugEndpoint::new(&server.url("/v8debug/"), "app")?);

    // error statuses are still just printed
    let response = client.fire(&DebugCommand::ListBreakpoints, 9).await?;
    assert_eq!(response.status, 500);
    assert_eq!(response.body, "{\"status\":500}");

    Ok(())
}

#[tokio::test]
async fn test_unreachable_debug_bridge_is_an_error() -> Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let port = listener.local_addr()?.port();
    drop(listener);

    let endpoint = DebugEndpoint::new(&format!("http://127.0.0.1:{}/v8debug/", port), "app")?;
    let client = DebugClient::new(endpoint);
    let result = script::run(&client, None, Scenario::Probe, &fast_config(1), StdRng::seed_from_u64(1)).await;
    assert!(result.is_err());

    Ok(())
}

#[tokio::test]
async fn test_breakpoint_cycle_seeds_documents() -> Result<()> {
    let server = StubServer::start(vec![]).await;
    let client = DebugClient::new(DebugEndpoint::new(&server.url("/v8debug/"), "credit_score")?);
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("docs.db");

    let report = {
        let store: Arc<dyn DocumentStore> = Arc::new(LocalStore::open(&db_path, "default")?);
        script::run(
            &client,
            Some(store),
            Scenario::BreakpointCycle,
            &fast_config(200),
            StdRng::seed_from_u64(2),
        )
        .await?
    };

    assert_eq!(report.fired, 9);
    assert_eq!(report.seeding.written, 9);

    let store = LocalStore::open_readonly(&db_path, "default")?;
    let keys = store.keys()?;
    assert_eq!(keys.len(), 9);
    for key in keys {
        assert!(key.starts_with(DEBUG_KEY_PREFIX));
        let doc = store.get(&key)?.unwrap();
        let record: CreditScore = serde_json::from_value(doc.value)?;
        assert!(record.doc_type.is_none());
        assert!((600..=800).contains(&record.credit_score));
    }

    let fired: Vec<String> = server
        .requests()
        .iter()
        .map(|r| r.query["command"].clone())
        .collect();
    assert_eq!(fired.iter().filter(|c| *c == "continue").count(), 5);

    Ok(())
}

#[tokio::test]
async fn test_rest_store_form_layout() -> Result<()> {
    let server = StubServer::start(vec![]).await;
    let mut config = StoreConfig::new("127.0.0.1", "travel");
    config.port = server.port;
    let store = RestStore::new(config)?;

    store
        .upsert("user_1", &serde_json::json!({"user_id": "user_1"}), UpsertOptions::json().with_ttl(0))
        .await?;

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].path, "/pools/default/buckets/travel/docs/user_1");

    let form = form_fields(&requests[0].body);
    assert_eq!(form["value"], "{\"user_id\":\"user_1\"}");
    assert_eq!(form["flags"], "33554438");
    assert_eq!(form["expiry"], "0");

    Ok(())
}

#[tokio::test]
async fn test_rest_failures_do_not_halt_seeding() -> Result<()> {
    let server = StubServer::start(vec![503, 200, 401]).await;
    let mut config = StoreConfig::new("127.0.0.1", "default");
    config.port = server.port;
    let store = RestStore::new(config)?;

    let report = commands::populate::populate(&store, 5, "doc_", FailurePolicy::Continue).await?;

    assert_eq!(report.attempted, 5);
    assert_eq!(report.written, 3);
    assert_eq!(report.transient_failures(), 1);
    assert_eq!(report.fatal_failures(), 1);
    assert_eq!(server.requests().len(), 5);

    Ok(())
}

#[tokio::test]
async fn test_unreachable_store_is_transient() -> Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let port = listener.local_addr()?.port();
    drop(listener);

    let mut config = StoreConfig::new("127.0.0.1", "default");
    config.port = port;
    let store = RestStore::new(config)?;

    let err = store
        .upsert("k", &serde_json::json!({}), UpsertOptions::json())
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Unavailable(_)));
    assert!(err.is_transient());

    Ok(())
}

#[tokio::test]
async fn test_generators_write_unique_keys() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let store = LocalStore::open(temp_dir.path().join("docs.db"), "default")?;
    let mut rng = StdRng::seed_from_u64(42);

    let report =
        commands::payment_blobs::payment_blobs(&store, &mut rng, 500, "pay", FailurePolicy::Continue).await?;
    assert_eq!(report.written, 500);
    assert_eq!(store.count()?, 500);

    let report =
        commands::credit_scores::credit_scores(&store, &mut rng, 200, "cs_", FailurePolicy::Continue).await?;
    assert_eq!(report.written, 200);

    let report = commands::travel_itineraries::travel_itineraries(
        &store,
        &mut rng,
        100,
        "trv",
        FailurePolicy::Continue,
    )
    .await?;
    assert_eq!(report.written, 100);
    assert_eq!(store.count()?, 800);

    Ok(())
}

#[test]
fn test_time_series_appends_per_invocation() {
    let temp = assert_fs::TempDir::new().unwrap();
    let out = temp.child("events.in");
    out.write_str("{\"id\":\"EXISTING00\",\"type\":\"SET\",\"ts\":1}\n").unwrap();
    let mut rng = StdRng::seed_from_u64(3);

    commands::time_series::time_series(out.path(), 25, &mut rng).unwrap();

    out.assert(predicate::path::exists());
    out.assert(predicate::str::starts_with("{\"id\":\"EXISTING00\""));
    let content = std::fs::read_to_string(out.path()).unwrap();
    assert_eq!(content.lines().count(), 26);
    assert!(content.ends_with('\n'));

    temp.close().unwrap();
}
