//! End-to-end tests for the HTTP front end against a real SQLite database.

use std::path::PathBuf;
use std::sync::Arc;

use contact_link::config::{Config, DbConfig};
use contact_link::server;
use contact_link::sqlite_store::SqliteStore;
use contact_link::{db, migrate};
use contact_link_core::models::{ContactCounts, LinkPrecedence};
use contact_link_core::resolve::ResolvePolicy;
use contact_link_core::service::IdentityService;
use contact_link_core::store::ContactStore;
use serde_json::Value;
use tempfile::TempDir;
use tokio::net::TcpListener;

fn test_config(tmp: &TempDir, policy: ResolvePolicy) -> Config {
    let mut cfg = Config::minimal();
    cfg.db = DbConfig {
        path: PathBuf::from(tmp.path()).join("contacts.sqlite"),
        max_connections: 5,
    };
    cfg.resolver.policy = policy;
    cfg
}

struct TestServer {
    base: String,
    store: Arc<SqliteStore>,
    handle: tokio::task::JoinHandle<()>,
    _tmp: TempDir,
}

impl TestServer {
    async fn start(policy: ResolvePolicy) -> Self {
        let tmp = TempDir::new().unwrap();
        let cfg = test_config(&tmp, policy);
        migrate::run_migrations(&cfg).await.unwrap();

        let pool = db::connect(&cfg).await.unwrap();
        let store = Arc::new(SqliteStore::new(pool));
        let service = Arc::new(IdentityService::new(store.clone(), policy));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            server::serve(listener, service).await.unwrap();
        });

        Self {
            base,
            store,
            handle,
            _tmp: tmp,
        }
    }

    async fn get(&self, path: &str) -> (u16, String) {
        let resp = reqwest::get(format!("{}{}", self.base, path)).await.unwrap();
        let status = resp.status().as_u16();
        (status, resp.text().await.unwrap())
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[tokio::test]
async fn test_health() {
    let srv = TestServer::start(ResolvePolicy::Atomic).await;
    let (status, body) = srv.get("/health").await;
    assert_eq!(status, 200);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_interaction_scenario() {
    let srv = TestServer::start(ResolvePolicy::Atomic).await;

    let resp = reqwest::get(format!("{}/interaction?email=a@x.com&phone=555", srv.base))
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let content_type = resp.headers()["content-type"].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/html"));
    let body = resp.text().await.unwrap();
    assert!(body.contains("<h1>Contact Information</h1>"));
    assert!(body.contains("<p><strong>Phone Numbers:</strong> [555]</p>"));
    assert!(body.contains("<p><strong>Link Precedence:</strong> primary</p>"));

    let (status, body) = srv.get("/interaction?email=a@x.com&phone=666").await;
    assert_eq!(status, 200);
    assert!(body.contains("<p><strong>Phone Numbers:</strong> [666, 555]</p>"));
    assert!(body.contains("<p><strong>ID:</strong> 2</p>"));
    assert!(body.contains("<p><strong>Linked ID:</strong> 1</p>"));
    assert!(body.contains("<p><strong>Link Precedence:</strong> secondary</p>"));

    let secondary = srv.store.get(2).await.unwrap().unwrap();
    assert_eq!(secondary.link_precedence, LinkPrecedence::Secondary);
    assert_eq!(secondary.linked_id, Some(1));

    // Email-only call appends a phone-less secondary and shows it on top.
    let (status, body) = srv.get("/interaction?email=a@x.com").await;
    assert_eq!(status, 200);
    assert!(body.contains("<p><strong>Phone Numbers:</strong> [666, 555]</p>"));
    assert!(body.contains("<p><strong>ID:</strong> 3</p>"));
    assert!(body.contains("<p><strong>Linked ID:</strong> 1</p>"));
}

#[tokio::test]
async fn test_repeated_interaction_grows_rows() {
    let srv = TestServer::start(ResolvePolicy::Atomic).await;
    for _ in 0..4 {
        let (status, _) = srv.get("/interaction?email=a@x.com&phone=555").await;
        assert_eq!(status, 200);
    }
    assert_eq!(
        srv.store.counts().await.unwrap(),
        ContactCounts {
            total: 4,
            primary: 1,
            secondary: 3
        }
    );

    let (_, body) = srv.get("/interaction?email=a@x.com&phone=555").await;
    assert!(body.contains("[555, 555, 555, 555, 555]"));
}

#[tokio::test]
async fn test_interaction_rejects_missing_params() {
    let srv = TestServer::start(ResolvePolicy::Atomic).await;

    for path in ["/interaction", "/interaction?email=&phone="] {
        let (status, body) = srv.get(path).await;
        assert_eq!(status, 400, "{}", path);
        let json: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["error"]["code"], "bad_request");
    }
    assert_eq!(srv.store.counts().await.unwrap().total, 0);
}

#[tokio::test]
async fn test_see_details() {
    let srv = TestServer::start(ResolvePolicy::Atomic).await;
    srv.get("/interaction?email=a@x.com&phone=555").await;
    srv.get("/interaction?email=a@x.com&phone=666").await;

    let (status, body) = srv.get("/seeDetails?email=a@x.com&phone=555").await;
    assert_eq!(status, 200);
    assert!(body.contains("<h1>Contact Details for Email: a@x.com</h1>"));
    assert!(body.contains("<p><strong>Phone Numbers:</strong> [555]</p>"));
    assert!(body.contains("<p><strong>ID:</strong> 1</p>"));

    let (status, body) = srv.get("/seeDetails?email=a@x.com&phone=777").await;
    assert_eq!(status, 404);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["error"]["code"], "not_found");

    let (status, _) = srv.get("/seeDetails?email=a@x.com").await;
    assert_eq!(status, 400);

    // Read-only: no rows were added.
    assert_eq!(srv.store.counts().await.unwrap().total, 2);
}

#[tokio::test]
async fn test_storage_failure_is_500() {
    let srv = TestServer::start(ResolvePolicy::Atomic).await;
    srv.store.pool().close().await;

    let (status, body) = srv.get("/interaction?email=a@x.com").await;
    assert_eq!(status, 500);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["error"]["code"], "internal");
}

#[tokio::test]
async fn test_concurrent_first_sightings_share_one_primary() {
    let srv = TestServer::start(ResolvePolicy::Atomic).await;

    let mut tasks = Vec::new();
    for i in 0..8 {
        let url = format!("{}/interaction?email=burst@x.com&phone={}", srv.base, i);
        tasks.push(tokio::spawn(async move {
            reqwest::get(url).await.unwrap().status().as_u16()
        }));
    }
    for t in tasks {
        assert_eq!(t.await.unwrap(), 200);
    }

    let counts = srv.store.counts().await.unwrap();
    assert_eq!(counts.total, 8);
    assert_eq!(counts.primary, 1);
}
