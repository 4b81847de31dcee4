use crate::db::connection::Database;
use crate::domain::board::{NoticeKind, NoticeRequest};
use crate::domain::market::MarketResolver;
use crate::errors::ServerError;
use crate::mailings::Notifier;
use crate::router::AppContext;
use astra::{Body, Request};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

const SCHEMA_SQL: &str = include_str!("../../sql/schema.sql");

/// Initialize a fresh test DB at a unique temp path using the production schema.
pub fn init_test_db() -> Database {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let path = std::env::temp_dir().join(format!("router_test_{nanos}.sqlite"));
    let db = Database::new(path.to_string_lossy().to_string());

    db.with_conn(|conn| {
        conn.execute_batch(SCHEMA_SQL)
            .map_err(|e| ServerError::DbError(e.to_string()))
    })
    .unwrap_or_else(|e| panic!("Database initialization failed: {e}"));

    db
}

/// A notifier that records every notice it is asked to deliver.
#[derive(Default)]
pub struct RecordingNotifier {
    pub notices: Mutex<Vec<NoticeRequest>>,
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: &NoticeRequest) -> Result<(), ServerError> {
        self.notices.lock().unwrap().push(notice.clone());
        Ok(())
    }
}

impl RecordingNotifier {
    pub fn kinds(&self) -> Vec<NoticeKind> {
        self.notices.lock().unwrap().iter().map(|n| n.kind).collect()
    }
}

/// App context backed by a fresh temp DB and a recording notifier.
pub fn test_ctx() -> (AppContext, Arc<RecordingNotifier>) {
    let recorder = Arc::new(RecordingNotifier::default());
    let ctx = AppContext::new(
        init_test_db(),
        MarketResolver::load("config/markets.json").expect("market table"),
        recorder.clone(),
    );
    (ctx, recorder)
}

/// Build a bodyless request for the router.
pub fn request(method: &str, path_and_query: &str) -> Request {
    http::Request::builder()
        .method(method)
        .uri(path_and_query)
        .body(Body::from(String::new()))
        .expect("request build")
}

/// Notices are delivered on a detached thread; poll until the recorder
/// has seen the expected number of them.
pub fn wait_for_notices(recorder: &RecordingNotifier, expected: usize) {
    for _ in 0..100 {
        if recorder.notices.lock().unwrap().len() >= expected {
            return;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    panic!(
        "Timed out waiting for {expected} notices, saw {}",
        recorder.notices.lock().unwrap().len()
    );
}
