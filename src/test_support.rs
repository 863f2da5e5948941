use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static TEST_FILE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Runs a blocking reqwest call off the async test runtime.
pub async fn run_blocking<T, F>(op: F) -> T
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(op)
        .await
        .expect("blocking task should not panic")
}

pub fn test_db_path(name: &str) -> PathBuf {
    let dir = Path::new("./target/testdb");
    std::fs::create_dir_all(dir).expect("test file dir should be creatable");

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    let counter = TEST_FILE_COUNTER.fetch_add(1, Ordering::Relaxed);
    dir.join(format!("{now}-{counter}-{name}"))
}

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}
