use image_pipeline::{Load, Persist, Transform};

use anyhow::{bail, Result};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Load capability whose payload is just the identifier itself.
/// Identifiers listed in `fail` are rejected, like unreadable files.
pub struct SelectiveLoad {
    pub fail: HashSet<String>,
}

impl SelectiveLoad {
    pub fn succeeding() -> Self {
        Self {
            fail: HashSet::new(),
        }
    }

    pub fn failing_for(ids: &[&str]) -> Self {
        Self {
            fail: ids.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Load<String, String> for SelectiveLoad {
    fn load(&self, id: &String) -> Result<String> {
        if self.fail.contains(id) {
            bail!("source unreadable: {id}");
        }
        Ok(id.clone())
    }
}

/// Transform that tags its payload, failing for the listed payloads.
pub struct SelectiveTransform {
    pub fail: HashSet<String>,
}

impl SelectiveTransform {
    pub fn succeeding() -> Self {
        Self {
            fail: HashSet::new(),
        }
    }

    pub fn failing_for(payloads: &[&str]) -> Self {
        Self {
            fail: payloads.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Transform<String, String> for SelectiveTransform {
    fn apply(&self, payload: String) -> Result<String> {
        if self.fail.contains(&payload) {
            bail!("transform rejected payload: {payload}");
        }
        Ok(format!("out:{payload}"))
    }
}

/// Transform that counts invocations and optionally slows down, for
/// backpressure and termination tests.
#[derive(Clone)]
pub struct CountingTransform {
    pub counter: Arc<AtomicUsize>,
    pub delay: Duration,
}

impl CountingTransform {
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            counter: Arc::new(AtomicUsize::new(0)),
            delay,
        }
    }
}

impl Transform<String, String> for CountingTransform {
    fn apply(&self, payload: String) -> Result<String> {
        self.counter.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        Ok(payload)
    }
}

/// Sink that records every persisted item in memory.
/// Identifiers listed in `fail` simulate a sink write error.
pub struct MemorySink {
    pub written: Arc<Mutex<Vec<(String, String)>>>,
    pub fail: HashSet<String>,
}

impl MemorySink {
    pub fn new() -> (Self, Arc<Mutex<Vec<(String, String)>>>) {
        let written = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                written: written.clone(),
                fail: HashSet::new(),
            },
            written,
        )
    }

    pub fn failing_for(ids: &[&str]) -> (Self, Arc<Mutex<Vec<(String, String)>>>) {
        let (mut sink, written) = Self::new();
        sink.fail = ids.iter().map(|s| s.to_string()).collect();
        (sink, written)
    }
}

impl Persist<String, String> for MemorySink {
    fn persist(&self, id: &String, payload: String) -> Result<()> {
        if self.fail.contains(id) {
            bail!("sink rejected {id}");
        }
        self.written.lock().unwrap().push((id.clone(), payload));
        Ok(())
    }
}

/// Identifier fixtures `id0..idN`.
pub fn ids(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("id{i}")).collect()
}

/// The set of identifiers a sink recorded.
pub fn written_ids(written: &Arc<Mutex<Vec<(String, String)>>>) -> HashSet<String> {
    written
        .lock()
        .unwrap()
        .iter()
        .map(|(id, _)| id.clone())
        .collect()
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
