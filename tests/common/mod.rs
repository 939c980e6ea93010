use std::time::Duration;

use kv_observer::ChangeKind;
use kv_observer::ChangeRecord;
use kv_observer::Listener;
use tokio::sync::mpsc;
use tokio::time::timeout;

pub type Record = ChangeRecord<String, u64>;
pub type Batches = mpsc::UnboundedReceiver<Vec<Record>>;

pub const WAIT_FOR_BATCH: Duration = Duration::from_millis(500);
pub const WAIT_FOR_SILENCE: Duration = Duration::from_millis(50);

pub fn key(name: &str) -> String {
    name.to_string()
}

pub fn recording_listener() -> (Listener<String, u64>, Batches) {
    let (tx, rx) = mpsc::unbounded_channel();
    let listener = Listener::new(move |changes: &[Record]| {
        let _ = tx.send(changes.to_vec());
    });
    (listener, rx)
}

pub async fn recv_batch(rx: &mut Batches) -> Vec<Record> {
    timeout(WAIT_FOR_BATCH, rx.recv())
        .await
        .expect("Timeout waiting for batch")
        .expect("Channel closed")
}

pub async fn expect_silence(rx: &mut Batches) {
    if let Ok(Some(batch)) = timeout(WAIT_FOR_SILENCE, rx.recv()).await {
        panic!("unexpected batch: {:?}", batch);
    }
}

/// `(name, kind, old_value)` triples, ignoring the container id
pub fn summary(batch: &[Record]) -> Vec<(String, ChangeKind, Option<u64>)> {
    batch
        .iter()
        .map(|record| (record.name.clone(), record.kind, record.old_value))
        .collect()
}
