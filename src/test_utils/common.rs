use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;

use crate::ChangeKind;
use crate::ChangeRecord;
use crate::ContainerId;
use crate::Listener;

pub type TestRecord = ChangeRecord<&'static str, i32>;
pub type TestListener = Listener<&'static str, i32>;

/// How long a test waits for a batch that is expected to arrive
pub const BATCH_WAIT: Duration = Duration::from_millis(500);

/// How long a test waits to be confident that no batch arrives
pub const QUIET_WAIT: Duration = Duration::from_millis(50);

/// Listener that forwards every batch it receives into a channel
pub fn channel_listener() -> (TestListener, mpsc::UnboundedReceiver<Vec<TestRecord>>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let listener = Listener::new(move |changes: &[TestRecord]| {
        let _ = tx.send(changes.to_vec());
    });
    (listener, rx)
}

/// Waits for the next batch, panicking if none arrives in time
pub async fn next_batch(rx: &mut mpsc::UnboundedReceiver<Vec<TestRecord>>) -> Vec<TestRecord> {
    timeout(BATCH_WAIT, rx.recv())
        .await
        .expect("Timeout waiting for batch")
        .expect("Channel closed")
}

/// Asserts that no batch arrives within [`QUIET_WAIT`]
pub async fn assert_no_batch(rx: &mut mpsc::UnboundedReceiver<Vec<TestRecord>>) {
    if let Ok(Some(batch)) = timeout(QUIET_WAIT, rx.recv()).await {
        panic!("unexpected batch: {:?}", batch);
    }
}

pub fn kinds(batch: &[TestRecord]) -> Vec<ChangeKind> {
    batch.iter().map(|record| record.kind).collect()
}

pub fn record(
    name: &'static str,
    kind: ChangeKind,
    container: ContainerId,
    old_value: Option<i32>,
) -> TestRecord {
    ChangeRecord {
        name,
        kind,
        container,
        old_value,
    }
}
