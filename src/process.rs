//! Batch card generation.
//!
//! Takes the resolved manifest items and renders each one in manifest order,
//! strictly one image at a time. Every per-item error is caught at the item
//! boundary and recorded; one bad image never stops the batch.
//!
//! ## Per-item flow
//!
//! ```text
//! source exists? ──no──→ SourceNotFound
//!      │
//! identify → plan (crop / fill) ──degenerate──→ InvalidGeometry
//!      │
//! decode → flatten → crop/resize → encode PNG ──fail──→ Codec
//!      │
//!   processed += 1
//! ```
//!
//! Progress is reported as [`ProcessEvent`]s over an optional channel so the
//! CLI can print while the library stays free of stdout writes.

use crate::imaging::{
    CardConfig, CardError, CardPlan, ImageBackend, ImageSize, RustBackend, create_card,
};
use crate::manifest::BatchItem;
use serde::Serialize;
use std::sync::mpsc::Sender;

/// One failed item in a [`BatchReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    /// Source identifier as written in the manifest.
    pub item: String,
    /// Error kind: `source_not_found`, `invalid_geometry` or `codec`.
    pub kind: &'static str,
    pub reason: String,
}

impl Failure {
    fn new(item: &BatchItem, err: &CardError) -> Self {
        Self {
            item: item.id.clone(),
            kind: err.kind(),
            reason: err.to_string(),
        }
    }
}

/// Outcome of a whole batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub processed: usize,
    pub total: usize,
    pub failures: Vec<Failure>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Progress notifications emitted while a batch runs.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessEvent {
    BatchStarted { total: usize },
    CardRendered {
        /// 1-based position in the manifest.
        index: usize,
        item: String,
        output: String,
        target: String,
        source_size: ImageSize,
        plan: CardPlan,
    },
    CardFailed {
        index: usize,
        item: String,
        reason: String,
    },
}

/// Render every item with the production backend.
pub fn process(
    items: &[BatchItem],
    config: &CardConfig,
    events: Option<Sender<ProcessEvent>>,
) -> BatchReport {
    process_with_backend(&RustBackend::new(), items, config, events)
}

/// Render every item using a specific backend (allows testing with mock).
pub fn process_with_backend(
    backend: &impl ImageBackend,
    items: &[BatchItem],
    config: &CardConfig,
    events: Option<Sender<ProcessEvent>>,
) -> BatchReport {
    // A dropped receiver only silences progress output
    let emit = |event: ProcessEvent| {
        if let Some(tx) = &events {
            tx.send(event).ok();
        }
    };

    let mut report = BatchReport {
        total: items.len(),
        ..BatchReport::default()
    };
    emit(ProcessEvent::BatchStarted { total: items.len() });

    for (i, item) in items.iter().enumerate() {
        let index = i + 1;
        match create_card(backend, &item.source, &item.output, &item.target, config) {
            Ok(rendered) => {
                report.processed += 1;
                emit(ProcessEvent::CardRendered {
                    index,
                    item: item.id.clone(),
                    output: item.output.display().to_string(),
                    target: item.target_name.clone(),
                    source_size: rendered.source_size,
                    plan: rendered.plan,
                });
            }
            Err(err) => {
                tracing::warn!(item = %item.id, kind = err.kind(), error = %err, "card failed");
                let failure = Failure::new(item, &err);
                emit(ProcessEvent::CardFailed {
                    index,
                    item: failure.item.clone(),
                    reason: failure.reason.clone(),
                });
                report.failures.push(failure);
            }
        }
    }

    tracing::info!(
        processed = report.processed,
        total = report.total,
        failed = report.failures.len(),
        "batch finished"
    );
    report
}
