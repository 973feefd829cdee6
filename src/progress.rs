//! Progress-callback trait for per-record generation events.
//!
//! Inject an [`Arc<dyn GenerationProgressCallback>`] via
//! [`crate::config::GenerationConfigBuilder::progress_callback`] to receive
//! events as each card is laid out and rendered. The CLI uses it to drive a
//! terminal progress bar showing the current recipient.
//!
//! # Example
//!
//! ```rust
//! use hagaki::{GenerationConfig, GenerationProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     completed: AtomicUsize,
//! }
//!
//! impl GenerationProgressCallback for CountingCallback {
//!     fn on_record_complete(&self, page_num: usize, total: usize, recipient: &str) {
//!         self.completed.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{recipient} ({page_num}/{total})");
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback {
//!     completed: AtomicUsize::new(0),
//! });
//!
//! let config = GenerationConfig::builder()
//!     .progress_callback(counter as Arc<dyn GenerationProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the generation pipeline as it processes each record.
///
/// Records are rendered concurrently, so `on_record_*` may be called from
/// several threads at once and out of page order. All methods default to
/// no-ops.
pub trait GenerationProgressCallback: Send + Sync {
    /// Called once before any record is rendered.
    fn on_batch_start(&self, total_records: usize) {
        let _ = total_records;
    }

    /// Called before a record is laid out.
    ///
    /// # Arguments
    /// * `page_num` : 1-indexed page number (= input position + 1)
    /// * `total`    : records in the batch
    /// * `recipient`: the raw primary name, for display
    fn on_record_start(&self, page_num: usize, total: usize, recipient: &str) {
        let _ = (page_num, total, recipient);
    }

    /// Called when a record's page has been rendered and encoded.
    fn on_record_complete(&self, page_num: usize, total: usize, recipient: &str) {
        let _ = (page_num, total, recipient);
    }

    /// Called for each non-fatal problem found in a record.
    fn on_record_warning(&self, page_num: usize, warning: &str) {
        let _ = (page_num, warning);
    }

    /// Called once after every record has been rendered.
    fn on_batch_complete(&self, total_records: usize, warning_count: usize) {
        let _ = (total_records, warning_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl GenerationProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::GenerationConfig`].
pub type ProgressCallback = Arc<dyn GenerationProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct TrackingCallback {
        starts: AtomicUsize,
        completes: AtomicUsize,
        warnings: AtomicUsize,
        total: AtomicUsize,
        names: Mutex<Vec<String>>,
    }

    impl GenerationProgressCallback for TrackingCallback {
        fn on_batch_start(&self, total_records: usize) {
            self.total.store(total_records, Ordering::SeqCst);
        }

        fn on_record_start(&self, _page_num: usize, _total: usize, _recipient: &str) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_record_complete(&self, _page_num: usize, _total: usize, recipient: &str) {
            self.completes.fetch_add(1, Ordering::SeqCst);
            self.names.lock().unwrap().push(recipient.to_string());
        }

        fn on_record_warning(&self, _page_num: usize, _warning: &str) {
            self.warnings.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_batch_start(2);
        cb.on_record_start(1, 2, "山田 太郎");
        cb.on_record_complete(1, 2, "山田 太郎");
        cb.on_record_warning(2, "zip omitted");
        cb.on_batch_complete(2, 1);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();

        tracker.on_batch_start(2);
        tracker.on_record_start(1, 2, "山田 太郎");
        tracker.on_record_complete(1, 2, "山田 太郎");
        tracker.on_record_start(2, 2, "佐藤 花子");
        tracker.on_record_warning(2, "postal code is not 7 digits");
        tracker.on_record_complete(2, 2, "佐藤 花子");

        assert_eq!(tracker.total.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.starts.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.completes.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.warnings.load(Ordering::SeqCst), 1);
        assert_eq!(
            *tracker.names.lock().unwrap(),
            vec!["山田 太郎".to_string(), "佐藤 花子".to_string()]
        );
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_batch_start(10);
        cb.on_record_start(1, 10, "");
    }
}
