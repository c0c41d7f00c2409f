/// Shot change detection and correction workflow
///
/// Detects shot boundaries in a video through a remote annotation service,
/// lets a human correct them through an editable overlay document, and
/// exports per-bucket statistics of the final cut list.
pub mod app;
pub mod config;
pub mod detect;
pub mod export;
pub mod overlay;
pub mod preview;
pub mod reconcile;
pub mod shots;
pub mod store;
pub mod timecode;

// Re-export main types for easy access
pub use crate::app::App;
pub use crate::config::Config;
pub use crate::detect::{ShotAnnotator, ShotSpan, VideoIntelligenceClient, CREDENTIAL_ENV};
pub use crate::export::{bucket_counts, BucketRow, DEFAULT_BUCKETS};
pub use crate::reconcile::{reconcile, Directive, ReconcileError, Reconciled};
pub use crate::shots::{Provenance, Shot, ShotList};
pub use crate::store::DataStore;
