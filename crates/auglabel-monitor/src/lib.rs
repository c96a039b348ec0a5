//! # auglabel monitor
//!
//! Measures representation quality while a transformation-labeled model
//! trains.
//!
//! - [`KnnMonitor`]: embeds a labeled memory set and scores a query set by
//!   majority vote over the `k` nearest memory rows
//! - [`evaluate_classifier`]: synthetic-class and online-head accuracy
//! - [`MonitorSchedule`]: which epochs run the monitor
//! - [`FlattenExtractor`]: pixel-space features, no model required
//!
//! ## Usage
//!
//! ```rust
//! use auglabel_monitor::{knn_predict, FeatureBank};
//! use ndarray::array;
//!
//! let bank = FeatureBank::new(
//!     array![[0.0f32, 0.0], [0.1, 0.0], [5.0, 5.0], [5.1, 5.0]],
//!     vec![0, 0, 1, 1],
//! )
//! .unwrap();
//! let predicted = knn_predict(&bank, array![[0.2f32, 0.1]].view(), 3).unwrap();
//! assert_eq!(predicted, vec![0]);
//! ```

mod bank;
pub mod distance;
mod eval;
mod extractor;
mod knn;
mod schedule;

pub use bank::FeatureBank;
pub use distance::{pairwise_distances, squared_distances};
pub use eval::{argmax, cross_entropy, evaluate_classifier, EvalReport};
pub use extractor::FlattenExtractor;
pub use knn::{knn_monitor, knn_predict, majority_vote, top_k_smallest, KnnMonitor, KnnReport};
pub use schedule::MonitorSchedule;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{evaluate_classifier, knn_monitor, EvalReport, FeatureBank};
    pub use crate::{FlattenExtractor, KnnMonitor, KnnReport, MonitorSchedule};
}
