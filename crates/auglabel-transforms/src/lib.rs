//! # auglabel transforms
//!
//! Turns a list of transform names into a *class catalog*: every subset of
//! the selected transforms up to a size bound, each followed by the fixed
//! tensor-conversion and normalization step. A combination's position in the
//! catalog is the synthetic label of every sample it produces.
//!
//! ## Usage
//!
//! ```rust
//! use auglabel_core::prelude::*;
//! use auglabel_transforms::{ClassCatalog, ComboLimit, TransformRegistry};
//!
//! let registry = TransformRegistry::new();
//! let units = registry.select(["hflip", "grayscale"]).unwrap();
//! let catalog = ClassCatalog::enumerate(&units, ComboLimit::All, Normalization::cifar100());
//!
//! assert_eq!(
//!     catalog.descriptions(),
//!     vec!["identity", "hflip", "grayscale", "hflip+grayscale"]
//! );
//! ```

mod catalog;
mod combination;
pub mod ops;
mod registry;
mod unit;

pub use catalog::{binomial, catalog_size, ClassCatalog, ComboLimit, Combinations};
pub use combination::Combination;
pub use registry::{TransformKind, TransformRegistry};
pub use unit::TransformUnit;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{ClassCatalog, ComboLimit, Combination};
    pub use crate::{TransformKind, TransformRegistry, TransformUnit};
}
