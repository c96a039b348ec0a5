//! Class catalog: every transform combination up to a size bound.
//!
//! The index of a combination in the catalog is its synthetic class label.
//! Enumeration order is fixed: all size-0 subsets, then all size-1 subsets in
//! input order, then all size-2 subsets in lexicographic position order, and
//! so on.

use std::fmt;
use std::str::FromStr;

use auglabel_core::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::combination::Combination;
use crate::unit::TransformUnit;

/// Upper bound on combination size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawComboLimit", into = "RawComboLimit")]
pub enum ComboLimit {
    /// Every size up to the full flexible set.
    All,
    /// Sizes `0..=n`.
    AtMost(usize),
}

impl ComboLimit {
    /// Interpret the integer form: `-1` means all, other negatives are invalid.
    pub fn from_signed(value: i64) -> Result<Self> {
        match value {
            -1 => Ok(ComboLimit::All),
            v if v >= 0 => Ok(ComboLimit::AtMost(v as usize)),
            v => Err(AugError::invalid_config(
                "max_combo_size",
                v.to_string(),
                "must be -1 (all) or a non-negative integer",
            )),
        }
    }

    /// Largest subset size actually enumerated for a set of `n` units.
    pub fn resolve(&self, n: usize) -> usize {
        match *self {
            ComboLimit::All => n,
            ComboLimit::AtMost(m) => m.min(n),
        }
    }
}

impl Default for ComboLimit {
    fn default() -> Self {
        ComboLimit::All
    }
}

impl fmt::Display for ComboLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComboLimit::All => f.write_str("all"),
            ComboLimit::AtMost(m) => write!(f, "{}", m),
        }
    }
}

impl FromStr for ComboLimit {
    type Err = AugError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(ComboLimit::All);
        }
        let value: i64 = s.parse().map_err(|_| {
            AugError::invalid_config("max_combo_size", s, "expected \"all\" or an integer")
        })?;
        ComboLimit::from_signed(value)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawComboLimit {
    Int(i64),
    Text(String),
}

impl TryFrom<RawComboLimit> for ComboLimit {
    type Error = AugError;

    fn try_from(raw: RawComboLimit) -> Result<Self> {
        match raw {
            RawComboLimit::Int(v) => ComboLimit::from_signed(v),
            RawComboLimit::Text(s) => s.parse(),
        }
    }
}

impl From<ComboLimit> for RawComboLimit {
    fn from(limit: ComboLimit) -> Self {
        match limit {
            ComboLimit::All => RawComboLimit::Text("all".to_string()),
            ComboLimit::AtMost(m) => RawComboLimit::Int(m as i64),
        }
    }
}

/// `k`-element index subsets of `0..n`, in lexicographic order.
#[derive(Debug, Clone)]
pub struct Combinations {
    n: usize,
    indices: Vec<usize>,
    done: bool,
}

impl Combinations {
    pub fn new(n: usize, k: usize) -> Self {
        Self {
            n,
            indices: (0..k).collect(),
            done: k > n,
        }
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let current = self.indices.clone();

        // Advance: rightmost index that can still move right
        let k = self.indices.len();
        let mut i = k;
        loop {
            if i == 0 {
                self.done = true;
                break;
            }
            i -= 1;
            if self.indices[i] < self.n - k + i {
                self.indices[i] += 1;
                for j in i + 1..k {
                    self.indices[j] = self.indices[j - 1] + 1;
                }
                break;
            }
        }

        Some(current)
    }
}

/// Binomial coefficient C(n, k); zero when `k > n`.
pub fn binomial(n: usize, k: usize) -> usize {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    (0..k).fold(1usize, |acc, i| acc * (n - i) / (i + 1))
}

/// Σ C(n, i) for i in 0..=limit.
pub fn catalog_size(n: usize, limit: ComboLimit) -> usize {
    (0..=limit.resolve(n)).map(|i| binomial(n, i)).sum()
}

/// The ordered, immutable list of synthetic classes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassCatalog {
    combinations: Vec<Combination>,
}

impl ClassCatalog {
    /// Enumerate every combination of `units` up to `limit`.
    pub fn enumerate(
        units: &[TransformUnit],
        limit: ComboLimit,
        normalization: Normalization,
    ) -> Self {
        let n = units.len();
        if let ComboLimit::AtMost(m) = limit {
            if m > n {
                warn!(
                    requested = m,
                    available = n,
                    "max_combo_size exceeds the flexible set; clamping"
                );
            }
        }
        let max = limit.resolve(n);

        let mut combinations = Vec::with_capacity(catalog_size(n, limit));
        for size in 0..=max {
            for idx in Combinations::new(n, size) {
                let picked = idx.into_iter().map(|i| units[i]).collect();
                combinations.push(Combination::new(picked, normalization));
            }
        }

        debug!(
            units = n,
            max_size = max,
            classes = combinations.len(),
            "enumerated class catalog"
        );
        Self { combinations }
    }

    /// Integer form of [`enumerate`](Self::enumerate): `-1` means all sizes.
    pub fn enumerate_signed(
        units: &[TransformUnit],
        max_combo_size: i64,
        normalization: Normalization,
    ) -> Result<Self> {
        let limit = ComboLimit::from_signed(max_combo_size)?;
        Ok(Self::enumerate(units, limit, normalization))
    }

    /// Single identity entry: the plain, normalization-only mode.
    pub fn plain(normalization: Normalization) -> Self {
        Self {
            combinations: vec![Combination::identity(normalization)],
        }
    }

    /// Catalog from explicit entries, in the given order.
    pub fn from_combinations(combinations: Vec<Combination>) -> Self {
        Self { combinations }
    }

    pub fn len(&self) -> usize {
        self.combinations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.combinations.is_empty()
    }

    /// The combination for synthetic label `index`.
    pub fn get(&self, index: usize) -> Option<&Combination> {
        self.combinations.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Combination> {
        self.combinations.iter()
    }

    /// Draw a label uniformly from `0..len()`; `None` for an empty catalog.
    pub fn sample_label<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<usize> {
        if self.combinations.is_empty() {
            None
        } else {
            Some(rng.gen_range(0..self.combinations.len()))
        }
    }

    /// `describe()` of every entry, indexed by label.
    pub fn descriptions(&self) -> Vec<String> {
        self.combinations.iter().map(|c| c.describe()).collect()
    }
}

impl<'a> IntoIterator for &'a ClassCatalog {
    type Item = &'a Combination;
    type IntoIter = std::slice::Iter<'a, Combination>;

    fn into_iter(self) -> Self::IntoIter {
        self.combinations.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combinations_order() {
        let all: Vec<_> = Combinations::new(4, 2).collect();
        assert_eq!(
            all,
            vec![
                vec![0, 1],
                vec![0, 2],
                vec![0, 3],
                vec![1, 2],
                vec![1, 3],
                vec![2, 3]
            ]
        );
    }

    #[test]
    fn test_combinations_edges() {
        assert_eq!(Combinations::new(3, 0).collect::<Vec<_>>(), vec![Vec::<usize>::new()]);
        assert_eq!(Combinations::new(0, 0).count(), 1);
        assert_eq!(Combinations::new(2, 3).count(), 0);
        assert_eq!(Combinations::new(3, 3).collect::<Vec<_>>(), vec![vec![0, 1, 2]]);
    }

    #[test]
    fn test_binomial() {
        assert_eq!(binomial(5, 2), 10);
        assert_eq!(binomial(9, 4), 126);
        assert_eq!(binomial(3, 5), 0);
        assert_eq!(binomial(0, 0), 1);
    }

    #[test]
    fn test_limit_parsing() {
        assert_eq!("all".parse::<ComboLimit>().unwrap(), ComboLimit::All);
        assert_eq!("-1".parse::<ComboLimit>().unwrap(), ComboLimit::All);
        assert_eq!("2".parse::<ComboLimit>().unwrap(), ComboLimit::AtMost(2));
        assert!("-2".parse::<ComboLimit>().unwrap_err().is_config());
        assert!("many".parse::<ComboLimit>().unwrap_err().is_config());
    }

    #[test]
    fn test_limit_serde_accepts_int_and_text() {
        let a: ComboLimit = serde_json::from_str("\"all\"").unwrap();
        let b: ComboLimit = serde_json::from_str("-1").unwrap();
        let c: ComboLimit = serde_json::from_str("3").unwrap();
        assert_eq!(a, ComboLimit::All);
        assert_eq!(b, ComboLimit::All);
        assert_eq!(c, ComboLimit::AtMost(3));
        assert!(serde_json::from_str::<ComboLimit>("-5").is_err());
        assert_eq!(serde_json::to_string(&ComboLimit::AtMost(2)).unwrap(), "2");
    }

    #[test]
    fn test_empty_flexible_set_gives_identity_only() {
        let catalog = ClassCatalog::enumerate(&[], ComboLimit::All, Normalization::cifar100());
        assert_eq!(catalog.len(), 1);
        assert!(catalog.get(0).unwrap().is_identity());
    }

    #[test]
    fn test_limit_above_set_size_is_clamped() {
        let units = [TransformUnit::HorizontalFlip, TransformUnit::Grayscale];
        let clamped =
            ClassCatalog::enumerate(&units, ComboLimit::AtMost(7), Normalization::cifar100());
        let full = ClassCatalog::enumerate(&units, ComboLimit::All, Normalization::cifar100());
        assert_eq!(clamped, full);
    }

    #[test]
    fn test_enumerate_signed_rejects_negative() {
        let err = ClassCatalog::enumerate_signed(&[], -3, Normalization::cifar100()).unwrap_err();
        assert!(err.is_config());
    }
}
