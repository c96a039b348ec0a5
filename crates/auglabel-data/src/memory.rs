//! In-memory datasets and views.

use auglabel_core::prelude::*;

/// A dataset backed by a vector of `(image, label)` pairs.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDataset {
    samples: Vec<(Image, usize)>,
    num_classes: Option<usize>,
}

impl InMemoryDataset {
    pub fn new(samples: Vec<(Image, usize)>) -> Self {
        Self {
            samples,
            num_classes: None,
        }
    }

    /// Declare the number of semantic classes.
    pub fn with_num_classes(mut self, num_classes: usize) -> Self {
        self.num_classes = Some(num_classes);
        self
    }

    pub fn push(&mut self, image: Image, label: usize) {
        self.samples.push((image, label));
    }
}

impl FromIterator<(Image, usize)> for InMemoryDataset {
    fn from_iter<I: IntoIterator<Item = (Image, usize)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl BaseDataset for InMemoryDataset {
    fn len(&self) -> usize {
        self.samples.len()
    }

    fn get(&self, index: usize) -> Result<(Image, usize)> {
        self.samples
            .get(index)
            .cloned()
            .ok_or_else(|| AugError::index_out_of_range(index, self.samples.len()))
    }

    fn num_classes(&self) -> Option<usize> {
        self.num_classes
    }

    fn name(&self) -> &str {
        "in-memory"
    }
}

/// The first `len` samples of another dataset.
#[derive(Debug, Clone)]
pub struct Subset<D> {
    inner: D,
    len: usize,
}

impl<D: BaseDataset> Subset<D> {
    /// View over `inner[0..n]`; `n` larger than the dataset keeps everything.
    pub fn first(inner: D, n: usize) -> Self {
        let len = n.min(inner.len());
        Self { inner, len }
    }

    pub fn into_inner(self) -> D {
        self.inner
    }
}

impl<D: BaseDataset> BaseDataset for Subset<D> {
    fn len(&self) -> usize {
        self.len
    }

    fn get(&self, index: usize) -> Result<(Image, usize)> {
        if index >= self.len {
            return Err(AugError::index_out_of_range(index, self.len));
        }
        self.inner.get(index)
    }

    fn num_classes(&self) -> Option<usize> {
        self.inner.num_classes()
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(n: usize) -> InMemoryDataset {
        (0..n)
            .map(|i| (Image::filled(2, 2, [i as u8; 3]), i % 3))
            .collect::<InMemoryDataset>()
            .with_num_classes(3)
    }

    #[test]
    fn test_in_memory_get() {
        let ds = dataset(4);
        assert_eq!(ds.len(), 4);
        let (img, label) = ds.get(2).unwrap();
        assert_eq!(img.get(0, 0), [2, 2, 2]);
        assert_eq!(label, 2);
        assert!(ds.get(4).unwrap_err().is_consistency());
    }

    #[test]
    fn test_subset_bounds() {
        let sub = Subset::first(dataset(10), 3);
        assert_eq!(sub.len(), 3);
        assert_eq!(sub.num_classes(), Some(3));
        assert!(sub.get(2).is_ok());
        assert!(sub.get(3).is_err());

        let all = Subset::first(dataset(2), 100);
        assert_eq!(all.len(), 2);
    }
}
