use std::ops::Deref;
use std::sync::{Arc, RwLock};

use super::sample::Sample;
use crate::sync::{read_or_recover, write_or_recover};

/// Point-in-time view of a [`SampleStore`]. Later appends never show up here.
#[derive(Debug, Clone, Default)]
pub struct Snapshot(Arc<Vec<Sample>>);

impl Snapshot {
    pub fn first(&self) -> Option<&Sample> {
        self.0.first()
    }

    pub fn last(&self) -> Option<&Sample> {
        self.0.last()
    }

    pub fn to_vec(&self) -> Vec<Sample> {
        self.0.as_ref().clone()
    }
}

impl Deref for Snapshot {
    type Target = [Sample];

    fn deref(&self) -> &[Sample] {
        self.0.as_slice()
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[derive(Debug, Default)]
struct Inner {
    samples: Arc<Vec<Sample>>,
    sealed: bool,
}

/// Append-only series for one watch session.
///
/// Appends clone the backing vector only while a snapshot of it is still
/// alive, so readers never block the sampler for longer than a pointer swap.
#[derive(Debug, Default)]
pub struct SampleStore {
    inner: RwLock<Inner>,
}

impl SampleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `sample` and returns the new length, or `None` once sealed.
    ///
    /// A timestamp earlier than the previous one is clamped to it, keeping
    /// the series non-decreasing when the wall clock steps backwards.
    pub fn append(&self, mut sample: Sample) -> Option<usize> {
        let mut inner = write_or_recover(&self.inner);
        if inner.sealed {
            return None;
        }
        if let Some(last) = inner.samples.last()
            && sample.timestamp < last.timestamp
        {
            sample.timestamp = last.timestamp;
        }
        let samples = Arc::make_mut(&mut inner.samples);
        samples.push(sample);
        Some(samples.len())
    }

    /// Rejects all further appends. Idempotent.
    pub fn seal(&self) {
        write_or_recover(&self.inner).sealed = true;
    }

    pub fn is_sealed(&self) -> bool {
        read_or_recover(&self.inner).sealed
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot(Arc::clone(&read_or_recover(&self.inner).samples))
    }

    pub fn len(&self) -> usize {
        read_or_recover(&self.inner).samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
