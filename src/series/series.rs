use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use super::error::SeriesError;
use crate::oem::StateVector;

/// State vectors sorted by epoch, one entry per epoch.
///
/// The sorted column doubles as the epoch index: lookups are binary searches.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeries {
    vectors: Vec<StateVector>,
}

impl TimeSeries {
    /// Build a series from vectors in document order. When an epoch repeats,
    /// the later vector replaces the earlier one.
    pub fn new(vectors: impl IntoIterator<Item = StateVector>) -> Self {
        let by_epoch: BTreeMap<DateTime<Utc>, StateVector> =
            vectors.into_iter().map(|v| (v.epoch, v)).collect();
        Self {
            vectors: by_epoch.into_values().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn vectors(&self) -> &[StateVector] {
        &self.vectors
    }

    pub fn first(&self) -> Option<&StateVector> {
        self.vectors.first()
    }

    pub fn last(&self) -> Option<&StateVector> {
        self.vectors.last()
    }

    pub fn get(&self, epoch: DateTime<Utc>) -> Option<&StateVector> {
        self.vectors
            .binary_search_by_key(&epoch, |v| v.epoch)
            .ok()
            .map(|idx| &self.vectors[idx])
    }

    /// Closest vector to `t`; on a tie the earlier epoch wins.
    pub fn nearest(&self, t: DateTime<Utc>) -> Option<&StateVector> {
        let idx = self.vectors.partition_point(|v| v.epoch < t);
        let before = idx.checked_sub(1).and_then(|i| self.vectors.get(i));
        let after = self.vectors.get(idx);

        match (before, after) {
            (Some(b), Some(a)) => {
                if a.epoch - t < t - b.epoch {
                    Some(a)
                } else {
                    Some(b)
                }
            }
            (Some(b), None) => Some(b),
            (None, a) => a,
        }
    }

    /// Contiguous page of the series. Offsets past the end yield an empty page.
    pub fn range(
        &self,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<&[StateVector], SeriesError> {
        let offset = non_negative("offset", offset.unwrap_or(0))?;
        let start = offset.min(self.vectors.len());
        let remaining = self.vectors.len() - start;
        let len = match limit {
            Some(limit) => non_negative("limit", limit)?.min(remaining),
            None => remaining,
        };
        Ok(&self.vectors[start..start + len])
    }
}

fn non_negative(name: &str, value: i64) -> Result<usize, SeriesError> {
    usize::try_from(value)
        .map_err(|_| SeriesError::InvalidParameter(format!("{name} must not be negative")))
}
