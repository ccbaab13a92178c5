use chrono::{DateTime, Utc};
use std::sync::Arc;

use super::types::{EpochList, LocationReport, NowReport, SpeedReport, StateVectorReport};
use crate::clock::Clock;
use crate::derive::{average_speed, speed, LocationResolver};
use crate::oem::{format_epoch, parse_epoch, StateVector};
use crate::series::{SeriesError, SeriesStore};

/// Read side of the service: every external query goes through here.
pub struct QueryEngine {
    store: Arc<SeriesStore>,
    locator: LocationResolver,
    clock: Arc<dyn Clock>,
}

impl QueryEngine {
    pub fn new(store: Arc<SeriesStore>, locator: LocationResolver, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            locator,
            clock,
        }
    }

    pub fn list_epochs(
        &self,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<EpochList, SeriesError> {
        let epochs = match (limit, offset) {
            (None, None) => self.store.all(),
            _ => self.store.range(limit, offset)?,
        };
        let epochs = epochs.iter().map(format_epoch).collect();
        Ok(EpochList { epochs })
    }

    pub fn state_vector(&self, epoch: &str) -> Result<StateVectorReport, SeriesError> {
        let vector = self.lookup(epoch)?;
        Ok(StateVectorReport {
            epoch: format_epoch(&vector.epoch),
            position: vector.position,
            velocity: vector.velocity,
        })
    }

    pub fn speed(&self, epoch: &str) -> Result<SpeedReport, SeriesError> {
        let vector = self.lookup(epoch)?;
        Ok(SpeedReport {
            epoch: format_epoch(&vector.epoch),
            speed_km_s: speed(&vector),
        })
    }

    pub async fn location(&self, epoch: &str) -> Result<LocationReport, SeriesError> {
        let vector = self.lookup(epoch)?;
        Ok(LocationReport {
            epoch: format_epoch(&vector.epoch),
            location: self.locator.location(&vector).await,
        })
    }

    pub async fn now(&self) -> Result<NowReport, SeriesError> {
        self.nearest_report(self.clock.now()).await
    }

    async fn nearest_report(&self, t: DateTime<Utc>) -> Result<NowReport, SeriesError> {
        // One snapshot so the closest sample and the average describe the same series.
        let (closest, series) = self.store.nearest(t)?;
        let average_speed_km_s = average_speed(series.vectors());

        Ok(NowReport {
            epoch: format_epoch(&closest.epoch),
            position: closest.position,
            velocity: closest.velocity,
            speed_km_s: speed(&closest),
            average_speed_km_s,
            location: self.locator.location(&closest).await,
        })
    }

    /// Caller-supplied epochs that cannot be parsed cannot match anything.
    fn lookup(&self, epoch: &str) -> Result<StateVector, SeriesError> {
        let parsed =
            parse_epoch(epoch).ok_or_else(|| SeriesError::NotFound(epoch.to_string()))?;
        self.store.get(parsed)
    }
}
