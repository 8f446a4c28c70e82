//! Weather ingestion: provider days into stored observations

use std::sync::Arc;

use chrono::NaiveDate;
use shared::{DailyObservation, DateRange, Location, ObservationKind};
use uuid::Uuid;

use crate::error::AppResult;
use crate::external::{WeatherDay, WeatherSource};
use crate::store::Store;

/// Attach a provider day to a location with the given kind
pub fn to_observation(
    day: WeatherDay,
    location_id: Uuid,
    kind: ObservationKind,
) -> DailyObservation {
    DailyObservation {
        date: day.date,
        location_id,
        kind,
        temp_max_c: day.temp_max_c,
        temp_min_c: day.temp_min_c,
        precipitation_mm: day.precipitation_mm,
        precipitation_probability_max: day.precipitation_probability_max,
        wind_speed_max_ms: day.wind_speed_max_ms,
        wind_gusts_max_ms: day.wind_gusts_max_ms,
        wind_direction_dominant_deg: day.wind_direction_dominant_deg,
        et0_mm: day.et0_mm,
        relative_humidity_mean: day.relative_humidity_mean,
        relative_humidity_max: day.relative_humidity_max,
        relative_humidity_min: day.relative_humidity_min,
        dew_point_max_c: day.dew_point_max_c,
        dew_point_min_c: day.dew_point_min_c,
        dew_point_mean_c: day.dew_point_mean_c,
        sunshine_duration_s: day.sunshine_duration_s,
    }
}

/// Weather ingestion service
#[derive(Clone)]
pub struct WeatherService {
    store: Arc<dyn Store>,
    source: Arc<dyn WeatherSource>,
}

impl WeatherService {
    pub fn new(store: Arc<dyn Store>, source: Arc<dyn WeatherSource>) -> Self {
        Self { store, source }
    }

    /// Fetch recent and forecast days; anything after `today` is stored as a forecast
    pub async fn ingest_recent(
        &self,
        location: &Location,
        past_days: u32,
        forecast_days: u32,
        today: NaiveDate,
    ) -> AppResult<u64> {
        let days = self
            .source
            .fetch_recent(&location.coordinates, past_days, forecast_days)
            .await?;
        let observations: Vec<DailyObservation> = days
            .into_iter()
            .map(|day| {
                let kind = ObservationKind::for_date(day.date, today);
                to_observation(day, location.id, kind)
            })
            .collect();

        let written = self.store.upsert_weather(&observations).await?;
        tracing::info!(
            location_id = %location.id,
            fetched = observations.len(),
            written,
            "ingested recent weather"
        );
        Ok(written)
    }

    /// Fetch and store measured days over `range`
    pub async fn backfill(&self, location: &Location, range: DateRange) -> AppResult<u64> {
        let days = self
            .source
            .fetch_historical(&location.coordinates, range)
            .await?;
        let observations: Vec<DailyObservation> = days
            .into_iter()
            .filter(|day| range.contains(day.date))
            .map(|day| to_observation(day, location.id, ObservationKind::Historical))
            .collect();

        let written = self.store.upsert_weather(&observations).await?;
        tracing::info!(
            location_id = %location.id,
            start = %range.start,
            end = %range.end,
            written,
            "backfilled historical weather"
        );
        Ok(written)
    }

    /// Backfill the gap between `required_start` and the earliest stored day.
    ///
    /// With nothing stored yet the gap runs up to yesterday.
    pub async fn ensure_history(
        &self,
        location: &Location,
        required_start: NaiveDate,
        today: NaiveDate,
    ) -> AppResult<u64> {
        let earliest = self.store.earliest_weather_date(location.id).await?;
        let gap_end = match earliest {
            Some(earliest) if earliest <= required_start => return Ok(0),
            Some(earliest) => earliest.pred_opt(),
            None => today.pred_opt(),
        };

        match gap_end {
            Some(end) if end >= required_start => {
                self.backfill(location, DateRange::new(required_start, end))
                    .await
            }
            _ => Ok(0),
        }
    }
}
