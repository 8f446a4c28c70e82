//! PostgreSQL store

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use shared::{
    DailyObservation, DateRange, DiseaseRiskPoint, GddModelConfig, GddValue, GpsCoordinates,
    GrassType, GrowthPotentialPoint, IrrigationEntry, Lawn, Location, ObservationKind,
    ResetEvent, ResetType, TaskRecord, TemperatureUnit, WaterWeekSummary, WeedPressurePoint,
    WeedSeason, WeedSpecies,
};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::Store;
use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn unknown(column: &str, value: &str) -> AppError {
    AppError::Internal(format!("unknown {} '{}' in database", column, value))
}

// ============================================================================
// Row types
// ============================================================================

#[derive(FromRow)]
struct LocationRow {
    id: Uuid,
    name: String,
    latitude: Decimal,
    longitude: Decimal,
}

impl From<LocationRow> for Location {
    fn from(row: LocationRow) -> Self {
        Location {
            id: row.id,
            name: row.name,
            coordinates: GpsCoordinates::new(row.latitude, row.longitude),
        }
    }
}

#[derive(FromRow)]
struct LawnRow {
    id: Uuid,
    location_id: Uuid,
    name: String,
    grass_type: String,
    weather_enabled: bool,
}

impl From<LawnRow> for Lawn {
    fn from(row: LawnRow) -> Self {
        Lawn {
            id: row.id,
            location_id: row.location_id,
            name: row.name,
            grass_type: GrassType::from(row.grass_type),
            weather_enabled: row.weather_enabled,
        }
    }
}

#[derive(FromRow)]
struct WeedSpeciesRow {
    id: Uuid,
    name: String,
    common_name: String,
    gdd_base_temp_c: f64,
    gdd_threshold_emergence: f64,
    optimal_soil_temp_min_c: f64,
    optimal_soil_temp_max_c: f64,
    season: String,
    is_active: bool,
}

impl TryFrom<WeedSpeciesRow> for WeedSpecies {
    type Error = AppError;

    fn try_from(row: WeedSpeciesRow) -> AppResult<Self> {
        let season = WeedSeason::parse(&row.season).ok_or_else(|| unknown("season", &row.season))?;
        Ok(WeedSpecies {
            id: row.id,
            name: row.name,
            common_name: row.common_name,
            gdd_base_temp_c: row.gdd_base_temp_c,
            gdd_threshold_emergence: row.gdd_threshold_emergence,
            optimal_soil_temp_min_c: row.optimal_soil_temp_min_c,
            optimal_soil_temp_max_c: row.optimal_soil_temp_max_c,
            season,
            is_active: row.is_active,
        })
    }
}

#[derive(FromRow)]
struct WeatherRow {
    date: NaiveDate,
    location_id: Uuid,
    kind: String,
    temp_max_c: f64,
    temp_min_c: f64,
    precipitation_mm: f64,
    precipitation_probability_max: f64,
    wind_speed_max_ms: f64,
    wind_gusts_max_ms: f64,
    wind_direction_dominant_deg: f64,
    et0_mm: f64,
    relative_humidity_mean: Option<f64>,
    relative_humidity_max: Option<f64>,
    relative_humidity_min: Option<f64>,
    dew_point_max_c: Option<f64>,
    dew_point_min_c: Option<f64>,
    dew_point_mean_c: Option<f64>,
    sunshine_duration_s: Option<f64>,
}

impl TryFrom<WeatherRow> for DailyObservation {
    type Error = AppError;

    fn try_from(row: WeatherRow) -> AppResult<Self> {
        let kind = ObservationKind::parse(&row.kind).ok_or_else(|| unknown("kind", &row.kind))?;
        Ok(DailyObservation {
            date: row.date,
            location_id: row.location_id,
            kind,
            temp_max_c: row.temp_max_c,
            temp_min_c: row.temp_min_c,
            precipitation_mm: row.precipitation_mm,
            precipitation_probability_max: row.precipitation_probability_max,
            wind_speed_max_ms: row.wind_speed_max_ms,
            wind_gusts_max_ms: row.wind_gusts_max_ms,
            wind_direction_dominant_deg: row.wind_direction_dominant_deg,
            et0_mm: row.et0_mm,
            relative_humidity_mean: row.relative_humidity_mean,
            relative_humidity_max: row.relative_humidity_max,
            relative_humidity_min: row.relative_humidity_min,
            dew_point_max_c: row.dew_point_max_c,
            dew_point_min_c: row.dew_point_min_c,
            dew_point_mean_c: row.dew_point_mean_c,
            sunshine_duration_s: row.sunshine_duration_s,
        })
    }
}

#[derive(FromRow)]
struct GddModelRow {
    id: Uuid,
    location_id: Uuid,
    name: String,
    base_temperature: f64,
    unit: String,
    start_date: NaiveDate,
    threshold: f64,
    reset_on_threshold: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<GddModelRow> for GddModelConfig {
    type Error = AppError;

    fn try_from(row: GddModelRow) -> AppResult<Self> {
        let unit = TemperatureUnit::parse(&row.unit).ok_or_else(|| unknown("unit", &row.unit))?;
        Ok(GddModelConfig {
            id: row.id,
            location_id: row.location_id,
            name: row.name,
            base_temperature: row.base_temperature,
            unit,
            start_date: row.start_date,
            threshold: row.threshold,
            reset_on_threshold: row.reset_on_threshold,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct ResetRow {
    id: Uuid,
    model_id: Uuid,
    reset_date: NaiveDate,
    reset_type: String,
    run_number: i32,
}

impl TryFrom<ResetRow> for ResetEvent {
    type Error = AppError;

    fn try_from(row: ResetRow) -> AppResult<Self> {
        let reset_type =
            ResetType::parse(&row.reset_type).ok_or_else(|| unknown("reset_type", &row.reset_type))?;
        Ok(ResetEvent {
            id: row.id,
            model_id: row.model_id,
            date: row.reset_date,
            reset_type,
            run_number: row.run_number,
        })
    }
}

const WEATHER_COLUMNS: &str = "date, location_id, kind, temp_max_c, temp_min_c, precipitation_mm, \
     precipitation_probability_max, wind_speed_max_ms, wind_gusts_max_ms, \
     wind_direction_dominant_deg, et0_mm, relative_humidity_mean, relative_humidity_max, \
     relative_humidity_min, dew_point_max_c, dew_point_min_c, dew_point_mean_c, \
     sunshine_duration_s";

const GDD_MODEL_COLUMNS: &str = "id, location_id, name, base_temperature, unit, start_date, \
     threshold, reset_on_threshold, created_at, updated_at";

// ============================================================================
// Store implementation
// ============================================================================

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.db).await?;
        Ok(())
    }

    async fn list_locations(&self) -> AppResult<Vec<Location>> {
        let rows = sqlx::query_as::<_, LocationRow>(
            "SELECT id, name, latitude, longitude FROM locations ORDER BY created_at, id",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get_location(&self, id: Uuid) -> AppResult<Option<Location>> {
        let row = sqlx::query_as::<_, LocationRow>(
            "SELECT id, name, latitude, longitude FROM locations WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn list_lawns(&self, location_id: Uuid) -> AppResult<Vec<Lawn>> {
        let rows = sqlx::query_as::<_, LawnRow>(
            r#"
            SELECT id, location_id, name, grass_type, weather_enabled
            FROM lawns
            WHERE location_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(location_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_irrigation(
        &self,
        lawn_id: Uuid,
        range: DateRange,
    ) -> AppResult<Vec<IrrigationEntry>> {
        let rows = sqlx::query_as::<_, (Uuid, Uuid, NaiveDate, f64)>(
            r#"
            SELECT id, lawn_id, date, amount_in
            FROM irrigation_entries
            WHERE lawn_id = $1 AND date BETWEEN $2 AND $3
            ORDER BY date
            "#,
        )
        .bind(lawn_id)
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, lawn_id, date, amount_in)| IrrigationEntry {
                id,
                lawn_id,
                date,
                amount_in,
            })
            .collect())
    }

    async fn list_active_weed_species(&self) -> AppResult<Vec<WeedSpecies>> {
        let rows = sqlx::query_as::<_, WeedSpeciesRow>(
            r#"
            SELECT id, name, common_name, gdd_base_temp_c, gdd_threshold_emergence,
                   optimal_soil_temp_min_c, optimal_soil_temp_max_c, season, is_active
            FROM weed_species
            WHERE is_active
            ORDER BY name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn load_weather(
        &self,
        location_id: Uuid,
        range: DateRange,
    ) -> AppResult<Vec<DailyObservation>> {
        let sql = format!(
            "SELECT {} FROM daily_weather WHERE location_id = $1 AND date BETWEEN $2 AND $3 \
             ORDER BY date, kind",
            WEATHER_COLUMNS
        );
        let rows = sqlx::query_as::<_, WeatherRow>(&sql)
            .bind(location_id)
            .bind(range.start)
            .bind(range.end)
            .fetch_all(&self.db)
            .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn earliest_weather_date(&self, location_id: Uuid) -> AppResult<Option<NaiveDate>> {
        let earliest = sqlx::query_scalar::<_, Option<NaiveDate>>(
            "SELECT MIN(date) FROM daily_weather WHERE location_id = $1",
        )
        .bind(location_id)
        .fetch_one(&self.db)
        .await?;

        Ok(earliest)
    }

    async fn upsert_weather(&self, observations: &[DailyObservation]) -> AppResult<u64> {
        let mut tx = self.db.begin().await?;
        let mut written = 0;

        for obs in observations {
            match obs.kind {
                ObservationKind::Historical => {
                    sqlx::query(
                        "DELETE FROM daily_weather WHERE location_id = $1 AND date = $2 AND kind = 'forecast'",
                    )
                    .bind(obs.location_id)
                    .bind(obs.date)
                    .execute(&mut *tx)
                    .await?;
                }
                ObservationKind::Forecast => {
                    let has_historical = sqlx::query_scalar::<_, bool>(
                        r#"
                        SELECT EXISTS(
                            SELECT 1 FROM daily_weather
                            WHERE location_id = $1 AND date = $2 AND kind = 'historical'
                        )
                        "#,
                    )
                    .bind(obs.location_id)
                    .bind(obs.date)
                    .fetch_one(&mut *tx)
                    .await?;
                    if has_historical {
                        continue;
                    }
                }
            }

            // Historical rows are immutable; forecasts are refreshed in place
            let on_conflict = match obs.kind {
                ObservationKind::Historical => "DO NOTHING",
                ObservationKind::Forecast => {
                    "DO UPDATE SET temp_max_c = EXCLUDED.temp_max_c, \
                     temp_min_c = EXCLUDED.temp_min_c, \
                     precipitation_mm = EXCLUDED.precipitation_mm, \
                     precipitation_probability_max = EXCLUDED.precipitation_probability_max, \
                     wind_speed_max_ms = EXCLUDED.wind_speed_max_ms, \
                     wind_gusts_max_ms = EXCLUDED.wind_gusts_max_ms, \
                     wind_direction_dominant_deg = EXCLUDED.wind_direction_dominant_deg, \
                     et0_mm = EXCLUDED.et0_mm, \
                     relative_humidity_mean = EXCLUDED.relative_humidity_mean, \
                     relative_humidity_max = EXCLUDED.relative_humidity_max, \
                     relative_humidity_min = EXCLUDED.relative_humidity_min, \
                     dew_point_max_c = EXCLUDED.dew_point_max_c, \
                     dew_point_min_c = EXCLUDED.dew_point_min_c, \
                     dew_point_mean_c = EXCLUDED.dew_point_mean_c, \
                     sunshine_duration_s = EXCLUDED.sunshine_duration_s"
                }
            };
            let sql = format!(
                "INSERT INTO daily_weather ({}) VALUES \
                 ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18) \
                 ON CONFLICT (date, location_id, kind) {}",
                WEATHER_COLUMNS, on_conflict
            );
            let result = sqlx::query(&sql)
                .bind(obs.date)
                .bind(obs.location_id)
                .bind(obs.kind.as_str())
                .bind(obs.temp_max_c)
                .bind(obs.temp_min_c)
                .bind(obs.precipitation_mm)
                .bind(obs.precipitation_probability_max)
                .bind(obs.wind_speed_max_ms)
                .bind(obs.wind_gusts_max_ms)
                .bind(obs.wind_direction_dominant_deg)
                .bind(obs.et0_mm)
                .bind(obs.relative_humidity_mean)
                .bind(obs.relative_humidity_max)
                .bind(obs.relative_humidity_min)
                .bind(obs.dew_point_max_c)
                .bind(obs.dew_point_min_c)
                .bind(obs.dew_point_mean_c)
                .bind(obs.sunshine_duration_s)
                .execute(&mut *tx)
                .await?;
            written += result.rows_affected();
        }

        tx.commit().await?;
        Ok(written)
    }

    async fn list_gdd_models(&self, location_id: Uuid) -> AppResult<Vec<GddModelConfig>> {
        let sql = format!(
            "SELECT {} FROM gdd_models WHERE location_id = $1 ORDER BY created_at, id",
            GDD_MODEL_COLUMNS
        );
        let rows = sqlx::query_as::<_, GddModelRow>(&sql)
            .bind(location_id)
            .fetch_all(&self.db)
            .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn get_gdd_model(&self, id: Uuid) -> AppResult<Option<GddModelConfig>> {
        let sql = format!("SELECT {} FROM gdd_models WHERE id = $1", GDD_MODEL_COLUMNS);
        let row = sqlx::query_as::<_, GddModelRow>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn insert_gdd_model(&self, model: &GddModelConfig) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO gdd_models (
                id, location_id, name, base_temperature, unit, start_date,
                threshold, reset_on_threshold, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(model.id)
        .bind(model.location_id)
        .bind(&model.name)
        .bind(model.base_temperature)
        .bind(model.unit.as_str())
        .bind(model.start_date)
        .bind(model.threshold)
        .bind(model.reset_on_threshold)
        .bind(model.created_at)
        .bind(model.updated_at)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn update_gdd_model(&self, model: &GddModelConfig) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE gdd_models
            SET name = $1, base_temperature = $2, unit = $3, start_date = $4,
                threshold = $5, reset_on_threshold = $6, updated_at = $7
            WHERE id = $8
            "#,
        )
        .bind(&model.name)
        .bind(model.base_temperature)
        .bind(model.unit.as_str())
        .bind(model.start_date)
        .bind(model.threshold)
        .bind(model.reset_on_threshold)
        .bind(model.updated_at)
        .bind(model.id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("GDD model".to_string()));
        }
        Ok(())
    }

    async fn list_gdd_values(&self, model_id: Uuid) -> AppResult<Vec<GddValue>> {
        let rows = sqlx::query_as::<_, (Uuid, NaiveDate, f64, f64, i32, bool)>(
            r#"
            SELECT model_id, date, daily_gdd, cumulative_gdd, run, is_forecast
            FROM gdd_values
            WHERE model_id = $1
            ORDER BY date
            "#,
        )
        .bind(model_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(
                |(model_id, date, daily_gdd, cumulative_gdd, run, is_forecast)| GddValue {
                    model_id,
                    date,
                    daily_gdd,
                    cumulative_gdd,
                    run,
                    is_forecast,
                },
            )
            .collect())
    }

    async fn list_resets(&self, model_id: Uuid) -> AppResult<Vec<ResetEvent>> {
        let rows = sqlx::query_as::<_, ResetRow>(
            r#"
            SELECT id, model_id, reset_date, reset_type, run_number
            FROM gdd_resets
            WHERE model_id = $1
            ORDER BY reset_date
            "#,
        )
        .bind(model_id)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn put_reset(&self, event: &ResetEvent) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO gdd_resets (id, model_id, reset_date, reset_type, run_number)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (model_id, reset_date)
            DO UPDATE SET id = EXCLUDED.id, reset_type = EXCLUDED.reset_type,
                          run_number = EXCLUDED.run_number
            "#,
        )
        .bind(event.id)
        .bind(event.model_id)
        .bind(event.date)
        .bind(event.reset_type.as_str())
        .bind(event.run_number)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn delete_reset(&self, model_id: Uuid, reset_id: Uuid) -> AppResult<Option<ResetEvent>> {
        let row = sqlx::query_as::<_, ResetRow>(
            r#"
            DELETE FROM gdd_resets
            WHERE model_id = $1 AND id = $2
            RETURNING id, model_id, reset_date, reset_type, run_number
            "#,
        )
        .bind(model_id)
        .bind(reset_id)
        .fetch_optional(&self.db)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn delete_resets_of_type(
        &self,
        model_id: Uuid,
        reset_type: ResetType,
    ) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM gdd_resets WHERE model_id = $1 AND reset_type = $2")
            .bind(model_id)
            .bind(reset_type.as_str())
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected())
    }

    async fn replace_gdd_output(
        &self,
        model_id: Uuid,
        values: &[GddValue],
        ledger: &[ResetEvent],
    ) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        sqlx::query("DELETE FROM gdd_values WHERE model_id = $1")
            .bind(model_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM gdd_resets WHERE model_id = $1 AND reset_type <> 'manual'")
            .bind(model_id)
            .execute(&mut *tx)
            .await?;

        for value in values {
            sqlx::query(
                r#"
                INSERT INTO gdd_values (model_id, date, daily_gdd, cumulative_gdd, run, is_forecast)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(value.model_id)
            .bind(value.date)
            .bind(value.daily_gdd)
            .bind(value.cumulative_gdd)
            .bind(value.run)
            .bind(value.is_forecast)
            .execute(&mut *tx)
            .await?;
        }

        for event in ledger {
            if event.reset_type == ResetType::Manual {
                // Only renumber; a manual row deleted meanwhile stays deleted
                sqlx::query(
                    r#"
                    UPDATE gdd_resets SET run_number = $3
                    WHERE model_id = $1 AND reset_date = $2 AND reset_type = 'manual'
                    "#,
                )
                .bind(event.model_id)
                .bind(event.date)
                .bind(event.run_number)
                .execute(&mut *tx)
                .await?;
                continue;
            }

            // A manual row recorded meanwhile keeps its date
            sqlx::query(
                r#"
                INSERT INTO gdd_resets (id, model_id, reset_date, reset_type, run_number)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (model_id, reset_date) DO NOTHING
                "#,
            )
            .bind(event.id)
            .bind(event.model_id)
            .bind(event.date)
            .bind(event.reset_type.as_str())
            .bind(event.run_number)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn replace_disease_risk(
        &self,
        location_id: Uuid,
        from: NaiveDate,
        points: &[DiseaseRiskPoint],
    ) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        sqlx::query("DELETE FROM disease_pressure WHERE location_id = $1 AND date >= $2")
            .bind(location_id)
            .bind(from)
            .execute(&mut *tx)
            .await?;

        for p in points {
            sqlx::query(
                r#"
                INSERT INTO disease_pressure (location_id, date, disease, risk_score, is_forecast)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(p.location_id)
            .bind(p.date)
            .bind(&p.disease)
            .bind(p.risk_score)
            .bind(p.is_forecast)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn replace_growth_potential(
        &self,
        location_id: Uuid,
        from: NaiveDate,
        points: &[GrowthPotentialPoint],
    ) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        sqlx::query("DELETE FROM growth_potential WHERE location_id = $1 AND date >= $2")
            .bind(location_id)
            .bind(from)
            .execute(&mut *tx)
            .await?;

        for p in points {
            sqlx::query(
                r#"
                INSERT INTO growth_potential (
                    location_id, date, growth_potential, gp_3d_avg, gp_5d_avg, gp_7d_avg, is_forecast
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(p.location_id)
            .bind(p.date)
            .bind(p.growth_potential)
            .bind(p.gp_3d_avg)
            .bind(p.gp_5d_avg)
            .bind(p.gp_7d_avg)
            .bind(p.is_forecast)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn replace_weed_pressure(
        &self,
        location_id: Uuid,
        from: NaiveDate,
        points: &[WeedPressurePoint],
    ) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        sqlx::query("DELETE FROM weed_pressure WHERE location_id = $1 AND date >= $2")
            .bind(location_id)
            .bind(from)
            .execute(&mut *tx)
            .await?;

        for p in points {
            sqlx::query(
                r#"
                INSERT INTO weed_pressure (
                    location_id, date, weed_species_id, weed_pressure_score, gdd_risk_score,
                    soil_temp_risk_score, moisture_risk_score, turf_stress_score,
                    seasonal_timing_score, gdd_accumulated, soil_temp_estimate_c,
                    precipitation_3day_mm, humidity_avg, et0_mm, is_forecast
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
                "#,
            )
            .bind(p.location_id)
            .bind(p.date)
            .bind(p.weed_species_id)
            .bind(p.weed_pressure_score)
            .bind(p.gdd_risk_score)
            .bind(p.soil_temp_risk_score)
            .bind(p.moisture_risk_score)
            .bind(p.turf_stress_score)
            .bind(p.seasonal_timing_score)
            .bind(p.gdd_accumulated)
            .bind(p.soil_temp_estimate_c)
            .bind(p.precipitation_3day_mm)
            .bind(p.humidity_avg)
            .bind(p.et0_mm)
            .bind(p.is_forecast)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn replace_water_summaries(
        &self,
        lawn_id: Uuid,
        from: NaiveDate,
        summaries: &[WaterWeekSummary],
    ) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        sqlx::query("DELETE FROM weekly_water_summaries WHERE lawn_id = $1 AND week_start >= $2")
            .bind(lawn_id)
            .bind(from)
            .execute(&mut *tx)
            .await?;

        for s in summaries {
            sqlx::query(
                r#"
                INSERT INTO weekly_water_summaries (
                    lawn_id, week_start, week_end, iso_year, iso_week, et0_total,
                    precipitation_total, irrigation_applied, water_deficit, status, is_forecast
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                "#,
            )
            .bind(s.lawn_id)
            .bind(s.week_start)
            .bind(s.week_end)
            .bind(s.iso_year)
            .bind(s.iso_week as i32)
            .bind(s.et0_total)
            .bind(s.precipitation_total)
            .bind(s.irrigation_applied)
            .bind(s.water_deficit)
            .bind(s.status.as_str())
            .bind(s.is_forecast)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn record_task(&self, record: &TaskRecord) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO task_status (
                task_id, task_name, location_id, state, started_at, finished_at, result, error
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (task_id)
            DO UPDATE SET state = EXCLUDED.state, finished_at = EXCLUDED.finished_at,
                          result = EXCLUDED.result, error = EXCLUDED.error
            "#,
        )
        .bind(&record.task_id)
        .bind(&record.task_name)
        .bind(record.location_id)
        .bind(record.state.as_str())
        .bind(record.started_at)
        .bind(record.finished_at)
        .bind(&record.result)
        .bind(&record.error)
        .execute(&self.db)
        .await?;

        Ok(())
    }
}
