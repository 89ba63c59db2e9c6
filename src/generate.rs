use crate::error::{PipelineError, Result};
use crate::structs::{GeneratorConfig, RawTable};
use chrono::{Datelike, Duration, NaiveDate};
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Exp, Normal};
use std::f64::consts::PI;

pub const RAW_COLUMNS: [&str; 6] = [
    "date",
    "temp_max",
    "temp_min",
    "temp_mean",
    "rainfall_mm",
    "humidity",
];

/// Columns that receive randomly blanked cells. `temp_mean` is always present.
const GAPPY_COLUMNS: [usize; 4] = [1, 2, 4, 5];

/// Seasonal baseline temperature in Celsius, peaking around day 172 (late June).
pub fn seasonal_temp(day_of_year: u32) -> f64 {
    20.0 + 10.0 * (2.0 * PI * (day_of_year as f64 - 172.0) / 365.0).sin()
}

/// Multiplier in `[0, 1]` biasing rainfall towards the days around day 200.
pub fn rain_bias(day_of_year: u32) -> f64 {
    0.5 + 0.5 * (2.0 * PI * (day_of_year as f64 - 200.0) / 365.0).cos()
}

/// Generates a synthetic daily weather table with seasonal patterns and gaps.
///
/// With a fixed `seed` the output is fully reproducible. Missing values are
/// written as empty cells so the table looks like a dirty CSV export.
///
/// # Errors
///
/// Returns `PipelineError::Data` if `missing_rate` is outside `[0, 1]`.
pub fn generate(config: &GeneratorConfig) -> Result<RawTable> {
    if !(0.0..=1.0).contains(&config.missing_rate) {
        return Err(PipelineError::Data(format!(
            "missing rate must be within [0, 1], got {}",
            config.missing_rate
        )));
    }
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let noise = Normal::new(0.0, 3.0).map_err(|e| PipelineError::Data(e.to_string()))?;
    let humidity_noise = Normal::new(0.0, 5.0).map_err(|e| PipelineError::Data(e.to_string()))?;
    // Exp is parameterised by rate; rate 0.5 is a mean (scale) of 2 mm
    let rain = Exp::new(0.5).map_err(|e| PipelineError::Data(e.to_string()))?;

    let mut table = RawTable::new(RAW_COLUMNS.iter().map(|c| c.to_string()).collect());
    for offset in 0..config.days {
        let date = config.start_date + Duration::days(offset as i64);
        let doy = date.ordinal();

        let temp_mean = seasonal_temp(doy) + noise.sample(&mut rng);
        let temp_max = temp_mean + rng.random_range(2.0..8.0);
        let temp_min = temp_mean - rng.random_range(2.0..8.0);
        let rainfall = (rain.sample(&mut rng) * rain_bias(doy)).max(0.0);
        let wet_bonus = if rainfall > 0.0 {
            rng.random_range(10.0..25.0)
        } else {
            0.0
        };
        let humidity = (60.0 + wet_bonus - (temp_mean - 20.0) * 0.5
            + humidity_noise.sample(&mut rng))
        .clamp(0.0, 100.0);

        let mut row = vec![
            format_date(date),
            format_value(temp_max),
            format_value(temp_min),
            format_value(temp_mean),
            format_value(rainfall),
            format_value(humidity),
        ];
        for &col in &GAPPY_COLUMNS {
            if rng.random::<f64>() < config.missing_rate {
                row[col].clear();
            }
        }
        table.rows.push(row);
    }

    debug!(
        "Generated {} synthetic rows starting {}",
        table.len(),
        config.start_date
    );
    Ok(table)
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// One decimal place, the precision of a typical station export.
fn format_value(v: f64) -> String {
    format!("{:.1}", v)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(days: usize, missing_rate: f64) -> GeneratorConfig {
        GeneratorConfig {
            days,
            missing_rate,
            seed: Some(7),
            ..GeneratorConfig::default()
        }
    }

    #[test]
    fn test_generates_consecutive_days() {
        let table = generate(&seeded(40, 0.0)).unwrap();
        assert_eq!(table.headers, RAW_COLUMNS);
        assert_eq!(table.len(), 40);
        assert_eq!(table.cell(0, 0), Some("2023-01-01"));
        assert_eq!(table.cell(39, 0), Some("2023-02-09"));
    }

    #[test]
    fn test_same_seed_same_table() {
        let a = generate(&seeded(100, 0.1)).unwrap();
        let b = generate(&seeded(100, 0.1)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_values_are_in_domain() {
        let table = generate(&seeded(365, 0.0)).unwrap();
        for row in &table.rows {
            let v: Vec<f64> = row[1..].iter().map(|c| c.parse().unwrap()).collect();
            let (max, min, mean, rain, humidity) = (v[0], v[1], v[2], v[3], v[4]);
            assert!(max >= mean && mean >= min);
            assert!(rain >= 0.0);
            assert!((0.0..=100.0).contains(&humidity));
        }
    }

    #[test]
    fn test_missing_rate_one_blanks_gappy_columns_only() {
        let table = generate(&seeded(10, 1.0)).unwrap();
        for row in &table.rows {
            assert!(!row[0].is_empty());
            assert!(!row[3].is_empty());
            for &col in &GAPPY_COLUMNS {
                assert!(row[col].is_empty());
            }
        }
    }

    #[test]
    fn test_invalid_missing_rate_is_rejected() {
        let err = generate(&seeded(10, 1.5)).unwrap_err();
        assert!(matches!(err, PipelineError::Data(_)));
    }

    #[test]
    fn test_seasonal_shape() {
        assert!((seasonal_temp(172) - 20.0).abs() < 1e-9);
        assert!(seasonal_temp(263) > 29.9);
        assert!((rain_bias(200) - 1.0).abs() < 1e-9);
    }
}
