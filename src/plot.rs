use crate::error::{PipelineError, Result};
use crate::structs::{AggregateRow, Field, Record};
use chrono::{Duration, NaiveDate};
use log::info;
use plotters::prelude::*;
use std::path::{Path, PathBuf};

pub const DAILY_TEMPERATURE: &str = "daily_temperature.png";
pub const MONTHLY_RAINFALL: &str = "monthly_rainfall.png";
pub const HUMIDITY_VS_TEMP: &str = "humidity_vs_temp.png";
pub const COMBINED_MONTHLY: &str = "combined_monthly_rain_temp.png";

/// Renders every chart into `plots_dir` and returns the written paths.
///
/// Nothing is rendered for an empty series.
pub fn render_all(
    series: &[Record],
    monthly: &[AggregateRow],
    plots_dir: &Path,
) -> Result<Vec<PathBuf>> {
    if series.is_empty() {
        return Ok(Vec::new());
    }
    let outputs = [
        plots_dir.join(DAILY_TEMPERATURE),
        plots_dir.join(MONTHLY_RAINFALL),
        plots_dir.join(HUMIDITY_VS_TEMP),
        plots_dir.join(COMBINED_MONTHLY),
    ];
    plot_daily_temperature(series, &outputs[0])?;
    plot_monthly_rainfall(monthly, &outputs[1])?;
    plot_humidity_vs_temp(series, &outputs[2])?;
    plot_combined(monthly, &outputs[3])?;
    for path in &outputs {
        info!("Saved: {}", path.display());
    }
    Ok(outputs.to_vec())
}

/// Mean, max and min temperature lines over the whole series.
pub fn plot_daily_temperature(series: &[Record], path: &Path) -> Result<()> {
    let Some(first) = series.first().map(|r| r.date) else {
        return Ok(());
    };
    let offset = |r: &Record| (r.date - first).num_days() as f64;
    let span = series.last().map_or(1.0, |r| offset(r).max(1.0));
    let temps: Vec<f64> = series
        .iter()
        .flat_map(|r| [r.temp_max, r.temp_min, r.temp_mean])
        .flatten()
        .collect();
    let (lo, hi) = padded_range(&temps);

    let root = BitMapBackend::new(path, (1000, 400)).into_drawing_area();
    root.fill(&WHITE).map_err(PipelineError::plot)?;
    let mut chart = ChartBuilder::on(&root)
        .caption("Daily Temperature Trends", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0f64..span, lo..hi)
        .map_err(PipelineError::plot)?;
    chart
        .configure_mesh()
        .x_desc("Date")
        .y_desc("Temperature (°C)")
        .x_label_formatter(&|v: &f64| day_label(first, *v))
        .draw()
        .map_err(PipelineError::plot)?;

    for (field, label, color) in [
        (Field::TempMean, "Mean", BLUE.to_rgba()),
        (Field::TempMax, "Max", RED.mix(0.5)),
        (Field::TempMin, "Min", GREEN.mix(0.5)),
    ] {
        let points: Vec<(f64, f64)> = series
            .iter()
            .filter_map(|r| field.get(r).map(|v| (offset(r), v)))
            .collect();
        chart
            .draw_series(LineSeries::new(points, color))
            .map_err(PipelineError::plot)?
            .label(label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }
    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(PipelineError::plot)?;

    root.present().map_err(PipelineError::plot)?;
    Ok(())
}

/// One bar of total rainfall per month.
pub fn plot_monthly_rainfall(monthly: &[AggregateRow], path: &Path) -> Result<()> {
    let labels: Vec<String> = monthly.iter().map(|r| r.bucket.label()).collect();
    let rain: Vec<f64> = monthly.iter().map(|r| r.rainfall_mm_sum).collect();
    let (_, hi) = padded_range(&rain);
    let n = monthly.len().max(1) as f64;

    let root = BitMapBackend::new(path, (1000, 400)).into_drawing_area();
    root.fill(&WHITE).map_err(PipelineError::plot)?;
    let mut chart = ChartBuilder::on(&root)
        .caption("Monthly Rainfall", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0f64..n, 0f64..hi.max(1.0))
        .map_err(PipelineError::plot)?;
    chart
        .configure_mesh()
        .x_desc("Month")
        .y_desc("Rainfall (mm)")
        .x_labels(labels.len().min(24))
        .x_label_formatter(&|v: &f64| bar_label(&labels, *v))
        .draw()
        .map_err(PipelineError::plot)?;

    chart
        .draw_series(rain.iter().enumerate().map(|(i, &v)| bar(i, v, BLUE.mix(0.7))))
        .map_err(PipelineError::plot)?;

    root.present().map_err(PipelineError::plot)?;
    Ok(())
}

/// Scatter of daily mean temperature against humidity.
pub fn plot_humidity_vs_temp(series: &[Record], path: &Path) -> Result<()> {
    let points: Vec<(f64, f64)> = series
        .iter()
        .filter_map(|r| Some((r.temp_mean?, r.humidity?)))
        .collect();
    let xs: Vec<f64> = points.iter().map(|p| p.0).collect();
    let ys: Vec<f64> = points.iter().map(|p| p.1).collect();
    let (x_lo, x_hi) = padded_range(&xs);
    let (y_lo, y_hi) = padded_range(&ys);

    let root = BitMapBackend::new(path, (600, 600)).into_drawing_area();
    root.fill(&WHITE).map_err(PipelineError::plot)?;
    let mut chart = ChartBuilder::on(&root)
        .caption("Humidity vs Temperature", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)
        .map_err(PipelineError::plot)?;
    chart
        .configure_mesh()
        .x_desc("Mean Temperature (°C)")
        .y_desc("Humidity (%)")
        .draw()
        .map_err(PipelineError::plot)?;

    chart
        .draw_series(
            points
                .iter()
                .map(|&p| Circle::new(p, 3, BLUE.mix(0.6).filled())),
        )
        .map_err(PipelineError::plot)?;

    root.present().map_err(PipelineError::plot)?;
    Ok(())
}

/// Monthly rainfall bars with the monthly mean temperature on a second axis.
pub fn plot_combined(monthly: &[AggregateRow], path: &Path) -> Result<()> {
    let labels: Vec<String> = monthly.iter().map(|r| r.bucket.label()).collect();
    let rain: Vec<f64> = monthly.iter().map(|r| r.rainfall_mm_sum).collect();
    let temps: Vec<(f64, f64)> = monthly
        .iter()
        .enumerate()
        .filter_map(|(i, r)| r.temp_mean_mean.map(|t| (i as f64 + 0.5, t)))
        .collect();
    let (_, rain_hi) = padded_range(&rain);
    let (t_lo, t_hi) = padded_range(&temps.iter().map(|p| p.1).collect::<Vec<_>>());
    let n = monthly.len().max(1) as f64;

    let root = BitMapBackend::new(path, (1000, 500)).into_drawing_area();
    root.fill(&WHITE).map_err(PipelineError::plot)?;
    let mut chart = ChartBuilder::on(&root)
        .caption("Monthly Rainfall vs Temperature", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .right_y_label_area_size(50)
        .build_cartesian_2d(0f64..n, 0f64..rain_hi.max(1.0))
        .map_err(PipelineError::plot)?
        .set_secondary_coord(0f64..n, t_lo..t_hi);
    chart
        .configure_mesh()
        .y_desc("Rainfall (mm)")
        .x_labels(labels.len().min(24))
        .x_label_formatter(&|v: &f64| bar_label(&labels, *v))
        .draw()
        .map_err(PipelineError::plot)?;
    chart
        .configure_secondary_axes()
        .y_desc("Temperature (°C)")
        .draw()
        .map_err(PipelineError::plot)?;

    let bar_color = BLUE.mix(0.6);
    chart
        .draw_series(rain.iter().enumerate().map(|(i, &v)| bar(i, v, bar_color)))
        .map_err(PipelineError::plot)?
        .label("Rainfall")
        .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], bar_color.filled()));
    chart
        .draw_secondary_series(LineSeries::new(temps.clone(), RED))
        .map_err(PipelineError::plot)?
        .label("Temperature")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED));
    chart
        .draw_secondary_series(temps.iter().map(|&p| Circle::new(p, 3, RED.filled())))
        .map_err(PipelineError::plot)?;
    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(PipelineError::plot)?;

    root.present().map_err(PipelineError::plot)?;
    Ok(())
}

fn bar(index: usize, value: f64, color: RGBAColor) -> Rectangle<(f64, f64)> {
    let x = index as f64;
    Rectangle::new([(x + 0.15, 0.0), (x + 0.85, value)], color.filled())
}

/// Axis range covering `values` with 5% headroom on each side.
pub fn padded_range(values: &[f64]) -> (f64, f64) {
    let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    if (hi - lo).abs() < f64::EPSILON {
        return (lo - 1.0, hi + 1.0);
    }
    let pad = (hi - lo) * 0.05;
    (lo - pad, hi + pad)
}

/// `YYYY-MM` label of a position measured in days from `first`.
pub fn day_label(first: NaiveDate, offset: f64) -> String {
    (first + Duration::days(offset.round() as i64))
        .format("%Y-%m")
        .to_string()
}

/// Label of the bar occupying `[i, i + 1)` on the x axis.
pub fn bar_label(labels: &[String], position: f64) -> String {
    if position < 0.0 {
        return String::new();
    }
    labels
        .get(position.floor() as usize)
        .cloned()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate_monthly;
    use crate::clean::clean;
    use crate::generate::generate;
    use crate::structs::GeneratorConfig;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_padded_range() {
        assert_eq!(padded_range(&[]), (0.0, 1.0));
        assert_eq!(padded_range(&[5.0]), (4.0, 6.0));
        let (lo, hi) = padded_range(&[0.0, 10.0]);
        assert!((lo + 0.5).abs() < 1e-12);
        assert!((hi - 10.5).abs() < 1e-12);
    }

    #[test]
    fn test_day_label() {
        let first = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        assert_eq!(day_label(first, 0.0), "2023-01");
        assert_eq!(day_label(first, 31.0), "2023-02");
        assert_eq!(day_label(first, 364.6), "2024-01");
    }

    #[test]
    fn test_bar_label() {
        let labels = vec!["2023-01".to_string(), "2023-02".to_string()];
        assert_eq!(bar_label(&labels, 0.0), "2023-01");
        assert_eq!(bar_label(&labels, 1.7), "2023-02");
        assert_eq!(bar_label(&labels, 2.0), "");
        assert_eq!(bar_label(&labels, -0.5), "");
    }

    #[test]
    fn test_render_all_skips_empty_series() {
        let written = render_all(&[], &[], Path::new("does/not/exist")).unwrap();
        assert!(written.is_empty());
    }

    #[test]
    fn test_render_all_writes_every_chart() {
        let config = GeneratorConfig {
            days: 60,
            seed: Some(7),
            ..GeneratorConfig::default()
        };
        let series = clean(&generate(&config).unwrap());
        let monthly = aggregate_monthly(&series);
        let dir = TempDir::new().unwrap();

        let written = render_all(&series, &monthly, dir.path()).unwrap();

        let names: Vec<&str> = written
            .iter()
            .filter_map(|p| p.file_name()?.to_str())
            .collect();
        assert_eq!(
            names,
            vec![DAILY_TEMPERATURE, MONTHLY_RAINFALL, HUMIDITY_VS_TEMP, COMBINED_MONTHLY]
        );
        for path in &written {
            assert!(fs::metadata(path).unwrap().len() > 0, "{} is empty", path.display());
        }
    }
}
