use std::fs;
use tempfile::TempDir;
use weather::report::{render_report, summarize, write_report};
use weather::{
    GeneratorConfig, OutputPaths, RawTable, Resolution, aggregate, clean, generate, read_raw_csv,
    write_cleaned_csv, write_raw_csv, write_summary_csv,
};

fn generated_csv(dir: &TempDir, days: usize) -> std::path::PathBuf {
    let config = GeneratorConfig {
        days,
        missing_rate: 0.05,
        seed: Some(2023),
        ..GeneratorConfig::default()
    };
    let table = generate(&config).unwrap();
    let path = dir.path().join("raw_weather.csv");
    write_raw_csv(&table, &path).unwrap();
    path
}

#[test]
fn test_generated_data_cleans_without_gaps() {
    let dir = TempDir::new().unwrap();
    let raw = read_raw_csv(&generated_csv(&dir, 730)).unwrap();
    assert_eq!(raw.len(), 730);

    let series = clean(&raw);
    assert_eq!(series.len(), 730);
    assert!(series.windows(2).all(|w| w[0].date <= w[1].date));
    for r in &series {
        assert!(r.temp_max.is_some());
        assert!(r.temp_min.is_some());
        assert!(r.temp_mean.is_some());
        assert!(r.humidity.is_some());
        assert!(r.rainfall_mm.unwrap() >= 0.0);
    }
}

#[test]
fn test_two_years_give_24_months_and_2_years() {
    let dir = TempDir::new().unwrap();
    let series = clean(&read_raw_csv(&generated_csv(&dir, 730)).unwrap());
    let (monthly, yearly) = aggregate(&series);

    assert_eq!(monthly.len(), 24);
    assert_eq!(yearly.len(), 2);
    assert_eq!(monthly[0].bucket.label(), "2023-01");
    assert_eq!(monthly[23].bucket.label(), "2024-12");
    assert_eq!(monthly.iter().map(|r| r.days).sum::<usize>(), 730);
    // 2024 is a leap year, so 730 days end on 2024-12-30
    assert_eq!(yearly[0].days, 365);
    assert_eq!(yearly[1].days, 365);
}

#[test]
fn test_dirty_csv_end_to_end() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("dirty.csv");
    fs::write(
        &input,
        " Date ,Temp_Mean,RAINFALL_MM,humidity,station\n\
         2023-01-03,20.0,-1.0,60,A\n\
         garbage,99,99,99,A\n\
         2023-01-01,10.0,,50,A\n\
         2023-01-02,,2.0,oops,A\n\
         2023-02-01,5.0,3.0,70,A\n",
    )
    .unwrap();

    let series = clean(&read_raw_csv(&input).unwrap());
    assert_eq!(series.len(), 4);
    assert_eq!(series[1].temp_mean, Some(15.0));
    assert_eq!(series[1].humidity, Some(55.0));
    // Leading rainfall gap takes the nearest value, then negatives floor to zero
    assert_eq!(series[0].rainfall_mm, Some(2.0));
    assert_eq!(series[2].rainfall_mm, Some(0.0));
    assert_eq!(series[0].temp_max, None);

    let (monthly, yearly) = aggregate(&series);
    assert_eq!(monthly.len(), 2);
    assert_eq!(monthly[0].rainfall_mm_sum, 4.0);
    assert_eq!(monthly[1].temp_mean_std, None);
    assert_eq!(yearly.len(), 1);

    let out = dir.path().join("out");
    let paths = OutputPaths::in_dir(&out, out.join("report.md"));
    paths.create_dirs().unwrap();
    write_cleaned_csv(&series, &paths.cleaned_csv).unwrap();
    write_summary_csv(&monthly, Resolution::Monthly, &paths.monthly_csv).unwrap();
    let summary = summarize(&series, &monthly, &yearly);
    write_report(&render_report(&summary, &paths), &paths.report).unwrap();

    let monthly_csv = fs::read_to_string(&paths.monthly_csv).unwrap();
    assert_eq!(monthly_csv.lines().count(), 3);
    let report = fs::read_to_string(&paths.report).unwrap();
    assert!(report.contains("**Hottest Month:** 2023-01"));
}

#[test]
fn test_empty_input_writes_keyed_empty_summaries() {
    let dir = TempDir::new().unwrap();
    let (monthly, yearly) = aggregate(&clean(&RawTable::default()));
    assert!(monthly.is_empty() && yearly.is_empty());

    let monthly_path = dir.path().join("monthly_summary.csv");
    let yearly_path = dir.path().join("yearly_summary.csv");
    write_summary_csv(&monthly, Resolution::Monthly, &monthly_path).unwrap();
    write_summary_csv(&yearly, Resolution::Yearly, &yearly_path).unwrap();

    assert!(fs::read_to_string(&monthly_path).unwrap().starts_with("month,"));
    assert!(fs::read_to_string(&yearly_path).unwrap().starts_with("year,"));
}
