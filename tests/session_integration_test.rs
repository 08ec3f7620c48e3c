use revenue_forecast::core::session::TableSource;
use revenue_forecast::{
    CsvForecastStore, Deviation, ForecastError, ForecastSession, ForecastStore, RevenueField,
    RevenueRow, WarningSink,
};
use tempfile::TempDir;

#[derive(Default)]
struct RecordingSink {
    warnings: Vec<Deviation>,
}

impl WarningSink for RecordingSink {
    fn warn(&mut self, deviation: &Deviation) {
        self.warnings.push(*deviation);
    }
}

#[test]
fn test_missing_files_fall_back_to_seed() {
    let temp_dir = TempDir::new().unwrap();
    let store = CsvForecastStore::new(temp_dir.path());

    let (session, main_source, mix_source) = ForecastSession::load(&store).unwrap();

    assert_eq!(main_source, TableSource::Seed);
    assert_eq!(mix_source, TableSource::Seed);
    assert_eq!(session.years(), vec![2025, 2026, 2027]);
    assert_eq!(session.product_mix().len(), 3);
    assert!(!store.main_path().exists());
}

#[test]
fn test_edit_save_and_reload() {
    let temp_dir = TempDir::new().unwrap();
    let store = CsvForecastStore::new(temp_dir.path());

    let (mut session, _, _) = ForecastSession::load(&store).unwrap();
    let corrected = session
        .apply_edit(2025, [(RevenueField::Crm, 5.95)])
        .unwrap();
    session.save(&store).unwrap();

    let (reloaded, main_source, mix_source) = ForecastSession::load(&store).unwrap();

    assert_eq!(main_source, TableSource::Stored);
    assert_eq!(mix_source, TableSource::Stored);
    assert_eq!(reloaded.row(2025), Some(&corrected));
    assert_eq!(reloaded.product_mix(), session.product_mix());
    assert!((corrected.total - 6.5).abs() < 1e-9);
    assert!(reloaded.rows().iter().all(RevenueRow::is_balanced));
}

#[test]
fn test_saved_main_table_matches_column_layout() {
    let temp_dir = TempDir::new().unwrap();
    let store = CsvForecastStore::new(temp_dir.path());
    ForecastSession::seeded().save(&store).unwrap();

    let main = std::fs::read_to_string(store.main_path()).unwrap();
    let mix = std::fs::read_to_string(store.product_mix_path()).unwrap();

    assert!(main.starts_with("Year,Total Impl. Team Service Revenue (M USD),"));
    assert!(main.contains("2026,4.05,3.24,0.81,3.65,0.4"));
    assert!(mix.starts_with("Product Type,2025 %,2026 %,2027 %"));
    assert!(mix.contains("AI/Vault,0,5,15"));
}

#[test]
fn test_hand_written_files_are_loaded() {
    let temp_dir = TempDir::new().unwrap();
    let store = CsvForecastStore::new(temp_dir.path());

    std::fs::write(
        store.main_path(),
        "Year,Total Impl. Team Service Revenue (M USD),CRM Project Revenue (M USD),\
         New Products Project Revenue (M USD),MNC Project Revenue (M USD),\
         Domestic Project Revenue (M USD)\n\
         2025,10,6,4,7,3\n\
         2026,12,6,6,8,4\n",
    )
    .unwrap();

    let (session, main_source, mix_source) = ForecastSession::load(&store).unwrap();

    assert_eq!(main_source, TableSource::Stored);
    assert_eq!(mix_source, TableSource::Seed);
    assert_eq!(session.years(), vec![2025, 2026]);
    // seed mix still carries a 2027 column
    assert_eq!(session.mix_check_years(), vec![2025, 2026, 2027]);

    let kpis = session.kpis().unwrap();
    assert_eq!(kpis.start_revenue, 10.0);
    assert_eq!(kpis.end_revenue, 12.0);
    assert!((kpis.cagr.unwrap().percent - 20.0).abs() < 1e-9);
}

#[test]
fn test_malformed_main_table_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let store = CsvForecastStore::new(temp_dir.path());
    std::fs::write(store.main_path(), "Year,Total\n2025,abc\n").unwrap();

    let err = ForecastSession::load(&store).unwrap_err();
    assert!(matches!(err, ForecastError::CsvError(_)));
}

#[test]
fn test_duplicate_years_are_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let store = CsvForecastStore::new(temp_dir.path());
    store
        .save_main(&[
            RevenueRow::new(2025, 1.0, 1.0, 0.0, 1.0, 0.0),
            RevenueRow::new(2025, 2.0, 1.0, 1.0, 1.0, 1.0),
        ])
        .unwrap();

    assert!(matches!(
        ForecastSession::load(&store),
        Err(ForecastError::InvalidTableError { .. })
    ));
}

#[test]
fn test_mix_edits_warn_but_still_save() {
    let temp_dir = TempDir::new().unwrap();
    let store = CsvForecastStore::new(temp_dir.path());

    let (mut session, _, _) = ForecastSession::load(&store).unwrap();
    session.add_mix_entry("Data Cloud").unwrap();
    session.set_mix_percent("Data Cloud", 2027, 10.0).unwrap();

    let mut sink = RecordingSink::default();
    assert_eq!(session.validate_mix(&mut sink), 1);
    assert_eq!(sink.warnings[0].year, 2027);
    assert!((sink.warnings[0].observed_sum - 110.0).abs() < 1e-9);

    session.save(&store).unwrap();
    let (reloaded, _, _) = ForecastSession::load(&store).unwrap();

    let names: Vec<&str> = reloaded
        .product_mix()
        .iter()
        .map(|entry| entry.product_type.as_str())
        .collect();
    assert_eq!(names, vec!["China CRM", "Network", "AI/Vault", "Data Cloud"]);
    assert_eq!(reloaded.mix_deviations().len(), 1);

    let revenue = reloaded.sub_type_revenue();
    assert!((revenue[3].revenue_by_year[&2027] - 0.122).abs() < 1e-9);
}

#[test]
fn test_last_save_wins() {
    let temp_dir = TempDir::new().unwrap();
    let store = CsvForecastStore::new(temp_dir.path());

    let mut first = ForecastSession::seeded();
    first.apply_edit(2026, [(RevenueField::Total, 5.0)]).unwrap();
    first.save(&store).unwrap();

    let mut second = ForecastSession::seeded();
    second.apply_edit(2026, [(RevenueField::Total, 6.0)]).unwrap();
    second.save(&store).unwrap();

    let (reloaded, _, _) = ForecastSession::load(&store).unwrap();
    assert_eq!(reloaded.row(2026).unwrap().total, 6.0);
    assert!(!temp_dir.path().join("forecast_main.csv.tmp").exists());
}
