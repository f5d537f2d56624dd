use std::fs;

use chrono::NaiveDate;
use installment_core::{
    config::{Config, ConfigManager},
    errors::SnapshotError,
    messages::DateFormatStyle,
    utils::snapshot::{load_installments, save_installments},
    Installment, PaymentFrequency,
};
use tempfile::tempdir;

fn sample() -> Vec<Installment> {
    let first = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
    vec![
        Installment::new("Fridge", 900.0, 75.0, PaymentFrequency::Monthly, first, 12)
            .with_payments_made(4),
        Installment::new("Gym", 520.0, 20.0, PaymentFrequency::Biweekly, first, 26)
            .with_interest_rate(3.5)
            .with_end_date(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()),
    ]
}

#[test]
fn snapshot_round_trip_preserves_schedules() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("plans.json");
    let original = sample();

    save_installments(&original, &path).unwrap();
    let loaded = load_installments(&path).unwrap();

    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded[0].id, original[0].id);
    assert_eq!(loaded[1].interest_rate, Some(3.5));
    assert_eq!(loaded[1].end_date, original[1].end_date);
    assert!(!path.with_extension("json.tmp").exists());
}

#[test]
fn snapshot_rejects_invalid_records() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.json");
    let mut plans = sample();
    plans[0].payments_made = -1;
    fs::write(&path, serde_json::to_string(&plans).unwrap()).unwrap();

    assert!(matches!(
        load_installments(&path),
        Err(SnapshotError::Invalid(_))
    ));
}

#[test]
fn snapshot_rejects_unknown_frequency() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("yearly.json");
    let json = serde_json::to_string(&sample()).unwrap().replace("\"monthly\"", "\"yearly\"");
    fs::write(&path, json).unwrap();

    assert!(matches!(
        load_installments(&path),
        Err(SnapshotError::Serde(_))
    ));
}

#[test]
fn config_manager_defaults_then_persists() {
    let dir = tempdir().unwrap();
    let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
    assert_eq!(manager.load().unwrap(), Config::default());

    let mut config = Config::default();
    config.date_format = DateFormatStyle::Long;
    config.urgency.due_soon_days = 3;
    manager.save(&config).unwrap();

    let reloaded = manager.load().unwrap();
    assert_eq!(reloaded.date_format, DateFormatStyle::Long);
    assert_eq!(reloaded.urgency.due_soon_days, 3);
}

#[test]
fn config_accepts_sparse_files() {
    let dir = tempdir().unwrap();
    let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
    fs::write(manager.config_path(), r#"{ "locale": "pt-PT" }"#).unwrap();

    let config = manager.load().unwrap();
    assert_eq!(config.locale, "pt-PT");
    assert_eq!(config.urgency.due_soon_days, 7);
    assert!(config.color_enabled);
}
