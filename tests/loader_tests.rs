use std::fs;
use std::path::Path;

use shift_scheduler::config::ScheduleConfig;
use shift_scheduler::error::LoadError;
use shift_scheduler::parser::load_roster;
use shift_scheduler::schedule::Scheduler;

fn small_config() -> ScheduleConfig {
    ScheduleConfig {
        days: vec!["Monday".into(), "Tuesday".into()],
        shifts: vec!["AM".into(), "PM".into()],
        workers_per_shift: vec![vec![1, 1], vec![1, 2]],
        ..ScheduleConfig::default()
    }
}

fn write_worker(dir: &Path, file: &str, contents: &str) {
    fs::write(dir.join(file), contents).unwrap();
}

#[test]
fn test_load_and_schedule_directory() {
    let dir = tempfile::tempdir().unwrap();
    write_worker(
        dir.path(),
        "ana.txt",
        "Ana\n2\n\nMonday AM 0.9\nMonday PM 0.4\nTuesday PM 0.7\n\nBo\n",
    );
    write_worker(
        dir.path(),
        "bo.txt",
        "Bo\n2\n\nMonday PM 0.8\nTuesday AM 0.6\nTuesday PM 0.5\n\nAna\n",
    );
    write_worker(dir.path(), ".notes", "not a worker");

    let config = small_config();
    let (roster, shortfalls) = load_roster(dir.path(), &config, false).unwrap();
    assert!(shortfalls.is_empty());
    assert_eq!(roster.num_workers(), 2);
    assert_eq!(roster.workers()[0].name, "Ana");
    assert_eq!(roster.num_slots(), 6);

    let result = Scheduler::new(&roster, &config.policy).run(1).unwrap();
    let mut both = result.assigned("Tuesday", "PM").to_vec();
    both.sort();
    assert_eq!(both, vec!["Ana".to_string(), "Bo".to_string()]);
    assert_eq!(result.assigned("Monday", "AM"), ["Ana".to_string()]);
    assert_eq!(result.assigned("Tuesday", "AM"), ["Bo".to_string()]);
}

#[test]
fn test_shortfall_is_an_error_unless_accepted() {
    let dir = tempfile::tempdir().unwrap();
    write_worker(
        dir.path(),
        "ana.txt",
        "Ana\n4\n\nMonday AM 0.9\nMonday PM 0.4\nTuesday AM 0.3\nTuesday PM 0.7\n",
    );
    let config = small_config();

    match load_roster(dir.path(), &config, false) {
        Err(LoadError::InsufficientSupply(shortfalls)) => {
            assert_eq!(shortfalls.len(), 1);
            assert_eq!(shortfalls[0].day, "Tuesday");
            assert_eq!(shortfalls[0].shift, "PM");
            assert_eq!(shortfalls[0].required, 2);
            assert_eq!(shortfalls[0].available, 1);
        }
        other => panic!("expected a supply error, got {:?}", other.map(|(_, s)| s)),
    }

    let (roster, shortfalls) = load_roster(dir.path(), &config, true).unwrap();
    assert_eq!(shortfalls.len(), 1);
    assert!(roster.supply_shortfalls().is_empty());

    let result = Scheduler::new(&roster, &config.policy).run(5).unwrap();
    assert_eq!(result.assigned("Tuesday", "PM"), ["Ana".to_string()]);
}

#[test]
fn test_malformed_worker_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    write_worker(dir.path(), "ana.txt", "Ana\nmany\n\nMonday AM 0.9\n");

    let err = load_roster(dir.path(), &small_config(), true).unwrap_err();
    assert!(matches!(err, LoadError::Malformed { .. }), "{}", err);
}

#[test]
fn test_duplicate_worker_names_are_fatal() {
    let dir = tempfile::tempdir().unwrap();
    write_worker(dir.path(), "a.txt", "Ana\n1\n\nMonday AM 0.9\n");
    write_worker(dir.path(), "b.txt", "Ana\n1\n\nMonday PM 0.9\n");

    let err = load_roster(dir.path(), &small_config(), true).unwrap_err();
    assert!(matches!(err, LoadError::DuplicateWorker(ref name) if name == "Ana"));
}

#[test]
fn test_config_file_overrides_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(
        &path,
        r#"{"days": ["Sat"], "shifts": ["Day"], "workers_per_shift": [[1]], "printing": {"padding": 1}}"#,
    )
    .unwrap();

    let config = ScheduleConfig::load(&path).unwrap();
    assert_eq!(config.days, vec!["Sat".to_string()]);
    assert_eq!(config.printing.padding, 1);
    assert!(!config.printing.center_left);
    assert_eq!(config.policy, ScheduleConfig::default().policy);
}

#[test]
fn test_config_with_mismatched_table_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{"days": ["Sat", "Sun"], "shifts": ["Day"], "workers_per_shift": [[1]]}"#).unwrap();

    assert!(ScheduleConfig::load(&path).is_err());
}
