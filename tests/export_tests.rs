use chrono::{DateTime, Local, TimeZone};
use procwatch::WatchError;
use procwatch::export::{self, HEADER};
use procwatch::watch::Sample;

fn at(secs: i64, nanos: u32) -> DateTime<Local> {
    Local.timestamp_opt(1_760_000_000 + secs, nanos).unwrap()
}

fn series() -> Vec<Sample> {
    vec![
        Sample::new(at(0, 0), 7_340_032, Some(3.25)),
        Sample::new(at(3, 125_000_000), 7_345_152, Some(0.0)),
        Sample::new(at(6, 999_999_999), 7_400_000, Some(97.5)),
    ]
}

#[test]
fn exported_file_reads_back_identically() {
    let dir = tempfile::tempdir().unwrap();
    let samples = series();

    let name = export::export(dir.path(), "worker", &samples).unwrap();
    assert!(name.starts_with("worker_"));
    assert!(name.ends_with(".csv"));

    let path = dir.path().join(&name);
    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text.lines().next(), Some(HEADER));
    assert_eq!(text.lines().count(), samples.len() + 1);
    assert_eq!(export::read_export(&path).unwrap(), samples);
}

#[test]
fn memory_only_series_leaves_cpu_blank() {
    let dir = tempfile::tempdir().unwrap();
    let samples: Vec<Sample> = series()
        .into_iter()
        .map(|s| Sample::new(s.timestamp, s.memory, None))
        .collect();

    let name = export::export(dir.path(), "worker", &samples).unwrap();
    let path = dir.path().join(name);
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.lines().skip(1).all(|l| l.contains(",,")));
    assert_eq!(export::read_export(&path).unwrap(), samples);
}

#[test]
fn empty_series_is_rejected_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        export::export(dir.path(), "worker", &[]),
        Err(WatchError::NoDataToExport)
    ));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn missing_directory_reports_io_failure() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("does-not-exist");

    let err = export::export(&missing, "worker", &series()).unwrap_err();
    match err {
        WatchError::ExportIo { path, .. } => assert!(path.starts_with(&missing)),
        other => panic!("unexpected error: {other}"),
    }
    assert!(!missing.exists());
}

#[test]
fn process_name_cannot_escape_directory() {
    let dir = tempfile::tempdir().unwrap();
    let name = export::export(dir.path(), "../../etc/passwd", &series()).unwrap();
    assert!(!name.contains('/'));
    assert!(dir.path().join(&name).is_file());
}

#[test]
fn reexport_overwrites_same_file() {
    let dir = tempfile::tempdir().unwrap();
    let samples = series();

    let first = export::export(dir.path(), "worker", &samples).unwrap();
    let second = export::export(dir.path(), "worker", &samples).unwrap();
    assert_eq!(first, second);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}
