use bytes::Bytes;
use std::fs;
use tempfile::tempdir;
use tsreseq_cli::commands::inspect;
use tsreseq_core::{analysis::ArrivalReport, builder::FramedBuilder, capture::encode_capture};

fn framed(frame: u16, sub: u16) -> Bytes {
    FramedBuilder::new(frame, sub)
        .payload(Bytes::from_static(b"payload"))
        .build()
        .unwrap()
}

#[test]
fn test_inspect_writes_json_report() {
    let dir = tempdir().unwrap();
    let datagrams = [
        framed(1, 0),
        framed(1, 2),
        framed(1, 1),
        framed(2, 0),
        framed(2, 3),
    ];
    let data = encode_capture(datagrams.iter().map(|d| d.as_ref())).unwrap();
    let input = dir.path().join("session.cap");
    fs::write(&input, data).unwrap();
    let json = dir.path().join("report.json");

    inspect::execute(input.to_str().unwrap(), Some(json.to_str().unwrap())).unwrap();

    let report: ArrivalReport = serde_json::from_str(&fs::read_to_string(&json).unwrap()).unwrap();
    assert_eq!(report.datagrams, 5);
    assert_eq!(report.framed, 5);
    assert_eq!(report.frames_seen, 2);
    assert_eq!(report.late_arrivals, 1);
    assert_eq!(report.turnovers, vec![1]);
    assert_eq!(report.missing_total(), 2);
}

#[test]
fn test_inspect_empty_capture() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("empty.cap");
    fs::write(&input, encode_capture(std::iter::empty()).unwrap()).unwrap();

    assert!(inspect::execute(input.to_str().unwrap(), None).is_ok());
}

#[test]
fn test_inspect_truncated_capture() {
    let dir = tempdir().unwrap();
    let mut data = encode_capture([framed(1, 0).as_ref()]).unwrap().to_vec();
    data.truncate(data.len() - 1);
    let input = dir.path().join("cut.cap");
    fs::write(&input, data).unwrap();

    assert!(inspect::execute(input.to_str().unwrap(), None).is_err());
}
