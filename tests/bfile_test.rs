use rasbfile::{
    BFile, BFileError, Block, FragilityResult, FragilityResults, StructureLookup,
    UnknownStructurePolicy,
};
use std::fs;
use tempfile::NamedTempFile;

const OUTLET_HEADER: &str = "Outlet TS - SA Conn: SuttonDam (Outlet TS: SuttonDam_OUT)";

fn first_row(id: i64, method: i64, mass_wasting: i64) -> String {
    (0..16)
        .map(|c| match c {
            0  => id,
            9  => method,
            13 => mass_wasting,
            _  => 0,
        })
        .map(|v| format!("{:>8}", v))
        .collect()
}

fn flow_rows(count: usize) -> Vec<String> {
    let pairs: Vec<String> = (0..count)
        .map(|i| format!("{:>8}{:>8.1}", i, 250.0 + i as f64))
        .collect();
    pairs.chunks(5).map(|c| c.concat()).collect()
}

/// A small b-file: two plain blocks, a breach-data block with a plain and
/// a mass-wasting/simplified-physical structure, an outlet series closed by
/// the sentinel, and a trailing block whose rows are not cell-aligned.
fn sample_lines() -> Vec<String> {
    let mut lines: Vec<String> = [
        "RAS Version 6.40",
        "   12.00       1       0",
        "Unsteady Run Data",
        "       3       0",
        "Breach Data",
        "       2",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    lines.push(first_row(2, 0, 0));
    for s in [
        "  0.5000  1.0000",
        "  640.00  600.00",
        "       7",
        "       0  0.2500  0.5000  0.7500  1.0000",
        "  1.2500  1.5000",
    ] {
        lines.push(s.to_string());
    }

    lines.push(first_row(5, 1, 1));
    for s in [
        "  0.5000",
        "  2.0000",
        "  512.25",
        "       5",
        "  0.1000  0.2000  0.3000  0.4000  0.5000",
        "       6",
        "  0.1000  0.2000  0.3000  0.4000  0.5000",
        "  0.6000",
        "        ",
    ] {
        lines.push(s.to_string());
    }

    lines.push(OUTLET_HEADER.to_string());
    lines.push("      12".to_string());
    lines.extend(flow_rows(12));
    lines.push(" 3.4E+38".to_string());
    lines.push("       1".to_string());

    lines.push("Flow Data 2".to_string());
    lines.push("   free text, not cells".to_string());
    lines
}

fn sample_bytes(ending: &str, final_newline: bool) -> Vec<u8> {
    let mut text = sample_lines().join(ending);
    if final_newline {
        text.push_str(ending);
    }
    text.into_bytes()
}

fn lookup() -> StructureLookup {
    [("Upper Dam", 2), ("Lower Dam", 5), ("Ghost Dam", 99)].into_iter().collect()
}

#[test]
fn test_round_trip_identity() {
    for (ending, final_newline) in [("\n", true), ("\n", false), ("\r\n", true), ("\r\n", false)] {
        let bytes = sample_bytes(ending, final_newline);
        let bf = BFile::decode(&bytes).unwrap();
        assert_eq!(bf.encode(), bytes, "ending {:?}, final newline {}", ending, final_newline);
    }
}

#[test]
fn test_empty_and_blank_inputs_round_trip() {
    let inputs: [&[u8]; 4] = [b"", b"\n", b"\n\n   \n", b"   1"];
    for bytes in inputs {
        assert_eq!(BFile::decode(bytes).unwrap().encode(), bytes);
    }
}

#[test]
fn test_high_bytes_in_headers_survive() {
    let mut bytes = b"Plan Title: Barrage de l'".to_vec();
    bytes.push(0xC9);
    bytes.extend_from_slice(b"tang\n       1\n");
    let bf = BFile::decode(&bytes).unwrap();
    assert_eq!(bf.encode(), bytes);
}

#[test]
fn test_blocks_decode_in_order() {
    let bf = BFile::decode(&sample_bytes("\n", true)).unwrap();
    let kinds: Vec<&str> = bf.blocks().iter().map(Block::kind).collect();
    assert_eq!(kinds, ["default", "default", "breach-data", "outlet-ts", "default"]);

    let ids: Vec<i64> = bf.breach_structures().map(|s| s.structure_id()).collect();
    assert_eq!(ids, [2, 5]);
    assert_eq!(bf.structure(2).unwrap().layout().row_span, 6);
    assert_eq!(bf.structure(5).unwrap().layout().row_span, 9);
    assert_eq!(bf.structure(5).unwrap().failure_elevation(), Some(512.25));

    match &bf.blocks()[2] {
        Block::BreachData(bd) => assert_eq!(bd.trailing_lines(), ["        "]),
        other => panic!("expected breach data, got {}", other.kind()),
    }

    let ts = bf.find_outlet("SuttonDam_OUT").unwrap();
    assert_eq!(ts.declared_row_count(), 12);
    assert_eq!(ts.series().count(), 12);
    assert_eq!(ts.pairs()[11].flow(), 261.0);
    assert_eq!(ts.trailing_lines(), [" 3.4E+38", "       1"]);
}

#[test]
fn test_amend_changes_exactly_one_cell() {
    let before = sample_bytes("\r\n", true);
    let mut bf = BFile::decode(&before).unwrap().with_lookup(lookup());
    bf.amend_breach_failure_elevation("Upper Dam", 999.0).unwrap();
    let after = bf.encode();
    assert_eq!(before.len(), after.len());

    let cell_start = String::from_utf8(before.clone()).unwrap().find("  640.00  600.00").unwrap();
    let changed: Vec<usize> = (0..before.len()).filter(|&i| before[i] != after[i]).collect();
    assert!(!changed.is_empty());
    assert!(changed.iter().all(|&i| (cell_start..cell_start + 8).contains(&i)));
    assert_eq!(&after[cell_start..cell_start + 8], b"999.0000");
    assert_eq!(bf.structure(2).unwrap().failure_elevation(), Some(999.0));
}

#[test]
fn test_amend_mass_wasting_structure_uses_row_three() {
    let mut bf = BFile::decode(&sample_bytes("\n", true)).unwrap().with_lookup(lookup());
    bf.amend_breach_failure_elevation("Lower Dam", 498.123456789).unwrap();
    let text = String::from_utf8(bf.encode()).unwrap();
    assert!(text.contains("\n498.1234\n       5\n"));
    assert!(text.contains("\n  640.00  600.00\n"));
}

#[test]
fn test_unknown_structure_leaves_file_untouched() {
    let bytes = sample_bytes("\n", true);
    let mut bf = BFile::decode(&bytes).unwrap().with_lookup(lookup());

    let err = bf.amend_breach_failure_elevation("Nowhere Dam", 1.0).unwrap_err();
    assert!(matches!(err, BFileError::UnknownStructure(ref n) if n == "Nowhere Dam"));
    // In the lookup, but no record carries id 99.
    let err = bf.amend_breach_failure_elevation("Ghost Dam", 1.0).unwrap_err();
    assert!(matches!(err, BFileError::UnknownStructure(_)));
    assert!(bf.amend_breach_failure_elevation_by_id(42, 1.0).is_err());

    assert_eq!(bf.encode(), bytes);
}

#[test]
fn test_amend_without_lookup_is_unknown() {
    let mut bf = BFile::decode(&sample_bytes("\n", true)).unwrap();
    assert!(bf.lookup().is_empty());
    assert!(matches!(
        bf.amend_breach_failure_elevation("Upper Dam", 1.0),
        Err(BFileError::UnknownStructure(_))
    ));
    bf.amend_breach_failure_elevation_by_id(2, 700.5).unwrap();
    assert_eq!(bf.structure(2).unwrap().failure_elevation(), Some(700.5));
}

#[test]
fn test_outlet_flow_replacement() {
    let bytes = sample_bytes("\n", true);
    let mut bf = BFile::decode(&bytes).unwrap();

    let err = bf.amend_outlet_flows("SuttonDam", &[1.0; 11]).unwrap_err();
    assert!(matches!(err, BFileError::LengthMismatch { expected: 12, actual: 11 }));
    assert!(bf.amend_outlet_flows("SuttonDam", &[1.0; 13]).is_err());
    assert_eq!(bf.encode(), bytes);

    assert!(matches!(
        bf.amend_outlet_flows("Bluestone", &[1.0; 12]),
        Err(BFileError::UnknownSeries(_))
    ));

    let flows: Vec<f64> = (0..12).map(|i| 3000.0 + i as f64 * 10.0).collect();
    bf.amend_outlet_flows("SuttonDam_OUT", &flows).unwrap();
    let ts = bf.find_outlet("SuttonDam").unwrap();
    assert_eq!(ts.flows(), flows);
    let indexes: Vec<f64> = ts.series().map(|(i, _)| i).collect();
    assert_eq!(indexes, (0..12).map(f64::from).collect::<Vec<_>>());

    let text = String::from_utf8(bf.encode()).unwrap();
    assert!(text.contains("\n       03000.000       13010.000"));
    assert!(text.contains("\n 3.4E+38\n       1\nFlow Data 2\n"));
}

#[test]
fn test_batch_policy() {
    let results = FragilityResults {
        results: vec![
            FragilityResult { name: "Nowhere Dam".into(), failure_elevation: 1.0 },
            FragilityResult { name: "Upper Dam".into(), failure_elevation: 645.5 },
        ],
    };

    let mut bf = BFile::decode(&sample_bytes("\n", true)).unwrap().with_lookup(lookup());
    let err = bf.apply_failure_elevations(&results, UnknownStructurePolicy::Abort).unwrap_err();
    assert!(matches!(err, BFileError::UnknownStructure(_)));
    assert_eq!(bf.structure(2).unwrap().failure_elevation(), Some(640.0));

    let report = bf.apply_failure_elevations(&results, UnknownStructurePolicy::Skip).unwrap();
    assert_eq!(report.applied, ["Upper Dam"]);
    assert_eq!(report.skipped, ["Nowhere Dam"]);
    assert_eq!(bf.structure(2).unwrap().failure_elevation(), Some(645.5));
}

#[test]
fn test_malformed_breach_row_fails_decode() {
    let mut lines = sample_lines();
    lines[7] = "  0.5000 1.0".to_string();
    let err = BFile::decode(lines.join("\n").as_bytes()).unwrap_err();
    assert!(matches!(err, BFileError::MalformedRow { line: 8, len: 12 }));
}

#[test]
fn test_oversized_counts_return_errors() {
    assert!(matches!(
        BFile::decode(b"Breach Data\n99999999\n"),
        Err(BFileError::TruncatedBlock { line: 1, needed: 2, available: 1 })
    ));
    assert!(matches!(
        BFile::decode(b"Outlet TS - X\n    99999999999999999\n       0   1.000\n"),
        Err(BFileError::MalformedRow { line: 3, .. })
    ));
}

#[test]
fn test_mixed_line_endings_rejected() {
    let mut bytes = sample_bytes("\n", true);
    bytes.splice(0..0, b"Title\r\n".iter().copied());
    assert!(matches!(BFile::decode(&bytes), Err(BFileError::MixedLineEndings { line: 2 })));
}

#[test]
fn test_open_amend_save() {
    let temp = NamedTempFile::new().unwrap();
    fs::write(temp.path(), sample_bytes("\r\n", true)).unwrap();

    let mut bf = BFile::open(temp.path()).unwrap().with_lookup(lookup());
    bf.amend_breach_failure_elevation("Lower Dam", 520.0).unwrap();
    bf.save(temp.path()).unwrap();

    let reread = BFile::open(temp.path()).unwrap();
    assert_eq!(reread.structure(5).unwrap().failure_elevation(), Some(520.0));
    assert_eq!(reread.line_ending(), rasbfile::segment::LineEnding::CrLf);
    assert_eq!(fs::read(temp.path()).unwrap(), reread.encode());
}

#[test]
fn test_lookup_and_fragility_files() {
    let names = NamedTempFile::new().unwrap();
    fs::write(names.path(), r#"["Spillway", "Upper Dam", "Lock 2", "Levee", "Lower Dam"]"#).unwrap();
    let table = StructureLookup::from_connections_file(names.path()).unwrap();
    assert_eq!(table.get("Upper Dam"), Some(3));
    assert_eq!(table.get("Lower Dam"), Some(6));

    let fc = NamedTempFile::new().unwrap();
    fs::write(fc.path(), r#"{"results":[{"location":"Upper Dam","failure_elevation":611.0}]}"#)
        .unwrap();
    let results = FragilityResults::from_json_file(fc.path()).unwrap();

    let mut bf = BFile::decode(&sample_bytes("\n", true)).unwrap().with_lookup(lookup());
    bf.apply_failure_elevations(&results, UnknownStructurePolicy::Abort).unwrap();
    assert_eq!(bf.structure(2).unwrap().failure_elevation(), Some(611.0));
}
