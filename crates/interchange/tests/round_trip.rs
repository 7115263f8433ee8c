use std::path::PathBuf;

use proptest::prelude::*;

use hypescan_chat_model::highlight::{Highlight, HighlightKind};
use hypescan_interchange::{
    convert_to_markers, highlights_to_string, import_highlights, CsvFormat,
};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("fixtures")
        .join(name)
}

fn arb_highlights() -> impl Strategy<Value = Vec<Highlight>> {
    prop::collection::vec(
        (
            -100.0f64..100_000.0,
            0.0f64..600.0,
            -1.0e6f64..1.0e6,
            prop::bool::ANY,
        ),
        1..50,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .map(|(start, span, score, peak)| {
                let kind = if peak {
                    HighlightKind::Peak
                } else {
                    HighlightKind::Valley
                };
                Highlight::new(kind, start, score).with_end(start + span)
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn highlight_table_round_trips(highlights in arb_highlights()) {
        let csv = highlights_to_string(&highlights, CsvFormat::Highlights).unwrap();
        let (imported, stats) = import_highlights(csv.as_bytes()).unwrap();

        prop_assert_eq!(stats.skipped(), 0);
        prop_assert_eq!(imported, highlights);
    }

    #[test]
    fn marker_list_keeps_start_times(highlights in arb_highlights()) {
        let csv = highlights_to_string(&highlights, CsvFormat::Markers).unwrap();
        let (imported, _) = import_highlights(csv.as_bytes()).unwrap();

        let expected: Vec<f64> = highlights.iter().map(|h| h.timestamp_secs).collect();
        let actual: Vec<f64> = imported.iter().map(|h| h.timestamp_secs).collect();
        prop_assert_eq!(actual, expected);
    }
}

#[test]
fn exported_table_converts_to_whole_second_markers() {
    let highlights = vec![
        Highlight::new(HighlightKind::Peak, 100.0, 24.0).with_end(110.0),
        Highlight::new(HighlightKind::Valley, 4321.9, 0.0).with_end(4400.0),
    ];
    let csv = highlights_to_string(&highlights, CsvFormat::Highlights).unwrap();

    let mut markers = Vec::new();
    let stats = convert_to_markers(csv.as_bytes(), &mut markers).unwrap();

    assert_eq!(stats.converted, 2);
    assert_eq!(String::from_utf8(markers).unwrap(), "100\n4321\n");
}

#[test]
fn legacy_export_converts_and_imports() {
    let content = std::fs::read_to_string(fixture("highlights-legacy.csv")).unwrap();

    let mut markers = Vec::new();
    let stats = convert_to_markers(content.as_bytes(), &mut markers).unwrap();
    assert_eq!(stats.converted, 4);
    assert_eq!(String::from_utf8(markers).unwrap(), "95\n1210\n1800\n2712\n");

    // Rate names are not highlight kinds; the rows still import as peaks.
    let (highlights, stats) = import_highlights(content.as_bytes()).unwrap();
    assert_eq!(stats.imported, 4);
    assert_eq!(stats.defaulted, 4);
    assert_eq!(stats.skipped(), 0);
    assert!(highlights.iter().all(Highlight::is_peak));

    let starts: Vec<f64> = highlights.iter().map(|h| h.timestamp_secs).collect();
    assert_eq!(starts, vec![95.0, 1210.0, 1800.0, 2712.0]);
    let scores: Vec<f64> = highlights.iter().map(|h| h.score).collect();
    assert_eq!(scores, vec![18.5, 42.0, 0.0, 7.25]);
    assert_eq!(highlights[0].end_secs, 125.0);
}
