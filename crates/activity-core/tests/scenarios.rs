use hypescan_activity_core::{DetectionConfig, HighlightDetector, HighlightPipeline};
use hypescan_chat_model::activity::ActivityBucket;
use hypescan_chat_model::emote::EmoteWeightTable;
use hypescan_chat_model::highlight::HighlightKind;
use hypescan_chat_model::message::{RawRecord, RawTimestamp};
use hypescan_common::error::{HypescanError, RecordError};
use hypescan_ingest::formats::source_from_reader;
use hypescan_ingest::{LocatedRecord, LogFormat, SourceItem};

fn chat(line: usize, t: f64, text: &str) -> SourceItem {
    Ok(LocatedRecord {
        line,
        record: RawRecord::new(RawTimestamp::Seconds(t), format!("viewer{line}"), text),
    })
}

fn config(peak: f64, valley: f64, separation: f64) -> DetectionConfig {
    DetectionConfig {
        interval_width_secs: 10.0,
        peak_threshold: peak,
        valley_threshold: valley,
        min_separation_secs: separation,
        emote_weights: EmoteWeightTable::empty(),
    }
}

#[test]
fn single_spike_yields_one_peak() {
    let records: Vec<SourceItem> = (0..50)
        .map(|i| chat(i + 1, 100.0 + (i % 6) as f64 * 0.9, "wow"))
        .collect();

    let pipeline = HighlightPipeline::new(config(20.0, 0.0, 30.0)).unwrap();
    let report = pipeline.run(records).unwrap();

    assert_eq!(report.buckets.len(), 1);
    assert_eq!(report.highlights.len(), 1);
    let peak = report.highlights[0];
    assert_eq!(peak.kind, HighlightKind::Peak);
    assert_eq!(peak.timestamp_secs, 100.0);
    assert_eq!(peak.score, 50.0);
    assert!(report.warnings.is_empty());
}

#[test]
fn sustained_silence_collapses_to_one_valley() {
    let mut buckets: Vec<ActivityBucket> = (0..10)
        .map(|i| ActivityBucket::empty(i as f64 * 10.0, 10.0))
        .collect();
    buckets.push(ActivityBucket {
        start_secs: 100.0,
        end_secs: 110.0,
        raw_count: 5,
        weighted_score: 5.0,
    });

    let detector = HighlightDetector::from_config(&config(20.0, 0.0, 30.0)).unwrap();
    let highlights = detector.detect(&buckets);

    assert_eq!(highlights.len(), 1);
    assert_eq!(highlights[0].kind, HighlightKind::Valley);
    assert_eq!(highlights[0].timestamp_secs, 0.0);
    assert_eq!(highlights[0].end_secs, 100.0);
}

#[test]
fn silence_between_messages_is_one_valley() {
    let mut records = vec![chat(1, 0.0, "first")];
    records.extend((0..5).map(|i| chat(i + 2, 110.0 + i as f64, "back")));

    let pipeline = HighlightPipeline::new(config(20.0, 0.0, 30.0)).unwrap();
    let report = pipeline.run(records).unwrap();

    assert_eq!(report.buckets.len(), 12);
    assert_eq!(report.highlights.len(), 1);
    assert_eq!(report.highlights[0].kind, HighlightKind::Valley);
    assert_eq!(report.highlights[0].timestamp_secs, 10.0);
    assert_eq!(report.highlights[0].end_secs, 110.0);
}

#[test]
fn empty_log_is_reported() {
    let pipeline = HighlightPipeline::new(config(20.0, 0.0, 30.0)).unwrap();
    let err = pipeline.run(Vec::<SourceItem>::new()).unwrap_err();
    assert!(matches!(err, HypescanError::EmptyLog { skipped: 0 }));
}

#[test]
fn log_of_only_bad_lines_is_reported_with_skip_count() {
    let pipeline = HighlightPipeline::new(config(20.0, 0.0, 30.0)).unwrap();
    let records = vec![
        Err(RecordError::malformed(1, "not a chat line")),
        Ok(LocatedRecord {
            line: 2,
            record: RawRecord {
                timestamp: Some(RawTimestamp::Text("later".into())),
                author: Some("a".into()),
                text: Some("b".into()),
                emotes: vec![],
            },
        }),
    ];
    let err = pipeline.run(records).unwrap_err();
    assert!(matches!(err, HypescanError::EmptyLog { skipped: 2 }));
}

#[test]
fn emote_weights_multiply_excitement() {
    let weights = EmoteWeightTable::from_entries(["KEKW=3", "OMEGALUL=3"]).unwrap();
    let detection = DetectionConfig {
        emote_weights: weights,
        ..config(7.0, -1.0, 30.0)
    };
    let records = vec![chat(1, 4.0, "KEKW OMEGALUL KEKW")];

    let report = HighlightPipeline::new(detection).unwrap().run(records).unwrap();

    assert_eq!(report.buckets[0].raw_count, 1);
    assert_eq!(report.buckets[0].weighted_score, 7.0);
    assert_eq!(report.highlights.len(), 1);
    assert!(report.highlights[0].is_peak());
}

#[test]
fn threshold_boundaries_classify_inclusively() {
    let buckets = vec![
        ActivityBucket {
            start_secs: 0.0,
            end_secs: 10.0,
            raw_count: 20,
            weighted_score: 20.0,
        },
        ActivityBucket {
            start_secs: 10.0,
            end_secs: 20.0,
            raw_count: 10,
            weighted_score: 10.0,
        },
        ActivityBucket {
            start_secs: 20.0,
            end_secs: 30.0,
            raw_count: 2,
            weighted_score: 2.0,
        },
    ];

    let detector = HighlightDetector::from_config(&config(20.0, 2.0, 5.0)).unwrap();
    assert_eq!(detector.classify(&buckets[0]), Some(HighlightKind::Peak));
    assert_eq!(detector.classify(&buckets[1]), None);
    assert_eq!(detector.classify(&buckets[2]), Some(HighlightKind::Valley));

    let same = HighlightDetector::from_config(&config(10.0, 10.0, 5.0)).unwrap();
    assert_eq!(same.classify(&buckets[1]), Some(HighlightKind::Peak));
}

#[test]
fn invalid_interval_is_rejected_before_input_is_read() {
    let mut reads = 0;
    let records = std::iter::from_fn(|| {
        reads += 1;
        None::<SourceItem>
    });

    let result = HighlightPipeline::new(DetectionConfig {
        interval_width_secs: 0.0,
        ..config(20.0, 0.0, 30.0)
    })
    .and_then(|pipeline| pipeline.run(records));

    assert!(matches!(result, Err(HypescanError::InvalidInterval { .. })));
    assert_eq!(reads, 0);
}

#[test]
fn zero_qualifying_buckets_is_an_empty_result() {
    let records: Vec<SourceItem> = (0..30).map(|i| chat(i + 1, i as f64, "steady")).collect();
    let report = HighlightPipeline::new(config(100.0, -1.0, 30.0))
        .unwrap()
        .run(records)
        .unwrap();

    assert!(report.highlights.is_empty());
    assert_eq!(report.ingest.parsed, 30);
    assert_eq!(report.detection.runs, 0);
}

#[test]
fn corrupt_timestamps_are_skipped_not_fatal() {
    let pipeline = HighlightPipeline::new(config(20.0, 0.0, 30.0)).unwrap();
    let logs = [
        "[0:00:01] a: hi\n[99999999999999999:00:00] b: junk\n[0:00:02] c: ok\n",
        "[0] a: hi\n[1e300] b: junk\n[2] c: ok\n",
    ];

    for log in logs {
        let source = source_from_reader(std::io::Cursor::new(log), LogFormat::Text).unwrap();
        let report = pipeline.run(source).unwrap();

        assert_eq!(report.ingest.parsed, 2);
        assert_eq!(report.ingest.skipped(), 1);
        assert_eq!(report.ingest.errors.sample[0].line, 2);
        assert_eq!(report.buckets.len(), 1);
    }
}

#[test]
fn oversized_grid_is_an_error_not_an_allocation() {
    let mut settings = config(20.0, 0.0, 30.0);
    settings.interval_width_secs = 0.01;
    let pipeline = HighlightPipeline::new(settings).unwrap();

    // Six days apart at 10 ms per bucket is far past the bucket cap.
    let records = vec![chat(1, 0.0, "hi"), chat(2, 6.0 * 24.0 * 3600.0, "hi")];
    let err = pipeline.run(records).unwrap_err();
    assert!(matches!(err, HypescanError::SeriesTooLong { .. }));
}
