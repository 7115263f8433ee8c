//! Hypescan Log Ingestor
//!
//! Turns raw chat records into validated [`Message`]s. Record sources are
//! pluggable so any log layout can feed the pipeline:
//!
//! - **Downloader JSON:** the chat dump written by VOD downloaders
//! - **JSONL:** one normalized record per line
//! - **Text:** `[h:mm:ss] author: message` lines
//!
//! Ingestion is lazy and single-pass. Malformed records are skipped and
//! counted; they never abort a run.

pub mod formats;

use hypescan_chat_model::emote::EmoteWeightTable;
use hypescan_chat_model::message::{Message, RawRecord};
use hypescan_common::error::{
    HypescanError, HypescanResult, RecordError, RecordErrorKind, RecordErrorSummary,
};
use serde::{Deserialize, Serialize};

pub use formats::{open_log, LogFormat};

/// A raw record with its position in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct LocatedRecord {
    /// 1-based line or record number.
    pub line: usize,
    pub record: RawRecord,
}

/// Latest accepted message offset: one week of broadcast.
///
/// Records stamped later than this are corrupt and are skipped like any
/// other bad timestamp.
pub const MAX_OFFSET_SECS: f64 = 7.0 * 24.0 * 3600.0;

/// What a record source yields for each entry in the log.
pub type SourceItem = Result<LocatedRecord, RecordError>;

/// Trait for chat log readers.
pub trait RecordSource: Iterator<Item = SourceItem> {
    /// Source name for logging.
    fn name(&self) -> &str;
}

/// Counters for one ingestion pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngestStats {
    /// Records read from the source, valid or not.
    pub records_seen: usize,
    /// Records that became messages.
    pub parsed: usize,
    /// Messages whose timestamp went backwards relative to an earlier one.
    pub out_of_order: usize,
    /// Rejected records.
    pub errors: RecordErrorSummary,
}

impl IngestStats {
    pub fn skipped(&self) -> usize {
        self.errors.count
    }
}

/// Validates raw records and tags emotes.
pub struct Ingestor<'a> {
    emotes: &'a EmoteWeightTable,
}

impl<'a> Ingestor<'a> {
    pub fn new(emotes: &'a EmoteWeightTable) -> Self {
        Self { emotes }
    }

    /// Lazily convert records into messages.
    pub fn messages<I>(&self, records: I) -> Messages<'a, I::IntoIter>
    where
        I: IntoIterator<Item = SourceItem>,
    {
        Messages {
            records: records.into_iter(),
            emotes: self.emotes,
            stats: IngestStats::default(),
            latest_secs: None,
        }
    }

    /// Convert every record, failing with `EmptyLog` if none survive.
    pub fn collect<I>(&self, records: I) -> HypescanResult<(Vec<Message>, IngestStats)>
    where
        I: IntoIterator<Item = SourceItem>,
    {
        let mut messages = self.messages(records);
        let collected: Vec<Message> = messages.by_ref().collect();
        let stats = messages.into_stats();
        if collected.is_empty() {
            return Err(HypescanError::EmptyLog {
                skipped: stats.skipped(),
            });
        }
        Ok((collected, stats))
    }

    /// Validate a single record.
    pub fn normalize(&self, located: LocatedRecord) -> Result<Message, RecordError> {
        let LocatedRecord { line, record } = located;

        let raw_ts = record
            .timestamp
            .ok_or_else(|| RecordError::missing_field(line, "timestamp"))?;
        let timestamp = raw_ts
            .to_secs()
            .ok_or_else(|| RecordError::bad_timestamp(line, &raw_ts))?;
        if timestamp > MAX_OFFSET_SECS {
            return Err(RecordError::new(
                line,
                RecordErrorKind::BadTimestamp,
                format!("timestamp `{raw_ts}` is past the {MAX_OFFSET_SECS}s limit"),
            ));
        }

        let author = record
            .author
            .filter(|a| !a.trim().is_empty())
            .ok_or_else(|| RecordError::missing_field(line, "author"))?;
        let text = record
            .text
            .ok_or_else(|| RecordError::missing_field(line, "text"))?;

        let mut emotes = self.emotes.detect(&text);
        for tagged in record.emotes {
            let tagged = tagged.trim();
            if tagged.is_empty() {
                continue;
            }
            let id = self.emotes.canonical(tagged).unwrap_or(tagged).to_string();
            emotes.insert(id);
        }

        Ok(Message {
            timestamp,
            author,
            text,
            emotes,
        })
    }
}

/// Lazy message iterator over a record source.
pub struct Messages<'a, I> {
    records: I,
    emotes: &'a EmoteWeightTable,
    stats: IngestStats,
    latest_secs: Option<f64>,
}

impl<'a, I> Messages<'a, I> {
    pub fn stats(&self) -> &IngestStats {
        &self.stats
    }

    pub fn into_stats(self) -> IngestStats {
        self.stats
    }
}

impl<'a, I> Iterator for Messages<'a, I>
where
    I: Iterator<Item = SourceItem>,
{
    type Item = Message;

    fn next(&mut self) -> Option<Message> {
        loop {
            let item = self.records.next()?;
            self.stats.records_seen += 1;

            let normalized =
                item.and_then(|located| Ingestor::new(self.emotes).normalize(located));
            match normalized {
                Ok(message) => {
                    match self.latest_secs {
                        Some(latest) if message.timestamp < latest => {
                            if self.stats.out_of_order == 0 {
                                tracing::warn!(
                                    at = message.timestamp,
                                    after = latest,
                                    "Chat log timestamps are not monotonic"
                                );
                            }
                            self.stats.out_of_order += 1;
                        }
                        _ => self.latest_secs = Some(message.timestamp),
                    }
                    self.stats.parsed += 1;
                    return Some(message);
                }
                Err(error) => {
                    tracing::debug!(%error, "Skipping chat record");
                    self.stats.errors.record(error);
                }
            }
        }
    }
}
