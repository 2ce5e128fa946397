//! In-process versions of the derived SQL views.
//!
//! [`expand_bands`] produces the same rows as the `stats_bands` view and
//! [`pair_spans`] the same rows as `note_spans`, but over typed records, so
//! callers that already hold records don't need another round trip.

use crate::models::{BandRow, NoteKind, NoteSpan, StoredNote, StoredStats};

/// Expand one sample into a row per (generation, band).
///
/// Generations come 4g first, bands in the order the gateway listed them.
pub fn expand_bands(record: &StoredStats) -> Vec<BandRow> {
    record
        .signal
        .iter()
        .flat_map(|(generation, info)| {
            info.bands.iter().map(move |band| BandRow {
                timestamp: record.timestamp,
                generation,
                band: band.clone(),
                bars: info.bars,
                sinr: info.sinr,
                rsrq: info.rsrq,
                rsrp: info.rsrp,
                rssi: info.rssi,
            })
        })
        .collect()
}

/// Attach span ends to notes.
///
/// Output is sorted by timestamp. A span start ends at the next span start
/// with a strictly later timestamp; plain notes never have an end.
pub fn pair_spans(notes: &[StoredNote]) -> Vec<NoteSpan> {
    let mut sorted: Vec<&StoredNote> = notes.iter().collect();
    sorted.sort_by_key(|note| note.timestamp);

    let starts: Vec<_> = sorted
        .iter()
        .filter(|note| note.kind == NoteKind::SpanStart)
        .map(|note| note.timestamp)
        .collect();

    sorted
        .into_iter()
        .map(|note| {
            let end = match note.kind {
                NoteKind::SpanStart => {
                    let next = starts.partition_point(|start| *start <= note.timestamp);
                    starts.get(next).copied()
                }
                NoteKind::Note => None,
            };
            NoteSpan {
                timestamp: note.timestamp,
                kind: note.kind,
                text: note.text.clone(),
                end,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{Duration, OffsetDateTime};
    use tmi_types::{Generation, SignalInfo, SignalMap};

    fn info(bands: &[&str], sinr: i64) -> SignalInfo {
        SignalInfo {
            bands: bands.iter().map(|b| b.to_string()).collect(),
            bars: 4,
            cid: 7,
            enbid: None,
            gnbid: None,
            rsrp: -98,
            rsrq: -11,
            rssi: -80,
            sinr,
        }
    }

    fn note(at: OffsetDateTime, kind: NoteKind, text: &str) -> StoredNote {
        StoredNote {
            timestamp: at,
            kind,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_expand_lte_only() {
        let record = StoredStats {
            timestamp: OffsetDateTime::UNIX_EPOCH,
            signal: SignalMap {
                four_g: Some(info(&["b2", "b66"], 9)),
                five_g: None,
            },
        };

        let rows = expand_bands(&record);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].band, "b2");
        assert_eq!(rows[1].band, "b66");
        assert!(rows.iter().all(|r| r.generation == Generation::FourG));
        assert!(rows.iter().all(|r| r.sinr == 9 && r.bars == 4));
    }

    #[test]
    fn test_expand_both_generations() {
        let record = StoredStats {
            timestamp: OffsetDateTime::UNIX_EPOCH,
            signal: SignalMap {
                four_g: Some(info(&["b66"], 3)),
                five_g: Some(info(&["n41", "n71"], 14)),
            },
        };

        let rows = expand_bands(&record);
        let keys: Vec<_> = rows
            .iter()
            .map(|r| (r.generation.as_str(), r.band.as_str(), r.sinr))
            .collect();
        assert_eq!(
            keys,
            vec![("4g", "b66", 3), ("5g", "n41", 14), ("5g", "n71", 14)]
        );
    }

    #[test]
    fn test_expand_empty_signal() {
        let record = StoredStats {
            timestamp: OffsetDateTime::UNIX_EPOCH,
            signal: SignalMap::default(),
        };
        assert!(expand_bands(&record).is_empty());
    }

    #[test]
    fn test_span_pairing() {
        let t1 = OffsetDateTime::UNIX_EPOCH;
        let t2 = t1 + Duration::minutes(5);
        let t3 = t1 + Duration::minutes(10);

        // Out of order on purpose
        let notes = vec![
            note(t3, NoteKind::SpanStart, "moved gateway upstairs"),
            note(t1, NoteKind::SpanStart, "window position"),
            note(t2, NoteKind::Note, "rain"),
        ];

        let spans = pair_spans(&notes);
        assert_eq!(spans.len(), 3);
        assert_eq!((spans[0].timestamp, spans[0].end), (t1, Some(t3)));
        assert_eq!((spans[1].timestamp, spans[1].end), (t2, None));
        assert_eq!((spans[2].timestamp, spans[2].end), (t3, None));
        assert_eq!(spans[1].text, "rain");
    }

    #[test]
    fn test_plain_notes_only() {
        let t = OffsetDateTime::UNIX_EPOCH;
        let spans = pair_spans(&[
            note(t, NoteKind::Note, "a"),
            note(t + Duration::SECOND, NoteKind::Note, "b"),
        ]);
        assert!(spans.iter().all(|s| s.end.is_none()));
    }
}
