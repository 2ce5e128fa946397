//! Output formatting for the terminal.

use std::fmt::Write as _;

use anyhow::Result;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use tmi_core::SpeedTestRun;
use tmi_store::{BandRow, NoteKind, NoteSpan, StoredSpeedTest};
use tmi_types::SignalMap;

/// Human-readable bandwidth, in bits per second, to three significant digits.
///
/// `bytes_per_second` is what the speed-test tool reports.
pub fn format_speed(bytes_per_second: u64) -> String {
    let mut value = bytes_per_second as f64 * 8.0;
    let mut units = ["bps", "Kbps", "Mbps", "Gbps"].as_slice();

    while units.len() > 1 && value > 1000.0 {
        value /= 1000.0;
        units = &units[1..];
    }

    format!("{} {}", precision3(value), units[0])
}

/// Render a number with three significant digits, like `toPrecision(3)`.
fn precision3(value: f64) -> String {
    if value == 0.0 {
        return "0.00".to_string();
    }
    let digits = value.abs().log10().floor() as i32 + 1;
    let decimals = (3 - digits).max(0) as usize;
    let rounded = format!("{value:.decimals$}");

    // Rounding can carry into a new digit (99.96 -> 100.0); re-trim in that case
    if rounded.trim_start_matches('-').replace('.', "").trim_start_matches('0').len() > 3
        && decimals > 0
    {
        format!("{:.*}", decimals - 1, value)
    } else {
        rounded
    }
}

pub fn format_time(time: OffsetDateTime) -> String {
    time.format(&Rfc3339).unwrap_or_else(|_| time.to_string())
}

/// Parse an RFC 3339 timestamp or a bare `YYYY-MM-DD` date (midnight UTC).
pub fn parse_time(input: &str) -> Result<OffsetDateTime> {
    if let Ok(time) = OffsetDateTime::parse(input, &Rfc3339) {
        return Ok(time);
    }
    let format = time::format_description::parse("[year]-[month]-[day]")?;
    let date = time::Date::parse(input, &format).map_err(|_| {
        anyhow::anyhow!("invalid time '{input}': expected RFC 3339 or YYYY-MM-DD")
    })?;
    Ok(date.midnight().assume_utc())
}

/// One line per present generation.
pub fn format_signal(signal: &SignalMap) -> String {
    let mut out = String::new();
    for (generation, info) in signal.iter() {
        let _ = writeln!(
            out,
            "{generation}  bars {}  SINR {} dB  RSRQ {} dB  RSRP {} dBm  RSSI {} dBm  bands {}",
            info.bars,
            info.sinr,
            info.rsrq,
            info.rsrp,
            info.rssi,
            info.bands.join(",")
        );
    }
    if out.is_empty() {
        out.push_str("no signal reported\n");
    }
    out
}

pub fn format_band_rows(rows: &[BandRow]) -> String {
    use tabled::builder::Builder;
    use tabled::settings::Style;

    let mut builder = Builder::default();
    builder.push_record(["Time", "Gen", "Band", "Bars", "SINR", "RSRQ", "RSRP", "RSSI"]);
    for row in rows {
        builder.push_record([
            format_time(row.timestamp),
            row.generation.to_string(),
            row.band.clone(),
            row.bars.to_string(),
            row.sinr.to_string(),
            row.rsrq.to_string(),
            row.rsrp.to_string(),
            row.rssi.to_string(),
        ]);
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    format!("{table}\n")
}

pub fn format_notes(notes: &[NoteSpan]) -> String {
    let mut out = String::new();
    for note in notes {
        let marker = match note.kind {
            NoteKind::Note => "note ",
            NoteKind::SpanStart => "span ",
        };
        let _ = write!(out, "{} {marker} {}", format_time(note.timestamp), note.text);
        match (note.kind, note.end) {
            (NoteKind::SpanStart, Some(end)) => {
                let _ = write!(out, " (until {})", format_time(end));
            }
            (NoteKind::SpanStart, None) => out.push_str(" (ongoing)"),
            (NoteKind::Note, _) => {}
        }
        out.push('\n');
    }
    out
}

pub fn format_speed_test_run(run: &SpeedTestRun) -> String {
    summary(
        run.started,
        run.result.download_bps(),
        run.result.upload_bps(),
        run.result.ping.latency,
        &run.result.server.name,
        &run.result.result.url,
    )
}

pub fn format_stored_speed_test(test: &StoredSpeedTest) -> String {
    summary(
        test.started,
        test.download_bps,
        test.upload_bps,
        test.result.ping.latency,
        &test.result.server.name,
        &test.result.result.url,
    )
}

fn summary(
    started: OffsetDateTime,
    download: u64,
    upload: u64,
    ping_ms: f64,
    server: &str,
    url: &str,
) -> String {
    format!(
        "{}  down {}  up {}  ping {ping_ms:.1} ms  via {server}\n{url}\n",
        format_time(started),
        format_speed(download),
        format_speed(upload)
    )
}
