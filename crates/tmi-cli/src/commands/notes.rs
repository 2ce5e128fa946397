//! Note and span commands.

use anyhow::Result;

use tmi_store::NoteKind;

use crate::config::Config;
use crate::format::{format_notes, format_time};
use crate::util::open_store;

pub fn cmd_note(config: &Config, kind: NoteKind, text: &[String]) -> Result<()> {
    let text = text.join(" ");
    let store = open_store(config)?;
    let at = store.save_note(kind, &text)?;

    match kind {
        NoteKind::Note => println!("Noted at {}", format_time(at)),
        NoteKind::SpanStart => println!("Span started at {}", format_time(at)),
    }
    Ok(())
}

pub fn cmd_notes(config: &Config, json: bool) -> Result<()> {
    let store = open_store(config)?;
    let notes = store.get_notes()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&notes)?);
    } else if notes.is_empty() {
        println!("No notes recorded yet.");
    } else {
        print!("{}", format_notes(&notes));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_and_span_are_stored() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.storage.path = dir.path().join("stats.db");

        let words = ["on".to_string(), "the".to_string(), "desk".to_string()];
        cmd_note(&config, NoteKind::SpanStart, &words).unwrap();
        cmd_note(&config, NoteKind::Note, &["firmware update".into()]).unwrap();

        let notes = open_store(&config).unwrap().get_notes().unwrap();
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].text, "on the desk");
        assert_eq!(notes[0].kind, NoteKind::SpanStart);
        assert_eq!(notes[0].end, None);
        assert_eq!(notes[1].kind, NoteKind::Note);
    }
}
