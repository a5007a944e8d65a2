use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use nomatch_core::api::{CliError, InputError, Speaker, Turn, TurnTable};
use serde::Deserialize;

use super::{csv_error, find_column, require_column};

const SESSION: &[&str] = &["session_id"];
const SPEAKER: &[&str] = &["speaker", "tipo"];
const TEXT: &[&str] = &["text", "texto"];
const INTENT: &[&str] = &["intent", "intent_detectado"];
const DATE: &[&str] = &["date", "fecha"];

/// Per-session turn numbering in file order.
#[derive(Default)]
struct TurnCounter(HashMap<String, u32>);

impl TurnCounter {
    fn next(&mut self, session_id: &str, explicit: Option<u32>) -> u32 {
        let slot = self.0.entry(session_id.to_string()).or_insert(0);
        let idx = explicit.unwrap_or(*slot);
        *slot = idx.saturating_add(1);
        idx
    }
}

/// Reads a turn file, choosing the format by extension (`.jsonl` or CSV).
pub fn read_turns(path: &Path) -> Result<TurnTable, CliError> {
    let source_name = path.display().to_string();
    let file = std::fs::File::open(path)?;
    let is_jsonl = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("jsonl"));

    let table = if is_jsonl {
        read_turns_jsonl(BufReader::new(file), &source_name)?
    } else {
        read_turns_csv(file, &source_name)?
    };
    tracing::info!(
        target: "nomatch.cli",
        stage = "input.turns",
        source = %source_name,
        turns = table.len(),
        sessions = table.session_count()
    );
    Ok(table)
}

pub fn read_turns_csv<R: Read>(reader: R, source_name: &str) -> Result<TurnTable, InputError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(reader);
    let headers = rdr.headers().map_err(|e| csv_error(e, source_name))?.clone();

    let session_col = require_column(&headers, SESSION, source_name)?;
    let speaker_col = require_column(&headers, SPEAKER, source_name)?;
    let text_col = require_column(&headers, TEXT, source_name)?;
    let intent_col = require_column(&headers, INTENT, source_name)?;
    let date_col = find_column(&headers, DATE);

    let mut counter = TurnCounter::default();
    let mut turns = Vec::new();
    for (position, record) in rdr.records().enumerate() {
        let record = record.map_err(|e| csv_error(e, source_name))?;
        let field = |col: usize| record.get(col).unwrap_or("").trim();

        let session_id = field(session_col);
        let speaker = Speaker::parse(field(speaker_col), position)?;
        let date = date_col.map(field).unwrap_or("");
        let turn_index = counter.next(session_id, None);

        turns.push(Turn::new(
            session_id,
            turn_index,
            date,
            speaker,
            record.get(text_col).unwrap_or(""),
            field(intent_col),
        ));
    }

    TurnTable::new(turns)
}

#[derive(Debug, Deserialize)]
struct TurnLine {
    session_id: String,
    #[serde(default)]
    turn_index: Option<u32>,
    #[serde(default)]
    date: String,
    speaker: String,
    #[serde(default)]
    text: String,
    #[serde(default, alias = "detected_intent")]
    intent: String,
}

/// One JSON object per line; blank lines are skipped. `turn_index` is
/// optional and continues per session when absent.
pub fn read_turns_jsonl<R: BufRead>(reader: R, source_name: &str) -> Result<TurnTable, CliError> {
    let mut counter = TurnCounter::default();
    let mut turns = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let rec: TurnLine = serde_json::from_str(&line).map_err(|e| InputError::Malformed {
            source_name: source_name.to_string(),
            line: i + 1,
            message: e.to_string(),
        })?;
        let speaker = Speaker::parse(&rec.speaker, turns.len())?;
        let turn_index = counter.next(&rec.session_id, rec.turn_index);
        turns.push(Turn::new(
            rec.session_id,
            turn_index,
            rec.date,
            speaker,
            rec.text,
            rec.intent,
        ));
    }

    Ok(TurnTable::new(turns)?)
}
