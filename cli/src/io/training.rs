use std::io::Read;
use std::path::Path;

use nomatch_core::api::{CliError, InputError, TrainingCatalog, TrainingRecord};

use super::{csv_error, find_column, require_column};

const INTENT: &[&str] = &["intent"];
const PHRASE: &[&str] = &["phrase", "training_phrase"];
const LANGUAGE: &[&str] = &["language", "lang"];

pub fn read_training(path: &Path) -> Result<TrainingCatalog, CliError> {
    let source_name = path.display().to_string();
    let file = std::fs::File::open(path)?;
    let catalog = read_training_csv(file, &source_name)?;
    tracing::info!(
        target: "nomatch.cli",
        stage = "input.training",
        source = %source_name,
        phrases = catalog.len(),
        intents = catalog.intents().len()
    );
    Ok(catalog)
}

/// Rows with an empty phrase are dropped; an empty intent is fatal.
pub fn read_training_csv<R: Read>(
    reader: R,
    source_name: &str,
) -> Result<TrainingCatalog, InputError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(reader);
    let headers = rdr.headers().map_err(|e| csv_error(e, source_name))?.clone();

    let intent_col = require_column(&headers, INTENT, source_name)?;
    let phrase_col = require_column(&headers, PHRASE, source_name)?;
    let language_col = find_column(&headers, LANGUAGE);

    let mut records = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(|e| csv_error(e, source_name))?;
        let phrase = record.get(phrase_col).unwrap_or("").trim();
        if phrase.is_empty() {
            continue;
        }
        let mut rec = TrainingRecord::new(record.get(intent_col).unwrap_or(""), phrase);
        if let Some(lang) = language_col.and_then(|c| record.get(c)) {
            rec.language = lang.trim().to_string();
        }
        records.push(rec);
    }

    TrainingCatalog::new(records)
}
