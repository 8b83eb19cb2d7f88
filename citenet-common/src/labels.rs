//! Source credibility labels and bias ratings.
//!
//! Labels come from a delimited text table with a header row of the form
//! `source,country,label,bias,...`. Label code 0 maps to reliable, 1 to
//! unreliable, and anything else (including unparseable codes) to
//! unlabeled — sources absent from the table are likewise treated as
//! unlabeled by downstream consumers.

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// External credibility classification of a news source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Credibility {
    Reliable,
    Unreliable,
    Unlabeled,
}

impl Credibility {
    /// Map a numeric label code from the table to a credibility class.
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => Credibility::Reliable,
            1 => Credibility::Unreliable,
            _ => Credibility::Unlabeled,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Credibility::Reliable => "reliable",
            Credibility::Unreliable => "unreliable",
            Credibility::Unlabeled => "unlabeled",
        }
    }
}

/// Label-table row for one source: credibility class plus a bias rating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLabel {
    pub credibility: Credibility,
    pub bias: String,
}

/// Mapping from source identifier to its label row.
pub type LabelTable = HashMap<String, SourceLabel>;

/// Load the label table from a delimited file.
///
/// Rows with fewer than four fields are skipped with a warning; a label code
/// that does not parse as an integer demotes the row to unlabeled rather
/// than aborting the run.
pub fn load_label_table(path: impl AsRef<Path>) -> crate::Result<LabelTable> {
    let file = File::open(path.as_ref())?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file);

    let mut table = LabelTable::new();
    for record in reader.records() {
        let record = record?;
        if record.len() < 4 {
            tracing::warn!(fields = record.len(), "skipping short label row");
            continue;
        }
        let source = record[0].to_string();
        let credibility = match record[2].trim().parse::<i64>() {
            Ok(code) => Credibility::from_code(code),
            Err(_) => {
                tracing::warn!(%source, code = &record[2], "unparseable label code");
                Credibility::Unlabeled
            }
        };
        table.insert(
            source,
            SourceLabel {
                credibility,
                bias: record[3].to_string(),
            },
        );
    }
    Ok(table)
}
