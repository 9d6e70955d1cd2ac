//! In-memory corpus of `(heading, data)` records loaded from a CSV file.
//!
//! The corpus is loaded once at startup and read-only for the process
//! lifetime. Matching is delegated to the token-set scorer in [`crate::fuzzy`];
//! a best score below the threshold is absence, not an error.

use crate::fuzzy::token_set_ratio;
use std::path::Path;

pub type CorpusResult<T> = Result<T, CorpusError>;

/// Errors that can occur while loading the corpus.
#[derive(Debug, thiserror::Error)]
pub enum CorpusError {
    #[error("Failed to read corpus file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corpus file has no header row")]
    Empty,

    #[error("Missing required column '{0}' in corpus header")]
    MissingColumn(&'static str),
}

/// One question-answer record: a heading to match against and the data to return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusRecord {
    pub heading: String,
    pub data: String,
}

/// Read-only record set, retained in load order (load order breaks score ties).
pub struct Corpus {
    records: Vec<CorpusRecord>,
}

impl Corpus {
    /// Load from a CSV file with named `heading` and `data` columns. Column
    /// order is free; extra columns are ignored; rows shorter than the header
    /// are skipped.
    pub fn load(path: impl AsRef<Path>) -> CorpusResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let rows = parse_csv(&raw);
        let mut rows = rows.into_iter().filter(|r| r.iter().any(|f| !f.trim().is_empty()));
        let header = rows.next().ok_or(CorpusError::Empty)?;

        let column = |name: &'static str| -> CorpusResult<usize> {
            header
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
                .ok_or(CorpusError::MissingColumn(name))
        };
        let heading_col = column("heading")?;
        let data_col = column("data")?;

        let records = rows
            .filter_map(|row| {
                let heading = row.get(heading_col)?.trim().to_string();
                let data = row.get(data_col)?.trim().to_string();
                (!heading.is_empty()).then_some(CorpusRecord { heading, data })
            })
            .collect();
        Ok(Self { records })
    }

    /// Build directly from records (tests and embedded corpora).
    pub fn from_records(records: Vec<CorpusRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Score the query against every heading and return the best record's
    /// `data` iff the best token-set score clears `threshold`. Ties keep the
    /// first record in load order. Deterministic for a fixed corpus.
    pub fn best_match(&self, query: &str, threshold: u8) -> Option<&str> {
        let mut best: Option<(&CorpusRecord, u8)> = None;
        for record in &self.records {
            let score = token_set_ratio(query, &record.heading);
            match best {
                Some((_, top)) if score <= top => {}
                _ => best = Some((record, score)),
            }
        }
        best.and_then(|(record, score)| (score >= threshold).then_some(record.data.as_str()))
    }
}

/// Minimal CSV reader: quoted fields, doubled-quote escapes, embedded commas
/// and newlines inside quotes, CRLF line endings.
fn parse_csv(input: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
        } else {
            match c {
                '"' => in_quotes = true,
                ',' => row.push(std::mem::take(&mut field)),
                '\r' => {}
                '\n' => {
                    row.push(std::mem::take(&mut field));
                    rows.push(std::mem::take(&mut row));
                }
                _ => field.push(c),
            }
        }
    }
    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_corpus(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_named_columns_in_any_order() {
        let file = write_corpus("data,heading\nA sorted array is required.,binary search\n");
        let corpus = Corpus::load(file.path()).unwrap();
        assert_eq!(corpus.len(), 1);
        assert_eq!(
            corpus.best_match("binary search", 80),
            Some("A sorted array is required.")
        );
    }

    #[test]
    fn quoted_fields_keep_commas_and_newlines() {
        let file = write_corpus(
            "heading,data\r\nlinked list,\"Nodes, each pointing\nto the next.\"\r\n",
        );
        let corpus = Corpus::load(file.path()).unwrap();
        assert_eq!(
            corpus.best_match("linked list", 80),
            Some("Nodes, each pointing\nto the next.")
        );
    }

    #[test]
    fn doubled_quotes_unescape() {
        let file = write_corpus("heading,data\nbig o,\"Called \"\"asymptotic\"\" notation.\"\n");
        let corpus = Corpus::load(file.path()).unwrap();
        assert_eq!(
            corpus.best_match("big o", 80),
            Some("Called \"asymptotic\" notation.")
        );
    }

    #[test]
    fn missing_column_is_an_error() {
        let file = write_corpus("heading,body\nbinary search,whatever\n");
        match Corpus::load(file.path()) {
            Err(CorpusError::MissingColumn("data")) => {}
            other => panic!("expected MissingColumn error, got {:?}", other.map(|c| c.len())),
        }
    }

    #[test]
    fn misspelled_query_clears_threshold() {
        let corpus = Corpus::from_records(vec![
            CorpusRecord {
                heading: "binary search".into(),
                data: "Divide and conquer over a sorted array.".into(),
            },
            CorpusRecord {
                heading: "bubble sort".into(),
                data: "Adjacent swaps until sorted.".into(),
            },
        ]);
        assert_eq!(
            corpus.best_match("binery serch", 80),
            Some("Divide and conquer over a sorted array.")
        );
    }

    #[test]
    fn dissimilar_query_is_absence() {
        let corpus = Corpus::from_records(vec![CorpusRecord {
            heading: "binary search".into(),
            data: "irrelevant".into(),
        }]);
        assert_eq!(corpus.best_match("how do volcanoes erupt", 80), None);
    }

    #[test]
    fn score_ties_keep_first_record_in_load_order() {
        let corpus = Corpus::from_records(vec![
            CorpusRecord {
                heading: "binary search".into(),
                data: "first".into(),
            },
            CorpusRecord {
                heading: "binary search".into(),
                data: "second".into(),
            },
        ]);
        assert_eq!(corpus.best_match("binary search", 80), Some("first"));
    }

    #[test]
    fn repeated_queries_are_idempotent() {
        let corpus = Corpus::from_records(vec![CorpusRecord {
            heading: "hash table".into(),
            data: "Buckets keyed by hash.".into(),
        }]);
        let a = corpus.best_match("hash table", 80).map(str::to_string);
        let b = corpus.best_match("hash table", 80).map(str::to_string);
        assert_eq!(a, b);
    }
}
