//! Tagged text datasets, one document per line: `text#tag1#tag2...`.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::sampling;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetEntry {
    pub text: String,
    pub tags: HashSet<String>,
}

/// Parse one dataset line. Lines with fewer than two fields yield `None`.
pub fn parse_line(line: &str) -> Option<DatasetEntry> {
    if !line.contains('#') {
        return None;
    }
    let mut fields = line.split('#');
    let text = fields.next()?.trim();
    let tags: HashSet<String> = fields
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();
    Some(DatasetEntry {
        text: text.to_string(),
        tags,
    })
}

/// Read up to `limit` entries from a dataset file.
pub fn read_dataset(path: impl AsRef<Path>, limit: Option<usize>) -> Result<Vec<DatasetEntry>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)
        .map_err(|e| Error::Dataset(format!("cannot open '{}': {e}", path.display())))?;
    let limit = limit.unwrap_or(usize::MAX);

    let mut entries = Vec::new();
    let mut skipped = 0usize;
    for line in BufReader::new(file).lines() {
        if entries.len() >= limit {
            break;
        }
        match parse_line(&line?) {
            Some(entry) => entries.push(entry),
            None => skipped += 1,
        }
    }
    tracing::debug!(path = %path.display(), entries = entries.len(), skipped, "read dataset");
    Ok(entries)
}

/// Seeded split into train and test entries.
pub fn split(
    entries: &[DatasetEntry],
    train_ratio: f64,
    seed: u64,
) -> (Vec<DatasetEntry>, Vec<DatasetEntry>) {
    let (train, test) = sampling::train_test_split(entries.len(), train_ratio, seed);
    let pick = |indices: Vec<usize>| indices.into_iter().map(|i| entries[i].clone()).collect();
    (pick(train), pick(test))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_text_and_tags() {
        let e = parse_line("Rust is fast#rust# performance #").unwrap();
        assert_eq!(e.text, "Rust is fast");
        assert_eq!(e.tags.len(), 2);
        assert!(e.tags.contains("performance"));
    }

    #[test]
    fn single_field_skipped() {
        assert!(parse_line("just some text").is_none());
        assert!(parse_line("").is_none());
    }

    #[test]
    fn empty_tag_list_kept() {
        let e = parse_line("text only#").unwrap();
        assert!(e.tags.is_empty());
    }

    #[test]
    fn read_with_limit() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "first text#a#b").unwrap();
        writeln!(file, "no tags here").unwrap();
        writeln!(file, "second text#c").unwrap();
        writeln!(file, "third text#d").unwrap();

        let all = read_dataset(file.path(), None).unwrap();
        assert_eq!(all.len(), 3);
        let two = read_dataset(file.path(), Some(2)).unwrap();
        assert_eq!(two[1].text, "second text");
    }

    #[test]
    fn missing_file_is_dataset_error() {
        assert!(matches!(
            read_dataset("/nonexistent/data.txt", None),
            Err(Error::Dataset(_))
        ));
    }

    #[test]
    fn split_sizes() {
        let entries: Vec<DatasetEntry> = (0..10)
            .map(|i| parse_line(&format!("text {i}#tag")).unwrap())
            .collect();
        let (train, test) = split(&entries, 0.8, 1);
        assert_eq!(train.len(), 8);
        assert_eq!(test.len(), 2);
    }
}
