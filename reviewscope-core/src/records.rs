use {
    std::{fs::File, io::Read, path::Path},
    serde::{Serialize, Deserialize},
    thiserror::Error,
};

#[derive(Error, Debug)]
pub enum InputError {
    #[error("input must contain a column named '{column}' (found: {})", .available.join(", "))]
    MissingColumn {
        column: String,
        available: Vec<String>,
    },
    #[error("input contains no reviews")]
    EmptyInput,
    #[error("failed to open input file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to read csv: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ReviewRecord {
    text: Option<String>,
    metadata: Vec<(String, String)>,
}

impl ReviewRecord {
    pub fn new(text: String) -> Self {
        Self {
            text: Some(text),
            metadata: Vec::new(),
        }
    }

    pub fn with_metadata(text: Option<String>, metadata: Vec<(String, String)>) -> Self {
        Self {
            text,
            metadata,
        }
    }

    /// `None` when the review cell was empty or absent from the row.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn metadata(&self) -> &[(String, String)] {
        &self.metadata
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.metadata.iter().find(|(key, _)| key == name).map(|(_, value)| value.as_str())
    }
}

pub fn read_records_from_path(path: &Path, text_column: &str) -> Result<Vec<ReviewRecord>, InputError> {
    read_records(File::open(path)?, text_column)
}

/// Reads CSV rows, taking `text_column` as the review text and keeping the
/// other columns as metadata. Short rows yield empty metadata fields and no text.
pub fn read_records<R: Read>(reader: R, text_column: &str) -> Result<Vec<ReviewRecord>, InputError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);
    let headers = reader.headers()?.clone();

    let text_index = headers.iter()
        .position(|header| header.trim() == text_column)
        .ok_or_else(|| InputError::MissingColumn {
            column: text_column.to_owned(),
            available: headers.iter().map(|v| v.to_owned()).collect(),
        })?;

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let text = row.get(text_index)
            .filter(|v| !v.trim().is_empty())
            .map(|v| v.to_owned());
        let metadata = headers.iter()
            .enumerate()
            .filter(|(index, _)| *index != text_index)
            .map(|(index, header)| (header.to_owned(), row.get(index).unwrap_or_default().to_owned()))
            .collect();

        records.push(ReviewRecord::with_metadata(text, metadata));
    }

    if records.is_empty() {
        return Err(InputError::EmptyInput);
    }

    Ok(records)
}
