//! In-memory tabular data exchanged with model files.
//!
//! A [`Table`] is a header plus string rows. It is built from CSV chunks on
//! download and serialized back into CSV chunks for upload.

use std::ops::Range;

use csv::{ReaderBuilder, WriterBuilder};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("row {row} has {found} field(s), expected {expected}")]
    WidthMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("CSV writer error: {0}")]
    CsvWriterError(String),
}

/// Parsing and serialization options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableOptions {
    pub delimiter: u8,
}

impl Default for TableOptions {
    fn default() -> Self {
        TableOptions { delimiter: b',' }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Table {
        Table {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn push_row(&mut self, row: Vec<String>) -> Result<(), TableError> {
        if row.len() != self.columns.len() {
            return Err(TableError::WidthMismatch {
                row: self.rows.len(),
                expected: self.columns.len(),
                found: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Parses CSV whose first record is the header row
    pub fn parse_with_header(data: &[u8], options: TableOptions) -> Result<Table, TableError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .delimiter(options.delimiter)
            .from_reader(data);

        let columns = reader
            .headers()?
            .iter()
            .map(|h| h.to_string())
            .collect::<Vec<_>>();
        let mut table = Table::new(columns);
        for record in reader.records() {
            table.push_row(record?.iter().map(|f| f.to_string()).collect())?;
        }
        Ok(table)
    }

    /// Appends headerless CSV rows using the existing columns.
    ///
    /// Returns the number of rows added.
    pub fn append_headerless(
        &mut self,
        data: &[u8],
        options: TableOptions,
    ) -> Result<usize, TableError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(options.delimiter)
            .from_reader(data);

        let before = self.rows.len();
        for record in reader.records() {
            self.push_row(record?.iter().map(|f| f.to_string()).collect())?;
        }
        Ok(self.rows.len() - before)
    }

    /// Serializes a range of rows, optionally preceded by the header row
    pub fn to_csv(
        &self,
        rows: Range<usize>,
        with_header: bool,
        options: TableOptions,
    ) -> Result<Vec<u8>, TableError> {
        let mut writer = WriterBuilder::new()
            .delimiter(options.delimiter)
            .from_writer(vec![]);

        if with_header {
            writer.write_record(&self.columns)?;
        }
        let end = rows.end.min(self.rows.len());
        let start = rows.start.min(end);
        for row in &self.rows[start..end] {
            writer.write_record(row)?;
        }
        writer
            .into_inner()
            .map_err(|e| TableError::CsvWriterError(e.to_string()))
    }
}
