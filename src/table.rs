//! Reading a delimited log back as a table.

use eyre::Context;

use crate::{error::LogError, literal::Literal};

pub const INDEX_COLUMN: &str = "index";
pub const STATUS_COLUMN: &str = "status";

#[derive(Debug, Clone, PartialEq)]
pub struct LogRow {
    /// The leading field a formatter wrote ahead of the columns the header names.
    pub timestamp: Option<String>,
    pub fields: Vec<String>,
}

/// A log (or any delimited file with a header line) parsed into rows of text fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLog {
    columns: Vec<String>,
    rows: Vec<LogRow>,
}

impl ParsedLog {
    /// Parses `data` as delimited text whose first non-blank line names the columns.
    ///
    /// Quotes carry no meaning, a field runs up to the next delimiter. Whitespace right after a
    /// delimiter is skipped. A row with exactly one field more than the
    /// header carries its timestamp in that first field, shorter rows are padded with empty
    /// fields and longer rows are rejected.
    pub fn parse(data: &[u8], delimiter: char) -> eyre::Result<Self> {
        let delimiter = u8::try_from(delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| {
                eyre::eyre!("Delimiter {:?} is not a single ASCII character", delimiter)
            })?;

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .from_reader(data);

        let mut records = reader.records().filter(|record| match record {
            Ok(record) => !record.iter().all(|field| field.trim().is_empty()),
            Err(_) => true,
        });

        let header = match records.next() {
            Some(header) => header.context("Failed reading log header")?,
            None => return Err(LogError::EmptyLog.into()),
        };
        let columns: Vec<String> = header
            .iter()
            .map(|field| field.trim_start().to_string())
            .collect();

        let mut rows = Vec::new();
        for record in records {
            let record = record.context("Failed reading log row")?;
            let mut fields: Vec<String> = record
                .iter()
                .map(|field| field.trim_start().to_string())
                .collect();

            let timestamp = if fields.len() == columns.len() + 1 {
                Some(fields.remove(0))
            } else if fields.len() > columns.len() {
                return Err(LogError::RaggedRow {
                    line: record.position().map_or(0, |p| p.line() as usize),
                    expected: columns.len() + 1,
                    found: fields.len(),
                }
                .into());
            } else {
                fields.resize(columns.len(), String::new());
                None
            };

            rows.push(LogRow { timestamp, fields });
        }

        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[LogRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Every value of the column `name`, in row order.
    pub fn column(&self, name: &str) -> Result<Vec<&str>, LogError> {
        let position = self
            .column_position(name)
            .ok_or_else(|| LogError::MissingColumn(name.to_string()))?;

        Ok(self
            .rows
            .iter()
            .map(|row| row.fields.get(position).map_or("", String::as_str))
            .collect())
    }

    /// The `index` column evaluated back into typed keys. One bad literal fails the whole call.
    pub fn index_keys(&self) -> Result<Vec<Literal>, LogError> {
        self.column(INDEX_COLUMN)?
            .into_iter()
            .map(Literal::parse)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log_error(err: &eyre::Report) -> Option<&LogError> {
        err.chain().find_map(|e| e.downcast_ref::<LogError>())
    }

    #[test]
    fn splits_timestamp_from_fields() {
        let data = "index|status\n\
                    2024-01-01 00:00:00|(1, 2)|complete\n\
                    2024-01-01 00:00:01|(3, 4)| error\n";
        let log = ParsedLog::parse(data.as_bytes(), '|').unwrap();

        assert_eq!(log.columns(), ["index", "status"]);
        assert_eq!(log.len(), 2);
        assert_eq!(
            log.rows()[0].timestamp.as_deref(),
            Some("2024-01-01 00:00:00")
        );
        assert_eq!(log.column("status").unwrap(), ["complete", "error"]);
        assert_eq!(
            log.index_keys().unwrap(),
            [Literal::from((1, 2)), Literal::from((3, 4))]
        );
    }

    #[test]
    fn skips_leading_whitespace_and_blank_lines() {
        let data = "index, status\n\n  \n'a',  done \n";
        let log = ParsedLog::parse(data.as_bytes(), ',').unwrap();

        assert_eq!(log.columns(), ["index", "status"]);
        assert_eq!(log.rows()[0].timestamp, None);
        assert_eq!(log.rows()[0].fields, ["'a'", "done "]);
    }

    #[test]
    fn quotes_are_plain_text() {
        let log = ParsedLog::parse(b"index|status\nts|\"it's\"|complete\n", '|').unwrap();

        assert_eq!(log.rows()[0].fields[0], "\"it's\"");
        assert_eq!(
            log.index_keys().unwrap(),
            [Literal::Str("it's".to_string())]
        );
    }

    #[test]
    fn pads_short_rows() {
        let log = ParsedLog::parse(b"index|status|note\n1|ok\n", '|').unwrap();

        assert_eq!(log.rows()[0].fields, ["1", "ok", ""]);
    }

    #[test]
    fn rejects_rows_with_extra_fields() {
        let err = ParsedLog::parse(b"index|status\nts|1|ok|extra\n", '|').unwrap_err();

        assert_eq!(
            log_error(&err),
            Some(&LogError::RaggedRow {
                line: 2,
                expected: 3,
                found: 4
            })
        );
    }

    #[test]
    fn empty_input_is_an_error() {
        for data in ["", "\n\n", "   \n"] {
            let err = ParsedLog::parse(data.as_bytes(), '|').unwrap_err();
            assert_eq!(log_error(&err), Some(&LogError::EmptyLog));
        }
    }

    #[test]
    fn header_only_log_has_no_rows() {
        let log = ParsedLog::parse(b"index|status\n", '|').unwrap();

        assert!(log.is_empty());
        assert!(log.index_keys().unwrap().is_empty());
    }

    #[test]
    fn missing_and_malformed_index() {
        let log = ParsedLog::parse(b"id|status\nts|1|ok\n", '|').unwrap();
        assert_eq!(
            log.index_keys().unwrap_err(),
            LogError::MissingColumn("index".to_string())
        );

        let log = ParsedLog::parse(b"index|status\nts|not a literal|ok\n", '|').unwrap();
        assert!(matches!(
            log.index_keys().unwrap_err(),
            LogError::MalformedLiteral { .. }
        ));
    }

    #[test]
    fn rejects_multibyte_delimiter() {
        assert!(ParsedLog::parse(b"a\n", '¦').is_err());
    }
}
