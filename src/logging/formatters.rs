use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, TimeZone};
use std::fmt;

use super::{diagnostics::Config, record::LogRecord, LogFormatter};

pub const DEFAULT_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const DEFAULT_DELIMITER: char = '|';

/// Turns a [`LogRecord`] into one delimited line.
///
/// The template understands two placeholders, `{timestamp}` and `{message}`. The timestamp is the
/// local time rendered with a strftime pattern, the message is the record's fields joined by the
/// delimiter.
#[derive(Debug, Clone)]
pub struct CsvFormatter {
    template: String,
    datetime_format: String,
    delimiter: char,
}

impl CsvFormatter {
    pub fn new(
        template: impl Into<String>,
        datetime_format: impl Into<String>,
        delimiter: char,
    ) -> eyre::Result<Self> {
        let datetime_format = datetime_format.into();
        if StrftimeItems::new(&datetime_format).any(|item| matches!(item, Item::Error)) {
            return Err(eyre::eyre!(
                "Invalid datetime format '{}'",
                datetime_format
            ));
        }

        Ok(Self {
            template: template.into(),
            datetime_format,
            delimiter,
        })
    }

    /// `{timestamp}<delimiter>{message}` followed by a newline.
    pub fn default_template(delimiter: char) -> String {
        format!("{{timestamp}}{}{{message}}\n", delimiter)
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    pub fn format_fields(&self, record: &LogRecord) -> String {
        match record {
            LogRecord::Message(message) => message.clone(),
            LogRecord::Fields(fields) => fields
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(&self.delimiter.to_string()),
        }
    }

    pub fn format(&self, record: &LogRecord) -> String {
        self.format_at(record, &Local::now())
    }

    pub fn format_at<Tz>(&self, record: &LogRecord, time: &DateTime<Tz>) -> String
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        let timestamp = time.format(&self.datetime_format).to_string();
        // Substitute the message last so its text is never scanned for placeholders.
        self.template
            .replace("{timestamp}", &timestamp)
            .replace("{message}", &self.format_fields(record))
    }
}

impl Default for CsvFormatter {
    fn default() -> Self {
        Self {
            template: Self::default_template(DEFAULT_DELIMITER),
            datetime_format: DEFAULT_DATETIME_FORMAT.to_string(),
            delimiter: DEFAULT_DELIMITER,
        }
    }
}

/// Formatter for the process' own diagnostics, not for log targets.
pub struct DiagnosticFormatter {
    config: Config,
}

impl DiagnosticFormatter {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    fn timestamp(&self) -> String {
        let color = if self.config.use_ansi {
            "\x1b[0;90m"
        } else {
            ""
        };

        let time = Local::now().format(&self.config.datetime_format);
        format!("{}[{}]{}", color, time, self.reset())
    }

    fn format_level(&self, level: log::Level) -> &str {
        if self.config.use_ansi {
            match level {
                log::Level::Error => "\x1b[0;31mERR\x1b[0m",
                log::Level::Warn => "\x1b[0;33mWRN\x1b[0m",
                log::Level::Info => "\x1b[0;32mINF\x1b[0m",
                log::Level::Debug => "\x1b[0;34mDEB\x1b[0m",
                log::Level::Trace => "\x1b[0;37mTRC\x1b[0m",
            }
        } else {
            match level {
                log::Level::Error => "ERR",
                log::Level::Warn => "WRN",
                log::Level::Info => "INF",
                log::Level::Debug => "DEB",
                log::Level::Trace => "TRC",
            }
        }
    }

    fn reset(&self) -> &str {
        if self.config.use_ansi {
            "\x1b[0m"
        } else {
            ""
        }
    }
}

impl LogFormatter for DiagnosticFormatter {
    fn format(&self, record: &log::Record) -> String {
        format!(
            "{} {} {}: {}",
            self.timestamp(),
            self.format_level(record.level()),
            record.target(),
            record.args(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::literal::Literal;
    use chrono::NaiveDateTime;

    fn fixed_time() -> DateTime<chrono::Utc> {
        NaiveDateTime::parse_from_str("2024-03-05 07:08:09", "%Y-%m-%d %H:%M:%S")
            .unwrap()
            .and_utc()
    }

    #[test]
    fn joins_fields_with_delimiter() {
        let formatter = CsvFormatter::default();
        let record = LogRecord::fields([Literal::from((1, 2)), "complete".into(), 3.into()]);

        assert_eq!(formatter.format_fields(&record), "(1, 2)|complete|3");
    }

    #[test]
    fn passes_messages_through() {
        let formatter = CsvFormatter::new("{message}", DEFAULT_DATETIME_FORMAT, ',').unwrap();
        let record = LogRecord::from("a|b,c");

        assert_eq!(formatter.format_fields(&record), "a|b,c");
        assert_eq!(formatter.format_at(&record, &fixed_time()), "a|b,c");
    }

    #[test]
    fn prefixes_lines_with_timestamp() {
        let formatter = CsvFormatter::new(
            CsvFormatter::default_template(','),
            DEFAULT_DATETIME_FORMAT,
            ',',
        )
        .unwrap();
        let record = LogRecord::fields(["x", "y"]);

        assert_eq!(
            formatter.format_at(&record, &fixed_time()),
            "2024-03-05 07:08:09,x,y\n"
        );
    }

    #[test]
    fn message_text_is_not_a_template() {
        let formatter = CsvFormatter::default();
        let record = LogRecord::from("{timestamp}");

        assert_eq!(
            formatter.format_at(&record, &fixed_time()),
            "2024-03-05 07:08:09|{timestamp}\n"
        );
    }

    #[test]
    fn live_timestamp_matches_pattern() {
        let line = CsvFormatter::default().format(&LogRecord::from("m"));
        let (timestamp, rest) = line.split_once('|').unwrap();

        assert!(NaiveDateTime::parse_from_str(timestamp, DEFAULT_DATETIME_FORMAT).is_ok());
        assert_eq!(rest, "m\n");
    }

    #[test]
    fn rejects_bad_datetime_format() {
        assert!(CsvFormatter::new("{message}", "%Q", '|').is_err());
    }
}
