use crate::literal::Literal;

/// One entry handed to a [`super::CsvLogger`]: either a plain message or an ordered row of fields.
#[derive(Debug, Clone, PartialEq)]
pub enum LogRecord {
    Message(String),
    Fields(Vec<Literal>),
}

impl LogRecord {
    pub fn fields<I, T>(fields: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Literal>,
    {
        LogRecord::Fields(fields.into_iter().map(Into::into).collect())
    }
}

impl From<&str> for LogRecord {
    fn from(message: &str) -> Self {
        LogRecord::Message(message.to_string())
    }
}

impl From<String> for LogRecord {
    fn from(message: String) -> Self {
        LogRecord::Message(message)
    }
}

impl From<Vec<Literal>> for LogRecord {
    fn from(fields: Vec<Literal>) -> Self {
        LogRecord::Fields(fields)
    }
}
