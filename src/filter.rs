//! Working out which tasks still need to run after a restart.

use std::collections::HashSet;

use crate::{
    literal::Literal,
    table::{ParsedLog, STATUS_COLUMN},
    LOG_TARGET,
};

/// The status a row must carry to count as done in retry-errors mode.
pub const COMPLETE_STATUS: &str = "complete";

/// Work items keyed the same way as a log's `index` column, in the caller's order.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidates<T> {
    entries: Vec<(Literal, T)>,
}

impl<T> Candidates<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, key: impl Into<Literal>, item: T) {
        self.entries.push((key.into(), item));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &Literal> {
        self.entries.iter().map(|(key, _)| key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Literal, T)> {
        self.entries.iter()
    }
}

impl Candidates<Vec<String>> {
    /// Candidates from a delimited table with an `index` column, the rows kept whole.
    pub fn from_table(table: &ParsedLog) -> eyre::Result<Self> {
        let keys = table.index_keys()?;
        Ok(keys
            .into_iter()
            .zip(table.rows())
            .map(|(key, row)| (key, row.fields.clone()))
            .collect())
    }
}

impl<T> Default for Candidates<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<(Literal, T)> for Candidates<T> {
    fn from_iter<I: IntoIterator<Item = (Literal, T)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<T> IntoIterator for Candidates<T> {
    type Item = (Literal, T);
    type IntoIter = std::vec::IntoIter<(Literal, T)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Returns the candidates the log does not record as done.
///
/// Any logged key counts as done. With `retry_errors` only keys logged with a status of exactly
/// `complete` do, so attempts that were logged with another status come back for another try.
/// Order and contents of the remaining candidates are preserved.
pub fn filter_by_log<T: Clone>(
    candidates: &Candidates<T>,
    log: &ParsedLog,
    retry_errors: bool,
) -> eyre::Result<Candidates<T>> {
    let keys = log.index_keys()?;

    let done: HashSet<Literal> = if retry_errors {
        let statuses = log.column(STATUS_COLUMN)?;
        keys.into_iter()
            .zip(statuses)
            .filter(|(_, status)| *status == COMPLETE_STATUS)
            .map(|(key, _)| key)
            .collect()
    } else {
        keys.into_iter().collect()
    };

    log::debug!(
        target: LOG_TARGET,
        "{} of {} logged keys count as done (retry_errors={})",
        done.len(),
        log.len(),
        retry_errors
    );

    Ok(candidates
        .iter()
        .filter(|(key, _)| !done.contains(key))
        .cloned()
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LogError;

    fn parse(text: &str) -> ParsedLog {
        ParsedLog::parse(text.as_bytes(), '|').unwrap()
    }

    fn candidates(keys: &[(i64, i64)]) -> Candidates<String> {
        keys.iter()
            .map(|&(a, b)| (Literal::from((a, b)), format!("task {}-{}", a, b)))
            .collect()
    }

    fn keys<T>(candidates: &Candidates<T>) -> Vec<Literal> {
        candidates.keys().cloned().collect()
    }

    #[test]
    fn drops_every_logged_key() {
        let log = parse("index|status\nts|(1, 2)|complete\nts|(3, 4)|error\n");
        let remaining = filter_by_log(&candidates(&[(1, 2), (3, 4), (5, 6)]), &log, false).unwrap();

        assert_eq!(keys(&remaining), [Literal::from((5, 6))]);
        assert_eq!(remaining.iter().next().unwrap().1, "task 5-6");
    }

    #[test]
    fn retries_keys_without_complete_status() {
        let log = parse("index|status\nts|(1, 2)|complete\nts|(3, 4)|error\n");
        let remaining = filter_by_log(&candidates(&[(1, 2), (3, 4), (5, 6)]), &log, true).unwrap();

        assert_eq!(
            keys(&remaining),
            [Literal::from((3, 4)), Literal::from((5, 6))]
        );
    }

    #[test]
    fn later_success_wins_over_earlier_error() {
        let log = parse("index|status\nts|(3, 4)|error\nts|(3, 4)|complete\n");
        let remaining = filter_by_log(&candidates(&[(3, 4)]), &log, true).unwrap();

        assert!(remaining.is_empty());
    }

    #[test]
    fn only_exact_complete_counts() {
        let log = parse("index|status\nts|1|Complete\nts|2|completed\nts|3|complete\n");
        let all: Candidates<()> = [1, 2, 3].into_iter().map(|k| (Literal::from(k), ())).collect();
        let remaining = filter_by_log(&all, &log, true).unwrap();

        assert_eq!(keys(&remaining), [Literal::Int(1), Literal::Int(2)]);
    }

    #[test]
    fn numeric_keys_match_across_types() {
        let log = parse("index|status\nts|1.0|complete\nts|(2, 3.0)|complete\n");
        let tasks: Candidates<()> = [Literal::Int(1), Literal::from((2, 3)), Literal::Int(4)]
            .into_iter()
            .map(|key| (key, ()))
            .collect();
        let remaining = filter_by_log(&tasks, &log, false).unwrap();

        assert_eq!(keys(&remaining), [Literal::Int(4)]);
    }

    #[test]
    fn deeply_nested_index_is_an_error() {
        let nested = format!("{}1{}", "(".repeat(20_000), ")".repeat(20_000));
        let log = parse(&format!("index|status\nts|{}|complete\n", nested));
        let err = filter_by_log(&candidates(&[(1, 2)]), &log, false).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<LogError>(),
            Some(LogError::MalformedLiteral { .. })
        ));
    }

    #[test]
    fn filtering_is_idempotent() {
        let log = parse("index|status\nts|(1, 2)|complete\nts|(9, 9)|error\n");
        let tasks = candidates(&[(5, 6), (1, 2), (7, 8)]);

        let once = filter_by_log(&tasks, &log, false).unwrap();
        let twice = filter_by_log(&once, &log, false).unwrap();

        assert_eq!(once, twice);
        assert_eq!(keys(&once), [Literal::from((5, 6)), Literal::from((7, 8))]);
        assert_eq!(tasks.len(), 3);
    }

    #[test]
    fn malformed_index_fails_the_whole_call() {
        let log = parse("index|status\nts|(1, 2)|complete\nts|oops|error\n");
        let err = filter_by_log(&candidates(&[(1, 2)]), &log, false).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<LogError>(),
            Some(LogError::MalformedLiteral { .. })
        ));
    }

    #[test]
    fn retry_mode_needs_status_column() {
        let log = parse("index|note\nts|1|x\n");
        let tasks: Candidates<()> = [(Literal::Int(1), ())].into_iter().collect();

        assert!(filter_by_log(&tasks, &log, false).unwrap().is_empty());
        let err = filter_by_log(&tasks, &log, true).unwrap_err();
        assert_eq!(
            err.downcast_ref::<LogError>(),
            Some(&LogError::MissingColumn("status".to_string()))
        );
    }

    #[test]
    fn candidates_from_table_keep_rows() {
        let table = parse("index|payload\n(1, 'a')|x\n(2, 'b')|y\n");
        let tasks = Candidates::from_table(&table).unwrap();

        assert_eq!(
            tasks.iter().cloned().collect::<Vec<_>>(),
            [
                (Literal::from((1, "a")), vec!["(1, 'a')".to_string(), "x".to_string()]),
                (Literal::from((2, "b")), vec!["(2, 'b')".to_string(), "y".to_string()]),
            ]
        );
    }
}
