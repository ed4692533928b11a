/// Conventional location of a job's log under a storage prefix:
/// `{prefix}/{dataset_id}/logs/{dataset_id}_{version}_{datetime}_log.csv`, with any `/` in
/// `datetime` replaced so it stays one path segment.
pub fn log_path(prefix: &str, dataset_id: &str, version: &str, datetime: &str) -> String {
    format!(
        "{}/{}/logs/{}_{}_{}_log.csv",
        prefix,
        dataset_id,
        dataset_id,
        version,
        datetime.replace('/', "_")
    )
}

/// clap value parser for single-character delimiters. `\t` and `tab` name a tab.
pub fn parse_delimiter(value: &str) -> eyre::Result<char> {
    match value {
        "\\t" | "tab" => return Ok('\t'),
        _ => {}
    }

    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii() && c != '\n' && c != '\r' => Ok(c),
        _ => Err(eyre::eyre!(
            "delimiter must be a single ASCII character, got '{}'",
            value
        )),
    }
}
