use serde::{Deserialize, Deserializer};
use std::io::Read;

/// One CSV line, before it is mapped onto a tenant and a job posting.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct JobRow {
    #[serde(default)]
    pub(crate) title: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) work_policy: Option<String>,
    #[serde(default)]
    pub(crate) location: String,
    #[serde(default)]
    pub(crate) department: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) employment_type: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) experience_level: Option<String>,
    #[serde(default)]
    pub(crate) job_type: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) salary_range: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) job_slug: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) posted_days_ago: Option<String>,
}

impl JobRow {
    /// Missing values count as posted today.
    pub(crate) fn posted_days_ago(&self) -> Result<i64, String> {
        match self.posted_days_ago.as_deref() {
            None => Ok(0),
            Some(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|days| *days >= 0)
                .ok_or_else(|| format!("posted_days_ago must be a non-negative integer, got '{raw}'")),
        }
    }
}

/// A data line and either its decoded row or the reason it could not be read.
#[derive(Debug)]
pub(crate) struct ParsedRow {
    pub(crate) line: u64,
    pub(crate) row: Result<JobRow, String>,
}

/// Reads every data line. A malformed line is returned as a row-level error;
/// only an unreadable header aborts the parse.
pub(crate) fn parse_rows<R: Read>(reader: R) -> Result<Vec<ParsedRow>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    csv_reader.headers()?;

    let mut rows = Vec::new();
    for (index, record) in csv_reader.deserialize::<JobRow>().enumerate() {
        let line = match &record {
            Ok(_) => index as u64 + 2,
            Err(error) => error
                .position()
                .map(|position| position.line())
                .unwrap_or(index as u64 + 2),
        };
        rows.push(ParsedRow {
            line,
            row: record.map_err(|error| error.to_string()),
        });
    }

    Ok(rows)
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
