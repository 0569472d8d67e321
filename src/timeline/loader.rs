//! CSV loader for per-line change records.
//!
//! Expected header (order does not matter):
//! `commit,file,line,type,depth,length,author,date,time,timezone,datetime,filename`
//!
//! `time`, `timezone`, `datetime` and `filename` are optional. The authored
//! instant is `date` at midnight in `timezone`, unless `datetime` holds a
//! parseable instant, which then wins.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use chrono::{DateTime, FixedOffset, NaiveDateTime, SubsecRound, TimeZone};
use csv::{ReaderBuilder, StringRecord, Trim};

use crate::error::{ParseError, Result};
use crate::timeline::record::LineRecord;

/// Column positions resolved from the header row.
struct Columns {
    commit: usize,
    file: usize,
    line: usize,
    category: usize,
    depth: usize,
    length: usize,
    author: usize,
    date: usize,
    time: Option<usize>,
    timezone: Option<usize>,
    datetime: Option<usize>,
    filename: Option<usize>,
}

impl Columns {
    fn resolve(headers: &StringRecord) -> std::result::Result<Self, ParseError> {
        let find = |name: &str| headers.iter().position(|h| h == name);
        let require = |name: &'static str| find(name).ok_or(ParseError::MissingColumn(name));

        Ok(Self {
            commit: require("commit")?,
            file: require("file")?,
            line: require("line")?,
            category: require("type")?,
            depth: require("depth")?,
            length: require("length")?,
            author: require("author")?,
            date: require("date")?,
            time: find("time"),
            timezone: find("timezone"),
            datetime: find("datetime"),
            filename: find("filename"),
        })
    }
}

fn cell(row: &StringRecord, index: Option<usize>) -> &str {
    index.and_then(|i| row.get(i)).unwrap_or("")
}

fn metric(raw: &str) -> Option<u32> {
    raw.parse().ok()
}

/// Parses every row of `reader` into a `LineRecord`.
pub fn load_records<R: Read>(reader: R) -> std::result::Result<Vec<LineRecord>, ParseError> {
    let mut csv = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);
    let columns = Columns::resolve(csv.headers()?)?;

    let mut records = Vec::new();
    for (index, row) in csv.records().enumerate() {
        let row = row?;
        let row_number = index + 1;

        let date = cell(&row, Some(columns.date));
        let timezone = cell(&row, columns.timezone);
        let authored_at = parse_authored_at(date, timezone, cell(&row, columns.datetime))
            .ok_or(ParseError::InvalidTimestamp { row: row_number })?;

        let file = cell(&row, Some(columns.file)).to_string();
        let filename = match cell(&row, columns.filename) {
            "" => file.rsplit('/').next().unwrap_or(&file).to_string(),
            name => name.to_string(),
        };

        records.push(LineRecord {
            commit_id: cell(&row, Some(columns.commit)).to_string(),
            filename,
            file,
            category: cell(&row, Some(columns.category)).to_string(),
            line_number: metric(cell(&row, Some(columns.line))),
            indent_depth: metric(cell(&row, Some(columns.depth))),
            line_length: metric(cell(&row, Some(columns.length))),
            author: cell(&row, Some(columns.author)).to_string(),
            date: date.to_string(),
            time: cell(&row, columns.time).to_string(),
            timezone: timezone.to_string(),
            authored_at,
        });
    }

    tracing::debug!("Parsed {} line records", records.len());
    Ok(records)
}

/// Opens and parses a CSV file from disk.
pub fn load_file(path: &Path) -> Result<Vec<LineRecord>> {
    let file = File::open(path)?;
    Ok(load_records(BufReader::new(file))?)
}

/// Combined `datetime` wins; otherwise `date` at midnight in `timezone`.
///
/// Instants are truncated to whole milliseconds, the resolution the time
/// scales and the range control work in.
pub fn parse_authored_at(
    date: &str,
    timezone: &str,
    datetime: &str,
) -> Option<DateTime<FixedOffset>> {
    let instant = match datetime {
        "" => None,
        raw => parse_datetime(raw),
    };
    instant
        .or_else(|| parse_midnight(date, timezone))
        .map(|at| at.trunc_subsecs(3))
}

fn parse_datetime(raw: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%z"))
        .ok()
        .or_else(|| {
            // No offset at all: read as UTC.
            let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
                .ok()?;
            FixedOffset::east_opt(0).map(|utc| utc.from_utc_datetime(&naive))
        })
}

fn parse_midnight(date: &str, timezone: &str) -> Option<DateTime<FixedOffset>> {
    let offset = match timezone {
        "" | "Z" | "z" => "+00:00",
        tz => tz,
    };
    DateTime::parse_from_str(&format!("{}T00:00{}", date, offset), "%Y-%m-%dT%H:%M%z").ok()
}
