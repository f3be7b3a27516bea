//! Delimited-text input: header parsing, URL column detection and row
//! streaming.

pub mod fields;

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::{debug, info, warn};

use fields::{ends_inside_quotes, split_fields};

/// Column names tried, in order, when no URL column is configured.
pub const URL_COLUMN_CANDIDATES: [&str; 7] =
    ["URL", "url", "Url", "Page_URL", "page_url", "Link", "link"];

/// Data rows inspected when sniffing for a URL-valued column.
pub const SNIFF_ROWS: usize = 5;

/// One data row of the input table.
#[derive(Debug, Clone, PartialEq)]
pub struct InputRow {
    /// 1-based line number where the row starts in the input file
    pub line: usize,
    /// URL field, `None` when the row is too short to contain it
    pub url: Option<String>,
    /// Traffic value, `None` when missing or not numeric
    pub traffic: Option<f64>,
    /// Every field of the row keyed by its header name
    pub columns: BTreeMap<String, String>,
}

/// Header of a delimited file and the delimiter it uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableHeader {
    pub columns: Vec<String>,
    pub delimiter: char,
}

impl TableHeader {
    /// Parses the header line. Tab-separated when the line contains a tab,
    /// comma-separated otherwise.
    pub fn parse(line: &str) -> Self {
        let delimiter = if line.contains('\t') { '\t' } else { ',' };
        let columns = split_fields(line, delimiter)
            .into_iter()
            .map(|c| c.trim().to_string())
            .collect();
        Self { columns, delimiter }
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

/// Picks the URL column: `configured` if present in the header, else the
/// first known column name, else the first column whose sampled values look
/// like absolute URLs.
pub fn detect_url_column(
    header: &TableHeader,
    sample_rows: &[Vec<String>],
    configured: Option<&str>,
) -> Result<usize> {
    if let Some(name) = configured {
        if let Some(index) = header.position(name) {
            return Ok(index);
        }
        warn!("Configured URL column '{}' not found, trying auto-detection", name);
    }

    for candidate in URL_COLUMN_CANDIDATES {
        if let Some(index) = header.position(candidate) {
            info!("Found URL column: {}", candidate);
            return Ok(index);
        }
    }

    for (index, name) in header.columns.iter().enumerate() {
        let looks_like_urls = sample_rows.iter().any(|row| {
            row.get(index).is_some_and(|value| {
                let value = value.trim();
                value.starts_with("http://") || value.starts_with("https://")
            })
        });
        if looks_like_urls {
            info!("Detected URL column: {}", name);
            return Ok(index);
        }
    }

    bail!(
        "Could not automatically detect URL column. Available columns: {:?}",
        header.columns
    )
}

/// Streams rows of a delimited file with a header line.
pub struct TableReader {
    header: TableHeader,
    url_index: usize,
    traffic_index: Option<usize>,
    lines: Lines<BufReader<File>>,
    line_number: usize,
    pending: Vec<(usize, Vec<String>)>,
}

impl TableReader {
    /// Opens `path`, reads the header and detects the URL column from the
    /// first [`SNIFF_ROWS`] data rows.
    pub fn open(path: &Path, url_column: Option<&str>, traffic_column: &str) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open input file {}", path.display()))?;
        let mut lines = BufReader::new(file).lines();

        let header_line = match lines.next() {
            Some(line) => line.context("Failed to read header line")?,
            None => bail!("Input file {} is empty", path.display()),
        };
        let header = TableHeader::parse(header_line.trim_start_matches('\u{feff}'));
        debug!("Header columns: {:?}", header.columns);

        let mut reader = Self {
            header,
            url_index: 0,
            traffic_index: None,
            lines,
            line_number: 1,
            pending: Vec::new(),
        };

        while reader.pending.len() < SNIFF_ROWS {
            match reader.next_fields()? {
                Some(row) => reader.pending.push(row),
                None => break,
            }
        }

        let sample: Vec<Vec<String>> = reader.pending.iter().map(|(_, f)| f.clone()).collect();
        reader.url_index = detect_url_column(&reader.header, &sample, url_column)?;
        reader.traffic_index = reader.header.position(traffic_column);
        if reader.traffic_index.is_none() {
            debug!("Traffic column '{}' not present", traffic_column);
        }

        Ok(reader)
    }

    pub fn header(&self) -> &TableHeader {
        &self.header
    }

    pub fn url_column(&self) -> &str {
        &self.header.columns[self.url_index]
    }

    pub fn has_traffic(&self) -> bool {
        self.traffic_index.is_some()
    }

    fn next_fields(&mut self) -> Result<Option<(usize, Vec<String>)>> {
        let delimiter = self.header.delimiter;
        let record = next_record(&mut self.lines, &mut self.line_number, delimiter)?;
        Ok(record.map(|(line, text)| (line, split_fields(&text, delimiter))))
    }

    fn to_row(&self, line: usize, fields: Vec<String>) -> InputRow {
        let url = fields.get(self.url_index).cloned();
        let traffic = self
            .traffic_index
            .and_then(|i| fields.get(i))
            .and_then(|value| parse_traffic(value));
        let columns = self
            .header
            .columns
            .iter()
            .cloned()
            .zip(fields)
            .collect();
        InputRow {
            line,
            url,
            traffic,
            columns,
        }
    }

    /// Reads up to `max` rows. An empty vector means the input is exhausted.
    pub fn read_chunk(&mut self, max: usize) -> Result<Vec<InputRow>> {
        let mut rows = Vec::with_capacity(max.min(4096));
        while rows.len() < max {
            let next = if self.pending.is_empty() {
                self.next_fields()?
            } else {
                Some(self.pending.remove(0))
            };
            match next {
                Some((line, fields)) => rows.push(self.to_row(line, fields)),
                None => break,
            }
        }
        Ok(rows)
    }
}

/// Reads the next non-blank record, joining physical lines while a quoted
/// field is still open. Returns the line number the record starts on.
fn next_record<B: BufRead>(
    lines: &mut Lines<B>,
    line_number: &mut usize,
    delimiter: char,
) -> Result<Option<(usize, String)>> {
    while let Some(line) = lines.next() {
        *line_number += 1;
        let line = line.with_context(|| format!("Failed to read line {}", line_number))?;
        if line.trim().is_empty() {
            continue;
        }

        let start = *line_number;
        let mut record = line;
        while ends_inside_quotes(&record, delimiter) {
            match lines.next() {
                Some(next) => {
                    *line_number += 1;
                    let next =
                        next.with_context(|| format!("Failed to read line {}", line_number))?;
                    record.push('\n');
                    record.push_str(&next);
                }
                None => {
                    warn!("Unterminated quoted field in record starting at line {}", start);
                    break;
                }
            }
        }
        return Ok(Some((start, record)));
    }
    Ok(None)
}

/// Parses a traffic cell, accepting thousands separators such as `1,234`.
pub fn parse_traffic(value: &str) -> Option<f64> {
    let cleaned: String = value.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// Counts the data records of a file, for progress reporting.
pub fn count_data_rows(path: &Path) -> Result<u64> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open input file {}", path.display()))?;
    let mut lines = BufReader::new(file).lines();
    let delimiter = match lines.next() {
        Some(header) => TableHeader::parse(&header?).delimiter,
        None => return Ok(0),
    };

    let mut line_number = 1;
    let mut count = 0u64;
    while next_record(&mut lines, &mut line_number, delimiter)?.is_some() {
        count += 1;
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_table(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_header_delimiter() {
        assert_eq!(TableHeader::parse("URL\tTraffic").delimiter, '\t');
        let header = TableHeader::parse("URL, Traffic");
        assert_eq!(header.delimiter, ',');
        assert_eq!(header.columns, vec!["URL", "Traffic"]);
    }

    #[test]
    fn test_detect_by_candidate_name() {
        let header = TableHeader::parse("Visits,page_url");
        assert_eq!(detect_url_column(&header, &[], None).unwrap(), 1);
        assert_eq!(detect_url_column(&header, &[], Some("Visits")).unwrap(), 0);
        assert_eq!(detect_url_column(&header, &[], Some("Missing")).unwrap(), 1);
    }

    #[test]
    fn test_detect_by_sniffing_values() {
        let header = TableHeader::parse("Visits,Address");
        let rows = vec![vec!["3".to_string(), "https://site.example/".to_string()]];
        assert_eq!(detect_url_column(&header, &rows, None).unwrap(), 1);

        let rows = vec![vec!["3".to_string(), "nothing".to_string()]];
        let err = detect_url_column(&header, &rows, None).unwrap_err();
        assert!(err.to_string().contains("Could not automatically detect URL column"));
    }

    #[test]
    fn test_reader_chunks_rows() {
        let file = write_table(
            "Traffic,Page\n\
             10,https://site.example/careers\n\
             \n\
             \"1,200\",https://site.example/products/x\n\
             n/a,https://site.example/\n\
             short\n",
        );
        let mut reader = TableReader::open(file.path(), None, "Traffic").unwrap();
        assert_eq!(reader.url_column(), "Page");
        assert!(reader.has_traffic());

        let first = reader.read_chunk(2).unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].line, 2);
        assert_eq!(first[0].traffic, Some(10.0));
        assert_eq!(first[1].line, 4);
        assert_eq!(first[1].traffic, Some(1200.0));

        let rest = reader.read_chunk(10).unwrap();
        assert_eq!(rest.len(), 2);
        assert_eq!(rest[0].traffic, None);
        assert_eq!(rest[1].url, None);
        assert!(reader.read_chunk(10).unwrap().is_empty());
    }

    #[test]
    fn test_missing_traffic_column() {
        let file = write_table("URL\nhttps://site.example/\n");
        let mut reader = TableReader::open(file.path(), None, "Traffic").unwrap();
        assert!(!reader.has_traffic());
        let rows = reader.read_chunk(5).unwrap();
        assert_eq!(rows[0].url.as_deref(), Some("https://site.example/"));
        assert_eq!(rows[0].traffic, None);
    }

    #[test]
    fn test_count_data_rows() {
        let file = write_table("URL\na\n\nb\n");
        assert_eq!(count_data_rows(file.path()).unwrap(), 2);

        let file = write_table("URL,Title\na,\"two\n\nlines\"\nb,x\n");
        assert_eq!(count_data_rows(file.path()).unwrap(), 2);
    }

    #[test]
    fn test_quoted_field_spans_lines() {
        let file = write_table(
            "URL,Title,Traffic\n\
             https://site.example/careers,\"two\nlines\",5\n\
             https://site.example/,home,7\n",
        );
        let mut reader = TableReader::open(file.path(), None, "Traffic").unwrap();
        let rows = reader.read_chunk(10).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].line, 2);
        assert_eq!(rows[0].url.as_deref(), Some("https://site.example/careers"));
        assert_eq!(rows[0].traffic, Some(5.0));
        assert_eq!(rows[0].columns["Title"], "two\nlines");
        assert_eq!(rows[1].line, 4);
        assert_eq!(rows[1].traffic, Some(7.0));
    }

    #[test]
    fn test_rows_carry_every_column() {
        let file = write_table("URL\tTitle\tTraffic\nhttps://site.example/\tHome\t3\nhttps://site.example/x\n");
        let mut reader = TableReader::open(file.path(), None, "Traffic").unwrap();
        let rows = reader.read_chunk(10).unwrap();

        assert_eq!(rows[0].columns.len(), 3);
        assert_eq!(rows[0].columns["Title"], "Home");
        assert_eq!(rows[0].columns["Traffic"], "3");
        assert_eq!(rows[1].columns.len(), 1);
        assert!(!rows[1].columns.contains_key("Title"));
    }

    #[test]
    fn test_parse_traffic() {
        assert_eq!(parse_traffic(" 42 "), Some(42.0));
        assert_eq!(parse_traffic("1,234.5"), Some(1234.5));
        assert_eq!(parse_traffic(""), None);
        assert_eq!(parse_traffic("NaN"), None);
        assert_eq!(parse_traffic("abc"), None);
    }
}
