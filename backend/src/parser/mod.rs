//! Source CSV decoding.
//!
//! Turns the raw bytes of the municipal dataset into typed [`SourceRow`]s.
//! The dialect is plain: comma separated, one record per line, no quoting.
//! A comma inside a field is indistinguishable from a delimiter.
//!
//! Records end at `\n` or `\r\n` only; a lone `\r` stays inside the field.
//! When a header name repeats, the last column with that name wins.

use csv::{ReaderBuilder, StringRecord, Terminator};
use encoding_rs::Encoding;
use serde::Deserialize;
use std::path::Path;

use crate::error::{CsvError, CsvResult};

/// One raw record of the source dataset.
///
/// Every column is optional: short rows and empty fields read as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SourceRow {
    /// 種別
    #[serde(rename = "種別")]
    pub category: Option<String>,
    /// 避難所等の定義
    #[serde(rename = "避難所等の定義")]
    pub category_definition: Option<String>,
    /// 施設等の名称
    #[serde(rename = "施設等の名称")]
    pub facility_name: Option<String>,
    /// 住所
    #[serde(rename = "住所")]
    pub address: Option<String>,
    /// 方書
    #[serde(rename = "方書")]
    pub sub_address: Option<String>,
    /// 緯度
    #[serde(rename = "緯度")]
    pub latitude: Option<String>,
    /// 経度
    #[serde(rename = "経度")]
    pub longitude: Option<String>,
    /// 郵便番号
    #[serde(rename = "郵便番号")]
    pub postal_code: Option<String>,
}

/// Result of decoding with metadata
#[derive(Debug, Clone, Default)]
pub struct ParseResult {
    /// Decoded rows, in source order
    pub rows: Vec<SourceRow>,
    /// Column headers from the first line
    pub headers: Vec<String>,
    /// Line numbers of rows whose field count differs from the header count
    pub mismatched: Vec<u64>,
    /// Encoding actually used to decode
    pub encoding: String,
    /// Whether malformed byte sequences were replaced while decoding
    pub had_replacements: bool,
}

/// Resolve a WHATWG encoding label such as `shift_jis` or `utf-8`.
pub fn resolve_encoding(label: &str) -> CsvResult<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| CsvError::UnknownEncoding(label.to_string()))
}

/// Decode bytes to a string using the given encoding label.
///
/// Malformed sequences become U+FFFD. Returns the text, the name of the
/// encoding used, and whether any replacement happened.
pub fn decode_content(bytes: &[u8], label: &str) -> CsvResult<(String, &'static str, bool)> {
    let encoding = resolve_encoding(label)?;
    let (text, used, had_errors) = encoding.decode(bytes);
    Ok((text.into_owned(), used.name(), had_errors))
}

/// Parse decoded CSV text into rows.
///
/// # Example
/// ```ignore
/// use shelters::parser::parse_csv;
///
/// let csv = "種別,施設等の名称\n指定避難所,A\n";
/// let result = parse_csv(csv).unwrap();
///
/// assert_eq!(result.rows.len(), 1);
/// assert_eq!(result.rows[0].facility_name.as_deref(), Some("A"));
/// ```
pub fn parse_csv(content: &str) -> CsvResult<ParseResult> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let content = content.replace("\r\n", "\n");

    let mut reader = ReaderBuilder::new()
        .delimiter(b',')
        .terminator(Terminator::Any(b'\n'))
        .quoting(false)
        .flexible(true)
        .has_headers(true)
        .from_reader(content.as_bytes());

    let headers = reader.headers()?.clone();
    let mut result = ParseResult {
        headers: headers.iter().map(String::from).collect(),
        ..ParseResult::default()
    };

    if headers.is_empty() {
        return Ok(result);
    }
    let fields = field_names(&headers);

    for record in reader.records() {
        let record = record?;

        if record.len() != headers.len() {
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            result.mismatched.push(line);
        }

        let padded = pad_record(record, headers.len());
        result.rows.push(padded.deserialize(Some(&fields))?);
    }

    Ok(result)
}

/// Decode and parse raw source bytes.
pub fn parse_bytes(bytes: &[u8], label: &str) -> CsvResult<ParseResult> {
    let (content, encoding, had_replacements) = decode_content(bytes, label)?;
    let mut result = parse_csv(&content)?;
    result.encoding = encoding.to_string();
    result.had_replacements = had_replacements;
    Ok(result)
}

/// Decode and parse a local CSV file.
pub fn parse_csv_file<P: AsRef<Path>>(path: P, label: &str) -> CsvResult<ParseResult> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_bytes(&bytes, label)
}

/// Header names used to look up row fields.
///
/// Earlier columns of a repeated name are blanked so the last one is read.
fn field_names(headers: &StringRecord) -> StringRecord {
    headers
        .iter()
        .enumerate()
        .map(|(i, name)| {
            if headers.iter().skip(i + 1).any(|later| later == name) {
                ""
            } else {
                name
            }
        })
        .collect()
}

/// Fill short records with empty fields so every header has a value.
fn pad_record(record: StringRecord, width: usize) -> StringRecord {
    if record.len() >= width {
        return record;
    }
    let mut padded = record;
    while padded.len() < width {
        padded.push_field("");
    }
    padded
}
