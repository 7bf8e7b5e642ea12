//! Loader: read local catalog tables (CSV or JSON), price lists and JSON
//! documents with size limits. No network I/O; `<scheme>://` paths are refused.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde_json::Value;

use crate::normalize::{RawCell, RawTable};
use crate::schema::{validate_value, SchemaKind};
use crate::{looks_like_url_strict, IoError, IoResult};

/// Catalog exports are a few hundred rows; anything near this is a wrong file.
pub const MAX_TABLE_BYTES: u64 = 32 * 1024 * 1024;
pub const MAX_TABLE_ROWS: usize = 200_000;
/// Config and price-list documents.
pub const MAX_JSON_BYTES: u64 = 4 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Json,
}

impl TableFormat {
    /// By extension, falling back to the first non-blank byte (`[`/`{` ⇒ JSON).
    pub fn detect(path: &Path, bytes: &[u8]) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("json") => TableFormat::Json,
            Some("csv") | Some("tsv") | Some("txt") => TableFormat::Csv,
            _ => match bytes.iter().find(|b| !b.is_ascii_whitespace()) {
                Some(b'[') | Some(b'{') => TableFormat::Json,
                _ => TableFormat::Csv,
            },
        }
    }
}

// ----------------------------- Raw reads -----------------------------

pub fn ensure_local(path: &Path) -> IoResult<()> {
    if looks_like_url_strict(&path.to_string_lossy()) {
        return Err(IoError::Path(format!(
            "{} must be a local file path (no URLs)",
            path.display()
        )));
    }
    Ok(())
}

/// Read at most `limit` bytes; a longer file is an error, not a truncation.
pub fn read_bytes_with_limit(path: &Path, limit: u64) -> IoResult<Vec<u8>> {
    ensure_local(path)?;
    let f = File::open(path).map_err(|e| IoError::Read(format!("{} ({e})", path.display())))?;
    let mut buf = Vec::new();
    f.take(limit + 1)
        .read_to_end(&mut buf)
        .map_err(|e| IoError::Read(format!("{} ({e})", path.display())))?;
    if buf.len() as u64 > limit {
        return Err(IoError::Limit(format!("{} exceeds {limit} bytes", path.display())));
    }
    Ok(buf)
}

pub fn read_json_value_with_limits(path: &Path) -> IoResult<Value> {
    let bytes = read_bytes_with_limit(path, MAX_JSON_BYTES)?;
    let v: Value = serde_json::from_slice(&bytes)?;
    Ok(v)
}

// ----------------------------- Catalog tables -----------------------------

/// Load a catalog export into a `RawTable` (format detected from the path/bytes).
pub fn load_raw_table(path: &Path) -> IoResult<RawTable> {
    let bytes = read_bytes_with_limit(path, MAX_TABLE_BYTES)?;
    let table = match TableFormat::detect(path, &bytes) {
        TableFormat::Csv => parse_csv_table(&bytes)?,
        TableFormat::Json => parse_json_table(serde_json::from_slice(&bytes)?)?,
    };
    if table.rows.len() > MAX_TABLE_ROWS {
        return Err(IoError::Limit(format!(
            "{} has {} rows (max {MAX_TABLE_ROWS})",
            path.display(),
            table.rows.len()
        )));
    }
    Ok(table)
}

/// Delimiter with the most hits on the header line (`;` exports are common where
/// commas are decimal separators).
fn sniff_delimiter(bytes: &[u8]) -> u8 {
    let first = bytes.split(|b| *b == b'\n').next().unwrap_or(&[]);
    let count = |d: u8| first.iter().filter(|b| **b == d).count();
    [b';', b'\t', b',']
        .into_iter()
        .max_by_key(|d| (count(*d), *d == b','))
        .unwrap_or(b',')
}

pub fn parse_csv_table(bytes: &[u8]) -> IoResult<RawTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(sniff_delimiter(bytes))
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.trim_start_matches('\u{feff}').to_string()).collect();
    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        rows.push(
            record
                .iter()
                .map(|c| if c.is_empty() { RawCell::Empty } else { RawCell::Text(c.to_string()) })
                .collect(),
        );
    }
    Ok(RawTable { headers, rows })
}

/// Accepts `{"headers": [...], "rows": [[...]]}` or an array of flat objects.
pub fn parse_json_table(v: Value) -> IoResult<RawTable> {
    match v {
        Value::Object(_) => Ok(serde_json::from_value(v)?),
        Value::Array(items) => {
            let mut headers: Vec<String> = Vec::new();
            for item in &items {
                let obj = item.as_object().ok_or_else(|| IoError::Json {
                    pointer: "/".into(),
                    msg: "catalog array entries must be objects".into(),
                })?;
                for k in obj.keys() {
                    if !headers.iter().any(|h| h == k) {
                        headers.push(k.clone());
                    }
                }
            }
            let rows = items
                .iter()
                .map(|item| {
                    headers
                        .iter()
                        .map(|h| item.get(h).map(json_cell).unwrap_or(RawCell::Empty))
                        .collect()
                })
                .collect();
            Ok(RawTable { headers, rows })
        }
        _ => Err(IoError::Json {
            pointer: "/".into(),
            msg: "catalog must be an object with headers/rows or an array of objects".into(),
        }),
    }
}

fn json_cell(v: &Value) -> RawCell {
    match v {
        Value::Null => RawCell::Empty,
        Value::Number(n) => n.as_f64().map(RawCell::Number).unwrap_or(RawCell::Empty),
        Value::String(s) if s.trim().is_empty() => RawCell::Empty,
        Value::String(s) => RawCell::Text(s.clone()),
        other => RawCell::Text(other.to_string()),
    }
}

// ----------------------------- Price list -----------------------------

/// Name → credits. JSON object, schema-validated (non-negative numbers).
pub fn load_price_list(path: &Path) -> IoResult<BTreeMap<String, f64>> {
    let v = read_json_value_with_limits(path)?;
    validate_value(SchemaKind::PriceList, &v)?;
    let list: BTreeMap<String, f64> = serde_json::from_value(v)?;
    Ok(list.into_iter().map(|(k, p)| (k.trim().to_string(), p)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_tmp(dir: &tempfile::TempDir, name: &str, body: &str) -> std::path::PathBuf {
        let p = dir.path().join(name);
        let mut f = File::create(&p).unwrap();
        f.write_all(body.as_bytes()).unwrap();
        p
    }

    #[test]
    fn semicolon_csv_with_decimal_commas() {
        let dir = tempfile::tempdir().unwrap();
        let p = write_tmp(
            &dir,
            "listone.csv",
            "\u{feff}Ruolo;Giocatore;Squadra;Quotazione;Fantamedia\nP;Musso;Atalanta;12;6,00\nD;Dorgu;Lecce;13;\n",
        );
        let t = load_raw_table(&p).unwrap();
        assert_eq!(t.headers, vec!["Ruolo", "Giocatore", "Squadra", "Quotazione", "Fantamedia"]);
        assert_eq!(t.rows.len(), 2);
        assert_eq!(t.rows[0][4], RawCell::Text("6,00".into()));
        assert_eq!(t.rows[1][4], RawCell::Empty);
    }

    #[test]
    fn comma_csv_ragged_rows() {
        let t = parse_csv_table(b"name,role,price\nA,P,1\nB,D\n").unwrap();
        assert_eq!(t.rows[1].len(), 2);
    }

    #[test]
    fn json_array_of_objects() {
        let v = serde_json::json!([
            { "giocatore": "Musso", "ruolo": "P", "crediti": 12 },
            { "giocatore": "Dorgu", "ruolo": "D", "crediti": 13, "squadra": "Lecce" }
        ]);
        let t = parse_json_table(v).unwrap();
        assert_eq!(t.headers.len(), 4);
        let squadra = t.headers.iter().position(|h| h == "squadra").unwrap();
        assert_eq!(t.rows[0][squadra], RawCell::Empty);
        let crediti = t.headers.iter().position(|h| h == "crediti").unwrap();
        assert_eq!(t.rows[1][crediti], RawCell::Number(13.0));
    }

    #[test]
    fn json_headers_rows_shape_detected_without_extension() {
        let dir = tempfile::tempdir().unwrap();
        let p = write_tmp(&dir, "catalog", r#"{"headers":["Nome","R","Qt"],"rows":[["Musso","P",12]]}"#);
        let t = load_raw_table(&p).unwrap();
        assert_eq!(t.rows[0][2], RawCell::Number(12.0));
    }

    #[test]
    fn urls_are_refused() {
        let err = load_raw_table(Path::new("https://example.com/listone.csv")).unwrap_err();
        assert!(matches!(err, IoError::Path(_)));
    }

    #[test]
    fn oversized_documents_are_refused() {
        let dir = tempfile::tempdir().unwrap();
        let p = write_tmp(&dir, "big.json", &" ".repeat(64));
        assert!(matches!(read_bytes_with_limit(&p, 16), Err(IoError::Limit(_))));
    }

    #[test]
    fn price_list_trims_names() {
        let dir = tempfile::tempdir().unwrap();
        let p = write_tmp(&dir, "listino.json", r#"{" Musso ": 12, "Dorgu": 13.5}"#);
        let list = load_price_list(&p).unwrap();
        assert_eq!(list["Musso"], 12.0);
        assert_eq!(list["Dorgu"], 13.5);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = load_raw_table(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, IoError::Read(_)));
    }
}
