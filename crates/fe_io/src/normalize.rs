//! Candidate normalizer: heterogeneous raw tables → canonical `CandidateRecord`s.
//!
//! Header resolution:
//! - Labels are compared after lower-casing and removing spaces and underscores.
//! - Pass 1 (exact) runs for every field before pass 2 (substring).
//! - A column claimed by one field is never reused by another.
//! - Synonyms shorter than three characters only take part in pass 1.
//! - `name`, `role`, `price` are mandatory; the rest default to zero/empty.
//!
//! Rows are dropped (and counted) for an empty name, an unresolvable role, or a
//! price that is not a finite non-negative number. Nothing here logs.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use fe_core::{CandidateRecord, Role};

use crate::SchemaError;

// ----------------------------- Raw input -----------------------------------

/// One raw cell as it came out of a spreadsheet export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawCell {
    Number(f64),
    Text(String),
    Empty,
}

impl RawCell {
    /// Text view (numbers rendered with `Display`, empty as "").
    pub fn text(&self) -> Cow<'_, str> {
        match self {
            RawCell::Text(s) => Cow::Borrowed(s.trim()),
            RawCell::Number(n) => Cow::Owned(n.to_string()),
            RawCell::Empty => Cow::Borrowed(""),
        }
    }

    /// Numeric view: numbers as-is, text through `parse_number`, empty as 0.
    pub fn numeric(&self) -> f64 {
        match self {
            RawCell::Number(n) => *n,
            RawCell::Text(s) => parse_number(s),
            RawCell::Empty => 0.0,
        }
    }
}

/// Header labels plus rows of raw cells. Short rows read as trailing empties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<RawCell>>,
}

// ----------------------------- Logical fields -----------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Name,
    Team,
    Role,
    Price,
    FantasyRating,
    Rating,
    Appearances,
}

impl Field {
    /// Resolution order. `FantasyRating` precedes `Rating` so "fantavoto" columns
    /// are claimed before the bare "voto" synonym can see them.
    pub const ALL: [Field; 7] = [
        Field::Name,
        Field::Team,
        Field::Role,
        Field::Price,
        Field::FantasyRating,
        Field::Rating,
        Field::Appearances,
    ];

    pub const MANDATORY: [Field; 3] = [Field::Name, Field::Role, Field::Price];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Team => "team",
            Field::Role => "role",
            Field::Price => "price",
            Field::FantasyRating => "fantasy_rating",
            Field::Rating => "rating",
            Field::Appearances => "appearances",
        }
    }
}

/// Field → accepted header labels (any case, spaces/underscores ignored).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderSynonyms {
    map: BTreeMap<Field, Vec<String>>,
}

impl Default for HeaderSynonyms {
    fn default() -> Self {
        let table: [(Field, &[&str]); 7] = [
            (Field::Name, &["name", "nome", "giocatore", "calciatore", "player"]),
            (Field::Team, &["team", "squadra", "club", "sq"]),
            (Field::Role, &["role", "ruolo", "r", "posizione", "position"]),
            (
                Field::Price,
                &[
                    "price", "quotazione", "prezzo", "crediti", "valore", "costo", "qt.a", "qta",
                    "quotazione attuale", "qt", "quota",
                ],
            ),
            (
                Field::FantasyRating,
                &["fantasy_rating", "fantamedia", "fantavoto", "fantam", "fm", "mfv"],
            ),
            (Field::Rating, &["rating", "media voto", "voto", "mv"]),
            (Field::Appearances, &["appearances", "presenze", "partite", "apps", "pg", "pv"]),
        ];
        let map = table
            .into_iter()
            .map(|(f, syns)| (f, syns.iter().map(|s| s.to_string()).collect()))
            .collect();
        Self { map }
    }
}

impl HeaderSynonyms {
    /// Prepend extra labels for `field` (tried before the defaults).
    pub fn with(mut self, field: Field, labels: &[&str]) -> Self {
        let entry = self.map.entry(field).or_default();
        let mut merged: Vec<String> = labels.iter().map(|s| s.to_string()).collect();
        merged.append(entry);
        *entry = merged;
        self
    }

    pub fn labels(&self, field: Field) -> &[String] {
        self.map.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Lower-case, drop spaces and underscores.
pub fn normalize_label(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Resolved column per field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    columns: BTreeMap<Field, usize>,
}

impl ColumnMap {
    pub fn get(&self, field: Field) -> Option<usize> {
        self.columns.get(&field).copied()
    }
}

pub fn resolve_columns(headers: &[String], synonyms: &HeaderSynonyms) -> Result<ColumnMap, SchemaError> {
    let labels: Vec<String> = headers.iter().map(|h| normalize_label(h)).collect();
    let mut claimed: BTreeSet<usize> = BTreeSet::new();
    let mut columns: BTreeMap<Field, usize> = BTreeMap::new();

    // Pass 1: exact.
    for field in Field::ALL {
        let hit = synonyms.labels(field).iter().find_map(|syn| {
            let syn = normalize_label(syn);
            labels
                .iter()
                .enumerate()
                .find(|(i, l)| !claimed.contains(i) && **l == syn)
                .map(|(i, _)| i)
        });
        if let Some(i) = hit {
            claimed.insert(i);
            columns.insert(field, i);
        }
    }

    // Pass 2: substring, unresolved fields only. Synonyms under 3 chars match exactly or not at all.
    for field in Field::ALL {
        if columns.contains_key(&field) {
            continue;
        }
        let hit = synonyms.labels(field).iter().find_map(|syn| {
            let syn = normalize_label(syn);
            if syn.chars().count() < 3 {
                return None;
            }
            labels
                .iter()
                .enumerate()
                .find(|(i, l)| !claimed.contains(i) && l.contains(syn.as_str()))
                .map(|(i, _)| i)
        });
        if let Some(i) = hit {
            claimed.insert(i);
            columns.insert(field, i);
        }
    }

    let missing: Vec<&'static str> = Field::MANDATORY
        .iter()
        .filter(|f| !columns.contains_key(*f))
        .map(|f| f.as_str())
        .collect();
    if !missing.is_empty() {
        return Err(SchemaError { missing });
    }
    Ok(ColumnMap { columns })
}

// ----------------------------- Token parsing -----------------------------------

/// Locale-tolerant number parsing. Never fails: unparseable or non-finite → 0.
///
/// Patterns, first match wins:
/// (a) `1.234,56` thousands-dot + comma-decimal;
/// (b) `1,234.56` thousands-comma + dot-decimal;
/// (c) a single comma and no dot: comma is the decimal separator (`6,75`);
/// (d) anything else: commas stripped, parsed as-is.
pub fn parse_number(token: &str) -> f64 {
    let t = token.trim();
    let parsed = if is_grouped_decimal(t, '.', ',') {
        t.replace('.', "").replace(',', ".").parse::<f64>()
    } else if is_grouped_decimal(t, ',', '.') {
        t.replace(',', "").parse::<f64>()
    } else if t.matches(',').count() == 1 && !t.contains('.') {
        t.replace(',', ".").parse::<f64>()
    } else {
        t.replace(',', "").parse::<f64>()
    };
    match parsed {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// `[-+]? d{1,3} (group d{3})* decimal d+`
fn is_grouped_decimal(t: &str, group: char, decimal: char) -> bool {
    let body = t.strip_prefix(['-', '+']).unwrap_or(t);
    let Some((int_part, frac)) = body.split_once(decimal) else {
        return false;
    };
    if frac.is_empty() || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let mut groups = int_part.split(group);
    let head_ok = groups
        .next()
        .map_or(false, |h| (1..=3).contains(&h.len()) && h.bytes().all(|b| b.is_ascii_digit()));
    head_ok && groups.all(|g| g.len() == 3 && g.bytes().all(|b| b.is_ascii_digit()))
}

/// Role from a free-text label: literal codes first, then Italian substrings.
pub fn resolve_role(token: &str) -> Option<Role> {
    let t = token.trim().to_lowercase();
    match t.as_str() {
        "p" => return Some(Role::P),
        "d" => return Some(Role::D),
        "c" => return Some(Role::C),
        "a" => return Some(Role::A),
        _ => {}
    }
    const RULES: [(&[&str], Role); 4] = [
        (&["port"], Role::P),
        (&["dif"], Role::D),
        (&["centro", "med"], Role::C),
        (&["att", "punta", "ala", "est"], Role::A),
    ];
    RULES
        .iter()
        .find(|(needles, _)| needles.iter().any(|n| t.contains(n)))
        .map(|(_, role)| *role)
}

// ----------------------------- Normalization -----------------------------------

/// Rows discarded during normalization, by reason.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DropStats {
    pub empty_name: usize,
    pub unknown_role: usize,
    pub invalid_price: usize,
}

impl DropStats {
    pub fn total(&self) -> usize {
        self.empty_name + self.unknown_role + self.invalid_price
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedCatalog {
    /// Accepted candidates in input row order.
    pub candidates: Vec<CandidateRecord>,
    pub dropped: DropStats,
}

pub fn normalize(table: &RawTable, synonyms: &HeaderSynonyms) -> Result<NormalizedCatalog, SchemaError> {
    let cols = resolve_columns(&table.headers, synonyms)?;
    let empty = RawCell::Empty;
    let cell = |row: &[RawCell], field: Field| -> RawCell {
        cols.get(field)
            .and_then(|i| row.get(i))
            .unwrap_or(&empty)
            .clone()
    };

    let mut candidates = Vec::with_capacity(table.rows.len());
    let mut dropped = DropStats::default();

    for row in &table.rows {
        let name = cell(row, Field::Name).text().into_owned();
        if name.is_empty() {
            dropped.empty_name += 1;
            continue;
        }
        let Some(role) = resolve_role(&cell(row, Field::Role).text()) else {
            dropped.unknown_role += 1;
            continue;
        };
        let price = cell(row, Field::Price).numeric();
        if !price.is_finite() || price < 0.0 {
            dropped.invalid_price += 1;
            continue;
        }

        let team = cell(row, Field::Team).text().into_owned();
        let rating = non_negative(cell(row, Field::Rating).numeric());
        let fantasy_rating = non_negative(cell(row, Field::FantasyRating).numeric());
        let appearances = non_negative(cell(row, Field::Appearances).numeric()).trunc() as u32;

        candidates.push(
            CandidateRecord::new(name, team, role, price).with_stats(rating, fantasy_rating, appearances),
        );
    }

    Ok(NormalizedCatalog { candidates, dropped })
}

fn non_negative(v: f64) -> f64 {
    if v.is_finite() && v > 0.0 {
        v
    } else {
        0.0
    }
}
