// Loader + normalizer against files on disk, compared as JSON.

use std::fs;

use assert_json_diff::{assert_json_eq, assert_json_include};
use serde_json::json;

use fe_io::loader::{load_price_list, load_raw_table};
use fe_io::normalize::{normalize, HeaderSynonyms};
use fe_io::IoError;

#[test]
fn csv_and_json_exports_normalize_identically() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("listone.csv");
    fs::write(
        &csv,
        "\u{feff}Giocatore;Squadra;Ruolo;Quotazione;FM\n\
         Musso;Atalanta;Portiere;12,5;6,1\n\
         Dorgu;Lecce;Dif;1.234,0;6\n\
         ;Lecce;D;3;6\n",
    )
    .unwrap();
    let js = dir.path().join("listone.json");
    fs::write(
        &js,
        r#"[
            {"Giocatore": "Musso", "Squadra": "Atalanta", "Ruolo": "Portiere", "Quotazione": 12.5, "FM": 6.1},
            {"Giocatore": "Dorgu", "Squadra": "Lecce", "Ruolo": "Dif", "Quotazione": "1.234,0", "FM": 6},
            {"Giocatore": null, "Squadra": "Lecce", "Ruolo": "D", "Quotazione": 3, "FM": 6}
        ]"#,
    )
    .unwrap();

    let syn = HeaderSynonyms::default();
    let from_csv = normalize(&load_raw_table(&csv).unwrap(), &syn).unwrap();
    let from_json = normalize(&load_raw_table(&js).unwrap(), &syn).unwrap();

    let a = serde_json::to_value(&from_csv.candidates).unwrap();
    let b = serde_json::to_value(&from_json.candidates).unwrap();
    assert_json_eq!(a, b);
    assert_json_include!(
        actual: a,
        expected: json!([
            { "name": "Musso", "team": "Atalanta", "role": "P", "price": 12.5, "fantasy_rating": 6.1 },
            { "name": "Dorgu", "role": "D", "price": 1234.0 }
        ])
    );
    assert_eq!(from_csv.dropped.empty_name, 1);
    assert_eq!(from_json.dropped, from_csv.dropped);
}

#[test]
fn unresolved_headers_name_the_missing_fields() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("bad.csv");
    fs::write(&p, "Giocatore,Squadra\nMusso,Atalanta\n").unwrap();
    let err = normalize(&load_raw_table(&p).unwrap(), &HeaderSynonyms::default()).unwrap_err();
    assert_eq!(err.missing, vec!["role", "price"]);
}

#[test]
fn price_lists_are_schema_checked() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("listino.json");
    fs::write(&good, r#"{" Musso ": 14, "Dorgu": 9.5}"#).unwrap();
    let list = load_price_list(&good).unwrap();
    assert_json_eq!(json!(list), json!({"Dorgu": 9.5, "Musso": 14.0}));

    let bad = dir.path().join("neg.json");
    fs::write(&bad, r#"{"Musso": -1}"#).unwrap();
    match load_price_list(&bad) {
        Err(IoError::ConfigSchema { pointer, .. }) => assert_eq!(pointer, "/Musso"),
        other => panic!("expected schema violation, got {other:?}"),
    }
}
