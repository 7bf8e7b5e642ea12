// End-to-end: catalog file on disk → snapshot → documents.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use assert_json_diff::assert_json_include;
use serde_json::json;
use tempfile::TempDir;

use fe_algo::AllocatorConfig;
use fe_io::normalize::HeaderSynonyms;
use fe_pipeline::{CatalogStore, GenerateRequest, Generator, PairRequest, PipelineError};

fn write_catalog(dir: &Path, per_role: [(&str, usize); 4]) -> PathBuf {
    let mut csv = String::from("Nome;Squadra;Ruolo;Quotazione;Fantamedia;Presenze\n");
    for (role, n) in per_role {
        for i in 0..n {
            // decimal commas, one junk row per role that must be dropped
            csv.push_str(&format!("{role}-{i};Club{};{role};{},5;{},1;{}\n", i % 5, 3 + i * 2, 6 + i % 3, 20 + i));
        }
        csv.push_str(&format!(";Club;{role};10;6;10\n"));
    }
    csv.push_str("Ghost;Club;Allenatore;10;6;10\n");
    let path = dir.join("catalog.csv");
    fs::write(&path, csv).unwrap();
    path
}

fn store_with(dir: &Path, per_role: [(&str, usize); 4], prices: Option<BTreeMap<String, f64>>) -> (CatalogStore, Result<(), PipelineError>) {
    let store = CatalogStore::new();
    let path = write_catalog(dir, per_role);
    let res = store.load_path(&path, &HeaderSynonyms::default(), prices).map(|_| ());
    (store, res)
}

const ROOMY: [(&str, usize); 4] = [("P", 6), ("D", 16), ("C", 16), ("A", 12)];

fn generator(store: &CatalogStore) -> Generator {
    Generator::new(store.snapshot().unwrap()).with_allocator(AllocatorConfig { max_tries: 80, ..Default::default() })
}

#[test]
fn csv_catalog_produces_reproducible_roster() {
    let dir = TempDir::new().unwrap();
    let (store, loaded) = store_with(dir.path(), ROOMY, None);
    loaded.unwrap();

    let snap = store.snapshot().unwrap();
    let report = snap.report();
    assert_eq!(report.candidates, 50);
    assert_eq!(report.dropped.empty_name, 4);
    assert_eq!(report.dropped.unknown_role, 1);

    let req = GenerateRequest { mode: "Offensiva".into(), seed: Some("e2e".into()), ..Default::default() };
    let g = generator(&store);
    let a = g.generate(&req).unwrap();
    let b = g.generate(&req).unwrap();
    assert_eq!(a.id, b.id);

    let v = serde_json::to_value(&a).unwrap();
    assert_json_include!(
        actual: v,
        expected: json!({
            "mode": "offensiva",
            "seed": "e2e",
            "catalog_sha256": report.catalog_sha256,
            "summary": {
                "counts": { "P": 3, "D": 8, "C": 8, "A": 6 },
                "budget_min": 0.0,
                "budget_max": 1000.0,
                "within_range": true
            },
            "warnings": { "missing_prices": [] }
        })
    );

    let sum: f64 = a.body.slots.iter().map(|s| s.price).sum();
    assert_eq!(sum, a.body.total);
    assert!(a.body.slots.iter().all(|s| s.price.fract() == 0.5));
}

#[test]
fn price_list_reprices_and_warns() {
    let dir = TempDir::new().unwrap();
    let list: BTreeMap<String, f64> = [("P-0".to_string(), 1.0), ("A-0".to_string(), 2.0)].into();
    let (store, loaded) = store_with(dir.path(), ROOMY, Some(list));
    loaded.unwrap();
    assert_eq!(store.snapshot().unwrap().repriced, 2);

    let req = GenerateRequest { cheapest: true, seed: Some("c".into()), ..Default::default() };
    let doc = generator(&store).generate(&req).unwrap();
    let names: Vec<&str> = doc.body.slots.iter().map(|s| s.name.as_str()).collect();
    assert!(names.contains(&"P-0"));
    assert_eq!(doc.body.warnings.missing_prices.len(), 23);
    assert!(doc.body.warnings.missing_prices.iter().all(|m| m.name != "A-0"));
}

#[test]
fn pair_documents_carry_diversity() {
    let dir = TempDir::new().unwrap();
    let (store, loaded) = store_with(dir.path(), ROOMY, None);
    loaded.unwrap();
    let req = PairRequest {
        base: GenerateRequest { seed: Some("pair".into()), ..Default::default() },
        second_mode: Some("difensiva".into()),
        min_distinct: 0.6,
    };
    let doc = generator(&store).generate_pair(&req).unwrap();
    assert_eq!(doc.second.body.mode, "difensiva");
    assert_ne!(doc.first.id, doc.second.id);
    assert!(doc.diversity.satisfied || doc.second.body.diagnostics.used_fallback);
    assert!(["seeded", "widened_budget", "cheapest_fallback"].contains(&doc.diversity.stage.as_str()));
}

#[test]
fn missing_columns_are_schema_errors() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.csv");
    fs::write(&path, "Nome;Squadra\nRossi;Roma\n").unwrap();
    let err = CatalogStore::new()
        .load_path(&path, &HeaderSynonyms::default(), None)
        .unwrap_err();
    assert!(matches!(err, PipelineError::Schema(_)), "{err}");
}

#[test]
fn short_buckets_are_insufficient() {
    let dir = TempDir::new().unwrap();
    let (store, loaded) = store_with(dir.path(), [("P", 2), ("D", 16), ("C", 16), ("A", 12)], None);
    loaded.unwrap();
    let err = generator(&store).generate(&GenerateRequest::default()).unwrap_err();
    assert!(matches!(err, PipelineError::Allocate(_)), "{err}");
}

#[test]
fn unknown_modes_are_config_errors() {
    let dir = TempDir::new().unwrap();
    let (store, loaded) = store_with(dir.path(), ROOMY, None);
    loaded.unwrap();
    let req = GenerateRequest { mode: "catenaccio".into(), ..Default::default() };
    assert!(matches!(generator(&store).generate(&req), Err(PipelineError::Config(_))));
}
