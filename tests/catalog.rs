mod common;

use common::{BAKERY_PRICE_LIST, DAIRY_PRICE_LIST, TestWorkspace};
use encoding_rs::WINDOWS_1251;
use price_catalog::{
    catalog::{Catalog, DiagnosticKind, ReadOptions},
    discovery::{self, DEFAULT_MARKER},
    normalize::{CatalogEntry, round_to_cents},
};
use proptest::prelude::*;

fn load_dir(workspace: &TestWorkspace) -> (Catalog, price_catalog::catalog::LoadReport) {
    let paths = discovery::list_price_files(workspace.path(), DEFAULT_MARKER).expect("list");
    let mut catalog = Catalog::new();
    let report = catalog.load(&paths, &ReadOptions::default());
    (catalog, report)
}

fn names(entries: &[&CatalogEntry]) -> Vec<String> {
    entries.iter().map(|e| e.name.clone()).collect()
}

#[test]
fn single_row_is_normalized_from_decimal_comma() {
    let workspace = TestWorkspace::new();
    let path = workspace.write("price_milk.csv", "товар,цена,вес\nМолоко,\"80,5\",1\n");
    let mut catalog = Catalog::new();
    catalog.load(&[&path], &ReadOptions::default());

    assert_eq!(
        catalog.entries(),
        &[CatalogEntry {
            source_id: path.display().to_string(),
            name: "Молоко".to_string(),
            unit_price: 80.5,
            unit_weight: 1.0,
            ratio: 80.5,
        }]
    );
}

#[test]
fn zero_weight_row_is_dropped_with_diagnostic() {
    let workspace = TestWorkspace::new();
    workspace.write("price_dairy.csv", DAIRY_PRICE_LIST);
    let (catalog, report) = load_dir(&workspace);

    assert_eq!(catalog.len(), 2);
    assert_eq!(report.rows_loaded, 2);
    assert_eq!(report.rows_skipped, 1);
    let diagnostic = &report.diagnostics[0];
    assert_eq!(diagnostic.kind, DiagnosticKind::Row);
    assert_eq!(diagnostic.line, Some(4));
    assert!(diagnostic.message.contains("Мука"));
}

#[test]
fn search_ranks_matches_by_price_per_unit() {
    let workspace = TestWorkspace::new();
    workspace.write("price_dairy.csv", DAIRY_PRICE_LIST);
    let (catalog, _) = load_dir(&workspace);

    let results = catalog.search("мол").expect("search");
    assert_eq!(names(&results), vec!["Молоко", "Молочный шоколад"]);
    assert_eq!(results[0].ratio, 80.5);
    assert_eq!(results[1].ratio, 120.0);
}

#[test]
fn only_marked_csv_files_are_loaded() {
    let workspace = TestWorkspace::new();
    workspace.write("price_list.csv", DAIRY_PRICE_LIST);
    workspace.write("report.csv", "товар,цена,вес\nСыр,500,1\n");
    let (catalog, report) = load_dir(&workspace);

    assert_eq!(report.files_loaded, 1);
    assert!(catalog.entries().iter().all(|e| e.source_id.ends_with("price_list.csv")));
    assert!(catalog.search("сыр").expect("search").is_empty());
}

#[test]
fn files_with_different_layouts_share_one_catalog() {
    let workspace = TestWorkspace::new();
    workspace.write("price_dairy.csv", DAIRY_PRICE_LIST);
    workspace.write("price_bakery.tsv", BAKERY_PRICE_LIST);
    let (catalog, report) = load_dir(&workspace);

    assert_eq!(report.files_loaded, 2);
    assert_eq!(catalog.len(), 4);
    let results = catalog.search("молок").expect("search");
    assert_eq!(names(&results), vec!["Молоко", "Молоко топлёное"]);
    assert_eq!(results[1].ratio, round_to_cents(95.0 / 0.9));
}

#[test]
fn broken_file_does_not_stop_the_pass() {
    let workspace = TestWorkspace::new();
    workspace.write("price_a.csv", "товар,цена,вес\nСыр,500,1\nХлеб\n");
    workspace.write("price_b.csv", DAIRY_PRICE_LIST);
    let (catalog, report) = load_dir(&workspace);

    assert_eq!(report.files_skipped, 1);
    assert_eq!(report.files_loaded, 1);
    assert_eq!(catalog.len(), 2);
    assert!(
        report
            .diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::File && d.source.ends_with("price_a.csv"))
    );
}

#[test]
fn legacy_encoding_is_decoded_when_requested() {
    let workspace = TestWorkspace::new();
    let (encoded, _, had_errors) = WINDOWS_1251.encode("товар,цена,вес\nГречка,90,\"0,8\"\n");
    assert!(!had_errors);
    let path = workspace.write_bytes("price_cp1251.csv", &encoded);

    let mut catalog = Catalog::new();
    let report = catalog.load(
        &[&path],
        &ReadOptions {
            delimiter: None,
            encoding: WINDOWS_1251,
        },
    );
    assert_eq!(report.rows_loaded, 1);
    assert_eq!(catalog.entries()[0].name, "Гречка");
    assert_eq!(catalog.entries()[0].ratio, 112.5);

    let utf8 = catalog.load(&[&path], &ReadOptions::default());
    assert_eq!(utf8.files_skipped, 1);
    assert!(catalog.is_empty());
}

#[test]
fn repeated_search_is_stable() {
    let workspace = TestWorkspace::new();
    workspace.write("price_dairy.csv", DAIRY_PRICE_LIST);
    workspace.write("price_bakery.tsv", BAKERY_PRICE_LIST);
    let (catalog, _) = load_dir(&workspace);

    let first = catalog.search("о").expect("search");
    let second = catalog.search("о").expect("search");
    assert_eq!(first, second);
}

fn arb_entry() -> impl Strategy<Value = CatalogEntry> {
    ("[a-zа-я]{1,8}", 1u32..100_000, 1u32..5_000).prop_map(|(name, cents, grams)| {
        let unit_price = f64::from(cents) / 100.0;
        let unit_weight = f64::from(grams) / 1000.0;
        CatalogEntry {
            source_id: "price_prop.csv".to_string(),
            name,
            unit_price,
            unit_weight,
            ratio: round_to_cents(unit_price / unit_weight),
        }
    })
}

proptest! {
    #[test]
    fn search_output_is_sorted_by_ratio(entries in prop::collection::vec(arb_entry(), 0..60)) {
        let catalog: Catalog = entries.into_iter().collect();
        let results = catalog.search("а").expect("search");
        prop_assert!(results.windows(2).all(|w| w[0].ratio <= w[1].ratio));
        prop_assert!(results.iter().all(|e| e.name.contains('а')));
    }

    #[test]
    fn sort_all_is_an_ordered_permutation(entries in prop::collection::vec(arb_entry(), 0..60)) {
        let mut catalog: Catalog = entries.clone().into_iter().collect();
        catalog.sort_all_by_ratio();
        let sorted = catalog.entries();
        prop_assert!(sorted.windows(2).all(|w| w[0].ratio <= w[1].ratio));
        prop_assert_eq!(sorted.len(), entries.len());
        for entry in &entries {
            let before = entries.iter().filter(|e| *e == entry).count();
            let after = sorted.iter().filter(|e| *e == entry).count();
            prop_assert_eq!(before, after);
        }
    }
}
