//! Static HTML reports of search results and of the whole catalog.

use std::{borrow::Cow, fmt::Write as _, path::Path};

use anyhow::Result;
use log::info;

use crate::{
    catalog::Catalog,
    io_utils,
    normalize::CatalogEntry,
    table::{RESULT_HEADERS, numbered_rows},
};

pub const DEFAULT_FIND_OUTPUT: &str = "output_find.html";
pub const DEFAULT_ALL_OUTPUT: &str = "output_all.html";

const CATALOG_HEADERS: [&str; 6] = ["Номер", "Файл", "Наименование", "Цена", "Вес", "Цена за кг."];

/// Columns holding numbers: position, price, weight, price per unit.
const NUMERIC_COLUMNS: [usize; 4] = [0, 3, 4, 5];

/// Escapes text for use inside an HTML element.
pub fn escape_html(value: &str) -> Cow<'_, str> {
    if !value.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(value);
    }
    let mut escaped = String::with_capacity(value.len() + 8);
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    Cow::Owned(escaped)
}

/// Bare `<table>` fragment of ranked search results.
pub fn render_results_html<'a, I>(entries: I) -> String
where
    I: IntoIterator<Item = &'a CatalogEntry>,
{
    let mut html = String::from("<table>\n<thead>\n<tr>");
    for (idx, header) in RESULT_HEADERS.iter().enumerate() {
        let _ = write!(html, "<th{}>{}</th>", cell_style(idx), escape_html(header));
    }
    html.push_str("</tr>\n</thead>\n<tbody>\n");
    for row in numbered_rows(entries) {
        html.push_str("<tr>");
        for (idx, cell) in row.iter().enumerate() {
            let _ = write!(html, "<td{}>{}</td>", cell_style(idx), escape_html(cell));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</tbody>\n</table>");
    html
}

fn cell_style(column: usize) -> &'static str {
    if NUMERIC_COLUMNS.contains(&column) {
        " style=\"text-align: right;\""
    } else {
        ""
    }
}

/// Complete document listing every entry in the given order.
pub fn render_catalog_html(entries: &[CatalogEntry]) -> String {
    let mut html = String::from(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"UTF-8\">\n<title>Список товара</title>\n</head>\n<body>\n",
    );
    html.push_str(
        "<table width=\"70%\" border=\"3px\" bgcolor=\"#89EC6A\" align=\"center\" \
         style=\"border-collapse: collapse;\">\n<tr>",
    );
    for header in CATALOG_HEADERS {
        let _ = write!(html, "<th>{}</th>", escape_html(header));
    }
    html.push_str("</tr>\n");
    for row in numbered_rows(entries) {
        html.push_str("<tr>");
        for cell in &row {
            let _ = write!(html, "<td>{}</td>", escape_html(cell));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</table>\n</body>\n</html>\n");
    html
}

pub fn write_results_report<'a, I>(path: &Path, entries: I) -> Result<()>
where
    I: IntoIterator<Item = &'a CatalogEntry>,
{
    io_utils::write_text_file(path, &render_results_html(entries))?;
    info!("Search results written to {path:?}");
    Ok(())
}

/// Sorts the catalog by price per unit, then writes the full listing.
pub fn write_catalog_report(path: &Path, catalog: &mut Catalog) -> Result<()> {
    catalog.sort_all_by_ratio();
    io_utils::write_text_file(path, &render_catalog_html(catalog.entries()))?;
    info!("Catalog of {} entr(ies) written to {path:?}", catalog.len());
    Ok(())
}
