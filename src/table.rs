use std::borrow::Cow;
use std::fmt::Write as _;

use itertools::Itertools;

use crate::normalize::CatalogEntry;

pub const RESULT_HEADERS: [&str; 6] = ["№", "Файл", "Наименование", "Цена", "Вес", "Цена за кг."];

/// Display rows for `entries`, each prefixed with its 1-based position.
pub fn numbered_rows<'a, I>(entries: I) -> Vec<Vec<String>>
where
    I: IntoIterator<Item = &'a CatalogEntry>,
{
    entries
        .into_iter()
        .enumerate()
        .map(|(idx, entry)| {
            let mut row = Vec::with_capacity(RESULT_HEADERS.len());
            row.push((idx + 1).to_string());
            row.extend(entry.display_cells());
            row
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
}

/// Renders a boxed grid. Columns whose cells are all numeric are right-aligned.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let column_count = headers.len();
    let mut widths = headers.iter().map(|h| display_width(h)).collect::<Vec<_>>();
    let mut aligns = vec![Align::Right; column_count];

    for row in rows {
        for (idx, cell) in row.iter().enumerate().take(column_count) {
            widths[idx] = widths[idx].max(display_width(&sanitize_cell(cell)));
            if cell.trim().parse::<f64>().is_err() {
                aligns[idx] = Align::Left;
            }
        }
    }
    if rows.is_empty() {
        aligns.fill(Align::Left);
    }

    let mut output = String::new();
    let _ = writeln!(output, "{}", rule(&widths, '┌', '─', '┬', '┐'));
    let header_cells = headers.iter().map(|h| h.to_string()).collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_row(&header_cells, &widths, &aligns));
    if rows.is_empty() {
        let _ = writeln!(output, "{}", rule(&widths, '└', '─', '┴', '┘'));
        return output;
    }
    let _ = writeln!(output, "{}", rule(&widths, '╞', '═', '╪', '╡'));
    for (pos, row) in rows.iter().enumerate() {
        let _ = writeln!(output, "{}", format_row(row, &widths, &aligns));
        if pos + 1 < rows.len() {
            let _ = writeln!(output, "{}", rule(&widths, '├', '─', '┼', '┤'));
        }
    }
    let _ = writeln!(output, "{}", rule(&widths, '└', '─', '┴', '┘'));
    output
}

/// Console table of ranked entries under [`RESULT_HEADERS`].
pub fn render_entries<'a, I>(entries: I) -> String
where
    I: IntoIterator<Item = &'a CatalogEntry>,
{
    render_table(&RESULT_HEADERS, &numbered_rows(entries))
}

fn rule(widths: &[usize], left: char, fill: char, joint: char, right: char) -> String {
    let segments = widths
        .iter()
        .map(|w| fill.to_string().repeat(w + 2))
        .join(&joint.to_string());
    format!("{left}{segments}{right}")
}

fn format_row(values: &[String], widths: &[usize], aligns: &[Align]) -> String {
    let mut cells = widths.iter().enumerate().map(|(idx, width)| {
        let value = values.get(idx).map(String::as_str).unwrap_or("");
        let sanitized = sanitize_cell(value);
        let padding = " ".repeat(width.saturating_sub(display_width(&sanitized)));
        match aligns.get(idx).copied().unwrap_or(Align::Left) {
            Align::Left => format!(" {sanitized}{padding} "),
            Align::Right => format!(" {padding}{sanitized} "),
        }
    });
    format!("│{}│", cells.join("│"))
}

/// Terminal columns taken by `value`: ANSI escapes take none, East Asian
/// wide characters take two, combining marks attach to the previous cell.
fn display_width(value: &str) -> usize {
    let mut chars = value.chars();
    let mut width = 0usize;
    while let Some(ch) = chars.next() {
        if ch == '\u{1b}' {
            chars.by_ref().find(|&next| next == 'm');
            continue;
        }
        width += char_width(ch);
    }
    width
}

fn char_width(ch: char) -> usize {
    const ZERO_WIDTH: &[(u32, u32)] = &[
        (0x0300, 0x036F),
        (0x0483, 0x0489),
        (0x200B, 0x200F),
        (0x20D0, 0x20FF),
        (0xFE00, 0xFE0F),
        (0xFE20, 0xFE2F),
        (0xFEFF, 0xFEFF),
    ];
    const WIDE: &[(u32, u32)] = &[
        (0x1100, 0x115F),
        (0x2E80, 0x303E),
        (0x3041, 0x33FF),
        (0x3400, 0x4DBF),
        (0x4E00, 0x9FFF),
        (0xA000, 0xA4CF),
        (0xAC00, 0xD7A3),
        (0xF900, 0xFAFF),
        (0xFE30, 0xFE4F),
        (0xFF00, 0xFF60),
        (0xFFE0, 0xFFE6),
        (0x1F300, 0x1F64F),
        (0x1F900, 0x1F9FF),
        (0x20000, 0x3FFFD),
    ];
    let code = ch as u32;
    let within = |ranges: &[(u32, u32)]| ranges.iter().any(|&(lo, hi)| (lo..=hi).contains(&code));
    if ch.is_control() || within(ZERO_WIDTH) {
        0
    } else if within(WIDE) {
        2
    } else {
        1
    }
}

fn sanitize_cell(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(value.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(value)
    }
}
