//! Mapping of vendor-specific column names onto the catalog fields.
//!
//! Price lists name their columns freely ("Наименование товара", "Цена, руб",
//! "Фасовка"...). Each [`Field`] owns a case-insensitive pattern that is
//! searched for inside a column name; the first column whose name matches
//! supplies the field.

use std::{fmt, sync::OnceLock};

use regex::{Regex, RegexBuilder};

/// Semantic field every catalog entry must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Price,
    Weight,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Name, Field::Price, Field::Weight];

    /// Alternation of column-name fragments that identify this field.
    pub fn pattern(self) -> &'static str {
        match self {
            Field::Name => "название|продукт|товар|наименование",
            Field::Price => "цена|розница",
            Field::Weight => "фасовка|масса|вес",
        }
    }

    fn regex(self) -> &'static Regex {
        static PATTERNS: OnceLock<[Regex; 3]> = OnceLock::new();
        let compiled = PATTERNS.get_or_init(|| {
            Field::ALL.map(|field| {
                RegexBuilder::new(field.pattern())
                    .case_insensitive(true)
                    .build()
                    .expect("built-in field patterns are valid")
            })
        });
        &compiled[self as usize]
    }

    pub fn matches_column(self, column: &str) -> bool {
        self.regex().is_match(column)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Field::Name => "name",
            Field::Price => "price",
            Field::Weight => "weight",
        };
        f.write_str(label)
    }
}

/// One decoded row paired with the header row of its file.
#[derive(Debug, Clone, Copy)]
pub struct RawRecord<'a> {
    headers: &'a [String],
    values: &'a [String],
}

impl<'a> RawRecord<'a> {
    pub fn new(headers: &'a [String], values: &'a [String]) -> Self {
        Self { headers, values }
    }

    /// Column/value pairs in file order. Missing trailing cells read as empty.
    pub fn columns(self) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        let values = self.values;
        self.headers.iter().enumerate().map(move |(idx, header)| {
            (
                header.as_str(),
                values.get(idx).map(String::as_str).unwrap_or(""),
            )
        })
    }

    pub fn value_at(self, index: usize) -> &'a str {
        self.values.get(index).map(String::as_str).unwrap_or("")
    }

    /// Renders the row as `column=value` pairs for diagnostics.
    pub fn describe(self) -> String {
        let pairs = self
            .columns()
            .map(|(column, value)| format!("{column}={value}"))
            .collect::<Vec<_>>();
        format!("{{{}}}", pairs.join(", "))
    }
}

/// Returns the trimmed value of the first column matching `field`, or `""`.
pub fn resolve<'a>(record: &RawRecord<'a>, field: Field) -> &'a str {
    record
        .columns()
        .find(|(column, _)| field.matches_column(column))
        .map(|(_, value)| value.trim())
        .unwrap_or("")
}

/// Column positions of the three fields, resolved once from a header row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldMap {
    pub name: Option<usize>,
    pub price: Option<usize>,
    pub weight: Option<usize>,
}

impl FieldMap {
    pub fn from_headers(headers: &[String]) -> Self {
        let position = |field: Field| headers.iter().position(|h| field.matches_column(h));
        Self {
            name: position(Field::Name),
            price: position(Field::Price),
            weight: position(Field::Weight),
        }
    }

    pub fn index(&self, field: Field) -> Option<usize> {
        match field {
            Field::Name => self.name,
            Field::Price => self.price,
            Field::Weight => self.weight,
        }
    }

    /// Same result as [`resolve`], without rescanning the header row.
    pub fn resolve<'a>(&self, record: &RawRecord<'a>, field: Field) -> &'a str {
        self.index(field)
            .map(|idx| record.value_at(idx).trim())
            .unwrap_or("")
    }

    pub fn missing(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|field| self.index(*field).is_none())
            .collect()
    }
}
