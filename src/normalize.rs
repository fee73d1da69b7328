use std::fmt;

use log::debug;
use thiserror::Error;

use crate::fields::{self, Field, FieldMap, RawRecord};

/// One normalized price-list row.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub source_id: String,
    pub name: String,
    pub unit_price: f64,
    pub unit_weight: f64,
    pub ratio: f64,
}

impl CatalogEntry {
    /// Cells in display order: file, name, price, weight, price per unit.
    pub fn display_cells(&self) -> [String; 5] {
        [
            self.source_id.clone(),
            self.name.clone(),
            format_number(self.unit_price),
            format_number(self.unit_weight),
            format_number(self.ratio),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum NormalizeError {
    #[error("no value for {field}")]
    MissingField { field: Field },
    #[error("{field} '{raw}' is not a number")]
    InvalidNumber { field: Field, raw: String },
    #[error("{field} must be a positive finite number, got {value}")]
    NonPositive { field: Field, value: f64 },
    #[error("price per unit {price} / {weight} is not a finite number")]
    NonFiniteRatio { price: f64, weight: f64 },
}

/// A rejected row, carrying the raw content for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct RowFailure {
    pub row: String,
    pub error: NormalizeError,
}

impl fmt::Display for RowFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "skipping row {}: {}", self.row, self.error)
    }
}

/// Normalizes one row, resolving the columns from the row itself.
///
/// This is the reference resolution: [`normalize_mapped`] must produce the
/// same result with column positions cached once per file.
pub fn normalize_record(source_id: &str, record: &RawRecord<'_>) -> Result<CatalogEntry, RowFailure> {
    build_entry(
        source_id,
        fields::resolve(record, Field::Name),
        fields::resolve(record, Field::Price),
        fields::resolve(record, Field::Weight),
    )
    .map_err(|error| RowFailure {
        row: record.describe(),
        error,
    })
}

/// Normalizes one row using column positions resolved from its header row.
pub fn normalize_mapped(
    source_id: &str,
    map: &FieldMap,
    record: &RawRecord<'_>,
) -> Result<CatalogEntry, RowFailure> {
    build_entry(
        source_id,
        map.resolve(record, Field::Name),
        map.resolve(record, Field::Price),
        map.resolve(record, Field::Weight),
    )
    .map_err(|error| RowFailure {
        row: record.describe(),
        error,
    })
}

fn build_entry(
    source_id: &str,
    name: &str,
    price: &str,
    weight: &str,
) -> Result<CatalogEntry, NormalizeError> {
    if name.is_empty() {
        return Err(NormalizeError::MissingField { field: Field::Name });
    }
    let unit_price = parse_positive(Field::Price, price)?;
    let unit_weight = parse_positive(Field::Weight, weight)?;
    let ratio = round_to_cents(unit_price / unit_weight);
    if !ratio.is_finite() {
        return Err(NormalizeError::NonFiniteRatio {
            price: unit_price,
            weight: unit_weight,
        });
    }
    debug!("{source_id}: '{name}' {unit_price} / {unit_weight} = {ratio}");
    Ok(CatalogEntry {
        source_id: source_id.to_string(),
        name: name.to_string(),
        unit_price,
        unit_weight,
        ratio,
    })
}

/// Parses a number written with either a decimal comma or a decimal point.
pub fn parse_decimal(field: Field, raw: &str) -> Result<f64, NormalizeError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(NormalizeError::MissingField { field });
    }
    trimmed
        .replace(',', ".")
        .parse::<f64>()
        .map_err(|_| NormalizeError::InvalidNumber {
            field,
            raw: trimmed.to_string(),
        })
}

fn parse_positive(field: Field, raw: &str) -> Result<f64, NormalizeError> {
    let value = parse_decimal(field, raw)?;
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(NormalizeError::NonPositive { field, value })
    }
}

/// Rounds the exact binary value to two fractional digits, ties to even.
pub fn round_to_cents(value: f64) -> f64 {
    format!("{value:.2}").parse().unwrap_or(value)
}

/// Whole numbers print without a fraction; others use the shortest exact form.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        (value as i64).to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn normalize(headers: &[&str], values: &[&str]) -> Result<CatalogEntry, RowFailure> {
        let headers = strings(headers);
        let values = strings(values);
        normalize_record("price_test.csv", &RawRecord::new(&headers, &values))
    }

    #[test]
    fn decimal_comma_row_is_normalized() {
        let entry = normalize(&["товар", "цена", "вес"], &["Молоко", "80,5", "1"]).unwrap();
        assert_eq!(
            entry,
            CatalogEntry {
                source_id: "price_test.csv".to_string(),
                name: "Молоко".to_string(),
                unit_price: 80.5,
                unit_weight: 1.0,
                ratio: 80.5,
            }
        );
    }

    #[test]
    fn ratio_is_rounded_to_two_digits() {
        let entry = normalize(&["продукт", "розница", "масса"], &["Чай", "100", "3"]).unwrap();
        assert_eq!(entry.ratio, 33.33);
        let entry = normalize(&["продукт", "розница", "масса"], &["Кофе", "200", "0,3"]).unwrap();
        assert_eq!(entry.ratio, round_to_cents(200.0 / 0.3));
        assert_eq!(entry.ratio, 666.67);
    }

    #[test]
    fn ratio_rounding_sends_exact_ties_to_even() {
        // 9 / 8 and 225.25 / 2 are exact ties; 0.03 / 2 sits just below one.
        assert_eq!(round_to_cents(9.0 / 8.0), 1.12);
        assert_eq!(round_to_cents(225.25 / 2.0), 112.62);
        assert_eq!(round_to_cents(0.03 / 2.0), 0.01);
        assert_eq!(round_to_cents(2.675), 2.67);
        assert_eq!(round_to_cents(0.045), 0.04);
        assert_eq!(round_to_cents(1.375), 1.38);
    }

    #[test]
    fn tie_rows_get_ties_to_even_ratios() {
        let headers = ["товар", "цена", "вес"];
        let a = normalize(&headers, &["A", "9", "8"]).unwrap();
        let b = normalize(&headers, &["B", "0,03", "2"]).unwrap();
        let c = normalize(&headers, &["C", "225,25", "2"]).unwrap();
        assert_eq!(a.ratio, 1.12);
        assert_eq!(b.ratio, 0.01);
        assert_eq!(c.ratio, 112.62);
    }

    #[test]
    fn overflowing_ratio_is_rejected() {
        let failure = normalize(&["товар", "цена", "вес"], &["X", "1e300", "1e-10"]).unwrap_err();
        assert_eq!(
            failure.error,
            NormalizeError::NonFiniteRatio {
                price: 1e300,
                weight: 1e-10
            }
        );
    }

    #[test]
    fn zero_weight_is_rejected() {
        let failure = normalize(&["товар", "цена", "вес"], &["Мука", "50", "0"]).unwrap_err();
        assert_eq!(
            failure.error,
            NormalizeError::NonPositive {
                field: Field::Weight,
                value: 0.0
            }
        );
        assert_eq!(failure.row, "{товар=Мука, цена=50, вес=0}");
    }

    #[test]
    fn non_numeric_values_are_rejected() {
        let failure = normalize(&["товар", "цена", "вес"], &["Мука", "дёшево", "1"]).unwrap_err();
        assert!(matches!(
            failure.error,
            NormalizeError::InvalidNumber {
                field: Field::Price,
                ..
            }
        ));

        let failure = normalize(&["товар", "цена", "вес"], &["Мука", "10", ""]).unwrap_err();
        assert_eq!(
            failure.error,
            NormalizeError::MissingField {
                field: Field::Weight
            }
        );
    }

    #[test]
    fn missing_name_column_is_rejected() {
        let failure = normalize(&["sku", "цена", "вес"], &["A1", "10", "1"]).unwrap_err();
        assert_eq!(
            failure.error,
            NormalizeError::MissingField { field: Field::Name }
        );
    }

    #[test]
    fn negative_and_infinite_numbers_are_rejected() {
        assert!(normalize(&["товар", "цена", "вес"], &["Соль", "-5", "1"]).is_err());
        assert!(normalize(&["товар", "цена", "вес"], &["Соль", "5", "inf"]).is_err());
        assert!(normalize(&["товар", "цена", "вес"], &["Соль", "NaN", "1"]).is_err());
    }

    #[test]
    fn mapped_normalization_matches_per_row() {
        let headers = strings(&["Фасовка", "Наименование", "Цена"]);
        let values = strings(&["0,5", "Сахар", "45"]);
        let record = RawRecord::new(&headers, &values);
        let map = FieldMap::from_headers(&headers);
        assert_eq!(
            normalize_mapped("a.csv", &map, &record),
            normalize_record("a.csv", &record)
        );
    }

    #[test]
    fn format_number_drops_trailing_zero_fraction() {
        assert_eq!(format_number(1.0), "1");
        assert_eq!(format_number(80.5), "80.5");
        assert_eq!(format_number(33.33), "33.33");
    }
}
