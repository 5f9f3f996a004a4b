//! Pure aggregate functions over loaded summary views. None of these mutate
//! their input; every function returns a fresh value, so callers can hold a
//! `NamedTable` and assume it is stable for the rest of the report build.

use std::collections::HashMap;

use crate::error::ReportError;
use crate::table::{Column, NamedTable, RowRef, SortOrder, Value};

/// Sum of a numeric column, in row order. NULL cells are skipped; zero rows
/// (or all-NULL rows) sum to 0.0.
pub fn sum(table: &NamedTable, column: &str) -> Result<f64, ReportError> {
    let col = table.column(column)?;
    let mut total = 0.0;
    for value in &col.values {
        if let Some(v) = numeric(value, table.name(), column)? {
            total += v;
        }
    }
    Ok(total)
}

/// Arithmetic mean of a numeric column over its non-NULL cells. Zero rows
/// (or all-NULL rows) yield 0.0, never an error.
pub fn mean(table: &NamedTable, column: &str) -> Result<f64, ReportError> {
    let col = table.column(column)?;
    let mut total = 0.0;
    let mut count = 0usize;
    for value in &col.values {
        if let Some(v) = numeric(value, table.name(), column)? {
            total += v;
            count += 1;
        }
    }
    if count == 0 {
        return Ok(0.0);
    }
    Ok(total / count as f64)
}

/// Up to `n` rows ranked by `column`. The sort is stable: rows with equal
/// keys keep their original relative order, so output is reproducible across
/// runs. `n` larger than the row count returns the whole table, ranked.
pub fn top_n(
    table: &NamedTable,
    column: &str,
    n: usize,
    order: SortOrder,
) -> Result<NamedTable, ReportError> {
    let col = table.column(column)?;

    let mut indices: Vec<usize> = (0..table.row_count()).collect();
    indices.sort_by(|&a, &b| {
        let ord = col.values[a].compare(&col.values[b]);
        match order {
            SortOrder::Ascending => ord,
            SortOrder::Descending => ord.reverse(),
        }
    });
    indices.truncate(n);

    Ok(table.select_rows(&indices))
}

/// Percentage contribution of each distinct `group_column` value to the
/// grand total of `value_column`: `100 * group_sum / grand_total`, rounded
/// to 2 decimals (half-to-even). Groups appear in first-appearance order.
/// A zero grand total defines every share as 0.0 instead of dividing.
pub fn percentage_share(
    table: &NamedTable,
    value_column: &str,
    group_column: &str,
) -> Result<NamedTable, ReportError> {
    let values = table.column(value_column)?;
    let groups = table.column(group_column)?;

    let mut order: Vec<Value> = Vec::new();
    let mut totals: HashMap<String, f64> = HashMap::new();
    for (group, value) in groups.values.iter().zip(&values.values) {
        let key = group.label();
        if !totals.contains_key(&key) {
            order.push(group.clone());
        }
        // A group whose values are all NULL still appears, with a 0.0 total.
        let slot = totals.entry(key).or_insert(0.0);
        if let Some(v) = numeric(value, table.name(), value_column)? {
            *slot += v;
        }
    }

    let grand_total: f64 = order.iter().map(|g| totals[&g.label()]).sum();

    let shares: Vec<Value> = order
        .iter()
        .map(|g| {
            let share = if grand_total == 0.0 {
                0.0
            } else {
                round2(totals[&g.label()] / grand_total * 100.0)
            };
            Value::Float(share)
        })
        .collect();

    Ok(NamedTable::new(
        format!("{}_share", table.name()),
        vec![
            Column::new(group_column, order),
            Column::new("share_pct", shares),
        ],
    ))
}

/// New table with one additional column computed row-wise.
pub fn derive<F>(
    table: &NamedTable,
    new_column: &str,
    f: F,
) -> Result<NamedTable, ReportError>
where
    F: Fn(RowRef<'_>) -> Result<Value, ReportError>,
{
    let mut values = Vec::with_capacity(table.row_count());
    for row in table.rows() {
        values.push(f(row)?);
    }
    table.with_column(Column::new(new_column, values))
}

/// Ratio column `numerator / denominator`, rounded to 2 decimals. A NULL in
/// either operand yields a NULL ratio for that row. A zero denominator
/// substitutes `zero_fallback` when supplied and is otherwise a
/// `DivideByZeroPolicy` error, so NaN never reaches a rendered report.
pub fn derive_ratio(
    table: &NamedTable,
    new_column: &str,
    numerator: &str,
    denominator: &str,
    zero_fallback: Option<f64>,
) -> Result<NamedTable, ReportError> {
    derive(table, new_column, |row| {
        let num = numeric(row.get(numerator)?, table.name(), numerator)?;
        let den = numeric(row.get(denominator)?, table.name(), denominator)?;
        let (num, den) = match (num, den) {
            (Some(num), Some(den)) => (num, den),
            _ => return Ok(Value::Null),
        };
        if den == 0.0 {
            return match zero_fallback {
                Some(fallback) => Ok(Value::Float(fallback)),
                None => Err(ReportError::DivideByZeroPolicy {
                    denominator: denominator.to_string(),
                    row: row.index(),
                }),
            };
        }
        Ok(Value::Float(round2(num / den)))
    })
}

/// Round to 2 decimal places with half-to-even tie breaking.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round_ties_even() / 100.0
}

/// `None` for a NULL cell, the numeric value otherwise. Only a genuinely
/// non-numeric cell (text) is an error.
fn numeric(value: &Value, table: &str, column: &str) -> Result<Option<f64>, ReportError> {
    match value {
        Value::Null => Ok(None),
        other => other
            .as_f64()
            .map(Some)
            .ok_or_else(|| ReportError::NonNumericColumn {
                table: table.to_string(),
                column: column.to_string(),
            }),
    }
}
