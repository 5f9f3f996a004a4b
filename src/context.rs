use std::cell::RefCell;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use serde::Serialize;
use tracing::{debug, info};

use crate::analyzer::aggregate;
use crate::db::TableLoader;
use crate::error::ReportError;
use crate::table::{NamedTable, SortOrder};
use crate::views::SummaryView;

/// One aggregate operation, addressed by value so results can be memoized
/// per distinct spec within a single `ReportContext`.
#[derive(Debug, Clone)]
pub enum AggregateSpec {
    Sum {
        table: String,
        column: String,
    },
    Mean {
        table: String,
        column: String,
    },
    TopN {
        table: String,
        column: String,
        n: usize,
        order: SortOrder,
    },
    PercentageShare {
        table: String,
        value_column: String,
        group_column: String,
    },
    DeriveRatio {
        table: String,
        new_column: String,
        numerator: String,
        denominator: String,
        zero_fallback: Option<f64>,
    },
}

// Manual Eq/Hash: the fallback is compared and hashed by bit pattern so the
// spec can serve as a cache key despite the f64 field.
impl PartialEq for AggregateSpec {
    fn eq(&self, other: &Self) -> bool {
        use AggregateSpec::*;
        match (self, other) {
            (Sum { table: t1, column: c1 }, Sum { table: t2, column: c2 })
            | (Mean { table: t1, column: c1 }, Mean { table: t2, column: c2 }) => {
                t1 == t2 && c1 == c2
            }
            (
                TopN { table: t1, column: c1, n: n1, order: o1 },
                TopN { table: t2, column: c2, n: n2, order: o2 },
            ) => t1 == t2 && c1 == c2 && n1 == n2 && o1 == o2,
            (
                PercentageShare { table: t1, value_column: v1, group_column: g1 },
                PercentageShare { table: t2, value_column: v2, group_column: g2 },
            ) => t1 == t2 && v1 == v2 && g1 == g2,
            (
                DeriveRatio {
                    table: t1,
                    new_column: nc1,
                    numerator: num1,
                    denominator: den1,
                    zero_fallback: z1,
                },
                DeriveRatio {
                    table: t2,
                    new_column: nc2,
                    numerator: num2,
                    denominator: den2,
                    zero_fallback: z2,
                },
            ) => {
                t1 == t2
                    && nc1 == nc2
                    && num1 == num2
                    && den1 == den2
                    && z1.map(f64::to_bits) == z2.map(f64::to_bits)
            }
            _ => false,
        }
    }
}

impl Eq for AggregateSpec {}

impl Hash for AggregateSpec {
    fn hash<H: Hasher>(&self, state: &mut H) {
        use AggregateSpec::*;
        std::mem::discriminant(self).hash(state);
        match self {
            Sum { table, column } | Mean { table, column } => {
                table.hash(state);
                column.hash(state);
            }
            TopN { table, column, n, order } => {
                table.hash(state);
                column.hash(state);
                n.hash(state);
                order.hash(state);
            }
            PercentageShare { table, value_column, group_column } => {
                table.hash(state);
                value_column.hash(state);
                group_column.hash(state);
            }
            DeriveRatio { table, new_column, numerator, denominator, zero_fallback } => {
                table.hash(state);
                new_column.hash(state);
                numerator.hash(state);
                denominator.hash(state);
                zero_fallback.map(f64::to_bits).hash(state);
            }
        }
    }
}

impl AggregateSpec {
    fn table(&self) -> &str {
        match self {
            AggregateSpec::Sum { table, .. }
            | AggregateSpec::Mean { table, .. }
            | AggregateSpec::TopN { table, .. }
            | AggregateSpec::PercentageShare { table, .. }
            | AggregateSpec::DeriveRatio { table, .. } => table,
        }
    }
}

/// Result of one aggregate operation: a headline scalar or a small ranked
/// sub-table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AggregateResult {
    Scalar(f64),
    Table(NamedTable),
}

impl AggregateResult {
    pub fn scalar(&self) -> Option<f64> {
        match self {
            AggregateResult::Scalar(v) => Some(*v),
            AggregateResult::Table(_) => None,
        }
    }

    pub fn table(&self) -> Option<&NamedTable> {
        match self {
            AggregateResult::Table(t) => Some(t),
            AggregateResult::Scalar(_) => None,
        }
    }
}

/// One report's worth of loaded summary views plus memoized aggregates.
///
/// Built eagerly and fail-fast: either every requested view loads (`Ok`,
/// the "ready" state) or the first error is terminal for this build (`Err`,
/// the "failed" state). A refresh is a brand-new `build`; nothing mutates a
/// context after construction. The memo cache is interior-mutable only,
/// which makes the type single-threaded by construction — hosts serving
/// concurrent report requests build one context per request.
#[derive(Debug)]
pub struct ReportContext {
    tables: HashMap<String, NamedTable>,
    cache: RefCell<HashMap<AggregateSpec, AggregateResult>>,
}

impl ReportContext {
    /// Loads every named view once, in the order given. Views present in the
    /// catalog are checked against their required-column contract.
    pub fn build<S: AsRef<str>>(
        loader: &dyn TableLoader,
        table_names: &[S],
    ) -> Result<Self, ReportError> {
        let mut tables = HashMap::with_capacity(table_names.len());
        for name in table_names {
            let name = name.as_ref();
            let table = loader.load(name)?;
            if let Some(view) = SummaryView::from_name(name) {
                for required in view.required_columns() {
                    if table.column_index(required).is_none() {
                        return Err(ReportError::ColumnNotFound {
                            table: name.to_string(),
                            column: required.to_string(),
                        });
                    }
                }
            }
            tables.insert(name.to_string(), table);
        }

        info!(views = tables.len(), "report context ready");
        Ok(Self {
            tables,
            cache: RefCell::new(HashMap::new()),
        })
    }

    /// Convenience build over the seven standard summary views.
    pub fn build_standard(loader: &dyn TableLoader) -> Result<Self, ReportError> {
        let names: Vec<&str> = SummaryView::standard().iter().map(|v| v.name()).collect();
        Self::build(loader, &names)
    }

    /// A view from the originally requested set. Names outside that set are
    /// `TableNotFound`; a context never triggers a fresh load.
    pub fn table(&self, name: &str) -> Result<&NamedTable, ReportError> {
        self.tables
            .get(name)
            .ok_or_else(|| ReportError::TableNotFound(name.to_string()))
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// Applies one aggregate operation, memoized per distinct spec for the
    /// lifetime of this context. Memoization is an optimization only: inputs
    /// are immutable, so a recomputation would return the identical value.
    pub fn aggregate(&self, spec: &AggregateSpec) -> Result<AggregateResult, ReportError> {
        if let Some(hit) = self.cache.borrow().get(spec) {
            return Ok(hit.clone());
        }

        let table = self.table(spec.table())?;
        let result = match spec {
            AggregateSpec::Sum { column, .. } => {
                AggregateResult::Scalar(aggregate::sum(table, column)?)
            }
            AggregateSpec::Mean { column, .. } => {
                AggregateResult::Scalar(aggregate::mean(table, column)?)
            }
            AggregateSpec::TopN { column, n, order, .. } => {
                AggregateResult::Table(aggregate::top_n(table, column, *n, *order)?)
            }
            AggregateSpec::PercentageShare { value_column, group_column, .. } => {
                AggregateResult::Table(aggregate::percentage_share(
                    table,
                    value_column,
                    group_column,
                )?)
            }
            AggregateSpec::DeriveRatio {
                new_column,
                numerator,
                denominator,
                zero_fallback,
                ..
            } => AggregateResult::Table(aggregate::derive_ratio(
                table,
                new_column,
                numerator,
                denominator,
                *zero_fallback,
            )?),
        };

        debug!(?spec, "aggregate computed");
        self.cache
            .borrow_mut()
            .insert(spec.clone(), result.clone());
        Ok(result)
    }
}
