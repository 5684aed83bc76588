//! Column-level validation of raw staging rows.
//!
//! Each staging table has a fixed set of expected columns. Rows are checked
//! before typed deserialization so that a malformed export fails with the
//! table and column named instead of a serde error buried in one row.
//! Unrecognized columns are logged and carried no further.

use std::collections::HashSet;

use serde_yaml::Value;
use tracing::warn;

use crate::error::{EngineError, EngineResult};

/// Expected column layout for one staging table.
#[derive(Debug, Clone, Copy)]
pub struct TableSchema {
    /// The staging table's name, as used in error messages.
    pub table: &'static str,
    /// Columns every row must carry with a non-null value.
    pub required: &'static [&'static str],
    /// All columns the engine reads, including the required ones.
    pub known: &'static [&'static str],
}

/// Schema for the staged award header table.
pub const AWARDS: TableSchema = TableSchema {
    table: "awards",
    required: &["award_id", "award_fixed_id", "code", "name"],
    known: &[
        "award_id",
        "award_fixed_id",
        "code",
        "name",
        "industry",
        "award_operative_from",
        "award_operative_to",
        "version_number",
        "published_year",
        "is_custom",
    ],
};

/// Schema for the staged classification table.
pub const CLASSIFICATIONS: TableSchema = TableSchema {
    table: "classifications",
    required: &["classification_fixed_id", "award_code"],
    known: &[
        "classification_fixed_id",
        "award_code",
        "clause_fixed_id",
        "clauses",
        "clause_description",
        "parent_classification_name",
        "classification",
        "classification_level",
        "operative_from",
        "operative_to",
        "version_number",
    ],
};

/// Schema for the staged pay-rate table.
pub const PAY_RATES: TableSchema = TableSchema {
    table: "pay_rates",
    required: &["classification_fixed_id", "award_code"],
    known: &[
        "classification_fixed_id",
        "award_code",
        "base_pay_rate_id",
        "base_rate_type",
        "base_rate",
        "calculated_pay_rate_id",
        "calculated_rate_type",
        "calculated_rate",
        "parent_classification_name",
        "classification",
        "classification_level",
        "employee_rate_type_code",
        "operative_from",
        "operative_to",
        "version_number",
    ],
};

/// Schema for the staged expense allowance table.
pub const EXPENSE_ALLOWANCES: TableSchema = TableSchema {
    table: "expense_allowances",
    required: &["expense_allowance_fixed_id", "award_code"],
    known: &[
        "expense_allowance_fixed_id",
        "award_code",
        "clause_fixed_id",
        "clauses",
        "parent_allowance",
        "allowance",
        "is_all_purpose",
        "allowance_amount",
        "payment_frequency",
        "operative_from",
        "operative_to",
    ],
};

/// Schema for the staged wage allowance table.
pub const WAGE_ALLOWANCES: TableSchema = TableSchema {
    table: "wage_allowances",
    required: &["wage_allowance_fixed_id", "award_code"],
    known: &[
        "wage_allowance_fixed_id",
        "award_code",
        "clause_fixed_id",
        "clauses",
        "parent_allowance",
        "allowance",
        "is_all_purpose",
        "rate",
        "rate_unit",
        "allowance_amount",
        "payment_frequency",
        "operative_from",
        "operative_to",
    ],
};

/// Schema for the staged penalty table.
pub const PENALTIES: TableSchema = TableSchema {
    table: "penalties",
    required: &["penalty_fixed_id", "award_code", "penalty_type"],
    known: &[
        "penalty_fixed_id",
        "award_code",
        "clause_fixed_id",
        "clause_description",
        "classification_level",
        "penalty_type",
        "applicable_day",
        "rate",
        "penalty_calculated_value",
        "employee_rate_type_code",
        "operative_from",
        "operative_to",
    ],
};

impl TableSchema {
    /// Checks every row for the required columns and warns once per
    /// unrecognized column name.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::SchemaMismatch`] naming the first required
    /// column that is absent or null. A row that is not a mapping fails the
    /// same way, since none of its required columns are present.
    pub fn validate(&self, rows: &[Value]) -> EngineResult<()> {
        let mut warned: HashSet<String> = HashSet::new();
        for row in rows {
            let Some(mapping) = row.as_mapping() else {
                return Err(self.missing(self.required[0]));
            };
            for column in self.required {
                let present = row.get(*column).is_some_and(|value| !value.is_null());
                if !present {
                    return Err(self.missing(column));
                }
            }
            for key in mapping.keys() {
                let Some(name) = key.as_str() else { continue };
                if !self.known.contains(&name) && warned.insert(name.to_string()) {
                    warn!(
                        table = self.table,
                        column = name,
                        "Ignoring unrecognized staging column"
                    );
                }
            }
        }
        Ok(())
    }

    fn missing(&self, column: &str) -> EngineError {
        EngineError::SchemaMismatch {
            table: self.table.to_string(),
            column: column.to_string(),
        }
    }
}
