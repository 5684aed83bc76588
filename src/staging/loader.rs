//! Filesystem loader for staged award datasets.
//!
//! A dataset directory holds one YAML file per staging table, each a list
//! of rows. [`StagingLoader::load`] reads a single dataset directory;
//! [`StagingLoader::load_root`] walks a root of per-award subdirectories
//! and merges them into one dataset.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde_yaml::Value;
use tracing::info;

use crate::error::{EngineError, EngineResult};
use crate::models::StagingDataset;

use super::schema::{
    TableSchema, AWARDS, CLASSIFICATIONS, EXPENSE_ALLOWANCES, PAY_RATES, PENALTIES,
    WAGE_ALLOWANCES,
};

const AWARDS_FILE: &str = "awards.yaml";
const CLASSIFICATIONS_FILE: &str = "classifications.yaml";
const PAY_RATES_FILE: &str = "pay_rates.yaml";
const EXPENSE_ALLOWANCES_FILE: &str = "expense_allowances.yaml";
const WAGE_ALLOWANCES_FILE: &str = "wage_allowances.yaml";
const PENALTIES_FILE: &str = "penalties.yaml";

/// Loads staged award data from YAML files into a [`StagingDataset`].
#[derive(Debug)]
pub struct StagingLoader {
    dataset: StagingDataset,
}

impl StagingLoader {
    /// Loads one dataset directory containing the six staging table files.
    ///
    /// All six files must exist; an empty table is an empty YAML list.
    ///
    /// # Arguments
    ///
    /// * `dir` - Directory holding `awards.yaml`, `classifications.yaml`,
    ///   `pay_rates.yaml`, `expense_allowances.yaml`, `wage_allowances.yaml`
    ///   and `penalties.yaml`
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::StagingLoad`] for an unreadable or unparsable
    /// file and [`EngineError::SchemaMismatch`] for a row missing a required
    /// column.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use award_compiler::staging::StagingLoader;
    ///
    /// let loader = StagingLoader::load("./staging/ma000018").unwrap();
    /// println!("{} staged awards", loader.dataset().awards.len());
    /// ```
    pub fn load<P: AsRef<Path>>(dir: P) -> EngineResult<Self> {
        let dir = dir.as_ref();
        let dataset = StagingDataset {
            awards: load_table(&dir.join(AWARDS_FILE), &AWARDS)?,
            classifications: load_table(&dir.join(CLASSIFICATIONS_FILE), &CLASSIFICATIONS)?,
            pay_rates: load_table(&dir.join(PAY_RATES_FILE), &PAY_RATES)?,
            expense_allowances: load_table(
                &dir.join(EXPENSE_ALLOWANCES_FILE),
                &EXPENSE_ALLOWANCES,
            )?,
            wage_allowances: load_table(&dir.join(WAGE_ALLOWANCES_FILE), &WAGE_ALLOWANCES)?,
            penalties: load_table(&dir.join(PENALTIES_FILE), &PENALTIES)?,
        };

        info!(
            path = %dir.display(),
            awards = dataset.awards.len(),
            classifications = dataset.classifications.len(),
            pay_rates = dataset.pay_rates.len(),
            expense_allowances = dataset.expense_allowances.len(),
            wage_allowances = dataset.wage_allowances.len(),
            penalties = dataset.penalties.len(),
            "Loaded staging dataset"
        );

        Ok(StagingLoader { dataset })
    }

    /// Loads a root directory of per-award dataset subdirectories.
    ///
    /// Subdirectories are loaded in name order and merged. A root that
    /// itself contains `awards.yaml` is treated as a single dataset
    /// directory, so both flat and per-award layouts work.
    ///
    /// # Errors
    ///
    /// Returns the first error from any subdirectory load, or
    /// [`EngineError::StagingLoad`] if the root cannot be read.
    pub fn load_root<P: AsRef<Path>>(root: P) -> EngineResult<Self> {
        let root = root.as_ref();
        if root.join(AWARDS_FILE).is_file() {
            return Self::load(root);
        }

        let entries = fs::read_dir(root).map_err(|e| staging_error(root, &e.to_string()))?;
        let mut subdirs = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| staging_error(root, &e.to_string()))?;
            let path = entry.path();
            if path.is_dir() {
                subdirs.push(path);
            }
        }
        subdirs.sort();

        let mut dataset = StagingDataset::default();
        for subdir in subdirs {
            dataset.merge(Self::load(&subdir)?.into_dataset());
        }
        Ok(StagingLoader { dataset })
    }

    /// Returns the loaded dataset.
    pub fn dataset(&self) -> &StagingDataset {
        &self.dataset
    }

    /// Consumes the loader, returning the loaded dataset.
    pub fn into_dataset(self) -> StagingDataset {
        self.dataset
    }
}

/// Reads one table file, validates its columns, and deserializes the rows.
fn load_table<T: DeserializeOwned>(path: &Path, schema: &TableSchema) -> EngineResult<Vec<T>> {
    let text = fs::read_to_string(path).map_err(|e| staging_error(path, &e.to_string()))?;
    let rows: Vec<Value> =
        serde_yaml::from_str(&text).map_err(|e| staging_error(path, &e.to_string()))?;
    schema.validate(&rows)?;

    let mut typed = Vec::with_capacity(rows.len());
    for (index, row) in rows.into_iter().enumerate() {
        let value = serde_yaml::from_value(row)
            .map_err(|e| staging_error(path, &format!("row {}: {}", index + 1, e)))?;
        typed.push(value);
    }
    Ok(typed)
}

fn staging_error(path: &Path, message: &str) -> EngineError {
    EngineError::StagingLoad {
        path: path.display().to_string(),
        message: message.to_string(),
    }
}
