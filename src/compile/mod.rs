//! Award compilation: staged tables into summary and detail rows.
//!
//! Both compilers share the same run discipline. The scope is one award or
//! every staged award; each award is one independently committed sub-unit
//! guarded by its award lock; and every sub-unit that runs appends a run
//! log row, success or not. A failed sub-unit leaves the award's previous
//! rows in place.

pub mod detail;
pub mod summary;

pub use detail::DetailCompiler;
pub use summary::SummaryCompiler;

use crate::error::{EngineError, EngineResult};
use crate::store::StagingStore;

/// Resolves an optional award-code scope into concrete staged codes.
///
/// A scoped code is validated against staging and canonicalized to the
/// staged casing; `None` expands to every staged award.
pub(crate) fn resolve_scope(
    staging: &dyn StagingStore,
    award_code: Option<&str>,
) -> EngineResult<Vec<String>> {
    match award_code {
        Some(code) => {
            let award = staging
                .award(code)?
                .ok_or_else(|| EngineError::AwardNotFound {
                    code: code.to_string(),
                })?;
            Ok(vec![award.code])
        }
        None => staging.award_codes(),
    }
}
