//! The conversion orchestrator
//!
//! Sequences the pure stages for one unit and assembles either a
//! [`ConversionResult`] or a [`ConversionError`]. The rule table is shared
//! read-only across jobs; batches run on rayon and report in input order.

use crate::config::ConverterConfig;
use crate::error::ConversionError;
use crate::result::ConversionResult;
use cmig_engine::{
    builder, classifier, engine, generator, validator, ArtifactPlan, RawCommand,
};
use cmig_model::ArtifactSet;
use cmig_rules::RuleTable;
use rayon::prelude::*;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A finished job with the intermediate values the renderer needs
#[derive(Debug, Clone)]
pub struct Conversion {
    pub plan: ArtifactPlan,
    pub set: ArtifactSet,
    pub result: ConversionResult,
}

impl Conversion {
    /// Normalized unit name
    #[inline]
    #[must_use]
    pub fn unit(&self) -> &str {
        &self.set.unit
    }
}

/// Converts raw commands against one rule table
#[derive(Debug, Clone)]
pub struct Converter {
    rules: Arc<RuleTable>,
    config: ConverterConfig,
}

impl Converter {
    #[must_use]
    pub fn new(rules: Arc<RuleTable>, config: ConverterConfig) -> Self {
        tracing::debug!(
            version = rules.version(),
            rules = rules.rules().len(),
            "converter ready"
        );
        Self { rules, config }
    }

    /// Converter over the built-in rule table
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(cmig_rules::default_table(), ConverterConfig::default())
    }

    #[inline]
    #[must_use]
    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Convert one unit
    ///
    /// # Errors
    ///
    /// [`ConversionError`] with `MalformedInput` when the unit cannot be
    /// built.
    pub fn convert(&self, raw: &RawCommand) -> Result<ConversionResult, ConversionError> {
        self.run(raw, None).map(|c| c.result)
    }

    /// Convert one unit, checking `cancel` before every stage
    ///
    /// # Errors
    ///
    /// As [`Converter::convert`], plus `Cancelled` once the flag is set.
    pub fn convert_with_cancel(
        &self,
        raw: &RawCommand,
        cancel: &AtomicBool,
    ) -> Result<ConversionResult, ConversionError> {
        self.run(raw, Some(cancel)).map(|c| c.result)
    }

    /// Convert one unit, keeping the plan and artifact set
    ///
    /// # Errors
    ///
    /// As [`Converter::convert`].
    pub fn convert_detailed(&self, raw: &RawCommand) -> Result<Conversion, ConversionError> {
        self.run(raw, None)
    }

    /// Convert many units in parallel, results in input order
    ///
    /// A unit whose normalized name repeats an earlier one, ignoring case,
    /// fails with `MalformedInput`.
    #[must_use]
    pub fn convert_batch(&self, raws: &[RawCommand]) -> Vec<Result<ConversionResult, ConversionError>> {
        self.convert_batch_detailed(raws)
            .into_iter()
            .map(|r| r.map(|c| c.result))
            .collect()
    }

    /// [`Converter::convert_batch`] keeping plans and artifact sets
    #[must_use]
    pub fn convert_batch_detailed(
        &self,
        raws: &[RawCommand],
    ) -> Vec<Result<Conversion, ConversionError>> {
        let duplicates = duplicate_positions(raws);
        tracing::info!(
            jobs = raws.len(),
            duplicates = duplicates.len(),
            "batch started"
        );
        let convert = || {
            raws.par_iter()
                .enumerate()
                .map(|(i, raw)| {
                    if duplicates.contains(&i) {
                        Err(ConversionError::malformed_input(format!(
                            "duplicate command name '{}' in batch",
                            builder::normalize_name(&raw.name)
                        )))
                    } else {
                        self.run(raw, None)
                    }
                })
                .collect::<Vec<_>>()
        };
        if self.config.threads == 0 {
            return convert();
        }
        match rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.threads)
            .build()
        {
            Ok(pool) => pool.install(convert),
            Err(e) => {
                tracing::warn!(error = %e, "cannot size worker pool, using the global pool");
                convert()
            }
        }
    }

    fn run(
        &self,
        raw: &RawCommand,
        cancel: Option<&AtomicBool>,
    ) -> Result<Conversion, ConversionError> {
        let checkpoint = |stage: &str| match cancel {
            Some(flag) if flag.load(Ordering::Acquire) => {
                tracing::debug!(command = %raw.name, stage, "cancelled");
                Err(ConversionError::cancelled(stage))
            }
            _ => Ok(()),
        };

        checkpoint("build")?;
        let unit = builder::build(raw).map_err(|e| {
            tracing::warn!(command = %raw.name, error = %e, "malformed input");
            ConversionError::from(e)
        })?;

        checkpoint("classification")?;
        let unit = classifier::classify(unit);
        tracing::debug!(unit = unit.name(), category = unit.category().as_str(), "classified");

        checkpoint("planning")?;
        let plan = engine::apply(&unit, &self.rules);
        for reference in &plan.unresolved {
            tracing::warn!(
                unit = unit.name(),
                kind = reference.kind.as_str(),
                reference = %reference,
                "unresolved reference"
            );
        }

        checkpoint("generation")?;
        let set = generator::generate(plan.clone());

        checkpoint("validation")?;
        let verdict = validator::validate(&set);
        for violation in verdict.violations() {
            tracing::warn!(unit = unit.name(), %violation, "validation failed");
        }

        let result = ConversionResult::new(
            set.category,
            set.artifacts.clone(),
            plan.unresolved_names(),
            verdict,
            plan.diagnostics.clone(),
        )
        .map_err(|e| ConversionError::malformed_input(format!("result cannot be encoded: {e}")))?;

        tracing::info!(
            unit = unit.name(),
            category = unit.category().as_str(),
            artifacts = result.artifacts.len(),
            unresolved = result.unresolved.len(),
            valid = result.is_valid(),
            fingerprint = %result.fingerprint.short(),
            "converted"
        );
        Ok(Conversion { plan, set, result })
    }
}

/// Positions whose unit name collides with an earlier unit of the batch
///
/// Normalized names are compared ignoring case: `Invoices` and `invoicesCmd`
/// share artifact identifiers, and `IMPORT` and `Import` share an output
/// directory on case-insensitive filesystems.
fn duplicate_positions(raws: &[RawCommand]) -> HashSet<usize> {
    let mut seen = HashSet::new();
    raws.iter()
        .enumerate()
        .filter(|(_, raw)| {
            let key = builder::normalize_name(&raw.name).to_lowercase();
            !key.is_empty() && !seen.insert(key)
        })
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorReason;
    use cmig_test_utils::{display_invoices, headless_command, nightly_export};
    use pretty_assertions::assert_eq;

    #[test]
    fn converts_scenario_a() {
        let result = Converter::with_defaults().convert(&display_invoices()).unwrap();
        assert!(result.is_valid());
        assert!(result.unresolved.is_empty());
        assert!(result.artifact("displayInvoicesWiring").is_some());
    }

    #[test]
    fn missing_invocation_method_is_malformed() {
        let err = Converter::with_defaults()
            .convert(&headless_command())
            .unwrap_err();
        assert_eq!(err.reason(), ErrorReason::MalformedInput);
    }

    #[test]
    fn cancel_before_start() {
        let flag = AtomicBool::new(true);
        let err = Converter::with_defaults()
            .convert_with_cancel(&display_invoices(), &flag)
            .unwrap_err();
        assert_eq!(err, ConversionError::cancelled("build"));
    }

    #[test]
    fn unset_flag_does_not_cancel() {
        let flag = AtomicBool::new(false);
        let converter = Converter::with_defaults();
        assert_eq!(
            converter.convert_with_cancel(&display_invoices(), &flag),
            converter.convert(&display_invoices())
        );
    }

    #[test]
    fn duplicates_are_found_after_normalization() {
        let raws = vec![
            RawCommand::new("ExportCmd"),
            RawCommand::new("Import"),
            RawCommand::new("ExportCommand"),
            RawCommand::new(""),
            RawCommand::new(""),
            RawCommand::new("import"),
            RawCommand::new("importCmd"),
            RawCommand::new("IMPORT"),
        ];
        assert_eq!(duplicate_positions(&raws), HashSet::from([2, 5, 6, 7]));
    }

    #[test]
    fn case_variant_names_fail_in_batch() {
        let raws = vec![
            RawCommand::new("Invoices").with_invocation_method("doGet"),
            RawCommand::new("invoicesCmd").with_invocation_method("doGet"),
        ];
        let out = Converter::with_defaults().convert_batch(&raws);
        assert!(out[0].is_ok());
        let err = out[1].as_ref().unwrap_err();
        assert_eq!(err.reason(), ErrorReason::MalformedInput);
        assert!(err.detail.contains("invoices"));
    }

    #[test]
    fn sized_pool_matches_global_pool() {
        let raws = vec![display_invoices(), nightly_export()];
        let global = Converter::with_defaults().convert_batch(&raws);
        let sized = Converter::new(
            cmig_rules::default_table(),
            ConverterConfig::new().with_threads(2),
        )
        .convert_batch(&raws);
        assert_eq!(global, sized);
    }
}
