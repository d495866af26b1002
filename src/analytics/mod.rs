//! Cohort analytics over an outcome dataset: pain score histogram and pain
//! score quartiles grouped by categorical fields. Recomputed per dataset, never cached.

mod stats;

pub use stats::{quantile, Histogram};

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::config::AnalyticsConfig;
use crate::features::FeatureVector;
use crate::schema::{FeatureSchema, FieldDomain, FieldSpec, PAIN_SCORE};
use crate::source::RawTable;
use crate::validate::{validate_row, RejectedRow};

/// A validated record paired with its outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutcomeRecord {
    pub features: FeatureVector,
    pub outcome: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OutcomeBatch {
    pub records: Vec<OutcomeRecord>,
    pub rejected: Vec<RejectedRow>,
}

/// Validate a dataset whose rows carry the clinical fields plus `outcome_field`.
pub fn validate_outcomes(table: &RawTable, outcome_field: &str) -> OutcomeBatch {
    let owned;
    let schema: &FeatureSchema = if outcome_field == PAIN_SCORE {
        FeatureSchema::analytics()
    } else {
        owned = FeatureSchema::clinical()
            .with_field(FieldSpec::required(outcome_field, FieldDomain::numeric(0.0, 10.0)));
        &owned
    };

    let mut batch = OutcomeBatch::default();
    for (i, row) in table.rows().iter().enumerate() {
        match validate_row(row, schema) {
            Ok(v) => {
                // Present and numeric: the schema made it required.
                let Some(outcome) = v.numeric(outcome_field) else {
                    continue;
                };
                let fields = v
                    .iter()
                    .filter(|(name, _)| *name != outcome_field)
                    .map(|(name, value)| (name.to_string(), value.clone()))
                    .collect();
                batch.records.push(OutcomeRecord {
                    features: FeatureVector::from_fields(fields),
                    outcome,
                });
            }
            Err(violations) => batch.rejected.push(RejectedRow {
                row: i + 1,
                record: row.clone(),
                violations,
            }),
        }
    }
    batch
}

/// Distribution of one group's outcomes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    /// Values of the grouping fields, in `group_by` order
    pub key: Vec<String>,
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub mean: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateStats {
    pub total: usize,
    pub outcome_field: String,
    pub histogram: Histogram,
    pub group_by: Vec<String>,
    pub groups: Vec<GroupSummary>,
}

/// Summarise `records`. An empty slice gives zero counts and no groups.
pub fn summarize(records: &[OutcomeRecord], config: &AnalyticsConfig) -> AggregateStats {
    let outcomes: Vec<f64> = records.iter().map(|r| r.outcome).collect();
    let histogram = Histogram::build(&outcomes, config.histogram_bins);

    let mut grouped: BTreeMap<Vec<String>, Vec<f64>> = BTreeMap::new();
    for r in records {
        let key = config
            .group_by
            .iter()
            .map(|field| {
                r.features
                    .get(field)
                    .map(ToString::to_string)
                    .unwrap_or_default()
            })
            .collect();
        grouped.entry(key).or_default().push(r.outcome);
    }

    let groups: Vec<GroupSummary> = grouped
        .into_iter()
        .filter_map(|(key, mut values)| {
            values.sort_by(f64::total_cmp);
            Some(GroupSummary {
                count: values.len(),
                min: *values.first()?,
                q1: quantile(&values, 0.25)?,
                median: quantile(&values, 0.5)?,
                q3: quantile(&values, 0.75)?,
                max: *values.last()?,
                mean: values.iter().sum::<f64>() / values.len() as f64,
                key,
            })
        })
        .collect();

    debug!(total = records.len(), groups = groups.len(), "dataset summarised");
    AggregateStats {
        total: records.len(),
        outcome_field: config.outcome_field.clone(),
        histogram,
        group_by: config.group_by.clone(),
        groups,
    }
}
