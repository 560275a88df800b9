//! Metrics for the `demux` command.
//!
//! One row is produced per barcode table entry (in table order, catch-all included) plus a
//! trailing row for templates that matched nothing and were discarded.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Metric, format_float};

/// Label of the metrics row counting templates that matched no barcode and were dropped.
pub const UNMATCHED_LABEL: &str = "discarded";

#[allow(clippy::trivially_copy_pass_by_ref)] // serde requires &T signature
fn serialize_fraction<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format_float(*value))
}

fn deserialize_fraction<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    s.parse().map_err(serde::de::Error::custom)
}

/// Number of templates routed to a single barcode destination.
///
/// # Fields
///
/// * `barcode` - The barcode label (`KEY1` or `KEY1:KEY2`, `OTHER:OTHER` for the catch-all)
/// * `templates` - Number of record tuples routed to this barcode
/// * `frac_templates` - Fraction of all record tuples read that were routed here
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DemuxMetric {
    pub barcode: String,
    pub templates: u64,
    #[serde(serialize_with = "serialize_fraction", deserialize_with = "deserialize_fraction")]
    pub frac_templates: f64,
}

impl Metric for DemuxMetric {
    fn metric_name() -> &'static str {
        "demultiplexing"
    }
}

impl DemuxMetric {
    /// Builds the metric rows from per-barcode counts and the number of discarded templates.
    ///
    /// The fraction denominator is the total of all counts plus the discards, i.e. the number
    /// of record tuples read.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_counts<S: AsRef<str>>(counts: &[(S, u64)], discarded: u64) -> Vec<Self> {
        let total: u64 = counts.iter().map(|(_, n)| *n).sum::<u64>() + discarded;
        let fraction = |n: u64| if total == 0 { 0.0 } else { n as f64 / total as f64 };

        let mut metrics: Vec<Self> = counts
            .iter()
            .map(|(label, n)| Self {
                barcode: label.as_ref().to_string(),
                templates: *n,
                frac_templates: fraction(*n),
            })
            .collect();
        metrics.push(Self {
            barcode: UNMATCHED_LABEL.to_string(),
            templates: discarded,
            frac_templates: fraction(discarded),
        });
        metrics
    }
}
