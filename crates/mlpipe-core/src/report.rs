//! Report mode selection for sequence labeler evaluation.

use std::fmt;

use crate::types::{EvalReport, Metric};

/// The evaluation procedure run for one `sequenceval` invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportMode {
    Accuracy,
    Brief,
    Detailed,
    Error,
}

impl ReportMode {
    /// Used when no report kind was requested.
    pub const FALLBACK: ReportMode = ReportMode::Detailed;

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Accuracy => "accuracy",
            Self::Brief => "brief",
            Self::Detailed => "detailed",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for ReportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<EvalReport> for ReportMode {
    fn from(report: EvalReport) -> Self {
        match report {
            EvalReport::Brief => Self::Brief,
            EvalReport::Detailed => Self::Detailed,
            EvalReport::Error => Self::Error,
        }
    }
}

/// Picks the procedure. `accuracy` short-circuits the report kind.
pub fn select_report(metric: Metric, eval_report: Option<EvalReport>) -> ReportMode {
    match (metric, eval_report) {
        (Metric::Accuracy, _) => ReportMode::Accuracy,
        (Metric::FMeasure, Some(report)) => report.into(),
        (Metric::FMeasure, None) => ReportMode::FALLBACK,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accuracy_ignores_report() {
        for report in [None, Some(EvalReport::Brief), Some(EvalReport::Detailed), Some(EvalReport::Error)] {
            assert_eq!(select_report(Metric::Accuracy, report), ReportMode::Accuracy);
        }
    }

    #[test]
    fn test_fmeasure_defaults_to_detailed() {
        assert_eq!(select_report(Metric::FMeasure, None), ReportMode::Detailed);
    }

    #[test]
    fn test_fmeasure_maps_report() {
        assert_eq!(select_report(Metric::FMeasure, Some(EvalReport::Brief)), ReportMode::Brief);
        assert_eq!(select_report(Metric::FMeasure, Some(EvalReport::Error)), ReportMode::Error);
        assert_eq!(
            select_report(Metric::FMeasure, Some(EvalReport::Detailed)),
            ReportMode::Detailed
        );
    }
}
