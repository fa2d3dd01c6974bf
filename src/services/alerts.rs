// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Alert derivation from the run summary, the baseline diff, and the trend
//! delta.

use crate::models::report::{Alert, BaselineDiff, Severity, Summary, TrendReport};

const LOW_INDEXABLE_RATIO: f64 = 0.70;
const INDEXABLE_DROP: f64 = -3.0;
const LATENCY_REGRESSION_MS: f64 = 400.0;
const CRITICAL_GROWTH: i64 = 3;

fn diff_delta(diff: &BaselineDiff, metric: &str) -> Option<f64> {
    diff.rows.iter().find(|r| r.metric == metric).map(|r| r.delta)
}

/// Threshold, regression, and trend rules in a fixed order
pub fn derive_alerts(
    summary: &Summary,
    baseline_diff: &BaselineDiff,
    trend: &TrendReport,
) -> Vec<Alert> {
    let mut alerts = Vec::new();

    if summary.total > 0 {
        let ratio = f64::from(summary.indexable) / f64::from(summary.total);
        if ratio < LOW_INDEXABLE_RATIO {
            alerts.push(Alert {
                code: "low_indexable_rate".to_string(),
                severity: Severity::Warning,
                message: format!(
                    "Only {} of {} probed bots can index the page",
                    summary.indexable, summary.total
                ),
            });
        }
    }

    if let Some(delta) = diff_delta(baseline_diff, "indexable") {
        if delta <= INDEXABLE_DROP {
            alerts.push(Alert {
                code: "indexable_drop_vs_baseline".to_string(),
                severity: Severity::Critical,
                message: format!("Indexable bots dropped by {} since the stored baseline", -delta),
            });
        }
    }

    if let Some(delta) = diff_delta(baseline_diff, "avg_response_time_ms") {
        if delta >= LATENCY_REGRESSION_MS {
            alerts.push(Alert {
                code: "latency_regression".to_string(),
                severity: Severity::Warning,
                message: format!(
                    "Average response time regressed by {:.0} ms vs the baseline",
                    delta
                ),
            });
        }
    }

    if let Some(delta) = &trend.delta_vs_previous {
        if delta.indexable_delta <= INDEXABLE_DROP as i64 {
            alerts.push(Alert {
                code: "indexable_drop_vs_previous".to_string(),
                severity: Severity::Critical,
                message: format!(
                    "Indexable bots dropped by {} since the previous run",
                    -delta.indexable_delta
                ),
            });
        }
        if delta.critical_issues_delta >= CRITICAL_GROWTH {
            alerts.push(Alert {
                code: "critical_issues_growth".to_string(),
                severity: Severity::Warning,
                message: format!(
                    "Critical issues grew by {} since the previous run",
                    delta.critical_issues_delta
                ),
            });
        }
    }

    alerts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::report::{BaselineDiffRow, TrendDelta};

    fn summary(total: u32, indexable: u32) -> Summary {
        Summary {
            total,
            indexable,
            non_indexable: total - indexable,
            ..Summary::default()
        }
    }

    fn diff_with(metric: &str, delta: f64) -> BaselineDiff {
        BaselineDiff {
            available: true,
            reason: None,
            rows: vec![BaselineDiffRow {
                metric: metric.to_string(),
                current: 0.0,
                baseline: 0.0,
                delta,
            }],
        }
    }

    fn trend_with(indexable_delta: i64, critical_delta: i64) -> TrendReport {
        TrendReport {
            history_count: 2,
            latest: None,
            previous: None,
            delta_vs_previous: Some(TrendDelta {
                indexable_delta,
                critical_issues_delta: critical_delta,
                avg_response_time_delta_ms: 0.0,
            }),
            history: Vec::new(),
        }
    }

    fn empty_trend() -> TrendReport {
        TrendReport {
            history_count: 0,
            latest: None,
            previous: None,
            delta_vs_previous: None,
            history: Vec::new(),
        }
    }

    #[test]
    fn test_no_alerts_on_healthy_run() {
        let alerts = derive_alerts(&summary(9, 9), &BaselineDiff::absent(), &empty_trend());
        assert!(alerts.is_empty());
    }

    #[test]
    fn test_low_indexable_rate() {
        let alerts = derive_alerts(&summary(10, 6), &BaselineDiff::absent(), &empty_trend());
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].code, "low_indexable_rate");
        assert_eq!(alerts[0].severity, Severity::Warning);
    }

    #[test]
    fn test_boundary_rate_does_not_fire() {
        // 7/10 is exactly the threshold; the rule is strictly-below
        let alerts = derive_alerts(&summary(10, 7), &BaselineDiff::absent(), &empty_trend());
        assert!(alerts.is_empty());
    }

    #[test]
    fn test_baseline_indexable_drop() {
        let alerts = derive_alerts(
            &summary(10, 7),
            &diff_with("indexable", -3.0),
            &empty_trend(),
        );
        assert!(alerts.iter().any(|a| a.code == "indexable_drop_vs_baseline"
            && a.severity == Severity::Critical));
    }

    #[test]
    fn test_latency_regression() {
        let alerts = derive_alerts(
            &summary(10, 10),
            &diff_with("avg_response_time_ms", 450.0),
            &empty_trend(),
        );
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].code, "latency_regression");
    }

    #[test]
    fn test_trend_rules() {
        let alerts = derive_alerts(
            &summary(10, 10),
            &BaselineDiff::absent(),
            &trend_with(-4, 4),
        );
        assert!(alerts.iter().any(|a| a.code == "indexable_drop_vs_previous"));
        assert!(alerts.iter().any(|a| a.code == "critical_issues_growth"));
    }
}
