//! Deterministic quality score for a report state
//!
//! The score starts at 100 and loses points for missing data, missing charts,
//! missing or short content, and outstanding issues. The thresholds below are
//! fixed; historical reports were graded with exactly these values.

use serde::{Deserialize, Serialize};

use crate::ReportState;

/// Minimum score for the reviewer to approve a report
pub const APPROVAL_THRESHOLD: f64 = 80.0;

const MAX_SCORE: f64 = 100.0;

/// Per-category penalties that make up a score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub data_penalty: f64,
    pub chart_penalty: f64,
    pub content_penalty: f64,
    pub issue_penalty: f64,
}

impl ScoreBreakdown {
    /// Final score, floored at 0
    pub fn score(&self) -> f64 {
        let total =
            self.data_penalty + self.chart_penalty + self.content_penalty + self.issue_penalty;
        (MAX_SCORE - total).max(0.0)
    }
}

/// Compute the penalties for a state
pub fn score_breakdown(state: &ReportState) -> ScoreBreakdown {
    let data_penalty = match state.raw_data.len() {
        0 => 20.0,
        1 => 10.0,
        _ => 0.0,
    };

    let chart_penalty = if state.chart_paths.is_empty() {
        20.0
    } else if state.chart_count() < 2 {
        10.0
    } else {
        0.0
    };

    let content = state.graded_content();
    let content_penalty = if content.is_empty() {
        30.0
    } else {
        let total_chars: usize = content.values().map(|text| text.chars().count()).sum();
        let mean = total_chars as f64 / content.len() as f64;
        if mean < 100.0 {
            20.0
        } else if mean < 200.0 {
            10.0
        } else {
            0.0
        }
    };

    let issue_penalty = match state.issues.len() {
        0 => 0.0,
        1..=2 => 5.0,
        3..=5 => 15.0,
        _ => 30.0,
    };

    ScoreBreakdown {
        data_penalty,
        chart_penalty,
        content_penalty,
        issue_penalty,
    }
}

/// Quality score in [0, 100]
///
/// Pure function of `raw_data`, `chart_paths`, the graded content and
/// `issues`; calling it twice on the same state yields the same value.
pub fn quality_score(state: &ReportState) -> f64 {
    score_breakdown(state).score()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn state() -> ReportState {
        ReportState::with_task_id("task_test", "2024-12-09 ~ 2024-12-15")
    }

    fn add_module(state: &mut ReportState, name: &str) {
        state.raw_data.insert(name.to_string(), Default::default());
    }

    fn add_charts(state: &mut ReportState, module: &str, count: usize) {
        let paths = (0..count)
            .map(|i| PathBuf::from(format!("charts/{module}_{i}.json")))
            .collect();
        state.chart_paths.insert(module.to_string(), paths);
    }

    #[test]
    fn test_empty_state_scores_thirty() {
        // -20 data, -20 charts, -30 content
        assert_eq!(quality_score(&state()), 30.0);
    }

    #[test]
    fn test_documented_example_scores_forty_five() {
        let mut s = state();
        add_module(&mut s, "macro");
        s.final_content
            .insert("macro_analysis".to_string(), "x".repeat(50));
        s.issues.push("one issue".to_string());

        let breakdown = score_breakdown(&s);
        assert_eq!(breakdown.data_penalty, 10.0);
        assert_eq!(breakdown.chart_penalty, 20.0);
        assert_eq!(breakdown.content_penalty, 20.0);
        assert_eq!(breakdown.issue_penalty, 5.0);
        assert_eq!(quality_score(&s), 45.0);
    }

    #[test]
    fn test_complete_state_scores_full_marks() {
        let mut s = state();
        add_module(&mut s, "macro");
        add_module(&mut s, "btc");
        add_charts(&mut s, "macro", 2);
        s.final_content
            .insert("macro_analysis".to_string(), "y".repeat(250));
        assert_eq!(quality_score(&s), 100.0);
    }

    #[test]
    fn test_chart_count_spans_modules() {
        let mut s = state();
        add_charts(&mut s, "macro", 1);
        assert_eq!(score_breakdown(&s).chart_penalty, 10.0);
        add_charts(&mut s, "btc", 1);
        assert_eq!(score_breakdown(&s).chart_penalty, 0.0);

        let mut empty_lists = state();
        add_charts(&mut empty_lists, "macro", 0);
        assert_eq!(score_breakdown(&empty_lists).chart_penalty, 10.0);
    }

    #[test]
    fn test_content_length_bands() {
        let mut s = state();
        s.reviewed_content
            .insert("a".to_string(), "z".repeat(150));
        assert_eq!(score_breakdown(&s).content_penalty, 10.0);

        s.reviewed_content
            .insert("b".to_string(), "z".repeat(250));
        // mean 200
        assert_eq!(score_breakdown(&s).content_penalty, 0.0);
    }

    #[test]
    fn test_content_length_counts_characters_not_bytes() {
        let mut s = state();
        s.reviewed_content
            .insert("macro_analysis".to_string(), "宏".repeat(120));
        assert_eq!(score_breakdown(&s).content_penalty, 10.0);
    }

    #[test]
    fn test_issue_bands() {
        let cases = [(0, 0.0), (1, 5.0), (2, 5.0), (3, 15.0), (5, 15.0), (6, 30.0)];
        for (count, expected) in cases {
            let mut s = state();
            s.issues = (0..count).map(|i| format!("issue {i}")).collect();
            assert_eq!(score_breakdown(&s).issue_penalty, expected, "{count} issues");
        }
    }

    #[test]
    fn test_score_never_negative() {
        let mut s = state();
        s.issues = (0..10).map(|i| format!("issue {i}")).collect();
        // 100 - 20 - 20 - 30 - 30
        assert_eq!(quality_score(&s), 0.0);
    }

    #[test]
    fn test_score_is_pure() {
        let mut s = state();
        add_module(&mut s, "macro");
        s.issues.push("x".to_string());
        let first = quality_score(&s);
        let second = quality_score(&s);
        assert_eq!(first, second);
    }
}
