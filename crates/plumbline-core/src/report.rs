// ─────────────────────────────────────────────────────────────────────
// Plumbline: Consistency Report Rendering
// ─────────────────────────────────────────────────────────────────────

use plumbline_types::ConsistencyResult;

const RULE: &str = "════════════════════════════════════════════════════════";

fn status(valid: bool) -> &'static str {
    if valid {
        "PASS"
    } else {
        "FAIL"
    }
}

/// Render a consistency result as a human-readable plain-text report.
pub fn generate_consistency_report(result: &ConsistencyResult) -> String {
    let mut lines = vec![
        RULE.to_string(),
        "DESIGN CONSISTENCY REPORT".to_string(),
        RULE.to_string(),
        format!("Generated: {}", result.timestamp.format("%Y-%m-%d %H:%M:%S UTC")),
        format!(
            "Overall:   {} (consistency score {:.1}%)",
            status(result.valid),
            result.consistency_score * 100.0
        ),
        String::new(),
        "Categories:".to_string(),
    ];

    for v in &result.validations {
        lines.push(format!(
            "  [{}] {:<12} {:>5.1}%",
            status(v.valid),
            v.category.label(),
            v.score * 100.0
        ));
        lines.extend(v.errors.iter().map(|e| format!("        ✗ {e}")));
        lines.extend(v.warnings.iter().map(|w| format!("        ! {w}")));
    }

    lines.push(String::new());
    lines.push(format!(
        "Summary: {} error(s), {} warning(s)",
        result.errors.len(),
        result.warnings.len()
    ));
    if result.errors.is_empty() && result.warnings.is_empty() {
        lines.push("All locked attributes are consistent.".to_string());
    }
    lines.push(RULE.to_string());

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use plumbline_types::{Category, CategoryResult};

    fn result(valid: bool) -> ConsistencyResult {
        let validations: Vec<CategoryResult> = Category::ALL
            .iter()
            .map(|&c| {
                if c == Category::Roof && !valid {
                    CategoryResult::new(c, vec!["Roof type is 'flat'".into()], vec![], 0.5)
                } else {
                    CategoryResult::new(c, vec![], vec![], 1.0)
                }
            })
            .collect();
        let errors = validations.iter().flat_map(|v| v.errors.clone()).collect();
        ConsistencyResult {
            valid,
            consistency_score: if valid { 1.0 } else { 5.5 / 6.0 },
            errors,
            warnings: vec![],
            validations,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_report_lists_every_category() {
        let text = generate_consistency_report(&result(true));
        for c in Category::ALL {
            assert!(text.contains(c.label()), "missing {c}");
        }
        assert!(text.contains("Overall:   PASS"));
        assert!(text.contains("100.0%"));
        assert!(text.contains("All locked attributes are consistent."));
    }

    #[test]
    fn test_report_shows_failures() {
        let text = generate_consistency_report(&result(false));
        assert!(text.contains("Overall:   FAIL"));
        assert!(text.contains("[FAIL] Roof"));
        assert!(text.contains("✗ Roof type is 'flat'"));
        assert!(text.contains("Summary: 1 error(s), 0 warning(s)"));
    }
}
