//! Deterministic recommendation derivation from a drift summary's counts
//! (spec §8). Pure function of the counts — no store access — so it is
//! trivially unit-testable against the seed scenarios.

use super::DriftStatus;

pub fn recommend(
    status: DriftStatus,
    breaking_changes: usize,
    signature_changes: usize,
    total_affected_callers: usize,
    missing_entities: usize,
    new_entities: usize,
    body_changes: usize,
) -> Vec<String> {
    if status == DriftStatus::Ok {
        return vec!["No drift detected - safe to proceed".to_string()];
    }

    let mut recs = Vec::new();
    if breaking_changes > 0 {
        recs.push(format!("WARNING: {breaking_changes} breaking changes detected"));
    }
    if signature_changes > 0 {
        recs.push(format!("Run rescan after {signature_changes} signature changes"));
        if total_affected_callers > 0 {
            recs.push(format!("Review {total_affected_callers} affected callers"));
        }
    }
    if missing_entities > 0 {
        recs.push(format!("Run forced rescan to clean up {missing_entities} removed entities"));
    }
    if new_entities > 0 {
        recs.push(format!("Run scan to index {new_entities} new entities"));
    }
    if body_changes > 0 && breaking_changes == 0 {
        recs.push(format!("{body_changes} body-only changes detected"));
    }
    recs.push("Run scan to synchronize the index".to_string());
    recs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_status_has_a_single_recommendation() {
        let recs = recommend(DriftStatus::Ok, 0, 0, 0, 0, 0, 0);
        assert_eq!(recs, vec!["No drift detected - safe to proceed".to_string()]);
    }

    #[test]
    fn breaking_changes_are_prepended_as_a_warning() {
        let recs = recommend(DriftStatus::Drifted, 2, 1, 3, 0, 0, 0);
        assert_eq!(recs[0], "WARNING: 2 breaking changes detected");
        assert!(recs.contains(&"Run rescan after 1 signature changes".to_string()));
        assert!(recs.contains(&"Review 3 affected callers".to_string()));
    }

    #[test]
    fn body_only_changes_suppressed_when_breaking_changes_present() {
        let recs = recommend(DriftStatus::Drifted, 1, 0, 0, 0, 0, 4);
        assert!(!recs.iter().any(|r| r.contains("body-only")));
    }

    #[test]
    fn body_only_changes_reported_when_nothing_is_breaking() {
        let recs = recommend(DriftStatus::Drifted, 0, 0, 0, 0, 0, 4);
        assert!(recs.contains(&"4 body-only changes detected".to_string()));
    }

    #[test]
    fn non_clean_status_always_ends_with_the_synchronize_instruction() {
        let recs = recommend(DriftStatus::Drifted, 0, 0, 0, 1, 0, 0);
        assert_eq!(recs.last().unwrap(), "Run scan to synchronize the index");
    }
}
