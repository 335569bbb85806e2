use super::quality::CandidateRelease;

/// The candidate with the most seeders; missing counts are zero and ties go
/// to the earliest candidate.
///
/// Callers must pass a non-empty slice. Debug builds assert it; release
/// builds return `None`.
pub fn pick_best_seeded(candidates: &[CandidateRelease]) -> Option<&CandidateRelease> {
    debug_assert!(
        !candidates.is_empty(),
        "pick_best_seeded called without candidates"
    );

    candidates.iter().fold(None, |best, candidate| match best {
        Some(b) if b.release().seeder_count() >= candidate.release().seeder_count() => Some(b),
        _ => Some(candidate),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::QualityTable;
    use crate::searcher::RawRelease;
    use serde_json::{json, Value};

    fn candidates(seeds: &[Value]) -> Vec<CandidateRelease> {
        let releases: Vec<RawRelease> = seeds
            .iter()
            .enumerate()
            .map(|(i, s)| {
                RawRelease::from_value(
                    "Rutracker",
                    &json!({"Name": format!("Alpha WEB-DL #{}", i), "Seeds": s, "Id": i.to_string()}),
                )
                .unwrap()
            })
            .collect();
        QualityTable::new(&["WEB-DL"]).best_matches(&releases)
    }

    #[test]
    fn test_picks_highest_with_coercion() {
        let c = candidates(&[json!(3), json!("bad"), json!(7), Value::Null]);
        assert_eq!(pick_best_seeded(&c).unwrap().release().id, "2");
    }

    #[test]
    fn test_numeric_strings_count() {
        let c = candidates(&[json!(3), json!("12")]);
        assert_eq!(pick_best_seeded(&c).unwrap().release().id, "1");
    }

    #[test]
    fn test_ties_go_to_first() {
        let c = candidates(&[json!(4), json!(9), json!(9)]);
        assert_eq!(pick_best_seeded(&c).unwrap().release().id, "1");

        let c = candidates(&[Value::Null, json!("x")]);
        assert_eq!(pick_best_seeded(&c).unwrap().release().id, "0");
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "without candidates")]
    fn test_empty_input_is_loud() {
        pick_best_seeded(&[]);
    }
}
