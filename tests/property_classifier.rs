//! Property-based tests for the failure classifier.
//!
//! Checks the structural guarantees the scheduler depends on: grouping is a
//! partition, it is deterministic, and positive coupling evidence is never
//! split across independent groups.

use proptest::prelude::*;

use mender::domain::models::{Diagnostic, ErrorSignature, FailingSet, TestOutcome};
use mender::services::FailureClassifier;

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn arb_diagnostic() -> impl Strategy<Value = Diagnostic> {
    let fixture = prop_oneof![
        Just(None),
        Just(Some("team-seed".to_string())),
        Just(Some("db".to_string())),
        Just(Some("cache".to_string())),
    ];
    let signature = prop_oneof![
        Just(None),
        Just(Some(ErrorSignature {
            kind: "Panic".to_string(),
            top_frame: "core::index".to_string(),
        })),
        Just(Some(ErrorSignature {
            kind: "Timeout".to_string(),
            top_frame: "net::poll".to_string(),
        })),
    ];
    let area = prop_oneof![
        Just(None),
        Just(Some("teams".to_string())),
        Just(Some("billing".to_string())),
    ];

    (fixture, signature, area).prop_map(|(fixture, signature, feature_area)| Diagnostic {
        message: "failed".to_string(),
        location: None,
        signature,
        fixtures: fixture.into_iter().collect(),
        feature_area,
    })
}

fn arb_failing_set() -> impl Strategy<Value = FailingSet> {
    prop::collection::vec(arb_diagnostic(), 0..8).prop_map(|diagnostics| {
        FailingSet::from_failures(
            diagnostics
                .into_iter()
                .enumerate()
                .map(|(index, diag)| TestOutcome::fail(format!("test_{index}"), diag))
                .collect(),
        )
    })
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    /// Classification is a partition: every failing id appears in exactly
    /// one group, and no new ids appear.
    #[test]
    fn grouping_is_a_partition(failing in arb_failing_set()) {
        let groups = FailureClassifier::new().classify(&failing, &[]);

        let mut grouped: Vec<&str> = groups
            .iter()
            .flat_map(|g| g.test_ids())
            .collect();
        grouped.sort_unstable();

        let mut expected = failing.ids();
        expected.sort_unstable();

        prop_assert_eq!(grouped, expected);
    }

    /// Same inputs, same output: grouping and ordering are deterministic.
    #[test]
    fn classification_is_deterministic(failing in arb_failing_set()) {
        let classifier = FailureClassifier::new();
        let first = classifier.classify(&failing, &[]);
        let second = classifier.classify(&failing, &[]);
        prop_assert_eq!(first, second);
    }

    /// Coupling safety: two failures sharing a fixture id always land in
    /// the same coupled group, never split into independent groups.
    #[test]
    fn shared_fixture_is_never_split(failing in arb_failing_set()) {
        let groups = FailureClassifier::new().classify(&failing, &[]);

        let outcomes: Vec<&TestOutcome> = failing.iter().collect();
        for a in &outcomes {
            for b in &outcomes {
                if a.id == b.id {
                    continue;
                }
                let fa = &a.diagnostic.as_ref().unwrap().fixtures;
                let fb = &b.diagnostic.as_ref().unwrap().fixtures;
                if fa.iter().any(|f| fb.contains(f)) {
                    let group_of = |id: &str| {
                        groups
                            .iter()
                            .position(|g| g.test_ids().contains(&id))
                            .unwrap()
                    };
                    prop_assert_eq!(group_of(&a.id), group_of(&b.id));
                    prop_assert!(groups[group_of(&a.id)].is_coupled());
                }
            }
        }
    }

    /// Singleton groups are independent; multi-member groups are coupled
    /// and carry the evidence that coupled them.
    #[test]
    fn group_kind_matches_size(failing in arb_failing_set()) {
        let groups = FailureClassifier::new().classify(&failing, &[]);
        for group in &groups {
            if group.units.len() == 1 {
                prop_assert!(!group.is_coupled());
            } else {
                prop_assert!(group.is_coupled());
                prop_assert!(!group.coupling.is_empty());
            }
        }
    }
}
