#![forbid(unsafe_code)]
//! Integration tests for the conformance catalog and report runner.

use membrane_engine::conformance::{
    CATALOG_SCHEMA_VERSION, CaseOperation, CaseOutcome, ConformanceReport, catalog_digest,
    membership_conformance_catalog, run_catalog,
};

// ---------------------------------------------------------------------------
// Catalog shape
// ---------------------------------------------------------------------------

#[test]
fn catalog_has_both_operations_and_all_outcomes() {
    let catalog = membership_conformance_catalog();
    assert!(catalog
        .iter()
        .any(|c| c.operation == CaseOperation::Operator));
    assert!(catalog
        .iter()
        .any(|c| c.operation == CaseOperation::DirectHook));
    for outcome in [
        CaseOutcome::Holds,
        CaseOutcome::DoesNotHold,
        CaseOutcome::TypeError,
    ] {
        assert!(
            catalog.iter().any(|c| c.expected == outcome),
            "{outcome:?} missing from catalog"
        );
    }
}

#[test]
fn direct_hook_cases_never_expect_a_throw() {
    for case in membership_conformance_catalog() {
        if case.operation == CaseOperation::DirectHook {
            assert_ne!(case.expected, CaseOutcome::TypeError, "{}", case.case_id);
        }
    }
}

// ---------------------------------------------------------------------------
// Digest
// ---------------------------------------------------------------------------

#[test]
fn digest_changes_when_catalog_changes() {
    let catalog = membership_conformance_catalog();
    let baseline = catalog_digest(&catalog);
    let mut mutated = catalog.clone();
    mutated.pop();
    assert_ne!(baseline, catalog_digest(&mutated));
}

// ---------------------------------------------------------------------------
// Running
// ---------------------------------------------------------------------------

#[test]
fn full_run_passes_and_serializes() {
    let catalog = membership_conformance_catalog();
    let report = run_catalog(&catalog);
    assert!(report.all_passed(), "failures: {:?}", report.verdicts.iter().filter(|v| !v.pass).collect::<Vec<_>>());
    assert_eq!(report.case_count, catalog.len());
    assert_eq!(report.catalog_digest, catalog_digest(&catalog));
    assert_eq!(report.schema_version, CATALOG_SCHEMA_VERSION);

    let json = serde_json::to_string(&report).unwrap();
    let back: ConformanceReport = serde_json::from_str(&json).unwrap();
    assert_eq!(report, back);
}

#[test]
fn run_is_deterministic() {
    let catalog = membership_conformance_catalog();
    let first = run_catalog(&catalog);
    let second = run_catalog(&catalog);
    // Verdicts are identical run to run; fresh symbol/object ids inside a
    // run never leak into the report.
    assert_eq!(first, second);
}
