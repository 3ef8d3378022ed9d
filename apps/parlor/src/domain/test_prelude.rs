// Proptest prelude for unit tests.
//
// Env knobs:
// - PROPTEST_CASES: number of cases per property (default 32).

pub fn proptest_config() -> proptest::prelude::ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|s| s.parse::<u32>().ok())
        .unwrap_or(32)
        .max(1);

    proptest::prelude::ProptestConfig {
        // Unit-test properties are cheap to rerun; keep the tree clean.
        failure_persistence: None,
        cases,
        ..proptest::prelude::ProptestConfig::default()
    }
}
