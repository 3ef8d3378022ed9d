//! Logging for integration test binaries. Same filter rules as the unit
//! tests: `TEST_LOG`, then `RUST_LOG`, then `warn`.

#[ctor::ctor]
fn _auto_init_for_integration_tests() {
    parlor_test_support::test_logging::init();
}
