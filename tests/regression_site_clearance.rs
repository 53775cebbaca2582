//! A regression test for the "site_clearance" example
use regression::run_regression_test;

#[test]
fn test_regression_site_clearance() {
    run_regression_test("site_clearance");
}
