//! A regression test for the "boundary_wall" example
use regression::run_regression_test;

#[test]
fn test_regression_boundary_wall() {
    run_regression_test("boundary_wall");
}
