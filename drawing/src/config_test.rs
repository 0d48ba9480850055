#![allow(clippy::float_cmp)]

use super::*;

#[test]
fn env_parse_missing_returns_default() {
    let val: usize = env_parse("__DRAW_TEST_NONEXISTENT_KEY__", 42);
    assert_eq!(val, 42);
}

#[test]
fn env_parse_present_valid() {
    unsafe { std::env::set_var("__DRAW_TEST_EP_VALID__", " 12.5 ") };
    let val: f64 = env_parse("__DRAW_TEST_EP_VALID__", 0.0);
    assert_eq!(val, 12.5);
    unsafe { std::env::remove_var("__DRAW_TEST_EP_VALID__") };
}

#[test]
fn env_parse_present_invalid_returns_default() {
    unsafe { std::env::set_var("__DRAW_TEST_EP_INVALID__", "thirty") };
    let val: f64 = env_parse("__DRAW_TEST_EP_INVALID__", 30.0);
    assert_eq!(val, 30.0);
    unsafe { std::env::remove_var("__DRAW_TEST_EP_INVALID__") };
}

#[test]
fn default_matches_field_tool_behavior() {
    let config = DrawingConfig::default();
    assert_eq!(config.close_radius_m, 30.0);
    assert_eq!(config.simplify_tolerance_deg, 0.000_01);
    assert_eq!(config.simplify_every_n, 5);
    assert_eq!(config.circle_segments, 60);
}
