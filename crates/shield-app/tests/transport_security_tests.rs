//! Integration tests for endpoint transport policy.

use shield_app::is_https_endpoint;

#[test]
fn transport_security_tests_requires_https() {
    assert!(is_https_endpoint("https://project.test/functions/v1"));
    assert!(!is_https_endpoint("http://project.test/functions/v1"));
    assert!(!is_https_endpoint("project.test/functions/v1"));
}
