use webdir::http::gate::{ALLOWED_METHODS, Verdict, check};
use webdir::http::request::{Method, RequestBuilder, Version};
use webdir::http::response::StatusCode;

fn request(method: Method) -> RequestBuilder {
    RequestBuilder::new().method(method).path("/index.html")
}

#[test]
fn test_get_and_head_proceed() {
    for method in [Method::GET, Method::HEAD] {
        let req = request(method).build().unwrap();
        assert!(check(&req).is_proceed());
    }
}

#[test]
fn test_other_methods_are_not_allowed() {
    let methods = vec![
        Method::from_str("POST"),
        Method::from_str("PUT"),
        Method::from_str("DELETE"),
        Method::from_str("OPTIONS"),
        Method::from_str("PATCH"),
        Method::Extension("get".to_string()),
        Method::Extension("PROPFIND".to_string()),
    ];

    for method in methods {
        let req = request(method.clone()).build().unwrap();
        match check(&req) {
            Verdict::Reject(resp) => {
                assert_eq!(resp.status, StatusCode::MethodNotAllowed, "{:?}", method);
                assert_eq!(resp.header("Allow"), Some("GET, HEAD"));
            }
            Verdict::Proceed => panic!("{:?} must be rejected", method),
        }
    }
}

#[test]
fn test_allowed_methods_constant() {
    assert_eq!(ALLOWED_METHODS, "GET, HEAD");
}

#[test]
fn test_any_expect_header_fails() {
    for value in ["100-continue", "something-else", ""] {
        let req = request(Method::GET).header("Expect", value).build().unwrap();
        match check(&req) {
            Verdict::Reject(resp) => assert_eq!(resp.status, StatusCode::ExpectationFailed),
            Verdict::Proceed => panic!("Expect: {value} must be rejected"),
        }
    }
}

#[test]
fn test_expect_header_name_is_case_insensitive() {
    let req = request(Method::HEAD)
        .header("expect", "100-continue")
        .build()
        .unwrap();
    assert!(!check(&req).is_proceed());
}

#[test]
fn test_method_checked_before_expectation() {
    let req = request(Method::from_str("POST"))
        .header("Expect", "100-continue")
        .build()
        .unwrap();
    match check(&req) {
        Verdict::Reject(resp) => assert_eq!(resp.status, StatusCode::MethodNotAllowed),
        Verdict::Proceed => panic!("POST must be rejected"),
    }
}

#[test]
fn test_simple_request_proceeds() {
    let req = request(Method::GET)
        .version(Version::HTTP_09)
        .build()
        .unwrap();
    assert!(check(&req).is_proceed());
}
