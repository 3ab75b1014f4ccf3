//! Assertions for the problem-details error contract.
//!
//! Error responses carry `application/problem+json` with a stable shape:
//! `type`, `title`, `status`, `detail`, `code`, `trace_id`, plus an
//! `x-trace-id` header that must match the body. The helpers here check
//! that contract without importing backend types.

use actix_web::http::StatusCode;
use serde::{Deserialize, Serialize};

/// Stand-in for the backend's response shape, kept independent on purpose.
#[derive(Debug, Deserialize, Serialize)]
struct ProblemShape {
    #[serde(rename = "type")]
    type_: String,
    title: String,
    status: u16,
    detail: String,
    code: String,
    trace_id: String,
}

/// Assert the error contract against a full in-test service response.
pub async fn assert_problem_details(
    resp: actix_web::dev::ServiceResponse<actix_web::body::BoxBody>,
    expected_code: &str,
    expected_status: StatusCode,
    expected_detail_contains: Option<&str>,
) {
    let status = resp.status();
    let headers = resp.headers().clone();
    let body = actix_web::test::read_body(resp).await;

    assert_problem_details_from_parts(
        status,
        &headers,
        &body,
        expected_code,
        expected_status,
        expected_detail_contains,
    );
}

/// Assert the error contract against raw response parts.
pub fn assert_problem_details_from_parts(
    status: StatusCode,
    headers: &actix_web::http::header::HeaderMap,
    body_bytes: &[u8],
    expected_code: &str,
    expected_status: StatusCode,
    expected_detail_contains: Option<&str>,
) {
    assert_eq!(status, expected_status);

    let problem: ProblemShape = serde_json::from_slice(body_bytes)
        .expect("error body should be problem-details JSON");

    let trace_id_header = headers
        .get("x-trace-id")
        .expect("x-trace-id header should be present")
        .to_str()
        .expect("x-trace-id header should be valid UTF-8");
    assert_eq!(
        problem.trace_id, trace_id_header,
        "trace_id in body should match the x-trace-id header"
    );

    assert_eq!(problem.code, expected_code);
    assert_eq!(problem.status, expected_status.as_u16());
    assert!(
        problem.type_.ends_with(&problem.code),
        "type '{}' should end with the error code '{}'",
        problem.type_,
        problem.code
    );
    assert!(!problem.title.is_empty(), "title should not be empty");

    if let Some(expected_detail) = expected_detail_contains {
        assert!(
            problem.detail.contains(expected_detail),
            "expected detail to contain '{}', got '{}'",
            expected_detail,
            problem.detail
        );
    }
}
