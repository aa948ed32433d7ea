//! tests/api/send_otp.rs

use crate::helpers::{setup, SERVICE_ROLE_KEY};
use wiremock::{
    matchers::{any, header, method, path},
    Mock, ResponseTemplate,
};

fn assert_cors_headers(response: &reqwest::Response) {
    let headers = response.headers();
    assert_eq!(
        headers
            .get("access-control-allow-origin")
            .expect("Missing allow-origin header"),
        "*"
    );
    assert_eq!(
        headers
            .get("access-control-allow-headers")
            .expect("Missing allow-headers header"),
        "authorization, x-client-info, apikey, content-type"
    );
}

fn assert_json(response: &reqwest::Response) {
    assert_eq!(
        response
            .headers()
            .get("content-type")
            .expect("Missing content-type header"),
        "application/json"
    );
}

#[tokio::test]
async fn preflight_returns_ok_without_external_calls() {
    // Arrange
    let test = setup().await;
    test.mount_service_keys(serde_json::json!([]), 0).await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&test.email_server)
        .await;

    // Act
    let response = test
        .send_otp_raw(reqwest::Method::OPTIONS, String::new())
        .await;

    // Assert
    assert_eq!(200, response.status().as_u16());
    assert_cors_headers(&response);
    assert_eq!("ok", response.text().await.unwrap());
}

#[tokio::test]
async fn send_otp_returns_a_200_and_sends_the_email() {
    // Arrange
    let test = setup().await;
    test.mount_resend_key("sk_test").await;
    Mock::given(method("POST"))
        .and(path("/emails"))
        .and(header("authorization", "Bearer sk_test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "49a3999c-0ce1-4ea6-ab68-afcd6dc2e794"
        })))
        .expect(1)
        .mount(&test.email_server)
        .await;

    // Act
    let response = test
        .send_otp(serde_json::json!({ "email": "a@b.com", "otp": "123456" }))
        .await;

    // Assert
    assert_eq!(200, response.status().as_u16());
    assert_cors_headers(&response);
    assert_json(&response);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(
        body,
        serde_json::json!({ "message": "OTP email sent successfully." })
    );

    let email = test.received_email().await;
    assert_eq!(email.from, "Student Transport <onboarding@resend.dev>");
    assert_eq!(email.to, vec!["a@b.com".to_string()]);
    assert_eq!(email.subject, "Your Account Invitation and OTP");
    assert!(email.html.contains("123456"));
}

#[tokio::test]
async fn the_key_lookup_uses_the_service_role_key() {
    // Arrange
    let test = setup().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/service_keys"))
        .and(header("apikey", SERVICE_ROLE_KEY))
        .and(header(
            "authorization",
            format!("Bearer {}", SERVICE_ROLE_KEY).as_str(),
        ))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([{ "key_value": "sk_test" }])),
        )
        .expect(1)
        .mount(&test.secret_store_server)
        .await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&test.email_server)
        .await;

    // Act
    let response = test
        .send_otp(serde_json::json!({ "email": "a@b.com", "otp": "123456" }))
        .await;

    // Assert
    assert_eq!(200, response.status().as_u16());
}

#[tokio::test]
async fn send_otp_returns_a_400_when_fields_are_missing() {
    // Arrange
    let test = setup().await;
    let test_cases = vec![
        (serde_json::json!({ "otp": "123456" }), "missing the email"),
        (serde_json::json!({ "email": "a@b.com" }), "missing the otp"),
        (serde_json::json!({}), "missing both email and otp"),
        (
            serde_json::json!({ "email": "", "otp": "123456" }),
            "an empty email",
        ),
    ];
    // The key is fetched before the body is checked.
    test.mount_service_keys(
        serde_json::json!([{ "key_value": "sk_test" }]),
        test_cases.len() as u64,
    )
    .await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&test.email_server)
        .await;

    for (invalid_body, description) in test_cases {
        // Act
        let response = test.send_otp(invalid_body).await;

        // Assert
        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 Bad Request when the payload was {}.",
            description
        );
        assert_cors_headers(&response);
        assert_json(&response);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "error": "Email and OTP are required." })
        );
    }
}

#[tokio::test]
async fn send_otp_returns_a_500_when_the_key_is_not_exactly_one_row() {
    // Arrange
    let test = setup().await;
    let test_cases = vec![
        (serde_json::json!([]), "no rows"),
        (
            serde_json::json!([{ "key_value": "sk_one" }, { "key_value": "sk_two" }]),
            "two rows",
        ),
    ];
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&test.email_server)
        .await;

    for (rows, description) in test_cases {
        let _guard = Mock::given(method("GET"))
            .and(path("/rest/v1/service_keys"))
            .respond_with(ResponseTemplate::new(200).set_body_json(rows))
            .expect(1)
            .mount_as_scoped(&test.secret_store_server)
            .await;

        // Act
        let response = test
            .send_otp(serde_json::json!({ "email": "a@b.com", "otp": "123456" }))
            .await;

        // Assert
        assert_eq!(
            500,
            response.status().as_u16(),
            "The API did not fail with 500 when the store returned {}.",
            description
        );
        assert_cors_headers(&response);
        assert_json(&response);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "error": "Could not retrieve Resend API key from database." })
        );
    }
}

#[tokio::test]
async fn send_otp_returns_a_500_when_the_store_is_unreachable() {
    // Arrange
    let test = setup().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&test.secret_store_server)
        .await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&test.email_server)
        .await;

    // Act
    let response = test
        .send_otp(serde_json::json!({ "email": "a@b.com", "otp": "123456" }))
        .await;

    // Assert
    assert_eq!(500, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(
        body["error"],
        "Could not retrieve Resend API key from database."
    );
}

#[tokio::test]
async fn send_otp_returns_a_500_with_the_gateway_message() {
    // Arrange
    let test = setup().await;
    test.mount_resend_key("sk_test").await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(422).set_body_json(serde_json::json!({
            "statusCode": 422,
            "name": "validation_error",
            "message": "x",
        })))
        .expect(1)
        .mount(&test.email_server)
        .await;

    // Act
    let response = test
        .send_otp(serde_json::json!({ "email": "a@b.com", "otp": "123456" }))
        .await;

    // Assert
    assert_eq!(500, response.status().as_u16());
    assert_cors_headers(&response);
    assert_json(&response);
    let body: serde_json::Value = response.json().await.unwrap();
    let error = body["error"].as_str().expect("Missing error message");
    assert!(error.contains('x'));
    assert_eq!(error, "Failed to send email via Resend: x");
}

#[tokio::test]
async fn send_otp_returns_a_500_for_a_malformed_body() {
    // Arrange
    let test = setup().await;
    test.mount_resend_key("sk_test").await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&test.email_server)
        .await;

    // Act
    let response = test
        .send_otp_raw(reqwest::Method::POST, "not json".to_string())
        .await;

    // Assert
    assert_eq!(500, response.status().as_u16());
    assert_cors_headers(&response);
    assert_json(&response);
}

#[tokio::test]
async fn send_otp_handles_a_body_above_256_kib() {
    // Arrange
    let test = setup().await;
    test.mount_resend_key("sk_test").await;
    Mock::given(method("POST"))
        .and(path("/emails"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&test.email_server)
        .await;
    let body = serde_json::json!({
        "email": "a@b.com",
        "otp": "123456",
        "padding": "x".repeat(300_000),
    });

    // Act
    let response = test.send_otp(body).await;

    // Assert
    assert_eq!(200, response.status().as_u16());
    assert_cors_headers(&response);
    assert_json(&response);
}
