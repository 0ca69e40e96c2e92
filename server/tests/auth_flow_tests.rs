#[macro_use]
mod common;

use actix_web::cookie::Cookie;
use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use college_map::auth::{PasswordHasher, PasswordScheme};
use college_map::config::RateLimitConfig;
use college_map::handlers;
use college_map::middleware::{rate_limit_middleware, RateLimiter};
use common::{session_cookie, TestState};
use serde_json::json;
use std::time::{Duration, Instant};

fn credentials(first: &str, last: &str, password: &str) -> serde_json::Value {
    json!({ "firstName": first, "lastName": last, "password": password })
}

#[actix_web::test]
async fn test_signup_issues_session_cookie() {
    let state = TestState::new();
    let app = college_app!(state);

    let req = test::TestRequest::post()
        .uri("/signup")
        .set_json(credentials("  Ada ", "Lovelace", "pass1"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let cookie = session_cookie(&resp).expect("session cookie");
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.path(), Some("/"));

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["firstName"], "Ada");
    assert_eq!(body["user"]["hasCollege"], false);

    let req = test::TestRequest::get()
        .uri("/profile")
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["firstName"], "Ada");
    assert_eq!(body["lastName"], "Lovelace");
    assert!(body["currentCollege"].is_null());
}

#[actix_web::test]
async fn test_signup_validation() {
    let state = TestState::new();
    let app = college_app!(state);

    for (body, expected) in [
        (credentials("", "Lovelace", "pass1"), "First name and last name are required"),
        (credentials("Ada", "   ", "pass1"), "First name and last name are required"),
        (credentials("Ada", "Lovelace", "abc"), "Password must be 4-8 characters"),
        (credentials("Ada", "Lovelace", "abcdefghi"), "Password must be 4-8 characters"),
    ] {
        let req = test::TestRequest::post()
            .uri("/signup")
            .set_json(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], expected);
    }
}

#[actix_web::test]
async fn test_duplicate_signup_conflicts() {
    let state = TestState::new();
    let app = college_app!(state);

    for expected in [StatusCode::OK, StatusCode::CONFLICT] {
        let req = test::TestRequest::post()
            .uri("/signup")
            .set_json(credentials("Ada", "Lovelace", "pass1"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), expected);
    }
}

#[actix_web::test]
async fn test_login_failures_are_indistinguishable() {
    let state = TestState::new();
    let app = college_app!(state);

    let req = test::TestRequest::post()
        .uri("/signup")
        .set_json(credentials("Ada", "Lovelace", "pass1"))
        .to_request();
    test::call_service(&app, req).await;

    let mut errors = Vec::new();
    for body in [
        credentials("Ada", "Lovelace", "wrong"),
        credentials("Alan", "Turing", "pass1"),
    ] {
        let req = test::TestRequest::post()
            .uri("/login")
            .set_json(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert!(session_cookie(&resp).is_none());

        let body: serde_json::Value = test::read_body_json(resp).await;
        errors.push(body["error"].clone());
    }

    assert_eq!(errors[0], "Invalid name or password");
    assert_eq!(errors[0], errors[1]);
}

#[actix_web::test]
async fn test_missing_account_costs_a_full_verification() {
    let mut state = TestState::new();
    state.hasher = PasswordHasher::new(PasswordScheme::Bcrypt, 10).expect("hasher");
    let app = college_app!(state);

    let req = test::TestRequest::post()
        .uri("/signup")
        .set_json(credentials("Ada", "Lovelace", "pass1"))
        .to_request();
    test::call_service(&app, req).await;

    let mut fastest = Vec::new();
    for body in [
        credentials("Ada", "Lovelace", "wrong"),
        credentials("Alan", "Turing", "wrong"),
    ] {
        let mut best = Duration::MAX;
        for _ in 0..3 {
            let req = test::TestRequest::post()
                .uri("/login")
                .set_json(body.clone())
                .to_request();
            let started = Instant::now();
            let resp = test::call_service(&app, req).await;
            best = best.min(started.elapsed());
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        }
        fastest.push(best);
    }

    let (known, missing) = (fastest[0], fastest[1]);
    assert!(
        missing * 4 >= known,
        "missing account answered in {missing:?}, known account in {known:?}"
    );
}

#[actix_web::test]
async fn test_malformed_json_uses_error_envelope() {
    let state = TestState::new();
    let app = college_app!(state);
    let cookie = {
        let req = test::TestRequest::post()
            .uri("/signup")
            .set_json(credentials("Ada", "Lovelace", "pass1"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        session_cookie(&resp).expect("session cookie")
    };

    let requests = [
        test::TestRequest::post()
            .uri("/login")
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json")
            .to_request(),
        test::TestRequest::post()
            .uri("/profile/college")
            .cookie(cookie)
            .set_json(json!({ "collegeName": "MIT", "longitude": 1.0 }))
            .to_request(),
    ];
    for req in requests {
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().starts_with("Invalid request body"));
    }
}

#[actix_web::test]
async fn test_login_with_correct_password() {
    let state = TestState::new();
    let app = college_app!(state);

    let req = test::TestRequest::post()
        .uri("/signup")
        .set_json(credentials("Ada", "Lovelace", "pass1"))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::post()
        .uri("/login")
        .set_json(credentials("Ada", "Lovelace", "pass1"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let cookie = session_cookie(&resp).expect("session cookie");
    let req = test::TestRequest::get()
        .uri("/profile")
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_protected_route_requires_valid_session() {
    let state = TestState::new();
    let app = college_app!(state);

    let req = test::TestRequest::get().uri("/profile").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/profile")
        .cookie(Cookie::new("session", "dTEyMzpmb3JnZWQ="))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // signed for an id that was never stored
    let orphan = state.sessions.issue("ghost");
    let req = test::TestRequest::get()
        .uri("/profile")
        .cookie(orphan)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_logout_removes_cookie_and_is_idempotent() {
    let state = TestState::new();
    let app = college_app!(state);

    for _ in 0..2 {
        let req = test::TestRequest::post().uri("/logout").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let cookie = session_cookie(&resp).expect("removal cookie");
        assert_eq!(cookie.value(), "");
        assert_eq!(
            cookie.max_age(),
            Some(actix_web::cookie::time::Duration::ZERO)
        );
    }
}

#[actix_web::test]
async fn test_credential_endpoints_are_rate_limited() {
    let state = TestState::new();
    let limiter = RateLimiter::from_config(&RateLimitConfig {
        max_requests: 2,
        window_secs: 60,
    });

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state.store.clone()))
            .app_data(web::Data::new(state.hasher.clone()))
            .app_data(web::Data::new(state.sessions.clone()))
            .app_data(web::Data::new(limiter.clone()))
            .service(
                web::scope("")
                    .wrap(actix_web::middleware::from_fn(rate_limit_middleware))
                    .service(handlers::login),
            ),
    )
    .await;

    let peer = "203.0.113.9:40000".parse().unwrap();
    let mut statuses = Vec::new();
    for _ in 0..3 {
        let req = test::TestRequest::post()
            .uri("/login")
            .peer_addr(peer)
            .set_json(credentials("Ada", "Lovelace", "pass1"))
            .to_request();
        // the limiter rejects from middleware, before a response exists
        let status = match test::try_call_service(&app, req).await {
            Ok(resp) => resp.status(),
            Err(err) => err.as_response_error().status_code(),
        };
        statuses.push(status);
    }

    assert_eq!(
        statuses,
        vec![
            StatusCode::UNAUTHORIZED,
            StatusCode::UNAUTHORIZED,
            StatusCode::TOO_MANY_REQUESTS
        ]
    );
}
