//! HTTP router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! JSON routes are nested under `/api/`; the single-page UI is at `/`.
//!
//! Middleware stack (outermost → innermost):
//! 1. Request tracing → 2. Session auth (protected routes only)

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;

/// Build the application router.
///
/// Middleware uses `Extension<ApiContext>` (injected as the outermost layer).
/// Endpoint handlers use `State<ApiContext>` (provided via `with_state`).
pub fn build_router(ctx: ApiContext) -> Router {
    // Layers are applied from bottom (innermost) to top (outermost):
    //   Extension (outermost) → Auth (innermost) → Handler
    //
    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let protected = Router::new()
        .route("/auth/logout", post(endpoints::auth::logout))
        .route("/patients", post(endpoints::patients::create))
        .route("/patients/:id", get(endpoints::patients::get))
        .route("/records/diabetes", post(endpoints::records::create_diabetes))
        .route(
            "/records/diabetes/:patient_id",
            get(endpoints::records::get_diabetes),
        )
        .route(
            "/records/heart-disease",
            post(endpoints::records::create_heart_disease),
        )
        .route(
            "/records/heart-disease/:patient_id",
            get(endpoints::records::get_heart_disease),
        )
        .route(
            "/records/parkinsons",
            post(endpoints::records::create_parkinsons),
        )
        .route(
            "/records/parkinsons/:patient_id",
            get(endpoints::records::get_parkinsons),
        )
        .route("/predictions", post(endpoints::predictions::predict))
        .route(
            "/predictions/report.pdf",
            get(endpoints::predictions::report_pdf),
        )
        .route("/chat", get(endpoints::chat::history))
        .route(
            "/chat/general",
            post(endpoints::chat::general).delete(endpoints::chat::clear_general),
        )
        .route(
            "/chat/patient",
            post(endpoints::chat::patient).delete(endpoints::chat::clear_patient),
        )
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::auth::require_session))
        // Extension must be outermost so middleware can extract ApiContext
        .layer(axum::Extension(ctx.clone()));

    // Unprotected routes, no auth required
    let unprotected = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/auth/register", post(endpoints::auth::register))
        .route("/auth/login", post(endpoints::auth::login))
        .with_state(ctx);

    Router::new()
        .route("/", get(endpoints::ui::index))
        .nest("/api", protected)
        .nest("/api", unprotected)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, Response, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::api::types::tests::test_context;
    use crate::generation::MockGenerator;
    use crate::prediction::tests::seed_patient;

    fn make_request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(t) = token {
            builder = builder.header("Authorization", format!("Bearer {t}"));
        }
        match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn response_json(response: Response<Body>) -> Value {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    async fn send(app: &Router, req: Request<Body>) -> Response<Body> {
        app.clone().oneshot(req).await.unwrap()
    }

    /// Register + log in; returns the bearer token.
    async fn login(app: &Router) -> String {
        let creds = json!({ "username": "alice", "password": "wonderland" });
        let response = send(app, make_request("POST", "/api/auth/register", None, Some(creds.clone()))).await;
        assert_eq!(response.status(), StatusCode::OK);
        let response = send(app, make_request("POST", "/api/auth/login", None, Some(creds))).await;
        assert_eq!(response.status(), StatusCode::OK);
        response_json(response).await["token"]
            .as_str()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn health_is_public() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_context(dir.path(), MockGenerator::new("ok")));

        let response = send(&app, make_request("GET", "/api/health", None, None)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["generator_model"], "mock");
    }

    #[tokio::test]
    async fn index_serves_html() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_context(dir.path(), MockGenerator::new("ok")));

        let response = send(&app, make_request("GET", "/", None, None)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers().get(header::CONTENT_TYPE).unwrap();
        assert!(content_type.to_str().unwrap().starts_with("text/html"));

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let page = String::from_utf8(body.to_vec()).unwrap();
        assert!(page.contains("Retrieve Patient Details"));
        assert!(page.contains(r#"api("GET", "/patients/" +"#));
    }

    #[tokio::test]
    async fn protected_route_requires_token() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_context(dir.path(), MockGenerator::new("ok")));

        let response = send(&app, make_request("GET", "/api/chat", None, None)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let json = response_json(response).await;
        assert_eq!(json["error"]["code"], "AUTH_REQUIRED");
    }

    #[tokio::test]
    async fn unknown_token_returns_401() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_context(dir.path(), MockGenerator::new("ok")));

        let response = send(&app, make_request("GET", "/api/patients/1", Some("not-a-session"), None)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_context(dir.path(), MockGenerator::new("ok")));
        login(&app).await;

        let creds = json!({ "username": "alice", "password": "nope" });
        let response = send(&app, make_request("POST", "/api/auth/login", None, Some(creds))).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let json = response_json(response).await;
        assert_eq!(json["error"]["code"], "INVALID_CREDENTIALS");
    }

    #[tokio::test]
    async fn duplicate_registration_reports_existing() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_context(dir.path(), MockGenerator::new("ok")));
        login(&app).await;

        let creds = json!({ "username": "alice", "password": "other" });
        let response = send(&app, make_request("POST", "/api/auth/register", None, Some(creds))).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response_json(response).await["outcome"], "already_exists");
    }

    #[tokio::test]
    async fn empty_credentials_are_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_context(dir.path(), MockGenerator::new("ok")));

        let creds = json!({ "username": "", "password": "x" });
        let response = send(&app, make_request("POST", "/api/auth/register", None, Some(creds))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn logout_invalidates_token() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_context(dir.path(), MockGenerator::new("ok")));
        let token = login(&app).await;

        let response = send(&app, make_request("POST", "/api/auth/logout", Some(&token), None)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(&app, make_request("GET", "/api/chat", Some(&token), None)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn patient_and_record_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_context(dir.path(), MockGenerator::new("ok")));
        let token = login(&app).await;

        let patient = json!({ "name": "Ada Lovelace", "age": 36, "gender": "Female" });
        let response = send(&app, make_request("POST", "/api/patients", Some(&token), Some(patient))).await;
        assert_eq!(response.status(), StatusCode::OK);
        let id = response_json(response).await["id"].as_i64().unwrap();

        let response = send(&app, make_request("GET", &format!("/api/patients/{id}"), Some(&token), None)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response_json(response).await["name"], "Ada Lovelace");

        let record = json!({
            "patient_id": id, "pregnancies": 0, "glucose": "120", "blood_pressure": "80",
            "skin_thickness": "20", "insulin": "85", "bmi": "24.5", "diabetes_pedigree": "0.35"
        });
        let response = send(&app, make_request("POST", "/api/records/diabetes", Some(&token), Some(record))).await;
        assert_eq!(response.status(), StatusCode::OK);

        let uri = format!("/api/records/diabetes/{id}");
        let response = send(&app, make_request("GET", &uri, Some(&token), None)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response_json(response).await["glucose"], 120);
    }

    #[tokio::test]
    async fn heart_record_keeps_fractional_platelets() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_context(dir.path(), MockGenerator::new("ok")));
        let token = login(&app).await;

        let record = json!({
            "patient_id": 4, "anaemia": "no", "creatine": "582", "diabetes": "no",
            "ejection_fraction": "20", "bp": "yes", "platelets": "263358.03",
            "serum_creatinine": "1.9", "serum_sodium": "130", "smoking": "no", "follow_up": "4"
        });
        let response = send(&app, make_request("POST", "/api/records/heart-disease", Some(&token), Some(record))).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(&app, make_request("GET", "/api/records/heart-disease/4", Some(&token), None)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response_json(response).await["platelets"], 263358.03);
    }

    #[tokio::test]
    async fn missing_patient_and_record_are_404() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_context(dir.path(), MockGenerator::new("ok")));
        let token = login(&app).await;

        let response = send(&app, make_request("GET", "/api/patients/999", Some(&token), None)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = send(&app, make_request("GET", "/api/records/parkinsons/999", Some(&token), None)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn non_numeric_field_is_400_naming_the_field() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_context(dir.path(), MockGenerator::new("ok")));
        let token = login(&app).await;

        let record = json!({
            "patient_id": 1, "anaemia": "no", "creatine": "lots", "diabetes": "no",
            "ejection_fraction": "38", "bp": "yes", "platelets": "263358",
            "serum_creatinine": "1.1", "serum_sodium": "136", "smoking": "no", "follow_up": "90"
        });
        let response = send(&app, make_request("POST", "/api/records/heart-disease", Some(&token), Some(record))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = response_json(response).await;
        assert!(json["error"]["message"].as_str().unwrap().contains("creatine"));
    }

    #[tokio::test]
    async fn report_requires_a_prediction_first() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_context(dir.path(), MockGenerator::new("ok")));
        let token = login(&app).await;

        let response = send(&app, make_request("GET", "/api/predictions/report.pdf", Some(&token), None)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn prediction_then_pdf_report() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = test_context(dir.path(), MockGenerator::new("Further testing is advised."));
        let patient_id = seed_patient(&ctx.clinical.open().unwrap());
        let app = build_router(ctx);
        let token = login(&app).await;

        let body = json!({ "patient_id": patient_id });
        let response = send(&app, make_request("POST", "/api/predictions", Some(&token), Some(body))).await;
        assert_eq!(response.status(), StatusCode::OK);
        let report = response_json(response).await;
        assert_eq!(report["patient"]["name"], "Grace Hopper");
        assert_eq!(report["assessments"].as_array().unwrap().len(), 3);
        assert_eq!(report["assessments"][0]["disease"], "diabetes");
        assert_eq!(
            report["assessments"][0]["treatment_suggestion"],
            "Further testing is advised."
        );

        let response = send(&app, make_request("GET", "/api/predictions/report.pdf", Some(&token), None)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/pdf"
        );
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn prediction_for_patient_without_records_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_context(dir.path(), MockGenerator::new("ok")));
        let token = login(&app).await;

        let body = json!({ "patient_id": 42 });
        let response = send(&app, make_request("POST", "/api/predictions", Some(&token), Some(body))).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn chat_history_keeps_answers_and_drops_apologies() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = test_context(dir.path(), MockGenerator::new("Stay hydrated."));
        let patient_id = seed_patient(&ctx.clinical.open().unwrap());
        let app = build_router(ctx);
        let token = login(&app).await;

        let body = json!({ "query": "How much water should I drink?" });
        let response = send(&app, make_request("POST", "/api/chat/general", Some(&token), Some(body))).await;
        let json = response_json(response).await;
        assert_eq!(json["reply"], "Stay hydrated.");
        assert_eq!(json["stored"], true);

        let body = json!({ "patient_id": patient_id, "query": "Is the patient diabetic?" });
        let response = send(&app, make_request("POST", "/api/chat/patient", Some(&token), Some(body))).await;
        assert_eq!(response_json(response).await["stored"], true);

        let body = json!({ "patient_id": patient_id, "query": "How is the patient?" });
        let response = send(&app, make_request("POST", "/api/chat/patient", Some(&token), Some(body))).await;
        assert_eq!(response_json(response).await["stored"], false);

        let response = send(&app, make_request("GET", "/api/chat", Some(&token), None)).await;
        let history = response_json(response).await;
        assert_eq!(history["general"].as_array().unwrap().len(), 1);
        assert_eq!(history["patient"].as_array().unwrap().len(), 1);
        assert_eq!(history["patient"][0]["patient_id"], patient_id);

        let response = send(&app, make_request("DELETE", "/api/chat/general", Some(&token), None)).await;
        assert_eq!(response_json(response).await["cleared"], 1);

        let response = send(&app, make_request("GET", "/api/chat", Some(&token), None)).await;
        let history = response_json(response).await;
        assert!(history["general"].as_array().unwrap().is_empty());
        assert_eq!(history["patient"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn sessions_do_not_share_history() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_context(dir.path(), MockGenerator::new("Rest well.")));
        let first = login(&app).await;

        let creds = json!({ "username": "alice", "password": "wonderland" });
        let response = send(&app, make_request("POST", "/api/auth/login", None, Some(creds))).await;
        let second = response_json(response).await["token"].as_str().unwrap().to_string();
        assert_ne!(first, second);

        let body = json!({ "query": "Tips for sleep?" });
        send(&app, make_request("POST", "/api/chat/general", Some(&first), Some(body))).await;

        let response = send(&app, make_request("GET", "/api/chat", Some(&second), None)).await;
        assert!(response_json(response).await["general"].as_array().unwrap().is_empty());
    }
}
