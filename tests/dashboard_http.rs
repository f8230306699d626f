//! End-to-end tests of the dashboard routes.
//!
//! Run with: cargo test --test dashboard_http

use std::{path::Path, sync::Arc};

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use eta_dashboard::{
    model,
    server::{router, AppState},
    types::FeatureRow,
    HasFeatureImportance, ModelError, Regressor,
};

struct StubModel {
    minutes: f64,
    importances: Option<Vec<f64>>,
}

impl Regressor for StubModel {
    fn kind(&self) -> &'static str {
        "stub"
    }

    fn predict(&self, rows: &[FeatureRow]) -> Result<Vec<f64>, ModelError> {
        Ok(vec![self.minutes; rows.len()])
    }
}

impl HasFeatureImportance for StubModel {
    fn feature_importances(&self) -> Option<&[f64]> {
        self.importances.as_deref()
    }
}

struct BrokenModel;

impl Regressor for BrokenModel {
    fn kind(&self) -> &'static str {
        "broken"
    }

    fn predict(&self, _rows: &[FeatureRow]) -> Result<Vec<f64>, ModelError> {
        Err(ModelError::ShapeMismatch {
            got: 5,
            expected: 7,
        })
    }
}

impl HasFeatureImportance for BrokenModel {}

fn app_with(minutes: f64, importances: Option<Vec<f64>>) -> Router {
    router(AppState::new(
        Arc::new(StubModel {
            minutes,
            importances,
        }),
        false,
    ))
}

async fn body_text(resp: Response) -> String {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn form_post(body: &'static str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

fn json_post(body: &'static str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn index_is_idle() {
    let resp = app_with(20.0, None)
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let html = body_text(resp).await;
    assert!(html.contains("Smart Food Delivery Time Predictor"));
    assert!(html.contains("value=\"25\""));
    assert!(!html.contains("Prediction Results"));
}

#[tokio::test]
async fn form_predict_shows_results() {
    let resp = app_with(20.0, None)
        .oneshot(form_post(
            "age=25&rating=4.0&distance_km=5.0&order_type=Meal&vehicle_type=Bike",
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let html = body_text(resp).await;
    assert!(html.contains("Prediction Results"));
    assert!(html.contains("20.00"));
    assert!(html.contains("25 mins"));
    assert!(html.contains("Low Delay Risk"));
    assert!(html.contains("<option value=\"Meal\" selected>"));
    assert!(!html.contains("Feature Importance Analysis"));
}

#[tokio::test]
async fn form_predict_with_importances() {
    let resp = app_with(27.0, Some(vec![0.1, 0.2, 0.4, 0.1, 0.2]))
        .oneshot(form_post(
            "age=40&rating=3.2&distance_km=11.5&order_type=Snack&vehicle_type=Cycle",
        ))
        .await
        .unwrap();
    let html = body_text(resp).await;
    assert!(html.contains("33 mins"));
    assert!(html.contains("Moderate Delay Risk"));
    assert!(html.contains("Feature Importance Analysis"));
}

#[tokio::test]
async fn unknown_selector_value_is_rejected() {
    let resp = app_with(20.0, None)
        .oneshot(form_post("age=25&order_type=Pizza&vehicle_type=Bike"))
        .await
        .unwrap();
    assert!(resp.status().is_client_error());
}

#[tokio::test]
async fn api_predict_returns_report() {
    let resp = app_with(40.0, None)
        .oneshot(json_post(
            r#"{"age":25,"rating":4.0,"distance_km":5.0,"order_type":"Meal","vehicle_type":"Bike"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let v: Value = serde_json::from_str(&body_text(resp).await).unwrap();
    assert_eq!(v["encoded"]["order_code"], 2);
    assert_eq!(v["encoded"]["vehicle_code"], 0);
    assert_eq!(v["result"]["min_eta"], 40);
    assert_eq!(v["result"]["max_eta"], 47);
    assert_eq!(v["result"]["risk_tier"], "high");
    assert_eq!(v["result"]["risk_label"], "High Delay Risk");
    assert_eq!(v["result"]["risk_score"], 85);
    assert!(v["feature_importance"].is_null());
}

#[tokio::test]
async fn api_predict_clamps_out_of_range_sliders() {
    let resp = app_with(20.0, None)
        .oneshot(json_post(r#"{"age":5,"distance_km":400.0}"#))
        .await
        .unwrap();
    let v: Value = serde_json::from_str(&body_text(resp).await).unwrap();
    assert_eq!(v["inputs"]["age"], 18);
    assert_eq!(v["inputs"]["rating"], 4.0);
    assert_eq!(v["inputs"]["distance_km"], 25.0);
    assert_eq!(v["inputs"]["order_type"], "Drinks");
}

#[tokio::test]
async fn model_failure_is_a_server_error() {
    let app = router(AppState::new(Arc::new(BrokenModel), false));
    let resp = app
        .oneshot(form_post("age=25&order_type=Meal&vehicle_type=Bike"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let v: Value = serde_json::from_str(&body_text(resp).await).unwrap();
    assert_eq!(v["status"], 500);
    assert!(v["error"].as_str().unwrap().contains("feature length mismatch"));
}

#[tokio::test]
async fn health_reports_model_capabilities() {
    let resp = app_with(20.0, Some(vec![0.2; 5]))
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let v: Value = serde_json::from_str(&body_text(resp).await).unwrap();
    assert_eq!(v["status"], "healthy");
    assert_eq!(v["model_kind"], "stub");
    assert_eq!(v["feature_importance"], true);
}

#[tokio::test]
async fn bundled_artifact_serves_predictions() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("models/delivery_model.json");
    let mdl = model::load(&path, None).unwrap();
    let app = router(AppState::new(mdl, true));

    let resp = app
        .oneshot(json_post(
            r#"{"age":25,"rating":4.0,"distance_km":5.0,"order_type":"Meal","vehicle_type":"Bike"}"#,
        ))
        .await
        .unwrap();
    let v: Value = serde_json::from_str(&body_text(resp).await).unwrap();
    assert_eq!(v["result"]["predicted_minutes"], 22.0);
    assert_eq!(v["result"]["max_eta"], 27);
    assert_eq!(v["feature_importance"][0]["feature"], "Distance");
}
