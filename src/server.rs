use axum::{
    extract::State,
    response::Html,
    routing::{get, post},
    Form, Json, Router,
};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::{
    dashboard::{self, collect_inputs, DashboardState, PredictionReport, WidgetState},
    error::{AppError, ModelError},
    model::ModelHandle,
    render,
    types::InputVector,
};

// ---------- Server state ----------

#[derive(Clone)]
pub struct AppState {
    model: ModelHandle,
    log_predictions: bool,
}

impl AppState {
    pub fn new(model: ModelHandle, log_predictions: bool) -> Self {
        Self {
            model,
            log_predictions,
        }
    }

    fn predict(&self, inputs: InputVector) -> Result<PredictionReport, ModelError> {
        let report = dashboard::run_prediction(self.model.as_ref(), inputs)?;
        let r = &report.result;
        if self.log_predictions {
            tracing::info!(
                row = ?report.encoded.to_row(),
                predicted = r.predicted_minutes,
                min_eta = r.min_eta,
                max_eta = r.max_eta,
                risk = r.risk_label,
                "prediction"
            );
        } else {
            tracing::debug!(predicted = r.predicted_minutes, risk = r.risk_label, "prediction");
        }
        Ok(report)
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/predict", post(predict_page))
        .route("/api/predict", post(predict_api))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ---------- Handlers ----------

async fn index() -> Html<String> {
    Html(render::page(&DashboardState::idle()))
}

async fn predict_page(
    State(state): State<AppState>,
    Form(widgets): Form<WidgetState>,
) -> Result<Html<String>, AppError> {
    let report = state.predict(collect_inputs(&widgets))?;
    Ok(Html(render::page(&DashboardState::ResultShown {
        report: Box::new(report),
    })))
}

async fn predict_api(
    State(state): State<AppState>,
    Json(widgets): Json<WidgetState>,
) -> Result<Json<PredictionReport>, AppError> {
    let report = state.predict(collect_inputs(&widgets))?;
    Ok(Json(report))
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    model_kind: &'static str,
    feature_importance: bool,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        model_kind: state.model.kind(),
        feature_importance: state.model.feature_importances().is_some(),
    })
}
