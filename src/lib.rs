//! Delivery ETA predictor dashboard.
//!
//! Loads a regression model once, serves a single page of input widgets and,
//! on each predict event, renders the predicted delivery time with a safety
//! buffered ETA window, a delay-risk tier and optional feature importances.

pub mod config;
pub mod dashboard;
pub mod error;
pub mod model;
pub mod render;
pub mod server;
pub mod types;

pub use dashboard::{
    build_result, classify_risk, collect_inputs, derive_eta_bounds, encode, predict,
    run_prediction, DashboardState, PredictionReport, WidgetState,
};
pub use error::{AppError, ConfigError, ModelError};
pub use render::{page, render_results};
pub use model::{DeliveryModel, HasFeatureImportance, ModelHandle, Regressor};
