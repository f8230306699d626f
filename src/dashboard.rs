//! Input → predict → derive flow of the dashboard.
//!
//! Everything here is synchronous and pure apart from the model call; the
//! HTTP layer turns a [`DashboardState`] into a page.

use serde::{Deserialize, Serialize};

use crate::{
    error::ModelError,
    model::DeliveryModel,
    types::{
        EncodedFeatures, FeatureWeight, InputVector, OrderType, PredictionResult, RiskTier,
        VehicleType, FEATURE_NAMES,
    },
};

/// Fractional safety margin added on top of the prediction.
const BUFFER_RATIO: f64 = 0.10;
/// Fixed minutes added after the fractional margin.
const BUFFER_MINUTES: f64 = 3.0;

const HIGH_RISK_ABOVE: i64 = 45;
const MODERATE_RISK_ABOVE: i64 = 30;

#[derive(Debug, Clone, Copy)]
pub struct IntSlider {
    pub name: &'static str,
    pub label: &'static str,
    pub min: i64,
    pub max: i64,
    pub default: i64,
}

#[derive(Debug, Clone, Copy)]
pub struct FloatSlider {
    pub name: &'static str,
    pub label: &'static str,
    pub min: f64,
    pub max: f64,
    pub default: f64,
    pub step: f64,
}

pub const AGE_SLIDER: IntSlider = IntSlider {
    name: "age",
    label: "Delivery Partner Age",
    min: 18,
    max: 60,
    default: 25,
};

pub const RATING_SLIDER: FloatSlider = FloatSlider {
    name: "rating",
    label: "Delivery Partner Rating",
    min: 1.0,
    max: 5.0,
    default: 4.0,
    step: 0.01,
};

pub const DISTANCE_SLIDER: FloatSlider = FloatSlider {
    name: "distance_km",
    label: "Distance (km)",
    min: 0.5,
    max: 25.0,
    default: 5.0,
    step: 0.01,
};

impl IntSlider {
    fn read(&self, raw: Option<i64>) -> i64 {
        raw.map_or(self.default, |v| v.clamp(self.min, self.max))
    }
}

impl FloatSlider {
    fn read(&self, raw: Option<f64>) -> f64 {
        match raw {
            Some(v) if v.is_finite() => v.clamp(self.min, self.max),
            _ => self.default,
        }
    }
}

/// Raw widget values as submitted by the page or the JSON API.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WidgetState {
    pub age: Option<i64>,
    pub rating: Option<f64>,
    pub distance_km: Option<f64>,
    #[serde(default)]
    pub order_type: OrderType,
    #[serde(default)]
    pub vehicle_type: VehicleType,
}

/// Reads the five widgets. A slider cannot leave its range, so values
/// outside it snap to the nearest bound; missing ones take the default.
pub fn collect_inputs(state: &WidgetState) -> InputVector {
    InputVector {
        age: AGE_SLIDER.read(state.age),
        rating: RATING_SLIDER.read(state.rating),
        distance_km: DISTANCE_SLIDER.read(state.distance_km),
        order_type: state.order_type,
        vehicle_type: state.vehicle_type,
    }
}

pub fn default_inputs() -> InputVector {
    collect_inputs(&WidgetState::default())
}

pub fn encode(input: &InputVector) -> EncodedFeatures {
    EncodedFeatures {
        age: input.age,
        rating: input.rating,
        distance_km: input.distance_km,
        order_code: input.order_type.code(),
        vehicle_code: input.vehicle_type.code(),
    }
}

/// Single-row model call.
pub fn predict(model: &dyn DeliveryModel, features: &EncodedFeatures) -> Result<f64, ModelError> {
    let out = model.predict(&[features.to_row()])?;
    let minutes = match out.as_slice() {
        [p] => *p,
        _ => {
            return Err(ModelError::OutputCount {
                got: out.len(),
                expected: 1,
            })
        }
    };
    if !minutes.is_finite() {
        return Err(ModelError::NonFinite(minutes));
    }
    Ok(minutes)
}

/// `(round(p), round(p + p * 0.10 + 3))`, rounding half to even.
pub fn derive_eta_bounds(predicted_minutes: f64) -> (i64, i64) {
    let p = predicted_minutes;
    let min_eta = p.round_ties_even() as i64;
    let max_eta = (p + p * BUFFER_RATIO + BUFFER_MINUTES).round_ties_even() as i64;
    (min_eta, max_eta)
}

pub fn classify_risk(max_eta: i64) -> RiskTier {
    if max_eta > HIGH_RISK_ABOVE {
        RiskTier::High
    } else if max_eta > MODERATE_RISK_ABOVE {
        RiskTier::Moderate
    } else {
        RiskTier::Low
    }
}

pub fn build_result(predicted_minutes: f64) -> PredictionResult {
    let (min_eta, max_eta) = derive_eta_bounds(predicted_minutes);
    let tier = classify_risk(max_eta);
    PredictionResult {
        predicted_minutes,
        min_eta,
        max_eta,
        risk_tier: tier,
        risk_label: tier.label(),
        risk_score: tier.score(),
    }
}

/// Model importances paired with feature names, heaviest first.
pub fn feature_importance(model: &dyn DeliveryModel) -> Option<Vec<FeatureWeight>> {
    let weights = model.feature_importances()?;
    let mut pairs: Vec<FeatureWeight> = FEATURE_NAMES
        .iter()
        .zip(weights)
        .map(|(&feature, &importance)| FeatureWeight {
            feature,
            importance,
        })
        .collect();
    pairs.sort_by(|a, b| b.importance.total_cmp(&a.importance));
    Some(pairs)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionReport {
    pub inputs: InputVector,
    pub encoded: EncodedFeatures,
    pub result: PredictionResult,
    pub feature_importance: Option<Vec<FeatureWeight>>,
}

/// Handles one "Predict Delivery Time" event end to end.
pub fn run_prediction(
    model: &dyn DeliveryModel,
    inputs: InputVector,
) -> Result<PredictionReport, ModelError> {
    let encoded = encode(&inputs);
    let minutes = predict(model, &encoded)?;
    Ok(PredictionReport {
        inputs,
        encoded,
        result: build_result(minutes),
        feature_importance: feature_importance(model),
    })
}

/// What the page shows: inputs alone, or inputs plus a result panel.
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardState {
    Idle { inputs: InputVector },
    ResultShown { report: Box<PredictionReport> },
}

impl DashboardState {
    pub fn idle() -> Self {
        DashboardState::Idle {
            inputs: default_inputs(),
        }
    }

    pub fn inputs(&self) -> &InputVector {
        match self {
            DashboardState::Idle { inputs } => inputs,
            DashboardState::ResultShown { report } => &report.inputs,
        }
    }
}
