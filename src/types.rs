use serde::{Deserialize, Serialize};

/// Number of model input columns: age, rating, distance, order, vehicle.
pub const N_FEATURES: usize = 5;

/// Display names of the model inputs, in row order.
pub const FEATURE_NAMES: [&str; N_FEATURES] =
    ["Age", "Rating", "Distance", "Order Type", "Vehicle Type"];

/// One model input row, laid out as `[age, rating, distance_km, order, vehicle]`.
pub type FeatureRow = [f64; N_FEATURES];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OrderType {
    #[default]
    Drinks,
    Snack,
    Meal,
    Buffet,
}

impl OrderType {
    pub const ALL: [OrderType; 4] = [
        OrderType::Drinks,
        OrderType::Snack,
        OrderType::Meal,
        OrderType::Buffet,
    ];

    /// Ordinal code the model was trained with.
    pub fn code(self) -> u8 {
        match self {
            OrderType::Drinks => 0,
            OrderType::Snack => 1,
            OrderType::Meal => 2,
            OrderType::Buffet => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderType::Drinks => "Drinks",
            OrderType::Snack => "Snack",
            OrderType::Meal => "Meal",
            OrderType::Buffet => "Buffet",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum VehicleType {
    #[default]
    Bike,
    Scooter,
    Cycle,
}

impl VehicleType {
    pub const ALL: [VehicleType; 3] = [VehicleType::Bike, VehicleType::Scooter, VehicleType::Cycle];

    /// Ordinal code the model was trained with.
    pub fn code(self) -> u8 {
        match self {
            VehicleType::Bike => 0,
            VehicleType::Scooter => 1,
            VehicleType::Cycle => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            VehicleType::Bike => "Bike",
            VehicleType::Scooter => "Scooter",
            VehicleType::Cycle => "Cycle",
        }
    }
}

/// Widget values for one render cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InputVector {
    pub age: i64,
    pub rating: f64,
    pub distance_km: f64,
    pub order_type: OrderType,
    pub vehicle_type: VehicleType,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EncodedFeatures {
    pub age: i64,
    pub rating: f64,
    pub distance_km: f64,
    pub order_code: u8,
    pub vehicle_code: u8,
}

impl EncodedFeatures {
    pub fn to_row(&self) -> FeatureRow {
        [
            self.age as f64,
            self.rating,
            self.distance_km,
            f64::from(self.order_code),
            f64::from(self.vehicle_code),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    Low,
    Moderate,
    High,
}

impl RiskTier {
    pub fn label(self) -> &'static str {
        match self {
            RiskTier::High => "High Delay Risk",
            RiskTier::Moderate => "Moderate Delay Risk",
            RiskTier::Low => "Low Delay Risk",
        }
    }

    pub fn score(self) -> u8 {
        match self {
            RiskTier::High => 85,
            RiskTier::Moderate => 60,
            RiskTier::Low => 30,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionResult {
    pub predicted_minutes: f64,
    pub min_eta: i64,
    pub max_eta: i64,
    pub risk_tier: RiskTier,
    pub risk_label: &'static str,
    pub risk_score: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureWeight {
    pub feature: &'static str,
    pub importance: f64,
}
