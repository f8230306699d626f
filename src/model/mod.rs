//! Model handle and the capability traits the dashboard relies on.
//!
//! A model is loaded once at startup, warmed up, and then shared read-only
//! behind an [`Arc`] for the lifetime of the process.

use std::{path::Path, sync::Arc};

use crate::{
    error::ModelError,
    types::{FeatureRow, N_FEATURES},
};

pub mod artifact;
#[cfg(feature = "torch")]
pub mod torch;

pub use artifact::JsonModel;

/// Regression capability: one prediction per input row.
pub trait Regressor: Send + Sync {
    /// Short backend name, reported by `/health` and startup logs.
    fn kind(&self) -> &'static str;

    fn predict(&self, rows: &[FeatureRow]) -> Result<Vec<f64>, ModelError>;
}

/// Optional per-feature weights, in input column order.
pub trait HasFeatureImportance {
    fn feature_importances(&self) -> Option<&[f64]> {
        None
    }
}

pub trait DeliveryModel: Regressor + HasFeatureImportance {}

impl<T: Regressor + HasFeatureImportance + ?Sized> DeliveryModel for T {}

pub type ModelHandle = Arc<dyn DeliveryModel>;

/// Loads the artifact at `model_path`, picking the backend by extension.
///
/// `meta_path` is only consulted by the TorchScript backend.
#[cfg_attr(not(feature = "torch"), allow(unused_variables))]
pub fn load(model_path: &Path, meta_path: Option<&Path>) -> Result<ModelHandle, ModelError> {
    let ext = model_path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    let model: ModelHandle = match ext.as_deref() {
        Some("json") => Arc::new(JsonModel::load(model_path)?),
        #[cfg(feature = "torch")]
        Some("pt") | Some("ts") => Arc::new(torch::TorchModel::load(model_path, meta_path)?),
        _ => return Err(ModelError::UnsupportedFormat(model_path.to_path_buf())),
    };

    warmup(model.as_ref())?;
    tracing::info!(
        path = %model_path.display(),
        kind = model.kind(),
        importances = model.feature_importances().is_some(),
        "loaded model; warmup predict ok"
    );
    Ok(model)
}

fn warmup(model: &dyn DeliveryModel) -> Result<(), ModelError> {
    let out = model.predict(&[[0.0; N_FEATURES]])?;
    if out.len() != 1 {
        return Err(ModelError::OutputCount {
            got: out.len(),
            expected: 1,
        });
    }
    Ok(())
}

pub(crate) fn check_importances(weights: &[f64]) -> Result<(), ModelError> {
    if weights.len() != N_FEATURES {
        return Err(ModelError::Invalid(format!(
            "feature_importances has {} entries, expected {}",
            weights.len(),
            N_FEATURES
        )));
    }
    if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
        return Err(ModelError::Invalid(
            "feature_importances must be finite and non-negative".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn rejects_unknown_extension() {
        let err = load(Path::new("delivery_model.pkl"), None).err().unwrap();
        assert!(matches!(err, ModelError::UnsupportedFormat(_)));
    }

    #[test]
    fn loads_json_artifact_and_warms_up() {
        let mut f = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            f,
            r#"{{"kind":"linear","intercept":12.0,"coefficients":[0.1,-1.0,2.0,0.5,0.5]}}"#
        )
        .unwrap();

        let model = load(f.path(), None).unwrap();
        assert_eq!(model.kind(), "linear");
        assert!(model.feature_importances().is_none());
    }

    #[test]
    fn importance_length_is_checked() {
        assert!(check_importances(&[0.2; 5]).is_ok());
        assert!(check_importances(&[0.25; 4]).is_err());
        assert!(check_importances(&[0.2, 0.2, f64::NAN, 0.2, 0.2]).is_err());
    }
}
