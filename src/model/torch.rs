use std::{fs, path::Path};

use serde::Deserialize;
use tch::{kind::Kind, CModule, Device, Tensor};

use super::{check_importances, HasFeatureImportance, Regressor};
use crate::{
    error::ModelError,
    types::{FeatureRow, N_FEATURES},
};

#[derive(Deserialize)]
struct MetaJson {
    feat_list: Vec<String>,
    in_dim: Option<usize>,
    #[serde(default)]
    feature_importances: Option<Vec<f64>>,
}

/// TorchScript regressor taking `[B, 5]` float rows and returning `[B]` or `[B, 1]`.
pub struct TorchModel {
    model: CModule,
    device: Device,
    importances: Option<Vec<f64>>,
}

impl TorchModel {
    pub fn load(model_path: &Path, meta_path: Option<&Path>) -> Result<Self, ModelError> {
        let device = Device::Cpu;

        let mut importances = None;
        if let Some(meta_path) = meta_path {
            let meta_txt = fs::read_to_string(meta_path).map_err(|source| ModelError::Read {
                path: meta_path.to_path_buf(),
                source,
            })?;
            let meta: MetaJson =
                serde_json::from_str(&meta_txt).map_err(|source| ModelError::Parse {
                    path: meta_path.to_path_buf(),
                    source,
                })?;

            let in_dim = meta.in_dim.unwrap_or(meta.feat_list.len());
            if in_dim != N_FEATURES {
                return Err(ModelError::ShapeMismatch {
                    got: in_dim,
                    expected: N_FEATURES,
                });
            }
            tracing::debug!(feat_list = ?meta.feat_list, "read torch meta");
            if let Some(weights) = &meta.feature_importances {
                check_importances(weights)?;
            }
            importances = meta.feature_importances;
        }

        let model = CModule::load_on_device(model_path, device)?;

        // Probe output shape with a dummy forward; expect [1] or [1, 1]
        let dummy = Tensor::zeros([1, N_FEATURES as i64], (Kind::Float, device));
        let sz = model.forward_ts(&[dummy])?.size();
        if !(sz == [1] || sz == [1, 1]) {
            return Err(ModelError::Invalid(format!(
                "unexpected model output size: {:?}",
                sz
            )));
        }

        Ok(Self {
            model,
            device,
            importances,
        })
    }
}

impl Regressor for TorchModel {
    fn kind(&self) -> &'static str {
        "torchscript"
    }

    fn predict(&self, rows: &[FeatureRow]) -> Result<Vec<f64>, ModelError> {
        let flat: Vec<f32> = rows.iter().flatten().map(|&x| x as f32).collect();
        let n = rows.len() as i64;

        let input = Tensor::from_slice(&flat)
            .reshape([n, N_FEATURES as i64])
            .to_device(self.device);

        let out = self.model.forward_ts(&[input])?.reshape([-1]);
        let got = out.size()[0] as usize;
        if got != rows.len() {
            return Err(ModelError::OutputCount {
                got,
                expected: rows.len(),
            });
        }

        Ok((0..n).map(|i| out.double_value(&[i])).collect())
    }
}

impl HasFeatureImportance for TorchModel {
    fn feature_importances(&self) -> Option<&[f64]> {
        self.importances.as_deref()
    }
}
