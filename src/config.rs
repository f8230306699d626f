use std::{
    fs,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::Deserialize;

use crate::error::ConfigError;

pub const DEFAULT_MODEL_PATH: &str = "models/delivery_model.json";
pub const DEFAULT_PORT: u16 = 8080;

/// Optional JSON file named by `DASHBOARD_CONFIG`; environment variables win.
#[derive(Deserialize, Debug, Default)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    model_path: Option<PathBuf>,
    meta_path: Option<PathBuf>,
    bind_addr: Option<IpAddr>,
    port: Option<u16>,
    log_pred: Option<bool>,
}

impl FileConfig {
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub model_path: PathBuf,
    /// TorchScript sidecar with feature list and importances.
    pub meta_path: Option<PathBuf>,
    pub bind_addr: IpAddr,
    pub port: u16,
    /// Log every encoded row and result at info level.
    pub log_predictions: bool,
}

impl DashboardConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let file = match lookup("DASHBOARD_CONFIG") {
            Some(path) => FileConfig::load(Path::new(&path))?,
            None => FileConfig::default(),
        };

        let model_path = lookup("MODEL_PATH")
            .map(PathBuf::from)
            .or(file.model_path)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH));
        let meta_path = lookup("META_PATH").map(PathBuf::from).or(file.meta_path);

        let bind_addr = match lookup("BIND_ADDR") {
            Some(raw) => parse("BIND_ADDR", raw)?,
            None => file.bind_addr.unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED)),
        };
        let port = match lookup("PORT") {
            Some(raw) => parse("PORT", raw)?,
            None => file.port.unwrap_or(DEFAULT_PORT),
        };
        let log_predictions = match lookup("LOG_PRED") {
            Some(raw) => flag("LOG_PRED", raw)?,
            None => file.log_pred.unwrap_or(false),
        };

        Ok(Self {
            model_path,
            meta_path,
            bind_addr,
            port,
            log_predictions,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}

fn parse<T: FromStr>(key: &'static str, raw: String) -> Result<T, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue { key, value: raw })
}

fn flag(key: &'static str, raw: String) -> Result<bool, ConfigError> {
    match raw.trim() {
        "1" | "true" => Ok(true),
        "" | "0" | "false" => Ok(false),
        _ => Err(ConfigError::InvalidValue { key, value: raw }),
    }
}
