use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::data::loader::{default_candidates, DataSource};

pub const ALLOW_IMAGES_VAR: &str = "ALLOW_IMAGES";
pub const SECRETS_PATH_VAR: &str = "CIRCLE_DAMAGE_SECRETS";
pub const DATA_DIR_VAR: &str = "CIRCLE_DAMAGE_DATA_DIR";

const DEFAULT_SECRETS_PATH: &str = "secrets.json";
const DEFAULT_DATA_DIR: &str = "data";

/// Runtime settings resolved once at start-up.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Directory holding `damage_data.parquet` / `damage_data.csv`.
    pub data_dir: PathBuf,
    /// Whether the UI may offer to display room images.
    pub allow_images: bool,
}

/// The JSON secrets file: `{ "ALLOW_IMAGES": "true" }`.
#[derive(Debug, Default, Deserialize)]
struct Secrets {
    #[serde(rename = "ALLOW_IMAGES")]
    allow_images: Option<JsonValue>,
}

impl AppConfig {
    /// Resolve from the secrets file and the process environment.
    pub fn from_env() -> Self {
        let secrets_path = std::env::var(SECRETS_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_SECRETS_PATH));
        let data_dir = std::env::var(DATA_DIR_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_DIR));

        let secret = read_secrets(&secrets_path).allow_images;
        let env = std::env::var(ALLOW_IMAGES_VAR).ok();
        let allow_images = resolve_allow_images(secret.as_ref(), env.as_deref());

        log::info!(
            "Config: data_dir={}, allow_images={allow_images}",
            data_dir.display()
        );
        AppConfig {
            data_dir,
            allow_images,
        }
    }

    pub fn data_candidates(&self) -> Vec<PathBuf> {
        default_candidates(&self.data_dir)
    }

    pub fn data_source(&self) -> DataSource {
        DataSource::new(self.data_candidates())
    }
}

/// The secrets file is optional; a broken one is ignored with a warning.
fn read_secrets(path: &Path) -> Secrets {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            log::debug!("No secrets file at {}: {e}", path.display());
            return Secrets::default();
        }
    };
    serde_json::from_str(&text).unwrap_or_else(|e| {
        log::warn!("Ignoring unreadable secrets file {}: {e}", path.display());
        Secrets::default()
    })
}

/// The secret wins over the environment; the flag is on only for a
/// case-insensitive `"true"`.
pub fn resolve_allow_images(secret: Option<&JsonValue>, env: Option<&str>) -> bool {
    let raw = match secret {
        Some(JsonValue::String(s)) => s.clone(),
        Some(JsonValue::Null) | None => env.unwrap_or("false").to_string(),
        Some(other) => other.to_string(),
    };
    raw.to_lowercase() == "true"
}
