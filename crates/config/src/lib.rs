//! Configuration for vitrine.
//!
//! Sources are layered with [`figment`], later sources overriding earlier ones:
//!
//! 1. Built-in defaults.
//! 2. A config file: the path given on the command line, or `vitrine.toml` in
//!    the platform config directory if it exists. TOML, YAML and JSON are
//!    chosen by file extension.
//! 3. Environment variables prefixed with `VITRINE_`, nested with `__`
//!    (`VITRINE_STORAGE__BUCKET=portfolio`).

pub mod error;
mod storage;

pub use crate::storage::{LocalConfig, S3Config, Secret, StorageConfig};

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Toml, Yaml};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use vitrine_assets::SlotMap;
use vitrine_page::Profile;
use vitrine_storage::{validate_name, validate_namespace};

const ENV_PREFIX: &str = "VITRINE_";
const CONFIG_FILENAME: &str = "vitrine.toml";

fn default_namespace() -> String {
    "files".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    /// Object storage namespace the media is listed from.
    #[serde(default = "default_namespace")]
    pub namespace: String,
    pub storage: StorageConfig,
    /// Target filename → slot id.
    #[serde(default)]
    pub slots: BTreeMap<String, String>,
    #[serde(default)]
    pub page: PageConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PageConfig {
    #[serde(flatten)]
    pub profile: Profile,
    /// User template replacing the builtin one.
    #[serde(default)]
    pub template: Option<PathBuf>,
}

impl Config {
    /// Load and validate configuration from every source.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::from_figment(Self::figment(path)?)
    }

    /// The layered sources, before extraction.
    pub fn figment(path: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::new();
        match path {
            Some(path) => {
                if !path.is_file() {
                    exn::bail!(ErrorKind::NotFound(path.display().to_string()));
                }
                figment = merge_file(figment, path)?;
            },
            None => match default_path() {
                Some(path) if path.is_file() => figment = merge_file(figment, &path)?,
                Some(path) => tracing::debug!(path = %path.display(), "No config file at default location"),
                None => tracing::debug!("No home directory; skipping default config file"),
            },
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let mut config: Self = figment.extract().or_raise(|| ErrorKind::Load)?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints, normalizing the namespace.
    pub fn validate(&mut self) -> Result<()> {
        self.namespace = validate_namespace(&self.namespace)
            .or_raise(|| ErrorKind::Invalid(format!("namespace {:?}", self.namespace)))?;
        self.storage.validate()?;
        for filename in self.slots.keys() {
            validate_name(filename).or_raise(|| ErrorKind::Invalid(format!("slot filename {filename:?}")))?;
        }
        let slots = self.slot_map()?;
        for demo in &self.page.profile.demos {
            if slots.target_of(&demo.slot).is_none() {
                exn::bail!(ErrorKind::Invalid(format!("demo {:?} refers to unknown slot {:?}", demo.title, demo.slot)));
            }
        }
        Ok(())
    }

    /// The configured slots as a [`SlotMap`].
    pub fn slot_map(&self) -> Result<SlotMap> {
        SlotMap::new(self.slots.iter().map(|(filename, id)| (filename.as_str(), id.as_str())))
            .or_raise(|| ErrorKind::Invalid("slots".into()))
    }
}

/// `vitrine.toml` in the platform's config directory.
pub fn default_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "vitrine").map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
}

fn merge_file(figment: Figment, path: &Path) -> Result<Figment> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or_default().to_ascii_lowercase();
    tracing::debug!(path = %path.display(), "Reading config file");
    Ok(match extension.as_str() {
        "toml" => figment.merge(Toml::file(path)),
        "yaml" | "yml" => figment.merge(Yaml::file(path)),
        "json" => figment.merge(Json::file(path)),
        _ => exn::bail!(ErrorKind::UnsupportedFormat(path.display().to_string())),
    })
}
