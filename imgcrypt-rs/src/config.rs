// Copyright (c) 2026 The imgcrypt-rs Authors
//
// SPDX-License-Identifier: Apache-2.0
//

use std::{env, path::Path};

use config::{Config, File};
use log::{debug, info};
use serde::Deserialize;

use crate::crypto_config::DecryptConfig;
use crate::images::{PlatformMatcher, PlatformSpec};
use crate::payload::{ProcessorRegistry, PAYLOAD_TOOL_IDS};
use crate::{Error, Result};

/// Env var naming the configuration file when no path is given.
pub const IMGCRYPT_CONFIG_PATH_ENV: &str = "IMGCRYPT_CONFIG_PATH";

/// `imgcrypt-rs` configuration information.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ImgcryptConfig {
    /// Layer processors every decryption payload is attached to.
    ///
    /// This defaults to the built-in tar and tar+gzip decoders.
    #[serde(default = "default_processor_ids")]
    pub processor_ids: Vec<String>,

    /// Platforms (`os/arch[/variant]`) whose manifests are checked when an
    /// image is a multi-platform index. Empty means the local platform.
    #[serde(default)]
    pub platforms: Vec<String>,

    /// Check the manifests of all platforms, ignoring `platforms`.
    #[serde(default)]
    pub all_platforms: bool,

    /// Key specs, `provider:<name>[:<key id>]`, the decrypt config is
    /// built from.
    #[serde(default)]
    pub decrypt_keys: Vec<String>,
}

fn default_processor_ids() -> Vec<String> {
    PAYLOAD_TOOL_IDS.iter().map(|id| id.to_string()).collect()
}

impl Default for ImgcryptConfig {
    fn default() -> Self {
        Self {
            processor_ids: default_processor_ids(),
            platforms: Vec::new(),
            all_platforms: false,
            decrypt_keys: Vec::new(),
        }
    }
}

impl ImgcryptConfig {
    /// Load the configuration from `config_path`, or from the file named by
    /// [`IMGCRYPT_CONFIG_PATH_ENV`], or fall back to defaults.
    pub fn new(config_path: Option<String>) -> Result<Self> {
        let config_path = config_path.or_else(|| {
            if let Ok(env_path) = env::var(IMGCRYPT_CONFIG_PATH_ENV) {
                debug!("Read imgcrypt config path from env: {env_path}");
                return Some(env_path);
            }
            None
        });

        let config = match config_path {
            Some(path) => {
                info!("Use configuration file {path}");
                if !Path::new(&path).exists() {
                    return Err(Error::Config(format!("config file {path} not found")));
                }

                Self::from_file(&path)?
            }
            None => {
                info!("No config path specified, use a default config.");
                Self::default()
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Supported formats are all formats supported by the `config` crate.
    fn from_file(config_path: &str) -> Result<Self> {
        let c = Config::builder()
            .set_default("all_platforms", false)
            .and_then(|b| b.add_source(File::with_name(config_path)).build())
            .map_err(|e| Error::Config(e.to_string()))?;

        c.try_deserialize()
            .map_err(|e| Error::Config(format!("invalid config: {e}")))
    }

    pub fn validate(&self) -> Result<()> {
        if self.processor_ids.is_empty() {
            return Err(Error::Config("no layer processor ids".into()));
        }
        if self.processor_ids.iter().any(String::is_empty) {
            return Err(Error::Config("empty layer processor id".into()));
        }

        self.platform_matcher()?;
        self.decrypt_config()?;
        Ok(())
    }

    pub fn processor_registry(&self) -> ProcessorRegistry {
        ProcessorRegistry::new(self.processor_ids.iter().cloned())
    }

    pub fn platform_matcher(&self) -> Result<PlatformMatcher> {
        if self.all_platforms {
            return Ok(PlatformMatcher::all());
        }
        if self.platforms.is_empty() {
            return Ok(PlatformMatcher::local());
        }

        let specs = self
            .platforms
            .iter()
            .map(|p| p.parse::<PlatformSpec>())
            .collect::<Result<Vec<_>>>()?;
        Ok(PlatformMatcher::only(specs))
    }

    pub fn decrypt_config(&self) -> Result<DecryptConfig> {
        DecryptConfig::from_key_specs(&self.decrypt_keys)
    }
}
