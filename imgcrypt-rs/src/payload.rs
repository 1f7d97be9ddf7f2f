// Copyright (c) 2026 The imgcrypt-rs Authors
//
// SPDX-License-Identifier: Apache-2.0
//

use oci_client::manifest::OciDescriptor;
use serde::{Deserialize, Serialize};

use crate::crypto_config::DecryptConfig;
use crate::typeurl::TypeUrl;

/// Type url of [`Payload`] inside an [`Any`](crate::typeurl::Any).
pub const PAYLOAD_URI: &str = "io.containerd.ocicrypt.v1.Payload";

/// Processor id of the decoder for plain tar layers.
pub const DECODER_TAR_ID: &str = "io.containerd.ocicrypt.decoder.v1.tar";

/// Processor id of the decoder for gzip compressed tar layers.
pub const DECODER_TAR_GZIP_ID: &str = "io.containerd.ocicrypt.decoder.v1.tar.gzip";

/// Processor ids every build knows about.
pub const PAYLOAD_TOOL_IDS: [&str; 2] = [DECODER_TAR_ID, DECODER_TAR_GZIP_ID];

/// What a layer processor needs to decrypt one layer.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Payload {
    pub decrypt_config: DecryptConfig,

    /// The layer being applied. Always overwritten before the payload
    /// is encoded.
    pub descriptor: OciDescriptor,
}

impl Payload {
    pub fn new(decrypt_config: DecryptConfig) -> Self {
        Self {
            decrypt_config,
            descriptor: OciDescriptor::default(),
        }
    }
}

impl TypeUrl for Payload {
    const TYPE_URL: &'static str = PAYLOAD_URI;
}

/// The set of layer processor identities a payload is broadcast to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessorRegistry {
    ids: Vec<String>,
}

impl Default for ProcessorRegistry {
    fn default() -> Self {
        Self::new(PAYLOAD_TOOL_IDS)
    }
}

impl ProcessorRegistry {
    /// Duplicates are dropped, first occurrence wins.
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut registry = Self { ids: Vec::new() };
        for id in ids {
            registry.register(id);
        }
        registry
    }

    pub fn register(&mut self, id: impl Into<String>) {
        let id = id.into();
        if !self.contains(&id) {
            self.ids.push(id);
        }
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|known| known == id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_has_builtin_decoders() {
        let registry = ProcessorRegistry::default();
        assert_eq!(registry.len(), 2);
        assert!(registry.contains(DECODER_TAR_ID));
        assert!(registry.contains(DECODER_TAR_GZIP_ID));
    }

    #[test]
    fn registry_drops_duplicates() {
        let mut registry = ProcessorRegistry::new(["p1", "p2", "p1"]);
        registry.register("p2");
        registry.register("p3");

        let ids: Vec<&str> = registry.ids().collect();
        assert_eq!(ids, ["p1", "p2", "p3"]);
    }
}
