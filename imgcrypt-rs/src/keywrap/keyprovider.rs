// Copyright (c) 2026 The imgcrypt-rs Authors
//
// SPDX-License-Identifier: Apache-2.0
//

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use super::KeyWrapper;
use crate::crypto_config::DecryptConfig;

/// The wrapped key a key provider leaves on a layer.
#[derive(Serialize, Deserialize, Eq, PartialEq, Debug, Clone)]
pub struct AnnotationPacket {
    /// Key ID to manage multiple keys.
    pub kid: String,

    /// Encrypted key to unwrap (base64-encoded).
    pub wrapped_data: String,

    /// Initialisation vector (base64-encoded).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iv: Option<String>,

    /// Wrap type to specify encryption algorithm and mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wrap_type: Option<String>,
}

/// Key wrapper for the `provider.<name>` scheme. A packet is usable when
/// the decrypt config lists its `kid` under the provider name.
#[derive(Clone, Debug)]
pub struct KeyProviderKeyWrapper {
    provider: String,
}

impl KeyProviderKeyWrapper {
    pub fn new(provider: &str) -> Self {
        Self {
            provider: provider.to_string(),
        }
    }
}

impl KeyWrapper for KeyProviderKeyWrapper {
    fn annotation_id(&self) -> String {
        format!("provider.{}", self.provider)
    }

    fn can_unwrap(&self, dc: &DecryptConfig, packets: &[Vec<u8>]) -> Result<bool> {
        let mut errors = Vec::new();
        for (i, packet) in packets.iter().enumerate() {
            let packet: AnnotationPacket = match serde_json::from_slice(packet) {
                Ok(packet) => packet,
                Err(e) => {
                    errors.push(format!("packet {i}: {e}"));
                    continue;
                }
            };
            if dc
                .key_ids(&self.provider)
                .any(|kid| kid == packet.kid.as_bytes())
            {
                return Ok(true);
            }
        }

        if !errors.is_empty() {
            bail!("malformed annotation packet: {}", errors.join("; "));
        }
        Ok(false)
    }
}
