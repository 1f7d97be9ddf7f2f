// Copyright (c) 2026 The imgcrypt-rs Authors
//
// SPDX-License-Identifier: Apache-2.0
//

//! The seam to the layer decryption library. Only the question "can
//! this config unwrap this layer's key" is asked here; no key material
//! is unwrapped.

use std::collections::HashMap;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use log::debug;
use oci_client::manifest::OciDescriptor;

use crate::crypto_config::DecryptConfig;

pub mod keyprovider;

/// Prefix of the layer annotations carrying wrapped keys, followed by
/// the wrapping scheme, e.g. `org.opencontainers.image.enc.keys.provider.kbs`.
pub const ENC_KEYS_ANNOTATION_PREFIX: &str = "org.opencontainers.image.enc.keys.";

/// Decides whether a decrypt config may decrypt a layer.
#[async_trait]
pub trait LayerAuthorizer: Send + Sync {
    /// `Ok(false)` means no usable key, `Err` means the check itself failed.
    async fn check_layer_authorized(&self, dc: &DecryptConfig, layer: &OciDescriptor)
        -> Result<bool>;
}

/// One key wrapping scheme.
pub trait KeyWrapper: Send + Sync {
    /// The scheme part of the annotation, e.g. `provider.kbs`.
    fn annotation_id(&self) -> String;

    /// Whether `dc` holds a key able to unwrap any of `packets`.
    fn can_unwrap(&self, dc: &DecryptConfig, packets: &[Vec<u8>]) -> Result<bool>;
}

/// Authorizes a layer when any registered key wrapper finds a usable key
/// among the wrapped keys annotated on it.
#[derive(Default)]
pub struct KeyWrapperAuthorizer {
    wrappers: HashMap<String, Box<dyn KeyWrapper>>,
}

impl KeyWrapperAuthorizer {
    /// A later wrapper with the same annotation id replaces an earlier one.
    pub fn register(&mut self, wrapper: Box<dyn KeyWrapper>) {
        self.wrappers.insert(wrapper.annotation_id(), wrapper);
    }

    pub fn with_wrapper(mut self, wrapper: Box<dyn KeyWrapper>) -> Self {
        self.register(wrapper);
        self
    }

    /// One key provider wrapper for each provider named in `dc`.
    pub fn for_decrypt_config(dc: &DecryptConfig) -> Self {
        let mut authorizer = Self::default();
        for provider in dc.param.keys() {
            authorizer.register(Box::new(keyprovider::KeyProviderKeyWrapper::new(provider)));
        }
        authorizer
    }
}

/// Split an annotation value into its wrapped keys, comma separated base64.
pub fn decode_packets(value: &str) -> Result<Vec<Vec<u8>>> {
    match decode_packets_lossy(value) {
        (_, Some(e)) => Err(e),
        (packets, None) => Ok(packets),
    }
}

/// Like [`decode_packets`], but keeps every packet that decodes and
/// reports the ones that do not.
fn decode_packets_lossy(value: &str) -> (Vec<Vec<u8>>, Option<anyhow::Error>) {
    let mut packets = Vec::new();
    let mut failed = Vec::new();
    for (i, s) in value.split(',').filter(|s| !s.is_empty()).enumerate() {
        match STANDARD.decode(s) {
            Ok(packet) => packets.push(packet),
            Err(e) => failed.push(format!("packet {i}: {e}")),
        }
    }

    let error = (!failed.is_empty())
        .then(|| anyhow!("decode wrapped key: {}", failed.join("; ")));
    (packets, error)
}

#[async_trait]
impl LayerAuthorizer for KeyWrapperAuthorizer {
    async fn check_layer_authorized(
        &self,
        dc: &DecryptConfig,
        layer: &OciDescriptor,
    ) -> Result<bool> {
        let Some(annotations) = layer.annotations.as_ref() else {
            debug!("layer {} carries no annotations", layer.digest);
            return Ok(false);
        };

        let mut errors = Vec::new();
        for (key, value) in annotations.iter() {
            let Some(scheme) = key.strip_prefix(ENC_KEYS_ANNOTATION_PREFIX) else {
                continue;
            };
            let Some(wrapper) = self.wrappers.get(scheme) else {
                debug!("no key wrapper for scheme {scheme} on layer {}", layer.digest);
                continue;
            };

            // A broken packet in one entry must not hide a usable key in another.
            let (packets, decode_error) = decode_packets_lossy(value);
            if let Some(e) = decode_error {
                errors.push(format!("{key}: {e:#}"));
            }
            if packets.is_empty() {
                continue;
            }
            match wrapper.can_unwrap(dc, &packets) {
                Ok(true) => {
                    debug!("layer {} is unwrappable via {scheme}", layer.digest);
                    return Ok(true);
                }
                Ok(false) => {}
                Err(e) => errors.push(format!("{key}: {e:#}")),
            }
        }

        if !errors.is_empty() {
            bail!(
                "no usable key for layer {}: {}",
                layer.digest,
                errors.join("; ")
            );
        }
        Ok(false)
    }
}
