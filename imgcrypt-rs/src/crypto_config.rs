// Copyright (c) 2026 The imgcrypt-rs Authors
//
// SPDX-License-Identifier: Apache-2.0
//

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

const KEY_SPEC_PROVIDER_PREFIX: &str = "provider:";

/// Decryption parameters supplied by the caller.
///
/// `param` maps a key wrapper (for key providers, the provider name) to
/// the values the caller holds for it. For key providers these are the
/// key ids the caller can unwrap with.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecryptConfig {
    pub param: HashMap<String, Vec<Vec<u8>>>,
}

impl DecryptConfig {
    /// Build a config from key specs of the form `provider:<name>` or
    /// `provider:<name>:<key id>`. Everything after the second colon is
    /// the key id, so ids may contain colons themselves.
    pub fn from_key_specs(specs: &[String]) -> Result<Self> {
        let mut dc = Self::default();
        for spec in specs {
            let rest = spec
                .strip_prefix(KEY_SPEC_PROVIDER_PREFIX)
                .ok_or_else(|| Error::IllegalKeySpec(spec.clone()))?;
            let (name, kid) = match rest.split_once(':') {
                Some((name, kid)) => (name, Some(kid)),
                None => (rest, None),
            };
            if name.is_empty() || kid.is_some_and(str::is_empty) {
                return Err(Error::IllegalKeySpec(spec.clone()));
            }

            let entry = dc.param.entry(name.to_string()).or_default();
            if let Some(kid) = kid {
                entry.push(kid.as_bytes().to_vec());
            }
        }

        Ok(dc)
    }

    /// Add one key id for `provider`.
    pub fn with_key_id(mut self, provider: &str, kid: &str) -> Self {
        self.param
            .entry(provider.to_string())
            .or_default()
            .push(kid.as_bytes().to_vec());
        self
    }

    pub fn key_ids(&self, provider: &str) -> impl Iterator<Item = &[u8]> {
        self.param
            .get(provider)
            .into_iter()
            .flat_map(|ids| ids.iter().map(Vec::as_slice))
    }

    pub fn is_empty(&self) -> bool {
        self.param.values().all(Vec::is_empty)
    }
}
