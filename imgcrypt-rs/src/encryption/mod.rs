// Copyright (c) 2026 The imgcrypt-rs Authors
//
// SPDX-License-Identifier: Apache-2.0
//

//! Hooks wiring image decryption into container creation and unpack.
//!
//! - [`with_decrypted_unpack`] hands the decrypt config to every layer
//!   processor while a layer is applied.
//! - [`with_authorization_check`] refuses to create a container whose
//!   image has a layer the caller holds no key for.

use std::collections::HashMap;
use std::sync::Arc;

use log::debug;
use oci_client::manifest::OciDescriptor;

use crate::diff::{ApplyConfig, ApplyOpt};
use crate::payload::{Payload, ProcessorRegistry};
use crate::typeurl::{JsonCodec, PayloadCodec};
use crate::{Error, Result};

pub mod authorization;

pub use authorization::{check_authorization, with_authorization_check, AuthorizationCheck};
pub use crate::unpack::{with_unpack_config_apply_opts, with_unpack_opts};

/// Apply option attaching a decryption [`Payload`] to every known layer
/// processor.
pub struct DecryptedUnpack {
    payload: Payload,
    processors: ProcessorRegistry,
    codec: Arc<dyn PayloadCodec>,
}

/// Pass the parameters layer processors need to decrypt to the applier.
pub fn with_decrypted_unpack(payload: Payload) -> DecryptedUnpack {
    DecryptedUnpack {
        payload,
        processors: ProcessorRegistry::default(),
        codec: Arc::new(JsonCodec),
    }
}

impl DecryptedUnpack {
    pub fn with_processors(mut self, processors: ProcessorRegistry) -> Self {
        self.processors = processors;
        self
    }

    pub fn with_codec(mut self, codec: Arc<dyn PayloadCodec>) -> Self {
        self.codec = codec;
        self
    }
}

impl ApplyOpt for DecryptedUnpack {
    fn apply(&self, desc: &OciDescriptor, config: &mut ApplyConfig) -> Result<()> {
        let payload = Payload {
            descriptor: desc.clone(),
            ..self.payload.clone()
        };
        let any = self
            .codec
            .encode(&payload)
            .map(Arc::new)
            .map_err(|source| Error::PayloadEncoding { source })?;

        if self.processors.is_empty() {
            debug!("no layer processors registered, layer {} gets no payload", desc.digest);
            return Ok(());
        }

        let payloads = config
            .processor_payloads
            .get_or_insert_with(|| HashMap::with_capacity(self.processors.len()));
        for id in self.processors.ids() {
            payloads.insert(id.to_string(), any.clone());
        }
        debug!(
            "attached decryption payload of layer {} for {} processors",
            desc.digest,
            self.processors.len()
        );

        Ok(())
    }
}
