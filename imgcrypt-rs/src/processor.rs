// Copyright (c) 2026 The imgcrypt-rs Authors
//
// SPDX-License-Identifier: Apache-2.0
//

//! The layer processor side: finding the payload addressed to a processor.

use crate::diff::ApplyConfig;
use crate::payload::Payload;
use crate::typeurl::PayloadCodec;
use crate::{Error, Result};

/// Decode the payload addressed to `processor_id`, if any. A processor
/// with nothing addressed to it handles the layer without decryption.
pub fn payload_for(
    config: &ApplyConfig,
    processor_id: &str,
    codec: &dyn PayloadCodec,
) -> Result<Option<Payload>> {
    let Some(any) = config.processor_payload(processor_id) else {
        return Ok(None);
    };

    codec
        .decode(any)
        .map(Some)
        .map_err(|source| Error::PayloadDecoding {
            processor_id: processor_id.to_string(),
            source,
        })
}
