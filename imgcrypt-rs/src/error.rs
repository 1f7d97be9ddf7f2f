// Copyright (c) 2026 The imgcrypt-rs Authors
//
// SPDX-License-Identifier: Apache-2.0
//

use thiserror::Error;

use crate::meta_store::StoreError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to look up image {name}")]
    Lookup {
        name: String,
        #[source]
        source: StoreError,
    },

    #[error("failed to marshal payload")]
    PayloadEncoding {
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to unmarshal payload addressed to {processor_id}")]
    PayloadDecoding {
        processor_id: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("you are not authorized to use this image: no usable key for layer {digest}")]
    Unauthorized { digest: String },

    #[error("authorization check of layer {digest} failed")]
    AuthorizationCheck {
        digest: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to read content {digest}")]
    ReadContent {
        digest: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to parse {media_type} {digest}")]
    ParseManifest {
        media_type: String,
        digest: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported media type {0} in image descriptor tree")]
    UnsupportedMediaType(String),

    #[error("illegal platform `{0}`, expected os/arch[/variant]")]
    IllegalPlatform(String),

    #[error("illegal key spec `{0}`, expected provider:<name>[:<key id>]")]
    IllegalKeySpec(String),

    #[error("apply option failed")]
    Apply {
        #[source]
        source: anyhow::Error,
    },

    #[error("unpack option failed")]
    Unpack {
        #[source]
        source: anyhow::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}
