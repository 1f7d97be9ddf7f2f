// Copyright (c) 2026 The imgcrypt-rs Authors
//
// SPDX-License-Identifier: Apache-2.0
//

//! Typed envelopes used to hand a payload across a component boundary
//! without the receiver knowing its concrete type up front.

use anyhow::{bail, Context, Result};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::payload::Payload;

/// A serialized value tagged with the url of its type.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Any {
    pub type_url: String,

    pub value: Vec<u8>,
}

/// Types that can travel inside an [`Any`].
pub trait TypeUrl {
    const TYPE_URL: &'static str;
}

pub fn marshal_any<T: Serialize + TypeUrl>(value: &T) -> Result<Any> {
    let value = serde_json::to_vec(value).context("serialize value")?;
    Ok(Any {
        type_url: T::TYPE_URL.to_string(),
        value,
    })
}

pub fn unmarshal_any<T: DeserializeOwned + TypeUrl>(any: &Any) -> Result<T> {
    if any.type_url != T::TYPE_URL {
        bail!(
            "type url mismatch: expected {}, got {}",
            T::TYPE_URL,
            any.type_url
        );
    }

    serde_json::from_slice(&any.value).context("deserialize value")
}

/// Encoding of decryption payloads into envelopes.
pub trait PayloadCodec: Send + Sync {
    fn encode(&self, payload: &Payload) -> Result<Any>;

    fn decode(&self, any: &Any) -> Result<Payload>;
}

/// The default codec, JSON inside a typed envelope.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonCodec;

impl PayloadCodec for JsonCodec {
    fn encode(&self, payload: &Payload) -> Result<Any> {
        marshal_any(payload)
    }

    fn decode(&self, any: &Any) -> Result<Payload> {
        unmarshal_any(any)
    }
}
