// Copyright (c) 2026 The imgcrypt-rs Authors
//
// SPDX-License-Identifier: Apache-2.0
//

//! # Overall
//! Glue between a container runtime and layer decryption for encrypted
//! OCI images:
//!
//! - decryption payloads are attached to every layer processor while a
//!   layer is applied during unpack;
//! - container creation is refused unless the caller holds a usable key
//!   for every encrypted layer of the image.
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use imgcrypt_rs::container::{Client, Container, NewContainerOpts};
//! use imgcrypt_rs::content::LocalContentStore;
//! use imgcrypt_rs::crypto_config::DecryptConfig;
//! use imgcrypt_rs::encryption::with_authorization_check;
//! use imgcrypt_rs::meta_store::MetaStore;
//!
//! # async fn run() -> imgcrypt_rs::Result<()> {
//! let client = Client::new(
//!     Arc::new(MetaStore::default()),
//!     Arc::new(LocalContentStore::new("/var/lib/imgcrypt".into())),
//! );
//! let dc = DecryptConfig::from_key_specs(&["provider:kbs:k1".to_string()])?;
//!
//! let mut opts = NewContainerOpts::default();
//! opts.push(Arc::new(with_authorization_check(dc)));
//!
//! let mut container = Container::new("c1", "docker.io/library/busybox:encrypted");
//! opts.apply_all(&client, &mut container).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod container;
pub mod content;
pub mod crypto_config;
pub mod diff;
pub mod digest;
pub mod encryption;
pub mod error;
pub mod images;
pub mod keywrap;
pub mod meta_store;
pub mod payload;
pub mod processor;
pub mod typeurl;
pub mod unpack;

pub use error::*;
