// Copyright (c) 2026 The imgcrypt-rs Authors
//
// SPDX-License-Identifier: Apache-2.0
//

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use log::debug;
use oci_client::manifest::OciDescriptor;
use tokio::fs;

use crate::digest::{parse_digest, DigestAlgorithm};

/// Read access to content addressed blobs.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Read the whole blob `desc` points to.
    async fn read_blob(&self, desc: &OciDescriptor) -> Result<Vec<u8>>;
}

/// A content store laid out like an OCI image layout, blobs live under
/// `<root>/blobs/<algorithm>/<hex>`.
#[derive(Clone, Debug)]
pub struct LocalContentStore {
    root: PathBuf,
}

impl LocalContentStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn blob_path(&self, digest: &str) -> Result<PathBuf> {
        let (algorithm, encoded) = parse_digest(digest)?;
        Ok(self.root.join("blobs").join(algorithm.name()).join(encoded))
    }

    /// Store `data` and return a descriptor of `media_type` for it.
    pub async fn write_blob(&self, media_type: &str, data: &[u8]) -> Result<OciDescriptor> {
        let digest = DigestAlgorithm::Sha256.digest(data);
        let path = self.blob_path(&digest)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .context("create blob directory")?;
        }
        fs::write(&path, data)
            .await
            .with_context(|| format!("write blob {digest}"))?;
        debug!("wrote blob {digest} ({} bytes)", data.len());

        Ok(OciDescriptor {
            media_type: media_type.to_string(),
            digest,
            size: data.len() as i64,
            ..Default::default()
        })
    }
}

#[async_trait]
impl ContentStore for LocalContentStore {
    async fn read_blob(&self, desc: &OciDescriptor) -> Result<Vec<u8>> {
        let path = self.blob_path(&desc.digest)?;
        let data = fs::read(&path)
            .await
            .with_context(|| format!("read blob {}", desc.digest))?;

        if data.len() as i64 != desc.size {
            bail!(
                "size mismatch for {}: expected {}, got {}",
                desc.digest,
                desc.size,
                data.len()
            );
        }

        let (algorithm, _) = parse_digest(&desc.digest)?;
        let actual = algorithm.digest(&data);
        if actual != desc.digest {
            bail!("digest mismatch: expected {}, got {}", desc.digest, actual);
        }

        Ok(data)
    }
}
