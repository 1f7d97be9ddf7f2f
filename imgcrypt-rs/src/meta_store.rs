// Copyright (c) 2026 The imgcrypt-rs Authors
//
// SPDX-License-Identifier: Apache-2.0
//

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use anyhow::anyhow;
use async_trait::async_trait;
use oci_client::manifest::OciDescriptor;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

pub const METAFILE: &str = "meta_store.json";

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("image {0} not found")]
    NotFound(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

/// An image record: a name and the descriptor of its root manifest or index.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Image {
    pub name: String,

    pub target: OciDescriptor,

    #[serde(default)]
    pub labels: HashMap<String, String>,
}

/// Lookup of images by reference.
#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn get(&self, name: &str) -> StoreResult<Image>;
}

/// Image metadata database, persisted as JSON.
#[derive(Default, Debug)]
pub struct MetaStore {
    // image_db holds map of image reference with image record.
    image_db: RwLock<HashMap<String, Image>>,
}

#[derive(Serialize, Deserialize)]
struct MetaStoreFile {
    image_db: HashMap<String, Image>,
}

impl TryFrom<&Path> for MetaStore {
    /// load `MetaStore` from a local file
    type Error = anyhow::Error;
    fn try_from(path: &Path) -> Result<Self, Self::Error> {
        let file = File::open(path).map_err(|e| anyhow!("failed to open metastore file {e}"))?;
        let content: MetaStoreFile = serde_json::from_reader(file)
            .map_err(|e| anyhow!("failed to parse metastore file {e}"))?;
        Ok(Self {
            image_db: RwLock::new(content.image_db),
        })
    }
}

impl MetaStore {
    pub async fn write_to_file(&self, path: &Path) -> anyhow::Result<()> {
        let content = MetaStoreFile {
            image_db: self.image_db.read().await.clone(),
        };
        let file =
            File::create(path).map_err(|e| anyhow!("failed to create metastore file: {e}"))?;
        serde_json::to_writer(file, &content)
            .map_err(|e| anyhow!("failed to write metastore to file: {e}"))
    }

    /// Insert or replace the image record under its name.
    pub async fn put(&self, image: Image) {
        self.image_db.write().await.insert(image.name.clone(), image);
    }

    pub async fn delete(&self, name: &str) -> Option<Image> {
        self.image_db.write().await.remove(name)
    }
}

#[async_trait]
impl ImageStore for MetaStore {
    async fn get(&self, name: &str) -> StoreResult<Image> {
        self.image_db
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }
}
