// Copyright (c) 2026 The imgcrypt-rs Authors
//
// SPDX-License-Identifier: Apache-2.0
//

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::content::ContentStore;
use crate::meta_store::ImageStore;
use crate::Result;

/// A container about to be created.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Container {
    pub id: String,

    /// Reference of the image the container is declared against.
    pub image: String,

    pub labels: HashMap<String, String>,
}

impl Container {
    pub fn new(id: &str, image: &str) -> Self {
        Self {
            id: id.to_string(),
            image: image.to_string(),
            labels: HashMap::new(),
        }
    }
}

/// The stores creation hooks may consult.
#[derive(Clone)]
pub struct Client {
    images: Arc<dyn ImageStore>,
    content: Arc<dyn ContentStore>,
}

impl Client {
    pub fn new(images: Arc<dyn ImageStore>, content: Arc<dyn ContentStore>) -> Self {
        Self { images, content }
    }

    pub fn image_service(&self) -> &dyn ImageStore {
        self.images.as_ref()
    }

    pub fn content_store(&self) -> &dyn ContentStore {
        self.content.as_ref()
    }
}

/// A hook run once per container at creation time.
#[async_trait]
pub trait NewContainerOpt: Send + Sync {
    async fn apply(&self, client: &Client, container: &mut Container) -> Result<()>;
}

/// Creation hooks, run in order.
#[derive(Clone, Default)]
pub struct NewContainerOpts {
    opts: Vec<Arc<dyn NewContainerOpt>>,
}

impl NewContainerOpts {
    pub fn push(&mut self, opt: Arc<dyn NewContainerOpt>) {
        self.opts.push(opt);
    }

    pub fn len(&self) -> usize {
        self.opts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.opts.is_empty()
    }

    /// Stops at the first hook that fails; creation must then be aborted.
    pub async fn apply_all(&self, client: &Client, container: &mut Container) -> Result<()> {
        for opt in &self.opts {
            opt.apply(client, container).await?;
        }

        Ok(())
    }
}
