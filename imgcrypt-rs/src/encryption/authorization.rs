// Copyright (c) 2026 The imgcrypt-rs Authors
//
// SPDX-License-Identifier: Apache-2.0
//

use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info, warn};
use oci_client::manifest::OciDescriptor;

use crate::container::{Client, Container, NewContainerOpt};
use crate::content::ContentStore;
use crate::crypto_config::DecryptConfig;
use crate::images::{get_image_layer_descriptors, is_encrypted, PlatformMatcher};
use crate::keywrap::{KeyWrapperAuthorizer, LayerAuthorizer};
use crate::{Error, Result};

/// Verify that `dc` holds a usable key for every encrypted layer reachable
/// from `target`. Images without encrypted layers always pass.
pub async fn check_authorization(
    cs: &dyn ContentStore,
    target: &OciDescriptor,
    dc: &DecryptConfig,
    authorizer: &dyn LayerAuthorizer,
    matcher: &PlatformMatcher,
) -> Result<()> {
    let layers = get_image_layer_descriptors(cs, target, matcher).await?;

    let mut encrypted = 0;
    for layer in layers.iter().filter(|layer| is_encrypted(layer)) {
        encrypted += 1;
        let authorized = authorizer
            .check_layer_authorized(dc, layer)
            .await
            .map_err(|source| Error::AuthorizationCheck {
                digest: layer.digest.clone(),
                source,
            })?;

        if !authorized {
            warn!("no usable key for encrypted layer {}", layer.digest);
            return Err(Error::Unauthorized {
                digest: layer.digest.clone(),
            });
        }
    }

    debug!(
        "image {} authorized, {encrypted} of {} layers encrypted",
        target.digest,
        layers.len()
    );
    Ok(())
}

/// Creation hook denying containers whose image the caller cannot decrypt.
pub struct AuthorizationCheck {
    dc: DecryptConfig,
    authorizer: Arc<dyn LayerAuthorizer>,
    matcher: PlatformMatcher,
}

/// Check the authorization of the keys in `dc` upon creation of a container.
pub fn with_authorization_check(dc: DecryptConfig) -> AuthorizationCheck {
    let authorizer = Arc::new(KeyWrapperAuthorizer::for_decrypt_config(&dc));
    AuthorizationCheck {
        dc,
        authorizer,
        matcher: PlatformMatcher::default(),
    }
}

impl AuthorizationCheck {
    pub fn with_authorizer(mut self, authorizer: Arc<dyn LayerAuthorizer>) -> Self {
        self.authorizer = authorizer;
        self
    }

    pub fn with_platforms(mut self, matcher: PlatformMatcher) -> Self {
        self.matcher = matcher;
        self
    }
}

#[async_trait]
impl NewContainerOpt for AuthorizationCheck {
    async fn apply(&self, client: &Client, container: &mut Container) -> Result<()> {
        let image = match client.image_service().get(&container.image).await {
            Ok(image) => image,
            Err(e) if e.is_not_found() => {
                // allow creation of container without an existing image
                info!(
                    "image {} of container {} not found, skip authorization check",
                    container.image, container.id
                );
                return Ok(());
            }
            Err(source) => {
                return Err(Error::Lookup {
                    name: container.image.clone(),
                    source,
                })
            }
        };

        check_authorization(
            client.content_store(),
            &image.target,
            &self.dc,
            self.authorizer.as_ref(),
            &self.matcher,
        )
        .await
    }
}
