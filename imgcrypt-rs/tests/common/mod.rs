// Copyright (c) 2026 The imgcrypt-rs Authors
//
// SPDX-License-Identifier: Apache-2.0
//

#![allow(dead_code)]

use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine};
use imgcrypt_rs::container::Client;
use imgcrypt_rs::content::LocalContentStore;
use imgcrypt_rs::images::{MEDIA_TYPE_OCI_INDEX, MEDIA_TYPE_OCI_MANIFEST};
use imgcrypt_rs::keywrap::keyprovider::AnnotationPacket;
use imgcrypt_rs::keywrap::ENC_KEYS_ANNOTATION_PREFIX;
use imgcrypt_rs::meta_store::{Image, MetaStore};
use oci_client::manifest::OciDescriptor;
use serde_json::json;
use tempfile::TempDir;

pub const MEDIA_TYPE_LAYER_GZIP: &str = "application/vnd.oci.image.layer.v1.tar+gzip";
pub const MEDIA_TYPE_LAYER_GZIP_ENC: &str = "application/vnd.oci.image.layer.v1.tar+gzip+encrypted";
pub const MEDIA_TYPE_CONFIG: &str = "application/vnd.oci.image.config.v1+json";

/// Key provider used by the test images.
pub const PROVIDER: &str = "kbs";

/// A layer to put into a test image.
pub enum TestLayer {
    Plain(&'static str),
    /// Content and the key ids its key is wrapped for.
    Encrypted(&'static str, Vec<&'static str>),
}

/// Stores backed by a temporary directory.
pub struct TestEnv {
    _tempdir: TempDir,
    pub content: Arc<LocalContentStore>,
    pub images: Arc<MetaStore>,
}

impl TestEnv {
    pub fn new() -> Self {
        let tempdir = tempfile::tempdir().unwrap();
        let content = Arc::new(LocalContentStore::new(tempdir.path().to_path_buf()));
        Self {
            _tempdir: tempdir,
            content,
            images: Arc::new(MetaStore::default()),
        }
    }

    pub fn client(&self) -> Client {
        Client::new(self.images.clone(), self.content.clone())
    }

    async fn write_layer(&self, layer: &TestLayer) -> OciDescriptor {
        match layer {
            TestLayer::Plain(data) => self
                .content
                .write_blob(MEDIA_TYPE_LAYER_GZIP, data.as_bytes())
                .await
                .unwrap(),
            TestLayer::Encrypted(data, kids) => {
                let mut desc = self
                    .content
                    .write_blob(MEDIA_TYPE_LAYER_GZIP_ENC, data.as_bytes())
                    .await
                    .unwrap();
                let packets: Vec<String> = kids
                    .iter()
                    .map(|kid| {
                        let packet = AnnotationPacket {
                            kid: kid.to_string(),
                            wrapped_data: STANDARD.encode(format!("lek-for-{kid}")),
                            iv: Some(STANDARD.encode("iv")),
                            wrap_type: Some("A256GCM".into()),
                        };
                        STANDARD.encode(serde_json::to_vec(&packet).unwrap())
                    })
                    .collect();
                desc.annotations = Some(
                    [(
                        format!("{ENC_KEYS_ANNOTATION_PREFIX}provider.{PROVIDER}"),
                        packets.join(","),
                    )]
                    .into_iter()
                    .collect(),
                );
                desc
            }
        }
    }

    /// Write the layers and a manifest, return the manifest descriptor and
    /// the layer descriptors.
    pub async fn write_manifest(&self, layers: &[TestLayer]) -> (OciDescriptor, Vec<OciDescriptor>) {
        let config = self
            .content
            .write_blob(MEDIA_TYPE_CONFIG, b"{}")
            .await
            .unwrap();

        let mut descs = Vec::new();
        for layer in layers {
            descs.push(self.write_layer(layer).await);
        }

        let manifest = json!({
            "schemaVersion": 2,
            "mediaType": MEDIA_TYPE_OCI_MANIFEST,
            "config": config,
            "layers": descs,
        });
        let desc = self
            .content
            .write_blob(
                MEDIA_TYPE_OCI_MANIFEST,
                &serde_json::to_vec(&manifest).unwrap(),
            )
            .await
            .unwrap();

        (desc, descs)
    }

    /// Write an index over `manifests`, each paired with its `os/arch`.
    pub async fn write_index(&self, manifests: &[(&str, &str, OciDescriptor)]) -> OciDescriptor {
        let entries: Vec<_> = manifests
            .iter()
            .map(|(os, arch, desc)| {
                json!({
                    "mediaType": desc.media_type,
                    "digest": desc.digest,
                    "size": desc.size,
                    "platform": { "os": os, "architecture": arch },
                })
            })
            .collect();
        let index = json!({
            "schemaVersion": 2,
            "mediaType": MEDIA_TYPE_OCI_INDEX,
            "manifests": entries,
        });

        self.content
            .write_blob(MEDIA_TYPE_OCI_INDEX, &serde_json::to_vec(&index).unwrap())
            .await
            .unwrap()
    }

    /// Register `target` as image `name`.
    pub async fn add_image(&self, name: &str, target: OciDescriptor) {
        self.images
            .put(Image {
                name: name.to_string(),
                target,
                labels: Default::default(),
            })
            .await;
    }
}
