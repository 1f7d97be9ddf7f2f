// Copyright (c) 2026 The imgcrypt-rs Authors
//
// SPDX-License-Identifier: Apache-2.0
//

//! Walking the descriptor tree of an image down to its layers.

use std::str::FromStr;

use log::debug;
use oci_client::manifest::{OciDescriptor, OciImageIndex, OciImageManifest, Platform};
use serde::de::DeserializeOwned;

use crate::content::ContentStore;
use crate::{Error, Result};

pub const MEDIA_TYPE_OCI_MANIFEST: &str = "application/vnd.oci.image.manifest.v1+json";
pub const MEDIA_TYPE_OCI_INDEX: &str = "application/vnd.oci.image.index.v1+json";
pub const MEDIA_TYPE_DOCKER_MANIFEST: &str =
    "application/vnd.docker.distribution.manifest.v2+json";
pub const MEDIA_TYPE_DOCKER_MANIFEST_LIST: &str =
    "application/vnd.docker.distribution.manifest.list.v2+json";

const ENCRYPTED_SUFFIX: &str = "+encrypted";

/// Whether `media_type` is one of the encrypted layer media types, e.g.
/// `application/vnd.oci.image.layer.v1.tar+gzip+encrypted`.
pub fn is_encrypted_media_type(media_type: &str) -> bool {
    media_type.ends_with(ENCRYPTED_SUFFIX)
}

pub fn is_encrypted(desc: &OciDescriptor) -> bool {
    is_encrypted_media_type(&desc.media_type)
}

/// Whether `a` and `b` describe the same content the same way: media
/// type, digest, size, urls and annotations all agree.
pub fn same_descriptor(a: &OciDescriptor, b: &OciDescriptor) -> bool {
    a.media_type == b.media_type
        && a.digest == b.digest
        && a.size == b.size
        && a.urls == b.urls
        && a.annotations == b.annotations
}

/// A single `os/arch[/variant]` platform.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlatformSpec {
    pub os: String,
    pub architecture: String,
    pub variant: Option<String>,
}

impl FromStr for PlatformSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split('/').collect();
        if parts.iter().any(|p| p.is_empty()) {
            return Err(Error::IllegalPlatform(s.to_string()));
        }

        match parts[..] {
            [os, architecture] => Ok(Self {
                os: os.to_string(),
                architecture: architecture.to_string(),
                variant: None,
            }),
            [os, architecture, variant] => Ok(Self {
                os: os.to_string(),
                architecture: architecture.to_string(),
                variant: Some(variant.to_string()),
            }),
            _ => Err(Error::IllegalPlatform(s.to_string())),
        }
    }
}

impl PlatformSpec {
    /// The platform this process runs on, in OCI naming.
    pub fn local() -> Self {
        let architecture = match std::env::consts::ARCH {
            "x86_64" => "amd64",
            "x86" => "386",
            "aarch64" => "arm64",
            "powerpc64" => "ppc64le",
            other => other,
        };

        Self {
            os: std::env::consts::OS.to_string(),
            architecture: architecture.to_string(),
            variant: None,
        }
    }

    fn matches(&self, platform: &Platform) -> bool {
        if self.os != platform.os || self.architecture != platform.architecture {
            return false;
        }

        match (&self.variant, &platform.variant) {
            (Some(want), Some(got)) => want == got,
            (Some(_), None) => false,
            (None, _) => true,
        }
    }
}

/// Selects which manifests of an index are walked.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlatformMatcher {
    All,
    Only(Vec<PlatformSpec>),
}

impl Default for PlatformMatcher {
    fn default() -> Self {
        Self::local()
    }
}

impl PlatformMatcher {
    pub fn all() -> Self {
        Self::All
    }

    pub fn only(platforms: Vec<PlatformSpec>) -> Self {
        Self::Only(platforms)
    }

    pub fn local() -> Self {
        Self::Only(vec![PlatformSpec::local()])
    }

    /// Index entries without a platform always match.
    pub fn matches(&self, platform: Option<&Platform>) -> bool {
        match (self, platform) {
            (PlatformMatcher::All, _) | (_, None) => true,
            (PlatformMatcher::Only(specs), Some(platform)) => {
                specs.iter().any(|spec| spec.matches(platform))
            }
        }
    }
}

async fn read_json<T: DeserializeOwned>(cs: &dyn ContentStore, desc: &OciDescriptor) -> Result<T> {
    let blob = cs
        .read_blob(desc)
        .await
        .map_err(|source| Error::ReadContent {
            digest: desc.digest.clone(),
            source,
        })?;

    serde_json::from_slice(&blob).map_err(|source| Error::ParseManifest {
        media_type: desc.media_type.clone(),
        digest: desc.digest.clone(),
        source,
    })
}

/// Collect the layer descriptors reachable from `target`, in manifest
/// order. Indexes are descended into for every manifest `matcher` accepts.
pub async fn get_image_layer_descriptors(
    cs: &dyn ContentStore,
    target: &OciDescriptor,
    matcher: &PlatformMatcher,
) -> Result<Vec<OciDescriptor>> {
    let mut layers = Vec::new();
    let mut pending = vec![target.clone()];

    while let Some(desc) = pending.pop() {
        match desc.media_type.as_str() {
            MEDIA_TYPE_OCI_INDEX | MEDIA_TYPE_DOCKER_MANIFEST_LIST => {
                let index: OciImageIndex = read_json(cs, &desc).await?;
                let children: Vec<OciDescriptor> = index
                    .manifests
                    .into_iter()
                    .filter(|entry| matcher.matches(entry.platform.as_ref()))
                    .map(|entry| OciDescriptor {
                        media_type: entry.media_type,
                        digest: entry.digest,
                        size: entry.size,
                        ..Default::default()
                    })
                    .collect();
                debug!("index {} selects {} manifests", desc.digest, children.len());

                // Popped from the back, so push in reverse to keep order.
                pending.extend(children.into_iter().rev());
            }
            MEDIA_TYPE_OCI_MANIFEST | MEDIA_TYPE_DOCKER_MANIFEST => {
                let manifest: OciImageManifest = read_json(cs, &desc).await?;
                layers.extend(manifest.layers);
            }
            other => return Err(Error::UnsupportedMediaType(other.to_string())),
        }
    }

    Ok(layers)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn descriptors_compare_by_content_fields() {
        let desc = OciDescriptor {
            media_type: "application/vnd.oci.image.layer.v1.tar+gzip+encrypted".into(),
            digest: format!("sha256:{}", "f".repeat(64)),
            size: 3,
            annotations: Some(
                [("org.opencontainers.image.enc.keys.provider.kbs".to_string(), "Zm9v".to_string())]
                    .into_iter()
                    .collect(),
            ),
            ..Default::default()
        };
        let decoded: OciDescriptor =
            serde_json::from_slice(&serde_json::to_vec(&desc).unwrap()).unwrap();
        assert!(same_descriptor(&desc, &decoded));

        let mut resized = desc.clone();
        resized.size += 1;
        assert!(!same_descriptor(&desc, &resized));

        let mut bare = desc.clone();
        bare.annotations = None;
        assert!(!same_descriptor(&desc, &bare));
    }

    fn platform(os: &str, architecture: &str, variant: Option<&str>) -> Platform {
        serde_json::from_value(serde_json::json!({
            "os": os,
            "architecture": architecture,
            "variant": variant,
        }))
        .unwrap()
    }

    #[rstest]
    #[case("application/vnd.oci.image.layer.v1.tar", false)]
    #[case("application/vnd.oci.image.layer.v1.tar+gzip", false)]
    #[case("application/vnd.oci.image.layer.v1.tar+encrypted", true)]
    #[case("application/vnd.oci.image.layer.v1.tar+gzip+encrypted", true)]
    #[case("application/vnd.oci.image.layer.nondistributable.v1.tar+gzip+encrypted", true)]
    #[case("application/vnd.oci.image.layer.v1.tar+zstd+encrypted", true)]
    #[case("", false)]
    fn encrypted_media_types(#[case] media_type: &str, #[case] encrypted: bool) {
        assert_eq!(is_encrypted_media_type(media_type), encrypted);
    }

    #[rstest]
    #[case("linux/amd64", Ok(("linux", "amd64", None)))]
    #[case("linux/arm/v7", Ok(("linux", "arm", Some("v7"))))]
    #[case("linux", Err(()))]
    #[case("linux//v7", Err(()))]
    #[case("linux/arm/v7/extra", Err(()))]
    fn parse_platforms(
        #[case] s: &str,
        #[case] expected: std::result::Result<(&str, &str, Option<&str>), ()>,
    ) {
        let res = PlatformSpec::from_str(s);
        match expected {
            Ok((os, architecture, variant)) => {
                let spec = res.unwrap();
                assert_eq!(spec.os, os);
                assert_eq!(spec.architecture, architecture);
                assert_eq!(spec.variant.as_deref(), variant);
            }
            Err(()) => assert!(matches!(res, Err(Error::IllegalPlatform(p)) if p == s)),
        }
    }

    #[test]
    fn matcher_semantics() {
        let arm_v7 = platform("linux", "arm", Some("v7"));
        let amd64 = platform("linux", "amd64", None);

        assert!(PlatformMatcher::all().matches(Some(&arm_v7)));
        assert!(PlatformMatcher::only(vec![]).matches(None));

        let only_arm = PlatformMatcher::only(vec!["linux/arm".parse().unwrap()]);
        assert!(only_arm.matches(Some(&arm_v7)));
        assert!(!only_arm.matches(Some(&amd64)));

        let only_v6 = PlatformMatcher::only(vec!["linux/arm/v6".parse().unwrap()]);
        assert!(!only_v6.matches(Some(&arm_v7)));
        assert!(!only_v6.matches(Some(&platform("linux", "arm", None))));
    }
}
