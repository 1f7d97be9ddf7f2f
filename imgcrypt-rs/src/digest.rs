// Copyright (c) 2026 The imgcrypt-rs Authors
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::{bail, Result};
use sha2::Digest;

pub const DIGEST_SHA256_PREFIX: &str = "sha256:";
pub const DIGEST_SHA512_PREFIX: &str = "sha512:";

/// Supported content digest algorithms.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DigestAlgorithm {
    Sha256,
    Sha512,
}

impl DigestAlgorithm {
    pub fn name(&self) -> &'static str {
        match self {
            DigestAlgorithm::Sha256 => "sha256",
            DigestAlgorithm::Sha512 => "sha512",
        }
    }

    pub fn digest(&self, data: &[u8]) -> String {
        match self {
            DigestAlgorithm::Sha256 => {
                format!("{}{:x}", DIGEST_SHA256_PREFIX, sha2::Sha256::digest(data))
            }
            DigestAlgorithm::Sha512 => {
                format!("{}{:x}", DIGEST_SHA512_PREFIX, sha2::Sha512::digest(data))
            }
        }
    }
}

/// Split `digest` into its algorithm and lowercase hex encoded part.
pub fn parse_digest(digest: &str) -> Result<(DigestAlgorithm, &str)> {
    let (algorithm, encoded, len) = if let Some(hex) = digest.strip_prefix(DIGEST_SHA256_PREFIX) {
        (DigestAlgorithm::Sha256, hex, 64)
    } else if let Some(hex) = digest.strip_prefix(DIGEST_SHA512_PREFIX) {
        (DigestAlgorithm::Sha512, hex, 128)
    } else {
        bail!("unsupported digest format: {:?}", digest);
    };

    if encoded.len() != len
        || !encoded
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
    {
        bail!("malformed {} digest: {:?}", algorithm.name(), digest);
    }

    Ok((algorithm, encoded))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn digest_round_trip() {
        for algorithm in [DigestAlgorithm::Sha256, DigestAlgorithm::Sha512] {
            let digest = algorithm.digest(b"layer");
            let (parsed, _) = parse_digest(&digest).unwrap();
            assert_eq!(parsed, algorithm);
        }
    }

    #[rstest]
    #[case("")]
    #[case("md5:d41d8cd98f00b204e9800998ecf8427e")]
    #[case("sha256:abc")]
    #[case("sha256:../../../../../../../../../../../../../../../../../../../etc/passwd")]
    #[case("sha256:E3B0C44298FC1C149AFBF4C8996FB92427AE41E4649B934CA495991B7852B855")]
    fn reject_bad_digests(#[case] digest: &str) {
        assert!(parse_digest(digest).is_err());
    }
}
