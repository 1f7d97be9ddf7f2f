// Copyright (c) 2026 The imgcrypt-rs Authors
//
// SPDX-License-Identifier: Apache-2.0
//

//! Unpack and pull configuration, and the options that lift apply
//! options into them.

use std::fmt;
use std::sync::Arc;

use crate::diff::ApplyOpt;
use crate::Result;

/// Configuration of one image unpack.
#[derive(Clone, Debug, Default)]
pub struct UnpackConfig {
    /// Run in order for every layer applied by this unpack.
    pub apply_opts: Vec<Arc<dyn ApplyOpt>>,
}

/// A deferred mutation of an [`UnpackConfig`].
pub trait UnpackOpt: Send + Sync {
    fn apply(&self, config: &mut UnpackConfig) -> Result<()>;
}

impl fmt::Debug for dyn UnpackOpt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("UnpackOpt")
    }
}

/// Configuration of one image pull.
#[derive(Clone, Debug, Default)]
pub struct RemoteContext {
    /// Run in order to build the [`UnpackConfig`] of the pulled image.
    pub unpack_opts: Vec<Arc<dyn UnpackOpt>>,
}

impl RemoteContext {
    pub fn unpack_config(&self) -> Result<UnpackConfig> {
        let mut config = UnpackConfig::default();
        for opt in &self.unpack_opts {
            opt.apply(&mut config)?;
        }

        Ok(config)
    }
}

/// A deferred mutation of a [`RemoteContext`].
pub trait RemoteOpt: Send + Sync {
    fn apply(&self, context: &mut RemoteContext) -> Result<()>;
}

pub struct UnpackConfigApplyOpts {
    opt: Arc<dyn ApplyOpt>,
}

impl UnpackOpt for UnpackConfigApplyOpts {
    fn apply(&self, config: &mut UnpackConfig) -> Result<()> {
        config.apply_opts.push(self.opt.clone());
        Ok(())
    }
}

/// Append `opt` to the apply options of an unpack.
pub fn with_unpack_config_apply_opts(opt: Arc<dyn ApplyOpt>) -> UnpackConfigApplyOpts {
    UnpackConfigApplyOpts { opt }
}

pub struct UnpackOpts {
    opts: Vec<Arc<dyn UnpackOpt>>,
}

impl RemoteOpt for UnpackOpts {
    fn apply(&self, context: &mut RemoteContext) -> Result<()> {
        context.unpack_opts.extend(self.opts.iter().cloned());
        Ok(())
    }
}

/// Append `opts` to the unpack options of a pull. Repeated application
/// accumulates, nothing is deduplicated.
pub fn with_unpack_opts(opts: Vec<Arc<dyn UnpackOpt>>) -> UnpackOpts {
    UnpackOpts { opts }
}
