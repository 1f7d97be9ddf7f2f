// Copyright (c) 2026 The imgcrypt-rs Authors
//
// SPDX-License-Identifier: Apache-2.0
//

//! Configuration of a single layer apply step.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use oci_client::manifest::OciDescriptor;

use crate::typeurl::Any;
use crate::Result;

/// State handed to the applier of one layer.
#[derive(Clone, Debug, Default)]
pub struct ApplyConfig {
    /// Envelopes addressed to stream processors, keyed by processor id.
    /// Created on first write. Processors read entries, never mutate them.
    pub processor_payloads: Option<HashMap<String, Arc<Any>>>,
}

impl ApplyConfig {
    pub fn processor_payload(&self, id: &str) -> Option<&Arc<Any>> {
        self.processor_payloads.as_ref()?.get(id)
    }
}

/// A deferred mutation of an [`ApplyConfig`], run for each layer.
pub trait ApplyOpt: Send + Sync {
    fn apply(&self, desc: &OciDescriptor, config: &mut ApplyConfig) -> Result<()>;
}

impl fmt::Debug for dyn ApplyOpt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApplyOpt")
    }
}

/// Run `opts` in order against a fresh [`ApplyConfig`] for `desc`.
/// Stops at the first failing option.
pub fn apply_config(desc: &OciDescriptor, opts: &[Arc<dyn ApplyOpt>]) -> Result<ApplyConfig> {
    let mut config = ApplyConfig::default();
    for opt in opts {
        opt.apply(desc, &mut config)?;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::Error;

    struct Record(&'static str, Arc<Mutex<Vec<&'static str>>>);

    impl ApplyOpt for Record {
        fn apply(&self, _desc: &OciDescriptor, _config: &mut ApplyConfig) -> Result<()> {
            self.1.lock().unwrap().push(self.0);
            Ok(())
        }
    }

    struct Fail;

    impl ApplyOpt for Fail {
        fn apply(&self, _desc: &OciDescriptor, _config: &mut ApplyConfig) -> Result<()> {
            Err(Error::Apply {
                source: anyhow::anyhow!("boom"),
            })
        }
    }

    #[test]
    fn opts_run_in_order_and_stop_on_error() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let opts: Vec<Arc<dyn ApplyOpt>> = vec![
            Arc::new(Record("first", seen.clone())),
            Arc::new(Record("second", seen.clone())),
            Arc::new(Fail),
            Arc::new(Record("third", seen.clone())),
        ];

        let res = apply_config(&OciDescriptor::default(), &opts);
        assert!(matches!(res, Err(Error::Apply { .. })));
        assert_eq!(*seen.lock().unwrap(), ["first", "second"]);
    }

    #[test]
    fn no_payloads_by_default() {
        let config = apply_config(&OciDescriptor::default(), &[]).unwrap();
        assert!(config.processor_payloads.is_none());
        assert!(config.processor_payload("p1").is_none());
    }
}
