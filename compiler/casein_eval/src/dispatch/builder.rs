//! Builder for `CaseEvaluator`.

use casein_ir::StringInterner;

use super::CaseEvaluator;
use crate::config::{DispatchConfig, KeysCachePolicy};
use crate::host::CaseHost;

/// Builder for `CaseEvaluator`.
pub struct CaseEvaluatorBuilder<'a, H: CaseHost + ?Sized> {
    interner: &'a StringInterner,
    host: &'a H,
    config: DispatchConfig,
}

impl<'a, H: CaseHost + ?Sized> CaseEvaluatorBuilder<'a, H> {
    pub fn new(interner: &'a StringInterner, host: &'a H) -> Self {
        Self {
            interner,
            host,
            config: DispatchConfig::default(),
        }
    }

    /// Replace the whole configuration.
    #[must_use]
    pub fn config(mut self, config: DispatchConfig) -> Self {
        self.config = config;
        self
    }

    /// Set how `deconstruct_keys` answers are reused.
    #[must_use]
    pub fn keys_cache(mut self, policy: KeysCachePolicy) -> Self {
        self.config.keys_cache = policy;
        self
    }

    /// Set whether string keys answering a requested key raise `TypeError`.
    #[must_use]
    pub fn strict_key_shape(mut self, strict: bool) -> Self {
        self.config.strict_key_shape = strict;
        self
    }

    pub fn build(self) -> CaseEvaluator<'a, H> {
        CaseEvaluator {
            host: self.host,
            interner: self.interner,
            config: self.config,
        }
    }
}
