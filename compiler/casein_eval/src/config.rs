//! Dispatch configuration.

/// How `deconstruct_keys` results are reused within one dispatch.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum KeysCachePolicy {
    /// One hook call per value. The keys requested by the first hash
    /// pattern that reaches the value are the ones passed to the hook, and
    /// that answer serves every later hash pattern.
    #[default]
    PerValue,
    /// One hook call per value and requested key set.
    PerKeySet,
    /// One hook call per hash pattern.
    Uncached,
}

/// Knobs for a `CaseEvaluator`. Built through `CaseEvaluatorBuilder`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DispatchConfig {
    pub keys_cache: KeysCachePolicy,
    /// Raise `TypeError` when a `deconstruct_keys` hook answers a requested
    /// key with a string key of the same spelling. When off, such keys just
    /// fail the symbol lookup.
    pub strict_key_shape: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        DispatchConfig {
            keys_cache: KeysCachePolicy::default(),
            strict_key_shape: true,
        }
    }
}
