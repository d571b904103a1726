//! Deconstruction adapter: answers `as_sequence` / `as_mapping` for the
//! matcher, at most once per value per dispatch.
//!
//! Entries are keyed by `ValueId` and hold a clone of the keyed value, so an
//! identity cannot be freed and reused while the dispatch is running.
//! Immediates have no identity and are answered directly.

use casein_ir::{Name, StringInterner};
use casein_patterns::{
    Deconstructed, EvalError, HashPattern, HashValue, Heap, ShapeError, Value, ValueId,
};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::config::{DispatchConfig, KeysCachePolicy};
use crate::host::CaseHost;

type Sequence = Deconstructed<Heap<Vec<Value>>>;
type Mapping = Deconstructed<Heap<HashValue>>;

/// Sorted, deduplicated requested keys; `None` for "every key".
type KeySet = Option<SmallVec<[Name; 4]>>;

/// Mapping cache key. A `None` scope is one answer for every key set.
type MappingKey = (ValueId, Option<KeySet>);

/// Counters for one dispatch.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DeconstructStats {
    /// Calls into `CaseHost::deconstruct`.
    pub sequence_calls: usize,
    /// Calls into `CaseHost::deconstruct_keys`.
    pub mapping_calls: usize,
    /// Answers served from the cache.
    pub cache_hits: usize,
}

impl DeconstructStats {
    /// Calls into either hook.
    pub fn hook_calls(&self) -> usize {
        self.sequence_calls + self.mapping_calls
    }
}

pub(crate) struct Deconstructor<'a, H: CaseHost + ?Sized> {
    host: &'a H,
    interner: &'a StringInterner,
    config: DispatchConfig,
    sequences: FxHashMap<ValueId, (Value, Sequence)>,
    mappings: FxHashMap<MappingKey, (Value, Mapping)>,
    stats: DeconstructStats,
}

impl<'a, H: CaseHost + ?Sized> Deconstructor<'a, H> {
    pub(crate) fn new(host: &'a H, interner: &'a StringInterner, config: DispatchConfig) -> Self {
        Deconstructor {
            host,
            interner,
            config,
            sequences: FxHashMap::default(),
            mappings: FxHashMap::default(),
            stats: DeconstructStats::default(),
        }
    }

    pub(crate) fn stats(&self) -> DeconstructStats {
        self.stats
    }

    /// `value` as an ordered sequence.
    pub(crate) fn as_sequence(&mut self, value: &Value) -> Result<Sequence, EvalError> {
        let Some(id) = value.identity() else {
            self.stats.sequence_calls += 1;
            return self.host.deconstruct(value);
        };
        if let Some((_, cached)) = self.sequences.get(&id) {
            self.stats.cache_hits += 1;
            tracing::trace!(?id, "deconstruct served from cache");
            return Ok(cached.clone());
        }
        self.stats.sequence_calls += 1;
        let answer = self.host.deconstruct(value)?;
        self.sequences.insert(id, (value.clone(), answer.clone()));
        Ok(answer)
    }

    /// `value` as a mapping, for `pattern`.
    pub(crate) fn as_mapping(
        &mut self,
        value: &Value,
        pattern: &HashPattern,
    ) -> Result<Mapping, EvalError> {
        let requested = pattern.requested_keys();
        let keys = requested.as_deref();
        let answer = match (value.identity(), self.config.keys_cache) {
            (Some(id), KeysCachePolicy::PerValue) => self.cached_keys((id, None), value, keys)?,
            (Some(id), KeysCachePolicy::PerKeySet) => {
                self.cached_keys((id, Some(key_set(keys))), value, keys)?
            }
            _ => self.call_keys(value, keys)?,
        };
        Ok(self.check_key_shape(value, pattern, answer))
    }

    fn cached_keys(
        &mut self,
        key: MappingKey,
        value: &Value,
        keys: Option<&[Name]>,
    ) -> Result<Mapping, EvalError> {
        if let Some((_, cached)) = self.mappings.get(&key) {
            self.stats.cache_hits += 1;
            tracing::trace!(id = ?key.0, "deconstruct_keys served from cache");
            return Ok(cached.clone());
        }
        let answer = self.call_keys(value, keys)?;
        self.mappings.insert(key, (value.clone(), answer.clone()));
        Ok(answer)
    }

    fn call_keys(&mut self, value: &Value, keys: Option<&[Name]>) -> Result<Mapping, EvalError> {
        self.stats.mapping_calls += 1;
        self.host.deconstruct_keys(value, keys)
    }

    /// A hook that answers a requested key with a string key of the same
    /// spelling returned the wrong shape. A native hash is its own answer and
    /// is never checked.
    fn check_key_shape(&self, value: &Value, pattern: &HashPattern, answer: Mapping) -> Mapping {
        if !self.config.strict_key_shape {
            return answer;
        }
        let Deconstructed::Supported(map) = &answer else {
            return answer;
        };
        if let Value::Hash(own) = value {
            if Heap::ptr_eq(own, map) {
                return answer;
            }
        }
        let offending = map.keys().find_map(|key| {
            let text = key.as_str()?;
            pattern
                .entries
                .iter()
                .any(|(name, _)| self.interner.lookup(*name) == text)
                .then(|| text.to_string())
        });
        match offending {
            Some(key) => Deconstructed::WrongShape(ShapeError::NonSymbolKey { key }),
            None => answer,
        }
    }
}

fn key_set(keys: Option<&[Name]>) -> KeySet {
    keys.map(|keys| {
        let mut set: SmallVec<[Name; 4]> = keys.iter().copied().collect();
        set.sort_unstable();
        set.dedup();
        set
    })
}
