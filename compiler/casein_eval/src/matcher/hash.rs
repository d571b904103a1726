//! Hash patterns.

use casein_patterns::{EvalError, HashPattern, HashRest, HashValue, Value};

use super::{Bindings, Matcher};
use crate::classify::fold;
use crate::host::CaseHost;
use crate::Environment;

impl<H: CaseHost + ?Sized> Matcher<'_, H> {
    pub(super) fn match_hash(
        &mut self,
        pattern: &HashPattern,
        value: &Value,
        env: &mut Environment,
        bindings: &mut Bindings,
    ) -> Result<bool, EvalError> {
        let Some(map) = fold(self.deconstructor.as_mapping(value, pattern)?)? else {
            return Ok(false);
        };

        // Required keys first, in source order.
        for (key, sub_pattern) in &pattern.entries {
            let Some(entry) = map.get_symbol(*key) else {
                return Ok(false);
            };
            if !self.match_node(sub_pattern, entry, env, bindings)? {
                return Ok(false);
            }
        }

        match pattern.rest {
            HashRest::None | HashRest::Open => Ok(true),
            // Every entry key is present, so equal sizes means no extras.
            HashRest::Closed => Ok(map.len() == pattern.entries.len()),
            HashRest::Named(target) => {
                let rest: HashValue = map
                    .iter()
                    .filter(|(key, _)| {
                        !key.as_symbol().is_some_and(|sym| {
                            pattern.entries.iter().any(|(entry, _)| *entry == sym)
                        })
                    })
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect();
                bindings.push(target, Value::hash(rest));
                Ok(true)
            }
        }
    }
}
