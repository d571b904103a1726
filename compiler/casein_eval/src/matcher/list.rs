//! Array and find patterns.

use casein_patterns::{ArrayPattern, EvalError, FindWindow, Splat, Value};

use super::{Bindings, Matcher};
use crate::classify::fold;
use crate::host::CaseHost;
use crate::Environment;

impl<H: CaseHost + ?Sized> Matcher<'_, H> {
    pub(super) fn match_list(
        &mut self,
        list: &ArrayPattern,
        value: &Value,
        env: &mut Environment,
        bindings: &mut Bindings,
    ) -> Result<bool, EvalError> {
        let Some(items) = fold(self.deconstructor.as_sequence(value)?)? else {
            return Ok(false);
        };
        let items = items.as_slice();
        if items.len() < list.min_len() {
            return Ok(false);
        }

        if let Some(window) = &list.find {
            return self.match_find(window, items, env, bindings);
        }

        let prefix_len = list.prefix.len();
        match list.rest {
            None if list.partial_tail => {
                self.match_each(&list.prefix, &items[..prefix_len], env, bindings)
            }
            None => {
                if items.len() != prefix_len {
                    return Ok(false);
                }
                self.match_each(&list.prefix, items, env, bindings)
            }
            Some(rest) => {
                let middle_end = items.len() - list.suffix.len();
                if !self.match_each(&list.prefix, &items[..prefix_len], env, bindings)? {
                    return Ok(false);
                }
                bind_splat(rest, &items[prefix_len..middle_end], bindings);
                self.match_each(&list.suffix, &items[middle_end..], env, bindings)
            }
        }
    }

    /// Leftmost window of `items` matching `window.elements`.
    fn match_find(
        &mut self,
        window: &FindWindow,
        items: &[Value],
        env: &mut Environment,
        bindings: &mut Bindings,
    ) -> Result<bool, EvalError> {
        let width = window.elements.len();
        for start in 0..=items.len() - width {
            let end = start + width;
            let mark = bindings.mark();
            bind_splat(window.before, &items[..start], bindings);
            if self.match_each(&window.elements, &items[start..end], env, bindings)? {
                tracing::trace!(start, width, "find pattern window matched");
                bind_splat(window.after, &items[end..], bindings);
                return Ok(true);
            }
            bindings.rollback(mark);
        }
        tracing::trace!(len = items.len(), width, "no find pattern window matched");
        Ok(false)
    }
}

fn bind_splat(splat: Splat, items: &[Value], bindings: &mut Bindings) {
    if let Splat::Named(target) = splat {
        bindings.push(target, Value::array(items.to_vec()));
    }
}
