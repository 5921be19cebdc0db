//! Memoization hook.

use std::cell::RefCell;

use super::scope::RenderScope;
use crate::error::Result;

/// Recompute `factory` only when `deps` changed since the previous render.
pub fn use_memo<T, D, F>(deps: D, factory: F) -> Result<T>
where
    T: Clone + 'static,
    D: PartialEq + 'static,
    F: FnOnce() -> T,
{
    let (store, index) = RenderScope::next_slot()?;
    let cache = store.slot(index, || RefCell::new(None::<(D, T)>))?;

    if let Some((previous, value)) = &*cache.borrow() {
        if *previous == deps {
            return Ok(value.clone());
        }
    }

    let value = factory();
    *cache.borrow_mut() = Some((deps, value.clone()));
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::store::HookStore;
    use crate::scheduler::Scheduler;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn recomputes_only_on_change() {
        let store = HookStore::new("Memo".into(), Scheduler::default());
        let calls = Cell::new(0);

        let mut seen = Vec::new();
        for deps in [100, 100, 200] {
            let _scope = RenderScope::enter(Rc::clone(&store)).unwrap();
            let value = use_memo(deps, || {
                calls.set(calls.get() + 1);
                deps * 2
            })
            .unwrap();
            seen.push(value);
        }

        assert_eq!(seen, [200, 200, 400]);
        assert_eq!(calls.get(), 2);
    }
}
