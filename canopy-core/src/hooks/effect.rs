//! Effect hooks.
//!
//! An effect handler runs after its component's render has been committed to
//! the host tree. It may hand back a cleanup, which runs right before the
//! handler runs again and when the instance is torn down.

use std::cell::RefCell;

use super::scope::RenderScope;
use super::store::{Cleanup, EffectFn};
use crate::error::Result;

/// What an effect handler may return: nothing, or a cleanup closure.
pub trait Teardown: 'static {
    fn into_cleanup(self) -> Option<Cleanup>;
}

impl Teardown for () {
    fn into_cleanup(self) -> Option<Cleanup> {
        None
    }
}

impl<F: FnOnce() + 'static> Teardown for F {
    fn into_cleanup(self) -> Option<Cleanup> {
        Some(Box::new(self))
    }
}

/// Run `handler` after every commit of the current component.
pub fn use_effect<F, T>(handler: F) -> Result<()>
where
    F: FnOnce() -> T + 'static,
    T: Teardown,
{
    register::<(), F, T>(None, handler)
}

/// Run `handler` after the first commit and after every commit where `deps`
/// differs from the value it had at the previous render.
pub fn use_effect_with<D, F, T>(deps: D, handler: F) -> Result<()>
where
    D: PartialEq + 'static,
    F: FnOnce() -> T + 'static,
    T: Teardown,
{
    register(Some(deps), handler)
}

fn register<D, F, T>(deps: Option<D>, handler: F) -> Result<()>
where
    D: PartialEq + 'static,
    F: FnOnce() -> T + 'static,
    T: Teardown,
{
    let (store, index) = RenderScope::next_slot()?;

    let mut first = false;
    let previous = store.slot(index, || {
        first = true;
        RefCell::new(None::<D>)
    })?;

    let run = match deps {
        None => true,
        Some(deps) => {
            let mut previous = previous.borrow_mut();
            let changed = first || previous.as_ref() != Some(&deps);
            *previous = Some(deps);
            changed
        }
    };

    let handler = run.then(|| Box::new(move || handler().into_cleanup()) as EffectFn);
    store.push_effect(handler);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::store::HookStore;
    use crate::scheduler::Scheduler;
    use crate::vdom::Context;
    use std::rc::Rc;

    fn render(store: &Rc<HookStore>, body: impl FnOnce()) {
        store.begin_render(&Context::default());
        {
            let _scope = RenderScope::enter(store.clone()).unwrap();
            body();
        }
        store.run_stale_cleanups();
        store.commit_effects();
    }

    #[test]
    fn dependencies_gate_reruns() {
        let store = HookStore::new("Effects".into(), Scheduler::default());
        let log = Rc::new(RefCell::new(Vec::new()));

        for deps in [1, 1, 2] {
            let log = log.clone();
            render(&store, move || {
                use_effect_with(deps, move || {
                    log.borrow_mut().push(format!("run {deps}"));
                    move || log.borrow_mut().push(format!("cleanup {deps}"))
                })
                .unwrap();
            });
        }

        assert_eq!(*log.borrow(), ["run 1", "cleanup 1", "run 2"]);

        store.teardown();
        assert_eq!(log.borrow().last().map(String::as_str), Some("cleanup 2"));
    }

    #[test]
    fn effects_without_dependencies_always_run() {
        let store = HookStore::new("Effects".into(), Scheduler::default());
        let runs = Rc::new(RefCell::new(0));

        for _ in 0..3 {
            let runs = runs.clone();
            render(&store, move || {
                use_effect(move || *runs.borrow_mut() += 1).unwrap();
            });
        }

        assert_eq!(*runs.borrow(), 3);
    }
}
