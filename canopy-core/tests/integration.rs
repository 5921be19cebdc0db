//! Integration Tests for the Reconciler and Hooks Runtime
//!
//! These tests render into a `MemoryHost` and drive deferred renders with a
//! `ManualClock`, so every scenario is deterministic.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use canopy_core::host::memory::HostOp;
use canopy_core::{
    create_context, h, use_context, use_context_of, use_effect_with, use_reducer, use_state, Component, Context,
    Error, Event, Handler, ManualClock, MemNode, MemoryHost, NodeRef, PropValue, Props, Renderer, Result, SetState,
    VNode,
};

const DELAY: Duration = Duration::from_millis(10);

type Log = Rc<RefCell<Vec<String>>>;

fn setup() -> (Rc<ManualClock>, MemNode, Renderer<MemoryHost>) {
    let clock = Rc::new(ManualClock::new());
    let mut host = MemoryHost::new();
    let root = host.create_root();
    let renderer = Renderer::with_clock(host, clock.clone());
    renderer.set_delay(Some(DELAY));
    (clock, root, renderer)
}

fn click(renderer: &Renderer<MemoryHost>, node: MemNode) {
    assert!(renderer.host().dispatch(node, &Event::new("onclick", PropValue::Null)));
}

fn counter(_: &Props, _: &Context) -> Result<VNode> {
    let (count, set_count) = use_state(0)?;
    h("button")
        .attr("onclick", Handler::new(move |_| set_count.update(|n| n + 1)))
        .child(count)
        .build()
}

fn mount(component: &Component) -> VNode {
    VNode::component(component, Props::new(), vec![]).unwrap()
}

fn list(keys: &[&str]) -> VNode {
    h("ul")
        .children(keys.iter().map(|k| h("li").key(*k).child(*k).build().unwrap()))
        .build()
        .unwrap()
}

// ----------------------------------------------------------------------------
// Keyed children
// ----------------------------------------------------------------------------

/// Reversing a keyed list moves the existing nodes instead of recreating them.
#[test]
fn keyed_reversal_preserves_identity() {
    let (_, root, mut renderer) = setup();

    let ul = renderer.render(list(&["a", "b", "c"]), &root, None).unwrap();
    let before = renderer.host().child_nodes(ul).to_vec();
    renderer.host_mut().take_ops();

    let again = renderer.render(list(&["c", "b", "a"]), &root, Some(&ul)).unwrap();

    assert_eq!(again, ul);
    assert_eq!(renderer.host().child_nodes(ul), [before[2], before[1], before[0]]);
    assert_eq!(renderer.host().created_count(), 0);
    assert_eq!(renderer.host().text_content(ul), "cba");
}

/// Unclaimed keys are removed, new keys are created, survivors are reused.
#[test]
fn keyed_insert_and_remove() {
    let (_, root, mut renderer) = setup();

    let ul = renderer.render(list(&["a", "b", "c"]), &root, None).unwrap();
    let b = renderer.host().child_nodes(ul)[1];
    renderer.host_mut().take_ops();

    renderer.render(list(&["b", "d"]), &root, Some(&ul)).unwrap();

    let children = renderer.host().child_nodes(ul).to_vec();
    assert_eq!(children.len(), 2);
    assert_eq!(children[0], b);
    assert_eq!(renderer.host().text_content(ul), "bd");
    // One <li> and its text node.
    assert_eq!(renderer.host().created_count(), 2);
}

/// Keys on component children identify the component, not what it renders.
#[test]
fn keyed_components_are_moved_not_remounted() {
    fn item(props: &Props, _: &Context) -> Result<VNode> {
        let label = props.get("label").and_then(PropValue::as_str).unwrap_or_default().to_string();
        h("li").child(label).build()
    }
    let item = Component::new("Item", item);
    let items = |keys: &[&str]| {
        h("ul")
            .children(keys.iter().map(|k| {
                VNode::component(&item, Props::new().with("label", *k).with_key(*k), vec![]).unwrap()
            }))
            .build()
            .unwrap()
    };

    let (_, root, mut renderer) = setup();
    let ul = renderer.render(items(&["x", "y"]), &root, None).unwrap();
    let before = renderer.host().child_nodes(ul).to_vec();
    renderer.host_mut().take_ops();

    renderer.render(items(&["y", "x"]), &root, Some(&ul)).unwrap();

    assert_eq!(renderer.host().child_nodes(ul), [before[1], before[0]]);
    assert_eq!(renderer.host().created_count(), 0);
    assert_eq!(renderer.host().text_content(ul), "yx");
}

/// Duplicate sibling keys are rejected when the tree is built.
/// A keyed component whose output changes tag in a deferred render keeps
/// its key, so the next parent render still finds it.
#[test]
fn keyed_component_keeps_key_across_deferred_tag_swap() {
    let setters: Rc<RefCell<Vec<(String, SetState<bool>)>>> = Rc::default();
    let item = {
        let setters = setters.clone();
        Component::from_closure("Item", move |props, _| {
            let label = props.get("label").and_then(PropValue::as_str).unwrap_or_default().to_string();
            let (open, set_open) = use_state(false)?;
            setters.borrow_mut().push((label.clone(), set_open));
            let mark = if open { "+" } else { "-" };
            h(if open { "p" } else { "li" }).child(format!("{label}{mark}")).build()
        })
    };
    let items = |keys: &[&str]| {
        h("ul")
            .children(keys.iter().map(|k| {
                VNode::component(&item, Props::new().with("label", *k).with_key(*k), vec![]).unwrap()
            }))
            .build()
            .unwrap()
    };
    let setter = |label: &str| {
        setters
            .borrow()
            .iter()
            .rev()
            .find(|(l, _)| l == label)
            .map(|(_, set)| set.clone())
            .unwrap()
    };

    let (_, root, mut renderer) = setup();
    let ul = renderer.render(items(&["a", "b"]), &root, None).unwrap();

    setter("a").set(true);
    assert_eq!(renderer.flush().unwrap(), 1);
    let p = renderer.host().child_nodes(ul)[0];
    assert_eq!(renderer.host().tag(p), Some("p"));
    assert_eq!(renderer.host().text_content(ul), "a+b-");
    renderer.host_mut().take_ops();

    renderer.render(items(&["a", "b"]), &root, Some(&ul)).unwrap();
    assert_eq!(renderer.host().text_content(ul), "a+b-");
    assert_eq!(renderer.host().child_nodes(ul)[0], p);
    assert_eq!(renderer.host().created_count(), 0);

    renderer.render(items(&["b", "a"]), &root, Some(&ul)).unwrap();
    assert_eq!(renderer.host().text_content(ul), "b-a+");
    assert_eq!(renderer.host().child_nodes(ul)[1], p);
    assert_eq!(renderer.host().created_count(), 0);
}

#[test]
fn duplicate_keys_are_an_error() {
    let err = h("ul")
        .child(h("li").key("a").build().unwrap())
        .child(h("li").key("a").build().unwrap())
        .build()
        .unwrap_err();

    assert!(matches!(err, Error::DuplicateKey(_)));
}

// ----------------------------------------------------------------------------
// Host node reuse
// ----------------------------------------------------------------------------

/// Re-rendering with a component whose output has the same shape patches the
/// existing nodes in place.
#[test]
fn component_output_reuses_existing_nodes() {
    fn app(_: &Props, _: &Context) -> Result<VNode> {
        h("div")
            .child(h("div").attr("id", "child").child(h("button").attr("class", "primary").child("text").build()?).build()?)
            .build()
    }

    let (_, root, mut renderer) = setup();
    let plain = h("div")
        .child(h("div").attr("id", "child").child(h("button").child("text").build().unwrap()).build().unwrap())
        .build()
        .unwrap();

    let div = renderer.render(plain, &root, None).unwrap();
    let button = renderer.host().find_by_tag(div, "button")[0];
    renderer.host_mut().take_ops();

    let again = renderer.render(mount(&Component::new("App", app)), &root, Some(&div)).unwrap();

    assert_eq!(again, div);
    assert_eq!(renderer.host().find_by_tag(div, "button"), [button]);
    assert_eq!(renderer.host().attribute(button, "class"), Some("primary"));
    assert_eq!(renderer.host().created_count(), 0);
}

/// Swapping one element for another carries the existing children across.
#[test]
fn element_swap_transfers_children() {
    let (_, root, mut renderer) = setup();
    let build = |tag: &str| {
        h(tag)
            .child(h("p").child("one").build().unwrap())
            .child(h("p").child("two").build().unwrap())
            .build()
            .unwrap()
    };

    let div = renderer.render(build("div"), &root, None).unwrap();
    let paragraphs = renderer.host().child_nodes(div).to_vec();
    renderer.host_mut().take_ops();

    let section = renderer.render(build("section"), &root, Some(&div)).unwrap();

    assert_ne!(section, div);
    assert_eq!(renderer.host().tag(section), Some("section"));
    assert_eq!(renderer.host().child_nodes(section), paragraphs.as_slice());
    assert_eq!(renderer.host().child_nodes(root), [section]);
    assert_eq!(renderer.host().created_count(), 1);
}

// ----------------------------------------------------------------------------
// Properties
// ----------------------------------------------------------------------------

/// Attributes, native properties and style entries are diffed.
#[test]
fn attributes_properties_and_style() {
    let (_, root, mut renderer) = setup();

    let first = h("input")
        .attr("title", "t")
        .attr("value", "a")
        .attr("style", PropValue::map([("color", "red"), ("margin", "0")]))
        .build()
        .unwrap();
    let input = renderer.render(first, &root, None).unwrap();

    let host = renderer.host();
    assert_eq!(host.attribute(input, "title"), Some("t"));
    assert_eq!(host.property(input, "value"), Some(&PropValue::from("a")));
    assert_eq!(host.style(input, "color"), Some("red"));

    let second = h("input")
        .attr("value", "b")
        .attr("style", PropValue::map([("color", "blue")]))
        .build()
        .unwrap();
    renderer.render(second, &root, Some(&input)).unwrap();

    let host = renderer.host();
    assert_eq!(host.attribute(input, "title"), None);
    assert_eq!(host.property(input, "value"), Some(&PropValue::from("b")));
    assert_eq!(host.style(input, "color"), Some("blue"));
    assert_eq!(host.style(input, "margin"), None);
}

/// Changing a handler swaps it behind the installed listener.
#[test]
fn handlers_swap_without_listener_churn() {
    let (_, root, mut renderer) = setup();
    let hits = Rc::new(RefCell::new(Vec::new()));
    let handler = |label: &'static str| {
        let hits = hits.clone();
        Handler::new(move |_| hits.borrow_mut().push(label))
    };
    let button = |h_: Handler| h("button").attr("onclick", h_).build().unwrap();

    let node = renderer.render(button(handler("a")), &root, None).unwrap();
    click(&renderer, node);
    renderer.host_mut().take_ops();

    renderer.render(button(handler("b")), &root, Some(&node)).unwrap();
    click(&renderer, node);

    assert_eq!(*hits.borrow(), ["a", "b"]);
    assert!(!renderer
        .host()
        .ops()
        .iter()
        .any(|op| matches!(op, HostOp::AddListener { .. })));

    renderer.render(h("button").build().unwrap(), &root, Some(&node)).unwrap();
    assert!(!renderer.host().has_listener(node, "onclick"));
}

/// Elements under <svg> are created in the SVG namespace.
#[test]
fn svg_subtrees_are_namespaced() {
    let (_, root, mut renderer) = setup();
    let tree = h("div")
        .child(h("svg").child(h("circle").attr("r", 5).build().unwrap()).build().unwrap())
        .child(h("span").build().unwrap())
        .build()
        .unwrap();

    let div = renderer.render(tree, &root, None).unwrap();
    let host = renderer.host();
    let svg = host.find_by_tag(div, "svg")[0];
    let circle = host.find_by_tag(div, "circle")[0];
    let span = host.find_by_tag(div, "span")[0];

    assert!(!host.is_svg(div));
    assert!(host.is_svg(svg));
    assert!(host.is_svg(circle));
    assert!(host.is_namespaced(circle, "r"));
    assert!(!host.is_svg(span));
}

// ----------------------------------------------------------------------------
// Reserved properties
// ----------------------------------------------------------------------------

/// Lifecycle callbacks fire in order, parents around children on removal.
#[test]
fn lifecycle_ordering() {
    fn traced(tag: &str, name: &'static str, log: &Log) -> canopy_core::vdom::Builder {
        let push = move |phase: &'static str| {
            let log = log.clone();
            move |_: &MemNode| log.borrow_mut().push(format!("{name} {phase}"))
        };
        let update = {
            let log = log.clone();
            move |_: &MemNode, _: &Props, _: &Props| {
                log.borrow_mut().push(format!("{name} update"));
                true
            }
        };
        h(tag)
            .on_create(push("create"))
            .on_created(push("created"))
            .on_update(update)
            .on_updated(push("updated"))
            .on_remove(push("remove"))
            .on_removed(push("removed"))
    }

    let (_, root, mut renderer) = setup();
    let log: Log = Rc::default();
    let tree = |log: &Log| {
        traced("div", "outer", log)
            .child(traced("span", "inner", log).build().unwrap())
            .build()
            .unwrap()
    };

    let div = renderer.render(tree(&log), &root, None).unwrap();
    assert_eq!(*log.borrow(), ["outer create", "inner create", "inner created", "outer created"]);

    log.borrow_mut().clear();
    renderer.render(tree(&log), &root, Some(&div)).unwrap();
    assert_eq!(*log.borrow(), ["outer update", "inner update", "inner updated", "outer updated"]);

    log.borrow_mut().clear();
    renderer.unmount(&root, &div).unwrap();
    assert_eq!(*log.borrow(), ["outer remove", "inner remove", "inner removed", "outer removed"]);
    assert!(renderer.host().child_nodes(root).is_empty());
}

/// `onUpdate` returning false skips the pass and keeps the old description;
/// `onUpdated` still follows.
#[test]
fn update_veto_keeps_previous_description() {
    let (_, root, mut renderer) = setup();
    let log: Log = Rc::default();
    let node = |value: i32, allow: bool| {
        let (on_update, on_updated) = (log.clone(), log.clone());
        h("div")
            .attr("data-n", value)
            .on_update(move |_: &MemNode, _, _| {
                on_update.borrow_mut().push("update".to_string());
                allow
            })
            .on_updated(move |_: &MemNode| on_updated.borrow_mut().push("updated".to_string()))
            .build()
            .unwrap()
    };

    let div = renderer.render(node(1, true), &root, None).unwrap();
    assert!(log.borrow().is_empty());

    renderer.render(node(2, false), &root, Some(&div)).unwrap();
    assert_eq!(renderer.host().attribute(div, "data-n"), Some("1"));
    assert_eq!(*log.borrow(), ["update", "updated"]);

    renderer.host_mut().take_ops();
    renderer.render(node(2, true), &root, Some(&div)).unwrap();
    assert_eq!(renderer.host().attribute(div, "data-n"), Some("2"));
    assert_eq!(*log.borrow(), ["update", "updated", "update", "updated"]);
}

/// A static node keeps its first committed description.
#[test]
fn static_nodes_are_left_alone() {
    let (_, root, mut renderer) = setup();
    let node = |label: &str| h("div").static_node().attr("title", label).child(label).build().unwrap();

    let div = renderer.render(node("first"), &root, None).unwrap();
    renderer.host_mut().take_ops();
    renderer.render(node("second"), &root, Some(&div)).unwrap();

    assert_eq!(renderer.host().attribute(div, "title"), Some("first"));
    assert_eq!(renderer.host().text_content(div), "first");
    assert!(renderer.host().ops().is_empty());
}

/// Scoped nodes render their children into an isolated container.
#[test]
fn scoped_children_live_in_an_isolated_container() {
    let (_, root, mut renderer) = setup();
    let tree = h("div").scoped().child(h("span").child("inside").build().unwrap()).build().unwrap();

    let div = renderer.render(tree, &root, None).unwrap();
    let host = renderer.host();
    let scope = host.scope(div).unwrap();

    assert!(host.child_nodes(div).is_empty());
    assert_eq!(host.child_nodes(scope).len(), 1);
    assert_eq!(host.text_content(scope), "inside");
}

/// Refs follow the node they are attached to and clear on removal.
#[test]
fn node_refs_track_the_committed_node() {
    let (_, root, mut renderer) = setup();
    let node_ref = NodeRef::new();

    let with_span = h("div").child(h("span").node_ref(&node_ref).build().unwrap()).build().unwrap();
    let div = renderer.render(with_span, &root, None).unwrap();
    let span = renderer.host().child_nodes(div)[0];
    assert_eq!(node_ref.get::<MemNode>(), Some(span));

    renderer.render(h("div").build().unwrap(), &root, Some(&div)).unwrap();
    assert!(!node_ref.is_set());
}

/// Context overlays merge down the tree.
#[test]
fn context_overlays_accumulate() {
    let (_, root, mut renderer) = setup();
    let seen: Rc<RefCell<Vec<Context>>> = Rc::default();
    let s = seen.clone();
    let reader = Component::from_closure("Reader", move |_, context| {
        let hooked = use_context()?;
        assert_eq!(&hooked, context);
        s.borrow_mut().push(hooked);
        Ok(VNode::empty())
    });

    let tree = h("div")
        .context(Context::new().with("id", 100))
        .child(
            h("section")
                .context(Context::new().with("cd", 200))
                .child(mount(&reader))
                .build()
                .unwrap(),
        )
        .child(mount(&reader))
        .build()
        .unwrap();
    renderer.render(tree, &root, None).unwrap();

    let seen = seen.borrow();
    assert_eq!(seen[0].get("id"), Some(&PropValue::from(100)));
    assert_eq!(seen[0].get("cd"), Some(&PropValue::from(200)));
    assert_eq!(seen[1].get("id"), Some(&PropValue::from(100)));
    assert_eq!(seen[1].get("cd"), None);
}

/// Context handles pair a provider with consumers and the hook.
#[test]
fn context_handles() {
    let (_, root, mut renderer) = setup();
    let theme = create_context("light");
    let t = theme.clone();
    let badge = Component::from_closure("Badge", move |_, _| {
        let value = use_context_of(&t)?;
        h("b").child(value.as_str().unwrap_or_default().to_string()).build()
    });

    let label = |value: &PropValue| h("i").child(value.as_str().unwrap_or_default().to_string()).build();
    let tree = h("div")
        .child(
            theme
                .provider("dark", vec![h("p").child(theme.consumer(label)).child(mount(&badge)).build().unwrap().into()])
                .unwrap(),
        )
        .child(theme.consumer(label))
        .build()
        .unwrap();

    let div = renderer.render(tree, &root, None).unwrap();
    assert_eq!(renderer.host().text_content(div), "darkdarklight");
}

// ----------------------------------------------------------------------------
// Hooks
// ----------------------------------------------------------------------------

/// Three setter calls inside one window produce one deferred render.
#[test]
fn setter_calls_coalesce_into_one_render() {
    let (clock, root, mut renderer) = setup();
    let button = renderer.render(mount(&Component::new("Counter", counter)), &root, None).unwrap();

    click(&renderer, button);
    click(&renderer, button);
    click(&renderer, button);
    assert_eq!(renderer.pending(), 1);
    assert_eq!(renderer.host().text_content(button), "0");

    assert_eq!(renderer.flush_due().unwrap(), 0);
    clock.advance(DELAY);
    assert_eq!(renderer.flush_due().unwrap(), 1);

    assert_eq!(renderer.host().text_content(button), "3");
    assert_eq!(renderer.pending(), 0);
}

/// Three setter calls inside one render body produce one deferred render.
#[test]
fn setter_calls_in_one_render_body_coalesce() {
    fn eager(_: &Props, _: &Context) -> Result<VNode> {
        let (count, set_count) = use_state(0)?;
        if count == 0 {
            for _ in 0..3 {
                set_count.update(|n| n + 1);
            }
        }
        h("span").child(count).build()
    }

    let (clock, root, mut renderer) = setup();
    let span = renderer.render(mount(&Component::new("Eager", eager)), &root, None).unwrap();
    assert_eq!(renderer.pending(), 1);
    assert_eq!(renderer.host().text_content(span), "0");

    clock.advance(DELAY);
    assert_eq!(renderer.flush_due().unwrap(), 1);
    assert_eq!(renderer.host().text_content(span), "3");
    assert_eq!(renderer.pending(), 0);
}

/// A component that fails its first render is not kept registered.
#[test]
fn failed_mount_leaves_no_instance() {
    fn broken(_: &Props, _: &Context) -> Result<VNode> {
        use_state(0)?;
        Err(Error::host("render failed"))
    }

    let (_, root, mut renderer) = setup();
    let err = renderer
        .render(mount(&Component::new("Broken", broken)), &root, None)
        .unwrap_err();
    assert!(matches!(err, Error::Host(_)));
    assert_eq!(renderer.instances(), 0);

    renderer.render(mount(&Component::new("Counter", counter)), &root, None).unwrap();
    assert_eq!(renderer.instances(), 1);
}

/// Several state slots keep their values independently.
#[test]
fn state_slots_are_positional() {
    type Setters = (SetState<i32>, SetState<String>, SetState<bool>);
    let (clock, root, mut renderer) = setup();
    let setters: Rc<RefCell<Option<Setters>>> = Rc::default();
    let renders = Rc::new(RefCell::new(0));

    let (s, r) = (setters.clone(), renders.clone());
    let form = Component::from_closure("Form", move |_, _| {
        *r.borrow_mut() += 1;
        let (a, set_a) = use_state(1)?;
        let (b, set_b) = use_state(String::from("x"))?;
        let (c, set_c) = use_state(false)?;
        *s.borrow_mut() = Some((set_a, set_b, set_c));
        h("p").child(format!("{a}/{b}/{c}")).build()
    });

    let p = renderer.render(mount(&form), &root, None).unwrap();
    assert_eq!(renderer.host().text_content(p), "1/x/false");

    let (set_a, set_b, set_c) = setters.borrow().clone().unwrap();
    set_a.set(2);
    set_b.set("y".into());
    set_c.set(true);

    clock.advance(DELAY);
    renderer.flush_due().unwrap();

    assert_eq!(renderer.host().text_content(p), "2/y/true");
    assert_eq!(*renders.borrow(), 2);
}

/// Effects re-run only when their dependencies change, and clean up before
/// re-running and on teardown.
#[test]
fn effect_dependencies_and_cleanup() {
    let (_, root, mut renderer) = setup();
    let log: Log = Rc::default();
    let l = log.clone();
    let watcher = Component::from_closure("Watcher", move |props, _| {
        let n = props.get("n").and_then(PropValue::as_int).unwrap_or_default();
        let l = l.clone();
        use_effect_with(n, move || {
            l.borrow_mut().push(format!("run {n}"));
            move || l.borrow_mut().push(format!("cleanup {n}"))
        })?;
        h("span").child(n).build()
    });
    let node = |n: i64| VNode::component(&watcher, Props::new().with("n", n), vec![]).unwrap();

    let span = renderer.render(node(1), &root, None).unwrap();
    renderer.render(node(1), &root, Some(&span)).unwrap();
    assert_eq!(*log.borrow(), ["run 1"]);

    renderer.render(node(2), &root, Some(&span)).unwrap();
    assert_eq!(*log.borrow(), ["run 1", "cleanup 1", "run 2"]);

    renderer.unmount(&root, &span).unwrap();
    assert_eq!(*log.borrow(), ["run 1", "cleanup 1", "run 2", "cleanup 2"]);
}

/// Reducer dispatches are folded into state and rendered once.
#[test]
fn reducer_counts_clicks() {
    fn tally(_: &Props, _: &Context) -> Result<VNode> {
        let (total, dispatch) = use_reducer(|state: Option<&i64>, step: i64| state.copied().unwrap_or_default() + step, 0)?;
        h("button")
            .attr("onclick", Handler::new(move |_| dispatch.dispatch(1)))
            .child(total)
            .build()
    }

    let (clock, root, mut renderer) = setup();
    let button = renderer.render(mount(&Component::new("Tally", tally)), &root, None).unwrap();

    click(&renderer, button);
    click(&renderer, button);
    clock.advance(DELAY);
    renderer.flush_due().unwrap();

    assert_eq!(renderer.host().text_content(button), "2");
}

/// A parent re-render does not run a child whose deferred render is pending.
#[test]
fn pending_instances_skip_parent_renders() {
    let (clock, root, mut renderer) = setup();
    let counter = Component::new("Counter", counter);
    let app = |label: &str| {
        h("div")
            .attr("title", label)
            .child(mount(&counter))
            .build()
            .unwrap()
    };

    let div = renderer.render(app("a"), &root, None).unwrap();
    let button = renderer.host().child_nodes(div)[0];
    click(&renderer, button);

    renderer.render(app("b"), &root, Some(&div)).unwrap();
    assert_eq!(renderer.host().attribute(div, "title"), Some("b"));
    assert_eq!(renderer.host().text_content(button), "0");

    clock.advance(DELAY);
    renderer.flush_due().unwrap();
    assert_eq!(renderer.host().text_content(button), "1");
}

/// A component that stops rendering its child tears the child down.
#[test]
fn nested_components_tear_down_on_replacement() {
    let (clock, root, mut renderer) = setup();
    let log: Log = Rc::default();
    let show: Rc<RefCell<Option<SetState<bool>>>> = Rc::default();

    let tree = {
        let log = log.clone();
        Component::from_closure("Tree", move |_, _| {
            let l = log.clone();
            use_effect_with((), move || move || l.borrow_mut().push("tree cleanup".to_string()))?;
            let (on_remove, on_removed) = (log.clone(), log.clone());
            h("h1")
                .on_remove(move |_: &MemNode| on_remove.borrow_mut().push("h1 remove".to_string()))
                .on_removed(move |_: &MemNode| on_removed.borrow_mut().push("h1 removed".to_string()))
                .child("leaf")
                .build()
        })
    };
    let two = {
        let show = show.clone();
        Component::from_closure("Two", move |_, _| {
            let (visible, set_visible) = use_state(true)?;
            *show.borrow_mut() = Some(set_visible);
            if visible {
                VNode::component(&tree, Props::new(), vec![])
            } else {
                Ok(VNode::empty())
            }
        })
    };
    let one = Component::from_closure("One", move |_, _| VNode::component(&two, Props::new(), vec![]));

    let h1 = renderer.render(mount(&one), &root, None).unwrap();
    assert_eq!(renderer.host().tag(h1), Some("h1"));

    show.borrow().clone().unwrap().set(false);
    clock.advance(DELAY);
    renderer.flush_due().unwrap();

    let children = renderer.host().child_nodes(root).to_vec();
    assert_eq!(children.len(), 1);
    assert_eq!(renderer.host().tag(children[0]), Some(""));
    assert_eq!(*log.borrow(), ["tree cleanup", "h1 remove", "h1 removed"]);

    show.borrow().clone().unwrap().set(true);
    clock.advance(DELAY);
    renderer.flush_due().unwrap();

    let children = renderer.host().child_nodes(root).to_vec();
    assert_eq!(renderer.host().tag(children[0]), Some("h1"));
    assert_eq!(renderer.host().text_content(children[0]), "leaf");
}

/// Unmounting runs cleanups and makes later updates inert.
#[test]
fn unmount_tears_down_components() {
    let (clock, root, mut renderer) = setup();
    let log: Log = Rc::default();
    let setter: Rc<RefCell<Option<SetState<i32>>>> = Rc::default();

    let (l, s) = (log.clone(), setter.clone());
    let widget = Component::from_closure("Widget", move |_, _| {
        let (value, set_value) = use_state(0)?;
        *s.borrow_mut() = Some(set_value);
        let l = l.clone();
        use_effect_with((), move || move || l.borrow_mut().push("cleanup".to_string()))?;
        h("span").child(value).build()
    });

    let span = renderer.render(mount(&widget), &root, None).unwrap();
    let set_value = setter.borrow().clone().unwrap();
    set_value.set(1);

    renderer.unmount(&root, &span).unwrap();
    assert_eq!(*log.borrow(), ["cleanup"]);
    assert!(renderer.host().child_nodes(root).is_empty());

    // The queued task finds a torn-down instance and does nothing.
    clock.advance(DELAY);
    renderer.flush_due().unwrap();
    set_value.set(2);
    assert_eq!(renderer.pending(), 0);
    assert!(renderer.host().child_nodes(root).is_empty());
}

/// Hooks called outside a component render fail cleanly.
#[test]
fn hooks_require_a_render() {
    assert!(matches!(use_state(0), Err(Error::NoActiveRender)));
    assert!(matches!(use_context(), Err(Error::NoActiveRender)));
}

/// `drive` sleeps until deferred renders come due and runs them.
#[tokio::test]
async fn drive_runs_deferred_renders() {
    let mut host = MemoryHost::new();
    let root = host.create_root();
    let mut renderer = Renderer::new(host);
    renderer.set_delay(Some(Duration::from_millis(5)));

    let button = renderer.render(mount(&Component::new("Counter", counter)), &root, None).unwrap();
    click(&renderer, button);

    let ran = renderer.drive().await.unwrap();

    assert_eq!(ran, 1);
    assert_eq!(renderer.host().text_content(button), "1");
}
