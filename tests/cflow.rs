//! Context-stack balance and control-flow query integration tests.
//!
//! Covers stack discipline across nested and failing woven calls, cflow
//! scoping across instances, and the pattern forms accepted by the query.

use callweave::prelude::*;
use std::cell::Cell;
use std::rc::Rc;

/// Minimal advice used solely to get operations woven (and thus framed).
struct Marker;

impl Advice for Marker {
    fn hooks(&self) -> HookSet {
        HookSet::BEFORE
    }
}

fn weave_marked(weaver: &Weaver, target: &TargetRef, operations: &[&str]) {
    for operation in operations {
        weaver.weave(target, operation, Rc::new(Marker)).unwrap();
    }
}

#[test]
fn stack_balances_after_nested_success() {
    let stack = ContextStack::new();
    let weaver = Weaver::with_stack(stack.clone());

    let target = Target::new("svc");
    target.define("inner", |_t, _a| Ok(Value::Null));
    target.define("outer", |t, _a| t.call("inner", &[]));
    weave_marked(&weaver, &target, &["inner", "outer"]);

    assert_eq!(stack.depth(), 0);
    target.call("outer", &[]).unwrap();
    assert_eq!(stack.depth(), 0);
}

#[test]
fn stack_balances_after_nested_failure() {
    let stack = ContextStack::new();
    let weaver = Weaver::with_stack(stack.clone());

    let target = Target::new("svc");
    target.define("inner", |_t, _a| Err(Error::raised("deep failure")));
    target.define("mid", |t, _a| t.call("inner", &[]));
    target.define("outer", |t, _a| t.call("mid", &[]));
    weave_marked(&weaver, &target, &["inner", "mid", "outer"]);

    let before = stack.depth();
    let err = target.call("outer", &[]).unwrap_err();
    assert!(matches!(err, Error::Raised(ref m) if m == "deep failure"));
    assert_eq!(stack.depth(), before);
}

#[test]
fn compound_weaves_keep_one_frame_per_call() {
    let stack = ContextStack::new();
    let weaver = Weaver::with_stack(stack.clone());
    let target = Target::new("svc");

    let probe = stack.clone();
    target.define("op", move |_t, _a| Ok(Value::Int(probe.depth() as i64)));

    // Two advices on the same operation still mean one frame per call.
    weave_marked(&weaver, &target, &["op"]);
    weave_marked(&weaver, &target, &["op"]);

    assert_eq!(target.call("op", &[]).unwrap(), Value::Int(1));
    assert!(stack.is_empty());
}

#[test]
fn depth_tracks_reentrant_calls() {
    let stack = ContextStack::new();
    let weaver = Weaver::with_stack(stack.clone());
    let target = Target::new("svc");

    let probe = stack.clone();
    target.define("recurse", move |t, args| {
        let n = args[0].as_int().unwrap_or(0);
        assert_eq!(probe.depth() as i64, 3 - n);
        if n > 0 {
            t.call("recurse", &[Value::Int(n - 1)])?;
        }
        Ok(Value::Null)
    });
    weave_marked(&weaver, &target, &["recurse"]);

    target.call("recurse", &[Value::Int(2)]).unwrap();
    assert_eq!(stack.depth(), 0);
}

#[test]
fn cflow_scoping_across_instances() {
    // Nested calls a.foo() -> b.bar() -> a.baz():
    //   cflow(a) holds throughout, cflow(b, "bar") only under bar's frame,
    //   cflow(a, "qux") never.
    let stack = ContextStack::new();
    let weaver = Weaver::with_stack(stack.clone());

    let a = Target::new("a");
    let b = Target::new("b");
    let checked = Rc::new(Cell::new(0u32));

    {
        let stack = stack.clone();
        let a = Rc::clone(&a);
        let checked = Rc::clone(&checked);
        b.define("bar", move |t, _a| {
            assert!(stack.cflow(Some(&a), &[]));
            assert!(stack.cflow(Some(t), &[NamePattern::exact("bar")]));
            assert!(!stack.cflow(Some(&a), &[NamePattern::exact("qux")]));
            checked.set(checked.get() + 1);
            a.call("baz", &[])
        });
    }
    {
        let stack = stack.clone();
        let b = Rc::clone(&b);
        let checked = Rc::clone(&checked);
        a.define("baz", move |t, _a| {
            assert!(stack.cflow(Some(t), &[]));
            assert!(stack.cflow(Some(&b), &[NamePattern::exact("bar")]));
            assert!(stack.cflow(Some(t), &[NamePattern::exact("baz")]));
            assert!(!stack.cflow(Some(t), &[NamePattern::exact("qux")]));
            checked.set(checked.get() + 1);
            Ok(Value::Null)
        });
    }
    {
        let stack = stack.clone();
        let b = Rc::clone(&b);
        let checked = Rc::clone(&checked);
        a.define("foo", move |t, _a| {
            assert!(stack.cflow(Some(t), &[]));
            // bar's frame is not active yet.
            assert!(!stack.cflow(Some(&b), &[NamePattern::exact("bar")]));
            checked.set(checked.get() + 1);
            b.call("bar", &[])
        });
    }

    weave_marked(&weaver, &a, &["foo", "baz"]);
    weave_marked(&weaver, &b, &["bar"]);

    a.call("foo", &[]).unwrap();
    assert_eq!(checked.get(), 3, "not every body ran its assertions");

    // Nothing active afterwards.
    assert!(!stack.cflow(Some(&a), &[]));
    assert!(!stack.cflow(Some(&b), &[]));
}

#[test]
fn cflow_pattern_forms_against_live_frames() {
    let stack = ContextStack::new();
    let weaver = Weaver::with_stack(stack.clone());
    let target = Target::new("svc");

    let probe = stack.clone();
    target.define("render_frame", move |_t, _a| {
        assert!(probe.cflow(None, &[NamePattern::exact("render_frame")]));
        assert!(probe.cflow(None, &[NamePattern::prefix("render")]));
        assert!(probe.cflow(None, &[NamePattern::contains("der_fr")]));
        assert!(!probe.cflow(None, &[NamePattern::prefix("frame")]));
        // OR semantics: one bogus pattern does not spoil the set.
        assert!(probe.cflow(
            None,
            &[NamePattern::exact("bogus"), NamePattern::exact("render_frame")]
        ));
        Ok(Value::Null)
    });
    weave_marked(&weaver, &target, &["render_frame"]);

    target.call("render_frame", &[]).unwrap();
}

#[test]
fn thread_local_cflow_sees_default_weaver() {
    // Weaver::new() binds the calling thread's default stack, which the free
    // cflow() function queries.
    let target = Target::new("svc");
    target.define("op", |_t, _a| {
        Ok(Value::Bool(cflow(None, &[NamePattern::exact("op")])))
    });

    let weaver = Weaver::new();
    weaver.weave(&target, "op", Rc::new(Marker)).unwrap();

    assert_eq!(target.call("op", &[]).unwrap(), Value::Bool(true));
    assert!(!cflow(None, &[]));
}

#[test]
fn isolated_stacks_do_not_observe_each_other() {
    let stack_a = ContextStack::new();
    let stack_b = ContextStack::new();
    let weaver_a = Weaver::with_stack(stack_a.clone());

    let target = Target::new("svc");
    let probe = stack_b.clone();
    target.define("op", move |_t, _a| {
        assert!(!probe.cflow(None, &[]), "frame leaked across stacks");
        Ok(Value::Null)
    });
    weave_marked(&weaver_a, &target, &["op"]);

    target.call("op", &[]).unwrap();
    assert!(stack_a.is_empty());
    assert!(stack_b.is_empty());
}
