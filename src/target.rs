//! The host object model that weaves are applied to.
//!
//! A [`Target`] is a labelled object owning an explicit method registry
//! (a vtable mapping operation names to callable values) and a memoization
//! cache keyed by operation name. Weaving never patches language-level
//! bindings: it replaces the registry entry for a name with a new callable
//! that delegates to the original, so the original stays reachable through
//! the replacement and nothing outside the registry changes.
//!
//! Targets are handled through [`TargetRef`] (`Rc<Target>`); two references
//! denote the same instance exactly when they point at the same allocation,
//! which is the identity notion `cflow` uses.
//!
//! # Examples
//!
//! ```rust
//! use callweave::{target::Target, value::Value};
//!
//! let calc = Target::new("calc");
//! calc.define("double", |_target, args| {
//!     let n = args[0].as_int().unwrap_or(0);
//!     Ok(Value::Int(n * 2))
//! });
//!
//! assert_eq!(calc.call("double", &[Value::Int(21)])?, Value::Int(42));
//! # Ok::<(), callweave::Error>(())
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::{value::Value, Error, Result};

/// Shared handle to a [`Target`]; instance identity is `Rc::ptr_eq`.
pub type TargetRef = Rc<Target>;

/// A callable registered under an operation name in a target's registry.
///
/// The first argument is the receiving instance, the second the ordered
/// argument list. Woven replacements have the same shape as plain methods,
/// which is what lets weaving compound.
pub type MethodFn = Rc<dyn Fn(&TargetRef, &[Value]) -> Result<Value>>;

/// A host object with a method registry and a per-instance memoization cache.
///
/// The registry is the unit of interception: [`crate::Weaver::weave`] reads
/// the current entry for a name and installs a replacement in its place. The
/// cache is an external collaborator from the framework's point of view; only
/// the memoizer and its guard (see [`crate::instrument::memoizer`]) consume it.
pub struct Target {
    label: String,
    methods: RefCell<HashMap<String, MethodFn>>,
    woven: RefCell<HashMap<String, Rc<RefCell<MethodFn>>>>,
    cache: RefCell<HashMap<String, HashMap<String, Value>>>,
}

impl Target {
    /// Creates a new target with a human-readable label.
    ///
    /// The label appears in error messages and log lines; it carries no
    /// identity semantics (two targets may share a label and remain distinct
    /// instances).
    #[must_use]
    pub fn new(label: impl Into<String>) -> TargetRef {
        Rc::new(Target {
            label: label.into(),
            methods: RefCell::new(HashMap::new()),
            woven: RefCell::new(HashMap::new()),
            cache: RefCell::new(HashMap::new()),
        })
    }

    /// Returns the target's label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Registers an operation under `name`, replacing any previous entry.
    pub fn define<F>(&self, name: impl Into<String>, body: F)
    where
        F: Fn(&TargetRef, &[Value]) -> Result<Value> + 'static,
    {
        self.install(name, Rc::new(body));
    }

    /// Installs a prebuilt callable under `name`, replacing any previous entry.
    ///
    /// This is the assignment step of a weave; it is also usable directly
    /// with replacements produced by [`crate::advice::combinators`].
    /// Replacing an entry discards any weave state attached to the old one,
    /// so a later weave of the same name starts from the new callable.
    pub fn install(&self, name: impl Into<String>, method: MethodFn) {
        let name = name.into();
        self.woven.borrow_mut().remove(&name);
        self.methods.borrow_mut().insert(name, method);
    }

    /// The hook chain of a woven operation, if `name` is currently woven.
    ///
    /// The slot sits inside the operation's single frame layer; re-weaving
    /// splices additional hook layers into it instead of installing a second
    /// frame, keeping one context frame per invocation.
    pub(crate) fn hook_slot(&self, name: &str) -> Option<Rc<RefCell<MethodFn>>> {
        self.woven.borrow().get(name).map(Rc::clone)
    }

    /// Marks `name` as woven, recording the hook chain slot its frame layer
    /// dispatches through.
    pub(crate) fn set_hook_slot(&self, name: impl Into<String>, slot: Rc<RefCell<MethodFn>>) {
        self.woven.borrow_mut().insert(name.into(), slot);
    }

    /// Looks up the callable currently registered under `name`.
    #[must_use]
    pub fn method(&self, name: &str) -> Option<MethodFn> {
        self.methods.borrow().get(name).cloned()
    }

    /// Returns `true` if an operation named `name` is registered.
    #[must_use]
    pub fn has_method(&self, name: &str) -> bool {
        self.methods.borrow().contains_key(name)
    }

    /// Invokes the operation registered under `name` with `args`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoSuchOperation`] if no operation is registered under
    /// `name`, or whatever error the operation itself raises.
    pub fn call(self: &Rc<Self>, name: &str, args: &[Value]) -> Result<Value> {
        let method = self.method(name).ok_or_else(|| Error::NoSuchOperation {
            target: self.label.clone(),
            operation: name.to_string(),
        })?;
        // The registry borrow is released before the call so operations may
        // define or install methods while executing.
        method(self, args)
    }

    /// Looks up a cached result for `(operation, key)`.
    #[must_use]
    pub fn cache_lookup(&self, operation: &str, key: &str) -> Option<Value> {
        self.cache
            .borrow()
            .get(operation)
            .and_then(|per_op| per_op.get(key))
            .cloned()
    }

    /// Stores a result for `(operation, key)`.
    pub fn cache_store(&self, operation: &str, key: impl Into<String>, value: Value) {
        self.cache
            .borrow_mut()
            .entry(operation.to_string())
            .or_default()
            .insert(key.into(), value);
    }

    /// Removes every cached result for a single operation.
    pub fn cache_evict(&self, operation: &str) {
        self.cache.borrow_mut().remove(operation);
    }

    /// Removes every cached result on this instance.
    pub fn cache_clear(&self) {
        self.cache.borrow_mut().clear();
    }

    /// Returns the operation names that currently have cached results.
    #[must_use]
    pub fn cached_operations(&self) -> Vec<String> {
        self.cache.borrow().keys().cloned().collect()
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Target")
            .field("label", &self.label)
            .field("methods", &self.methods.borrow().len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_define_and_call() {
        let target = Target::new("calc");
        target.define("add", |_target, args| {
            let sum = args.iter().filter_map(Value::as_int).sum();
            Ok(Value::Int(sum))
        });

        let result = target
            .call("add", &[Value::Int(1), Value::Int(2), Value::Int(3)])
            .unwrap();
        assert_eq!(result, Value::Int(6));
    }

    #[test]
    fn test_call_unknown_operation() {
        let target = Target::new("calc");
        let err = target.call("nope", &[]).unwrap_err();
        assert!(
            matches!(err, Error::NoSuchOperation { ref operation, ref target } if operation == "nope" && target == "calc")
        );
    }

    #[test]
    fn test_install_replaces_entry() {
        let target = Target::new("t");
        target.define("op", |_t, _a| Ok(Value::Int(1)));
        target.define("op", |_t, _a| Ok(Value::Int(2)));
        assert_eq!(target.call("op", &[]).unwrap(), Value::Int(2));
    }

    #[test]
    fn test_operation_can_call_siblings() {
        let target = Target::new("t");
        target.define("inner", |_t, _a| Ok(Value::Int(10)));
        target.define("outer", |t, _a| t.call("inner", &[]));
        assert_eq!(target.call("outer", &[]).unwrap(), Value::Int(10));
    }

    #[test]
    fn test_cache_scoped_by_operation() {
        let target = Target::new("t");
        target.cache_store("compute", "[Int(1)]", Value::Int(2));
        target.cache_store("render", "[]", Value::Str("out".into()));

        assert_eq!(target.cache_lookup("compute", "[Int(1)]"), Some(Value::Int(2)));
        assert_eq!(target.cache_lookup("compute", "[Int(9)]"), None);

        target.cache_evict("compute");
        assert_eq!(target.cache_lookup("compute", "[Int(1)]"), None);
        assert_eq!(target.cache_lookup("render", "[]"), Some(Value::Str("out".into())));

        target.cache_clear();
        assert!(target.cached_operations().is_empty());
    }
}
