// Copyright 2026 The callweave Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![deny(missing_docs)]
#![allow(clippy::module_name_repetitions)]

//! # callweave
//!
//! A light-weight interception and instrumentation framework: attach
//! additional behavior ("advice") to named operations on arbitrary host
//! objects without modifying the operations themselves, and introspect the
//! invocation chain that led to the current call.
//!
//! ## Features
//!
//! - **Advice combinators** - five pure combinators (`before`, `around`,
//!   `afterReturning`, `afterThrowing`, `after`) with precise failure-path
//!   semantics, each producing a replacement operation that still reaches
//!   the original
//! - **Call-context stack** - every woven invocation pushes a join point on
//!   entry and pops it on every exit path, so the stack always mirrors the
//!   active call chain
//! - **Control-flow queries** - `cflow` answers "is instance X / operation P
//!   somewhere below us?" from inside any advice hook or ordinary code
//! - **Instrumentation consumers** - call counters, timers, profilers and a
//!   memoizer with cache-invalidation guards, all expressed purely as advice
//! - **No global state** - context stacks are explicit, injectable handles
//!   with a per-thread default; tests run against isolated stacks
//!
//! ## Quick Start
//!
//! Add `callweave` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! callweave = "0.1"
//! ```
//!
//! ### Using the Prelude
//!
//! ```rust
//! use callweave::prelude::*;
//!
//! // A host object with a dynamically dispatched operation.
//! let service = Target::new("service");
//! service.define("handle", |_target, args| Ok(Value::Int(args.len() as i64)));
//!
//! // Weave a counter onto it; the caller-visible behavior is unchanged.
//! let counter = Counter::new();
//! let weaver = Weaver::new();
//! weaver.weave(&service, "handle", counter.clone())?;
//!
//! service.call("handle", &[Value::Int(1), Value::Int(2)])?;
//! assert_eq!(counter.calls(), 1);
//! # Ok::<(), callweave::Error>(())
//! ```
//!
//! ### Querying the Call Chain
//!
//! ```rust
//! use callweave::prelude::*;
//!
//! let repo = Target::new("repo");
//! repo.define("save", |t, _a| t.call("audit", &[]));
//! repo.define("audit", |_t, _a| {
//!     // True only while a `save` frame is active below us.
//!     Ok(Value::Bool(cflow(None, &[NamePattern::exact("save")])))
//! });
//!
//! let weaver = Weaver::new();
//! weaver.weave(&repo, "save", Timer::new())?;
//! assert_eq!(repo.call("save", &[])?, Value::Bool(true));
//! # Ok::<(), callweave::Error>(())
//! ```
//!
//! ## Architecture
//!
//! `callweave` is organized into focused modules:
//!
//! - [`prelude`] - re-exports of the commonly used surface
//! - [`target`] - the host object model: method registries and result caches
//! - [`advice`] - the advice protocol, hook capability sets and the five
//!   combinators
//! - [`context`] - join points and the call-context stack
//! - [`cflow`] - control-flow queries over active join points
//! - [`instrument`] - counters, timers, profilers, memoization
//! - [`Weaver`] - binds advice to operations and maintains the stack
//!
//! ### Error Model
//!
//! Framework failures (`NoSuchOperation`, `MalformedAdvice`) surface at
//! weave time. Errors raised by wrapped operations are data: the framework
//! routes them to `afterThrowing`/`after` hooks and always propagates them
//! to the original caller unchanged. Errors raised by instrumentation hooks
//! themselves propagate too and may mask the original error; this is
//! accepted behavior, not handled specially. See [`Error`].
//!
//! ### Threading Model
//!
//! One context stack belongs to one thread of control; pushes and pops
//! happen in strict LIFO order tied to call entry/exit, so no locking is
//! involved. Each thread gets its own default stack
//! ([`context::ContextStack::current`]); cross-thread context propagation is
//! out of scope.

pub mod advice;
pub mod cflow;
pub mod context;
pub mod instrument;
pub mod prelude;
pub mod target;
pub mod value;

mod error;
mod weaver;

pub use error::{Error, Result};
pub use weaver::{MissingOperation, Weaver};
