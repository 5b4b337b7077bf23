#![doc(html_root_url = "https://docs.rs/lignin-reconcile/0.0.1")]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! A virtual tree reconciler with stateful components.
//!
//! Describe the UI as [`VNode`]s (built with [`h`]), hand them to a [`Renderer`], and it applies
//! the minimal set of [`Host`] mutations to make the real tree match. [`Component`]s hold state
//! across renders and re-render through a batching scheduler.

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

mod attributes;
mod component;
mod diff;
mod error;
mod host;
mod linked_state;
mod lis;
mod memory;
mod options;
mod recycler;
mod renderer;
mod scheduler;
mod value;
mod vnode;

pub mod load;
pub mod web;

pub use component::{Component, ComponentRef, ComponentType, Context, HookResult, Lifecycle, Props, State, StateUpdate};
pub use error::{BoxError, Error, Result};
pub use host::{Event, Host, NodeId};
pub use memory::{MemoryHost, Mutations};
pub use options::{Debounce, Debouncer, Options};
pub use renderer::Renderer;
pub use value::{EventHandler, Key, Map, RefCallback, RefTarget, Value};
pub use vnode::{clone_element, h, ComponentElement, Element, NodeName, VNode};
pub use web::{microtask, WebHost};
