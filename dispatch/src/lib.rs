//! # dispatch
//!
//! Conversational event routing: a predicate algebra over normalized events, a plugin-loaded
//! handler registry with group-ordered first-match selection, and a per-invocation command
//! context driving menu-state transitions.
//!
//! ## Modules
//!
//! - [`predicate`] – composable boolean filters over an event and a state snapshot
//! - [`menu`] – declared conversation-state values
//! - [`registry`] – plugin loader, handler descriptors, startup validation
//! - [`dispatcher`] – the per-event routing hot path
//! - [`context`] – the per-invocation bundle handed to handlers

pub mod context;
pub mod dispatcher;
pub mod menu;
pub mod predicate;
pub mod registry;


pub use context::{CommandContext, ContextBuild};
pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use menu::{Menu, MAIN};
pub use predicate::{
    callback_in, command, command_in, forwarded_from_channel, is_channel_post, is_media, menu,
    menu_in, text_is, text_is_ignore_case, Predicate, StateView,
};
pub use registry::{
    bind, ActionFn, ActionFuture, HandlerDef, HandlerDescriptor, Placement, Plugin, PluginHandle,
    Registry, RegistryBuilder, RegistryError,
};
