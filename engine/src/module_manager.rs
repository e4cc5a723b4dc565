//! # Module Manager Module
//!
//! Lifecycle and navigation orchestration for screens. A module is the
//! controller of one screen flow (mailbox, viewer, composer, ...); it owns
//! the views it pushes onto the navigation stack. The manager guarantees that
//! only the topmost module is interactive, that destruction is safe while the
//! stack animates, and that parent/child relations between screens hold.
//!
//! ## Core Components
//!
//! - [`ModuleManager`] - owned context coordinating modules, views and the stack
//! - [`Module`] / [`View`] / [`ModuleListener`] - hooks implemented by screens
//! - [`ModuleRegistry`] - constructors of concrete modules by [`ModuleType`]
//! - [`ModuleError`] - failures of every operation
//!
//! ## Lifecycles
//!
//! - Modules: RUNNING <-> PAUSED, then DESTROYING until finalized
//! - Views: CREATED -> ACTIVE <-> NOT_ACTIVE, then DESTROYING until finalized
//! - Pops: Idle -> PendingPop -> Transitioning -> Idle

pub use self::errors::{ModuleError, ModuleResult};
pub use self::hooks::{Module, ModuleListener, View};
pub use self::manager::ModuleManager;
pub use self::registry::ModuleRegistry;
pub use self::types::*;

/// Error types for module and view operations
pub mod errors;
/// Traits implemented by concrete screens and their creators
pub mod hooks;
/// Module type registry used to allocate modules
pub mod registry;
/// Handles, states and flags
pub mod types;

mod manager;
mod module_lifecycle;
mod pop_scheduler;
mod view_lifecycle;
