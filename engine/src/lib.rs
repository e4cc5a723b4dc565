//! # Navmail Engine Library
//!
//! Screen orchestration core of the navmail client. It creates, activates,
//! pauses, stacks, animates and tears down screens on top of an animated
//! navigation stack.
//!
//! ## Modules
//!
//! - [`module_manager`] - Module manager, module and view lifecycles, pop scheduling
//! - [`navigation`] - Navigation stack contract, content surfaces, simulated stack
//! - [`params`] - Parameter bag exchanged between screens
//! - `testing` - Scripted modules, views and listeners that record hook calls
//!   (`test-utils` feature)

pub mod module_manager;
pub mod navigation;
pub mod params;
#[cfg(any(test, feature = "test-utils"))]
pub mod testing;
