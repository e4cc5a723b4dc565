//! # Navigation Module
//!
//! Contract between the module manager and the animated stack widget that
//! actually shows screens, plus the window the screens live in.
//!
//! ## Core Components
//!
//! - [`NavigationStack`] - ordered stack of items, each carrying one view's content
//! - [`StackNotification`] - asynchronous notices the stack queues for the manager
//! - [`Content`] - shared, opaque content surface of a view
//! - [`AppWindow`] - window rotation source
//! - [`SimulatedStack`] / [`SimulatedWindow`] - deterministic in-memory implementations
//!
//! The manager drains notifications once per tick with
//! [`NavigationStack::poll_notification`]; the stack never calls back into the
//! manager directly.

use crate::module_manager::{ItemId, Orientation, PushFlags};
use std::any::Any;
use std::fmt;
use std::rc::Rc;

pub use self::simulated::{DestroyOrder, SimulatedStack, SimulatedWindow, StackHandle};

/// In-memory stack and window used by tests and the terminal shell
pub mod simulated;

/// Notices queued by a [`NavigationStack`] for the manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackNotification {
    /// A push or pop animation completed.
    TransitionFinished,
    /// An item left the stack on the stack's own schedule (after a pop).
    ItemDestroyed(ItemId),
    /// Hardware back key.
    BackRequested,
    /// The back button attached to an item was clicked.
    BackButtonClicked(ItemId),
    /// A gesture tried to pop the given item without the manager asking for it.
    PopGesture(ItemId),
}

/// Animated last-in-first-out container of view content.
///
/// Items are addressed bottom-to-top. Animated operations report their end
/// through [`StackNotification::TransitionFinished`]; items leaving the stack
/// after [`pop_to`](NavigationStack::pop_to) report
/// [`StackNotification::ItemDestroyed`], in either order relative to the
/// transition notice. [`remove`](NavigationStack::remove) is synchronous and
/// queues nothing.
pub trait NavigationStack {
    /// Pushes an item on top. Animated unless the stack was empty.
    fn push(&mut self, content: Content, title: &str, flags: PushFlags) -> Option<ItemId>;

    /// Inserts an item right above `after` without animation.
    fn insert_after(
        &mut self,
        after: ItemId,
        content: Content,
        title: &str,
        flags: PushFlags,
    ) -> Option<ItemId>;

    /// Animates a pop of everything above `item`. Returns false if `item` is
    /// not on the stack.
    fn pop_to(&mut self, item: ItemId) -> bool;

    /// Deletes an item immediately, wherever it is, including an item still
    /// animating out. Pending notifications about it are dropped.
    fn remove(&mut self, item: ItemId);

    fn top_item(&self) -> Option<ItemId>;

    /// All items, bottom first.
    fn items(&self) -> Vec<ItemId>;

    /// Whether the stack is shown in compressed mode (keyboard up, landscape list).
    fn is_compressed(&self) -> bool;

    fn poll_notification(&mut self) -> Option<StackNotification>;
}

/// Window hosting the stack.
pub trait AppWindow {
    fn rotation(&self) -> Orientation;
}

/// Opaque content surface of a view.
///
/// Cloning shares the surface: the view and the stack item each hold a
/// reference and the surface is released when both let go.
#[derive(Clone)]
pub struct Content(Rc<dyn Any>);

impl Content {
    pub fn new<T: Any>(surface: T) -> Self {
        Self(Rc::new(surface))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        (*self.0).downcast_ref::<T>()
    }

    pub fn ptr_eq(&self, other: &Content) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Number of live references to the surface.
    pub fn holders(&self) -> usize {
        Rc::strong_count(&self.0)
    }
}

impl fmt::Debug for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Content")
            .field("holders", &self.holders())
            .finish()
    }
}
