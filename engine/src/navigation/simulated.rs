use super::{AppWindow, Content, NavigationStack, StackNotification};
use crate::module_manager::{ItemId, Orientation, PushFlags};
use serde::Deserialize;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

/// Which notice an animated pop reports first.
///
/// Real stack widgets are not consistent about this, so the manager must
/// accept both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DestroyOrder {
    /// `ItemDestroyed` for the popped item, then `TransitionFinished`.
    #[default]
    DestroyFirst,
    /// `TransitionFinished`, then `ItemDestroyed`.
    FinishFirst,
}

struct Entry {
    id: ItemId,
    content: Content,
    title: String,
    flags: PushFlags,
}

#[derive(Default)]
struct StackState {
    entries: Vec<Entry>,
    next_id: u64,
    /// Some while an animation runs, holding items animating out.
    animating: Option<Vec<Entry>>,
    notifications: VecDeque<StackNotification>,
    auto_complete: bool,
    destroy_order: DestroyOrder,
    compressed: bool,
    pop_requests: Vec<ItemId>,
}

impl StackState {
    fn allocate(&mut self, content: Content, title: &str, flags: PushFlags) -> Entry {
        self.next_id += 1;
        Entry {
            id: ItemId(self.next_id),
            content,
            title: title.to_string(),
            flags,
        }
    }

    fn position(&self, item: ItemId) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id == item)
    }

    fn complete_transition(&mut self) -> bool {
        let Some(leaving) = self.animating.take() else {
            return false;
        };

        if self.destroy_order == DestroyOrder::FinishFirst {
            self.notifications
                .push_back(StackNotification::TransitionFinished);
        }
        for entry in leaving {
            self.notifications
                .push_back(StackNotification::ItemDestroyed(entry.id));
        }
        if self.destroy_order == DestroyOrder::DestroyFirst {
            self.notifications
                .push_back(StackNotification::TransitionFinished);
        }
        true
    }
}

/// Deterministic [`NavigationStack`] that animates only when told to.
///
/// Every animated push or pop stays "in flight" until
/// [`StackHandle::complete_transition`] is called, or until the manager polls
/// it when auto-completion is on. A [`StackHandle`] obtained through
/// [`handle`](SimulatedStack::handle) keeps access to the stack after it has
/// been handed to the manager.
///
/// ```no_run
/// use engine::navigation::{DestroyOrder, SimulatedStack};
///
/// let stack = SimulatedStack::new()
///     .with_destroy_order(DestroyOrder::FinishFirst)
///     .with_auto_complete(true);
/// let handle = stack.handle();
/// assert!(handle.titles().is_empty());
/// ```
pub struct SimulatedStack {
    state: Rc<RefCell<StackState>>,
}

impl SimulatedStack {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(StackState::default())),
        }
    }

    pub fn with_destroy_order(self, order: DestroyOrder) -> Self {
        self.state.borrow_mut().destroy_order = order;
        self
    }

    pub fn with_auto_complete(self, enabled: bool) -> Self {
        self.state.borrow_mut().auto_complete = enabled;
        self
    }

    pub fn with_compressed(self, compressed: bool) -> Self {
        self.state.borrow_mut().compressed = compressed;
        self
    }

    pub fn handle(&self) -> StackHandle {
        StackHandle {
            state: Rc::clone(&self.state),
        }
    }
}

impl Default for SimulatedStack {
    fn default() -> Self {
        Self::new()
    }
}

impl NavigationStack for SimulatedStack {
    fn push(&mut self, content: Content, title: &str, flags: PushFlags) -> Option<ItemId> {
        let mut state = self.state.borrow_mut();
        let entry = state.allocate(content, title, flags);
        let id = entry.id;
        if !state.entries.is_empty() {
            state.animating.get_or_insert_with(Vec::new);
        }
        state.entries.push(entry);
        Some(id)
    }

    fn insert_after(
        &mut self,
        after: ItemId,
        content: Content,
        title: &str,
        flags: PushFlags,
    ) -> Option<ItemId> {
        let mut state = self.state.borrow_mut();
        let position = state.position(after)?;
        let entry = state.allocate(content, title, flags);
        let id = entry.id;
        state.entries.insert(position + 1, entry);
        Some(id)
    }

    fn pop_to(&mut self, item: ItemId) -> bool {
        let mut state = self.state.borrow_mut();
        let Some(position) = state.position(item) else {
            return false;
        };
        state.pop_requests.push(item);

        let mut above = state.entries.split_off(position + 1);
        let Some(top) = above.pop() else {
            return true;
        };
        for entry in above {
            state
                .notifications
                .push_back(StackNotification::ItemDestroyed(entry.id));
        }
        state.animating.get_or_insert_with(Vec::new).push(top);
        true
    }

    fn remove(&mut self, item: ItemId) {
        let mut state = self.state.borrow_mut();
        if let Some(position) = state.position(item) {
            state.entries.remove(position);
        } else if let Some(leaving) = state.animating.as_mut() {
            leaving.retain(|entry| entry.id != item);
        }
        state.notifications.retain(|notification| {
            !matches!(
                notification,
                StackNotification::ItemDestroyed(id)
                | StackNotification::BackButtonClicked(id)
                | StackNotification::PopGesture(id) if *id == item
            )
        });
    }

    fn top_item(&self) -> Option<ItemId> {
        self.state.borrow().entries.last().map(|entry| entry.id)
    }

    fn items(&self) -> Vec<ItemId> {
        self.state
            .borrow()
            .entries
            .iter()
            .map(|entry| entry.id)
            .collect()
    }

    fn is_compressed(&self) -> bool {
        self.state.borrow().compressed
    }

    fn poll_notification(&mut self) -> Option<StackNotification> {
        let mut state = self.state.borrow_mut();
        if state.notifications.is_empty() && state.auto_complete {
            state.complete_transition();
        }
        state.notifications.pop_front()
    }
}

/// Shared access to a [`SimulatedStack`] owned by the manager.
#[derive(Clone)]
pub struct StackHandle {
    state: Rc<RefCell<StackState>>,
}

impl StackHandle {
    /// Ends the running animation, queueing its notices. Returns false when
    /// nothing was animating.
    pub fn complete_transition(&self) -> bool {
        self.state.borrow_mut().complete_transition()
    }

    pub fn is_animating(&self) -> bool {
        self.state.borrow().animating.is_some()
    }

    pub fn press_back(&self) {
        self.notify(StackNotification::BackRequested);
    }

    pub fn click_back_button(&self, item: ItemId) {
        self.notify(StackNotification::BackButtonClicked(item));
    }

    pub fn swipe_pop(&self, item: ItemId) {
        self.notify(StackNotification::PopGesture(item));
    }

    pub fn set_compressed(&self, compressed: bool) {
        self.state.borrow_mut().compressed = compressed;
    }

    pub fn set_auto_complete(&self, enabled: bool) {
        self.state.borrow_mut().auto_complete = enabled;
    }

    pub fn len(&self) -> usize {
        self.state.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn items(&self) -> Vec<ItemId> {
        self.state
            .borrow()
            .entries
            .iter()
            .map(|entry| entry.id)
            .collect()
    }

    /// Titles bottom first. Items pushed with [`PushFlags::NO_TITLE`] show as empty.
    pub fn titles(&self) -> Vec<String> {
        self.state
            .borrow()
            .entries
            .iter()
            .map(|entry| {
                if entry.flags.contains(PushFlags::NO_TITLE) {
                    String::new()
                } else {
                    entry.title.clone()
                }
            })
            .collect()
    }

    pub fn has_back_button(&self, item: ItemId) -> bool {
        let state = self.state.borrow();
        state
            .entries
            .iter()
            .position(|entry| entry.id == item)
            .is_some_and(|position| {
                position > 0 && !state.entries[position].flags.contains(PushFlags::NO_BACK_BUTTON)
            })
    }

    pub fn content(&self, item: ItemId) -> Option<Content> {
        self.state
            .borrow()
            .entries
            .iter()
            .find(|entry| entry.id == item)
            .map(|entry| entry.content.clone())
    }

    /// Targets passed to `pop_to`, oldest first.
    pub fn pop_requests(&self) -> Vec<ItemId> {
        self.state.borrow().pop_requests.clone()
    }

    pub fn pending_notifications(&self) -> Vec<StackNotification> {
        self.state.borrow().notifications.iter().copied().collect()
    }

    fn notify(&self, notification: StackNotification) {
        self.state.borrow_mut().notifications.push_back(notification);
    }
}

/// [`AppWindow`] whose rotation is set by hand. Clones share the rotation.
#[derive(Debug, Clone, Default)]
pub struct SimulatedWindow {
    rotation: Rc<Cell<Orientation>>,
}

impl SimulatedWindow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_rotation(&self, rotation: Orientation) {
        self.rotation.set(rotation);
    }
}

impl AppWindow for SimulatedWindow {
    fn rotation(&self) -> Orientation {
        self.rotation.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use claims::*;

    fn content() -> Content {
        Content::new(())
    }

    #[test]
    fn test_first_push_does_not_animate() {
        let mut stack = SimulatedStack::new();
        let handle = stack.handle();

        let first = assert_some!(stack.push(content(), "Inbox", PushFlags::NONE));
        assert!(!handle.is_animating());
        assert_eq!(stack.top_item(), Some(first));

        assert_some!(stack.push(content(), "Message", PushFlags::NONE));
        assert!(handle.is_animating());
        assert!(handle.complete_transition());
        assert_eq!(
            stack.poll_notification(),
            Some(StackNotification::TransitionFinished)
        );
        assert_none!(stack.poll_notification());
    }

    #[test]
    fn test_insert_after_keeps_order_without_animation() {
        let mut stack = SimulatedStack::new();
        let handle = stack.handle();
        let bottom = assert_some!(stack.push(content(), "A", PushFlags::NONE));
        let top = assert_some!(stack.insert_after(bottom, content(), "B", PushFlags::NONE));
        let middle = assert_some!(stack.insert_after(bottom, content(), "C", PushFlags::NONE));

        assert_eq!(stack.items(), vec![bottom, middle, top]);
        assert!(!handle.is_animating());
        assert_none!(stack.insert_after(ItemId(99), content(), "D", PushFlags::NONE));
    }

    #[test]
    fn test_pop_to_destroys_intermediate_items_immediately() {
        let mut stack = SimulatedStack::new().with_destroy_order(DestroyOrder::FinishFirst);
        let handle = stack.handle();
        let a = assert_some!(stack.push(content(), "A", PushFlags::NONE));
        let b = assert_some!(stack.insert_after(a, content(), "B", PushFlags::NONE));
        let c = assert_some!(stack.insert_after(b, content(), "C", PushFlags::NONE));

        assert!(stack.pop_to(a));
        assert_eq!(stack.items(), vec![a]);
        assert_eq!(stack.poll_notification(), Some(StackNotification::ItemDestroyed(b)));
        assert_none!(stack.poll_notification());

        assert!(handle.complete_transition());
        assert_eq!(
            handle.pending_notifications(),
            vec![
                StackNotification::TransitionFinished,
                StackNotification::ItemDestroyed(c)
            ]
        );
        assert_eq!(handle.pop_requests(), vec![a]);
    }

    #[test]
    fn test_remove_drops_pending_notifications() {
        let mut stack = SimulatedStack::new();
        let handle = stack.handle();
        let a = assert_some!(stack.push(content(), "A", PushFlags::NONE));
        let b = assert_some!(stack.insert_after(a, content(), "B", PushFlags::NONE));

        assert!(stack.pop_to(a));
        stack.remove(b);
        assert!(handle.complete_transition());
        assert_eq!(
            handle.pending_notifications(),
            vec![StackNotification::TransitionFinished]
        );
    }

    #[test]
    fn test_auto_complete_on_poll() {
        let mut stack = SimulatedStack::new().with_auto_complete(true);
        let a = assert_some!(stack.push(content(), "A", PushFlags::NONE));
        let b = assert_some!(stack.push(content(), "B", PushFlags::NONE));

        assert_eq!(
            stack.poll_notification(),
            Some(StackNotification::TransitionFinished)
        );
        assert!(stack.pop_to(a));
        assert_eq!(stack.poll_notification(), Some(StackNotification::ItemDestroyed(b)));
        assert_eq!(
            stack.poll_notification(),
            Some(StackNotification::TransitionFinished)
        );
        assert_none!(stack.poll_notification());
    }

    #[test]
    fn test_item_releases_content() {
        let mut stack = SimulatedStack::new();
        let surface = content();
        let item = assert_some!(stack.push(surface.clone(), "A", PushFlags::NONE));
        assert_eq!(surface.holders(), 2);

        stack.remove(item);
        assert_eq!(surface.holders(), 1);
        assert!(stack.items().is_empty());
    }

    #[test]
    fn test_handle_reports_titles_and_back_buttons() {
        let mut stack = SimulatedStack::new();
        let handle = stack.handle();
        let a = assert_some!(stack.push(content(), "Inbox", PushFlags::NONE));
        let b = assert_some!(stack.insert_after(a, content(), "Hidden", PushFlags::NO_TITLE));
        let c = assert_some!(stack.insert_after(b, content(), "Plain", PushFlags::NO_BACK_BUTTON));

        assert_eq!(handle.titles(), vec!["Inbox", "", "Plain"]);
        assert!(!handle.has_back_button(a));
        assert!(handle.has_back_button(b));
        assert!(!handle.has_back_button(c));
    }

    #[test]
    fn test_window_rotation_is_shared() {
        let window = SimulatedWindow::new();
        let observer = window.clone();
        window.set_rotation(Orientation::Landscape);
        assert_eq!(observer.rotation(), Orientation::Landscape);
    }
}
