use super::errors::{ModuleError, ModuleResult, reject};
use super::hooks::{Module, ModuleListener, View};
use super::pop_scheduler::PopScheduler;
use super::registry::ModuleRegistry;
use super::types::{
    ItemId, ModuleEvent, ModuleId, ModuleState, ModuleType, Orientation, PopPhase, PushFlags,
    UpdateFlags, ViewId, ViewState,
};
use crate::navigation::{AppWindow, Content, NavigationStack};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

pub(crate) struct ModuleRecord {
    pub(crate) module_type: ModuleType,
    pub(crate) state: ModuleState,
    /// Empty while one of the module's hooks is running.
    pub(crate) hooks: Option<Box<dyn Module>>,
    pub(crate) listener: Option<Rc<dyn ModuleListener>>,
    pub(crate) parent: Option<ModuleId>,
    pub(crate) children: Vec<ModuleId>,
    /// Stack item that was on top when the module was created.
    pub(crate) anchor: Option<ItemId>,
    pub(crate) views: Vec<ViewId>,
    /// Set while the module tears down its own views, so losing the last
    /// view does not finalize it a second time.
    pub(crate) cleaning_views: bool,
}

pub(crate) struct ViewRecord {
    pub(crate) module: ModuleId,
    pub(crate) state: ViewState,
    pub(crate) visible: bool,
    pub(crate) orientation: Orientation,
    pub(crate) hooks: Option<Box<dyn View>>,
    pub(crate) content: Option<Content>,
    pub(crate) item: Option<ItemId>,
    pub(crate) update_flags: UpdateFlags,
    pub(crate) push_flags: PushFlags,
    /// One-shot permission for the stack to pop this view's item.
    pub(crate) allow_pop: bool,
}

/// Coordinator of every module, view and navigation stack operation.
///
/// ModuleManager is the single owned context of the screen layer. It holds
/// the root module, the topmost module (the only one allowed to create views
/// or children), the navigation stack and the pop scheduler, and it drives
/// activation of views on resume, rotation and language changes.
///
/// # Architecture
///
/// The manager's behaviour is split across files by concern:
/// - `manager.rs` - initialization, pause/resume, events, queries, ticking
/// - `module_lifecycle.rs` - module creation, destruction and finalization
/// - `view_lifecycle.rs` - view creation, push, exit and state transitions
/// - `pop_scheduler.rs` - deferred pops and stack notification handling
///
/// Modules and views live in arenas keyed by [`ModuleId`] and [`ViewId`].
/// Hooks receive `&mut ModuleManager`, so a screen can re-enter the manager
/// from any hook.
///
/// # Event Loop
///
/// Nothing happens asynchronously inside the manager. The host calls
/// [`tick`](ModuleManager::tick) once per loop iteration; it runs the pending
/// pop job, if any, and then handles the notifications queued by the stack.
///
/// # Examples
///
/// ```no_run
/// use engine::module_manager::{ModuleManager, ModuleRegistry, ModuleType};
/// use engine::navigation::{SimulatedStack, SimulatedWindow};
/// use engine::params::Params;
/// # use std::rc::Rc;
/// # fn listener() -> Rc<dyn engine::module_manager::ModuleListener> { unimplemented!() }
///
/// let mut manager = ModuleManager::new(ModuleRegistry::new());
/// manager.initialize(Box::new(SimulatedWindow::new()), Box::new(SimulatedStack::new()))?;
/// manager.resume()?;
///
/// let root = manager.create_root_module(ModuleType::Mailbox, Params::new(), listener())?;
/// while manager.tick() {}
/// # Ok::<(), engine::module_manager::ModuleError>(())
/// ```
pub struct ModuleManager {
    registry: ModuleRegistry,
    window: Option<Box<dyn AppWindow>>,
    pub(crate) stack: Option<Box<dyn NavigationStack>>,

    pub(crate) modules: HashMap<ModuleId, ModuleRecord>,
    pub(crate) views: HashMap<ViewId, ViewRecord>,
    /// Stack item to the view whose content it carries.
    pub(crate) items: HashMap<ItemId, ViewId>,

    pub(crate) root: Option<ModuleId>,
    pub(crate) top: Option<ModuleId>,
    pub(crate) pop: PopScheduler,

    pub(crate) paused: bool,
    initialized: bool,
    next_id: u64,

    // Finalized while their hooks were running; destroy runs when the hook returns.
    pub(crate) retired_modules: HashSet<ModuleId>,
    pub(crate) retired_views: HashSet<ViewId>,
}

impl ModuleManager {
    pub fn new(registry: ModuleRegistry) -> Self {
        Self {
            registry,
            window: None,
            stack: None,
            modules: HashMap::new(),
            views: HashMap::new(),
            items: HashMap::new(),
            root: None,
            top: None,
            pop: PopScheduler::default(),
            paused: false,
            initialized: false,
            next_id: 0,
            retired_modules: HashSet::new(),
            retired_views: HashSet::new(),
        }
    }

    /// Takes ownership of the window and the navigation stack.
    ///
    /// The manager starts paused; call [`resume`](Self::resume) once the
    /// application is in the foreground.
    pub fn initialize(
        &mut self,
        window: Box<dyn AppWindow>,
        stack: Box<dyn NavigationStack>,
    ) -> ModuleResult<()> {
        if self.initialized {
            return reject(ModuleError::AlreadyInitialized);
        }

        self.window = Some(window);
        self.stack = Some(stack);
        self.paused = true;
        self.initialized = true;

        log::info!("Module manager initialized");
        Ok(())
    }

    /// Destroys the root module without a pop, drops the stack and resets
    /// every piece of state.
    pub fn finalize(&mut self) -> ModuleResult<()> {
        self.ensure_initialized()?;

        if let Some(root) = self.root {
            if let Err(e) = self.destroy_module_no_pop(root) {
                log::warn!("Root module teardown during finalize: {e}");
            }
        }

        let mut leftovers: Vec<ModuleId> = self.modules.keys().copied().collect();
        leftovers.sort();
        for id in leftovers {
            log::debug!("Finalizing leftover {id}");
            self.finalize_module(id, false);
        }

        if let Some(stack) = self.stack.as_deref_mut() {
            for item in stack.items() {
                stack.remove(item);
            }
        }

        self.stack = None;
        self.window = None;
        self.modules.clear();
        self.views.clear();
        self.items.clear();
        self.root = None;
        self.top = None;
        self.pop = PopScheduler::default();
        self.paused = false;
        self.initialized = false;

        log::info!("Module manager finalized");
        Ok(())
    }

    /// Moves the application to the background. No-op when already paused.
    pub fn pause(&mut self) -> ModuleResult<()> {
        self.ensure_initialized()?;
        if self.paused {
            return Ok(());
        }
        self.paused = true;
        log::debug!("Pausing module manager");

        self.mark_stacked_views(UpdateFlags::WAS_PAUSED);
        if let Some(view) = self.top_view() {
            self.deactivate_view(view, false);
            self.hide_view(view);
        }
        if let Some(root) = self.root {
            self.pause_tree(root);
        }
        Ok(())
    }

    /// Brings the application back. No-op when not paused.
    pub fn resume(&mut self) -> ModuleResult<()> {
        self.ensure_initialized()?;
        if !self.paused {
            return Ok(());
        }
        self.paused = false;
        log::debug!("Resuming module manager");

        if let Some(root) = self.root {
            self.resume_tree(root);
        }
        if let Some(view) = self.top_view() {
            self.show_view(view);
            self.update_view(view);
            if !self.pop.in_transition {
                self.activate_view(view);
            }
        }
        Ok(())
    }

    /// Delivers a structural event to every module not being destroyed and
    /// refreshes the top view when the event concerns views.
    pub fn send_event(&mut self, event: ModuleEvent) -> ModuleResult<()> {
        self.ensure_initialized()?;
        log::debug!("Sending event {event:?}");

        if let Some(root) = self.root {
            for id in self.subtree(root) {
                if self.module_state(id) == Some(ModuleState::Destroying) {
                    continue;
                }
                self.with_module_hooks(id, |module, manager| module.on_event(manager, id, event));
            }
        }

        let flags = event.update_flags();
        if !flags.is_empty() {
            self.mark_stacked_views(flags);
            if let Some(view) = self.top_view() {
                self.update_view(view);
            }
        }
        Ok(())
    }

    /// Runs the pending pop job, then handles queued stack notifications.
    /// Returns whether anything happened.
    pub fn tick(&mut self) -> bool {
        if !self.initialized {
            return false;
        }

        let mut progressed = false;
        if self.pop.job_queued {
            self.run_pop_job();
            progressed = true;
        }
        while let Some(notification) = self
            .stack
            .as_deref_mut()
            .and_then(|stack| stack.poll_notification())
        {
            progressed = true;
            self.dispatch_notification(notification);
        }
        progressed
    }

    /// Ticks until nothing happens or `max_ticks` is reached. Returns the
    /// number of productive ticks.
    pub fn run_until_idle(&mut self, max_ticks: usize) -> usize {
        let mut ticks = 0;
        while ticks < max_ticks && self.tick() {
            ticks += 1;
        }
        ticks
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_in_transition(&self) -> bool {
        self.pop.in_transition
    }

    pub fn is_in_compressed_mode(&self) -> bool {
        self.stack
            .as_deref()
            .is_some_and(|stack| stack.is_compressed())
    }

    pub fn pop_phase(&self) -> PopPhase {
        self.pop.phase()
    }

    pub fn root_module(&self) -> Option<ModuleId> {
        self.root
    }

    pub fn top_module(&self) -> Option<ModuleId> {
        self.top
    }

    pub fn module_ids(&self) -> Vec<ModuleId> {
        let mut ids: Vec<ModuleId> = self.modules.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn module_state(&self, id: ModuleId) -> Option<ModuleState> {
        self.modules.get(&id).map(|record| record.state)
    }

    pub fn module_type(&self, id: ModuleId) -> Option<ModuleType> {
        self.modules.get(&id).map(|record| record.module_type)
    }

    pub fn module_parent(&self, id: ModuleId) -> Option<ModuleId> {
        self.modules.get(&id).and_then(|record| record.parent)
    }

    pub fn module_children(&self, id: ModuleId) -> Vec<ModuleId> {
        self.modules
            .get(&id)
            .map(|record| record.children.clone())
            .unwrap_or_default()
    }

    /// Views of a module in creation order.
    pub fn module_views(&self, id: ModuleId) -> Vec<ViewId> {
        self.modules
            .get(&id)
            .map(|record| record.views.clone())
            .unwrap_or_default()
    }

    pub fn view_state(&self, id: ViewId) -> Option<ViewState> {
        self.views.get(&id).map(|record| record.state)
    }

    pub fn view_visible(&self, id: ViewId) -> Option<bool> {
        self.views.get(&id).map(|record| record.visible)
    }

    pub fn view_item(&self, id: ViewId) -> Option<ItemId> {
        self.views.get(&id).and_then(|record| record.item)
    }

    pub fn view_module(&self, id: ViewId) -> Option<ModuleId> {
        self.views.get(&id).map(|record| record.module)
    }

    pub fn view_orientation(&self, id: ViewId) -> Option<Orientation> {
        self.views.get(&id).map(|record| record.orientation)
    }

    pub fn view_for_item(&self, item: ItemId) -> Option<ViewId> {
        self.items.get(&item).copied()
    }

    /// View carried by the current top stack item.
    pub fn top_view(&self) -> Option<ViewId> {
        self.top_item().and_then(|item| self.view_for_item(item))
    }

    pub(crate) fn ensure_initialized(&self) -> ModuleResult<()> {
        if self.initialized {
            Ok(())
        } else {
            reject(ModuleError::NotInitialized)
        }
    }

    pub(crate) fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    pub(crate) fn next_module_id(&mut self) -> ModuleId {
        self.next_id += 1;
        ModuleId(self.next_id)
    }

    pub(crate) fn next_view_id(&mut self) -> ViewId {
        self.next_id += 1;
        ViewId(self.next_id)
    }

    pub(crate) fn window_rotation(&self) -> Orientation {
        self.window
            .as_deref()
            .map(|window| window.rotation())
            .unwrap_or_default()
    }

    pub(crate) fn top_item(&self) -> Option<ItemId> {
        self.stack.as_deref().and_then(|stack| stack.top_item())
    }

    pub(crate) fn stack_items(&self) -> Vec<ItemId> {
        self.stack
            .as_deref()
            .map(|stack| stack.items())
            .unwrap_or_default()
    }

    /// Item right below `item` on the stack.
    pub(crate) fn item_below(&self, item: ItemId) -> Option<ItemId> {
        let items = self.stack_items();
        let position = items.iter().position(|candidate| *candidate == item)?;
        position.checked_sub(1).map(|below| items[below])
    }

    /// Adds update flags to every view that currently has a stack item.
    pub(crate) fn mark_stacked_views(&mut self, flags: UpdateFlags) {
        for item in self.stack_items() {
            let Some(view) = self.items.get(&item).copied() else {
                continue;
            };
            if let Some(record) = self.views.get_mut(&view) {
                record.update_flags |= flags;
            }
        }
    }

    /// The module followed by all its descendants, children first.
    pub(crate) fn subtree(&self, id: ModuleId) -> Vec<ModuleId> {
        let mut order = Vec::new();
        self.collect_subtree(id, &mut order);
        order
    }

    fn collect_subtree(&self, id: ModuleId, order: &mut Vec<ModuleId>) {
        let Some(record) = self.modules.get(&id) else {
            return;
        };
        for child in &record.children {
            self.collect_subtree(*child, order);
        }
        order.push(id);
    }

    fn pause_tree(&mut self, root: ModuleId) {
        if self.module_state(root) != Some(ModuleState::Running) {
            return;
        }
        for id in self.subtree(root) {
            let Some(record) = self.modules.get_mut(&id) else {
                continue;
            };
            if record.state != ModuleState::Running {
                continue;
            }
            record.state = ModuleState::Paused;
            self.with_module_hooks(id, |module, manager| module.pause(manager, id));
        }
    }

    fn resume_tree(&mut self, root: ModuleId) {
        if self.module_state(root) != Some(ModuleState::Paused) {
            return;
        }
        for id in self.subtree(root) {
            let Some(record) = self.modules.get_mut(&id) else {
                continue;
            };
            if record.state != ModuleState::Paused {
                continue;
            }
            record.state = ModuleState::Running;
            self.with_module_hooks(id, |module, manager| module.resume(manager, id));
        }
    }

    /// Calls into a module's hooks with its slot emptied for the duration.
    ///
    /// Returns `None` when the module is unknown or one of its hooks is
    /// already running.
    pub(crate) fn with_module_hooks<R>(
        &mut self,
        id: ModuleId,
        call: impl FnOnce(&mut dyn Module, &mut ModuleManager) -> R,
    ) -> Option<R> {
        let mut hooks = self.modules.get_mut(&id)?.hooks.take()?;
        let result = call(hooks.as_mut(), self);

        match self.modules.get_mut(&id) {
            Some(record) => record.hooks = Some(hooks),
            None => {
                if self.retired_modules.remove(&id) {
                    hooks.destroy(self, id);
                }
            }
        }
        Some(result)
    }

    pub(crate) fn with_view_hooks<R>(
        &mut self,
        id: ViewId,
        call: impl FnOnce(&mut dyn View, &mut ModuleManager) -> R,
    ) -> Option<R> {
        let mut hooks = self.views.get_mut(&id)?.hooks.take()?;
        let result = call(hooks.as_mut(), self);

        match self.views.get_mut(&id) {
            Some(record) => record.hooks = Some(hooks),
            None => {
                if self.retired_views.remove(&id) {
                    hooks.destroy(self, id);
                }
            }
        }
        Some(result)
    }
}
