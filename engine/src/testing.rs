//! Scripted screens for exercising the module manager.
//!
//! Every hook call is appended to a shared [`Recorder`], so a test can
//! assert on the exact sequence of lifecycle events.

use crate::module_manager::{
    Module, ModuleError, ModuleEvent, ModuleId, ModuleListener, ModuleManager, ModuleRegistry,
    ModuleResult, PushFlags, UpdateFlags, View, ViewId, ViewState,
};
use crate::navigation::{Content, DestroyOrder, SimulatedStack, SimulatedWindow, StackHandle};
use crate::params::Params;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recorded {
    ModuleCreated(String),
    ModuleDestroyed(String),
    ModulePaused(String),
    ModuleResumed(String),
    ModuleEvent(String, ModuleEvent),
    Message(String),
    ViewCreated(String),
    ViewDestroyed(String),
    Activated(String, ViewState),
    Deactivated(String),
    Shown(String),
    Hidden(String),
    Updated(String, UpdateFlags),
    Back(String),
    ResultDelivered(String),
    DestroyRequested(String),
    DestroyCompleted(String),
}

/// Shared, append-only log of [`Recorded`] events.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    events: Rc<RefCell<Vec<Recorded>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, event: Recorded) {
        self.events.borrow_mut().push(event);
    }

    pub fn events(&self) -> Vec<Recorded> {
        self.events.borrow().clone()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }

    pub fn contains(&self, event: &Recorded) -> bool {
        self.events.borrow().contains(event)
    }

    pub fn count(&self, event: &Recorded) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|recorded| *recorded == event)
            .count()
    }

    pub fn position(&self, event: &Recorded) -> Option<usize> {
        self.events
            .borrow()
            .iter()
            .position(|recorded| recorded == event)
    }
}

/// View that assigns content, pushes itself and records every hook.
pub struct ScriptedView {
    name: String,
    recorder: Recorder,
    flags: PushFlags,
    content: Option<Content>,
    assign_content: bool,
    push: bool,
    fail: bool,
    fail_after_push: bool,
    exit_on_back: bool,
}

impl ScriptedView {
    pub fn new(name: impl Into<String>, recorder: Recorder) -> Self {
        Self {
            name: name.into(),
            recorder,
            flags: PushFlags::NONE,
            content: None,
            assign_content: true,
            push: true,
            fail: false,
            fail_after_push: false,
            exit_on_back: true,
        }
    }

    pub fn with_flags(mut self, flags: PushFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Uses the given surface instead of a fresh one.
    pub fn with_content(mut self, content: Content) -> Self {
        self.content = Some(content);
        self
    }

    pub fn without_content(mut self) -> Self {
        self.assign_content = false;
        self
    }

    pub fn without_push(mut self) -> Self {
        self.push = false;
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Pushes its item, then fails creation.
    pub fn failing_after_push(mut self) -> Self {
        self.fail_after_push = true;
        self
    }

    pub fn ignoring_back(mut self) -> Self {
        self.exit_on_back = false;
        self
    }

    pub fn boxed(self) -> Box<dyn View> {
        Box::new(self)
    }
}

impl View for ScriptedView {
    fn create(&mut self, manager: &mut ModuleManager, id: ViewId) -> ModuleResult<()> {
        if self.fail {
            return Err(ModuleError::Rejected(format!("{} refused to build", self.name)));
        }
        if self.assign_content {
            let content = self
                .content
                .clone()
                .unwrap_or_else(|| Content::new(self.name.clone()));
            manager.set_view_content(id, content)?;
        }
        if self.push {
            manager.push_view(id, &self.name, self.flags)?;
        }
        if self.fail_after_push {
            return Err(ModuleError::Rejected(format!("{} failed after pushing", self.name)));
        }
        self.recorder.record(Recorded::ViewCreated(self.name.clone()));
        Ok(())
    }

    fn destroy(&mut self, _manager: &mut ModuleManager, _id: ViewId) {
        self.recorder
            .record(Recorded::ViewDestroyed(self.name.clone()));
    }

    fn activate(&mut self, _manager: &mut ModuleManager, _id: ViewId, previous: ViewState) {
        self.recorder
            .record(Recorded::Activated(self.name.clone(), previous));
    }

    fn deactivate(&mut self, _manager: &mut ModuleManager, _id: ViewId) {
        self.recorder.record(Recorded::Deactivated(self.name.clone()));
    }

    fn show(&mut self, _manager: &mut ModuleManager, _id: ViewId) {
        self.recorder.record(Recorded::Shown(self.name.clone()));
    }

    fn hide(&mut self, _manager: &mut ModuleManager, _id: ViewId) {
        self.recorder.record(Recorded::Hidden(self.name.clone()));
    }

    fn update(&mut self, _manager: &mut ModuleManager, _id: ViewId, flags: UpdateFlags) {
        self.recorder
            .record(Recorded::Updated(self.name.clone(), flags));
    }

    fn on_back(&mut self, manager: &mut ModuleManager, id: ViewId) {
        self.recorder.record(Recorded::Back(self.name.clone()));
        if self.exit_on_back {
            if let Err(e) = manager.exit_view(id) {
                log::debug!("{} could not exit: {e}", self.name);
            }
        }
    }
}

type CreateScript = Box<dyn FnMut(&mut ModuleManager, ModuleId) -> ModuleResult<()>>;
type MessageScript = Box<dyn FnMut(&mut ModuleManager, ModuleId, &Params) -> ModuleResult<()>>;

/// Module that creates `views` scripted views named `<name>1`, `<name>2`, ...
/// and records every hook.
pub struct ScriptedModule {
    name: String,
    recorder: Recorder,
    views: usize,
    fail: bool,
    on_create: Option<CreateScript>,
    on_message: Option<MessageScript>,
}

impl ScriptedModule {
    pub fn new(name: impl Into<String>, recorder: Recorder) -> Self {
        Self {
            name: name.into(),
            recorder,
            views: 1,
            fail: false,
            on_create: None,
            on_message: None,
        }
    }

    pub fn with_views(mut self, count: usize) -> Self {
        self.views = count;
        self
    }

    /// Fails creation after building its views.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Extra work done at the end of creation.
    pub fn on_create<F>(mut self, script: F) -> Self
    where
        F: FnMut(&mut ModuleManager, ModuleId) -> ModuleResult<()> + 'static,
    {
        self.on_create = Some(Box::new(script));
        self
    }

    pub fn on_message<F>(mut self, script: F) -> Self
    where
        F: FnMut(&mut ModuleManager, ModuleId, &Params) -> ModuleResult<()> + 'static,
    {
        self.on_message = Some(Box::new(script));
        self
    }

    pub fn boxed(self) -> Box<dyn Module> {
        Box::new(self)
    }
}

impl Module for ScriptedModule {
    fn create(
        &mut self,
        manager: &mut ModuleManager,
        id: ModuleId,
        _params: &Params,
    ) -> ModuleResult<()> {
        for index in 1..=self.views {
            let view = ScriptedView::new(format!("{}{index}", self.name), self.recorder.clone());
            manager.create_view(id, view.boxed())?;
        }
        if self.fail {
            return Err(ModuleError::Rejected(format!("{} refused to start", self.name)));
        }
        if let Some(script) = self.on_create.as_mut() {
            script(manager, id)?;
        }
        self.recorder
            .record(Recorded::ModuleCreated(self.name.clone()));
        Ok(())
    }

    fn destroy(&mut self, _manager: &mut ModuleManager, _id: ModuleId) {
        self.recorder
            .record(Recorded::ModuleDestroyed(self.name.clone()));
    }

    fn pause(&mut self, _manager: &mut ModuleManager, _id: ModuleId) {
        self.recorder
            .record(Recorded::ModulePaused(self.name.clone()));
    }

    fn resume(&mut self, _manager: &mut ModuleManager, _id: ModuleId) {
        self.recorder
            .record(Recorded::ModuleResumed(self.name.clone()));
    }

    fn on_message(
        &mut self,
        manager: &mut ModuleManager,
        id: ModuleId,
        message: &Params,
    ) -> ModuleResult<()> {
        self.recorder.record(Recorded::Message(self.name.clone()));
        match self.on_message.as_mut() {
            Some(script) => script(manager, id, message),
            None => Err(ModuleError::MessageNotSupported(id)),
        }
    }

    fn on_event(&mut self, _manager: &mut ModuleManager, _id: ModuleId, event: ModuleEvent) {
        self.recorder
            .record(Recorded::ModuleEvent(self.name.clone(), event));
    }
}

/// Listener that records callbacks and optionally honours destroy requests.
pub struct RecordingListener {
    name: String,
    recorder: Recorder,
    destroy_on_request: bool,
}

impl RecordingListener {
    pub fn new(name: impl Into<String>, recorder: Recorder) -> Self {
        Self {
            name: name.into(),
            recorder,
            destroy_on_request: false,
        }
    }

    /// Destroys the module as soon as it asks for it.
    pub fn destroying(mut self) -> Self {
        self.destroy_on_request = true;
        self
    }

    pub fn shared(self) -> Rc<dyn ModuleListener> {
        Rc::new(self)
    }
}

impl ModuleListener for RecordingListener {
    fn on_result(&self, _manager: &mut ModuleManager, _module: ModuleId, _result: &Params) {
        self.recorder
            .record(Recorded::ResultDelivered(self.name.clone()));
    }

    fn on_destroy_request(&self, manager: &mut ModuleManager, module: ModuleId) {
        self.recorder
            .record(Recorded::DestroyRequested(self.name.clone()));
        if self.destroy_on_request {
            if let Err(e) = manager.destroy_module(module) {
                log::debug!("Destroying {} on request failed: {e}", self.name);
            }
        }
    }

    fn on_destroy_completed(&self, _manager: &mut ModuleManager, _module: ModuleId) {
        self.recorder
            .record(Recorded::DestroyCompleted(self.name.clone()));
    }
}

/// An initialized, resumed manager over a [`SimulatedStack`] whose
/// animations complete only when told to.
pub struct Harness {
    pub manager: ModuleManager,
    pub stack: StackHandle,
    pub window: SimulatedWindow,
    pub recorder: Recorder,
}

impl Harness {
    pub fn new(registry: ModuleRegistry, recorder: Recorder) -> ModuleResult<Self> {
        Self::with_destroy_order(registry, recorder, DestroyOrder::default())
    }

    pub fn with_destroy_order(
        registry: ModuleRegistry,
        recorder: Recorder,
        order: DestroyOrder,
    ) -> ModuleResult<Self> {
        let stack = SimulatedStack::new().with_destroy_order(order);
        let handle = stack.handle();
        let window = SimulatedWindow::new();

        let mut manager = ModuleManager::new(registry);
        manager.initialize(Box::new(window.clone()), Box::new(stack))?;
        manager.resume()?;

        Ok(Self {
            manager,
            stack: handle,
            window,
            recorder,
        })
    }

    /// Runs ticks and completes animations until nothing is left to do.
    pub fn settle(&mut self) {
        for _ in 0..64 {
            self.manager.run_until_idle(64);
            if !self.stack.complete_transition() {
                break;
            }
        }
    }

    /// Completes the running animation, if any, and handles its notices.
    pub fn finish_transition(&mut self) -> bool {
        let completed = self.stack.complete_transition();
        self.manager.run_until_idle(64);
        completed
    }
}
