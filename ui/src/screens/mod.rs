//! # Screens Module
//!
//! The concrete screens of the navmail shell. Each screen is an engine
//! [`Module`](engine::module_manager::Module) registered under its
//! [`ModuleType`]; none of them knows about the others beyond asking the
//! manager to create a child of a given type.
//!
//! ## Screens
//!
//! - [`mailbox`] - Root screen listing the inbox, opens every other screen
//! - [`viewer`] - A single message, can start a reply
//! - [`composer`] - Message editor with an optional attachments page
//! - [`setting`] - Account settings with a per-account detail page
//! - [`filter`] - Filter list with an editor page
//!
//! Every page on the stack is a [`PanelView`] carrying a [`Surface`].

use engine::module_manager::{
    ModuleId, ModuleListener, ModuleManager, ModuleRegistry, ModuleResult, ModuleType, PushFlags,
    UpdateFlags, View, ViewId, ViewState,
};
use engine::navigation::Content;
use engine::params::Params;
use std::cell::RefCell;
use std::rc::Rc;

/// Message editor with an attachments page
pub mod composer;
/// Filter list with an editor page
pub mod filter;
/// Root inbox screen
pub mod mailbox;
/// Account settings with a per-account detail page
pub mod setting;
/// Single message reader
pub mod viewer;

pub use composer::ComposerModule;
pub use filter::FilterModule;
pub use mailbox::MailboxModule;
pub use setting::SettingModule;
pub use viewer::ViewerModule;

/// What a page shows. Carried on the navigation stack as the item's content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
    pub title: String,
    pub lines: Vec<String>,
}

impl Surface {
    pub fn new(title: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            title: title.into(),
            lines,
        }
    }

    pub fn render(&self) -> String {
        let mut rendered = format!("[{}]", self.title);
        for line in &self.lines {
            rendered.push_str("\n  ");
            rendered.push_str(line);
        }
        rendered
    }
}

/// Subjects of messages sent during the session.
#[derive(Debug, Clone, Default)]
pub struct Outbox {
    sent: Rc<RefCell<Vec<String>>>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, subject: impl Into<String>) {
        self.sent.borrow_mut().push(subject.into());
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.borrow().clone()
    }
}

/// A stack page that shows a fixed [`Surface`] and leaves on back.
pub struct PanelView {
    surface: Surface,
    flags: PushFlags,
}

impl PanelView {
    pub fn new(surface: Surface) -> Self {
        Self {
            surface,
            flags: PushFlags::NONE,
        }
    }

    pub fn with_flags(mut self, flags: PushFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn boxed(self) -> Box<dyn View> {
        Box::new(self)
    }
}

impl View for PanelView {
    fn create(&mut self, manager: &mut ModuleManager, id: ViewId) -> ModuleResult<()> {
        manager.set_view_content(id, Content::new(self.surface.clone()))?;
        manager.push_view(id, &self.surface.title, self.flags)?;
        Ok(())
    }

    fn destroy(&mut self, _manager: &mut ModuleManager, id: ViewId) {
        log::debug!("Closed page '{}' ({id})", self.surface.title);
    }

    fn activate(&mut self, _manager: &mut ModuleManager, id: ViewId, previous: ViewState) {
        log::debug!(
            "Page '{}' ({id}) active, was {previous:?}",
            self.surface.title
        );
    }

    fn update(&mut self, _manager: &mut ModuleManager, id: ViewId, flags: UpdateFlags) {
        if flags.contains(UpdateFlags::LANGUAGE_CHANGED) {
            log::info!("Re-translating page '{}' ({id})", self.surface.title);
        }
        if flags.contains(UpdateFlags::ORIENTATION_CHANGED) {
            log::info!("Re-laying out page '{}' ({id})", self.surface.title);
        }
    }

    fn on_back(&mut self, manager: &mut ModuleManager, id: ViewId) {
        if let Err(e) = manager.exit_view(id) {
            log::warn!("Page '{}' could not close: {e}", self.surface.title);
        }
    }
}

/// Listener a screen installs on the children it opens: closes the child
/// when it asks and files sent messages in the outbox.
pub struct ChildListener {
    label: &'static str,
    outbox: Outbox,
}

impl ChildListener {
    pub fn shared(label: &'static str, outbox: Outbox) -> Rc<dyn ModuleListener> {
        Rc::new(Self { label, outbox })
    }
}

impl ModuleListener for ChildListener {
    fn on_result(&self, _manager: &mut ModuleManager, module: ModuleId, result: &Params) {
        if let Some(subject) = result.get_str("sent") {
            log::info!("{} {module} sent '{subject}'", self.label);
            self.outbox.record(subject);
        }
    }

    fn on_destroy_request(&self, manager: &mut ModuleManager, module: ModuleId) {
        if let Err(e) = manager.destroy_module(module) {
            log::warn!("Could not close {} {module}: {e}", self.label);
        }
    }

    fn on_destroy_completed(&self, _manager: &mut ModuleManager, module: ModuleId) {
        log::debug!("{} {module} closed", self.label);
    }
}

/// The `action` a screen message carries.
pub fn action(message: &Params) -> &str {
    message.get_str("action").unwrap_or_default()
}

/// Registry with every screen of the shell.
pub fn registry(outbox: &Outbox) -> ModuleRegistry {
    let mailbox_outbox = outbox.clone();
    let viewer_outbox = outbox.clone();
    ModuleRegistry::new()
        .with(ModuleType::Mailbox, move || {
            Box::new(MailboxModule::new(mailbox_outbox.clone()))
        })
        .with(ModuleType::Viewer, move || {
            Box::new(ViewerModule::new(viewer_outbox.clone()))
        })
        .with(ModuleType::Composer, || Box::new(ComposerModule::default()))
        .with(ModuleType::Setting, || Box::new(SettingModule::default()))
        .with(ModuleType::Filter, || Box::new(FilterModule::default()))
}
