use super::{ChildListener, Outbox, PanelView, Surface, action};
use engine::module_manager::{
    Module, ModuleError, ModuleEvent, ModuleId, ModuleManager, ModuleResult, ModuleType,
};
use engine::params::Params;

/// A message in the demo inbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InboxMessage {
    pub id: i64,
    pub from: &'static str,
    pub subject: &'static str,
    pub body: &'static str,
}

pub const INBOX: [InboxMessage; 3] = [
    InboxMessage {
        id: 1,
        from: "alice@example.com",
        subject: "Quarterly report",
        body: "Numbers are in the attached sheet.",
    },
    InboxMessage {
        id: 2,
        from: "bob@example.com",
        subject: "Lunch?",
        body: "Noodles at noon?",
    },
    InboxMessage {
        id: 3,
        from: "carol@example.com",
        subject: "Build is green",
        body: "Release branch passes again.",
    },
];

pub fn find_message(id: i64) -> Option<&'static InboxMessage> {
    INBOX.iter().find(|message| message.id == id)
}

/// Root screen. Lists the inbox and opens the other screens as children.
pub struct MailboxModule {
    outbox: Outbox,
}

impl MailboxModule {
    pub fn new(outbox: Outbox) -> Self {
        Self { outbox }
    }

    fn open_child(
        &self,
        manager: &mut ModuleManager,
        id: ModuleId,
        module_type: ModuleType,
        params: Params,
    ) -> ModuleResult<()> {
        let listener = ChildListener::shared("screen", self.outbox.clone());
        let child = manager.create_child_module(id, module_type, params, listener)?;
        log::info!("Mailbox opened {module_type} screen {child}");
        Ok(())
    }
}

impl Module for MailboxModule {
    fn create(
        &mut self,
        manager: &mut ModuleManager,
        id: ModuleId,
        params: &Params,
    ) -> ModuleResult<()> {
        let folder = params.get_str("folder").unwrap_or("Inbox");
        let lines = INBOX
            .iter()
            .map(|message| format!("{}. {:<20} {}", message.id, message.from, message.subject))
            .collect();
        manager.create_view(id, PanelView::new(Surface::new(folder, lines)).boxed())?;
        Ok(())
    }

    fn pause(&mut self, _manager: &mut ModuleManager, id: ModuleId) {
        log::info!("Mailbox {id} stops syncing");
    }

    fn resume(&mut self, _manager: &mut ModuleManager, id: ModuleId) {
        log::info!("Mailbox {id} resumes syncing");
    }

    fn on_message(
        &mut self,
        manager: &mut ModuleManager,
        id: ModuleId,
        message: &Params,
    ) -> ModuleResult<()> {
        match action(message) {
            "open" => {
                let wanted = message.get_i64("id").unwrap_or_default();
                let Some(found) = find_message(wanted) else {
                    return Err(ModuleError::Rejected(format!("no message #{wanted}")));
                };
                let params = Params::new()
                    .with("id", found.id)
                    .with("from", found.from)
                    .with("subject", found.subject)
                    .with("body", found.body);
                self.open_child(manager, id, ModuleType::Viewer, params)
            }
            "compose" => self.open_child(manager, id, ModuleType::Composer, Params::new()),
            "settings" => self.open_child(manager, id, ModuleType::Setting, Params::new()),
            "filter" => self.open_child(manager, id, ModuleType::Filter, Params::new()),
            other => Err(ModuleError::Rejected(format!(
                "the mailbox cannot '{other}'"
            ))),
        }
    }

    fn on_event(&mut self, _manager: &mut ModuleManager, id: ModuleId, event: ModuleEvent) {
        match event {
            ModuleEvent::LowMemorySoft | ModuleEvent::LowMemoryHard => {
                log::info!("Mailbox {id} drops cached message bodies");
            }
            ModuleEvent::LowBattery => log::info!("Mailbox {id} slows down background sync"),
            _ => {}
        }
    }
}
