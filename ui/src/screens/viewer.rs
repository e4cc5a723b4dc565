use super::{ChildListener, Outbox, PanelView, Surface, action};
use engine::module_manager::{Module, ModuleError, ModuleId, ModuleManager, ModuleResult, ModuleType};
use engine::params::Params;

/// Reads one message. Replying opens a composer on top.
pub struct ViewerModule {
    outbox: Outbox,
    from: String,
    subject: String,
}

impl ViewerModule {
    pub fn new(outbox: Outbox) -> Self {
        Self {
            outbox,
            from: String::new(),
            subject: String::new(),
        }
    }
}

impl Module for ViewerModule {
    fn create(
        &mut self,
        manager: &mut ModuleManager,
        id: ModuleId,
        params: &Params,
    ) -> ModuleResult<()> {
        let Some(message) = params.get_i64("id") else {
            return Err(ModuleError::Rejected("viewer needs a message id".to_string()));
        };
        self.from = params.get_str("from").unwrap_or_default().to_string();
        self.subject = params.get_str("subject").unwrap_or_default().to_string();

        let surface = Surface::new(
            format!("Message #{message}"),
            vec![
                format!("From: {}", self.from),
                format!("Subject: {}", self.subject),
                String::new(),
                params.get_str("body").unwrap_or_default().to_string(),
            ],
        );
        manager.create_view(id, PanelView::new(surface).boxed())?;
        Ok(())
    }

    fn on_message(
        &mut self,
        manager: &mut ModuleManager,
        id: ModuleId,
        message: &Params,
    ) -> ModuleResult<()> {
        match action(message) {
            "reply" => {
                let params = Params::new()
                    .with("to", self.from.as_str())
                    .with("subject", format!("Re: {}", self.subject));
                let listener = ChildListener::shared("reply", self.outbox.clone());
                manager.create_child_module(id, ModuleType::Composer, params, listener)?;
                Ok(())
            }
            other => Err(ModuleError::Rejected(format!(
                "the message viewer cannot '{other}'"
            ))),
        }
    }
}
