use super::{PanelView, Surface, action};
use engine::module_manager::{Module, ModuleError, ModuleId, ModuleManager, ModuleResult};
use engine::params::Params;

/// Message editor. Sending reports the subject to the opener and asks to be
/// closed.
#[derive(Default)]
pub struct ComposerModule {
    to: String,
    subject: String,
    attachments: usize,
}

impl Module for ComposerModule {
    fn create(
        &mut self,
        manager: &mut ModuleManager,
        id: ModuleId,
        params: &Params,
    ) -> ModuleResult<()> {
        self.to = params.get_str("to").unwrap_or_default().to_string();
        self.subject = params.get_str("subject").unwrap_or("(no subject)").to_string();

        let title = if self.to.is_empty() {
            "New message".to_string()
        } else {
            self.subject.clone()
        };
        let surface = Surface::new(
            title,
            vec![
                format!("To: {}", self.to),
                format!("Subject: {}", self.subject),
            ],
        );
        manager.create_view(id, PanelView::new(surface).boxed())?;
        Ok(())
    }

    fn destroy(&mut self, _manager: &mut ModuleManager, id: ModuleId) {
        log::debug!("Composer {id} discarded its draft");
    }

    fn on_message(
        &mut self,
        manager: &mut ModuleManager,
        id: ModuleId,
        message: &Params,
    ) -> ModuleResult<()> {
        match action(message) {
            "attach" => {
                self.attachments += 1;
                let surface = Surface::new(
                    "Attachments",
                    vec![format!("{} file(s) attached", self.attachments)],
                );
                manager.create_view(id, PanelView::new(surface).boxed())?;
                Ok(())
            }
            "send" => {
                let result = Params::new()
                    .with("sent", self.subject.as_str())
                    .with("to", self.to.as_str())
                    .with("attachments", self.attachments as i64);
                manager.send_result(id, &result)?;
                manager.make_destroy_request(id)
            }
            other => Err(ModuleError::Rejected(format!(
                "the composer cannot '{other}'"
            ))),
        }
    }
}
