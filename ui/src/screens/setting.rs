use super::{PanelView, Surface, action};
use engine::module_manager::{
    Module, ModuleError, ModuleId, ModuleManager, ModuleResult, PushFlags,
};
use engine::params::Params;

const ACCOUNTS: [(&str, &str); 2] = [
    ("Work", "imap.work.example.com"),
    ("Personal", "imap.home.example.com"),
];

#[derive(Default)]
pub struct SettingModule;

impl Module for SettingModule {
    fn create(
        &mut self,
        manager: &mut ModuleManager,
        id: ModuleId,
        _params: &Params,
    ) -> ModuleResult<()> {
        let lines = ACCOUNTS
            .iter()
            .enumerate()
            .map(|(index, (name, _))| format!("{}. {name}", index + 1))
            .collect();
        manager.create_view(id, PanelView::new(Surface::new("Settings", lines)).boxed())?;
        Ok(())
    }

    fn on_message(
        &mut self,
        manager: &mut ModuleManager,
        id: ModuleId,
        message: &Params,
    ) -> ModuleResult<()> {
        match action(message) {
            "account" => {
                let index = message.get_i64("id").unwrap_or(1).max(1) as usize - 1;
                let Some((name, server)) = ACCOUNTS.get(index) else {
                    return Err(ModuleError::Rejected(format!("no account #{}", index + 1)));
                };
                // Detail pages slide in without a title bar of their own.
                let page = PanelView::new(Surface::new(
                    *name,
                    vec![format!("Server: {server}"), "Sync: every 15 min".to_string()],
                ))
                .with_flags(PushFlags::NO_TITLE);
                manager.create_view(id, page.boxed())?;
                Ok(())
            }
            other => Err(ModuleError::Rejected(format!(
                "the settings screen cannot '{other}'"
            ))),
        }
    }
}
