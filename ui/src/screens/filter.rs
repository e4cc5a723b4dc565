use super::{PanelView, Surface, action};
use engine::module_manager::{Module, ModuleError, ModuleId, ModuleManager, ModuleResult};
use engine::params::Params;

/// Filter list with an editor page. Saving closes the editor.
#[derive(Default)]
pub struct FilterModule {
    saved: usize,
}

impl Module for FilterModule {
    fn create(
        &mut self,
        manager: &mut ModuleManager,
        id: ModuleId,
        _params: &Params,
    ) -> ModuleResult<()> {
        let surface = Surface::new("Filters", vec!["From newsletters -> Archive".to_string()]);
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
            "add" => {
                let surface = Surface::new(
                    "New filter",
                    vec!["When: sender matches".to_string(), "Then: move to folder".to_string()],
                );
                manager.create_view(id, PanelView::new(surface).boxed())?;
                Ok(())
            }
            "save" => {
                let views = manager.module_views(id);
                let [_, .., editor] = views.as_slice() else {
                    return Err(ModuleError::Rejected("no filter is being edited".to_string()));
                };
                manager.exit_view(*editor)?;
                self.saved += 1;
                log::info!("Filter screen {id} saved filter #{}", self.saved);
                Ok(())
            }
            other => Err(ModuleError::Rejected(format!(
                "the filter screen cannot '{other}'"
            ))),
        }
    }
}
