use super::errors::{ModuleError, ModuleResult};
use super::manager::ModuleManager;
use super::types::{ModuleEvent, ModuleId, UpdateFlags, ViewId, ViewState};
use crate::params::Params;

/// Controller of one logical screen flow.
///
/// Every hook receives the manager and the module's own handle so it can
/// create views and child modules, send results or ask to be closed. Hooks
/// run with the module's slot temporarily emptied; a module finalized from
/// inside one of its own hooks gets [`destroy`](Module::destroy) as soon as
/// that hook returns.
pub trait Module {
    /// Builds the module's first view(s). Failing here rolls the module back.
    fn create(
        &mut self,
        manager: &mut ModuleManager,
        id: ModuleId,
        params: &Params,
    ) -> ModuleResult<()>;

    fn destroy(&mut self, _manager: &mut ModuleManager, _id: ModuleId) {}

    fn pause(&mut self, _manager: &mut ModuleManager, _id: ModuleId) {}

    fn resume(&mut self, _manager: &mut ModuleManager, _id: ModuleId) {}

    fn on_message(
        &mut self,
        _manager: &mut ModuleManager,
        id: ModuleId,
        _message: &Params,
    ) -> ModuleResult<()> {
        Err(ModuleError::MessageNotSupported(id))
    }

    fn on_event(&mut self, _manager: &mut ModuleManager, _id: ModuleId, _event: ModuleEvent) {}
}

/// One pushed page of a module.
///
/// [`create`](View::create) must assign content with
/// [`ModuleManager::set_view_content`] and push it with
/// [`ModuleManager::push_view`] before returning.
pub trait View {
    fn create(&mut self, manager: &mut ModuleManager, id: ViewId) -> ModuleResult<()>;

    fn destroy(&mut self, _manager: &mut ModuleManager, _id: ViewId) {}

    /// The view became interactive; `previous` is CREATED or NOT_ACTIVE.
    fn activate(&mut self, _manager: &mut ModuleManager, _id: ViewId, _previous: ViewState) {}

    fn deactivate(&mut self, _manager: &mut ModuleManager, _id: ViewId) {}

    fn show(&mut self, _manager: &mut ModuleManager, _id: ViewId) {}

    fn hide(&mut self, _manager: &mut ModuleManager, _id: ViewId) {}

    fn update(&mut self, _manager: &mut ModuleManager, _id: ViewId, _flags: UpdateFlags) {}

    fn on_back(&mut self, _manager: &mut ModuleManager, _id: ViewId) {}
}

/// Callbacks supplied by whoever created a module.
///
/// Listeners of modules swept up in a parent's destruction are dropped and
/// never called again; only the module targeted by the destroy call keeps
/// its listener until [`on_destroy_completed`](ModuleListener::on_destroy_completed).
pub trait ModuleListener {
    fn on_result(&self, _manager: &mut ModuleManager, _module: ModuleId, _result: &Params) {}

    /// The module asked to be closed, usually because its last view exited.
    fn on_destroy_request(&self, _manager: &mut ModuleManager, _module: ModuleId) {}

    fn on_destroy_completed(&self, _manager: &mut ModuleManager, _module: ModuleId) {}
}
