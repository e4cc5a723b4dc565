use super::errors::{ModuleError, ModuleResult, reject};
use super::hooks::ModuleListener;
use super::manager::{ModuleManager, ModuleRecord};
use super::types::{ItemId, ModuleId, ModuleState, ModuleType};
use crate::params::Params;
use std::rc::Rc;

impl ModuleManager {
    /// Creates the root module. Fails if a root already exists.
    pub fn create_root_module(
        &mut self,
        module_type: ModuleType,
        params: Params,
        listener: Rc<dyn ModuleListener>,
    ) -> ModuleResult<ModuleId> {
        self.create_module(module_type, params, listener, None)
    }

    /// Creates a child of `parent`, which must be the topmost module, own at
    /// least one view and have no live child.
    ///
    /// When `parent`'s previous child is still being destroyed, the new child
    /// takes over that child's anchor so its views land where the old ones were.
    pub fn create_child_module(
        &mut self,
        parent: ModuleId,
        module_type: ModuleType,
        params: Params,
        listener: Rc<dyn ModuleListener>,
    ) -> ModuleResult<ModuleId> {
        self.create_module(module_type, params, listener, Some(parent))
    }

    /// Destroys a module and its subtree, animating back to the module's
    /// anchor unless the application is paused.
    pub fn destroy_module(&mut self, id: ModuleId) -> ModuleResult<()> {
        let use_pop = !self.paused;
        self.destroy_module_with(id, use_pop)
    }

    /// Destroys a module without animating, unless a transition is already
    /// running, in which case the pop is used anyway.
    pub fn destroy_module_no_pop(&mut self, id: ModuleId) -> ModuleResult<()> {
        self.destroy_module_with(id, false)
    }

    pub fn send_message(&mut self, id: ModuleId, message: &Params) -> ModuleResult<()> {
        let Some(record) = self.modules.get(&id) else {
            return reject(ModuleError::UnknownModule(id));
        };
        if record.state == ModuleState::Destroying {
            return reject(ModuleError::ModuleDestroying(id));
        }

        match self.with_module_hooks(id, |module, manager| {
            module.on_message(manager, id, message)
        }) {
            Some(result) => result,
            None => reject(ModuleError::Rejected(format!(
                "{id} is busy handling another call"
            ))),
        }
    }

    /// Hands a result to the module's listener. Silently succeeds when the
    /// listener was dropped.
    pub fn send_result(&mut self, id: ModuleId, result: &Params) -> ModuleResult<()> {
        let Some(record) = self.modules.get(&id) else {
            return reject(ModuleError::UnknownModule(id));
        };
        let Some(listener) = record.listener.clone() else {
            log::debug!("{id} has no listener, result dropped");
            return Ok(());
        };

        listener.on_result(self, id, result);
        Ok(())
    }

    /// Asks the module's creator to close it.
    pub fn make_destroy_request(&mut self, id: ModuleId) -> ModuleResult<()> {
        let Some(record) = self.modules.get(&id) else {
            return reject(ModuleError::UnknownModule(id));
        };
        if record.state == ModuleState::Destroying {
            return reject(ModuleError::ModuleDestroying(id));
        }
        let Some(listener) = record.listener.clone() else {
            return reject(ModuleError::NoListener(id));
        };

        log::debug!("Requesting destruction of {id}");
        listener.on_destroy_request(self, id);
        Ok(())
    }

    fn create_module(
        &mut self,
        module_type: ModuleType,
        params: Params,
        listener: Rc<dyn ModuleListener>,
        parent: Option<ModuleId>,
    ) -> ModuleResult<ModuleId> {
        self.ensure_initialized()?;

        let anchor = match parent {
            Some(parent) => self.child_anchor(parent)?,
            None => {
                if let Some(root) = self.root {
                    return reject(ModuleError::RootExists(root));
                }
                self.top_item()
            }
        };

        let Some(hooks) = self.registry().allocate(module_type) else {
            return reject(ModuleError::AllocationFailed(module_type));
        };

        let id = self.next_module_id();
        self.modules.insert(
            id,
            ModuleRecord {
                module_type,
                state: ModuleState::Running,
                hooks: Some(hooks),
                listener: Some(listener),
                parent,
                children: Vec::new(),
                anchor,
                views: Vec::new(),
                cleaning_views: false,
            },
        );
        // Views and children the module creates from its own create hook
        // must pass the topmost check.
        self.top = Some(id);
        log::debug!("Creating {module_type} {id}");

        let created = self
            .with_module_hooks(id, |module, manager| module.create(manager, id, &params))
            .unwrap_or_else(|| Err(ModuleError::Rejected(format!("{id} is unavailable"))));
        if let Err(e) = created {
            self.top = parent;
            self.finalize_module(id, false);
            return reject(ModuleError::CreateFailed {
                module_type,
                reason: e.to_string(),
            });
        }

        if !self.modules.contains_key(&id) {
            return reject(ModuleError::CreateFailed {
                module_type,
                reason: format!("{id} was destroyed while being created"),
            });
        }

        match parent {
            None => self.root = Some(id),
            Some(parent) => match self.modules.get_mut(&parent) {
                Some(record) => record.children.push(id),
                None => {
                    log::warn!("Parent {parent} vanished while creating {id}");
                    if let Some(record) = self.modules.get_mut(&id) {
                        record.parent = None;
                    }
                }
            },
        }

        log::info!("Created {module_type} {id}");
        Ok(id)
    }

    /// Validates `parent` for a new child and picks the child's anchor item.
    fn child_anchor(&self, parent: ModuleId) -> ModuleResult<Option<ItemId>> {
        let Some(record) = self.modules.get(&parent) else {
            return reject(ModuleError::UnknownModule(parent));
        };
        if self.top != Some(parent) {
            return reject(ModuleError::NotTopmost(parent));
        }
        if record.state == ModuleState::Destroying {
            return reject(ModuleError::ModuleDestroying(parent));
        }
        if record.views.is_empty() {
            return reject(ModuleError::NoViews(parent));
        }

        let mut anchor = None;
        for child in &record.children {
            let Some(child_record) = self.modules.get(child) else {
                continue;
            };
            if child_record.state != ModuleState::Destroying {
                return reject(ModuleError::LiveChildExists {
                    parent,
                    child: *child,
                });
            }
            anchor = child_record.anchor;
        }

        // With a pop pending, new views land right above its target.
        Ok(anchor.or(self.pop.pop_to).or_else(|| self.top_item()))
    }

    /// Moves every module anchored on `from` down to `to`.
    pub(crate) fn reanchor(&mut self, from: ItemId, to: Option<ItemId>) {
        for (id, record) in self.modules.iter_mut() {
            if record.anchor == Some(from) {
                log::debug!("Re-anchoring {id} from {from}");
                record.anchor = to;
            }
        }
    }

    fn destroy_module_with(&mut self, id: ModuleId, use_pop: bool) -> ModuleResult<()> {
        let Some(record) = self.modules.get(&id) else {
            return reject(ModuleError::UnknownModule(id));
        };
        if record.state == ModuleState::Destroying {
            return reject(ModuleError::ModuleDestroying(id));
        }
        let parent = record.parent;
        let anchor = record.anchor;

        for module in self.subtree(id) {
            if let Some(record) = self.modules.get_mut(&module) {
                record.state = ModuleState::Destroying;
                if module != id {
                    record.listener = None;
                }
            }
        }

        log::debug!("Destroying {id} (pop: {use_pop})");
        self.top = parent;

        if parent.is_none() || (!use_pop && !self.pop.in_transition) {
            self.finalize_module(id, false);
            return Ok(());
        }

        match anchor {
            Some(anchor) => self.schedule_pop_to(anchor),
            None => {
                log::warn!("{id} has no anchor to pop back to, finalizing now");
                self.finalize_module(id, false);
            }
        }
        Ok(())
    }

    /// Tears a module down: its views (unless the last one just went), its
    /// place in the tree, its hooks, then the completion notice.
    pub(crate) fn finalize_module(&mut self, id: ModuleId, skip_views_cleanup: bool) {
        if !self.modules.contains_key(&id) {
            return;
        }
        if !skip_views_cleanup {
            self.cleanup_views(id);
        }

        let leftover_views = match self.modules.get_mut(&id) {
            Some(record) => {
                record.cleaning_views = true;
                record.views.clone()
            }
            None => return,
        };
        for view in leftover_views {
            self.finalize_view(view);
        }

        let Some(record) = self.modules.remove(&id) else {
            return;
        };

        match record.parent {
            Some(parent) => {
                if let Some(parent_record) = self.modules.get_mut(&parent) {
                    parent_record.children.retain(|child| *child != id);
                }
            }
            None => {
                if self.root == Some(id) {
                    self.root = None;
                }
            }
        }
        for child in &record.children {
            if let Some(child_record) = self.modules.get_mut(child) {
                child_record.parent = None;
            }
        }
        if self.top == Some(id) {
            self.top = record
                .parent
                .filter(|parent| self.modules.contains_key(parent));
        }

        log::debug!("Finalized {} {id}", record.module_type);
        match record.hooks {
            Some(mut hooks) => hooks.destroy(self, id),
            None => {
                self.retired_modules.insert(id);
            }
        }

        if record.state == ModuleState::Destroying {
            if let Some(listener) = record.listener {
                listener.on_destroy_completed(self, id);
            }
        }
    }

    /// Removes every stack item above the module's anchor, dropping any
    /// pending pop on the way.
    fn cleanup_views(&mut self, id: ModuleId) {
        let Some(anchor) = self.modules.get(&id).map(|record| record.anchor) else {
            return;
        };
        let mut top = self.top_item();

        if let Some(popped) = self.pop.popped.take() {
            if std::mem::take(&mut self.pop.delayed_transition) {
                self.pop.in_transition = false;
            }
            self.remove_item(popped);
        }

        if top == anchor {
            return;
        }

        self.pop.cancel();
        if let Some(record) = self.modules.get_mut(&id) {
            record.cleaning_views = true;
        }

        while top != anchor {
            let Some(item) = top else {
                break;
            };
            self.remove_item(item);
            top = self.top_item();
            if top == Some(item) {
                log::error!("Navigation stack did not remove {item}");
                break;
            }
        }

        if anchor.is_some() {
            if let Err(e) = self.activate_new_top_view() {
                log::warn!("No view to activate after cleaning up {id}: {e}");
            }
        }
    }
}
