use super::errors::{ModuleError, ModuleResult, reject};
use super::hooks::View;
use super::manager::{ModuleManager, ViewRecord};
use super::types::{ItemId, ModuleId, ModuleState, PushFlags, UpdateFlags, ViewId, ViewState};
use crate::navigation::Content;

impl ModuleManager {
    /// Creates a view for `module`, which must be topmost and not destroying.
    ///
    /// The view's `create` hook must assign content and push it. Unless a pop
    /// is pending, the previous top view is deactivated and, for animated
    /// pushes, kept visible until the transition finishes. The new view is
    /// activated right away when nothing is animating and the application is
    /// in the foreground.
    pub fn create_view(&mut self, module: ModuleId, view: Box<dyn View>) -> ModuleResult<ViewId> {
        let Some(owner) = self.modules.get(&module) else {
            return reject(ModuleError::UnknownModule(module));
        };
        if self.top != Some(module) {
            return reject(ModuleError::NotTopmost(module));
        }
        if owner.state == ModuleState::Destroying {
            return reject(ModuleError::ModuleDestroying(module));
        }

        let pending_target = self.pop.pop_to;
        let previous_top = if pending_target.is_some() {
            None
        } else {
            self.top_item()
        };

        let id = self.next_view_id();
        let orientation = self.window_rotation();
        self.views.insert(
            id,
            ViewRecord {
                module,
                state: ViewState::Created,
                visible: true,
                orientation,
                hooks: Some(view),
                content: None,
                item: None,
                update_flags: UpdateFlags::NONE,
                push_flags: PushFlags::NONE,
                allow_pop: false,
            },
        );
        if let Some(owner) = self.modules.get_mut(&module) {
            owner.views.push(id);
        }
        log::debug!("Creating {id} for {module}");

        let created = self.with_view_hooks(id, |view, manager| view.create(manager, id));
        let failure = match created {
            Some(Ok(())) => match self.views.get(&id) {
                None => Some(ModuleError::ViewCreateFailed {
                    view: id,
                    reason: "view was destroyed while being created".to_string(),
                }),
                Some(record) if record.content.is_none() => Some(ModuleError::NoContent(id)),
                Some(record) if record.item.is_none() => Some(ModuleError::NotPushed(id)),
                Some(_) => None,
            },
            Some(Err(e)) => Some(ModuleError::ViewCreateFailed {
                view: id,
                reason: e.to_string(),
            }),
            None => Some(ModuleError::ViewCreateFailed {
                view: id,
                reason: "view hooks unavailable".to_string(),
            }),
        };
        if let Some(error) = failure {
            let placed = self.views.get(&id).and_then(|record| record.item);
            self.discard_view(id);
            // A push above a pending pop target took over the target.
            if placed.is_some() && self.pop.pop_to == placed {
                self.pop.pop_to = pending_target;
            }
            return reject(error);
        }

        if self.pop.pop_to.is_none() {
            if let Some(previous) = previous_top {
                if let Some(previous_view) = self.view_for_item(previous) {
                    self.deactivate_view(previous_view, false);
                }
                let animated = self
                    .views
                    .get(&id)
                    .is_some_and(|record| !record.push_flags.contains(PushFlags::NO_TRANSITION));
                if animated {
                    if let Some(pushed_in) = self.pop.pushed_in {
                        if let Some(pushed_in_view) = self.view_for_item(pushed_in) {
                            self.hide_view(pushed_in_view);
                        }
                    }
                    self.pop.pushed_in = Some(previous);
                    self.pop.in_transition = true;
                }
            }
            if !self.pop.in_transition && !self.paused {
                self.activate_view(id);
            }
        }

        Ok(id)
    }

    /// Assigns the content surface a view will carry on the stack.
    pub fn set_view_content(&mut self, view: ViewId, content: Content) -> ModuleResult<()> {
        let Some(record) = self.views.get_mut(&view) else {
            return reject(ModuleError::UnknownView(view));
        };
        if record.item.is_some() {
            return reject(ModuleError::AlreadyPushed(view));
        }
        record.content = Some(content);
        Ok(())
    }

    /// Places a freshly created view on the stack.
    ///
    /// With a pop pending the item goes right above the pop target and becomes
    /// the new target. When paused, or when asked for no transition, the item
    /// is inserted above the top without animation. Otherwise it is pushed
    /// with animation.
    pub fn push_view(
        &mut self,
        view: ViewId,
        title: &str,
        flags: PushFlags,
    ) -> ModuleResult<ItemId> {
        let Some(record) = self.views.get(&view) else {
            return reject(ModuleError::UnknownView(view));
        };
        let module = record.module;
        if self.module_state(module) == Some(ModuleState::Destroying) {
            return reject(ModuleError::ModuleDestroying(module));
        }
        if record.item.is_some() {
            return reject(ModuleError::AlreadyPushed(view));
        }
        if record.state != ViewState::Created {
            return reject(ModuleError::InvalidViewState {
                view,
                state: record.state,
            });
        }
        let Some(content) = record.content.clone() else {
            return reject(ModuleError::NoContent(view));
        };

        let after = if let Some(target) = self.pop.pop_to {
            Some(target)
        } else if !self.pop.in_transition
            && (self.paused || flags.contains(PushFlags::NO_TRANSITION))
        {
            self.top_item()
        } else {
            None
        };

        let Some(stack) = self.stack.as_deref_mut() else {
            return reject(ModuleError::NotInitialized);
        };
        let mut push_flags = flags;
        let item = match after {
            Some(after) => {
                push_flags.insert(PushFlags::NO_TRANSITION);
                stack.insert_after(after, content, title, push_flags)
            }
            None => {
                push_flags.remove(PushFlags::NO_TRANSITION);
                stack.push(content, title, push_flags)
            }
        };
        let Some(item) = item else {
            return reject(ModuleError::StackOperationFailed(format!(
                "could not place {view}"
            )));
        };

        if let Some(record) = self.views.get_mut(&view) {
            record.item = Some(item);
            record.push_flags = push_flags;
        }
        self.items.insert(item, view);
        if self.pop.pop_to.is_some() {
            self.pop.pop_to = Some(item);
        }

        log::debug!("Pushed {view} as {item} ('{title}')");
        Ok(item)
    }

    /// Leaves a view.
    ///
    /// Exiting a module's last view asks the module's listener to close the
    /// module instead. Otherwise the view is popped with animation when it is
    /// on top, or removed at once when it is buried or the application is
    /// paused with nothing animating.
    pub fn exit_view(&mut self, view: ViewId) -> ModuleResult<()> {
        let Some(record) = self.views.get(&view) else {
            return reject(ModuleError::UnknownView(view));
        };
        if record.state == ViewState::Destroying {
            return reject(ModuleError::ViewDestroying(view));
        }
        let module = record.module;
        let item = record.item;

        let Some(owner) = self.modules.get(&module) else {
            return reject(ModuleError::UnknownModule(module));
        };
        if owner.state == ModuleState::Destroying {
            return reject(ModuleError::ModuleDestroying(module));
        }

        match owner.views.len() {
            0 => return reject(ModuleError::NoViews(module)),
            1 => self.make_destroy_request(module)?,
            _ => {
                let Some(item) = item else {
                    return reject(ModuleError::NotPushed(view));
                };
                self.exit_view_item(item)?;
            }
        }

        if let Some(record) = self.views.get_mut(&view) {
            record.state = ViewState::Destroying;
        }
        Ok(())
    }

    /// Whether the stack may pop `item`. Only true for the item the pop job
    /// is animating out.
    pub fn confirm_pop(&self, item: ItemId) -> bool {
        self.view_for_item(item)
            .and_then(|view| self.views.get(&view))
            .is_some_and(|record| record.allow_pop)
    }

    pub(crate) fn activate_view(&mut self, id: ViewId) {
        let Some(record) = self.views.get_mut(&id) else {
            return;
        };
        let previous = record.state;
        if !matches!(previous, ViewState::Created | ViewState::NotActive) {
            return;
        }
        record.state = ViewState::Active;
        log::debug!("Activating {id}");
        self.with_view_hooks(id, |view, manager| view.activate(manager, id, previous));
    }

    pub(crate) fn deactivate_view(&mut self, id: ViewId, destroy: bool) {
        let Some(record) = self.views.get_mut(&id) else {
            return;
        };
        if record.state != ViewState::Active {
            return;
        }
        record.state = if destroy {
            ViewState::Destroying
        } else {
            ViewState::NotActive
        };
        log::debug!("Deactivating {id} (destroy: {destroy})");
        self.with_view_hooks(id, |view, manager| view.deactivate(manager, id));
    }

    pub(crate) fn show_view(&mut self, id: ViewId) {
        let Some(record) = self.views.get_mut(&id) else {
            return;
        };
        if record.visible || record.state == ViewState::Destroying {
            return;
        }
        record.visible = true;
        self.with_view_hooks(id, |view, manager| view.show(manager, id));
    }

    pub(crate) fn hide_view(&mut self, id: ViewId) {
        let Some(record) = self.views.get_mut(&id) else {
            return;
        };
        if !record.visible || record.state == ViewState::Destroying {
            return;
        }
        record.visible = false;
        self.with_view_hooks(id, |view, manager| view.hide(manager, id));
    }

    /// Delivers pending update flags to a visible view.
    ///
    /// An orientation flag is dropped when the window rotation is the one the
    /// view already laid itself out for.
    pub(crate) fn update_view(&mut self, id: ViewId) {
        let rotation = self.window_rotation();
        let Some(record) = self.views.get_mut(&id) else {
            return;
        };
        if !record.visible
            || record.update_flags.is_empty()
            || record.state == ViewState::Destroying
        {
            return;
        }

        let mut flags = record.update_flags;
        record.update_flags = UpdateFlags::NONE;
        if flags.contains(UpdateFlags::ORIENTATION_CHANGED) {
            if record.orientation == rotation {
                flags.remove(UpdateFlags::ORIENTATION_CHANGED);
            } else {
                record.orientation = rotation;
            }
        }
        if flags.is_empty() {
            return;
        }

        log::debug!("Updating {id} with flags {:#07b}", flags.bits());
        self.with_view_hooks(id, |view, manager| view.update(manager, id, flags));
    }

    pub(crate) fn back_view(&mut self, id: ViewId) {
        if self.view_state(id) != Some(ViewState::Active) {
            return;
        }
        self.with_view_hooks(id, |view, manager| view.on_back(manager, id));
    }

    /// Finalizes a view whose item is gone or going. Losing the last view
    /// finalizes the owning module.
    pub(crate) fn finalize_view(&mut self, id: ViewId) {
        self.release_view(id, true);
    }

    /// Drops a view that failed creation; its module stays.
    fn discard_view(&mut self, id: ViewId) {
        self.release_view(id, false);
    }

    fn release_view(&mut self, id: ViewId, finalize_empty_owner: bool) {
        let Some(mut record) = self.views.remove(&id) else {
            return;
        };

        if let Some(item) = record.item.take() {
            self.items.remove(&item);
            if let Some(stack) = self.stack.as_deref_mut() {
                stack.remove(item);
            }
            self.pop.forget_popped(item);
        }

        log::debug!("Finalizing {id}");
        match record.hooks.take() {
            Some(mut hooks) => hooks.destroy(self, id),
            None => {
                self.retired_views.insert(id);
            }
        }
        record.content = None;

        let module = record.module;
        let Some(owner) = self.modules.get_mut(&module) else {
            return;
        };
        owner.views.retain(|view| *view != id);
        if finalize_empty_owner && owner.views.is_empty() && !owner.cleaning_views {
            self.finalize_module(module, true);
        }
    }

    /// Removes an item now and handles it as destroyed.
    pub(crate) fn remove_item(&mut self, item: ItemId) {
        if let Some(stack) = self.stack.as_deref_mut() {
            stack.remove(item);
        }
        self.on_item_destroyed(item);
    }
}
