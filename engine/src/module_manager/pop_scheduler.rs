use super::errors::{ModuleError, ModuleResult, reject};
use super::manager::ModuleManager;
use super::types::{ItemId, PopPhase, UpdateFlags};
use crate::navigation::StackNotification;

/// Bookkeeping that turns "return to item X" requests into single animated
/// pops and reconciles the stack's asynchronous notices.
#[derive(Debug, Default)]
pub(crate) struct PopScheduler {
    /// The single-slot pop job runs on the next tick.
    pub(crate) job_queued: bool,
    /// Latest requested pop target; earlier requests are overwritten.
    pub(crate) pop_to: Option<ItemId>,
    /// Item animated out by the last pop, awaiting its destroy notice.
    pub(crate) popped: Option<ItemId>,
    /// Former top item kept visible under an animated push.
    pub(crate) pushed_in: Option<ItemId>,
    pub(crate) in_transition: bool,
    /// A transition notice arrived before the popped item's destroy notice.
    pub(crate) delayed_transition: bool,
}

impl PopScheduler {
    pub(crate) fn phase(&self) -> PopPhase {
        if self.in_transition || self.popped.is_some() {
            PopPhase::Transitioning
        } else if self.pop_to.is_some() || self.job_queued {
            PopPhase::PendingPop
        } else {
            PopPhase::Idle
        }
    }

    /// Records a pop target. The job is queued only when idle; mid-transition
    /// it is queued once the transition finishes.
    pub(crate) fn request(&mut self, target: ItemId) {
        if !self.job_queued && !self.in_transition {
            self.job_queued = true;
        }
        self.pop_to = Some(target);
    }

    pub(crate) fn cancel(&mut self) {
        self.job_queued = false;
        self.pop_to = None;
        self.pushed_in = None;
        self.in_transition = false;
    }

    /// Stops waiting for an item removed without a destroy notice.
    pub(crate) fn forget_popped(&mut self, item: ItemId) {
        if self.popped != Some(item) {
            return;
        }
        self.popped = None;
        if self.delayed_transition {
            self.delayed_transition = false;
            self.in_transition = false;
        }
    }
}

impl ModuleManager {
    /// Hardware back: delivered to the top view unless the stack is animating.
    pub fn back(&mut self) {
        if self.pop.in_transition {
            log::debug!("Back ignored during transition");
            return;
        }
        if let Some(view) = self.top_view() {
            self.back_view(view);
        }
    }

    pub(crate) fn schedule_pop_to(&mut self, target: ItemId) {
        log::debug!("Scheduling pop to {target}");
        self.pop.request(target);
    }

    /// The deferred pop job.
    ///
    /// Shows and updates the target first; both may retarget the pop, in
    /// which case the new target is prepared instead. Then the top view is
    /// deactivated for good and the stack animates back to the target.
    pub(crate) fn run_pop_job(&mut self) {
        while let Some(target) = self.pop.pop_to {
            let Some(view) = self.view_for_item(target) else {
                break;
            };
            self.show_view(view);
            if self.pop.pop_to != Some(target) {
                continue;
            }
            if let Some(record) = self.views.get_mut(&view) {
                record.update_flags |= UpdateFlags::POPPING;
            }
            self.update_view(view);
            if self.pop.pop_to != Some(target) {
                continue;
            }
            break;
        }

        if let Some(target) = self.pop.pop_to.take() {
            match self.top_item() {
                Some(top) if top != target => self.pop_stack_to(target, top),
                Some(_) => {
                    log::debug!("{target} is already on top");
                    if let Err(e) = self.activate_new_top_view() {
                        log::warn!("Nothing to activate after pop job: {e}");
                    }
                }
                None => log::warn!("Pop job ran on an empty stack"),
            }
        }
        self.pop.job_queued = false;
    }

    fn pop_stack_to(&mut self, target: ItemId, top: ItemId) {
        if let Some(view) = self.view_for_item(top) {
            self.deactivate_view(view, true);
            if let Some(record) = self.views.get_mut(&view) {
                record.allow_pop = true;
            }
        }

        log::debug!("Popping from {top} to {target}");
        let popped = self
            .stack
            .as_deref_mut()
            .is_some_and(|stack| stack.pop_to(target));
        if popped {
            self.pop.popped = Some(top);
            self.pop.in_transition = true;
        } else {
            log::error!("Navigation stack refused to pop to {target}");
        }
    }

    pub(crate) fn dispatch_notification(&mut self, notification: StackNotification) {
        match notification {
            StackNotification::TransitionFinished => self.on_transition_finished(),
            StackNotification::ItemDestroyed(item) => self.on_item_destroyed(item),
            StackNotification::BackRequested => self.back(),
            StackNotification::BackButtonClicked(item) => {
                if let Some(view) = self.view_for_item(item) {
                    self.back_view(view);
                }
            }
            StackNotification::PopGesture(item) => {
                if self.confirm_pop(item) {
                    log::debug!("Pop of {item} is already under way");
                } else {
                    log::error!("Popping {item} is not allowed");
                }
            }
        }
    }

    pub(crate) fn on_transition_finished(&mut self) {
        if self.pop.popped.is_some() {
            log::debug!("Transition finished before the popped item was destroyed");
            self.pop.delayed_transition = true;
            return;
        }
        self.pop.in_transition = false;

        if self.pop.pop_to.is_some() {
            if self.pop.job_queued {
                log::warn!("Pop job already queued");
            } else {
                self.pop.job_queued = true;
            }
            self.pop.pushed_in = None;
            return;
        }

        if let Some(pushed_in) = self.pop.pushed_in.take() {
            if let Some(view) = self.view_for_item(pushed_in) {
                self.hide_view(view);
            }
        }
        match self.top_view() {
            Some(view) if !self.paused => self.activate_view(view),
            Some(_) => {}
            None => log::warn!("Transition finished with no view on top"),
        }
    }

    pub(crate) fn on_item_destroyed(&mut self, item: ItemId) {
        if self.pop.popped == Some(item) {
            self.pop.popped = None;
            if self.pop.delayed_transition {
                self.pop.delayed_transition = false;
                self.on_transition_finished();
            }
        }

        let Some(view) = self.items.remove(&item) else {
            log::debug!("No view for destroyed {item}");
            return;
        };
        if let Some(record) = self.views.get_mut(&view) {
            record.item = None;
        }
        self.finalize_view(view);
    }

    /// Takes one item off the stack on behalf of an exiting view.
    pub(crate) fn exit_view_item(&mut self, item: ItemId) -> ModuleResult<()> {
        let Some(top) = self.top_item() else {
            return reject(ModuleError::EmptyStack);
        };

        if item != top || (self.paused && !self.pop.in_transition) {
            let was_target = self.pop.pop_to == Some(item);
            let below = self.item_below(item);
            self.remove_item(item);
            self.reanchor(item, below);

            if item == top {
                if let Err(e) = self.activate_new_top_view() {
                    log::warn!("Nothing to activate after removing {item}: {e}");
                }
            }
            if was_target {
                match below {
                    Some(below) => self.schedule_pop_to(below),
                    None => self.pop.pop_to = None,
                }
            }
        } else {
            let Some(below) = self.item_below(top) else {
                return reject(ModuleError::StackOperationFailed(format!(
                    "nothing below {top} to pop to"
                )));
            };
            self.schedule_pop_to(below);
        }

        if self.pop.pushed_in == Some(item) {
            self.pop.pushed_in = None;
        }
        Ok(())
    }

    /// Shows, updates and activates whatever is now on top.
    pub(crate) fn activate_new_top_view(&mut self) -> ModuleResult<()> {
        let Some(view) = self.top_view() else {
            return Err(ModuleError::EmptyStack);
        };
        self.show_view(view);
        if let Some(record) = self.views.get_mut(&view) {
            record.update_flags |= UpdateFlags::POPPING;
        }
        self.update_view(view);
        if !self.paused {
            self.activate_view(view);
        }
        Ok(())
    }
}
