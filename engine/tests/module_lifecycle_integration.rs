use claims::*;
use engine::module_manager::{
    ModuleError, ModuleEvent, ModuleId, ModuleManager, ModuleRegistry, ModuleState, ModuleType,
    Orientation, UpdateFlags, ViewState,
};
use engine::params::Params;
use engine::testing::{Harness, Recorded, Recorder, RecordingListener, ScriptedModule};

mod helpers {
    use super::*;

    /// Registry used by most tests:
    /// - mailbox: "A", one view
    /// - viewer: "B", one view, destroys itself when messaged with `close`
    /// - composer: "C", one view
    /// - filter: "F", fails after creating its view
    /// - setting: "S", no views
    pub fn create_registry(recorder: &Recorder) -> ModuleRegistry {
        let (a, b, c, f, s) = (
            recorder.clone(),
            recorder.clone(),
            recorder.clone(),
            recorder.clone(),
            recorder.clone(),
        );
        ModuleRegistry::new()
            .with(ModuleType::Mailbox, move || {
                ScriptedModule::new("A", a.clone()).boxed()
            })
            .with(ModuleType::Viewer, move || {
                ScriptedModule::new("B", b.clone())
                    .on_message(|manager, id, message| {
                        if message.get_bool("close") == Some(true) {
                            manager.destroy_module_no_pop(id)
                        } else {
                            Ok(())
                        }
                    })
                    .boxed()
            })
            .with(ModuleType::Composer, move || {
                ScriptedModule::new("C", c.clone()).boxed()
            })
            .with(ModuleType::Filter, move || {
                ScriptedModule::new("F", f.clone()).failing().boxed()
            })
            .with(ModuleType::Setting, move || {
                ScriptedModule::new("S", s.clone()).with_views(0).boxed()
            })
    }

    pub fn create_harness() -> Harness {
        let recorder = Recorder::new();
        let registry = create_registry(&recorder);
        assert_ok!(Harness::new(registry, recorder))
    }

    pub fn create_root(harness: &mut Harness) -> ModuleId {
        let listener = RecordingListener::new("A", harness.recorder.clone()).shared();
        assert_ok!(harness.manager.create_root_module(
            ModuleType::Mailbox,
            Params::new(),
            listener
        ))
    }

    pub fn create_child(harness: &mut Harness, parent: ModuleId, module_type: ModuleType) -> ModuleId {
        let name = match module_type {
            ModuleType::Viewer => "B",
            ModuleType::Composer => "C",
            _ => "X",
        };
        let listener = RecordingListener::new(name, harness.recorder.clone())
            .destroying()
            .shared();
        assert_ok!(harness.manager.create_child_module(
            parent,
            module_type,
            Params::new(),
            listener
        ))
    }

    /// Root "A" with child "B", both settled.
    pub fn create_pair() -> (Harness, ModuleId, ModuleId) {
        let mut harness = create_harness();
        let root = create_root(&mut harness);
        let child = create_child(&mut harness, root, ModuleType::Viewer);
        harness.settle();
        (harness, root, child)
    }
}

#[test]
fn test_operations_require_initialization() {
    let recorder = Recorder::new();
    let mut manager = ModuleManager::new(helpers::create_registry(&recorder));
    let listener = RecordingListener::new("A", recorder).shared();

    let result = manager.create_root_module(ModuleType::Mailbox, Params::new(), listener);
    assert_err_eq!(result, ModuleError::NotInitialized);
    assert_err_eq!(manager.pause(), ModuleError::NotInitialized);
    assert!(!manager.tick());
}

#[test]
fn test_initialize_twice_fails() {
    let mut harness = helpers::create_harness();
    let stack = engine::navigation::SimulatedStack::new();
    let window = engine::navigation::SimulatedWindow::new();

    let result = harness
        .manager
        .initialize(Box::new(window), Box::new(stack));
    assert_err_eq!(result, ModuleError::AlreadyInitialized);
    assert!(harness.manager.is_initialized());
}

#[test]
fn test_manager_starts_paused() {
    let recorder = Recorder::new();
    let mut manager = ModuleManager::new(helpers::create_registry(&recorder));
    assert_ok!(manager.initialize(
        Box::new(engine::navigation::SimulatedWindow::new()),
        Box::new(engine::navigation::SimulatedStack::new())
    ));
    assert!(manager.is_paused());
}

#[test]
fn test_only_one_root() {
    let mut harness = helpers::create_harness();
    let root = helpers::create_root(&mut harness);
    assert_eq!(harness.manager.root_module(), Some(root));
    assert_eq!(harness.manager.top_module(), Some(root));

    let listener = RecordingListener::new("A", harness.recorder.clone()).shared();
    let result = harness
        .manager
        .create_root_module(ModuleType::Mailbox, Params::new(), listener);
    assert_err_eq!(result, ModuleError::RootExists(root));
    assert_eq!(harness.manager.module_ids(), vec![root]);
}

#[test]
fn test_unregistered_type_fails_allocation() {
    let mut harness = helpers::create_harness();
    let listener = RecordingListener::new("Z", harness.recorder.clone()).shared();
    let result = harness
        .manager
        .create_root_module(ModuleType::Account, Params::new(), listener);

    assert_err_eq!(result, ModuleError::AllocationFailed(ModuleType::Account));
    assert_none!(harness.manager.root_module());
    assert!(harness.stack.is_empty());
}

#[test]
fn test_child_requires_topmost_parent() {
    let (mut harness, root, child) = helpers::create_pair();
    assert_eq!(harness.manager.top_module(), Some(child));
    assert_eq!(harness.manager.module_parent(child), Some(root));

    let listener = RecordingListener::new("C", harness.recorder.clone()).shared();
    let result =
        harness
            .manager
            .create_child_module(root, ModuleType::Composer, Params::new(), listener);
    assert_err_eq!(result, ModuleError::NotTopmost(root));
    assert_eq!(harness.manager.module_ids().len(), 2);
    assert_eq!(harness.stack.len(), 2);
}

#[test]
fn test_child_requires_parent_views() {
    let mut harness = helpers::create_harness();
    let listener = RecordingListener::new("S", harness.recorder.clone()).shared();
    let root = assert_ok!(harness.manager.create_root_module(
        ModuleType::Setting,
        Params::new(),
        listener
    ));
    assert!(harness.manager.module_views(root).is_empty());

    let listener = RecordingListener::new("B", harness.recorder.clone()).shared();
    let result =
        harness
            .manager
            .create_child_module(root, ModuleType::Viewer, Params::new(), listener);
    assert_err_eq!(result, ModuleError::NoViews(root));
}

#[test]
fn test_failed_creation_rolls_back() {
    let mut harness = helpers::create_harness();
    let root = helpers::create_root(&mut harness);
    harness.settle();
    let anchor = harness.stack.items();

    let listener = RecordingListener::new("F", harness.recorder.clone()).shared();
    let result =
        harness
            .manager
            .create_child_module(root, ModuleType::Filter, Params::new(), listener);
    assert_matches!(
        result,
        Err(ModuleError::CreateFailed {
            module_type: ModuleType::Filter,
            ..
        })
    );

    assert_eq!(harness.manager.top_module(), Some(root));
    assert!(harness.manager.module_children(root).is_empty());
    assert_eq!(harness.manager.module_ids(), vec![root]);
    assert_eq!(harness.stack.items(), anchor);
    assert_eq!(harness.recorder.count(&Recorded::ViewDestroyed("F1".into())), 1);
    assert_eq!(harness.recorder.count(&Recorded::ModuleDestroyed("F".into())), 1);
    assert!(!harness.recorder.contains(&Recorded::DestroyCompleted("F".into())));

    harness.settle();
    let a1 = harness.manager.module_views(root)[0];
    assert_eq!(harness.manager.view_state(a1), Some(ViewState::Active));
    assert!(!harness.manager.is_in_transition());
}

#[test]
fn test_destroy_marks_whole_subtree() {
    let (mut harness, root, child) = helpers::create_pair();
    let grandchild = helpers::create_child(&mut harness, child, ModuleType::Composer);
    harness.settle();

    assert_ok!(harness.manager.destroy_module(child));
    assert_eq!(harness.manager.module_state(child), Some(ModuleState::Destroying));
    assert_eq!(harness.manager.module_state(grandchild), Some(ModuleState::Destroying));
    assert_eq!(harness.manager.module_state(root), Some(ModuleState::Running));
    assert_eq!(harness.manager.top_module(), Some(root));
    assert_err_eq!(
        harness.manager.destroy_module(grandchild),
        ModuleError::ModuleDestroying(grandchild)
    );

    harness.settle();
    assert_eq!(harness.manager.module_ids(), vec![root]);
    assert_eq!(harness.stack.len(), 1);
    assert_eq!(harness.recorder.count(&Recorded::ModuleDestroyed("B".into())), 1);
    assert_eq!(harness.recorder.count(&Recorded::ModuleDestroyed("C".into())), 1);
    assert!(harness.recorder.contains(&Recorded::DestroyCompleted("B".into())));
    // Descendants lose their listener when an ancestor is destroyed.
    assert!(!harness.recorder.contains(&Recorded::DestroyCompleted("C".into())));
}

#[test]
fn test_destroy_no_pop_finalizes_immediately() {
    let (mut harness, root, child) = helpers::create_pair();

    assert_ok!(harness.manager.destroy_module_no_pop(child));
    assert_none!(harness.manager.module_state(child));
    assert_eq!(harness.stack.len(), 1);
    assert!(harness.stack.pop_requests().is_empty());
    assert!(harness.recorder.contains(&Recorded::DestroyCompleted("B".into())));

    let a1 = harness.manager.module_views(root)[0];
    assert_eq!(harness.manager.view_state(a1), Some(ViewState::Active));
    assert_eq!(harness.manager.view_visible(a1), Some(true));
}

#[test]
fn test_destroy_while_paused_skips_the_pop() {
    let (mut harness, root, child) = helpers::create_pair();
    assert_ok!(harness.manager.pause());

    assert_ok!(harness.manager.destroy_module(child));
    assert_none!(harness.manager.module_state(child));
    assert!(harness.stack.pop_requests().is_empty());

    let a1 = harness.manager.module_views(root)[0];
    assert_eq!(harness.manager.view_state(a1), Some(ViewState::NotActive));
    assert_eq!(harness.manager.view_visible(a1), Some(true));

    assert_ok!(harness.manager.resume());
    assert_eq!(harness.manager.view_state(a1), Some(ViewState::Active));
}

#[test]
fn test_messages_reach_module_hooks() {
    let (mut harness, root, child) = helpers::create_pair();

    assert_ok!(harness.manager.send_message(child, &Params::new().with("refresh", true)));
    assert!(harness.recorder.contains(&Recorded::Message("B".into())));

    let result = harness.manager.send_message(root, &Params::new());
    assert_err_eq!(result, ModuleError::MessageNotSupported(root));
}

#[test]
fn test_module_destroyed_from_its_own_message_hook() {
    let (mut harness, root, child) = helpers::create_pair();

    assert_ok!(harness.manager.send_message(child, &Params::new().with("close", true)));
    assert_none!(harness.manager.module_state(child));
    assert_eq!(harness.recorder.count(&Recorded::ModuleDestroyed("B".into())), 1);
    assert_eq!(harness.manager.top_module(), Some(root));

    let destroyed = assert_some!(
        harness
            .recorder
            .position(&Recorded::ModuleDestroyed("B".into()))
    );
    let completed = assert_some!(
        harness
            .recorder
            .position(&Recorded::DestroyCompleted("B".into()))
    );
    assert!(completed < destroyed);
}

#[test]
fn test_message_to_destroying_module_fails() {
    let (mut harness, _root, child) = helpers::create_pair();
    assert_ok!(harness.manager.destroy_module(child));

    let result = harness.manager.send_message(child, &Params::new());
    assert_err_eq!(result, ModuleError::ModuleDestroying(child));
}

#[test]
fn test_results_go_to_listener() {
    let (mut harness, root, child) = helpers::create_pair();

    assert_ok!(harness.manager.send_result(child, &Params::new().with("sent", true)));
    assert!(harness.recorder.contains(&Recorded::ResultDelivered("B".into())));

    assert_ok!(harness.manager.destroy_module(root));
    assert_err_eq!(
        harness.manager.send_result(child, &Params::new()),
        ModuleError::UnknownModule(child)
    );
}

#[test]
fn test_destroy_request_reaches_listener() {
    let mut harness = helpers::create_harness();
    let root = helpers::create_root(&mut harness);

    assert_ok!(harness.manager.make_destroy_request(root));
    assert!(harness.recorder.contains(&Recorded::DestroyRequested("A".into())));
    assert_eq!(harness.manager.module_state(root), Some(ModuleState::Running));
}

#[test]
fn test_destroy_request_for_destroying_module_fails() {
    let (mut harness, _root, child) = helpers::create_pair();
    assert_ok!(harness.manager.destroy_module(child));

    assert_err_eq!(
        harness.manager.make_destroy_request(child),
        ModuleError::ModuleDestroying(child)
    );
}

#[test]
fn test_pause_and_resume_reach_every_module_once() {
    let (mut harness, root, child) = helpers::create_pair();

    assert_ok!(harness.manager.pause());
    assert_ok!(harness.manager.pause());
    assert_eq!(harness.manager.module_state(root), Some(ModuleState::Paused));
    assert_eq!(harness.manager.module_state(child), Some(ModuleState::Paused));
    assert_eq!(harness.recorder.count(&Recorded::ModulePaused("A".into())), 1);
    assert_eq!(harness.recorder.count(&Recorded::ModulePaused("B".into())), 1);

    assert_ok!(harness.manager.resume());
    assert_ok!(harness.manager.resume());
    assert_eq!(harness.manager.module_state(root), Some(ModuleState::Running));
    assert_eq!(harness.recorder.count(&Recorded::ModuleResumed("A".into())), 1);
    assert_eq!(harness.recorder.count(&Recorded::ModuleResumed("B".into())), 1);
}

#[test]
fn test_system_events_reach_every_module() {
    let (mut harness, _root, _child) = helpers::create_pair();
    harness.recorder.clear();

    assert_ok!(harness.manager.send_event(ModuleEvent::LowBattery));
    assert!(harness
        .recorder
        .contains(&Recorded::ModuleEvent("A".into(), ModuleEvent::LowBattery)));
    assert!(harness
        .recorder
        .contains(&Recorded::ModuleEvent("B".into(), ModuleEvent::LowBattery)));
    assert!(!harness
        .recorder
        .events()
        .iter()
        .any(|event| matches!(event, Recorded::Updated(..))));
}

#[test]
fn test_language_change_updates_top_now_and_others_on_return() {
    let (mut harness, _root, child) = helpers::create_pair();
    harness.recorder.clear();

    assert_ok!(harness.manager.send_event(ModuleEvent::LanguageChanged));
    assert_eq!(
        harness
            .recorder
            .count(&Recorded::Updated("B1".into(), UpdateFlags::LANGUAGE_CHANGED)),
        1
    );
    assert!(!harness
        .recorder
        .events()
        .iter()
        .any(|event| matches!(event, Recorded::Updated(name, _) if name == "A1")));

    assert_ok!(harness.manager.destroy_module(child));
    harness.settle();
    assert!(harness.recorder.contains(&Recorded::Updated(
        "A1".into(),
        UpdateFlags::LANGUAGE_CHANGED | UpdateFlags::POPPING
    )));
}

#[test]
fn test_rotation_updates_only_when_orientation_changes() {
    let (mut harness, _root, child) = helpers::create_pair();
    let b1 = harness.manager.module_views(child)[0];
    assert_eq!(harness.manager.view_orientation(b1), Some(Orientation::Portrait));

    harness.window.set_rotation(Orientation::Landscape);
    assert_ok!(harness.manager.send_event(ModuleEvent::RotateLandscape));
    assert_ok!(harness.manager.send_event(ModuleEvent::RotateLandscape));

    assert_eq!(
        harness
            .recorder
            .count(&Recorded::Updated("B1".into(), UpdateFlags::ORIENTATION_CHANGED)),
        1
    );
    assert_eq!(harness.manager.view_orientation(b1), Some(Orientation::Landscape));
}

#[test]
fn test_finalize_tears_everything_down() {
    let (mut harness, root, child) = helpers::create_pair();

    assert_ok!(harness.manager.finalize());
    assert!(!harness.manager.is_initialized());
    assert_none!(harness.manager.root_module());
    assert_none!(harness.manager.module_state(root));
    assert_none!(harness.manager.module_state(child));
    assert!(harness.stack.is_empty());
    assert_eq!(harness.recorder.count(&Recorded::ModuleDestroyed("A".into())), 1);
    assert_eq!(harness.recorder.count(&Recorded::ModuleDestroyed("B".into())), 1);
    assert!(harness.recorder.contains(&Recorded::DestroyCompleted("A".into())));

    let listener = RecordingListener::new("A", harness.recorder.clone()).shared();
    let result = harness
        .manager
        .create_root_module(ModuleType::Mailbox, Params::new(), listener);
    assert_err_eq!(result, ModuleError::NotInitialized);
}

#[test]
fn test_compressed_mode_follows_stack() {
    let mut harness = helpers::create_harness();
    assert!(!harness.manager.is_in_compressed_mode());

    harness.stack.set_compressed(true);
    assert!(harness.manager.is_in_compressed_mode());
}
