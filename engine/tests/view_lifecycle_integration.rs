use claims::*;
use engine::module_manager::{
    ModuleError, ModuleId, ModuleRegistry, ModuleType, PopPhase, PushFlags, UpdateFlags, ViewId,
    ViewState,
};
use engine::navigation::Content;
use engine::params::Params;
use engine::testing::{Harness, Recorded, Recorder, RecordingListener, ScriptedModule, ScriptedView};

mod helpers {
    use super::*;

    /// Root "A" with `views` views, all settled. The viewer type creates a
    /// single-view child "B".
    pub fn create_test_setup(views: usize) -> (Harness, ModuleId, Vec<ViewId>) {
        let recorder = Recorder::new();
        let a = recorder.clone();
        let b = recorder.clone();
        let registry = ModuleRegistry::new()
            .with(ModuleType::Mailbox, move || {
                ScriptedModule::new("A", a.clone()).with_views(views).boxed()
            })
            .with(ModuleType::Viewer, move || {
                ScriptedModule::new("B", b.clone()).boxed()
            });
        let mut harness = assert_ok!(Harness::new(registry, recorder.clone()));
        let listener = RecordingListener::new("A", recorder).destroying().shared();
        let root = assert_ok!(harness.manager.create_root_module(
            ModuleType::Mailbox,
            Params::new(),
            listener
        ));
        harness.settle();
        let views = harness.manager.module_views(root);
        (harness, root, views)
    }

    pub fn view(harness: &Harness, name: &str) -> ScriptedView {
        ScriptedView::new(name, harness.recorder.clone())
    }
}

#[test]
fn test_animated_push_hides_previous_after_transition() {
    let (mut harness, root, views) = helpers::create_test_setup(1);
    let a1 = views[0];

    let a2 = assert_ok!(harness.manager.create_view(root, helpers::view(&harness, "A2").boxed()));
    assert!(harness.stack.is_animating());
    assert!(harness.manager.is_in_transition());
    assert_eq!(harness.manager.view_state(a1), Some(ViewState::NotActive));
    assert_eq!(harness.manager.view_visible(a1), Some(true));
    assert_eq!(harness.manager.view_state(a2), Some(ViewState::Created));

    harness.settle();
    assert_eq!(harness.manager.view_visible(a1), Some(false));
    assert_eq!(harness.manager.view_state(a2), Some(ViewState::Active));
    assert_eq!(harness.manager.top_view(), Some(a2));
    assert!(harness
        .recorder
        .contains(&Recorded::Activated("A2".into(), ViewState::Created)));
}

#[test]
fn test_push_without_transition_activates_at_once() {
    let (mut harness, root, views) = helpers::create_test_setup(1);
    let view = helpers::view(&harness, "A2").with_flags(PushFlags::NO_TRANSITION);

    let a2 = assert_ok!(harness.manager.create_view(root, view.boxed()));
    assert!(!harness.stack.is_animating());
    assert!(!harness.manager.is_in_transition());
    assert_eq!(harness.manager.view_state(a2), Some(ViewState::Active));
    assert_eq!(harness.manager.view_state(views[0]), Some(ViewState::NotActive));
}

#[test]
fn test_view_created_while_paused_waits_for_resume() {
    let (mut harness, root, _views) = helpers::create_test_setup(1);
    assert_ok!(harness.manager.pause());

    let a2 = assert_ok!(harness.manager.create_view(root, helpers::view(&harness, "A2").boxed()));
    assert!(!harness.stack.is_animating());
    assert_eq!(harness.manager.view_state(a2), Some(ViewState::Created));

    assert_ok!(harness.manager.resume());
    assert_eq!(harness.manager.view_state(a2), Some(ViewState::Active));
    assert!(harness
        .recorder
        .contains(&Recorded::Activated("A2".into(), ViewState::Created)));
}

#[test]
fn test_view_needs_topmost_module() {
    let (mut harness, root, _views) = helpers::create_test_setup(1);
    let listener = RecordingListener::new("B", harness.recorder.clone()).shared();
    assert_ok!(harness.manager.create_child_module(
        root,
        ModuleType::Viewer,
        Params::new(),
        listener
    ));
    let before = harness.stack.items();

    let result = harness
        .manager
        .create_view(root, helpers::view(&harness, "A2").boxed());
    assert_err_eq!(result, ModuleError::NotTopmost(root));
    assert_eq!(harness.stack.items(), before);
    assert!(!harness.recorder.contains(&Recorded::ViewCreated("A2".into())));
}

#[test]
fn test_view_without_content_is_discarded() {
    let (mut harness, root, views) = helpers::create_test_setup(1);
    let view = helpers::view(&harness, "A2").without_content().without_push();

    let result = harness.manager.create_view(root, view.boxed());
    assert_matches!(result, Err(ModuleError::NoContent(_)));
    assert_eq!(harness.manager.module_views(root), views);
    assert_eq!(harness.manager.view_state(views[0]), Some(ViewState::Active));
    assert!(harness.recorder.contains(&Recorded::ViewDestroyed("A2".into())));
}

#[test]
fn test_view_that_never_pushes_is_discarded() {
    let (mut harness, root, views) = helpers::create_test_setup(1);
    let view = helpers::view(&harness, "A2").without_push();

    let result = harness.manager.create_view(root, view.boxed());
    assert_matches!(result, Err(ModuleError::NotPushed(_)));
    assert_eq!(harness.manager.module_views(root), views);
    assert_eq!(harness.stack.len(), 1);
}

#[test]
fn test_failing_view_leaves_module_alive() {
    let (mut harness, root, views) = helpers::create_test_setup(1);
    let view = helpers::view(&harness, "A2").failing();

    let result = harness.manager.create_view(root, view.boxed());
    assert_matches!(result, Err(ModuleError::ViewCreateFailed { .. }));
    assert_eq!(harness.manager.module_views(root), views);
    assert_some!(harness.manager.module_state(root));
}

#[test]
fn test_failed_view_keeps_pending_pop_target() {
    let (mut harness, root, views) = helpers::create_test_setup(2);
    let items = harness.stack.items();
    assert_ok!(harness.manager.exit_view(views[1]));
    assert_eq!(harness.manager.pop_phase(), PopPhase::PendingPop);

    let view = helpers::view(&harness, "A3").failing_after_push();
    let result = harness.manager.create_view(root, view.boxed());
    assert_matches!(result, Err(ModuleError::ViewCreateFailed { .. }));
    assert_eq!(harness.stack.items(), items);
    assert!(harness.recorder.contains(&Recorded::ViewDestroyed("A3".into())));

    harness.settle();
    assert_eq!(harness.stack.pop_requests(), vec![items[0]]);
    assert_eq!(harness.stack.items(), vec![items[0]]);
    assert_none!(harness.manager.view_state(views[1]));
    assert_eq!(harness.manager.view_state(views[0]), Some(ViewState::Active));
    assert_eq!(harness.manager.pop_phase(), PopPhase::Idle);
}

#[test]
fn test_view_is_pushed_once() {
    let (mut harness, _root, views) = helpers::create_test_setup(1);
    let a1 = views[0];

    let result = harness.manager.push_view(a1, "again", PushFlags::NONE);
    assert_err_eq!(result, ModuleError::AlreadyPushed(a1));
    let result = harness.manager.set_view_content(a1, Content::new("other"));
    assert_err_eq!(result, ModuleError::AlreadyPushed(a1));
    assert_eq!(harness.stack.len(), 1);
}

#[test]
fn test_push_flags_reach_the_stack() {
    let (mut harness, root, _views) = helpers::create_test_setup(1);
    let view = helpers::view(&harness, "Details")
        .with_flags(PushFlags::NO_TITLE | PushFlags::NO_BACK_BUTTON);

    let details = assert_ok!(harness.manager.create_view(root, view.boxed()));
    let item = assert_some!(harness.manager.view_item(details));
    assert_eq!(harness.stack.titles(), vec!["A1".to_string(), String::new()]);
    assert!(!harness.stack.has_back_button(item));
}

#[test]
fn test_content_is_released_with_the_view() {
    let (mut harness, root, _views) = helpers::create_test_setup(1);
    let surface = Content::new("compose form");
    let view = helpers::view(&harness, "A2").with_content(surface.clone());

    let a2 = assert_ok!(harness.manager.create_view(root, view.boxed()));
    let item = assert_some!(harness.manager.view_item(a2));
    let shown = assert_some!(harness.stack.content(item));
    assert!(shown.ptr_eq(&surface));
    drop(shown);
    assert_eq!(surface.holders(), 4);

    harness.settle();
    assert_ok!(harness.manager.exit_view(a2));
    harness.settle();
    assert_none!(harness.manager.view_state(a2));
    assert_eq!(surface.holders(), 1);
}

#[test]
fn test_exit_top_view_pops_with_animation() {
    let (mut harness, _root, views) = helpers::create_test_setup(3);
    let items = harness.stack.items();

    assert_ok!(harness.manager.exit_view(views[2]));
    assert_eq!(harness.manager.view_state(views[2]), Some(ViewState::Destroying));
    assert_err_eq!(
        harness.manager.exit_view(views[2]),
        ModuleError::ViewDestroying(views[2])
    );

    harness.settle();
    assert_eq!(harness.stack.pop_requests(), vec![items[1]]);
    assert_eq!(harness.stack.items(), vec![items[0], items[1]]);
    assert_none!(harness.manager.view_state(views[2]));
    assert_eq!(harness.manager.view_state(views[1]), Some(ViewState::Active));
}

#[test]
fn test_exit_buried_view_removes_it_at_once() {
    let (mut harness, _root, views) = helpers::create_test_setup(3);
    let items = harness.stack.items();

    assert_ok!(harness.manager.exit_view(views[1]));
    assert_eq!(harness.stack.items(), vec![items[0], items[2]]);
    assert!(harness.stack.pop_requests().is_empty());
    assert!(harness.recorder.contains(&Recorded::ViewDestroyed("A2".into())));
    assert_eq!(harness.manager.view_state(views[2]), Some(ViewState::Active));
}

#[test]
fn test_exit_while_paused_skips_animation() {
    let (mut harness, _root, views) = helpers::create_test_setup(3);
    let items = harness.stack.items();
    assert_ok!(harness.manager.pause());
    harness.recorder.clear();

    assert_ok!(harness.manager.exit_view(views[2]));
    assert_eq!(harness.stack.items(), vec![items[0], items[1]]);
    assert!(!harness.stack.is_animating());
    assert!(harness.recorder.contains(&Recorded::Updated(
        "A2".into(),
        UpdateFlags::WAS_PAUSED | UpdateFlags::POPPING
    )));
    assert_ne!(harness.manager.view_state(views[1]), Some(ViewState::Active));

    assert_ok!(harness.manager.resume());
    assert_eq!(harness.manager.view_state(views[1]), Some(ViewState::Active));
}

#[test]
fn test_exit_last_view_asks_for_module_destruction() {
    let (mut harness, root, views) = helpers::create_test_setup(1);

    assert_ok!(harness.manager.exit_view(views[0]));
    assert!(harness.recorder.contains(&Recorded::DestroyRequested("A".into())));
    assert_none!(harness.manager.module_state(root));
    assert!(harness.stack.is_empty());
}

#[test]
fn test_back_button_exits_the_view() {
    let (mut harness, _root, views) = helpers::create_test_setup(2);
    let items = harness.stack.items();

    harness.stack.click_back_button(items[1]);
    harness.settle();
    assert!(harness.recorder.contains(&Recorded::Back("A2".into())));
    assert_none!(harness.manager.view_state(views[1]));
    assert_eq!(harness.stack.items(), vec![items[0]]);
}

#[test]
fn test_hardware_back_goes_to_active_top_view() {
    let (mut harness, _root, views) = helpers::create_test_setup(2);

    harness.stack.press_back();
    harness.settle();
    assert_eq!(harness.recorder.count(&Recorded::Back("A2".into())), 1);
    assert_none!(harness.manager.view_state(views[1]));

    assert_ok!(harness.manager.pause());
    harness.manager.back();
    assert!(!harness.recorder.contains(&Recorded::Back("A1".into())));
}

#[test]
fn test_view_ignoring_back_stays() {
    let (mut harness, root, _views) = helpers::create_test_setup(1);
    let view = helpers::view(&harness, "Draft").ignoring_back();
    let draft = assert_ok!(harness.manager.create_view(root, view.boxed()));
    harness.settle();

    harness.manager.back();
    assert!(harness.recorder.contains(&Recorded::Back("Draft".into())));
    assert_eq!(harness.manager.view_state(draft), Some(ViewState::Active));
    assert_eq!(harness.stack.len(), 2);
}
