use track_transform::TransformError;
use track_transform::api::{CoalescingEditSession, RangeExtenderTool, SimplifyTool};
use track_transform::core::Action;
use track_transform::host::{ActionTrack, MemoryTrack, UndoStack, UndoTag};

fn zigzag_track(len: i32) -> MemoryTrack {
    MemoryTrack::from_actions(
        (0..len).map(|i| Action::new(i * 100, if i % 2 == 0 { 30 } else { 70 })),
    )
}

#[test]
fn first_edit_opens_entry_and_later_edits_replace_it() {
    let mut track = zigzag_track(6);
    let before = track.actions().to_vec();
    let mut session = CoalescingEditSession::new(UndoTag::RangeExtend);

    session.on_selection_changed();
    for step in 1..=10 {
        session.on_parameter_edited(&mut track, |track| {
            let first = track.actions()[0];
            track.add_action(first.with_pos(step));
        });
        assert!(!session.pending_first_edit());
    }

    assert_eq!(track.undo_tags(), vec![UndoTag::RangeExtend]);
    assert_eq!(track.actions()[0].pos, 10);
    assert!(track.undo());
    assert_eq!(track.actions(), before.as_slice());
}

#[test]
fn foreign_top_entry_opens_a_new_entry() {
    let mut track = zigzag_track(6);
    let mut session = CoalescingEditSession::new(UndoTag::Simplify);

    session.on_parameter_edited(&mut track, |_| {});
    track.snapshot(UndoTag::CustomScript);
    session.on_parameter_edited(&mut track, |_| {});

    assert_eq!(
        track.undo_tags(),
        vec![UndoTag::Simplify, UndoTag::CustomScript, UndoTag::Simplify]
    );
}

#[test]
fn selection_change_starts_a_new_gesture() {
    let mut track = zigzag_track(6);
    let mut session = CoalescingEditSession::new(UndoTag::Simplify);

    session.on_parameter_edited(&mut track, |_| {});
    session.on_parameter_edited(&mut track, |_| {});
    session.on_selection_changed();
    session.on_parameter_edited(&mut track, |_| {});

    assert_eq!(track.undo_depth(), 2);
}

#[test]
fn range_drag_leaves_one_undo_entry() {
    let mut track = zigzag_track(8);
    track.select_all();
    let before = track.actions().to_vec();
    let mut tool = RangeExtenderTool::new(5);
    tool.on_selection_changed(track.selection_size());

    for range in [10, 25, 40, 60] {
        tool.set_range(&mut track, range).expect("range edit");
    }

    assert_eq!(tool.range(), 60);
    assert_eq!(track.undo_tags(), vec![UndoTag::RangeExtend]);
    // interior peaks moved outward, run endpoints stayed
    assert_eq!(track.actions()[0], before[0]);
    assert_eq!(track.actions()[7], before[7]);
    assert!(track.actions()[1].pos > before[1].pos);
    assert!(track.actions()[2].pos < before[2].pos);
    assert_eq!(track.selection_size(), 8);

    assert!(track.undo());
    assert_eq!(track.actions(), before.as_slice());
}

#[test]
fn range_drag_is_relative_to_gesture_start() {
    let mut dragged = zigzag_track(8);
    dragged.select_all();
    let mut direct = dragged.clone();

    let mut tool = RangeExtenderTool::new(5);
    for range in [80, 5, 30] {
        tool.set_range(&mut dragged, range).expect("range edit");
    }
    RangeExtenderTool::new(5)
        .set_range(&mut direct, 30)
        .expect("range edit");

    assert_eq!(dragged.actions(), direct.actions());
}

#[test]
fn range_value_is_clamped() {
    let mut track = zigzag_track(6);
    track.select_all();
    let mut tool = RangeExtenderTool::new(5);
    tool.set_range(&mut track, 400).expect("range edit");
    assert_eq!(tool.range(), 100);
    tool.set_range(&mut track, -400).expect("range edit");
    assert_eq!(tool.range(), -50);
}

#[test]
fn simplify_drag_keeps_pre_gesture_undo_state() {
    let mut track = MemoryTrack::from_actions([
        Action::new(0, 0),
        Action::new(100, 50),
        Action::new(200, 10),
        Action::new(300, 90),
        Action::new(400, 50),
    ]);
    track.select_all();
    let before = track.clone();
    let mut tool = SimplifyTool::new(5);
    tool.on_selection_changed(track.selection_size());

    tool.set_epsilon(&mut track, 45.0).expect("epsilon edit");
    assert_eq!(track.actions().len(), 4);
    // the simplified actions are unselected, yet the gesture may continue
    assert_eq!(track.selection_size(), 0);
    assert!(tool.can_edit(&track));

    tool.set_epsilon(&mut track, 50.0).expect("epsilon edit");
    assert_eq!(
        track.actions(),
        &[Action::new(0, 0), Action::new(300, 90), Action::new(400, 50)]
    );
    tool.set_epsilon(&mut track, -3.0).expect("epsilon edit");
    assert_eq!(tool.epsilon(), 0.0);
    assert_eq!(track.actions().len(), 5);

    assert_eq!(track.undo_tags(), vec![UndoTag::Simplify]);
    assert!(track.undo());
    assert_eq!(track.actions(), before.actions());
    assert_eq!(track.selection_size(), 5);
}

#[test]
fn small_selection_is_rejected() {
    let mut track = zigzag_track(6);
    for action in track.actions()[..4].to_vec() {
        track.set_selection(action, true);
    }

    let err = SimplifyTool::new(5)
        .set_epsilon(&mut track, 1.0)
        .expect_err("four actions are not enough");
    assert!(matches!(
        err,
        TransformError::SelectionTooSmall {
            required: 5,
            actual: 4
        }
    ));
    assert_eq!(track.undo_depth(), 0);
}

#[test]
fn empty_selection_change_does_not_reset_parameter() {
    let mut tool = SimplifyTool::new(5);
    let mut track = zigzag_track(6);
    track.select_all();
    tool.set_epsilon(&mut track, 4.0).expect("epsilon edit");

    tool.on_selection_changed(0);
    assert_eq!(tool.epsilon(), 4.0);
    tool.on_selection_changed(3);
    assert_eq!(tool.epsilon(), 0.0);
}
