use egui::{Pos2, Rect, pos2, vec2};
use eventline_lib::{Animation, Event, EventGroup, Id, ModifiedTracker, State};

use super::*;
use crate::command::GraphCtx;
use crate::input::{ButtonState, InputState};

const FRAME: f32 = 1.0 / 30.0;

struct Fixture {
    state: State,
    graph: EventGraph,
    config: GraphConfig,
    modified: ModifiedTracker,
    undo: UndoHistory,
}

impl Fixture {
    fn from_animation(anim: Animation) -> Self {
        let mut state = State::new();
        let anim_id = state.add_animation(anim);

        let config = GraphConfig::default();
        let mut graph = EventGraph::new(anim_id);
        graph.set_rect(Rect::from_min_size(pos2(0.0, 0.0), vec2(1280.0, 720.0)));
        graph.change_animation(&state, anim_id, &config);

        Self {
            state,
            graph,
            config,
            modified: ModifiedTracker::new(),
            undo: UndoHistory::new(),
        }
    }

    /// Legacy-mode animation (no groups); rows come from greedy packing.
    fn legacy(events: &[(f32, f32, u32)]) -> Self {
        let mut anim = Animation::new("test");
        for &(start, end, kind) in events {
            anim.push_event(Id::arbitrary(), Event::new(start, end, kind));
        }
        Self::from_animation(anim)
    }

    /// Grouped animation; each event is pinned to the given row.
    fn grouped(events: &[(f32, f32, u32, i32)]) -> Self {
        let mut anim = Animation::new("test");
        let mut groups: Vec<EventGroup> = Vec::new();
        for (index, &(start, end, kind, row)) in events.iter().enumerate() {
            anim.push_event(Id::arbitrary(), Event::new(start, end, kind));
            let row = row as usize;
            while groups.len() <= row {
                groups.push(EventGroup::new(0));
            }
            if groups[row].is_empty() {
                groups[row].kind = kind;
            }
            groups[row].insert(index);
        }
        anim.groups = groups;
        Self::from_animation(anim)
    }

    fn tick(&mut self, input: &InputState) {
        self.graph.update(
            &mut self.state,
            &self.config,
            &self.modified,
            &mut self.undo,
            input,
            1.0 / 60.0,
        );
    }

    fn undo(&mut self) -> bool {
        let mut ctx = GraphCtx {
            state: &mut self.state,
            view: &mut self.graph.view,
            config: &self.config,
            modified: &self.modified,
        };
        self.undo.undo(&mut ctx)
    }

    fn redo(&mut self) -> bool {
        let mut ctx = GraphCtx {
            state: &mut self.state,
            view: &mut self.graph.view,
            config: &self.config,
            modified: &self.modified,
        };
        self.undo.redo(&mut ctx)
    }

    fn anim(&self) -> &Animation {
        self.state
            .animations
            .force_get(self.graph.view.anim_id())
    }

    fn box_id(&self, index: usize) -> Id<EventBox> {
        self.anim()
            .event_ids()
            .nth(index)
            .expect("no event at index")
            .cast()
    }

    fn event(&self, index: usize) -> &Event {
        self.anim().event_at(index).expect("no event at index")
    }

    fn row_of(&self, index: usize) -> i32 {
        self.graph
            .view
            .boxes
            .force_get(self.box_id(index))
            .row()
    }

    fn delete(&mut self, ids: &[Id<EventBox>]) -> Result<(), GraphError> {
        self.graph.delete_boxes(
            &mut self.state,
            &self.config,
            &self.modified,
            &mut self.undo,
            ids,
        )
    }

    fn place(&mut self, event: Event, row: i32) -> Id<Event> {
        self.graph.place_event(
            &mut self.state,
            &self.config,
            &self.modified,
            &mut self.undo,
            event,
            row,
            true,
        )
    }
}

// ---- input scripting ----

fn at(pos: Pos2) -> InputState {
    InputState {
        mouse: pos,
        ..Default::default()
    }
}
fn press(pos: Pos2) -> InputState {
    InputState {
        left: ButtonState::pressed(),
        ..at(pos)
    }
}
fn hold(pos: Pos2) -> InputState {
    InputState {
        left: ButtonState::held(),
        ..at(pos)
    }
}
fn release(pos: Pos2) -> InputState {
    InputState {
        left: ButtonState::released(),
        ..at(pos)
    }
}
fn with_shift(mut input: InputState) -> InputState {
    input.shift = true;
    input
}
fn with_ctrl(mut input: InputState) -> InputState {
    input.ctrl = true;
    input
}

/// Screen position of `time` on `row`'s vertical center (graph rect at the
/// origin, scroll at zero, default zoom).
fn time_row(time: f32, row: i32) -> Pos2 {
    pos2(
        time * DEFAULT_PIXELS_PER_SECOND,
        TIMELINE_HEIGHT + row as f32 * DEFAULT_ROW_HEIGHT + DEFAULT_ROW_HEIGHT / 2.0,
    )
}

// ---- invariant checks ----

fn assert_consistent(f: &Fixture) {
    let view = &f.graph.view;
    for (&id, bx) in view.boxes.iter() {
        assert!(
            view.row_index.contains(id, bx.row()),
            "box {id:?} missing from its row bucket {}",
            bx.row()
        );
        for row in view.row_index.rows() {
            if row != bx.row() {
                assert!(
                    !view.row_index.contains(id, row),
                    "box {id:?} present in foreign bucket {row}"
                );
            }
        }
    }
    for row in view.row_index.rows() {
        for &id in view.row_index.boxes_in_row(row) {
            assert!(view.boxes.has(id), "row index references dead box {id:?}");
        }
    }
    for id in view.selection.ids() {
        assert!(view.boxes.has(id), "selection references dead box {id:?}");
    }
}

fn assert_groups_consistent(f: &Fixture) {
    let anim = f.anim();
    if anim.groups.is_empty() {
        return;
    }
    assert!(
        !anim.groups.last().unwrap().is_empty(),
        "trailing empty group"
    );

    for (row, group) in anim.groups.iter().enumerate() {
        for &index in &group.indices {
            let event_id = anim.event_ids().nth(index).expect("stale group index");
            let bx = f.graph.view.boxes.force_get(event_id.cast());
            assert_eq!(bx.row(), row as i32, "group {row} holds a foreign event");
        }
        if let Some(&first) = group.indices.first() {
            assert_eq!(
                group.kind,
                anim.event_at(first).unwrap().kind,
                "group kind does not match its first member"
            );
        }
    }

    for (index, event_id) in anim.event_ids().enumerate() {
        let bx = f.graph.view.boxes.force_get(event_id.cast());
        if bx.row() >= 0 {
            assert_eq!(
                anim.group_of(index),
                Some(bx.row() as usize),
                "event {index} not grouped under its row"
            );
        }
    }
}

#[derive(Debug, PartialEq)]
struct Snapshot {
    events: Vec<(Id<Event>, u32, u32, u32)>,
    boxes: Vec<(Id<EventBox>, i32)>,
    groups: Vec<EventGroup>,
}

fn snapshot(f: &Fixture) -> Snapshot {
    let anim = f.anim();
    let events = anim
        .event_ids()
        .map(|id| {
            let ev = anim.event(id).unwrap();
            // times compared bit-for-bit
            (id, ev.start.to_bits(), ev.end.to_bits(), ev.kind)
        })
        .collect();
    let mut boxes: Vec<(Id<EventBox>, i32)> = f
        .graph
        .view
        .boxes
        .iter()
        .map(|(&id, bx)| (id, bx.row()))
        .collect();
    boxes.sort();
    Snapshot {
        events,
        boxes,
        groups: anim.groups.clone(),
    }
}

// ---- row assignment on load ----

#[test]
fn legacy_packing_is_greedy_left_to_right() {
    let f = Fixture::legacy(&[(0.0, 1.0, 0), (0.5, 1.5, 0), (1.6, 2.0, 0)]);
    // second event overlaps the first, third starts past row 1's extent
    assert_eq!(f.row_of(0), 0);
    assert_eq!(f.row_of(1), 1);
    assert_eq!(f.row_of(2), 1);
    assert_consistent(&f);
}

#[test]
fn grouped_animation_rows_follow_groups() {
    let f = Fixture::grouped(&[(0.0, 1.0, 5, 0), (0.0, 1.0, 7, 2), (1.0, 2.0, 5, 0)]);
    assert_eq!(f.row_of(0), 0);
    assert_eq!(f.row_of(1), 2);
    assert_eq!(f.row_of(2), 0);
    assert_consistent(&f);
    assert_groups_consistent(&f);
}

#[test]
fn importing_animation_resolves_ghost() {
    let mut state = State::new();
    let mut base = Animation::new("base");
    base.push_event(Id::arbitrary(), Event::new(0.0, 1.0, 3));
    base.push_event(Id::arbitrary(), Event::new(1.0, 2.0, 3));
    let base_id = state.add_animation(base);

    let mut importer = Animation::new("importer");
    importer.import_from = Some(base_id);
    let importer_id = state.add_animation(importer);

    let config = GraphConfig::default();
    let mut graph = EventGraph::new(importer_id);
    graph.change_animation(&state, importer_id, &config);

    let ghost = graph.ghost().expect("ghost graph not resolved");
    assert_eq!(ghost.kind(), GraphKind::Ghost);
    assert_eq!(ghost.view.boxes.len(), 2);
    assert!(graph.view.boxes.is_empty());
    // simulation queries are redirected at the ghost
    assert_eq!(graph.simulated_view().anim_id(), base_id);
}

#[test]
fn ghost_pane_suppresses_selection() {
    let mut state = State::new();
    let mut base = Animation::new("base");
    base.push_event(Id::arbitrary(), Event::new(0.0, 1.0, 3));
    let base_id = state.add_animation(base);

    let mut importer = Animation::new("importer");
    importer.import_from = Some(base_id);
    importer.push_event(Id::arbitrary(), Event::new(0.0, 1.0, 0));
    let importer_id = state.add_animation(importer);

    let config = GraphConfig::default();
    let mut graph = EventGraph::new(importer_id);
    graph.set_rect(Rect::from_min_size(pos2(0.0, 0.0), vec2(1280.0, 720.0)));
    graph.change_animation(&state, importer_id, &config);

    let own_box = graph.view.boxes.keys().copied().next().unwrap();
    graph.view.selection.set_primary(own_box);

    let modified = ModifiedTracker::new();
    let mut undo = UndoHistory::new();
    graph.update(
        &mut state,
        &config,
        &modified,
        &mut undo,
        &press(time_row(0.5, 0)),
        1.0 / 60.0,
    );
    assert!(graph.view.selection.is_empty());
    assert_eq!(graph.drag().kind(), DragKind::None);
}

// ---- single drags ----

#[test]
fn left_edge_drag_snaps_and_commits() {
    let mut f = Fixture::legacy(&[(1.0, 2.0, 0)]);
    let edge = pos2(1.0 * DEFAULT_PIXELS_PER_SECOND, time_row(1.0, 0).y);

    f.tick(&press(edge));
    assert_eq!(f.graph.drag().kind(), DragKind::ResizeLeft);

    f.tick(&hold(pos2(1.9 * DEFAULT_PIXELS_PER_SECOND, edge.y)));
    f.tick(&release(pos2(1.9 * DEFAULT_PIXELS_PER_SECOND, edge.y)));

    let ev = f.event(0);
    assert!((ev.start - 1.9).abs() < 1e-4, "start = {}", ev.start);
    assert_eq!(ev.end, 2.0);
    assert_eq!(f.graph.drag().kind(), DragKind::None);
    assert_eq!(f.undo.depth(), 1);
    assert!(f.modified.is_modified(f.graph.view.anim_id()));

    assert!(f.undo());
    let ev = f.event(0);
    assert_eq!(ev.start, 1.0);
    assert_eq!(ev.end, 2.0);
    assert!(!f.modified.is_modified(f.graph.view.anim_id()));
    assert_consistent(&f);
}

#[test]
fn move_drag_reassigns_row_and_groups() {
    let mut f = Fixture::grouped(&[(1.0, 2.0, 5, 0)]);
    let body = time_row(1.5, 0);

    f.tick(&press(body));
    assert_eq!(f.graph.drag().kind(), DragKind::Move);

    f.tick(&hold(time_row(1.5, 2)));
    f.tick(&release(time_row(1.5, 2)));

    assert_eq!(f.row_of(0), 2);
    assert!((f.event(0).start - 1.0).abs() < 1e-5);
    assert_consistent(&f);
    assert_groups_consistent(&f);
    assert_eq!(f.anim().groups.len(), 3);

    assert!(f.undo());
    assert_eq!(f.row_of(0), 0);
    assert_consistent(&f);
    assert_groups_consistent(&f);
}

#[test]
fn zero_delta_click_selects_without_transaction() {
    let mut f = Fixture::legacy(&[(1.0, 2.0, 0)]);
    let body = time_row(1.5, 0);

    f.tick(&press(body));
    f.tick(&release(body));

    assert_eq!(f.graph.view.selection.primary(), Some(f.box_id(0)));
    assert_eq!(f.undo.depth(), 0);
    assert!(!f.modified.is_modified(f.graph.view.anim_id()));
}

#[test]
fn shift_click_builds_multi_selection() {
    let mut f = Fixture::legacy(&[(0.0, 1.0, 0), (0.5, 1.5, 0)]);
    let a = f.box_id(0);
    let b = f.box_id(1);

    f.tick(&press(time_row(0.4, 0)));
    f.tick(&release(time_row(0.4, 0)));
    assert_eq!(f.graph.view.selection.primary(), Some(a));

    f.tick(&with_shift(press(time_row(1.0, 1))));
    f.tick(&with_shift(release(time_row(1.0, 1))));
    assert_eq!(f.graph.view.selection.primary(), None);
    assert_eq!(f.graph.view.selection.multi(), &[a, b]);

    // ctrl-click subtracts again
    f.tick(&with_ctrl(press(time_row(1.0, 1))));
    f.tick(&with_ctrl(release(time_row(1.0, 1))));
    assert_eq!(f.graph.view.selection.multi(), &[a]);
}

#[test]
fn read_only_mode_never_marks_modified() {
    let mut f = Fixture::legacy(&[(1.0, 2.0, 0)]);
    f.config.read_only = true;

    let edge = pos2(1.0 * DEFAULT_PIXELS_PER_SECOND, time_row(1.0, 0).y);
    f.tick(&press(edge));
    f.tick(&hold(pos2(1.5 * DEFAULT_PIXELS_PER_SECOND, edge.y)));
    f.tick(&release(pos2(1.5 * DEFAULT_PIXELS_PER_SECOND, edge.y)));

    assert!(f.undo.depth() > 0);
    assert!(!f.modified.is_modified(f.graph.view.anim_id()));
}

// ---- multi drags ----

fn select_all(f: &mut Fixture) {
    let ids: Vec<Id<EventBox>> = (0..f.anim().event_count()).map(|i| f.box_id(i)).collect();
    f.graph.view.selection.set_multi(ids);
}

#[test]
fn multi_left_drag_is_clamped_by_earliest_ending_box() {
    // the grabbed box both ends earliest and starts latest, so it binds
    let mut f = Fixture::legacy(&[(1.0, 2.0, 0), (0.5, 3.0, 0), (0.0, 4.0, 0)]);
    assert_eq!((f.row_of(0), f.row_of(1), f.row_of(2)), (0, 1, 2));
    select_all(&mut f);

    let edge = pos2(1.0 * DEFAULT_PIXELS_PER_SECOND, time_row(1.0, 0).y);
    f.tick(&press(edge));
    assert_eq!(f.graph.drag().kind(), DragKind::MultiResizeLeft);

    let originals: Vec<f32> = (0..3).map(|i| f.event(i).start).collect();

    // pointer far past every limit
    f.tick(&hold(pos2(5000.0, edge.y)));
    f.tick(&release(pos2(5000.0, edge.y)));

    for i in 0..3 {
        let ev = f.event(i);
        assert!(
            ev.start <= 2.0 - FRAME + 1e-4,
            "box {i} start {} escaped the batch clamp",
            ev.start
        );
        assert!(ev.start >= originals[i], "left drag moved a start backwards");
        assert!(ev.end - ev.start >= FRAME - 1e-4);
    }

    // the batch moved rigidly: every start shifted by the same amount
    let delta = f.event(0).start - originals[0];
    for i in 1..3 {
        assert!(
            (f.event(i).start - originals[i] - delta).abs() < 1e-3,
            "batch lost rigidity on box {i}"
        );
    }

    assert_eq!(f.undo.depth(), 1);
    assert!(f.undo());
    for i in 0..3 {
        assert_eq!(f.event(i).start, originals[i]);
    }
    assert_consistent(&f);
}

#[test]
fn multi_move_clamps_rows_at_zero() {
    let mut f = Fixture::legacy(&[(0.0, 1.0, 0), (0.1, 1.1, 0), (0.2, 1.2, 0)]);
    assert_eq!((f.row_of(0), f.row_of(1), f.row_of(2)), (0, 1, 2));
    select_all(&mut f);

    let body = time_row(0.5, 1);
    f.tick(&press(body));
    assert_eq!(f.graph.drag().kind(), DragKind::MultiMove);

    // drag far above the first row; the smallest-row box pins the batch
    f.tick(&hold(pos2(body.x, TIMELINE_HEIGHT + 1.0)));
    f.tick(&release(pos2(body.x, TIMELINE_HEIGHT + 1.0)));

    assert_eq!(f.row_of(0), 0);
    assert_eq!(f.row_of(1), 1);
    assert_eq!(f.row_of(2), 2);
    assert_consistent(&f);
}

#[test]
fn multi_drag_undo_restores_every_box_atomically() {
    let mut f = Fixture::grouped(&[(1.0, 2.0, 5, 0), (1.5, 2.5, 5, 1)]);
    select_all(&mut f);
    let before = snapshot(&f);

    let body = time_row(1.4, 0);
    f.tick(&press(body));
    assert_eq!(f.graph.drag().kind(), DragKind::MultiMove);
    f.tick(&hold(time_row(2.4, 2)));
    f.tick(&release(time_row(2.4, 2)));

    assert_eq!(f.undo.depth(), 1);
    assert_eq!(f.row_of(0), 2);
    assert_eq!(f.row_of(1), 3);
    assert_groups_consistent(&f);
    let after = snapshot(&f);

    assert!(f.undo());
    assert_eq!(snapshot(&f), before);
    assert!(f.redo());
    assert_eq!(snapshot(&f), after);
    assert_consistent(&f);
}

// ---- marquee selection ----

#[test]
fn marquee_selects_exactly_the_covered_rows() {
    let mut f = Fixture::legacy(&[
        (0.0, 1.0, 0),
        (0.1, 1.1, 0),
        (0.2, 1.2, 0),
        (0.3, 1.3, 0),
    ]);
    assert_eq!(
        (f.row_of(0), f.row_of(1), f.row_of(2), f.row_of(3)),
        (0, 1, 2, 3)
    );

    // start on empty space right of the boxes, sweep left over rows 1-2
    let start = pos2(400.0, TIMELINE_HEIGHT + DEFAULT_ROW_HEIGHT + 4.0);
    let end = pos2(10.0, TIMELINE_HEIGHT + 3.0 * DEFAULT_ROW_HEIGHT - 4.0);

    f.tick(&press(start));
    assert_eq!(
        f.graph.drag().kind(),
        DragKind::Marquee(MarqueeMode::Replace)
    );
    f.tick(&hold(end));

    let mut selected: Vec<Id<EventBox>> = f.graph.view.selection.multi().to_vec();
    selected.sort();
    let mut expected = vec![f.box_id(1), f.box_id(2)];
    expected.sort();
    assert_eq!(selected, expected);

    f.tick(&release(end));
    // two boxes survive, so no promotion to primary
    assert_eq!(f.graph.view.selection.primary(), None);
    assert_eq!(f.graph.view.selection.multi().len(), 2);
}

#[test]
fn marquee_subtract_removes_only_covered_rows() {
    let mut f = Fixture::legacy(&[
        (0.0, 1.0, 0),
        (0.1, 1.1, 0),
        (0.2, 1.2, 0),
        (0.3, 1.3, 0),
    ]);
    select_all(&mut f);

    let start = pos2(400.0, TIMELINE_HEIGHT + DEFAULT_ROW_HEIGHT + 4.0);
    let end = pos2(10.0, TIMELINE_HEIGHT + 3.0 * DEFAULT_ROW_HEIGHT - 4.0);

    f.tick(&with_ctrl(press(start)));
    assert_eq!(
        f.graph.drag().kind(),
        DragKind::Marquee(MarqueeMode::Subtract)
    );
    f.tick(&with_ctrl(hold(end)));
    f.tick(&with_ctrl(release(end)));

    let mut selected: Vec<Id<EventBox>> = f.graph.view.selection.multi().to_vec();
    selected.sort();
    let mut expected = vec![f.box_id(0), f.box_id(3)];
    expected.sort();
    assert_eq!(selected, expected);
}

#[test]
fn marquee_release_promotes_a_single_survivor() {
    let mut f = Fixture::legacy(&[(0.0, 1.0, 0)]);

    let start = pos2(400.0, TIMELINE_HEIGHT + 4.0);
    let end = pos2(10.0, TIMELINE_HEIGHT + DEFAULT_ROW_HEIGHT - 4.0);
    f.tick(&press(start));
    f.tick(&hold(end));
    f.tick(&release(end));

    assert_eq!(f.graph.view.selection.primary(), Some(f.box_id(0)));
    assert!(f.graph.view.selection.multi().is_empty());
}

// ---- place / delete / undo ----

#[test]
fn delete_sole_selected_box_and_undo_restores_everything() {
    let mut f = Fixture::legacy(&[(1.0, 2.0, 7)]);
    let box_id = f.box_id(0);
    f.graph.view.selection.set_primary(box_id);
    let before = snapshot(&f);

    f.graph
        .delete_selected(&mut f.state, &f.config, &f.modified, &mut f.undo)
        .unwrap();

    assert!(f.graph.view.boxes.is_empty());
    assert!(f.graph.view.row_index.boxes_in_row(0).is_empty());
    assert!(f.graph.view.selection.is_empty());
    assert_eq!(f.anim().event_count(), 0);

    assert!(f.undo());
    assert_eq!(snapshot(&f), before);
    assert!(f.graph.view.row_index.contains(box_id, 0));
    // the same logical box comes back as the primary selection
    assert_eq!(f.graph.view.selection.primary(), Some(box_id));
    assert_consistent(&f);
}

#[test]
fn batch_delete_undo_restores_multi_selection() {
    let mut f = Fixture::grouped(&[(0.0, 1.0, 5, 0), (0.0, 1.0, 6, 1), (0.0, 1.0, 7, 2)]);
    let targets = vec![f.box_id(0), f.box_id(2)];
    let before = snapshot(&f);

    f.delete(&targets).unwrap();
    assert_eq!(f.graph.view.boxes.len(), 1);
    assert_groups_consistent(&f);

    assert!(f.undo());
    assert_eq!(snapshot(&f), before);
    let mut selected = f.graph.view.selection.multi().to_vec();
    selected.sort();
    let mut expected = targets.clone();
    expected.sort();
    assert_eq!(selected, expected);
    assert_consistent(&f);
    assert_groups_consistent(&f);
}

#[test]
fn place_and_delete_undo_redo_round_trips_bitwise() {
    let mut f = Fixture::grouped(&[(0.0, 1.0, 5, 0), (1.0, 2.0, 6, 1)]);
    let s0 = snapshot(&f);

    let event_id = f.place(Event::new(2.0, 3.0, 6), 1);
    let s1 = snapshot(&f);
    assert_groups_consistent(&f);

    f.delete(&[event_id.cast()]).unwrap();
    let s2 = snapshot(&f);
    assert_groups_consistent(&f);

    assert!(f.undo());
    assert_eq!(snapshot(&f), s1);
    assert!(f.undo());
    assert_eq!(snapshot(&f), s0);

    assert!(f.redo());
    assert_eq!(snapshot(&f), s1);
    assert!(f.redo());
    assert_eq!(snapshot(&f), s2);

    assert_consistent(&f);
    assert_groups_consistent(&f);
}

#[test]
fn placed_event_picks_up_bank_template() {
    let mut f = Fixture::legacy(&[(0.0, 1.0, 0)]);
    f.state.bank.set_template(42, vec![9, 9, 9]);

    let event_id = f.place(Event::new(1.0, 2.0, 42), 0);
    assert_eq!(f.anim().event(event_id).unwrap().params, vec![9, 9, 9]);

    // events that already carry parameters keep them
    let event_id = f.place(Event::with_params(2.0, 3.0, 42, vec![1]), 0);
    assert_eq!(f.anim().event(event_id).unwrap().params, vec![1]);
}

#[test]
fn deleting_foreign_boxes_is_an_error() {
    let mut f = Fixture::legacy(&[(0.0, 1.0, 0)]);
    let foreign: Id<EventBox> = Id::arbitrary();

    let err = f.delete(&[f.box_id(0), foreign]).unwrap_err();
    assert!(matches!(err, GraphError::ForeignBox));
    // and nothing was deleted
    assert_eq!(f.graph.view.boxes.len(), 1);
    assert_eq!(f.undo.depth(), 0);
}

// ---- clipboard ----

#[test]
fn copy_paste_relative_preserves_offsets() {
    let mut f = Fixture::grouped(&[(1.0, 2.0, 5, 1), (1.5, 2.5, 6, 2)]);
    select_all(&mut f);

    let mut clipboard = MemoryClipboard::default();
    assert!(f.graph.copy(&f.state, &mut clipboard));

    // park the pointer at 3.0s on row 4, then paste relative to it
    f.tick(&at(time_row(3.0, 4)));
    let pasted = f
        .graph
        .paste(
            &mut f.state,
            &f.config,
            &f.modified,
            &mut f.undo,
            &mut clipboard,
            false,
        )
        .unwrap();
    assert!(pasted);

    assert_eq!(f.anim().event_count(), 4);
    let a = f.event(2);
    let b = f.event(3);
    assert!((a.start - 3.0).abs() < 1e-4);
    assert!((a.end - 4.0).abs() < 1e-4);
    assert!((b.start - 3.5).abs() < 1e-4);
    assert!((b.end - 4.5).abs() < 1e-4);
    assert_eq!(f.row_of(2), 4);
    assert_eq!(f.row_of(3), 5);

    // pasted boxes become the new multi-selection
    assert_eq!(f.graph.view.selection.multi().len(), 2);
    assert_consistent(&f);
    assert_groups_consistent(&f);

    assert!(f.undo());
    assert_eq!(f.anim().event_count(), 2);
    assert_consistent(&f);
    assert_groups_consistent(&f);
}

#[test]
fn paste_absolute_restores_original_positions() {
    let mut f = Fixture::grouped(&[(1.0, 2.0, 5, 1)]);
    select_all(&mut f);

    let mut clipboard = MemoryClipboard::default();
    assert!(f.graph.copy(&f.state, &mut clipboard));

    f.tick(&at(time_row(5.0, 7)));
    f.graph
        .paste(
            &mut f.state,
            &f.config,
            &f.modified,
            &mut f.undo,
            &mut clipboard,
            true,
        )
        .unwrap();

    let pasted = f.event(1);
    assert_eq!(pasted.start, 1.0);
    assert_eq!(pasted.end, 2.0);
    assert_eq!(f.row_of(1), 1);
    // a single pasted box is promoted to the primary selection
    assert_eq!(f.graph.view.selection.primary(), Some(f.box_id(1)));
}

#[test]
fn paste_undo_redo_round_trips_bitwise() {
    let mut f = Fixture::grouped(&[(0.5, 1.5, 9, 0)]);
    select_all(&mut f);
    let mut clipboard = MemoryClipboard::default();
    f.graph.copy(&f.state, &mut clipboard);

    f.tick(&at(time_row(2.0, 1)));
    let before = snapshot(&f);
    f.graph
        .paste(
            &mut f.state,
            &f.config,
            &f.modified,
            &mut f.undo,
            &mut clipboard,
            false,
        )
        .unwrap();
    let after = snapshot(&f);

    assert!(f.undo());
    assert_eq!(snapshot(&f), before);
    assert!(f.redo());
    assert_eq!(snapshot(&f), after);
}

#[test]
fn copy_with_empty_selection_returns_false() {
    let f = Fixture::legacy(&[(0.0, 1.0, 0)]);
    let mut clipboard = MemoryClipboard::default();
    assert!(!f.graph.copy(&f.state, &mut clipboard));
    assert!(clipboard.text().is_none());
}

#[test]
fn unparseable_clipboard_leaves_state_untouched() {
    let mut f = Fixture::legacy(&[(0.0, 1.0, 0)]);
    let mut clipboard = MemoryClipboard::default();
    clipboard.set_text("definitely not a snapshot".into());

    let before = snapshot(&f);
    let result = f.graph.paste(
        &mut f.state,
        &f.config,
        &f.modified,
        &mut f.undo,
        &mut clipboard,
        false,
    );
    assert!(matches!(result, Err(GraphError::ClipboardParse(_))));
    assert_eq!(snapshot(&f), before);
    assert_eq!(f.undo.depth(), 0);
}

// ---- pane state machine ----

#[test]
fn timeline_press_scrubs_instead_of_selecting() {
    let mut f = Fixture::legacy(&[(0.0, 4.0, 0)]);

    let on_timeline = pos2(2.0 * DEFAULT_PIXELS_PER_SECOND, TIMELINE_HEIGHT / 2.0);
    f.tick(&press(on_timeline));

    assert!((f.graph.playback.current_time - 2.0).abs() < 1e-4);
    assert!(f.graph.playback.scrubbing);
    assert!(f.graph.view.selection.is_empty());
    assert_eq!(f.graph.drag().kind(), DragKind::None);

    f.tick(&at(on_timeline));
    assert!(!f.graph.playback.scrubbing);
}

#[test]
fn abandoned_drag_emits_no_transaction() {
    let mut f = Fixture::legacy(&[(1.0, 2.0, 0)]);
    let body = time_row(1.5, 0);

    f.tick(&press(body));
    f.tick(&hold(time_row(2.5, 0)));
    assert_eq!(f.graph.drag().kind(), DragKind::Move);

    // pane goes inactive mid-gesture
    f.graph.abandon_drag();
    f.tick(&release(time_row(2.5, 0)));

    assert_eq!(f.graph.drag().kind(), DragKind::None);
    assert_eq!(f.undo.depth(), 0);
}
