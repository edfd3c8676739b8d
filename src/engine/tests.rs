use std::{cell::Cell, rc::Rc};

use super::*;
use crate::{
    action::{Action, ChainSignal, NO_TIMEOUT},
    chain::Life,
};

const AREA: MonitorArea = MonitorArea::new(0.0, 0.0, 1920.0, 1080.0);

fn manager_with(gesture: Gesture) -> GestureManager {
    let mut manager = GestureManager::new(AREA);
    manager.add_gesture(gesture);
    manager
}

fn feed(manager: &mut GestureManager, events: &[TouchEvent]) -> Vec<GestureEvent> {
    events
        .iter()
        .flat_map(|event| manager.dispatch(*event).events)
        .collect()
}

fn completed_keys(events: &[GestureEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| match event {
            GestureEvent::Completed { gesture, .. } => Some(gesture.to_string()),
            _ => None,
        })
        .collect()
}

fn cancelled_count(events: &[GestureEvent]) -> usize {
    events
        .iter()
        .filter(|event| matches!(event, GestureEvent::Cancelled { .. }))
        .count()
}

/// Swipe without the finger-count gate, so a single finger can drive it.
fn bare_swipe() -> Gesture {
    Gesture::new(
        GestureKind::Swipe,
        vec![
            Action::drag(catalog::swipe_params(active_config())),
            Action::liftoff(NO_TIMEOUT),
        ],
    )
}

fn bare_swipe_drag() -> Gesture {
    Gesture::new(
        GestureKind::Swipe,
        vec![
            Action::drag(catalog::swipe_params(active_config()))
                .on_complete(ChainSignal::BeginDrag),
            Action::liftoff(NO_TIMEOUT),
        ],
    )
}

fn three_finger_down() -> [TouchEvent; 3] {
    [
        TouchEvent::down(100, 0, 450.0, 290.0),
        TouchEvent::down(100, 1, 500.0, 300.0),
        TouchEvent::down(100, 2, 550.0, 290.0),
    ]
}

#[test]
fn swipe_edges_match_margin_table() {
    let manager = GestureManager::new(AREA);
    let (l, r, u, d) = (
        Direction::LEFT,
        Direction::RIGHT,
        Direction::UP,
        Direction::DOWN,
    );
    let cases = [
        ((10.0, 10.0), u | l),
        ((0.0, 11.0), l),
        ((11.0, 0.0), u),
        ((11.0, 11.0), Direction::NONE),
        ((1920.0, 1080.0), d | r),
        ((1909.0, 1080.0), d),
        ((1920.0, 1069.0), r),
        ((1909.0, 1069.0), Direction::NONE),
    ];
    for ((x, y), expected) in cases {
        assert_eq!(
            manager.find_swipe_edges(Point::new(x, y)),
            expected,
            "point ({x}, {y})"
        );
    }
}

#[test]
fn one_finger_far_enough_completes_three_finger_drag() {
    let config = *active_config();
    let mut manager = manager_with(Gesture::new(
        GestureKind::Swipe,
        vec![Action::drag(catalog::swipe_params(&config))],
    ));
    let mut events = feed(&mut manager, &three_finger_down());
    events.extend(manager.on_touch_move(200, 0, Point::new(0.0, 290.0)).events);

    assert_eq!(completed_keys(&events), vec!["swipe:3:l"]);
    assert_eq!(cancelled_count(&events), 0);
}

#[test]
fn moved_pair_cancels_when_third_finger_lands() {
    let mut manager = manager_with(bare_swipe());
    let events = feed(
        &mut manager,
        &[
            TouchEvent::down(100, 0, 450.0, 290.0),
            TouchEvent::down(100, 1, 500.0, 300.0),
            TouchEvent::motion(110, 0, 409.0, 290.0),
            TouchEvent::motion(110, 1, 459.0, 300.0),
            TouchEvent::down(150, 2, 401.0, 290.0),
        ],
    );

    assert!(completed_keys(&events).is_empty());
    assert_eq!(cancelled_count(&events), 1);
    assert_eq!(manager.gestures()[0].life(), Life::Cancelled);
}

#[test]
fn swipe_then_liftoff_completes_on_first_up() {
    let mut manager = manager_with(catalog::swipe(active_config()));
    let mut stream = three_finger_down().to_vec();
    stream.extend([
        TouchEvent::motion(200, 0, 0.0, 290.0),
        TouchEvent::motion(200, 1, 50.0, 300.0),
        TouchEvent::motion(200, 2, 100.0, 290.0),
        TouchEvent::up(300, 0, 100.0, 290.0),
    ]);
    let events = feed(&mut manager, &stream);

    assert_eq!(completed_keys(&events), vec!["swipe:3:l"]);
    assert!(manager.is_consuming());
}

#[test]
fn stepped_three_finger_swipe_reports_left() {
    let mut config = *active_config();
    config.tuning.sensitivity = 1.5;
    let mut manager = GestureManager::with_config(AREA, config);
    manager.add_gesture(catalog::swipe(&config));

    let mut events = feed(&mut manager, &three_finger_down());
    let starts = [(0, 450.0, 290.0), (1, 500.0, 300.0), (2, 550.0, 290.0)];
    for tick in 1..=20u32 {
        for (finger, x, y) in starts {
            let moved = x - 7.0 * f64::from(tick);
            events.extend(
                manager
                    .on_touch_move(100 + tick * 10, finger, Point::new(moved, y))
                    .events,
            );
        }
    }
    events.extend(manager.on_touch_up(320, 0, Point::new(310.0, 290.0)).events);

    let completed: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            GestureEvent::Completed { gesture, .. } => Some(*gesture),
            _ => None,
        })
        .collect();
    assert_eq!(
        completed,
        vec![CompletedGesture::Swipe {
            direction: Direction::LEFT,
            fingers: 3,
        }]
    );
    assert_eq!(completed[0].to_string(), "swipe:3:l");
}

#[test]
fn edge_swipe_from_left_edge_completes_on_release() {
    let mut manager = manager_with(catalog::edge_swipe(active_config()));
    let events = feed(
        &mut manager,
        &[
            TouchEvent::down(100, 0, 5.0, 300.0),
            TouchEvent::motion(150, 0, 250.0, 300.0),
            TouchEvent::motion(200, 0, 455.0, 300.0),
            TouchEvent::up(300, 0, 455.0, 300.0),
        ],
    );

    assert_eq!(completed_keys(&events), vec!["edge:l:r"]);
    let last = events.iter().rev().find_map(|event| match event {
        GestureEvent::Completed { gesture, .. } => Some(*gesture),
        _ => None,
    });
    assert_eq!(
        last.and_then(|gesture| gesture.edge_origin()),
        Some(Direction::LEFT)
    );
}

#[test]
fn edge_swipe_times_out_while_swiping() {
    let mut manager = manager_with(catalog::edge_swipe(active_config()));
    let events = feed(
        &mut manager,
        &[
            TouchEvent::down(100, 0, 5.0, 300.0),
            TouchEvent::motion(150, 0, 300.0, 300.0),
            TouchEvent::motion(520, 0, 600.0, 300.0),
        ],
    );

    assert!(completed_keys(&events).is_empty());
    assert_eq!(cancelled_count(&events), 1);
}

#[test]
fn edge_swipe_times_out_waiting_for_release() {
    let mut manager = manager_with(catalog::edge_swipe(active_config()));
    let events = feed(
        &mut manager,
        &[
            TouchEvent::down(100, 0, 5.0, 300.0),
            TouchEvent::motion(150, 0, 250.0, 300.0),
            TouchEvent::motion(200, 0, 455.0, 300.0),
            TouchEvent::up(801, 0, 455.0, 300.0),
        ],
    );

    assert!(completed_keys(&events).is_empty());
    assert_eq!(cancelled_count(&events), 1);
}

#[test]
fn edge_swipe_outside_margin_finishes_silently() {
    let calls = Rc::new(Cell::new(0));
    let reported = Rc::new(Cell::new(0));
    let (call_counter, report_counter) = (Rc::clone(&calls), Rc::clone(&reported));
    let mut manager = manager_with(catalog::edge_swipe(active_config()).on_complete(
        move |gesture| {
            call_counter.set(call_counter.get() + 1);
            if gesture.is_some() {
                report_counter.set(report_counter.get() + 1);
            }
        },
    ));
    let events = feed(
        &mut manager,
        &[
            TouchEvent::down(100, 0, 11.0, 300.0),
            TouchEvent::motion(150, 0, 250.0, 300.0),
            TouchEvent::motion(200, 0, 461.0, 300.0),
            TouchEvent::up(300, 0, 461.0, 300.0),
        ],
    );

    assert!(events.is_empty());
    assert_eq!(calls.get(), 1);
    assert_eq!(reported.get(), 0);
    assert_eq!(manager.gestures()[0].life(), Life::Completed);
    assert!(!manager.is_consuming());
}

#[test]
fn late_jumping_finger_cancels_once() {
    let cancels = Rc::new(Cell::new(0));
    let counter = Rc::clone(&cancels);
    let mut manager = manager_with(bare_swipe().on_cancel(move || counter.set(counter.get() + 1)));
    let events = feed(
        &mut manager,
        &[
            TouchEvent::down(100, 0, 400.0, 300.0),
            TouchEvent::down(100, 1, 450.0, 300.0),
            TouchEvent::motion(120, 0, 395.0, 300.0),
            TouchEvent::motion(120, 1, 445.0, 300.0),
            TouchEvent::down(150, 2, 500.0, 300.0),
            TouchEvent::motion(160, 2, 560.0, 300.0),
            TouchEvent::motion(170, 0, 300.0, 300.0),
            TouchEvent::up(180, 2, 560.0, 300.0),
        ],
    );

    assert_eq!(cancelled_count(&events), 1);
    assert_eq!(cancels.get(), 1);
    assert!(completed_keys(&events).is_empty());
}

#[test]
fn long_press_waits_for_the_full_delay() {
    let mut manager = manager_with(Gesture::new(
        GestureKind::LongPress,
        vec![Action::long_press(150.0, 400)],
    ));

    let down = manager.on_touch_down(1000, 0, Point::new(600.0, 600.0));
    assert_eq!(down.timer_request(), Some((1401, 400)));

    let early = manager.on_touch_move(1399, 0, Point::new(602.0, 601.0));
    assert!(early.events.is_empty());

    let fired = manager.on_timer(1400);
    assert_eq!(
        fired.events,
        vec![
            GestureEvent::StopTimer,
            GestureEvent::Completed {
                time: 1400,
                gesture: CompletedGesture::LongPress { fingers: 1 },
            },
        ]
    );
    assert!(fired.consume);
}

#[test]
fn timer_without_fingers_does_nothing() {
    let mut manager = GestureManager::with_standard_gestures(AREA, *active_config());
    let output = manager.on_timer(500);
    assert!(output.events.is_empty());
    assert!(!output.consume);
}

#[test]
fn unknown_finger_and_repeated_down_are_ignored() {
    let mut manager = manager_with(catalog::tap(active_config()));

    let stray = manager.on_touch_move(10, 42, Point::new(1.0, 1.0));
    assert!(stray.events.is_empty());
    assert!(manager.last_trace().ignored);
    assert!(manager.state().is_empty());

    manager.on_touch_down(20, 1, Point::new(100.0, 100.0));
    let repeated = manager.on_touch_down(30, 1, Point::new(300.0, 300.0));
    assert!(repeated.events.is_empty());
    assert_eq!(manager.state().len(), 1);
    assert_eq!(
        manager.state().finger(1).map(|finger| finger.origin),
        Some(Point::new(100.0, 100.0))
    );

    let lifted = manager.on_touch_up(40, 7, Point::new(0.0, 0.0));
    assert!(lifted.events.is_empty());
    assert_eq!(manager.state().len(), 1);
}

#[test]
fn two_finger_tap_reports_finger_count() {
    let mut manager = manager_with(catalog::tap(active_config()));
    let events = feed(
        &mut manager,
        &[
            TouchEvent::down(0, 0, 100.0, 100.0),
            TouchEvent::down(20, 1, 200.0, 100.0),
            TouchEvent::motion(40, 1, 202.0, 101.0),
            TouchEvent::up(80, 1, 202.0, 101.0),
            TouchEvent::up(90, 0, 100.0, 100.0),
        ],
    );

    assert_eq!(completed_keys(&events), vec!["tap:2"]);
    assert_eq!(manager.last_trace().state_id, DispatchStateId::Idle);
}

#[test]
fn drag_emits_begin_updates_and_end() {
    let mut manager = manager_with(bare_swipe_drag());

    manager.on_touch_down(0, 0, Point::new(500.0, 500.0));
    let begin = manager.on_touch_move(50, 0, Point::new(660.0, 500.0));
    let drag = CompletedGesture::Swipe {
        direction: Direction::RIGHT,
        fingers: 1,
    };
    assert_eq!(begin.events, vec![GestureEvent::DragBegin { time: 50, drag }]);
    assert!(begin.consume);
    assert_eq!(manager.active_drag(), Some(drag));
    assert_eq!(manager.last_trace().state_id, DispatchStateId::Dragging);

    let update = manager.on_touch_move(60, 0, Point::new(670.0, 500.0));
    assert_eq!(
        update.events,
        vec![GestureEvent::DragUpdate {
            time: 60,
            position: Point::new(670.0, 500.0),
        }]
    );

    let end = manager.on_touch_up(70, 0, Point::new(670.0, 500.0));
    assert_eq!(
        end.events,
        vec![
            GestureEvent::DragEnd {
                time: 70,
                drag,
                cancelled: false,
            },
            GestureEvent::Completed {
                time: 70,
                gesture: drag,
            },
        ]
    );
    assert_eq!(manager.active_drag(), None);
}

#[test]
fn drag_end_follows_owner_cancellation() {
    let mut manager = manager_with(bare_swipe_drag());

    manager.on_touch_down(0, 0, Point::new(500.0, 500.0));
    manager.on_touch_move(50, 0, Point::new(500.0, 340.0));
    let spoiled = manager.on_touch_down(60, 1, Point::new(900.0, 900.0));

    let drag = CompletedGesture::Swipe {
        direction: Direction::UP,
        fingers: 1,
    };
    assert_eq!(
        spoiled.events,
        vec![
            GestureEvent::DragEnd {
                time: 60,
                drag,
                cancelled: true,
            },
            GestureEvent::Cancelled {
                time: 60,
                kind: GestureKind::Swipe,
            },
        ]
    );
    assert_eq!(manager.last_trace().state_id, DispatchStateId::Touching);
}

#[test]
fn interrupt_cancels_forwarding_once_per_interaction() {
    let mut manager = manager_with(catalog::interrupt(active_config()));
    let events = feed(
        &mut manager,
        &[
            TouchEvent::down(0, 0, 100.0, 100.0),
            TouchEvent::down(10, 1, 200.0, 100.0),
            TouchEvent::down(20, 2, 300.0, 100.0),
            TouchEvent::down(30, 3, 400.0, 100.0),
        ],
    );
    assert_eq!(events, vec![GestureEvent::CancelForwarded { time: 20 }]);
    assert!(manager.is_consuming());

    feed(
        &mut manager,
        &[
            TouchEvent::up(40, 0, 100.0, 100.0),
            TouchEvent::up(40, 1, 200.0, 100.0),
            TouchEvent::up(40, 2, 300.0, 100.0),
            TouchEvent::up(40, 3, 400.0, 100.0),
        ],
    );
    let fresh = manager.on_touch_down(500, 0, Point::new(10.0, 10.0));
    assert!(!fresh.consume);
}

#[test]
fn finished_chain_restarts_cleanly() {
    let mut manager = manager_with(bare_swipe());
    feed(
        &mut manager,
        &[
            TouchEvent::down(0, 0, 500.0, 500.0),
            TouchEvent::motion(20, 0, 500.0, 700.0),
            TouchEvent::up(40, 0, 500.0, 700.0),
        ],
    );
    assert_eq!(manager.gestures()[0].life(), Life::Completed);

    manager.on_touch_down(1000, 3, Point::new(100.0, 100.0));
    let gesture = &manager.gestures()[0];
    assert_eq!(gesture.life(), Life::Running);
    assert_eq!(gesture.cursor(), 0);
    assert_eq!(
        gesture.current().and_then(Action::as_drag).map(|drag| drag.target()),
        Some(Direction::NONE)
    );
}

#[test]
fn stale_running_chain_restarts_with_new_interaction() {
    let mut manager = manager_with(Gesture::new(
        GestureKind::Tap,
        vec![Action::lift_all(NO_TIMEOUT), Action::liftoff(NO_TIMEOUT)],
    ));
    feed(
        &mut manager,
        &[
            TouchEvent::down(0, 0, 10.0, 10.0),
            TouchEvent::up(10, 0, 10.0, 10.0),
        ],
    );
    assert_eq!(manager.gestures()[0].cursor(), 1);
    assert_eq!(manager.gestures()[0].life(), Life::Running);

    manager.on_touch_down(100, 0, Point::new(10.0, 10.0));
    assert_eq!(manager.gestures()[0].cursor(), 0);
}

#[test]
fn sensitivity_change_reaches_running_chains() {
    let mut manager = manager_with(bare_swipe());
    manager.set_sensitivity(2.0);
    assert_eq!(manager.config().tuning.sensitivity, 2.0);

    let events = feed(
        &mut manager,
        &[
            TouchEvent::down(0, 0, 500.0, 500.0),
            TouchEvent::motion(20, 0, 580.0, 500.0),
            TouchEvent::up(30, 0, 580.0, 500.0),
        ],
    );
    assert_eq!(completed_keys(&events), vec!["swipe:1:r"]);
}

#[test]
fn trace_tracks_last_dispatch() {
    let mut manager = GestureManager::with_standard_gestures(AREA, *active_config());
    manager.on_touch_down(5, 0, Point::new(700.0, 500.0));
    let trace = manager.last_trace();
    assert_eq!(trace.time, 5);
    assert_eq!(trace.event, Some(TouchEventKind::Down));
    assert_eq!(trace.fingers, 1);
    assert_eq!(trace.state_id, DispatchStateId::Touching);
    assert!(trace.running > 0);
    assert!(!trace.ignored);
}

#[test]
fn interrupt_chain_calls_back_on_completion() {
    let calls = Rc::new(Cell::new(0));
    let described = Rc::new(Cell::new(0));
    let (call_counter, described_counter) = (Rc::clone(&calls), Rc::clone(&described));
    let mut manager = manager_with(
        Gesture::new(GestureKind::Interrupt, vec![Action::multi_down(2, 400)]).on_complete(
            move |gesture| {
                call_counter.set(call_counter.get() + 1);
                if gesture.is_some() {
                    described_counter.set(described_counter.get() + 1);
                }
            },
        ),
    );
    let events = feed(
        &mut manager,
        &[
            TouchEvent::down(0, 0, 100.0, 100.0),
            TouchEvent::down(10, 1, 200.0, 100.0),
        ],
    );

    assert_eq!(manager.gestures()[0].life(), Life::Completed);
    assert_eq!(calls.get(), 1);
    assert_eq!(described.get(), 0);
    assert!(completed_keys(&events).is_empty());
}

#[test]
fn drag_after_finger_gate_reports_fingers_on_surface() {
    let config = *active_config();
    let mut manager = manager_with(Gesture::new(
        GestureKind::Swipe,
        vec![
            Action::multi_down(3, 400),
            Action::drag(catalog::swipe_params(&config)),
            Action::liftoff(NO_TIMEOUT),
        ],
    ));
    let mut stream = three_finger_down().to_vec();
    stream.extend([
        TouchEvent::motion(200, 0, 0.0, 290.0),
        TouchEvent::up(300, 0, 0.0, 290.0),
    ]);
    let events = feed(&mut manager, &stream);

    assert_eq!(completed_keys(&events), vec!["swipe:3:l"]);
}

#[test]
fn catalog_swipe_ignores_a_single_finger() {
    let mut manager = manager_with(catalog::swipe(active_config()));
    let events = feed(
        &mut manager,
        &[
            TouchEvent::down(0, 0, 500.0, 500.0),
            TouchEvent::motion(20, 0, 500.0, 700.0),
            TouchEvent::up(40, 0, 500.0, 700.0),
        ],
    );

    assert!(completed_keys(&events).is_empty());
    assert_eq!(
        events,
        vec![GestureEvent::Cancelled {
            time: 40,
            kind: GestureKind::Swipe,
        }]
    );
}

fn assert_single_completion_per_dispatch(
    manager: &mut GestureManager,
    stream: &[TouchEvent],
) -> Vec<String> {
    let mut keys = Vec::new();
    for event in stream {
        let output = manager.dispatch(*event);
        let completed = completed_keys(&output.events);
        assert!(completed.len() <= 1, "{event:?} completed {completed:?}");
        keys.extend(completed);
    }
    keys
}

#[test]
fn standard_set_one_finger_edge_drag_is_only_an_edge_swipe() {
    let mut manager = GestureManager::with_standard_gestures(AREA, *active_config());
    let keys = assert_single_completion_per_dispatch(
        &mut manager,
        &[
            TouchEvent::down(100, 0, 5.0, 300.0),
            TouchEvent::motion(150, 0, 250.0, 300.0),
            TouchEvent::motion(200, 0, 480.0, 300.0),
            TouchEvent::up(300, 0, 480.0, 300.0),
        ],
    );

    assert_eq!(keys, vec!["edge:l:r"]);
}

#[test]
fn standard_set_three_finger_swipe_is_only_a_swipe() {
    let mut manager = GestureManager::with_standard_gestures(AREA, *active_config());
    let mut stream = three_finger_down().to_vec();
    let starts = [(0, 450.0, 290.0), (1, 500.0, 300.0), (2, 550.0, 290.0)];
    for tick in 1..=16u32 {
        for (finger, x, y) in starts {
            let moved = x - 10.0 * f64::from(tick);
            stream.push(TouchEvent::motion(100 + tick * 5, finger, moved, y));
        }
    }
    stream.push(TouchEvent::up(200, 0, 290.0, 290.0));
    let keys = assert_single_completion_per_dispatch(&mut manager, &stream);

    assert_eq!(keys, vec!["swipe:3:l"]);
}
