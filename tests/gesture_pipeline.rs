//! Replays recorded touch traces through the public manager API.

use std::cell::RefCell;
use std::rc::Rc;

use touchcore::touch::{FeedbackSignal, GestureListener, RecognitionResult};
use touchcore::{
    GestureEvent, GestureKind, SwipeDirection, Task, TouchControlConfigPatch, TouchControlManager,
    TouchPoint, TouchTarget,
};

#[derive(Clone, Copy, Debug)]
enum Phase {
    Start,
    Move,
    End,
    Cancel,
}

#[derive(Clone, Copy, Debug)]
struct TraceRow {
    phase: Phase,
    touch: TouchPoint,
}

/// `ms,phase,id,x,y` per line; `#` starts a comment.
fn parse_trace(trace: &str) -> Vec<TraceRow> {
    trace
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| {
            let fields: Vec<&str> = line.split(',').map(str::trim).collect();
            assert_eq!(fields.len(), 5, "bad trace line: {line}");
            let phase = match fields[1] {
                "start" => Phase::Start,
                "move" => Phase::Move,
                "end" => Phase::End,
                "cancel" => Phase::Cancel,
                other => panic!("unknown phase {other}"),
            };
            let t_ms = fields[0].parse().expect("ms");
            let id = fields[2].parse().expect("id");
            let x = fields[3].parse().expect("x");
            let y = fields[4].parse().expect("y");
            TraceRow {
                phase,
                touch: TouchPoint::new(id, x, y, t_ms),
            }
        })
        .collect()
}

fn replay(manager: &mut TouchControlManager, trace: &str) -> Vec<GestureEvent> {
    let mut out = Vec::new();
    for row in parse_trace(trace) {
        match row.phase {
            Phase::Start => {
                manager.handle_touch_start(row.touch);
            }
            Phase::Move => {
                manager.handle_touch_move(row.touch);
            }
            Phase::End => out.extend(manager.handle_touch_end(row.touch)),
            Phase::Cancel => manager.handle_touch_cancel(),
        }
        manager.poll(row.touch.t_ms);
    }
    out
}

const MIXED_SESSION: &str = "
    # tap on the button
    0,start,1,20,20
    40,end,1,21,20
    # long press
    1000,start,1,200,200
    1650,end,1,202,201
    # fast swipe left
    3000,start,1,400,300
    3050,move,1,350,300
    3100,end,1,280,300
    # slow pan down
    5000,start,1,100,100
    5500,move,1,100,130
    6000,end,1,100,160
    # cancelled drag produces nothing
    7000,start,1,50,50
    7020,move,1,90,50
    7030,cancel,0,0,0
    # two-finger rotate
    9000,start,1,300,300
    9005,start,2,400,300
    9010,move,2,400,300
    9200,move,2,300,400
    9250,end,2,300,400
    9400,end,1,300,300
";

#[test]
fn mixed_session_recognizes_every_gesture() {
    let mut manager = TouchControlManager::default();
    manager.register_touch_target(
        TouchTarget::new("ok", 0.0, 0.0, 100.0, 60.0).with_label("OK"),
    );

    let events = replay(&mut manager, MIXED_SESSION);
    let kinds: Vec<GestureKind> = events.iter().map(|event| event.kind).collect();
    assert_eq!(
        kinds,
        vec![
            GestureKind::Tap,
            GestureKind::LongPress,
            GestureKind::Swipe(SwipeDirection::Left),
            GestureKind::Pan,
            GestureKind::Rotate,
        ]
    );
    assert_eq!(
        events[0].target.as_ref().map(|target| target.id.as_str()),
        Some("ok")
    );
    assert!(events[1..].iter().all(|event| event.target.is_none()));

    match events[2].result {
        Some(RecognitionResult::Swipe {
            direction,
            velocity,
        }) => {
            assert_eq!(direction, SwipeDirection::Left);
            assert!((velocity - 1.2).abs() < 1e-9);
        }
        other => panic!("expected swipe, got {other:?}"),
    }

    let snapshot = manager.performance_snapshot();
    assert_eq!(snapshot.error_rate, 0.0);
    assert_eq!(snapshot.success_rate, 1.0);
    assert!(manager.monitor().samples_taken() > 0);
}

#[test]
fn listeners_batches_and_feedback_work_together() {
    let mut manager = TouchControlManager::default();
    manager.update_config(
        &toml::from_str::<TouchControlConfigPatch>(
            r#"
            [accessibility]
            screen_reader_enabled = true

            [resources.batch]
            batch_size = 2
            "#,
        )
        .expect("patch parses"),
    );
    manager.register_touch_target(TouchTarget::new("ok", 0.0, 0.0, 100.0, 60.0).with_label("OK"));

    let taps = Rc::new(RefCell::new(0usize));
    let counter = taps.clone();
    let listener: GestureListener = Rc::new(move |_: &GestureEvent| {
        *counter.borrow_mut() += 1;
        Ok(())
    });
    manager.on_gesture(GestureKind::Tap, listener);

    let announcements = Rc::new(RefCell::new(Vec::new()));
    let sink = announcements.clone();
    manager.on_feedback(Rc::new(move |signal: &FeedbackSignal| {
        if let FeedbackSignal::Announcement(text) = signal {
            sink.borrow_mut().push(text.clone());
        }
        Ok(())
    }));

    let batches = Rc::new(RefCell::new(Vec::new()));
    let sink = batches.clone();
    manager.set_batch_processor(Some(Box::new(move |batch: &[GestureEvent]| {
        sink.borrow_mut()
            .push(batch.iter().map(|event| event.kind).collect::<Vec<_>>());
        Ok(())
    })));

    manager.handle_touch_start(TouchPoint::new(1, 10.0, 10.0, 0));
    manager.handle_touch_end(TouchPoint::new(1, 10.0, 10.0, 30));
    manager.handle_touch_start(TouchPoint::new(1, 10.0, 10.0, 100));
    manager.handle_touch_end(TouchPoint::new(1, 10.0, 10.0, 130));
    assert!(batches.borrow().is_empty());

    assert_eq!(manager.poll(200), vec![Task::DrainBatch]);
    assert_eq!(*taps.borrow(), 2);
    assert_eq!(
        *batches.borrow(),
        vec![vec![GestureKind::Tap, GestureKind::Tap]]
    );
    assert_eq!(
        *announcements.borrow(),
        vec!["Tap on OK".to_owned(), "Tap on OK".to_owned()]
    );

    // Second identical tap hit the result cache.
    assert_eq!(manager.resource_stats().cache.hits, 1);

    manager.teardown();
    assert!(!manager.is_running());
}
