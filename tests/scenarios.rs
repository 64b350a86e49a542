//! End-to-end layout and preference scenarios.

use std::sync::{Arc, Mutex};

use brook::prelude::*;
use brook::{Paint, Point, Sizing};

fn flexible(ideal: Size, max: Size) -> Node {
    shape(
        Paint::Fill(Color::RED),
        Sizing::Flexible {
            min: Size::zero(),
            ideal,
            max,
        },
    )
}

fn relative(rect: Rect, to: Rect) -> Rect {
    Rect::new(Point::new(rect.x() - to.x(), rect.y() - to.y()), rect.size())
}

#[test]
fn padded_leaf_inside_fixed_frame() {
    let leaf = flexible(Size::new(50.0, 50.0), Size::new(f32::INFINITY, f32::INFINITY));
    let graph = leaf.padding(10.0).frame(40.0, 40.0);

    let mut resolver = Resolver::default();
    resolver.resolve(&graph, Size::new(100.0, 100.0)).unwrap();

    let frame = resolver.geometry(ViewId::ROOT).unwrap().rect;
    let leaf_id = ViewId::ROOT.child(0).child(0);
    let leaf = resolver.geometry(leaf_id).unwrap().rect;

    assert_eq!(frame.size(), Size::new(40.0, 40.0));
    assert_eq!(frame.origin(), Point::new(30.0, 30.0));
    assert_eq!(
        relative(leaf, frame),
        Rect::new(Point::new(10.0, 10.0), Size::new(20.0, 20.0))
    );

    let plan = resolver.last_plan().unwrap();
    let entry = plan.entry(leaf_id).unwrap();
    assert_eq!(entry.bounds, leaf);
}

#[test]
fn priority_claims_space_first() {
    let child = || flexible(Size::new(80.0, 10.0), Size::new(80.0, 10.0));
    let graph = hstack_with(
        VerticalAlignment::Center,
        0.0,
        [child(), child().layout_priority(1)],
    )
    .frame_flexible(Frame::new().width(100.0));

    let mut resolver = Resolver::default();
    resolver.resolve(&graph, Size::new(100.0, 100.0)).unwrap();

    let stack = ViewId::ROOT.child(0);
    let low = resolver.geometry(stack.child(0)).unwrap().rect;
    let high = resolver.geometry(stack.child(1)).unwrap().rect;

    assert_eq!(low.width(), 20.0);
    assert_eq!(high.width(), 80.0);
    assert_eq!(low.x(), 0.0);
    assert_eq!(high.x(), 20.0);
    assert_eq!(low.y(), high.y());
}

struct Answer;

impl PreferenceKey for Answer {
    type Value = i32;

    fn default_value() -> i32 {
        0
    }
}

#[test]
fn deep_write_reaches_reader_once() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();

    let deep = text("leaf").preference::<Answer>(7);
    let graph = vstack([text("sibling"), hstack([deep.padding(2.0)])])
        .on_preference_change::<Answer>(move |value| sink.lock().unwrap().push(*value));

    let mut resolver = Resolver::default();
    resolver.resolve(&graph, Size::new(200.0, 200.0)).unwrap();

    assert_eq!(*seen.lock().unwrap(), [7]);
}
