//! Emission phase: preference aggregation and render-plan entries.
//!
//! Walks the placed tree once, in document order: preference writes,
//! callbacks, lifecycle handlers and async units all see siblings left to
//! right. A z-index only affects drawing, so entries carry their sibling path
//! and are sorted into draw order when the walk is done.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use brook_core::node::{LifecycleEvent, ReaderAction, TaskAction};
use brook_core::preference::AnyValue;
use brook_core::{
    FontKey, ForegroundKey, Node, NodeKind, Paint, PaintInstruction, PlatformTextMeasurer, Point,
    PreferenceLedger, PreferenceSlot, Rect, RenderEntry, Size, ViewId, Visit, Visitor,
};

use super::{Geometry, isolate};
use super::measure::ResolvedNode;
use crate::config::ResolverConfig;
use crate::lifecycle::LifecycleScan;

pub(crate) type Callback = Arc<dyn Fn(&AnyValue) + Send + Sync>;

/// `(z-index, document index)` of every sibling step from the root.
type DrawKey = Vec<(f64, usize)>;

/// The z-index a node is drawn with among its siblings, looking through
/// modifiers that do not change layout or drawing.
fn sibling_z(node: &Node) -> f64 {
    let mut current = node;
    loop {
        match current.kind() {
            NodeKind::ZIndex(z) => return *z,
            NodeKind::Environment(_)
            | NodeKind::PreferenceWrite(_)
            | NodeKind::PreferenceReader(_)
            | NodeKind::AlignmentGuide(_)
            | NodeKind::LayoutPriority(_)
            | NodeKind::Hidden
            | NodeKind::Identity(_)
            | NodeKind::Lifecycle { .. }
            | NodeKind::Task(_) => match current.child(0) {
                Some(child) => current = child,
                None => return 0.0,
            },
            _ => return 0.0,
        }
    }
}

fn draw_cmp(a: &DrawKey, b: &DrawKey) -> Ordering {
    a.iter()
        .zip(b)
        .map(|(x, y)| x.0.total_cmp(&y.0).then(x.1.cmp(&y.1)))
        .find(|ordering| ordering.is_ne())
        .unwrap_or_else(|| a.len().cmp(&b.len()))
}

/// Everything one traversal produced, before it is committed.
#[derive(Default)]
pub(crate) struct Emission {
    pub entries: Vec<RenderEntry>,
    pub callbacks: Vec<(ViewId, Callback, AnyValue)>,
    pub derived: HashMap<ViewId, AnyValue>,
    pub observed: Vec<(PreferenceSlot, AnyValue)>,
    pub geometry: BTreeMap<ViewId, Geometry>,
    pub lifecycle: LifecycleScan,
    pub tasks: Vec<(ViewId, TaskAction)>,
}

pub(crate) struct Emitter<'a> {
    config: &'a ResolverConfig,
    measurer: &'a dyn PlatformTextMeasurer,
    ledger: PreferenceLedger,
    /// Ledger index of each open reader scope, innermost last.
    readers: Vec<usize>,
    z_index: Vec<f64>,
    /// Path of the node being visited.
    path: DrawKey,
    /// Children entered so far, per open node.
    siblings: Vec<usize>,
    draw_keys: Vec<DrawKey>,
    reordered: bool,
    observers: usize,
    out: Emission,
}

impl<'a> Emitter<'a> {
    /// Opens one terminal root scope per observed key.
    pub fn new(
        config: &'a ResolverConfig,
        measurer: &'a dyn PlatformTextMeasurer,
        observers: &[PreferenceSlot],
    ) -> Self {
        let mut ledger = PreferenceLedger::new();
        for slot in observers {
            ledger.open(*slot, true);
        }
        Self {
            config,
            measurer,
            ledger,
            readers: Vec::new(),
            z_index: Vec::new(),
            path: Vec::new(),
            siblings: Vec::new(),
            draw_keys: Vec::new(),
            reordered: false,
            observers: observers.len(),
            out: Emission::default(),
        }
    }

    pub fn finish(mut self) -> Emission {
        let mut observed = Vec::with_capacity(self.observers);
        while let Some(closed) = self.ledger.close() {
            let slot = closed.slot;
            observed.push((slot, closed.into_value()));
        }
        observed.reverse();
        if self.ledger.discarded() > 0 {
            tracing::trace!(count = self.ledger.discarded(), "preference writes without reader");
        }
        self.out.observed = observed;
        if self.reordered {
            let mut keyed: Vec<_> = self.draw_keys.into_iter().zip(self.out.entries).collect();
            keyed.sort_by(|(a, _), (b, _)| draw_cmp(a, b));
            self.out.entries = keyed.into_iter().map(|(_, entry)| entry).collect();
        }
        self.out
    }

    fn record(&mut self, node: &ResolvedNode) {
        self.out.geometry.insert(
            node.id,
            Geometry {
                rect: node.rect,
                dimensions: node.dimensions.clone(),
                proposal: node.proposal,
            },
        );
    }

    fn record_subtree(&mut self, node: &ResolvedNode) {
        for child in &node.children {
            self.record(child);
            self.record_subtree(child);
        }
    }

    fn snap(&self, rect: Rect) -> Rect {
        let x = self.config.snap(rect.x());
        let y = self.config.snap(rect.y());
        let max_x = self.config.snap(rect.max_x());
        let max_y = self.config.snap(rect.max_y());
        Rect::new(Point::new(x, y), Size::new(max_x - x, max_y - y))
    }

    fn paint(&self, node: &ResolvedNode) -> Option<PaintInstruction> {
        let foreground = || node.env.lookup::<ForegroundKey>();
        match node.node.kind() {
            NodeKind::Shape { paint, .. } => match paint {
                Paint::Foreground => Some(PaintInstruction::Fill(foreground())),
                Paint::Fill(color) => Some(PaintInstruction::Fill(*color)),
                Paint::Stroke { color, width } => Some(PaintInstruction::Stroke {
                    color: *color,
                    width: *width,
                }),
                Paint::Image(name) => Some(PaintInstruction::Image(name.clone())),
                Paint::Clear => None,
            },
            NodeKind::Text(content) => {
                let font = node.env.lookup::<FontKey>();
                let line_breaks = isolate(node.id, "text layout", || {
                    self.measurer
                        .measure(content, &font, Some(node.rect.width()))
                        .line_breaks
                })
                .unwrap_or_default();
                Some(PaintInstruction::Text {
                    content: content.clone(),
                    font,
                    color: foreground(),
                    line_breaks,
                })
            }
            _ => None,
        }
    }
}

impl Visitor<ResolvedNode> for Emitter<'_> {
    fn enter(&mut self, node: &ResolvedNode, _depth: usize) -> Visit {
        self.record(node);
        let index = self.siblings.last_mut().map_or(0, |count| {
            *count += 1;
            *count - 1
        });
        let z = sibling_z(&node.node);
        self.reordered |= z != 0.0;
        self.path.push((z, index));
        self.siblings.push(0);

        if node.derived
            && let Some(reader) = self.readers.last()
        {
            // Derived content never feeds the reader that produced it.
            self.ledger.suspend(*reader);
        }

        match node.node.kind() {
            NodeKind::Hidden => {
                self.record_subtree(node);
                return Visit::Skip;
            }
            NodeKind::PreferenceWrite(write) => {
                if let Some(value) = isolate(node.id, "preference", || write.evaluate(node.rect)) {
                    self.ledger.write(write.slot(), value);
                }
            }
            NodeKind::PreferenceReader(reader) => {
                let index = self.ledger.open(reader.slot(), reader.is_terminal());
                self.readers.push(index);
            }
            NodeKind::ZIndex(z) => self.z_index.push(*z),
            NodeKind::Lifecycle { event, handler } => {
                let entry = (node.id, handler.clone());
                match event {
                    LifecycleEvent::Appear => self.out.lifecycle.appear.push(entry),
                    LifecycleEvent::Disappear => self.out.lifecycle.disappear.push(entry),
                }
            }
            NodeKind::Task(action) => self.out.tasks.push((node.id, action.clone())),
            _ => {
                if let Some(paint) = self.paint(node) {
                    self.out.entries.push(RenderEntry {
                        id: node.id,
                        bounds: self.snap(node.rect),
                        paint,
                        z_index: self.z_index.last().copied().unwrap_or(0.0),
                    });
                    self.draw_keys.push(self.path.clone());
                }
            }
        }
        Visit::Children
    }

    fn exit(&mut self, node: &ResolvedNode, _depth: usize) {
        self.path.pop();
        self.siblings.pop();
        match node.node.kind() {
            NodeKind::PreferenceReader(reader) => {
                self.readers.pop();
                let value = self.ledger.close().map(|closed| closed.into_value());
                match (reader.action(), value) {
                    (ReaderAction::Callback(callback), Some(value)) => {
                        self.out.callbacks.push((node.id, callback.clone(), value));
                    }
                    (ReaderAction::Derived { .. }, Some(value)) => {
                        self.out.derived.insert(node.id, value);
                    }
                    _ => {}
                }
            }
            NodeKind::ZIndex(_) => {
                self.z_index.pop();
            }
            _ => {}
        }
        if node.derived
            && let Some(reader) = self.readers.last()
        {
            self.ledger.resume(*reader);
        }
    }
}
