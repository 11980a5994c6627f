//! Pointer gestures over realized nodes, kept as explicit state so hosts can
//! drive them from any event source.

use chrono::{Duration, NaiveDate};

use super::day_offset::pixels_to_days;
use super::projector::find_node;
use crate::error::{GanttError, Result};
use crate::model::{Edge, Node, RowId};

/// Callbacks the widget produces for its host.
pub trait GanttHandler {
    /// A drag or resize finished with new dates for `node`.
    fn on_bar_change(&mut self, _start: NaiveDate, _end: NaiveDate, _node: &Node) {}

    /// A link gesture ended on another bar. Return [`ConnectResponse::Defer`]
    /// to validate asynchronously and settle it later via [`LinkGesture::resolve`].
    fn on_connect(&mut self, _connection: &Connection) -> ConnectResponse {
        ConnectResponse::Accept
    }

    fn on_disconnect(&mut self, _from: &RowId, _to: &RowId) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragKind {
    Move,
    ResizeStart,
    ResizeEnd,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DragSnapshot {
    pub id: RowId,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub start_pointer_x: f32,
    /// Dates under the pointer right now.
    pub preview: (NaiveDate, NaiveDate),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarChange {
    pub id: RowId,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum BarGesture {
    #[default]
    Idle,
    Moving(DragSnapshot),
    ResizingStart(DragSnapshot),
    ResizingEnd(DragSnapshot),
    Committing {
        change: BarChange,
    },
}

impl BarGesture {
    /// Grab `node` at `pointer_x`.
    ///
    /// A bar with one known date is dragged as the `min_bar_range_days` span
    /// it was drawn with, so a plain move keeps its width.
    pub fn begin(
        &mut self,
        kind: DragKind,
        node: &Node,
        pointer_x: f32,
        min_bar_range_days: i64,
    ) -> Result<()> {
        let min_range = Duration::days(min_bar_range_days);
        let (start, end) = match (node.start, node.end) {
            (Some(start), Some(end)) => (start, end),
            (Some(start), None) => (start, start + min_range),
            (None, Some(end)) => (end - min_range, end),
            (None, None) => return Err(GanttError::NotDraggable(node.id.clone())),
        };
        if !node.draggable {
            return Err(GanttError::NotDraggable(node.id.clone()));
        }
        let snapshot = DragSnapshot {
            id: node.id.clone(),
            start,
            end,
            start_pointer_x: pointer_x,
            preview: (start, end),
        };
        *self = match kind {
            DragKind::Move => BarGesture::Moving(snapshot),
            DragKind::ResizeStart => BarGesture::ResizingStart(snapshot),
            DragKind::ResizeEnd => BarGesture::ResizingEnd(snapshot),
        };
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, BarGesture::Idle)
    }

    pub fn snapshot(&self) -> Option<&DragSnapshot> {
        match self {
            BarGesture::Moving(s) | BarGesture::ResizingStart(s) | BarGesture::ResizingEnd(s) => {
                Some(s)
            }
            BarGesture::Idle | BarGesture::Committing { .. } => None,
        }
    }

    /// Track the pointer. Returns the previewed dates while a drag is live.
    pub fn update(&mut self, pointer_x: f32, cell_width: f32) -> Option<(NaiveDate, NaiveDate)> {
        let (snapshot, kind) = match self {
            BarGesture::Moving(s) => (s, DragKind::Move),
            BarGesture::ResizingStart(s) => (s, DragKind::ResizeStart),
            BarGesture::ResizingEnd(s) => (s, DragKind::ResizeEnd),
            BarGesture::Idle | BarGesture::Committing { .. } => return None,
        };
        let delta = Duration::days(pixels_to_days(pointer_x - snapshot.start_pointer_x, cell_width));
        snapshot.preview = match kind {
            DragKind::Move => (snapshot.start + delta, snapshot.end + delta),
            DragKind::ResizeStart => ((snapshot.start + delta).min(snapshot.end), snapshot.end),
            DragKind::ResizeEnd => (snapshot.start, (snapshot.end + delta).max(snapshot.start)),
        };
        Some(snapshot.preview)
    }

    /// Pointer released. Moves to `Committing` when the dates changed.
    pub fn release(&mut self) -> Result<Option<BarChange>> {
        let snapshot = self.snapshot().cloned().ok_or(GanttError::NoActiveGesture)?;
        let (start, end) = snapshot.preview;
        if (start, end) == (snapshot.start, snapshot.end) {
            *self = BarGesture::Idle;
            return Ok(None);
        }
        let change = BarChange {
            id: snapshot.id,
            start,
            end,
        };
        *self = BarGesture::Committing {
            change: change.clone(),
        };
        Ok(Some(change))
    }

    pub fn finish(&mut self) {
        if matches!(self, BarGesture::Committing { .. }) {
            *self = BarGesture::Idle;
        }
    }

    pub fn cancel(&mut self) {
        *self = BarGesture::Idle;
    }

    /// Release and report the change through `handler`.
    ///
    /// The dragged row must still be realized; otherwise the gesture is dropped
    /// and the lookup error returned.
    pub fn commit(
        &mut self,
        nodes: &[Node],
        handler: &mut dyn GanttHandler,
    ) -> Result<Option<BarChange>> {
        let Some(change) = self.release()? else {
            return Ok(None);
        };
        let node = match find_node(nodes, &change.id) {
            Ok(node) => node,
            Err(err) => {
                self.cancel();
                return Err(err);
            }
        };
        handler.on_bar_change(change.start, change.end, node);
        self.finish();
        Ok(Some(change))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub source: RowId,
    pub target: RowId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectResponse {
    Accept,
    Reject,
    Defer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    Committed(Edge),
    Rejected,
    /// Awaiting [`LinkGesture::resolve`] with this ticket.
    Pending(u64),
}

/// Drawing a dependency from one bar to another.
#[derive(Debug, Clone, Default)]
pub struct LinkGesture {
    source: Option<RowId>,
    pending: Vec<(u64, Edge)>,
    next_ticket: u64,
}

impl LinkGesture {
    pub fn begin(&mut self, source: RowId) {
        self.source = Some(source);
    }

    pub fn source(&self) -> Option<&RowId> {
        self.source.as_ref()
    }

    pub fn cancel(&mut self) {
        self.source = None;
    }

    /// Finish the gesture on `target` and ask the handler to accept the link.
    pub fn complete(
        &mut self,
        target: &RowId,
        nodes: &[Node],
        handler: &mut dyn GanttHandler,
    ) -> Result<LinkOutcome> {
        let source = self.source.take().ok_or(GanttError::NoActiveGesture)?;
        find_node(nodes, &source)?;
        find_node(nodes, target)?;
        if &source == target {
            return Ok(LinkOutcome::Rejected);
        }

        let connection = Connection {
            source,
            target: target.clone(),
        };
        let edge = Edge::new(connection.source.clone(), connection.target.clone());
        Ok(match handler.on_connect(&connection) {
            ConnectResponse::Accept => LinkOutcome::Committed(edge),
            ConnectResponse::Reject => {
                log::debug!("connection {} rejected", edge.id());
                LinkOutcome::Rejected
            }
            ConnectResponse::Defer => {
                let ticket = self.next_ticket;
                self.next_ticket += 1;
                self.pending.push((ticket, edge));
                LinkOutcome::Pending(ticket)
            }
        })
    }

    /// Settle a deferred connection. Accepted edges are handed back for the
    /// host to store; rejected ones are dropped without retry.
    pub fn resolve(&mut self, ticket: u64, accepted: bool) -> Result<Option<Edge>> {
        let Some(position) = self.pending.iter().position(|(t, _)| *t == ticket) else {
            log::warn!("no pending connection for ticket {ticket}");
            return Err(GanttError::UnknownConnection(ticket));
        };
        let (_, edge) = self.pending.remove(position);
        if accepted {
            Ok(Some(edge))
        } else {
            log::debug!("deferred connection {} rejected", edge.id());
            Ok(None)
        }
    }

    /// Edges drawn while their connection is still being validated.
    pub fn transient_edges(&self) -> impl Iterator<Item = &Edge> {
        self.pending.iter().map(|(_, edge)| edge)
    }

    pub fn disconnect(&self, edge: &Edge, handler: &mut dyn GanttHandler) {
        handler.on_disconnect(&edge.source, &edge.target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NodeType;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn node(id: &str, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Node {
        Node {
            id: RowId::from(id),
            row_index: 0,
            node_type: NodeType::Bar,
            x: 0.0,
            y: 0.0,
            width: 30.0,
            height: 20.0,
            start,
            end,
            fixed_x: None,
            draggable: start.is_some() || end.is_some(),
            empty_range: start.is_none() && end.is_none(),
            group: None,
        }
    }

    #[derive(Default)]
    struct Recorder {
        changes: Vec<(NaiveDate, NaiveDate, RowId)>,
        response: Option<ConnectResponse>,
        disconnected: Vec<(RowId, RowId)>,
    }

    impl GanttHandler for Recorder {
        fn on_bar_change(&mut self, start: NaiveDate, end: NaiveDate, node: &Node) {
            self.changes.push((start, end, node.id.clone()));
        }
        fn on_connect(&mut self, _connection: &Connection) -> ConnectResponse {
            self.response.unwrap_or(ConnectResponse::Accept)
        }
        fn on_disconnect(&mut self, from: &RowId, to: &RowId) {
            self.disconnected.push((from.clone(), to.clone()));
        }
    }

    #[test]
    fn move_commits_shifted_dates() {
        let nodes = [node("a", Some(date(2024, 6, 1)), Some(date(2024, 6, 3)))];
        let mut gesture = BarGesture::default();
        gesture.begin(DragKind::Move, &nodes[0], 100.0, 1).unwrap();
        assert_eq!(
            gesture.update(162.0, 30.0),
            Some((date(2024, 6, 3), date(2024, 6, 5)))
        );

        let mut recorder = Recorder::default();
        let change = gesture.commit(&nodes, &mut recorder).unwrap();
        assert_eq!(
            change,
            Some(BarChange {
                id: RowId::from("a"),
                start: date(2024, 6, 3),
                end: date(2024, 6, 5),
            })
        );
        assert_eq!(recorder.changes.len(), 1);
        assert_eq!(gesture, BarGesture::Idle);
    }

    #[test]
    fn resizes_never_cross_the_other_edge() {
        let n = node("a", Some(date(2024, 6, 1)), Some(date(2024, 6, 3)));
        let mut gesture = BarGesture::default();

        gesture.begin(DragKind::ResizeStart, &n, 0.0, 1).unwrap();
        assert_eq!(gesture.update(300.0, 30.0), Some((date(2024, 6, 3), date(2024, 6, 3))));
        gesture.cancel();

        gesture.begin(DragKind::ResizeEnd, &n, 0.0, 1).unwrap();
        assert_eq!(gesture.update(-300.0, 30.0), Some((date(2024, 6, 1), date(2024, 6, 1))));
        assert!(matches!(gesture.release().unwrap(), Some(BarChange { .. })));
        assert!(matches!(gesture, BarGesture::Committing { .. }));
        gesture.finish();
        assert!(!gesture.is_active());
    }

    #[test]
    fn unchanged_release_and_idle_release() {
        let n = node("a", Some(date(2024, 6, 1)), Some(date(2024, 6, 3)));
        let mut gesture = BarGesture::default();
        assert!(matches!(gesture.release(), Err(GanttError::NoActiveGesture)));

        gesture.begin(DragKind::Move, &n, 10.0, 1).unwrap();
        gesture.update(20.0, 30.0);
        assert_eq!(gesture.release().unwrap(), None);
        assert_eq!(gesture, BarGesture::Idle);
    }

    #[test]
    fn empty_and_vanished_bars() {
        let mut gesture = BarGesture::default();
        let empty = node("e", None, None);
        assert!(matches!(
            gesture.begin(DragKind::Move, &empty, 0.0, 1),
            Err(GanttError::NotDraggable(_))
        ));

        let n = node("a", Some(date(2024, 6, 1)), None);
        gesture.begin(DragKind::Move, &n, 0.0, 1).unwrap();
        gesture.update(30.0, 30.0);
        let err = gesture.commit(&[], &mut Recorder::default()).unwrap_err();
        assert!(matches!(err, GanttError::RowNotFound(_)));
        assert_eq!(gesture, BarGesture::Idle);
    }

    #[test]
    fn single_date_bars_keep_their_drawn_width() {
        let start_only = node("s", Some(date(2024, 6, 5)), None);
        let mut gesture = BarGesture::default();
        gesture.begin(DragKind::Move, &start_only, 0.0, 3).unwrap();
        assert_eq!(gesture.update(10.0, 10.0), Some((date(2024, 6, 6), date(2024, 6, 9))));

        let mut recorder = Recorder::default();
        gesture.commit(&[start_only], &mut recorder).unwrap();
        let (start, end, _) = &recorder.changes[0];
        // Four days, the same as the projected `min_bar_range + 1` cells.
        assert_eq!((*end - *start).num_days() + 1, 4);

        let end_only = node("e", None, Some(date(2024, 6, 5)));
        gesture.begin(DragKind::ResizeEnd, &end_only, 0.0, 3).unwrap();
        assert_eq!(gesture.update(20.0, 10.0), Some((date(2024, 6, 2), date(2024, 6, 7))));
    }

    #[test]
    fn links_accept_reject_and_defer() {
        let nodes = [
            node("a", Some(date(2024, 6, 1)), Some(date(2024, 6, 3))),
            node("b", Some(date(2024, 6, 4)), Some(date(2024, 6, 5))),
        ];
        let (a, b) = (RowId::from("a"), RowId::from("b"));
        let mut links = LinkGesture::default();
        let mut recorder = Recorder::default();

        links.begin(a.clone());
        assert_eq!(
            links.complete(&b, &nodes, &mut recorder).unwrap(),
            LinkOutcome::Committed(Edge::new(a.clone(), b.clone()))
        );

        links.begin(a.clone());
        assert_eq!(links.complete(&a, &nodes, &mut recorder).unwrap(), LinkOutcome::Rejected);

        recorder.response = Some(ConnectResponse::Reject);
        links.begin(a.clone());
        assert_eq!(links.complete(&b, &nodes, &mut recorder).unwrap(), LinkOutcome::Rejected);

        recorder.response = Some(ConnectResponse::Defer);
        links.begin(a.clone());
        let LinkOutcome::Pending(first) = links.complete(&b, &nodes, &mut recorder).unwrap() else {
            panic!("expected a pending connection");
        };
        links.begin(b.clone());
        let LinkOutcome::Pending(second) = links.complete(&a, &nodes, &mut recorder).unwrap() else {
            panic!("expected a pending connection");
        };
        assert_eq!(links.transient_edges().count(), 2);

        assert_eq!(links.resolve(first, true).unwrap(), Some(Edge::new(a.clone(), b.clone())));
        assert_eq!(links.resolve(second, false).unwrap(), None);
        assert_eq!(links.transient_edges().count(), 0);
        assert!(matches!(links.resolve(first, true), Err(GanttError::UnknownConnection(_))));

        links.disconnect(&Edge::new(a.clone(), b.clone()), &mut recorder);
        assert_eq!(recorder.disconnected, vec![(a, b)]);
    }

    #[test]
    fn links_to_unrealized_rows_fail() {
        let nodes = [node("a", Some(date(2024, 6, 1)), Some(date(2024, 6, 3)))];
        let mut links = LinkGesture::default();
        links.begin(RowId::from("a"));
        let err = links
            .complete(&RowId::from("zzz"), &nodes, &mut Recorder::default())
            .unwrap_err();
        assert!(matches!(err, GanttError::RowNotFound(_)));
        assert!(links.source().is_none());
        assert!(matches!(
            links.complete(&RowId::from("a"), &nodes, &mut Recorder::default()),
            Err(GanttError::NoActiveGesture)
        ));
    }
}
