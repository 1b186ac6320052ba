use std::{cmp::Reverse, collections::BinaryHeap};

use crate::{
    beach_line::ArcId,
    geom::incircle,
    num::{Float, Tolerance},
    sites::{SiteIdx, Sites},
};

/// A scheduled disappearance of an arc from the beach line.
///
/// Events are never removed from the queue when they become stale. Instead, the arc
/// remembers the sequence number of the one event that is still current for it, and
/// everything else gets skipped when it reaches the front of the queue.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CircleEvent {
    /// The sweep position at which the arc shrinks to nothing.
    pub y: Float,
    /// The `x` coordinate of the circle's center.
    pub x: Float,
    /// Insertion order, used for breaking ties and for detecting stale events.
    pub seq: u64,
    pub arc: ArcId,
    /// The sites of the arc's left neighbor, the arc itself, and its right neighbor,
    /// at the time the event was scheduled.
    pub sites: [SiteIdx; 3],
}

impl std::fmt::Debug for CircleEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:?} -> circle({:?} #{}, {:?})",
            self.y, self.arc, self.seq, self.sites
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SweepEvent {
    Site(SiteIdx),
    Circle(CircleEvent),
}

/// Site events and circle events, merged in sweep order.
///
/// Site events are known up front, so they're just a sorted list. Circle events
/// get discovered as we go, so they live in a heap.
#[derive(Clone, Debug, Default)]
pub struct EventQueue {
    sites: Vec<SiteIdx>,
    next_site: usize,
    circles: BinaryHeap<Reverse<CircleEvent>>,
    next_seq: u64,
}

impl EventQueue {
    pub fn from_sites(sites: &Sites) -> Self {
        EventQueue {
            sites: sites.sweep_order(),
            ..Default::default()
        }
    }

    /// Schedules a circle event, returning its sequence number.
    pub fn push_circle(&mut self, y: Float, x: Float, arc: ArcId, sites: [SiteIdx; 3]) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.circles.push(Reverse(CircleEvent {
            y,
            x,
            seq,
            arc,
            sites,
        }));
        seq
    }

    pub fn peek_circle(&self) -> Option<&CircleEvent> {
        self.circles.peek().map(|Reverse(ev)| ev)
    }

    /// Throws away the circle event at the front of the queue.
    pub fn discard_circle(&mut self) {
        self.circles.pop();
    }

    pub fn peek_site(&self) -> Option<SiteIdx> {
        self.sites.get(self.next_site).copied()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.peek_site().is_none() && self.circles.is_empty()
    }

    /// Removes and returns the next event.
    ///
    /// A circle event is processed before a site event if it is not (significantly)
    /// after it in sweep order, unless one of the sites that tie with it lies strictly
    /// inside its circle. Such a site would cut the circle's arc before it vanishes.
    pub fn pop(&mut self, sites: &Sites, tol: Tolerance) -> Option<SweepEvent> {
        let circle_first = match (self.peek_site(), self.peek_circle()) {
            (Some(site), Some(circle)) => {
                tol.le(circle.y.into_inner(), sites[site].y)
                    && !self.cuts_circle(sites, circle, tol)
            }
            (None, Some(_)) => true,
            (_, None) => false,
        };

        if circle_first {
            self.circles.pop().map(|Reverse(ev)| SweepEvent::Circle(ev))
        } else {
            let site = self.peek_site()?;
            self.next_site += 1;
            Some(SweepEvent::Site(site))
        }
    }

    // Is there a pending site, no later than `circle` up to the tolerance, that is
    // strictly inside the circle?
    fn cuts_circle(&self, sites: &Sites, circle: &CircleEvent, tol: Tolerance) -> bool {
        let [l, c, r] = circle.sites.map(|s| sites[s]);
        let y = circle.y.into_inner();
        self.sites[self.next_site..]
            .iter()
            .map(|&s| sites[s])
            .take_while(|p| tol.le(p.y, y))
            .any(|p| incircle(l, c, r, p) > 0.0)
    }
}
