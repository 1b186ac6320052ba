use std::ops::Range;

use crate::{
    events::CircleEvent,
    geom::{breakpoint, Point},
    graph::EdgeIdx,
    num::Tolerance,
    sites::{SiteIdx, Sites},
    Error,
};

/// A handle to an arc in the beach line.
///
/// Arcs live in an arena whose slots get reused. Each reuse bumps the slot's
/// generation, so a handle to an arc that has since been removed never aliases
/// the slot's new occupant.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArcId {
    slot: usize,
    generation: u32,
}

impl std::fmt::Debug for ArcId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "a_{}.{}", self.slot, self.generation)
    }
}

/// The circle event currently attached to an arc.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PendingCircle {
    pub center: Point,
    /// The sequence number of the corresponding [`CircleEvent`].
    pub seq: u64,
}

#[derive(Clone, Debug)]
pub struct Arc {
    /// The edge traced out by this arc's left breakpoint.
    ///
    /// This is `None` only for the leftmost arc. (The edge traced out by the right
    /// breakpoint is the right neighbor's `left_edge`.)
    pub left_edge: Option<EdgeIdx>,
    pub circle: Option<PendingCircle>,
}

#[derive(Clone, Debug)]
struct Slot {
    generation: u32,
    arc: Option<Arc>,
}

/// Where a new site lands on the beach line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Location {
    Empty,
    /// Strictly inside the arc at this position.
    Inside(usize),
    /// On the breakpoint between the arc at this position and the one after it.
    Breakpoint(usize),
    /// To the right of everything. This only happens when the rightmost arc is
    /// degenerate, which means that all sites so far have the same `y` coordinate.
    Append,
}

// An arc's site never changes, so it's kept next to the handle. That way, reading
// the sites along the beach line doesn't need to go through the arena.
#[derive(Clone, Copy, Debug)]
struct Entry {
    id: ArcId,
    site: SiteIdx,
}

/// The sequence of parabolic arcs closest to the sweep line, from left to right.
#[derive(Clone, Debug, Default)]
pub struct BeachLine {
    slots: Vec<Slot>,
    free: Vec<usize>,
    order: Vec<Entry>,
}

impl BeachLine {
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Looks up an arc, returning `None` if it has been removed.
    pub fn get(&self, id: ArcId) -> Option<&Arc> {
        self.slots
            .get(id.slot)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.arc.as_ref())
    }

    pub fn id_at(&self, pos: usize) -> ArcId {
        self.order[pos].id
    }

    /// The site of the arc at `pos`.
    pub fn site(&self, pos: usize) -> SiteIdx {
        self.order[pos].site
    }

    pub fn at(&self, pos: usize) -> Result<&Arc, Error> {
        let id = self.id_at(pos);
        self.get(id)
            .ok_or_else(|| Error::Internal(format!("dead arc {id:?} at position {pos}")))
    }

    pub fn at_mut(&mut self, pos: usize) -> Result<&mut Arc, Error> {
        let id = self.id_at(pos);
        self.slots
            .get_mut(id.slot)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.arc.as_mut())
            .ok_or_else(|| Error::Internal(format!("dead arc {id:?} at position {pos}")))
    }

    /// Finds the current position of an arc.
    ///
    /// This is a linear scan. The beach line of a diagram with `n` sites has `O(sqrt(n))`
    /// arcs on typical inputs, and this only gets called once per circle event.
    pub fn position(&self, id: ArcId) -> Option<usize> {
        self.order.iter().position(|e| e.id == id)
    }

    pub fn insert(&mut self, pos: usize, site: SiteIdx, left_edge: Option<EdgeIdx>) -> ArcId {
        let arc = Arc {
            left_edge,
            circle: None,
        };
        let id = if let Some(slot) = self.free.pop() {
            self.slots[slot].arc = Some(arc);
            ArcId {
                slot,
                generation: self.slots[slot].generation,
            }
        } else {
            self.slots.push(Slot {
                generation: 0,
                arc: Some(arc),
            });
            ArcId {
                slot: self.slots.len() - 1,
                generation: 0,
            }
        };
        self.order.insert(pos, Entry { id, site });
        id
    }

    /// Removes a range of arcs, invalidating their handles.
    pub fn remove(&mut self, range: Range<usize>) {
        for Entry { id, .. } in self.order.drain(range) {
            let slot = &mut self.slots[id.slot];
            slot.arc = None;
            slot.generation += 1;
            self.free.push(id.slot);
        }
    }

    pub fn sites(&self) -> impl Iterator<Item = SiteIdx> + '_ {
        self.order.iter().map(|e| e.site)
    }

    /// The sites of the arc at `pos` and its two neighbors.
    pub fn triple(&self, pos: usize) -> Option<[SiteIdx; 3]> {
        if pos == 0 || pos + 1 >= self.len() {
            return None;
        }
        Some([self.site(pos - 1), self.site(pos), self.site(pos + 1)])
    }

    /// Is this the circle event that is currently attached to its arc?
    pub fn is_current(&self, ev: &CircleEvent) -> bool {
        self.get(ev.arc)
            .and_then(|arc| arc.circle)
            .map_or(false, |circle| circle.seq == ev.seq)
    }

    /// The `x` coordinate of the left end of the arc at `pos`.
    pub fn left_x(&self, sites: &Sites, pos: usize, directrix: f64) -> f64 {
        if pos == 0 {
            f64::NEG_INFINITY
        } else {
            let left = sites[self.site(pos - 1)];
            let right = sites[self.site(pos)];
            breakpoint(left, right, directrix)
        }
    }

    /// The `x` coordinate of the right end of the arc at `pos`.
    pub fn right_x(&self, sites: &Sites, pos: usize, directrix: f64) -> f64 {
        if pos + 1 == self.len() {
            let site = sites[self.site(pos)];
            if site.y == directrix {
                site.x
            } else {
                f64::INFINITY
            }
        } else {
            let left = sites[self.site(pos)];
            let right = sites[self.site(pos + 1)];
            breakpoint(left, right, directrix)
        }
    }

    /// Finds the arc directly behind `p`, with the sweep line at `p`.
    pub fn locate(&self, sites: &Sites, p: Point, tol: Tolerance) -> Location {
        if self.is_empty() {
            return Location::Empty;
        }

        // Find the first arc whose right end is not (significantly) left of `p`.
        let n = self.len();
        let (mut lo, mut hi) = (0, n);
        while lo < hi {
            let mid = (lo + hi) / 2;
            if p.x - self.right_x(sites, mid, p.y) > tol.eps {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }

        let pos = lo;
        if pos == n {
            Location::Append
        } else if tol.eq(self.left_x(sites, pos, p.y), p.x) {
            Location::Breakpoint(pos - 1)
        } else if tol.eq(p.x, self.right_x(sites, pos, p.y)) {
            if pos + 1 < n {
                Location::Breakpoint(pos)
            } else {
                Location::Append
            }
        } else {
            Location::Inside(pos)
        }
    }

    pub fn check_invariants(&self) {
        for (pos, &Entry { id, .. }) in self.order.iter().enumerate() {
            let Some(arc) = self.get(id) else {
                panic!("dead arc {id:?} in the beach line at {pos}");
            };
            assert_eq!(arc.left_edge.is_none(), pos == 0, "{id:?} at {pos}");
            if pos == 0 || pos + 1 == self.len() {
                assert!(arc.circle.is_none(), "{id:?} at the end has a circle event");
            }
        }
        let mut ids: Vec<ArcId> = self.order.iter().map(|e| e.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), self.order.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;

    #[test]
    fn stale_handles() {
        let mut line = BeachLine::default();
        let a = line.insert(0, SiteIdx(0), None);
        let b = line.insert(1, SiteIdx(1), None);
        assert_eq!(line.position(b), Some(1));

        line.remove(0..1);
        assert!(line.get(a).is_none());
        assert_eq!(line.position(b), Some(0));
        assert!(line.at(0).is_ok_and(|arc| arc.left_edge.is_none()));
        assert_eq!(line.site(0), SiteIdx(1));

        // The slot gets reused, but the old handle stays dead.
        let c = line.insert(1, SiteIdx(2), None);
        assert!(line.get(a).is_none());
        assert!(line.get(c).is_some());
        assert_eq!(line.position(c).map(|pos| line.site(pos)), Some(SiteIdx(2)));
        assert_ne!(a, c);
    }

    #[test]
    fn locate() {
        let sites = Sites::new([(0.0, 0.0), (4.0, 0.0), (2.0, 2.0), (1.0, 3.0), (9.0, 0.0)]).unwrap();
        let tol = Tolerance::DEFAULT;
        let mut graph = Graph::default();
        let mut line = BeachLine::default();

        assert_eq!(line.locate(&sites, sites[SiteIdx(0)], tol), Location::Empty);
        line.insert(0, SiteIdx(0), None);

        // Both arcs are degenerate, so the second site goes to the right.
        assert_eq!(line.locate(&sites, sites[SiteIdx(1)], tol), Location::Append);
        let e = graph.add_site_edge(SiteIdx(0), SiteIdx(1));
        line.insert(1, SiteIdx(1), Some(e));

        // Equidistant from both sites, so it lands on their breakpoint.
        assert_eq!(
            line.locate(&sites, sites[SiteIdx(2)], tol),
            Location::Breakpoint(0)
        );
        assert_eq!(
            line.locate(&sites, sites[SiteIdx(3)], tol),
            Location::Inside(0)
        );
        assert_eq!(
            line.locate(&sites, Point::new(9.0, 3.0), tol),
            Location::Inside(1)
        );
    }
}
