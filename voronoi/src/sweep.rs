//! Fortune's sweep, producing the unclipped Voronoi graph.

use tracing::{debug, trace};

use crate::{
    beach_line::{Arc, BeachLine, Location, PendingCircle},
    events::{CircleEvent, EventQueue, SweepEvent},
    geom::{orient, Circle, Point},
    graph::Graph,
    num::{key, Tolerance},
    sites::{SiteIdx, Sites},
    Error,
};

/// The output of the sweep.
#[derive(Clone, Debug)]
pub struct Swept {
    /// Every edge of the diagram. Edges may be missing one or both endpoints (if
    /// they extend to infinity), and their endpoints may be outside any bounding box.
    pub graph: Graph,
    /// Indexed by `SiteIdx`. Sites that duplicate an earlier site (up to the tolerance)
    /// are inactive: they get no arc, no edges, and no cell.
    pub active: Vec<bool>,
}

#[derive(Clone, Debug)]
pub struct State<'a> {
    sites: &'a Sites,
    tol: Tolerance,
    /// The current position of the sweep line.
    pub y: f64,
    pub line: BeachLine,
    pub events: EventQueue,
    pub graph: Graph,
    pub active: Vec<bool>,
    // Active sites whose `y` is within the tolerance of the sweep line. A new site that is
    // close to one of these is a duplicate.
    recent: Vec<Point>,
}

impl<'a> State<'a> {
    pub fn new(sites: &'a Sites, tol: Tolerance) -> Self {
        State {
            sites,
            tol,
            y: f64::NEG_INFINITY,
            line: BeachLine::default(),
            events: EventQueue::from_sites(sites),
            graph: Graph::default(),
            active: vec![false; sites.len()],
            recent: Vec::new(),
        }
    }

    /// Runs the sweep to completion.
    pub fn run(mut self) -> Result<Swept, Error> {
        while self.step()? {
            #[cfg(debug_assertions)]
            self.check_invariants();
        }

        debug!(
            sites = self.sites.len(),
            active = self.active.iter().filter(|&&a| a).count(),
            edges = self.graph.deleted.len(),
            vertices = self.graph.vertices.len(),
            "finished sweep"
        );
        Ok(Swept {
            graph: self.graph,
            active: self.active,
        })
    }

    /// Processes a single event, returning `false` if there were none left.
    pub fn step(&mut self) -> Result<bool, Error> {
        while let Some(ev) = self.events.peek_circle() {
            if self.line.is_current(ev) {
                break;
            }
            trace!(?ev, "skipping stale circle event");
            self.events.discard_circle();
        }

        match self.events.pop(self.sites, self.tol) {
            Some(SweepEvent::Site(idx)) => {
                self.y = self.sites[idx].y;
                self.site_event(idx)?;
            }
            Some(SweepEvent::Circle(ev)) => {
                self.y = ev.y.into_inner();
                self.circle_event(&ev)?;
            }
            None => return Ok(false),
        }
        Ok(true)
    }

    fn site_event(&mut self, idx: SiteIdx) -> Result<(), Error> {
        let p = self.sites[idx];
        let tol = self.tol;
        self.recent.retain(|q| p.y - q.y <= tol.eps);
        if self.recent.iter().any(|q| q.close_to(&p, tol)) {
            trace!(site = ?idx, "skipping duplicate site");
            return Ok(());
        }
        self.recent.push(p);
        self.active[idx.0] = true;

        let loc = self.line.locate(self.sites, p, tol);
        trace!(site = ?idx, ?p, ?loc, "site event");
        match loc {
            Location::Empty => {
                self.line.insert(0, idx, None);
            }
            Location::Append => {
                let pos = self.line.len() - 1;
                let left = self.line.site(pos);
                let e = self.graph.add_site_edge(left, idx);
                self.line.insert(pos + 1, idx, Some(e));
            }
            Location::Inside(pos) => {
                // Split the arc in two, and put the new arc in the middle. The left part keeps
                // the old handle and the old left edge; the new arc and the right part both
                // start at the same (so far endless) edge.
                self.detach(pos)?;
                let split = self.line.site(pos);
                let e = self.graph.add_site_edge(split, idx);
                self.line.insert(pos + 1, idx, Some(e));
                self.line.insert(pos + 2, split, Some(e));
                self.attach(pos)?;
                self.attach(pos + 2)?;
            }
            Location::Breakpoint(pos) => {
                // The new site is exactly on the breakpoint between two arcs, so the new arc
                // starts out with zero width and the breakpoint's edge ends right here.
                let (l, r) = (pos, pos + 1);
                self.detach(l)?;
                self.detach(r)?;
                let left = self.line.site(l);
                let right = self.line.site(r);
                let circle = Circle::through(self.sites[left], p, self.sites[right])
                    .ok_or_else(|| {
                        Error::Internal(format!("{idx:?} on a breakpoint with collinear sites"))
                    })?;
                let v = self.graph.add_vertex(circle.center);
                let old_edge = self.line.at(r)?.left_edge.ok_or_else(|| {
                    Error::Internal(format!("arc at position {r} has no left edge"))
                })?;
                self.graph.set_start(old_edge, left, right, v);

                let new_left = self.graph.add_site_edge(left, idx);
                self.graph.set_end(new_left, left, idx, v);
                let new_right = self.graph.add_site_edge(idx, right);
                self.graph.set_end(new_right, idx, right, v);

                self.line.insert(r, idx, Some(new_left));
                self.line.at_mut(r + 1)?.left_edge = Some(new_right);
                self.attach(l)?;
                self.attach(r + 1)?;
            }
        }
        Ok(())
    }

    fn circle_event(&mut self, ev: &CircleEvent) -> Result<(), Error> {
        let pos = self
            .line
            .position(ev.arc)
            .ok_or_else(|| Error::Internal(format!("circle event for a dead arc: {ev:?}")))?;
        if self.line.triple(pos) != Some(ev.sites) {
            return Err(Error::Internal(format!(
                "circle event {ev:?} doesn't match the beach line {:?}",
                self.line.triple(pos)
            )));
        }
        let center = self
            .line
            .at(pos)?
            .circle
            .map(|c| c.center)
            .ok_or_else(|| Error::Internal(format!("{:?} has no circle", ev.arc)))?;
        trace!(?ev, ?center, "circle event");

        // Several arcs may vanish at the same point (when four or more sites are
        // cocircular). We remove them all at once.
        let tol = self.tol;
        let converging =
            |arc: &Arc| arc.circle.map_or(false, |c| c.center.close_to(&center, tol));
        let mut lo = pos;
        while lo > 0 && converging(self.line.at(lo - 1)?) {
            lo -= 1;
        }
        let mut hi = pos;
        while hi + 1 < self.line.len() && converging(self.line.at(hi + 1)?) {
            hi += 1;
        }
        if lo == 0 || hi + 1 == self.line.len() {
            return Err(Error::Internal(format!(
                "circle event {ev:?} at the end of the beach line"
            )));
        }

        let v = self.graph.add_vertex(center);
        // Every breakpoint from the left of `lo` to the right of `hi` meets at `v`.
        for i in lo..=hi + 1 {
            let (left, right) = (self.line.site(i - 1), self.line.site(i));
            let e = self.line.at(i)?.left_edge.ok_or_else(|| {
                Error::Internal(format!("arc at position {i} has no left edge"))
            })?;
            self.graph.set_start(e, left, right, v);
        }

        self.line.remove(lo..hi + 1);
        let (l, r) = (lo - 1, lo);
        self.detach(l)?;
        self.detach(r)?;
        let left = self.line.site(l);
        let right = self.line.site(r);
        let e = self.graph.add_site_edge(left, right);
        self.graph.set_end(e, left, right, v);
        self.line.at_mut(r)?.left_edge = Some(e);
        self.attach(l)?;
        self.attach(r)
    }

    /// Forgets about the circle event of the arc at `pos`, if it has one.
    fn detach(&mut self, pos: usize) -> Result<(), Error> {
        self.line.at_mut(pos)?.circle = None;
        Ok(())
    }

    /// Schedules a circle event for the arc at `pos`, if its breakpoints converge.
    fn attach(&mut self, pos: usize) -> Result<(), Error> {
        let Some(sites @ [l, c, r]) = self.line.triple(pos) else {
            return Ok(());
        };
        if l == r {
            return Ok(());
        }
        let (pl, pc, pr) = (self.sites[l], self.sites[c], self.sites[r]);
        // The breakpoints converge if and only if `c`, `l`, `r` are in clockwise order.
        if orient(pc, pl, pr) >= 0.0 {
            return Ok(());
        }
        let Some(circle) = Circle::through(pl, pc, pr) else {
            return Ok(());
        };
        let (Some(y), Some(x)) = (key(circle.bottom()), key(circle.center.x)) else {
            return Ok(());
        };

        let arc = self.line.id_at(pos);
        let seq = self.events.push_circle(y, x, arc, sites);
        self.line.at_mut(pos)?.circle = Some(PendingCircle {
            center: circle.center,
            seq,
        });
        Ok(())
    }

    pub fn check_invariants(&self) {
        self.line.check_invariants();
        for site in self.line.sites() {
            assert!(self.active[site.0], "inactive {site:?} in the beach line");
        }
    }
}

/// Sweeps over all the sites, producing the unclipped graph.
pub fn sweep(sites: &Sites, tol: Tolerance) -> Result<Swept, Error> {
    State::new(sites, tol).run()
}
