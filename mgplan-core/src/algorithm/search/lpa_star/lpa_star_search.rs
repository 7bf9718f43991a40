use std::collections::HashMap;
use std::time::Instant;

use indexmap::IndexMap;
use priority_queue::PriorityQueue;

use crate::algorithm::search::{EdgeChange, SearchError, SearchGraph, SearchResult, SearchVertexId};
use crate::model::termination::TerminationModel;
use crate::model::unit::Cost;

use super::{Key, ReverseKey, VertexData};

/// Min-first vertex queue keyed by [`Key`]. The backing max-queue is
/// inverted through [`ReverseKey`]; `upsert` moves an existing handle to
/// its new key, which covers both the decrease and increase cases of the
/// key-update rule, and `remove` drops a handle outright.
struct VertexQueue(PriorityQueue<SearchVertexId, ReverseKey>);

impl VertexQueue {
    fn new() -> VertexQueue {
        VertexQueue(PriorityQueue::new())
    }

    fn len(&self) -> usize {
        self.0.len()
    }

    fn clear(&mut self) {
        self.0.clear();
    }

    /// the vertex carrying the smallest key, and that key.
    fn peek(&self) -> Option<(SearchVertexId, Key)> {
        self.0.peek().map(|(v, rk)| (*v, rk.0))
    }

    fn pop(&mut self) -> Option<SearchVertexId> {
        self.0.pop().map(|(v, _)| v)
    }

    /// inserts `v` at `key`, or re-keys its existing handle in place.
    fn upsert(&mut self, v: SearchVertexId, key: Key) {
        self.0.push(v, ReverseKey(key));
    }

    fn remove(&mut self, v: SearchVertexId) {
        self.0.remove(&v);
    }
}

/// how edge costs are consumed during vertex expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeEvaluationPolicy {
    /// resolve exact costs and validity while relaxing; no optimism
    Eager,
    /// relax with cached optimistic costs, but resolve a vertex's parent
    /// edge (and its validity) exactly before committing to expand it
    LazyWeighted,
    /// plan entirely on cached costs; the caller certifies candidate paths
    /// and feeds the resulting changes back
    FullyLazy,
}

impl EdgeEvaluationPolicy {
    pub fn lazy_expansion(&self) -> bool {
        !matches!(self, EdgeEvaluationPolicy::Eager)
    }
}

/// Lifelong Planning A* over a [`SearchGraph`].
///
/// Maintains `g`/`rhs` values and parent pointers per materialized vertex,
/// a priority queue keyed by `(min(g,rhs)+h, min(g,rhs))`, and the best
/// known goal. Edge-change events produced by lazy evaluations are absorbed
/// between queue pops, so expansions proceed in non-decreasing key order
/// between absorptions. State survives across calls; that is where
/// incremental replanning gets its savings.
pub struct LpaStarSearch {
    policy: EdgeEvaluationPolicy,
    vertices: IndexMap<SearchVertexId, VertexData>,
    queue: VertexQueue,
    /// best candidate per known goal vertex: (key `(g+goal_cost, g)`, goal cost)
    goal_candidates: HashMap<SearchVertexId, (Key, Cost)>,
    goal_key: Key,
    result: SearchResult,
    start: Option<SearchVertexId>,
    termination: Option<TerminationModel>,
    expansions: u64,
    #[cfg(debug_assertions)]
    last_pop_key: Option<Key>,
}

impl LpaStarSearch {
    pub fn new(policy: EdgeEvaluationPolicy) -> LpaStarSearch {
        LpaStarSearch {
            policy,
            vertices: IndexMap::new(),
            queue: VertexQueue::new(),
            goal_candidates: HashMap::new(),
            goal_key: Key::INFINITE,
            result: SearchResult::default(),
            start: None,
            termination: None,
            expansions: 0,
            #[cfg(debug_assertions)]
            last_pop_key: None,
        }
    }

    pub fn with_termination(mut self, termination: Option<TerminationModel>) -> LpaStarSearch {
        self.termination = termination;
        self
    }

    pub fn policy(&self) -> EdgeEvaluationPolicy {
        self.policy
    }

    pub fn result(&self) -> &SearchResult {
        &self.result
    }

    pub fn expansions(&self) -> u64 {
        self.expansions
    }

    pub fn start(&self) -> Option<SearchVertexId> {
        self.start
    }

    pub fn g(&self, v: SearchVertexId) -> Option<Cost> {
        self.vertices.get(&v).map(|d| d.g)
    }

    pub fn rhs(&self, v: SearchVertexId) -> Option<Cost> {
        self.vertices.get(&v).map(|d| d.rhs)
    }

    pub fn parent(&self, v: SearchVertexId) -> Option<SearchVertexId> {
        self.vertices.get(&v).map(|d| d.parent)
    }

    pub fn is_queued(&self, v: SearchVertexId) -> bool {
        self.vertices.get(&v).map(|d| d.queued).unwrap_or(false)
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn has_finite_g(&self, v: SearchVertexId) -> bool {
        self.vertices
            .get(&v)
            .map(|d| d.g.is_finite())
            .unwrap_or(false)
    }

    pub fn materialized(&self) -> impl Iterator<Item = SearchVertexId> + '_ {
        self.vertices.keys().copied()
    }

    /// queue membership invariant: a vertex is queued iff `g != rhs`.
    pub fn is_quiescent(&self) -> bool {
        self.vertices
            .values()
            .all(|d| d.queued == (!d.is_consistent() && !d.invalid))
    }

    /// discards all search state; the next computation starts from scratch.
    pub fn reset(&mut self) {
        self.vertices.clear();
        self.queue.clear();
        self.goal_candidates.clear();
        self.goal_key = Key::INFINITE;
        self.result = SearchResult::default();
        self.start = None;
        #[cfg(debug_assertions)]
        {
            self.last_pop_key = None;
        }
    }

    fn data(&self, v: SearchVertexId) -> Result<&VertexData, SearchError> {
        self.vertices
            .get(&v)
            .ok_or_else(|| SearchError::InternalError(format!("vertex {} has no search data", v)))
    }

    fn data_mut(&mut self, v: SearchVertexId) -> Result<&mut VertexData, SearchError> {
        self.vertices
            .get_mut(&v)
            .ok_or_else(|| SearchError::InternalError(format!("vertex {} has no search data", v)))
    }

    fn ensure_vertex<G: SearchGraph + ?Sized>(
        &mut self,
        graph: &mut G,
        v: SearchVertexId,
    ) -> Result<(), SearchError> {
        if !self.vertices.contains_key(&v) {
            let h = graph.heuristic(v)?;
            self.vertices.insert(v, VertexData::new(h, v));
        }
        Ok(())
    }

    /// establishes the start vertex. returns false (and records an
    /// unsolvable result) when the start configuration is invalid.
    fn initialize<G: SearchGraph + ?Sized>(&mut self, graph: &mut G) -> Result<bool, SearchError> {
        if self.start.is_some() {
            return Ok(true);
        }
        let start = graph.start_vertex()?;
        if !graph.check_validity(start)? {
            log::warn!("start vertex is invalid; query cannot be initialized");
            self.result = SearchResult::default();
            return Ok(false);
        }
        self.start = Some(start);
        self.ensure_vertex(graph, start)?;
        self.data_mut(start)?.rhs = Cost::ZERO;
        self.update_vertex(graph, start)?;
        let changes = graph.take_edge_changes();
        if !changes.is_empty() {
            self.update_edges(graph, changes)?;
        }
        Ok(true)
    }

    /// re-establishes queue membership and key for `v` after a `g`/`rhs`
    /// change, and keeps the best-goal record current.
    fn update_vertex<G: SearchGraph + ?Sized>(
        &mut self,
        graph: &mut G,
        v: SearchVertexId,
    ) -> Result<(), SearchError> {
        let (key, consistent, queued, invalid) = {
            let d = self.data(v)?;
            (d.key(), d.is_consistent(), d.queued, d.invalid)
        };
        if !consistent && !invalid {
            self.queue.upsert(v, key);
            self.data_mut(v)?.queued = true;
        } else if queued {
            self.queue.remove(v);
            self.data_mut(v)?.queued = false;
        }
        self.track_goal(graph, v)
    }

    /// every key update of a goal vertex refreshes its candidate
    /// `(g + goal_cost, g)` and with it the best known goal.
    fn track_goal<G: SearchGraph + ?Sized>(
        &mut self,
        graph: &mut G,
        v: SearchVertexId,
    ) -> Result<(), SearchError> {
        let (g, eligible) = {
            let d = self.data(v)?;
            (d.g, d.g.is_finite() && !d.invalid)
        };
        if eligible && graph.is_goal(v)? {
            let goal_cost = graph.goal_cost(v)?;
            self.goal_candidates
                .insert(v, (Key::new(g + goal_cost, g), goal_cost));
            self.refresh_best_goal();
        } else if self.goal_candidates.remove(&v).is_some() {
            self.refresh_best_goal();
        }
        Ok(())
    }

    fn refresh_best_goal(&mut self) {
        let best = self
            .goal_candidates
            .iter()
            .min_by_key(|(v, (key, _))| (*key, v.0))
            .map(|(v, (key, goal_cost))| (*v, *key, *goal_cost));
        match best {
            None => {
                self.goal_key = Key::INFINITE;
                self.result.solved = false;
                self.result.goal_vertex = None;
                self.result.path_cost = Cost::INFINITY;
                self.result.goal_cost = Cost::INFINITY;
            }
            Some((v, key, goal_cost)) => {
                self.goal_key = key;
                self.result.solved = self
                    .vertices
                    .get(&v)
                    .map(|d| d.is_consistent() && !d.invalid)
                    .unwrap_or(false);
                self.result.goal_vertex = Some(v);
                self.result.path_cost = key.k2;
                self.result.goal_cost = goal_cost;
            }
        }
    }

    /// `rhs(v) = min over predecessors t of g(t) + c(t, v)`, choosing the
    /// argmin as the new parent.
    fn recompute_rhs<G: SearchGraph + ?Sized>(
        &mut self,
        graph: &mut G,
        v: SearchVertexId,
    ) -> Result<(), SearchError> {
        if Some(v) == self.start {
            return self.update_vertex(graph, v);
        }
        let lazy = self.policy.lazy_expansion();
        let mut best = Cost::INFINITY;
        let mut best_parent = v;
        for t in graph.predecessors(v, lazy)? {
            let g_t = match self.vertices.get(&t) {
                None => continue,
                Some(d) if d.invalid || !d.g.is_finite() => continue,
                Some(d) => d.g,
            };
            let c = graph.edge_cost(t, v, lazy)?;
            if c.is_infinite() {
                continue;
            }
            let candidate = g_t + c;
            if candidate < best {
                best = candidate;
                best_parent = t;
            }
        }
        let d = self.data_mut(v)?;
        d.rhs = best;
        d.parent = best_parent;
        self.update_vertex(graph, v)
    }

    /// marks a vertex unusable (conditionally invalid): it leaves the
    /// queue for good and every vertex routed through it recomputes.
    pub fn invalidate_vertex<G: SearchGraph + ?Sized>(
        &mut self,
        graph: &mut G,
        v: SearchVertexId,
    ) -> Result<(), SearchError> {
        if Some(v) == self.start {
            return Ok(());
        }
        match self.vertices.get_mut(&v) {
            None => return Ok(()),
            Some(d) => {
                d.invalid = true;
                d.g = Cost::INFINITY;
                d.rhs = Cost::INFINITY;
            }
        }
        self.update_vertex(graph, v)?;
        let dependents: Vec<SearchVertexId> = self
            .vertices
            .iter()
            .filter(|(s, d)| d.parent == v && **s != v)
            .map(|(s, _)| *s)
            .collect();
        for s in dependents {
            self.recompute_rhs(graph, s)?;
        }
        Ok(())
    }

    /// absorbs edge-weight changes: a cheaper edge relaxes its head, a more
    /// expensive one forces the head to recompute if it was routed through
    /// the tail. absorption must complete before the next queue pop.
    pub fn update_edges<G: SearchGraph + ?Sized>(
        &mut self,
        graph: &mut G,
        changes: Vec<EdgeChange>,
    ) -> Result<(), SearchError> {
        #[cfg(debug_assertions)]
        {
            self.last_pop_key = None;
        }
        for EdgeChange { u, v, old_cost } in changes {
            if Some(v) == self.start {
                continue;
            }
            let new_cost = graph.edge_cost(u, v, true)?;
            if old_cost > new_cost {
                let g_u = match self.vertices.get(&u) {
                    None => continue,
                    Some(d) if d.invalid || !d.g.is_finite() => continue,
                    Some(d) => d.g,
                };
                if new_cost.is_infinite() {
                    continue;
                }
                self.ensure_vertex(graph, v)?;
                let candidate = g_u + new_cost;
                let d = self.data_mut(v)?;
                if !d.invalid && d.rhs > candidate {
                    d.parent = u;
                    d.rhs = candidate;
                    self.update_vertex(graph, v)?;
                }
            } else {
                let routed_through_u = self
                    .vertices
                    .get(&v)
                    .map(|d| d.parent == u && !d.invalid)
                    .unwrap_or(false);
                if routed_through_u {
                    self.recompute_rhs(graph, v)?;
                }
            }
        }
        // absorbing may itself resolve further edges lazily
        let more = graph.take_edge_changes();
        if !more.is_empty() {
            self.update_edges(graph, more)?;
        }
        Ok(())
    }

    /// runs the main loop to quiescence: while the queue holds a key below
    /// the best goal key, or no solution is recorded, pop and expand.
    pub fn compute_shortest_path<G: SearchGraph + ?Sized>(
        &mut self,
        graph: &mut G,
    ) -> Result<&SearchResult, SearchError> {
        self.result.interrupted = false;
        if !self.initialize(graph)? {
            return Ok(&self.result);
        }
        let start_time = Instant::now();
        loop {
            let (top, top_key) = match self.queue.peek() {
                None => break,
                Some(pair) => pair,
            };
            if top_key >= self.goal_key && self.result.solved {
                break;
            }
            let interrupted = self
                .termination
                .as_ref()
                .map(|m| m.terminate_search(&start_time, self.expansions))
                .unwrap_or(false);
            if interrupted {
                if let Some(model) = &self.termination {
                    if let Some(why) = model.explain_termination(&start_time, self.expansions) {
                        log::info!("search interrupted: {}", why);
                    }
                }
                self.result.interrupted = true;
                break;
            }
            if self.policy == EdgeEvaluationPolicy::LazyWeighted
                && Some(top) != self.start
                && self.resolve_before_expansion(graph, top)?
            {
                continue;
            }
            #[cfg(debug_assertions)]
            {
                if let Some(last) = self.last_pop_key {
                    debug_assert!(
                        top_key >= last,
                        "queue keys regressed between pops without an absorption"
                    );
                }
                self.last_pop_key = Some(top_key);
            }
            let u = match self.queue.pop() {
                None => break,
                Some(popped) => popped,
            };
            self.data_mut(u)?.queued = false;
            self.expansions += 1;
            let (g, rhs) = {
                let d = self.data(u)?;
                (d.g, d.rhs)
            };
            let lazy = self.policy.lazy_expansion();
            if g > rhs {
                // overconsistent: commit and relax successors
                self.data_mut(u)?.g = rhs;
                self.update_vertex(graph, u)?;
                let g_u = rhs;
                for s in graph.successors(u, lazy)? {
                    if Some(s) == self.start {
                        continue;
                    }
                    self.ensure_vertex(graph, s)?;
                    if self.data(s)?.invalid {
                        continue;
                    }
                    let c = graph.edge_cost(u, s, lazy)?;
                    if c.is_infinite() {
                        continue;
                    }
                    let candidate = g_u + c;
                    let d = self.data_mut(s)?;
                    if d.rhs > candidate {
                        d.parent = u;
                        d.rhs = candidate;
                        self.update_vertex(graph, s)?;
                    }
                }
            } else {
                // underconsistent: retract and let dependents recompute
                self.data_mut(u)?.g = Cost::INFINITY;
                for s in graph.successors(u, lazy)? {
                    if Some(s) == self.start {
                        continue;
                    }
                    let routed = self
                        .vertices
                        .get(&s)
                        .map(|d| d.parent == u)
                        .unwrap_or(false);
                    if routed {
                        self.recompute_rhs(graph, s)?;
                    }
                }
                self.update_vertex(graph, u)?;
            }
            let changes = graph.take_edge_changes();
            if !changes.is_empty() {
                self.update_edges(graph, changes)?;
            }
        }
        log::debug!(
            "search quiescent: {} expansions, {} vertices materialized, solved: {}",
            self.expansions,
            self.vertices.len(),
            self.result.solved
        );
        Ok(&self.result)
    }

    /// lazy-weighted pre-expansion step: before an overconsistent vertex is
    /// expanded, resolve its parent edge and its validity exactly. returns
    /// true when the pop must be re-examined.
    fn resolve_before_expansion<G: SearchGraph + ?Sized>(
        &mut self,
        graph: &mut G,
        top: SearchVertexId,
    ) -> Result<bool, SearchError> {
        let (overconsistent, parent) = {
            let d = self.data(top)?;
            (d.g > d.rhs, d.parent)
        };
        if !overconsistent {
            return Ok(false);
        }
        if parent != top {
            let _ = graph.edge_cost(parent, top, false)?;
            let changes = graph.take_edge_changes();
            if !changes.is_empty() {
                self.update_edges(graph, changes)?;
                return Ok(true);
            }
        }
        if !graph.check_validity(top)? {
            self.invalidate_vertex(graph, top)?;
            let changes = graph.take_edge_changes();
            if !changes.is_empty() {
                self.update_edges(graph, changes)?;
            }
            return Ok(true);
        }
        Ok(false)
    }

    /// walks parent pointers from the recorded goal back to the start.
    pub fn extract_path(&self) -> Result<Vec<SearchVertexId>, SearchError> {
        let goal = self.result.goal_vertex.ok_or_else(|| {
            SearchError::InternalError("path extraction without a recorded goal".to_string())
        })?;
        let start = self.start.ok_or_else(|| {
            SearchError::InternalError("path extraction on an uninitialized search".to_string())
        })?;
        let mut path = vec![goal];
        let mut current = goal;
        let mut hops = 0usize;
        while current != start {
            let d = self.data(current)?;
            if d.parent == current || hops > self.vertices.len() {
                return Err(SearchError::InternalError(format!(
                    "broken parent chain at vertex {}",
                    current
                )));
            }
            current = d.parent;
            path.push(current);
            hops += 1;
        }
        path.reverse();
        Ok(path)
    }

    /// refetches every materialized vertex's heuristic and rebuilds queue
    /// keys. `g`/`rhs` survive; used when the goal set (and with it the
    /// heuristic) changes under a retained search.
    pub fn refresh_heuristics<G: SearchGraph + ?Sized>(
        &mut self,
        graph: &mut G,
    ) -> Result<(), SearchError> {
        let ids: Vec<SearchVertexId> = self.vertices.keys().copied().collect();
        for v in ids {
            let h = graph.heuristic(v)?;
            self.data_mut(v)?.h = h;
            if self.data(v)?.queued {
                let key = self.data(v)?.key();
                self.queue.upsert(v, key);
            }
        }
        #[cfg(debug_assertions)]
        {
            self.last_pop_key = None;
        }
        Ok(())
    }

    /// drops the recorded goal and rebuilds the candidate set from the
    /// materialized vertices; used after goal-set changes.
    pub fn rescan_goals<G: SearchGraph + ?Sized>(&mut self, graph: &mut G) -> Result<(), SearchError> {
        self.goal_candidates.clear();
        self.goal_key = Key::INFINITE;
        self.result = SearchResult::default();
        let ids: Vec<SearchVertexId> = self.vertices.keys().copied().collect();
        for v in ids {
            self.track_goal(graph, v)?;
        }
        let changes = graph.take_edge_changes();
        if !changes.is_empty() {
            self.update_edges(graph, changes)?;
        }
        Ok(())
    }
}
