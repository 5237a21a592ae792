use super::*;

/*
One process of the Gallager-Humblet-Spira minimum spanning tree algorithm.

Every process starts as the leader of its own singleton fragment. A fragment repeats:
1. Find: the Init wave from the fragment root puts every member in Find. Each member
   tests its outside edges in ascending order until one is accepted (leads to another
   fragment) or none remain, then reports the best bound of its subtree rootward.
2. Change root: the half of the fragment holding the least bound forwards Chroot along
   best_edge, until the process incident on the MWOE sends Connect over it.
3. Merge: Connect from a lower level is absorbed. Connect from an equal level is
   deferred until this fragment has chosen the same edge, whereupon both endpoints
   send Init(level + 1) to each other, and that edge becomes the new core.
A fragment whose cores both report infinity spans its connected component.
*/
impl Process {
    pub fn new(
        uid: ProcessId,
        edges: Vec<Arc<Edge>>,
        mut logger: Box<dyn Logger>,
    ) -> Result<Self, EdgeError> {
        let mut outside_edges = SortedVecSet::new();
        let mut edge_map = BTreeMap::new();
        for edge in edges {
            let peer = edge.other_side(uid)?;
            outside_edges.insert(edge.clone());
            edge_map.insert(peer, edge);
        }
        log!(
            logger,
            "Created process {} with edges {:?}",
            uid,
            outside_edges.iter().map(|e| e.key()).collect::<Vec<_>>()
        );
        Ok(Self {
            uid,
            fragment_id: FragmentId::Process(uid),
            level: 0,
            search_state: Find,
            begun: false,
            halted: false,
            exception: false,
            round: 0,
            link_to_parent: None,
            mwoe_candidate: None,
            awaiting_test_reply: None,
            best_weight: Bound::Infinite,
            best_edge: None,
            find_count: 0,
            pending_test_replies: VecSet::new(),
            deferred: VecDeque::new(),
            edge_map,
            component_edges: SortedVecSet::new(),
            outside_edges,
            rejected_edges: SortedVecSet::new(),
            logger,
        })
    }

    /// Runs one round: replays deferred messages, then polls every incident edge
    /// once. A failing handler skips the rest of the round and raises the exception flag.
    pub fn run(&mut self) {
        log!(self.logger, "~~~ round {} begins", self.round);
        self.edge_count();
        if let Err(e) = self.run_round() {
            log!(self.logger, "Round {} aborted with {:?}", self.round, e);
            self.exception = true;
        }
        self.edge_count();
        self.round += 1;
    }

    fn run_round(&mut self) -> Result<(), ProcessError> {
        if !self.begun {
            // nothing can have arrived yet
            self.begun = true;
            return self.wakeup();
        }
        self.replay_deferred()?;
        let peers: Vec<ProcessId> = self.edge_map.keys().copied().collect();
        for peer in peers {
            let edge = Arc::clone(self.edge(peer)?);
            match edge.poll(self.uid)? {
                None => log!(self.logger, "No message from {} in round {}", peer, self.round),
                Some(msg) => {
                    log!(self.logger, "Received {} in round {}", &msg, self.round);
                    if msg.sender != peer {
                        return Err(ProcessError::UnknownPeer(msg.sender));
                    }
                    self.dispatch(msg)?;
                }
            }
        }
        Ok(())
    }

    fn wakeup(&mut self) -> Result<(), ProcessError> {
        log!(self.logger, "Waking up as leader of fragment {}", self.fragment_id);
        self.receive_init(None, 0, self.fragment_id, Find)
    }

    // Deferred messages go first, in arrival order. Each may be deferred again.
    fn replay_deferred(&mut self) -> Result<(), ProcessError> {
        let tests: Vec<Msg> = self.pending_test_replies.iter().cloned().collect();
        for m in tests {
            self.receive_test(m)?;
        }
        let deferred = std::mem::take(&mut self.deferred);
        for m in deferred {
            log!(self.logger, "Replaying deferred {}", &m);
            self.dispatch(m)?;
        }
        Ok(())
    }

    fn dispatch(&mut self, m: Msg) -> Result<(), ProcessError> {
        if m.recipient != self.uid {
            return Err(ProcessError::Misrouted { recipient: m.recipient });
        }
        if !self.edge_map.contains_key(&m.sender) {
            return Err(ProcessError::UnknownPeer(m.sender));
        }
        match m.kind {
            MsgKind::Init { search } => {
                self.receive_init(Some(m.sender), m.level, m.fragment_id, search)
            }
            MsgKind::Test => self.receive_test(m),
            MsgKind::Accept => self.receive_accept(&m),
            MsgKind::Reject => self.receive_reject(&m),
            MsgKind::Report { best } => self.receive_report(m, best),
            MsgKind::Connect => self.receive_connect(m),
            MsgKind::Chroot => self.receive_chroot(&m),
        }
    }

    /*** handlers, one per message kind ***/

    // INIT message. `from` is None only for the initial self-initiation.
    fn receive_init(
        &mut self,
        from: Option<ProcessId>,
        level: Level,
        fragment_id: FragmentId,
        search: SearchState,
    ) -> Result<(), ProcessError> {
        self.level = level;
        self.fragment_id = fragment_id;
        self.search_state = search;
        self.link_to_parent = from;
        self.mwoe_candidate = None;
        self.best_edge = None;
        self.best_weight = Bound::Infinite;
        log!(
            self.logger,
            "Joined fragment {} at level {} in {:?}. Parent {:?}",
            fragment_id,
            level,
            search,
            from
        );
        let uid = self.uid;
        let children: Vec<Arc<Edge>> = self
            .component_edges
            .iter()
            .filter(|e| e.key().other_side(uid) != from)
            .cloned()
            .collect();
        for edge in children {
            let child = edge.other_side(uid)?;
            edge.send(uid, &Msg::init(uid, child, level, fragment_id, search))?;
            if search == Find {
                self.find_count += 1;
            }
        }
        if search == Find && !self.send_test()? {
            self.send_report()?;
        }
        Ok(())
    }

    // TEST message. Returns false if there is no candidate to test, or a test is
    // already outstanding.
    fn send_test(&mut self) -> Result<bool, ProcessError> {
        let edge = match self.outside_edges.first() {
            Some(edge) => Arc::clone(edge),
            None => {
                self.mwoe_candidate = None;
                log!(self.logger, "No more edges to test, no mwoe");
                return Ok(false);
            }
        };
        if let Some(peer) = self.awaiting_test_reply {
            log!(self.logger, "Already have a test out to {}, do nothing", peer);
            return Ok(false);
        }
        let peer = edge.other_side(self.uid)?;
        self.mwoe_candidate = Some(peer);
        self.awaiting_test_reply = Some(peer);
        log!(self.logger, "Testing {} over {}", peer, &edge);
        edge.send(self.uid, &Msg::test(self.uid, peer, self.level, self.fragment_id))?;
        Ok(true)
    }
    fn receive_test(&mut self, m: Msg) -> Result<(), ProcessError> {
        // in case this is a replay
        self.pending_test_replies.remove(&m);
        log!(
            self.logger,
            "Test from {}: fragment {} vs {}, level {} vs {}",
            m.sender,
            self.fragment_id,
            m.fragment_id,
            self.level,
            m.level
        );
        let back = Arc::clone(self.edge(m.sender)?);
        if self.fragment_id == m.fragment_id {
            log!(self.logger, "reply reject");
            back.send(self.uid, &Msg::reject(&m))?;
        } else if self.level >= m.level {
            log!(self.logger, "reply accept");
            back.send(self.uid, &Msg::accept(&m))?;
        } else {
            log!(self.logger, "defer response until level {}", m.level);
            self.pending_test_replies.push(m);
        }
        Ok(())
    }

    // ACCEPT message
    fn receive_accept(&mut self, m: &Msg) -> Result<(), ProcessError> {
        match self.awaiting_test_reply {
            Some(peer) if peer == m.sender => {
                self.awaiting_test_reply = None;
                let candidate = Bound::Finite(self.edge(peer)?.key());
                if candidate < self.best_weight {
                    self.best_weight = candidate;
                    self.best_edge = Some(peer);
                }
                log!(self.logger, "{} accepted. Best is now {}", peer, self.best_weight);
                self.send_report()?;
            }
            awaiting => log!(
                self.logger,
                "WARNING: didn't expect accept from {} while awaiting {:?}, do nothing",
                m.sender,
                awaiting
            ),
        }
        Ok(())
    }

    // REJECT message
    fn receive_reject(&mut self, m: &Msg) -> Result<(), ProcessError> {
        match self.awaiting_test_reply {
            Some(peer) if peer == m.sender => {
                let edge = Arc::clone(self.edge(peer)?);
                match self.outside_edges.remove(&edge) {
                    Some(edge) => {
                        log!(self.logger, "Moving {} from outside to rejected edges", &edge);
                        self.rejected_edges.insert(edge);
                    }
                    // absorbed through a Connect while the test was in flight
                    None => log!(self.logger, "{} is no longer an outside edge", &edge),
                }
                self.awaiting_test_reply = None;
                if !self.send_test()? {
                    self.send_report()?;
                }
            }
            awaiting => log!(
                self.logger,
                "WARNING: didn't expect reject from {} while awaiting {:?}, do nothing",
                m.sender,
                awaiting
            ),
        }
        Ok(())
    }

    // REPORT message. Returns false while the subtree or the local test is unresolved.
    fn send_report(&mut self) -> Result<bool, ProcessError> {
        if self.search_state == Found {
            return Ok(false);
        }
        if self.find_count > 0 || self.awaiting_test_reply.is_some() {
            log!(
                self.logger,
                "Not reporting yet: {} subtree reports and test to {:?} outstanding",
                self.find_count,
                self.awaiting_test_reply
            );
            return Ok(false);
        }
        self.search_state = Found;
        match self.link_to_parent {
            Some(parent) => {
                log!(self.logger, "Reporting {} to {}", self.best_weight, parent);
                let msg =
                    Msg::report(self.uid, parent, self.level, self.fragment_id, self.best_weight);
                self.edge(parent)?.send(self.uid, &msg)?;
            }
            None if self.best_weight.is_infinite() => self.halt(),
            None => self.change_root()?,
        }
        Ok(true)
    }
    fn receive_report(&mut self, m: Msg, best: Bound) -> Result<(), ProcessError> {
        let from = m.sender;
        if Some(from) != self.link_to_parent {
            self.find_count =
                self.find_count.checked_sub(1).ok_or(ProcessError::UnexpectedReport(from))?;
            if best < self.best_weight {
                self.best_weight = best;
                self.best_edge = Some(from);
            }
            log!(
                self.logger,
                "Report {} from child {}. Best {}, awaiting {} more",
                best,
                from,
                self.best_weight,
                self.find_count
            );
            self.send_report()?;
        } else if self.search_state == Find {
            log!(self.logger, "Report from core peer {} before my own, defer", from);
            self.deferred.push_back(m);
        } else if best > self.best_weight {
            log!(self.logger, "My half holds the MWOE {}", self.best_weight);
            self.change_root()?;
        } else if best.is_infinite() && self.best_weight.is_infinite() {
            self.halt();
        } else {
            log!(self.logger, "Core peer {} holds the MWOE {}", from, best);
        }
        Ok(())
    }

    // CONNECT message
    fn receive_connect(&mut self, m: Msg) -> Result<(), ProcessError> {
        let edge = Arc::clone(self.edge(m.sender)?);
        if m.level < self.level {
            log!(self.logger, "Absorbing fragment {} over {}", m.fragment_id, &edge);
            if let Some(edge) = self.outside_edges.remove(&edge) {
                self.component_edges.insert(edge);
            }
            let init =
                Msg::init(self.uid, m.sender, self.level, self.fragment_id, self.search_state);
            edge.send(self.uid, &init)?;
            if self.search_state == Find {
                self.find_count += 1;
            }
        } else if self.outside_edges.contains(&edge) {
            log!(self.logger, "Connect over {} which I have not chosen, defer", &edge);
            self.deferred.push_back(m);
        } else {
            // both fragments chose this edge: it becomes the core of the merged fragment
            let core = FragmentId::Core(edge.key());
            log!(self.logger, "Merging over {} into fragment {}", &edge, core);
            edge.send(self.uid, &Msg::init(self.uid, m.sender, self.level + 1, core, Find))?;
        }
        Ok(())
    }

    // CHROOT message
    fn receive_chroot(&mut self, m: &Msg) -> Result<(), ProcessError> {
        log!(self.logger, "Root moves through me, from {}", m.sender);
        self.change_root()
    }
    // Forwards Chroot towards the MWOE, or sends Connect over it once it is local.
    fn change_root(&mut self) -> Result<(), ProcessError> {
        let peer = self.best_edge.ok_or(ProcessError::NoCandidate)?;
        let edge = Arc::clone(self.edge(peer)?);
        if self.component_edges.contains(&edge) {
            log!(self.logger, "Forwarding chroot to {}", peer);
            edge.send(self.uid, &Msg::chroot(self.uid, peer, self.level, self.fragment_id))?;
        } else {
            log!(self.logger, "Sending connect over MWOE {}", &edge);
            edge.send(self.uid, &Msg::connect(self.uid, peer, self.level, self.fragment_id))?;
            if let Some(edge) = self.outside_edges.remove(&edge) {
                self.component_edges.insert(edge);
            }
        }
        Ok(())
    }

    fn halt(&mut self) {
        self.halted = true;
        log!(self.logger, "No outgoing edge left. Fragment {} is complete", self.fragment_id);
    }

    /*** end of handlers ***/

    fn edge(&self, peer: ProcessId) -> Result<&Arc<Edge>, ProcessError> {
        self.edge_map.get(&peer).ok_or(ProcessError::UnknownPeer(peer))
    }
    fn edge_count(&mut self) {
        log!(
            self.logger,
            "round {}: outside {}, rejected {}, component {}",
            self.round,
            self.outside_edges.len(),
            self.rejected_edges.len(),
            self.component_edges.len()
        );
    }
}

// observers
impl Process {
    pub fn uid(&self) -> ProcessId {
        self.uid
    }
    pub fn level(&self) -> Level {
        self.level
    }
    pub fn fragment_id(&self) -> FragmentId {
        self.fragment_id
    }
    pub fn round(&self) -> usize {
        self.round
    }
    pub fn link_to_parent(&self) -> Option<ProcessId> {
        self.link_to_parent
    }
    pub fn mwoe_candidate(&self) -> Option<ProcessId> {
        self.mwoe_candidate
    }
    pub fn awaiting_test_reply(&self) -> Option<ProcessId> {
        self.awaiting_test_reply
    }
    pub fn pending_test_replies(&self) -> impl Iterator<Item = &Msg> + '_ {
        self.pending_test_replies.iter()
    }
    pub fn incident_keys(&self) -> Vec<EdgeKey> {
        let mut keys: Vec<EdgeKey> = self.edge_map.values().map(|e| e.key()).collect();
        keys.sort();
        keys
    }
    pub fn component_keys(&self) -> Vec<EdgeKey> {
        self.component_edges.iter().map(|e| e.key()).collect()
    }
    pub fn outside_keys(&self) -> Vec<EdgeKey> {
        self.outside_edges.iter().map(|e| e.key()).collect()
    }
    pub fn rejected_keys(&self) -> Vec<EdgeKey> {
        self.rejected_edges.iter().map(|e| e.key()).collect()
    }
    pub fn is_terminated(&self) -> bool {
        self.outside_edges.is_empty()
    }
    pub fn is_halted(&self) -> bool {
        self.halted
    }
    pub fn has_exception(&self) -> bool {
        self.exception
    }
    /// True while a Test reply, Connect or Report is waiting for a later round.
    pub fn has_deferred(&self) -> bool {
        !self.pending_test_replies.is_empty() || !self.deferred.is_empty()
    }
    pub fn mst_edges(&self) -> String {
        self.component_edges.iter().map(|e| e.to_string()).collect::<Vec<_>>().join(", ")
    }
    pub fn logger(&self) -> &dyn Logger {
        &*self.logger
    }
}
