use super::*;

impl Edge {
    // Returns the bincode configuration mailboxes use for every frame.
    fn bincode_opts() -> impl bincode::config::Options {
        // uses variable-length encoding everywhere
        bincode::config::DefaultOptions::new()
    }

    pub fn new(a: ProcessId, b: ProcessId, weight: Weight) -> Result<Self, GraphError> {
        if a == b {
            return Err(GraphError::SelfLoop(a));
        }
        Ok(Self { key: EdgeKey::new(a, b, weight), mailboxes: Default::default() })
    }
    pub fn key(&self) -> EdgeKey {
        self.key
    }
    pub fn weight(&self) -> Weight {
        self.key.weight
    }
    pub fn endpoints(&self) -> [ProcessId; 2] {
        [self.key.low, self.key.high]
    }
    pub fn other_side(&self, uid: ProcessId) -> Result<ProcessId, EdgeError> {
        self.key.other_side(uid).ok_or(EdgeError::NotAnEndpoint(uid))
    }
    // index of the mailbox that `from` writes into
    fn outbound_index(&self, from: ProcessId) -> Result<usize, EdgeError> {
        if from == self.key.low {
            Ok(0)
        } else if from == self.key.high {
            Ok(1)
        } else {
            Err(EdgeError::NotAnEndpoint(from))
        }
    }
    fn mailbox(&self, index: usize) -> Result<std::sync::MutexGuard<'_, Mailbox>, EdgeError> {
        self.mailboxes[index].lock().map_err(|_| EdgeError::Poisoned)
    }

    /// Encodes `msg` into the mailbox travelling away from `from`. The frame only
    /// becomes visible to the other side after the next `undelay_all`.
    pub fn send(&self, from: ProcessId, msg: &Msg) -> Result<(), EdgeError> {
        use bincode::config::Options;
        let index = self.outbound_index(from)?;
        let frame = Self::bincode_opts().serialize(msg).map_err(|_| EdgeError::MalformedMessage)?;
        self.mailbox(index)?.delayed.push(frame);
        Ok(())
    }

    /// Decodes the oldest deliverable frame addressed to `me`, if any.
    pub fn poll(&self, me: ProcessId) -> Result<Option<Msg>, EdgeError> {
        use bincode::config::Options;
        let index = self.outbound_index(self.other_side(me)?)?;
        let frame = match self.mailbox(index)?.undelayed.pop_front() {
            Some(frame) => frame,
            None => return Ok(None),
        };
        Self::bincode_opts()
            .deserialize::<Msg>(&frame)
            .map(Some)
            .map_err(|_| EdgeError::MalformedMessage)
    }

    /// Makes every frame sent so far deliverable. Only the round driver calls
    /// this, between rounds.
    pub fn undelay_all(&self) -> Result<(), EdgeError> {
        for index in 0..2 {
            let mut mailbox = self.mailbox(index)?;
            let Mailbox { delayed, undelayed } = &mut *mailbox;
            undelayed.extend(delayed.drain(..));
        }
        Ok(())
    }

    pub fn has_pending(&self) -> Result<bool, EdgeError> {
        for index in 0..2 {
            let mailbox = self.mailbox(index)?;
            if !mailbox.delayed.is_empty() || !mailbox.undelayed.is_empty() {
                return Ok(true);
            }
        }
        Ok(false)
    }
}
impl Debug for Edge {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        f.debug_struct("Edge").field("key", &self.key).finish()
    }
}
impl Display for Edge {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}", self.key)
    }
}
impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}
impl Eq for Edge {}
impl PartialOrd for Edge {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Edge {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}
