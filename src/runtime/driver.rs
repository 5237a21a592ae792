use super::*;

impl ProcessRunner {
    pub fn new(process: Process) -> Self {
        let status = ProcessStatus::of(&process);
        Self { uid: process.uid(), phased: RunnerPhased::Idle(Box::new(process)), status }
    }
    pub fn uid(&self) -> ProcessId {
        self.uid
    }

    /// Runs one round of the process on a fresh thread.
    pub fn start(&mut self) -> Result<(), RunnerError> {
        let phased = std::mem::replace(&mut self.phased, RunnerPhased::Lost);
        let mut process = match phased {
            RunnerPhased::Idle(process) => process,
            RunnerPhased::Running(handle) => {
                self.phased = RunnerPhased::Running(handle);
                return Err(RunnerError::AlreadyStarted(self.uid));
            }
            RunnerPhased::Lost => return Err(RunnerError::Lost(self.uid)),
        };
        // on spawn failure the closure, and the process with it, is dropped
        let handle = std::thread::Builder::new()
            .name(self.uid.to_string())
            .spawn(move || {
                process.run();
                process
            })
            .map_err(|_| RunnerError::SpawnFailed(self.uid))?;
        self.phased = RunnerPhased::Running(handle);
        Ok(())
    }

    /// Blocks until the round started by `start` is over.
    pub fn join(&mut self) -> Result<(), RunnerError> {
        let phased = std::mem::replace(&mut self.phased, RunnerPhased::Lost);
        match phased {
            RunnerPhased::Running(handle) => match handle.join() {
                Ok(process) => {
                    self.status = ProcessStatus::of(&process);
                    self.phased = RunnerPhased::Idle(process);
                    Ok(())
                }
                Err(_) => {
                    // the worker panicked; its state is gone
                    self.status.exception = true;
                    Ok(())
                }
            },
            RunnerPhased::Idle(process) => {
                self.phased = RunnerPhased::Idle(process);
                Err(RunnerError::NotStarted(self.uid))
            }
            RunnerPhased::Lost => Err(RunnerError::Lost(self.uid)),
        }
    }

    pub fn is_running(&self) -> bool {
        match self.phased {
            RunnerPhased::Running(_) => true,
            _ => false,
        }
    }
    /// The process, unless it is mid-round or was lost.
    pub fn process(&self) -> Option<&Process> {
        match &self.phased {
            RunnerPhased::Idle(process) => Some(process),
            _ => None,
        }
    }
    // status observers reflect the last completed round
    pub fn is_terminated(&self) -> bool {
        self.status.terminated
    }
    pub fn has_exception(&self) -> bool {
        self.status.exception
    }
    pub fn mst_edges(&self) -> &str {
        &self.status.mst_edges
    }
}
impl ProcessStatus {
    fn of(process: &Process) -> Self {
        Self {
            terminated: process.is_terminated(),
            exception: process.has_exception(),
            mst_edges: process.mst_edges(),
        }
    }
}

impl Simulation {
    pub fn new(graph: &Graph, config: SimConfig) -> Result<Self, SimulationError> {
        let mut logger = config.log_sink.logger_for("driver")?;
        let (edges, incident) = graph.build_edges()?;
        let mut runners = Vec::with_capacity(incident.len());
        for (uid, uid_edges) in incident {
            let process_logger = config.log_sink.logger_for(&format!("P{}", uid))?;
            runners.push(ProcessRunner::new(Process::new(uid, uid_edges, process_logger)?));
        }
        log!(
            logger,
            "Created simulation of {} processes and {} edges",
            runners.len(),
            edges.len()
        );
        Ok(Self { config, round: 0, edges, runners, logger })
    }

    pub fn round(&self) -> usize {
        self.round
    }
    pub fn runners(&self) -> &[ProcessRunner] {
        &self.runners
    }
    pub fn process(&self, uid: ProcessId) -> Option<&Process> {
        let index = self.runners.binary_search_by_key(&uid, ProcessRunner::uid).ok()?;
        self.runners[index].process()
    }
    pub fn processes(&self) -> impl Iterator<Item = &Process> + '_ {
        self.runners.iter().filter_map(ProcessRunner::process)
    }
    /// Every process has classified all of its edges.
    pub fn is_terminated(&self) -> bool {
        self.runners.iter().all(ProcessRunner::is_terminated)
    }
    /// Terminated, and no frame or deferred message is left to deliver. From here
    /// on no process changes state, so fragment ids and levels are final.
    pub fn is_quiescent(&self) -> Result<bool, SimulationError> {
        if !self.is_terminated() || self.in_flight()? > 0 {
            return Ok(false);
        }
        Ok(self.processes().all(|process| !process.has_deferred()))
    }
    /// Number of edges with undelivered frames.
    pub fn in_flight(&self) -> Result<usize, SimulationError> {
        let mut count = 0;
        for edge in self.edges.iter() {
            if edge.has_pending()? {
                count += 1;
            }
        }
        Ok(count)
    }

    /// One synchronous round. Frames sent last round become deliverable, every
    /// process runs its round on its own thread, and all are joined before returning.
    pub fn step(&mut self) -> Result<(), SimulationError> {
        log!(self.logger, "~~~ round {} begins", self.round);
        for edge in self.edges.iter() {
            edge.undelay_all()?;
        }
        for runner in self.runners.iter_mut() {
            runner.start()?;
        }
        // join everyone before reporting any failure
        let mut join_result = Ok(());
        for runner in self.runners.iter_mut() {
            if let Err(e) = runner.join() {
                join_result = Err(e);
            }
        }
        join_result?;
        if let Some(failed) = self.runners.iter().find(|r| r.has_exception()) {
            log!(self.logger, "Process {} failed in round {}", failed.uid(), self.round);
            return Err(SimulationError::ProcessFailed { uid: failed.uid(), round: self.round });
        }
        self.round += 1;
        Ok(())
    }

    /// Steps until the simulation is quiescent.
    pub fn run(&mut self) -> Result<MstSummary, SimulationError> {
        while !self.is_quiescent()? {
            if self.round >= self.config.max_rounds {
                log!(self.logger, "Giving up after {} rounds", self.round);
                return Err(SimulationError::RoundLimitExceeded { rounds: self.round });
            }
            self.step()?;
        }
        let summary = self.mst();
        log!(self.logger, "All processes terminated. {}", &summary);
        Ok(summary)
    }

    /// Union of every process's component edges.
    pub fn mst(&self) -> MstSummary {
        let edges: BTreeSet<EdgeKey> =
            self.processes().flat_map(|process| process.component_keys()).collect();
        let total_weight = edges.iter().map(|key| key.weight).sum();
        MstSummary { edges: edges.into_iter().collect(), total_weight, rounds: self.round }
    }

    pub fn dump_logs(&self, w: &mut dyn std::io::Write) {
        self.logger.dump_log(w);
        for process in self.processes() {
            process.logger().dump_log(w);
        }
    }
}
