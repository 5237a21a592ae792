use crate::common::*;

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum GraphError {
    SelfLoop(ProcessId),
    DuplicateEdge { low: ProcessId, high: ProcessId },
    DuplicateProcess(ProcessId),
    AsymmetricWeight { row: ProcessId, column: ProcessId },
    Malformed { line: usize, reason: &'static str },
}
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum EdgeError {
    NotAnEndpoint(ProcessId),
    MalformedMessage,
    Poisoned,
}
////////////////////////
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ProcessError {
    Edge(EdgeError),
    UnknownPeer(ProcessId),
    Misrouted { recipient: ProcessId },
    UnexpectedReport(ProcessId),
    NoCandidate,
}
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum RunnerError {
    AlreadyStarted(ProcessId),
    NotStarted(ProcessId),
    SpawnFailed(ProcessId),
    Lost(ProcessId),
}
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum SimulationError {
    Graph(GraphError),
    Edge(EdgeError),
    Runner(RunnerError),
    ProcessFailed { uid: ProcessId, round: usize },
    RoundLimitExceeded { rounds: usize },
    LogSetup(PathBuf),
}
/////////////////////
impl From<EdgeError> for ProcessError {
    fn from(e: EdgeError) -> Self {
        Self::Edge(e)
    }
}
impl From<GraphError> for SimulationError {
    fn from(e: GraphError) -> Self {
        Self::Graph(e)
    }
}
impl From<EdgeError> for SimulationError {
    fn from(e: EdgeError) -> Self {
        Self::Edge(e)
    }
}
impl From<RunnerError> for SimulationError {
    fn from(e: RunnerError) -> Self {
        Self::Runner(e)
    }
}
