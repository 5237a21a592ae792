mod driver;
mod edge;
pub(crate) mod error;
mod graph;
mod logging;
mod process;


use crate::common::*;

pub mod errors {
    pub use super::error::{
        EdgeError, GraphError, ProcessError, RunnerError, SimulationError,
    };
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Msg {
    pub kind: MsgKind,
    pub sender: ProcessId,
    pub recipient: ProcessId,
    pub level: Level,            // sender's level at send time
    pub fragment_id: FragmentId, // sender's fragment at send time
}
#[derive(Copy, Clone, Debug, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum MsgKind {
    Init { search: SearchState }, // ROOTAWAYS
    Test,
    Accept,
    Reject,
    Report { best: Bound }, // ROOTWARD
    Connect,
    Chroot, // towards the MWOE
}
pub struct Edge {
    key: EdgeKey,
    // [0] carries low -> high, [1] carries high -> low
    mailboxes: [Mutex<Mailbox>; 2],
}
#[derive(Debug, Default)]
struct Mailbox {
    // invariant: frames in `delayed` were sent during the current round
    delayed: Vec<Vec<u8>>,
    undelayed: VecDeque<Vec<u8>>,
}
#[derive(Debug)]
pub struct Process {
    uid: ProcessId,
    fragment_id: FragmentId,
    level: Level,
    search_state: SearchState,
    begun: bool,
    halted: bool,
    exception: bool,
    round: usize,
    link_to_parent: Option<ProcessId>,
    mwoe_candidate: Option<ProcessId>,
    awaiting_test_reply: Option<ProcessId>,
    best_weight: Bound,
    best_edge: Option<ProcessId>,
    find_count: usize,
    pending_test_replies: VecSet<Msg>,
    deferred: VecDeque<Msg>,
    edge_map: BTreeMap<ProcessId, Arc<Edge>>,
    // invariant: the three sets partition edge_map's values
    component_edges: SortedVecSet<Arc<Edge>>,
    outside_edges: SortedVecSet<Arc<Edge>>,
    rejected_edges: SortedVecSet<Arc<Edge>>,
    logger: Box<dyn Logger>,
}
#[derive(Debug)]
pub struct ProcessRunner {
    uid: ProcessId,
    phased: RunnerPhased,
    status: ProcessStatus,
}
#[derive(Debug)]
enum RunnerPhased {
    Idle(Box<Process>),
    Running(std::thread::JoinHandle<Box<Process>>),
    Lost,
}
#[derive(Debug, Clone, Default)]
struct ProcessStatus {
    terminated: bool,
    exception: bool,
    mst_edges: String,
}
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Graph {
    processes: BTreeSet<ProcessId>,
    edges: BTreeMap<(ProcessId, ProcessId), Weight>,
}
#[derive(Debug, Clone)]
pub enum LogSink {
    Discard,
    Memory,
    Directory(PathBuf), // one file per process, named after its tag
}
#[derive(Debug, Clone)]
pub struct SimConfig {
    pub max_rounds: usize,
    pub log_sink: LogSink,
}
#[derive(Debug)]
pub struct Simulation {
    config: SimConfig,
    round: usize,
    edges: Vec<Arc<Edge>>,
    runners: Vec<ProcessRunner>, // ordered by uid
    logger: Box<dyn Logger>,
}
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct MstSummary {
    pub edges: Vec<EdgeKey>, // ascending, de-duplicated
    pub total_weight: Weight,
    pub rounds: usize,
}
pub trait Logger: Debug + Send {
    fn line_writer(&mut self) -> Option<&mut dyn std::io::Write>;
    fn dump_log(&self, _w: &mut dyn std::io::Write) {}
}
#[derive(Debug)]
pub struct DummyLogger;
#[derive(Debug)]
pub struct VecLogger(String, Vec<u8>);
#[derive(Debug)]
pub struct FileLogger(String, std::fs::File);

////////////////
impl Msg {
    pub fn init(
        sender: ProcessId,
        recipient: ProcessId,
        level: Level,
        fragment_id: FragmentId,
        search: SearchState,
    ) -> Self {
        Self { kind: MsgKind::Init { search }, sender, recipient, level, fragment_id }
    }
    pub fn test(
        sender: ProcessId,
        recipient: ProcessId,
        level: Level,
        fragment_id: FragmentId,
    ) -> Self {
        Self { kind: MsgKind::Test, sender, recipient, level, fragment_id }
    }
    // Accept and Reject echo the Test they answer, addressed back to its sender
    pub fn accept(test: &Msg) -> Self {
        Self { kind: MsgKind::Accept, ..test.reversed() }
    }
    pub fn reject(test: &Msg) -> Self {
        Self { kind: MsgKind::Reject, ..test.reversed() }
    }
    pub fn report(
        sender: ProcessId,
        recipient: ProcessId,
        level: Level,
        fragment_id: FragmentId,
        best: Bound,
    ) -> Self {
        Self { kind: MsgKind::Report { best }, sender, recipient, level, fragment_id }
    }
    pub fn connect(
        sender: ProcessId,
        recipient: ProcessId,
        level: Level,
        fragment_id: FragmentId,
    ) -> Self {
        Self { kind: MsgKind::Connect, sender, recipient, level, fragment_id }
    }
    pub fn chroot(
        sender: ProcessId,
        recipient: ProcessId,
        level: Level,
        fragment_id: FragmentId,
    ) -> Self {
        Self { kind: MsgKind::Chroot, sender, recipient, level, fragment_id }
    }
    fn reversed(&self) -> Self {
        Self { sender: self.recipient, recipient: self.sender, ..self.clone() }
    }
}
impl Display for Msg {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "{:?} {}->{} [L{} {}]",
            self.kind, self.sender, self.recipient, self.level, self.fragment_id
        )
    }
}
impl Default for SimConfig {
    fn default() -> Self {
        Self { max_rounds: 100_000, log_sink: LogSink::Discard }
    }
}
impl SimConfig {
    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds;
        self
    }
    pub fn with_log_sink(mut self, log_sink: LogSink) -> Self {
        self.log_sink = log_sink;
        self
    }
}
impl Display for MstSummary {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "MST weight {} after {} rounds: ", self.total_weight, self.rounds)?;
        let mut first = true;
        for key in self.edges.iter() {
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            write!(f, "{}", key)?;
        }
        Ok(())
    }
}
