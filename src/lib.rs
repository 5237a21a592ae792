#[macro_use]
mod macros;

mod collections;
mod common;
mod runtime;

pub use common::{Bound, EdgeKey, FragmentId, Level, ProcessId, SearchState, Weight};
pub use runtime::{
    errors, DummyLogger, Edge, FileLogger, Graph, LogSink, Logger, MstSummary, Msg, MsgKind,
    Process, ProcessRunner, SimConfig, Simulation, VecLogger,
};
