///////////////////// PRELUDE /////////////////////

pub(crate) use crate::collections::{SortedVecSet, VecSet};
pub(crate) use crate::runtime::{error::*, Edge, Logger, Msg, MsgKind};

pub(crate) use core::{
    cmp::Ordering,
    fmt::{Debug, Display, Formatter},
};
pub(crate) use std::{
    collections::{BTreeMap, BTreeSet, VecDeque},
    io::Write,
    path::PathBuf,
    sync::{Arc, Mutex},
};
pub(crate) use SearchState::*;

pub type Weight = u64;
pub type Level = u32;

#[derive(
    Copy,
    Clone,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    serde::Serialize,
    serde::Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[display(fmt = "{}", _0)]
#[repr(transparent)]
pub struct ProcessId(pub u32);

// Field order is the total order: weight first, then the endpoint ids.
#[derive(
    Copy,
    Clone,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    serde::Serialize,
    serde::Deserialize,
    derive_more::Display,
)]
#[display(fmt = "{}-{}({})", low, high, weight)]
pub struct EdgeKey {
    pub weight: Weight,
    pub low: ProcessId,
    pub high: ProcessId,
}

/// Name shared by every process of a fragment. A singleton fragment is named
/// after its only process; a merged fragment after its core edge.
#[derive(
    Copy,
    Clone,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Debug,
    serde::Serialize,
    serde::Deserialize,
    derive_more::Display,
)]
pub enum FragmentId {
    #[display(fmt = "P{}", _0)]
    Process(ProcessId),
    #[display(fmt = "C{}", _0)]
    Core(EdgeKey),
}

/// Report payload. `Finite` sorts below `Infinite`.
#[derive(
    Copy,
    Clone,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Debug,
    serde::Serialize,
    serde::Deserialize,
    derive_more::Display,
)]
pub enum Bound {
    #[display(fmt = "{}", _0)]
    Finite(EdgeKey),
    #[display(fmt = "inf")]
    Infinite,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, serde::Serialize, serde::Deserialize)]
pub enum SearchState {
    Find,  // fragment is looking for its MWOE
    Found, // this subtree has reported
}

///////////////////// IMPL /////////////////////
impl EdgeKey {
    pub fn new(a: ProcessId, b: ProcessId, weight: Weight) -> Self {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        Self { weight, low, high }
    }
    pub fn other_side(&self, uid: ProcessId) -> Option<ProcessId> {
        if uid == self.low {
            Some(self.high)
        } else if uid == self.high {
            Some(self.low)
        } else {
            None
        }
    }
}
impl Debug for ProcessId {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "P({})", self.0)
    }
}
impl Debug for EdgeKey {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "eK({}-{} w{})", self.low.0, self.high.0, self.weight)
    }
}
impl Bound {
    pub fn is_infinite(&self) -> bool {
        *self == Bound::Infinite
    }
}
