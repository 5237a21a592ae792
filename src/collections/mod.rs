mod sets;

pub(crate) use sets::{SortedVecSet, VecSet};
