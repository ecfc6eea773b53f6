//! The Planner: a pure `ModIR -> TaskDAG` function. No I/O.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod planner;

pub use planner::plan;
