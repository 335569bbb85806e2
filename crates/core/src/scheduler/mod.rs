//! One scheduler tick: fetch, snapshot, match, deliver.

mod runner;

pub use runner::{RunCycle, RunError, RunReport, UploadRecord};
