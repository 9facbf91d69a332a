//! Pipeline entry points for the mirror.
//!
//! - `run_scheduler`: Run cycles on a fixed interval until shutdown
//! - `Mirror::run_cycle`: Fetch the listing page and sync every linked file

pub mod archive;
pub mod detect;
pub mod schedule;
pub mod shutdown;
pub mod sync;

#[cfg(test)]
pub(crate) mod testing;

pub use archive::archive_if_present;
pub use detect::{digest_file, is_changed};
pub use schedule::run_scheduler;
pub use shutdown::{Shutdown, ShutdownTrigger, shutdown_channel};
pub use sync::{CycleReport, FileReport, Mirror, SyncOutcome};
