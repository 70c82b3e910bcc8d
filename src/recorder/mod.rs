//! Session recording: lifecycle, polling, and durable persistence
//!
//! One session = one bounded acquisition run from start to stop, backed by an
//! append-only CSV record store. The [`SessionRecorder`] state machine drives
//! the run; the [`RecordStore`] owns the file.

pub mod session;
pub mod store;

pub use session::{ClosedSession, SessionInfo, SessionRecorder};
pub use store::{RecordStore, STORE_HEADER};
