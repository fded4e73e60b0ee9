//! Errors surfaced by the registry.
//!
//! Snapshot failures never show up here: they are absorbed by the subscription
//! entry and published as the empty snapshot.

use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::io;

pub enum ConsoleStreamerError {
    /// The recurring ticker for a new subscription could not be started.
    Scheduler { key: String, source: io::Error },
}

impl ConsoleStreamerError {
    pub(crate) fn scheduler(key: &str, source: io::Error) -> Self {
        ConsoleStreamerError::Scheduler {
            key: key.to_string(),
            source,
        }
    }
}

impl Debug for ConsoleStreamerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ConsoleStreamerError::Scheduler { key, source } => {
                write!(f, "Scheduler({key:?}, {source:?})")
            }
        }
    }
}

impl Display for ConsoleStreamerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ConsoleStreamerError::Scheduler { key, source } => {
                write!(f, "Unable to schedule updates for subscription {key}: {source}")
            }
        }
    }
}

impl Error for ConsoleStreamerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConsoleStreamerError::Scheduler { source, .. } => Some(source),
        }
    }
}
