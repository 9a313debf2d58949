use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

/// Failures of the partitioner, the executor and the harness.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed dimensions or worker count, rejected before any unit starts.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Sequential and parallel results disagree.
    #[error("{kernel}: sequential and parallel results differ")]
    ComputationMismatch { kernel: &'static str },

    /// A worker unit did not run to completion.
    #[error("worker {worker} was interrupted before completing its range")]
    ExecutionInterrupted { worker: usize },

    /// The OS refused to start a worker thread.
    #[error("failed to spawn worker {worker}: {source}")]
    Spawn {
        worker: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to build worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }
}
