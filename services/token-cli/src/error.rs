//! Command failures. Every variant maps to exit status 1.

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Auth(#[from] meta_auth::Error),

    #[error(transparent)]
    Graph(#[from] graph_api::Error),

    #[error("no token provided")]
    NoToken,

    #[error("{step} failed: {source}")]
    Step {
        step: &'static str,
        #[source]
        source: graph_api::Error,
    },

    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CliError>;
