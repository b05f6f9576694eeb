//! Error taxonomy for job validation and markup rendering.

/// Errors raised while validating or rendering a job.
///
/// All of these describe caller configuration bugs; none are retried.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("job {job}: gerrit trigger must not set a description or expression")]
    GerritTriggerWithExpression { job: String },

    #[error("job {job}: gerrit trigger needs at least one project pattern")]
    GerritTriggerWithoutProjects { job: String },

    #[error("job {job}: {kind} trigger needs a schedule expression")]
    MissingTriggerExpression { job: String, kind: String },

    #[error("job {job}: maven jobs cannot declare freestyle builders")]
    MavenJobWithBuilders { job: String },

    #[error("job {job}: {kind} scm needs at least one repository")]
    MissingRepositories { job: String, kind: String },

    #[error("job {job}: downstream job {target} is not defined")]
    UnknownDownstreamJob { job: String, target: String },

    #[error("job {job}: predefined parameter key must not be empty")]
    EmptyParameterKey { job: String },

    #[error("job {job}: {kind} trigger cannot carry gerrit settings")]
    GenericTriggerWithGerritFields { job: String, kind: String },

    #[error("job has neither an id nor a name")]
    MissingJobName,

    #[error("job id {0} is defined more than once")]
    DuplicateJob(String),

    #[error("malformed extension markup: {0}")]
    MalformedMarkup(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for markup operations.
pub type Result<T> = std::result::Result<T, RenderError>;
