#[derive(Debug, thiserror::Error)]
pub enum AssistantBuildError {
    #[error("Build Failure: {0}")]
    BuildFailure(String),
}
