use bmad_core::ActionKind;
use bmad_core::WorkspaceError;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("{} is already pending", .0.label())]
    AlreadyPending(ActionKind),

    #[error("outcome channel closed")]
    ChannelClosed,
}

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Workspace(#[from] WorkspaceError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

pub type RuntimeResult<T> = Result<T, RuntimeError>;
