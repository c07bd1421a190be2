/// Console error types
use melody_playback::SessionError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConsoleError>;

#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A chat line that looked like a command but could not be understood
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Unknown command `{0}`. Try `help`")]
    UnknownCommand(String),

    #[error("`{command}` is missing its argument")]
    MissingArgument { command: String },

    #[error("{0} could not be understood as a number")]
    NotANumber(String),
}
