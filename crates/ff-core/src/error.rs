use thiserror::Error;

pub type FfResult<T> = Result<T, FfError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FfError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Cannot parse {what} from '{value}'")]
    Parse { what: &'static str, value: String },

    #[error("Index out of bounds: {what} (index={index}, len={len})")]
    IndexOob {
        what: &'static str,
        index: usize,
        len: usize,
    },
}
