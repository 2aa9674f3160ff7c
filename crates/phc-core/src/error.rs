use thiserror::Error;

pub type PhcResult<T> = Result<T, PhcError>;

#[derive(Error, Debug)]
pub enum PhcError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Invariant violated: {what}")]
    Invariant { what: &'static str },
}
