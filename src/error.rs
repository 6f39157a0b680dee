use thiserror::Error;

pub type Result<T> = std::result::Result<T, PlanError>;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("alias `{0}` is already defined in the pattern")]
    DuplicateAlias(String),
    #[error("alias `{0}` is not defined in the pattern")]
    UnknownAlias(String),
    #[error("edge `{alias}` has an invalid hop range {min}..{max}")]
    InvalidHopRange { alias: String, min: u32, max: u32 },
    #[error("pattern contains no nodes")]
    EmptyPattern,
    #[error("expression has no operands")]
    EmptyExpression,
}
