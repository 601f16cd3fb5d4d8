//! Input validation errors raised before anything is drawn.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum WaterfallError {
    #[error("no data: a waterfall needs at least one bar group")]
    EmptyData,

    #[error("bar group {index} has no stack levels")]
    EmptyGroup { index: usize },

    #[error("{what} do not match the data shape: {detail}")]
    ShapeMismatch { what: &'static str, detail: String },

    #[error("invalid color {0:?}")]
    InvalidColor(String),

    #[error("invalid option: {0}")]
    InvalidOption(String),
}
