use thiserror::Error;

use crate::selection::Dimension;
use crate::view::ViewKind;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("{view} view does not own {dimension} selections")]
    NotOwned { view: ViewKind, dimension: Dimension },

    #[error("a {0} view is already registered")]
    DuplicateView(ViewKind),

    #[error("no {0} view is registered")]
    UnknownView(ViewKind),
}
