//! Recoverable controller errors.

use crate::store::StoreError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-level failure surfaced by `fetch`, `refresh` or `remove_all`.
///
/// The mirror is left unmodified whenever one of these is returned.
#[derive(Debug)]
pub enum MirrorError {
    Fetch(StoreError),
    RemoveAll(StoreError),
}

impl MirrorError {
    pub fn store_error(&self) -> &StoreError {
        match self {
            Self::Fetch(err) | Self::RemoveAll(err) => err,
        }
    }
}

impl Display for MirrorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fetch(err) => write!(f, "mirror fetch failed: {err}"),
            Self::RemoveAll(err) => write!(f, "mirror remove_all failed: {err}"),
        }
    }
}

impl Error for MirrorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(self.store_error())
    }
}
