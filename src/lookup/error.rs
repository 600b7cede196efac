use std::path::PathBuf;
use thiserror::Error;

/// Which side of the contract an [`Error`] falls on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// The caller asked for something the table does not define.
    Precondition,
    /// The table or its construction is broken. Never retried.
    Internal,
    /// The artifact could not be read, written, or trusted.
    Io,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("unsupported hand size: {hand:#015x} holds {cards} cards")]
    Unsupported { hand: u64, cards: u32 },

    #[error("hand table queried before it was ready")]
    NotReady,

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("key not found: {0:#015x}")]
    Missing(u64),

    #[error("packed map is full at capacity {capacity}")]
    Full { capacity: usize },

    #[error("internal inconsistency: {0}")]
    Inconsistent(String),

    #[error("i/o failure on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt artifact: {0}")]
    Corrupt(String),

    #[error("artifact fingerprint {found:#018x} does not match expected {expected:#018x}")]
    Fingerprint { expected: u64, found: u64 },
}

impl Error {
    pub fn category(&self) -> Category {
        match self {
            Error::Unsupported { .. } | Error::NotReady | Error::Config(_) => Category::Precondition,
            Error::Missing(_) | Error::Full { .. } | Error::Inconsistent(_) => Category::Internal,
            Error::Io { .. } | Error::Corrupt(_) | Error::Fingerprint { .. } => Category::Io,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| match source.kind() {
            std::io::ErrorKind::UnexpectedEof => {
                Error::Corrupt(format!("{} is truncated", path.display()))
            }
            _ => Error::Io { path, source },
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories() {
        assert_eq!(Error::NotReady.category(), Category::Precondition);
        assert_eq!(Error::Missing(0b11111).category(), Category::Internal);
        assert_eq!(Error::Corrupt("x".into()).category(), Category::Io);
    }

    #[test]
    fn truncation_is_corruption() {
        let eof = std::io::Error::from(std::io::ErrorKind::UnexpectedEof);
        assert!(matches!(Error::io("t.bin")(eof), Error::Corrupt(_)));
        let denied = std::io::Error::from(std::io::ErrorKind::PermissionDenied);
        assert!(matches!(Error::io("t.bin")(denied), Error::Io { .. }));
    }
}
