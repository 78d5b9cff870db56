use thiserror::Error;

/// Errors that can occur while resolving resources.
#[derive(Error, Debug)]
pub enum VfsError {
    /// The requested path was not found in the provider.
    #[error("not found: {0}")]
    NotFound(String),
    /// An IO error occurred while accessing a provider.
    #[error("IO error: {0}")]
    Io(#[source] std::io::Error),
    /// The path is invalid (empty, contains `..`, or other normalization failure).
    #[error("invalid path: {0}")]
    InvalidPath(String),
}

impl From<std::io::Error> for VfsError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            VfsError::NotFound(err.to_string())
        } else {
            VfsError::Io(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_not_found_maps_to_not_found() {
        let err: VfsError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, VfsError::NotFound(_)));
        let err: VfsError = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "no").into();
        assert!(matches!(err, VfsError::Io(_)));
        assert!(err.to_string().starts_with("IO error"));
    }
}
