use std::string::FromUtf8Error;

/// All error types produced while managing a fleet of Wiz lights.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Failed to serialize data to JSON.
    #[error("failed to dump json: {0:?}")]
    JsonDump(serde_json::Error),

    /// A bulb reply was not the JSON we expected.
    #[error("failed to load json: {0:?}")]
    JsonLoad(serde_json::Error),

    /// A network socket operation failed while communicating with a bulb.
    #[error("socket {action} error: {err:?}")]
    Socket { action: String, err: std::io::Error },

    /// The UDP response from a bulb contained invalid UTF-8.
    #[error("utf8 decoding error: {0:?}")]
    Utf8Decode(FromUtf8Error),

    /// The address cannot be used to reach a bulb.
    #[error("invalid bulb address {0}")]
    InvalidAddress(String),

    /// The bulb answered with an error object instead of a result.
    #[error("bulb {address} rejected {method}: {message}")]
    BulbRejected {
        address: String,
        method: String,
        message: String,
    },

    /// Attempted to send a [`crate::Payload`] with no attributes set.
    #[error("invalid payload; no attributes set")]
    NoAttribute,

    /// A named dispatch target matched no registry record.
    #[error("no bulb with address or name {0}")]
    TargetNotFound(String),

    /// A registry operation addressed a record that does not exist.
    #[error("bulb {0} not found")]
    DeviceNotFound(String),

    /// Reconciliation was requested for an address that was never registered.
    #[error("bulb {0} is not registered")]
    UnknownAddress(String),

    /// The scene id is not part of the Wiz scene catalogue.
    #[error("unknown scene id {0}")]
    InvalidScene(u16),

    /// The display name cannot be stored.
    #[error("invalid name {name:?}: {reason}")]
    InvalidName { name: String, reason: String },

    /// The configuration is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The discovery broadcast could not be performed.
    #[error("discovery failed: {0}")]
    Discovery(Box<Error>),

    /// The backing registry store failed.
    #[error("registry unavailable while {action}: {reason}")]
    RegistryUnavailable { action: String, reason: String },
}

/// Coarse classification of an [`Error`], meant for mapping onto status codes
/// at an outer API layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The bulb timed out, refused or answered garbage.
    DeviceUnreachable,
    /// The requested target or record does not exist.
    NotFound,
    /// An unregistered address reached the reconciler.
    UnknownAddress,
    /// The caller passed an unusable value.
    InvalidInput,
    /// The network broadcast failed.
    Discovery,
    /// The registry store failed.
    RegistryUnavailable,
}

impl Error {
    /// Create a new socket error
    pub fn socket(action: &str, err: std::io::Error) -> Self {
        Error::Socket {
            action: action.to_string(),
            err,
        }
    }

    /// Create a new registry error
    pub fn registry(action: &str, reason: impl ToString) -> Self {
        Error::RegistryUnavailable {
            action: action.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a new invalid name error
    pub fn invalid_name(name: &str, reason: &str) -> Self {
        Error::InvalidName {
            name: name.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::JsonLoad(_)
            | Error::Socket { .. }
            | Error::Utf8Decode(_)
            | Error::InvalidAddress(_)
            | Error::BulbRejected { .. } => ErrorKind::DeviceUnreachable,
            Error::TargetNotFound(_) | Error::DeviceNotFound(_) => ErrorKind::NotFound,
            Error::UnknownAddress(_) => ErrorKind::UnknownAddress,
            Error::JsonDump(_)
            | Error::NoAttribute
            | Error::InvalidScene(_)
            | Error::InvalidName { .. }
            | Error::InvalidConfig(_) => ErrorKind::InvalidInput,
            Error::Discovery(_) => ErrorKind::Discovery,
            Error::RegistryUnavailable { .. } => ErrorKind::RegistryUnavailable,
        }
    }
}

/// Hacky implementation of PartialEq for testing
#[cfg(test)]
impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}
