use std::path::PathBuf;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the library
#[derive(Debug)]
pub enum Error {
    IoError(std::io::Error),
    ParseError { file: PathBuf, message: String },
    /// A class, method or type could not be reflected
    Reflection { target: String, message: String },
    /// The route action does not name a handler
    InvalidAction(String),
    /// A transformer collaborator failed to produce output
    Transform { transformer: String, message: String },
    ConfigError(String),
    SerializationError(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::IoError(e) => write!(f, "IO error: {}", e),
            Error::ParseError { file, message } => {
                write!(f, "Parse error in {}: {}", file.display(), message)
            }
            Error::Reflection { target, message } => {
                write!(f, "Cannot reflect {}: {}", target, message)
            }
            Error::InvalidAction(action) => write!(f, "Invalid route action: {}", action),
            Error::Transform {
                transformer,
                message,
            } => write!(f, "Transformer {} failed: {}", transformer, message),
            Error::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            Error::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl Error {
    /// Shorthand for a reflection failure on `target`
    pub fn reflection(target: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Reflection {
            target: target.into(),
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(format!("JSON error: {}", err))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::SerializationError(format!("YAML error: {}", err))
    }
}

impl From<syn::Error> for Error {
    fn from(err: syn::Error) -> Self {
        Error::ParseError {
            file: PathBuf::from("<source>"),
            message: err.to_string(),
        }
    }
}
