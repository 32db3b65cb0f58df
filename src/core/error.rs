//! Error types for the logging facade

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// Unrecognized level name passed to a level setter
    #[error("Invalid log level: '{value}'")]
    InvalidLevel { value: String },

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// Formatter error with format type
    #[error("Formatter error ({format_type}): {message}")]
    FormatterError {
        format_type: String,
        message: String,
    },

    /// Output delivery error with output name
    #[error("Output '{output}' failed: {message}")]
    OutputError { output: String, message: String },

    /// Background queue full with buffer details
    #[error("Output queue full: {current}/{max} messages buffered")]
    QueueFull { current: usize, max: usize },

    /// Background worker already stopped
    #[error("Output worker already stopped")]
    WorkerStopped,

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl LoggerError {
    /// Create an invalid level error
    pub fn invalid_level(value: impl Into<String>) -> Self {
        LoggerError::InvalidLevel {
            value: value.into(),
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a formatter error
    pub fn formatter(format_type: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FormatterError {
            format_type: format_type.into(),
            message: message.into(),
        }
    }

    /// Create an output error
    pub fn output(output: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::OutputError {
            output: output.into(),
            message: message.into(),
        }
    }

    /// Create a queue full error with buffer details
    pub fn queue_full(current: usize, max: usize) -> Self {
        LoggerError::QueueFull { current, max }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = LoggerError::queue_full(100, 1000);
        assert!(matches!(err, LoggerError::QueueFull { .. }));

        let err = LoggerError::config("SpawnOutput", "no tokio runtime");
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));

        let err = LoggerError::invalid_level("verbose");
        assert!(matches!(err, LoggerError::InvalidLevel { .. }));
    }

    #[test]
    fn test_error_display() {
        let err = LoggerError::invalid_level("verbose");
        assert_eq!(err.to_string(), "Invalid log level: 'verbose'");

        let err = LoggerError::queue_full(100, 1000);
        assert_eq!(err.to_string(), "Output queue full: 100/1000 messages buffered");

        let err = LoggerError::formatter("JSON", "Invalid field type");
        assert_eq!(err.to_string(), "Formatter error (JSON): Invalid field type");

        let err = LoggerError::output("console", "broken pipe");
        assert_eq!(err.to_string(), "Output 'console' failed: broken pipe");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err: LoggerError = io_err.into();

        assert!(matches!(err, LoggerError::IoError(_)));
        assert!(err.to_string().contains("pipe closed"));
    }
}
