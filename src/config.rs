//! Session configuration

use serde::{Deserialize, Serialize};

use crate::error::{Result, TermptyError};

/// Largest accepted width or height
pub const MAX_DIMENSION: usize = 4096;

/// Configuration for a [`crate::Termpty`] session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TermptyConfig {
    /// Width in columns
    pub cols: usize,
    /// Height in rows
    pub rows: usize,
    /// Maximum scrollback rows
    pub backlog_capacity: usize,
    /// Bytes per read when driving a session from a stream
    pub chunk_size: usize,
}

impl Default for TermptyConfig {
    fn default() -> Self {
        Self {
            cols: 80,
            rows: 24,
            backlog_capacity: 2000,
            chunk_size: 4096,
        }
    }
}

impl TermptyConfig {
    /// Reject configurations no session can be built from
    pub fn validate(&self) -> Result<()> {
        if self.cols == 0 || self.rows == 0 {
            return Err(TermptyError::InvalidDimensions {
                width: self.cols,
                height: self.rows,
            });
        }
        if self.cols > MAX_DIMENSION || self.rows > MAX_DIMENSION {
            return Err(TermptyError::Config(format!(
                "dimensions {}x{} exceed {}",
                self.cols, self.rows, MAX_DIMENSION
            )));
        }
        if self.chunk_size == 0 {
            return Err(TermptyError::Config("chunk size must be non-zero".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = TermptyConfig::default();
        assert_eq!((config.cols, config.rows), (80, 24));
        assert_eq!(config.backlog_capacity, 2000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validate() {
        let config = TermptyConfig {
            rows: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(TermptyError::InvalidDimensions { width: 80, height: 0 })
        ));

        let config = TermptyConfig {
            chunk_size: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(TermptyError::Config(_))));

        let config = TermptyConfig {
            cols: MAX_DIMENSION + 1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_partial_json() {
        let config: TermptyConfig = serde_json::from_str(r#"{"cols": 132}"#).unwrap();
        assert_eq!(config.cols, 132);
        assert_eq!(config.rows, 24);
    }
}
