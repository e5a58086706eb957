//! Command-line arguments
//!
//! Usage: `uplink <payload-file>`
//!
//! Environment:
//!   UPLINK_CONFIG   JSON file overriding the device configuration
//!   UPLINK_PORT     Use this port instead of the first available one
//!   RUST_LOG        Log filter (default: warn)

use std::fmt;
use std::path::PathBuf;

/// Environment variable naming a JSON device configuration file
pub const CONFIG_ENV: &str = "UPLINK_CONFIG";

/// Environment variable pinning the serial port
pub const PORT_ENV: &str = "UPLINK_PORT";

/// Argument errors, reported before anything else happens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgsError {
    MissingSource,
    TooManyArguments,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingSource => f.write_str("no source file specified"),
            ArgsError::TooManyArguments => f.write_str("invalid number of arguments"),
        }
    }
}

impl std::error::Error for ArgsError {}

/// Parsed invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    /// Payload file to transmit
    pub source: PathBuf,
    /// Device configuration override
    pub config: Option<PathBuf>,
    /// Port to use instead of the first available one
    pub port: Option<String>,
}

impl Args {
    /// Parse the positional arguments (program name already skipped) and the
    /// optional environment overrides.
    pub fn parse<I, S>(args: I, env: impl Fn(&str) -> Option<String>) -> Result<Self, ArgsError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let positional: Vec<String> = args.into_iter().map(Into::into).collect();
        let source = match positional.as_slice() {
            [] => return Err(ArgsError::MissingSource),
            [source] => PathBuf::from(source),
            _ => return Err(ArgsError::TooManyArguments),
        };

        let non_empty = |key: &str| env(key).filter(|v| !v.is_empty());
        Ok(Self {
            source,
            config: non_empty(CONFIG_ENV).map(PathBuf::from),
            port: non_empty(PORT_ENV),
        })
    }

    /// Parse from the process arguments and environment
    pub fn from_env() -> Result<Self, ArgsError> {
        Self::parse(std::env::args().skip(1), |key| std::env::var(key).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_no_arguments() {
        let err = Args::parse(Vec::<String>::new(), no_env).unwrap_err();
        assert_eq!(err, ArgsError::MissingSource);
        assert_eq!(err.to_string(), "no source file specified");
    }

    #[test]
    fn test_too_many_arguments() {
        let err = Args::parse(["a.bin", "b.bin"], no_env).unwrap_err();
        assert_eq!(err, ArgsError::TooManyArguments);
        assert_eq!(err.to_string(), "invalid number of arguments");
    }

    #[test]
    fn test_single_source() {
        let args = Args::parse(["firmware.bin"], no_env).unwrap();
        assert_eq!(
            args,
            Args {
                source: PathBuf::from("firmware.bin"),
                config: None,
                port: None,
            }
        );
    }

    #[test]
    fn test_environment_overrides() {
        let env = |key: &str| match key {
            CONFIG_ENV => Some("bench.json".to_string()),
            PORT_ENV => Some(String::new()),
            _ => None,
        };
        let args = Args::parse(["firmware.bin"], env).unwrap();
        assert_eq!(args.config, Some(PathBuf::from("bench.json")));
        // Empty values count as unset
        assert_eq!(args.port, None);
    }
}
