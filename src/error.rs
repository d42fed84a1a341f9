use std::path::PathBuf;

use thiserror::Error;

/// Fatal errors that abort the run. Each variant maps to a process exit code.
#[derive(Debug, Error)]
pub enum LuminolError {
    /// Configuration is unreadable, unparsable, or semantically invalid.
    #[error("config error in [{section}]{key}: {message}\n       hint: {suggestion}")]
    Config {
        /// Section the error was found in (`global` or an app name).
        section: String,
        /// Offending key path, rendered as ` key` or empty when unknown.
        key: String,
        message: String,
        suggestion: String,
    },

    /// The wallpaper image could not be decoded or yielded no usable pixels.
    #[error("cannot process image {}: {message}", path.display())]
    Image { path: PathBuf, message: String },

    /// Filesystem or subprocess failure.
    #[error("{message} ({})", path.display())]
    Io { path: PathBuf, message: String },

    /// The wallpaper-set command failed; rendering cannot be considered applied.
    #[error("wallpaper command failed: {0}")]
    Wallpaper(String),
}

impl LuminolError {
    /// Convenience constructor for configuration errors.
    pub fn config(
        section: impl Into<String>,
        key: impl Into<String>,
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        let key = key.into();
        let key = if key.is_empty() {
            key
        } else {
            format!(" {key}")
        };
        Self::Config {
            section: section.into(),
            key,
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Process exit code for this error, per the CLI contract.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config { .. } => 3,
            Self::Image { .. } => 4,
            Self::Io { .. } | Self::Wallpaper(_) => 5,
        }
    }
}

/// Collector for recoverable diagnostics. Warnings are logged as they occur
/// and replayed at end of run; a non-empty collector elevates the exit code
/// to 6 (partial success).
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<String>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("{message}");
        self.warnings.push(message);
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_match_cli_contract() {
        let config = LuminolError::config("waybar", "colors", "missing", "add [waybar.colors]");
        assert_eq!(config.exit_code(), 3);

        let image = LuminolError::Image {
            path: PathBuf::from("/tmp/w.png"),
            message: "decode failed".into(),
        };
        assert_eq!(image.exit_code(), 4);

        let io = LuminolError::Io {
            path: PathBuf::from("/tmp/out"),
            message: "write failed".into(),
        };
        assert_eq!(io.exit_code(), 5);
    }

    #[test]
    fn config_error_names_section_and_key() {
        let err = LuminolError::config("waybar", "color-format", "bad value", "use hex6");
        let rendered = err.to_string();
        assert!(rendered.contains("[waybar]"), "missing section: {rendered}");
        assert!(rendered.contains("color-format"), "missing key: {rendered}");
        assert!(rendered.contains("hint:"), "missing hint: {rendered}");
    }

    #[test]
    fn diagnostics_collects_in_order() {
        let mut diags = Diagnostics::new();
        assert!(diags.is_empty());
        diags.warn("first");
        diags.warn("second");
        assert_eq!(diags.len(), 2);
        assert_eq!(diags.warnings()[0], "first");
    }
}
