//! Logging formatters
//!
//! A [`LoggingFormatter`] turns a logging intent into one statement of
//! target syntax. One variant exists per logging-framework convention; all
//! of them log through an injected logger field.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Severity of a generated log call
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    /// Finest detail
    Trace,
    /// Diagnostic detail
    Debug,
    /// Normal flow
    #[default]
    Information,
    /// Unexpected but handled
    Warning,
    /// Failure of the current operation
    Error,
    /// Failure of the process
    Critical,
}

/// Renders logging intents as target-language statements
pub trait LoggingFormatter: Send + Sync + Debug {
    /// Stable policy name
    fn name(&self) -> &'static str;

    /// Field holding the logger instance
    fn logger_field(&self) -> &str;

    /// Namespaces the generated statements depend on
    fn required_namespaces(&self) -> Vec<String>;

    /// Render one log statement (without indentation or newline)
    ///
    /// `exception` is the name of a variable holding a caught exception.
    fn format(&self, level: LogLevel, message: &str, exception: Option<&str>) -> String;
}

/// Escape text for use inside a double-quoted literal
#[must_use]
pub fn escape_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}

fn render_call(field: &str, method: &str, message: &str, exception: Option<&str>) -> String {
    let message = escape_literal(message);
    match exception {
        Some(ex) => format!("{field}.{method}({ex}, \"{message}\");"),
        None => format!("{field}.{method}(\"{message}\");"),
    }
}

/// `ILogger` extension methods (`LogInformation`, `LogError`, ...)
#[derive(Debug, Clone)]
pub struct ExtensionsLoggingFormatter {
    logger_field: String,
}

impl ExtensionsLoggingFormatter {
    /// Formatter logging through `logger_field`
    #[must_use]
    pub fn new(logger_field: impl Into<String>) -> Self {
        Self {
            logger_field: logger_field.into(),
        }
    }
}

impl LoggingFormatter for ExtensionsLoggingFormatter {
    fn name(&self) -> &'static str {
        "extensions_logging"
    }

    fn logger_field(&self) -> &str {
        &self.logger_field
    }

    fn required_namespaces(&self) -> Vec<String> {
        vec!["Microsoft.Extensions.Logging".to_string()]
    }

    fn format(&self, level: LogLevel, message: &str, exception: Option<&str>) -> String {
        let method = match level {
            LogLevel::Trace => "LogTrace",
            LogLevel::Debug => "LogDebug",
            LogLevel::Information => "LogInformation",
            LogLevel::Warning => "LogWarning",
            LogLevel::Error => "LogError",
            LogLevel::Critical => "LogCritical",
        };
        render_call(&self.logger_field, method, message, exception)
    }
}

/// Serilog `ILogger` (`Information`, `Error`, ...)
#[derive(Debug, Clone)]
pub struct SerilogFormatter {
    logger_field: String,
}

impl SerilogFormatter {
    /// Formatter logging through `logger_field`
    #[must_use]
    pub fn new(logger_field: impl Into<String>) -> Self {
        Self {
            logger_field: logger_field.into(),
        }
    }
}

impl LoggingFormatter for SerilogFormatter {
    fn name(&self) -> &'static str {
        "serilog"
    }

    fn logger_field(&self) -> &str {
        &self.logger_field
    }

    fn required_namespaces(&self) -> Vec<String> {
        vec!["Serilog".to_string()]
    }

    fn format(&self, level: LogLevel, message: &str, exception: Option<&str>) -> String {
        let method = match level {
            LogLevel::Trace => "Verbose",
            LogLevel::Debug => "Debug",
            LogLevel::Information => "Information",
            LogLevel::Warning => "Warning",
            LogLevel::Error => "Error",
            LogLevel::Critical => "Fatal",
        };
        render_call(&self.logger_field, method, message, exception)
    }
}

/// `NLog.Logger` (`Info`, `Warn`, ...)
#[derive(Debug, Clone)]
pub struct NLogFormatter {
    logger_field: String,
}

impl NLogFormatter {
    /// Formatter logging through `logger_field`
    #[must_use]
    pub fn new(logger_field: impl Into<String>) -> Self {
        Self {
            logger_field: logger_field.into(),
        }
    }
}

impl LoggingFormatter for NLogFormatter {
    fn name(&self) -> &'static str {
        "nlog"
    }

    fn logger_field(&self) -> &str {
        &self.logger_field
    }

    fn required_namespaces(&self) -> Vec<String> {
        vec!["NLog".to_string()]
    }

    fn format(&self, level: LogLevel, message: &str, exception: Option<&str>) -> String {
        let method = match level {
            LogLevel::Trace => "Trace",
            LogLevel::Debug => "Debug",
            LogLevel::Information => "Info",
            LogLevel::Warning => "Warn",
            LogLevel::Error => "Error",
            LogLevel::Critical => "Fatal",
        };
        render_call(&self.logger_field, method, message, exception)
    }
}
