use std::collections::HashMap;
use log::{debug, info, LevelFilter};
use serde::{Deserialize, Serialize};
use env_logger::{Builder, Target, WriteStyle};
use std::io::Write;

/// Available logging subsystems in lrcfetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoggingSubsystem {
    /// Main application logging
    #[serde(rename = "main")]
    Main,
    /// HTTP client operations
    #[serde(rename = "http")]
    Http,
    /// Lyrics lookup and retries
    #[serde(rename = "lyrics")]
    Lyrics,
    /// Tag and duration reading
    #[serde(rename = "metadata")]
    Metadata,
    /// Directory scanning and sidecar writing
    #[serde(rename = "library")]
    Library,
}

impl LoggingSubsystem {
    /// Get the module path prefix for this subsystem
    pub fn module_prefix(&self) -> &'static str {
        match self {
            LoggingSubsystem::Main => "lrcfetch",
            LoggingSubsystem::Http => "lrcfetch::helpers::http_client,ureq",
            LoggingSubsystem::Lyrics => "lrcfetch::helpers::lyrics,lrcfetch::helpers::lrclib",
            LoggingSubsystem::Metadata => {
                "lrcfetch::helpers::audio_metadata,lrcfetch::helpers::dsf,lofty"
            }
            LoggingSubsystem::Library => "lrcfetch::library",
        }
    }

    /// Get all available subsystems
    pub fn all() -> Vec<LoggingSubsystem> {
        vec![
            LoggingSubsystem::Main,
            LoggingSubsystem::Http,
            LoggingSubsystem::Lyrics,
            LoggingSubsystem::Metadata,
            LoggingSubsystem::Library,
        ]
    }

    /// Parse subsystem name to enum
    pub fn from_name(name: &str) -> Option<LoggingSubsystem> {
        match name.to_lowercase().as_str() {
            "main" => Some(LoggingSubsystem::Main),
            "http" => Some(LoggingSubsystem::Http),
            "lyrics" => Some(LoggingSubsystem::Lyrics),
            "metadata" => Some(LoggingSubsystem::Metadata),
            "library" => Some(LoggingSubsystem::Library),
            _ => None,
        }
    }
}

/// Logging configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Global log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Target for log output (stdout, stderr)
    #[serde(default = "default_target")]
    pub target: String,

    /// Whether to include timestamps
    #[serde(default = "default_timestamps")]
    pub timestamps: bool,

    /// Whether to use colored output
    #[serde(default = "default_colors")]
    pub colors: bool,

    /// Subsystem-specific log levels
    #[serde(default)]
    pub subsystems: HashMap<String, String>,

    /// Whether to include module paths in log output
    #[serde(default = "default_module_path")]
    pub include_module_path: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_target() -> String {
    "stdout".to_string()
}

fn default_timestamps() -> bool {
    true
}

fn default_colors() -> bool {
    true
}

fn default_module_path() -> bool {
    false
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_log_level(),
            target: default_target(),
            timestamps: default_timestamps(),
            colors: default_colors(),
            subsystems: HashMap::new(),
            include_module_path: default_module_path(),
        }
    }
}

impl LoggingConfig {
    /// Convert string log level to LevelFilter
    fn parse_log_level(level: &str) -> LevelFilter {
        match level.to_lowercase().as_str() {
            "off" => LevelFilter::Off,
            "error" => LevelFilter::Error,
            "warn" => LevelFilter::Warn,
            "info" => LevelFilter::Info,
            "debug" => LevelFilter::Debug,
            "trace" => LevelFilter::Trace,
            _ => {
                eprintln!("Warning: Unknown log level '{}', defaulting to 'info'", level);
                LevelFilter::Info
            }
        }
    }

    /// Switch the global level to debug
    pub fn enable_debug(&mut self) {
        self.level = "debug".to_string();
    }

    /// Build the environment filter string for env_logger
    pub fn build_filter_string(&self) -> String {
        let mut filter_parts = vec![self.level.clone()];

        // Sorted so the filter string is stable
        let mut subsystems: Vec<_> = self.subsystems.iter().collect();
        subsystems.sort();

        for (subsystem_name, level) in subsystems {
            if let Some(subsystem) = LoggingSubsystem::from_name(subsystem_name) {
                for prefix in subsystem.module_prefix().split(',') {
                    filter_parts.push(format!("{}={}", prefix.trim(), level));
                }
            } else {
                // Allow custom module specifications
                filter_parts.push(format!("{}={}", subsystem_name, level));
            }
        }

        filter_parts.join(",")
    }

    /// Initialize the logger with this configuration
    pub fn initialize_logger(&self) -> Result<(), String> {
        let filter_string = self.build_filter_string();

        let mut builder = Builder::new();

        // Parse environment variables if they exist
        builder.parse_env("RUST_LOG");

        builder.filter(None, Self::parse_log_level(&self.level));

        for (subsystem_name, level) in &self.subsystems {
            let level_filter = Self::parse_log_level(level);
            if let Some(subsystem) = LoggingSubsystem::from_name(subsystem_name) {
                for prefix in subsystem.module_prefix().split(',') {
                    builder.filter(Some(prefix.trim()), level_filter);
                }
            } else {
                builder.filter(Some(subsystem_name), level_filter);
            }
        }

        let write_style = if self.colors {
            WriteStyle::Auto
        } else {
            WriteStyle::Never
        };
        builder.write_style(write_style);

        match self.target.to_lowercase().as_str() {
            "stdout" => {
                builder.target(Target::Stdout);
            }
            "stderr" => {
                builder.target(Target::Stderr);
            }
            _ => {
                return Err(format!("Unknown logging target: {}", self.target));
            }
        }

        let include_module_path = self.include_module_path;
        let timestamps = self.timestamps;

        builder.format(move |buf, record| {
            let mut output = String::new();

            if timestamps {
                let now = chrono::Local::now();
                output.push_str(&format!("[{}] ", now.format("%Y-%m-%d %H:%M:%S")));
            }

            output.push_str(&format!("[{}] ", record.level()));

            if include_module_path {
                if let Some(module) = record.module_path() {
                    output.push_str(&format!("[{}] ", module));
                }
            }

            output.push_str(&format!("{}", record.args()));

            writeln!(buf, "{}", output)
        });

        builder.try_init()
            .map_err(|e| format!("Failed to initialize logger: {}", e))?;

        debug!("Logging initialized with filter: {}", filter_string);
        Ok(())
    }
}

/// Initialize logging from the loaded configuration and the debug flag
pub fn initialize_logging(config: &LoggingConfig, debug_mode: bool) -> Result<(), String> {
    let mut config = config.clone();
    if debug_mode {
        config.enable_debug();
    }
    config.initialize_logger()?;
    if debug_mode {
        info!("Debug mode enabled via command line");
    }
    Ok(())
}
