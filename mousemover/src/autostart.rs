use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::core::Config;

pub const LAUNCH_AGENT_LABEL: &str = "dev.mousemover.agent";

/// Login-item registration.
/// This abstraction allows mocking in tests.
pub trait Autostart {
    fn is_enabled(&self) -> bool;
    fn set_enabled(&self, enable: bool) -> Result<(), AutostartError>;
}

impl<T: Autostart + ?Sized> Autostart for Box<T> {
    fn is_enabled(&self) -> bool {
        (**self).is_enabled()
    }

    fn set_enabled(&self, enable: bool) -> Result<(), AutostartError> {
        (**self).set_enabled(enable)
    }
}

#[derive(Debug)]
pub enum AutostartError {
    NoHomeDirectory,
    Unavailable(String),
    UnknownExecutable(io::Error),
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for AutostartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoHomeDirectory => write!(f, "Could not determine the home directory"),
            Self::Unavailable(reason) => write!(f, "Autostart is unavailable: {}", reason),
            Self::UnknownExecutable(err) => {
                write!(f, "Could not determine the executable path: {}", err)
            }
            Self::Io { path, source } => write!(f, "{}: {}", path.display(), source),
        }
    }
}

impl std::error::Error for AutostartError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NoHomeDirectory | Self::Unavailable(_) => None,
            Self::UnknownExecutable(err) => Some(err),
            Self::Io { source, .. } => Some(source),
        }
    }
}

/// A per-user launchd agent that starts the daemon at login.
#[derive(Debug, Clone)]
pub struct LaunchAgent {
    plist_path: PathBuf,
    program: PathBuf,
    arguments: Vec<String>,
}

impl LaunchAgent {
    pub fn new(agents_dir: impl AsRef<Path>, program: impl Into<PathBuf>, arguments: Vec<String>) -> Self {
        Self {
            plist_path: agents_dir
                .as_ref()
                .join(format!("{}.plist", LAUNCH_AGENT_LABEL)),
            program: program.into(),
            arguments,
        }
    }

    /// Agent in `~/Library/LaunchAgents` for the running executable, started
    /// with the given settings.
    pub fn for_current_user(config: &Config) -> Result<Self, AutostartError> {
        let home = dirs::home_dir().ok_or(AutostartError::NoHomeDirectory)?;
        let program = std::env::current_exe().map_err(AutostartError::UnknownExecutable)?;
        Ok(Self::new(
            home.join("Library").join("LaunchAgents"),
            program,
            config_arguments(config),
        ))
    }

    pub fn plist_path(&self) -> &Path {
        &self.plist_path
    }

    fn render(&self) -> String {
        let mut program_arguments = format!(
            "        <string>{}</string>\n",
            xml_escape(&self.program.to_string_lossy())
        );
        for arg in &self.arguments {
            program_arguments.push_str(&format!("        <string>{}</string>\n", xml_escape(arg)));
        }

        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
    <key>Label</key>
    <string>{}</string>
    <key>ProgramArguments</key>
    <array>
{}    </array>
    <key>RunAtLoad</key>
    <true/>
</dict>
</plist>
"#,
            LAUNCH_AGENT_LABEL, program_arguments
        )
    }

    fn io_error(&self, source: io::Error) -> AutostartError {
        AutostartError::Io {
            path: self.plist_path.clone(),
            source,
        }
    }
}

impl Autostart for LaunchAgent {
    fn is_enabled(&self) -> bool {
        let program = format!(
            "<string>{}</string>",
            xml_escape(&self.program.to_string_lossy())
        );
        fs::read_to_string(&self.plist_path)
            .map(|contents| contents.contains(&program))
            .unwrap_or(false)
    }

    fn set_enabled(&self, enable: bool) -> Result<(), AutostartError> {
        if enable {
            if let Some(dir) = self.plist_path.parent() {
                fs::create_dir_all(dir).map_err(|e| self.io_error(e))?;
            }
            fs::write(&self.plist_path, self.render()).map_err(|e| self.io_error(e))?;
            tracing::info!("Autostart enabled: {}", self.plist_path.display());
        } else {
            match fs::remove_file(&self.plist_path) {
                Ok(()) => tracing::info!("Autostart disabled: {}", self.plist_path.display()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(self.io_error(e)),
            }
        }
        Ok(())
    }
}

/// Stand-in used when no login item location could be determined. Reports
/// disabled and refuses changes.
pub struct Unavailable {
    reason: String,
}

impl Unavailable {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl Autostart for Unavailable {
    fn is_enabled(&self) -> bool {
        false
    }

    fn set_enabled(&self, _enable: bool) -> Result<(), AutostartError> {
        Err(AutostartError::Unavailable(self.reason.clone()))
    }
}

/// Flags that reproduce `config` on the command line.
pub fn config_arguments(config: &Config) -> Vec<String> {
    vec![
        "--short-delay".to_string(),
        config.short_delay().to_string(),
        "--long-delay".to_string(),
        config.long_delay().to_string(),
        "--distance".to_string(),
        config.distance().to_string(),
    ]
}

fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
