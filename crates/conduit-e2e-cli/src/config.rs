//! CLI configuration: output settings and run-config resolution

use crate::commands::SettingsArgs;
use crate::error::CliResult;
use conduit_e2e::telemetry::Verbosity;
use conduit_e2e::E2eConfig;
use std::time::Duration;

/// Color output choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorChoice {
    /// Detect from the terminal
    #[default]
    Auto,
    /// Always color
    Always,
    /// Never color
    Never,
}

impl From<crate::commands::ColorArg> for ColorChoice {
    fn from(arg: crate::commands::ColorArg) -> Self {
        match arg {
            crate::commands::ColorArg::Auto => Self::Auto,
            crate::commands::ColorArg::Always => Self::Always,
            crate::commands::ColorArg::Never => Self::Never,
        }
    }
}

impl ColorChoice {
    /// Whether to emit color on stderr
    #[must_use]
    pub fn should_color(self) -> bool {
        match self {
            Self::Auto => console::colors_enabled_stderr(),
            Self::Always => true,
            Self::Never => false,
        }
    }
}

/// Output settings for one invocation
#[derive(Debug, Clone, Copy, Default)]
pub struct CliConfig {
    /// Verbosity
    pub verbosity: Verbosity,
    /// Color choice
    pub color: ColorChoice,
}

impl CliConfig {
    /// Default output settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set verbosity
    #[must_use]
    pub const fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set color choice
    #[must_use]
    pub const fn with_color(mut self, color: ColorChoice) -> Self {
        self.color = color;
        self
    }
}

/// Build the run config: file, then `CONDUIT_E2E_*` environment, then flags
pub fn resolve_run_config(settings: &SettingsArgs) -> CliResult<E2eConfig> {
    let base = match &settings.config {
        Some(path) => E2eConfig::from_yaml_file(path)?,
        None => E2eConfig::new(),
    };
    let config = apply_flags(base.apply_env()?, settings);
    config.validate()?;
    Ok(config)
}

fn apply_flags(mut config: E2eConfig, settings: &SettingsArgs) -> E2eConfig {
    if let Some(url) = &settings.base_url {
        config = config.with_base_url(url.as_str());
    }
    if settings.headed {
        config = config.with_headless(false);
    }
    if settings.no_sandbox {
        config = config.with_no_sandbox();
    }
    if let Some(path) = &settings.chromium {
        config = config.with_chromium_path(path.to_string_lossy());
    }
    if let Some(retries) = settings.retries {
        config = config.with_retries(retries);
    }
    if let Some(ms) = settings.step_pause_ms {
        config = config.with_step_pause(Duration::from_millis(ms));
    }
    if let Some(ms) = settings.timeout_ms {
        config = config.with_test_timeout(Duration::from_millis(ms));
    }
    if let Some(policy) = settings.screenshots {
        config = config.with_screenshots(policy.into());
    }
    if let Some(dir) = &settings.screenshots_dir {
        config = config.with_screenshots_dir(dir);
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::ScreenshotArg;
    use conduit_e2e::ScreenshotPolicy;

    mod resolve_tests {
        use super::*;

        #[test]
        fn test_flags_override_file() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("e2e.yaml");
            std::fs::write(&path, "base_url: http://file.test\nretries: 1\n").unwrap();
            let settings = SettingsArgs {
                config: Some(path),
                retries: Some(3),
                headed: true,
                screenshots: Some(ScreenshotArg::Off),
                ..SettingsArgs::default()
            };
            let config = apply_flags(
                E2eConfig::from_yaml_file(settings.config.as_ref().unwrap()).unwrap(),
                &settings,
            );
            assert_eq!(config.base_url, "http://file.test");
            assert_eq!(config.retries, 3);
            assert!(!config.headless);
            assert_eq!(config.screenshots, ScreenshotPolicy::Off);
        }

        #[test]
        fn test_bad_base_url_flag_is_rejected() {
            let settings = SettingsArgs {
                base_url: Some("localhost:4100".to_string()),
                ..SettingsArgs::default()
            };
            assert!(apply_flags(E2eConfig::new(), &settings).validate().is_err());
        }

        #[test]
        fn test_step_pause_flag() {
            let settings = SettingsArgs {
                step_pause_ms: Some(1500),
                no_sandbox: true,
                ..SettingsArgs::default()
            };
            let config = apply_flags(E2eConfig::new(), &settings);
            assert_eq!(config.step_pause, Duration::from_millis(1500));
            assert!(!config.sandbox);
        }
    }

    mod color_tests {
        use super::*;

        #[test]
        fn test_explicit_choices() {
            assert!(ColorChoice::Always.should_color());
            assert!(!ColorChoice::Never.should_color());
        }
    }
}
