//! Launch parameter parsing for the app.
//!
//! On native, parameters are parsed from command-line arguments using clap.
//! On WASM, defaults are used (CLI argument parsing is not available).

use std::path::PathBuf;

use bevy::prelude::*;
use waypath_core::{CameraMode, DriveConfig};

/// Launch parameters for the app.
#[derive(Resource, Debug, Default)]
pub struct LaunchParams {
    /// Initial camera mode.
    pub camera_mode: CameraMode,
    /// Optional JSON file overriding the drive constants.
    pub config_path: Option<PathBuf>,
    /// Optional JSON file with resume panel text.
    pub resume_path: Option<PathBuf>,
    /// Hide panels again when driving away from their marker.
    pub hide_on_exit: bool,
}

impl LaunchParams {
    /// Load the drive config, applying command-line overrides.
    pub fn drive_config(&self) -> Result<DriveConfig, String> {
        let mut config = match &self.config_path {
            Some(path) => DriveConfig::from_json_file(path).map_err(|e| e.to_string())?,
            None => DriveConfig::default(),
        };
        if self.hide_on_exit {
            config.proximity.hide_on_exit = true;
        }
        config.validate().map_err(|e| e.to_string())?;
        Ok(config)
    }
}

#[cfg(not(target_family = "wasm"))]
mod native {
    use clap::Parser;

    use super::*;

    /// Parse a camera mode name.
    fn parse_mode(s: &str) -> Result<CameraMode, String> {
        s.parse().map_err(|e: waypath_core::Error| e.to_string())
    }

    #[derive(Parser)]
    #[command(about = "Drive through an interactive forest resume")]
    struct CliArgs {
        /// Initial camera mode (chase, orbit or free).
        #[arg(long, value_parser = parse_mode, default_value = "chase")]
        camera_mode: CameraMode,

        /// JSON file overriding vehicle, camera and proximity constants.
        #[arg(long)]
        config: Option<PathBuf>,

        /// JSON file mapping section titles to panel text.
        #[arg(long)]
        resume: Option<PathBuf>,

        /// Hide panels again when driving away from their marker.
        #[arg(long)]
        hide_on_exit: bool,
    }

    pub fn parse() -> LaunchParams {
        let args = CliArgs::parse();
        LaunchParams {
            camera_mode: args.camera_mode,
            config_path: args.config,
            resume_path: args.resume,
            hide_on_exit: args.hide_on_exit,
        }
    }
}

/// Parse launch parameters from CLI args (native) or use defaults (WASM).
pub fn parse() -> LaunchParams {
    #[cfg(not(target_family = "wasm"))]
    {
        native::parse()
    }
    #[cfg(target_family = "wasm")]
    {
        LaunchParams::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_load_without_files() {
        let params = LaunchParams::default();
        let config = params.drive_config().unwrap();
        assert!(!config.proximity.hide_on_exit);
    }

    #[test]
    fn test_hide_on_exit_override() {
        let params = LaunchParams {
            hide_on_exit: true,
            ..Default::default()
        };
        assert!(params.drive_config().unwrap().proximity.hide_on_exit);
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let params = LaunchParams {
            config_path: Some(PathBuf::from("/nonexistent/waypath.json")),
            ..Default::default()
        };
        assert!(params.drive_config().is_err());
    }
}
