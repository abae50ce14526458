use std::{
    fs,
    path::{Path, PathBuf},
};

use ron::ser::{PrettyConfig, to_string_pretty};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    pendulum::PendulumOptions,
    scheduler::{MAX_FRAME_TIME, Scheduler, SyncMode},
    session::{Session, SimulationInputs},
    viewport::Viewport,
};

#[derive(Debug, Error)]
pub enum ConfigErrors {
    #[error("could not read config '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write config '{path}': {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("dt must be positive and finite, got {0}")]
    InvalidStep(f64),
    #[error("run length must be finite and non-negative, got {0}")]
    InvalidRunLength(f64),
    #[error("max frame time must be positive and finite, got {0}")]
    InvalidFrameTime(f64),
    #[error("{0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("{0}")]
    Serialize(#[from] ron::Error),
}

/// Everything needed to set up a run, stored as RON.
///
/// Every field is optional in the file; missing ones take their defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub inputs: SimulationInputs,
    /// Physics template. Its angles are overridden by `inputs`.
    pub pendulum: PendulumOptions,
    pub show_trail: bool,
    pub keep_full_trail: bool,
    pub sync: SyncMode,
    pub max_frame_time: f64,
    /// Width and height of the drawing surface, in pixels.
    pub canvas: (f64, f64),
    pub output: PathBuf,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            inputs: SimulationInputs::default(),
            pendulum: PendulumOptions::default(),
            show_trail: true,
            keep_full_trail: true,
            sync: SyncMode::default(),
            max_frame_time: MAX_FRAME_TIME,
            canvas: (600.0, 600.0),
            output: PathBuf::from("results"),
        }
    }
}

impl SimulationConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigErrors> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigErrors::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = ron::from_str(&contents)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigErrors> {
        let ron_string = to_string_pretty(self, PrettyConfig::new())?;
        fs::write(path, ron_string).map_err(|source| ConfigErrors::Write {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "saved config");
        Ok(())
    }

    /// Rejects values that would keep a run from ever reaching its run length.
    ///
    /// The engine itself accepts any numbers; this only guards the drivers.
    pub fn validate(&self) -> Result<(), ConfigErrors> {
        let dt = self.pendulum.dt;
        if !(dt.is_finite() && dt > 0.0) {
            return Err(ConfigErrors::InvalidStep(dt));
        }
        let run_length = self.inputs.run_length;
        if !(run_length.is_finite() && run_length >= 0.0) {
            return Err(ConfigErrors::InvalidRunLength(run_length));
        }
        if !(self.max_frame_time.is_finite() && self.max_frame_time > 0.0) {
            return Err(ConfigErrors::InvalidFrameTime(self.max_frame_time));
        }
        Ok(())
    }

    pub fn session(&self) -> Session {
        Session::new(self.pendulum, self.inputs)
            .with_trail_flags(self.show_trail, self.keep_full_trail)
    }

    pub fn scheduler(&self) -> Scheduler {
        Scheduler::new(self.sync).with_max_frame_time(self.max_frame_time)
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::for_canvas(self.canvas.0, self.canvas.1)
    }
}
