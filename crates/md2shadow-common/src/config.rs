// config.rs — run-time configuration variables
//
// Variables are set from the command line with `+set <name> <value>`, the
// same way the console does before anything else initializes.

use log::debug;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown variable \"{0}\"")]
    UnknownVariable(String),
    #[error("bad value \"{value}\" for {name}")]
    BadValue { name: String, value: String },
    #[error("+set {0} needs a value")]
    MissingValue(String),
}

/// All tunables of the shadow demo.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Model unit scale applied to every decompressed vertex.
    pub md2_scale: f32,
    /// Reject files whose ident or version is wrong.
    pub md2_strict: bool,
    /// Distance silhouette and far-cap vertices are pushed away from a light.
    pub shadow_extrude: f32,
    /// Classify and extrude every light on the thread pool.
    pub shadow_parallel: bool,
    /// Generate shadow volumes at all.
    pub lighting: bool,
    /// Starting animation id.
    pub anim: u32,
    /// Frames the headless driver runs.
    pub frames: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            md2_scale: 0.05,
            md2_strict: true,
            shadow_extrude: 150.0,
            shadow_parallel: false,
            lighting: true,
            anim: 0,
            frames: 1,
        }
    }
}

impl Config {
    pub const VARIABLES: [&'static str; 7] = [
        "md2_scale",
        "md2_strict",
        "shadow_extrude",
        "shadow_parallel",
        "lighting",
        "anim",
        "frames",
    ];

    /// Set a variable by name from its string form.
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), ConfigError> {
        let bad = || ConfigError::BadValue {
            name: name.to_string(),
            value: value.to_string(),
        };

        match name {
            "md2_scale" => self.md2_scale = parse_float(value).ok_or_else(bad)?,
            "md2_strict" => self.md2_strict = parse_bool(value).ok_or_else(bad)?,
            "shadow_extrude" => self.shadow_extrude = parse_float(value).ok_or_else(bad)?,
            "shadow_parallel" => self.shadow_parallel = parse_bool(value).ok_or_else(bad)?,
            "lighting" => self.lighting = parse_bool(value).ok_or_else(bad)?,
            "anim" => self.anim = value.parse().map_err(|_| bad())?,
            "frames" => self.frames = value.parse().map_err(|_| bad())?,
            _ => return Err(ConfigError::UnknownVariable(name.to_string())),
        }

        debug!("set {} \"{}\"", name, value);
        Ok(())
    }

    /// Current value of a variable as a string, `None` for unknown names.
    pub fn get(&self, name: &str) -> Option<String> {
        let value = match name {
            "md2_scale" => self.md2_scale.to_string(),
            "md2_strict" => (self.md2_strict as i32).to_string(),
            "shadow_extrude" => self.shadow_extrude.to_string(),
            "shadow_parallel" => (self.shadow_parallel as i32).to_string(),
            "lighting" => (self.lighting as i32).to_string(),
            "anim" => self.anim.to_string(),
            "frames" => self.frames.to_string(),
            _ => return None,
        };
        Some(value)
    }

    /// Consume every `+set name value` triple from `args` and return the
    /// remaining arguments in order.
    pub fn apply_early_commands<S: AsRef<str>>(&mut self, args: &[S]) -> Result<Vec<String>, ConfigError> {
        let mut rest = Vec::new();
        let mut i = 0;
        while i < args.len() {
            let s = args[i].as_ref();
            if s != "+set" {
                rest.push(s.to_string());
                i += 1;
                continue;
            }

            let name = args.get(i + 1).map(|a| a.as_ref()).unwrap_or("");
            let value = args
                .get(i + 2)
                .map(|a| a.as_ref())
                .ok_or_else(|| ConfigError::MissingValue(name.to_string()))?;
            self.set(name, value)?;
            i += 3;
        }
        Ok(rest)
    }
}

fn parse_float(s: &str) -> Option<f32> {
    s.parse::<f32>().ok().filter(|v| v.is_finite())
}

fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "true" => Some(true),
        "false" => Some(false),
        _ => parse_float(s).map(|v| v != 0.0),
    }
}
