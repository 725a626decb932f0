//! JSON configuration for the renderer and the flow-field demo.
//!
//! Every field has a default, so a config file only names what it changes.
//! Colors are written as hex strings (`"#ffffff20"`).

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::color::Color;
use crate::display::{DEFAULT_HEIGHT, DEFAULT_WIDTH};
use crate::error::{Error, Result};
use crate::math::Transform;

/// Pixels per world unit when no transform is given
pub const DEFAULT_SCALE: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    pub width: usize,
    pub height: usize,
    /// Render threads; `None` lets rayon decide, `Some(1)` renders inline
    pub threads: Option<usize>,
    /// World-to-pixel transform; `None` centres the origin at [`DEFAULT_SCALE`]
    pub transform: Option<Transform>,
    pub clear_color: Color,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            threads: None,
            transform: None,
            clear_color: Color::BLACK,
        }
    }
}

impl RendererConfig {
    /// The configured transform, or the origin centred on the image with `y` up
    pub fn resolved_transform(&self) -> Transform {
        self.transform
            .unwrap_or_else(|| Transform::centred(self.width, self.height, DEFAULT_SCALE))
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if self.threads == Some(0) {
            return Err(Error::InvalidThreadCount);
        }
        if let Some(t) = self.transform {
            if !(t.pos.is_finite() && t.scale.is_finite()) || t.scale.x == 0.0 || t.scale.y == 0.0
            {
                return Err(Error::config("transform must be finite with non-zero scale"));
            }
        }
        Ok(())
    }
}

/// Flow-field demo settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub renderer: RendererConfig,
    pub particles: usize,
    /// Vector field size in cells; particles live in `[0, w) x [0, h)`
    pub field_width: usize,
    pub field_height: usize,
    /// Noise frequency per field cell
    pub noise_scale: f64,
    pub particle_radius: f64,
    pub particle_color: Color,
    /// Per-frame brightness kept, 1.0 never fades
    pub fade: f64,
    pub seed: u64,
    /// Speed cap in field cells per second
    pub max_speed: f64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            renderer: RendererConfig::default(),
            particles: 2000,
            field_width: 64,
            field_height: 48,
            noise_scale: 0.08,
            particle_radius: 0.15,
            particle_color: Color::rgba(255, 255, 255, 24),
            fade: 0.97,
            seed: 1,
            max_speed: 4.0,
        }
    }
}

impl DemoConfig {
    pub fn validate(&self) -> Result<()> {
        self.renderer.validate()?;
        if self.field_width == 0 || self.field_height == 0 {
            return Err(Error::InvalidDimensions {
                width: self.field_width,
                height: self.field_height,
            });
        }
        if !(self.noise_scale.is_finite() && self.noise_scale > 0.0) {
            return Err(Error::config(format!(
                "noise_scale must be positive, got {}",
                self.noise_scale
            )));
        }
        if !(self.particle_radius.is_finite() && self.particle_radius > 0.0) {
            return Err(Error::config(format!(
                "particle_radius must be positive, got {}",
                self.particle_radius
            )));
        }
        if !(0.0..=1.0).contains(&self.fade) {
            return Err(Error::config(format!("fade must be in [0, 1], got {}", self.fade)));
        }
        if !(self.max_speed.is_finite() && self.max_speed >= 0.0) {
            return Err(Error::config(format!(
                "max_speed must be non-negative, got {}",
                self.max_speed
            )));
        }
        Ok(())
    }

    /// Read and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "loading config");
        let json = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    /// Write as pretty-printed JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec2;

    #[test]
    fn defaults_are_valid() {
        DemoConfig::default().validate().unwrap();
        let t = RendererConfig::default().resolved_transform();
        assert_eq!(t.pos, Vec2::new(320.0, 240.0));
        assert_eq!(t.scale, Vec2::new(10.0, -10.0));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: DemoConfig = serde_json::from_str(
            r##"{ "particles": 10, "particle_color": "#ff000080", "renderer": { "threads": 2 } }"##,
        )
        .unwrap();
        assert_eq!(config.particles, 10);
        assert_eq!(config.particle_color, Color::rgba(255, 0, 0, 128));
        assert_eq!(config.renderer.threads, Some(2));
        assert_eq!(config.renderer.width, DEFAULT_WIDTH);
        assert_eq!(config.field_width, DemoConfig::default().field_width);
    }

    #[test]
    fn bad_color_is_a_parse_error() {
        let result: std::result::Result<DemoConfig, _> =
            serde_json::from_str(r##"{ "particle_color": "#fff" }"##);
        assert!(result.is_err());
    }

    #[test]
    fn validation_rejects_nonsense() {
        let mut config = DemoConfig::default();
        config.renderer.threads = Some(0);
        assert!(matches!(config.validate(), Err(Error::InvalidThreadCount)));

        let mut config = DemoConfig::default();
        config.fade = 1.5;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = DemoConfig::default();
        config.field_height = 0;
        assert!(matches!(config.validate(), Err(Error::InvalidDimensions { .. })));

        let mut config = DemoConfig::default();
        config.renderer.transform = Some(Transform::new(Vec2::ZERO, Vec2::new(0.0, 1.0)));
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn save_then_load() {
        let path = std::env::temp_dir().join(format!("rasterkit-config-{}.json", std::process::id()));
        let mut config = DemoConfig::default();
        config.seed = 99;
        config.renderer.transform = Some(Transform::centred(100, 50, 4.0));
        config.save(&path).unwrap();
        let loaded = DemoConfig::load(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(loaded, config);
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = DemoConfig::load("/definitely/not/here/rasterkit.json");
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
