//! Configuration for the contour and raster pipeline.

use fea_grid::GridConfig;
use serde::{Deserialize, Serialize};

use crate::colormap::Color;
use crate::composite::{ColorbarLayout, CompositorConfig, LabelStyle};
use crate::contour::{ContourConfig, DEFAULT_LABEL_INTERVAL, DEFAULT_MAX_LABELS};
use crate::error::{RenderError, Result};
use crate::style::hex_to_rgb;

/// End-to-end rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Mesh rasterization settings.
    pub grid: GridConfig,

    /// Explicit grid size; derived from the mesh aspect ratio when unset.
    pub grid_width: Option<usize>,
    pub grid_height: Option<usize>,

    /// Number of thresholds to request.
    pub band_count: usize,

    /// Pixels of arc length between isoline labels.
    pub label_interval: f64,

    pub max_labels: usize,

    /// Fixed threshold spacing in field units; `band_count` applies when unset.
    pub level_interval: Option<f64>,

    /// Margin around the wall in pixels.
    pub padding: f64,

    pub draw_isolines: bool,
    pub isoline_width: f32,
    pub draw_labels: bool,
    pub label_size: f32,
    pub draw_outlines: bool,
    pub outline_width: f32,

    /// Cavity fill; `None` leaves the cavity untouched.
    pub cavity_color: Option<Color>,

    /// Radial coordinate of the symmetry axis.
    pub axis_r: f64,

    pub draw_colorbar: bool,
    pub colorbar_ticks: usize,

    /// Entries kept by a [`crate::ContourCache`] built from this config.
    pub cache_capacity: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            grid_width: None,
            grid_height: None,
            band_count: 10,
            label_interval: DEFAULT_LABEL_INTERVAL,
            max_labels: DEFAULT_MAX_LABELS,
            level_interval: None,
            padding: 20.0,
            draw_isolines: true,
            isoline_width: 1.0,
            draw_labels: true,
            label_size: 9.0,
            draw_outlines: true,
            outline_width: 1.5,
            cavity_color: Some(Color::rgb(225, 232, 240)),
            axis_r: 0.0,
            draw_colorbar: true,
            colorbar_ticks: 5,
            cache_capacity: 32,
        }
    }
}

impl RenderConfig {
    /// Load configuration from environment variables.
    ///
    /// Unset or unparsable variables keep their defaults. Grid settings come
    /// from [`GridConfig::from_env`].
    pub fn from_env() -> Self {
        let mut config = Self {
            grid: GridConfig::from_env(),
            ..Self::default()
        };

        if let Some(v) = env_parse("CONTOUR_GRID_WIDTH") {
            config.grid_width = Some(v);
        }
        if let Some(v) = env_parse("CONTOUR_GRID_HEIGHT") {
            config.grid_height = Some(v);
        }
        if let Some(v) = env_parse("CONTOUR_BAND_COUNT") {
            config.band_count = v;
        }
        if let Some(v) = env_parse("CONTOUR_LABEL_INTERVAL") {
            config.label_interval = v;
        }
        if let Some(v) = env_parse("CONTOUR_MAX_LABELS") {
            config.max_labels = v;
        }
        if let Some(v) = env_parse("CONTOUR_LEVEL_INTERVAL") {
            config.level_interval = Some(v);
        }
        if let Some(v) = env_parse("CONTOUR_PADDING") {
            config.padding = v;
        }
        if let Ok(val) = std::env::var("CONTOUR_ISOLINES") {
            config.draw_isolines = parse_flag(&val);
        }
        if let Ok(val) = std::env::var("CONTOUR_LABELS") {
            config.draw_labels = parse_flag(&val);
        }
        if let Ok(val) = std::env::var("CONTOUR_OUTLINES") {
            config.draw_outlines = parse_flag(&val);
        }
        if let Ok(val) = std::env::var("CONTOUR_CAVITY_COLOR") {
            if val.eq_ignore_ascii_case("none") {
                config.cavity_color = None;
            } else if let Some((r, g, b)) = hex_to_rgb(&val) {
                config.cavity_color = Some(Color::rgb(r, g, b));
            }
        }
        if let Some(v) = env_parse("CONTOUR_AXIS_R") {
            config.axis_r = v;
        }
        if let Ok(val) = std::env::var("CONTOUR_COLORBAR") {
            config.draw_colorbar = parse_flag(&val);
        }
        if let Some(v) = env_parse("CONTOUR_COLORBAR_TICKS") {
            config.colorbar_ticks = v;
        }
        if let Some(v) = env_parse("CONTOUR_CACHE_CAPACITY") {
            config.cache_capacity = v;
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        self.grid.validate()?;
        self.contour_config().validate()?;

        if !(self.padding >= 0.0) || !self.padding.is_finite() {
            return Err(RenderError::config(format!(
                "padding must be a non-negative number, got {}",
                self.padding
            )));
        }
        if !(self.isoline_width > 0.0) || !(self.outline_width > 0.0) {
            return Err(RenderError::config("line widths must be > 0"));
        }
        if !(self.label_size > 0.0) {
            return Err(RenderError::config("label_size must be > 0"));
        }
        if self.draw_colorbar && self.colorbar_ticks < 2 {
            return Err(RenderError::config("colorbar_ticks must be >= 2"));
        }
        if self.cache_capacity == 0 {
            return Err(RenderError::config("cache_capacity must be > 0"));
        }
        if !self.axis_r.is_finite() {
            return Err(RenderError::config("axis_r must be finite"));
        }

        Ok(())
    }

    pub fn contour_config(&self) -> ContourConfig {
        ContourConfig {
            band_count: self.band_count,
            label_interval: self.label_interval,
            max_labels: self.max_labels,
            level_interval: self.level_interval,
            levels: vec![],
        }
    }

    /// Drawing options for a `width × height` surface.
    pub fn compositor_config(&self, width: u32, height: u32) -> CompositorConfig {
        let defaults = CompositorConfig::default();
        CompositorConfig {
            draw_isolines: self.draw_isolines,
            isoline_width: self.isoline_width,
            draw_labels: self.draw_labels,
            label_style: LabelStyle {
                size: self.label_size,
                ..defaults.label_style
            },
            draw_outlines: self.draw_outlines,
            outline_width: self.outline_width,
            cavity_color: self.cavity_color,
            axis_r: self.axis_r,
            colorbar: self.draw_colorbar.then(|| ColorbarLayout {
                ticks: self.colorbar_ticks,
                ..ColorbarLayout::right_edge(width, height, self.padding as f32)
            }),
            ..defaults
        }
    }

    /// Horizontal pixels kept free for the colorbar.
    pub fn reserved_width(&self) -> u32 {
        if self.draw_colorbar {
            ColorbarLayout::reserved_width().ceil() as u32
        } else {
            0
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok()?.trim().parse().ok()
}

fn parse_flag(val: &str) -> bool {
    val.to_lowercase() == "true" || val == "1"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = RenderConfig::default();
        assert_eq!(config.band_count, 10);
        assert_eq!(config.label_interval, 150.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_bands() {
        let config = RenderConfig {
            band_count: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(RenderError::InvalidBandCount)
        ));
    }

    #[test]
    fn test_validate_rejects_bad_level_interval() {
        for interval in [0.0, -5.0, f64::INFINITY] {
            let config = RenderConfig {
                level_interval: Some(interval),
                ..Default::default()
            };
            assert!(config.validate().is_err());
        }
        let config = RenderConfig {
            level_interval: Some(5.0),
            ..Default::default()
        };
        assert_eq!(config.contour_config().level_interval, Some(5.0));
    }

    #[test]
    fn test_validate_rejects_negative_padding() {
        let config = RenderConfig {
            padding: -1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_compositor_config_colorbar() {
        let config = RenderConfig::default();
        let compositor = config.compositor_config(800, 600);
        let layout = compositor.colorbar.unwrap();
        assert_eq!(layout.ticks, 5);
        assert_eq!(layout.y, 20.0);

        let config = RenderConfig {
            draw_colorbar: false,
            ..Default::default()
        };
        assert!(config.compositor_config(800, 600).colorbar.is_none());
        assert_eq!(config.reserved_width(), 0);
    }

    #[test]
    fn test_json_defaults_fill_missing_fields() {
        let config: RenderConfig = serde_json::from_str(r#"{"band_count": 6}"#).unwrap();
        assert_eq!(config.band_count, 6);
        assert_eq!(config.padding, 20.0);
        assert_eq!(config.grid.baseline_resolution, 200);
    }
}
