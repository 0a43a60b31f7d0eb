//! Named colour ramps loaded from JSON.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::colormap::{Color, ColorRamp, RampStop};
use crate::error::{RenderError, Result};

/// Style configuration loaded from JSON
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StyleConfig {
    pub version: String,
    pub ramps: HashMap<String, RampDefinition>,
}

/// A single named ramp
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RampDefinition {
    pub name: String,
    pub description: Option<String>,
    pub units: Option<String>,
    pub stops: Vec<ColorStop>,
}

/// Color stop at a normalized position in `[0, 1]`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ColorStop {
    pub position: f64,
    pub color: String,
    pub label: Option<String>,
}

impl StyleConfig {
    /// Load style configuration from JSON string
    pub fn from_json(json_str: &str) -> Result<Self> {
        Ok(serde_json::from_str(json_str)?)
    }

    /// Load style configuration from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Get a specific ramp definition
    pub fn get_style(&self, name: &str) -> Option<&RampDefinition> {
        self.ramps.get(name)
    }

    /// Build the named ramp.
    pub fn ramp(&self, name: &str) -> Result<ColorRamp> {
        self.get_style(name)
            .ok_or_else(|| RenderError::style(format!("unknown ramp '{}'", name)))?
            .to_ramp()
    }
}

impl RampDefinition {
    pub fn to_ramp(&self) -> Result<ColorRamp> {
        let stops = self
            .stops
            .iter()
            .map(|stop| {
                let (r, g, b) = hex_to_rgb(&stop.color).ok_or_else(|| {
                    RenderError::style(format!(
                        "invalid color '{}' in ramp '{}'",
                        stop.color, self.name
                    ))
                })?;
                Ok(RampStop {
                    position: stop.position,
                    color: Color::rgb(r, g, b),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        ColorRamp::new(stops)
    }
}

/// Parse hex color string to RGB
pub fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

    Some((r, g, b))
}
