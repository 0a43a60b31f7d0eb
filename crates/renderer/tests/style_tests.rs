//! Tests for named colour ramps loaded from JSON.

use renderer::colormap::{Color, Colormap};
use renderer::style::StyleConfig;
use renderer::RenderError;
use std::io::Write;

const STYLES: &str = r##"{
    "version": "1.0",
    "ramps": {
        "hoop": {
            "name": "Hoop stress",
            "units": "MPa",
            "stops": [
                {"position": 1.0, "color": "#FF0000", "label": "max"},
                {"position": 0.0, "color": "#0000FF"},
                {"position": 0.5, "color": "FFFFFF"}
            ]
        },
        "broken": {
            "name": "Broken",
            "stops": [
                {"position": 0.0, "color": "#12345"},
                {"position": 1.0, "color": "#000000"}
            ]
        },
        "empty": {
            "name": "Empty",
            "stops": []
        }
    }
}"##;

// ============================================================================
// Parsing
// ============================================================================

#[test]
fn test_parse_ramps() {
    let config = StyleConfig::from_json(STYLES).unwrap();
    assert_eq!(config.version, "1.0");
    assert_eq!(config.ramps.len(), 3);

    let hoop = config.get_style("hoop").unwrap();
    assert_eq!(hoop.name, "Hoop stress");
    assert_eq!(hoop.units.as_deref(), Some("MPa"));
    assert!(hoop.description.is_none());
    assert_eq!(hoop.stops[0].label.as_deref(), Some("max"));
}

#[test]
fn test_invalid_json() {
    assert!(matches!(
        StyleConfig::from_json("{ not json"),
        Err(RenderError::Json(_))
    ));
}

// ============================================================================
// Ramps
// ============================================================================

#[test]
fn test_ramp_sorted_and_sampled() {
    let config = StyleConfig::from_json(STYLES).unwrap();
    let ramp = config.ramp("hoop").unwrap();

    let positions: Vec<f64> = ramp.stops().iter().map(|s| s.position).collect();
    assert_eq!(positions, vec![0.0, 0.5, 1.0]);

    assert_eq!(ramp.sample(0.0), Color::rgb(0, 0, 255));
    assert_eq!(ramp.sample(0.5), Color::rgb(255, 255, 255));
    assert_eq!(ramp.sample(1.0), Color::rgb(255, 0, 0));
    assert_eq!(ramp.color(150.0, 100.0, 200.0), Color::rgb(255, 255, 255));
}

#[test]
fn test_unknown_ramp() {
    let config = StyleConfig::from_json(STYLES).unwrap();
    assert!(config.get_style("missing").is_none());
    assert!(matches!(config.ramp("missing"), Err(RenderError::Style(_))));
}

#[test]
fn test_bad_colour_rejected() {
    let config = StyleConfig::from_json(STYLES).unwrap();
    assert!(matches!(config.ramp("broken"), Err(RenderError::Style(_))));
}

#[test]
fn test_empty_ramp_rejected() {
    let config = StyleConfig::from_json(STYLES).unwrap();
    assert!(config.ramp("empty").is_err());
}

// ============================================================================
// Files
// ============================================================================

#[test]
fn test_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(STYLES.as_bytes()).unwrap();

    let config = StyleConfig::from_file(file.path()).unwrap();
    assert!(config.ramp("hoop").is_ok());
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = StyleConfig::from_file(dir.path().join("nope.json"));
    assert!(matches!(result, Err(RenderError::Io(_))));
}
