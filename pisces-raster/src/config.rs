//! Rendering tunables.

use crate::flattener::DEFAULT_MAX_DEPTH;

/// Environment variable holding the x bias added to stroke transforms.
pub const STROKE_XBIAS_VAR: &str = "PISCES_STROKE_XBIAS";
/// Environment variable holding the y bias added to stroke transforms.
pub const STROKE_YBIAS_VAR: &str = "PISCES_STROKE_YBIAS";
/// Environment variable holding the fill pipeline flatness.
pub const FILLER_FLATNESS_VAR: &str = "PISCES_FILLER_FLATNESS";

/// Tunables read once when a render context is built.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    /// Added to the x translation of the stroke pipeline transform.
    pub stroke_x_bias: f64,
    /// Added to the y translation of the stroke pipeline transform.
    pub stroke_y_bias: f64,
    /// Flatness of the fill pipeline.
    pub filler_flatness: f64,
    /// Flatness of the stroke pipeline.
    pub stroke_flatness: f64,
    /// Subdivision depth at which curve pieces are accepted as flat.
    pub max_subdivision_depth: u32,
    /// Subpixel positions (lg) used while antialiasing is on.
    pub subpixel_lg: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            stroke_x_bias: 0.0,
            stroke_y_bias: 0.0,
            filler_flatness: 1.0,
            stroke_flatness: 1.0,
            max_subdivision_depth: DEFAULT_MAX_DEPTH,
            subpixel_lg: 3,
        }
    }
}

impl RenderConfig {
    /// Defaults overridden by the `PISCES_*` environment variables.
    ///
    /// Values that are missing or fail to parse keep their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`RenderConfig::from_env`] with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let read = |name: &str, default: f64| -> f64 {
            match lookup(name) {
                Some(raw) => match raw.trim().parse::<f64>() {
                    Ok(v) if v.is_finite() => v,
                    _ => {
                        log::warn!(target: "pisces", "ignoring {}={:?}", name, raw);
                        default
                    }
                },
                None => default,
            }
        };
        Self {
            stroke_x_bias: read(STROKE_XBIAS_VAR, defaults.stroke_x_bias),
            stroke_y_bias: read(STROKE_YBIAS_VAR, defaults.stroke_y_bias),
            filler_flatness: read(FILLER_FLATNESS_VAR, defaults.filler_flatness),
            ..defaults
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = RenderConfig::default();
        assert_eq!(config.stroke_x_bias, 0.0);
        assert_eq!(config.filler_flatness, 1.0);
        assert_eq!(config.max_subdivision_depth, 32);
        assert_eq!(config.subpixel_lg, 3);
    }

    #[test]
    fn test_lookup_overrides_and_fallbacks() {
        let vars: HashMap<&str, &str> = [
            (STROKE_XBIAS_VAR, "0.25"),
            (STROKE_YBIAS_VAR, "not-a-number"),
            (FILLER_FLATNESS_VAR, " 0.5 "),
        ]
        .into_iter()
        .collect();
        let config = RenderConfig::from_lookup(|name| vars.get(name).map(|v| v.to_string()));
        assert_eq!(config.stroke_x_bias, 0.25);
        assert_eq!(config.stroke_y_bias, 0.0);
        assert_eq!(config.filler_flatness, 0.5);
        assert_eq!(config.stroke_flatness, 1.0);
    }
}
