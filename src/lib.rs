// Library exports for gymstats

pub mod aggregate;
pub mod chart;
pub mod config;
pub mod data;
pub mod error;
pub mod filter;
pub mod graph;
pub mod server;

#[cfg(test)]
mod test_support;

pub use data::{Dataset, ExerciseRecord, MemberRecord};
pub use error::{Error, Result};
pub use filter::{filter, FilterCriteria, FilteredView, RawCriteria};

use serde::Deserialize;

/// Largest width or height accepted for a rendered chart.
pub const MAX_DIMENSION: u32 = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
pub enum OutputFormat {
    #[serde(rename = "png")]
    #[default]
    Png,
    #[serde(rename = "svg")]
    Svg,
}

impl OutputFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            OutputFormat::Png => "image/png",
            OutputFormat::Svg => "image/svg+xml",
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "svg" => Ok(OutputFormat::Svg),
            other => Err(Error::InvalidInput(format!(
                "unknown image format '{}', expected png or svg",
                other
            ))),
        }
    }
}

/// Image options. Unset dimensions fall back to the chart's own default size.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RenderOptions {
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default, rename = "type")]
    pub format: OutputFormat,
}

impl RenderOptions {
    pub fn dimensions(&self, default: (u32, u32)) -> Result<(u32, u32)> {
        let width = self.width.unwrap_or(default.0);
        let height = self.height.unwrap_or(default.1);
        for (name, v) in [("width", width), ("height", height)] {
            if v == 0 || v > MAX_DIMENSION {
                return Err(Error::InvalidInput(format!(
                    "{} must be between 1 and {}, got {}",
                    name, MAX_DIMENSION, v
                )));
            }
        }
        Ok((width, height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimensions_default_and_override() {
        let opts = RenderOptions::default();
        assert_eq!(opts.dimensions((1000, 600)).unwrap(), (1000, 600));

        let opts = RenderOptions { width: Some(640), ..Default::default() };
        assert_eq!(opts.dimensions((1000, 600)).unwrap(), (640, 600));
    }

    #[test]
    fn test_dimensions_rejects_out_of_range() {
        let opts = RenderOptions { height: Some(0), ..Default::default() };
        assert!(matches!(opts.dimensions((1000, 600)), Err(Error::InvalidInput(_))));
        let opts = RenderOptions { width: Some(MAX_DIMENSION + 1), ..Default::default() };
        assert!(opts.dimensions((1000, 600)).is_err());
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("SVG".parse::<OutputFormat>().unwrap(), OutputFormat::Svg);
        assert_eq!("png".parse::<OutputFormat>().unwrap().content_type(), "image/png");
        assert!("jpeg".parse::<OutputFormat>().is_err());
    }
}
