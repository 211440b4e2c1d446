//! Style enums for stroke, fill and arc operations.

use crate::error::RasterError;

/// Line cap style for stroke operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineCap {
    /// Flat edge at the endpoint.
    #[default]
    Butt,
    /// Half-pen arc around the endpoint.
    Round,
    /// Square edge extending half the line width past the endpoint.
    Square,
}

impl std::str::FromStr for LineCap {
    type Err = RasterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "butt" => Ok(LineCap::Butt),
            "round" => Ok(LineCap::Round),
            "square" => Ok(LineCap::Square),
            _ => Err(RasterError::InvalidArgument(format!(
                "Invalid line cap: '{}'",
                s
            ))),
        }
    }
}

/// Line join style for stroke operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineJoin {
    /// Sharp corner, limited by the miter limit.
    #[default]
    Miter,
    /// Rounded corner.
    Round,
    /// Beveled corner.
    Bevel,
}

impl std::str::FromStr for LineJoin {
    type Err = RasterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "miter" => Ok(LineJoin::Miter),
            "round" => Ok(LineJoin::Round),
            "bevel" => Ok(LineJoin::Bevel),
            _ => Err(RasterError::InvalidArgument(format!(
                "Invalid line join: '{}'",
                s
            ))),
        }
    }
}

/// Winding rule for filling.
///
/// Determines how the interior of a possibly self-intersecting path is calculated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindingRule {
    /// Even-odd rule.
    EvenOdd,
    /// Non-zero winding rule (default).
    #[default]
    NonZero,
}

impl From<WindingRule> for tiny_skia::FillRule {
    fn from(rule: WindingRule) -> Self {
        match rule {
            WindingRule::NonZero => tiny_skia::FillRule::Winding,
            WindingRule::EvenOdd => tiny_skia::FillRule::EvenOdd,
        }
    }
}

impl TryFrom<i32> for WindingRule {
    type Error = RasterError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(WindingRule::EvenOdd),
            1 => Ok(WindingRule::NonZero),
            _ => Err(RasterError::InvalidArgument(format!(
                "Invalid winding rule: {}",
                code
            ))),
        }
    }
}

/// How an arc outline is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArcType {
    /// Left open (filling still closes it with a straight edge).
    #[default]
    Open,
    /// Closed by a straight chord between the endpoints.
    Chord,
    /// Closed through the center of the ellipse.
    Pie,
}

impl TryFrom<i32> for ArcType {
    type Error = RasterError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(ArcType::Open),
            1 => Ok(ArcType::Chord),
            2 => Ok(ArcType::Pie),
            _ => Err(RasterError::InvalidArgument(format!(
                "Invalid arc type: {}",
                code
            ))),
        }
    }
}

/// Gradient behaviour outside the 0..1 parameter range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CycleMethod {
    /// Clamp to the end colors.
    #[default]
    Pad,
    /// Restart from the first stop.
    Repeat,
    /// Mirror back and forth.
    Reflect,
}

/// Which pipeline the driver feeds with primitive path commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawMode {
    /// Fill the interior.
    #[default]
    Fill,
    /// Stroke the outline with the current stroke parameters.
    Stroke,
    /// Fill with the text flatness.
    TextFill,
}
