//! Picture scaling and placement on the slide canvas.

use crate::error::{Error, Result};
use crate::units::{Emu, SlideSize};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Horizontal placement of a picture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HorizontalAlignment {
    Left,
    Center,
    #[default]
    Right,
}

/// Vertical placement of a picture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerticalAlignment {
    Top,
    Middle,
    #[default]
    Bottom,
}

impl HorizontalAlignment {
    /// Left edge of a shape `extent` wide on a canvas `canvas` wide.
    pub fn offset(self, canvas: Emu, extent: Emu) -> Emu {
        match self {
            HorizontalAlignment::Left => Emu(0),
            HorizontalAlignment::Center => Emu((canvas.0 - extent.0) / 2),
            HorizontalAlignment::Right => Emu(canvas.0 - extent.0),
        }
    }
}

impl VerticalAlignment {
    /// Top edge of a shape `extent` tall on a canvas `canvas` tall.
    pub fn offset(self, canvas: Emu, extent: Emu) -> Emu {
        match self {
            VerticalAlignment::Top => Emu(0),
            VerticalAlignment::Middle => Emu((canvas.0 - extent.0) / 2),
            VerticalAlignment::Bottom => Emu(canvas.0 - extent.0),
        }
    }
}

impl fmt::Display for HorizontalAlignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HorizontalAlignment::Left => "Left",
            HorizontalAlignment::Center => "Center",
            HorizontalAlignment::Right => "Right",
        };
        f.write_str(name)
    }
}

impl fmt::Display for VerticalAlignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VerticalAlignment::Top => "Top",
            VerticalAlignment::Middle => "Middle",
            VerticalAlignment::Bottom => "Bottom",
        };
        f.write_str(name)
    }
}

impl FromStr for HorizontalAlignment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "left" => Ok(HorizontalAlignment::Left),
            "center" => Ok(HorizontalAlignment::Center),
            "right" => Ok(HorizontalAlignment::Right),
            other => Err(Error::InvalidOption(format!(
                "horizontal alignment '{}' (expected Left, Center or Right)",
                other
            ))),
        }
    }
}

impl FromStr for VerticalAlignment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "top" => Ok(VerticalAlignment::Top),
            "middle" => Ok(VerticalAlignment::Middle),
            "bottom" => Ok(VerticalAlignment::Bottom),
            other => Err(Error::InvalidOption(format!(
                "vertical alignment '{}' (expected Top, Middle or Bottom)",
                other
            ))),
        }
    }
}

/// Position and size of a shape, in EMU.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    pub x: Emu,
    pub y: Emu,
    pub width: Emu,
    pub height: Emu,
}

impl Frame {
    /// Width to height ratio; zero for a degenerate frame.
    pub fn aspect_ratio(&self) -> f64 {
        if self.height.0 == 0 {
            return 0.0;
        }
        self.width.0 as f64 / self.height.0 as f64
    }
}

/// Resize `(width, height)` to `target_height`, keeping the aspect ratio.
///
/// The new width is truncated to whole EMU.
pub fn scale_to_height(width: Emu, height: Emu, target_height: Emu) -> (Emu, Emu) {
    if height.0 == 0 {
        return (Emu(0), target_height);
    }
    let aspect = width.0 as f64 / height.0 as f64;
    let new_width = Emu((target_height.0 as f64 * aspect) as i64);
    (new_width, target_height)
}

/// Place a `width` x `height` shape on `canvas`.
pub fn place(
    canvas: SlideSize,
    width: Emu,
    height: Emu,
    horizontal: HorizontalAlignment,
    vertical: VerticalAlignment,
) -> Frame {
    Frame {
        x: horizontal.offset(canvas.width, width),
        y: vertical.offset(canvas.height, height),
        width,
        height,
    }
}
