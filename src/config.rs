//! Print configuration: the value object behind the Settings step.
//!
//! [`PrintConfig`] is a pure value (no I/O, no references to the file
//! collection) so it can be serialised for the session store, diffed, and
//! shared freely. Display-oriented fields (colour mode, orientation,
//! margin, zoom) never trigger reconversion: the preview layer derives a
//! [`DisplayTransform`] from the config and composes it over whatever
//! converted content already exists.
//!
//! One deliberate coupling exists between fields: changing the margin
//! resets the background to canonical white. Margin padding and a tinted
//! background are mutually exclusive strategies for framing the page, and
//! margin wins.

use serde::{Deserialize, Serialize};

/// Background colour the preview canvas resets to when margins change.
pub const CANONICAL_BACKGROUND: &str = "white";

/// Zoom bounds in percent. Out-of-range values clamp silently.
pub const ZOOM_MIN: u32 = 50;
pub const ZOOM_MAX: u32 = 200;

/// Frame drawn around the previewed page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BorderStyle {
    /// No frame (default).
    #[default]
    None,
    /// A thin solid frame.
    Solid,
}

/// Print colour mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorMode {
    /// Black & white: previews render through a grayscale filter (default).
    #[default]
    Monochrome,
    /// Full colour.
    Color,
}

/// Page orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// Page margin preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Margin {
    Narrow,
    #[default]
    Normal,
    Wide,
}

impl Margin {
    /// Preview padding in pixels for this preset.
    pub fn padding_px(self) -> u32 {
        match self {
            Margin::Narrow => 8,
            Margin::Normal => 16,
            Margin::Wide => 32,
        }
    }
}

/// Print-oriented display settings, independent of which file is active.
///
/// Defaults: no border, white background, monochrome, portrait, normal
/// margin, 100 % zoom. Mutated only through the explicit setters; persisted
/// at every workflow step transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrintConfig {
    border: BorderStyle,
    background: String,
    color_mode: ColorMode,
    orientation: Orientation,
    margin: Margin,
    zoom_percent: u32,
}

impl Default for PrintConfig {
    fn default() -> Self {
        Self {
            border: BorderStyle::None,
            background: CANONICAL_BACKGROUND.to_string(),
            color_mode: ColorMode::Monochrome,
            orientation: Orientation::Portrait,
            margin: Margin::Normal,
            zoom_percent: 100,
        }
    }
}

impl PrintConfig {
    pub fn border(&self) -> BorderStyle {
        self.border
    }

    pub fn background(&self) -> &str {
        &self.background
    }

    pub fn color_mode(&self) -> ColorMode {
        self.color_mode
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn margin(&self) -> Margin {
        self.margin
    }

    pub fn zoom_percent(&self) -> u32 {
        self.zoom_percent
    }

    pub fn set_border(&mut self, border: BorderStyle) {
        self.border = border;
    }

    pub fn set_background(&mut self, background: impl Into<String>) {
        self.background = background.into();
    }

    pub fn set_color_mode(&mut self, mode: ColorMode) {
        self.color_mode = mode;
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.orientation = orientation;
    }

    /// Set the margin preset. Resets the background to canonical white:
    /// padding replaces background tinting as the framing strategy.
    pub fn set_margin(&mut self, margin: Margin) {
        self.margin = margin;
        self.background = CANONICAL_BACKGROUND.to_string();
    }

    /// Set the zoom percentage, clamping silently to [`ZOOM_MIN`]..=[`ZOOM_MAX`].
    pub fn set_zoom_percent(&mut self, percent: u32) {
        self.zoom_percent = percent.clamp(ZOOM_MIN, ZOOM_MAX);
    }

    /// Derive the declarative visual transform for the current settings.
    pub fn display_transform(&self) -> DisplayTransform {
        DisplayTransform {
            grayscale: self.color_mode == ColorMode::Monochrome,
            rotation_degrees: match self.orientation {
                Orientation::Portrait => 0,
                Orientation::Landscape => 90,
            },
            padding_px: self.margin.padding_px(),
            scale: self.zoom_percent as f32 / 100.0,
        }
    }
}

/// Non-destructive visual composition applied over converted content.
///
/// Recomputed from [`PrintConfig`] on every render; it never mutates the
/// conversion result and never triggers reconversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayTransform {
    /// Render through a 100 % grayscale filter.
    pub grayscale: bool,
    /// Clockwise rotation: 0 for portrait, 90 for landscape.
    pub rotation_degrees: u16,
    /// Padding around the page content.
    pub padding_px: u32,
    /// Scale factor: zoom percent / 100.
    pub scale: f32,
}
