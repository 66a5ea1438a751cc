use bon::Builder;
use std::f64::consts::PI;

/// Color representation for HUD strokes and text
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn with_alpha(self, a: f64) -> Self {
        Self { a, ..self }
    }

    pub const fn as_tuple(self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }
}

/// How the roll tape derives the radius of its arc
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RollRadiusPolicy {
    /// Caller-supplied radius in logical pixels.
    Fixed(f64),
    /// One minor unit of arc length equals one linear step.
    Exact,
    /// The arc is centred on the middle of the canvas.
    Center,
}

impl Default for RollRadiusPolicy {
    fn default() -> Self {
        Self::Fixed(260.0)
    }
}

/// Angular resolution and mode switches of the display.
///
/// `pixels_per_degree` and `pixels_per_radian` are always consistent: setting
/// one recomputes the other.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayConfig {
    pixels_per_degree: f64,
    pixels_per_radian: f64,
    pub uncaged_mode: bool,
    pub roll_radius_policy: RollRadiusPolicy,
    /// Device/UI scale factor applied on top of logical pixels.
    pub scale: f64,
}

impl DisplayConfig {
    pub fn new(pixels_per_degree: f64) -> Self {
        let mut config = Self {
            pixels_per_degree: 0.0,
            pixels_per_radian: 0.0,
            uncaged_mode: false,
            roll_radius_policy: RollRadiusPolicy::default(),
            scale: 1.0,
        };
        config.set_pixels_per_degree(pixels_per_degree);
        config
    }

    pub fn pixels_per_degree(&self) -> f64 {
        self.pixels_per_degree
    }

    pub fn pixels_per_radian(&self) -> f64 {
        self.pixels_per_radian
    }

    pub fn set_pixels_per_degree(&mut self, value: f64) {
        self.pixels_per_degree = value;
        self.pixels_per_radian = value * (180.0 / PI);
    }

    pub fn set_pixels_per_radian(&mut self, value: f64) {
        self.pixels_per_radian = value;
        self.pixels_per_degree = value * (PI / 180.0);
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self::new(12.0)
    }
}

/// Second pass drawn underneath every element for contrast
#[derive(Debug, Clone, PartialEq)]
pub struct Shadow {
    pub line_width: f64,
    pub color: Color,
    pub offset: f64,
}

impl Default for Shadow {
    fn default() -> Self {
        Self {
            line_width: 2.5,
            color: Color::new(0x00, 0x00, 0x00).with_alpha(0.6),
            offset: 1.8,
        }
    }
}

/// Presentation of every stroke and glyph
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    pub line_width: f64,
    pub color: Color,
    /// Multiplier applied to every font size.
    pub font_scale: f64,
    pub shadow: Option<Shadow>,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            line_width: 2.0,
            color: Color::new(0x00, 0xff, 0x7f),
            font_scale: 1.0,
            shadow: Some(Shadow::default()),
        }
    }
}

/// Geometry shared by the speed, altitude, heading and roll tapes
#[derive(Debug, Clone, PartialEq)]
pub struct TapeGeometry {
    pub value_font_size: f64,
    pub scale_font_size: f64,
    pub text_side_border: f64,
    pub text_top_border: f64,
    /// Gap between the value box and the ruler.
    pub border: f64,
    /// Pixels per minor unit along the tape axis.
    pub step_width: f64,
    /// Tick lengths for major, semi-major and minor ticks.
    pub step_lengths: [f64; 3],
    /// Extra ticks laid out beyond each edge of the visible window.
    pub step_margin: u32,
    /// Gap between a tick and its label on vertical tapes.
    pub linear_label_border: f64,
    /// Gap between a tick and its label on heading and roll tapes.
    pub arc_label_border: f64,
}

impl Default for TapeGeometry {
    fn default() -> Self {
        Self {
            value_font_size: 20.0,
            scale_font_size: 16.0,
            text_side_border: 5.0,
            text_top_border: 4.0,
            border: 4.0,
            step_width: 8.0,
            step_lengths: [16.0, 11.0, 7.0],
            step_margin: 5,
            linear_label_border: 3.0,
            arc_label_border: 2.0,
        }
    }
}

/// Geometry of the horizon bar, pitch rungs and flight-path marker
#[derive(Debug, Clone, PartialEq)]
pub struct LadderGeometry {
    pub horizon_length: f64,
    pub rung_length: f64,
    /// Empty space in the middle of every rung.
    pub gap: f64,
    /// Size of the chevron at the outer end of a rung.
    pub chevron: f64,
    pub pitch_step_degrees: i32,
    pub max_pitch_degrees: i32,
    pub label_font_size: f64,
    pub label_border: f64,
    /// Length of the dashed -1/-2/-3 degree marks below the horizon.
    pub minor_mark_length: f64,
    pub minor_mark_dash: [f64; 2],
    pub marker_radius: f64,
    pub marker_line: f64,
}

impl Default for LadderGeometry {
    fn default() -> Self {
        Self {
            horizon_length: 460.0,
            rung_length: 200.0,
            gap: 80.0,
            chevron: 12.0,
            pitch_step_degrees: 10,
            max_pitch_degrees: 90,
            label_font_size: 16.0,
            label_border: 4.0,
            minor_mark_length: 26.0,
            minor_mark_dash: [6.0, 4.0],
            marker_radius: 12.0,
            marker_line: 9.0,
        }
    }
}

/// Placement of the fixed instruments on the canvas
#[derive(Debug, Clone, PartialEq)]
pub struct PanelLayout {
    /// Distance of every fixed instrument from the canvas edge.
    pub border: f64,
    pub speed_example: String,
    pub altitude_example: String,
    pub speed_visible_range: u32,
    pub altitude_visible_range: u32,
    pub heading_visible_range: u32,
    pub roll_visible_range: u32,
    pub heading_at_bottom: bool,
    pub roll_at_bottom: bool,
    pub throttle_font_size: f64,
    pub throttle_border: f64,
    pub throttle_index_length: f64,
    pub clock_font_size: f64,
}

impl Default for PanelLayout {
    fn default() -> Self {
        Self {
            border: 16.0,
            speed_example: "9999".to_string(),
            altitude_example: "99999".to_string(),
            speed_visible_range: 41,
            altitude_visible_range: 41,
            heading_visible_range: 61,
            roll_visible_range: 51,
            heading_at_bottom: false,
            roll_at_bottom: true,
            throttle_font_size: 16.0,
            throttle_border: 8.0,
            throttle_index_length: 6.0,
            clock_font_size: 16.0,
        }
    }
}

#[derive(Debug, Clone, Builder)]
pub struct HudConfig {
    #[builder(default = "HUD".to_string())]
    pub title: String,

    // Window configuration
    #[builder(default = 1280)]
    pub window_width: usize,
    #[builder(default = 720)]
    pub window_height: usize,
    #[builder(default = 60.0)]
    pub max_framerate: f64,

    /// Raw TTF/OTF bytes used for every label.
    pub font_data: Vec<u8>,

    #[builder(default)]
    pub display: DisplayConfig,
    #[builder(default)]
    pub style: Style,
    #[builder(default)]
    pub tapes: TapeGeometry,
    #[builder(default)]
    pub ladder: LadderGeometry,
    #[builder(default)]
    pub layout: PanelLayout,

    #[builder(default = 0)]
    pub clock_utc_offset_minutes: i32,
}
