use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Parses `#rrggbb` (the leading `#` is optional).
    pub fn from_hex(raw: &str) -> Option<Self> {
        let hex = raw.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::from_rgb8([channel(0)?, channel(2)?, channel(4)?]))
    }

    pub fn from_rgb8(rgb: [u8; 3]) -> Self {
        Self {
            r: rgb[0] as f32 / 255.0,
            g: rgb[1] as f32 / 255.0,
            b: rgb[2] as f32 / 255.0,
        }
    }

    pub fn to_rgb8(self) -> [u8; 3] {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b)]
    }

    fn mix(a: Self, b: Self, alpha: f32) -> Self {
        // a*(1-α) + b*α is exact at both ends, which keeps stop colors bit-identical.
        let lerp = |x: f32, y: f32| x * (1.0 - alpha) + y * alpha;
        Self {
            r: lerp(a.r, b.r),
            g: lerp(a.g, b.g),
            b: lerp(a.b, b.b),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GradientError {
    TooFewStops(usize),
}

impl fmt::Display for GradientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooFewStops(n) => write!(f, "color gradient needs at least 2 stops, got {n}"),
        }
    }
}

impl std::error::Error for GradientError {}

/// Evenly spaced color stops over `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorGradient {
    stops: Vec<Color>,
}

impl ColorGradient {
    pub fn new(stops: Vec<Color>) -> Result<Self, GradientError> {
        if stops.len() < 2 {
            return Err(GradientError::TooFewStops(stops.len()));
        }
        Ok(Self { stops })
    }

    /// Hot inner rim fading out through orange and red into violet.
    pub fn accretion() -> Self {
        Self {
            stops: vec![
                Color::from_rgb8([255, 250, 235]),
                Color::from_rgb8([255, 190, 90]),
                Color::from_rgb8([220, 80, 40]),
                Color::from_rgb8([120, 30, 90]),
                Color::from_rgb8([40, 10, 60]),
            ],
        }
    }

    pub fn stops(&self) -> &[Color] {
        &self.stops
    }

    pub fn color_at(&self, t: f32) -> Color {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let seg_count = self.stops.len() - 1;
        let seg = seg_count as f32;
        let k = ((t * seg).floor() as usize).min(seg_count - 1);
        let alpha = ((t - k as f32 / seg) / (1.0 / seg)).clamp(0.0, 1.0);
        Color::mix(self.stops[k], self.stops[k + 1], alpha)
    }
}

impl Default for ColorGradient {
    fn default() -> Self {
        Self::accretion()
    }
}
