use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// Piecewise linear color ramp over evenly spaced stops.
#[derive(Clone, Copy, Debug)]
pub struct Colormap {
    stops: &'static [Rgb],
}

const PLASMA_STOPS: [Rgb; 9] = [
    Rgb(13, 8, 135),
    Rgb(75, 3, 161),
    Rgb(125, 3, 168),
    Rgb(168, 34, 150),
    Rgb(203, 70, 121),
    Rgb(229, 107, 93),
    Rgb(248, 148, 65),
    Rgb(253, 195, 40),
    Rgb(240, 249, 33),
];

impl Colormap {
    /// Dark purple through magenta and orange to yellow
    pub const PLASMA: Colormap = Colormap {
        stops: &PLASMA_STOPS,
    };

    /// Color for a normalized value, clamped to [0, 1]
    pub fn color_at(&self, value: f32) -> Rgb {
        let value = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };
        let last = self.stops.len() - 1;
        let position = value * last as f32;
        let index = (position.floor() as usize).min(last - 1);
        let fraction = position - index as f32;
        shade(self.stops[index], self.stops[index + 1], fraction)
    }
}

impl Default for Colormap {
    fn default() -> Self {
        Self::PLASMA
    }
}

fn shade(start: Rgb, end: Rgb, y: f32) -> Rgb {
    let channel = |a: u8, b: u8| {
        (a as f32 + y * (b as f32 - a as f32))
            .round()
            .clamp(0., 255.) as u8
    };
    Rgb(
        channel(start.0, end.0),
        channel(start.1, end.1),
        channel(start.2, end.2),
    )
}
