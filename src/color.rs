// Colours

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Black doubles as "LED off".
    pub fn is_black(&self) -> bool {
        *self == Self::BLACK
    }
}

impl From<(u8, u8, u8)> for Rgb {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::new(r, g, b)
    }
}

impl From<Rgb> for (u8, u8, u8) {
    fn from(rgb: Rgb) -> Self {
        (rgb.r, rgb.g, rgb.b)
    }
}

/// Converts an HSV colour (each component 0.0-1.0) to 8 bit RGB.
///
/// Uses the usual six sector hexagon. Channels are scaled by 255 and
/// truncated, out of range values saturate at 0 or 255.
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Rgb {
    let scaled = h * 6.0;
    let sector = scaled.floor();
    let f = scaled - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    let (r, g, b) = match (sector as i32).rem_euclid(6) {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };

    Rgb::new(to_channel(r), to_channel(g), to_channel(b))
}

#[inline]
fn to_channel(value: f32) -> u8 {
    // `as` saturates, NaN becomes 0
    (value * 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::{hsv_to_rgb, Rgb};
    use proptest::prelude::*;

    fn close(a: Rgb, b: Rgb) -> bool {
        let d = |x: u8, y: u8| (x as i16 - y as i16).abs() <= 1;
        d(a.r, b.r) && d(a.g, b.g) && d(a.b, b.b)
    }

    #[test]
    fn primaries_test() {
        assert_eq!(hsv_to_rgb(0.0, 1.0, 1.0), Rgb::new(255, 0, 0));
        assert!(close(hsv_to_rgb(1.0 / 3.0, 1.0, 1.0), Rgb::new(0, 255, 0)));
        assert!(close(hsv_to_rgb(2.0 / 3.0, 1.0, 1.0), Rgb::new(0, 0, 255)));
        // Hue wraps around
        assert_eq!(hsv_to_rgb(1.0, 1.0, 1.0), Rgb::new(255, 0, 0));
    }

    #[test]
    fn secondaries_test() {
        assert!(close(hsv_to_rgb(1.0 / 6.0, 1.0, 1.0), Rgb::new(255, 255, 0)));
        assert!(close(hsv_to_rgb(0.5, 1.0, 1.0), Rgb::new(0, 255, 255)));
        assert!(close(hsv_to_rgb(5.0 / 6.0, 1.0, 1.0), Rgb::new(255, 0, 255)));
    }

    #[test]
    fn black_test() {
        assert!(hsv_to_rgb(0.42, 0.7, 0.0).is_black());
    }

    #[test]
    fn saturates_test() {
        assert_eq!(hsv_to_rgb(0.0, 0.0, 2.0), Rgb::new(255, 255, 255));
        assert_eq!(hsv_to_rgb(0.0, 0.0, -1.0), Rgb::BLACK);
    }

    proptest! {
        #[test]
        fn grey_axis_proptest(h in 0.0f32..=1.0, v in 0.0f32..=1.0) {
            let rgb = hsv_to_rgb(h, 0.0, v);
            let expected = (v * 255.0) as u8;
            prop_assert_eq!(rgb, Rgb::new(expected, expected, expected));
        }
    }
}
