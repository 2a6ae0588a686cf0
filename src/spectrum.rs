//! Wavelength to display color
//!
//! Visible light (380-750 nm) follows the usual piecewise RGB ramp with an
//! intensity falloff at both ends. UV and IR get fixed stand-in colors so
//! invisible photons still show up.

/// Color for ultraviolet photons (< 380 nm)
pub const UV_COLOR: [u8; 3] = [0xC0, 0xC0, 0xFF];
/// Color for infrared photons (> 750 nm)
pub const IR_COLOR: [u8; 3] = [0x40, 0x40, 0x40];

const GAMMA: f64 = 0.8;

/// RGB color for a wavelength in nanometres
pub fn wavelength_to_rgb(wavelength: f64) -> [u8; 3] {
    let w = wavelength;
    if w < 380.0 {
        return UV_COLOR;
    }
    if w > 750.0 {
        return IR_COLOR;
    }

    let (r, g, b) = if w < 440.0 {
        (-(w - 440.0) / (440.0 - 380.0), 0.0, 1.0)
    } else if w < 490.0 {
        (0.0, (w - 440.0) / (490.0 - 440.0), 1.0)
    } else if w < 510.0 {
        (0.0, 1.0, -(w - 510.0) / (510.0 - 490.0))
    } else if w < 580.0 {
        ((w - 510.0) / (580.0 - 510.0), 1.0, 0.0)
    } else if w < 645.0 {
        (1.0, -(w - 645.0) / (645.0 - 580.0), 0.0)
    } else {
        (1.0, 0.0, 0.0)
    };

    let factor = if w < 420.0 {
        0.3 + 0.7 * (w - 380.0) / (420.0 - 380.0)
    } else if w < 701.0 {
        1.0
    } else {
        0.3 + 0.7 * (750.0 - w) / (750.0 - 700.0)
    };

    [adjust(r, factor), adjust(g, factor), adjust(b, factor)]
}

fn adjust(channel: f64, factor: f64) -> u8 {
    (255.0 * (channel * factor).powf(GAMMA)) as u8
}

/// `#rrggbb` color for a wavelength
pub fn wavelength_to_hex(wavelength: f64) -> String {
    let [r, g, b] = wavelength_to_rgb(wavelength);
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

/// Coarse band name, for logs and summaries
pub fn band_name(wavelength: f64) -> &'static str {
    match wavelength {
        w if w < 380.0 => "UV",
        w if w < 450.0 => "violet",
        w if w < 495.0 => "blue",
        w if w < 570.0 => "green",
        w if w < 590.0 => "yellow",
        w if w < 620.0 => "orange",
        w if w <= 750.0 => "red",
        _ => "IR",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invisible_bands() {
        assert_eq!(wavelength_to_hex(350.0), "#c0c0ff");
        assert_eq!(wavelength_to_hex(780.0), "#404040");
    }

    #[test]
    fn test_visible_primaries() {
        // Pure green at 510 nm, full intensity
        assert_eq!(wavelength_to_rgb(510.0), [0, 255, 0]);
        // Pure red in the flat region
        assert_eq!(wavelength_to_rgb(650.0), [255, 0, 0]);
        // Blue at 440 nm
        assert_eq!(wavelength_to_rgb(440.0), [0, 0, 255]);
    }

    #[test]
    fn test_edges_are_dimmed() {
        let [r, _, _] = wavelength_to_rgb(740.0);
        assert!(r < 255 && r > 0);
        let [_, _, b] = wavelength_to_rgb(385.0);
        assert!(b < 255 && b > 0);
    }

    #[test]
    fn test_band_names() {
        assert_eq!(band_name(360.0), "UV");
        assert_eq!(band_name(530.0), "green");
        assert_eq!(band_name(800.0), "IR");
    }
}
