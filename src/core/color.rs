#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32, // Red component (0.0 - 1.0)
    pub g: f32, // Green component (0.0 - 1.0)
    pub b: f32, // Blue component (0.0 - 1.0)
}

impl Color {
    /// Create a new color with RGB components normalized.
    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Create a color from a hexadecimal string.
    /// Accepts formats like "#RRGGBB" or "RRGGBB".
    pub fn from_hex(hex: &str) -> Result<Self, &'static str> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return Err("Hex string should be 6 characters long (RRGGBB).");
        }

        let r = u8::from_str_radix(&hex[0..2], 16).map_err(|_| "Invalid red component in hex")?
            as f32
            / 255.0;
        let g = u8::from_str_radix(&hex[2..4], 16).map_err(|_| "Invalid green component in hex")?
            as f32
            / 255.0;
        let b = u8::from_str_radix(&hex[4..6], 16).map_err(|_| "Invalid blue component in hex")?
            as f32
            / 255.0;

        Ok(Self::new(r, g, b))
    }

    const fn hex_char_to_u8(c: char) -> u8 {
        match c {
            '0'..='9' => (c as u8) - b'0',
            'a'..='f' => (c as u8) - b'a' + 10,
            'A'..='F' => (c as u8) - b'A' + 10,
            _ => 0,
        }
    }

    const fn hex_pair_to_u8(high: char, low: char) -> u8 {
        (Self::hex_char_to_u8(high) << 4) | Self::hex_char_to_u8(low)
    }

    /// Const-context constructor for the palette below. Input is trusted.
    const fn hex(hex: &str) -> Self {
        let bytes = hex.as_bytes();
        let offset = if bytes[0] == b'#' { 1 } else { 0 };

        let r =
            Self::hex_pair_to_u8(bytes[offset] as char, bytes[offset + 1] as char) as f32 / 255.0;
        let g = Self::hex_pair_to_u8(bytes[offset + 2] as char, bytes[offset + 3] as char) as f32
            / 255.0;
        let b = Self::hex_pair_to_u8(bytes[offset + 4] as char, bytes[offset + 5] as char) as f32
            / 255.0;

        Self { r, g, b }
    }

    pub fn to_crossterm_color(&self) -> crossterm::style::Color {
        crossterm::style::Color::Rgb {
            r: (self.r * 255.0) as u8,
            g: (self.g * 255.0) as u8,
            b: (self.b * 255.0) as u8,
        }
    }

    /// Packs into minifb's `0x00RRGGBB` layout.
    pub fn to_u32(&self) -> u32 {
        let r = (self.r.clamp(0.0, 1.0) * 255.0).round() as u32;
        let g = (self.g.clamp(0.0, 1.0) * 255.0).round() as u32;
        let b = (self.b.clamp(0.0, 1.0) * 255.0).round() as u32;
        (r << 16) | (g << 8) | b
    }

    pub fn from_u32(packed: u32) -> Self {
        Self {
            r: ((packed >> 16) & 0xFF) as f32 / 255.0,
            g: ((packed >> 8) & 0xFF) as f32 / 255.0,
            b: (packed & 0xFF) as f32 / 255.0,
        }
    }

    pub fn lerp(&self, end: &Color, t: f32) -> Color {
        Color {
            r: self.r + (end.r - self.r) * t,
            g: self.g + (end.g - self.g) * t,
            b: self.b + (end.b - self.b) * t,
        }
    }

    /*
    u32 RGB is 0x00RRGGBB (in the context of minifb)

    red and blue don't overlap once green is masked out, so both get
    scaled by the same 8 bit weight in one multiply. green gets its own.

    weights sum to 256, so the shift by 8 drops the result back into
    place and the masks throw away the bits that spilled into the gaps.
    */
    pub fn lerp_u32(start: u32, end: u32, t: f32) -> u32 {
        let a = (t.clamp(0.0, 1.0) * 256.0) as u32;
        let inv_a = 256 - a;

        let srb = start & 0xFF00FF;
        let sg = start & 0x00FF00;
        let erb = end & 0xFF00FF;
        let eg = end & 0x00FF00;

        let rb = ((srb * inv_a + erb * a) >> 8) & 0xFF00FF;
        let g = ((sg * inv_a + eg * a) >> 8) & 0x00FF00;

        rb | g
    }
}

// Predefined colors
impl Color {
    pub const BLACK: Color = Color::hex("000000");
    pub const WHITE: Color = Color::hex("FFFFFF");
    pub const CYAN: Color = Color::hex("00FFFF");
    pub const DEEP_VIOLET: Color = Color::hex("7800FF");
    pub const MIDNIGHT: Color = Color::hex("01040F");
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_matches_hex_parsing() {
        assert_eq!(Color::from_hex("#00FFFF").unwrap(), Color::CYAN);
        assert_eq!(Color::from_hex("7800ff").unwrap(), Color::DEEP_VIOLET);
        assert!(Color::from_hex("#12345").is_err());
        assert!(Color::from_hex("zz0000").is_err());
    }

    #[test]
    fn packs_into_minifb_layout() {
        assert_eq!(Color::CYAN.to_u32(), 0x00FFFF);
        assert_eq!(Color::DEEP_VIOLET.to_u32(), 0x7800FF);
        assert_eq!(Color::from_u32(0x7800FF), Color::DEEP_VIOLET);
    }

    #[test]
    fn lerp_u32_hits_endpoints() {
        assert_eq!(Color::lerp_u32(0x123456, 0xABCDEF, 0.0), 0x123456);
        assert_eq!(Color::lerp_u32(0x000000, 0xFFFFFF, 1.0), 0xFFFFFF);
    }

    #[test]
    fn lerp_u32_keeps_channels_apart() {
        // half way from pure blue to pure red must not leak into green
        assert_eq!(Color::lerp_u32(0x0000FF, 0xFF0000, 0.5), 0x7F007F);
    }

    #[test]
    fn lerp_u32_tracks_float_lerp() {
        let start = Color::MIDNIGHT;
        let end = Color::CYAN;
        for step in 0..=10 {
            let t = step as f32 / 10.0;
            let packed = Color::from_u32(Color::lerp_u32(start.to_u32(), end.to_u32(), t));
            let float = start.lerp(&end, t);
            assert!((packed.r - float.r).abs() < 0.02);
            assert!((packed.g - float.g).abs() < 0.02);
            assert!((packed.b - float.b).abs() < 0.02);
        }
    }
}
