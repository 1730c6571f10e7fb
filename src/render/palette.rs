//! Colors used on the report. Status colors live here and nowhere else.

use crate::status::StatusCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }

    /// Components scaled to `0.0..=1.0`, as PDF color operators expect.
    pub fn unit(self) -> [f32; 3] {
        [self.0, self.1, self.2].map(|c| f32::from(c) / 255.0)
    }

    /// Perceived brightness, `0.0` (black) to `1.0` (white).
    pub fn luminance(self) -> f32 {
        let [r, g, b] = self.unit();
        0.2126 * r + 0.7152 * g + 0.0722 * b
    }
}

pub const TEXT: Rgb = Rgb(0x00, 0x00, 0x00);
pub const TITLE: Rgb = Rgb(0x00, 0x80, 0x00);
pub const SECTION: Rgb = Rgb(0x00, 0x33, 0x66);
pub const FOOTER: Rgb = Rgb(0x66, 0x66, 0x66);

pub fn status_color(status: StatusCode) -> Rgb {
    match status {
        StatusCode::Done => Rgb(0x00, 0xB0, 0x50),
        StatusCode::Acquired => Rgb(0x1E, 0x6B, 0x32),
        StatusCode::InProgress => Rgb(0xE6, 0xB8, 0x00),
        StatusCode::AcquisitionInProgress => Rgb(0xED, 0x7D, 0x31),
        StatusCode::NotEvaluated => Rgb(0x80, 0x80, 0x80),
        StatusCode::NotAcquired => Rgb(0xC0, 0x00, 0x00),
    }
}

/// Color of an item value; unrecognized values use the body text color.
pub fn value_color(status: Option<StatusCode>) -> Rgb {
    status.map_or(TEXT, status_color)
}
