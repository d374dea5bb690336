use serde::Serialize;

/// Mean color of an image. Channels are stored as bytes; `normalized`
/// gives the same value scaled to `[0.0, 1.0]` as `byte / 255`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AverageColor {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

impl AverageColor {
    pub fn new(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    pub fn bytes(&self) -> [u8; 4] {
        [self.red, self.green, self.blue, self.alpha]
    }

    pub fn normalized(&self) -> [f32; 4] {
        self.bytes().map(|c| c as f32 / 255.0)
    }

    pub fn to_hex(&self) -> String {
        format!(
            "#{:02x}{:02x}{:02x}{:02x}",
            self.red, self.green, self.blue, self.alpha
        )
    }
}
