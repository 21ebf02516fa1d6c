//! Color theme for CLI output

use comfy_table::Color as TableColor;

/// Color theme for terminal output
#[derive(Debug, Clone)]
pub struct ColorTheme {
    pub success: TableColor,
    pub warning: TableColor,
    pub error: TableColor,
    pub info: TableColor,
    pub muted: TableColor,
}

impl Default for ColorTheme {
    fn default() -> Self {
        Self {
            success: TableColor::Green,
            warning: TableColor::Yellow,
            error: TableColor::Red,
            info: TableColor::Cyan,
            muted: TableColor::DarkGrey,
        }
    }
}

impl ColorTheme {
    /// Get color based on how far a rollout has progressed
    pub fn get_rollout_color(&self, running: i32, desired: i32) -> TableColor {
        if desired == 0 {
            self.muted
        } else if running >= desired {
            self.success
        } else if running > 0 {
            self.warning
        } else {
            self.error
        }
    }
}
