//! Color theme for CLI output

use crate::domain::plan::{LifecycleTag, ResourceState};
use comfy_table::Color as TableColor;

/// Color theme for terminal output
#[derive(Debug, Clone)]
pub struct ColorTheme {
    pub start: TableColor,
    pub stop: TableColor,
    pub restart: TableColor,
    pub destroy: TableColor,
    pub muted: TableColor,
}

impl Default for ColorTheme {
    fn default() -> Self {
        Self {
            start: TableColor::Green,
            stop: TableColor::Yellow,
            restart: TableColor::Cyan,
            destroy: TableColor::Red,
            muted: TableColor::DarkGrey,
        }
    }
}

impl ColorTheme {
    pub fn tag_color(&self, tag: LifecycleTag) -> TableColor {
        match tag {
            LifecycleTag::Start => self.start,
            LifecycleTag::Stop => self.stop,
            LifecycleTag::Restart => self.restart,
            LifecycleTag::Destroy => self.destroy,
        }
    }

    pub fn state_color(&self, state: ResourceState) -> TableColor {
        match state {
            ResourceState::Present => self.start,
            ResourceState::Absent => self.destroy,
        }
    }

    pub fn flag_color(&self, enabled: bool) -> TableColor {
        if enabled {
            self.start
        } else {
            self.muted
        }
    }
}

/// Convert comfy_table::Color to colored::Color string representation
pub fn table_color_to_colored_str(color: TableColor) -> &'static str {
    match color {
        TableColor::Green => "green",
        TableColor::Yellow => "yellow",
        TableColor::Red => "red",
        TableColor::Cyan => "cyan",
        TableColor::DarkGrey => "bright black",
        _ => "white",
    }
}
