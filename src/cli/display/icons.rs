//! Status icons for CLI output

use crate::domain::plan::ResourceState;

pub struct StatusIcon;

impl StatusIcon {
    pub const PRESENT: &'static str = "✓";

    pub const ABSENT: &'static str = "✗";

    /// Read-only mount
    pub const LOCKED: &'static str = "🔒";

    pub fn state_icon(state: ResourceState) -> &'static str {
        match state {
            ResourceState::Present => Self::PRESENT,
            ResourceState::Absent => Self::ABSENT,
        }
    }

    pub fn flag_icon(enabled: bool) -> &'static str {
        if enabled {
            Self::PRESENT
        } else {
            Self::ABSENT
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_icons() {
        assert_eq!(StatusIcon::state_icon(ResourceState::Present), StatusIcon::PRESENT);
        assert_eq!(StatusIcon::state_icon(ResourceState::Absent), StatusIcon::ABSENT);
        assert_eq!(StatusIcon::flag_icon(true), StatusIcon::PRESENT);
    }
}
