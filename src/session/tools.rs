//! Reader tool selection
//!
//! The highlight and marker tools are mutually exclusive, so a single value
//! models both switches.

/// Tool that receives token taps (crosses to JS as its `u8` value)
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde_repr::Serialize_repr, serde_repr::Deserialize_repr)]
pub enum ActiveTool {
    /// Taps do nothing
    None = 0,

    /// Taps toggle word highlights
    Highlight = 1,

    /// Taps select marker ranges and open notes
    Marker = 2,
}

impl Default for ActiveTool {
    fn default() -> Self {
        ActiveTool::None
    }
}

impl ActiveTool {
    pub fn highlight_enabled(self) -> bool {
        self == ActiveTool::Highlight
    }

    pub fn marker_enabled(self) -> bool {
        self == ActiveTool::Marker
    }

    /// Result of flipping `tool`'s switch while `self` is active
    pub fn toggled(self, tool: ActiveTool) -> ActiveTool {
        if self == tool {
            ActiveTool::None
        } else {
            tool
        }
    }

    pub fn from_u8(value: u8) -> Option<ActiveTool> {
        match value {
            0 => Some(ActiveTool::None),
            1 => Some(ActiveTool::Highlight),
            2 => Some(ActiveTool::Marker),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggling_is_exclusive() {
        let tool = ActiveTool::None.toggled(ActiveTool::Highlight);
        assert!(tool.highlight_enabled());

        let tool = tool.toggled(ActiveTool::Marker);
        assert!(tool.marker_enabled() && !tool.highlight_enabled());

        assert_eq!(tool.toggled(ActiveTool::Marker), ActiveTool::None);
    }

    #[test]
    fn test_serializes_as_number() {
        assert_eq!(serde_json::to_string(&ActiveTool::Marker).unwrap(), "2");
        assert_eq!(ActiveTool::from_u8(1), Some(ActiveTool::Highlight));
        assert_eq!(ActiveTool::from_u8(7), None);
    }
}
