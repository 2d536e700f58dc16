//! The two-valued phase of a traffic light.

/// The phase a light is showing.  No other values are legal.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Phase {
    /// Traffic must stop.  Every light starts here.
    #[default]
    Red,
    /// Traffic may proceed.
    Green,
}

impl Phase {
    /// The phase the light switches to next: red ↔ green.
    #[inline]
    pub fn toggled(self) -> Phase {
        match self {
            Phase::Red   => Phase::Green,
            Phase::Green => Phase::Red,
        }
    }

    #[inline]
    pub fn is_red(self) -> bool {
        matches!(self, Phase::Red)
    }

    #[inline]
    pub fn is_green(self) -> bool {
        matches!(self, Phase::Green)
    }

    /// Human-readable label, useful for log fields.
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Red   => "red",
            Phase::Green => "green",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
