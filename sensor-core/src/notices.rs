//! Notification texts for the node's two reportable conditions.

use crate::trigger::Edge;

/// Title/message pair pushed when a trigger edge fires.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Notice {
    pub title: &'static str,
    pub message: &'static str,
}

/// Pushed when the light level rises back above the upper threshold.
pub const LEVEL_RESTORED: Notice = Notice {
    title: "Sensor OK!",
    message: "Light level is restored!",
};

/// Pushed when the light level falls below the lower threshold.
pub const LEVEL_LOW: Notice = Notice {
    title: "Sensor below threshold!",
    message: "Light level is below threshold!",
};

/// Maps a trigger edge to the notice it raises.
///
/// Low light is the alarm condition for this sensor, so the upper crossing
/// is the recovery message, not the alert.
#[must_use]
pub const fn notice_for(edge: Edge) -> Notice {
    match edge {
        Edge::RoseAboveUpper => LEVEL_RESTORED,
        Edge::FellBelowLower => LEVEL_LOW,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upper_crossing_reports_recovery() {
        assert_eq!(notice_for(Edge::RoseAboveUpper), LEVEL_RESTORED);
    }

    #[test]
    fn lower_crossing_reports_the_alarm() {
        assert_eq!(notice_for(Edge::FellBelowLower), LEVEL_LOW);
    }
}
