//! Flow-based rowing advisories.
//!
//! Maps the current flow at the gauge onto one of four safety tiers and
//! builds the sentence that is spoken back to the rower. Thresholds are in
//! cubic metres per second and come from the club's high-flow policy:
//!
//! | flow (m³/s)  | tier          | restriction                      |
//! |--------------|---------------|----------------------------------|
//! | ≤ 50         | Normal        | none                             |
//! | 51 – 75      | HighFlow      | no novice coxes or steerpersons  |
//! | 76 – 100     | VeryHighFlow  | no singles, doubles, or pairs    |
//! | > 100        | NoRowing      | no rowing                        |
//!
//! Each tier is closed at its upper bound, so a reading between two rows
//! (50.9, 75.5) lands in the stricter tier.

use crate::model::{Advisory, AdvisoryTier, Reading};
use chrono::{DateTime, Utc};
use chrono_tz::Europe::London;

/// Upper bound (inclusive) of the Normal tier.
pub const NORMAL_MAX: f64 = 50.0;
/// Upper bound (inclusive) of the HighFlow tier.
pub const HIGH_FLOW_MAX: f64 = 75.0;
/// Upper bound (inclusive) of the VeryHighFlow tier.
pub const VERY_HIGH_FLOW_MAX: f64 = 100.0;

/// Closing sentence appended to every advisory.
pub const SAFETY_DISCLAIMER: &str = "There are factors other than flow rate that affect water \
     safety. Please use your best judgement and consult with your coach and squad vice \
     captain before going on the water.";

impl AdvisoryTier {
    /// Tier for a flow value. NaN falls through to `NoRowing`.
    pub fn for_flow(value: f64) -> Self {
        if value <= NORMAL_MAX {
            AdvisoryTier::Normal
        } else if value <= HIGH_FLOW_MAX {
            AdvisoryTier::HighFlow
        } else if value <= VERY_HIGH_FLOW_MAX {
            AdvisoryTier::VeryHighFlow
        } else {
            AdvisoryTier::NoRowing
        }
    }

    /// The restriction clause spoken for this tier.
    pub fn restriction(&self) -> &'static str {
        match self {
            AdvisoryTier::Normal => "there are no restrictions today based on flow rate",
            AdvisoryTier::HighFlow => {
                "there are High Flow restrictions today. No novice coxes or steerpersons"
            }
            AdvisoryTier::VeryHighFlow => {
                "there are Very High Flow restrictions today. No singles, doubles, or pairs today"
            }
            AdvisoryTier::NoRowing => "there is no rowing today, it's too dangerous",
        }
    }
}

/// Classifies a reading and builds its spoken advisory.
pub fn classify(reading: &Reading) -> Advisory {
    let tier = AdvisoryTier::for_flow(reading.value);

    let message = format!(
        "As of {}, the current flow rate at {} is {} cubic meters per second, {}. {}",
        format_spoken_time(reading.timestamp),
        reading.label,
        reading.value,
        tier.restriction(),
        SAFETY_DISCLAIMER
    );

    Advisory { tier, message }
}

/// Renders a timestamp in UK local time, e.g. `Monday 1 January 2024 at 10:00`.
pub fn format_spoken_time(timestamp: DateTime<Utc>) -> String {
    timestamp
        .with_timezone(&London)
        .format("%A %-d %B %Y at %H:%M")
        .to_string()
}
