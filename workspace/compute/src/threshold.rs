use common::{ChargerRequirement, ThresholdEvent};

/// First month where the required charger count rises above the previous month.
///
/// Returns `None` for timelines shorter than two months or that never increase.
pub fn first_increase(timeline: &[ChargerRequirement]) -> Option<ThresholdEvent> {
    timeline
        .windows(2)
        .find(|pair| pair[1].chargers > pair[0].chargers)
        .map(|pair| ThresholdEvent {
            from_chargers: pair[0].chargers,
            to_chargers: pair[1].chargers,
            date: pair[1].date.clone(),
        })
}
