use serde::Deserialize;

/// Navigation request coming from the day tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayAction {
    #[serde(skip)]
    Select(u32),
    Next,
    Previous,
    First,
    Last,
}

/// Selected day of a trip view. Transitions never leave `[1, total_days]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaySelection {
    day: u32,
    total_days: u32,
}

impl DaySelection {
    pub fn new(total_days: u32) -> Self {
        let total_days = total_days.max(1);
        Self { day: 1, total_days }
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn total_days(&self) -> u32 {
        self.total_days
    }

    pub fn has_previous(&self) -> bool {
        self.day > 1
    }

    pub fn has_next(&self) -> bool {
        self.day < self.total_days
    }

    #[must_use]
    pub fn apply(self, action: DayAction) -> Self {
        let day = match action {
            DayAction::Select(day) => day,
            DayAction::Next => self.day.saturating_add(1),
            DayAction::Previous => self.day.saturating_sub(1),
            DayAction::First => 1,
            DayAction::Last => self.total_days,
        };
        Self {
            day: day.clamp(1, self.total_days),
            ..self
        }
    }

    /// Builds the selection from `?day=&nav=` query parameters.
    pub fn from_query(total_days: u32, day: Option<u32>, nav: Option<DayAction>) -> Self {
        let mut selection = Self::new(total_days);
        if let Some(day) = day {
            selection = selection.apply(DayAction::Select(day));
        }
        if let Some(nav) = nav {
            selection = selection.apply(nav);
        }
        selection
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transitions_stay_in_range() {
        let start = DaySelection::new(3);
        assert_eq!(start.apply(DayAction::Previous).day(), 1);
        assert_eq!(start.apply(DayAction::Next).apply(DayAction::Next).apply(DayAction::Next).day(), 3);
        assert_eq!(start.apply(DayAction::Select(0)).day(), 1);
        assert_eq!(start.apply(DayAction::Select(42)).day(), 3);
        assert_eq!(start.apply(DayAction::Last).apply(DayAction::First).day(), 1);
    }

    #[test]
    fn query_selects_then_navigates() {
        let selection = DaySelection::from_query(4, Some(2), Some(DayAction::Next));
        assert_eq!(selection.day(), 3);
        assert!(selection.has_previous());
        assert!(selection.has_next());
        assert_eq!(DaySelection::from_query(4, None, None).day(), 1);
    }
}
