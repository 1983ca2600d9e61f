//! Trip list presentation: headline numbers and per-trip delay class.

use mbta_client::Trip;

/// Headline numbers shown above the trip list.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TripSummary {
    pub total: usize,
    /// Mean delay in minutes; trips without a delay count as 0.
    pub avg_delay: f64,
    /// Trips with a known delay of at most 0 minutes.
    pub on_time: usize,
    pub on_time_percent: f64,
}

impl TripSummary {
    pub fn from_trips(trips: &[Trip]) -> Self {
        if trips.is_empty() {
            return Self::default();
        }

        let total = trips.len();
        let delay_sum: f64 = trips
            .iter()
            .map(|t| t.total_delay_minutes.unwrap_or(0.0))
            .sum();
        let on_time = trips
            .iter()
            .filter(|t| matches!(t.total_delay_minutes, Some(d) if d <= 0.0))
            .count();

        Self {
            total,
            avg_delay: delay_sum / total as f64,
            on_time,
            on_time_percent: on_time as f64 / total as f64 * 100.0,
        }
    }
}

/// Marker class for one trip on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelayClass {
    Delayed,
    OnTime,
    NoData,
}

impl DelayClass {
    pub fn of(trip: &Trip) -> Self {
        match trip.total_delay_minutes {
            Some(d) if d > 0.0 => Self::Delayed,
            Some(d) if d < 0.0 => Self::OnTime,
            _ => Self::NoData,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Delayed => "Delayed",
            Self::OnTime => "On-time",
            Self::NoData => "No delay data",
        }
    }
}
