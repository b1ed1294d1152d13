//! Statistics domain types.

use serde::Serialize;

use super::money::Credits;

/// Platform-wide counters for the admin dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total_users: i64,
    pub total_bets: i64,
    pub open_events: i64,
    /// Sum of every stake ever placed.
    pub total_volume: Credits,
    pub pending_bets: i64,
    pub settled_events: i64,
}

impl DashboardStats {
    /// Average stake per bet, if any bets exist.
    #[must_use]
    pub fn average_stake(&self) -> Option<Credits> {
        if self.total_bets == 0 {
            None
        } else {
            Some(self.total_volume / self.total_bets)
        }
    }
}
