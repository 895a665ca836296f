use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyQuota {
    pub date: NaiveDate,
    pub count: u32,
}

impl DailyQuota {
    pub fn fresh(today: NaiveDate) -> Self {
        DailyQuota {
            date: today,
            count: 0,
        }
    }

    /// A record from an earlier day counts as an empty one for today.
    pub fn normalized(self, today: NaiveDate) -> Self {
        if self.date == today {
            self
        } else {
            Self::fresh(today)
        }
    }

    pub fn is_active_on(&self, today: NaiveDate) -> bool {
        self.date == today && self.count > 0
    }
}
