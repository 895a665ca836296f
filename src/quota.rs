use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;
use tokio::runtime::Handle;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::clock::Clock;
use crate::models::DailyQuota;
use crate::stores::QuotaStore;

pub const DAILY_LIMIT: u32 = 20;

/// A quota slot taken at check time. It must be either committed or released.
///
/// Dropping an unsettled reservation (a cancelled request) gives the slot back
/// on a spawned task.
#[derive(Debug)]
#[must_use]
pub struct Reservation {
    tracker: Arc<QuotaTracker>,
    user_id: String,
    date: NaiveDate,
    settled: bool,
}

impl Drop for Reservation {
    fn drop(&mut self) {
        if self.settled {
            return;
        }

        let user_id = std::mem::take(&mut self.user_id);
        let date = self.date;
        let tracker = self.tracker.clone();
        match Handle::try_current() {
            Ok(handle) => {
                debug!("Releasing abandoned quota slot for user {}", user_id);
                handle.spawn(async move {
                    if let Err(e) = tracker.give_back(&user_id, date).await {
                        error!("Failed to release quota slot for user {}: {:?}", user_id, e);
                    }
                });
            }
            Err(_) => warn!(
                "No runtime to release quota slot for user {}, slot stays charged",
                user_id
            ),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct QuotaExceeded;

pub struct QuotaTracker {
    store: Arc<dyn QuotaStore>,
    clock: Arc<dyn Clock>,
    // Serializes read-modify-write sequences against the store.
    lock: Mutex<()>,
}

impl std::fmt::Debug for QuotaTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuotaTracker").finish_non_exhaustive()
    }
}

impl QuotaTracker {
    pub fn new(store: Arc<dyn QuotaStore>, clock: Arc<dyn Clock>) -> Self {
        QuotaTracker {
            store,
            clock,
            lock: Mutex::new(()),
        }
    }

    async fn load(&self, user_id: &str, today: NaiveDate) -> Result<DailyQuota> {
        Ok(self
            .store
            .get(user_id)
            .await?
            .map(|quota| quota.normalized(today))
            .unwrap_or_else(|| DailyQuota::fresh(today)))
    }

    /// Takes one slot of today's quota, or refuses without touching the count.
    pub async fn check_and_reserve(
        self: &Arc<Self>,
        user_id: &str,
    ) -> Result<std::result::Result<Reservation, QuotaExceeded>> {
        let _guard = self.lock.lock().await;
        let today = self.clock.today();
        let mut quota = self.load(user_id, today).await?;

        if quota.count >= DAILY_LIMIT {
            // Still persist a lazily reset record so the stored date is current.
            self.store.put(user_id, quota).await?;
            info!("User {} reached the daily limit", user_id);
            return Ok(Err(QuotaExceeded));
        }

        quota.count += 1;
        self.store.put(user_id, quota).await?;
        debug!("Reserved quota slot {} for user {}", quota.count, user_id);

        Ok(Ok(Reservation {
            tracker: self.clone(),
            user_id: user_id.to_string(),
            date: today,
            settled: false,
        }))
    }

    /// Confirms a reservation and returns how many exchanges remain today.
    pub async fn commit(&self, mut reservation: Reservation) -> Result<u32> {
        reservation.settled = true;
        let _guard = self.lock.lock().await;
        let quota = self.load(&reservation.user_id, self.clock.today()).await?;
        Ok(DAILY_LIMIT.saturating_sub(quota.count))
    }

    /// Gives the slot back.
    pub async fn release(&self, mut reservation: Reservation) -> Result<()> {
        let released = self.give_back(&reservation.user_id, reservation.date).await;
        reservation.settled = true;
        released
    }

    // A reservation from a previous day has nothing left to undo.
    async fn give_back(&self, user_id: &str, date: NaiveDate) -> Result<()> {
        let _guard = self.lock.lock().await;
        if let Some(mut quota) = self.store.get(user_id).await? {
            if quota.date == date && quota.count > 0 {
                quota.count -= 1;
                self.store.put(user_id, quota).await?;
                debug!("Released quota slot for user {}", user_id);
            }
        }
        Ok(())
    }

    /// Today's record for the user, rewriting a stale one.
    pub async fn snapshot(&self, user_id: &str) -> Result<DailyQuota> {
        let _guard = self.lock.lock().await;
        let today = self.clock.today();
        let stored = self.store.get(user_id).await?;
        let quota = stored
            .map(|quota| quota.normalized(today))
            .unwrap_or_else(|| DailyQuota::fresh(today));
        if stored != Some(quota) {
            self.store.put(user_id, quota).await?;
        }
        Ok(quota)
    }

    /// Today's record for the user without writing anything back.
    pub async fn peek(&self, user_id: &str) -> Result<DailyQuota> {
        self.load(user_id, self.clock.today()).await
    }

    pub async fn remaining(&self, user_id: &str) -> Result<u32> {
        let quota = self.snapshot(user_id).await?;
        Ok(DAILY_LIMIT.saturating_sub(quota.count))
    }

    pub async fn reset(&self, user_id: &str) -> Result<()> {
        let _guard = self.lock.lock().await;
        self.store
            .put(user_id, DailyQuota::fresh(self.clock.today()))
            .await
    }

    pub async fn remove(&self, user_id: &str) -> Result<()> {
        let _guard = self.lock.lock().await;
        self.store.remove(user_id).await
    }

    /// Number of users with at least one exchange counted today.
    pub async fn active_today(&self) -> Result<usize> {
        let today = self.clock.today();
        Ok(self
            .store
            .all()
            .await?
            .iter()
            .filter(|(_, quota)| quota.is_active_on(today))
            .count())
    }
}
