//! In-process record store.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{UserStore, WeatherStore};
use crate::error::StorageError;
use crate::models::{Insight, NewInsight, NewReading, NewUser, User, UserChanges, WeatherReading};

// ---

/// Volatile in-process store.
///
/// Collections are kept in insertion order; reads reverse them to get
/// newest-first. Everything is lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
    unavailable: AtomicBool,
}

#[derive(Default)]
struct Inner {
    readings: Vec<WeatherReading>,
    insights: Vec<Insight>,
    users: Vec<User>,
    next_id: i64,
    last_created: Option<DateTime<Utc>>,
}

impl Inner {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    /// Creation stamps never go backwards, even if the wall clock does.
    fn stamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let ts = match self.last_created {
            Some(last) if last > now => last,
            _ => now,
        };
        self.last_created = Some(ts);
        ts
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with [`StorageError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("memory store switched off".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl WeatherStore for MemoryStore {
    async fn insert_reading(&self, reading: &NewReading) -> Result<WeatherReading, StorageError> {
        // ---
        self.check()?;
        let mut inner = self.inner.write().await;

        let stored = WeatherReading {
            id: inner.next_id(),
            temperature: reading.temperature,
            humidity: reading.humidity,
            wind_speed: reading.wind_speed,
            condition: reading.condition.clone(),
            location: reading.location.clone(),
            latitude: reading.latitude,
            longitude: reading.longitude,
            observed_at: reading.observed_at.clone(),
            created_at: inner.stamp(),
        };
        inner.readings.push(stored.clone());
        Ok(stored)
    }

    async fn recent_readings(&self, limit: usize) -> Result<Vec<WeatherReading>, StorageError> {
        // ---
        self.check()?;
        let inner = self.inner.read().await;
        Ok(inner.readings.iter().rev().take(limit).cloned().collect())
    }

    async fn insights(&self) -> Result<Vec<Insight>, StorageError> {
        // ---
        self.check()?;
        let inner = self.inner.read().await;
        Ok(inner.insights.iter().rev().cloned().collect())
    }

    async fn replace_insights(
        &self,
        insights: &[NewInsight],
    ) -> Result<Vec<Insight>, StorageError> {
        // ---
        self.check()?;
        // Held across clear and insert, so readers never see a partial set.
        let mut inner = self.inner.write().await;
        inner.insights.clear();

        let created_at = inner.stamp();
        for insight in insights {
            let id = inner.next_id();
            inner.insights.push(Insight {
                id,
                kind: insight.kind.clone(),
                message: insight.message.clone(),
                severity: insight.severity,
                created_at,
            });
        }
        Ok(inner.insights.iter().rev().cloned().collect())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn count_users(&self) -> Result<i64, StorageError> {
        self.check()?;
        Ok(self.inner.read().await.users.len() as i64)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StorageError> {
        // ---
        self.check()?;
        let inner = self.inner.read().await;
        Ok(inner.users.iter().find(|u| u.email == email).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, StorageError> {
        self.check()?;
        Ok(self.inner.read().await.users.clone())
    }

    async fn insert_user(&self, user: &NewUser) -> Result<User, StorageError> {
        // ---
        self.check()?;
        let mut inner = self.inner.write().await;
        if inner.users.iter().any(|u| u.email == user.email) {
            return Err(StorageError::Duplicate(format!("email {}", user.email)));
        }

        let now = inner.stamp();
        let stored = User {
            id: Uuid::new_v4(),
            name: user.name.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            created_at: now,
            updated_at: now,
        };
        inner.users.push(stored.clone());
        Ok(stored)
    }

    async fn update_user(
        &self,
        id: Uuid,
        changes: &UserChanges,
    ) -> Result<Option<User>, StorageError> {
        // ---
        self.check()?;
        let mut inner = self.inner.write().await;
        if inner.users.iter().any(|u| u.id != id && u.email == changes.email) {
            return Err(StorageError::Duplicate(format!("email {}", changes.email)));
        }

        let now = inner.stamp();
        let Some(user) = inner.users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        user.name = changes.name.clone();
        user.email = changes.email.clone();
        if let Some(hash) = &changes.password_hash {
            user.password_hash = hash.clone();
        }
        user.updated_at = now;
        Ok(Some(user.clone()))
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, StorageError> {
        // ---
        self.check()?;
        let mut inner = self.inner.write().await;
        let before = inner.users.len();
        inner.users.retain(|u| u.id != id);
        Ok(inner.users.len() != before)
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::models::Severity;

    fn new_reading(temperature: f64) -> NewReading {
        // ---
        NewReading {
            temperature,
            humidity: 50.0,
            wind_speed: 5.0,
            condition: "Clear".to_string(),
            location: "Test".to_string(),
            latitude: None,
            longitude: None,
            observed_at: None,
        }
    }

    #[tokio::test]
    async fn recent_readings_are_newest_first_and_limited() {
        // ---
        let store = MemoryStore::new();
        for t in 0..5 {
            store.insert_reading(&new_reading(t as f64)).await.unwrap();
        }

        let recent = store.recent_readings(3).await.unwrap();
        let temps: Vec<f64> = recent.iter().map(|r| r.temperature).collect();
        assert_eq!(temps, vec![4.0, 3.0, 2.0]);
        assert!(recent.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    }

    #[tokio::test]
    async fn replace_insights_drops_previous_set() {
        // ---
        let store = MemoryStore::new();
        let alert = NewInsight {
            kind: "Heat Alert".to_string(),
            message: "hot".to_string(),
            severity: Severity::Danger,
        };

        store.replace_insights(&[alert.clone(), alert]).await.unwrap();
        assert_eq!(store.insights().await.unwrap().len(), 2);

        store.replace_insights(&[]).await.unwrap();
        assert!(store.insights().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn replace_returns_same_order_as_read() {
        // ---
        let store = MemoryStore::new();
        let heat = NewInsight {
            kind: "Heat Alert".to_string(),
            message: "hot".to_string(),
            severity: Severity::Danger,
        };
        let humid = NewInsight {
            kind: "High Humidity".to_string(),
            message: "humid".to_string(),
            severity: Severity::Warning,
        };

        let returned = store.replace_insights(&[heat, humid]).await.unwrap();
        assert_eq!(returned, store.insights().await.unwrap());
        assert_eq!(returned[0].kind, "High Humidity");
    }

    #[tokio::test]
    async fn unavailable_store_fails_every_call() {
        // ---
        let store = MemoryStore::new();
        store.set_unavailable(true);

        assert!(matches!(
            store.insert_reading(&new_reading(20.0)).await,
            Err(StorageError::Unavailable(_))
        ));
        assert!(store.count_users().await.is_err());

        store.set_unavailable(false);
        assert!(store.recent_readings(10).await.unwrap().is_empty());
    }
}
