use crate::database::models::{CHECKIN_HOURS_KEY, GEOFENCE_KEY, GeoFence};
use crate::database::repositories::SettingRepository;
use crate::error::AppError;

pub const DEFAULT_CHECKIN_HOURS: f64 = 8.0;

/// Typed access to the key/value settings table.
#[derive(Clone)]
pub struct SettingsService {
    settings: SettingRepository,
}

impl SettingsService {
    pub fn new(settings: SettingRepository) -> Self {
        Self { settings }
    }

    pub async fn geofence(&self) -> Result<Option<GeoFence>, AppError> {
        let Some(setting) = self.settings.get(GEOFENCE_KEY).await? else {
            return Ok(None);
        };

        match setting.value.parse::<GeoFence>() {
            Ok(fence) => Ok(Some(fence)),
            Err(err) => {
                log::warn!("Ignoring stored geofence: {}", err);
                Ok(None)
            }
        }
    }

    pub async fn set_geofence(&self, fence: GeoFence) -> Result<GeoFence, AppError> {
        self.settings.set(GEOFENCE_KEY, &fence.to_string()).await?;
        log::info!("Check-in geofence set to {}", fence);
        Ok(fence)
    }

    pub async fn clear_geofence(&self) -> Result<bool, AppError> {
        Ok(self.settings.delete(GEOFENCE_KEY).await?)
    }

    pub async fn checkin_hours(&self) -> Result<f64, AppError> {
        let stored = self.settings.get(CHECKIN_HOURS_KEY).await?;
        Ok(stored
            .and_then(|s| s.value.parse::<f64>().ok())
            .filter(|h| *h > 0.0 && *h <= 24.0)
            .unwrap_or(DEFAULT_CHECKIN_HOURS))
    }

    pub async fn set_checkin_hours(&self, hours: f64) -> Result<f64, AppError> {
        if !hours.is_finite() || hours <= 0.0 || hours > 24.0 {
            return Err(AppError::validation("Hours must be between 0 and 24"));
        }
        self.settings
            .set(CHECKIN_HOURS_KEY, &hours.to_string())
            .await?;
        Ok(hours)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestDb;

    #[tokio::test]
    async fn defaults_apply_until_configured() {
        let db = TestDb::new().await.unwrap();
        let service = SettingsService::new(SettingRepository::new(db.pool.clone()));

        assert_eq!(service.checkin_hours().await.unwrap(), DEFAULT_CHECKIN_HOURS);
        assert!(service.geofence().await.unwrap().is_none());

        service.set_checkin_hours(10.0).await.unwrap();
        let fence = GeoFence::new(41.3, 69.2, 300.0).unwrap();
        service.set_geofence(fence).await.unwrap();

        assert_eq!(service.checkin_hours().await.unwrap(), 10.0);
        assert_eq!(service.geofence().await.unwrap(), Some(fence));
        assert!(service.set_checkin_hours(30.0).await.is_err());

        assert!(service.clear_geofence().await.unwrap());
        assert!(service.geofence().await.unwrap().is_none());
    }
}
