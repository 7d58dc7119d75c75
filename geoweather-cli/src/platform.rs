//! Desktop bindings for the location and permission capabilities.
//!
//! Desktops rarely expose a positioning service, so the "location service"
//! is a fixed position from the `[location]` config section and the
//! permission prompt is an interactive confirmation.

use async_trait::async_trait;
use geoweather_core::{
    Coordinates, LocationError, LocationPriority, LocationService, Permission,
    PermissionNegotiator, PermissionPolicy, PermissionReport, config::LocationConfig,
};
use inquire::Confirm;

#[derive(Debug, Clone)]
pub struct ConfiguredLocation {
    enabled: bool,
    coordinates: Option<Coordinates>,
}

impl ConfiguredLocation {
    pub fn from_config(config: &LocationConfig) -> Self {
        Self { enabled: config.enabled, coordinates: config.coordinates() }
    }
}

#[async_trait]
impl LocationService for ConfiguredLocation {
    fn is_location_service_enabled(&self) -> bool {
        self.enabled && self.coordinates.is_some_and(|c| c.is_valid())
    }

    async fn request_current_location(
        &self,
        _priority: LocationPriority,
    ) -> Result<Coordinates, LocationError> {
        self.coordinates.ok_or(LocationError::ServiceUnavailable)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PromptPermissions {
    policy: PermissionPolicy,
}

impl PromptPermissions {
    pub fn new(policy: PermissionPolicy) -> Self {
        Self { policy }
    }
}

#[async_trait]
impl PermissionNegotiator for PromptPermissions {
    async fn request_permissions(&self, required: &[Permission]) -> PermissionReport {
        match self.policy {
            PermissionPolicy::Allow => PermissionReport::all_granted(required),
            PermissionPolicy::Deny => PermissionReport {
                permanently_denied: required.to_vec(),
                ..PermissionReport::default()
            },
            PermissionPolicy::Prompt => {
                let answer = tokio::task::spawn_blocking(|| {
                    Confirm::new("Allow geoweather to use your configured location?")
                        .with_default(true)
                        .prompt()
                })
                .await;

                match answer {
                    Ok(Ok(true)) => PermissionReport::all_granted(required),
                    Ok(Ok(false)) => denied(required),
                    Ok(Err(e)) => {
                        tracing::warn!(error = %e, "permission prompt unavailable");
                        denied(required)
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "permission prompt task failed");
                        denied(required)
                    }
                }
            }
        }
    }
}

fn denied(required: &[Permission]) -> PermissionReport {
    PermissionReport { denied: required.to_vec(), ..PermissionReport::default() }
}
