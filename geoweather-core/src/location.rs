//! Location and permission capabilities supplied by the host platform.

use async_trait::async_trait;

use crate::{error::LocationError, model::Coordinates};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LocationPriority {
    #[default]
    HighAccuracy,
    Balanced,
    LowPower,
}

#[async_trait]
pub trait LocationService: Send + Sync {
    /// Whether satellite or network positioning is switched on. Pure query.
    fn is_location_service_enabled(&self) -> bool;

    /// Resolve with the first usable fix. Only called after the service was
    /// reported enabled and permissions were granted.
    async fn request_current_location(
        &self,
        priority: LocationPriority,
    ) -> Result<Coordinates, LocationError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    FineLocation,
    CoarseLocation,
}

impl Permission {
    pub const LOCATION: &'static [Permission] =
        &[Permission::FineLocation, Permission::CoarseLocation];
}

/// Result of asking the platform for a set of permissions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionReport {
    pub granted: Vec<Permission>,
    pub denied: Vec<Permission>,
    pub permanently_denied: Vec<Permission>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionOutcome {
    Granted,
    PermanentlyDenied,
    RationaleNeeded,
}

impl PermissionReport {
    pub fn all_granted(required: &[Permission]) -> Self {
        Self { granted: required.to_vec(), ..Self::default() }
    }

    /// Classify against `required`. A permanent denial wins over anything
    /// else; a permission missing from the report counts as plainly denied.
    pub fn outcome(&self, required: &[Permission]) -> PermissionOutcome {
        if !self.permanently_denied.is_empty() {
            return PermissionOutcome::PermanentlyDenied;
        }
        if required.iter().all(|p| self.granted.contains(p)) {
            PermissionOutcome::Granted
        } else {
            PermissionOutcome::RationaleNeeded
        }
    }

    pub fn state(&self) -> PermissionState {
        PermissionState {
            fine_location_granted: self.granted.contains(&Permission::FineLocation),
            coarse_location_granted: self.granted.contains(&Permission::CoarseLocation),
            permanently_denied: !self.permanently_denied.is_empty(),
        }
    }
}

/// Snapshot of permission state for one attempt. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PermissionState {
    pub fine_location_granted: bool,
    pub coarse_location_granted: bool,
    pub permanently_denied: bool,
}

#[async_trait]
pub trait PermissionNegotiator: Send + Sync {
    async fn request_permissions(&self, required: &[Permission]) -> PermissionReport;
}
