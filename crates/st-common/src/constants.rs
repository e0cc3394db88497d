//! Physical constants for orbit-derived quantities.
//!
//! Passed explicitly into feature derivation and orbit analysis so every
//! altitude and period in a run is computed from the same values.

use serde::{Deserialize, Serialize};

/// Mean Earth radius (km).
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Newtonian gravitational constant in km³·kg⁻¹·s⁻².
pub const GRAVITATIONAL_CONSTANT: f64 = 6.67430e-20;

/// Earth mass (kg).
pub const EARTH_MASS_KG: f64 = 5.972e24;

/// Constants used by the Kepler period and altitude formulas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicalConstants {
    pub earth_radius_km: f64,
    pub gravitational_constant: f64,
    pub earth_mass_kg: f64,
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self {
            earth_radius_km: EARTH_RADIUS_KM,
            gravitational_constant: GRAVITATIONAL_CONSTANT,
            earth_mass_kg: EARTH_MASS_KG,
        }
    }
}

impl PhysicalConstants {
    /// Standard gravitational parameter μ = G·M (km³/s²).
    pub fn mu(&self) -> f64 {
        self.gravitational_constant * self.earth_mass_kg
    }

    /// Altitude above the mean Earth surface for semi-major axis `a` (km).
    pub fn altitude_km(&self, a: f64) -> f64 {
        a - self.earth_radius_km
    }

    /// Orbital period in seconds from Kepler's third law.
    ///
    /// Returns `None` for a non-positive or non-finite semi-major axis.
    pub fn orbit_period_secs(&self, a: f64) -> Option<f64> {
        if !a.is_finite() || a <= 0.0 {
            return None;
        }
        Some(2.0 * std::f64::consts::PI * (a.powi(3) / self.mu()).sqrt())
    }
}
