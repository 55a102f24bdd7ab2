//! Independent property pairs and the thermodynamic state they fix.

use crate::composition::Composition;
use crate::error::FluidResult;
use crate::model::check;
use hl_core::units::{Pressure, Temperature};

pub use hl_core::units::{SpecEnthalpy, SpecEntropy};

/// Specific heat capacity [J/(kg·K)].
pub type SpecHeatCapacity = f64;

/// A pair of independent properties.
#[derive(Debug, Clone, PartialEq)]
pub enum StateInput {
    PT { p: Pressure, t: Temperature },
    PH { p: Pressure, h: SpecEnthalpy },
    RhoH { rho_kg_m3: f64, h: SpecEnthalpy },
    PS { p: Pressure, s: SpecEntropy },
    HS { h: SpecEnthalpy, s: SpecEntropy },
}

impl StateInput {
    pub fn label(&self) -> &'static str {
        match self {
            Self::PT { .. } => "P-T",
            Self::PH { .. } => "P-h",
            Self::RhoH { .. } => "rho-h",
            Self::PS { .. } => "P-s",
            Self::HS { .. } => "h-s",
        }
    }

    pub fn is_finite(&self) -> bool {
        let (a, b) = match *self {
            Self::PT { p, t } => (p.value, t.value),
            Self::PH { p, h } => (p.value, h),
            Self::RhoH { rho_kg_m3, h } => (rho_kg_m3, h),
            Self::PS { p, s } => (p.value, s),
            Self::HS { h, s } => (h, s),
        };
        a.is_finite() && b.is_finite()
    }
}

/// Pressure, temperature and composition. Everything else is derived by a
/// [`FluidModel`](crate::FluidModel).
#[derive(Debug, Clone, PartialEq)]
pub struct ThermoState {
    p: Pressure,
    t: Temperature,
    comp: Composition,
}

impl ThermoState {
    pub fn from_pt(p: Pressure, t: Temperature, comp: Composition) -> FluidResult<Self> {
        check::positive(p.value, "pressure must be positive and finite")?;
        check::positive(t.value, "temperature must be positive and finite")?;
        Ok(Self { p, t, comp })
    }

    pub fn pressure(&self) -> Pressure {
        self.p
    }

    pub fn temperature(&self) -> Temperature {
        self.t
    }

    pub fn composition(&self) -> &Composition {
        &self.comp
    }
}
