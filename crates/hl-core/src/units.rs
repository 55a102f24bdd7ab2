//! SI quantities used by the compression-system network.
//!
//! Every quantity is a `uom` `f64` type stored in base SI units, so `.value`
//! is always Pa, K, kg/s, m^2, m/s, kg/m^3, W, N or m^3/s.

pub use uom::si::f64::{
    Area, Force, MassDensity as Density, MassRate, Power, Pressure,
    ThermodynamicTemperature as Temperature, Velocity, VolumeRate,
};

/// Specific enthalpy [J/kg]
pub type SpecEnthalpy = f64;
/// Specific entropy [J/(kg·K)]
pub type SpecEntropy = f64;

macro_rules! si_constructor {
    ($(#[$doc:meta])* $fn_name:ident -> $ty:ident, $module:ident :: $unit:ident) => {
        $(#[$doc])*
        #[inline]
        pub fn $fn_name(v: f64) -> $ty {
            $ty::new::<uom::si::$module::$unit>(v)
        }
    };
}

si_constructor!(
    /// Pascals.
    pa -> Pressure, pressure::pascal
);
si_constructor!(
    /// Kelvin.
    k -> Temperature, thermodynamic_temperature::kelvin
);
si_constructor!(kgps -> MassRate, mass_rate::kilogram_per_second);
si_constructor!(m2 -> Area, area::square_meter);
si_constructor!(mps -> Velocity, velocity::meter_per_second);
si_constructor!(kgpm3 -> Density, mass_density::kilogram_per_cubic_meter);
si_constructor!(watts -> Power, power::watt);
si_constructor!(newtons -> Force, force::newton);
si_constructor!(m3ps -> VolumeRate, volume_rate::cubic_meter_per_second);

pub mod constants {
    /// Universal gas constant [J/(kmol·K)]
    pub const R_UNIVERSAL: f64 = 8_314.462_618;

    /// Standard-state pressure for tabulated entropies [Pa]
    pub const P_REF_PA: f64 = 100_000.0;

    pub const FT3_PER_M3: f64 = 35.314_666_721_488_59;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_store_base_units() {
        assert_eq!(pa(99.0).value, 99.0);
        assert_eq!(k(292.6).value, 292.6);
        assert_eq!(watts(1.5e5).value, 1.5e5);
        assert_eq!(m3ps(0.25).value, 0.25);
    }

    #[test]
    fn mass_flux_times_area_is_mass_rate() {
        let w: MassRate = kgpm3(1.2e-3) * mps(170.0) * m2(2.0);
        assert!((w.value - 0.408).abs() < 1e-12);
        let f: Force = kgps(0.4) * mps(171.5);
        assert!((f.value - 68.6).abs() < 1e-12);
    }
}
