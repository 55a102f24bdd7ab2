//! Chemical species definitions and their ideal-gas thermo data.

/// Dry-air constituents carried through the compression system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Species {
    /// Nitrogen (N₂)
    N2,
    /// Oxygen (O₂)
    O2,
    /// Argon (Ar)
    Ar,
    /// Carbon dioxide (CO₂)
    CO2,
}

/// NASA 7-coefficient polynomial fit, two temperature ranges.
///
/// With `a = [a1..a7]` for the active range:
/// - `cp/R  = a1 + a2 T + a3 T² + a4 T³ + a5 T⁴`
/// - `h/RT  = a1 + a2 T/2 + a3 T²/3 + a4 T³/4 + a5 T⁴/5 + a6/T`
/// - `s°/R  = a1 ln T + a2 T + a3 T²/2 + a4 T³/3 + a5 T⁴/4 + a7`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NasaPolynomial {
    pub t_mid: f64,
    pub low: [f64; 7],
    pub high: [f64; 7],
}

impl NasaPolynomial {
    fn coeffs(&self, t: f64) -> &[f64; 7] {
        if t > self.t_mid { &self.high } else { &self.low }
    }

    /// Dimensionless heat capacity cp/R.
    pub fn cp_r(&self, t: f64) -> f64 {
        let a = self.coeffs(t);
        a[0] + t * (a[1] + t * (a[2] + t * (a[3] + t * a[4])))
    }

    /// Dimensionless enthalpy h/(RT).
    pub fn h_rt(&self, t: f64) -> f64 {
        let a = self.coeffs(t);
        a[0] + t * (a[1] / 2.0 + t * (a[2] / 3.0 + t * (a[3] / 4.0 + t * a[4] / 5.0)))
            + a[5] / t
    }

    /// Dimensionless standard-state entropy s°/R.
    pub fn s_r(&self, t: f64) -> f64 {
        let a = self.coeffs(t);
        a[0] * t.ln() + t * (a[1] + t * (a[2] / 2.0 + t * (a[3] / 3.0 + t * a[4] / 4.0))) + a[6]
    }
}

const N2_NASA: NasaPolynomial = NasaPolynomial {
    t_mid: 1000.0,
    low: [
        3.298_677,
        1.408_240_4e-3,
        -3.963_222e-6,
        5.641_515e-9,
        -2.444_854e-12,
        -1_020.899_9,
        3.950_372,
    ],
    high: [
        2.926_64,
        1.487_976_8e-3,
        -5.684_76e-7,
        1.009_703_8e-10,
        -6.753_351e-15,
        -922.797_7,
        5.980_528,
    ],
};

const O2_NASA: NasaPolynomial = NasaPolynomial {
    t_mid: 1000.0,
    low: [
        3.782_456_36,
        -2.996_734_16e-3,
        9.847_302_01e-6,
        -9.681_295_09e-9,
        3.243_728_37e-12,
        -1_063.943_56,
        3.657_675_73,
    ],
    high: [
        3.282_537_84,
        1.483_087_54e-3,
        -7.579_666_69e-7,
        2.094_705_55e-10,
        -2.167_177_94e-14,
        -1_088.457_72,
        5.453_231_29,
    ],
};

const AR_NASA: NasaPolynomial = NasaPolynomial {
    t_mid: 1000.0,
    low: [2.5, 0.0, 0.0, 0.0, 0.0, -745.375, 4.366],
    high: [2.5, 0.0, 0.0, 0.0, 0.0, -745.375, 4.366],
};

const CO2_NASA: NasaPolynomial = NasaPolynomial {
    t_mid: 1000.0,
    low: [
        2.356_773_52,
        8.984_596_77e-3,
        -7.123_562_69e-6,
        2.459_190_22e-9,
        -1.436_995_48e-13,
        -48_371.969_7,
        9.901_052_22,
    ],
    high: [
        3.857_460_29,
        4.414_370_26e-3,
        -2.214_814_04e-6,
        5.234_901_88e-10,
        -4.720_841_64e-14,
        -48_759.166,
        2.271_638_06,
    ],
};

impl Species {
    pub const ALL: [Species; 4] = [Species::N2, Species::O2, Species::Ar, Species::CO2];

    pub fn key(&self) -> &'static str {
        match self {
            Species::N2 => "N2",
            Species::O2 => "O2",
            Species::Ar => "Ar",
            Species::CO2 => "CO2",
        }
    }

    /// Get human-readable name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Species::N2 => "Nitrogen",
            Species::O2 => "Oxygen",
            Species::Ar => "Argon",
            Species::CO2 => "Carbon Dioxide",
        }
    }

    /// Get molar mass [kg/kmol] for this species.
    pub fn molar_mass(&self) -> f64 {
        match self {
            Species::N2 => 28.014,
            Species::O2 => 31.999,
            Species::Ar => 39.948,
            Species::CO2 => 44.010,
        }
    }

    /// Ideal-gas thermo fit for this species.
    pub fn nasa(&self) -> &'static NasaPolynomial {
        match self {
            Species::N2 => &N2_NASA,
            Species::O2 => &O2_NASA,
            Species::Ar => &AR_NASA,
            Species::CO2 => &CO2_NASA,
        }
    }
}

impl std::str::FromStr for Species {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "N2" | "NITROGEN" => Ok(Species::N2),
            "O2" | "OXYGEN" => Ok(Species::O2),
            "AR" | "ARGON" => Ok(Species::Ar),
            "CO2" | "CARBONDIOXIDE" | "CARBON DIOXIDE" => Ok(Species::CO2),
            _ => Err("unknown species"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_key_roundtrip() {
        for species in Species::ALL {
            let parsed = species.key().parse::<Species>().unwrap();
            assert_eq!(parsed, species);
        }
        assert!("Xenon".parse::<Species>().is_err());
    }

    #[test]
    fn polynomials_are_continuous_at_t_mid() {
        for species in Species::ALL {
            let fit = species.nasa();
            let below = fit.t_mid - 1e-9;
            let above = fit.t_mid + 1e-9;
            assert!((fit.cp_r(below) - fit.cp_r(above)).abs() < 5e-3, "{species:?} cp");
            assert!((fit.h_rt(below) - fit.h_rt(above)).abs() < 5e-3, "{species:?} h");
            assert!((fit.s_r(below) - fit.s_r(above)).abs() < 5e-3, "{species:?} s");
        }
    }

    #[test]
    fn nitrogen_cp_near_room_temperature() {
        // cp of N2 at 300 K is about 1040 J/(kg K)
        let cp = Species::N2.nasa().cp_r(300.0) * 8_314.462_618 / Species::N2.molar_mass();
        assert!((cp - 1040.0).abs() < 5.0, "cp = {cp}");
    }

    #[test]
    fn argon_is_monatomic() {
        assert_eq!(Species::Ar.nasa().cp_r(250.0), 2.5);
        assert_eq!(Species::Ar.nasa().cp_r(2500.0), 2.5);
    }
}
