//! Gas mixtures by mole fraction.

use std::collections::BTreeMap;

use crate::error::{FluidError, FluidResult};
use crate::species::Species;

/// Mole fractions below this are dropped after normalization.
const NEGLIGIBLE: f64 = 1e-15;

/// Normalized mole fractions, one entry per species present.
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    fractions: BTreeMap<Species, f64>,
}

impl Composition {
    pub fn pure(species: Species) -> Self {
        Self {
            fractions: BTreeMap::from([(species, 1.0)]),
        }
    }

    /// Standard dry air.
    pub fn air() -> Self {
        Self {
            fractions: BTreeMap::from([
                (Species::N2, 0.780_84),
                (Species::O2, 0.209_476),
                (Species::Ar, 0.009_365),
                (Species::CO2, 0.000_319),
            ]),
        }
    }

    /// Build from unnormalized mole amounts. Repeated species accumulate.
    pub fn new_mole_fractions(amounts: Vec<(Species, f64)>) -> FluidResult<Self> {
        if amounts.is_empty() {
            return Err(FluidError::InvalidArg {
                what: "empty composition",
            });
        }

        let mut fractions = BTreeMap::new();
        for (species, n) in amounts {
            if !n.is_finite() || n < 0.0 {
                return Err(FluidError::NonPhysical {
                    what: "mole fraction must be finite and non-negative",
                });
            }
            *fractions.entry(species).or_insert(0.0) += n;
        }

        let total: f64 = fractions.values().sum();
        if !(total.is_finite() && total > 0.0) {
            return Err(FluidError::NonPhysical {
                what: "mole fractions sum to zero",
            });
        }
        fractions.values_mut().for_each(|x| *x /= total);
        fractions.retain(|_, x| *x > NEGLIGIBLE);

        Ok(Self { fractions })
    }

    /// 0.0 for absent species.
    pub fn mole_fraction(&self, species: Species) -> f64 {
        self.fractions.get(&species).copied().unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Species, f64)> + '_ {
        self.fractions.iter().map(|(s, x)| (*s, *x))
    }

    /// Mixture molar mass [kg/kmol].
    pub fn molar_mass(&self) -> f64 {
        self.iter().map(|(s, x)| x * s.molar_mass()).sum()
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn fractions_sum_to_one(amounts in prop::collection::vec(0.0_f64..10.0_f64, 1..8)) {
            let input: Vec<(Species, f64)> = amounts
                .iter()
                .enumerate()
                .map(|(i, &n)| (Species::ALL[i % Species::ALL.len()], n))
                .collect();

            if let Ok(comp) = Composition::new_mole_fractions(input) {
                let total: f64 = comp.iter().map(|(_, x)| x).sum();
                prop_assert!((total - 1.0).abs() < 1e-9);
                prop_assert!(comp.iter().all(|(_, x)| x > 0.0));
            }
        }
    }
}
