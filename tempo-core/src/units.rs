//! Number-density to mass-concentration conversion for satellite columns.

/// Avogadro constant, molecules per mole.
pub const AVOGADRO: f64 = 6.022_140_76e23;

/// Molecular weight of nitrogen dioxide, grams per mole.
pub const NO2_MOLECULAR_WEIGHT: f64 = 46.0055;

/// Convert a number density (molecules/m³) to a mass concentration (µg/m³).
///
/// Non-finite input yields non-finite output; nothing is clamped.
pub fn to_mass_concentration(number_density: f64, molecular_weight_g_per_mol: f64) -> f64 {
    number_density * molecular_weight_g_per_mol / AVOGADRO * 1e6
}

/// [`to_mass_concentration`] for NO₂.
pub fn no2_to_mass_concentration(number_density: f64) -> f64 {
    to_mass_concentration(number_density, NO2_MOLECULAR_WEIGHT)
}
