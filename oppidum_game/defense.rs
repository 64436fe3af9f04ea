use crate::models::village::Village;

/// Derives a village's defensive multiplier from its building levels:
/// the sum of `level × per-level bonus` over every building carrying a
/// defense bonus, as a fraction (0.20 = +20% defender power).
pub fn defensive_bonus(village: &Village) -> f64 {
    village
        .buildings()
        .iter()
        .map(|vb| vb.building.defense_bonus())
        .sum()
}
