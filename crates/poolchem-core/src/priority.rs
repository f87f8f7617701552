//! Priority ordering of recommendations.

use poolchem_types::DosingRecommendation;

/// Sort recommendations most urgent first.
///
/// The sort is stable: recommendations of equal priority keep the order the
/// rules produced them in.
pub fn sort_by_priority(recommendations: &mut [DosingRecommendation]) {
    recommendations.sort_by_key(|rec| rec.priority.rank());
}
