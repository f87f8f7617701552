//! Merging explicit request values over a stored reading.

use poolchem_types::{ChemistrySnapshot, Parameter, Reading};

/// Build the snapshot the rules run against.
///
/// Per parameter: the explicit request value if present, else the reading's
/// value if a reading was supplied, else absent. Non-finite explicit values
/// count as absent.
pub fn build_snapshot(overrides: &ChemistrySnapshot, reading: Option<&Reading>) -> ChemistrySnapshot {
    let mut snapshot = ChemistrySnapshot::new();
    for parameter in Parameter::ALL {
        let value = overrides
            .get(parameter)
            .filter(|v| v.is_finite())
            .or_else(|| reading.and_then(|r| r.chemistry.get(parameter)));
        snapshot.set(parameter, value);
    }
    snapshot
}
