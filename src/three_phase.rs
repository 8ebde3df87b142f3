use std::collections::HashMap;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::network::Bus;

/// Per-phase voltages of one bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusVoltages {
    pub bus: String,

    /// Magnitude and angle (degrees) of phases A, B and C, interleaved:
    /// `[|Va|, ∠Va, |Vb|, ∠Vb, |Vc|, ∠Vc]`.
    pub vmag_angle: [f64; 6],
}

impl BusVoltages {
    /// Phase A voltage magnitude.
    pub fn vm_a(&self) -> f64 {
        self.vmag_angle[0]
    }

    pub fn va_a(&self) -> f64 {
        self.vmag_angle[1]
    }
}

/// Bus voltage results in bus order, with lookup by bus id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<BusVoltages>", into = "Vec<BusVoltages>")]
pub struct ResultSet {
    entries: Vec<BusVoltages>,
    index: HashMap<String, usize>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the voltages of a bus. A bus already present is replaced
    /// in place so ids stay unique and keep their first position.
    pub fn insert(&mut self, bus: impl Into<String>, vmag_angle: [f64; 6]) {
        let bus = bus.into();
        match self.index.get(&bus) {
            Some(&i) => self.entries[i].vmag_angle = vmag_angle,
            None => {
                self.index.insert(bus.clone(), self.entries.len());
                self.entries.push(BusVoltages { bus, vmag_angle });
            }
        }
    }

    pub fn get(&self, bus: &str) -> Option<&BusVoltages> {
        self.index.get(bus).map(|&i| &self.entries[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &BusVoltages> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Vec<BusVoltages>> for ResultSet {
    fn from(entries: Vec<BusVoltages>) -> Self {
        entries
            .into_iter()
            .map(|bv| (bv.bus, bv.vmag_angle))
            .collect()
    }
}

impl From<ResultSet> for Vec<BusVoltages> {
    fn from(rs: ResultSet) -> Self {
        rs.entries
    }
}

impl FromIterator<(String, [f64; 6])> for ResultSet {
    fn from_iter<I: IntoIterator<Item = (String, [f64; 6])>>(iter: I) -> Self {
        let mut rs = ResultSet::new();
        for (bus, vmag_angle) in iter {
            rs.insert(bus, vmag_angle);
        }
        rs
    }
}

/// Expands single-phase bus voltages into balanced three-phase results.
///
/// Phase A takes the solved voltage; phases B and C repeat its magnitude
/// with the angle shifted by -120° and +120°. Angles are not wrapped.
pub fn synthesize(v: &[Complex64], bus: &[Bus]) -> ResultSet {
    assert_eq!(v.len(), bus.len());

    bus.iter()
        .zip(v)
        .map(|(b, v)| {
            let vm = v.norm();
            let va = v.arg().to_degrees();
            (b.id.clone(), [vm, va, vm, va - 120.0, vm, va + 120.0])
        })
        .collect()
}
