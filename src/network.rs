use std::collections::HashMap;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{PfError, Result};

/// NetworkModel is a normalized single-phase description of a power system:
/// an ordered set of buses joined by series-impedance lines, with loads and
/// generators attached to buses by id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkModel {
    /// Network nodes. Position in this vector is the bus ordinal used to
    /// index the admittance matrix and the voltage vector.
    pub bus: Vec<Bus>,

    /// Lines/cables between pairs of buses.
    #[serde(default)]
    pub line: Vec<Line>,

    #[serde(default)]
    pub load: Vec<Load>,

    #[serde(default, rename = "generator")]
    pub gen: Vec<Gen>,

    /// Ordinal of the bus held at its initial voltage. `None` means every
    /// bus is iterated.
    #[serde(default)]
    pub slack_bus: Option<usize>,
}

/// Bus is a node in the network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bus {
    /// Unique bus identifier.
    pub id: String,

    /// Initial voltage estimate as (magnitude p.u., angle degrees).
    #[serde(default)]
    pub v0: Option<(f64, f64)>,
}

impl Bus {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            v0: None,
        }
    }

    pub fn with_voltage(id: impl Into<String>, vm: f64, va: f64) -> Self {
        Self {
            id: id.into(),
            v0: Some((vm, va)),
        }
    }

    /// Initial complex voltage, flat 1.0∠0° if no estimate is known.
    pub fn v_init(&self) -> Complex64 {
        let (vm, va) = self.v0.unwrap_or((1.0, 0.0));
        Complex64::from_polar(vm, va.to_radians())
    }
}

/// Line is a series impedance between two buses. Line charging and
/// other shunt terms are not modelled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    #[serde(default)]
    pub name: String,

    /// "From" bus id.
    pub from: String,
    /// "To" bus id.
    pub to: String,

    /// Series impedance (ohms).
    pub z: Complex64,
}

impl Line {
    pub fn new(
        name: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
        z: Complex64,
    ) -> Self {
        Self {
            name: name.into(),
            from: from.into(),
            to: to.into(),
            z,
        }
    }
}

/// Load is a constant power demand at a bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Load {
    #[serde(default)]
    pub name: String,

    pub bus: String,

    /// Real power demand (kW).
    pub p: f64,

    /// Reactive power demand (kVAr).
    pub q: f64,
}

impl Load {
    pub fn new(name: impl Into<String>, bus: impl Into<String>, p: f64, q: f64) -> Self {
        Self {
            name: name.into(),
            bus: bus.into(),
            p,
            q,
        }
    }
}

/// Gen is a constant power injection at a bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gen {
    #[serde(default)]
    pub name: String,

    pub bus: String,

    /// Real power output (kW).
    pub p: f64,

    /// Reactive power output (kVAr).
    pub q: f64,
}

impl Gen {
    pub fn new(name: impl Into<String>, bus: impl Into<String>, p: f64, q: f64) -> Self {
        Self {
            name: name.into(),
            bus: bus.into(),
            p,
            q,
        }
    }
}

impl NetworkModel {
    /// Returns the bus id to ordinal mapping.
    pub fn bus_index(&self) -> HashMap<&str, usize> {
        bus_index(&self.bus)
    }

    pub fn nb(&self) -> usize {
        self.bus.len()
    }

    /// Initial voltage vector in ordinal order.
    pub fn v0(&self) -> Vec<Complex64> {
        self.bus.iter().map(|b| b.v_init()).collect()
    }

    /// Checks bus id uniqueness and the slack ordinal range.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashMap::with_capacity(self.bus.len());
        for (i, b) in self.bus.iter().enumerate() {
            if seen.insert(b.id.as_str(), i).is_some() {
                return Err(PfError::DuplicateBus { bus: b.id.clone() });
            }
        }
        if let Some(index) = self.slack_bus {
            if index >= self.bus.len() {
                return Err(PfError::InvalidSlack {
                    index,
                    nb: self.bus.len(),
                });
            }
        }
        Ok(())
    }

    /// Strips phase suffixes from every bus reference in the model.
    pub fn normalize_names(&mut self) {
        fn strip(s: &mut String) {
            let n = bus_name(s).len();
            s.truncate(n);
        }
        self.bus.iter_mut().for_each(|b| strip(&mut b.id));
        for ln in self.line.iter_mut() {
            strip(&mut ln.from);
            strip(&mut ln.to);
        }
        self.load.iter_mut().for_each(|ld| strip(&mut ld.bus));
        self.gen.iter_mut().for_each(|g| strip(&mut g.bus));
    }
}

pub(crate) fn bus_index(bus: &[Bus]) -> HashMap<&str, usize> {
    bus.iter()
        .enumerate()
        .map(|(i, b)| (b.id.as_str(), i))
        .collect()
}

/// Returns the bus part of a terminal reference, dropping any
/// `.phase` node suffixes (`"634.1.2.3"` -> `"634"`).
pub fn bus_name(terminal: &str) -> &str {
    terminal.split('.').next().unwrap_or(terminal)
}
