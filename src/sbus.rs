use std::fmt;

use serde::Serialize;

use crate::network::{bus_index, Bus, Gen, Load};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ElementKind {
    Load,
    Generator,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementKind::Load => write!(f, "load"),
            ElementKind::Generator => write!(f, "generator"),
        }
    }
}

/// A load or generator left out of the injection vectors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedElement {
    pub kind: ElementKind,
    /// Element name, empty if the element is unnamed.
    pub name: String,
    /// Bus id the element referenced.
    pub bus: String,
    pub reason: String,
}

impl fmt::Display for SkippedElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} '{}' skipped (bus '{}'): {}",
            self.kind, self.name, self.bus, self.reason
        )
    }
}

/// Net bus power injections (generation - load), one entry per bus ordinal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SBus {
    /// Real power injection.
    pub p: Vec<f64>,
    /// Reactive power injection.
    pub q: Vec<f64>,
    /// Elements whose bus could not be resolved.
    pub warnings: Vec<SkippedElement>,
}

/// Builds the vectors of net bus power injections.
///
/// Load powers are subtracted and generator powers added at the element's
/// bus, after dividing by `base`. Elements that reference a bus not in
/// `bus` are excluded and reported in `warnings` instead of failing.
pub fn make_sbus(base: f64, bus: &[Bus], load: &[Load], gen: &[Gen]) -> SBus {
    let nb = bus.len();
    let index = bus_index(bus);

    let mut s_bus = SBus {
        p: vec![0.0; nb],
        q: vec![0.0; nb],
        warnings: Vec::new(),
    };

    let elements = load
        .iter()
        .map(|ld| (ElementKind::Load, &ld.name, &ld.bus, -ld.p, -ld.q))
        .chain(
            gen.iter()
                .map(|g| (ElementKind::Generator, &g.name, &g.bus, g.p, g.q)),
        );

    for (kind, name, bus_id, p, q) in elements {
        match index.get(bus_id.as_str()) {
            Some(&i) => {
                s_bus.p[i] += p / base;
                s_bus.q[i] += q / base;
            }
            None => {
                let skipped = SkippedElement {
                    kind,
                    name: name.clone(),
                    bus: bus_id.clone(),
                    reason: "bus not found in network".to_string(),
                };
                log::warn!("{}", skipped);
                s_bus.warnings.push(skipped);
            }
        }
    }

    s_bus
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_loads_and_gens() {
        let bus = vec![Bus::new("a"), Bus::new("b")];
        let load = vec![Load::new("l1", "b", 10.0, 5.0), Load::new("l2", "b", 2.0, 1.0)];
        let gen = vec![Gen::new("g1", "a", 30.0, 4.0), Gen::new("g2", "b", 3.0, 0.0)];

        let s = make_sbus(1000.0, &bus, &load, &gen);

        assert!(s.warnings.is_empty());
        assert_relative_eq!(s.p[0], 0.030, epsilon = 1e-15);
        assert_relative_eq!(s.q[0], 0.004, epsilon = 1e-15);
        assert_relative_eq!(s.p[1], -0.009, epsilon = 1e-15);
        assert_relative_eq!(s.q[1], -0.006, epsilon = 1e-15);
    }

    #[test]
    fn test_base_scales_injections() {
        let bus = vec![Bus::new("a")];
        let load = vec![Load::new("l", "a", 10.0, 5.0)];

        let s = make_sbus(1.0, &bus, &load, &[]);
        assert_eq!(s.p, vec![-10.0]);
        assert_eq!(s.q, vec![-5.0]);
    }

    #[test]
    fn test_unknown_bus_skipped() {
        let bus = vec![Bus::new("a")];
        let load = vec![Load::new("ghost", "nowhere", 10.0, 5.0)];
        let gen = vec![Gen::new("g", "elsewhere", 1.0, 1.0)];

        let s = make_sbus(1000.0, &bus, &load, &gen);

        assert_eq!(s.p, vec![0.0]);
        assert_eq!(s.q, vec![0.0]);
        assert_eq!(s.warnings.len(), 2);
        assert_eq!(s.warnings[0].kind, ElementKind::Load);
        assert_eq!(s.warnings[0].name, "ghost");
        assert_eq!(s.warnings[0].bus, "nowhere");
        assert_eq!(s.warnings[1].kind, ElementKind::Generator);
    }
}
