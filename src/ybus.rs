use num_complex::Complex64;

use crate::dense::Mat;
use crate::error::{PfError, Result};
use crate::network::{bus_index, Bus, Line};

/// Nodal admittance matrix, indexed by bus ordinal.
pub type YBus = Mat<Complex64>;

/// Builds the bus admittance matrix.
///
/// Each line contributes its series admittance `y = 1/z` to the diagonal
/// entries of both end buses and `-y` to the two off-diagonal entries
/// between them. Parallel lines accumulate. There are no shunt or line
/// charging terms.
///
/// Every line is resolved before the matrix is allocated, so an error
/// leaves nothing half built.
pub fn make_ybus(bus: &[Bus], line: &[Line]) -> Result<YBus> {
    let nb = bus.len();
    let index = bus_index(bus);

    let mut stamps = Vec::with_capacity(line.len());
    for ln in line {
        let f = *index
            .get(ln.from.as_str())
            .ok_or_else(|| PfError::unknown_bus(&ln.name, &ln.from))?;
        let t = *index
            .get(ln.to.as_str())
            .ok_or_else(|| PfError::unknown_bus(&ln.name, &ln.to))?;

        if ln.z == Complex64::default() {
            return Err(PfError::SingularImpedance {
                line: ln.name.clone(),
                from: ln.from.clone(),
                to: ln.to.clone(),
            });
        }
        let y_s = ln.z.inv(); // series admittance

        stamps.push((f, t, y_s));
    }

    let mut y_bus = YBus::zeros(nb, nb);
    for (f, t, y_s) in stamps {
        y_bus.add_to(f, f, y_s);
        y_bus.add_to(t, t, y_s);
        y_bus.add_to(f, t, -y_s);
        y_bus.add_to(t, f, -y_s);
    }
    Ok(y_bus)
}
