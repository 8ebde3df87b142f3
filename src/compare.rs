use std::fmt;

use crate::three_phase::ResultSet;

/// Decimal places used for voltage magnitudes in the rendered report.
pub const REPORT_PRECISION: usize = 7;

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonRow {
    pub bus: String,
    /// Phase A magnitude from the first result set.
    pub vm_a: f64,
    /// Phase A magnitude from the second result set, zero if it has no
    /// entry for the bus.
    pub vm_b: f64,
    /// `|vm_a - vm_b|`
    pub diff: f64,
    /// False when `vm_b` is the zero stand-in for a missing bus.
    pub has_reference: bool,
}

/// Row-by-row comparison of two result sets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComparisonReport {
    pub rows: Vec<ComparisonRow>,
}

impl ComparisonReport {
    /// Largest absolute difference over all rows.
    pub fn max_diff(&self) -> Option<f64> {
        self.rows.iter().map(|r| r.diff).reduce(f64::max)
    }

    /// Ids of buses with no entry in the second result set.
    pub fn missing(&self) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .filter(|r| !r.has_reference)
            .map(|r| r.bus.as_str())
    }
}

/// Compares the phase A voltage magnitudes of two result sets.
///
/// Rows follow the bus order of `a`. A bus that `b` does not contain is
/// compared against zero, so its difference equals its own magnitude.
/// Buses only present in `b` are ignored.
pub fn compare(a: &ResultSet, b: &ResultSet) -> ComparisonReport {
    let rows = a
        .iter()
        .map(|bv| {
            let vm_a = bv.vm_a().abs();
            let reference = b.get(&bv.bus);
            let vm_b = reference.map(|r| r.vm_a().abs()).unwrap_or(0.0);
            ComparisonRow {
                bus: bv.bus.clone(),
                vm_a,
                vm_b,
                diff: (vm_a - vm_b).abs(),
                has_reference: reference.is_some(),
            }
        })
        .collect();
    ComparisonReport { rows }
}

impl fmt::Display for ComparisonReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Comparison of Power Flow Results ---")?;
        write!(
            f,
            "{:<10} {:<25} {:<25} {:<15}",
            "Bus", "Manual Voltage (pu)", "Reference Voltage (pu)", "Difference"
        )?;
        for r in &self.rows {
            write!(
                f,
                "\n{:<10} {:<25.p$} {:<25.p$} {:<15.p$}",
                r.bus,
                r.vm_a,
                r.vm_b,
                r.diff,
                p = REPORT_PRECISION
            )?;
        }
        Ok(())
    }
}
