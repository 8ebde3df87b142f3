use num_complex::Complex64;

use crate::compare::{compare, ComparisonReport};
use crate::debug::format_f64_vec;
use crate::error::{PfError, Result};
use crate::gauss::{self, gausspf};
use crate::math::nan_max;
use crate::mpopt::PFOpt;
use crate::network::NetworkModel;
use crate::sbus::{make_sbus, SkippedElement};
use crate::three_phase::{synthesize, ResultSet};
use crate::ybus::{make_ybus, YBus};

/// Outcome of a power flow run.
#[derive(Debug, Clone)]
pub struct PowerFlowSolution {
    /// Complex bus voltages in bus ordinal order.
    pub v: Vec<Complex64>,

    /// Voltages expanded to three balanced phases, keyed by bus id.
    pub results: ResultSet,

    pub converged: bool,

    /// Number of Gauss-Seidel sweeps performed.
    pub iterations: usize,

    /// Loads and generators left out because their bus does not exist.
    pub warnings: Vec<SkippedElement>,

    /// Largest complex power mismatch `|V conj(Y V) - S|` over the
    /// non-slack buses at the returned voltages.
    pub mismatch: f64,
}

/// Runs a Gauss-Seidel power flow on `model`.
///
/// Topology errors (unknown line endpoints, zero impedances, isolated
/// buses) abort the run. Loads and generators on unknown buses are
/// dropped and reported in the solution's `warnings`. A run that reaches
/// the iteration limit still returns its last iterate, flagged with
/// `converged = false`.
pub fn runpf(model: &NetworkModel, mpopt: &PFOpt) -> Result<PowerFlowSolution> {
    model.validate()?;

    let nb = model.nb();
    log::info!(
        "Solving {} buses, {} lines, {} loads, {} generators",
        nb,
        model.line.len(),
        model.load.len(),
        model.gen.len()
    );

    // build admittance matrix
    let y_bus = make_ybus(&model.bus, &model.line)?;

    // compute bus power injections (generation - load)
    let s_bus = make_sbus(mpopt.base, &model.bus, &model.load, &model.gen);
    log::debug!("P: {}", format_f64_vec(&s_bus.p));
    log::debug!("Q: {}", format_f64_vec(&s_bus.q));

    // initial state
    let v0 = model.v0();

    let progress = gauss::PrintProgress {};
    let (v, converged, iterations) = gausspf(
        &y_bus,
        &s_bus.p,
        &s_bus.q,
        &v0,
        model.slack_bus,
        mpopt.tolerance,
        mpopt.max_it,
        Some(&progress),
    )
    .map_err(|err| err.with_bus_ids(&model.bus))?;

    let mismatch = power_mismatch(&y_bus, &v, &s_bus.p, &s_bus.q, model.slack_bus);
    log::debug!("max power mismatch: {:e}", mismatch);

    let results = synthesize(&v, &model.bus);

    Ok(PowerFlowSolution {
        v,
        results,
        converged,
        iterations,
        warnings: s_bus.warnings,
        mismatch,
    })
}

fn power_mismatch(
    y_bus: &YBus,
    v: &[Complex64],
    p: &[f64],
    q: &[f64],
    slack: Option<usize>,
) -> f64 {
    let i_bus = y_bus.mat_vec(v);
    (0..v.len())
        .filter(|&i| Some(i) != slack)
        .map(|i| (v[i] * i_bus[i].conj() - Complex64::new(p[i], q[i])).norm())
        .fold(0.0, nan_max)
}

/// Holds a network case, an optional reference solution and the latest
/// power flow solution for the case.
#[derive(Debug, Default)]
pub struct PowerFlowAnalysis {
    model: Option<NetworkModel>,
    reference: Option<ResultSet>,
    solution: Option<PowerFlowSolution>,
    mpopt: PFOpt,
}

impl PowerFlowAnalysis {
    pub fn new(mpopt: PFOpt) -> Self {
        Self {
            mpopt,
            ..Default::default()
        }
    }

    /// Sets the network case, discarding any previous solution.
    pub fn set_model(&mut self, model: NetworkModel) {
        self.model = Some(model);
        self.solution = None;
    }

    pub fn set_reference(&mut self, reference: ResultSet) {
        self.reference = Some(reference);
    }

    pub fn model(&self) -> Option<&NetworkModel> {
        self.model.as_ref()
    }

    pub fn solution(&self) -> Option<&PowerFlowSolution> {
        self.solution.as_ref()
    }

    pub fn solve(&mut self) -> Result<&PowerFlowSolution> {
        let model = self.model.as_ref().ok_or(PfError::MissingModel)?;
        let solution = runpf(model, &self.mpopt)?;
        Ok(&*self.solution.insert(solution))
    }

    /// Compares the latest solution against the reference result set.
    pub fn comparison(&self) -> Result<ComparisonReport> {
        let solution = self.solution.as_ref().ok_or(PfError::MissingSolution)?;
        let reference = self.reference.as_ref().ok_or(PfError::MissingReference)?;
        Ok(compare(&solution.results, reference))
    }
}
