use num_complex::Complex64;

use crate::debug::format_polar_vec;
use crate::error::{PfError, Result};
use crate::math::{norm_inf_diff, J};
use crate::ybus::YBus;

pub trait ProgressMonitor {
    fn update(&self, i: usize, dv_max: f64);
}

pub struct PrintProgress {}

impl ProgressMonitor for PrintProgress {
    fn update(&self, i: usize, dv_max: f64) {
        if i == 1 {
            log::debug!(" it    max V change (p.u.)");
            log::debug!("----  ---------------------");
        }
        log::debug!("{:>3}        {:10.3e}", i, dv_max);
    }
}

/// Voltages and bookkeeping of one Gauss-Seidel solve.
struct SolverState {
    v: Vec<Complex64>,
    it: usize,
    converged: bool,
}

/// Solves the power flow using the Gauss-Seidel method.
///
/// `p` and `q` are the net bus injections and `v0` the initial voltage
/// vector, all indexed by bus ordinal. Each sweep updates every bus in
/// increasing ordinal order, except the `slack` bus if there is one, using
/// the voltages already updated earlier in the same sweep:
///
/// ```txt
///   V[i] = ((P[i] - jQ[i]) / conj(V[i]) - sum_{j != i} Y[i,j] V[j]) / Y[i,i]
/// ```
///
/// Iteration stops when the largest change in any bus voltage over a sweep
/// drops below `tol`, or after `max_it` sweeps. Running out of sweeps is
/// not an error: the last iterate is returned with `converged = false`.
/// A sweep whose voltage change is not finite also ends the iteration
/// with `converged = false`.
///
/// Returns the final voltages, the convergence flag and the number of
/// sweeps performed. Errors raised by a sweep name the bus by its ordinal
/// only; see [`PfError::with_bus_ids`].
#[allow(clippy::too_many_arguments)]
pub fn gausspf(
    y_bus: &YBus,
    p: &[f64],
    q: &[f64],
    v0: &[Complex64],
    slack: Option<usize>,
    tol: f64,
    max_it: usize,
    progress: Option<&dyn ProgressMonitor>,
) -> Result<(Vec<Complex64>, bool, usize)> {
    let nb = v0.len();
    check_len("Y-bus rows", nb, y_bus.shape().0)?;
    check_len("Y-bus columns", nb, y_bus.shape().1)?;
    check_len("P injections", nb, p.len())?;
    check_len("Q injections", nb, q.len())?;

    let mut state = SolverState {
        v: v0.to_vec(),
        it: 0,
        converged: false,
    };
    log::debug!("V0: {}", format_polar_vec(&state.v));

    if slack.is_none() {
        log::warn!("no slack bus: iterating all {} buses without a voltage reference", nb);
    }

    while !state.converged && state.it < max_it {
        state.it += 1;

        let v_prev = state.v.clone();
        sweep(y_bus, p, q, slack, &mut state.v)?;

        let dv_max = norm_inf_diff(&state.v, &v_prev);
        if let Some(pm) = progress {
            pm.update(state.it, dv_max);
        }
        if !dv_max.is_finite() {
            log::warn!(
                "Gauss-Seidel power flow diverged: non-finite voltage change in iteration {}",
                state.it
            );
            break;
        }
        if dv_max < tol {
            state.converged = true;
        }
    }

    if state.converged {
        log::info!(
            "Gauss-Seidel power flow converged in {} iterations.",
            state.it
        );
    } else {
        log::info!(
            "Gauss-Seidel power flow did not converge in {} iterations.",
            state.it
        );
    }
    log::debug!("V: {}", format_polar_vec(&state.v));

    Ok((state.v, state.converged, state.it))
}

fn check_len(what: &'static str, expected: usize, found: usize) -> Result<()> {
    if expected != found {
        return Err(PfError::DimensionMismatch {
            what,
            expected,
            found,
        });
    }
    Ok(())
}

/// Performs one in-place Gauss-Seidel sweep over all non-slack buses.
fn sweep(
    y_bus: &YBus,
    p: &[f64],
    q: &[f64],
    slack: Option<usize>,
    v: &mut [Complex64],
) -> Result<()> {
    for i in 0..v.len() {
        if Some(i) == slack {
            continue;
        }
        let y_ii = y_bus.get(i, i);
        if y_ii == Complex64::default() {
            return Err(PfError::SingularAdmittance {
                index: i,
                bus: i.to_string(),
            });
        }
        let v_i = v[i];
        if v_i == Complex64::default() || !v_i.is_finite() {
            return Err(PfError::ZeroVoltage {
                index: i,
                bus: i.to_string(),
            });
        }

        let sum_yv: Complex64 = y_bus
            .row(i)
            .iter()
            .zip(v.iter())
            .enumerate()
            .filter(|&(j, _)| j != i)
            .map(|(_, (y_ij, v_j))| y_ij * v_j)
            .sum();

        let s_conj = Complex64::new(p[i], 0.0) - J * q[i];
        v[i] = (s_conj / v_i.conj() - sum_yv) / y_ii;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmplx;
    use crate::network::{Bus, Line};
    use crate::ybus::make_ybus;
    use approx::assert_relative_eq;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Recorder {
        dv: RefCell<Vec<f64>>,
    }

    impl ProgressMonitor for Recorder {
        fn update(&self, i: usize, dv_max: f64) {
            let mut dv = self.dv.borrow_mut();
            assert_eq!(dv.len() + 1, i);
            dv.push(dv_max);
        }
    }

    fn two_bus() -> YBus {
        make_ybus(
            &[Bus::new("1"), Bus::new("2")],
            &[Line::new("l12", "1", "2", cmplx!(0.01, 0.02))],
        )
        .unwrap()
    }

    #[test]
    fn test_two_bus_voltage_drop() -> Result<()> {
        let y_bus = two_bus();
        let v0 = vec![cmplx!(1.0); 2];

        let (v, converged, it) =
            gausspf(&y_bus, &[0.0, -0.010], &[0.0, -0.005], &v0, Some(0), 1e-6, 100, None)?;

        assert!(converged);
        assert!(it > 1 && it <= 100);
        assert_eq!(v[0], cmplx!(1.0));
        assert!(v[1].norm() < 1.0);
        // Linearised drop: (P - jQ) / Y = (-0.01 + 0.005j) / (20 - 40j)
        assert_relative_eq!(v[1].re, 0.9998, epsilon = 1e-6);
        assert_relative_eq!(v[1].im, -0.00015, epsilon = 1e-6);
        Ok(())
    }

    #[test]
    fn test_iteration_cap() -> Result<()> {
        let y_bus = two_bus();
        let v0 = vec![cmplx!(1.0); 2];

        let (v, converged, it) =
            gausspf(&y_bus, &[0.0, -0.010], &[0.0, -0.005], &v0, Some(0), 1e-6, 1, None)?;

        assert!(!converged);
        assert_eq!(it, 1);
        assert!(v[1].norm() < 1.0);
        Ok(())
    }

    #[test]
    fn test_slack_skips_only_slack_bus() -> Result<()> {
        let y_bus = two_bus();
        let v0 = vec![cmplx!(1.0), cmplx!(0.9)];

        // bus 2 is pulled to the slack voltage
        let (v, converged, _) =
            gausspf(&y_bus, &[0.0; 2], &[0.0; 2], &v0, Some(0), 1e-9, 100, None)?;
        assert!(converged);
        assert_eq!(v[0], cmplx!(1.0));
        assert_relative_eq!(v[1].re, 1.0, epsilon = 1e-12);

        // slack at the far end holds bus 2 and moves bus 1
        let (v, _, _) = gausspf(&y_bus, &[0.0; 2], &[0.0; 2], &v0, Some(1), 1e-9, 100, None)?;
        assert_eq!(v[1], cmplx!(0.9));
        assert_relative_eq!(v[0].re, 0.9, epsilon = 1e-12);
        Ok(())
    }

    #[test]
    fn test_no_slack_updates_every_bus() -> Result<()> {
        let y_bus = two_bus();
        let v0 = vec![cmplx!(1.0), cmplx!(0.9)];

        let (v, converged, it) = gausspf(&y_bus, &[0.0; 2], &[0.0; 2], &v0, None, 1e-9, 100, None)?;

        // bus 1 takes bus 2's voltage, then bus 2 sees the updated bus 1
        assert!(converged);
        assert_eq!(it, 2);
        assert_relative_eq!(v[0].re, 0.9, epsilon = 1e-12);
        assert_relative_eq!(v[1].re, 0.9, epsilon = 1e-12);
        Ok(())
    }

    #[test]
    fn test_singular_admittance() {
        // bus 3 has no lines
        let y_bus = make_ybus(
            &[Bus::new("1"), Bus::new("2"), Bus::new("3")],
            &[Line::new("l12", "1", "2", cmplx!(0.01, 0.02))],
        )
        .unwrap();
        let v0 = vec![cmplx!(1.0); 3];

        let err = gausspf(&y_bus, &[0.0; 3], &[0.0; 3], &v0, Some(0), 1e-6, 10, None).unwrap_err();
        assert!(matches!(err, PfError::SingularAdmittance { index: 2, .. }));
    }

    #[test]
    fn test_zero_initial_voltage() {
        let y_bus = two_bus();
        let v0 = vec![cmplx!(1.0), cmplx!()];

        let err = gausspf(&y_bus, &[0.0, -0.01], &[0.0, -0.005], &v0, Some(0), 1e-6, 10, None)
            .unwrap_err();
        assert!(matches!(err, PfError::ZeroVoltage { index: 1, .. }));

        // the slack bus is never divided by
        let v0 = vec![cmplx!(), cmplx!(1.0)];
        assert!(gausspf(&y_bus, &[0.0; 2], &[0.0; 2], &v0, Some(0), 1e-6, 1, None).is_ok());
    }

    #[test]
    fn test_non_finite_sweep_does_not_converge() -> Result<()> {
        let y_bus = two_bus();
        let v0 = vec![cmplx!(1.0); 2];

        let (v, converged, it) =
            gausspf(&y_bus, &[0.0, f64::NAN], &[0.0; 2], &v0, Some(0), 1e-6, 100, None)?;

        assert!(!converged);
        assert_eq!(it, 1);
        assert!(v[1].is_nan());
        Ok(())
    }

    #[test]
    fn test_dimension_mismatch() {
        let y_bus = two_bus();
        let v0 = vec![cmplx!(1.0); 2];

        let err = gausspf(&y_bus, &[0.0; 3], &[0.0; 2], &v0, Some(0), 1e-6, 10, None).unwrap_err();
        assert!(matches!(
            err,
            PfError::DimensionMismatch {
                expected: 2,
                found: 3,
                ..
            }
        ));

        let err = gausspf(&y_bus, &[0.0; 3], &[0.0; 3], &[cmplx!(1.0); 3], None, 1e-6, 10, None)
            .unwrap_err();
        assert!(matches!(err, PfError::DimensionMismatch { what: "Y-bus rows", .. }));
    }

    #[test]
    fn test_deterministic() -> Result<()> {
        let y_bus = two_bus();
        let v0 = vec![cmplx!(1.0); 2];
        let run = || gausspf(&y_bus, &[0.0, -0.2], &[0.0, -0.1], &v0, Some(0), 1e-10, 100, None);

        let (v1, c1, it1) = run()?;
        let (v2, c2, it2) = run()?;
        assert_eq!(v1, v2);
        assert_eq!(c1, c2);
        assert_eq!(it1, it2);
        Ok(())
    }

    #[test]
    fn test_radial_convergence_monotone() -> Result<()> {
        let bus = vec![Bus::new("1"), Bus::new("2"), Bus::new("3"), Bus::new("4")];
        let line = vec![
            Line::new("l12", "1", "2", cmplx!(0.02, 0.04)),
            Line::new("l23", "2", "3", cmplx!(0.02, 0.04)),
            Line::new("l34", "3", "4", cmplx!(0.03, 0.05)),
        ];
        let y_bus = make_ybus(&bus, &line)?;
        let p = [0.0, -0.05, -0.04, -0.06];
        let q = [0.0, -0.02, -0.01, -0.03];
        let v0 = vec![cmplx!(1.0); 4];

        let recorder = Recorder::default();
        let (_, converged, it) = gausspf(&y_bus, &p, &q, &v0, Some(0), 1e-6, 100, Some(&recorder))?;

        let dv = recorder.dv.into_inner();
        assert!(converged);
        assert_eq!(dv.len(), it);
        for k in 2..dv.len() {
            assert!(dv[k] <= dv[k - 1], "sweep {}: {} > {}", k + 1, dv[k], dv[k - 1]);
        }
        assert!(*dv.last().unwrap() < 1e-6);
        Ok(())
    }
}
