use derive_builder::Builder;

/// Default termination tolerance on the maximum bus voltage change (p.u.).
pub const DEFAULT_TOLERANCE: f64 = 1e-6;
/// Default maximum number of Gauss-Seidel sweeps.
pub const DEFAULT_MAX_IT: usize = 100;
/// Default divisor converting element kW/kVAr into injection units (MW/MVAr).
pub const DEFAULT_BASE: f64 = 1000.0;

/// Power flow options.
///
/// ```
/// use gspf::PFOptBuilder;
///
/// let opt = PFOptBuilder::default().tolerance(1e-8).max_it(500).build().unwrap();
/// assert_eq!(opt.base, 1000.0);
/// ```
#[derive(Debug, Clone, PartialEq, Builder)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct PFOpt {
    // Termination tolerance on the infinity norm of the voltage update
    // between successive sweeps. Default value is 1e-6.
    #[builder(default = "DEFAULT_TOLERANCE")]
    pub tolerance: f64,

    // Maximum number of Gauss-Seidel sweeps. Default value is 100.
    #[builder(default = "DEFAULT_MAX_IT")]
    pub max_it: usize,

    // Load and generator powers are divided by this before they enter
    // the injection vectors. Default value is 1000 (kW to MW).
    #[builder(default = "DEFAULT_BASE")]
    pub base: f64,
}

impl PFOptBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(tol) = self.tolerance {
            if !(tol.is_finite() && tol > 0.0) {
                return Err(format!("tolerance must be positive and finite ({})", tol));
            }
        }
        if let Some(max_it) = self.max_it {
            if max_it == 0 {
                return Err("max_it must be at least 1".to_string());
            }
        }
        if let Some(base) = self.base {
            if !(base.is_finite() && base > 0.0) {
                return Err(format!("base must be positive and finite ({})", base));
            }
        }
        Ok(())
    }
}

impl Default for PFOpt {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_it: DEFAULT_MAX_IT,
            base: DEFAULT_BASE,
        }
    }
}
