mod compare;
mod dense;
mod error;
mod gauss;
mod loadcase;
mod math;
mod mpopt;
mod network;
mod pf;
mod sbus;
mod three_phase;
mod ybus;

pub mod debug;

pub use compare::*;
pub use dense::*;
pub use error::{PfError, Result};
pub use gauss::*;
pub use loadcase::*;
pub use math::*;
pub use mpopt::*;
pub use network::*;
pub use pf::*;
pub use sbus::*;
pub use three_phase::*;
pub use ybus::*;
