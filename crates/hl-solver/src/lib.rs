//! Bounded numerical root finders for the flow network.
//!
//! - `bracket`: bisection on a sign-changing interval (area to Mach inversion)
//! - `secant`: derivative-free scalar Newton (static pressure, Kantrowitz Mach)
//! - `newton`: multi-dimensional Newton with backtracking line search (residual closure)
//! - `jacobian`: forward-difference Jacobians for the Newton solver
//!
//! Every solver has an explicit iteration cap; running past it is an error,
//! never a silent best guess. Solvers are generic over the caller's error type
//! so closures can propagate their own failures with `?`.

pub mod bracket;
pub mod error;
pub mod jacobian;
pub mod newton;
pub mod secant;

pub use bracket::{BisectConfig, RootResult, bisect};
pub use error::{SolverError, SolverResult};
pub use jacobian::finite_difference_jacobian;
pub use newton::{NewtonConfig, NewtonResult, newton_solve};
pub use secant::{SecantConfig, secant};
