/*! Host-side execution of lowered print kernels.
 *
 * Resolves blocked tensor layouts into per-thread elements and runs every thread of a launch,
 * rendering the `printf` calls the lowering produced. Lets tests and the CLI see exactly what a
 * device would print.
 */

pub mod error;
pub mod interp;
pub mod layout;
pub mod printf;

pub use error::{Result, SimError};
pub use interp::{OutputLine, Simulator};
pub use layout::{BlockedDistribution, BlockedLayout};
pub use printf::{render, Arg};
