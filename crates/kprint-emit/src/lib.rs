/*! Readable text for kernels before and after print lowering.
 *
 * Lowering one `print` produces dozens of instructions and a handful of string constants. This
 * crate lays them out so the result can be checked by eye: string table first, then the body,
 * with printf calls and leftover prints highlighted when colors are on.
 */

pub mod config;
pub mod emitter;
pub mod kernel_emitter;

pub use config::{EmitterConfig, VerbosityLevel};
pub use emitter::{EmitContext, EmitResult, Emitter};
pub use kernel_emitter::KernelEmitter;
