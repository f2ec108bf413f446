/*! Kernel IR and printf lowering for device-side tensor printing.
 *
 * A `print` in a kernel names tensors that are spread across every thread of a launch. Each thread
 * can only see the elements it owns, so printing means emitting one `printf` per owned element,
 * tagged with the program id and the element's position in the logical tensor. This crate holds
 * the IR those prints live in and the lowering that turns them into plain `printf` calls.
 */

pub mod codegen;
pub mod format;
pub mod instructions;
pub mod kernel;
pub mod pass;
pub mod types;
pub mod values;

pub use codegen::{
    lower_print, CoordinateQuery, GridProgramId, LayoutResolver, Rewriter, MAX_PRINTF_OPERANDS,
};
pub use instructions::{Axis, Instruction};
pub use kernel::{Kernel, KernelBuilder};
pub use pass::{LoweringOptions, Pass, PassManager, PrintLoweringPass};
pub use types::{Encoding, FloatType, Signedness, TensorType, Type};
pub use values::{Scalar, Value, ValueId};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum IrError {
    #[error("Unsupported type for printf: {0}")]
    UnsupportedType(Type),
    #[error("Malformed print operand: {0}")]
    MalformedOperand(String),
    #[error("printf accepts at most {max} arguments, got {got}")]
    TooManyArguments { max: usize, got: usize },
    #[error("Builder error: {0}")]
    BuilderError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type Result<T> = std::result::Result<T, IrError>;

#[cfg(test)]
mod tests;
