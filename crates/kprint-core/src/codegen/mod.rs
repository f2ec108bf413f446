/*! Lower `print` into device `printf` calls.
 *
 * Threads can only print what they hold, so a tensor print becomes one printf per resident
 * element. The pieces here pick printf conversions per type, keep every call under the printf
 * argument cap, build the per-element format string once per operand and emit the calls.
 */

pub mod format_spec;
pub mod print_op;
pub mod print_tensor;
pub mod rewriter;
pub mod target;
pub mod truncation;

pub use format_spec::{dim_widths, format_substr, index_width};
pub use print_op::lower_print;
pub use print_tensor::{print_tensor, TensorPrint};
pub use rewriter::Rewriter;
pub use target::{CoordinateQuery, GridProgramId, LayoutResolver};
pub use truncation::{max_allowed_rank, MAX_PRINTF_OPERANDS, TRUNCATION_MARKER};
