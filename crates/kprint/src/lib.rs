/*! Everything needed to lower and inspect tensor prints from one import.
 *
 * Build a kernel, lower its prints with a layout, read the result back as text or run it on the
 * host to see what each thread would print.
 */

pub use kprint_core as core;
pub use kprint_emit as emit;
pub use kprint_sim as sim;

pub use kprint_core::{
    instructions::{Axis, Instruction},
    kernel::{Kernel, KernelBuilder},
    pass::{LoweringOptions, Pass, PassManager, PrintLoweringPass},
    types::{Encoding, TensorType, Type},
    values::{Scalar, Value},
    IrError,
};

pub use kprint_emit::{EmitterConfig, Emitter, KernelEmitter};

pub use kprint_sim::{BlockedLayout, OutputLine, SimError, Simulator};

/// Lowers every print in `kernel` with the blocked layout and runs it.
pub fn lower_and_run(kernel: &mut Kernel) -> anyhow::Result<Vec<OutputLine>> {
    PrintLoweringPass::new(BlockedLayout).run_on_kernel(kernel)?;
    Ok(Simulator::new().run(kernel)?)
}
