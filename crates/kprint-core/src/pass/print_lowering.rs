use anyhow::Result;
use std::any::Any;
use tracing::debug;

use super::{options::LoweringOptions, Pass};
use crate::{
    codegen::{lower_print, CoordinateQuery, GridProgramId, LayoutResolver, Rewriter},
    instructions::Instruction,
    kernel::Kernel,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoweringStats {
    pub prints_lowered: usize,
    pub printf_emitted: usize,
}

/// Replaces every `print` in a kernel with the printf calls it lowers to, in place.
pub struct PrintLoweringPass<L, C = GridProgramId> {
    layout: L,
    coords: C,
    options: LoweringOptions,
    stats: LoweringStats,
}

impl<L: LayoutResolver> PrintLoweringPass<L, GridProgramId> {
    pub fn new(layout: L) -> Self {
        Self::with_coordinates(layout, GridProgramId)
    }
}

impl<L: LayoutResolver, C: CoordinateQuery> PrintLoweringPass<L, C> {
    pub fn with_coordinates(layout: L, coords: C) -> Self {
        Self {
            layout,
            coords,
            options: LoweringOptions::default(),
            stats: LoweringStats::default(),
        }
    }

    pub fn with_options(mut self, options: LoweringOptions) -> Self {
        self.options = options;
        self
    }

    pub fn stats(&self) -> LoweringStats {
        self.stats
    }

    fn lower_body(&mut self, kernel: &mut Kernel, body: &[Instruction]) -> Result<Vec<Instruction>> {
        let mut lowered = Vec::with_capacity(body.len());
        for inst in body {
            let Instruction::Print {
                prefix,
                hex,
                operands,
            } = inst
            else {
                lowered.push(inst.clone());
                continue;
            };

            let hex = self.options.hex_override.unwrap_or(*hex);
            let mut rewriter =
                Rewriter::new(kernel).with_max_printf_operands(self.options.max_printf_operands);
            let calls = lower_print(
                &mut rewriter,
                &self.layout,
                &self.coords,
                prefix,
                hex,
                operands,
            )?;
            lowered.extend(rewriter.finish());

            self.stats.prints_lowered += 1;
            self.stats.printf_emitted += calls;
        }
        Ok(lowered)
    }
}

impl<L, C> Pass for PrintLoweringPass<L, C>
where
    L: LayoutResolver + 'static,
    C: CoordinateQuery + 'static,
{
    fn name(&self) -> &'static str {
        "print-lowering"
    }

    fn description(&self) -> &'static str {
        "Lowers tensor print instructions into per-element printf calls"
    }

    fn run_on_kernel(&mut self, kernel: &mut Kernel) -> Result<()> {
        self.options.validate()?;

        let body = std::mem::take(&mut kernel.body);
        let strings = kernel.strings.clone();
        match self.lower_body(kernel, &body) {
            Ok(lowered) => {
                kernel.body = lowered;
                debug!(
                    kernel = %kernel.name,
                    prints = self.stats.prints_lowered,
                    printf = self.stats.printf_emitted,
                    "print lowering finished"
                );
                Ok(())
            }
            Err(err) => {
                kernel.body = body;
                kernel.strings = strings;
                Err(err)
            }
        }
    }

    fn modifies_ir(&self) -> bool {
        true
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
