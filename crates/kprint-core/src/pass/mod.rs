use crate::kernel::Kernel;
use anyhow::Result;
use std::any::Any;
use std::time::{Duration, Instant};
use tracing::debug;

pub mod options;
pub mod print_lowering;

pub use options::LoweringOptions;
pub use print_lowering::{LoweringStats, PrintLoweringPass};

pub trait Pass {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str {
        "No description provided"
    }

    fn run_on_kernel(&mut self, kernel: &mut Kernel) -> Result<()>;

    fn modifies_ir(&self) -> bool {
        false
    }

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

#[derive(Debug, Clone)]
pub struct PassStatistics {
    pub name: String,
    pub duration: Duration,
}

#[derive(Default)]
pub struct PassManager {
    passes: Vec<Box<dyn Pass>>,
    statistics: Vec<PassStatistics>,
    collect_stats: bool,
}

impl PassManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enable_statistics(&mut self) {
        self.collect_stats = true;
    }

    pub fn register_pass<P: Pass + 'static>(&mut self, pass: P) {
        self.passes.push(Box::new(pass));
    }

    pub fn run_all(&mut self, kernel: &mut Kernel) -> Result<()> {
        for pass in &mut self.passes {
            let start = self.collect_stats.then(Instant::now);

            debug!(pass = pass.name(), kernel = %kernel.name, "running pass");
            pass.run_on_kernel(kernel)?;

            if let Some(start) = start {
                self.statistics.push(PassStatistics {
                    name: pass.name().to_string(),
                    duration: start.elapsed(),
                });
            }
        }
        Ok(())
    }

    pub fn get_pass<P: Pass + 'static>(&self) -> Option<&P> {
        self.passes
            .iter()
            .find_map(|pass| pass.as_any().downcast_ref::<P>())
    }

    pub fn get_pass_mut<P: Pass + 'static>(&mut self) -> Option<&mut P> {
        self.passes
            .iter_mut()
            .find_map(|pass| pass.as_any_mut().downcast_mut::<P>())
    }

    pub fn statistics(&self) -> &[PassStatistics] {
        &self.statistics
    }
}
