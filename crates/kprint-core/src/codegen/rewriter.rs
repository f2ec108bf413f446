use crate::{
    instructions::{Axis, Instruction},
    kernel::Kernel,
    types::Type,
    values::Value,
    IrError, Result,
};

use super::truncation::MAX_PRINTF_OPERANDS;

/// Collects the instructions that replace one high-level instruction.
///
/// The rewriter owns nothing but the insertion list; fresh values and string constants are
/// allocated in the kernel being rewritten so ids stay unique across rewrites.
pub struct Rewriter<'k> {
    kernel: &'k mut Kernel,
    inserted: Vec<Instruction>,
    max_printf_operands: usize,
}

impl<'k> Rewriter<'k> {
    pub fn new(kernel: &'k mut Kernel) -> Self {
        Self {
            kernel,
            inserted: Vec::new(),
            max_printf_operands: MAX_PRINTF_OPERANDS,
        }
    }

    pub fn with_max_printf_operands(mut self, max: usize) -> Self {
        self.max_printf_operands = max;
        self
    }

    pub fn max_printf_operands(&self) -> usize {
        self.max_printf_operands
    }

    pub fn fresh_value(&mut self, ty: Type) -> Value {
        self.kernel.fresh_value(ty)
    }

    pub fn insert(&mut self, inst: Instruction) {
        self.inserted.push(inst);
    }

    pub fn program_id(&mut self, axis: Axis) -> Value {
        let result = self.fresh_value(Type::i32());
        self.insert(Instruction::ProgramId {
            result: result.clone(),
            axis,
        });
        result
    }

    /// Adds a string constant to the kernel and returns a pointer to it.
    pub fn add_string_to_module(&mut self, prefix: &str, contents: &str) -> Value {
        let symbol = self.kernel.add_string(prefix, contents);
        let result = self.fresh_value(Type::Ptr);
        self.insert(Instruction::StringAddr {
            result: result.clone(),
            symbol,
        });
        result
    }

    /// Allocates `format` (plus a trailing newline) and emits a printf with it. Returns the
    /// format string pointer so later calls can reuse it.
    pub fn printf(&mut self, format: &str, args: Vec<Value>) -> Result<Value> {
        self.check_arg_count(args.len())?;
        let mut contents = String::with_capacity(format.len() + 1);
        contents.push_str(format);
        contents.push('\n');
        let format_value = self.add_string_to_module("printfFormat_", &contents);
        self.insert(Instruction::Printf {
            format: format_value.clone(),
            args,
        });
        Ok(format_value)
    }

    pub fn printf_reusing(&mut self, format: &Value, args: Vec<Value>) -> Result<()> {
        self.check_arg_count(args.len())?;
        self.insert(Instruction::Printf {
            format: format.clone(),
            args,
        });
        Ok(())
    }

    fn check_arg_count(&self, got: usize) -> Result<()> {
        if got > self.max_printf_operands {
            return Err(IrError::TooManyArguments {
                max: self.max_printf_operands,
                got,
            });
        }
        Ok(())
    }

    pub fn inserted(&self) -> &[Instruction] {
        &self.inserted
    }

    pub fn finish(self) -> Vec<Instruction> {
        self.inserted
    }
}
