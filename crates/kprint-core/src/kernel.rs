use crate::{
    instructions::Instruction,
    types::Type,
    values::{Scalar, Value, ValueId},
    IrError, Result,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A straight-line kernel body together with its launch shape and string constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kernel {
    pub name: String,
    pub grid: [u32; 3],
    pub threads_per_block: u32,
    pub body: Vec<Instruction>,
    pub strings: IndexMap<String, String>,
    next_value: u32,
}

impl Kernel {
    pub fn new(name: impl Into<String>, grid: [u32; 3], threads_per_block: u32) -> Self {
        Self {
            name: name.into(),
            grid,
            threads_per_block,
            body: Vec::new(),
            strings: IndexMap::new(),
            next_value: 0,
        }
    }

    pub fn fresh_value(&mut self, ty: Type) -> Value {
        let id = ValueId(self.next_value);
        self.next_value += 1;
        Value::new(id, ty)
    }

    /// Registers a string constant and returns its symbol. Symbols are `<prefix><n>` with `n`
    /// unique within the kernel.
    pub fn add_string(&mut self, prefix: &str, contents: &str) -> String {
        let mut n = self.strings.len();
        let mut symbol = format!("{}{}", prefix, n);
        while self.strings.contains_key(&symbol) {
            n += 1;
            symbol = format!("{}{}", prefix, n);
        }
        self.strings.insert(symbol.clone(), contents.to_string());
        symbol
    }

    pub fn string(&self, symbol: &str) -> Option<&str> {
        self.strings.get(symbol).map(String::as_str)
    }

    pub fn print_count(&self) -> usize {
        self.body.iter().filter(|inst| inst.is_print()).count()
    }

    pub fn printf_count(&self) -> usize {
        self.body.iter().filter(|inst| inst.is_printf()).count()
    }
}

impl fmt::Display for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", crate::format::format_kernel(self))
    }
}

pub struct KernelBuilder {
    kernel: Kernel,
}

impl KernelBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            kernel: Kernel::new(name, [1, 1, 1], 1),
        }
    }

    pub fn grid(mut self, grid: [u32; 3]) -> Self {
        self.kernel.grid = grid;
        self
    }

    pub fn threads_per_block(mut self, threads: u32) -> Self {
        self.kernel.threads_per_block = threads;
        self
    }

    pub fn constant(&mut self, ty: Type, value: Scalar) -> Value {
        let result = self.kernel.fresh_value(ty);
        self.kernel.body.push(Instruction::Constant {
            result: result.clone(),
            value,
        });
        result
    }

    pub fn tensor_literal(&mut self, ty: Type, data: Vec<Scalar>) -> Result<Value> {
        let tensor = ty
            .as_tensor()
            .ok_or_else(|| IrError::BuilderError(format!("{} is not a tensor type", ty)))?;
        let expected = tensor.num_elements().ok_or_else(|| {
            IrError::BuilderError(format!("tensor literal of dynamic type {}", ty))
        })?;
        if data.len() as u64 != expected {
            return Err(IrError::BuilderError(format!(
                "tensor literal of type {} needs {} elements, got {}",
                ty,
                expected,
                data.len()
            )));
        }
        let result = self.kernel.fresh_value(ty);
        self.kernel.body.push(Instruction::TensorLiteral {
            result: result.clone(),
            data,
        });
        Ok(result)
    }

    pub fn print(&mut self, prefix: impl Into<String>, hex: bool, operands: Vec<Value>) {
        self.kernel.body.push(Instruction::Print {
            prefix: prefix.into(),
            hex,
            operands,
        });
    }

    pub fn build(self) -> Result<Kernel> {
        if self.kernel.threads_per_block == 0 || self.kernel.grid.contains(&0) {
            return Err(IrError::BuilderError(format!(
                "kernel '{}' has an empty launch shape",
                self.kernel.name
            )));
        }
        Ok(self.kernel)
    }
}
