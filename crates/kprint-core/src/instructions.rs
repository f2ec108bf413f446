use crate::values::{Scalar, Value};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn index(&self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
            Axis::Z => write!(f, "z"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Instruction {
    /// Scalar constant, or a splat when `result` is a tensor.
    Constant {
        result: Value,
        value: Scalar,
    },
    /// Tensor with explicit row-major contents.
    TensorLiteral {
        result: Value,
        data: Vec<Scalar>,
    },
    ProgramId {
        result: Value,
        axis: Axis,
    },
    /// Address of a module-level string constant.
    StringAddr {
        result: Value,
        symbol: String,
    },
    /// The element a thread holds in register slot `slot` of a distributed tensor.
    ThreadElement {
        result: Value,
        tensor: Value,
        slot: usize,
    },
    /// Coordinate along `dim` of the element held in `slot`.
    ThreadIndex {
        result: Value,
        tensor: Value,
        slot: usize,
        dim: usize,
    },
    Printf {
        format: Value,
        args: Vec<Value>,
    },
    Print {
        prefix: String,
        hex: bool,
        operands: Vec<Value>,
    },
}

impl Instruction {
    pub fn result(&self) -> Option<&Value> {
        match self {
            Instruction::Constant { result, .. }
            | Instruction::TensorLiteral { result, .. }
            | Instruction::ProgramId { result, .. }
            | Instruction::StringAddr { result, .. }
            | Instruction::ThreadElement { result, .. }
            | Instruction::ThreadIndex { result, .. } => Some(result),
            Instruction::Printf { .. } | Instruction::Print { .. } => None,
        }
    }

    pub fn operands(&self) -> Vec<&Value> {
        match self {
            Instruction::Constant { .. }
            | Instruction::TensorLiteral { .. }
            | Instruction::ProgramId { .. }
            | Instruction::StringAddr { .. } => Vec::new(),
            Instruction::ThreadElement { tensor, .. } | Instruction::ThreadIndex { tensor, .. } => {
                vec![tensor]
            }
            Instruction::Printf { format, args } => {
                std::iter::once(format).chain(args.iter()).collect()
            }
            Instruction::Print { operands, .. } => operands.iter().collect(),
        }
    }

    pub fn is_print(&self) -> bool {
        matches!(self, Instruction::Print { .. })
    }

    pub fn is_printf(&self) -> bool {
        matches!(self, Instruction::Printf { .. })
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", crate::format::format_instruction(self))
    }
}
