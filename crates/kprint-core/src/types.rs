use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::IrError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Signedness {
    Signed,
    Unsigned,
    Signless,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FloatType {
    F8E4M3,
    F8E5M2,
    F16,
    BF16,
    F32,
    F64,
}

impl FloatType {
    pub fn bits(&self) -> u16 {
        match self {
            FloatType::F8E4M3 | FloatType::F8E5M2 => 8,
            FloatType::F16 | FloatType::BF16 => 16,
            FloatType::F32 => 32,
            FloatType::F64 => 64,
        }
    }
}

/// How a tensor's elements are spread over the threads of a block.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Encoding {
    /// Each thread owns `size_per_thread` consecutive elements, threads are laid out one after
    /// the other and the pattern repeats until the tensor is covered. `order` lists dimensions
    /// from fastest to slowest varying; empty means row-major.
    Blocked {
        size_per_thread: u32,
        threads_per_block: u32,
        order: Vec<usize>,
    },
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Encoding::Blocked {
                size_per_thread,
                threads_per_block,
                order,
            } => {
                write!(
                    f,
                    "#blocked<spt={}, threads={}",
                    size_per_thread, threads_per_block
                )?;
                if !order.is_empty() {
                    let order: Vec<String> = order.iter().map(|d| d.to_string()).collect();
                    write!(f, ", order=[{}]", order.join(", "))?;
                }
                write!(f, ">")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TensorType {
    /// `None` marks a dynamic dimension.
    pub shape: Vec<Option<u64>>,
    pub element: Box<Type>,
    pub encoding: Option<Encoding>,
}

impl TensorType {
    pub fn new(shape: &[u64], element: Type) -> Self {
        Self {
            shape: shape.iter().map(|&d| Some(d)).collect(),
            element: Box::new(element),
            encoding: None,
        }
    }

    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = Some(encoding);
        self
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Number of elements, or `None` if any dimension is dynamic.
    pub fn num_elements(&self) -> Option<u64> {
        self.shape
            .iter()
            .try_fold(1u64, |acc, dim| dim.map(|d| acc.saturating_mul(d)))
    }

    pub fn static_shape(&self) -> Option<Vec<u64>> {
        self.shape.iter().copied().collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    Ptr,
    Int { bits: u16, signedness: Signedness },
    Float(FloatType),
    Tensor(TensorType),
    Vector(Box<Type>, usize),
    Void,
}

impl Type {
    pub fn int(bits: u16) -> Self {
        Type::Int {
            bits,
            signedness: Signedness::Signless,
        }
    }

    pub fn signed(bits: u16) -> Self {
        Type::Int {
            bits,
            signedness: Signedness::Signed,
        }
    }

    pub fn unsigned(bits: u16) -> Self {
        Type::Int {
            bits,
            signedness: Signedness::Unsigned,
        }
    }

    pub fn i32() -> Self {
        Type::int(32)
    }

    pub fn f32() -> Self {
        Type::Float(FloatType::F32)
    }

    pub fn tensor(shape: &[u64], element: Type) -> Self {
        Type::Tensor(TensorType::new(shape, element))
    }

    pub fn int_or_float_bits(&self) -> Option<u16> {
        match self {
            Type::Int { bits, .. } => Some(*bits),
            Type::Float(ft) => Some(ft.bits()),
            _ => None,
        }
    }

    pub fn as_tensor(&self) -> Option<&TensorType> {
        match self {
            Type::Tensor(t) => Some(t),
            _ => None,
        }
    }

    /// Element type for tensors, the type itself otherwise.
    pub fn element_type(&self) -> &Type {
        match self {
            Type::Tensor(t) => &t.element,
            other => other,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Ptr => write!(f, "ptr"),
            Type::Int {
                bits,
                signedness: Signedness::Signed,
            } => write!(f, "si{}", bits),
            Type::Int {
                bits,
                signedness: Signedness::Unsigned,
            } => write!(f, "ui{}", bits),
            Type::Int {
                bits,
                signedness: Signedness::Signless,
            } => write!(f, "i{}", bits),
            Type::Float(FloatType::F8E4M3) => write!(f, "f8E4M3"),
            Type::Float(FloatType::F8E5M2) => write!(f, "f8E5M2"),
            Type::Float(FloatType::F16) => write!(f, "f16"),
            Type::Float(FloatType::BF16) => write!(f, "bf16"),
            Type::Float(FloatType::F32) => write!(f, "f32"),
            Type::Float(FloatType::F64) => write!(f, "f64"),
            Type::Tensor(t) => {
                write!(f, "tensor<")?;
                for dim in &t.shape {
                    match dim {
                        Some(d) => write!(f, "{}x", d)?,
                        None => write!(f, "?x")?,
                    }
                }
                write!(f, "{}", t.element)?;
                if let Some(encoding) = &t.encoding {
                    write!(f, ", {}", encoding)?;
                }
                write!(f, ">")
            }
            Type::Vector(elem, n) => write!(f, "vector<{}x{}>", n, elem),
            Type::Void => write!(f, "void"),
        }
    }
}

/// Parses scalar type names: `ptr`, `f16`, `bf16`, `f32`, `f64`, `f8E4M3`, `f8E5M2`, and
/// MLIR-style integers (`i32` signless, `si32` signed, `ui32` unsigned).
impl FromStr for Type {
    type Err = IrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = match s {
            "ptr" => Some(Type::Ptr),
            "f8E4M3" => Some(Type::Float(FloatType::F8E4M3)),
            "f8E5M2" => Some(Type::Float(FloatType::F8E5M2)),
            "f16" => Some(Type::Float(FloatType::F16)),
            "bf16" => Some(Type::Float(FloatType::BF16)),
            "f32" => Some(Type::Float(FloatType::F32)),
            "f64" => Some(Type::Float(FloatType::F64)),
            _ => {
                let (signedness, digits) = if let Some(rest) = s.strip_prefix("si") {
                    (Signedness::Signed, rest)
                } else if let Some(rest) = s.strip_prefix("ui") {
                    (Signedness::Unsigned, rest)
                } else if let Some(rest) = s.strip_prefix('i') {
                    (Signedness::Signless, rest)
                } else {
                    return Err(IrError::BuilderError(format!("unknown type '{}'", s)));
                };
                digits
                    .parse::<u16>()
                    .ok()
                    .filter(|bits| (1..=64).contains(bits))
                    .map(|bits| Type::Int { bits, signedness })
            }
        };
        parsed.ok_or_else(|| IrError::BuilderError(format!("unknown type '{}'", s)))
    }
}
