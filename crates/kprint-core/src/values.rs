use crate::types::Type;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ValueId(pub u32);

impl fmt::Display for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

/// An SSA value. Lowering only ever looks at the type; the runtime value is produced when the
/// kernel runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Value {
    pub id: ValueId,
    pub ty: Type,
}

impl Value {
    pub fn new(id: ValueId, ty: Type) -> Self {
        Self { id, ty }
    }

    pub fn is_tensor(&self) -> bool {
        matches!(self.ty, Type::Tensor(_))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Scalar {
    Int(i64),
    UInt(u64),
    Float(f64),
    Ptr(u64),
}

impl Scalar {
    pub fn as_f64(&self) -> f64 {
        match *self {
            Scalar::Int(v) => v as f64,
            Scalar::UInt(v) => v as f64,
            Scalar::Float(v) => v,
            Scalar::Ptr(v) => v as f64,
        }
    }

    pub fn as_i64(&self) -> i64 {
        match *self {
            Scalar::Int(v) => v,
            Scalar::UInt(v) => v as i64,
            Scalar::Float(v) => v as i64,
            Scalar::Ptr(v) => v as i64,
        }
    }

    /// Converts a number to the representation `ty` stores, wrapping integers to their width.
    pub fn from_f64(ty: &Type, value: f64) -> Scalar {
        match ty {
            Type::Float(_) => Scalar::Float(value),
            Type::Ptr => Scalar::Ptr(value as u64),
            Type::Int { bits, signedness } => match signedness {
                crate::types::Signedness::Signed => Scalar::Int(sign_extend(value as i64, *bits)),
                // Non-negative values keep the full unsigned range; negatives wrap.
                _ if value >= 0.0 => Scalar::UInt(truncate(value as u64, *bits)),
                _ => Scalar::UInt(truncate(value as i64 as u64, *bits)),
            },
            _ => Scalar::Float(value),
        }
    }
}

fn truncate(value: u64, bits: u16) -> u64 {
    if bits >= 64 {
        value
    } else {
        value & ((1u64 << bits) - 1)
    }
}

fn sign_extend(value: i64, bits: u16) -> i64 {
    if bits >= 64 {
        value
    } else {
        let shift = 64 - u32::from(bits);
        (value << shift) >> shift
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(v) => write!(f, "{}", v),
            Scalar::UInt(v) => write!(f, "{}", v),
            Scalar::Float(v) => write!(f, "{:?}", v),
            Scalar::Ptr(v) => write!(f, "0x{:x}", v),
        }
    }
}
