//! Executes lowered kernels on the host.
//!
//! Blocks run with `x` fastest, then `y`, then `z`; within a block threads run in order. Every
//! `printf` produces one [`OutputLine`].

use std::collections::HashMap;

use half::{bf16, f16};
use kprint_core::{FloatType, Instruction, Kernel, Scalar, Type, Value, ValueId};
use tracing::{debug, trace};

use crate::{
    error::{Result, SimError},
    layout::BlockedDistribution,
    printf::{render, Arg},
};

#[derive(Debug, Clone, PartialEq)]
enum RuntimeValue {
    Scalar(Scalar),
    /// Full tensor contents in row-major order.
    Tensor(Vec<Scalar>),
    /// A tensor of `len` copies of one scalar.
    Splat { value: Scalar, len: u64 },
    /// Address of a string constant; carries the contents.
    Str(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    pub block: [u32; 3],
    pub thread: u32,
    /// Rendered text without the trailing newline.
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ThreadContext {
    block: [u32; 3],
    thread: u32,
}

#[derive(Debug, Default)]
pub struct Simulator {
    /// Stop after this many lines, if set.
    line_limit: Option<usize>,
}

impl Simulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_line_limit(mut self, limit: usize) -> Self {
        self.line_limit = Some(limit);
        self
    }

    pub fn run(&self, kernel: &Kernel) -> Result<Vec<OutputLine>> {
        if kernel.print_count() > 0 {
            return Err(SimError::UnloweredPrint);
        }

        let [gx, gy, gz] = kernel.grid;
        debug!(
            "Simulating kernel '{}' on grid ({}, {}, {}) with {} threads per block",
            kernel.name, gx, gy, gz, kernel.threads_per_block
        );

        let mut output = Vec::new();
        'launch: for z in 0..gz {
            for y in 0..gy {
                for x in 0..gx {
                    for thread in 0..kernel.threads_per_block {
                        let ctx = ThreadContext {
                            block: [x, y, z],
                            thread,
                        };
                        self.run_thread(kernel, ctx, &mut output)?;
                        if let Some(limit) = self.line_limit {
                            if output.len() >= limit {
                                output.truncate(limit);
                                break 'launch;
                            }
                        }
                    }
                }
            }
        }

        debug!("Kernel '{}' printed {} lines", kernel.name, output.len());
        Ok(output)
    }

    fn run_thread(
        &self,
        kernel: &Kernel,
        ctx: ThreadContext,
        output: &mut Vec<OutputLine>,
    ) -> Result<()> {
        let mut env: HashMap<ValueId, RuntimeValue> = HashMap::new();

        for inst in &kernel.body {
            match inst {
                Instruction::Constant { result, value } => {
                    let runtime = match result.ty.as_tensor() {
                        Some(tensor) => {
                            let n = tensor
                                .num_elements()
                                .ok_or_else(|| SimError::UnsupportedType(result.ty.clone()))?;
                            RuntimeValue::Splat { value: *value, len: n }
                        }
                        None => RuntimeValue::Scalar(*value),
                    };
                    env.insert(result.id, runtime);
                }
                Instruction::TensorLiteral { result, data } => {
                    env.insert(result.id, RuntimeValue::Tensor(data.clone()));
                }
                Instruction::ProgramId { result, axis } => {
                    let pid = i64::from(ctx.block[axis.index()]);
                    env.insert(result.id, RuntimeValue::Scalar(Scalar::Int(pid)));
                }
                Instruction::StringAddr { result, symbol } => {
                    let contents = kernel
                        .string(symbol)
                        .ok_or_else(|| SimError::UnknownSymbol(symbol.clone()))?;
                    env.insert(result.id, RuntimeValue::Str(contents.to_string()));
                }
                Instruction::ThreadElement {
                    result,
                    tensor,
                    slot,
                } => {
                    let dist = distribution(tensor)?;
                    let offset = dist.row_major_offset(&thread_coords(&dist, tensor, ctx, *slot)?);
                    let element = match lookup(&env, tensor)? {
                        RuntimeValue::Tensor(data) => data.get(offset).copied(),
                        RuntimeValue::Splat { value, len } => {
                            ((offset as u64) < *len).then_some(*value)
                        }
                        _ => None,
                    }
                    .ok_or_else(|| SimError::UnsupportedType(tensor.ty.clone()))?;
                    env.insert(result.id, RuntimeValue::Scalar(element));
                }
                Instruction::ThreadIndex {
                    result,
                    tensor,
                    slot,
                    dim,
                } => {
                    let coords = thread_coords(&distribution(tensor)?, tensor, ctx, *slot)?;
                    let coord = coords
                        .get(*dim)
                        .copied()
                        .ok_or_else(|| SimError::UnsupportedType(tensor.ty.clone()))?;
                    env.insert(result.id, RuntimeValue::Scalar(Scalar::Int(coord as i64)));
                }
                Instruction::Printf { format, args } => {
                    let format = match lookup(&env, format)? {
                        RuntimeValue::Str(s) => s.clone(),
                        _ => return Err(SimError::UnsupportedType(format.ty.clone())),
                    };
                    let args = args
                        .iter()
                        .map(|arg| to_arg(arg, lookup(&env, arg)?))
                        .collect::<Result<Vec<_>>>()?;
                    let text = render(&format, &args)?;
                    let text = text.strip_suffix('\n').unwrap_or(&text).to_string();
                    trace!("block {:?} thread {}: {}", ctx.block, ctx.thread, text);
                    output.push(OutputLine {
                        block: ctx.block,
                        thread: ctx.thread,
                        text,
                    });
                }
                Instruction::Print { .. } => return Err(SimError::UnloweredPrint),
            }
        }
        Ok(())
    }
}

fn lookup<'e>(env: &'e HashMap<ValueId, RuntimeValue>, value: &Value) -> Result<&'e RuntimeValue> {
    env.get(&value.id)
        .ok_or(SimError::UndefinedValue(value.id))
}

fn distribution(tensor: &Value) -> Result<BlockedDistribution> {
    let ty = tensor
        .ty
        .as_tensor()
        .ok_or_else(|| SimError::UnsupportedType(tensor.ty.clone()))?;
    Ok(BlockedDistribution::for_tensor(ty)?)
}

fn thread_coords(
    dist: &BlockedDistribution,
    tensor: &Value,
    ctx: ThreadContext,
    slot: usize,
) -> Result<Vec<u64>> {
    dist.coords(ctx.thread, slot).ok_or_else(|| SimError::EmptyTensor {
        ty: tensor.ty.clone(),
        slot,
    })
}

fn to_arg(value: &Value, runtime: &RuntimeValue) -> Result<Arg> {
    let scalar = match runtime {
        RuntimeValue::Str(s) => return Ok(Arg::Str(s.clone())),
        RuntimeValue::Tensor(_) | RuntimeValue::Splat { .. } => {
            return Err(SimError::UnsupportedType(value.ty.clone()))
        }
        RuntimeValue::Scalar(scalar) => *scalar,
    };

    match (&value.ty, scalar) {
        (_, Scalar::Ptr(p)) | (Type::Ptr, Scalar::UInt(p)) => Ok(Arg::Ptr(p)),
        (Type::Float(ft), s) => {
            let (narrowed, bits) = narrow(*ft, s.as_f64())
                .ok_or_else(|| SimError::UnsupportedType(value.ty.clone()))?;
            Ok(Arg::Float {
                value: narrowed,
                bits,
            })
        }
        (_, Scalar::UInt(v)) => Ok(Arg::Int(v as i64)),
        (_, s) => Ok(Arg::Int(s.as_i64())),
    }
}

/// `value` as stored at the width of `ty`, together with its IEEE bits. Narrowing rounds to
/// nearest even. 8-bit floats have no host encoding here.
fn narrow(ty: FloatType, value: f64) -> Option<(f64, u64)> {
    match ty {
        FloatType::F64 => Some((value, value.to_bits())),
        FloatType::F32 => {
            let v = value as f32;
            Some((f64::from(v), u64::from(v.to_bits())))
        }
        FloatType::BF16 => {
            let v = bf16::from_f64(value);
            Some((v.to_f64(), u64::from(v.to_bits())))
        }
        FloatType::F16 => {
            let v = f16::from_f64(value);
            Some((v.to_f64(), u64::from(v.to_bits())))
        }
        FloatType::F8E4M3 | FloatType::F8E5M2 => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bits(ty: FloatType, value: f64) -> Option<u64> {
        narrow(ty, value).map(|(_, bits)| bits)
    }

    #[test]
    fn test_half_precision_rounds_to_nearest_even() {
        assert_eq!(bits(FloatType::F16, 1.0), Some(0x3c00));
        assert_eq!(bits(FloatType::F16, -2.0), Some(0xc000));
        assert_eq!(bits(FloatType::F16, 0.7), Some(0x399a));
        assert_eq!(bits(FloatType::F16, 65504.0), Some(0x7bff));
        assert_eq!(bits(FloatType::F16, 1.0e6), Some(0x7c00));
        assert_eq!(bits(FloatType::F16, 2.0f64.powi(-24)), Some(0x0001));
        assert_eq!(bits(FloatType::F16, 0.0), Some(0));
        // 1 + 2^-8 + 2^-9 sits above the bf16 midpoint.
        assert_eq!(bits(FloatType::BF16, 1.005859375), Some(0x3f81));
        assert_eq!(bits(FloatType::BF16, 1.01171875), Some(0x3f82));
    }

    #[test]
    fn test_bits_per_width() {
        assert_eq!(bits(FloatType::F32, 1.0), Some(0x3f80_0000));
        assert_eq!(bits(FloatType::BF16, 1.0), Some(0x3f80));
        assert_eq!(bits(FloatType::F64, 1.0), Some(0x3ff0_0000_0000_0000));
        assert_eq!(bits(FloatType::F8E5M2, 1.0), None);
    }

    #[test]
    fn test_values_are_narrowed_to_declared_width() {
        assert_eq!(narrow(FloatType::F16, 0.7).map(|(v, _)| v), Some(0.700_195_312_5));
        assert_eq!(narrow(FloatType::F32, 16_777_217.0).map(|(v, _)| v), Some(16_777_216.0));
        assert_eq!(narrow(FloatType::F64, 16_777_217.0).map(|(v, _)| v), Some(16_777_217.0));
    }

    #[test]
    fn test_unsigned_scalars_pass_through_as_integers() {
        let v = Value::new(ValueId(0), Type::unsigned(64));
        let arg = to_arg(&v, &RuntimeValue::Scalar(Scalar::UInt(u64::MAX))).unwrap();
        assert_eq!(arg, Arg::Int(-1));
    }
}
