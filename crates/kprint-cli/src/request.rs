use anyhow::{bail, Context, Result};
use serde::Deserialize;

use kprint_core::{Encoding, Kernel, KernelBuilder, Scalar, TensorType, Type};

/// A single print instruction together with the launch it runs in, as read from JSON.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PrintRequest {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub prefix: String,
    #[serde(default)]
    pub hex: bool,
    #[serde(default = "default_grid")]
    pub grid: [u32; 3],
    #[serde(default = "one")]
    pub threads_per_block: u32,
    #[serde(default = "one")]
    pub size_per_thread: u32,
    #[serde(default)]
    pub operands: Vec<OperandSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OperandSpec {
    /// Element type name, e.g. `f32`, `si64`, `ui8`, `ptr`.
    pub dtype: String,
    /// Empty for a scalar.
    #[serde(default)]
    pub shape: Vec<u64>,
    /// Row-major contents. A single value is splatted across the whole tensor.
    pub data: Vec<f64>,
}

fn default_name() -> String {
    "main".to_string()
}

fn default_grid() -> [u32; 3] {
    [1, 1, 1]
}

fn one() -> u32 {
    1
}

impl PrintRequest {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse print request")
    }

    /// Builds a kernel that materializes every operand and prints them once.
    pub fn to_kernel(&self) -> Result<Kernel> {
        let mut b = KernelBuilder::new(self.name.clone())
            .grid(self.grid)
            .threads_per_block(self.threads_per_block);

        let mut operands = Vec::with_capacity(self.operands.len());
        for (i, spec) in self.operands.iter().enumerate() {
            let element: Type = spec
                .dtype
                .parse()
                .with_context(|| format!("operand {} has an unknown dtype", i))?;
            let data: Vec<Scalar> = spec
                .data
                .iter()
                .map(|&v| Scalar::from_f64(&element, v))
                .collect();

            let value = if spec.shape.is_empty() {
                let scalar = match data.as_slice() {
                    [scalar] => *scalar,
                    _ => bail!(
                        "scalar operand {} needs exactly one value, got {}",
                        i,
                        data.len()
                    ),
                };
                b.constant(element, scalar)
            } else {
                let ty = Type::Tensor(TensorType::new(&spec.shape, element).with_encoding(
                    Encoding::Blocked {
                        size_per_thread: self.size_per_thread,
                        threads_per_block: self.threads_per_block,
                        order: vec![],
                    },
                ));
                if data.len() == 1 {
                    b.constant(ty, data[0])
                } else {
                    b.tensor_literal(ty, data)
                        .with_context(|| format!("operand {}", i))?
                }
            };
            operands.push(value);
        }

        b.print(self.prefix.clone(), self.hex, operands);
        Ok(b.build()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kprint_core::Instruction;

    #[test]
    fn test_defaults() {
        let request = PrintRequest::from_json(r#"{ "prefix": "x" }"#).unwrap();
        assert_eq!(request.grid, [1, 1, 1]);
        assert_eq!(request.threads_per_block, 1);
        let kernel = request.to_kernel().unwrap();
        assert_eq!(kernel.name, "main");
        assert_eq!(kernel.print_count(), 1);
    }

    #[test]
    fn test_operands_become_values() {
        let request = PrintRequest::from_json(
            r#"{
                "threads_per_block": 2,
                "operands": [
                    { "dtype": "si32", "shape": [2, 2], "data": [1, 2, 3, 4] },
                    { "dtype": "f32", "shape": [4], "data": [0.5] },
                    { "dtype": "ui8", "data": [300] }
                ]
            }"#,
        )
        .unwrap();
        let kernel = request.to_kernel().unwrap();

        assert!(matches!(kernel.body[0], Instruction::TensorLiteral { .. }));
        assert!(matches!(
            &kernel.body[1],
            Instruction::Constant { result, value: Scalar::Float(v) } if result.is_tensor() && *v == 0.5
        ));
        assert!(matches!(
            &kernel.body[2],
            Instruction::Constant { value: Scalar::UInt(44), .. }
        ));
        let Instruction::Print { operands, .. } = &kernel.body[3] else {
            panic!("expected a print");
        };
        assert_eq!(operands.len(), 3);
        assert_eq!(
            operands[0].ty.to_string(),
            "tensor<2x2xsi32, #blocked<spt=1, threads=2>>"
        );
    }

    #[test]
    fn test_rejects_bad_requests() {
        let bad_dtype = r#"{ "operands": [{ "dtype": "u32", "data": [1] }] }"#;
        assert!(PrintRequest::from_json(bad_dtype).unwrap().to_kernel().is_err());

        let bad_scalar = r#"{ "operands": [{ "dtype": "f32", "data": [1, 2] }] }"#;
        assert!(PrintRequest::from_json(bad_scalar).unwrap().to_kernel().is_err());

        let short_tensor = r#"{ "operands": [{ "dtype": "f32", "shape": [3], "data": [1, 2] }] }"#;
        assert!(PrintRequest::from_json(short_tensor).unwrap().to_kernel().is_err());

        let empty_grid = r#"{ "grid": [0, 1, 1] }"#;
        assert!(PrintRequest::from_json(empty_grid).unwrap().to_kernel().is_err());

        assert!(PrintRequest::from_json(r#"{ "prefx": "x" }"#).is_err());
    }
}
