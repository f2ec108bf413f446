/*! Test coverage for print lowering.
 *
 * Layouts are stubbed with synthetic resolvers so the lowering can be checked in isolation: the
 * exact printf format strings, argument lists, truncation and the in-place rewrite of kernels.
 */


use crate::{
    codegen::{LayoutResolver, Rewriter},
    instructions::Instruction,
    kernel::Kernel,
    types::{TensorType, Type},
    values::Value,
    Result,
};

/// Every thread holds `slots` elements; slot `n` sits at linear position `n`.
pub(crate) struct FixedLayout {
    pub slots: usize,
}

impl LayoutResolver for FixedLayout {
    fn unpack_elements(&self, rewriter: &mut Rewriter<'_>, operand: &Value) -> Result<Vec<Value>> {
        let elem_ty = operand.ty.element_type().clone();
        let mut elems = Vec::with_capacity(self.slots);
        for slot in 0..self.slots {
            let result = rewriter.fresh_value(elem_ty.clone());
            rewriter.insert(Instruction::ThreadElement {
                result: result.clone(),
                tensor: operand.clone(),
                slot,
            });
            elems.push(result);
        }
        Ok(elems)
    }

    fn emit_indices(
        &self,
        rewriter: &mut Rewriter<'_>,
        operand: &Value,
        tensor: &TensorType,
    ) -> Result<Vec<Vec<Value>>> {
        let mut indices = Vec::with_capacity(self.slots);
        for slot in 0..self.slots {
            let mut index = Vec::with_capacity(tensor.rank());
            for dim in 0..tensor.rank() {
                let result = rewriter.fresh_value(Type::i32());
                rewriter.insert(Instruction::ThreadIndex {
                    result: result.clone(),
                    tensor: operand.clone(),
                    slot,
                    dim,
                });
                index.push(result);
            }
            indices.push(index);
        }
        Ok(indices)
    }
}

/// Every thread holds the whole tensor in row-major order.
pub(crate) struct ReplicatedLayout;

impl LayoutResolver for ReplicatedLayout {
    fn unpack_elements(&self, rewriter: &mut Rewriter<'_>, operand: &Value) -> Result<Vec<Value>> {
        let slots = operand
            .ty
            .as_tensor()
            .and_then(|t| t.num_elements())
            .unwrap_or(0) as usize;
        FixedLayout { slots }.unpack_elements(rewriter, operand)
    }

    fn emit_indices(
        &self,
        rewriter: &mut Rewriter<'_>,
        operand: &Value,
        tensor: &TensorType,
    ) -> Result<Vec<Vec<Value>>> {
        let slots = tensor.num_elements().unwrap_or(0) as usize;
        FixedLayout { slots }.emit_indices(rewriter, operand, tensor)
    }
}

pub(crate) fn kernel() -> Kernel {
    Kernel::new("test", [1, 1, 1], 1)
}

/// Format string text and argument list of every printf in `insts`, in order.
pub(crate) fn printf_calls(kernel: &Kernel, insts: &[Instruction]) -> Vec<(String, Vec<Value>)> {
    let addr_symbols: std::collections::HashMap<_, _> = insts
        .iter()
        .filter_map(|inst| match inst {
            Instruction::StringAddr { result, symbol } => Some((result.id, symbol.clone())),
            _ => None,
        })
        .collect();

    insts
        .iter()
        .filter_map(|inst| match inst {
            Instruction::Printf { format, args } => {
                let symbol = &addr_symbols[&format.id];
                let text = kernel.string(symbol).unwrap().to_string();
                Some((text, args.clone()))
            }
            _ => None,
        })
        .collect()
}
