use crate::{values::Value, IrError, Result};

use super::{
    format_spec::format_substr,
    truncation::{max_allowed_rank, visible_rank, TRUNCATION_MARKER},
    Rewriter,
};

/// Everything needed to print the elements one thread holds of one operand.
#[derive(Debug, Clone, Copy)]
pub struct TensorPrint<'a> {
    pub prefix: &'a Value,
    /// Zero-based position of the operand in the print instruction.
    pub operand: usize,
    pub num_operands: usize,
    pub elems: &'a [Value],
    pub pid: &'a [Value; 3],
    pub indices: &'a [Vec<Value>],
    pub dim_widths: &'a [u32],
    pub hex: bool,
}

/// Emits one printf per element:
///
/// ```text
/// pid (<x>, <y>, <z>) idx (<i0>, <i1>, ...)<prefix>(operand <n>) <elem>
/// ```
///
/// `(operand <n>)` is left out when the print has a single operand. Returns the number of
/// printf calls emitted.
pub fn print_tensor(rewriter: &mut Rewriter<'_>, print: &TensorPrint<'_>) -> Result<usize> {
    if print.elems.is_empty() {
        return Err(IrError::MalformedOperand(format!(
            "operand {} has no elements to print",
            print.operand
        )));
    }
    if print.elems.len() != print.indices.len() {
        return Err(IrError::MalformedOperand(format!(
            "operand {} has {} elements but {} indices",
            print.operand,
            print.elems.len(),
            print.indices.len()
        )));
    }
    if let Some(index) = print
        .indices
        .iter()
        .find(|index| index.len() != print.dim_widths.len())
    {
        return Err(IrError::MalformedOperand(format!(
            "operand {} has rank {} but an index of arity {}",
            print.operand,
            print.dim_widths.len(),
            index.len()
        )));
    }

    let max_operands = rewriter.max_printf_operands();
    // Every element of an operand produces the same format string; allocate it once.
    let mut format_value: Option<Value> = None;

    for (elem, index) in print.elems.iter().zip(print.indices) {
        let mut format = String::new();
        let mut args: Vec<Value> = Vec::with_capacity(max_operands);

        // TODO: pad the pid once the grid size is available at lowering time.
        format.push_str("pid (");
        for (j, pid) in print.pid.iter().enumerate() {
            if j != 0 {
                format.push_str(", ");
            }
            format.push_str(&format_substr(&pid.ty, false, None)?);
            args.push(pid.clone());
        }
        format.push_str(") ");

        let (shown, truncated) =
            visible_rank(index.len(), max_allowed_rank(max_operands, args.len()));
        format.push_str("idx (");
        for (dim, coord) in index.iter().take(shown).enumerate() {
            if dim != 0 {
                format.push_str(", ");
            }
            format.push_str(&format_substr(
                &coord.ty,
                false,
                Some(print.dim_widths[dim]),
            )?);
            args.push(coord.clone());
        }
        if truncated {
            if shown != 0 {
                format.push_str(", ");
            }
            format.push_str(TRUNCATION_MARKER);
        }
        format.push(')');

        format.push_str("%s");
        args.push(print.prefix.clone());

        if print.num_operands > 1 {
            format.push_str(&format!("(operand {}) ", print.operand));
        }

        format.push_str(&format_substr(&elem.ty, print.hex, None)?);
        args.push(elem.clone());

        match &format_value {
            None => format_value = Some(rewriter.printf(&format, args)?),
            Some(value) => rewriter.printf_reusing(value, args)?,
        }
    }

    Ok(print.elems.len())
}
