use tracing::{debug, trace};

use crate::{instructions::Axis, values::Value, Result};

use super::{
    format_spec::{dim_widths, format_substr},
    print_tensor::{print_tensor, TensorPrint},
    CoordinateQuery, LayoutResolver, Rewriter,
};

/// Lowers `print <prefix> <operands>` into printf calls appended to `rewriter`.
///
/// For each operand every element resident in the current thread is printed on its own line
/// with its index in the tensor. Returns the number of printf calls emitted.
pub fn lower_print<L, C>(
    rewriter: &mut Rewriter<'_>,
    layout: &L,
    coords: &C,
    prefix: &str,
    hex: bool,
    operands: &[Value],
) -> Result<usize>
where
    L: LayoutResolver + ?Sized,
    C: CoordinateQuery + ?Sized,
{
    let prefix_str = rewriter.add_string_to_module("printfPrefix_", prefix);
    let pid: [Value; 3] = Axis::ALL.map(|axis| coords.program_id(rewriter, axis));

    // Just the prefix, no tensors.
    if operands.is_empty() {
        let format = format!(
            "pid ({}, {}, {})%s",
            format_substr(&pid[0].ty, false, None)?,
            format_substr(&pid[1].ty, false, None)?,
            format_substr(&pid[2].ty, false, None)?
        );
        let [x, y, z] = pid;
        rewriter.printf(&format, vec![x, y, z, prefix_str])?;
        return Ok(1);
    }

    let mut emitted = 0;
    for (i, operand) in operands.iter().enumerate() {
        let (elems, indices, widths) = match operand.ty.as_tensor() {
            Some(tensor) => {
                let elems = layout.unpack_elements(rewriter, operand)?;
                // Indices follow the layout, so they need not come in any nice order.
                let indices = layout.emit_indices(rewriter, operand, tensor)?;
                (elems, indices, dim_widths(tensor))
            }
            // Scalars are their own single element with an empty index.
            None => (vec![operand.clone()], vec![Vec::new()], Vec::new()),
        };

        if elems.is_empty() {
            trace!(operand = i, "no elements resident in this thread, skipping");
            continue;
        }

        emitted += print_tensor(
            rewriter,
            &TensorPrint {
                prefix: &prefix_str,
                operand: i,
                num_operands: operands.len(),
                elems: &elems,
                pid: &pid,
                indices: &indices,
                dim_widths: &widths,
                hex,
            },
        )?;
    }

    debug!(
        operands = operands.len(),
        calls = emitted,
        "lowered print {:?}",
        prefix
    );
    Ok(emitted)
}
