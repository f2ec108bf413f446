use crate::{instructions::Axis, types::TensorType, values::Value, Result};

use super::Rewriter;

/// Knows which elements of a distributed tensor each thread holds.
///
/// Both methods see the same operand and must agree: the n-th index tuple describes the n-th
/// element. The order is whatever the layout dictates and need not be row-major.
pub trait LayoutResolver {
    fn unpack_elements(&self, rewriter: &mut Rewriter<'_>, operand: &Value) -> Result<Vec<Value>>;

    fn emit_indices(
        &self,
        rewriter: &mut Rewriter<'_>,
        operand: &Value,
        tensor: &TensorType,
    ) -> Result<Vec<Vec<Value>>>;
}

pub trait CoordinateQuery {
    fn program_id(&self, rewriter: &mut Rewriter<'_>, axis: Axis) -> Value;
}

/// Reads the coordinates from the launch grid with `program_id`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GridProgramId;

impl CoordinateQuery for GridProgramId {
    fn program_id(&self, rewriter: &mut Rewriter<'_>, axis: Axis) -> Value {
        rewriter.program_id(axis)
    }
}
