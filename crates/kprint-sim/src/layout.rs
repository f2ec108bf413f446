use kprint_core::{
    codegen::{LayoutResolver, Rewriter},
    Encoding, Instruction, IrError, TensorType, Type, Value,
};

/// Where every element of a tensor lives under its encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockedDistribution {
    shape: Vec<u64>,
    size_per_thread: u64,
    threads: u64,
    /// Dimensions from fastest to slowest varying.
    order: Vec<usize>,
}

impl BlockedDistribution {
    /// Tensors without an encoding are replicated: every thread holds all elements in
    /// row-major order.
    pub fn for_tensor(tensor: &TensorType) -> kprint_core::Result<Self> {
        let shape = tensor.static_shape().ok_or_else(|| {
            IrError::MalformedOperand(format!(
                "cannot distribute {} with dynamic dimensions",
                Type::Tensor(tensor.clone())
            ))
        })?;
        let num_elements: u64 = shape.iter().product();
        let row_major: Vec<usize> = (0..shape.len()).rev().collect();

        let (size_per_thread, threads, order) = match &tensor.encoding {
            None => (num_elements.max(1), 1, row_major),
            Some(Encoding::Blocked {
                size_per_thread,
                threads_per_block,
                order,
            }) => {
                if *size_per_thread == 0 || *threads_per_block == 0 {
                    return Err(IrError::MalformedOperand(format!(
                        "blocked encoding needs at least one element and one thread, got {}",
                        tensor.encoding.as_ref().map(|e| e.to_string()).unwrap_or_default()
                    )));
                }
                let order = if order.is_empty() {
                    row_major
                } else {
                    let mut sorted = order.clone();
                    sorted.sort_unstable();
                    if sorted != (0..shape.len()).collect::<Vec<_>>() {
                        return Err(IrError::MalformedOperand(format!(
                            "order {:?} is not a permutation of the {} dimensions",
                            order,
                            shape.len()
                        )));
                    }
                    order.clone()
                };
                (
                    u64::from(*size_per_thread),
                    u64::from(*threads_per_block),
                    order,
                )
            }
        };

        Ok(Self {
            shape,
            size_per_thread,
            threads,
            order,
        })
    }

    pub fn num_elements(&self) -> u64 {
        self.shape.iter().product()
    }

    /// Register slots every thread uses. Tensors smaller than one block tile are replicated, so
    /// the count never depends on the thread.
    pub fn slots_per_thread(&self) -> usize {
        let n = self.num_elements();
        if n == 0 {
            return 0;
        }
        let tile = self.size_per_thread * self.threads;
        (n.div_ceil(tile) * self.size_per_thread) as usize
    }

    /// Position of `slot` of `thread` along the layout order, or `None` for an empty tensor.
    pub fn linear_position(&self, thread: u32, slot: usize) -> Option<u64> {
        let slot = slot as u64;
        let rep = slot / self.size_per_thread;
        let within = slot % self.size_per_thread;
        let thread = u64::from(thread) % self.threads;
        let pos = (rep * self.threads + thread) * self.size_per_thread + within;
        pos.checked_rem(self.num_elements())
    }

    pub fn coords(&self, thread: u32, slot: usize) -> Option<Vec<u64>> {
        let mut pos = self.linear_position(thread, slot)?;
        let mut coords = vec![0; self.shape.len()];
        for &dim in &self.order {
            coords[dim] = pos % self.shape[dim];
            pos /= self.shape[dim];
        }
        Some(coords)
    }

    pub fn row_major_offset(&self, coords: &[u64]) -> usize {
        coords
            .iter()
            .zip(&self.shape)
            .fold(0u64, |acc, (&c, &d)| acc * d + c) as usize
    }
}

/// Resolves tensors through their [`Encoding`] by emitting `thread_element` and
/// `thread_index` instructions the simulator evaluates per thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockedLayout;

fn tensor_of(operand: &Value) -> kprint_core::Result<&TensorType> {
    operand
        .ty
        .as_tensor()
        .ok_or_else(|| IrError::MalformedOperand(format!("{} is not a tensor", operand.ty)))
}

impl LayoutResolver for BlockedLayout {
    fn unpack_elements(
        &self,
        rewriter: &mut Rewriter<'_>,
        operand: &Value,
    ) -> kprint_core::Result<Vec<Value>> {
        let tensor = tensor_of(operand)?;
        let dist = BlockedDistribution::for_tensor(tensor)?;
        let mut elems = Vec::with_capacity(dist.slots_per_thread());
        for slot in 0..dist.slots_per_thread() {
            let result = rewriter.fresh_value((*tensor.element).clone());
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
    ) -> kprint_core::Result<Vec<Vec<Value>>> {
        let dist = BlockedDistribution::for_tensor(tensor)?;
        let mut indices = Vec::with_capacity(dist.slots_per_thread());
        for slot in 0..dist.slots_per_thread() {
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
