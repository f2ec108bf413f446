/// nvptx printf only accepts 32 arguments; anything past that prints garbage.
pub const MAX_PRINTF_OPERANDS: usize = 32;

/// Arguments that always follow the index: the prefix string and the element.
pub const TRAILING_OPERANDS: usize = 2;

pub const TRUNCATION_MARKER: &str = "... (truncated)";

/// How many index dimensions fit once `consumed` arguments are already taken.
pub fn max_allowed_rank(max_operands: usize, consumed: usize) -> usize {
    max_operands.saturating_sub(consumed + TRAILING_OPERANDS)
}

/// Dimensions actually printed for an index of `rank` and whether the marker is needed.
pub fn visible_rank(rank: usize, max_allowed: usize) -> (usize, bool) {
    if rank > max_allowed {
        (max_allowed, true)
    } else {
        (rank, false)
    }
}
