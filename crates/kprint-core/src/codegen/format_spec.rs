use crate::{
    types::{FloatType, Signedness, TensorType, Type},
    IrError, Result,
};

/// printf conversion for a value of type `ty`.
///
/// Hex is `0x%0Nx` (or `0x%0Nllx` above 32 bits) where N is the number of hex digits in the
/// type, so 4 for f16, 8 for i32 and 16 for i64. `width` only applies to decimal output.
pub fn format_substr(ty: &Type, hex: bool, width: Option<u32>) -> Result<String> {
    if matches!(ty, Type::Ptr) {
        return Ok("%p".to_string());
    }

    if hex {
        let bits = ty
            .int_or_float_bits()
            .ok_or_else(|| IrError::UnsupportedType(ty.clone()))?;
        let length = if bits > 32 { "ll" } else { "" };
        return Ok(format!("0x%0{}{}x", bits / 4, length));
    }

    let mut prefix = String::from("%");
    if let Some(width) = width {
        prefix.push_str(&width.to_string());
    }

    let conversion = match ty {
        Type::Float(FloatType::F16 | FloatType::BF16 | FloatType::F32 | FloatType::F64) => "f",
        Type::Int {
            bits: 64,
            signedness: Signedness::Signed,
        } => "lli",
        Type::Int {
            signedness: Signedness::Signed,
            ..
        } => "i",
        Type::Int { bits: 64, .. } => "llu",
        Type::Int { .. } => "u",
        _ => return Err(IrError::UnsupportedType(ty.clone())),
    };
    Ok(prefix + conversion)
}

/// Digits reserved for an index along a dimension of size `dim`: `ceil(log10(dim))`, or 0 when
/// the size is dynamic or zero.
///
/// Exact powers of ten get one digit less than their largest index needs (100 gives 2).
/// Computed on integers so those boundaries do not depend on libm rounding.
pub fn index_width(dim: Option<u64>) -> u32 {
    let Some(dim) = dim.filter(|&d| d > 0) else {
        return 0;
    };
    let mut width = 0;
    let mut bound: u64 = 1;
    while bound < dim {
        width += 1;
        bound = match bound.checked_mul(10) {
            Some(next) => next,
            None => break,
        };
    }
    width
}

pub fn dim_widths(tensor: &TensorType) -> Vec<u32> {
    tensor.shape.iter().map(|&dim| index_width(dim)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_pointer_ignores_flags() {
        assert_eq!(format_substr(&Type::Ptr, false, None).unwrap(), "%p");
        assert_eq!(format_substr(&Type::Ptr, true, Some(3)).unwrap(), "%p");
    }

    #[test]
    fn test_decimal_conversions() {
        let cases = [
            (Type::Float(FloatType::F16), "%f"),
            (Type::Float(FloatType::BF16), "%f"),
            (Type::f32(), "%f"),
            (Type::Float(FloatType::F64), "%f"),
            (Type::signed(8), "%i"),
            (Type::signed(32), "%i"),
            (Type::signed(64), "%lli"),
            (Type::unsigned(16), "%u"),
            (Type::unsigned(64), "%llu"),
            (Type::int(1), "%u"),
            (Type::i32(), "%u"),
            (Type::int(64), "%llu"),
        ];
        for (ty, expected) in cases {
            assert_eq!(format_substr(&ty, false, None).unwrap(), expected, "{}", ty);
        }
    }

    #[test]
    fn test_width_is_copied_verbatim() {
        assert_eq!(format_substr(&Type::i32(), false, Some(2)).unwrap(), "%2u");
        assert_eq!(format_substr(&Type::i32(), false, Some(0)).unwrap(), "%0u");
        assert_eq!(format_substr(&Type::signed(64), false, Some(12)).unwrap(), "%12lli");
        assert_eq!(format_substr(&Type::f32(), false, Some(3)).unwrap(), "%3f");
    }

    #[test]
    fn test_hex_pads_to_type_width() {
        assert_eq!(format_substr(&Type::Float(FloatType::F16), true, None).unwrap(), "0x%04x");
        assert_eq!(format_substr(&Type::i32(), true, Some(7)).unwrap(), "0x%08x");
        assert_eq!(format_substr(&Type::signed(64), true, None).unwrap(), "0x%016llx");
        assert_eq!(format_substr(&Type::Float(FloatType::F64), true, None).unwrap(), "0x%016llx");
        assert_eq!(format_substr(&Type::int(8), true, None).unwrap(), "0x%02x");
    }

    #[test]
    fn test_unsupported_types_fail() {
        let tensor = Type::tensor(&[4], Type::f32());
        assert_eq!(
            format_substr(&tensor, false, None),
            Err(IrError::UnsupportedType(tensor.clone()))
        );
        assert!(format_substr(&Type::Void, true, None).is_err());
        assert!(format_substr(&Type::Vector(Box::new(Type::f32()), 4), false, None).is_err());
        assert!(format_substr(&Type::Float(FloatType::F8E4M3), false, None).is_err());
        assert_eq!(
            format_substr(&Type::Float(FloatType::F8E5M2), true, None).unwrap(),
            "0x%02x"
        );
    }

    #[test]
    fn test_index_width_boundaries() {
        assert_eq!(index_width(None), 0);
        assert_eq!(index_width(Some(0)), 0);
        assert_eq!(index_width(Some(1)), 0);
        assert_eq!(index_width(Some(2)), 1);
        assert_eq!(index_width(Some(9)), 1);
        assert_eq!(index_width(Some(10)), 1);
        assert_eq!(index_width(Some(11)), 2);
        assert_eq!(index_width(Some(100)), 2);
        assert_eq!(index_width(Some(101)), 3);
        assert_eq!(index_width(Some(1000)), 3);
        assert_eq!(index_width(Some(u64::MAX)), 20);
    }

    #[test]
    fn test_dim_widths_for_shape() {
        let mut tensor = TensorType::new(&[10, 100, 3], Type::f32());
        tensor.shape.push(None);
        assert_eq!(dim_widths(&tensor), vec![1, 2, 1, 0]);
    }

    fn int_type() -> impl Strategy<Value = Type> {
        (
            1u16..=64,
            prop_oneof![
                Just(Signedness::Signed),
                Just(Signedness::Unsigned),
                Just(Signedness::Signless)
            ],
        )
            .prop_map(|(bits, signedness)| Type::Int { bits, signedness })
    }

    proptest! {
        #[test]
        fn property_int_suffix_matches_class(ty in int_type(), width in proptest::option::of(0u32..40)) {
            let spec = format_substr(&ty, false, width).unwrap();
            let expected_prefix = match width {
                Some(w) => format!("%{}", w),
                None => "%".to_string(),
            };
            prop_assert!(spec.starts_with(&expected_prefix));
            let Type::Int { bits, signedness } = ty else { unreachable!() };
            let suffix = match (signedness, bits == 64) {
                (Signedness::Signed, true) => "lli",
                (Signedness::Signed, false) => "i",
                (_, true) => "llu",
                (_, false) => "u",
            };
            prop_assert_eq!(&spec[expected_prefix.len()..], suffix);
        }

        #[test]
        fn property_hex_ignores_width(ty in int_type(), width in proptest::option::of(0u32..40)) {
            let bits = ty.int_or_float_bits().unwrap();
            let spec = format_substr(&ty, true, width).unwrap();
            let length = if bits > 32 { "ll" } else { "" };
            prop_assert_eq!(spec, format!("0x%0{}{}x", bits / 4, length));
        }

        #[test]
        fn property_index_width_is_ceil_log10(dim in 1u64..10_000_000) {
            let width = index_width(Some(dim));
            prop_assert!(10u64.pow(width) >= dim);
            if width > 0 {
                prop_assert!(10u64.pow(width - 1) < dim);
            }
        }
    }
}
