use kprint::{lower_and_run, KernelBuilder, Scalar, Type};
use pretty_assertions::assert_eq;

#[test]
fn test_lower_and_run_scalar_print() {
    let mut b = KernelBuilder::new("facade").grid([2, 1, 1]);
    let x = b.constant(Type::signed(64), Scalar::Int(-3));
    b.print(" = ", false, vec![x]);
    let mut kernel = b.build().unwrap();

    let lines = lower_and_run(&mut kernel).unwrap();
    let texts: Vec<_> = lines.iter().map(|l| l.text.as_str()).collect();
    assert_eq!(
        texts,
        vec!["pid (0, 0, 0) idx () = -3", "pid (1, 0, 0) idx () = -3"]
    );
    assert_eq!(kernel.print_count(), 0);
}
