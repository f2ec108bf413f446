use kprint_core::{
    codegen::{LayoutResolver, Rewriter},
    IrError, Kernel, KernelBuilder, Pass, PrintLoweringPass, Scalar, TensorType, Type, Value,
};
use kprint_emit::{EmitterConfig, Emitter, KernelEmitter, VerbosityLevel};
use pretty_assertions::assert_eq;

struct ScalarsOnly;

impl LayoutResolver for ScalarsOnly {
    fn unpack_elements(&self, _: &mut Rewriter<'_>, operand: &Value) -> kprint_core::Result<Vec<Value>> {
        Err(IrError::MalformedOperand(operand.ty.to_string()))
    }

    fn emit_indices(
        &self,
        _: &mut Rewriter<'_>,
        operand: &Value,
        _: &TensorType,
    ) -> kprint_core::Result<Vec<Vec<Value>>> {
        Err(IrError::MalformedOperand(operand.ty.to_string()))
    }
}

fn lowered_scalar_kernel() -> Kernel {
    let mut b = KernelBuilder::new("scalar");
    let x = b.constant(Type::unsigned(8), Scalar::UInt(255));
    b.print(": ", false, vec![x]);
    let mut kernel = b.build().unwrap();
    PrintLoweringPass::new(ScalarsOnly)
        .run_on_kernel(&mut kernel)
        .unwrap();
    kernel
}

#[test]
fn test_plain_output_matches_kernel_text() {
    let kernel = lowered_scalar_kernel();
    let emitter = KernelEmitter::new(EmitterConfig::plain());
    let output = emitter.emit_to_string(&kernel).unwrap();

    assert_eq!(output, kernel.to_string());
    insta::assert_snapshot!(output.trim_end(), @r###"
    kernel @scalar grid(1, 1, 1) threads(1) {
      @printfPrefix_0 = ": "
      @printfFormat_1 = "pid (%u, %u, %u) idx ()%s%u\n"

      %0 = constant 255 : ui8
      %1 = string_addr @printfPrefix_0 : ptr
      %2 = program_id x : i32
      %3 = program_id y : i32
      %4 = program_id z : i32
      %5 = string_addr @printfFormat_1 : ptr
      printf %5(%2, %3, %4, %1, %0)
    }
    "###);
}

#[test]
fn test_quiet_verbosity_hides_strings() {
    let kernel = lowered_scalar_kernel();
    let emitter = KernelEmitter::new(EmitterConfig {
        verbosity: VerbosityLevel::Quiet,
        show_types: false,
        ..EmitterConfig::plain()
    });
    let output = emitter.emit_to_string(&kernel).unwrap();

    assert!(!output.contains("@printfFormat_1 ="));
    assert!(output.contains("%5 = string_addr @printfFormat_1\n"));
    assert!(!output.contains(" : "));
}

#[test]
fn test_verbose_adds_summary() {
    let kernel = lowered_scalar_kernel();
    let emitter = KernelEmitter::new(EmitterConfig {
        verbosity: VerbosityLevel::Verbose,
        indent_width: 4,
        ..EmitterConfig::plain()
    });
    let output = emitter.emit_to_string(&kernel).unwrap();

    assert!(output.ends_with("    // 7 instructions, 1 printf, 0 print, 2 strings\n}\n"));
    assert!(output.contains("\n    printf %5(%2, %3, %4, %1, %0)\n"));
}

#[test]
fn test_unlowered_kernel_still_renders() {
    let mut b = KernelBuilder::new("raw");
    let x = b.constant(Type::f32(), Scalar::Float(0.5));
    b.print("x", true, vec![x]);
    let kernel = b.build().unwrap();

    let output = KernelEmitter::new(EmitterConfig::plain())
        .emit_to_string(&kernel)
        .unwrap();
    assert_eq!(
        output,
        "kernel @raw grid(1, 1, 1) threads(1) {\n  %0 = constant 0.5 : f32\n  print \"x\" %0 hex\n}\n"
    );
}

#[test]
fn test_config_deserializes_with_defaults() {
    let config: EmitterConfig = serde_json::from_str(r#"{ "use_colors": false }"#).unwrap();
    assert!(!config.use_colors);
    assert!(config.show_types);
    assert_eq!(config.indent_width, 2);
    assert_eq!(config.verbosity, VerbosityLevel::Normal);
}
