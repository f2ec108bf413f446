use colored::{Color, Colorize};
use std::io::Write;

use kprint_core::{
    format::{format_header, instruction_parts},
    Instruction, Kernel,
};

use crate::{
    config::EmitterConfig,
    emitter::{EmitContext, EmitResult, Emitter},
};

/// Renders a kernel as text: the header, its string constants, then the body.
pub struct KernelEmitter {
    config: EmitterConfig,
}

impl KernelEmitter {
    pub fn new(config: EmitterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EmitterConfig {
        &self.config
    }

    fn paint(&self, text: &str, color: Color) -> String {
        if self.config.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn dim(&self, text: &str) -> String {
        if self.config.use_colors {
            text.dimmed().to_string()
        } else {
            text.to_string()
        }
    }

    fn format_instruction(&self, inst: &Instruction) -> String {
        let parts = instruction_parts(inst);
        let opcode_color = match inst {
            Instruction::Printf { .. } => Color::Green,
            // Anything still printing here was never lowered.
            Instruction::Print { .. } => Color::Red,
            _ => Color::Blue,
        };

        let mut line = String::new();
        if let Some(result) = &parts.result {
            line.push_str(&self.paint(result, Color::Yellow));
            line.push_str(" = ");
        }
        line.push_str(&self.paint(parts.opcode, opcode_color));
        if !parts.operands.is_empty() {
            line.push(' ');
            line.push_str(&parts.operands);
        }
        if self.config.show_types {
            if let Some(ty) = &parts.ty {
                line.push_str(&self.dim(&format!(" : {}", ty)));
            }
        }
        line
    }
}

impl Default for KernelEmitter {
    fn default() -> Self {
        Self::new(EmitterConfig::default())
    }
}

impl Emitter for KernelEmitter {
    type Item = Kernel;

    fn new_context(&self) -> EmitContext {
        EmitContext::new(self.config.indent_width)
    }

    fn emit<W: Write>(
        &self,
        kernel: &Kernel,
        writer: &mut W,
        context: &mut EmitContext,
    ) -> EmitResult {
        context.write_line(writer, &format!("{} {{", format_header(kernel)))?;
        context.indent();

        if self.config.verbosity.should_print_strings() && !kernel.strings.is_empty() {
            for (symbol, contents) in &kernel.strings {
                let symbol = self.paint(&format!("@{}", symbol), Color::Cyan);
                context.write_line(writer, &format!("{} = {:?}", symbol, contents))?;
            }
            writeln!(writer)?;
        }

        for inst in &kernel.body {
            context.write_line(writer, &self.format_instruction(inst))?;
        }

        if self.config.verbosity.should_print_summary() {
            let summary = format!(
                "// {} instructions, {} printf, {} print, {} strings",
                kernel.body.len(),
                kernel.printf_count(),
                kernel.print_count(),
                kernel.strings.len()
            );
            context.write_line(writer, &self.paint(&summary, Color::Green))?;
        }

        context.dedent();
        context.write_line(writer, "}")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kprint_core::{Scalar, Type, Value, ValueId};

    #[test]
    fn test_types_can_be_hidden() {
        let inst = Instruction::Constant {
            result: Value::new(ValueId(3), Type::i32()),
            value: Scalar::UInt(7),
        };
        let emitter = KernelEmitter::new(EmitterConfig {
            show_types: false,
            ..EmitterConfig::plain()
        });
        assert_eq!(emitter.format_instruction(&inst), "%3 = constant 7");

        let typed = KernelEmitter::new(EmitterConfig::plain());
        assert_eq!(typed.format_instruction(&inst), "%3 = constant 7 : i32");
    }

    #[test]
    fn test_colored_output_keeps_text() {
        colored::control::set_override(true);
        let emitter = KernelEmitter::default();
        let inst = Instruction::Print {
            prefix: "x".to_string(),
            hex: false,
            operands: vec![],
        };
        let line = emitter.format_instruction(&inst);
        colored::control::unset_override();
        assert!(line.contains("print"));
        assert!(line.contains("\"x\""));
        assert!(line.contains("\u{1b}["));
    }
}
