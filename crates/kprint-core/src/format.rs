use crate::{instructions::Instruction, kernel::Kernel, values::Value};

/// The pieces of one instruction line, split so emitters can style them separately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionParts {
    pub result: Option<String>,
    pub opcode: &'static str,
    pub operands: String,
    pub ty: Option<String>,
}

impl InstructionParts {
    pub fn join(&self) -> String {
        let mut line = String::new();
        if let Some(result) = &self.result {
            line.push_str(result);
            line.push_str(" = ");
        }
        line.push_str(self.opcode);
        if !self.operands.is_empty() {
            line.push(' ');
            line.push_str(&self.operands);
        }
        if let Some(ty) = &self.ty {
            line.push_str(" : ");
            line.push_str(ty);
        }
        line
    }
}

fn value_list(values: &[Value]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn instruction_parts(inst: &Instruction) -> InstructionParts {
    let result = inst.result().map(|v| v.to_string());
    let ty = inst.result().map(|v| v.ty.to_string());
    let (opcode, operands) = match inst {
        Instruction::Constant { value, .. } => ("constant", value.to_string()),
        Instruction::TensorLiteral { data, .. } => {
            let data: Vec<String> = data.iter().map(|s| s.to_string()).collect();
            ("tensor_literal", format!("[{}]", data.join(", ")))
        }
        Instruction::ProgramId { axis, .. } => ("program_id", axis.to_string()),
        Instruction::StringAddr { symbol, .. } => ("string_addr", format!("@{}", symbol)),
        Instruction::ThreadElement { tensor, slot, .. } => {
            ("thread_element", format!("{}[{}]", tensor, slot))
        }
        Instruction::ThreadIndex {
            tensor, slot, dim, ..
        } => ("thread_index", format!("{}[{}], dim {}", tensor, slot, dim)),
        Instruction::Printf { format, args } => {
            ("printf", format!("{}({})", format, value_list(args)))
        }
        Instruction::Print {
            prefix,
            hex,
            operands,
        } => {
            let mut text = format!("{:?}", prefix);
            if !operands.is_empty() {
                text.push(' ');
                text.push_str(&value_list(operands));
            }
            if *hex {
                text.push_str(" hex");
            }
            ("print", text)
        }
    };
    InstructionParts {
        result,
        opcode,
        operands,
        ty,
    }
}

pub fn format_instruction(inst: &Instruction) -> String {
    instruction_parts(inst).join()
}

pub fn format_header(kernel: &Kernel) -> String {
    format!(
        "kernel @{} grid({}, {}, {}) threads({})",
        kernel.name, kernel.grid[0], kernel.grid[1], kernel.grid[2], kernel.threads_per_block
    )
}

pub fn format_kernel(kernel: &Kernel) -> String {
    let mut output = format!("{} {{\n", format_header(kernel));

    for (symbol, contents) in &kernel.strings {
        output.push_str(&format!("  @{} = {:?}\n", symbol, contents));
    }
    if !kernel.strings.is_empty() {
        output.push('\n');
    }

    for inst in &kernel.body {
        output.push_str("  ");
        output.push_str(&format_instruction(inst));
        output.push('\n');
    }

    output.push_str("}\n");
    output
}
