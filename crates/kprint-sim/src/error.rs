use kprint_core::{IrError, Type, ValueId};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Value {0} used before it was defined")]
    UndefinedValue(ValueId),
    #[error("Unknown string constant @{0}")]
    UnknownSymbol(String),
    #[error("Kernel still contains a print; run print lowering first")]
    UnloweredPrint,
    #[error("Malformed format string {format:?}: {reason}")]
    BadFormat { format: String, reason: String },
    #[error("Format string {format:?} expects more than {given} arguments")]
    MissingArgument { format: String, given: usize },
    #[error("Format string {format:?} leaves {unused} arguments unused")]
    UnusedArguments { format: String, unused: usize },
    #[error("Conversion %{conversion} cannot print a {found} argument")]
    ArgumentMismatch { conversion: char, found: &'static str },
    #[error("Thread reads slot {slot} of empty tensor {ty}")]
    EmptyTensor { ty: Type, slot: usize },
    #[error("Cannot simulate values of type {0}")]
    UnsupportedType(Type),
    #[error(transparent)]
    Layout(#[from] IrError),
}

pub type Result<T> = std::result::Result<T, SimError>;
