//! Call signatures of the VM runtime library. Only the shape of each call is
//! known here; the implementations live with the VM.

use crate::frontend::ast::{ReturnType, SubroutineKind, Type};
use crate::frontend::resolve::{Signature, SignatureTable};

pub const MEMORY_ALLOC: &str = "Memory.alloc";
pub const MEMORY_DEALLOC: &str = "Memory.deAlloc";
pub const MATH_MULTIPLY: &str = "Math.multiply";
pub const MATH_DIVIDE: &str = "Math.divide";
pub const STRING_NEW: &str = "String.new";
pub const STRING_APPEND_CHAR: &str = "String.appendChar";

fn object(name: &str) -> ReturnType {
    ReturnType::Type(Type::Class(name.into()))
}

/// (qualified name, signature) for every runtime routine the code generator
/// may emit a call to.
pub fn signatures() -> Vec<(&'static str, Signature)> {
    vec![
        (
            MEMORY_ALLOC,
            Signature {
                return_type: object("Array"),
                kind: SubroutineKind::Function,
                parameters: 1,
            },
        ),
        (
            MEMORY_DEALLOC,
            Signature {
                return_type: ReturnType::Void,
                kind: SubroutineKind::Function,
                parameters: 1,
            },
        ),
        (
            MATH_MULTIPLY,
            Signature {
                return_type: ReturnType::Type(Type::Int),
                kind: SubroutineKind::Function,
                parameters: 2,
            },
        ),
        (
            MATH_DIVIDE,
            Signature {
                return_type: ReturnType::Type(Type::Int),
                kind: SubroutineKind::Function,
                parameters: 2,
            },
        ),
        (
            STRING_NEW,
            Signature {
                return_type: object("String"),
                kind: SubroutineKind::Constructor,
                parameters: 1,
            },
        ),
        (
            STRING_APPEND_CHAR,
            Signature {
                return_type: object("String"),
                kind: SubroutineKind::Method,
                parameters: 1,
            },
        ),
    ]
}

impl SignatureTable {
    /// Table pre-populated with the runtime library.
    pub fn with_runtime() -> Self {
        let mut table = Self::new();
        table.add_runtime();
        table
    }

    /// Add the runtime routines that no unit of the build defines itself.
    pub fn add_runtime(&mut self) {
        for (name, signature) in signatures() {
            self.insert_default(name, signature);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_table() {
        let table = SignatureTable::with_runtime();

        for (name, signature) in signatures() {
            let (unit, subroutine) = name.split_once('.').expect("qualified name");
            assert_eq!(table.get(unit, subroutine), Some(&signature));
        }
        assert_eq!(table.get("Math", "divide").map(|s| s.parameters), Some(2));
        assert_eq!(
            table.get("String", "appendChar").map(|s| s.kind),
            Some(SubroutineKind::Method)
        );
        assert!(table.get("Memory", "alloc").is_some());
    }

    #[test]
    fn test_units_override_runtime() {
        let mut table = SignatureTable::new();
        table
            .insert(
                "Math.divide".into(),
                Signature {
                    return_type: ReturnType::Type(Type::Int),
                    kind: SubroutineKind::Function,
                    parameters: 3,
                },
            )
            .expect("insert");
        table.add_runtime();

        assert_eq!(table.get("Math", "divide").map(|s| s.parameters), Some(3));
        assert_eq!(table.get("Math", "multiply").map(|s| s.parameters), Some(2));
    }
}
