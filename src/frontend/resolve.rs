use std::collections::HashMap;

use crate::common::error::{CompileError, CompileResult};

use super::ast::{Class, ClassVarKind, ReturnType, SubroutineDec, SubroutineKind, Type};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageClass {
    Static,
    Field,
    Argument,
    Local,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub ty: Type,
    pub kind: StorageClass,
    pub index: u16, // zero-based within `kind`
}

/// Running counters, one per storage class. Indices are handed out in
/// declaration order and never reused.
#[derive(Debug, Default, Clone)]
struct Counters {
    counts: HashMap<StorageClass, u16>,
}

impl Counters {
    fn next(&mut self, kind: StorageClass) -> u16 {
        let count = self.counts.entry(kind).or_insert(0);
        let index = *count;
        *count += 1;
        index
    }

    fn count(&self, kind: StorageClass) -> u16 {
        self.counts.get(&kind).copied().unwrap_or(0)
    }
}

/// Name to storage-location table for one scope level.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    scope: String,
    names: HashMap<String, Symbol>,
    counters: Counters,
}

impl SymbolTable {
    pub fn new(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            names: HashMap::new(),
            counters: Counters::default(),
        }
    }

    /// Unit-level table: statics and fields, each counted separately.
    pub fn for_class(class: &Class) -> CompileResult<Self> {
        let mut table = Self::new(format!("class `{}`", class.name));

        for dec in &class.variables {
            let kind = match dec.kind {
                ClassVarKind::Static => StorageClass::Static,
                ClassVarKind::Field => StorageClass::Field,
            };
            for name in &dec.names {
                table.define(name, dec.ty.clone(), kind)?;
            }
        }

        Ok(table)
    }

    /// Subroutine-level table, rebuilt for every subroutine: parameters then
    /// locals, both numbered from zero. Method receiver shifting is left to
    /// the code generator.
    pub fn for_subroutine(class_name: &str, subroutine: &SubroutineDec) -> CompileResult<Self> {
        let mut table = Self::new(format!("`{}.{}`", class_name, subroutine.name));

        for param in &subroutine.parameters {
            table.define(&param.name, param.ty.clone(), StorageClass::Argument)?;
        }

        for local in &subroutine.body.locals {
            for name in &local.names {
                table.define(name, local.ty.clone(), StorageClass::Local)?;
            }
        }

        Ok(table)
    }

    pub fn define(&mut self, name: &str, ty: Type, kind: StorageClass) -> CompileResult<()> {
        if self.names.contains_key(name) {
            return Err(CompileError::DuplicateSymbol {
                name: name.into(),
                scope: self.scope.clone(),
            });
        }

        let index = self.counters.next(kind);
        self.names.insert(name.into(), Symbol { ty, kind, index });
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.names.get(name)
    }

    pub fn count(&self, kind: StorageClass) -> u16 {
        self.counters.count(kind)
    }

    pub fn field_count(&self) -> u16 {
        self.count(StorageClass::Field)
    }
}

/// Two-level lexical scope used while compiling one subroutine body.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    pub class: &'a SymbolTable,
    pub subroutine: &'a SymbolTable,
}

impl<'a> Scope<'a> {
    pub fn new(class: &'a SymbolTable, subroutine: &'a SymbolTable) -> Self {
        Self { class, subroutine }
    }

    // subroutine level shadows unit level
    pub fn lookup(&self, name: &str) -> Option<&'a Symbol> {
        self.subroutine.get(name).or_else(|| self.class.get(name))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub return_type: ReturnType,
    pub kind: SubroutineKind,
    pub parameters: usize, // explicit parameters, receiver excluded
}

/// Every subroutine known to a build, keyed by `Unit.subroutine`. Filled for
/// all units before any unit is code-generated, then only read.
#[derive(Debug, Clone, Default)]
pub struct SignatureTable {
    signatures: HashMap<String, Signature>,
}

impl SignatureTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, qualified_name: String, signature: Signature) -> CompileResult<()> {
        if self.signatures.contains_key(&qualified_name) {
            return Err(CompileError::DuplicateSymbol {
                name: qualified_name,
                scope: "the build".into(),
            });
        }

        self.signatures.insert(qualified_name, signature);
        Ok(())
    }

    // keeps an existing entry
    pub fn insert_default(&mut self, qualified_name: &str, signature: Signature) {
        self.signatures
            .entry(qualified_name.into())
            .or_insert(signature);
    }

    pub fn register_class(&mut self, class: &Class) -> CompileResult<()> {
        for subroutine in &class.subroutines {
            self.insert(
                format!("{}.{}", class.name, subroutine.name),
                Signature {
                    return_type: subroutine.return_type.clone(),
                    kind: subroutine.kind,
                    parameters: subroutine.parameters.len(),
                },
            )?;
        }

        Ok(())
    }

    pub fn get(&self, class_name: &str, subroutine: &str) -> Option<&Signature> {
        self.signatures.get(&format!("{}.{}", class_name, subroutine))
    }
}
