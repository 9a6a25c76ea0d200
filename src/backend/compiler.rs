use crate::backend::runtime::{
    MATH_DIVIDE, MATH_MULTIPLY, MEMORY_ALLOC, STRING_APPEND_CHAR, STRING_NEW,
};
use crate::backend::vm::{Arithmetic, Instruction, Segment, THAT_POINTER, THIS_POINTER};
use crate::common::error::{CompileError, CompileResult};
use crate::frontend::ast::*;
use crate::frontend::resolve::{Scope, SignatureTable, StorageClass, Symbol, SymbolTable};

/// Per-subroutine state. Rebuilt from scratch for every subroutine, so label
/// counters and argument/local numbering never leak between subroutines.
#[derive(Debug)]
struct FunctionState {
    name: String, // qualified, `Unit.sub`
    kind: SubroutineKind,
    table: SymbolTable,
    if_labels: usize,
    while_labels: usize,
}

impl FunctionState {
    fn next_if(&mut self) -> usize {
        let id = self.if_labels;
        self.if_labels += 1;
        id
    }

    fn next_while(&mut self) -> usize {
        let id = self.while_labels;
        self.while_labels += 1;
        id
    }
}

/// Code generation for one compilation unit (one class).
#[derive(Debug)]
pub struct CompilationUnit<'a> {
    class: &'a Class,
    class_table: SymbolTable,
    signatures: &'a SignatureTable,
    code: Vec<Instruction>,
}

impl<'a> CompilationUnit<'a> {
    pub fn new(class: &'a Class, signatures: &'a SignatureTable) -> CompileResult<Self> {
        Ok(Self {
            class,
            class_table: SymbolTable::for_class(class)?,
            signatures,
            code: vec![],
        })
    }

    pub fn compile(mut self) -> CompileResult<Vec<Instruction>> {
        for subroutine in &self.class.subroutines {
            self.compile_subroutine(subroutine)?;
        }

        Ok(self.code)
    }

    fn compile_subroutine(&mut self, subroutine: &SubroutineDec) -> CompileResult<()> {
        let mut state = FunctionState {
            name: format!("{}.{}", self.class.name, subroutine.name),
            kind: subroutine.kind,
            table: SymbolTable::for_subroutine(&self.class.name, subroutine)?,
            if_labels: 0,
            while_labels: 0,
        };

        self.emit(Instruction::Function {
            name: state.name.clone(),
            locals: usize::from(state.table.count(StorageClass::Local)),
        });

        match subroutine.kind {
            SubroutineKind::Constructor => {
                // allocate the object and bind it as `this`
                let fields = u32::from(self.class_table.field_count());
                self.emit(Instruction::Push(Segment::Constant, fields));
                self.emit_call(MEMORY_ALLOC, 1);
                self.emit(Instruction::Pop(Segment::Pointer, THIS_POINTER));
            }
            SubroutineKind::Method => {
                // the receiver arrives as argument 0
                self.emit(Instruction::Push(Segment::Argument, 0));
                self.emit(Instruction::Pop(Segment::Pointer, THIS_POINTER));
            }
            SubroutineKind::Function => {}
        }

        self.compile_statements(&mut state, &subroutine.body.statements)
    }

    fn emit(&mut self, instruction: Instruction) {
        self.code.push(instruction);
    }

    fn emit_arithmetic(&mut self, command: Arithmetic) {
        self.emit(Instruction::Arithmetic(command));
    }

    fn emit_call(&mut self, name: &str, args: usize) {
        self.emit(Instruction::Call {
            name: name.into(),
            args,
        });
    }

    fn lookup(&self, state: &FunctionState, name: &str) -> Option<Symbol> {
        Scope::new(&self.class_table, &state.table)
            .lookup(name)
            .cloned()
    }

    fn resolve(&self, state: &FunctionState, name: &str) -> CompileResult<Symbol> {
        self.lookup(state, name)
            .ok_or_else(|| CompileError::UnresolvedSymbol {
                name: name.into(),
                subroutine: state.name.clone(),
            })
    }

    // segment and index a variable lives at, after the method receiver shift
    fn location(state: &FunctionState, symbol: &Symbol) -> (Segment, u32) {
        let mut index = u32::from(symbol.index);
        if symbol.kind == StorageClass::Argument && state.kind == SubroutineKind::Method {
            index += 1;
        }

        (Segment::from(symbol.kind), index)
    }

    fn push_variable(&mut self, state: &FunctionState, name: &str) -> CompileResult<()> {
        let symbol = self.resolve(state, name)?;
        let (segment, index) = Self::location(state, &symbol);
        self.emit(Instruction::Push(segment, index));
        Ok(())
    }

    fn compile_statements(
        &mut self,
        state: &mut FunctionState,
        statements: &[Statement],
    ) -> CompileResult<()> {
        for statement in statements {
            self.compile_statement(state, statement)?;
        }

        Ok(())
    }

    fn compile_statement(
        &mut self,
        state: &mut FunctionState,
        statement: &Statement,
    ) -> CompileResult<()> {
        match statement {
            Statement::Let(stmt) => self.compile_let(state, stmt),
            Statement::If(stmt) => {
                let id = state.next_if();
                let if_true = format!("IF_TRUE{}", id);
                let if_false = format!("IF_FALSE{}", id);
                let if_end = format!("IF_END{}", id);

                self.compile_expression(state, &stmt.condition)?;
                self.emit(Instruction::IfGoto(if_true.clone()));
                self.emit(Instruction::Goto(if_false.clone()));
                self.emit(Instruction::Label(if_true));
                self.compile_statements(state, &stmt.then_branch)?;
                self.emit(Instruction::Goto(if_end.clone()));
                self.emit(Instruction::Label(if_false));
                self.compile_statements(state, &stmt.else_branch)?;
                self.emit(Instruction::Label(if_end));
                Ok(())
            }
            Statement::While(stmt) => {
                let id = state.next_while();
                let start = format!("WHILE_EXP{}", id);
                let end = format!("WHILE_END{}", id);

                self.emit(Instruction::Label(start.clone()));
                self.compile_expression(state, &stmt.condition)?;
                self.emit_arithmetic(Arithmetic::Not);
                self.emit(Instruction::IfGoto(end.clone()));
                self.compile_statements(state, &stmt.body)?;
                self.emit(Instruction::Goto(start));
                self.emit(Instruction::Label(end));
                Ok(())
            }
            Statement::Do(call) => {
                self.compile_call(state, call)?;
                // discard the return value
                self.emit(Instruction::Pop(Segment::Temp, 0));
                Ok(())
            }
            Statement::Return(value) => {
                match value {
                    Some(value) => self.compile_expression(state, value)?,
                    None => self.emit(Instruction::Push(Segment::Constant, 0)),
                }
                self.emit(Instruction::Return);
                Ok(())
            }
        }
    }

    fn compile_let(&mut self, state: &mut FunctionState, stmt: &LetStatement) -> CompileResult<()> {
        let symbol = self.resolve(state, &stmt.name)?;
        let (segment, index) = Self::location(state, &symbol);

        match &stmt.index {
            None => {
                self.compile_expression(state, &stmt.value)?;
                self.emit(Instruction::Pop(segment, index));
            }
            Some(element) => {
                self.emit(Instruction::Push(segment, index));
                self.compile_expression(state, element)?;
                self.emit_arithmetic(Arithmetic::Add);
                // the value may itself index an array, so park it before
                // repointing `that`
                self.compile_expression(state, &stmt.value)?;
                self.emit(Instruction::Pop(Segment::Temp, 0));
                self.emit(Instruction::Pop(Segment::Pointer, THAT_POINTER));
                self.emit(Instruction::Push(Segment::Temp, 0));
                self.emit(Instruction::Pop(Segment::That, 0));
            }
        }

        Ok(())
    }

    // `t0 op1 t1 ... opn tn` groups to the right, so every term is pushed in
    // order and the operators are applied last to first
    fn compile_expression(
        &mut self,
        state: &mut FunctionState,
        expression: &Expression,
    ) -> CompileResult<()> {
        let mut elements = expression.elements.iter();
        match elements.next() {
            Some(ExpressionElement::Term(term)) => self.compile_term(state, term)?,
            Some(ExpressionElement::Operator(_)) => return Err(malformed(&state.name)),
            None => return Err(CompileError::syntax("expression", "nothing")),
        }

        let mut operators = vec![];
        loop {
            match (elements.next(), elements.next()) {
                (None, _) => break,
                (Some(ExpressionElement::Operator(op)), Some(ExpressionElement::Term(term))) => {
                    self.compile_term(state, term)?;
                    operators.push(*op);
                }
                _ => return Err(malformed(&state.name)),
            }
        }

        for op in operators.into_iter().rev() {
            self.compile_operator(op);
        }

        Ok(())
    }

    fn compile_operator(&mut self, op: BinaryOp) {
        match op {
            BinaryOp::Add => self.emit_arithmetic(Arithmetic::Add),
            BinaryOp::Subtract => self.emit_arithmetic(Arithmetic::Sub),
            BinaryOp::And => self.emit_arithmetic(Arithmetic::And),
            BinaryOp::Or => self.emit_arithmetic(Arithmetic::Or),
            BinaryOp::Less => self.emit_arithmetic(Arithmetic::Lt),
            BinaryOp::Greater => self.emit_arithmetic(Arithmetic::Gt),
            BinaryOp::Equal => self.emit_arithmetic(Arithmetic::Eq),
            BinaryOp::Multiply => self.emit_call(MATH_MULTIPLY, 2),
            BinaryOp::Divide => self.emit_call(MATH_DIVIDE, 2),
        }
    }

    fn compile_term(&mut self, state: &mut FunctionState, term: &Term) -> CompileResult<()> {
        match term {
            Term::IntegerConstant(value) => self.emit(Instruction::Push(Segment::Constant, *value)),
            Term::StringConstant(text) => {
                let length = text.chars().count() as u32;
                self.emit(Instruction::Push(Segment::Constant, length));
                self.emit_call(STRING_NEW, 1);
                for c in text.chars() {
                    self.emit(Instruction::Push(Segment::Constant, c as u32));
                    self.emit_call(STRING_APPEND_CHAR, 2);
                }
            }
            Term::KeywordConstant(constant) => match constant {
                KeywordConstant::True => {
                    self.emit(Instruction::Push(Segment::Constant, 0));
                    self.emit_arithmetic(Arithmetic::Not);
                }
                KeywordConstant::False | KeywordConstant::Null => {
                    self.emit(Instruction::Push(Segment::Constant, 0))
                }
                KeywordConstant::This => self.emit(Instruction::Push(Segment::Pointer, THIS_POINTER)),
            },
            Term::VarName(name) => self.push_variable(state, name)?,
            Term::ArrayElement { name, index } => {
                self.push_variable(state, name)?;
                self.compile_expression(state, index)?;
                self.emit_arithmetic(Arithmetic::Add);
                self.emit(Instruction::Pop(Segment::Pointer, THAT_POINTER));
                self.emit(Instruction::Push(Segment::That, 0));
            }
            Term::Parenthesized(inner) => self.compile_expression(state, inner)?,
            Term::Unary { op, term } => {
                self.compile_term(state, term)?;
                match op {
                    UnaryOp::Negate => self.emit_arithmetic(Arithmetic::Neg),
                    UnaryOp::Not => self.emit_arithmetic(Arithmetic::Not),
                }
            }
            Term::Call(call) => self.compile_call(state, call)?,
        }

        Ok(())
    }

    fn compile_call(&mut self, state: &mut FunctionState, call: &SubroutineCall) -> CompileResult<()> {
        let explicit = call.arguments.len();

        // (owning unit, receiver pushed)
        let (owner, with_receiver) = match &call.receiver {
            Some(receiver) => match self.lookup(state, receiver) {
                Some(symbol) => {
                    let owner = match symbol.ty.class_name() {
                        Some(owner) => owner.to_string(),
                        None => {
                            return Err(CompileError::InvalidReceiver {
                                name: receiver.clone(),
                                ty: symbol.ty.clone(),
                            });
                        }
                    };
                    let (segment, index) = Self::location(state, &symbol);
                    self.emit(Instruction::Push(segment, index));
                    (owner, true)
                }
                // not a variable, so a unit name
                None => (receiver.clone(), false),
            },
            None => {
                let owner = self.class.name.clone();
                let is_static = matches!(
                    self.signatures.get(&owner, &call.name).map(|s| s.kind),
                    Some(SubroutineKind::Function) | Some(SubroutineKind::Constructor)
                );
                if !is_static {
                    self.emit(Instruction::Push(Segment::Pointer, THIS_POINTER));
                }
                (owner, !is_static)
            }
        };

        let callee = format!("{}.{}", owner, call.name);
        if let Some(signature) = self.signatures.get(&owner, &call.name) {
            if signature.parameters != explicit {
                return Err(CompileError::Arity {
                    callee,
                    expected: signature.parameters,
                    found: explicit,
                });
            }
        }

        for argument in &call.arguments {
            self.compile_expression(state, argument)?;
        }

        let args = if with_receiver { explicit + 1 } else { explicit };
        self.emit_call(&callee, args);
        Ok(())
    }
}

fn malformed(subroutine: &str) -> CompileError {
    CompileError::syntax(
        "alternating terms and operators",
        format!("malformed expression in `{}`", subroutine),
    )
}

/// Compile one parsed unit against the build's signature table.
pub fn compile_class(class: &Class, signatures: &SignatureTable) -> CompileResult<Vec<Instruction>> {
    CompilationUnit::new(class, signatures)?.compile()
}
