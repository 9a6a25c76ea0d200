#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Int,
    Char,
    Boolean,
    Class(String),
}

impl Type {
    /// Name of the class when the type is a class reference.
    pub fn class_name(&self) -> Option<&str> {
        match self {
            Type::Class(name) => Some(name.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnType {
    Void,
    Type(Type),
}

///
/// Declarations
///

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassVarKind {
    Static,
    Field,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubroutineKind {
    Constructor,
    Function,
    Method,
}

/// One compilation unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Class {
    pub name: String,
    pub variables: Vec<ClassVarDec>,
    pub subroutines: Vec<SubroutineDec>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassVarDec {
    pub kind: ClassVarKind,
    pub ty: Type,
    pub names: Vec<String>, // one or more, all sharing `ty`
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubroutineDec {
    pub kind: SubroutineKind,
    pub return_type: ReturnType,
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub body: SubroutineBody,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub ty: Type,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubroutineBody {
    pub locals: Vec<VarDec>,
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarDec {
    pub ty: Type,
    pub names: Vec<String>,
}

///
/// Statements
///

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Let(LetStatement),
    If(IfStatement),
    While(WhileStatement),
    Do(SubroutineCall),
    Return(Option<Expression>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LetStatement {
    pub name: String,
    pub index: Option<Expression>, // `let a[i] = ...`
    pub value: Expression,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IfStatement {
    pub condition: Expression,
    pub then_branch: Vec<Statement>,
    pub else_branch: Vec<Statement>, // empty when there is no `else`
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhileStatement {
    pub condition: Expression,
    pub body: Vec<Statement>,
}

///
/// Expressions
///

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    And,
    Or,
    Less,
    Greater,
    Equal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Negate, // -
    Not,    // ~
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordConstant {
    True,
    False,
    Null,
    This,
}

/// Flat alternating sequence `term (op term)*`. There is no precedence:
/// grouping is decided by the code generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    pub elements: Vec<ExpressionElement>,
}

impl Expression {
    pub fn new(elements: Vec<ExpressionElement>) -> Self {
        Self { elements }
    }

    pub fn term(term: Term) -> Self {
        Self {
            elements: vec![ExpressionElement::Term(term)],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpressionElement {
    Term(Term),
    Operator(BinaryOp),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    IntegerConstant(u32),
    StringConstant(String),
    KeywordConstant(KeywordConstant),
    VarName(String),
    ArrayElement { name: String, index: Box<Expression> },
    Parenthesized(Box<Expression>),
    Unary { op: UnaryOp, term: Box<Term> },
    Call(SubroutineCall),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubroutineCall {
    pub receiver: Option<String>, // variable or class name before the `.`
    pub name: String,
    pub arguments: Vec<Expression>,
}
