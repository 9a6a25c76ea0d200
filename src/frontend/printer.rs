//! Source pretty-printer. Renders an AST back into equivalent source text
//! with canonical spacing, so `parse(print(ast)) == ast`.

use std::fmt::{self, Display, Formatter};

use super::ast::*;

const INDENT: &str = "    ";

impl Display for Type {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::Char => write!(f, "char"),
            Type::Boolean => write!(f, "boolean"),
            Type::Class(name) => write!(f, "{}", name),
        }
    }
}

impl Display for ReturnType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ReturnType::Void => write!(f, "void"),
            ReturnType::Type(ty) => write!(f, "{}", ty),
        }
    }
}

impl Display for SubroutineKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let keyword = match self {
            SubroutineKind::Constructor => "constructor",
            SubroutineKind::Function => "function",
            SubroutineKind::Method => "method",
        };
        write!(f, "{}", keyword)
    }
}

impl Display for BinaryOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            BinaryOp::Add => '+',
            BinaryOp::Subtract => '-',
            BinaryOp::Multiply => '*',
            BinaryOp::Divide => '/',
            BinaryOp::And => '&',
            BinaryOp::Or => '|',
            BinaryOp::Less => '<',
            BinaryOp::Greater => '>',
            BinaryOp::Equal => '=',
        };
        write!(f, "{}", symbol)
    }
}

impl Display for Class {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "class {} {{", self.name)?;

        for variable in &self.variables {
            let keyword = match variable.kind {
                ClassVarKind::Static => "static",
                ClassVarKind::Field => "field",
            };
            writeln!(
                f,
                "{}{} {} {};",
                INDENT,
                keyword,
                variable.ty,
                variable.names.join(", ")
            )?;
        }

        for subroutine in &self.subroutines {
            writeln!(f)?;
            write!(f, "{}", subroutine)?;
        }

        writeln!(f, "}}")
    }
}

impl Display for SubroutineDec {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let parameters = self
            .parameters
            .iter()
            .map(|param| format!("{} {}", param.ty, param.name))
            .collect::<Vec<String>>()
            .join(", ");

        writeln!(
            f,
            "{}{} {} {}({}) {{",
            INDENT, self.kind, self.return_type, self.name, parameters
        )?;

        for local in &self.body.locals {
            writeln!(f, "{0}{0}var {1} {2};", INDENT, local.ty, local.names.join(", "))?;
        }

        write_statements(f, &self.body.statements, 2)?;
        writeln!(f, "{}}}", INDENT)
    }
}

fn write_statements(f: &mut Formatter<'_>, statements: &[Statement], depth: usize) -> fmt::Result {
    for statement in statements {
        write_statement(f, statement, depth)?;
    }

    Ok(())
}

fn write_statement(f: &mut Formatter<'_>, statement: &Statement, depth: usize) -> fmt::Result {
    let pad = INDENT.repeat(depth);

    match statement {
        Statement::Let(stmt) => match &stmt.index {
            Some(index) => writeln!(f, "{}let {}[{}] = {};", pad, stmt.name, index, stmt.value),
            None => writeln!(f, "{}let {} = {};", pad, stmt.name, stmt.value),
        },
        Statement::If(stmt) => {
            writeln!(f, "{}if ({}) {{", pad, stmt.condition)?;
            write_statements(f, &stmt.then_branch, depth + 1)?;
            if stmt.else_branch.is_empty() {
                writeln!(f, "{}}}", pad)
            } else {
                writeln!(f, "{}}} else {{", pad)?;
                write_statements(f, &stmt.else_branch, depth + 1)?;
                writeln!(f, "{}}}", pad)
            }
        }
        Statement::While(stmt) => {
            writeln!(f, "{}while ({}) {{", pad, stmt.condition)?;
            write_statements(f, &stmt.body, depth + 1)?;
            writeln!(f, "{}}}", pad)
        }
        Statement::Do(call) => writeln!(f, "{}do {};", pad, call),
        Statement::Return(Some(value)) => writeln!(f, "{}return {};", pad, value),
        Statement::Return(None) => writeln!(f, "{}return;", pad),
    }
}

impl Display for Statement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write_statement(f, self, 0)
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, element) in self.elements.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            match element {
                ExpressionElement::Term(term) => write!(f, "{}", term)?,
                ExpressionElement::Operator(op) => write!(f, "{}", op)?,
            }
        }

        Ok(())
    }
}

impl Display for Term {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Term::IntegerConstant(value) => write!(f, "{}", value),
            Term::StringConstant(text) => write!(f, "\"{}\"", text),
            Term::KeywordConstant(constant) => {
                let keyword = match constant {
                    KeywordConstant::True => "true",
                    KeywordConstant::False => "false",
                    KeywordConstant::Null => "null",
                    KeywordConstant::This => "this",
                };
                write!(f, "{}", keyword)
            }
            Term::VarName(name) => write!(f, "{}", name),
            Term::ArrayElement { name, index } => write!(f, "{}[{}]", name, index),
            Term::Parenthesized(inner) => write!(f, "({})", inner),
            Term::Unary { op, term } => match op {
                UnaryOp::Negate => write!(f, "-{}", term),
                UnaryOp::Not => write!(f, "~{}", term),
            },
            Term::Call(call) => write!(f, "{}", call),
        }
    }
}

impl Display for SubroutineCall {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let arguments = self
            .arguments
            .iter()
            .map(|arg| arg.to_string())
            .collect::<Vec<String>>()
            .join(", ");

        match &self.receiver {
            Some(receiver) => write!(f, "{}.{}({})", receiver, self.name, arguments),
            None => write!(f, "{}({})", self.name, arguments),
        }
    }
}
