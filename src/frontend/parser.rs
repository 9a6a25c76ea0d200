use crate::common::error::{CompileError, CompileResult};

use super::ast::*;
use super::lexer::{Keyword, Symbol, Token};

/// Recursive-descent parser over a fully lexed unit. Each production
/// consumes a prefix of the remaining tokens; the first mismatch aborts.
#[derive(Debug)]
pub struct Parser<'a> {
    tokens: &'a [Token],
    current: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, current: 0 }
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.tokens.len()
    }

    pub fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.current)
    }

    fn peek_next(&self) -> Option<&'a Token> {
        self.tokens.get(self.current + 1)
    }

    pub fn advance(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.current)?;
        self.current += 1;
        Some(token)
    }

    fn check_symbol(&self, symbol: Symbol) -> bool {
        matches!(self.peek(), Some(Token::Symbol(s)) if *s == symbol)
    }

    fn check_keyword(&self, keyword: Keyword) -> bool {
        matches!(self.peek(), Some(Token::Keyword(k)) if *k == keyword)
    }

    fn found(&self) -> String {
        match self.peek() {
            Some(token) => token.to_string(),
            None => "end of input".into(),
        }
    }

    fn error<T>(&self, expected: impl Into<String>) -> CompileResult<T> {
        Err(CompileError::syntax(expected, self.found()))
    }

    fn expect_symbol(&mut self, symbol: Symbol) -> CompileResult<()> {
        if self.check_symbol(symbol) {
            self.current += 1;
            Ok(())
        } else {
            self.error(format!("`{}`", symbol.as_char()))
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> CompileResult<()> {
        if self.check_keyword(keyword) {
            self.current += 1;
            Ok(())
        } else {
            self.error(format!("`{}`", keyword.as_str()))
        }
    }

    fn expect_identifier(&mut self) -> CompileResult<String> {
        match self.peek() {
            Some(Token::Identifier(name)) => {
                self.current += 1;
                Ok(name.clone())
            }
            _ => self.error("an identifier"),
        }
    }

    /// class Name { classVarDec* subroutineDec* }
    pub fn parse_class(&mut self) -> CompileResult<Class> {
        self.expect_keyword(Keyword::Class)?;
        let name = self.expect_identifier()?;
        self.expect_symbol(Symbol::LeftBrace)?;

        let mut variables = vec![];
        while self.check_keyword(Keyword::Static) || self.check_keyword(Keyword::Field) {
            variables.push(self.class_var_dec()?);
        }

        let mut subroutines = vec![];
        while let Some(Token::Keyword(
            Keyword::Constructor | Keyword::Function | Keyword::Method,
        )) = self.peek()
        {
            subroutines.push(self.subroutine_dec()?);
        }

        self.expect_symbol(Symbol::RightBrace)?;

        if !self.is_at_end() {
            return self.error("end of input after the class body");
        }

        Ok(Class {
            name,
            variables,
            subroutines,
        })
    }

    fn class_var_dec(&mut self) -> CompileResult<ClassVarDec> {
        let kind = match self.peek() {
            Some(Token::Keyword(Keyword::Static)) => ClassVarKind::Static,
            Some(Token::Keyword(Keyword::Field)) => ClassVarKind::Field,
            _ => return self.error("`static` or `field`"),
        };
        self.current += 1;
        let ty = self.parse_type()?;
        let names = self.name_list()?;

        Ok(ClassVarDec { kind, ty, names })
    }

    // name (, name)* ;
    fn name_list(&mut self) -> CompileResult<Vec<String>> {
        let mut names = vec![self.expect_identifier()?];
        while self.check_symbol(Symbol::Comma) {
            self.advance();
            names.push(self.expect_identifier()?);
        }
        self.expect_symbol(Symbol::Semicolon)?;

        Ok(names)
    }

    fn parse_type(&mut self) -> CompileResult<Type> {
        let ty = match self.peek() {
            Some(Token::Keyword(Keyword::Int)) => Type::Int,
            Some(Token::Keyword(Keyword::Char)) => Type::Char,
            Some(Token::Keyword(Keyword::Boolean)) => Type::Boolean,
            Some(Token::Identifier(name)) => Type::Class(name.clone()),
            _ => return self.error("a type"),
        };
        self.current += 1;

        Ok(ty)
    }

    fn subroutine_dec(&mut self) -> CompileResult<SubroutineDec> {
        let kind = match self.peek() {
            Some(Token::Keyword(Keyword::Constructor)) => SubroutineKind::Constructor,
            Some(Token::Keyword(Keyword::Function)) => SubroutineKind::Function,
            Some(Token::Keyword(Keyword::Method)) => SubroutineKind::Method,
            _ => return self.error("`constructor`, `function` or `method`"),
        };
        self.current += 1;

        let return_type = if self.check_keyword(Keyword::Void) {
            self.advance();
            ReturnType::Void
        } else {
            ReturnType::Type(self.parse_type()?)
        };

        let name = self.expect_identifier()?;
        self.expect_symbol(Symbol::LeftParen)?;
        let parameters = self.parameter_list()?;
        self.expect_symbol(Symbol::RightParen)?;
        let body = self.subroutine_body()?;

        Ok(SubroutineDec {
            kind,
            return_type,
            name,
            parameters,
            body,
        })
    }

    fn parameter_list(&mut self) -> CompileResult<Vec<Parameter>> {
        let mut parameters = vec![];
        if self.check_symbol(Symbol::RightParen) {
            return Ok(parameters);
        }

        loop {
            let ty = self.parse_type()?;
            let name = self.expect_identifier()?;
            parameters.push(Parameter { ty, name });

            if !self.check_symbol(Symbol::Comma) {
                break;
            }
            self.advance();
        }

        Ok(parameters)
    }

    fn subroutine_body(&mut self) -> CompileResult<SubroutineBody> {
        self.expect_symbol(Symbol::LeftBrace)?;

        let mut locals = vec![];
        while self.check_keyword(Keyword::Var) {
            self.advance();
            let ty = self.parse_type()?;
            let names = self.name_list()?;
            locals.push(VarDec { ty, names });
        }

        let statements = self.statements()?;
        self.expect_symbol(Symbol::RightBrace)?;

        Ok(SubroutineBody { locals, statements })
    }

    // statement* up to (not including) the closing brace
    fn statements(&mut self) -> CompileResult<Vec<Statement>> {
        let mut statements = vec![];
        while !self.check_symbol(Symbol::RightBrace) {
            statements.push(self.statement()?);
        }

        Ok(statements)
    }

    fn block(&mut self) -> CompileResult<Vec<Statement>> {
        self.expect_symbol(Symbol::LeftBrace)?;
        let statements = self.statements()?;
        self.expect_symbol(Symbol::RightBrace)?;

        Ok(statements)
    }

    fn statement(&mut self) -> CompileResult<Statement> {
        match self.peek() {
            Some(Token::Keyword(Keyword::Let)) => self.let_statement(),
            Some(Token::Keyword(Keyword::If)) => self.if_statement(),
            Some(Token::Keyword(Keyword::While)) => self.while_statement(),
            Some(Token::Keyword(Keyword::Do)) => self.do_statement(),
            Some(Token::Keyword(Keyword::Return)) => self.return_statement(),
            _ => self.error("a statement (`let`, `if`, `while`, `do` or `return`)"),
        }
    }

    fn let_statement(&mut self) -> CompileResult<Statement> {
        self.expect_keyword(Keyword::Let)?;
        let name = self.expect_identifier()?;

        let index = if self.check_symbol(Symbol::LeftBracket) {
            self.advance();
            let index = self.expression()?;
            self.expect_symbol(Symbol::RightBracket)?;
            Some(index)
        } else {
            None
        };

        self.expect_symbol(Symbol::Equal)?;
        let value = self.expression()?;
        self.expect_symbol(Symbol::Semicolon)?;

        Ok(Statement::Let(LetStatement { name, index, value }))
    }

    fn condition(&mut self) -> CompileResult<Expression> {
        self.expect_symbol(Symbol::LeftParen)?;
        let condition = self.expression()?;
        self.expect_symbol(Symbol::RightParen)?;

        Ok(condition)
    }

    fn if_statement(&mut self) -> CompileResult<Statement> {
        self.expect_keyword(Keyword::If)?;
        let condition = self.condition()?;
        let then_branch = self.block()?;

        let else_branch = if self.check_keyword(Keyword::Else) {
            self.advance();
            self.block()?
        } else {
            vec![]
        };

        Ok(Statement::If(IfStatement {
            condition,
            then_branch,
            else_branch,
        }))
    }

    fn while_statement(&mut self) -> CompileResult<Statement> {
        self.expect_keyword(Keyword::While)?;
        let condition = self.condition()?;
        let body = self.block()?;

        Ok(Statement::While(WhileStatement { condition, body }))
    }

    fn do_statement(&mut self) -> CompileResult<Statement> {
        self.expect_keyword(Keyword::Do)?;
        let name = self.expect_identifier()?;
        let call = self.subroutine_call(name)?;
        self.expect_symbol(Symbol::Semicolon)?;

        Ok(Statement::Do(call))
    }

    fn return_statement(&mut self) -> CompileResult<Statement> {
        self.expect_keyword(Keyword::Return)?;

        if self.check_symbol(Symbol::Semicolon) {
            self.advance();
            return Ok(Statement::Return(None));
        }

        let value = self.expression()?;
        self.expect_symbol(Symbol::Semicolon)?;

        Ok(Statement::Return(Some(value)))
    }

    fn binary_op(&self) -> Option<BinaryOp> {
        let op = match self.peek()? {
            Token::Symbol(Symbol::Plus) => BinaryOp::Add,
            Token::Symbol(Symbol::Minus) => BinaryOp::Subtract,
            Token::Symbol(Symbol::Star) => BinaryOp::Multiply,
            Token::Symbol(Symbol::Slash) => BinaryOp::Divide,
            Token::Symbol(Symbol::Ampersand) => BinaryOp::And,
            Token::Symbol(Symbol::Pipe) => BinaryOp::Or,
            Token::Symbol(Symbol::Less) => BinaryOp::Less,
            Token::Symbol(Symbol::Greater) => BinaryOp::Greater,
            Token::Symbol(Symbol::Equal) => BinaryOp::Equal,
            _ => return None,
        };

        Some(op)
    }

    /// term (op term)*
    ///
    /// A term is always parsed at the start and right after an operator, so
    /// a `-` there is unary; a `-` following a term is subtraction.
    pub fn expression(&mut self) -> CompileResult<Expression> {
        let mut elements = vec![ExpressionElement::Term(self.term()?)];

        while let Some(op) = self.binary_op() {
            self.advance();
            elements.push(ExpressionElement::Operator(op));
            elements.push(ExpressionElement::Term(self.term()?));
        }

        Ok(Expression::new(elements))
    }

    fn term(&mut self) -> CompileResult<Term> {
        let Some(token) = self.peek() else {
            return self.error("a term");
        };

        let term = match token {
            Token::IntegerConstant(value) => {
                self.advance();
                Term::IntegerConstant(*value)
            }
            Token::StringConstant(text) => {
                self.advance();
                Term::StringConstant(text.clone())
            }
            Token::Keyword(keyword) => {
                let constant = match keyword {
                    Keyword::True => KeywordConstant::True,
                    Keyword::False => KeywordConstant::False,
                    Keyword::Null => KeywordConstant::Null,
                    Keyword::This => KeywordConstant::This,
                    _ => return self.error("a term"),
                };
                self.advance();
                Term::KeywordConstant(constant)
            }
            Token::Symbol(Symbol::LeftParen) => {
                self.advance();
                let inner = self.expression()?;
                self.expect_symbol(Symbol::RightParen)?;
                Term::Parenthesized(Box::new(inner))
            }
            Token::Symbol(Symbol::Minus) => {
                self.advance();
                Term::Unary {
                    op: UnaryOp::Negate,
                    term: Box::new(self.term()?),
                }
            }
            Token::Symbol(Symbol::Tilde) => {
                self.advance();
                Term::Unary {
                    op: UnaryOp::Not,
                    term: Box::new(self.term()?),
                }
            }
            Token::Identifier(name) => {
                let name = name.clone();
                match self.peek_next() {
                    Some(Token::Symbol(Symbol::LeftParen | Symbol::Dot)) => {
                        self.advance();
                        Term::Call(self.subroutine_call(name)?)
                    }
                    Some(Token::Symbol(Symbol::LeftBracket)) => {
                        self.advance();
                        self.advance();
                        let index = self.expression()?;
                        self.expect_symbol(Symbol::RightBracket)?;
                        Term::ArrayElement {
                            name,
                            index: Box::new(index),
                        }
                    }
                    _ => {
                        self.advance();
                        Term::VarName(name)
                    }
                }
            }
            _ => return self.error("a term"),
        };

        Ok(term)
    }

    // called with the leading identifier already consumed
    fn subroutine_call(&mut self, first: String) -> CompileResult<SubroutineCall> {
        let (receiver, name) = if self.check_symbol(Symbol::Dot) {
            self.advance();
            (Some(first), self.expect_identifier()?)
        } else {
            (None, first)
        };

        self.expect_symbol(Symbol::LeftParen)?;
        let arguments = self.expression_list()?;
        self.expect_symbol(Symbol::RightParen)?;

        Ok(SubroutineCall {
            receiver,
            name,
            arguments,
        })
    }

    fn expression_list(&mut self) -> CompileResult<Vec<Expression>> {
        let mut arguments = vec![];
        if self.check_symbol(Symbol::RightParen) {
            return Ok(arguments);
        }

        arguments.push(self.expression()?);
        while self.check_symbol(Symbol::Comma) {
            self.advance();
            arguments.push(self.expression()?);
        }

        Ok(arguments)
    }
}

/// Parse one compilation unit, consuming every token.
pub fn parse_class(tokens: &[Token]) -> CompileResult<Class> {
    Parser::new(tokens).parse_class()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::lexer::tokenize;

    fn expr(source: &str) -> Expression {
        let tokens = tokenize(source);
        let mut parser = Parser::new(&tokens);
        let expression = parser.expression().expect("expression should parse");
        assert!(parser.is_at_end(), "trailing tokens in {:?}", source);
        expression
    }

    fn statements(source: &str) -> Vec<Statement> {
        let tokens = tokenize(&format!("{{ {} }}", source));
        let mut parser = Parser::new(&tokens);
        parser.block().expect("statements should parse")
    }

    fn var(name: &str) -> ExpressionElement {
        ExpressionElement::Term(Term::VarName(name.into()))
    }

    fn int(value: u32) -> ExpressionElement {
        ExpressionElement::Term(Term::IntegerConstant(value))
    }

    #[test]
    fn test_flat_expression() {
        let expression = expr("a + b - 2");

        assert_eq!(
            expression.elements,
            vec![
                var("a"),
                ExpressionElement::Operator(BinaryOp::Add),
                var("b"),
                ExpressionElement::Operator(BinaryOp::Subtract),
                int(2),
            ]
        );
    }

    #[test]
    fn test_leading_minus_is_unary() {
        let expression = expr("-2 * x - 1");

        assert_eq!(
            expression.elements,
            vec![
                ExpressionElement::Term(Term::Unary {
                    op: UnaryOp::Negate,
                    term: Box::new(Term::IntegerConstant(2)),
                }),
                ExpressionElement::Operator(BinaryOp::Multiply),
                var("x"),
                ExpressionElement::Operator(BinaryOp::Subtract),
                int(1),
            ]
        );
    }

    #[test]
    fn test_minus_after_operator_is_unary() {
        let expression = expr("x * -y");

        assert_eq!(expression.elements.len(), 3);
        assert_eq!(
            expression.elements[2],
            ExpressionElement::Term(Term::Unary {
                op: UnaryOp::Negate,
                term: Box::new(Term::VarName("y".into())),
            })
        );
    }

    #[test]
    fn test_parenthesized_is_single_term() {
        let expression = expr("(b + d) * 2");

        assert_eq!(expression.elements.len(), 3);
        match &expression.elements[0] {
            ExpressionElement::Term(Term::Parenthesized(inner)) => {
                assert_eq!(inner.elements.len(), 3);
            }
            other => panic!("Expected parenthesized term, got {:?}", other),
        }
    }

    #[test]
    fn test_identifier_lookahead() {
        let call = expr("f(1, 2)");
        let qualified = expr("game.run()");
        let element = expr("a[i + 1]");
        let plain = expr("a");

        assert!(matches!(
            &call.elements[0],
            ExpressionElement::Term(Term::Call(SubroutineCall { receiver: None, arguments, .. }))
                if arguments.len() == 2
        ));
        assert!(matches!(
            &qualified.elements[0],
            ExpressionElement::Term(Term::Call(SubroutineCall { receiver: Some(r), name, .. }))
                if r == "game" && name == "run"
        ));
        assert!(matches!(
            &element.elements[0],
            ExpressionElement::Term(Term::ArrayElement { name, .. }) if name == "a"
        ));
        assert_eq!(plain.elements, vec![var("a")]);
    }

    #[test]
    fn test_keyword_constants() {
        let expression = expr("true & ~false | null = this");

        assert_eq!(expression.elements.len(), 7);
        assert_eq!(
            expression.elements[0],
            ExpressionElement::Term(Term::KeywordConstant(KeywordConstant::True))
        );
        assert_eq!(
            expression.elements[6],
            ExpressionElement::Term(Term::KeywordConstant(KeywordConstant::This))
        );
    }

    #[test]
    fn test_if_without_else_has_empty_branch() {
        let parsed = statements("if (x) { let y = 1; }");

        match &parsed[0] {
            Statement::If(stmt) => {
                assert_eq!(stmt.then_branch.len(), 1);
                assert!(stmt.else_branch.is_empty());
            }
            other => panic!("Expected if statement, got {:?}", other),
        }
    }

    #[test]
    fn test_nested_statements() {
        let parsed = statements(
            "while (true) { if (x) { let y = 1; } else { let z = 3; } while (true) { let x = 2; } }",
        );

        match &parsed[0] {
            Statement::While(stmt) => {
                assert_eq!(stmt.body.len(), 2);
                assert!(matches!(&stmt.body[0], Statement::If(s) if s.else_branch.len() == 1));
                assert!(matches!(&stmt.body[1], Statement::While(_)));
            }
            other => panic!("Expected while statement, got {:?}", other),
        }
    }

    #[test]
    fn test_let_with_index() {
        let parsed = statements("let a[2] = 1;");

        assert_eq!(
            parsed,
            vec![Statement::Let(LetStatement {
                name: "a".into(),
                index: Some(Expression::term(Term::IntegerConstant(2))),
                value: Expression::term(Term::IntegerConstant(1)),
            })]
        );
    }

    #[test]
    fn test_return_forms() {
        let parsed = statements("return; return x;");

        assert_eq!(parsed[0], Statement::Return(None));
        assert_eq!(
            parsed[1],
            Statement::Return(Some(Expression::term(Term::VarName("x".into()))))
        );
    }

    #[test]
    fn test_class_declarations() {
        let source = "class Main {
            static boolean test;
            field int x, y;
            field Test a, b, c;
            constructor Main new(int ax, Point p) { var int i, j; var String s; return this; }
            method void dispose() { return; }
        }";
        let tokens = tokenize(source);
        let class = parse_class(&tokens).expect("class should parse");

        assert_eq!(class.name, "Main");
        assert_eq!(class.variables.len(), 3);
        assert_eq!(class.variables[1].names, vec!["x", "y"]);
        assert_eq!(class.variables[2].ty, Type::Class("Test".into()));
        assert_eq!(class.subroutines.len(), 2);

        let constructor = &class.subroutines[0];
        assert_eq!(constructor.kind, SubroutineKind::Constructor);
        assert_eq!(constructor.return_type, ReturnType::Type(Type::Class("Main".into())));
        assert_eq!(constructor.parameters.len(), 2);
        assert_eq!(constructor.body.locals.len(), 2);
        assert_eq!(class.subroutines[1].return_type, ReturnType::Void);
    }

    #[test]
    fn test_missing_closing_paren() {
        let tokens = tokenize("class A { function void f() { do g(1; return; } }");

        assert_eq!(
            parse_class(&tokens),
            Err(CompileError::syntax("`)`", "`;`"))
        );
    }

    #[test]
    fn test_unknown_statement() {
        let tokens = tokenize("class A { function void f() { x = 1; } }");

        let err = parse_class(&tokens).expect_err("should fail");
        assert!(matches!(err, CompileError::Syntax { ref found, .. } if found == "identifier `x`"));
    }

    #[test]
    fn test_trailing_tokens_rejected() {
        let tokens = tokenize("class A { } class B { }");

        assert!(parse_class(&tokens).is_err());
    }

    #[test]
    fn test_truncated_input() {
        let tokens = tokenize("class A { function void f() { return");

        assert_eq!(
            parse_class(&tokens),
            Err(CompileError::syntax("a term", "end of input"))
        );
    }
}
