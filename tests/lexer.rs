mod lexer_tests {
    use jack_core::lexer::{Keyword, Lexer, Symbol, Token, tokenize};
    use jack_core::scanner::{Scanner, strip_comments};

    fn ident(name: &str) -> Token {
        Token::Identifier(name.into())
    }

    #[test]
    fn test_lexer_class_header() {
        let source = "class Square { field int x, y; }";
        let lexer = Lexer::new(source);

        let tokens: Vec<_> = lexer.iter().collect();

        assert_eq!(tokens.len(), 10);

        match tokens[0] {
            Token::Keyword(Keyword::Class) => {}
            _ => panic!("Expected `class` keyword, got {:?}", tokens[0]),
        }

        match tokens[1] {
            Token::Identifier(name) if name == "Square" => {}
            _ => panic!("Expected identifier Square, got {:?}", tokens[1]),
        }

        match tokens[3] {
            Token::Keyword(Keyword::Field) => {}
            _ => panic!("Expected `field` keyword, got {:?}", tokens[3]),
        }

        match tokens[6] {
            Token::Symbol(Symbol::Comma) => {}
            _ => panic!("Expected comma, got {:?}", tokens[6]),
        }
    }

    #[test]
    fn test_lexer_statement_mix() {
        let tokens = tokenize("let a[i] = \"hi\" + 42; do Output.println();");

        assert_eq!(
            tokens,
            vec![
                Token::Keyword(Keyword::Let),
                ident("a"),
                Token::Symbol(Symbol::LeftBracket),
                ident("i"),
                Token::Symbol(Symbol::RightBracket),
                Token::Symbol(Symbol::Equal),
                Token::StringConstant("hi".into()),
                Token::Symbol(Symbol::Plus),
                Token::IntegerConstant(42),
                Token::Symbol(Symbol::Semicolon),
                Token::Keyword(Keyword::Do),
                ident("Output"),
                Token::Symbol(Symbol::Dot),
                ident("println"),
                Token::Symbol(Symbol::LeftParen),
                Token::Symbol(Symbol::RightParen),
                Token::Symbol(Symbol::Semicolon),
            ]
        );
    }

    #[test]
    fn test_lexer_comments_in_program() {
        let source = r#"
            /** Doc comment
             *  spanning lines */
            class Main {
                function void main() { // entry point
                    /* inline */ return;
                }
            }
        "#;

        let tokens = tokenize(source);

        assert_eq!(tokens.len(), 13);
        assert_eq!(tokens[0], Token::Keyword(Keyword::Class));
        assert_eq!(tokens[10], Token::Symbol(Symbol::Semicolon));
    }

    #[test]
    fn test_lexer_string_keeps_inner_spaces() {
        let tokens = tokenize("\"  two  spaces \"");

        assert_eq!(tokens, vec![Token::StringConstant("  two  spaces ".into())]);
    }

    #[test]
    fn test_lexer_token_display() {
        assert_eq!(Token::IntegerConstant(7).to_string(), "7");
        assert_eq!(Token::StringConstant("a b".into()).to_string(), "\"a b\"");
        assert_eq!(Token::Keyword(Keyword::While).to_string(), "`while`");
        assert_eq!(Token::Symbol(Symbol::Tilde).to_string(), "`~`");
        assert_eq!(ident("x").to_string(), "identifier `x`");
    }

    #[test]
    fn test_scanner_walks_characters() {
        let mut scanner = Scanner::new("ab1");

        assert_eq!(scanner.peek(), Some('a'));
        assert_eq!(scanner.peek_next(), Some('b'));
        assert_eq!(scanner.advance_while(|c| c.is_ascii_alphabetic()), "ab");
        assert!(scanner.advance_if('1'));
        assert!(scanner.is_at_end());
        assert_eq!(scanner.advance(), None);
    }

    #[test]
    fn test_strip_comments_keeps_line_structure() {
        assert_eq!(strip_comments("a // b\nc"), "a \nc");
        assert_eq!(strip_comments("a /* b */ c"), "a  c");
        assert_eq!(strip_comments("a /* never closed"), "a ");
    }
}
