use std::fmt::{self, Display};

use super::scanner::{Scanner, strip_comments};

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Keyword {
    Class,
    Constructor,
    Function,
    Method,
    Field,
    Static,
    Var,
    Int,
    Char,
    Boolean,
    Void,
    True,
    False,
    Null,
    This,
    Let,
    Do,
    If,
    Else,
    While,
    Return,
}

impl Keyword {
    pub fn from_word(word: &str) -> Option<Self> {
        let keyword = match word {
            "class" => Keyword::Class,
            "constructor" => Keyword::Constructor,
            "function" => Keyword::Function,
            "method" => Keyword::Method,
            "field" => Keyword::Field,
            "static" => Keyword::Static,
            "var" => Keyword::Var,
            "int" => Keyword::Int,
            "char" => Keyword::Char,
            "boolean" => Keyword::Boolean,
            "void" => Keyword::Void,
            "true" => Keyword::True,
            "false" => Keyword::False,
            "null" => Keyword::Null,
            "this" => Keyword::This,
            "let" => Keyword::Let,
            "do" => Keyword::Do,
            "if" => Keyword::If,
            "else" => Keyword::Else,
            "while" => Keyword::While,
            "return" => Keyword::Return,
            _ => return None,
        };

        Some(keyword)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::Class => "class",
            Keyword::Constructor => "constructor",
            Keyword::Function => "function",
            Keyword::Method => "method",
            Keyword::Field => "field",
            Keyword::Static => "static",
            Keyword::Var => "var",
            Keyword::Int => "int",
            Keyword::Char => "char",
            Keyword::Boolean => "boolean",
            Keyword::Void => "void",
            Keyword::True => "true",
            Keyword::False => "false",
            Keyword::Null => "null",
            Keyword::This => "this",
            Keyword::Let => "let",
            Keyword::Do => "do",
            Keyword::If => "if",
            Keyword::Else => "else",
            Keyword::While => "while",
            Keyword::Return => "return",
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Symbol {
    LeftBrace,
    RightBrace,
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    Dot,
    Comma,
    Semicolon,
    Plus,
    Minus,
    Star,
    Slash,
    Ampersand,
    Pipe,
    Less,
    Greater,
    Equal,
    Tilde,
}

impl Symbol {
    pub fn from_char(c: char) -> Option<Self> {
        let symbol = match c {
            '{' => Symbol::LeftBrace,
            '}' => Symbol::RightBrace,
            '(' => Symbol::LeftParen,
            ')' => Symbol::RightParen,
            '[' => Symbol::LeftBracket,
            ']' => Symbol::RightBracket,
            '.' => Symbol::Dot,
            ',' => Symbol::Comma,
            ';' => Symbol::Semicolon,
            '+' => Symbol::Plus,
            '-' => Symbol::Minus,
            '*' => Symbol::Star,
            '/' => Symbol::Slash,
            '&' => Symbol::Ampersand,
            '|' => Symbol::Pipe,
            '<' => Symbol::Less,
            '>' => Symbol::Greater,
            '=' => Symbol::Equal,
            '~' => Symbol::Tilde,
            _ => return None,
        };

        Some(symbol)
    }

    pub fn as_char(&self) -> char {
        match self {
            Symbol::LeftBrace => '{',
            Symbol::RightBrace => '}',
            Symbol::LeftParen => '(',
            Symbol::RightParen => ')',
            Symbol::LeftBracket => '[',
            Symbol::RightBracket => ']',
            Symbol::Dot => '.',
            Symbol::Comma => ',',
            Symbol::Semicolon => ';',
            Symbol::Plus => '+',
            Symbol::Minus => '-',
            Symbol::Star => '*',
            Symbol::Slash => '/',
            Symbol::Ampersand => '&',
            Symbol::Pipe => '|',
            Symbol::Less => '<',
            Symbol::Greater => '>',
            Symbol::Equal => '=',
            Symbol::Tilde => '~',
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Token {
    IntegerConstant(u32),
    StringConstant(String),
    Keyword(Keyword),
    Symbol(Symbol),
    Identifier(String),
}

impl Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::IntegerConstant(value) => write!(f, "{}", value),
            Token::StringConstant(text) => write!(f, "\"{}\"", text),
            Token::Keyword(keyword) => write!(f, "`{}`", keyword.as_str()),
            Token::Symbol(symbol) => write!(f, "`{}`", symbol.as_char()),
            Token::Identifier(name) => write!(f, "identifier `{}`", name),
        }
    }
}

pub struct Lexer {
    tokens: Vec<Token>,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        // generate tokens eagerly
        let mut lexer = Self { tokens: Vec::new() };

        let stripped = strip_comments(source);
        lexer.generate_tokens(Scanner::new(&stripped));

        lexer
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }

    // an unterminated literal only skips its opening quote
    fn string(&mut self, scanner: &mut Scanner) {
        if let Some(end) = scanner.find('"') {
            let text = scanner.get_lexeme(scanner.current, end);
            scanner.current = end + 1;
            self.tokens.push(Token::StringConstant(text));
        }
    }

    // integer literals are unsigned and wrap instead of failing
    fn number(&mut self, scanner: &mut Scanner) {
        let digits = scanner.advance_while(|c| c.is_ascii_digit());
        let value = digits.bytes().fold(0u32, |acc, digit| {
            acc.wrapping_mul(10).wrapping_add(u32::from(digit - b'0'))
        });

        self.tokens.push(Token::IntegerConstant(value));
    }

    fn word(&mut self, scanner: &mut Scanner) {
        let lexeme = scanner.advance_while(|c| c.is_alphanumeric() || c == '_');
        let token = match Keyword::from_word(&lexeme) {
            Some(keyword) => Token::Keyword(keyword),
            None => Token::Identifier(lexeme),
        };

        self.tokens.push(token);
    }

    fn generate_tokens(&mut self, mut scanner: Scanner) {
        while let Some(c) = scanner.peek() {
            match c {
                c if c.is_whitespace() => {
                    scanner.advance();
                }

                '"' => {
                    scanner.advance();
                    self.string(&mut scanner);
                }

                '0'..='9' => self.number(&mut scanner),

                c if c.is_alphabetic() || c == '_' => self.word(&mut scanner),

                c => {
                    scanner.advance();
                    // anything outside the alphabet is skipped
                    if let Some(symbol) = Symbol::from_char(c) {
                        self.tokens.push(Token::Symbol(symbol));
                    }
                }
            }
        }
    }
}

/// Convert unit source text into its token sequence. Never fails.
pub fn tokenize(source: &str) -> Vec<Token> {
    Lexer::new(source).into_tokens()
}
