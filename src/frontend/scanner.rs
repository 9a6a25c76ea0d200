// character cursor shared by the comment stripper and the lexer
pub struct Scanner {
    chars: Vec<char>,

    pub current: usize, // current index into chars
}

impl Scanner {
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            current: 0,
        }
    }

    // is current position at or after the end of the source
    pub fn is_at_end(&self) -> bool {
        self.current >= self.chars.len()
    }

    // consume current character, return it and advance
    pub fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.current += 1;
        Some(c)
    }

    // peek current character (if there is any) without advancing
    pub fn peek(&self) -> Option<char> {
        self.chars.get(self.current).copied()
    }

    // peek next character (if any) without advancing
    pub fn peek_next(&self) -> Option<char> {
        self.chars.get(self.current + 1).copied()
    }

    // advance if and only if current character is equal to expected. return if advanced
    pub fn advance_if(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.current += 1;
            return true;
        }

        false
    }

    // consume characters while the predicate holds and return them
    pub fn advance_while(&mut self, predicate: impl Fn(char) -> bool) -> String {
        let start = self.current;
        while let Some(c) = self.peek() {
            if !predicate(c) {
                break;
            }
            self.current += 1;
        }

        self.get_lexeme(start, self.current)
    }

    // position of the next `expected` at or after the cursor
    pub fn find(&self, expected: char) -> Option<usize> {
        self.chars[self.current.min(self.chars.len())..]
            .iter()
            .position(|&c| c == expected)
            .map(|offset| self.current + offset)
    }

    pub fn get_lexeme(&self, start: usize, end: usize) -> String {
        self.chars[start..end].iter().collect()
    }
}

/// Remove `// ...` and `/* ... */` comments, keeping every other character
/// (including the last one of the input). The newline that ends a line
/// comment is kept; an unterminated block comment runs to the end of input.
pub fn strip_comments(source: &str) -> String {
    let mut scanner = Scanner::new(source);
    let mut result = String::with_capacity(source.len());

    while let Some(c) = scanner.advance() {
        match (c, scanner.peek()) {
            ('/', Some('/')) => {
                scanner.advance_while(|c| c != '\n');
            }
            ('/', Some('*')) => {
                scanner.advance();
                loop {
                    match scanner.advance() {
                        Some('*') if scanner.advance_if('/') => break,
                        Some(_) => {}
                        None => break,
                    }
                }
            }
            _ => result.push(c),
        }
    }

    result
}
