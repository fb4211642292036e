//! Finds where a value lives inside JSON-with-comments text, so it can be
//! replaced without re-serializing the document.

use std::ops::Range;

struct Cursor<'a> {
    src: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str) -> Self {
        Cursor {
            src: src.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    /// Skips whitespace and `//` comments.
    fn skip_trivia(&mut self) {
        while let Some(b) = self.peek() {
            if b.is_ascii_whitespace() {
                self.pos += 1;
            } else if b == b'/' && self.src.get(self.pos + 1) == Some(&b'/') {
                while let Some(c) = self.peek() {
                    if c == b'\n' {
                        break;
                    }
                    self.pos += 1;
                }
            } else {
                break;
            }
        }
    }

    fn eat(&mut self, expected: u8) -> Option<()> {
        self.skip_trivia();
        if self.peek()? == expected {
            self.pos += 1;
            Some(())
        } else {
            None
        }
    }

    /// Consumes a string literal and returns the span of its contents,
    /// quotes excluded.
    fn string(&mut self) -> Option<Range<usize>> {
        self.eat(b'"')?;
        let start = self.pos;
        loop {
            match self.peek()? {
                b'\\' => self.pos += 2,
                b'"' => {
                    let end = self.pos;
                    self.pos += 1;
                    return Some(start..end);
                }
                _ => self.pos += 1,
            }
        }
    }

    fn skip_value(&mut self) -> Option<()> {
        self.skip_trivia();
        match self.peek()? {
            b'"' => self.string().map(|_| ()),
            b'{' => self.skip_container(b'}', true),
            b'[' => self.skip_container(b']', false),
            _ => {
                let start = self.pos;
                while let Some(b) = self.peek() {
                    if matches!(b, b',' | b'}' | b']' | b'/') || b.is_ascii_whitespace() {
                        break;
                    }
                    self.pos += 1;
                }
                (self.pos > start).then_some(())
            }
        }
    }

    fn skip_container(&mut self, close: u8, keyed: bool) -> Option<()> {
        self.pos += 1;
        self.skip_trivia();
        if self.peek()? == close {
            self.pos += 1;
            return Some(());
        }
        loop {
            if keyed {
                self.string()?;
                self.eat(b':')?;
            }
            self.skip_value()?;
            self.skip_trivia();
            match self.peek()? {
                b',' => self.pos += 1,
                b if b == close => {
                    self.pos += 1;
                    return Some(());
                }
                _ => return None,
            }
        }
    }

    /// Expects an object and leaves the cursor at the value of `key`.
    ///
    /// The whole object is scanned and the last occurrence of `key` wins,
    /// which is the entry serde_json keeps for duplicated keys.
    fn enter_key(&mut self, text: &str, key: &str) -> Option<()> {
        self.eat(b'{')?;
        self.skip_trivia();
        let mut found = None;
        if self.peek()? != b'}' {
            loop {
                let name = self.string()?;
                self.eat(b':')?;
                if &text[name] == key {
                    self.skip_trivia();
                    found = Some(self.pos);
                }
                self.skip_value()?;
                self.skip_trivia();
                match self.peek()? {
                    b',' => self.pos += 1,
                    b'}' => break,
                    _ => return None,
                }
            }
        }
        self.pos = found?;
        Some(())
    }
}

/// Returns the byte range of the contents of the string value reached by
/// following `keys` from the root object of `text`.
///
/// Comments are skipped, so a commented-out entry is never matched. Keys are
/// compared against their raw (unescaped) spelling; when a key repeats in an
/// object the last occurrence wins.
pub fn find_string_value(text: &str, keys: &[String]) -> Option<Range<usize>> {
    let mut cursor = Cursor::new(text);
    for key in keys {
        cursor.enter_key(text, key)?;
    }
    cursor.skip_trivia();
    if cursor.peek()? != b'"' {
        return None;
    }
    cursor.string()
}
