use std::fmt;

/// Single-character punctuation tokens. Anything that is neither one of these
/// nor a word character is dropped by the tokenizer.
pub const PUNCTUATION: &[char] = &[
    '.', ',', '!', '?', ';', ':', '-', '—', '"', '\'', '„', '‟', '(', ')', '[', ']', '{', '}',
    '€', '£', '$',
];

const APOSTROPHES: &[char] = &['\'', '’'];

pub fn is_punctuation_char(ch: char) -> bool {
    PUNCTUATION.contains(&ch)
}

/// ASCII or typographic apostrophe; both can sit inside a word.
pub fn is_apostrophe(ch: char) -> bool {
    APOSTROPHES.contains(&ch)
}

/// Letters and digits of the supported alphabets: ASCII, Latin-1 and Latin
/// Extended-A/B letters (accented vowels and friends), and Cyrillic.
pub fn is_word_char(ch: char) -> bool {
    match ch {
        'a'..='z' | 'A'..='Z' | '0'..='9' => true,
        '\u{00D7}' | '\u{00F7}' => false,
        '\u{00C0}'..='\u{024F}' => true,
        '\u{0400}'..='\u{04FF}' => true,
        _ => false,
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Token(String);

impl Token {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Word vs. punctuation is derived from the text, never stored.
    pub fn is_punctuation(&self) -> bool {
        let mut chars = self.0.chars();
        matches!((chars.next(), chars.next()), (Some(ch), None) if is_punctuation_char(ch))
    }

    pub fn is_word(&self) -> bool {
        !self.is_punctuation()
    }

    pub fn chars(&self) -> impl Iterator<Item = char> + '_ {
        self.0.chars()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Token {
    fn from(s: &str) -> Self {
        Token(s.to_string())
    }
}

/// Split a sentence into word runs and single punctuation characters.
///
/// An apostrophe stays inside a word only when it sits between two word
/// characters (`don't`, `п'ять`); elsewhere `'` is a punctuation token and
/// `’` is dropped.
pub fn tokenize(text: &str) -> Vec<Token> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut word = String::new();

    for (i, &ch) in chars.iter().enumerate() {
        if is_word_char(ch) {
            word.push(ch);
            continue;
        }

        let joins_word = is_apostrophe(ch)
            && !word.is_empty()
            && chars.get(i + 1).is_some_and(|&next| is_word_char(next));
        if joins_word {
            word.push(ch);
            continue;
        }

        if !word.is_empty() {
            tokens.push(Token(std::mem::take(&mut word)));
        }
        if is_punctuation_char(ch) {
            tokens.push(Token(ch.to_string()));
        }
    }

    if !word.is_empty() {
        tokens.push(Token(word));
    }
    tokens
}

/// Join tokens with single spaces.
pub fn join(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(Token::as_str)
        .collect::<Vec<_>>()
        .join(" ")
}
