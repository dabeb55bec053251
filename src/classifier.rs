//! Response classification.
//!
//! [`classify`] looks at the front of a buffer of framed bytes and reports
//! the next token. Rules are tried at increasing offsets; formatted rules
//! before literal rules at each offset, first match wins. Bytes skipped over
//! before a match come back as a separate [`ResponseCategory::Unknown`]
//! token.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResponseCategory {
    Ok,
    Error,
    Ring,
    Connect,
    NoCarrier,
    NoDialtone,
    Busy,
    NoAnswer,
    Unsolicited,
    Prompt,
    Aborted,
    DoubleNewline,
    Unknown,
}

impl ResponseCategory {
    /// Categories that end a command exchange.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ok | Self::Error | Self::Prompt | Self::Aborted)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Token {
    pub category: ResponseCategory,
    /// Bytes occupied in the source buffer, framing included
    pub len: usize,
}

impl Token {
    pub const fn new(category: ResponseCategory, len: usize) -> Self {
        Self { category, len }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Outcome {
    Matched(Token),
    NeedMoreData,
    NoMatch,
}

/// Result of trying one rule at one offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scan {
    Match(usize),
    Partial,
    Mismatch,
}

#[derive(Debug, Clone, Copy)]
enum Piece {
    Lit(&'static [u8]),
    /// One or more decimal digits
    Int,
    /// `"..."`, any bytes up to the closing quote
    Quoted,
    /// As many raw bytes as the previous `Int` said
    Raw,
}

struct FormattedRule {
    pieces: &'static [Piece],
    category: ResponseCategory,
}

impl FormattedRule {
    fn scan(&self, buf: &[u8]) -> Scan {
        let mut pos = 0;
        let mut last_int: usize = 0;

        for piece in self.pieces {
            match *piece {
                Piece::Lit(lit) => match scan_literal(&buf[pos..], lit) {
                    Scan::Match(n) => pos += n,
                    other => return other,
                },
                Piece::Int => {
                    let digits = buf[pos..]
                        .iter()
                        .take_while(|b| b.is_ascii_digit())
                        .count();
                    if pos + digits == buf.len() {
                        return Scan::Partial;
                    }
                    if digits == 0 {
                        return Scan::Mismatch;
                    }
                    last_int = buf[pos..pos + digits].iter().fold(0usize, |acc, d| {
                        acc.saturating_mul(10).saturating_add((d - b'0') as usize)
                    });
                    pos += digits;
                }
                Piece::Quoted => {
                    match buf.get(pos) {
                        None => return Scan::Partial,
                        Some(b'"') => {}
                        Some(_) => return Scan::Mismatch,
                    }
                    match buf[pos + 1..].iter().position(|b| *b == b'"') {
                        Some(end) => pos += end + 2,
                        None => return Scan::Partial,
                    }
                }
                Piece::Raw => {
                    if buf.len() - pos < last_int {
                        return Scan::Partial;
                    }
                    pos += last_int;
                }
            }
        }

        Scan::Match(pos)
    }
}

struct LiteralRule {
    start: &'static [u8],
    end: Option<&'static [u8]>,
    category: ResponseCategory,
}

impl LiteralRule {
    const fn exact(start: &'static [u8], category: ResponseCategory) -> Self {
        Self {
            start,
            end: None,
            category,
        }
    }

    const fn span(
        start: &'static [u8],
        end: &'static [u8],
        category: ResponseCategory,
    ) -> Self {
        Self {
            start,
            end: Some(end),
            category,
        }
    }

    fn scan(&self, buf: &[u8]) -> Scan {
        let mut pos = match scan_literal(buf, self.start) {
            Scan::Match(n) => n,
            other => return other,
        };

        let Some(end) = self.end else {
            return Scan::Match(pos);
        };

        // At least one byte of body before the terminator
        if pos == buf.len() {
            return Scan::Partial;
        }
        pos += 1;

        let mut matched = 0;
        while pos < buf.len() {
            let b = buf[pos];
            pos += 1;
            matched = if end[matched] == b {
                matched + 1
            } else if end[0] == b {
                1
            } else {
                0
            };
            if matched == end.len() {
                return Scan::Match(pos);
            }
        }

        Scan::Partial
    }
}

fn scan_literal(buf: &[u8], lit: &[u8]) -> Scan {
    let n = buf.len().min(lit.len());
    if buf[..n] != lit[..n] {
        Scan::Mismatch
    } else if n < lit.len() {
        Scan::Partial
    } else {
        Scan::Match(n)
    }
}

use Piece::{Int, Lit, Quoted, Raw};
use ResponseCategory as C;

/// Responses carrying binary payload, which may itself contain framing
/// bytes.
static FORMATTED_RULES: &[FormattedRule] = &[
    // +USORD: <socket>,<length>,"<data>"
    FormattedRule {
        pieces: &[
            Lit(b"\r\n+USORD: "),
            Int,
            Lit(b","),
            Int,
            Lit(b",\""),
            Raw,
            Lit(b"\""),
        ],
        category: C::Unsolicited,
    },
    // +USORF: <socket>,"<ip>",<port>,<length>,"<data>"
    FormattedRule {
        pieces: &[
            Lit(b"\r\n+USORF: "),
            Int,
            Lit(b",\""),
            Int,
            Lit(b"."),
            Int,
            Lit(b"."),
            Int,
            Lit(b"."),
            Int,
            Lit(b"\","),
            Int,
            Lit(b","),
            Int,
            Lit(b",\""),
            Raw,
            Lit(b"\""),
        ],
        category: C::Unsolicited,
    },
    // +URDFILE: "<filename>",<size>,"<data>"
    FormattedRule {
        pieces: &[
            Lit(b"\r\n+URDFILE: "),
            Quoted,
            Lit(b","),
            Int,
            Lit(b",\""),
            Raw,
            Lit(b"\""),
        ],
        category: C::Unsolicited,
    },
];

static LITERAL_RULES: &[LiteralRule] = &[
    LiteralRule::exact(b"\r\nOK\r\n", C::Ok),
    LiteralRule::exact(b"\r\nERROR\r\n", C::Error),
    LiteralRule::span(b"\r\n+CME ERROR:", b"\r\n", C::Error),
    LiteralRule::span(b"\r\n+CMS ERROR:", b"\r\n", C::Error),
    LiteralRule::exact(b"\r\nRING\r\n", C::Ring),
    LiteralRule::exact(b"\r\nCONNECT\r\n", C::Connect),
    LiteralRule::exact(b"\r\nNO CARRIER\r\n", C::NoCarrier),
    LiteralRule::exact(b"\r\nNO DIALTONE\r\n", C::NoDialtone),
    LiteralRule::exact(b"\r\nBUSY\r\n", C::Busy),
    LiteralRule::exact(b"\r\nNO ANSWER\r\n", C::NoAnswer),
    LiteralRule::span(b"\r\n+", b"\r\n", C::Unsolicited),
    LiteralRule::exact(b"\r\n@", C::Prompt),
    LiteralRule::exact(b"\r\n>", C::Prompt),
    LiteralRule::exact(b"\n>", C::Prompt),
    LiteralRule::exact(b"\r\nABORTED\r\n", C::Aborted),
    LiteralRule::span(b"\r\n\r\n", b"\r\n", C::DoubleNewline),
    LiteralRule::span(b"\r\n", b"\r\n", C::Unknown),
];

/// Bytes reported when a double newline at the front is collapsed.
const COLLAPSED_NEWLINE_LEN: usize = 2;

/// Classify the next token at the front of `buf`.
///
/// Pure function of its input. A partial match at a non-zero offset means
/// bytes already skipped might belong to the pending token, so
/// `NeedMoreData` is returned rather than splitting them off. A partial
/// literal match at offset zero is only decisive once nothing else matches
/// further down the buffer; a partial formatted match is decisive right away
/// since its payload may contain framing bytes that a literal rule would
/// otherwise claim.
pub fn classify(buf: &[u8]) -> Outcome {
    if buf.is_empty() {
        return Outcome::NoMatch;
    }

    let mut partial = false;

    for unknown in 0..buf.len() {
        let window = &buf[unknown..];

        for rule in FORMATTED_RULES {
            match rule.scan(window) {
                Scan::Partial => return Outcome::NeedMoreData,
                Scan::Match(_) if unknown > 0 => {
                    return Outcome::Matched(Token::new(C::Unknown, unknown))
                }
                Scan::Match(len) => return Outcome::Matched(Token::new(rule.category, len)),
                Scan::Mismatch => {}
            }
        }

        for rule in LITERAL_RULES {
            match rule.scan(window) {
                Scan::Partial if unknown > 0 => return Outcome::NeedMoreData,
                Scan::Partial => partial = true,
                Scan::Match(_) if unknown > 0 => {
                    return Outcome::Matched(Token::new(C::Unknown, unknown))
                }
                Scan::Match(_) if rule.category == C::DoubleNewline => {
                    return Outcome::Matched(Token::new(C::Unknown, COLLAPSED_NEWLINE_LEN))
                }
                Scan::Match(len) => return Outcome::Matched(Token::new(rule.category, len)),
                Scan::Mismatch => {}
            }
        }
    }

    if partial {
        Outcome::NeedMoreData
    } else {
        Outcome::NoMatch
    }
}
