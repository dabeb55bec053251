//! Field extraction from response payloads.
//!
//! Each method consumes one field and returns `None` without consuming
//! anything when the field is absent or malformed, so callers can apply
//! whatever was parsed up to the first bad field.

pub(crate) struct Scanner<'a> {
    rest: &'a [u8],
}

impl<'a> Scanner<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self { rest: input }
    }

    fn skip_whitespace(&mut self) {
        let n = self
            .rest
            .iter()
            .take_while(|b| matches!(b, b' ' | b'\t'))
            .count();
        self.rest = &self.rest[n..];
    }

    pub fn is_empty(&self) -> bool {
        self.rest.iter().all(|b| b.is_ascii_whitespace())
    }

    /// Literal separator, surrounding blanks ignored
    pub fn literal(&mut self, lit: &[u8]) -> Option<()> {
        self.skip_whitespace();
        let tail = self.rest.strip_prefix(lit)?;
        self.rest = tail;
        Some(())
    }

    /// Signed decimal integer
    pub fn int(&mut self) -> Option<i32> {
        self.skip_whitespace();
        let rest: &'a [u8] = self.rest;
        let (negative, digits) = match rest {
            [b'-', tail @ ..] => (true, tail),
            [b'+', tail @ ..] => (false, tail),
            tail => (false, tail),
        };
        let len = digits.iter().take_while(|b| b.is_ascii_digit()).count();
        if len == 0 {
            return None;
        }
        let value = digits[..len].iter().try_fold(0i32, |acc, d| {
            acc.checked_mul(10)?.checked_add((d - b'0') as i32)
        })?;
        self.rest = &digits[len..];
        Some(if negative { -value } else { value })
    }

    /// Hexadecimal integer wrapped in double quotes
    pub fn quoted_hex(&mut self) -> Option<u32> {
        let mut peek = Scanner { rest: self.rest };
        let text = peek.quoted()?;
        if text.is_empty() || text.len() > 8 {
            return None;
        }
        let value = text.iter().try_fold(0u32, |acc, d| {
            let nibble = (*d as char).to_digit(16)?;
            Some((acc << 4) | nibble)
        })?;
        self.rest = peek.rest;
        Some(value)
    }

    /// Contents of a double quoted string
    pub fn quoted(&mut self) -> Option<&'a [u8]> {
        self.skip_whitespace();
        let tail = self.rest.strip_prefix(b"\"")?;
        let end = tail.iter().position(|b| *b == b'"')?;
        self.rest = &tail[end + 1..];
        Some(&tail[..end])
    }
}

/// Payload of a `+NAME: args` line with the framing stripped, split into the
/// name and the arguments.
pub(crate) fn split_urc(token: &[u8]) -> Option<(&[u8], &[u8])> {
    let body = trim(token).strip_prefix(b"+")?;
    let colon = body.iter().position(|b| *b == b':')?;
    Some((&body[..colon], &body[colon + 1..]))
}

/// Strip surrounding CR, LF and blanks.
pub(crate) fn trim(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    let end = bytes
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(start, |i| i + 1);
    &bytes[start..end]
}
