use std::borrow::Cow;

use memchr::{memchr, memchr_iter, memchr2};

/// One CSV record split into fields.
///
/// Unquoted fields and quoted fields without escapes borrow from the buffer;
/// a quoted field containing `""` is unescaped into an owned buffer.
#[derive(Debug)]
pub struct RawRecord<'a> {
    /// 1-based line on which the record starts
    pub line: usize,
    pub fields: Vec<Cow<'a, [u8]>>,
}

/// Quote-aware record scanner over an in-memory CSV buffer.
///
/// Accepts `\n` and `\r\n` line endings, quoted fields spanning commas and
/// newlines, and skips blank lines.
pub struct RecordScanner<'a> {
    buf: &'a [u8],
    pos: usize,
    line: usize,
}

impl<'a> RecordScanner<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        let buf = buf.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(buf);
        RecordScanner {
            buf,
            pos: 0,
            line: 1,
        }
    }

    fn quoted_field(&mut self) -> Cow<'a, [u8]> {
        let buf = self.buf;
        // skip opening quote
        self.pos += 1;
        let mut segment_start = self.pos;
        let mut owned: Option<Vec<u8>> = None;

        let field = loop {
            let Some(offset) = memchr(b'"', &buf[self.pos..]) else {
                // unterminated quote: take the rest of the buffer
                self.line += memchr_iter(b'\n', &buf[self.pos..]).count();
                let tail = &buf[segment_start..];
                self.pos = buf.len();
                break match owned {
                    Some(mut acc) => {
                        acc.extend_from_slice(tail);
                        Cow::Owned(acc)
                    }
                    None => Cow::Borrowed(tail),
                };
            };

            let quote = self.pos + offset;
            self.line += memchr_iter(b'\n', &buf[self.pos..quote]).count();

            if buf.get(quote + 1) == Some(&b'"') {
                // escaped quote: keep one of the pair
                owned
                    .get_or_insert_with(Vec::new)
                    .extend_from_slice(&buf[segment_start..=quote]);
                self.pos = quote + 2;
                segment_start = self.pos;
                continue;
            }

            let content = &buf[segment_start..quote];
            self.pos = quote + 1;
            break match owned {
                Some(mut acc) => {
                    acc.extend_from_slice(content);
                    Cow::Owned(acc)
                }
                None => Cow::Borrowed(content),
            };
        };

        // anything between the closing quote and the delimiter is dropped
        self.pos = memchr2(b',', b'\n', &buf[self.pos..]).map_or(buf.len(), |o| self.pos + o);
        field
    }

    fn plain_field(&mut self) -> Cow<'a, [u8]> {
        let buf = self.buf;
        let end = memchr2(b',', b'\n', &buf[self.pos..]).map_or(buf.len(), |o| self.pos + o);
        let mut field = &buf[self.pos..end];
        if let Some(stripped) = field.strip_suffix(b"\r") {
            field = stripped;
        }
        self.pos = end;
        Cow::Borrowed(field)
    }
}

impl<'a> Iterator for RecordScanner<'a> {
    type Item = RawRecord<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.pos >= self.buf.len() {
                return None;
            }

            let start_line = self.line;
            let mut fields = Vec::new();

            loop {
                let field = if self.buf.get(self.pos) == Some(&b'"') {
                    self.quoted_field()
                } else {
                    self.plain_field()
                };
                fields.push(field);

                match self.buf.get(self.pos) {
                    None => break,
                    Some(b',') => self.pos += 1,
                    Some(_) => {
                        // newline
                        self.pos += 1;
                        self.line += 1;
                        break;
                    }
                }
            }

            if fields.len() == 1 && fields[0].is_empty() {
                continue;
            }

            return Some(RawRecord {
                line: start_line,
                fields,
            });
        }
    }
}
