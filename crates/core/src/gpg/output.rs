//! gpg colon-format output parsing.
//!
//! `--with-colons` output is line oriented with `:` separated fields. Only the
//! first line is ever looked at, and reading stops right after the requested
//! field so the rest of the stream is left untouched for the caller.

use std::fmt;
use std::io::{self, BufRead};

/// 1-based field of a colon listing line that holds the key id.
pub const KEY_ID_FIELD: usize = 5;

/// Opaque key identifier as printed by gpg.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyId(Vec<u8>);

impl KeyId {
    /// Raw bytes of the identifier.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume into the raw bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl From<Vec<u8>> for KeyId {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for KeyId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

/// Lazy iterator over the `:` separated fields of the next line of a reader.
///
/// Each `next` consumes input up to and including the delimiter that ends the
/// field and nothing more. Iteration ends at the newline or at EOF.
pub struct ColonFields<'a, R> {
    reader: &'a mut R,
    started: bool,
    done: bool,
}

impl<'a, R: BufRead> ColonFields<'a, R> {
    /// Iterate over the fields of the next line of `reader`.
    pub fn new(reader: &'a mut R) -> Self {
        Self {
            reader,
            started: false,
            done: false,
        }
    }
}

impl<R: BufRead> Iterator for ColonFields<'_, R> {
    type Item = io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut field = Vec::new();
        loop {
            let buf = match self.reader.fill_buf() {
                Ok(buf) => buf,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            };

            if buf.is_empty() {
                self.done = true;
                // An empty stream has no line, hence no fields.
                return self.started.then_some(Ok(field));
            }
            self.started = true;

            match buf.iter().position(|&b| b == b':' || b == b'\n') {
                Some(i) => {
                    let newline = buf[i] == b'\n';
                    field.extend_from_slice(&buf[..i]);
                    self.reader.consume(i + 1);
                    if newline {
                        self.done = true;
                        if field.last() == Some(&b'\r') {
                            field.pop();
                        }
                    }
                    return Some(Ok(field));
                }
                None => {
                    let len = buf.len();
                    field.extend_from_slice(buf);
                    self.reader.consume(len);
                }
            }
        }
    }
}

/// Extract the `field`-th (1-based) field of the first line of `reader`.
///
/// `field - 1` leading fields are skipped and the next one is returned, so
/// `0` and `1` both select the first field. Returns `Ok(None)` for an empty
/// stream or a first line with fewer fields. Nothing past the returned field
/// is read.
pub fn extract_field<R: BufRead>(reader: &mut R, field: usize) -> io::Result<Option<KeyId>> {
    ColonFields::new(reader)
        .nth(field.saturating_sub(1))
        .transpose()
        .map(|f| f.map(KeyId::from))
}
