//! Command definitions
//!
//! Requests are typed argument lists rendered as multibulk request frames:
//!
//! ```text
//! *<argc>\r\n
//! $<len>\r\n<arg>\r\n      (repeated argc times)
//! ```
//!
//! Rendering is deterministic: the same command always produces the same
//! bytes, so a render that did not fit can simply be repeated into a larger
//! buffer.

use std::fmt::{self, Write as _};

/// One request argument
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Arg<'a> {
    /// Raw bytes, sent as-is
    Bytes(&'a [u8]),

    /// Signed integer, sent in decimal
    Int(i64),

    /// Floating point number, sent in its shortest round-trip decimal form
    Float(f64),
}

impl<'a> From<&'a [u8]> for Arg<'a> {
    fn from(value: &'a [u8]) -> Self {
        Arg::Bytes(value)
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for Arg<'a> {
    fn from(value: &'a [u8; N]) -> Self {
        Arg::Bytes(value)
    }
}

impl<'a> From<&'a str> for Arg<'a> {
    fn from(value: &'a str) -> Self {
        Arg::Bytes(value.as_bytes())
    }
}

impl<'a> From<&'a String> for Arg<'a> {
    fn from(value: &'a String) -> Self {
        Arg::Bytes(value.as_bytes())
    }
}

impl From<i64> for Arg<'_> {
    fn from(value: i64) -> Self {
        Arg::Int(value)
    }
}

impl From<i32> for Arg<'_> {
    fn from(value: i32) -> Self {
        Arg::Int(i64::from(value))
    }
}

impl From<u16> for Arg<'_> {
    fn from(value: u16) -> Self {
        Arg::Int(i64::from(value))
    }
}

impl From<u32> for Arg<'_> {
    fn from(value: u32) -> Self {
        Arg::Int(i64::from(value))
    }
}

impl From<f64> for Arg<'_> {
    fn from(value: f64) -> Self {
        Arg::Float(value)
    }
}

/// A request: command name followed by its arguments
#[derive(Debug, Clone, PartialEq)]
pub struct Command<'a> {
    args: Vec<Arg<'a>>,
}

impl<'a> Command<'a> {
    /// Start a command with its name
    pub fn new(name: &'a str) -> Self {
        Self {
            args: vec![Arg::from(name)],
        }
    }

    /// Append an argument (builder style)
    pub fn arg(mut self, arg: impl Into<Arg<'a>>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append an argument in place
    pub fn push(&mut self, arg: impl Into<Arg<'a>>) {
        self.args.push(arg.into());
    }

    /// Name and arguments, in order
    pub fn args(&self) -> &[Arg<'a>] {
        &self.args
    }

    /// Render into `out`, returning the full encoded length.
    ///
    /// When the return value exceeds `out.len()` the output is truncated and
    /// the caller should grow its buffer and render again.
    pub fn render(&self, out: &mut [u8]) -> usize {
        let mut writer = SliceWriter { out, pos: 0 };

        writer.put(b"*");
        // Writing into a SliceWriter never fails.
        let _ = write!(writer, "{}", self.args.len());
        writer.put(b"\r\n");

        for arg in &self.args {
            writer.put(b"$");
            let _ = write!(writer, "{}", arg_len(arg));
            writer.put(b"\r\n");
            match *arg {
                Arg::Bytes(bytes) => writer.put(bytes),
                Arg::Int(value) => {
                    let _ = write!(writer, "{}", value);
                }
                Arg::Float(value) => {
                    let _ = write!(writer, "{}", value);
                }
            }
            writer.put(b"\r\n");
        }

        writer.pos
    }

    /// Encoded length without rendering anything
    pub fn encoded_len(&self) -> usize {
        self.render(&mut [])
    }

    /// Render into a fresh vector
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = vec![0; self.encoded_len()];
        let written = self.render(&mut out);
        out.truncate(written);
        out
    }
}

impl fmt::Display for Command<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, arg) in self.args.iter().enumerate() {
            if index > 0 {
                f.write_char(' ')?;
            }
            match *arg {
                Arg::Bytes(bytes) => write!(f, "{}", String::from_utf8_lossy(bytes))?,
                Arg::Int(value) => write!(f, "{}", value)?,
                Arg::Float(value) => write!(f, "{}", value)?,
            }
        }
        Ok(())
    }
}

/// Byte length of an argument's textual form
fn arg_len(arg: &Arg<'_>) -> usize {
    let mut counter = Counter(0);
    match *arg {
        Arg::Bytes(bytes) => return bytes.len(),
        Arg::Int(value) => {
            let _ = write!(counter, "{}", value);
        }
        Arg::Float(value) => {
            let _ = write!(counter, "{}", value);
        }
    }
    counter.0
}

/// Copies what fits, counts everything
struct SliceWriter<'b> {
    out: &'b mut [u8],
    pos: usize,
}

impl SliceWriter<'_> {
    fn put(&mut self, bytes: &[u8]) {
        if self.pos < self.out.len() {
            let n = bytes.len().min(self.out.len() - self.pos);
            self.out[self.pos..self.pos + n].copy_from_slice(&bytes[..n]);
        }
        self.pos += bytes.len();
    }
}

impl fmt::Write for SliceWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.put(s.as_bytes());
        Ok(())
    }
}

struct Counter(usize);

impl fmt::Write for Counter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0 += s.len();
        Ok(())
    }
}
