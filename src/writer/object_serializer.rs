//! PDF object serialization.
//!
//! Serializes `lopdf` objects to their byte representation according to
//! ISO 32000-1:2008 Section 7.3. Dictionary entries keep their insertion
//! order so the byte position of a given entry is predictable, which the
//! signature placeholder relies on.

use lopdf::{Dictionary, Object, ObjectId, StringFormat};
use std::io::Write;

/// Serializer for PDF objects.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectSerializer;

impl ObjectSerializer {
    /// Create a new object serializer.
    pub fn new() -> Self {
        Self
    }

    /// Serialize an object to bytes.
    pub fn serialize(&self, obj: &Object) -> Vec<u8> {
        let mut buf = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.write_object(&mut buf, obj);
        buf
    }

    /// Serialize an object to a string (for debugging and tests).
    pub fn serialize_to_string(&self, obj: &Object) -> String {
        String::from_utf8_lossy(&self.serialize(obj)).into_owned()
    }

    /// Write an indirect object definition.
    ///
    /// Format: `{id} {gen} obj\n{object}\nendobj\n`
    pub fn write_indirect<W: Write>(&self, w: &mut W, id: ObjectId, obj: &Object) -> std::io::Result<()> {
        writeln!(w, "{} {} obj", id.0, id.1)?;
        self.write_object(w, obj)?;
        write!(w, "\nendobj\n")
    }

    /// Write an object.
    pub fn write_object<W: Write>(&self, w: &mut W, obj: &Object) -> std::io::Result<()> {
        match obj {
            Object::Null => write!(w, "null"),
            Object::Boolean(b) => write!(w, "{}", if *b { "true" } else { "false" }),
            Object::Integer(i) => write!(w, "{}", i),
            Object::Real(r) => self.write_real(w, f64::from(*r)),
            Object::Name(n) => self.write_name(w, n),
            Object::String(s, format) => self.write_string(w, s, *format),
            Object::Array(arr) => self.write_array(w, arr),
            Object::Dictionary(dict) => self.write_dictionary(w, dict),
            Object::Stream(stream) => self.write_stream(w, &stream.dict, &stream.content),
            Object::Reference((id, gen)) => write!(w, "{} {} R", id, gen),
        }
    }

    /// Write a dictionary.
    pub fn write_dictionary<W: Write>(&self, w: &mut W, dict: &Dictionary) -> std::io::Result<()> {
        write!(w, "<<")?;
        for (key, value) in dict.iter() {
            self.write_name(w, key)?;
            write!(w, " ")?;
            self.write_object(w, value)?;
        }
        write!(w, ">>")
    }

    fn write_real<W: Write>(&self, w: &mut W, value: f64) -> std::io::Result<()> {
        if !value.is_finite() {
            return write!(w, "0");
        }
        if value.fract() == 0.0 {
            write!(w, "{}", value as i64)
        } else {
            let formatted = format!("{:.5}", value);
            let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
            if trimmed == "-0" {
                write!(w, "0")
            } else {
                write!(w, "{}", trimmed)
            }
        }
    }

    fn write_string<W: Write>(&self, w: &mut W, data: &[u8], format: StringFormat) -> std::io::Result<()> {
        match format {
            StringFormat::Hexadecimal => {
                write!(w, "<")?;
                for byte in data {
                    write!(w, "{:02X}", byte)?;
                }
                write!(w, ">")
            },
            StringFormat::Literal => {
                write!(w, "(")?;
                for &byte in data {
                    match byte {
                        b'(' => write!(w, "\\(")?,
                        b')' => write!(w, "\\)")?,
                        b'\\' => write!(w, "\\\\")?,
                        b'\n' => write!(w, "\\n")?,
                        b'\r' => write!(w, "\\r")?,
                        _ => w.write_all(&[byte])?,
                    }
                }
                write!(w, ")")
            },
        }
    }

    /// Names start with `/`; delimiters, `#`, whitespace and anything
    /// outside the printable ASCII range are written as `#xx`.
    fn write_name<W: Write>(&self, w: &mut W, name: &[u8]) -> std::io::Result<()> {
        write!(w, "/")?;
        for &byte in name {
            match byte {
                b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%' | b'#' => {
                    write!(w, "#{:02X}", byte)?
                },
                0x21..=0x7E => w.write_all(&[byte])?,
                _ => write!(w, "#{:02X}", byte)?,
            }
        }
        Ok(())
    }

    fn write_array<W: Write>(&self, w: &mut W, arr: &[Object]) -> std::io::Result<()> {
        write!(w, "[")?;
        for (i, obj) in arr.iter().enumerate() {
            if i > 0 {
                write!(w, " ")?;
            }
            self.write_object(w, obj)?;
        }
        write!(w, "]")
    }

    /// `/Length` always reflects the bytes actually written.
    fn write_stream<W: Write>(&self, w: &mut W, dict: &Dictionary, data: &[u8]) -> std::io::Result<()> {
        let mut dict = dict.clone();
        dict.set("Length", Object::Integer(data.len() as i64));

        self.write_dictionary(w, &dict)?;
        write!(w, "\nstream\n")?;
        w.write_all(data)?;
        write!(w, "\nendstream")
    }
}
