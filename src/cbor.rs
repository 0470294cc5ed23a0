//! Minimaler CBOR-Pull-Reader für Plutus-Inline-Datums.
//! Kann genau das, was die Datum-Struktur braucht: Tags, Arrays fester
//! Länge, Byte-Strings und Integer. Keine Maps, Floats oder
//! indefinite-length-Formen.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Major {
    Uint,
    Nint,
    Bytes,
    Text,
    Array,
    Map,
    Tag,
    Simple,
}

impl Major {
    fn from_initial(byte: u8) -> Major {
        match byte >> 5 {
            0 => Major::Uint,
            1 => Major::Nint,
            2 => Major::Bytes,
            3 => Major::Text,
            4 => Major::Array,
            5 => Major::Map,
            6 => Major::Tag,
            _ => Major::Simple,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CborError {
    /// Eingabe endet mitten in einem Wert
    Truncated,
    /// Kopf-Byte oder Längenangabe, die der Reader nicht unterstützt
    Malformed,
}

pub struct CborReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> CborReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Major-Type des nächsten Werts, ohne ihn zu konsumieren.
    pub fn peek_major(&self) -> Option<Major> {
        self.buf.get(self.pos).copied().map(Major::from_initial)
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], CborError> {
        let end = self.pos.checked_add(n).ok_or(CborError::Malformed)?;
        if end > self.buf.len() {
            return Err(CborError::Truncated);
        }
        let out = &self.buf[self.pos..end];
        self.pos = end;
        Ok(out)
    }

    // Kopf-Byte plus Längen-/Wertargument konsumieren.
    fn head(&mut self) -> Result<(Major, u64), CborError> {
        let initial = self.take(1)?[0];
        let major = Major::from_initial(initial);
        let info = initial & 0x1f;
        let arg = match info {
            0..=23 => u64::from(info),
            24 => u64::from(self.take(1)?[0]),
            25 => {
                let b = self.take(2)?;
                u64::from(u16::from_be_bytes([b[0], b[1]]))
            }
            26 => {
                let b = self.take(4)?;
                u64::from(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
            }
            27 => {
                let b = self.take(8)?;
                u64::from_be_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]])
            }
            // 28-30 reserviert, 31 = indefinite (nicht unterstützt)
            _ => return Err(CborError::Malformed),
        };
        Ok((major, arg))
    }

    pub fn read_tag(&mut self) -> Result<u64, CborError> {
        match self.head()? {
            (Major::Tag, tag) => Ok(tag),
            _ => Err(CborError::Malformed),
        }
    }

    /// Liefert die Elementanzahl eines Arrays fester Länge.
    pub fn read_array_header(&mut self) -> Result<u64, CborError> {
        match self.head()? {
            (Major::Array, len) => Ok(len),
            _ => Err(CborError::Malformed),
        }
    }

    pub fn read_bytes(&mut self) -> Result<&'a [u8], CborError> {
        match self.head()? {
            (Major::Bytes, len) => {
                let len = usize::try_from(len).map_err(|_| CborError::Malformed)?;
                self.take(len)
            }
            _ => Err(CborError::Malformed),
        }
    }

    pub fn read_int(&mut self) -> Result<i64, CborError> {
        match self.head()? {
            (Major::Uint, v) => i64::try_from(v).map_err(|_| CborError::Malformed),
            (Major::Nint, v) => {
                let v = i64::try_from(v).map_err(|_| CborError::Malformed)?;
                Ok(-1 - v)
            }
            _ => Err(CborError::Malformed),
        }
    }
}
