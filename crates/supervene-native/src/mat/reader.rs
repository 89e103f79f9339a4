//! MAT-file parsing
//!
//! A Level 5 file is a 128-byte header followed by a flat list of tagged
//! data elements. Each top-level variable is an `miMATRIX` element, or an
//! `miCOMPRESSED` element wrapping one.

use std::io::Read;
use std::marker::PhantomData;
use std::path::Path;

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use flate2::read::ZlibDecoder;

use super::{ArrayClass, CellArray, DataType, MatValue, NumericArray};
use crate::error::{MatError, MatResult};

/// Size of the file header in bytes
pub const HEADER_LEN: usize = 128;

const FLAG_COMPLEX: u32 = 0x0800;

/// Decoded contents of a MAT file.
#[derive(Clone, Debug, Default)]
pub struct MatFile {
    description: String,
    variables: Vec<(String, MatValue)>,
}

impl MatFile {
    /// Read and decode a file from disk.
    ///
    /// # Errors
    ///
    /// Returns [`MatError::Io`] if the file cannot be read, otherwise any
    /// decoding error from [`Self::from_bytes`].
    pub fn open(path: impl AsRef<Path>) -> MatResult<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    /// Decode an in-memory file.
    ///
    /// # Errors
    ///
    /// Returns [`MatError::InvalidHeader`] for a bad header,
    /// [`MatError::Unsupported`] for v7.3 (HDF5) files, and element-level
    /// errors for corrupt contents.
    pub fn from_bytes(bytes: &[u8]) -> MatResult<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(MatError::InvalidHeader {
                reason: format!("file has {} bytes, header needs {HEADER_LEN}", bytes.len()),
            });
        }

        let description = String::from_utf8_lossy(&bytes[..116]).trim_end().to_string();
        if description.starts_with("MATLAB 7.3") {
            return Err(MatError::Unsupported {
                what: "MAT v7.3 (HDF5) files".into(),
            });
        }

        let variables = match &bytes[126..128] {
            b"IM" => parse_elements::<LittleEndian>(&bytes[HEADER_LEN..])?,
            b"MI" => parse_elements::<BigEndian>(&bytes[HEADER_LEN..])?,
            other => {
                return Err(MatError::InvalidHeader {
                    reason: format!("bad endian indicator {other:?}"),
                })
            }
        };

        Ok(Self { description, variables })
    }

    /// Header description text
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Variable names in file order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.variables.iter().map(|(name, _)| name.as_str())
    }

    /// Look up a variable by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&MatValue> {
        self.variables.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Look up a variable that must exist.
    ///
    /// # Errors
    ///
    /// Returns [`MatError::VariableNotFound`] if absent.
    pub fn require(&self, name: &str) -> MatResult<&MatValue> {
        self.get(name).ok_or_else(|| MatError::VariableNotFound { name: name.into() })
    }

    /// Look up a numeric variable.
    ///
    /// # Errors
    ///
    /// Returns [`MatError::VariableNotFound`] or
    /// [`MatError::UnexpectedClass`].
    pub fn numeric(&self, name: &str) -> MatResult<&NumericArray> {
        let value = self.require(name)?;
        value.as_numeric().ok_or_else(|| MatError::UnexpectedClass {
            name: name.into(),
            expected: "numeric array",
            found: value.kind(),
        })
    }

    /// Look up a cell-array variable.
    ///
    /// # Errors
    ///
    /// Returns [`MatError::VariableNotFound`] or
    /// [`MatError::UnexpectedClass`].
    pub fn cell(&self, name: &str) -> MatResult<&CellArray> {
        let value = self.require(name)?;
        value.as_cell().ok_or_else(|| MatError::UnexpectedClass {
            name: name.into(),
            expected: "cell array",
            found: value.kind(),
        })
    }
}

/// A tagged data element borrowed from the input buffer
struct Element<'a> {
    data_type: DataType,
    payload: &'a [u8],
}

struct Cursor<'a, B> {
    bytes: &'a [u8],
    pos: usize,
    _order: PhantomData<B>,
}

impl<'a, B: ByteOrder> Cursor<'a, B> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0, _order: PhantomData }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn take(&mut self, n: usize) -> MatResult<&'a [u8]> {
        if n > self.remaining() {
            return Err(MatError::Truncated { needed: n, available: self.remaining() });
        }
        let slice = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn u32(&mut self) -> MatResult<u32> {
        self.take(4).map(B::read_u32)
    }

    fn skip_padding(&mut self, len: usize) {
        let pad = (8 - len % 8) % 8;
        self.pos = (self.pos + pad).min(self.bytes.len());
    }

    fn element(&mut self) -> MatResult<Element<'a>> {
        let word = self.u32()?;

        // Small data element: size in the upper half, payload in 4 bytes
        if word >> 16 != 0 {
            let size = (word >> 16) as usize;
            let data_type = DataType::from_code(word & 0xFFFF)?;
            let packed = self.take(4)?;
            if size > 4 {
                return Err(MatError::Malformed {
                    reason: format!("small element claims {size} bytes"),
                });
            }
            return Ok(Element { data_type, payload: &packed[..size] });
        }

        let data_type = DataType::from_code(word)?;
        let size = self.u32()? as usize;
        let payload = self.take(size)?;
        if data_type != DataType::Compressed {
            self.skip_padding(size);
        }
        Ok(Element { data_type, payload })
    }

    fn expect(&mut self, expected: DataType, what: &str) -> MatResult<&'a [u8]> {
        let element = self.element()?;
        if element.data_type == expected {
            Ok(element.payload)
        } else {
            Err(MatError::Malformed {
                reason: format!("{what}: expected {expected:?}, found {:?}", element.data_type),
            })
        }
    }
}

fn parse_elements<B: ByteOrder>(bytes: &[u8]) -> MatResult<Vec<(String, MatValue)>> {
    let mut cursor = Cursor::<B>::new(bytes);
    let mut variables = Vec::new();

    // Trailing bytes shorter than a tag are padding
    while cursor.remaining() >= 8 {
        let element = cursor.element()?;
        match element.data_type {
            DataType::Matrix => variables.push(parse_matrix::<B>(element.payload)?),
            DataType::Compressed => {
                let mut inflated = Vec::new();
                ZlibDecoder::new(element.payload)
                    .read_to_end(&mut inflated)
                    .map_err(MatError::Decompress)?;
                variables.extend(parse_elements::<B>(&inflated)?);
            }
            _ => {}
        }
    }

    Ok(variables)
}

fn parse_matrix<B: ByteOrder>(payload: &[u8]) -> MatResult<(String, MatValue)> {
    // Empty cells are written as zero-length matrix elements
    if payload.is_empty() {
        let empty = NumericArray::with_class(ArrayClass::Double, vec![0, 0], Vec::new())?;
        return Ok((String::new(), MatValue::Numeric(empty)));
    }

    let mut cursor = Cursor::<B>::new(payload);

    let flags = cursor.expect(DataType::UInt32, "array flags")?;
    if flags.len() < 8 {
        return Err(MatError::Malformed { reason: "array flags shorter than 8 bytes".into() });
    }
    let flag_word = B::read_u32(&flags[..4]);
    let class_code = (flag_word & 0xFF) as u8;
    let class = ArrayClass::from_code(class_code).ok_or_else(|| MatError::Malformed {
        reason: format!("unknown array class {class_code}"),
    })?;

    let dims = parse_dims::<B>(cursor.expect(DataType::Int32, "dimensions")?)?;
    let name_bytes = cursor.expect(DataType::Int8, "array name")?;
    let name = String::from_utf8_lossy(name_bytes).into_owned();

    let value = match class {
        ArrayClass::Cell => {
            let count: usize = dims.iter().product();
            let mut cells = Vec::with_capacity(count);
            for _ in 0..count {
                let payload = cursor.expect(DataType::Matrix, "cell contents")?;
                cells.push(parse_matrix::<B>(payload)?.1);
            }
            MatValue::Cell(CellArray::new(dims, cells)?)
        }
        class if class.is_numeric() => {
            if flag_word & FLAG_COMPLEX != 0 {
                return Err(MatError::Unsupported { what: format!("complex array '{name}'") });
            }
            let real = cursor.element()?;
            let data = decode_numeric::<B>(real.data_type, real.payload)?;
            MatValue::Numeric(NumericArray::with_class(class, dims, data)?)
        }
        other => MatValue::Unsupported(other),
    };

    Ok((name, value))
}

fn parse_dims<B: ByteOrder>(payload: &[u8]) -> MatResult<Vec<usize>> {
    payload
        .chunks_exact(4)
        .map(|chunk| {
            let d = B::read_i32(chunk);
            usize::try_from(d).map_err(|_| MatError::Malformed {
                reason: format!("negative dimension {d}"),
            })
        })
        .collect()
}

/// Widen a numeric payload of any storage type to `f64`.
#[allow(clippy::cast_possible_truncation)]
fn decode_numeric<B: ByteOrder>(data_type: DataType, payload: &[u8]) -> MatResult<Vec<f64>> {
    let size = data_type.numeric_size().ok_or_else(|| MatError::Malformed {
        reason: format!("numeric data stored as {data_type:?}"),
    })?;
    if payload.len() % size != 0 {
        return Err(MatError::Malformed {
            reason: format!(
                "{} bytes is not a whole number of {data_type:?} values",
                payload.len()
            ),
        });
    }

    let chunks = payload.chunks_exact(size);
    Ok(match data_type {
        DataType::Int8 => payload.iter().map(|&b| f64::from(i8::from_ne_bytes([b]))).collect(),
        DataType::UInt8 => payload.iter().map(|&b| f64::from(b)).collect(),
        DataType::Int16 => chunks.map(|c| f64::from(B::read_i16(c))).collect(),
        DataType::UInt16 => chunks.map(|c| f64::from(B::read_u16(c))).collect(),
        DataType::Int32 => chunks.map(|c| f64::from(B::read_i32(c))).collect(),
        DataType::UInt32 => chunks.map(|c| f64::from(B::read_u32(c))).collect(),
        DataType::Single => chunks.map(|c| f64::from(B::read_f32(c))).collect(),
        DataType::Double => chunks.map(B::read_f64).collect(),
        DataType::Int64 => chunks.map(|c| B::read_i64(c) as f64).collect(),
        DataType::UInt64 => chunks.map(|c| B::read_u64(c) as f64).collect(),
        _ => unreachable!("non-numeric types have no element size"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Little-endian header plus raw element bytes.
    fn file_with(elements: &[u8]) -> Vec<u8> {
        let mut bytes = vec![b' '; 116];
        bytes[..10].copy_from_slice(b"MATLAB 5.0");
        bytes.extend_from_slice(&[0; 8]);
        bytes.extend_from_slice(&0x0100u16.to_le_bytes());
        bytes.extend_from_slice(b"IM");
        bytes.extend_from_slice(elements);
        bytes
    }

    fn tag(code: u32, size: u32) -> Vec<u8> {
        let mut out = code.to_le_bytes().to_vec();
        out.extend_from_slice(&size.to_le_bytes());
        out
    }

    /// `x = int16([1 -2 3])` using small elements for the name and data.
    fn small_int16_matrix() -> Vec<u8> {
        let mut body = tag(6, 8);
        body.extend_from_slice(&u32::from(ArrayClass::Int16.code()).to_le_bytes());
        body.extend_from_slice(&[0; 4]);
        body.extend(tag(5, 8));
        body.extend_from_slice(&1i32.to_le_bytes());
        body.extend_from_slice(&3i32.to_le_bytes());
        // name "x": small format, type 1, size 1
        body.extend_from_slice(&((1u32 << 16) | 1).to_le_bytes());
        body.extend_from_slice(&[b'x', 0, 0, 0]);
        // 3 × int16 = 6 bytes, padded to 8
        body.extend(tag(3, 6));
        for v in [1i16, -2, 3] {
            body.extend_from_slice(&v.to_le_bytes());
        }
        body.extend_from_slice(&[0, 0]);

        let mut element = tag(14, u32::try_from(body.len()).unwrap());
        element.extend(body);
        element
    }

    #[test]
    fn test_reads_small_elements_and_int_storage() {
        let file = MatFile::from_bytes(&file_with(&small_int16_matrix())).unwrap();
        let x = file.numeric("x").unwrap();
        assert_eq!(x.class(), ArrayClass::Int16);
        assert_eq!(x.dims(), &[1, 3]);
        assert_eq!(x.column_major(), &[1.0, -2.0, 3.0]);
        assert!(file.description().starts_with("MATLAB 5.0"));
    }

    #[test]
    fn test_int8_values_keep_their_sign() {
        let mut body = tag(6, 8);
        body.extend_from_slice(&u32::from(ArrayClass::Int8.code()).to_le_bytes());
        body.extend_from_slice(&[0; 4]);
        body.extend(tag(5, 8));
        body.extend_from_slice(&1i32.to_le_bytes());
        body.extend_from_slice(&3i32.to_le_bytes());
        body.extend_from_slice(&((1u32 << 16) | 1).to_le_bytes());
        body.extend_from_slice(&[b'b', 0, 0, 0]);
        // 3 × int8 in a small element
        body.extend_from_slice(&((3u32 << 16) | 1).to_le_bytes());
        body.extend_from_slice(&[1, 0xFE, 0x80, 0]);

        let mut element = tag(14, u32::try_from(body.len()).unwrap());
        element.extend(body);

        let file = MatFile::from_bytes(&file_with(&element)).unwrap();
        let b = file.numeric("b").unwrap();
        assert_eq!(b.class(), ArrayClass::Int8);
        assert_eq!(b.column_major(), &[1.0, -2.0, -128.0]);
    }

    #[test]
    fn test_missing_and_mistyped_variables() {
        let file = MatFile::from_bytes(&file_with(&small_int16_matrix())).unwrap();
        assert!(matches!(file.numeric("y"), Err(MatError::VariableNotFound { .. })));
        assert!(matches!(
            file.cell("x"),
            Err(MatError::UnexpectedClass { expected: "cell array", .. })
        ));
        assert_eq!(file.names().collect::<Vec<_>>(), vec!["x"]);
    }

    #[test]
    fn test_rejects_bad_headers() {
        assert!(matches!(MatFile::from_bytes(&[0; 10]), Err(MatError::InvalidHeader { .. })));

        let mut bad = file_with(&[]);
        bad[126..128].copy_from_slice(b"XX");
        assert!(matches!(MatFile::from_bytes(&bad), Err(MatError::InvalidHeader { .. })));

        let mut hdf5 = file_with(&[]);
        hdf5[..10].copy_from_slice(b"MATLAB 7.3");
        assert!(matches!(MatFile::from_bytes(&hdf5), Err(MatError::Unsupported { .. })));
    }

    #[test]
    fn test_truncated_element() {
        let mut elements = small_int16_matrix();
        elements.truncate(elements.len() - 12);
        assert!(matches!(
            MatFile::from_bytes(&file_with(&elements)),
            Err(MatError::Truncated { .. })
        ));
    }

    #[test]
    fn test_unknown_type_code() {
        let elements = tag(99, 0);
        assert!(matches!(
            MatFile::from_bytes(&file_with(&elements)),
            Err(MatError::UnknownDataType { code: 99 })
        ));
    }
}
