//! MAT-file encoding
//!
//! Writes numeric arrays (as double) and cell arrays, optionally wrapping
//! each variable in a zlib-compressed element. Used to build test
//! fixtures.

use std::io::Write;
use std::path::Path;

use byteorder::{BigEndian, ByteOrder, LittleEndian, WriteBytesExt};
use flate2::write::ZlibEncoder;
use flate2::Compression;

use super::reader::HEADER_LEN;
use super::{ArrayClass, CellArray, DataType, MatValue, NumericArray};
use crate::error::{MatError, MatResult};

/// Byte order of the written file
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Endian {
    /// Little endian (`IM` indicator)
    #[default]
    Little,
    /// Big endian (`MI` indicator)
    Big,
}

/// Builder for a Level 5 MAT file.
#[derive(Clone, Debug, Default)]
pub struct MatWriter {
    variables: Vec<(String, MatValue)>,
    compress: bool,
    endian: Endian,
}

impl MatWriter {
    /// Create an empty little-endian, uncompressed writer
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap each variable in a compressed element
    #[must_use]
    pub fn compressed(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// Select the byte order
    #[must_use]
    pub fn endian(mut self, endian: Endian) -> Self {
        self.endian = endian;
        self
    }

    /// Add a numeric variable
    pub fn numeric(&mut self, name: &str, array: NumericArray) -> &mut Self {
        self.variables.push((name.into(), MatValue::Numeric(array)));
        self
    }

    /// Add a cell-array variable
    pub fn cell(&mut self, name: &str, cell: CellArray) -> &mut Self {
        self.variables.push((name.into(), MatValue::Cell(cell)));
        self
    }

    /// Encode the whole file.
    ///
    /// # Errors
    ///
    /// Returns [`MatError::Unsupported`] if any variable (or nested cell)
    /// holds an undecodable class, or [`MatError::Io`] if compression fails.
    pub fn to_bytes(&self) -> MatResult<Vec<u8>> {
        match self.endian {
            Endian::Little => self.encode::<LittleEndian>(),
            Endian::Big => self.encode::<BigEndian>(),
        }
    }

    /// Encode and write to `path`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::to_bytes`], plus I/O errors from writing.
    pub fn write_to(&self, path: impl AsRef<Path>) -> MatResult<()> {
        std::fs::write(path, self.to_bytes()?)?;
        Ok(())
    }

    fn encode<B: ByteOrder>(&self) -> MatResult<Vec<u8>> {
        let mut out = Vec::with_capacity(HEADER_LEN);
        let mut text = format!(
            "MATLAB 5.0 MAT-file, Platform: rust, Created by: supervene {}",
            env!("CARGO_PKG_VERSION")
        )
        .into_bytes();
        text.resize(116, b' ');
        out.extend_from_slice(&text);
        out.extend_from_slice(&[0; 8]);
        out.write_u16::<B>(0x0100)?;
        out.extend_from_slice(match self.endian {
            Endian::Little => b"IM",
            Endian::Big => b"MI",
        });

        for (name, value) in &self.variables {
            let element = matrix_element::<B>(name, value)?;
            if self.compress {
                let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
                encoder.write_all(&element)?;
                let packed = encoder.finish()?;
                write_tag::<B>(&mut out, DataType::Compressed, packed.len())?;
                out.extend_from_slice(&packed);
            } else {
                out.extend_from_slice(&element);
            }
        }

        Ok(out)
    }
}

fn write_tag<B: ByteOrder>(out: &mut Vec<u8>, data_type: DataType, len: usize) -> MatResult<()> {
    let len = u32::try_from(len).map_err(|_| MatError::Unsupported {
        what: format!("element of {len} bytes exceeds the Level 5 size limit"),
    })?;
    out.write_u32::<B>(data_type.code())?;
    out.write_u32::<B>(len)?;
    Ok(())
}

fn pad(out: &mut Vec<u8>) {
    let extra = (8 - out.len() % 8) % 8;
    out.resize(out.len() + extra, 0);
}

/// Full `miMATRIX` element (tag included) for one value.
fn matrix_element<B: ByteOrder>(name: &str, value: &MatValue) -> MatResult<Vec<u8>> {
    let mut body = Vec::new();

    let (class, dims) = match value {
        MatValue::Numeric(array) => (ArrayClass::Double, array.dims()),
        MatValue::Cell(cell) => (ArrayClass::Cell, cell.dims()),
        MatValue::Unsupported(class) => {
            return Err(MatError::Unsupported { what: format!("writing {} arrays", class.name()) })
        }
    };

    write_tag::<B>(&mut body, DataType::UInt32, 8)?;
    body.write_u32::<B>(u32::from(class.code()))?;
    body.write_u32::<B>(0)?;

    write_tag::<B>(&mut body, DataType::Int32, 4 * dims.len())?;
    for &d in dims {
        let d = i32::try_from(d).map_err(|_| MatError::Unsupported {
            what: format!("dimension {d} exceeds i32"),
        })?;
        body.write_i32::<B>(d)?;
    }
    pad(&mut body);

    write_tag::<B>(&mut body, DataType::Int8, name.len())?;
    body.extend_from_slice(name.as_bytes());
    pad(&mut body);

    match value {
        MatValue::Numeric(array) => {
            write_tag::<B>(&mut body, DataType::Double, 8 * array.len())?;
            for &v in array.column_major() {
                body.write_f64::<B>(v)?;
            }
        }
        MatValue::Cell(cell) => {
            for inner in cell.iter() {
                body.extend(matrix_element::<B>("", inner)?);
            }
        }
        MatValue::Unsupported(_) => {}
    }

    let mut element = Vec::with_capacity(body.len() + 8);
    write_tag::<B>(&mut element, DataType::Matrix, body.len())?;
    element.extend(body);
    Ok(element)
}
