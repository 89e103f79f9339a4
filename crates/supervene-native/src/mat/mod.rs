//! MAT-file (Level 5) codec
//!
//! The recordings ship as MATLAB Level 5 files. This module reads numeric
//! and cell arrays from them (plain or zlib-compressed, either byte order)
//! and writes the same subset back out.
//!
//! - [`reader`]: [`MatFile`] parsing
//! - [`writer`]: [`MatWriter`] encoding

pub mod reader;
pub mod writer;

pub use reader::MatFile;
pub use writer::{Endian, MatWriter};

use ndarray::{Array1, Array2, ArrayD, IxDyn, ShapeBuilder};

use crate::error::{MatError, MatResult};

/// Element data types from the tag of each data element.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DataType {
    /// 8-bit signed
    Int8,
    /// 8-bit unsigned
    UInt8,
    /// 16-bit signed
    Int16,
    /// 16-bit unsigned
    UInt16,
    /// 32-bit signed
    Int32,
    /// 32-bit unsigned
    UInt32,
    /// IEEE single
    Single,
    /// IEEE double
    Double,
    /// 64-bit signed
    Int64,
    /// 64-bit unsigned
    UInt64,
    /// Nested array
    Matrix,
    /// zlib-compressed element
    Compressed,
    /// UTF-8 text
    Utf8,
    /// UTF-16 text
    Utf16,
    /// UTF-32 text
    Utf32,
}

impl DataType {
    /// Decode a tag type code.
    ///
    /// # Errors
    ///
    /// Returns [`MatError::UnknownDataType`] for reserved or unknown codes.
    pub fn from_code(code: u32) -> MatResult<Self> {
        Ok(match code {
            1 => Self::Int8,
            2 => Self::UInt8,
            3 => Self::Int16,
            4 => Self::UInt16,
            5 => Self::Int32,
            6 => Self::UInt32,
            7 => Self::Single,
            9 => Self::Double,
            12 => Self::Int64,
            13 => Self::UInt64,
            14 => Self::Matrix,
            15 => Self::Compressed,
            16 => Self::Utf8,
            17 => Self::Utf16,
            18 => Self::Utf32,
            _ => return Err(MatError::UnknownDataType { code }),
        })
    }

    /// Tag type code
    #[must_use]
    pub const fn code(self) -> u32 {
        match self {
            Self::Int8 => 1,
            Self::UInt8 => 2,
            Self::Int16 => 3,
            Self::UInt16 => 4,
            Self::Int32 => 5,
            Self::UInt32 => 6,
            Self::Single => 7,
            Self::Double => 9,
            Self::Int64 => 12,
            Self::UInt64 => 13,
            Self::Matrix => 14,
            Self::Compressed => 15,
            Self::Utf8 => 16,
            Self::Utf16 => 17,
            Self::Utf32 => 18,
        }
    }

    /// Bytes per numeric element, `None` for non-numeric types
    #[must_use]
    pub const fn numeric_size(self) -> Option<usize> {
        match self {
            Self::Int8 | Self::UInt8 => Some(1),
            Self::Int16 | Self::UInt16 => Some(2),
            Self::Int32 | Self::UInt32 | Self::Single => Some(4),
            Self::Double | Self::Int64 | Self::UInt64 => Some(8),
            _ => None,
        }
    }
}

/// Array class stored in the array-flags subelement.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ArrayClass {
    /// Cell array
    Cell,
    /// Struct
    Struct,
    /// Object
    Object,
    /// Character array
    Char,
    /// Sparse matrix
    Sparse,
    /// Double precision
    Double,
    /// Single precision
    Single,
    /// 8-bit signed
    Int8,
    /// 8-bit unsigned (also logical)
    UInt8,
    /// 16-bit signed
    Int16,
    /// 16-bit unsigned
    UInt16,
    /// 32-bit signed
    Int32,
    /// 32-bit unsigned
    UInt32,
    /// 64-bit signed
    Int64,
    /// 64-bit unsigned
    UInt64,
}

impl ArrayClass {
    /// Decode the class byte of the array flags.
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            1 => Self::Cell,
            2 => Self::Struct,
            3 => Self::Object,
            4 => Self::Char,
            5 => Self::Sparse,
            6 => Self::Double,
            7 => Self::Single,
            8 => Self::Int8,
            9 => Self::UInt8,
            10 => Self::Int16,
            11 => Self::UInt16,
            12 => Self::Int32,
            13 => Self::UInt32,
            14 => Self::Int64,
            15 => Self::UInt64,
            _ => return None,
        })
    }

    /// Class byte for the array flags
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Cell => 1,
            Self::Struct => 2,
            Self::Object => 3,
            Self::Char => 4,
            Self::Sparse => 5,
            Self::Double => 6,
            Self::Single => 7,
            Self::Int8 => 8,
            Self::UInt8 => 9,
            Self::Int16 => 10,
            Self::UInt16 => 11,
            Self::Int32 => 12,
            Self::UInt32 => 13,
            Self::Int64 => 14,
            Self::UInt64 => 15,
        }
    }

    /// Whether values of this class decode to plain numbers
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::Double
                | Self::Single
                | Self::Int8
                | Self::UInt8
                | Self::Int16
                | Self::UInt16
                | Self::Int32
                | Self::UInt32
                | Self::Int64
                | Self::UInt64
        )
    }

    /// Human-readable class name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Cell => "cell",
            Self::Struct => "struct",
            Self::Object => "object",
            Self::Char => "char",
            Self::Sparse => "sparse",
            Self::Double => "double",
            Self::Single => "single",
            Self::Int8 => "int8",
            Self::UInt8 => "uint8",
            Self::Int16 => "int16",
            Self::UInt16 => "uint16",
            Self::Int32 => "int32",
            Self::UInt32 => "uint32",
            Self::Int64 => "int64",
            Self::UInt64 => "uint64",
        }
    }
}

/// Dense real array, values widened to `f64`, stored column-major.
#[derive(Clone, Debug, PartialEq)]
pub struct NumericArray {
    class: ArrayClass,
    dims: Vec<usize>,
    data: Vec<f64>,
}

impl NumericArray {
    /// Build a double array from column-major data.
    ///
    /// # Errors
    ///
    /// Returns [`MatError::Malformed`] if `data` does not hold exactly
    /// `product(dims)` values.
    pub fn new(dims: Vec<usize>, data: Vec<f64>) -> MatResult<Self> {
        Self::with_class(ArrayClass::Double, dims, data)
    }

    pub(crate) fn with_class(
        class: ArrayClass,
        dims: Vec<usize>,
        data: Vec<f64>,
    ) -> MatResult<Self> {
        let expected: usize = dims.iter().product();
        if expected != data.len() {
            return Err(MatError::Malformed {
                reason: format!("dimensions {dims:?} need {expected} values, found {}", data.len()),
            });
        }
        Ok(Self { class, dims, data })
    }

    /// Row vector `1 × n`
    #[must_use]
    pub fn row_vector(values: Vec<f64>) -> Self {
        Self { class: ArrayClass::Double, dims: vec![1, values.len()], data: values }
    }

    /// Column vector `n × 1`
    #[must_use]
    pub fn column_vector(values: Vec<f64>) -> Self {
        Self { class: ArrayClass::Double, dims: vec![values.len(), 1], data: values }
    }

    /// Matrix from a logical `[rows, cols]` array.
    #[must_use]
    pub fn from_array2(array: &Array2<f64>) -> Self {
        let (rows, cols) = array.dim();
        // Transposed logical iteration yields column-major order
        let data = array.t().iter().copied().collect();
        Self { class: ArrayClass::Double, dims: vec![rows, cols], data }
    }

    /// Stored class (the values are always widened to `f64`)
    #[must_use]
    pub fn class(&self) -> ArrayClass {
        self.class
    }

    /// Dimensions as stored in the file
    #[must_use]
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Number of elements
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the array has no elements
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Raw column-major values
    #[must_use]
    pub fn column_major(&self) -> &[f64] {
        &self.data
    }

    /// N-dimensional view with the stored dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`MatError::Malformed`] if the dimensions are inconsistent.
    pub fn to_arrayd(&self) -> MatResult<ArrayD<f64>> {
        ArrayD::from_shape_vec(IxDyn(&self.dims).f(), self.data.clone())
            .map_err(|e| MatError::Malformed { reason: e.to_string() })
    }

    /// Two-dimensional array; trailing singleton dimensions are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`MatError::Malformed`] if more than two non-trailing
    /// dimensions remain.
    pub fn to_array2(&self) -> MatResult<Array2<f64>> {
        let mut dims = self.dims.clone();
        while dims.len() > 2 && dims.last() == Some(&1) {
            dims.pop();
        }
        let (rows, cols) = match dims.as_slice() {
            [] => (1, 1),
            [n] => (*n, 1),
            [r, c] => (*r, *c),
            _ => {
                return Err(MatError::Malformed {
                    reason: format!("expected a matrix, found dimensions {:?}", self.dims),
                })
            }
        };
        Array2::from_shape_vec((rows, cols).f(), self.data.clone())
            .map_err(|e| MatError::Malformed { reason: e.to_string() })
    }

    /// Squeeze to a 1-D signal.
    ///
    /// # Errors
    ///
    /// Returns [`MatError::Malformed`] if more than one dimension is longer
    /// than one.
    pub fn squeeze(&self) -> MatResult<Array1<f64>> {
        if self.dims.iter().filter(|&&d| d > 1).count() > 1 {
            return Err(MatError::Malformed {
                reason: format!("expected a vector, found dimensions {:?}", self.dims),
            });
        }
        Ok(Array1::from(self.data.clone()))
    }

    /// Values in row-major (last index fastest) order.
    ///
    /// # Errors
    ///
    /// Same as [`Self::to_arrayd`].
    pub fn flatten_row_major(&self) -> MatResult<Vec<f64>> {
        Ok(self.to_arrayd()?.iter().copied().collect())
    }
}

/// Cell array, cells stored column-major.
#[derive(Clone, Debug, PartialEq)]
pub struct CellArray {
    dims: Vec<usize>,
    cells: Vec<MatValue>,
}

impl CellArray {
    /// Build a cell array from column-major cells.
    ///
    /// # Errors
    ///
    /// Returns [`MatError::Malformed`] on a count/dimension mismatch.
    pub fn new(dims: Vec<usize>, cells: Vec<MatValue>) -> MatResult<Self> {
        let expected: usize = dims.iter().product();
        if expected != cells.len() {
            return Err(MatError::Malformed {
                reason: format!(
                    "cell dimensions {dims:?} need {expected} cells, found {}",
                    cells.len()
                ),
            });
        }
        Ok(Self { dims, cells })
    }

    /// `n × 1` cell array
    #[must_use]
    pub fn column(cells: Vec<MatValue>) -> Self {
        Self { dims: vec![cells.len(), 1], cells }
    }

    /// `1 × n` cell array
    #[must_use]
    pub fn row(cells: Vec<MatValue>) -> Self {
        Self { dims: vec![1, cells.len()], cells }
    }

    /// Dimensions as stored in the file
    #[must_use]
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Number of cells
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the cell array is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cell at a linear (column-major) index
    #[must_use]
    pub fn linear(&self, index: usize) -> Option<&MatValue> {
        self.cells.get(index)
    }

    /// Cell at a multi-dimensional index
    #[must_use]
    pub fn get(&self, index: &[usize]) -> Option<&MatValue> {
        if index.len() != self.dims.len() || index.iter().zip(&self.dims).any(|(i, d)| i >= d) {
            return None;
        }
        let mut stride = 1;
        let mut offset = 0;
        for (i, d) in index.iter().zip(&self.dims) {
            offset += i * stride;
            stride *= d;
        }
        self.cells.get(offset)
    }

    /// Cells in column-major order
    pub fn iter(&self) -> impl Iterator<Item = &MatValue> {
        self.cells.iter()
    }
}

/// One decoded variable (or cell).
#[derive(Clone, Debug, PartialEq)]
pub enum MatValue {
    /// Real numeric or logical array
    Numeric(NumericArray),
    /// Cell array
    Cell(CellArray),
    /// Array of a class this codec does not decode
    Unsupported(ArrayClass),
}

impl MatValue {
    /// Kind name for error messages
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Numeric(_) => "numeric array",
            Self::Cell(_) => "cell array",
            Self::Unsupported(class) => class.name(),
        }
    }

    /// Numeric contents, if any
    #[must_use]
    pub fn as_numeric(&self) -> Option<&NumericArray> {
        match self {
            Self::Numeric(array) => Some(array),
            _ => None,
        }
    }

    /// Cell contents, if any
    #[must_use]
    pub fn as_cell(&self) -> Option<&CellArray> {
        match self {
            Self::Cell(cell) => Some(cell),
            _ => None,
        }
    }
}
