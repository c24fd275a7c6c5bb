//! Element data types of stored arrays.

use std::fmt;

/// Broad classification of a [`DataType`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DataKind {
    Boolean,
    Unsigned,
    Signed,
    Float,
    Complex,
    Text,
}

/// Element type of a dataset or attribute as reported by storage.
///
/// Integer and float values are widened when read into an
/// [`Array`](crate::core::Array), but the original width is kept here so
/// callers can tell a `uint16` acquisition from an `int32` one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum DataType {
    /// Boolean (0 = false, non-zero = true)
    Boolean = 0,
    Uint8 = 1,
    Int8 = 2,
    Uint16 = 3,
    Int16 = 4,
    Uint32 = 5,
    Int32 = 6,
    Uint64 = 7,
    Int64 = 8,
    Float32 = 10,
    #[default]
    Float64 = 11,
    /// Pair of f32 (real, imaginary)
    Complex64 = 12,
    /// Pair of f64 (real, imaginary)
    Complex128 = 13,
    /// Text, fixed or variable length
    String = 14,
}

impl DataType {
    /// Returns the size in bytes of a single element as stored.
    /// For strings, returns the size of a pointer.
    #[inline]
    pub const fn num_bytes(self) -> usize {
        match self {
            Self::Boolean | Self::Uint8 | Self::Int8 => 1,
            Self::Uint16 | Self::Int16 => 2,
            Self::Uint32 | Self::Int32 | Self::Float32 => 4,
            Self::Uint64 | Self::Int64 | Self::Float64 | Self::Complex64 => 8,
            Self::Complex128 => 16,
            Self::String => std::mem::size_of::<usize>(),
        }
    }

    /// Returns the name of this type as a string.
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Boolean => "bool",
            Self::Uint8 => "uint8",
            Self::Int8 => "int8",
            Self::Uint16 => "uint16",
            Self::Int16 => "int16",
            Self::Uint32 => "uint32",
            Self::Int32 => "int32",
            Self::Uint64 => "uint64",
            Self::Int64 => "int64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Complex64 => "complex64",
            Self::Complex128 => "complex128",
            Self::String => "string",
        }
    }

    /// Classify this type.
    pub const fn kind(self) -> DataKind {
        match self {
            Self::Boolean => DataKind::Boolean,
            Self::Uint8 | Self::Uint16 | Self::Uint32 | Self::Uint64 => DataKind::Unsigned,
            Self::Int8 | Self::Int16 | Self::Int32 | Self::Int64 => DataKind::Signed,
            Self::Float32 | Self::Float64 => DataKind::Float,
            Self::Complex64 | Self::Complex128 => DataKind::Complex,
            Self::String => DataKind::Text,
        }
    }

    /// Returns true if this is an integer type.
    #[inline]
    pub const fn is_integer(self) -> bool {
        matches!(self.kind(), DataKind::Unsigned | DataKind::Signed)
    }

    /// Returns true if this is a floating point type.
    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(self.kind(), DataKind::Float)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_type_sizes() {
        assert_eq!(DataType::Boolean.num_bytes(), 1);
        assert_eq!(DataType::Int16.num_bytes(), 2);
        assert_eq!(DataType::Float32.num_bytes(), 4);
        assert_eq!(DataType::Complex128.num_bytes(), 16);
    }

    #[test]
    fn test_data_kind() {
        assert_eq!(DataType::Uint16.kind(), DataKind::Unsigned);
        assert_eq!(DataType::Int8.kind(), DataKind::Signed);
        assert_eq!(DataType::Float32.kind(), DataKind::Float);
        assert_eq!(DataType::Complex64.kind(), DataKind::Complex);
        assert!(DataType::Int64.is_integer());
        assert!(!DataType::Float64.is_integer());
        assert_eq!(format!("{}", DataType::Uint8), "uint8");
    }
}
