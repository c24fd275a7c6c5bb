//! Arrays read from storage and the decoded values handed to callers.

use ndarray::{ArrayD, Axis, IxDyn};

use crate::util::{DataKind, DataType, Error, Result, Shape};

/// Element storage of an [`Array`].
///
/// Integers and floats are widened to 64 bits; the stored width lives in
/// [`Array::dtype`].
#[derive(Clone, Debug, PartialEq)]
pub enum ArrayData {
    Bool(ArrayD<bool>),
    Int(ArrayD<i64>),
    UInt(ArrayD<u64>),
    Float(ArrayD<f64>),
    /// (real, imaginary)
    Complex(ArrayD<[f64; 2]>),
    Text(ArrayD<String>),
}

/// An n-dimensional array as read from a dataset or attribute.
#[derive(Clone, Debug, PartialEq)]
pub struct Array {
    dtype: DataType,
    data: ArrayData,
}

macro_rules! map_data {
    ($data:expr, $a:ident => $body:expr) => {
        match $data {
            ArrayData::Bool($a) => ArrayData::Bool($body),
            ArrayData::Int($a) => ArrayData::Int($body),
            ArrayData::UInt($a) => ArrayData::UInt($body),
            ArrayData::Float($a) => ArrayData::Float($body),
            ArrayData::Complex($a) => ArrayData::Complex($body),
            ArrayData::Text($a) => ArrayData::Text($body),
        }
    };
}

macro_rules! with_data {
    ($data:expr, $a:ident => $body:expr) => {
        match $data {
            ArrayData::Bool($a) => $body,
            ArrayData::Int($a) => $body,
            ArrayData::UInt($a) => $body,
            ArrayData::Float($a) => $body,
            ArrayData::Complex($a) => $body,
            ArrayData::Text($a) => $body,
        }
    };
}

impl Array {
    /// Wrap data, checking that `dtype` belongs to the data variant.
    pub fn new(dtype: DataType, data: ArrayData) -> Result<Self> {
        let ok = matches!(
            (dtype.kind(), &data),
            (DataKind::Boolean, ArrayData::Bool(_))
                | (DataKind::Signed, ArrayData::Int(_))
                | (DataKind::Unsigned, ArrayData::UInt(_))
                | (DataKind::Float, ArrayData::Float(_))
                | (DataKind::Complex, ArrayData::Complex(_))
                | (DataKind::Text, ArrayData::Text(_))
        );
        if !ok {
            return Err(Error::Storage(format!(
                "dtype {} does not match array storage",
                dtype
            )));
        }
        Ok(Self { dtype, data })
    }

    /// Build from a flat vector and a shape.
    fn build<T>(
        shape: &[usize],
        values: Vec<T>,
        wrap: impl FnOnce(ArrayD<T>) -> ArrayData,
        dtype: DataType,
    ) -> Result<Self> {
        let arr = ArrayD::from_shape_vec(IxDyn(shape), values)
            .map_err(|e| Error::Storage(format!("shape {:?}: {}", shape, e)))?;
        Self::new(dtype, wrap(arr))
    }

    pub fn from_i64(dtype: DataType, shape: &[usize], values: Vec<i64>) -> Result<Self> {
        Self::build(shape, values, ArrayData::Int, dtype)
    }

    pub fn from_u64(dtype: DataType, shape: &[usize], values: Vec<u64>) -> Result<Self> {
        Self::build(shape, values, ArrayData::UInt, dtype)
    }

    pub fn from_f64(dtype: DataType, shape: &[usize], values: Vec<f64>) -> Result<Self> {
        Self::build(shape, values, ArrayData::Float, dtype)
    }

    pub fn from_bools(shape: &[usize], values: Vec<bool>) -> Result<Self> {
        Self::build(shape, values, ArrayData::Bool, DataType::Boolean)
    }

    pub fn from_complex(dtype: DataType, shape: &[usize], values: Vec<[f64; 2]>) -> Result<Self> {
        Self::build(shape, values, ArrayData::Complex, dtype)
    }

    pub fn from_strings(shape: &[usize], values: Vec<String>) -> Result<Self> {
        Self::build(shape, values, ArrayData::Text, DataType::String)
    }

    /// Rank-0 text array.
    pub fn text(s: impl Into<String>) -> Self {
        Self {
            dtype: DataType::String,
            data: ArrayData::Text(ArrayD::from_elem(IxDyn(&[]), s.into())),
        }
    }

    /// Rank-0 float64 array.
    pub fn scalar_f64(v: f64) -> Self {
        Self {
            dtype: DataType::Float64,
            data: ArrayData::Float(ArrayD::from_elem(IxDyn(&[]), v)),
        }
    }

    /// Rank-0 int64 array.
    pub fn scalar_i64(v: i64) -> Self {
        Self {
            dtype: DataType::Int64,
            data: ArrayData::Int(ArrayD::from_elem(IxDyn(&[]), v)),
        }
    }

    #[inline]
    pub fn dtype(&self) -> DataType {
        self.dtype
    }

    #[inline]
    pub fn data(&self) -> &ArrayData {
        &self.data
    }

    pub fn into_data(self) -> ArrayData {
        self.data
    }

    pub fn shape(&self) -> Shape {
        with_data!(&self.data, a => Shape::from_slice(a.shape()))
    }

    pub fn len(&self) -> usize {
        with_data!(&self.data, a => a.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Take index `index` along `axis`, dropping that axis.
    pub fn index_axis(&self, axis: usize, index: usize) -> Result<Self> {
        let shape = self.shape();
        let count = shape.size(axis).ok_or_else(|| {
            Error::Unsupported(format!("axis {} on array of shape {}", axis, shape))
        })?;
        if index >= count {
            return Err(Error::IndexOutOfRange { index, count });
        }
        let data = map_data!(&self.data, a => a.index_axis(Axis(axis), index).to_owned());
        Ok(Self { dtype: self.dtype, data })
    }

    /// Values as f64, for numeric (non-complex) arrays.
    pub fn to_f64(&self) -> Result<ArrayD<f64>> {
        match &self.data {
            ArrayData::Float(a) => Ok(a.clone()),
            ArrayData::Int(a) => Ok(a.mapv(|v| v as f64)),
            ArrayData::UInt(a) => Ok(a.mapv(|v| v as f64)),
            ArrayData::Bool(a) => Ok(a.mapv(|v| if v { 1.0 } else { 0.0 })),
            ArrayData::Complex(_) | ArrayData::Text(_) => Err(Error::Unsupported(format!(
                "conversion of {} data to float",
                self.dtype
            ))),
        }
    }

    /// Values as i64, for integer and boolean arrays.
    pub fn to_i64_vec(&self) -> Result<Vec<i64>> {
        match &self.data {
            ArrayData::Int(a) => Ok(a.iter().copied().collect()),
            ArrayData::UInt(a) => a
                .iter()
                .map(|&v| {
                    i64::try_from(v)
                        .map_err(|_| Error::Unsupported(format!("{} exceeds i64", v)))
                })
                .collect(),
            ArrayData::Bool(a) => Ok(a.iter().map(|&v| v as i64).collect()),
            ArrayData::Float(a) => a
                .iter()
                .map(|&v| {
                    if v.fract() == 0.0 && v.is_finite() {
                        Ok(v as i64)
                    } else {
                        Err(Error::Unsupported(format!("{} is not an integer", v)))
                    }
                })
                .collect(),
            ArrayData::Complex(_) | ArrayData::Text(_) => Err(Error::Unsupported(format!(
                "conversion of {} data to integer",
                self.dtype
            ))),
        }
    }

    /// Minimum and maximum over integer data, or None when empty.
    pub fn integer_extrema(&self) -> Option<(i128, i128)> {
        fn fold<I: Iterator<Item = i128>>(mut it: I) -> Option<(i128, i128)> {
            let first = it.next()?;
            Some(it.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
        }
        match &self.data {
            ArrayData::Int(a) => fold(a.iter().map(|&v| v as i128)),
            ArrayData::UInt(a) => fold(a.iter().map(|&v| v as i128)),
            _ => None,
        }
    }

    /// Apply the uniform decode rule.
    ///
    /// Single-element arrays reduce to their scalar; anything else passes
    /// through unchanged.
    pub fn decode(self) -> Value {
        if self.len() != 1 {
            return Value::Array(self);
        }
        match &self.data {
            ArrayData::Bool(a) => a.iter().next().map(|&v| Value::Bool(v)),
            ArrayData::Int(a) => a.iter().next().map(|&v| Value::Int(v)),
            ArrayData::UInt(a) => a.iter().next().map(|&v| Value::UInt(v)),
            ArrayData::Float(a) => a.iter().next().map(|&v| Value::Float(v)),
            ArrayData::Complex(a) => a.iter().next().map(|&[re, im]| Value::Complex(re, im)),
            ArrayData::Text(a) => a.iter().next().map(|v| Value::Text(v.clone())),
        }
        .unwrap_or_else(|| Value::Text(String::new()))
    }
}

impl From<&str> for Array {
    fn from(s: &str) -> Self {
        Self::text(s)
    }
}

impl From<String> for Array {
    fn from(s: String) -> Self {
        Self::text(s)
    }
}

impl From<f64> for Array {
    fn from(v: f64) -> Self {
        Self::scalar_f64(v)
    }
}

impl From<i64> for Array {
    fn from(v: i64) -> Self {
        Self::scalar_i64(v)
    }
}

impl From<Vec<f64>> for Array {
    fn from(v: Vec<f64>) -> Self {
        Self {
            dtype: DataType::Float64,
            data: ArrayData::Float(ndarray::Array1::from(v).into_dyn()),
        }
    }
}

impl From<Vec<i64>> for Array {
    fn from(v: Vec<i64>) -> Self {
        Self {
            dtype: DataType::Int64,
            data: ArrayData::Int(ndarray::Array1::from(v).into_dyn()),
        }
    }
}

/// A decoded field value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Text(String),
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Complex(f64, f64),
    /// Multi-element data, unchanged.
    Array(Array),
}

impl Value {
    /// Numeric scalar as f64.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::Float(v) => Some(v),
            Self::Int(v) => Some(v as f64),
            Self::UInt(v) => Some(v as f64),
            _ => None,
        }
    }

    /// Integer scalar as i64.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Self::Int(v) => Some(v),
            Self::UInt(v) => i64::try_from(v).ok(),
            Self::Float(v) if v.fract() == 0.0 => Some(v as i64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Self::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Numeric content flattened to f64, scalar or array.
    pub fn to_f64_vec(&self) -> Option<Vec<f64>> {
        match self {
            Self::Array(a) => a.to_f64().ok().map(|v| v.iter().copied().collect()),
            other => other.as_f64().map(|v| vec![v]),
        }
    }

    /// JSON rendering for reports and tooling.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::json;
        match self {
            Self::Text(s) => json!(s),
            Self::Bool(b) => json!(b),
            Self::Int(v) => json!(v),
            Self::UInt(v) => json!(v),
            Self::Float(v) => json!(v),
            Self::Complex(re, im) => json!([re, im]),
            Self::Array(a) => array_to_json(a),
        }
    }
}

fn array_to_json(a: &Array) -> serde_json::Value {
    use serde_json::json;
    let values: Vec<serde_json::Value> = match a.data() {
        ArrayData::Bool(x) => x.iter().map(|v| json!(v)).collect(),
        ArrayData::Int(x) => x.iter().map(|v| json!(v)).collect(),
        ArrayData::UInt(x) => x.iter().map(|v| json!(v)).collect(),
        ArrayData::Float(x) => x.iter().map(|v| json!(v)).collect(),
        ArrayData::Complex(x) => x.iter().map(|v| json!(v)).collect(),
        ArrayData::Text(x) => x.iter().map(|v| json!(v)).collect(),
    };
    json!({
        "dtype": a.dtype().name(),
        "shape": a.shape().sizes(),
        "data": values,
    })
}
