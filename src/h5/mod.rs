//! HDF5 storage backend.
//!
//! Adapts an `hdf5::File` opened read-only to [`StorageReader`]. Whole
//! datasets are read with `read_raw` and reshaped here; A-scan lanes are
//! read as hyperslabs so only the selected slab leaves the file.

use std::path::Path;

use hdf5::types::{
    CompoundType, FixedAscii, FixedUnicode, FloatSize, IntSize, TypeDescriptor, VarLenAscii,
    VarLenUnicode,
};
use hdf5::{H5Type, Hyperslab, Selection, SliceOrIndex};
use ndarray::IxDyn;

use crate::core::{Array, DatasetInfo, NodeKind, StorageReader};
use crate::util::{DataType, Error, Result, Shape};

/// Upper bound on fixed-length string attributes.
const MAX_FIXED_STRING: usize = 1024;

impl From<hdf5::Error> for Error {
    fn from(e: hdf5::Error) -> Self {
        Error::Storage(e.to_string())
    }
}

/// Complex element in the `{r, i}` compound layout h5py writes.
#[derive(H5Type, Clone, Copy, Debug)]
#[repr(C)]
struct ComplexF32 {
    r: f32,
    i: f32,
}

#[derive(H5Type, Clone, Copy, Debug)]
#[repr(C)]
struct ComplexF64 {
    r: f64,
    i: f64,
}

/// A read-only HDF5 file.
#[derive(Debug)]
pub struct Hdf5Storage {
    file: hdf5::File,
    name: String,
}

impl Hdf5Storage {
    /// Open a file for reading.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} does not exist", path.display()),
            )));
        }
        let file = hdf5::File::open(path)?;
        tracing::debug!("hdf5: opened {}", path.display());
        Ok(Self { file, name: path.display().to_string() })
    }

    fn group(&self, path: &str) -> Result<hdf5::Group> {
        match self.node_kind(path)? {
            NodeKind::Group => Ok(self.file.group(path)?),
            NodeKind::Dataset => Err(Error::Storage(format!("{} is not a group", path))),
        }
    }

    fn dataset(&self, path: &str) -> Result<hdf5::Dataset> {
        match self.node_kind(path)? {
            NodeKind::Dataset => Ok(self.file.dataset(path)?),
            NodeKind::Group => Err(Error::Storage(format!("{} is a group, not a dataset", path))),
        }
    }

    /// Run `f` on the group or dataset at `path`.
    fn with_location<R>(
        &self,
        path: &str,
        f: impl FnOnce(&hdf5::Location) -> Result<R>,
    ) -> Result<R> {
        match self.node_kind(path)? {
            NodeKind::Group => f(&self.file.group(path)?),
            NodeKind::Dataset => f(&self.file.dataset(path)?),
        }
    }
}

impl StorageReader for Hdf5Storage {
    fn name(&self) -> &str {
        &self.name
    }

    fn node_kind(&self, path: &str) -> Result<NodeKind> {
        if path.is_empty() || path == "/" {
            return Ok(NodeKind::Group);
        }
        if !self.file.link_exists(path) {
            return Err(Error::NotFound(path.to_string()));
        }
        if self.file.dataset(path).is_ok() {
            Ok(NodeKind::Dataset)
        } else if self.file.group(path).is_ok() {
            Ok(NodeKind::Group)
        } else {
            Err(Error::Unsupported(format!("{} is neither a group nor a dataset", path)))
        }
    }

    fn member_names(&self, group: &str) -> Result<Vec<String>> {
        Ok(self.group(group)?.member_names()?)
    }

    fn attribute_names(&self, path: &str) -> Result<Vec<String>> {
        self.with_location(path, |loc| Ok(loc.attr_names()?))
    }

    fn read_attribute(&self, path: &str, name: &str) -> Result<Array> {
        self.with_location(path, |loc| {
            if !loc.attr_names()?.iter().any(|n| n == name) {
                return Err(Error::NotFound(format!("{}@{}", path, name)));
            }
            let attr = loc.attr(name)?;
            read_container(&attr, path)
        })
    }

    fn dataset_info(&self, path: &str) -> Result<DatasetInfo> {
        let ds = self.dataset(path)?;
        let descriptor = ds.dtype()?.to_descriptor()?;
        let dtype = element_type(&descriptor)
            .ok_or_else(|| Error::Unsupported(format!("{}: element type {:?}", path, descriptor)))?;
        Ok(DatasetInfo { dtype, shape: Shape::from(ds.shape()) })
    }

    fn read_dataset(&self, path: &str) -> Result<Array> {
        let ds = self.dataset(path)?;
        tracing::trace!("hdf5: read {}", path);
        read_container(&ds, path)
    }

    fn read_dataset_lane(&self, path: &str, axis: usize, index: usize) -> Result<Array> {
        let ds = self.dataset(path)?;
        let shape = lane_shape(&ds.shape(), axis, index)?;
        let descriptor = ds.dtype()?.to_descriptor()?;
        let dtype = element_type(&descriptor)
            .ok_or_else(|| Error::Unsupported(format!("{}: element type {:?}", path, descriptor)))?;
        let selection = lane_selection(ds.ndim(), axis, index);
        tracing::trace!("hdf5: read {}[{}] on axis {}", path, index, axis);
        match descriptor {
            TypeDescriptor::Boolean => Array::from_bools(&shape, read_slab(&ds, selection)?),
            TypeDescriptor::Integer(_) => Array::from_i64(dtype, &shape, read_slab(&ds, selection)?),
            TypeDescriptor::Unsigned(_) => Array::from_u64(dtype, &shape, read_slab(&ds, selection)?),
            TypeDescriptor::Float(_) => Array::from_f64(dtype, &shape, read_slab(&ds, selection)?),
            // strings and complex compounds are never bulk sample data
            _ => read_container(&ds, path)?.index_axis(axis, index),
        }
    }
}

/// Shape of the slab at `index` along `axis`, with that axis removed.
fn lane_shape(shape: &[usize], axis: usize, index: usize) -> Result<Vec<usize>> {
    let count = *shape.get(axis).ok_or_else(|| {
        Error::Unsupported(format!("axis {} on dataset of shape {:?}", axis, shape))
    })?;
    if index >= count {
        return Err(Error::IndexOutOfRange { index, count });
    }
    Ok(shape
        .iter()
        .enumerate()
        .filter(|&(d, _)| d != axis)
        .map(|(_, &n)| n)
        .collect())
}

/// Hyperslab fixing `axis` at `index` and spanning every other axis.
fn lane_selection(rank: usize, axis: usize, index: usize) -> Selection {
    let dims: Vec<SliceOrIndex> = (0..rank)
        .map(|d| if d == axis { SliceOrIndex::Index(index) } else { SliceOrIndex::from(..) })
        .collect();
    Selection::from(Hyperslab::from(dims))
}

fn read_slab<T: H5Type>(ds: &hdf5::Dataset, selection: Selection) -> Result<Vec<T>> {
    Ok(ds.read_slice::<T, _, IxDyn>(selection)?.into_raw_vec())
}

/// Map an HDF5 type onto the crate's element types.
fn element_type(descriptor: &TypeDescriptor) -> Option<DataType> {
    Some(match descriptor {
        TypeDescriptor::Boolean => DataType::Boolean,
        TypeDescriptor::Integer(size) => match size {
            IntSize::U1 => DataType::Int8,
            IntSize::U2 => DataType::Int16,
            IntSize::U4 => DataType::Int32,
            IntSize::U8 => DataType::Int64,
        },
        TypeDescriptor::Unsigned(size) => match size {
            IntSize::U1 => DataType::Uint8,
            IntSize::U2 => DataType::Uint16,
            IntSize::U4 => DataType::Uint32,
            IntSize::U8 => DataType::Uint64,
        },
        TypeDescriptor::Float(FloatSize::U4) => DataType::Float32,
        TypeDescriptor::Float(_) => DataType::Float64,
        TypeDescriptor::FixedAscii(_)
        | TypeDescriptor::FixedUnicode(_)
        | TypeDescriptor::VarLenAscii
        | TypeDescriptor::VarLenUnicode => DataType::String,
        TypeDescriptor::Compound(ct) => return complex_type(ct),
        _ => return None,
    })
}

/// Complex element type of a two-float `{r, i}` compound.
fn complex_type(ct: &CompoundType) -> Option<DataType> {
    match ct.fields.as_slice() {
        [re, im] if re.name == "r" && im.name == "i" => match (&re.ty, &im.ty) {
            (TypeDescriptor::Float(FloatSize::U4), TypeDescriptor::Float(FloatSize::U4)) => {
                Some(DataType::Complex64)
            }
            (TypeDescriptor::Float(FloatSize::U8), TypeDescriptor::Float(FloatSize::U8)) => {
                Some(DataType::Complex128)
            }
            _ => None,
        },
        _ => None,
    }
}

/// Read a dataset or attribute into an [`Array`].
fn read_container(c: &hdf5::Container, path: &str) -> Result<Array> {
    let shape = c.shape();
    let descriptor = c.dtype()?.to_descriptor()?;
    let dtype = element_type(&descriptor)
        .ok_or_else(|| Error::Unsupported(format!("{}: element type {:?}", path, descriptor)))?;
    match descriptor {
        TypeDescriptor::Boolean => Array::from_bools(&shape, c.read_raw::<bool>()?),
        TypeDescriptor::Integer(_) => Array::from_i64(dtype, &shape, c.read_raw::<i64>()?),
        TypeDescriptor::Unsigned(_) => Array::from_u64(dtype, &shape, c.read_raw::<u64>()?),
        TypeDescriptor::Float(_) => Array::from_f64(dtype, &shape, c.read_raw::<f64>()?),
        TypeDescriptor::VarLenUnicode => {
            let raw = c.read_raw::<VarLenUnicode>()?;
            Array::from_strings(&shape, raw.iter().map(|s| s.as_str().to_string()).collect())
        }
        TypeDescriptor::VarLenAscii => {
            let raw = c.read_raw::<VarLenAscii>()?;
            Array::from_strings(&shape, raw.iter().map(|s| s.as_str().to_string()).collect())
        }
        TypeDescriptor::FixedAscii(n) | TypeDescriptor::FixedUnicode(n) if n > MAX_FIXED_STRING => {
            Err(Error::Unsupported(format!("{}: {}-byte fixed string", path, n)))
        }
        TypeDescriptor::FixedAscii(_) => {
            let raw = c.read_raw::<FixedAscii<MAX_FIXED_STRING>>()?;
            Array::from_strings(&shape, raw.iter().map(|s| s.as_str().to_string()).collect())
        }
        TypeDescriptor::FixedUnicode(_) => {
            let raw = c.read_raw::<FixedUnicode<MAX_FIXED_STRING>>()?;
            Array::from_strings(&shape, raw.iter().map(|s| s.as_str().to_string()).collect())
        }
        TypeDescriptor::Compound(_) if dtype == DataType::Complex64 => {
            let raw = c.read_raw::<ComplexF32>()?;
            Array::from_complex(dtype, &shape, raw.iter().map(|z| [z.r as f64, z.i as f64]).collect())
        }
        TypeDescriptor::Compound(_) => {
            let raw = c.read_raw::<ComplexF64>()?;
            Array::from_complex(dtype, &shape, raw.iter().map(|z| [z.r, z.i]).collect())
        }
        other => Err(Error::Unsupported(format!("{}: element type {:?}", path, other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lane_shape() {
        assert_eq!(lane_shape(&[2, 3, 8], 1, 2).unwrap(), vec![2, 8]);
        assert_eq!(lane_shape(&[2, 3, 8], 0, 0).unwrap(), vec![3, 8]);
        assert!(matches!(
            lane_shape(&[2, 3, 8], 1, 3),
            Err(Error::IndexOutOfRange { index: 3, count: 3 })
        ));
        assert!(matches!(lane_shape(&[2, 3], 2, 0), Err(Error::Unsupported(_))));
    }

    #[test]
    fn test_complex_compounds() {
        assert_eq!(element_type(&ComplexF32::type_descriptor()), Some(DataType::Complex64));
        assert_eq!(element_type(&ComplexF64::type_descriptor()), Some(DataType::Complex128));
        assert_eq!(element_type(&<(f64, f64)>::type_descriptor()), None);
        assert_eq!(element_type(&f32::type_descriptor()), Some(DataType::Float32));
    }
}
