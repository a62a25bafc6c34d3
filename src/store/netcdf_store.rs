//! netCDF-4 / HDF5 container backend.
//!
//! netCDF groups become groups, variables become datasets and group or variable
//! attributes become attributes. netCDF has no hard links, so every object has
//! exactly one reference and an address derived from its path.

use super::{join_path, ChildLink, ContainerHandle, ContainerStore, ObjectInfo, ObjectKind};
use crate::data::{encode_native, DatatypeClass, ElementType, ObjectShape};
use crate::error::{Result, StrataError};
use netcdf::types::{FloatType, IntType, NcVariableType};
use netcdf::AttributeValue;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

/// Opens files through the netCDF library.
#[derive(Debug, Clone, Copy, Default)]
pub struct NetcdfStore;

impl ContainerStore for NetcdfStore {
    type Handle = NetcdfHandle;

    fn open(&self, path: &Path) -> Result<NetcdfHandle> {
        let file = netcdf::open(path).map_err(|e| StrataError::open(path, e))?;
        tracing::debug!("Opened {}", path.display());
        Ok(NetcdfHandle {
            file,
            path: path.to_path_buf(),
        })
    }
}

/// One open netCDF file. Closed on drop.
pub struct NetcdfHandle {
    file: netcdf::File,
    path: PathBuf,
}

impl fmt::Debug for NetcdfHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetcdfHandle")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// An object found by path.
enum Located<'f> {
    Root,
    Group(netcdf::Group<'f>),
    Variable(netcdf::Variable<'f>),
}

impl NetcdfHandle {
    fn locate(&self, path: &str) -> Result<Located<'_>> {
        let trimmed = path.trim_matches('/');
        if trimmed.is_empty() {
            return Ok(Located::Root);
        }
        if let Some(group) = self.file.group(trimmed).ok().flatten() {
            return Ok(Located::Group(group));
        }
        self.file
            .variable(trimmed)
            .map(Located::Variable)
            .ok_or_else(|| StrataError::not_found(path))
    }

    fn attribute_value(&self, owner_path: &str, name: &str) -> Result<AttributeValue> {
        let value = match self.locate(owner_path)? {
            Located::Root => self.file.attribute(name).map(|a| a.value()),
            Located::Group(group) => group.attribute(name).map(|a| a.value()),
            Located::Variable(var) => var.attribute(name).map(|a| a.value()),
        };
        let value = value.ok_or_else(|| StrataError::not_found(join_path(owner_path, name)))?;
        value.map_err(|e| StrataError::resolve(join_path(owner_path, name), e))
    }
}

impl ContainerHandle for NetcdfHandle {
    fn iterate_children(&self, group_path: &str) -> Result<Vec<ChildLink>> {
        let (groups, variables): (Vec<String>, Vec<String>) = match self.locate(group_path)? {
            Located::Root => {
                // Classic-format files have no group support at all.
                let groups = match self.file.groups() {
                    Ok(groups) => groups.map(|g| g.name().to_string()).collect(),
                    Err(_) => Vec::new(),
                };
                let variables = self.file.variables().map(|v| v.name().to_string()).collect();
                (groups, variables)
            },
            Located::Group(group) => (
                group.groups().map(|g| g.name().to_string()).collect(),
                group.variables().map(|v| v.name().to_string()).collect(),
            ),
            Located::Variable(_) => {
                return Err(StrataError::resolve(group_path, "not a group"));
            },
        };

        let mut children: Vec<ChildLink> = groups
            .into_iter()
            .map(|name| (name, ObjectKind::Group))
            .chain(variables.into_iter().map(|name| (name, ObjectKind::Dataset)))
            .map(|(name, kind)| ChildLink {
                address: path_address(&join_path(group_path, &name)),
                name,
                kind,
                reference_count: 1,
            })
            .collect();
        children.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(children)
    }

    fn object_info(&self, path: &str) -> Result<ObjectInfo> {
        let (kind, attribute_count) = match self.locate(path)? {
            Located::Root => (ObjectKind::Group, self.file.attributes().count()),
            Located::Group(group) => (ObjectKind::Group, group.attributes().count()),
            Located::Variable(var) => (ObjectKind::Dataset, var.attributes().count()),
        };
        Ok(ObjectInfo {
            kind,
            address: path_address(path),
            reference_count: 1,
            attribute_count,
        })
    }

    fn dataset_shape_type(&self, path: &str) -> Result<ObjectShape> {
        let Located::Variable(var) = self.locate(path)? else {
            return Err(StrataError::resolve(path, "not a variable"));
        };
        let dims = var.dimensions().iter().map(|d| d.len()).collect();
        Ok(ObjectShape::new(dims, variable_element_type(&var.vartype())))
    }

    fn read_dataset(&self, path: &str) -> Result<Vec<u8>> {
        let Located::Variable(var) = self.locate(path)? else {
            return Err(StrataError::read(path, "not a variable"));
        };

        macro_rules! read_as {
            ($t:ty) => {{
                let values: Vec<$t> = var
                    .get_values(..)
                    .map_err(|e| StrataError::read(path, e))?;
                Ok(encode_native(&values))
            }};
        }

        match var.vartype() {
            NcVariableType::Int(IntType::I8) => read_as!(i8),
            NcVariableType::Int(IntType::U8) => read_as!(u8),
            NcVariableType::Int(IntType::I16) => read_as!(i16),
            NcVariableType::Int(IntType::U16) => read_as!(u16),
            NcVariableType::Int(IntType::I32) => read_as!(i32),
            NcVariableType::Int(IntType::U32) => read_as!(u32),
            NcVariableType::Int(IntType::I64) => read_as!(i64),
            NcVariableType::Int(IntType::U64) => read_as!(u64),
            NcVariableType::Float(FloatType::F32) => read_as!(f32),
            NcVariableType::Float(FloatType::F64) => read_as!(f64),
            other => Err(StrataError::read(
                path,
                format!("bulk read of {:?} data is not supported", other),
            )),
        }
    }

    fn attribute_names(&self, owner_path: &str) -> Result<Vec<String>> {
        let names = match self.locate(owner_path)? {
            Located::Root => self
                .file
                .attributes()
                .map(|a| a.name().to_string())
                .collect(),
            Located::Group(group) => group
                .attributes()
                .map(|a| a.name().to_string())
                .collect(),
            Located::Variable(var) => var
                .attributes()
                .map(|a| a.name().to_string())
                .collect(),
        };
        Ok(names)
    }

    fn attribute_shape_type(&self, owner_path: &str, name: &str) -> Result<ObjectShape> {
        let (shape, _) = attribute_payload(self.attribute_value(owner_path, name)?);
        Ok(shape)
    }

    fn read_attribute(&self, owner_path: &str, name: &str) -> Result<Vec<u8>> {
        let value = self
            .attribute_value(owner_path, name)
            .map_err(|e| StrataError::read(join_path(owner_path, name), e))?;
        let (_, bytes) = attribute_payload(value);
        Ok(bytes)
    }
}

/// Stable per-file address for an object path.
fn path_address(path: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    let normalized = if path.is_empty() { "/" } else { path };
    normalized.hash(&mut hasher);
    hasher.finish()
}

fn variable_element_type(vartype: &NcVariableType) -> ElementType {
    match vartype {
        NcVariableType::Int(IntType::I8) => ElementType::signed(1),
        NcVariableType::Int(IntType::U8) => ElementType::unsigned(1),
        NcVariableType::Int(IntType::I16) => ElementType::signed(2),
        NcVariableType::Int(IntType::U16) => ElementType::unsigned(2),
        NcVariableType::Int(IntType::I32) => ElementType::signed(4),
        NcVariableType::Int(IntType::U32) => ElementType::unsigned(4),
        NcVariableType::Int(IntType::I64) => ElementType::signed(8),
        NcVariableType::Int(IntType::U64) => ElementType::unsigned(8),
        NcVariableType::Float(FloatType::F32) => ElementType::float(4),
        NcVariableType::Float(FloatType::F64) => ElementType::float(8),
        NcVariableType::Char => ElementType::of_class(DatatypeClass::String, 1),
        NcVariableType::String => {
            ElementType::of_class(DatatypeClass::String, std::mem::size_of::<usize>())
        },
        NcVariableType::Compound(_) => {
            ElementType::of_class(DatatypeClass::Compound, vartype.size())
        },
        NcVariableType::Enum(_) => ElementType::of_class(DatatypeClass::Enum, vartype.size()),
        NcVariableType::Opaque(_) => ElementType::of_class(DatatypeClass::Opaque, vartype.size()),
        NcVariableType::Vlen(_) => {
            ElementType::of_class(DatatypeClass::VariableLength, vartype.size())
        },
    }
}

/// Shape and native bytes of an attribute value.
fn attribute_payload(value: AttributeValue) -> (ObjectShape, Vec<u8>) {
    fn one<T: crate::data::NativeElement>(v: T) -> (ObjectShape, Vec<u8>) {
        (ObjectShape::of::<T>(Vec::new()), encode_native(&[v]))
    }
    fn many<T: crate::data::NativeElement>(v: Vec<T>) -> (ObjectShape, Vec<u8>) {
        (ObjectShape::of::<T>(vec![v.len()]), encode_native(&v))
    }

    match value {
        AttributeValue::Uchar(v) => one(v),
        AttributeValue::Schar(v) => one(v),
        AttributeValue::Ushort(v) => one(v),
        AttributeValue::Short(v) => one(v),
        AttributeValue::Uint(v) => one(v),
        AttributeValue::Int(v) => one(v),
        AttributeValue::Ulonglong(v) => one(v),
        AttributeValue::Longlong(v) => one(v),
        AttributeValue::Float(v) => one(v),
        AttributeValue::Double(v) => one(v),
        AttributeValue::Uchars(v) => many(v),
        AttributeValue::Schars(v) => many(v),
        AttributeValue::Ushorts(v) => many(v),
        AttributeValue::Shorts(v) => many(v),
        AttributeValue::Uints(v) => many(v),
        AttributeValue::Ints(v) => many(v),
        AttributeValue::Ulonglongs(v) => many(v),
        AttributeValue::Longlongs(v) => many(v),
        AttributeValue::Floats(v) => many(v),
        AttributeValue::Doubles(v) => many(v),
        AttributeValue::Str(s) => {
            let datatype = ElementType::of_class(DatatypeClass::String, s.len());
            (ObjectShape::scalar(datatype), s.into_bytes())
        },
        AttributeValue::Strs(strings) => {
            // Stored as fixed-width, zero-padded strings.
            let width = strings.iter().map(String::len).max().unwrap_or(0);
            let mut bytes = Vec::with_capacity(width * strings.len());
            for s in &strings {
                bytes.extend_from_slice(s.as_bytes());
                bytes.resize(bytes.len() + width - s.len(), 0);
            }
            let datatype = ElementType::of_class(DatatypeClass::String, width);
            (ObjectShape::new(vec![strings.len()], datatype), bytes)
        },
    }
}
