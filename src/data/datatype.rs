//! Portable datatype descriptors.
//!
//! Every dataset and attribute is reduced to an [`ElementType`]: the byte size
//! of one native element, its signedness and its class. Decoding only ever
//! looks at this triple, never at the on-disk encoding.

use std::fmt;

/// Highest rank the container format can describe.
pub const MAX_SUPPORTED_RANK: usize = 32;

/// Class of a scalar datatype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatatypeClass {
    /// Fixed-width integer.
    Integer,
    /// IEEE floating point.
    Float,
    /// Fixed or variable-length string, or character data.
    String,
    /// Record of named members.
    Compound,
    /// Named integer constants.
    Enum,
    /// Fixed-size array element.
    Array,
    /// Variable-length sequence.
    VariableLength,
    /// Date/time.
    Time,
    /// Packed bits.
    Bitfield,
    /// Uninterpreted bytes.
    Opaque,
    /// Object or region reference.
    Reference,
    /// Could not be resolved.
    Unknown,
}

impl DatatypeClass {
    /// Whether values of this class can be shown in a grid.
    pub fn is_numeric(self) -> bool {
        matches!(self, DatatypeClass::Integer | DatatypeClass::Float)
    }

    /// Short lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            DatatypeClass::Integer => "integer",
            DatatypeClass::Float => "float",
            DatatypeClass::String => "string",
            DatatypeClass::Compound => "compound",
            DatatypeClass::Enum => "enum",
            DatatypeClass::Array => "array",
            DatatypeClass::VariableLength => "vlen",
            DatatypeClass::Time => "time",
            DatatypeClass::Bitfield => "bitfield",
            DatatypeClass::Opaque => "opaque",
            DatatypeClass::Reference => "reference",
            DatatypeClass::Unknown => "unknown",
        }
    }
}

impl fmt::Display for DatatypeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Signedness of an integer type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Sign {
    /// Two's complement signed.
    Signed,
    /// Unsigned.
    Unsigned,
    /// Not an integer type.
    #[default]
    NotApplicable,
}

/// Native in-memory representation of one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementType {
    /// Size in bytes of one element.
    pub size: usize,
    /// Signedness (integers only).
    pub sign: Sign,
    /// Datatype class.
    pub class: DatatypeClass,
}

impl ElementType {
    /// Signed integer of `size` bytes.
    pub fn signed(size: usize) -> Self {
        Self {
            size,
            sign: Sign::Signed,
            class: DatatypeClass::Integer,
        }
    }

    /// Unsigned integer of `size` bytes.
    pub fn unsigned(size: usize) -> Self {
        Self {
            size,
            sign: Sign::Unsigned,
            class: DatatypeClass::Integer,
        }
    }

    /// Floating point of `size` bytes.
    pub fn float(size: usize) -> Self {
        Self {
            size,
            sign: Sign::NotApplicable,
            class: DatatypeClass::Float,
        }
    }

    /// Any non-integer class.
    pub fn of_class(class: DatatypeClass, size: usize) -> Self {
        Self {
            size,
            sign: Sign::NotApplicable,
            class,
        }
    }

    /// Placeholder for objects whose type could not be resolved.
    pub fn unknown() -> Self {
        Self::of_class(DatatypeClass::Unknown, 0)
    }

    /// Human readable label, e.g. `int32`, `uint8`, `float64`, `compound`.
    pub fn label(&self) -> String {
        let bits = self.size * 8;
        match (self.class, self.sign) {
            (DatatypeClass::Integer, Sign::Unsigned) => format!("uint{}", bits),
            (DatatypeClass::Integer, _) => format!("int{}", bits),
            (DatatypeClass::Float, _) => format!("float{}", bits),
            (class, _) => class.name().to_string(),
        }
    }
}

/// Shape and element type of one dataset or attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectShape {
    /// Extents, outermost first. Empty for a scalar.
    pub dims: Vec<usize>,
    /// Element type.
    pub datatype: ElementType,
}

impl ObjectShape {
    /// Create a shape.
    pub fn new(dims: Vec<usize>, datatype: ElementType) -> Self {
        Self { dims, datatype }
    }

    /// Scalar shape.
    pub fn scalar(datatype: ElementType) -> Self {
        Self::new(Vec::new(), datatype)
    }

    /// Shape with the element type of `T`.
    pub fn of<T: NativeElement>(dims: Vec<usize>) -> Self {
        Self::new(dims, T::ELEMENT_TYPE)
    }

    /// Number of elements; 1 for a scalar. `None` on overflow.
    pub fn element_count(&self) -> Option<usize> {
        element_count(&self.dims)
    }

    /// Number of bytes a full read occupies. `None` on overflow.
    pub fn byte_len(&self) -> Option<usize> {
        self.element_count()?.checked_mul(self.datatype.size)
    }
}

/// Product of `dims`, 1 for an empty slice. `None` on overflow.
pub fn element_count(dims: &[usize]) -> Option<usize> {
    dims.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d))
}

/// Rust scalar types with a fixed native element representation.
pub trait NativeElement: Copy {
    /// Element type of `Self`.
    const ELEMENT_TYPE: ElementType;

    /// Append the native-endian bytes of `self`.
    fn append_ne_bytes(self, out: &mut Vec<u8>);
}

macro_rules! native_element {
    ($($t:ty => $class:ident, $sign:ident;)*) => {
        $(
            impl NativeElement for $t {
                const ELEMENT_TYPE: ElementType = ElementType {
                    size: std::mem::size_of::<$t>(),
                    sign: Sign::$sign,
                    class: DatatypeClass::$class,
                };

                fn append_ne_bytes(self, out: &mut Vec<u8>) {
                    out.extend_from_slice(&self.to_ne_bytes());
                }
            }
        )*
    };
}

native_element! {
    i8 => Integer, Signed;
    i16 => Integer, Signed;
    i32 => Integer, Signed;
    i64 => Integer, Signed;
    u8 => Integer, Unsigned;
    u16 => Integer, Unsigned;
    u32 => Integer, Unsigned;
    u64 => Integer, Unsigned;
    f32 => Float, NotApplicable;
    f64 => Float, NotApplicable;
}

/// Encode a slice of values as one contiguous native-endian buffer.
pub fn encode_native<T: NativeElement>(values: &[T]) -> Vec<u8> {
    let mut out = Vec::with_capacity(values.len() * T::ELEMENT_TYPE.size);
    for &v in values {
        v.append_ne_bytes(&mut out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_count() {
        assert_eq!(element_count(&[]), Some(1));
        assert_eq!(element_count(&[3, 4]), Some(12));
        assert_eq!(element_count(&[3, 0, 4]), Some(0));
        assert_eq!(element_count(&[usize::MAX, 2]), None);
    }

    #[test]
    fn test_labels() {
        assert_eq!(ElementType::signed(4).label(), "int32");
        assert_eq!(ElementType::unsigned(1).label(), "uint8");
        assert_eq!(ElementType::float(8).label(), "float64");
        assert_eq!(
            ElementType::of_class(DatatypeClass::Compound, 12).label(),
            "compound"
        );
    }

    #[test]
    fn test_only_integer_and_float_are_numeric() {
        assert!(DatatypeClass::Integer.is_numeric());
        assert!(DatatypeClass::Float.is_numeric());
        for class in [
            DatatypeClass::String,
            DatatypeClass::Compound,
            DatatypeClass::Enum,
            DatatypeClass::Array,
            DatatypeClass::VariableLength,
            DatatypeClass::Time,
            DatatypeClass::Bitfield,
            DatatypeClass::Opaque,
            DatatypeClass::Reference,
            DatatypeClass::Unknown,
        ] {
            assert!(!class.is_numeric(), "{} should not be numeric", class);
        }
    }

    #[test]
    fn test_native_element_types() {
        assert_eq!(i16::ELEMENT_TYPE, ElementType::signed(2));
        assert_eq!(u64::ELEMENT_TYPE, ElementType::unsigned(8));
        assert_eq!(f32::ELEMENT_TYPE, ElementType::float(4));
        assert_eq!(encode_native(&[1u16, 2]).len(), 4);
        assert_eq!(encode_native(&[-1i8]), vec![0xff]);
    }

    #[test]
    fn test_byte_len() {
        let shape = ObjectShape::new(vec![3, 4], ElementType::signed(4));
        assert_eq!(shape.byte_len(), Some(48));
        assert_eq!(ObjectShape::scalar(ElementType::float(8)).byte_len(), Some(8));
    }
}
