//! Cell decoding.
//!
//! Reinterprets one element of a raw native-endian buffer according to its
//! [`ElementType`]. Only integers and floats decode to values.

use crate::data::{DatatypeClass, ElementType, Sign};
use std::fmt;

/// Text shown for elements of a class that is not decoded.
pub const UNSUPPORTED_MARKER: &str = "unsupported";

/// Decoded value of one cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellValue {
    /// Signed integer of any width.
    Signed(i64),
    /// Unsigned integer of any width.
    Unsigned(u64),
    /// Float of any width, widened.
    Float(f64),
    /// The element's class (or width) is not decoded.
    Unsupported(DatatypeClass),
    /// No data: buffer not loaded or coordinate outside the grid.
    Empty,
}

impl CellValue {
    /// Whether this is the unsupported marker.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, CellValue::Unsupported(_))
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Signed(v) => write!(f, "{}", v),
            CellValue::Unsigned(v) => write!(f, "{}", v),
            CellValue::Float(v) => f.write_str(&format_general(*v)),
            CellValue::Unsupported(_) => f.write_str(UNSUPPORTED_MARKER),
            CellValue::Empty => Ok(()),
        }
    }
}

/// Decode element `index` of `buffer`.
pub fn decode_cell(buffer: &[u8], index: usize, datatype: &ElementType) -> CellValue {
    match datatype.class {
        DatatypeClass::Integer | DatatypeClass::Float => {},
        DatatypeClass::String
        | DatatypeClass::Compound
        | DatatypeClass::Enum
        | DatatypeClass::Array
        | DatatypeClass::VariableLength
        | DatatypeClass::Time
        | DatatypeClass::Bitfield
        | DatatypeClass::Opaque
        | DatatypeClass::Reference
        | DatatypeClass::Unknown => return CellValue::Unsupported(datatype.class),
    }

    let size = datatype.size;
    if !matches!(size, 1 | 2 | 4 | 8) {
        return CellValue::Unsupported(datatype.class);
    }
    let Some(bytes) = index
        .checked_mul(size)
        .and_then(|start| buffer.get(start..start.checked_add(size)?))
    else {
        return CellValue::Empty;
    };

    let value = match (datatype.class, datatype.sign) {
        (DatatypeClass::Float, _) => decode_float(bytes),
        (_, Sign::Unsigned) => decode_unsigned(bytes),
        _ => decode_signed(bytes),
    };
    value.unwrap_or(CellValue::Unsupported(datatype.class))
}

fn decode_signed(bytes: &[u8]) -> Option<CellValue> {
    let value = match bytes.len() {
        1 => i8::from_ne_bytes(bytes.try_into().ok()?) as i64,
        2 => i16::from_ne_bytes(bytes.try_into().ok()?) as i64,
        4 => i32::from_ne_bytes(bytes.try_into().ok()?) as i64,
        8 => i64::from_ne_bytes(bytes.try_into().ok()?),
        _ => return None,
    };
    Some(CellValue::Signed(value))
}

fn decode_unsigned(bytes: &[u8]) -> Option<CellValue> {
    let value = match bytes.len() {
        1 => bytes[0] as u64,
        2 => u16::from_ne_bytes(bytes.try_into().ok()?) as u64,
        4 => u32::from_ne_bytes(bytes.try_into().ok()?) as u64,
        8 => u64::from_ne_bytes(bytes.try_into().ok()?),
        _ => return None,
    };
    Some(CellValue::Unsigned(value))
}

fn decode_float(bytes: &[u8]) -> Option<CellValue> {
    let value = match bytes.len() {
        4 => f32::from_ne_bytes(bytes.try_into().ok()?) as f64,
        8 => f64::from_ne_bytes(bytes.try_into().ok()?),
        _ => return None,
    };
    Some(CellValue::Float(value))
}

/// Format like C's `%g`: six significant digits, trailing zeros dropped,
/// exponent form when the exponent is below -4 or at least 6.
pub fn format_general(value: f64) -> String {
    const PRECISION: i32 = 6;

    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value < 0.0 { "-inf" } else { "inf" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    // Rounding to the target precision can carry into the next decade, so the
    // exponent is taken from the rounded scientific form.
    let scientific = format!("{:.*e}", (PRECISION - 1) as usize, value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if exponent < -4 || exponent >= PRECISION {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{}{:02}",
            trim_fraction(mantissa),
            sign,
            exponent.unsigned_abs()
        )
    } else {
        let decimals = (PRECISION - 1 - exponent) as usize;
        trim_fraction(&format!("{:.*}", decimals, value)).to_string()
    }
}

fn trim_fraction(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{encode_native, NativeElement};

    fn first<T: NativeElement>(value: T) -> String {
        decode_cell(&encode_native(&[value]), 0, &T::ELEMENT_TYPE).to_string()
    }

    #[test]
    fn test_signed_widths() {
        assert_eq!(first(i8::MIN), "-128");
        assert_eq!(first(-2i8), "-2");
        assert_eq!(first(i16::MIN), "-32768");
        assert_eq!(first(i32::MAX), "2147483647");
        assert_eq!(first(-1i32), "-1");
        assert_eq!(first(i64::MIN), "-9223372036854775808");
    }

    #[test]
    fn test_unsigned_widths() {
        assert_eq!(first(u8::MAX), "255");
        assert_eq!(first(u16::MAX), "65535");
        assert_eq!(first(u32::MAX), "4294967295");
        assert_eq!(first(u64::MAX), "18446744073709551615");
    }

    #[test]
    fn test_unsigned_bytes_not_sign_extended() {
        let buffer = [0xffu8, 0xff, 0xff, 0xff];
        assert_eq!(
            decode_cell(&buffer, 0, &ElementType::unsigned(4)),
            CellValue::Unsigned(u32::MAX as u64)
        );
        assert_eq!(
            decode_cell(&buffer, 0, &ElementType::signed(4)),
            CellValue::Signed(-1)
        );
    }

    #[test]
    fn test_index_selects_element() {
        let buffer = encode_native(&[10u16, 20, 30]);
        let datatype = ElementType::unsigned(2);
        assert_eq!(decode_cell(&buffer, 2, &datatype), CellValue::Unsigned(30));
        assert_eq!(decode_cell(&buffer, 3, &datatype), CellValue::Empty);
        assert_eq!(decode_cell(&buffer, usize::MAX, &datatype), CellValue::Empty);
    }

    #[test]
    fn test_non_numeric_classes_are_unsupported() {
        let buffer = [1u8, 2, 3, 4];
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
            let value = decode_cell(&buffer, 0, &ElementType::of_class(class, 4));
            assert_eq!(value, CellValue::Unsupported(class));
            assert_eq!(value.to_string(), UNSUPPORTED_MARKER);
        }
    }

    #[test]
    fn test_odd_widths_are_unsupported() {
        let buffer = [0u8; 16];
        assert!(decode_cell(&buffer, 0, &ElementType::signed(3)).is_unsupported());
        assert!(decode_cell(&buffer, 0, &ElementType::float(2)).is_unsupported());
        assert!(decode_cell(&buffer, 0, &ElementType::float(16)).is_unsupported());
    }

    #[test]
    fn test_floats() {
        assert_eq!(first(1.5f64), "1.5");
        assert_eq!(first(0.1f32), "0.1");
        assert_eq!(first(-2.0f32), "-2");
        assert_eq!(first(f64::NAN), "nan");
    }

    #[test]
    fn test_format_general() {
        assert_eq!(format_general(0.0), "0");
        assert_eq!(format_general(100.0), "100");
        assert_eq!(format_general(123456.0), "123456");
        assert_eq!(format_general(1234567.0), "1.23457e+06");
        assert_eq!(format_general(999999.5), "1e+06");
        assert_eq!(format_general(0.0001), "0.0001");
        assert_eq!(format_general(0.00001), "1e-05");
        assert_eq!(format_general(3.14159265), "3.14159");
        assert_eq!(format_general(-1.25e-10), "-1.25e-10");
        assert_eq!(format_general(1e100), "1e+100");
        assert_eq!(format_general(f64::NEG_INFINITY), "-inf");
    }

    #[test]
    fn test_empty_displays_nothing() {
        assert_eq!(CellValue::Empty.to_string(), "");
    }
}
