/// Field layouts for `interop dump`.
///
/// A layout is a comma-separated list of items. Each item is a scalar type,
/// optionally followed by an element count in brackets, or `pad[N]` to skip
/// `N` bytes:
///
/// ```text
/// bool, i32, f64[3], pad[2], u16
/// ```
///
/// ```text
/// ┌───────┬───────┬───────────────────────────────────────────┐
/// │ Type  │ Width │ Stream call                               │
/// ├───────┼───────┼───────────────────────────────────────────┤
/// │ i8    │ 1     │ read_i8      / read_i8_array              │
/// │ bool  │ 1     │ read_bool    / read_bool_array            │
/// │ i16   │ 2     │ read_i16     / read_i16_array             │
/// │ u16   │ 2     │ read_u16     / read_u16_array             │
/// │ i32   │ 4     │ read_i32     / read_i32_array             │
/// │ i64   │ 8     │ read_i64     / read_i64_array             │
/// │ f32   │ 4     │ read_f32     / read_f32_array             │
/// │ f64   │ 8     │ read_f64     / read_f64_array             │
/// │ pad   │ 1     │ skip                                      │
/// └───────┴───────┴───────────────────────────────────────────┘
/// ```
use std::fmt;
use std::str::FromStr;

use interop_stream::{InputStream, InteropMemory, StreamError};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("layout is empty")]
    Empty,

    #[error("unknown field type {name:?} in item {item}")]
    UnknownType { item: usize, name: String },

    #[error("invalid element count {count:?} in item {item}")]
    InvalidCount { item: usize, count: String },

    #[error("item {item}: pad needs a byte count, e.g. pad[4]")]
    PadWithoutCount { item: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldType {
    I8,
    Bool,
    I16,
    U16,
    I32,
    I64,
    F32,
    F64,
    Pad,
}

impl FieldType {
    fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "i8" => Self::I8,
            "bool" => Self::Bool,
            "i16" => Self::I16,
            "u16" => Self::U16,
            "i32" => Self::I32,
            "i64" => Self::I64,
            "f32" => Self::F32,
            "f64" => Self::F64,
            "pad" => Self::Pad,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::I8 => "i8",
            Self::Bool => "bool",
            Self::I16 => "i16",
            Self::U16 => "u16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Pad => "pad",
        }
    }

    /// Width of one element in bytes.
    pub fn width(self) -> usize {
        match self {
            Self::I8 | Self::Bool | Self::Pad => 1,
            Self::I16 | Self::U16 => 2,
            Self::I32 | Self::F32 => 4,
            Self::I64 | Self::F64 => 8,
        }
    }
}

/// One layout item. `count` is `None` for a scalar, `Some(n)` for an array.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    pub ty: FieldType,
    pub count: Option<usize>,
}

impl fmt::Display for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.count {
            Some(n) => write!(f, "{}[{n}]", self.ty.name()),
            None => f.write_str(self.ty.name()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layout {
    pub fields: Vec<FieldSpec>,
}

impl FromStr for Layout {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        if compact.is_empty() {
            return Err(LayoutError::Empty);
        }

        let mut fields = Vec::new();
        for (item, raw) in compact.split(',').enumerate() {
            let (name, count) = match raw.split_once('[') {
                Some((name, rest)) => {
                    let digits = rest.strip_suffix(']').ok_or_else(|| LayoutError::InvalidCount {
                        item,
                        count: rest.to_string(),
                    })?;
                    let count = digits.parse::<usize>().map_err(|_| LayoutError::InvalidCount {
                        item,
                        count: digits.to_string(),
                    })?;
                    (name, Some(count))
                }
                None => (raw, None),
            };

            let ty = FieldType::parse(name).ok_or_else(|| LayoutError::UnknownType {
                item,
                name: name.to_string(),
            })?;
            if ty == FieldType::Pad && count.is_none() {
                return Err(LayoutError::PadWithoutCount { item });
            }

            fields.push(FieldSpec { ty, count });
        }

        Ok(Self { fields })
    }
}

/// A decoded scalar.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Scalar {
    Int(i64),
    Bool(bool),
    F32(f32),
    F64(f64),
}

impl Scalar {
    /// Raw bit pattern of a float, as hex. `None` for other scalars.
    pub fn float_bits(self) -> Option<String> {
        match self {
            Self::F32(v) => Some(format!("{:#010x}", v.to_bits())),
            Self::F64(v) => Some(format!("{:#018x}", v.to_bits())),
            Self::Int(_) | Self::Bool(_) => None,
        }
    }

    pub fn to_json(self) -> serde_json::Value {
        match self {
            Self::Int(v) => v.into(),
            Self::Bool(v) => v.into(),
            // NaN and infinities become null.
            Self::F32(v) => f64::from(v).into(),
            Self::F64(v) => v.into(),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::F32(v) => write!(f, "{v:?}"),
            Self::F64(v) => write!(f, "{v:?}"),
        }
    }
}

/// The result of decoding one layout item.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedField {
    pub offset: usize,
    pub spec: FieldSpec,
    /// Empty for `pad`.
    pub values: Vec<Scalar>,
}

/// Decode one layout item at the stream's position.
///
/// # Errors
///
/// Returns the stream's error if the item does not fit in the remaining
/// bytes. The stream position is unchanged in that case.
pub fn decode_field<M: InteropMemory + ?Sized>(
    spec: FieldSpec,
    stream: &mut InputStream<'_, M>,
) -> Result<DecodedField, StreamError> {
    let offset = stream.position();

    let values = match spec.count {
        None => vec![decode_scalar(spec.ty, stream)?],
        Some(count) => decode_array(spec.ty, count, stream)?,
    };

    Ok(DecodedField {
        offset,
        spec,
        values,
    })
}

fn decode_scalar<M: InteropMemory + ?Sized>(
    ty: FieldType,
    stream: &mut InputStream<'_, M>,
) -> Result<Scalar, StreamError> {
    Ok(match ty {
        FieldType::I8 => Scalar::Int(stream.read_i8()?.into()),
        FieldType::Bool => Scalar::Bool(stream.read_bool()?),
        FieldType::I16 => Scalar::Int(stream.read_i16()?.into()),
        FieldType::U16 => Scalar::Int(stream.read_u16()?.into()),
        FieldType::I32 => Scalar::Int(stream.read_i32()?.into()),
        FieldType::I64 => Scalar::Int(stream.read_i64()?),
        FieldType::F32 => Scalar::F32(stream.read_f32()?),
        FieldType::F64 => Scalar::F64(stream.read_f64()?),
        // The parser never yields a scalar pad.
        FieldType::Pad => {
            stream.skip(1)?;
            return Ok(Scalar::Int(0));
        }
    })
}

fn decode_array<M: InteropMemory + ?Sized>(
    ty: FieldType,
    count: usize,
    stream: &mut InputStream<'_, M>,
) -> Result<Vec<Scalar>, StreamError> {
    let span = count.saturating_mul(ty.width());
    if span > stream.remaining() {
        // Let the stream report the shortfall before allocating for it.
        stream.read_slice(span)?;
    }

    Ok(match ty {
        FieldType::Pad => {
            stream.skip(count)?;
            Vec::new()
        }
        FieldType::I8 => {
            let mut out = vec![0i8; count];
            stream.read_i8_array(&mut out)?;
            out.into_iter().map(|v| Scalar::Int(v.into())).collect()
        }
        FieldType::Bool => {
            let mut out = vec![false; count];
            stream.read_bool_array(&mut out)?;
            out.into_iter().map(Scalar::Bool).collect()
        }
        FieldType::I16 => {
            let mut out = vec![0i16; count];
            stream.read_i16_array(&mut out)?;
            out.into_iter().map(|v| Scalar::Int(v.into())).collect()
        }
        FieldType::U16 => {
            let mut out = vec![0u16; count];
            stream.read_u16_array(&mut out)?;
            out.into_iter().map(|v| Scalar::Int(v.into())).collect()
        }
        FieldType::I32 => {
            let mut out = vec![0i32; count];
            stream.read_i32_array(&mut out)?;
            out.into_iter().map(|v| Scalar::Int(v.into())).collect()
        }
        FieldType::I64 => {
            let mut out = vec![0i64; count];
            stream.read_i64_array(&mut out)?;
            out.into_iter().map(Scalar::Int).collect()
        }
        FieldType::F32 => {
            let mut out = vec![0f32; count];
            stream.read_f32_array(&mut out)?;
            out.into_iter().map(Scalar::F32).collect()
        }
        FieldType::F64 => {
            let mut out = vec![0f64; count];
            stream.read_f64_array(&mut out)?;
            out.into_iter().map(Scalar::F64).collect()
        }
    })
}
