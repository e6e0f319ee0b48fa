/// Implementation of `interop dump`.
///
/// Decodes the loaded memory item by item according to `--layout` and
/// prints one line per item. Decoding stops at the first item that does not
/// fit; the items before it are still printed.
///
/// # Text output
///
/// ```text
/// 0x0000  bool    true
/// 0x0001  i32     42
/// 0x0005  pad[3]
/// ```
///
/// # JSON output (`--json`)
///
/// ```json
/// [
///   { "offset": 0, "type": "bool", "value": true },
///   { "offset": 1, "type": "f32", "value": 1.5, "bits": "0x3fc00000" }
/// ]
/// ```
use anyhow::{Context, Result};
use interop_stream::{InputStream, InteropMemory};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::DumpArgs;
use crate::layout::{DecodedField, FieldSpec, FieldType, Layout, decode_field};

/// One JSON record per layout item.
#[derive(Serialize)]
struct FieldRecord {
    offset: usize,
    #[serde(rename = "type")]
    ty: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bits: Option<Value>,
}

impl From<&DecodedField> for FieldRecord {
    fn from(field: &DecodedField) -> Self {
        let (value, bits) = match (field.spec.count, field.values.as_slice()) {
            (None, [single]) => (
                Some(single.to_json()),
                single.float_bits().map(Value::String),
            ),
            (Some(_), values) if !values.is_empty() => {
                let bits: Option<Vec<Value>> = values
                    .iter()
                    .map(|v| v.float_bits().map(Value::String))
                    .collect();
                (
                    Some(Value::Array(values.iter().map(|v| v.to_json()).collect())),
                    bits.map(Value::Array),
                )
            }
            // Padding carries no value; a zero-length array decodes to [].
            (Some(_), _) if field.spec.ty != FieldType::Pad => {
                (Some(Value::Array(Vec::new())), None)
            }
            _ => (None, None),
        };

        Self {
            offset: field.offset,
            ty: field.spec.to_string(),
            value,
            bits,
        }
    }
}

/// Run the `interop dump` command.
///
/// # Errors
///
/// Returns an error if the source cannot be loaded, the layout does not
/// parse, the start offset or length cap is out of range, or an item runs
/// past the end of the stream.
pub fn run(args: &DumpArgs) -> Result<()> {
    let layout: Layout = args.layout.parse().context("invalid --layout")?;
    let mem = args.source.load()?;

    let mut stream = match args.len {
        Some(len) => InputStream::with_len(&mem, len).context("invalid --len")?,
        None => InputStream::new(&mem),
    };
    if let Some(offset) = args.offset {
        stream
            .set_position(offset)
            .context("invalid --offset")?;
    }
    debug!(len = stream.len(), pos = stream.position(), items = layout.fields.len(), "dumping");

    let (decoded, failure) = decode_layout(&layout, &mut stream);

    if args.json {
        let records: Vec<FieldRecord> = decoded.iter().map(FieldRecord::from).collect();
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        for field in &decoded {
            println!("{}", text_line(field));
        }
    }

    match failure {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Decode items until the first one that does not fit.
///
/// Returns the items decoded so far and, if decoding stopped early, the
/// error for the failing item.
fn decode_layout<M: InteropMemory + ?Sized>(
    layout: &Layout,
    stream: &mut InputStream<'_, M>,
) -> (Vec<DecodedField>, Option<anyhow::Error>) {
    let mut decoded = Vec::with_capacity(layout.fields.len());
    for (idx, spec) in layout.fields.iter().enumerate() {
        match decode_field(*spec, stream) {
            Ok(field) => decoded.push(field),
            Err(e) => {
                let at = stream.position();
                let err =
                    anyhow::Error::new(e).context(format!("item {idx} ({spec}) at offset {at}"));
                return (decoded, Some(err));
            }
        }
    }
    (decoded, None)
}

fn text_line(field: &DecodedField) -> String {
    let label = field.spec.to_string();
    let values: Vec<String> = field.values.iter().map(ToString::to_string).collect();
    let rendered = match field.spec {
        FieldSpec { count: None, .. } => values.join(""),
        _ if values.is_empty() => String::new(),
        _ => format!("[{}]", values.join(", ")),
    };
    format!("{:#06x}  {label:<8}{rendered}", field.offset)
        .trim_end()
        .to_string()
}
