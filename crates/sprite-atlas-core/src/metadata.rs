//! `TextureAtlas` / `SubTexture` XML metadata.
//!
//! ```xml
//! <?xml version='1.0' encoding='utf-8'?>
//! <!-- Created with sprite-atlas -->
//! <TextureAtlas imagePath="hero">
//!     <SubTexture name="idle_0" x="0" y="0" width="31" height="40" frameWidth="48" frameHeight="48" frameX="-9" frameY="-8"/>
//! </TextureAtlas>
//! ```
//!
//! The writer never emits `rotated`; the reader accepts it for atlases made
//! by other tools.

use std::collections::HashMap;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::{AtlasError, Result};
use crate::model::{Atlas, PlacementRecord};

/// Serialize the atlas records as a `TextureAtlas` document.
pub fn to_atlas_xml(atlas: &Atlas, header_comment: Option<&str>) -> String {
    let mut s = String::new();
    s.push_str("<?xml version='1.0' encoding='utf-8'?>\n");
    if let Some(comment) = header_comment {
        s.push_str(&format!("<!-- {} -->\n", comment.replace("--", "- -")));
    }
    s.push_str(&format!(
        "<TextureAtlas imagePath=\"{}\">\n",
        xml_escape(&atlas.name)
    ));
    for r in &atlas.records {
        s.push_str(&format!(
            "    <SubTexture name=\"{}\" x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" frameWidth=\"{}\" frameHeight=\"{}\" frameX=\"{}\" frameY=\"{}\"{}/>\n",
            xml_escape(&r.name),
            r.x,
            r.y,
            r.width,
            r.height,
            r.frame_width,
            r.frame_height,
            r.frame_x,
            r.frame_y,
            if r.rotated { " rotated=\"true\"" } else { "" },
        ));
    }
    s.push_str("</TextureAtlas>\n");
    s
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Parsed metadata document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedAtlas {
    /// `imagePath` of the root element, when present.
    pub image_path: Option<String>,
    /// `SubTexture` entries in document order.
    pub records: Vec<PlacementRecord>,
}

/// Reads and parses a metadata file.
pub fn read_atlas_xml(path: &Path) -> Result<ParsedAtlas> {
    let text = std::fs::read_to_string(path)?;
    parse_atlas_xml(&text).map_err(|e| AtlasError::metadata(format!("{}: {e}", path.display())))
}

/// Parses a metadata document.
///
/// `SubTexture` elements are collected wherever they appear. Optional
/// attributes fall back to `rotated=false`, `frameWidth=width`,
/// `frameHeight=height`, `frameX=frameY=0`.
pub fn parse_atlas_xml(text: &str) -> Result<ParsedAtlas> {
    let mut reader = Reader::from_str(text);
    reader.trim_text(true);
    let mut out = ParsedAtlas::default();
    let mut depth = 0usize;
    let mut saw_element = false;
    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                depth += 1;
                saw_element = true;
                visit_element(&e, &mut out)?;
            }
            Event::Empty(e) => {
                saw_element = true;
                visit_element(&e, &mut out)?;
            }
            Event::End(_) => {
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }
    if !saw_element {
        return Err(AtlasError::metadata("no element found"));
    }
    if depth != 0 {
        return Err(AtlasError::metadata("document ends inside an open element"));
    }
    Ok(out)
}

fn visit_element(e: &BytesStart<'_>, out: &mut ParsedAtlas) -> Result<()> {
    match e.name().as_ref() {
        b"TextureAtlas" => {
            let attrs = collect_attributes(e)?;
            out.image_path = attrs.get("imagePath").cloned();
        }
        b"SubTexture" => {
            let attrs = collect_attributes(e)?;
            out.records.push(record_from_attributes(&attrs)?);
        }
        _ => {}
    }
    Ok(())
}

fn collect_attributes(e: &BytesStart<'_>) -> Result<HashMap<String, String>> {
    let mut map = HashMap::new();
    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        map.insert(key, value);
    }
    Ok(map)
}

fn record_from_attributes(attrs: &HashMap<String, String>) -> Result<PlacementRecord> {
    let name = attrs
        .get("name")
        .cloned()
        .ok_or_else(|| AtlasError::metadata("SubTexture without a name attribute"))?;
    let number = |key: &str| -> Result<Option<i64>> {
        attrs.get(key).map(|raw| parse_number(key, raw)).transpose()
    };
    let unsigned = |key: &str, value: i64| -> Result<u32> {
        u32::try_from(value).map_err(|_| {
            AtlasError::metadata(format!("SubTexture {name:?}: {key}={value} is out of range"))
        })
    };
    let signed = |key: &str, value: i64| -> Result<i32> {
        i32::try_from(value).map_err(|_| {
            AtlasError::metadata(format!("SubTexture {name:?}: {key}={value} is out of range"))
        })
    };

    let x = unsigned("x", number("x")?.unwrap_or(0))?;
    let y = unsigned("y", number("y")?.unwrap_or(0))?;
    let width = unsigned("width", number("width")?.unwrap_or(0))?;
    let height = unsigned("height", number("height")?.unwrap_or(0))?;
    let frame_width = match number("frameWidth")? {
        Some(v) => unsigned("frameWidth", v)?,
        None => width,
    };
    let frame_height = match number("frameHeight")? {
        Some(v) => unsigned("frameHeight", v)?,
        None => height,
    };
    let frame_x = signed("frameX", number("frameX")?.unwrap_or(0))?;
    let frame_y = signed("frameY", number("frameY")?.unwrap_or(0))?;
    let rotated = attrs
        .get("rotated")
        .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"));

    Ok(PlacementRecord {
        name,
        x,
        y,
        width,
        height,
        frame_width,
        frame_height,
        frame_x,
        frame_y,
        rotated,
    })
}

/// Integer attribute; decimal forms like `"12.0"` truncate toward zero.
fn parse_number(key: &str, raw: &str) -> Result<i64> {
    let s = raw.trim();
    if let Ok(v) = s.parse::<i64>() {
        return Ok(v);
    }
    match s.parse::<f64>() {
        Ok(f) if f.is_finite() && f.abs() < i64::MAX as f64 => Ok(f.trunc() as i64),
        _ => Err(AtlasError::metadata(format!(
            "attribute {key}={raw:?} is not a number"
        ))),
    }
}

