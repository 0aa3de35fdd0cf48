use sprite_atlas_core::{Atlas, AtlasError, PlacementRecord, Rect, parse_atlas_xml, to_atlas_xml};

fn record(name: &str, x: u32, y: u32) -> PlacementRecord {
    PlacementRecord {
        name: name.into(),
        x,
        y,
        width: 4,
        height: 5,
        frame_width: 8,
        frame_height: 9,
        frame_x: -2,
        frame_y: -3,
        rotated: false,
    }
}

fn atlas(records: Vec<PlacementRecord>) -> Atlas {
    Atlas {
        name: "hero".into(),
        size: 32,
        placements: records.iter().map(|r| Rect::new(r.x, r.y, r.width, r.height)).collect(),
        records,
    }
}

#[test]
fn writer_layout() {
    let xml = to_atlas_xml(&atlas(vec![record("idle_0", 0, 0)]), Some("Created with sprite-atlas"));
    let expected = "<?xml version='1.0' encoding='utf-8'?>\n\
<!-- Created with sprite-atlas -->\n\
<TextureAtlas imagePath=\"hero\">\n    \
<SubTexture name=\"idle_0\" x=\"0\" y=\"0\" width=\"4\" height=\"5\" frameWidth=\"8\" frameHeight=\"9\" frameX=\"-2\" frameY=\"-3\"/>\n\
</TextureAtlas>\n";
    assert_eq!(xml, expected);
}

#[test]
fn comment_is_optional() {
    let xml = to_atlas_xml(&atlas(vec![]), None);
    assert!(!xml.contains("<!--"));
    let parsed = parse_atlas_xml(&xml).unwrap();
    assert_eq!(parsed.image_path.as_deref(), Some("hero"));
    assert!(parsed.records.is_empty());
}

#[test]
fn written_records_read_back() {
    let records = vec![record("a", 0, 0), record("b & <c>", 14, 0), record("q\"uote", 0, 15)];
    let xml = to_atlas_xml(&atlas(records.clone()), None);
    assert!(xml.contains("name=\"b &amp; &lt;c&gt;\""));
    assert_eq!(parse_atlas_xml(&xml).unwrap().records, records);
}

#[test]
fn optional_attributes_default() {
    let xml = r#"<TextureAtlas imagePath="x.png">
        <SubTexture name="only" x="3" y="4" width="10" height="6"/>
    </TextureAtlas>"#;
    let r = &parse_atlas_xml(xml).unwrap().records[0];
    assert_eq!((r.x, r.y, r.width, r.height), (3, 4, 10, 6));
    assert_eq!((r.frame_width, r.frame_height), (10, 6));
    assert_eq!((r.frame_x, r.frame_y), (0, 0));
    assert!(!r.rotated);
}

#[test]
fn missing_geometry_defaults_to_zero() {
    let r = &parse_atlas_xml(r#"<TextureAtlas><SubTexture name="n"/></TextureAtlas>"#)
        .unwrap()
        .records[0];
    assert_eq!((r.x, r.y, r.width, r.height), (0, 0, 0, 0));
}

#[test]
fn decimal_numbers_truncate() {
    let xml = r#"<TextureAtlas>
        <SubTexture name="f" x="12.0" y="7.9" width="3.5" height="2" frameX="-1.7" rotated="True"/>
    </TextureAtlas>"#;
    let r = &parse_atlas_xml(xml).unwrap().records[0];
    assert_eq!((r.x, r.y, r.width, r.height), (12, 7, 3, 2));
    assert_eq!(r.frame_x, -1);
    assert!(r.rotated);
}

#[test]
fn subtextures_anywhere_in_document_order() {
    let xml = r#"<Root><Group><SubTexture name="z"/></Group><SubTexture name="a"/></Root>"#;
    let names: Vec<_> = parse_atlas_xml(xml)
        .unwrap()
        .records
        .into_iter()
        .map(|r| r.name)
        .collect();
    assert_eq!(names, ["z", "a"]);
}

#[test]
fn missing_name_is_an_error() {
    let err = parse_atlas_xml(r#"<TextureAtlas><SubTexture x="1"/></TextureAtlas>"#).unwrap_err();
    assert!(matches!(err, AtlasError::Metadata(_)));
}

#[test]
fn bad_numbers_are_errors() {
    assert!(parse_atlas_xml(r#"<A><SubTexture name="n" x="abc"/></A>"#).is_err());
    assert!(parse_atlas_xml(r#"<A><SubTexture name="n" width="-4"/></A>"#).is_err());
}

#[test]
fn malformed_documents_are_errors() {
    assert!(parse_atlas_xml("").is_err());
    assert!(parse_atlas_xml("not xml at all").is_err());
    assert!(parse_atlas_xml("<TextureAtlas><SubTexture name=\"a\"/>").is_err());
    assert!(parse_atlas_xml("<TextureAtlas></Other>").is_err());
}
