//! Drawing XML parsing for image anchors
//!
//! Each worksheet may reference one drawing part via its relationships
//! file. The drawing part declares every embedded picture together with
//! its anchor; the position map built here is what joins product rows to
//! image payloads.

use anyhow::Result;
use quick_xml::Reader;
use quick_xml::events::Event;
use std::collections::HashMap;
use std::io::BufReader;
use zip::ZipArchive;

/// Declared position of an embedded image within a worksheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageAnchor {
    /// Anchored at a cell, 0-based row/column straight from the drawing XML
    Cell { row: u32, col: u32 },
    /// No resolvable cell anchor (absolute anchors); unreachable by row lookup
    Unanchored,
}

/// 1-based (row, column) cell position used to join product rows with
/// anchored images. Equality is structural.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PositionKey {
    pub row: u32,
    pub col: u32,
}

impl PositionKey {
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

/// List the image anchors declared for a worksheet, in document order
///
/// The ordinal of an image within this list (1-based) is the sheet-local
/// image index. A missing relationships part or a sheet without a drawing
/// yields an empty list.
pub fn sheet_image_anchors(
    archive: &mut ZipArchive<impl std::io::Read + std::io::Seek>,
    sheet_index: usize,
) -> Result<Vec<ImageAnchor>> {
    let Some(drawing_path) = drawing_part_for_sheet(archive, sheet_index)? else {
        return Ok(Vec::new());
    };
    parse_drawing_anchors(archive, &drawing_path)
}

/// Build the position map for one worksheet: `(row+1, col+1)` -> 1-based
/// image ordinal. Unanchored images still consume an ordinal but produce
/// no key, so they are unreachable by row lookup.
pub fn build_anchor_map(anchors: &[ImageAnchor]) -> HashMap<PositionKey, u32> {
    let mut map = HashMap::new();
    for (i, anchor) in anchors.iter().enumerate() {
        if let ImageAnchor::Cell { row, col } = anchor {
            map.insert(PositionKey::new(row + 1, col + 1), i as u32 + 1);
        }
    }
    map
}

/// Resolve the drawing part path for a worksheet from its relationships file
fn drawing_part_for_sheet(
    archive: &mut ZipArchive<impl std::io::Read + std::io::Seek>,
    sheet_index: usize,
) -> Result<Option<String>> {
    // Sheet files are named sheet1.xml, sheet2.xml, etc. (1-indexed)
    let rels_path = format!("xl/worksheets/_rels/sheet{}.xml.rels", sheet_index + 1);

    let rels_xml = match archive.by_name(&rels_path) {
        Ok(file) => file,
        Err(_) => return Ok(None), // No relationships part, no drawing
    };

    let buf_reader = BufReader::new(rels_xml);
    let mut reader = Reader::from_reader(buf_reader);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut target = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"Relationship" {
                    let mut rel_type = String::new();
                    let mut rel_target = String::new();

                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"Type" => {
                                rel_type = String::from_utf8_lossy(&attr.value).to_string();
                            }
                            b"Target" => {
                                rel_target = String::from_utf8_lossy(&attr.value).to_string();
                            }
                            _ => {}
                        }
                    }

                    if rel_type.ends_with("/drawing") && !rel_target.is_empty() {
                        target = Some(resolve_part_path(&rel_target));
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(anyhow::anyhow!("XML parsing error: {}", e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(target)
}

/// Normalize a relationship target (relative to xl/worksheets/) to an
/// archive part path
fn resolve_part_path(target: &str) -> String {
    if let Some(rest) = target.strip_prefix('/') {
        rest.to_string()
    } else if let Some(rest) = target.strip_prefix("../") {
        format!("xl/{}", rest)
    } else {
        format!("xl/worksheets/{}", target)
    }
}

/// Parse a drawing part and return one anchor per declared picture,
/// in document order
fn parse_drawing_anchors(
    archive: &mut ZipArchive<impl std::io::Read + std::io::Seek>,
    drawing_path: &str,
) -> Result<Vec<ImageAnchor>> {
    let drawing_xml = match archive.by_name(drawing_path) {
        Ok(file) => file,
        Err(_) => return Ok(Vec::new()),
    };

    let buf_reader = BufReader::new(drawing_xml);
    let mut reader = Reader::from_reader(buf_reader);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut anchors = Vec::new();

    let mut in_anchor = false;
    let mut in_from = false;
    let mut current_tag: Option<&'static str> = None;
    let mut from_row: Option<u32> = None;
    let mut from_col: Option<u32> = None;
    let mut has_pic = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"oneCellAnchor" | b"twoCellAnchor" | b"absoluteAnchor" => {
                    in_anchor = true;
                    from_row = None;
                    from_col = None;
                    has_pic = false;
                }
                b"from" if in_anchor => in_from = true,
                b"row" if in_from => current_tag = Some("row"),
                b"col" if in_from => current_tag = Some("col"),
                b"pic" if in_anchor => has_pic = true,
                _ => {}
            },
            Ok(Event::Text(e)) => {
                if let Some(tag) = current_tag {
                    let text = e.unescape().unwrap_or_default();
                    let value = text.trim().parse::<u32>().ok();
                    match tag {
                        "row" => from_row = value,
                        "col" => from_col = value,
                        _ => {}
                    }
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"oneCellAnchor" | b"twoCellAnchor" | b"absoluteAnchor" => {
                    // Only pictures count; charts and shapes are skipped
                    if has_pic {
                        anchors.push(match (from_row, from_col) {
                            (Some(row), Some(col)) => ImageAnchor::Cell { row, col },
                            _ => ImageAnchor::Unanchored,
                        });
                    }
                    in_anchor = false;
                }
                b"from" => in_from = false,
                b"row" | b"col" => current_tag = None,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(anyhow::anyhow!("XML parsing error: {}", e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(anchors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::FileOptions;

    fn archive_with(parts: &[(&str, &[u8])]) -> ZipArchive<Cursor<Vec<u8>>> {
        let mut buf = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
            let options =
                FileOptions::<()>::default().compression_method(zip::CompressionMethod::Stored);
            for (name, content) in parts {
                zip.start_file(*name, options).unwrap();
                zip.write_all(content).unwrap();
            }
            zip.finish().unwrap();
        }
        ZipArchive::new(Cursor::new(buf)).unwrap()
    }

    const DRAWING: &[u8] = br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<xdr:wsDr xmlns:xdr="http://schemas.openxmlformats.org/drawingml/2006/spreadsheetDrawing" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main">
  <xdr:oneCellAnchor>
    <xdr:from><xdr:col>0</xdr:col><xdr:colOff>0</xdr:colOff><xdr:row>2</xdr:row><xdr:rowOff>0</xdr:rowOff></xdr:from>
    <xdr:ext cx="952500" cy="952500"/>
    <xdr:pic/>
    <xdr:clientData/>
  </xdr:oneCellAnchor>
  <xdr:twoCellAnchor>
    <xdr:from><xdr:col>0</xdr:col><xdr:colOff>0</xdr:colOff><xdr:row>4</xdr:row><xdr:rowOff>0</xdr:rowOff></xdr:from>
    <xdr:to><xdr:col>1</xdr:col><xdr:colOff>0</xdr:colOff><xdr:row>5</xdr:row><xdr:rowOff>0</xdr:rowOff></xdr:to>
    <xdr:pic/>
    <xdr:clientData/>
  </xdr:twoCellAnchor>
  <xdr:absoluteAnchor>
    <xdr:pos x="0" y="0"/>
    <xdr:ext cx="100" cy="100"/>
    <xdr:pic/>
    <xdr:clientData/>
  </xdr:absoluteAnchor>
  <xdr:twoCellAnchor>
    <xdr:from><xdr:col>3</xdr:col><xdr:colOff>0</xdr:colOff><xdr:row>9</xdr:row><xdr:rowOff>0</xdr:rowOff></xdr:from>
    <xdr:to><xdr:col>4</xdr:col><xdr:colOff>0</xdr:colOff><xdr:row>10</xdr:row><xdr:rowOff>0</xdr:rowOff></xdr:to>
    <xdr:graphicFrame macro=""/>
    <xdr:clientData/>
  </xdr:twoCellAnchor>
</xdr:wsDr>"#;

    const SHEET_RELS: &[u8] = br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/drawing" Target="../drawings/drawing1.xml"/>
</Relationships>"#;

    #[test]
    fn test_sheet_image_anchors() {
        let mut archive = archive_with(&[
            ("xl/worksheets/_rels/sheet1.xml.rels", SHEET_RELS),
            ("xl/drawings/drawing1.xml", DRAWING),
        ]);

        let anchors = sheet_image_anchors(&mut archive, 0).unwrap();

        // Three pictures in document order; the chart frame is skipped
        assert_eq!(
            anchors,
            vec![
                ImageAnchor::Cell { row: 2, col: 0 },
                ImageAnchor::Cell { row: 4, col: 0 },
                ImageAnchor::Unanchored,
            ]
        );
    }

    #[test]
    fn test_build_anchor_map_skips_unanchored() {
        let anchors = vec![
            ImageAnchor::Cell { row: 2, col: 0 },
            ImageAnchor::Unanchored,
            ImageAnchor::Cell { row: 6, col: 0 },
        ];
        let map = build_anchor_map(&anchors);

        // Anchors are 0-based, keys 1-based; unanchored entries still
        // consume their ordinal
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(&PositionKey::new(3, 1)), Some(&1));
        assert_eq!(map.get(&PositionKey::new(7, 1)), Some(&3));
    }

    #[test]
    fn test_sheet_without_drawing() {
        let mut archive = archive_with(&[("xl/workbook.xml", b"<workbook/>")]);
        let anchors = sheet_image_anchors(&mut archive, 0).unwrap();
        assert!(anchors.is_empty());
    }

    #[test]
    fn test_resolve_part_path() {
        assert_eq!(
            resolve_part_path("../drawings/drawing1.xml"),
            "xl/drawings/drawing1.xml"
        );
        assert_eq!(
            resolve_part_path("/xl/drawings/drawing2.xml"),
            "xl/drawings/drawing2.xml"
        );
    }
}
