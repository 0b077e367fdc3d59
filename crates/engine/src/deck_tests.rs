// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::io::Write;
use zip::write::SimpleFileOptions;

const SLIDE_REL_TYPE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
const NOTES_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/notesSlide";

fn notes_xml(line_a: &str, line_b: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:notes xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"
         xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
  <p:cSld>
    <p:spTree>
      <p:sp>
        <p:txBody>
          <a:p><a:r><a:t>{line_a}</a:t></a:r></a:p>
          <a:p><a:r><a:t>{line_b}</a:t></a:r></a:p>
        </p:txBody>
      </p:sp>
    </p:spTree>
  </p:cSld>
</p:notes>"#
    )
}

/// One slide in presentation order; `notes_index` is the
/// `notesSlideN.xml` part it links to (deliberately independent of the
/// slide's own position, since OOXML does not guarantee the two line up).
struct SlideSpec {
    notes_index: Option<u32>,
    notes_text: (&'static str, &'static str),
}

fn with_notes(notes_index: u32, a: &'static str, b: &'static str) -> SlideSpec {
    SlideSpec {
        notes_index: Some(notes_index),
        notes_text: (a, b),
    }
}

fn without_notes() -> SlideSpec {
    SlideSpec {
        notes_index: None,
        notes_text: ("", ""),
    }
}

/// Builds a minimal but structurally real OOXML `.pptx`: a
/// `presentation.xml` + rels driving slide order, one `slides/slideN.xml`
/// + optional `_rels/slideN.xml.rels` per entry, and the linked
/// `notesSlides/notesSlideM.xml` parts.
fn build_pptx(slides: &[SlideSpec]) -> Bytes {
    let mut buf = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(std::io::Cursor::new(&mut buf));
        let options = SimpleFileOptions::default();

        let mut sld_id_list = String::new();
        let mut presentation_rels = String::new();
        for (i, _slide) in slides.iter().enumerate() {
            let slide_number = i + 1;
            let rid = format!("rId{}", slide_number + 1);
            sld_id_list.push_str(&format!(
                r#"<p:sldId id="{}" r:id="{rid}"/>"#,
                256 + slide_number
            ));
            presentation_rels.push_str(&format!(
                r#"<Relationship Id="{rid}" Type="{SLIDE_REL_TYPE}" Target="slides/slide{slide_number}.xml"/>"#
            ));
        }

        zip.start_file("ppt/presentation.xml", options).unwrap();
        zip.write_all(
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"
                xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <p:sldIdLst>{sld_id_list}</p:sldIdLst>
</p:presentation>"#
            )
            .as_bytes(),
        )
        .unwrap();

        zip.start_file("ppt/_rels/presentation.xml.rels", options).unwrap();
        zip.write_all(
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{presentation_rels}</Relationships>"#
            )
            .as_bytes(),
        )
        .unwrap();

        for (i, slide) in slides.iter().enumerate() {
            let slide_number = i + 1;
            zip.start_file(format!("ppt/slides/slide{slide_number}.xml"), options)
                .unwrap();
            zip.write_all(b"<p:sld/>").unwrap();

            if let Some(notes_index) = slide.notes_index {
                zip.start_file(
                    format!("ppt/slides/_rels/slide{slide_number}.xml.rels"),
                    options,
                )
                .unwrap();
                zip.write_all(
                    format!(
                        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="{NOTES_REL_TYPE}" Target="../notesSlides/notesSlide{notes_index}.xml"/>
</Relationships>"#
                    )
                    .as_bytes(),
                )
                .unwrap();

                zip.start_file(format!("ppt/notesSlides/notesSlide{notes_index}.xml"), options)
                    .unwrap();
                zip.write_all(notes_xml(slide.notes_text.0, slide.notes_text.1).as_bytes())
                    .unwrap();
            }
        }

        zip.finish().unwrap();
    }
    Bytes::from(buf)
}

#[test]
fn extracts_text_from_notes_placeholder_runs() {
    let text = extract_notes_text(&notes_xml("Hello", "world")).unwrap();
    assert_eq!(text, "Hello\nworld");
}

#[test]
fn extract_notes_follows_presentation_order_not_notes_filename_order() {
    // slide 1 links to notesSlide3, slide 2 to notesSlide1 — the
    // filename indices are deliberately out of step with slide order.
    let pptx = build_pptx(&[
        with_notes(3, "first", "slide"),
        with_notes(1, "second", "slide"),
    ]);
    let notes = PptxDeckReader.extract_notes(&pptx).unwrap();
    assert_eq!(notes, vec!["first\nslide".to_string(), "second\nslide".to_string()]);
}

#[test]
fn slide_without_notes_yields_empty_string_at_its_position() {
    let pptx = build_pptx(&[
        with_notes(1, "has", "notes"),
        without_notes(),
        with_notes(2, "also", "has notes"),
    ]);
    let notes = PptxDeckReader.extract_notes(&pptx).unwrap();
    assert_eq!(
        notes,
        vec!["has\nnotes".to_string(), String::new(), "also\nhas notes".to_string()]
    );
}

#[test]
fn slide_count_matches_deck_slide_count_not_notes_part_count() {
    // five slides, only two carry notes — the result must still have
    // five entries, one per slide.
    let pptx = build_pptx(&[
        without_notes(),
        with_notes(1, "a", "b"),
        without_notes(),
        without_notes(),
        with_notes(2, "c", "d"),
    ]);
    let notes = PptxDeckReader.extract_notes(&pptx).unwrap();
    assert_eq!(notes.len(), 5);
}

#[test]
fn extract_notes_on_deck_with_no_slides_returns_empty_vec() {
    let pptx = build_pptx(&[]);
    let notes = PptxDeckReader.extract_notes(&pptx).unwrap();
    assert!(notes.is_empty());
}

#[test]
fn extract_notes_rejects_non_zip_bytes() {
    let bytes = Bytes::from_static(b"not a zip file");
    assert!(matches!(
        PptxDeckReader.extract_notes(&bytes),
        Err(DeckError::Zip(_))
    ));
}

#[test]
fn extract_notes_requires_presentation_xml() {
    let mut buf = Vec::new();
    {
        let zip = zip::ZipWriter::new(std::io::Cursor::new(&mut buf));
        zip.finish().unwrap();
    }
    let bytes = Bytes::from(buf);
    assert!(matches!(
        PptxDeckReader.extract_notes(&bytes),
        Err(DeckError::MissingPresentation)
    ));
}

#[test]
fn resolve_target_handles_parent_relative_and_absolute_paths() {
    assert_eq!(resolve_target("ppt", "slides/slide1.xml"), "ppt/slides/slide1.xml");
    assert_eq!(
        resolve_target("ppt/slides", "../notesSlides/notesSlide1.xml"),
        "ppt/notesSlides/notesSlide1.xml"
    );
    assert_eq!(
        resolve_target("ppt/slides", "/ppt/notesSlides/notesSlide1.xml"),
        "ppt/notesSlides/notesSlide1.xml"
    );
}
