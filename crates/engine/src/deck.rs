// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Slide-deck speaker-notes extraction (spec §4.3 step 3). Generalizes the
//! source's direct `python-pptx` dependency into a `DeckReader` capability;
//! [`PptxDeckReader`] walks the zipped OOXML container the way
//! `python-pptx` does: `ppt/presentation.xml`'s `<p:sldIdLst>` gives the
//! authoritative slide order (via `ppt/_rels/presentation.xml.rels`), and
//! each slide's own `_rels/slideN.xml.rels` gives its notes-slide link, if
//! any — `ppt/notesSlides/notesSlideN.xml` filename indices are an
//! implementation detail of the writer that produced the file and are
//! never assumed to line up with slide order (original ground truth:
//! `examples/original_source/app/workers/tasks_cpu.py:36-40`, which
//! iterates `prs.slides` and substitutes `""` for
//! `not slide.has_notes_slide`).

use std::collections::HashMap;
use std::io::{Cursor, Read};

use bytes::Bytes;
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeckError {
    #[error("not a valid zip archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("failed to read archive entry: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed presentation xml: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("ppt/presentation.xml missing from archive")]
    MissingPresentation,
}

/// Extracts per-slide speaker-notes text from a deck artifact, one entry
/// per slide in presentation order. A slide with no notes part yields an
/// empty string rather than an error (spec §4.5 step 3 treats empty as
/// silence) — this is what keeps the result length equal to the deck's
/// actual slide count, which the dispatcher relies on for `slide_count`.
pub trait DeckReader: Send + Sync {
    fn extract_notes(&self, bytes: &Bytes) -> Result<Vec<String>, DeckError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PptxDeckReader;

impl DeckReader for PptxDeckReader {
    fn extract_notes(&self, bytes: &Bytes) -> Result<Vec<String>, DeckError> {
        let cursor = Cursor::new(bytes.as_ref());
        let mut archive = zip::ZipArchive::new(cursor)?;

        let presentation_xml = read_entry(&mut archive, "ppt/presentation.xml")?
            .ok_or(DeckError::MissingPresentation)?;
        let sld_rids = parse_sld_id_order(&presentation_xml)?;

        let presentation_rels =
            read_entry(&mut archive, "ppt/_rels/presentation.xml.rels")?.unwrap_or_default();
        let presentation_rels = parse_relationships(&presentation_rels)?;

        let mut notes = Vec::with_capacity(sld_rids.len());
        for rid in sld_rids {
            let Some(rel) = presentation_rels.get(&rid) else {
                notes.push(String::new());
                continue;
            };
            let slide_path = resolve_target("ppt", &rel.target);
            notes.push(notes_for_slide(&mut archive, &slide_path)?);
        }
        Ok(notes)
    }
}

/// Looks up the notes-slide linked from `slide_path`'s own relationships
/// part, and returns its extracted text — `""` if the slide has no notes
/// relationship (a slide can legitimately omit speaker notes entirely).
fn notes_for_slide<R: Read + std::io::Seek>(
    archive: &mut zip::ZipArchive<R>,
    slide_path: &str,
) -> Result<String, DeckError> {
    let (dir, file) = match slide_path.rsplit_once('/') {
        Some((dir, file)) => (dir, file),
        None => ("", slide_path),
    };
    let rels_path = if dir.is_empty() {
        format!("_rels/{file}.rels")
    } else {
        format!("{dir}/_rels/{file}.rels")
    };

    let Some(rels_xml) = read_entry(archive, &rels_path)? else {
        return Ok(String::new());
    };
    let relationships = parse_relationships(&rels_xml)?;
    let Some(notes_rel) = relationships.values().find(|r| r.rel_type.ends_with("/notesSlide"))
    else {
        return Ok(String::new());
    };

    let notes_path = resolve_target(dir, &notes_rel.target);
    match read_entry(archive, &notes_path)? {
        Some(xml) => extract_notes_text(&xml),
        None => Ok(String::new()),
    }
}

/// Reads a zip entry to a `String`, treating "entry not present" as `None`
/// rather than an error — several of the parts this module reads (the
/// presentation rels, a slide's own rels, a slide's notes part) are
/// optional under the OOXML schema.
fn read_entry<R: Read + std::io::Seek>(
    archive: &mut zip::ZipArchive<R>,
    path: &str,
) -> Result<Option<String>, DeckError> {
    match archive.by_name(path) {
        Ok(mut entry) => {
            let mut xml = String::new();
            entry.read_to_string(&mut xml)?;
            Ok(Some(xml))
        }
        Err(zip::result::ZipError::FileNotFound) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// One `<Relationship Id="..." Type="..." Target="..."/>` entry from a
/// `.rels` part. Keyed by `Id` in the map `parse_relationships` returns, so
/// the id itself isn't carried here.
struct Relationship {
    rel_type: String,
    target: String,
}

/// Parses a `.rels` XML part into `Id -> Relationship`.
fn parse_relationships(xml: &str) -> Result<HashMap<String, Relationship>, DeckError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut out = HashMap::new();
    let mut buf = Vec::new();
    loop {
        let event = reader.read_event_into(&mut buf)?;
        match &event {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                let mut id = None;
                let mut rel_type = None;
                let mut target = None;
                for attr in e.attributes().flatten() {
                    let value = attr.unescape_value()?.into_owned();
                    match attr.key.local_name().as_ref() {
                        b"Id" => id = Some(value),
                        b"Type" => rel_type = Some(value),
                        b"Target" => target = Some(value),
                        _ => {}
                    }
                }
                if let (Some(id), Some(rel_type), Some(target)) = (id, rel_type, target) {
                    out.insert(id, Relationship { rel_type, target });
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(out)
}

/// Parses `ppt/presentation.xml`'s `<p:sldIdLst>` into the ordered list of
/// `r:id` references — the authoritative slide order (spec: slide→notes
/// linkage is never assumed from filename indices).
fn parse_sld_id_order(xml: &str) -> Result<Vec<String>, DeckError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut out = Vec::new();
    let mut buf = Vec::new();
    loop {
        let event = reader.read_event_into(&mut buf)?;
        match &event {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"sldId" => {
                for attr in e.attributes().flatten() {
                    // matches the namespace-qualified `r:id` attribute, not
                    // a bare `id` (sldId elements carry both `id` — the
                    // presentation-local slide id — and `r:id` — the
                    // relationship reference this module actually needs).
                    if attr.key.as_ref() == b"r:id" {
                        out.push(attr.unescape_value()?.into_owned());
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(out)
}

/// Resolves a `.rels` `Target` attribute against the directory of the part
/// that declared it. Targets are either package-root-absolute
/// (`/ppt/notesSlides/notesSlide1.xml`) or relative
/// (`../notesSlides/notesSlide1.xml`, `slide1.xml`); both are normalized
/// to a flat archive-entry path.
fn resolve_target(base_dir: &str, target: &str) -> String {
    if let Some(stripped) = target.strip_prefix('/') {
        return stripped.to_string();
    }
    let mut parts: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            s => parts.push(s),
        }
    }
    parts.join("/")
}

/// Concatenates the text runs under every `<a:t>` element, which is where
/// PowerPoint's OOXML schema places notes-placeholder text. Paragraph
/// breaks (`<a:p>`) become newlines.
fn extract_notes_text(xml: &str) -> Result<String, DeckError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut text = String::new();
    let mut in_text_run = false;
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.local_name().as_ref() == b"t" => in_text_run = true,
            Event::End(e) if e.local_name().as_ref() == b"t" => in_text_run = false,
            Event::Start(e) if e.local_name().as_ref() == b"p" && !text.is_empty() => {
                text.push('\n');
            }
            Event::Text(e) if in_text_run => {
                text.push_str(&e.unescape()?);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(text)
}

#[cfg(test)]
#[path = "deck_tests.rs"]
mod tests;
