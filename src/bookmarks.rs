//! PDF outline entries for the sections of a rendered form, written with `lopdf`.

use std::collections::BTreeMap;

use lopdf::{Dictionary, Document, Object, ObjectId};
use thiserror::Error;

use crate::template::SectionPlacement;

/// Failure while adding bookmarks to rendered bytes.
#[derive(Debug, Error)]
pub enum BookmarkError {
    #[error("failed to parse PDF bytes: {0}")]
    Parse(#[from] lopdf::Error),
    #[error("failed to write PDF bytes: {0}")]
    Write(#[from] std::io::Error),
    #[error("PDF catalog entry is missing")]
    MissingCatalog,
    #[error("PDF catalog entry is not a dictionary")]
    InvalidCatalog,
    #[error("section '{title}' starts on page {page_number}, which does not exist")]
    MissingPage { title: String, page_number: usize },
}

/// Adds a flat outline with one entry per section, each pointing at the section's first page.
pub fn apply_section_bookmarks(
    pdf_bytes: &[u8],
    sections: &[SectionPlacement],
) -> Result<Vec<u8>, BookmarkError> {
    if sections.is_empty() {
        return Ok(pdf_bytes.to_vec());
    }

    let mut document = Document::load_mem(pdf_bytes)?;
    let pages = document.get_pages();
    let mut entries = outline_entries(&mut document, sections, &pages)?;

    let outlines_id = document.new_object_id();
    link_outline_entries(outlines_id, &mut document, &mut entries);
    insert_outlines_root(outlines_id, &mut document, &entries)?;

    let mut buffer = Vec::new();
    document.save_to(&mut buffer)?;
    Ok(buffer)
}

struct OutlineEntry {
    object_id: ObjectId,
    page_ref: ObjectId,
    title: String,
}

fn outline_entries(
    document: &mut Document,
    sections: &[SectionPlacement],
    pages: &BTreeMap<u32, ObjectId>,
) -> Result<Vec<OutlineEntry>, BookmarkError> {
    sections
        .iter()
        .map(|section| {
            let page_ref = u32::try_from(section.first_page)
                .ok()
                .and_then(|number| pages.get(&number).copied())
                .ok_or_else(|| BookmarkError::MissingPage {
                    title: section.title.clone(),
                    page_number: section.first_page,
                })?;
            Ok(OutlineEntry {
                object_id: document.new_object_id(),
                page_ref,
                title: section.title.clone(),
            })
        })
        .collect()
}

fn link_outline_entries(outlines_id: ObjectId, document: &mut Document, entries: &mut [OutlineEntry]) {
    for index in 0..entries.len() {
        let entry = &entries[index];
        let mut dictionary = Dictionary::new();
        dictionary.set("Title", Object::string_literal(entry.title.as_str()));
        dictionary.set(
            "Dest",
            Object::Array(vec![
                Object::Reference(entry.page_ref),
                Object::Name(b"Fit".to_vec()),
            ]),
        );
        dictionary.set("Parent", Object::Reference(outlines_id));
        if index > 0 {
            dictionary.set("Prev", Object::Reference(entries[index - 1].object_id));
        }
        if let Some(next) = entries.get(index + 1) {
            dictionary.set("Next", Object::Reference(next.object_id));
        }
        document
            .objects
            .insert(entry.object_id, Object::Dictionary(dictionary));
    }
}

fn insert_outlines_root(
    outlines_id: ObjectId,
    document: &mut Document,
    entries: &[OutlineEntry],
) -> Result<(), BookmarkError> {
    let catalog_id = document
        .trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .map_err(|_| BookmarkError::MissingCatalog)?;

    let mut dictionary = Dictionary::new();
    dictionary.set("Type", Object::Name(b"Outlines".to_vec()));
    dictionary.set("Count", Object::Integer(entries.len() as i64));
    if let Some(first) = entries.first() {
        dictionary.set("First", Object::Reference(first.object_id));
    }
    if let Some(last) = entries.last() {
        dictionary.set("Last", Object::Reference(last.object_id));
    }
    document
        .objects
        .insert(outlines_id, Object::Dictionary(dictionary));

    let catalog = document
        .objects
        .get_mut(&catalog_id)
        .ok_or(BookmarkError::MissingCatalog)?
        .as_dict_mut()
        .map_err(|_| BookmarkError::InvalidCatalog)?;
    catalog.set("Outlines", Object::Reference(outlines_id));
    catalog.set("PageMode", Object::Name(b"UseOutlines".to_vec()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::tests as fixtures;
    use crate::fonts;
    use crate::generator::FormGenerator;
    use crate::model::SectionKind;

    #[test]
    fn no_sections_leaves_bytes_untouched() {
        let bytes = b"not parsed".to_vec();
        assert_eq!(apply_section_bookmarks(&bytes, &[]).expect("no-op"), bytes);
    }

    #[test]
    fn garbage_bytes_fail_to_parse() {
        let placement = SectionPlacement {
            kind: SectionKind::BondTerms,
            title: "Guide to Applications".into(),
            first_page: 1,
        };
        let err = apply_section_bookmarks(b"garbage", &[placement]).unwrap_err();
        assert!(matches!(err, BookmarkError::Parse(_)));
    }

    #[test]
    fn outline_points_at_existing_pages() {
        if !fonts::fonts_available() {
            return;
        }
        let form = FormGenerator::new()
            .generate_form(&fixtures::individual())
            .expect("render form");
        let bytes = apply_section_bookmarks(&form.bytes, &form.sections).expect("bookmarks");

        let document = Document::load_mem(&bytes).expect("reload");
        let root = document
            .trailer
            .get(b"Root")
            .and_then(Object::as_reference)
            .expect("catalog reference");
        let catalog = document.get_dictionary(root).expect("catalog");
        assert!(catalog.get(b"Outlines").is_ok());

        let mut beyond = form.sections[0].clone();
        beyond.first_page = form.page_count + 1;
        let err = apply_section_bookmarks(&form.bytes, &[beyond]).unwrap_err();
        assert!(matches!(err, BookmarkError::MissingPage { .. }));
    }
}
