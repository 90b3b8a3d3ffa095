//! Stable document metadata.
//!
//! `printpdf` stamps every document with the wall-clock time and random identifiers. They are
//! rewritten here from the generation timestamp and a digest of the document, so identical
//! input always yields identical bytes.

use chrono::NaiveDateTime;
use lopdf::{Document, Object, ObjectId, StringFormat};
use sha2::{Digest, Sha256};

use crate::error::FormError;

/// Identifier written while the digest is taken.
const PENDING_ID: &str = "00000000000000000000000000000000";

/// XMP elements holding dates.
const XMP_DATES: [&str; 3] = ["xmp:CreateDate", "xmp:ModifyDate", "xmp:MetadataDate"];
/// XMP elements holding identifiers.
const XMP_IDS: [&str; 2] = ["xmpMM:DocumentID", "xmpMM:InstanceID"];

/// Rewrites dates and identifiers of a rendered document.
///
/// Dates become `timestamp`. The document identifier is derived from the document with its
/// identifiers blanked, so it changes exactly when the content does.
pub fn normalize_metadata(bytes: &[u8], timestamp: NaiveDateTime) -> Result<Vec<u8>, FormError> {
    let mut document = Document::load_mem(bytes).map_err(pdf_error)?;
    let metadata_id = metadata_stream(&document);

    set_info_dates(&mut document, timestamp)?;
    stamp(&mut document, metadata_id, timestamp, PENDING_ID)?;
    let digest = Sha256::digest(save(&mut document)?);
    let id = hex(&digest[..16]);
    log::debug!("document identifier {id}");

    stamp(&mut document, metadata_id, timestamp, &id)?;
    save(&mut document)
}

fn pdf_error(err: lopdf::Error) -> FormError {
    FormError::render(format!("failed to rewrite PDF metadata: {err}"))
}

fn save(document: &mut Document) -> Result<Vec<u8>, FormError> {
    let mut buffer = Vec::new();
    document.save_to(&mut buffer).map_err(|err| {
        FormError::render(format!("failed to write PDF bytes: {err}"))
    })?;
    Ok(buffer)
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{byte:02x}")).collect()
}

fn metadata_stream(document: &Document) -> Option<ObjectId> {
    document
        .catalog()
        .ok()?
        .get(b"Metadata")
        .and_then(Object::as_reference)
        .ok()
}

fn set_info_dates(document: &mut Document, timestamp: NaiveDateTime) -> Result<(), FormError> {
    let Ok(info_id) = document.trailer.get(b"Info").and_then(Object::as_reference) else {
        return Ok(());
    };
    let date = timestamp.format("D:%Y%m%d%H%M%S").to_string();
    let info = document.get_dictionary_mut(info_id).map_err(pdf_error)?;
    for key in ["CreationDate", "ModDate"] {
        info.set(key, Object::String(date.clone().into_bytes(), StringFormat::Literal));
    }
    Ok(())
}

/// Writes `id` into the trailer and the XMP packet, together with the XMP dates.
fn stamp(
    document: &mut Document,
    metadata_id: Option<ObjectId>,
    timestamp: NaiveDateTime,
    id: &str,
) -> Result<(), FormError> {
    let literal = || Object::String(id.as_bytes().to_vec(), StringFormat::Literal);
    document
        .trailer
        .set("ID", Object::Array(vec![literal(), literal()]));

    let Some(metadata_id) = metadata_id else {
        return Ok(());
    };
    let stream = document
        .get_object_mut(metadata_id)
        .and_then(Object::as_stream_mut)
        .map_err(pdf_error)?;
    let content = if stream.dict.get(b"Filter").is_ok() {
        stream.decompressed_content().map_err(pdf_error)?
    } else {
        stream.content.clone()
    };
    let mut xmp = String::from_utf8(content)
        .map_err(|_| FormError::render("XMP metadata is not valid UTF-8"))?;

    let date = timestamp.format("%Y-%m-%dT%H:%M:%S").to_string();
    for tag in XMP_DATES {
        xmp = replace_element(&xmp, tag, &date);
    }
    let uuid = format!("uuid:{id}");
    for tag in XMP_IDS {
        xmp = replace_element(&xmp, tag, &uuid);
    }
    stream.set_plain_content(xmp.into_bytes());
    Ok(())
}

/// Replaces the text of every `<tag>...</tag>` element in `xml`.
fn replace_element(xml: &str, tag: &str, value: &str) -> String {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let mut out = String::with_capacity(xml.len());
    let mut rest = xml;
    while let Some(start) = rest.find(&open) {
        let body = start + open.len();
        let Some(end) = rest[body..].find(&close) else {
            break;
        };
        out.push_str(&rest[..body]);
        out.push_str(value);
        rest = &rest[body + end..];
    }
    out.push_str(rest);
    out
}
