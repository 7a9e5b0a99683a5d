use crate::codec::{DocumentCodec, Stripped};
use crate::docx_links::LinkStripper;
use crate::error::CodecError;
use crate::kind::DocumentKind;
use crate::xml_tree::XmlTree;
use std::collections::{HashMap, HashSet};
use std::io::{Cursor, Read, Seek, Write};
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const PACKAGE_RELS: &str = "_rels/.rels";
const DEFAULT_MAIN_PART: &str = "word/document.xml";

/// Relationship types end in this segment for external and internal links alike.
const HYPERLINK_REL_SUFFIX: &str = "/hyperlink";
const OFFICE_DOCUMENT_REL_SUFFIX: &str = "/officeDocument";

/// Strips `w:hyperlink` wrappers from a `.docx` package.
///
/// Only the story parts are rewritten (main document, headers, footers,
/// footnotes, endnotes) along with their relationship parts; every other
/// entry is copied over as raw compressed bytes, in the original order.
pub struct WordCodec;

impl DocumentCodec for WordCodec {
    fn kind(&self) -> DocumentKind {
        DocumentKind::Word
    }

    fn strip(&self, input: &[u8]) -> Result<Stripped, CodecError> {
        let mut archive = ZipArchive::new(Cursor::new(input))?;

        let main_part = find_main_part(&mut archive)?;
        let names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index_raw(i).map(|entry| entry.name().to_string()))
            .collect::<Result<_, _>>()?;
        if !names.iter().any(|name| *name == main_part) {
            return Err(CodecError::MissingPart(main_part));
        }

        let mut rewritten: HashMap<String, Vec<u8>> = HashMap::new();
        let mut removed = 0;

        for part in names.iter().filter(|name| is_story_part(&main_part, name)) {
            let mut tree = XmlTree::parse(part, &read_entry(&mut archive, part)?)?;
            let count = LinkStripper::for_tree(&tree).strip(&mut tree);
            debug!(part = %part, hyperlinks = count, "scanned story part");
            if count == 0 {
                continue;
            }
            removed += count;

            let rels = rels_path(part);
            if names.contains(&rels) {
                let rels_xml = read_entry(&mut archive, &rels)?;
                let referenced = tree.attribute_values();
                if let Some(pruned) = prune_link_relationships(&rels, &rels_xml, &referenced)? {
                    rewritten.insert(rels, pruned);
                }
            }
            rewritten.insert(part.clone(), tree.to_bytes()?);
        }

        let bytes = if rewritten.is_empty() {
            input.to_vec()
        } else {
            repack(&mut archive, &rewritten)?
        };

        Ok(Stripped { bytes, removed })
    }
}

/// Target of the package's `officeDocument` relationship, or the conventional path.
fn find_main_part<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<String, CodecError> {
    let rels = match archive.by_name(PACKAGE_RELS) {
        Ok(mut entry) => {
            let mut buf = Vec::new();
            entry.read_to_end(&mut buf)?;
            buf
        }
        Err(_) => return Ok(DEFAULT_MAIN_PART.to_string()),
    };

    let tree = XmlTree::parse(PACKAGE_RELS, &rels)?;
    let target = tree.root().and_then(|root| {
        root.elements()
            .filter(|rel| {
                rel.attribute("Type")
                    .is_some_and(|t| t.ends_with(OFFICE_DOCUMENT_REL_SUFFIX))
            })
            .find_map(|rel| rel.attribute("Target"))
    });

    Ok(target
        .map(|t| t.trim_start_matches('/').to_string())
        .unwrap_or_else(|| DEFAULT_MAIN_PART.to_string()))
}

/// Parts that can hold `w:hyperlink`: the main document and its sibling
/// header, footer, footnote and endnote parts.
fn is_story_part(main_part: &str, name: &str) -> bool {
    if name == main_part {
        return true;
    }
    let (dir, _) = split_part(main_part);
    let Some(file) = name.strip_prefix(dir) else {
        return false;
    };
    if file.contains('/') || !file.ends_with(".xml") {
        return false;
    }
    file.starts_with("header")
        || file.starts_with("footer")
        || file == "footnotes.xml"
        || file == "endnotes.xml"
}

/// `word/document.xml` -> (`word/`, `document.xml`)
fn split_part(part: &str) -> (&str, &str) {
    match part.rfind('/') {
        Some(i) => part.split_at(i + 1),
        None => ("", part),
    }
}

/// `word/document.xml` -> `word/_rels/document.xml.rels`
fn rels_path(part: &str) -> String {
    let (dir, file) = split_part(part);
    format!("{dir}_rels/{file}.rels")
}

fn read_entry<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<Vec<u8>, CodecError> {
    let mut entry = archive.by_name(name)?;
    let mut buf = Vec::new();
    entry.read_to_end(&mut buf)?;
    Ok(buf)
}

/// Drop hyperlink relationships whose id no longer appears in the part.
/// Returns `None` when nothing was dropped.
fn prune_link_relationships(
    rels_part: &str,
    xml: &[u8],
    referenced: &HashSet<String>,
) -> Result<Option<Vec<u8>>, CodecError> {
    let mut tree = XmlTree::parse(rels_part, xml)?;
    let Some(root) = tree.root_mut() else {
        return Ok(None);
    };

    let before = root.children.len();
    root.children.retain(|node| {
        let Some(rel) = node.as_element() else {
            return true;
        };
        let is_link = rel
            .attribute("Type")
            .is_some_and(|t| t.ends_with(HYPERLINK_REL_SUFFIX));
        let still_used = rel.attribute("Id").is_some_and(|id| referenced.contains(&id));
        !is_link || still_used
    });
    let dropped = before - root.children.len();

    if dropped == 0 {
        return Ok(None);
    }
    debug!(part = %rels_part, dropped, "pruned hyperlink relationships");
    Ok(Some(tree.to_bytes()?))
}

/// Write a new archive with `rewritten` entries replaced, everything else raw-copied.
fn repack<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    rewritten: &HashMap<String, Vec<u8>>,
) -> Result<Vec<u8>, CodecError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

    for i in 0..archive.len() {
        let entry = archive.by_index_raw(i)?;
        match rewritten.get(entry.name()) {
            Some(data) => {
                let method = match entry.compression() {
                    CompressionMethod::Stored => CompressionMethod::Stored,
                    _ => CompressionMethod::Deflated,
                };
                writer.start_file(
                    entry.name(),
                    SimpleFileOptions::default().compression_method(method),
                )?;
                writer.write_all(data)?;
            }
            None => writer.raw_copy_file(entry)?,
        }
    }

    Ok(writer.finish()?.into_inner())
}
