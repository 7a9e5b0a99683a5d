use crate::codec::{DocumentCodec, Stripped};
use crate::error::CodecError;
use crate::kind::DocumentKind;
use lopdf::{Document, Object};
use tracing::debug;

/// Drops every page's annotation list from a PDF.
///
/// Link annotations are not singled out: comments, form widgets and any
/// other annotation on the page go with them.
pub struct PdfCodec;

impl DocumentCodec for PdfCodec {
    fn kind(&self) -> DocumentKind {
        DocumentKind::Pdf
    }

    fn strip(&self, input: &[u8]) -> Result<Stripped, CodecError> {
        let doc = Document::load_mem(input)?;
        let (mut doc, removed) = strip_annotations(doc)?;

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)?;
        Ok(Stripped { bytes, removed })
    }
}

/// Remove `/Annots` from every page, in page order, and return the number of
/// annotations dropped. Page count and content streams are left as they are.
pub fn strip_annotations(mut doc: Document) -> Result<(Document, usize), CodecError> {
    let mut removed = 0;

    for (number, page_id) in doc.get_pages() {
        let count = annotation_count(&doc, page_id)?;
        let page = doc.get_object_mut(page_id).and_then(Object::as_dict_mut)?;
        if page.remove(b"Annots").is_some() {
            debug!(page = number, annotations = count, "dropped annotation list");
            removed += count;
        }
    }

    if removed > 0 {
        // The form's fields were the widgets just dropped
        let root = doc.trailer.get(b"Root").and_then(Object::as_reference)?;
        let catalog = doc.get_object_mut(root).and_then(Object::as_dict_mut)?;
        if catalog.remove(b"AcroForm").is_some() {
            debug!("dropped interactive form");
        }
        doc.prune_objects();
    }

    Ok((doc, removed))
}

/// Entries in the page's `/Annots` array, following one indirect reference.
fn annotation_count(doc: &Document, page_id: lopdf::ObjectId) -> Result<usize, CodecError> {
    let page = doc.get_dictionary(page_id)?;
    let count = match page.get(b"Annots") {
        Ok(Object::Array(annots)) => annots.len(),
        Ok(Object::Reference(id)) => doc
            .get_object(*id)
            .and_then(Object::as_array)
            .map(Vec::len)
            .unwrap_or(0),
        _ => 0,
    };
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Stream};

    /// A PDF with one page per entry of `links`, each carrying that many link annotations.
    fn sample(links: &[usize], with_form: bool) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let mut kids: Vec<Object> = Vec::new();
        let mut widgets: Vec<Object> = Vec::new();

        for (i, &count) in links.iter().enumerate() {
            let content = format!("BT /F1 12 Tf 72 720 Td (page {}) Tj ET", i + 1);
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
            let mut page = dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            };
            if count > 0 {
                let annots: Vec<Object> = (0..count)
                    .map(|_| {
                        doc.add_object(dictionary! {
                            "Type" => "Annot",
                            "Subtype" => "Link",
                            "Rect" => vec![72.into(), 700.into(), 200.into(), 730.into()],
                            "A" => dictionary! {
                                "S" => "URI",
                                "URI" => Object::string_literal("https://example.com"),
                            },
                        })
                        .into()
                    })
                    .collect();
                widgets.extend(annots.iter().cloned());
                page.set("Annots", annots);
            }
            kids.push(doc.add_object(page).into());
        }

        let page_count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => page_count,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            }),
        );
        let mut catalog = dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        };
        if with_form {
            catalog.set("AcroForm", dictionary! { "Fields" => widgets });
        }
        let catalog_id = doc.add_object(catalog);
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    fn page_contents(doc: &Document) -> Vec<Vec<u8>> {
        doc.get_pages()
            .values()
            .map(|id| doc.get_page_content(*id).unwrap())
            .collect()
    }

    #[test]
    fn drops_annotations_and_keeps_pages() {
        let input = sample(&[1, 0, 3], false);
        let out = PdfCodec.strip(&input).unwrap();
        assert_eq!(out.removed, 4);

        let before = Document::load_mem(&input).unwrap();
        let after = Document::load_mem(&out.bytes).unwrap();
        assert_eq!(after.get_pages().len(), 3);
        for id in after.get_pages().values() {
            assert!(!after.get_dictionary(*id).unwrap().has(b"Annots"));
        }
        assert_eq!(page_contents(&before), page_contents(&after));
    }

    #[test]
    fn annotation_objects_are_pruned() {
        let input = sample(&[2], false);
        let before = Document::load_mem(&input).unwrap();
        let (after, removed) = strip_annotations(before.clone()).unwrap();
        assert_eq!(removed, 2);
        assert_eq!(after.objects.len(), before.objects.len() - 2);
    }

    #[test]
    fn interactive_form_goes_with_its_widgets() {
        let out = PdfCodec.strip(&sample(&[1], true)).unwrap();
        let doc = Document::load_mem(&out.bytes).unwrap();
        let root = doc.trailer.get(b"Root").and_then(Object::as_reference).unwrap();
        assert!(!doc.get_dictionary(root).unwrap().has(b"AcroForm"));
    }

    #[test]
    fn annotation_list_behind_a_reference_is_counted() {
        let mut doc = Document::load_mem(&sample(&[0], false)).unwrap();
        let first = doc.add_object(dictionary! { "Subtype" => "Link" });
        let second = doc.add_object(dictionary! { "Subtype" => "Widget" });
        let list = doc.add_object(vec![Object::from(first), Object::from(second)]);
        let page_id = *doc.get_pages().values().next().unwrap();
        doc.get_object_mut(page_id)
            .and_then(Object::as_dict_mut)
            .unwrap()
            .set("Annots", list);

        let (doc, removed) = strip_annotations(doc).unwrap();
        assert_eq!(removed, 2);
        assert!(!doc.get_dictionary(page_id).unwrap().has(b"Annots"));
    }

    #[test]
    fn clean_document_reports_nothing_removed() {
        let input = sample(&[0, 0], false);
        let once = PdfCodec.strip(&input).unwrap();
        assert_eq!(once.removed, 0);
        let twice = PdfCodec.strip(&once.bytes).unwrap();
        assert_eq!(twice.removed, 0);
        assert_eq!(
            Document::load_mem(&twice.bytes).unwrap().get_pages().len(),
            2
        );
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(PdfCodec.strip(b"%PDF-1.7\nnot really").is_err());
    }
}
