//! Output document assembly: page tree, catalog and serialization

use crate::options::ComposeOptions;
use crate::types::*;
use lopdf::{Dictionary, Document, Object, ObjectId};

pub(crate) struct Assembler {
    output: Document,
    pages_tree_id: ObjectId,
    page_refs: Vec<Object>,
}

impl Assembler {
    pub(crate) fn new() -> Self {
        let mut output = Document::with_version("1.7");
        let pages_tree_id = output.new_object_id();
        Self {
            output,
            pages_tree_id,
            page_refs: Vec::new(),
        }
    }

    pub(crate) fn document_mut(&mut self) -> &mut Document {
        &mut self.output
    }

    /// Append a page to the page tree, in call order
    pub(crate) fn add_page(&mut self, mut page: Dictionary) -> ObjectId {
        page.set("Parent", Object::Reference(self.pages_tree_id));
        let page_id = self.output.add_object(page);
        self.page_refs.push(Object::Reference(page_id));
        page_id
    }

    /// Write the page tree, catalog and Info, and serialize
    pub(crate) fn finish(mut self, options: &ComposeOptions) -> Result<Vec<u8>> {
        if self.page_refs.is_empty() {
            return Err(RebrandError::NoPages);
        }

        // Create pages tree
        let count = self.page_refs.len() as i64;
        let pages_dict = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(self.page_refs)),
            ("Count", Object::Integer(count)),
        ]);
        self.output
            .objects
            .insert(self.pages_tree_id, Object::Dictionary(pages_dict));

        // Create catalog
        let catalog_id = self.output.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(self.pages_tree_id)),
        ]));
        self.output.trailer.set("Root", catalog_id);

        if let Some(producer) = &options.producer {
            let info_id = self.output.add_object(Dictionary::from_iter(vec![(
                "Producer",
                Object::string_literal(producer.as_str()),
            )]));
            self.output.trailer.set("Info", info_id);
        }

        let mut bytes = Vec::new();
        self.output.save_to(&mut bytes)?;
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pages_in_call_order() {
        let mut assembler = Assembler::new();
        let first = assembler.add_page(Dictionary::from_iter(vec![("Type", Object::Name(b"Page".to_vec()))]));
        let second = assembler.add_page(Dictionary::from_iter(vec![("Type", Object::Name(b"Page".to_vec()))]));
        let options = ComposeOptions {
            producer: Some("pdf-rebrand".to_string()),
            ..Default::default()
        };
        let bytes = assembler.finish(&options).unwrap();

        let doc = Document::load_mem(&bytes).unwrap();
        let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();
        assert_eq!(pages, vec![first, second]);
        assert!(doc.trailer.get(b"Info").is_ok());
    }

    #[test]
    fn test_empty_document_rejected() {
        let assembler = Assembler::new();
        assert!(matches!(
            assembler.finish(&ComposeOptions::default()),
            Err(RebrandError::NoPages)
        ));
    }
}
