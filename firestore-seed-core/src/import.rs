//! Recursive collection importer.
//!
//! For every document of a [`CollectionMap`] the importer resolves the
//! effective id (placeholder key → application identifier), normalizes the
//! body into a field map, substitutes placeholders in the fields, writes the
//! document, and only then descends into its nested collections.
//!
//! Siblings are written one at a time by default. With
//! [`ImportOptions::parallel`] all documents of one level are written
//! concurrently; the first failure is returned and a document's children are
//! still never written before the document itself.

use futures::future::{try_join_all, BoxFuture, FutureExt};
use tracing::{debug, error, info};

use crate::config::ImportOptions;
use crate::contract::{DocumentPath, DocumentStore};
use crate::error::SeedError;
use crate::seed::{Collection, CollectionMap, Document};
use crate::substitute::{resolve_document_id, substitute_fields};

/// Writes one seed source's collections into a store.
pub struct Importer<'a, S: DocumentStore + ?Sized> {
    store: &'a S,
    app_id: &'a str,
    source_name: &'a str,
    options: ImportOptions,
}

impl<'a, S: DocumentStore + ?Sized> Importer<'a, S> {
    pub fn new(store: &'a S, app_id: &'a str, source_name: &'a str, options: ImportOptions) -> Self {
        Self {
            store,
            app_id,
            source_name,
            options,
        }
    }

    /// Import `collections` under `parent`, returning every written path.
    pub fn import_collections<'b>(
        &'b self,
        collections: &'b CollectionMap,
        parent: &'b DocumentPath,
    ) -> BoxFuture<'b, Result<Vec<DocumentPath>, SeedError>> {
        async move {
            if self.options.parallel {
                let writes = collections
                    .documents()
                    .map(|(collection, document)| self.import_document(collection, document, parent));
                let written = try_join_all(writes).await?;
                Ok(written.into_iter().flatten().collect())
            } else {
                let mut written = Vec::new();
                for (collection, document) in collections.documents() {
                    written.extend(self.import_document(collection, document, parent).await?);
                }
                Ok(written)
            }
        }
        .boxed()
    }

    async fn import_document(
        &self,
        collection: &Collection,
        document: &Document,
        parent: &DocumentPath,
    ) -> Result<Vec<DocumentPath>, SeedError> {
        let doc_id = resolve_document_id(&document.raw_id, self.app_id);
        let path = parent.child(&collection.name, doc_id);
        let payload = substitute_fields(&document.body.fields(), self.app_id);

        debug!(source = self.source_name, path = %path, fields = payload.len(), "Writing document");
        if let Err(e) = self.store.set(path.clone(), payload).await {
            error!(source = self.source_name, path = %path, error = %e, "Document write failed");
            return Err(SeedError::Write {
                source_name: self.source_name.to_string(),
                path: path.to_string(),
                source: e,
            });
        }
        info!(source = self.source_name, path = %path, "Wrote document");

        let children = match document.body.nested() {
            Some(nested) => self.import_collections(nested, &path).await?,
            None => Vec::new(),
        };
        let mut written = Vec::with_capacity(1 + children.len());
        written.push(path);
        written.extend(children);
        Ok(written)
    }
}

/// Import `collections` under the database root.
pub async fn import_collections<S: DocumentStore + ?Sized>(
    store: &S,
    collections: &CollectionMap,
    app_id: &str,
    source_name: &str,
    options: ImportOptions,
) -> Result<Vec<DocumentPath>, SeedError> {
    let importer = Importer::new(store, app_id, source_name, options);
    importer
        .import_collections(collections, &DocumentPath::root())
        .await
}
