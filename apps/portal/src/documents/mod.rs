//! Local mirror of the server's document collection and the flows that keep
//! it in sync. Refreshes replace the mirror wholesale (last write wins);
//! creates land at the head so the newest entry renders first.

use tracing::debug;

use crate::api::ApiClient;
use crate::errors::ClientError;
use crate::models::document::{Document, DocumentPatch, FileUpload, NewProject};

/// In-memory collection state.
#[derive(Debug, Default)]
pub struct DocumentSet {
    items: Vec<Document>,
}

impl DocumentSet {
    pub fn items(&self) -> &[Document] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn replace(&mut self, items: Vec<Document>) {
        self.items = items;
    }

    pub fn insert_created(&mut self, document: Document) {
        self.items.insert(0, document);
    }

    /// Merges a confirmed rename into the matching entry: only the title
    /// changes, and an unknown id is a no-op.
    pub fn apply_rename(&mut self, id: i64, title: &str) {
        if let Some(doc) = self.items.iter_mut().find(|d| d.id == id) {
            doc.title = Some(title.to_owned());
        }
    }

    pub fn remove(&mut self, id: i64) {
        self.items.retain(|d| d.id != id);
    }
}

/// One panel's worth of documents (all of them, or one `doc_type`), plus the
/// operations the panel exposes.
pub struct DocumentsView {
    client: ApiClient,
    filter: Option<String>,
    set: DocumentSet,
}

impl DocumentsView {
    /// View over a single `doc_type`, e.g. the certificates section.
    pub fn typed(client: ApiClient, doc_type: impl Into<String>) -> Self {
        Self {
            client,
            filter: Some(doc_type.into()),
            set: DocumentSet::default(),
        }
    }

    /// View over every document (the upload page table).
    pub fn all(client: ApiClient) -> Self {
        Self {
            client,
            filter: None,
            set: DocumentSet::default(),
        }
    }

    pub fn documents(&self) -> &[Document] {
        self.set.items()
    }

    /// Refetches and replaces local state.
    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        let items = self.client.list_documents(self.filter.as_deref()).await?;
        self.set.replace(items);
        Ok(())
    }

    /// Uploads a file and merges the created entry at the head.
    pub async fn upload(&mut self, upload: FileUpload) -> Result<&Document, ClientError> {
        let created = self.client.create_document(upload).await?;
        self.set.insert_created(created);
        Ok(&self.set.items()[0])
    }

    /// Renames in place. An empty trimmed title is a no-op before any
    /// network call; a rename no candidate accepted is discarded and the
    /// local entry keeps its old title.
    pub async fn rename(&mut self, id: i64, new_title: &str) -> Result<bool, ClientError> {
        let title = new_title.trim();
        if title.is_empty() {
            return Ok(false);
        }
        let applied = self
            .client
            .update_document(id, &DocumentPatch::rename(title))
            .await?;
        if applied {
            self.set.apply_rename(id, title);
        } else {
            debug!(id, "rename discarded");
        }
        Ok(applied)
    }

    /// Deletes by id; local state only changes when some candidate accepted
    /// the delete.
    pub async fn delete(&mut self, id: i64) -> Result<bool, ClientError> {
        let removed = self.client.delete_document(id).await?;
        if removed {
            self.set.remove(id);
        }
        Ok(removed)
    }
}

/// The projects panel: same collection underneath, link-only entries.
pub struct ProjectsView {
    client: ApiClient,
    set: DocumentSet,
}

impl ProjectsView {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            set: DocumentSet::default(),
        }
    }

    pub fn projects(&self) -> &[Document] {
        self.set.items()
    }

    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        let items = self.client.list_projects().await?;
        self.set.replace(items);
        Ok(())
    }

    pub async fn add(&mut self, project: &NewProject) -> Result<&Document, ClientError> {
        let created = self.client.create_project(project).await?;
        self.set.insert_created(created);
        Ok(&self.set.items()[0])
    }
}
