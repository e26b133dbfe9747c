use std::collections::{BTreeMap, BTreeSet};

pub type UploadId = u64;

const UPLOADS_PREFIX: &str = "/uploads/";

/// Server path of a staged or categorized image. Only the last path segment is kept.
pub fn upload_url(reference: &str) -> String {
    let filename = reference.rsplit('/').next().unwrap_or(reference);
    format!("{UPLOADS_PREFIX}{filename}")
}

/// A file offered by the input layer, before the server has seen it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    pub name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl CandidateFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            data,
        }
    }

    pub fn is_image(&self) -> bool {
        self.content_type
            .trim()
            .to_ascii_lowercase()
            .starts_with("image/")
    }
}

/// Marker for a file the server has accepted. No bytes are kept locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    name: String,
}

impl StagedFile {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn preview_url(&self) -> String {
        upload_url(&self.name)
    }
}

/// Server answer to an upload batch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UploadReceipt {
    pub files: Vec<String>,
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AddStats {
    pub uploaded: usize,
    pub local_duplicates: usize,
    pub server_skipped: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingUpload {
    names: Vec<String>,
    local_duplicates: usize,
}

pub(crate) struct AddPlan {
    pub(crate) batch: Option<(UploadId, Vec<CandidateFile>)>,
    pub(crate) local_duplicates: usize,
}

/// Server-confirmed staged files plus the requests still in flight for them.
///
/// `files` only ever changes after the server confirms, so it never runs
/// ahead of the server's upload set.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct StagingStore {
    files: Vec<StagedFile>,
    pending_uploads: BTreeMap<UploadId, PendingUpload>,
    pending_removals: BTreeSet<String>,
    next_upload_id: UploadId,
}

impl StagingStore {
    pub(crate) fn contains(&self, name: &str) -> bool {
        self.files.iter().any(|file| file.name == name)
    }

    pub(crate) fn files(&self) -> &[StagedFile] {
        &self.files
    }

    pub(crate) fn len(&self) -> usize {
        self.files.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub(crate) fn is_removing(&self, name: &str) -> bool {
        self.pending_removals.contains(name)
    }

    fn is_uploading(&self, name: &str) -> bool {
        self.pending_uploads
            .values()
            .any(|pending| pending.names.iter().any(|n| n == name))
    }

    /// Keep image-typed candidates whose name is neither staged nor already in flight.
    pub(crate) fn plan_add(&mut self, candidates: Vec<CandidateFile>) -> AddPlan {
        let mut batch: Vec<CandidateFile> = Vec::new();
        let mut local_duplicates = 0;

        for candidate in candidates.into_iter().filter(CandidateFile::is_image) {
            let seen = self.contains(&candidate.name)
                || self.is_uploading(&candidate.name)
                || batch.iter().any(|queued| queued.name == candidate.name);
            if seen {
                local_duplicates += 1;
            } else {
                batch.push(candidate);
            }
        }

        if batch.is_empty() {
            return AddPlan {
                batch: None,
                local_duplicates,
            };
        }

        self.next_upload_id += 1;
        let upload_id = self.next_upload_id;
        self.pending_uploads.insert(
            upload_id,
            PendingUpload {
                names: batch.iter().map(|file| file.name.clone()).collect(),
                local_duplicates,
            },
        );
        AddPlan {
            batch: Some((upload_id, batch)),
            local_duplicates,
        }
    }

    /// Stage the names the server accepted. Returns stats for the batch.
    pub(crate) fn confirm_upload(&mut self, upload_id: UploadId, receipt: &UploadReceipt) -> AddStats {
        let local_duplicates = self
            .pending_uploads
            .remove(&upload_id)
            .map(|pending| pending.local_duplicates)
            .unwrap_or_default();

        let mut uploaded = 0;
        for name in &receipt.files {
            if !self.contains(name) {
                self.files.push(StagedFile { name: name.clone() });
                uploaded += 1;
            }
        }

        AddStats {
            uploaded,
            local_duplicates,
            server_skipped: receipt.skipped,
        }
    }

    /// Forget a failed batch; none of its files become staged.
    pub(crate) fn abandon_upload(&mut self, upload_id: UploadId) -> Option<usize> {
        self.pending_uploads
            .remove(&upload_id)
            .map(|pending| pending.local_duplicates)
    }

    /// Returns false if the name is unknown or a removal is already in flight.
    pub(crate) fn begin_remove(&mut self, name: &str) -> bool {
        if !self.contains(name) || self.is_removing(name) {
            return false;
        }
        self.pending_removals.insert(name.to_string());
        true
    }

    pub(crate) fn confirm_remove(&mut self, name: &str) -> bool {
        self.pending_removals.remove(name);
        let before = self.files.len();
        self.files.retain(|file| file.name != name);
        before != self.files.len()
    }

    pub(crate) fn abandon_remove(&mut self, name: &str) {
        self.pending_removals.remove(name);
    }

    /// Adopt the server's listing as the whole staged set.
    pub(crate) fn replace_all(&mut self, names: Vec<String>) {
        self.files.clear();
        self.pending_removals.clear();
        for name in names {
            if !self.contains(&name) {
                self.files.push(StagedFile { name });
            }
        }
    }

    /// Local reset only. In-flight uploads are still confirmed when they resolve.
    pub(crate) fn clear(&mut self) {
        self.files.clear();
        self.pending_removals.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::{upload_url, CandidateFile, StagingStore, UploadReceipt};

    fn png(name: &str) -> CandidateFile {
        CandidateFile::new(name, "image/png", vec![1, 2, 3])
    }

    #[test]
    fn upload_url_keeps_last_segment() {
        assert_eq!(upload_url("a.png"), "/uploads/a.png");
        assert_eq!(upload_url("/tmp/out/cats/a.png"), "/uploads/a.png");
    }

    #[test]
    fn non_images_are_dropped_and_duplicates_counted() {
        let mut store = StagingStore::default();
        let plan = store.plan_add(vec![
            png("a.png"),
            CandidateFile::new("notes.txt", "text/plain", Vec::new()),
            png("a.png"),
            CandidateFile::new("b.JPG", "IMAGE/JPEG", Vec::new()),
        ]);
        let (_, batch) = plan.batch.expect("batch");
        let names: Vec<_> = batch.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a.png", "b.JPG"]);
        assert_eq!(plan.local_duplicates, 1);
    }

    #[test]
    fn in_flight_names_are_not_uploaded_twice() {
        let mut store = StagingStore::default();
        let first = store.plan_add(vec![png("a.png")]);
        assert!(first.batch.is_some());
        let second = store.plan_add(vec![png("a.png")]);
        assert!(second.batch.is_none());
        assert_eq!(second.local_duplicates, 1);
        assert!(!store.contains("a.png"));
    }

    #[test]
    fn only_accepted_names_are_staged() {
        let mut store = StagingStore::default();
        let plan = store.plan_add(vec![png("a.png"), png("b.png")]);
        let (id, _) = plan.batch.unwrap();
        let stats = store.confirm_upload(
            id,
            &UploadReceipt {
                files: vec!["b.png".to_string()],
                skipped: 1,
            },
        );
        assert_eq!(stats.uploaded, 1);
        assert_eq!(stats.server_skipped, 1);
        assert!(store.contains("b.png"));
        assert!(!store.contains("a.png"));
    }

    #[test]
    fn replace_all_dedupes_listing() {
        let mut store = StagingStore::default();
        store.replace_all(vec!["a.png".into(), "b.png".into(), "a.png".into()]);
        assert_eq!(store.len(), 2);
    }
}
