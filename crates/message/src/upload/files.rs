use super::UploadedFile;

/// One entry of an upload tree: a file, or a group of entries posted under an array-style
/// field name such as `attachments[]`.
#[derive(Debug, Clone)]
pub enum UploadedFileTree {
    File(UploadedFile),
    Nested(UploadedFiles),
}

impl From<UploadedFile> for UploadedFileTree {
    fn from(file: UploadedFile) -> Self {
        Self::File(file)
    }
}

impl From<UploadedFiles> for UploadedFileTree {
    fn from(files: UploadedFiles) -> Self {
        Self::Nested(files)
    }
}

/// Uploaded files by field name, in the order the fields were added.
#[derive(Debug, Clone, Default)]
pub struct UploadedFiles {
    entries: Vec<(String, UploadedFileTree)>,
}

impl UploadedFiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Adds or replaces the entry for `name`.
    pub fn insert(&mut self, name: impl Into<String>, entry: impl Into<UploadedFileTree>) {
        let name = name.into();
        let entry = entry.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = entry,
            None => self.entries.push((name, entry)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&UploadedFileTree> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, entry)| entry)
    }

    /// The file posted as `name`, `None` when absent or a group.
    pub fn file(&self, name: &str) -> Option<&UploadedFile> {
        match self.get(name)? {
            UploadedFileTree::File(file) => Some(file),
            UploadedFileTree::Nested(_) => None,
        }
    }

    /// The group posted under `name`, `None` when absent or a single file.
    pub fn nested(&self, name: &str) -> Option<&UploadedFiles> {
        match self.get(name)? {
            UploadedFileTree::Nested(files) => Some(files),
            UploadedFileTree::File(_) => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &UploadedFileTree)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    /// Every file of the tree with its form field path, e.g. `docs[0]` or `user[avatar]`.
    pub fn flatten(&self) -> Vec<(String, &UploadedFile)> {
        let mut out = Vec::new();
        self.collect_into(None, &mut out);
        out
    }

    fn collect_into<'a>(&'a self, prefix: Option<&str>, out: &mut Vec<(String, &'a UploadedFile)>) {
        for (name, entry) in &self.entries {
            let path = match prefix {
                Some(prefix) => format!("{prefix}[{name}]"),
                None => name.clone(),
            };
            match entry {
                UploadedFileTree::File(file) => out.push((path, file)),
                UploadedFileTree::Nested(files) => files.collect_into(Some(&path), out),
            }
        }
    }
}

impl<N: Into<String>, E: Into<UploadedFileTree>> FromIterator<(N, E)> for UploadedFiles {
    fn from_iter<T: IntoIterator<Item = (N, E)>>(iter: T) -> Self {
        let mut files = UploadedFiles::new();
        for (name, entry) in iter {
            files.insert(name, entry);
        }
        files
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::UploadErrorCode;

    fn named(name: &str) -> UploadedFile {
        UploadedFile::default().with_client_filename(Some(name)).with_error(UploadErrorCode::NoFile)
    }

    #[test]
    fn insert_and_lookup() {
        let mut files = UploadedFiles::new();
        files.insert("avatar", named("me.png"));
        files.insert("docs", UploadedFiles::from_iter([("0", named("a.pdf")), ("1", named("b.pdf"))]));

        assert_eq!(files.len(), 2);
        assert_eq!(files.file("avatar").and_then(UploadedFile::client_filename), Some("me.png"));
        assert!(files.file("docs").is_none());
        assert_eq!(files.nested("docs").map(UploadedFiles::len), Some(2));
        assert!(files.get("missing").is_none());
    }

    #[test]
    fn insert_replaces() {
        let mut files = UploadedFiles::new();
        files.insert("avatar", named("old.png"));
        files.insert("avatar", named("new.png"));

        assert_eq!(files.len(), 1);
        assert_eq!(files.file("avatar").and_then(UploadedFile::client_filename), Some("new.png"));
    }

    #[test]
    fn flatten_paths() {
        let user: UploadedFiles = [("avatar", named("me.png"))].into_iter().collect();
        let mut files = UploadedFiles::new();
        files.insert("single", named("s.txt"));
        files.insert("user", user);

        let paths: Vec<_> = files.flatten().into_iter().map(|(path, file)| (path, file.client_filename())).collect();
        assert_eq!(
            paths,
            [("single".to_string(), Some("s.txt")), ("user[avatar]".to_string(), Some("me.png"))]
        );
    }
}
