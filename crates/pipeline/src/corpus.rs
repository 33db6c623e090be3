//! Corpus traversal.
//!
//! A corpus root holds one directory per group; each group keeps its
//! documents in a `content/` subdirectory:
//!
//! ```text
//! corpus/
//!   内科治疗指南/content/01.tex
//!   急诊内科学/content/01.tex
//! ```

use std::fs;
use std::path::Path;
use texchunk_core::{AppError, AppResult};
use walkdir::WalkDir;

use crate::types::DocumentSource;

/// Subdirectory of a group that holds its documents.
pub const CONTENT_DIR: &str = "content";

/// Document file extension.
pub const DOCUMENT_EXTENSION: &str = "tex";

/// Enumerate the corpus documents in group-name, then file-name order.
///
/// Hidden group directories and groups without a `content/` directory are
/// ignored.
pub fn discover_documents(root: &Path) -> AppResult<Vec<DocumentSource>> {
    if !root.is_dir() {
        return Err(AppError::Config(format!(
            "Corpus root is not a directory: {:?}",
            root
        )));
    }

    let mut groups: Vec<_> = fs::read_dir(root)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| {
            let name = entry.file_name().to_str()?.to_string();
            (!name.starts_with('.')).then_some((name, entry.path()))
        })
        .collect();
    groups.sort();

    let mut sources = Vec::new();
    for (group_name, group_path) in groups {
        let content_dir = group_path.join(CONTENT_DIR);
        if !content_dir.is_dir() {
            tracing::debug!("Group {} has no {}/ directory", group_name, CONTENT_DIR);
            continue;
        }

        let before = sources.len();
        for entry in WalkDir::new(&content_dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !entry.file_type().is_file() || !is_document(path) {
                continue;
            }
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                tracing::warn!("Skipping non-UTF-8 file name: {:?}", path);
                continue;
            };

            sources.push(DocumentSource {
                path: path.to_path_buf(),
                relative_path: format!("{}/{}/{}", group_name, CONTENT_DIR, file_name),
                group_name: group_name.clone(),
            });
        }

        tracing::debug!(
            "Group {}: {} documents",
            group_name,
            sources.len() - before
        );
    }

    tracing::info!("Discovered {} documents under {:?}", sources.len(), root);
    Ok(sources)
}

fn is_document(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext == DOCUMENT_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "\\chapter{x}").unwrap();
    }

    #[test]
    fn test_discovers_sorted_documents() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "急诊内科学/content/02.tex");
        touch(temp.path(), "急诊内科学/content/01.tex");
        touch(temp.path(), "内科治疗指南/content/a.tex");
        touch(temp.path(), "内科治疗指南/content/notes.md");

        let sources = discover_documents(temp.path()).unwrap();
        let paths: Vec<_> = sources.iter().map(|s| s.relative_path.as_str()).collect();

        let mut expected_groups = vec!["内科治疗指南", "急诊内科学"];
        expected_groups.sort();
        assert_eq!(sources.len(), 3);
        assert_eq!(sources[0].group_name, expected_groups[0]);
        assert!(paths.contains(&"急诊内科学/content/01.tex"));
        let first = paths.iter().position(|p| p.ends_with("01.tex")).unwrap();
        let second = paths.iter().position(|p| p.ends_with("02.tex")).unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_skips_hidden_groups_and_nested_files() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), ".cache/content/a.tex");
        touch(temp.path(), "group/content/nested/b.tex");
        touch(temp.path(), "group/c.tex");
        touch(temp.path(), "group/content/d.tex");

        let sources = discover_documents(temp.path()).unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].relative_path, "group/content/d.tex");
        assert_eq!(sources[0].group_name, "group");
        assert!(sources[0].path.ends_with("group/content/d.tex"));
    }

    #[test]
    fn test_missing_root_is_error() {
        let result = discover_documents(Path::new("/nonexistent/corpus"));
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
