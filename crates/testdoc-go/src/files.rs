//! Go test file discovery.
//!
//! Resolves the Go module that owns a source root and walks the tree for
//! `*_test.go` files, attaching to each the package identifier test runners
//! use in their reports.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use testdoc_core::error::TestDocError;

/// Module definition file name.
pub const GO_MOD: &str = "go.mod";

/// Suffix of Go test source files.
pub const TEST_FILE_SUFFIX: &str = "_test.go";

/// Directory names the Go tool itself ignores.
const SKIPPED_DIRS: &[&str] = &["testdata", "vendor"];

// ============================================================================
// Error Types
// ============================================================================

/// Error type for file operations.
#[derive(Debug, Error)]
pub enum FileError {
    /// The source root does not exist or is not a directory.
    #[error("source root not found: {path}")]
    RootNotFound { path: String },

    /// No `go.mod` (with a `module` directive) in the root or its ancestors.
    #[error("no go.mod found for {path} or any parent directory")]
    ModuleNotFound { path: String },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for file operations.
pub type FileResult<T> = Result<T, FileError>;

impl From<FileError> for TestDocError {
    fn from(err: FileError) -> Self {
        match err {
            FileError::RootNotFound { path } => TestDocError::RootNotFound { path },
            FileError::ModuleNotFound { path } => TestDocError::ModuleNotFound { path },
            FileError::Io(e) => TestDocError::internal(e.to_string()),
        }
    }
}

// ============================================================================
// Modules
// ============================================================================

/// A Go module: the directory holding `go.mod` and its declared path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoModule {
    pub root: PathBuf,
    pub path: String,
}

impl GoModule {
    /// Package identifier for a directory inside this module.
    ///
    /// External test packages (`foo_test`) report under the package they
    /// test, so a trailing `_test` is dropped.
    pub fn package_for_dir(&self, dir: &Path) -> String {
        let rel: Vec<String> = dir
            .strip_prefix(&self.root)
            .map(|p| {
                p.components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default();

        let package = if rel.is_empty() {
            self.path.clone()
        } else {
            format!("{}/{}", self.path, rel.join("/"))
        };
        match package.strip_suffix("_test") {
            Some(trimmed) => trimmed.to_string(),
            None => package,
        }
    }
}

/// Extract the module path from `go.mod` content.
pub fn parse_module_path(content: &str) -> Option<String> {
    content.lines().find_map(|line| {
        let line = line.split("//").next().unwrap_or("").trim();
        let rest = line.strip_prefix("module")?;
        if !rest.starts_with(char::is_whitespace) {
            return None;
        }
        let path = rest.trim().trim_matches(|c| c == '"' || c == '`');
        (!path.is_empty()).then(|| path.to_string())
    })
}

/// Find the module owning `root`, searching `root` and then its ancestors.
///
/// `root` must be an existing directory.
pub fn find_module(root: &Path) -> FileResult<GoModule> {
    let canonical = fs::canonicalize(root).map_err(|_| FileError::RootNotFound {
        path: root.display().to_string(),
    })?;
    if !canonical.is_dir() {
        return Err(FileError::RootNotFound {
            path: root.display().to_string(),
        });
    }

    for dir in canonical.ancestors() {
        let go_mod = dir.join(GO_MOD);
        if !go_mod.is_file() {
            continue;
        }
        let content = fs::read_to_string(&go_mod)?;
        return match parse_module_path(&content) {
            Some(path) => {
                debug!(module = %path, root = %dir.display(), "resolved go module");
                Ok(GoModule {
                    root: dir.to_path_buf(),
                    path,
                })
            }
            None => Err(FileError::ModuleNotFound {
                path: go_mod.display().to_string(),
            }),
        };
    }

    Err(FileError::ModuleNotFound {
        path: root.display().to_string(),
    })
}

// ============================================================================
// File Collection
// ============================================================================

/// A discovered test source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoTestFile {
    /// Absolute path.
    pub path: PathBuf,
    /// Path relative to the source root, `/`-separated.
    pub rel_path: String,
    /// Package identifier used in result lookups.
    pub package: String,
}

impl GoTestFile {
    /// The file's base name.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.rel_path.clone())
    }
}

/// Collect test files under `root`, sorted by path.
///
/// Returns the owning module together with the files.
pub fn collect_test_files(
    root: &Path,
    exclude_dirs: &[String],
) -> FileResult<(GoModule, Vec<GoTestFile>)> {
    let module = find_module(root)?;
    let root = fs::canonicalize(root)?;

    let mut files = Vec::new();
    let walker = WalkDir::new(&root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_skipped_dir(e, exclude_dirs));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!(error = %err, "skipping unreadable directory entry");
                continue;
            }
        };
        if !entry.file_type().is_file() || !is_test_file(entry.path()) {
            continue;
        }

        let path = entry.path().to_path_buf();
        let rel_path = path
            .strip_prefix(&root)
            .map(|p| {
                p.components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect::<Vec<_>>()
                    .join("/")
            })
            .unwrap_or_else(|_| path.display().to_string());
        let package = path
            .parent()
            .map(|dir| module.package_for_dir(dir))
            .unwrap_or_else(|| module.path.clone());

        debug!(file = %rel_path, package = %package, "found test file");
        files.push(GoTestFile {
            path,
            rel_path,
            package,
        });
    }

    files.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));
    Ok((module, files))
}

fn is_test_file(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|n| n.to_string_lossy().ends_with(TEST_FILE_SUFFIX))
}

/// Directories below the root that discovery never enters.
fn is_skipped_dir(entry: &DirEntry, exclude_dirs: &[String]) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    let name: &str = &name;
    if name.starts_with('.') || name.starts_with('_') {
        return true;
    }
    if SKIPPED_DIRS.contains(&name) || exclude_dirs.iter().any(|d| d == name) {
        return true;
    }
    // nested module
    entry.path().join(GO_MOD).is_file()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    mod module_path {
        use super::*;

        #[test]
        fn plain_directive() {
            assert_eq!(
                parse_module_path("module example.com/proj\n\ngo 1.22\n"),
                Some("example.com/proj".to_string())
            );
        }

        #[test]
        fn quoted_directive_with_comment() {
            assert_eq!(
                parse_module_path("// header\nmodule \"example.com/q\" // trailing\n"),
                Some("example.com/q".to_string())
            );
        }

        #[test]
        fn missing_directive() {
            assert_eq!(parse_module_path("go 1.22\n"), None);
            assert_eq!(parse_module_path("modules x\n"), None);
        }
    }

    mod packages {
        use super::*;

        fn module() -> GoModule {
            GoModule {
                root: PathBuf::from("/src/proj"),
                path: "example.com/proj".to_string(),
            }
        }

        #[test]
        fn root_dir_is_module_path() {
            assert_eq!(module().package_for_dir(Path::new("/src/proj")), "example.com/proj");
        }

        #[test]
        fn nested_dir_is_joined() {
            assert_eq!(
                module().package_for_dir(Path::new("/src/proj/internal/store")),
                "example.com/proj/internal/store"
            );
        }

        #[test]
        fn test_suffix_is_dropped() {
            assert_eq!(
                module().package_for_dir(Path::new("/src/proj/api_test")),
                "example.com/proj/api"
            );
        }
    }

    mod collection {
        use super::*;

        #[test]
        fn finds_sorted_test_files_only() {
            let dir = tempfile::tempdir().unwrap();
            write(dir.path(), "go.mod", "module example.com/m\n");
            write(dir.path(), "b_test.go", "package m\n");
            write(dir.path(), "a_test.go", "package m\n");
            write(dir.path(), "main.go", "package m\n");
            write(dir.path(), "sub/c_test.go", "package sub\n");

            let (module, files) = collect_test_files(dir.path(), &[]).unwrap();
            assert_eq!(module.path, "example.com/m");
            let rels: Vec<_> = files.iter().map(|f| f.rel_path.as_str()).collect();
            assert_eq!(rels, vec!["a_test.go", "b_test.go", "sub/c_test.go"]);
            assert_eq!(files[2].package, "example.com/m/sub");
            assert_eq!(files[2].file_name(), "c_test.go");
        }

        #[test]
        fn skips_excluded_directories() {
            let dir = tempfile::tempdir().unwrap();
            write(dir.path(), "go.mod", "module example.com/m\n");
            write(dir.path(), "testdata/x_test.go", "");
            write(dir.path(), "vendor/y_test.go", "");
            write(dir.path(), ".hidden/z_test.go", "");
            write(dir.path(), "_scratch/w_test.go", "");
            write(dir.path(), "slow/v_test.go", "");
            write(dir.path(), "nested/go.mod", "module example.com/nested\n");
            write(dir.path(), "nested/n_test.go", "");
            write(dir.path(), "kept/k_test.go", "");

            let (_, files) = collect_test_files(dir.path(), &["slow".to_string()]).unwrap();
            let rels: Vec<_> = files.iter().map(|f| f.rel_path.as_str()).collect();
            assert_eq!(rels, vec!["kept/k_test.go"]);
        }

        #[test]
        fn module_found_in_ancestor() {
            let dir = tempfile::tempdir().unwrap();
            write(dir.path(), "go.mod", "module example.com/m\n");
            write(dir.path(), "pkg/p_test.go", "");

            let (module, files) = collect_test_files(&dir.path().join("pkg"), &[]).unwrap();
            assert_eq!(module.path, "example.com/m");
            assert_eq!(files[0].rel_path, "p_test.go");
            assert_eq!(files[0].package, "example.com/m/pkg");
        }

        #[test]
        fn missing_root_is_an_error() {
            let err = collect_test_files(Path::new("/nonexistent/testdoc/root"), &[]).unwrap_err();
            assert!(matches!(err, FileError::RootNotFound { .. }));
        }

        #[test]
        fn file_root_is_an_error() {
            let dir = tempfile::tempdir().unwrap();
            write(dir.path(), "go.mod", "module example.com/m\n");
            let err = find_module(&dir.path().join("go.mod")).unwrap_err();
            assert!(matches!(err, FileError::RootNotFound { .. }));
        }

        #[test]
        fn errors_bridge_to_exit_codes() {
            let err: TestDocError = FileError::ModuleNotFound {
                path: "/x".to_string(),
            }
            .into();
            assert_eq!(err.error_code().code(), 3);
        }
    }
}
