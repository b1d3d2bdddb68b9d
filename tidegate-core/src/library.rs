//! Media library with traversal-safe path resolution.
//!
//! Every served file lives under one of a fixed set of category roots.
//! Filenames arrive from the network and are fully attacker-controlled, so
//! resolution is lexical-first: the joined path is normalized and checked for
//! containment before the filesystem is touched at all. The only filesystem
//! access on the resolution path is a single metadata read.

use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

/// Media categories served by the library.
///
/// Each category maps to exactly one directory under the library root,
/// configured at startup and immutable for the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Music,
    Tv,
    Movies,
    Files,
}

impl Category {
    /// All categories, in route order.
    pub const ALL: [Category; 4] = [
        Category::Music,
        Category::Tv,
        Category::Movies,
        Category::Files,
    ];

    /// Directory and route name for this category.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Music => "music",
            Category::Tv => "tv",
            Category::Movies => "movies",
            Category::Files => "files",
        }
    }
}

impl FromStr for Category {
    type Err = LibraryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "music" => Ok(Category::Music),
            "tv" => Ok(Category::Tv),
            "movies" => Ok(Category::Movies),
            "files" => Ok(Category::Files),
            _ => Err(LibraryError::UnknownCategory {
                name: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A successfully resolved media file.
///
/// The path is guaranteed to be a descendant of its category root. Size is
/// read fresh per request; files may change between requests.
#[derive(Debug, Clone)]
pub struct ResolvedMedia {
    pub path: PathBuf,
    pub size: u64,
}

/// Errors from media resolution.
#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    #[error("unknown category: {name}")]
    UnknownCategory { name: String },

    #[error("resolved path escapes category root")]
    OutsideRoot,

    #[error("file not found")]
    NotFound,
}

/// Maps (category, filename) pairs to files under the configured root.
#[derive(Debug, Clone)]
pub struct MediaLibrary {
    root: PathBuf,
}

impl MediaLibrary {
    /// Creates a library rooted at `root`, with one subdirectory per category.
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Directory backing the given category.
    pub fn category_root(&self, category: Category) -> PathBuf {
        self.root.join(category.as_str())
    }

    /// Resolves a client-supplied filename within a category.
    ///
    /// Containment is verified lexically before any filesystem access; the
    /// subsequent metadata read is the only filesystem touch. A missing
    /// category directory behaves like any missing file.
    ///
    /// # Errors
    ///
    /// - `LibraryError::OutsideRoot` - the normalized path escapes the
    ///   category root (traversal attempt)
    /// - `LibraryError::NotFound` - the target is absent or not a regular file
    pub async fn resolve(
        &self,
        category: Category,
        filename: &str,
    ) -> Result<ResolvedMedia, LibraryError> {
        let root = lexical_normalize(&self.category_root(category));
        let candidate = lexical_normalize(&root.join(filename));

        // Component-wise prefix check: `movies-extra` never matches a root of
        // `movies`, and the root itself is not a valid target.
        if candidate == root || !candidate.starts_with(&root) {
            return Err(LibraryError::OutsideRoot);
        }

        let metadata = tokio::fs::metadata(&candidate)
            .await
            .map_err(|_| LibraryError::NotFound)?;
        if !metadata.is_file() {
            return Err(LibraryError::NotFound);
        }

        Ok(ResolvedMedia {
            path: candidate,
            size: metadata.len(),
        })
    }
}

/// Resolves `.` and `..` components without touching the filesystem.
///
/// Symlinks are deliberately not followed; containment is a lexical property
/// of the request, not of the directory tree. A `..` that would climb above
/// the start of a relative path is preserved, which makes the containment
/// check fail for it.
fn lexical_normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => normalized.push(component),
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => normalized.push(Component::ParentDir),
            },
            Component::Normal(part) => normalized.push(part),
        }
    }

    normalized
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn library_with_movie() -> (TempDir, MediaLibrary) {
        let temp = TempDir::new().unwrap();
        let movies = temp.path().join("movies");
        fs::create_dir_all(movies.join("classics")).unwrap();
        fs::write(movies.join("movie.mp4"), b"not really a movie").unwrap();
        fs::write(movies.join("classics/old.mp4"), b"older").unwrap();
        fs::write(temp.path().join("secret.txt"), b"do not serve").unwrap();

        let library = MediaLibrary::new(temp.path().to_path_buf());
        (temp, library)
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!("movies".parse::<Category>().unwrap(), Category::Movies);
        assert_eq!("music".parse::<Category>().unwrap(), Category::Music);
        assert!("movies2".parse::<Category>().is_err());
        assert!("Movies".parse::<Category>().is_err());
        assert!("".parse::<Category>().is_err());
    }

    #[tokio::test]
    async fn test_resolve_regular_file() {
        let (_temp, library) = library_with_movie();

        let resolved = library
            .resolve(Category::Movies, "movie.mp4")
            .await
            .unwrap();
        assert_eq!(resolved.size, 18);
        assert!(resolved.path.ends_with("movies/movie.mp4"));
    }

    #[tokio::test]
    async fn test_resolve_nested_file() {
        let (_temp, library) = library_with_movie();

        let resolved = library
            .resolve(Category::Movies, "classics/old.mp4")
            .await
            .unwrap();
        assert!(resolved.path.ends_with("movies/classics/old.mp4"));
    }

    #[tokio::test]
    async fn test_traversal_attempts_rejected() {
        let (_temp, library) = library_with_movie();

        for filename in [
            "../secret.txt",
            "..",
            "../../etc/passwd",
            "classics/../../secret.txt",
            "./../secret.txt",
        ] {
            let result = library.resolve(Category::Movies, filename).await;
            assert!(
                matches!(result, Err(LibraryError::OutsideRoot)),
                "expected OutsideRoot for {filename:?}, got {result:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_absolute_filename_rejected() {
        let (_temp, library) = library_with_movie();

        let result = library.resolve(Category::Movies, "/etc/passwd").await;
        assert!(matches!(result, Err(LibraryError::OutsideRoot)));
    }

    #[tokio::test]
    async fn test_sibling_prefix_directory_rejected() {
        let (temp, library) = library_with_movie();
        // A sibling whose name shares the root's prefix must not pass the
        // containment check via `../`.
        let sibling = temp.path().join("movies-extra");
        fs::create_dir(&sibling).unwrap();
        fs::write(sibling.join("leak.mp4"), b"leak").unwrap();

        let result = library
            .resolve(Category::Movies, "../movies-extra/leak.mp4")
            .await;
        assert!(matches!(result, Err(LibraryError::OutsideRoot)));
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let (_temp, library) = library_with_movie();

        let result = library.resolve(Category::Movies, "nofile.mp4").await;
        assert!(matches!(result, Err(LibraryError::NotFound)));
    }

    #[tokio::test]
    async fn test_directory_is_not_found() {
        let (_temp, library) = library_with_movie();

        let result = library.resolve(Category::Movies, "classics").await;
        assert!(matches!(result, Err(LibraryError::NotFound)));
    }

    #[tokio::test]
    async fn test_unconfigured_category_root_is_not_found() {
        let (_temp, library) = library_with_movie();

        // No `tv` directory exists under the root; requests must fail with
        // NotFound rather than erroring out.
        let result = library.resolve(Category::Tv, "show.mp4").await;
        assert!(matches!(result, Err(LibraryError::NotFound)));
    }

    #[test]
    fn test_lexical_normalize() {
        assert_eq!(
            lexical_normalize(Path::new("/a/b/../c/./d")),
            PathBuf::from("/a/c/d")
        );
        assert_eq!(lexical_normalize(Path::new("/a/../../b")), PathBuf::from("/b"));
        assert_eq!(lexical_normalize(Path::new("a/../../b")), PathBuf::from("../b"));
        assert_eq!(lexical_normalize(Path::new("./a")), PathBuf::from("a"));
    }
}
