// Process-wide memo of the normalized table.
//
// The table is built from the file once and then shared read-only. The
// entry is keyed on the path plus the file's length and modification time,
// so replacing or editing the file forces a fresh load on the next call.
use crate::loader::{load_and_clean, DataLoadError, LoadReport};
use crate::types::Transaction;
use log::debug;
use once_cell::sync::Lazy;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

#[derive(Debug, Clone, PartialEq, Eq)]
struct CacheKey {
    path: PathBuf,
    len: u64,
    modified: Option<SystemTime>,
}

impl CacheKey {
    fn for_path(path: &Path) -> Result<Self, DataLoadError> {
        let meta = std::fs::metadata(path).map_err(|source| DataLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(CacheKey {
            path: path.to_path_buf(),
            len: meta.len(),
            modified: meta.modified().ok(),
        })
    }
}

struct CachedTable {
    key: CacheKey,
    rows: Arc<[Transaction]>,
    report: LoadReport,
}

static TABLE_CACHE: Lazy<Mutex<Option<CachedTable>>> = Lazy::new(|| Mutex::new(None));

/// Return the normalized table for `path`, loading it only when the cached
/// copy is missing or stale.
///
/// The lock is held across the load so two callers never parse the same
/// file at once.
pub fn load_cached(path: &Path) -> Result<(Arc<[Transaction]>, LoadReport), DataLoadError> {
    let key = CacheKey::for_path(path)?;
    let mut slot = TABLE_CACHE
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());

    if let Some(cached) = slot.as_ref() {
        if cached.key == key {
            debug!("table cache hit for {}", path.display());
            return Ok((Arc::clone(&cached.rows), cached.report));
        }
    }

    debug!("table cache miss for {}", path.display());
    let (rows, report) = load_and_clean(path)?;
    let rows: Arc<[Transaction]> = rows.into();
    *slot = Some(CachedTable {
        key,
        rows: Arc::clone(&rows),
        report,
    });
    Ok((rows, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::tests::{csv_of, line};
    use std::io::Write;

    fn row(date: &str, gross: &str) -> String {
        line(date, "P", "C", "S", "Loja", gross, "1,00", "5", "1", "false", "false")
    }

    // Single test so the shared static is not raced by parallel test threads.
    #[test]
    fn reuses_and_invalidates_the_cached_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.csv");
        std::fs::write(&path, csv_of(&[row("2024-01-10", "10,00")])).unwrap();

        let (first, _) = load_cached(&path).unwrap();
        let (second, _) = load_cached(&path).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.len(), 1);

        // Appending changes the length, which is part of the key.
        let mut f = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(f, "{}", row("2024-01-11", "20,00")).unwrap();
        drop(f);

        let (third, report) = load_cached(&path).unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(third.len(), 2);
        assert_eq!(report.kept_rows, 2);

        let missing = dir.path().join("missing.csv");
        assert!(matches!(
            load_cached(&missing),
            Err(DataLoadError::Io { .. })
        ));
    }
}
