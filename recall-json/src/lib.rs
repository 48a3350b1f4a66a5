use chrono::{DateTime, Utc};
use recall_core::{Card, CoreError, Persistence};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

pub mod paths;

const FILE_VERSION: u32 = 1;

#[derive(Serialize)]
struct FileImageOut<'a> {
    version: u32,
    saved_at: DateTime<Utc>,
    cards: &'a [Card],
}

#[derive(Deserialize)]
struct FileImage {
    version: u32,
    cards: Vec<Card>,
}

/// Card collection kept as one JSON file, with a rotating set of backups.
pub struct JsonStore {
    path: PathBuf,
    backups_dir: PathBuf,
    max_backups: usize,
}

impl JsonStore {
    pub fn open_with(path: PathBuf, backups_dir: PathBuf, max_backups: usize) -> Result<Self, CoreError> {
        ensure_parent_dirs(&path)?;
        ensure_dir(&backups_dir)?;
        Ok(Self {
            path,
            backups_dir,
            max_backups: max_backups.max(1),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backups_dir(&self) -> &Path {
        &self.backups_dir
    }

    /// Backups are `<stem>-<timestamp>.json`, so several data files can share
    /// one backups directory.
    fn backup_prefix(&self) -> String {
        let stem = self
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "cards".to_string());
        format!("{stem}-")
    }
}

impl Persistence for JsonStore {
    /// A missing file is an empty collection.
    fn load(&self) -> Result<Vec<Card>, CoreError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no card file yet");
            return Ok(Vec::new());
        }
        let buf = fs::read_to_string(&self.path).map_err(io_err)?;
        let img: FileImage = serde_json::from_str(&buf)
            .map_err(|e| CoreError::Storage(format!("corrupt card file: {e}")))?;
        if img.version != FILE_VERSION {
            return Err(CoreError::Storage(format!(
                "unsupported card file version {}",
                img.version
            )));
        }
        Ok(img.cards)
    }

    fn save(&self, cards: &[Card]) -> Result<(), CoreError> {
        let img = FileImageOut {
            version: FILE_VERSION,
            saved_at: Utc::now(),
            cards,
        };
        let json = serde_json::to_vec_pretty(&img)
            .map_err(|e| CoreError::Storage(format!("serialize: {e}")))?;
        write_atomic(&self.path, &json).map_err(io_err)?;
        debug!(path = %self.path.display(), cards = cards.len(), "card file saved");

        if let Err(e) = write_backup(&self.backups_dir, &self.backup_prefix(), self.max_backups, &json) {
            warn!(error = %e, "backup rotation failed");
        }
        Ok(())
    }
}

fn io_err(e: std::io::Error) -> CoreError {
    CoreError::Storage(format!("io: {e}"))
}

fn ensure_parent_dirs(path: &Path) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    Ok(())
}

fn ensure_dir(path: &Path) -> Result<(), CoreError> {
    fs::create_dir_all(path).map_err(io_err)
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), std::io::Error> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)?;
    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

const BACKUP_TS_FORMAT: &str = "%Y%m%d-%H%M%S%.3f";

fn write_backup(backups_dir: &Path, prefix: &str, keep: usize, bytes: &[u8]) -> Result<(), std::io::Error> {
    fs::create_dir_all(backups_dir)?;
    let ts = Utc::now().format(BACKUP_TS_FORMAT);
    let backup_path = backups_dir.join(format!("{prefix}{ts}.json"));
    write_atomic(&backup_path, bytes)?;
    rotate_backups(backups_dir, prefix, keep)
}

/// True for `<prefix><timestamp>.json` and nothing else, so `cards-` never
/// claims `cards-old-<timestamp>.json`.
fn is_backup_of(name: &str, prefix: &str) -> bool {
    name.strip_prefix(prefix)
        .and_then(|rest| rest.strip_suffix(".json"))
        .map(|ts| {
            ts.len() == "20240101-000000.000".len()
                && ts.chars().all(|c| c.is_ascii_digit() || c == '-' || c == '.')
        })
        .unwrap_or(false)
}

fn rotate_backups(dir: &Path, prefix: &str, keep: usize) -> Result<(), std::io::Error> {
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .map(|n| is_backup_of(n, prefix))
                .unwrap_or(false)
        })
        .collect();
    // Timestamped names sort chronologically.
    entries.sort();
    if entries.len() > keep {
        for p in &entries[0..entries.len() - keep] {
            if let Err(e) = fs::remove_file(p) {
                warn!(path = %p.display(), error = %e, "could not remove old backup");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use recall_core::{CardStore, ReviewPatch};
    use tempfile::tempdir;

    fn store_in(dir: &Path, keep: usize) -> JsonStore {
        JsonStore::open_with(dir.join("data/cards.json"), dir.join("backups"), keep).unwrap()
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempdir().unwrap();
        let s = store_in(dir.path(), 3);
        assert!(s.load().unwrap().is_empty());
    }

    #[test]
    fn saves_and_reloads_through_card_store() {
        let dir = tempdir().unwrap();
        let t = Utc.with_ymd_and_hms(2024, 2, 2, 10, 0, 0).unwrap();
        {
            let mut store = CardStore::open(store_in(dir.path(), 3)).unwrap();
            store
                .extend(vec![Card::with_id("1", "q1", "a1"), Card::with_id("2", "q2", "a2")])
                .unwrap();
            store
                .update(
                    "2",
                    ReviewPatch {
                        last_reviewed_at: Some(t),
                        next_review_at: Some(t + chrono::Duration::hours(8)),
                        correct_streak: 1,
                    },
                )
                .unwrap();
        }
        let store = CardStore::open(store_in(dir.path(), 3)).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.get_all()[0].id, "1");
        assert!(store.get("1").unwrap().next_review_at.is_none());
        assert_eq!(store.get("2").unwrap().correct_streak, 1);
        assert_eq!(store.get("2").unwrap().last_reviewed_at, Some(t));
    }

    #[test]
    fn absent_timestamps_written_as_null() {
        let dir = tempdir().unwrap();
        let s = store_in(dir.path(), 3);
        s.save(&[Card::with_id("1", "q", "a")]).unwrap();
        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(s.path()).unwrap()).unwrap();
        assert_eq!(raw["version"], 1);
        assert!(raw["cards"][0]["next_review_at"].is_null());
    }

    #[test]
    fn backups_are_rotated() {
        let dir = tempdir().unwrap();
        let s = store_in(dir.path(), 2);
        for i in 0..5 {
            s.save(&[Card::with_id(i.to_string(), "q", "a")]).unwrap();
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        let n = fs::read_dir(s.backups_dir()).unwrap().count();
        assert_eq!(n, 2);
    }

    #[test]
    fn data_files_sharing_a_backups_dir_rotate_separately() {
        let dir = tempdir().unwrap();
        let backups = dir.path().join("backups");
        let main = JsonStore::open_with(dir.path().join("main.json"), backups.clone(), 2).unwrap();
        let scratch = JsonStore::open_with(dir.path().join("scratch.json"), backups.clone(), 2).unwrap();

        for i in 0..2 {
            main.save(&[Card::with_id(i.to_string(), "q", "a")]).unwrap();
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        for i in 0..3 {
            scratch.save(&[Card::with_id(i.to_string(), "q", "a")]).unwrap();
            std::thread::sleep(std::time::Duration::from_millis(5));
        }

        let names: Vec<String> = fs::read_dir(&backups)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.iter().filter(|n| n.starts_with("main-")).count(), 2);
        assert_eq!(names.iter().filter(|n| n.starts_with("scratch-")).count(), 2);
    }

    #[test]
    fn backup_names_match_only_their_own_stem() {
        assert!(is_backup_of("cards-20240202-100000.123.json", "cards-"));
        assert!(!is_backup_of("cards-old-20240202-100000.123.json", "cards-"));
        assert!(!is_backup_of("scratch-20240202-100000.123.json", "cards-"));
        assert!(!is_backup_of("cards-20240202-100000.123.json.tmp", "cards-"));
    }

    #[test]
    fn corrupt_file_is_storage_error() {
        let dir = tempdir().unwrap();
        let s = store_in(dir.path(), 2);
        fs::write(s.path(), "{ not json").unwrap();
        assert!(matches!(s.load(), Err(CoreError::Storage(_))));
    }
}
