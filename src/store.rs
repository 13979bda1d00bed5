use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context as ErrContext, Result};
use serde::{Deserialize, Serialize};

/// Seconds a finished or cancelled shift stays on the board
/// before the sweep removes it
pub const AUTO_REMOVE_DELAY_SECS: i64 = 30 * 60;

/// User facing rejections. Reported as info, not as errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShiftError {
    NotFound(String),
    InvalidTime(String),
    NoPermission,
}

impl std::fmt::Display for ShiftError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(title) => write!(f, "Shift not found: {}", title),
            Self::InvalidTime(input) => write!(
                f,
                "Invalid time format: {}. Use: YYYY-MM-DD HH:MM or HH:MM",
                input
            ),
            Self::NoPermission => write!(f, "You do not have permission to use this command"),
        }
    }
}

impl std::error::Error for ShiftError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShiftStatus {
    Planned,
    Canceled,
    Completed,
}

impl ShiftStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Planned)
    }
}

impl std::fmt::Display for ShiftStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Planned => write!(f, "Planned"),
            Self::Canceled => write!(f, "Canceled"),
            Self::Completed => write!(f, "Completed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shift {
    pub title: String,
    pub scheduled_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_id: Option<u64>,
    pub status: ShiftStatus,
    /// Unix seconds after which the sweep drops this record.
    /// Only set once the status is terminal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_remove_at: Option<i64>,
}

/// The persisted document. Shape:
/// `{ "boardMessageId": u64|null, "shifts": [..] }`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardState {
    pub board_message_id: Option<u64>,
    pub shifts: Vec<Shift>,
}

/// Owns the in memory shift list and the JSON file backing it.
/// Every mutating method persists before returning
#[derive(Debug)]
pub struct ShiftStore {
    path: PathBuf,
    state: BoardState,
}

impl ShiftStore {
    /// Missing file counts as a fresh install and yields the empty state
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let state = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw)
                .with_context(|| format!("Corrupt shift data in {}", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BoardState::default(),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()))
            }
        };
        Ok(Self { path, state })
    }

    // Write to a sibling tmp file first so a crash mid write
    // never leaves a truncated document behind
    fn persist(&self) -> Result<()> {
        let tmp = self.path.with_extension("json.tmp");
        let raw = serde_json::to_string_pretty(&self.state)?;
        fs::write(&tmp, raw).with_context(|| format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;
        Ok(())
    }

    pub fn shifts(&self) -> &[Shift] {
        &self.state.shifts
    }

    pub fn planned_count(&self) -> usize {
        self.state
            .shifts
            .iter()
            .filter(|s| !s.status.is_terminal())
            .count()
    }

    pub fn board_message_id(&self) -> Option<u64> {
        self.state.board_message_id
    }

    pub fn set_board_message_id(&mut self, id: Option<u64>) -> Result<()> {
        self.state.board_message_id = id;
        self.persist()
    }

    pub fn create(&mut self, title: String, scheduled_at: i64, host_id: Option<u64>) -> Result<&Shift> {
        self.state.shifts.push(Shift {
            title,
            scheduled_at,
            host_id,
            status: ShiftStatus::Planned,
            auto_remove_at: None,
        });
        self.persist()?;
        Ok(self.state.shifts.last().unwrap())
    }

    /// Marks the first shift with this title as Completed and stamps
    /// its removal deadline
    pub fn end(&mut self, title: &str, now: i64) -> Result<&Shift> {
        self.transition(title, ShiftStatus::Completed, now)
    }

    /// Marks the first shift with this title as Canceled and stamps
    /// its removal deadline
    pub fn cancel(&mut self, title: &str, now: i64) -> Result<&Shift> {
        self.transition(title, ShiftStatus::Canceled, now)
    }

    fn transition(&mut self, title: &str, status: ShiftStatus, now: i64) -> Result<&Shift> {
        let idx = self
            .state
            .shifts
            .iter()
            .position(|s| s.title == title)
            .ok_or_else(|| ShiftError::NotFound(title.to_owned()))?;
        {
            let shift = &mut self.state.shifts[idx];
            shift.status = status;
            shift.auto_remove_at = Some(now + AUTO_REMOVE_DELAY_SECS);
        }
        self.persist()?;
        Ok(&self.state.shifts[idx])
    }

    pub fn clear(&mut self) -> Result<usize> {
        let removed = self.state.shifts.len();
        self.state.shifts.clear();
        self.persist()?;
        Ok(removed)
    }

    /// Drops every shift whose removal deadline has passed and
    /// returns them. Persists only when something was removed
    pub fn sweep_due(&mut self, now: i64) -> Result<Vec<Shift>> {
        let mut removed = Vec::new();
        let mut kept = Vec::with_capacity(self.state.shifts.len());
        for shift in self.state.shifts.drain(..) {
            match shift.auto_remove_at {
                Some(at) if at <= now => removed.push(shift),
                _ => kept.push(shift),
            }
        }
        self.state.shifts = kept;
        if !removed.is_empty() {
            self.persist()?;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestFile(PathBuf);

    impl TestFile {
        fn new(name: &str) -> Self {
            let mut path = std::env::temp_dir();
            path.push(format!("shiftboard_{}_{}.json", name, std::process::id()));
            fs::remove_file(&path).ok();
            Self(path)
        }
    }

    impl Drop for TestFile {
        fn drop(&mut self) {
            fs::remove_file(&self.0).ok();
        }
    }

    #[test]
    fn load_missing_file_is_empty() {
        let f = TestFile::new("load_missing");
        let store = ShiftStore::load(&f.0).expect("Failed to load fresh store");
        assert!(store.shifts().is_empty());
        assert_eq!(store.board_message_id(), None);
    }

    #[test]
    fn create_appends_planned() {
        let f = TestFile::new("create");
        let mut store = ShiftStore::load(&f.0).unwrap();
        store
            .create("Night Watch".into(), 1736546400, Some(42))
            .expect("Failed to create shift");
        assert_eq!(store.shifts().len(), 1);
        let shift = &store.shifts()[0];
        assert_eq!(shift.title, "Night Watch");
        assert_eq!(shift.status, ShiftStatus::Planned);
        assert_eq!(shift.scheduled_at, 1736546400);
        assert_eq!(shift.host_id, Some(42));
        assert_eq!(shift.auto_remove_at, None);
    }

    #[test]
    fn end_unknown_title_leaves_store_unchanged() {
        let f = TestFile::new("end_unknown");
        let mut store = ShiftStore::load(&f.0).unwrap();
        store.create("Day Shift".into(), 100, None).unwrap();
        let err = store.end("Night Shift", 0).expect_err("Should not find shift");
        assert_eq!(
            err.downcast_ref::<ShiftError>(),
            Some(&ShiftError::NotFound("Night Shift".into()))
        );
        assert_eq!(store.shifts().len(), 1);
        assert_eq!(store.shifts()[0].status, ShiftStatus::Planned);
    }

    #[test]
    fn end_marks_completed_and_stamps_deadline() {
        let f = TestFile::new("end");
        let mut store = ShiftStore::load(&f.0).unwrap();
        store.create("Night Watch".into(), 100, None).unwrap();
        let shift = store.end("Night Watch", 1000).unwrap();
        assert_eq!(shift.status, ShiftStatus::Completed);
        assert_eq!(shift.auto_remove_at, Some(1000 + AUTO_REMOVE_DELAY_SECS));
    }

    #[test]
    fn cancel_marks_canceled() {
        let f = TestFile::new("cancel");
        let mut store = ShiftStore::load(&f.0).unwrap();
        store.create("Night Watch".into(), 100, None).unwrap();
        let shift = store.cancel("Night Watch", 1000).unwrap();
        assert_eq!(shift.status, ShiftStatus::Canceled);
    }

    #[test]
    fn duplicate_titles_transition_first_match_only() {
        let f = TestFile::new("dup_titles");
        let mut store = ShiftStore::load(&f.0).unwrap();
        store.create("Watch".into(), 100, None).unwrap();
        store.create("Watch".into(), 200, None).unwrap();
        store.cancel("Watch", 0).unwrap();
        assert_eq!(store.shifts()[0].status, ShiftStatus::Canceled);
        assert_eq!(store.shifts()[1].status, ShiftStatus::Planned);
    }

    #[test]
    fn clear_empties_everything() {
        let f = TestFile::new("clear");
        let mut store = ShiftStore::load(&f.0).unwrap();
        store.create("A".into(), 1, None).unwrap();
        store.create("B".into(), 2, None).unwrap();
        assert_eq!(store.clear().unwrap(), 2);
        assert!(store.shifts().is_empty());
        assert_eq!(store.clear().unwrap(), 0);
    }

    #[test]
    fn sweep_removes_only_due_records() {
        let f = TestFile::new("sweep");
        let mut store = ShiftStore::load(&f.0).unwrap();
        store.create("Due".into(), 100, None).unwrap();
        store.create("NotDue".into(), 200, None).unwrap();
        store.create("Open".into(), 300, None).unwrap();
        store.end("Due", 0).unwrap();
        store.end("NotDue", 1000).unwrap();

        let removed = store.sweep_due(AUTO_REMOVE_DELAY_SECS + 500).unwrap();
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].title, "Due");

        let titles: Vec<_> = store.shifts().iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["NotDue", "Open"]);
    }

    #[test]
    fn sweep_after_deadline_empties_ended_shift() {
        let f = TestFile::new("sweep_example");
        let mut store = ShiftStore::load(&f.0).unwrap();
        store.create("Night Watch".into(), 1736546400, None).unwrap();
        store.cancel("Night Watch", 1736546400).unwrap();
        assert_eq!(store.shifts()[0].status, ShiftStatus::Canceled);
        store
            .sweep_due(1736546400 + AUTO_REMOVE_DELAY_SECS)
            .unwrap();
        assert!(store.shifts().is_empty());
    }

    #[test]
    fn persist_and_load_round_trip() {
        let f = TestFile::new("round_trip");
        {
            let mut store = ShiftStore::load(&f.0).unwrap();
            store.create("Night Watch".into(), 1736546400, Some(7)).unwrap();
            store.create("Day Shift".into(), 1736589600, None).unwrap();
            store.end("Day Shift", 1736589600).unwrap();
            store.set_board_message_id(Some(12345)).unwrap();
        }
        let store = ShiftStore::load(&f.0).expect("Failed to reload store");
        assert_eq!(store.board_message_id(), Some(12345));
        assert_eq!(store.shifts().len(), 2);
        assert_eq!(store.shifts()[0].title, "Night Watch");
        assert_eq!(store.shifts()[0].host_id, Some(7));
        assert_eq!(store.shifts()[1].status, ShiftStatus::Completed);
        assert_eq!(
            store.shifts()[1].auto_remove_at,
            Some(1736589600 + AUTO_REMOVE_DELAY_SECS)
        );
    }

    #[test]
    fn persisted_document_uses_camel_case_keys() {
        let f = TestFile::new("camel_case");
        let mut store = ShiftStore::load(&f.0).unwrap();
        store.create("Night Watch".into(), 1736546400, Some(7)).unwrap();
        let raw = fs::read_to_string(&f.0).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert!(doc.get("boardMessageId").is_some());
        assert_eq!(doc["shifts"][0]["scheduledAt"], 1736546400);
        assert_eq!(doc["shifts"][0]["hostId"], 7);
        assert_eq!(doc["shifts"][0]["status"], "Planned");
    }
}
