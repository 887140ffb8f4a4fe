//! Correction history and learned suppression rules.
//!
//! Records are append-only and owned here; rules are upserted and
//! persisted as a JSON document that survives restart. A failed write is
//! logged and retried on the next write while the in-memory state keeps
//! governing the session.

use std::collections::{BTreeMap, VecDeque};
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// Undos of one normalized pattern before every strategy is disabled
/// for it.
pub const SUPPRESS_AFTER: u32 = 3;

const HISTORY_CAP: usize = 50;

/// One applied correction. Immutable after creation; undo counts live
/// in [`RuleStore`], keyed by the original text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CorrectionRecord {
    pub original: String,
    pub replacement: String,
    /// Boundary that triggered the correction; `None` for polish.
    pub boundary: Option<char>,
    pub span_start: u64,
    pub span_end: u64,
    pub timestamp: SystemTime,
}

impl CorrectionRecord {
    pub fn new(
        original: &str,
        replacement: &str,
        boundary: Option<char>,
        span: (u64, u64),
    ) -> Self {
        Self {
            original: original.to_string(),
            replacement: replacement.to_string(),
            boundary,
            span_start: span.0,
            span_end: span.1,
            timestamp: SystemTime::now(),
        }
    }
}

/// Recent corrections, newest last. Bounded window, not a keystroke log.
#[derive(Debug)]
pub struct UndoStack {
    records: VecDeque<CorrectionRecord>,
    cap: usize,
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}

impl UndoStack {
    pub fn new() -> Self {
        Self {
            records: VecDeque::with_capacity(HISTORY_CAP),
            cap: HISTORY_CAP,
        }
    }

    pub fn push(&mut self, record: CorrectionRecord) {
        self.records.push_back(record);
        while self.records.len() > self.cap.max(1) {
            let _ = self.records.pop_front();
        }
    }

    pub fn pop(&mut self) -> Option<CorrectionRecord> {
        self.records.pop_back()
    }

    pub fn peek(&self) -> Option<&CorrectionRecord> {
        self.records.back()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn save(&self, path: &Path) -> io::Result<()> {
        let records: Vec<&CorrectionRecord> = self.records.iter().collect();
        write_json_exclusive(path, &records)
    }

    pub fn load(path: &Path) -> io::Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let records: Vec<CorrectionRecord> = serde_json::from_str(&data).map_err(io::Error::other)?;
        let mut stack = Self::new();
        for r in records {
            stack.push(r);
        }
        Ok(stack)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuppressionRule {
    pub trigger_count: u32,
    pub created_at: SystemTime,
}

fn normalize(pattern: &str) -> String {
    pattern.trim().to_lowercase()
}

/// Learned suppression rules keyed by normalized original text.
///
/// Counts are monotonic; only an explicit `clear` resets them.
#[derive(Debug, Default)]
pub struct RuleStore {
    rules: BTreeMap<String, SuppressionRule>,
    path: Option<PathBuf>,
    /// Set when the last persist failed; the next write retries.
    dirty: bool,
}

impl RuleStore {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Loads rules from `path`, starting empty when the file does not
    /// exist or cannot be parsed.
    pub fn open(path: &Path) -> Self {
        let rules = match std::fs::read_to_string(path) {
            Ok(data) => serde_json::from_str(&data).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "rule store unreadable, starting empty");
                BTreeMap::new()
            }),
            Err(_) => BTreeMap::new(),
        };

        Self {
            rules,
            path: Some(path.to_path_buf()),
            dirty: false,
        }
    }

    /// Records one undo of `original`. Returns true when the pattern
    /// just crossed the suppression threshold.
    pub fn record_undo(&mut self, original: &str) -> bool {
        let key = normalize(original);
        let rule = self.rules.entry(key.clone()).or_insert(SuppressionRule {
            trigger_count: 0,
            created_at: SystemTime::now(),
        });
        rule.trigger_count += 1;
        let newly_suppressed = rule.trigger_count == SUPPRESS_AFTER;

        if newly_suppressed {
            tracing::info!(pattern = %key, "learned suppression rule");
        }
        self.persist();
        newly_suppressed
    }

    pub fn is_suppressed(&self, text: &str) -> bool {
        self.rules
            .get(&normalize(text))
            .is_some_and(|r| r.trigger_count >= SUPPRESS_AFTER)
    }

    pub fn undo_count(&self, text: &str) -> u32 {
        self.rules
            .get(&normalize(text))
            .map_or(0, |r| r.trigger_count)
    }

    pub fn clear(&mut self) {
        self.rules.clear();
        self.persist();
    }

    fn persist(&mut self) {
        let Some(path) = &self.path else {
            return;
        };
        match write_json_exclusive(path, &self.rules) {
            Ok(()) => self.dirty = false,
            Err(e) => {
                // In-memory state still governs this session.
                tracing::warn!(path = %path.display(), error = %e, "rule store write failed");
                self.dirty = true;
            }
        }
    }
}

/// Writes a JSON document via a temp file and rename so a concurrent
/// reader never observes a partial write.
fn write_json_exclusive<T: Serialize>(path: &Path, value: &T) -> io::Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }

    let data = serde_json::to_vec_pretty(value).map_err(io::Error::other)?;
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, data)?;
    std::fs::rename(&tmp, path)
}
