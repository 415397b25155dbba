//! The note store: sole authority over the note collection and its durable
//! snapshot.
//!
//! All state lives in memory as a `Vec<Note>` in newest-first display
//! order. Every mutating operation rewrites the whole collection to a
//! single JSON snapshot file immediately afterwards; a failed write is
//! logged and the in-memory state stays authoritative for the session.

use std::{
    collections::BTreeSet,
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use chrono::{Days, Utc};
use fuzzy_matcher::{skim::SkimMatcherV2, FuzzyMatcher};
use log::{debug, error, info, warn};
use tempfile::NamedTempFile;

use crate::{AgendaError, Config, Note, NoteDraft, Result, Todo};

/// Summary of an import operation
#[derive(Debug, Clone)]
pub struct ImportSummary {
    /// Path of the file that was imported
    pub source: PathBuf,
    /// Number of notes found in the file
    pub total: usize,
    /// Number of notes that had to be given a fresh id because their id
    /// collided with a note already in the store
    pub remapped: usize,
}

/// Manages the storage, retrieval and persistence of notes.
pub struct NoteStore {
    /// Application configuration
    config: Config,

    /// The live collection, newest first
    notes: Vec<Note>,
}

impl NoteStore {
    /// Opens the store, loading the snapshot from `config.data_file`.
    ///
    /// If the snapshot is missing or fails to parse this is non-fatal: the
    /// store starts from the example seed notes (or empty, if seeding is
    /// disabled) and the failure is logged.
    pub fn open(config: Config) -> Self {
        let notes = match load_snapshot(&config.data_file) {
            Ok(mut notes) => {
                notes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                info!(
                    "Loaded {} notes from {}",
                    notes.len(),
                    config.data_file.display()
                );
                notes
            }
            Err(e) => {
                warn!(
                    "Could not load snapshot {}: {}",
                    config.data_file.display(),
                    e
                );
                if config.seed_examples {
                    info!("Starting with example notes");
                    seed_notes()
                } else {
                    Vec::new()
                }
            }
        };

        Self { config, notes }
    }

    /// The live collection, newest first, archived notes included.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Non-archived notes, newest first. This is what default views show.
    pub fn active(&self) -> Vec<&Note> {
        self.notes.iter().filter(|n| !n.is_archived).collect()
    }

    /// Looks up a note by id. Reaches archived notes too.
    pub fn get(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    fn contains(&self, id: &str) -> bool {
        self.notes.iter().any(|n| n.id == id)
    }

    /// Creates a note from the draft, assigning a unique id, the current
    /// timestamp and fresh todo ids, and prepends it to the collection.
    pub fn add(&mut self, draft: NoteDraft) -> &Note {
        let now = Utc::now();
        let id = self.unique_id(format!(
            "{}-{}",
            now.timestamp_millis(),
            slugify(&draft.title)
        ));

        let todos = draft
            .todos
            .into_iter()
            .enumerate()
            .map(|(i, text)| Todo::new(format!("t-{}-{}", now.timestamp_millis(), i), text))
            .collect();

        let note = Note {
            id,
            title: draft.title,
            content: draft.content,
            tags: draft.tags,
            todos,
            created_at: now,
            reminder: draft.reminder,
            is_archived: false,
        };

        info!("Created note: {}", note.id);
        self.notes.insert(0, note);
        self.persist();
        &self.notes[0]
    }

    /// Replaces the stored note with matching id by the supplied value,
    /// keeping its position in the collection. `createdAt` is immutable
    /// and retained from the stored note. No-op if the id is unknown
    /// (deleted notes cannot be resurrected this way).
    pub fn update(&mut self, note: Note) -> bool {
        match self.notes.iter_mut().find(|n| n.id == note.id) {
            Some(slot) => {
                let created_at = slot.created_at;
                let id = note.id.clone();
                *slot = note;
                slot.created_at = created_at;
                debug!("Updated note: {}", id);
                self.persist();
                true
            }
            None => {
                debug!("Update ignored, no note with id {}", note.id);
                false
            }
        }
    }

    /// Removes the note with matching id, if present.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.notes.len();
        self.notes.retain(|n| n.id != id);
        if self.notes.len() == before {
            debug!("Delete ignored, no note with id {}", id);
            return false;
        }
        info!("Deleted note: {}", id);
        self.persist();
        true
    }

    /// Flips the `completed` flag of a single checklist item. Any other
    /// todo is unaffected. No-op if either id is unknown.
    pub fn toggle_todo(&mut self, note_id: &str, todo_id: &str) -> bool {
        let Some(note) = self.notes.iter_mut().find(|n| n.id == note_id) else {
            debug!("Toggle ignored, no note with id {}", note_id);
            return false;
        };
        let Some(todo) = note.todos.iter_mut().find(|t| t.id == todo_id) else {
            debug!("Toggle ignored, note {} has no todo {}", note_id, todo_id);
            return false;
        };
        todo.completed = !todo.completed;
        self.persist();
        true
    }

    /// Appends a checklist item to a note, assigning it an id distinct
    /// from every existing todo on that note. Removing and re-adding
    /// within the same millisecond must not reuse an id.
    pub fn add_todo(&mut self, note_id: &str, text: String) -> Option<&Todo> {
        let note = self.notes.iter_mut().find(|n| n.id == note_id)?;
        let millis = Utc::now().timestamp_millis();
        let mut suffix = note.todos.len();
        let id = loop {
            let candidate = format!("t-{}-{}", millis, suffix);
            if !note.todos.iter().any(|t| t.id == candidate) {
                break candidate;
            }
            suffix += 1;
        };
        note.todos.push(Todo::new(id, text));
        self.persist();
        let note = self.notes.iter().find(|n| n.id == note_id)?;
        note.todos.last()
    }

    /// Removes a checklist item from a note.
    pub fn remove_todo(&mut self, note_id: &str, todo_id: &str) -> bool {
        let Some(note) = self.notes.iter_mut().find(|n| n.id == note_id) else {
            return false;
        };
        let before = note.todos.len();
        note.todos.retain(|t| t.id != todo_id);
        if note.todos.len() == before {
            return false;
        }
        self.persist();
        true
    }

    /// Hides a note from default views without deleting it.
    pub fn archive(&mut self, id: &str) -> bool {
        self.set_archived(id, true)
    }

    /// Returns an archived note to the default views.
    pub fn unarchive(&mut self, id: &str) -> bool {
        self.set_archived(id, false)
    }

    fn set_archived(&mut self, id: &str, archived: bool) -> bool {
        match self.notes.iter_mut().find(|n| n.id == id) {
            Some(note) => {
                note.is_archived = archived;
                debug!("Set isArchived={} on note {}", archived, id);
                self.persist();
                true
            }
            None => {
                debug!("Archive change ignored, no note with id {}", id);
                false
            }
        }
    }

    /// Searches notes by title and content using fuzzy matching.
    /// Returns matching notes sorted by relevance; archived notes are
    /// excluded.
    pub fn search(&self, query: &str) -> Vec<&Note> {
        let matcher = SkimMatcherV2::default();

        struct ScoredNote<'a> {
            note: &'a Note,
            score: i64,
        }

        let mut matched: Vec<ScoredNote> = Vec::new();
        for note in self.notes.iter().filter(|n| !n.is_archived) {
            // Title matches are weighted more heavily than content matches
            let title_score = matcher.fuzzy_match(&note.title, query).unwrap_or(0);
            let content_score = matcher.fuzzy_match(&note.content, query).unwrap_or(0);
            let score = title_score * 2 + content_score;

            if score > 0 {
                matched.push(ScoredNote { note, score });
            }
        }

        matched.sort_by(|a, b| b.score.cmp(&a.score));
        debug!("Search '{}' matched {} notes", query, matched.len());
        matched.into_iter().map(|scored| scored.note).collect()
    }

    /// Fuzzy search restricted to notes carrying the given tag.
    /// Matching semantics and relevance ordering are the same as
    /// [`search`](Self::search).
    pub fn search_with_tag(&self, tag: &str, query: &str) -> Vec<&Note> {
        let search_tag = tag.trim().to_lowercase();
        self.search(query)
            .into_iter()
            .filter(|n| n.tags.iter().any(|t| t.trim().to_lowercase() == search_tag))
            .collect()
    }

    /// Retrieves all non-archived notes carrying the given tag
    /// (case-insensitive).
    pub fn notes_with_tag(&self, tag: &str) -> Vec<&Note> {
        let search_tag = tag.trim().to_lowercase();
        self.notes
            .iter()
            .filter(|n| !n.is_archived)
            .filter(|n| n.tags.iter().any(|t| t.trim().to_lowercase() == search_tag))
            .collect()
    }

    /// Every tag in the collection, sorted and deduplicated. Archived
    /// notes contribute too, so renames reach them.
    pub fn all_tags(&self) -> Vec<String> {
        let tags: BTreeSet<String> = self
            .notes
            .iter()
            .flat_map(|n| n.tags.iter().cloned())
            .collect();
        tags.into_iter().collect()
    }

    /// Renames a tag across every note that carries it. Returns the number
    /// of notes touched.
    pub fn rename_tag(&mut self, old: &str, new: &str) -> usize {
        let new = new.trim();
        if new.is_empty() || new == old {
            return 0;
        }

        let mut touched = 0;
        for note in &mut self.notes {
            if note.tags.iter().any(|t| t == old) {
                for tag in &mut note.tags {
                    if tag == old {
                        *tag = new.to_string();
                    }
                }
                dedup_preserving_order(&mut note.tags);
                touched += 1;
            }
        }

        if touched > 0 {
            info!("Renamed tag '{}' to '{}' on {} notes", old, new, touched);
            self.persist();
        }
        touched
    }

    /// Removes a tag from every note that carries it. Returns the number
    /// of notes touched.
    pub fn remove_tag(&mut self, tag: &str) -> usize {
        let mut touched = 0;
        for note in &mut self.notes {
            let before = note.tags.len();
            note.tags.retain(|t| t != tag);
            if note.tags.len() != before {
                touched += 1;
            }
        }

        if touched > 0 {
            info!("Removed tag '{}' from {} notes", tag, touched);
            self.persist();
        }
        touched
    }

    /// Writes the full collection to `path` as a JSON array, the same
    /// layout the snapshot uses.
    pub fn export_to(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.notes)?;
        fs::write(path, json)?;
        info!("Exported {} notes to {}", self.notes.len(), path.display());
        Ok(())
    }

    /// Imports a JSON array of notes, merging each into the store with
    /// add-like semantics.
    ///
    /// The whole file is validated up front; a payload that fails to parse
    /// aborts the import with no partial merge. Imported notes keep their
    /// id and `createdAt`; a note whose id collides with one already in
    /// the store is admitted under a freshly generated id.
    pub fn import_from(&mut self, path: &Path) -> Result<ImportSummary> {
        let raw = fs::read_to_string(path).map_err(|e| AgendaError::ImportFailed {
            message: format!("Failed to read {}: {}", path.display(), e),
        })?;

        let incoming: Vec<Note> =
            serde_json::from_str(&raw).map_err(|e| AgendaError::ImportFailed {
                message: format!("Malformed import payload: {}", e),
            })?;

        let total = incoming.len();
        let mut remapped = 0;

        for mut note in incoming {
            if self.contains(&note.id) {
                let fresh = self.unique_id(format!(
                    "{}-{}",
                    Utc::now().timestamp_millis(),
                    slugify(&note.title)
                ));
                debug!("Import id collision on {}, remapped to {}", note.id, fresh);
                note.id = fresh;
                remapped += 1;
            }
            self.notes.insert(0, note);
        }

        if total > 0 {
            self.persist();
        }

        info!(
            "Imported {} notes from {} ({} remapped)",
            total,
            path.display(),
            remapped
        );

        Ok(ImportSummary {
            source: path.to_path_buf(),
            total,
            remapped,
        })
    }

    /// Derives an id that is not yet taken in the live collection.
    fn unique_id(&self, base: String) -> String {
        if !self.contains(&base) {
            return base;
        }
        let mut n = 1;
        loop {
            let candidate = format!("{}-{}", base, n);
            if !self.contains(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Serializes the collection to the snapshot file. Failure is logged
    /// and swallowed: the in-memory state remains the source of truth for
    /// the session.
    fn persist(&self) {
        if let Err(e) = self.write_snapshot() {
            error!(
                "Failed to persist snapshot to {}: {}",
                self.config.data_file.display(),
                e
            );
        }
    }

    /// Atomic snapshot write: temp file in the target directory, then
    /// rename, so a failed write never truncates the previous snapshot.
    fn write_snapshot(&self) -> Result<()> {
        let path = &self.config.data_file;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut temp_file = NamedTempFile::new_in(dir)?;

        let json = serde_json::to_string_pretty(&self.notes)?;
        temp_file.write_all(json.as_bytes())?;
        temp_file.flush()?;
        temp_file
            .persist(path)
            .map_err(|e| AgendaError::Io(e.error))?;

        Ok(())
    }
}

/// Loads the snapshot file, if it exists and parses.
fn load_snapshot(path: &Path) -> Result<Vec<Note>> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn slugify(title: &str) -> String {
    title.to_lowercase().replace(' ', "-")
}

fn dedup_preserving_order(tags: &mut Vec<String>) {
    let mut seen = BTreeSet::new();
    tags.retain(|t| seen.insert(t.clone()));
}

/// Two example notes shown on first use, before any snapshot exists.
fn seed_notes() -> Vec<Note> {
    let now = Utc::now();
    let yesterday = now.checked_sub_days(Days::new(1)).unwrap_or(now);

    vec![
        Note {
            id: "example-note-2".to_string(),
            title: "Shopping List".to_string(),
            content: "Weekly groceries.".to_string(),
            tags: vec!["personal".to_string()],
            todos: vec![
                Todo {
                    id: "t2-1".to_string(),
                    text: "Milk".to_string(),
                    completed: true,
                },
                Todo {
                    id: "t2-2".to_string(),
                    text: "Bread".to_string(),
                    completed: true,
                },
                Todo {
                    id: "t2-3".to_string(),
                    text: "Eggs".to_string(),
                    completed: false,
                },
            ],
            created_at: now,
            reminder: None,
            is_archived: false,
        },
        Note {
            id: "example-note-1".to_string(),
            title: "Project Idea".to_string(),
            content: "A note-taking app with brutalist design principles. \
                      Raw concrete, sharp edges, function first."
                .to_string(),
            tags: vec!["development".to_string(), "design".to_string()],
            todos: vec![
                Todo {
                    id: "t1-1".to_string(),
                    text: "Pick the color palette".to_string(),
                    completed: true,
                },
                Todo {
                    id: "t1-2".to_string(),
                    text: "Choose the typography".to_string(),
                    completed: false,
                },
            ],
            created_at: yesterday,
            reminder: None,
            is_archived: false,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_store(dir: &TempDir) -> NoteStore {
        let config = Config {
            data_file: dir.path().join("notes.json"),
            seed_examples: false,
            editor_command: None,
        };
        NoteStore::open(config)
    }

    fn draft(title: &str) -> NoteDraft {
        NoteDraft {
            title: title.to_string(),
            content: "body".to_string(),
            ..NoteDraft::default()
        }
    }

    #[test]
    fn add_assigns_unique_ids() {
        let dir = TempDir::new().unwrap();
        let mut store = test_store(&dir);

        for _ in 0..50 {
            store.add(draft("same title"));
        }

        let mut ids: Vec<&str> = store.notes().iter().map(|n| n.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 50);
    }

    #[test]
    fn add_prepends_newest_first() {
        let dir = TempDir::new().unwrap();
        let mut store = test_store(&dir);

        store.add(draft("first"));
        store.add(draft("second"));

        assert_eq!(store.notes()[0].title, "second");
        assert_eq!(store.notes()[1].title, "first");
    }

    #[test]
    fn todo_ids_stay_unique_across_remove_and_re_add() {
        let dir = TempDir::new().unwrap();
        let mut store = test_store(&dir);

        let id = store
            .add(NoteDraft {
                title: "with todos".to_string(),
                todos: vec!["one".to_string(), "two".to_string(), "three".to_string()],
                ..NoteDraft::default()
            })
            .id
            .clone();

        // Shrinking the list and re-adding in quick succession must not
        // hand out an id already in use
        for round in 0..10 {
            let first = store.get(&id).unwrap().todos[0].id.clone();
            assert!(store.remove_todo(&id, &first));
            assert!(store.add_todo(&id, format!("item {}", round)).is_some());

            let ids: Vec<String> = store
                .get(&id)
                .unwrap()
                .todos
                .iter()
                .map(|t| t.id.clone())
                .collect();
            let unique: BTreeSet<&String> = ids.iter().collect();
            assert_eq!(unique.len(), ids.len(), "duplicate todo id in {:?}", ids);
        }
    }

    #[test]
    fn toggle_todo_is_an_involution() {
        let dir = TempDir::new().unwrap();
        let mut store = test_store(&dir);

        let id = store
            .add(NoteDraft {
                title: "with todos".to_string(),
                todos: vec!["one".to_string(), "two".to_string()],
                ..NoteDraft::default()
            })
            .id
            .clone();

        let todo_id = store.get(&id).unwrap().todos[0].id.clone();
        let other_id = store.get(&id).unwrap().todos[1].id.clone();

        assert!(store.toggle_todo(&id, &todo_id));
        assert!(store.get(&id).unwrap().todos[0].completed);
        // The other todo is unaffected
        assert!(!store.get(&id).unwrap().todos[1].completed);

        assert!(store.toggle_todo(&id, &todo_id));
        assert!(!store.get(&id).unwrap().todos[0].completed);

        // Unknown ids are no-ops
        assert!(!store.toggle_todo(&id, "no-such-todo"));
        assert!(!store.toggle_todo("no-such-note", &other_id));
    }

    #[test]
    fn deleted_notes_cannot_be_resurrected_by_update() {
        let dir = TempDir::new().unwrap();
        let mut store = test_store(&dir);

        let note = store.add(draft("doomed")).clone();
        assert!(store.delete(&note.id));
        assert!(!store.update(note.clone()));
        assert!(store.get(&note.id).is_none());
    }

    #[test]
    fn update_replaces_in_place_and_keeps_created_at() {
        let dir = TempDir::new().unwrap();
        let mut store = test_store(&dir);

        store.add(draft("oldest"));
        let mut note = store.add(draft("target")).clone();
        store.add(draft("newest"));

        let original_created_at = note.created_at;
        note.title = "renamed".to_string();
        note.created_at = Utc::now();
        assert!(store.update(note));

        // Position unchanged, createdAt untouched
        assert_eq!(store.notes()[1].title, "renamed");
        assert_eq!(store.notes()[1].created_at, original_created_at);
    }

    #[test]
    fn archive_roundtrip_preserves_other_fields() {
        let dir = TempDir::new().unwrap();
        let mut store = test_store(&dir);

        let original = store
            .add(NoteDraft {
                title: "keep me".to_string(),
                content: "text".to_string(),
                tags: vec!["a".to_string()],
                todos: vec!["x".to_string()],
                reminder: None,
            })
            .clone();

        assert!(store.archive(&original.id));
        assert!(store.get(&original.id).unwrap().is_archived);
        // Archived notes leave the default view but stay reachable
        assert!(store.active().iter().all(|n| n.id != original.id));

        assert!(store.unarchive(&original.id));
        assert_eq!(*store.get(&original.id).unwrap(), original);
    }

    #[test]
    fn search_skips_archived_notes() {
        let dir = TempDir::new().unwrap();
        let mut store = test_store(&dir);

        let id = store.add(draft("findable title")).id.clone();
        assert_eq!(store.search("findable").len(), 1);

        store.archive(&id);
        assert!(store.search("findable").is_empty());
    }

    #[test]
    fn tag_scoped_search_uses_fuzzy_matching() {
        let dir = TempDir::new().unwrap();
        let mut store = test_store(&dir);

        let mut tagged = draft("grocery planning");
        tagged.tags = vec!["errands".to_string()];
        let tagged_id = store.add(tagged).id.clone();
        store.add(draft("grocery planning")); // same title, no tag

        // "grcpln" is a fuzzy match, not a substring
        assert_eq!(store.search("grcpln").len(), 2);
        let scoped = store.search_with_tag("errands", "grcpln");
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0].id, tagged_id);

        assert!(store.search_with_tag("errands", "unrelated").is_empty());
    }

    #[test]
    fn tag_rename_and_remove_touch_every_note() {
        let dir = TempDir::new().unwrap();
        let mut store = test_store(&dir);

        store.add(NoteDraft {
            title: "a".to_string(),
            tags: vec!["work".to_string(), "urgent".to_string()],
            ..NoteDraft::default()
        });
        store.add(NoteDraft {
            title: "b".to_string(),
            tags: vec!["work".to_string()],
            ..NoteDraft::default()
        });

        assert_eq!(store.rename_tag("work", "office"), 2);
        assert_eq!(store.all_tags(), vec!["office", "urgent"]);

        assert_eq!(store.remove_tag("office"), 2);
        assert_eq!(store.all_tags(), vec!["urgent"]);
    }

    #[test]
    fn rename_tag_does_not_duplicate_existing_tag() {
        let dir = TempDir::new().unwrap();
        let mut store = test_store(&dir);

        let id = store
            .add(NoteDraft {
                title: "a".to_string(),
                tags: vec!["work".to_string(), "office".to_string()],
                ..NoteDraft::default()
            })
            .id
            .clone();

        store.rename_tag("work", "office");
        assert_eq!(store.get(&id).unwrap().tags, vec!["office"]);
    }

    #[test]
    fn snapshot_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            data_file: dir.path().join("notes.json"),
            seed_examples: false,
            editor_command: None,
        };

        let mut store = NoteStore::open(config.clone());
        let id = store.add(draft("durable")).id.clone();
        drop(store);

        let reopened = NoteStore::open(config);
        assert_eq!(reopened.notes().len(), 1);
        assert_eq!(reopened.get(&id).unwrap().title, "durable");
    }

    #[test]
    fn missing_snapshot_seeds_examples() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            data_file: dir.path().join("notes.json"),
            seed_examples: true,
            editor_command: None,
        };

        let store = NoteStore::open(config);
        assert_eq!(store.notes().len(), 2);
        // Seeds come out newest-first
        assert_eq!(store.notes()[0].title, "Shopping List");
    }

    #[test]
    fn malformed_import_aborts_without_partial_merge() {
        let dir = TempDir::new().unwrap();
        let mut store = test_store(&dir);
        store.add(draft("existing"));

        let bad = dir.path().join("bad.json");
        fs::write(&bad, r#"[{"id": "x", "title": "no content field"}]"#).unwrap();

        let err = store.import_from(&bad).unwrap_err();
        assert!(matches!(err, AgendaError::ImportFailed { .. }));
        assert_eq!(store.notes().len(), 1);
    }

    #[test]
    fn import_remaps_colliding_ids() {
        let dir = TempDir::new().unwrap();
        let mut store = test_store(&dir);
        let existing = store.add(draft("existing")).clone();

        let payload = dir.path().join("dup.json");
        store.export_to(&payload).unwrap();

        let summary = store.import_from(&payload).unwrap();
        assert_eq!(summary.total, 1);
        assert_eq!(summary.remapped, 1);
        assert_eq!(store.notes().len(), 2);

        let mut ids: Vec<&str> = store.notes().iter().map(|n| n.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 2);
        assert!(store.get(&existing.id).is_some());
    }
}
