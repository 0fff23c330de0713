//! JSON-document-backed ticket store implementation.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Utc;
use tracing::debug;

use super::{NewTicket, Ticket, TicketError, TicketStatus, TicketStore};

/// Ticket store backed by a single JSON document.
///
/// The full collection lives in memory; every mutation rewrites the document
/// from the entire current contents. The mutex is held across the uniqueness
/// check, id assignment, document rewrite, and map commit, so concurrent
/// writers cannot race on id assignment or clobber each other's snapshot.
#[derive(Debug)]
pub struct FileTicketStore {
    path: PathBuf,
    tickets: Mutex<HashMap<String, Ticket>>,
}

impl FileTicketStore {
    /// Open a store from an existing backing document.
    ///
    /// The document must exist and parse as a JSON array of tickets with
    /// unique numeric ids. Callers treat a failure here as fatal: the store
    /// never serves traffic over a document it could not load.
    pub fn open(path: &Path) -> Result<Self, TicketError> {
        let raw = fs::read_to_string(path).map_err(|e| {
            TicketError::Storage(format!("failed to read {}: {}", path.display(), e))
        })?;
        let records: Vec<Ticket> = serde_json::from_str(&raw).map_err(|e| {
            TicketError::Storage(format!("failed to parse {}: {}", path.display(), e))
        })?;

        // Ids are validated once here so next_id() is total afterwards.
        let mut tickets = HashMap::with_capacity(records.len());
        for ticket in records {
            if ticket.id.parse::<u64>().is_err() {
                return Err(TicketError::Storage(format!(
                    "non-numeric ticket id '{}' in {}",
                    ticket.id,
                    path.display()
                )));
            }
            let id = ticket.id.clone();
            if tickets.insert(id.clone(), ticket).is_some() {
                return Err(TicketError::Storage(format!(
                    "duplicate ticket id '{}' in {}",
                    id,
                    path.display()
                )));
            }
        }

        debug!(count = tickets.len(), path = %path.display(), "loaded ticket store");

        Ok(Self {
            path: path.to_path_buf(),
            tickets: Mutex::new(tickets),
        })
    }

    /// Next id: `"1"` for an empty store, otherwise max numeric id plus one.
    fn next_id(tickets: &HashMap<String, Ticket>) -> String {
        tickets
            .keys()
            .filter_map(|id| id.parse::<u64>().ok())
            .max()
            .map_or_else(|| "1".to_string(), |max| (max + 1).to_string())
    }

    /// Rewrite the backing document from the given collection.
    ///
    /// Writes to a temporary sibling and renames it over the document, so a
    /// crash mid-write leaves the previous contents intact.
    fn persist(&self, tickets: &HashMap<String, Ticket>) -> Result<(), TicketError> {
        let mut records: Vec<&Ticket> = tickets.values().collect();
        records.sort_by_key(|t| numeric_id(&t.id));

        let payload = serde_json::to_vec_pretty(&records)
            .map_err(|e| TicketError::Storage(format!("failed to serialize tickets: {}", e)))?;

        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, payload).map_err(|e| {
            TicketError::Storage(format!("failed to write {}: {}", tmp_path.display(), e))
        })?;
        fs::rename(&tmp_path, &self.path).map_err(|e| {
            TicketError::Storage(format!("failed to replace {}: {}", self.path.display(), e))
        })?;

        Ok(())
    }
}

/// Ids are numeric by construction: validated at load, assigned by the store
/// afterwards.
fn numeric_id(id: &str) -> u64 {
    id.parse().unwrap_or(0)
}

impl TicketStore for FileTicketStore {
    fn list(&self) -> Result<Vec<Ticket>, TicketError> {
        let tickets = self.tickets.lock().unwrap();

        let mut all: Vec<Ticket> = tickets.values().cloned().collect();
        all.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| numeric_id(&b.id).cmp(&numeric_id(&a.id)))
        });

        Ok(all)
    }

    fn get(&self, id: &str) -> Result<Option<Ticket>, TicketError> {
        let tickets = self.tickets.lock().unwrap();
        Ok(tickets.get(id).cloned())
    }

    fn create(&self, request: NewTicket) -> Result<Ticket, TicketError> {
        let mut tickets = self.tickets.lock().unwrap();

        let title_lower = request.title.to_lowercase();
        if tickets.values().any(|t| t.title.to_lowercase() == title_lower) {
            return Err(TicketError::DuplicateTitle(request.title));
        }

        let ticket = Ticket {
            id: Self::next_id(&tickets),
            title: request.title,
            description: request.description,
            status: request.status,
            created_at: Utc::now(),
        };

        // The document is rewritten before the map commit, so a failed write
        // leaves the mapping and the document consistent with each other.
        let mut updated = tickets.clone();
        updated.insert(ticket.id.clone(), ticket.clone());
        self.persist(&updated)?;
        *tickets = updated;

        Ok(ticket)
    }

    fn update_status(&self, id: &str, status: TicketStatus) -> Result<Ticket, TicketError> {
        let mut tickets = self.tickets.lock().unwrap();

        let mut ticket = match tickets.get(id) {
            Some(t) => t.clone(),
            None => return Err(TicketError::NotFound(id.to_string())),
        };
        ticket.status = status;

        let mut updated = tickets.clone();
        updated.insert(id.to_string(), ticket.clone());
        self.persist(&updated)?;
        *tickets = updated;

        Ok(ticket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed_store(contents: &str) -> (tempfile::TempDir, FileTicketStore) {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("tickets.json");
        fs::write(&path, contents).unwrap();
        let store = FileTicketStore::open(&path).unwrap();
        (temp_dir, store)
    }

    fn new_ticket(title: &str) -> NewTicket {
        NewTicket {
            title: title.to_string(),
            description: "something broke".to_string(),
            status: TicketStatus::Open,
        }
    }

    fn read_document(dir: &tempfile::TempDir) -> Vec<Ticket> {
        let raw = fs::read_to_string(dir.path().join("tickets.json")).unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    const SEEDED: &str = r#"[
        {
            "id": "1",
            "title": "Leak",
            "description": "water",
            "status": "open",
            "created_at": "2024-01-01T00:00:00Z"
        },
        {
            "id": "7",
            "title": "Broken door",
            "description": "handle fell off",
            "status": "in_progress",
            "created_at": "2024-02-01T00:00:00Z"
        }
    ]"#;

    #[test]
    fn test_open_missing_file_fails() {
        let temp_dir = tempfile::tempdir().unwrap();
        let result = FileTicketStore::open(&temp_dir.path().join("nope.json"));
        assert!(matches!(result, Err(TicketError::Storage(_))));
    }

    #[test]
    fn test_open_invalid_json_fails() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("tickets.json");
        fs::write(&path, "not json at all").unwrap();
        let result = FileTicketStore::open(&path);
        assert!(matches!(result, Err(TicketError::Storage(_))));
    }

    #[test]
    fn test_open_non_numeric_id_fails() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("tickets.json");
        fs::write(
            &path,
            r#"[{"id": "abc", "title": "t", "description": "d", "status": "open", "created_at": "2024-01-01T00:00:00Z"}]"#,
        )
        .unwrap();
        let result = FileTicketStore::open(&path);
        let err = result.unwrap_err();
        assert!(err.to_string().contains("non-numeric"));
    }

    #[test]
    fn test_open_duplicate_id_fails() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("tickets.json");
        fs::write(
            &path,
            r#"[
                {"id": "1", "title": "a", "description": "d", "status": "open", "created_at": "2024-01-01T00:00:00Z"},
                {"id": "1", "title": "b", "description": "d", "status": "open", "created_at": "2024-01-02T00:00:00Z"}
            ]"#,
        )
        .unwrap();
        let result = FileTicketStore::open(&path);
        let err = result.unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_create_on_empty_store_assigns_id_one() {
        let (_dir, store) = seed_store("[]");

        let ticket = store.create(new_ticket("Leak")).unwrap();

        assert_eq!(ticket.id, "1");
        assert_eq!(ticket.status, TicketStatus::Open);
        assert_eq!(ticket.title, "Leak");
    }

    #[test]
    fn test_create_increments_max_id() {
        let (_dir, store) = seed_store(SEEDED);

        let ticket = store.create(new_ticket("New one")).unwrap();

        assert_eq!(ticket.id, "8");
    }

    #[test]
    fn test_id_comparison_is_numeric_not_lexicographic() {
        let (_dir, store) = seed_store(
            r#"[
                {"id": "9", "title": "a", "description": "d", "status": "open", "created_at": "2024-01-01T00:00:00Z"},
                {"id": "10", "title": "b", "description": "d", "status": "open", "created_at": "2024-01-02T00:00:00Z"}
            ]"#,
        );

        let ticket = store.create(new_ticket("c")).unwrap();
        assert_eq!(ticket.id, "11");
    }

    #[test]
    fn test_create_id_strictly_greater_than_existing() {
        let (_dir, store) = seed_store(SEEDED);

        let before: Vec<u64> = store
            .list()
            .unwrap()
            .iter()
            .map(|t| t.id.parse().unwrap())
            .collect();
        let created: u64 = store.create(new_ticket("Another")).unwrap().id.parse().unwrap();

        assert!(before.iter().all(|&id| created > id));
    }

    #[test]
    fn test_create_persists_to_document() {
        let (dir, store) = seed_store("[]");

        let ticket = store.create(new_ticket("Leak")).unwrap();

        let records = read_document(&dir);
        assert_eq!(records, vec![ticket]);
    }

    #[test]
    fn test_create_duplicate_title_case_insensitive() {
        let (dir, store) = seed_store(SEEDED);
        let before = read_document(&dir);

        let result = store.create(new_ticket("leak"));

        assert!(matches!(result, Err(TicketError::DuplicateTitle(_))));
        assert_eq!(result.unwrap_err().to_string(), "Ticket with title 'leak' already exists");
        // Neither the mapping nor the document changed.
        assert_eq!(store.list().unwrap().len(), 2);
        assert_eq!(read_document(&dir), before);
    }

    #[test]
    fn test_update_status_replaces_only_status() {
        let (dir, store) = seed_store(SEEDED);

        let updated = store.update_status("1", TicketStatus::Closed).unwrap();

        assert_eq!(updated.id, "1");
        assert_eq!(updated.title, "Leak");
        assert_eq!(updated.description, "water");
        assert_eq!(updated.status, TicketStatus::Closed);
        assert_eq!(updated.created_at, "2024-01-01T00:00:00Z".parse::<chrono::DateTime<chrono::Utc>>().unwrap());

        // Persisted too.
        let records = read_document(&dir);
        let persisted = records.iter().find(|t| t.id == "1").unwrap();
        assert_eq!(persisted.status, TicketStatus::Closed);
        assert_eq!(persisted.created_at, updated.created_at);
    }

    #[test]
    fn test_update_status_same_status_is_allowed() {
        let (_dir, store) = seed_store(SEEDED);
        let updated = store.update_status("1", TicketStatus::Open).unwrap();
        assert_eq!(updated.status, TicketStatus::Open);
    }

    #[test]
    fn test_update_status_unknown_id_fails() {
        let (dir, store) = seed_store(SEEDED);
        let before = read_document(&dir);

        let result = store.update_status("99", TicketStatus::Closed);

        assert!(matches!(result, Err(TicketError::NotFound(_))));
        assert_eq!(read_document(&dir), before);
    }

    #[test]
    fn test_get_ticket() {
        let (_dir, store) = seed_store(SEEDED);
        assert_eq!(store.get("7").unwrap().unwrap().title, "Broken door");
        assert!(store.get("99").unwrap().is_none());
    }

    #[test]
    fn test_list_orders_newest_first() {
        let (_dir, store) = seed_store(SEEDED);

        let tickets = store.list().unwrap();

        assert_eq!(tickets.len(), 2);
        assert_eq!(tickets[0].id, "7");
        assert_eq!(tickets[1].id, "1");
    }

    #[test]
    fn test_list_breaks_created_at_ties_by_id() {
        let (_dir, store) = seed_store(
            r#"[
                {"id": "1", "title": "a", "description": "d", "status": "open", "created_at": "2024-01-01T00:00:00Z"},
                {"id": "2", "title": "b", "description": "d", "status": "open", "created_at": "2024-01-01T00:00:00Z"}
            ]"#,
        );

        let tickets = store.list().unwrap();
        assert_eq!(tickets[0].id, "2");
        assert_eq!(tickets[1].id, "1");
    }

    #[test]
    fn test_document_survives_reopen() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("tickets.json");
        fs::write(&path, "[]").unwrap();

        let created = {
            let store = FileTicketStore::open(&path).unwrap();
            let t = store.create(new_ticket("Leak")).unwrap();
            store.update_status(&t.id, TicketStatus::InProgress).unwrap()
        };

        let reopened = FileTicketStore::open(&path).unwrap();
        let tickets = reopened.list().unwrap();
        assert_eq!(tickets, vec![created]);
    }

    #[test]
    fn test_no_stale_temp_file_left_behind() {
        let (dir, store) = seed_store("[]");
        store.create(new_ticket("Leak")).unwrap();
        assert!(!dir.path().join("tickets.tmp").exists());
    }
}
