//! List Service
//!
//! Hosts named lists and executes protocol commands against them.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::config::{Config, JournalSyncStrategy};
use crate::error::Result;
use crate::list::{FileList, ListBackend, MemoryList};
use crate::protocol::{encode_records, Command, Response};

/// Where hosted lists keep their records
#[derive(Debug, Clone)]
pub enum ListStorage {
    /// Lists live in memory only
    Memory,

    /// Lists are journaled under `data_dir`
    Journaled {
        data_dir: PathBuf,
        sync_strategy: JournalSyncStrategy,
        compaction_threshold: u64,
    },
}

/// Registry of named lists
///
/// Lists are created on first use. Each primitive is executed atomically by
/// the list itself; the service adds no cross-command coordination.
pub struct ListService {
    storage: ListStorage,
    lists: RwLock<HashMap<String, Arc<dyn ListBackend>>>,
}

impl ListService {
    pub fn new(storage: ListStorage) -> Self {
        Self {
            storage,
            lists: RwLock::new(HashMap::new()),
        }
    }

    /// Service holding every list in memory
    pub fn in_memory() -> Self {
        Self::new(ListStorage::Memory)
    }

    /// Service journaling lists under `config.data_dir`
    pub fn journaled(config: &Config) -> Self {
        Self::new(ListStorage::Journaled {
            data_dir: config.data_dir.clone(),
            sync_strategy: config.journal_sync_strategy,
            compaction_threshold: config.compaction_threshold,
        })
    }

    /// Get (or open) the list named `key`
    pub fn list(&self, key: &str) -> Result<Arc<dyn ListBackend>> {
        if let Some(list) = self.lists.read().get(key) {
            return Ok(Arc::clone(list));
        }

        let mut lists = self.lists.write();
        if let Some(list) = lists.get(key) {
            return Ok(Arc::clone(list));
        }

        let list: Arc<dyn ListBackend> = match &self.storage {
            ListStorage::Memory => Arc::new(MemoryList::new()),
            ListStorage::Journaled {
                data_dir,
                sync_strategy,
                compaction_threshold,
            } => Arc::new(FileList::open_in(
                data_dir,
                key,
                *sync_strategy,
                *compaction_threshold,
            )?),
        };

        tracing::debug!("Opened list {:?}", key);
        lists.insert(key.to_string(), Arc::clone(&list));
        Ok(list)
    }

    /// Execute a command
    ///
    /// Routes commands to the targeted list
    pub fn execute(&self, command: Command) -> Result<Response> {
        match command {
            Command::Push { key, record } => {
                self.list(&key)?.push_tail(&record)?;
                Ok(Response::ok(None))
            }
            Command::Pop { key } => match self.list(&key)?.pop_head()? {
                Some(record) => Ok(Response::ok(Some(record.into_bytes()))),
                None => Ok(Response::not_found()),
            },
            Command::Len { key } => {
                let len = self.list(&key)?.length()?;
                Ok(Response::ok(Some(len.to_be_bytes().to_vec())))
            }
            Command::Range { key, start, end } => {
                let records = self.list(&key)?.range(start, end)?;
                Ok(Response::ok(Some(encode_records(&records))))
            }
            Command::Del { key } => {
                self.list(&key)?.delete_all()?;
                Ok(Response::ok(None))
            }
            Command::Ping => Ok(Response::ok(Some(b"PONG".to_vec()))),
        }
    }

    /// Names of the lists opened so far
    pub fn list_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.lists.read().keys().cloned().collect();
        names.sort();
        names
    }
}
