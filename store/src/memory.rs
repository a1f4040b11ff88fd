//! In-memory mirror store.

use crate::mirror::MirrorStore;
use crate::StoreError;
use std::collections::HashMap;
use std::sync::RwLock;
use veritas_types::{Address, QuestionId};

#[derive(Default)]
struct Tables {
    questions: HashMap<QuestionId, Vec<u8>>,
    answers: HashMap<QuestionId, Vec<u8>>,
    votes: HashMap<(QuestionId, Address), Vec<u8>>,
    rounds: HashMap<QuestionId, Vec<u8>>,
    meta: HashMap<Vec<u8>, Vec<u8>>,
}

/// HashMap-backed [`MirrorStore`] for tests and default wiring.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MirrorStore for MemoryStore {
    fn put_question(&self, id: &QuestionId, data: &[u8]) -> Result<(), StoreError> {
        self.write().questions.insert(*id, data.to_vec());
        Ok(())
    }

    fn get_question(&self, id: &QuestionId) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.read().questions.get(id).cloned())
    }

    fn put_answer(&self, id: &QuestionId, data: &[u8]) -> Result<(), StoreError> {
        self.write().answers.insert(*id, data.to_vec());
        Ok(())
    }

    fn get_answer(&self, id: &QuestionId) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.read().answers.get(id).cloned())
    }

    fn put_vote(&self, id: &QuestionId, voter: &Address, data: &[u8]) -> Result<(), StoreError> {
        self.write()
            .votes
            .insert((*id, voter.clone()), data.to_vec());
        Ok(())
    }

    fn get_vote(&self, id: &QuestionId, voter: &Address) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.read().votes.get(&(*id, voter.clone())).cloned())
    }

    fn votes_for_question(&self, id: &QuestionId) -> Result<Vec<Vec<u8>>, StoreError> {
        Ok(self
            .read()
            .votes
            .iter()
            .filter(|((qid, _), _)| qid == id)
            .map(|(_, data)| data.clone())
            .collect())
    }

    fn put_round(&self, id: &QuestionId, data: &[u8]) -> Result<(), StoreError> {
        self.write().rounds.insert(*id, data.to_vec());
        Ok(())
    }

    fn get_round(&self, id: &QuestionId) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.read().rounds.get(id).cloned())
    }

    fn iter_rounds(&self) -> Result<Vec<(QuestionId, Vec<u8>)>, StoreError> {
        Ok(self
            .read()
            .rounds
            .iter()
            .map(|(id, data)| (*id, data.clone()))
            .collect())
    }

    fn get_meta(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.read().meta.get(key).cloned())
    }

    fn put_meta(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.write().meta.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete_meta(&self, key: &[u8]) -> Result<(), StoreError> {
        self.write().meta.remove(key);
        Ok(())
    }
}

impl MemoryStore {
    fn read(&self) -> std::sync::RwLockReadGuard<'_, Tables> {
        self.tables.read().expect("mirror store lock poisoned")
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Tables> {
        self.tables.write().expect("mirror store lock poisoned")
    }
}
