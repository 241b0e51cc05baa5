use crate::domain::model::{Bet, Event, User};
use crate::domain::ports::{BetRepository, EventRepository, IdempotencyRepository, UserRepository};
use crate::utils::error::{F1BetError, Result};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

#[derive(Debug, Clone)]
struct Versioned<V> {
    value: V,
    version: u64,
}

/// Map of values with an optimistic-lock version per key.
#[derive(Debug)]
struct VersionedStore<K, V> {
    entity: &'static str,
    entries: Mutex<HashMap<K, Versioned<V>>>,
}

impl<K: Eq + Hash + Clone, V: Clone> VersionedStore<K, V> {
    fn new(entity: &'static str) -> Self {
        Self {
            entity,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<K, Versioned<V>>> {
        // 持鎖期間不會 panic，中毒時沿用內部資料
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn get(&self, key: &K) -> Option<V> {
        self.lock().get(key).map(|e| e.value.clone())
    }

    fn get_or_insert_with(&self, key: K, create: impl FnOnce() -> V) -> V {
        self.lock()
            .entry(key)
            .or_insert_with(|| Versioned {
                value: create(),
                version: 0,
            })
            .value
            .clone()
    }

    fn put(&self, key: K, value: V) {
        self.lock().insert(key, Versioned { value, version: 0 });
    }

    fn put_if_absent(&self, key: K, value: V) -> V {
        self.get_or_insert_with(key, || value)
    }

    fn update(&self, key: K, value: V, expected_version: u64) -> Result<()> {
        let mut entries = self.lock();
        match entries.get_mut(&key) {
            None => {
                entries.insert(key, Versioned { value, version: 0 });
                Ok(())
            }
            Some(current) if current.version != expected_version => {
                Err(F1BetError::OptimisticLock {
                    entity: self.entity,
                    expected: expected_version,
                    actual: current.version,
                })
            }
            Some(current) => {
                current.value = value;
                current.version += 1;
                Ok(())
            }
        }
    }

    fn version_of(&self, key: &K) -> u64 {
        self.lock().get(key).map_or(0, |e| e.version)
    }

    fn values(&self) -> Vec<V> {
        self.lock().values().map(|e| e.value.clone()).collect()
    }
}

pub struct InMemoryUserRepository {
    store: VersionedStore<Uuid, User>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            store: VersionedStore::new("User"),
        }
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl UserRepository for InMemoryUserRepository {
    fn find_or_create(&self, id: Uuid) -> User {
        self.store.get_or_insert_with(id, || User::create(id))
    }

    fn save(&self, user: User) -> User {
        self.store.put(user.id(), user.clone());
        user
    }

    fn update(&self, user: User, expected_version: u64) -> Result<User> {
        self.store.update(user.id(), user.clone(), expected_version)?;
        Ok(user)
    }

    fn version_of(&self, id: Uuid) -> u64 {
        self.store.version_of(&id)
    }
}

pub struct InMemoryEventRepository {
    store: VersionedStore<Uuid, Event>,
}

impl InMemoryEventRepository {
    pub fn new() -> Self {
        Self {
            store: VersionedStore::new("Event"),
        }
    }
}

impl Default for InMemoryEventRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl EventRepository for InMemoryEventRepository {
    fn find_by_id(&self, id: Uuid) -> Option<Event> {
        self.store.get(&id)
    }

    fn save(&self, event: Event) -> Event {
        self.store.put(event.id(), event.clone());
        event
    }

    fn insert_if_absent(&self, event: Event) -> Event {
        self.store.put_if_absent(event.id(), event)
    }

    fn update(&self, event: Event, expected_version: u64) -> Result<Event> {
        self.store.update(event.id(), event.clone(), expected_version)?;
        Ok(event)
    }

    fn find_page(&self, page: usize, size: usize) -> Vec<Event> {
        if size == 0 {
            return Vec::new();
        }
        let mut events = self.store.values();
        events.sort_by_key(|e| e.id());
        events
            .into_iter()
            .skip(page.saturating_mul(size))
            .take(size)
            .collect()
    }

    fn version_of(&self, id: Uuid) -> u64 {
        self.store.version_of(&id)
    }
}

pub struct InMemoryBetRepository {
    store: VersionedStore<Uuid, Bet>,
}

impl InMemoryBetRepository {
    pub fn new() -> Self {
        Self {
            store: VersionedStore::new("Bet"),
        }
    }
}

impl Default for InMemoryBetRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl BetRepository for InMemoryBetRepository {
    fn find_by_id(&self, id: Uuid) -> Option<Bet> {
        self.store.get(&id)
    }

    fn save(&self, bet: Bet) -> Bet {
        self.store.put(bet.id(), bet.clone());
        bet
    }

    fn update(&self, bet: Bet, expected_version: u64) -> Result<Bet> {
        self.store.update(bet.id(), bet.clone(), expected_version)?;
        Ok(bet)
    }

    fn find_by_event(&self, event_id: Uuid) -> Vec<Bet> {
        let mut bets: Vec<Bet> = self
            .store
            .values()
            .into_iter()
            .filter(|b| b.event_id() == event_id)
            .collect();
        bets.sort_by_key(|b| b.id());
        bets
    }

    fn version_of(&self, id: Uuid) -> u64 {
        self.store.version_of(&id)
    }
}

#[derive(Default)]
pub struct InMemoryIdempotencyRepository {
    keys: Mutex<HashMap<(Uuid, String), Uuid>>,
}

impl InMemoryIdempotencyRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdempotencyRepository for InMemoryIdempotencyRepository {
    fn find(&self, user_id: Uuid, key: &str) -> Option<Uuid> {
        self.keys
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&(user_id, key.to_string()))
            .copied()
    }

    fn save(&self, user_id: Uuid, key: &str, bet_id: Uuid) {
        self.keys
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .entry((user_id, key.to_string()))
            .or_insert(bet_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Market, Selection, SessionType};
    use crate::domain::money::Money;
    use crate::domain::odds::Odds;

    fn event_with_selection(selection_id: Uuid) -> Event {
        Event::new(
            Uuid::new_v4(),
            "Bahrain GP",
            SessionType::Race,
            "BH",
            2025,
            Market::winner(vec![Selection::new(selection_id, "d1", "Norris", Odds::TWO)]),
        )
        .unwrap()
    }

    #[test]
    fn test_user_created_on_demand_and_optimistic_lock() {
        let users = InMemoryUserRepository::new();
        let id = Uuid::new_v4();

        let first = users.find_or_create(id);
        let second = users.find_or_create(id);
        assert_eq!(first, second);

        users.update(first, 0).unwrap();
        let err = users.update(second, 0).unwrap_err();
        assert!(matches!(
            err,
            F1BetError::OptimisticLock {
                entity: "User",
                expected: 0,
                actual: 1
            }
        ));
        assert_eq!(users.version_of(id), 1);
    }

    #[test]
    fn test_event_paging_and_optimistic_lock() {
        let events = InMemoryEventRepository::new();
        let event = event_with_selection(Uuid::new_v4());
        events.save(event.clone());

        assert!(events.find_by_id(event.id()).is_some());
        assert_eq!(events.find_page(0, 10).len(), 1);
        assert!(events.find_page(1, 10).is_empty());
        assert!(events.find_page(0, 0).is_empty());

        let loaded_a = events.find_by_id(event.id()).unwrap();
        let loaded_b = events.find_by_id(event.id()).unwrap();
        events.update(loaded_a, 0).unwrap();
        assert!(events.update(loaded_b, 0).is_err());
    }

    #[test]
    fn test_insert_if_absent_keeps_first_event() {
        let events = InMemoryEventRepository::new();
        let first = event_with_selection(Uuid::new_v4());
        let id = first.id();
        events.insert_if_absent(first.clone());

        let rival = Event::new(
            id,
            "Other",
            SessionType::Race,
            "BH",
            2025,
            Market::winner(vec![]),
        )
        .unwrap();
        let stored = events.insert_if_absent(rival);

        assert_eq!(stored, first);
    }

    #[test]
    fn test_bet_versioning_and_lookup_by_event() {
        let bets = InMemoryBetRepository::new();
        let selection_id = Uuid::new_v4();
        let event = event_with_selection(selection_id);
        let bet = Bet::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            selection_id,
            Money::parse("EUR", "10.00").unwrap(),
            Odds::TWO,
            &event,
        )
        .unwrap();

        bets.save(bet.clone());
        assert_eq!(bets.find_by_event(event.id()).len(), 1);
        assert!(bets.find_by_event(Uuid::new_v4()).is_empty());

        let b1 = bets.find_by_id(bet.id()).unwrap();
        let b2 = bets.find_by_id(bet.id()).unwrap();
        bets.update(b1, 0).unwrap();
        assert!(bets.update(b2, 0).is_err());
    }

    #[test]
    fn test_idempotency_first_mapping_wins() {
        let repo = InMemoryIdempotencyRepository::new();
        let user = Uuid::new_v4();
        let first = Uuid::new_v4();

        repo.save(user, "key-1", first);
        repo.save(user, "key-1", Uuid::new_v4());

        assert_eq!(repo.find(user, "key-1"), Some(first));
        assert_eq!(repo.find(Uuid::new_v4(), "key-1"), None);
    }
}
