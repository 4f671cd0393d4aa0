//! Sled-backed document store for users, content, and share links.

use crate::error::StashError;
use crate::models::{ContentItem, ShareLink, User};
use std::path::Path;
use uuid::Uuid;

/// Document store over one sled database with a tree per collection.
///
/// Content keys are `"{user_id}/{content_id}"`, so one prefix scan lists a
/// user's items and deletes are owner-scoped by construction.
pub struct Store {
    db: sled::Db,
    users: sled::Tree,
    usernames: sled::Tree,
    content: sled::Tree,
    shares: sled::Tree,
    user_shares: sled::Tree,
}

impl Store {
    /// Open or create the store at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StashError> {
        let db = sled::open(path)?;
        Ok(Self {
            users: db.open_tree("users")?,
            usernames: db.open_tree("usernames")?,
            content: db.open_tree("content")?,
            shares: db.open_tree("shares")?,
            user_shares: db.open_tree("user_shares")?,
            db,
        })
    }

    /// Create a user, reserving the username first. Returns `false` when the
    /// username is already taken.
    pub fn create_user(&self, user: &User) -> Result<bool, StashError> {
        let id_bytes = user.id.to_string().into_bytes();
        let reserved = self
            .usernames
            .compare_and_swap(
                user.username.as_bytes(),
                None as Option<&[u8]>,
                Some(id_bytes),
            )?
            .is_ok();
        if !reserved {
            return Ok(false);
        }

        let doc = serde_json::to_vec(user)?;
        self.users.insert(user.id.to_string().as_bytes(), doc)?;
        self.db.flush()?;
        Ok(true)
    }

    pub fn find_user_by_name(&self, username: &str) -> Result<Option<User>, StashError> {
        let Some(id) = self.usernames.get(username.as_bytes())? else {
            return Ok(None);
        };
        match self.users.get(&id)? {
            Some(doc) => Ok(Some(serde_json::from_slice(&doc)?)),
            None => Ok(None),
        }
    }

    pub fn get_user(&self, id: Uuid) -> Result<Option<User>, StashError> {
        match self.users.get(id.to_string().as_bytes())? {
            Some(doc) => Ok(Some(serde_json::from_slice(&doc)?)),
            None => Ok(None),
        }
    }

    pub fn insert_content(&self, item: &ContentItem) -> Result<(), StashError> {
        let key = content_key(item.user_id, item.id);
        let doc = serde_json::to_vec(item)?;
        self.content.insert(key.as_bytes(), doc)?;
        self.db.flush()?;
        Ok(())
    }

    pub fn get_content(
        &self,
        user_id: Uuid,
        content_id: Uuid,
    ) -> Result<Option<ContentItem>, StashError> {
        let key = content_key(user_id, content_id);
        match self.content.get(key.as_bytes())? {
            Some(doc) => Ok(Some(serde_json::from_slice(&doc)?)),
            None => Ok(None),
        }
    }

    /// List a user's items, oldest first
    pub fn list_content(&self, user_id: Uuid) -> Result<Vec<ContentItem>, StashError> {
        let prefix = format!("{user_id}/");
        let mut results = Vec::new();
        for item in self.content.scan_prefix(prefix.as_bytes()) {
            let (_key, value) = item?;
            let stored: ContentItem = serde_json::from_slice(&value)?;
            results.push(stored);
        }
        results.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(results)
    }

    /// Delete one of the user's items. Returns `false` when no such item
    /// exists under this owner.
    pub fn delete_content(&self, user_id: Uuid, content_id: Uuid) -> Result<bool, StashError> {
        let key = content_key(user_id, content_id);
        let existed = self.content.remove(key.as_bytes())?.is_some();
        if existed {
            self.db.flush()?;
        }
        Ok(existed)
    }

    /// Enable sharing for a user, drawing hashes from `new_hash` until one
    /// is unclaimed. Both the hash and the per-user slot are claimed with
    /// compare-and-swap, so concurrent enables settle on a single live
    /// hash; a loser discards its claim and returns the winner's share.
    pub fn ensure_share(
        &self,
        user_id: Uuid,
        mut new_hash: impl FnMut() -> String,
    ) -> Result<ShareLink, StashError> {
        let user_key = user_id.to_string();

        loop {
            if let Some(existing) = self.share_for_user(user_id)? {
                return Ok(existing);
            }

            // Claim the hash before mapping it, so the user slot never
            // points at a hash owned by someone else.
            let share = loop {
                let candidate = ShareLink::new(new_hash(), user_id);
                let doc = serde_json::to_vec(&candidate)?;
                let claimed = self
                    .shares
                    .compare_and_swap(candidate.hash.as_bytes(), None as Option<&[u8]>, Some(doc))?
                    .is_ok();
                if claimed {
                    break candidate;
                }
            };

            let mapped = self
                .user_shares
                .compare_and_swap(
                    user_key.as_bytes(),
                    None as Option<&[u8]>,
                    Some(share.hash.as_bytes()),
                )?
                .is_ok();
            if mapped {
                self.db.flush()?;
                return Ok(share);
            }

            // Lost the slot to a concurrent enable; discard our hash and
            // pick up the winner's on the next pass.
            self.shares.remove(share.hash.as_bytes())?;
            self.db.flush()?;
        }
    }

    pub fn share_for_user(&self, user_id: Uuid) -> Result<Option<ShareLink>, StashError> {
        let Some(hash) = self.user_shares.get(user_id.to_string().as_bytes())? else {
            return Ok(None);
        };
        match self.shares.get(&hash)? {
            Some(doc) => Ok(Some(serde_json::from_slice(&doc)?)),
            None => Ok(None),
        }
    }

    pub fn find_share(&self, hash: &str) -> Result<Option<ShareLink>, StashError> {
        match self.shares.get(hash.as_bytes())? {
            Some(doc) => Ok(Some(serde_json::from_slice(&doc)?)),
            None => Ok(None),
        }
    }

    /// Revoke a user's share link. Returns `false` when none was active.
    pub fn delete_share(&self, user_id: Uuid) -> Result<bool, StashError> {
        let Some(hash) = self.user_shares.remove(user_id.to_string().as_bytes())? else {
            return Ok(false);
        };
        self.shares.remove(&hash)?;
        self.db.flush()?;
        Ok(true)
    }
}

fn content_key(user_id: Uuid, content_id: Uuid) -> String {
    format!("{user_id}/{content_id}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ContentKind;
    use std::sync::Arc;

    // The TempDir guard must outlive the store, or the files vanish
    // under the open database.
    fn temp_store() -> (Store, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path().join("db")).unwrap();
        (store, dir)
    }

    fn sample_user(name: &str) -> User {
        User::new(name.into(), "hash".into())
    }

    #[test]
    fn username_is_unique() {
        let (store, _dir) = temp_store();
        assert!(store.create_user(&sample_user("alice")).unwrap());
        assert!(!store.create_user(&sample_user("alice")).unwrap());

        let found = store.find_user_by_name("alice").unwrap().unwrap();
        assert_eq!(found.username, "alice");
        assert!(store.find_user_by_name("bob").unwrap().is_none());
    }

    #[test]
    fn content_is_scoped_to_owner() {
        let (store, _dir) = temp_store();
        let alice = sample_user("alice");
        let bob = sample_user("bob");
        store.create_user(&alice).unwrap();
        store.create_user(&bob).unwrap();

        let item = ContentItem::new(
            "A post".into(),
            "https://example.com/a".into(),
            ContentKind::Link,
            vec![],
            alice.id,
        );
        store.insert_content(&item).unwrap();

        assert_eq!(store.list_content(alice.id).unwrap().len(), 1);
        assert!(store.list_content(bob.id).unwrap().is_empty());

        // Bob cannot delete Alice's item
        assert!(!store.delete_content(bob.id, item.id).unwrap());
        assert!(store.delete_content(alice.id, item.id).unwrap());
        assert!(!store.delete_content(alice.id, item.id).unwrap());
    }

    #[test]
    fn list_is_ordered_by_creation() {
        let (store, _dir) = temp_store();
        let user = sample_user("alice");
        store.create_user(&user).unwrap();

        for n in 0..3 {
            let item = ContentItem::new(
                format!("item-{n}"),
                "https://example.com".into(),
                ContentKind::Link,
                vec![],
                user.id,
            );
            store.insert_content(&item).unwrap();
        }

        let titles: Vec<String> = store
            .list_content(user.id)
            .unwrap()
            .into_iter()
            .map(|i| i.title)
            .collect();
        assert_eq!(titles, vec!["item-0", "item-1", "item-2"]);
    }

    #[test]
    fn share_lifecycle() {
        let (store, _dir) = temp_store();
        let user = sample_user("alice");
        store.create_user(&user).unwrap();

        assert!(store.share_for_user(user.id).unwrap().is_none());

        let share = store
            .ensure_share(user.id, || "abc123def0".into())
            .unwrap();
        assert_eq!(share.hash, "abc123def0");

        // Enabling again reuses the live hash instead of minting another
        let again = store
            .ensure_share(user.id, || "zzzzzzzzzz".into())
            .unwrap();
        assert_eq!(again.hash, "abc123def0");
        assert!(store.find_share("zzzzzzzzzz").unwrap().is_none());

        let found = store.find_share("abc123def0").unwrap().unwrap();
        assert_eq!(found.user_id, user.id);
        assert_eq!(
            store.share_for_user(user.id).unwrap().unwrap().hash,
            "abc123def0"
        );

        assert!(store.delete_share(user.id).unwrap());
        assert!(store.find_share("abc123def0").unwrap().is_none());
        assert!(!store.delete_share(user.id).unwrap());
    }

    #[test]
    fn colliding_hashes_are_redrawn() {
        let (store, _dir) = temp_store();
        let alice = sample_user("alice");
        let bob = sample_user("bob");
        store.create_user(&alice).unwrap();
        store.create_user(&bob).unwrap();

        store
            .ensure_share(alice.id, || "same000000".into())
            .unwrap();

        // Bob's first draw collides with Alice's live hash
        let mut draws = vec!["other00000", "same000000"];
        let share = store
            .ensure_share(bob.id, || draws.pop().unwrap().into())
            .unwrap();
        assert_eq!(share.hash, "other00000");

        let alices = store.find_share("same000000").unwrap().unwrap();
        assert_eq!(alices.user_id, alice.id);
        let bobs = store.find_share("other00000").unwrap().unwrap();
        assert_eq!(bobs.user_id, bob.id);
    }

    #[test]
    fn racing_enables_settle_on_one_hash() {
        let (store, _dir) = temp_store();
        let user = sample_user("alice");
        store.create_user(&user).unwrap();

        let store = Arc::new(store);
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let store = Arc::clone(&store);
                let user_id = user.id;
                std::thread::spawn(move || {
                    let mut n = 0;
                    store
                        .ensure_share(user_id, || {
                            n += 1;
                            format!("draw{t}{n:06}")
                        })
                        .unwrap()
                        .hash
                })
            })
            .collect();
        let hashes: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        // Every caller got the same hash, and no orphan claims remain
        assert!(hashes.iter().all(|h| *h == hashes[0]));
        assert_eq!(store.shares.len(), 1);

        assert!(store.delete_share(user.id).unwrap());
        assert_eq!(store.shares.len(), 0);
        assert_eq!(store.user_shares.len(), 0);
        assert!(store.find_share(&hashes[0]).unwrap().is_none());
    }
}
