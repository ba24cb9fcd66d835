use crate::domain::order::{Order, OrderDraft, OrderId};
use crate::domain::ports::{OrderStore, UserStore};
use crate::domain::user::{User, UserId};
use crate::error::{OrderError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, Options};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Column Family for storing orders.
pub const CF_ORDERS: &str = "orders";
/// Column Family for storing users.
pub const CF_USERS: &str = "users";
/// Column Family holding the last allocated id per entity.
pub const CF_SEQUENCES: &str = "sequences";

/// A persistent store implementation using RocksDB.
///
/// Handles storage for both `Order` and `User` entities using separate Column
/// Families. Keys are big-endian ids so iteration follows id order.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    sequence_lock: Arc<Mutex<()>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the required column families exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let descriptors = [CF_ORDERS, CF_USERS, CF_SEQUENCES]
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect::<Vec<_>>();

        let db = DB::open_cf_descriptors(&opts, path, descriptors)?;

        Ok(Self {
            db: Arc::new(db),
            sequence_lock: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self, name: &str) -> Result<&rocksdb::ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| {
            OrderError::InternalError(Box::new(std::io::Error::other(format!(
                "{name} column family not found"
            ))))
        })
    }

    /// Allocates the next id for `entity`. Callers must hold `sequence_lock`.
    fn next_id(&self, entity: &str) -> Result<u64> {
        let cf = self.cf(CF_SEQUENCES)?;
        let last = match self.db.get_cf(cf, entity)? {
            Some(bytes) => {
                let raw: [u8; 8] = bytes.as_slice().try_into().map_err(|_| {
                    OrderError::InternalError(Box::new(std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        format!("corrupt sequence for {entity}"),
                    )))
                })?;
                u64::from_be_bytes(raw)
            }
            None => 0,
        };
        let next = last + 1;
        self.db.put_cf(cf, entity, next.to_be_bytes())?;
        Ok(next)
    }

    fn put<T: Serialize>(&self, cf_name: &str, key: u64, value: &T) -> Result<()> {
        let cf = self.cf(cf_name)?;
        let bytes = serde_json::to_vec(value)?;
        self.db.put_cf(cf, key.to_be_bytes(), bytes)?;
        Ok(())
    }

    fn fetch<T: DeserializeOwned>(&self, cf_name: &str, key: u64) -> Result<Option<T>> {
        let cf = self.cf(cf_name)?;
        match self.db.get_cf(cf, key.to_be_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl OrderStore for RocksDBStore {
    async fn create(&self, draft: OrderDraft) -> Result<Order> {
        let _guard = self.sequence_lock.lock().await;
        let order = draft.into_order(OrderId(self.next_id(CF_ORDERS)?));
        self.put(CF_ORDERS, order.id.0, &order)?;
        Ok(order)
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>> {
        self.fetch(CF_ORDERS, id.0)
    }

    async fn save(&self, order: &Order) -> Result<()> {
        self.put(CF_ORDERS, order.id.0, order)
    }

    async fn get_all(&self) -> Result<Vec<Order>> {
        let cf = self.cf(CF_ORDERS)?;
        let mut orders = Vec::new();
        for item in self.db.iterator_cf(cf, rocksdb::IteratorMode::Start) {
            let (_key, value) = item?;
            orders.push(serde_json::from_slice(&value)?);
        }
        Ok(orders)
    }
}

#[async_trait]
impl UserStore for RocksDBStore {
    async fn create(&self, name: &str) -> Result<User> {
        let _guard = self.sequence_lock.lock().await;
        let user = User {
            id: UserId(self.next_id(CF_USERS)?),
            name: name.to_string(),
        };
        self.put(CF_USERS, user.id.0, &user)?;
        Ok(user)
    }

    async fn get(&self, id: UserId) -> Result<Option<User>> {
        self.fetch(CF_USERS, id.0)
    }
}
