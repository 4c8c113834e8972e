//! `RocksDB` storage implementation.
//!
//! This module provides the `RocksStore` implementation of the `Store`
//! trait. Every compound read-check-write operation (position allocation,
//! purchase insert, publish, refund) and every count-then-list page read
//! runs under `txn_lock`, which stands in for the serializable transaction
//! scope a relational backend would provide. Multi-key writes additionally
//! go through a `WriteBatch` so they land atomically on disk.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, Direction, IteratorMode,
    MultiThreaded, Options, WriteBatch,
};

use campus_core::{
    Course, CourseId, CourseStatus, Lesson, LessonId, Module, ModuleId, NewLesson, NewModule,
    Purchase, PurchaseId, PurchaseStatus, User, UserId,
};

use crate::error::{Result, StoreError};
use crate::keys;
use crate::schema::{all_column_families, cf};
use crate::{CourseStats, Store};

/// RocksDB-backed storage implementation.
pub struct RocksStore {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
    txn_lock: Mutex<()>,
}

impl RocksStore {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<_> = all_column_families()
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db = DBWithThreadMode::open_cf_descriptors(&opts, path, cf_descriptors)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(Self {
            db: Arc::new(db),
            txn_lock: Mutex::new(()),
        })
    }

    /// Get a column family handle.
    fn cf(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Database(format!("column family not found: {name}")))
    }

    /// Enter the store's transaction scope.
    fn lock(&self) -> Result<MutexGuard<'_, ()>> {
        self.txn_lock
            .lock()
            .map_err(|_| StoreError::Database("store lock poisoned".into()))
    }

    /// Serialize a value using CBOR.
    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize a value from CBOR.
    fn deserialize<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T> {
        ciborium::from_reader(data).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    fn get_row<T: serde::de::DeserializeOwned>(
        &self,
        cf_name: &str,
        key: &[u8],
    ) -> Result<Option<T>> {
        let cf = self.cf(cf_name)?;
        self.db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn put_row<T: serde::Serialize>(&self, cf_name: &str, key: &[u8], value: &T) -> Result<()> {
        let cf = self.cf(cf_name)?;
        let data = Self::serialize(value)?;
        self.db
            .put_cf(&cf, key, data)
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn write(&self, batch: WriteBatch) -> Result<()> {
        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    /// Collect all `(key, value)` pairs under a key prefix, in key order.
    fn prefix_entries(&self, cf_name: &str, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        let cf = self.cf(cf_name)?;
        let iter = self
            .db
            .iterator_cf(&cf, IteratorMode::From(prefix, Direction::Forward));

        let mut entries = Vec::new();
        for item in iter {
            let (key, value) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            if !key.starts_with(prefix) {
                break;
            }
            entries.push((key.to_vec(), value.to_vec()));
        }
        Ok(entries)
    }

    /// Collect every row of a column family.
    fn all_rows<T: serde::de::DeserializeOwned>(&self, cf_name: &str) -> Result<Vec<T>> {
        let cf = self.cf(cf_name)?;
        let iter = self.db.iterator_cf(&cf, IteratorMode::Start);

        let mut rows = Vec::new();
        for item in iter {
            let (_, value) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            rows.push(Self::deserialize(&value)?);
        }
        Ok(rows)
    }

    /// Highest occupied position under a parent's position index (0 if
    /// none). Callers that allocate must hold `txn_lock`.
    fn max_position(&self, cf_name: &str, prefix: &[u8]) -> Result<u32> {
        let entries = self.prefix_entries(cf_name, prefix)?;
        let max = entries
            .last()
            .and_then(|(key, _)| keys::extract_position(key))
            .unwrap_or(0);
        Ok(max)
    }

    /// Page through a position index, resolving each entry's row.
    fn page_by_position<T: serde::de::DeserializeOwned>(
        &self,
        index_cf: &str,
        row_cf: &str,
        prefix: &[u8],
        skip: usize,
        take: usize,
    ) -> Result<(u64, Vec<T>)> {
        let entries = self.prefix_entries(index_cf, prefix)?;
        let total = entries.len() as u64;

        let mut rows = Vec::new();
        for (_, value) in entries.into_iter().skip(skip).take(take) {
            if let Some(row) = self.get_row(row_cf, &value)? {
                rows.push(row);
            }
        }
        Ok((total, rows))
    }
}

fn page_slice<T>(mut rows: Vec<T>, skip: usize, take: usize) -> (u64, Vec<T>) {
    let total = rows.len() as u64;
    if skip >= rows.len() {
        return (total, Vec::new());
    }
    rows.drain(..skip);
    rows.truncate(take);
    (total, rows)
}

impl Store for RocksStore {
    // =========================================================================
    // User Operations
    // =========================================================================

    fn put_user(&self, user: &User) -> Result<()> {
        self.put_row(cf::USERS, user.id.as_bytes(), user)
    }

    fn get_user(&self, id: &UserId) -> Result<Option<User>> {
        self.get_row(cf::USERS, id.as_bytes())
    }

    fn delete_user(&self, id: &UserId) -> Result<()> {
        let cf = self.cf(cf::USERS)?;
        if self.get_user(id)?.is_none() {
            return Err(StoreError::NotFound {
                entity: "user",
                id: id.to_string(),
            });
        }
        self.db
            .delete_cf(&cf, id.as_bytes())
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn list_users_page(&self, skip: usize, take: usize) -> Result<(u64, Vec<User>)> {
        let _txn = self.lock()?;
        let mut users: Vec<User> = self.all_rows(cf::USERS)?;
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.to_string().cmp(&b.id.to_string())));
        Ok(page_slice(users, skip, take))
    }

    // =========================================================================
    // Course Operations
    // =========================================================================

    fn put_course(&self, course: &Course) -> Result<()> {
        self.put_row(cf::COURSES, course.id.as_bytes(), course)
    }

    fn get_course(&self, id: &CourseId) -> Result<Option<Course>> {
        self.get_row(cf::COURSES, id.as_bytes())
    }

    fn delete_course(&self, id: &CourseId) -> Result<()> {
        let _txn = self.lock()?;

        if self.get_course(id)?.is_none() {
            return Err(StoreError::NotFound {
                entity: "course",
                id: id.to_string(),
            });
        }

        let cf_courses = self.cf(cf::COURSES)?;
        let cf_modules = self.cf(cf::MODULES)?;
        let cf_modules_idx = self.cf(cf::MODULES_BY_COURSE)?;
        let cf_lessons = self.cf(cf::LESSONS)?;
        let cf_lessons_idx = self.cf(cf::LESSONS_BY_MODULE)?;

        let mut batch = WriteBatch::default();

        for (module_key, module_value) in
            self.prefix_entries(cf::MODULES_BY_COURSE, id.as_bytes())?
        {
            if let Some(module_id) = keys::module_id_from_value(&module_value) {
                for (lesson_key, lesson_value) in
                    self.prefix_entries(cf::LESSONS_BY_MODULE, module_id.as_bytes())?
                {
                    batch.delete_cf(&cf_lessons, &lesson_value);
                    batch.delete_cf(&cf_lessons_idx, &lesson_key);
                }
                batch.delete_cf(&cf_modules, module_id.as_bytes());
            }
            batch.delete_cf(&cf_modules_idx, &module_key);
        }

        batch.delete_cf(&cf_courses, id.as_bytes());
        self.write(batch)
    }

    fn list_courses_page(
        &self,
        status: Option<CourseStatus>,
        skip: usize,
        take: usize,
    ) -> Result<(u64, Vec<Course>)> {
        let _txn = self.lock()?;
        let mut courses: Vec<Course> = self.all_rows(cf::COURSES)?;
        if let Some(status) = status {
            courses.retain(|c| c.status == status);
        }
        courses.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(page_slice(courses, skip, take))
    }

    fn list_courses_by_teacher_page(
        &self,
        teacher_id: &UserId,
        skip: usize,
        take: usize,
    ) -> Result<(u64, Vec<Course>)> {
        let _txn = self.lock()?;
        let mut courses: Vec<Course> = self.all_rows(cf::COURSES)?;
        courses.retain(|c| c.teacher_id == *teacher_id);
        courses.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(page_slice(courses, skip, take))
    }

    fn publish_course(&self, id: &CourseId) -> Result<Course> {
        let _txn = self.lock()?;

        let mut course = self.get_course(id)?.ok_or_else(|| StoreError::NotFound {
            entity: "course",
            id: id.to_string(),
        })?;

        if course.status != CourseStatus::Draft {
            return Err(StoreError::AlreadyPublished {
                course_id: id.to_string(),
            });
        }

        // Any occupied position slot means at least one module exists.
        let last_position = self.max_position(cf::MODULES_BY_COURSE, id.as_bytes())?;
        if last_position == 0 {
            return Err(StoreError::EmptyCourse {
                course_id: id.to_string(),
            });
        }

        course.status = CourseStatus::Published;
        course.updated_at = chrono::Utc::now();
        self.put_row(cf::COURSES, course.id.as_bytes(), &course)?;

        tracing::debug!(course_id = %course.id, "course published");
        Ok(course)
    }

    fn course_stats(&self, id: &CourseId) -> Result<CourseStats> {
        let _txn = self.lock()?;

        let mut stats = CourseStats::default();
        for (_, module_value) in self.prefix_entries(cf::MODULES_BY_COURSE, id.as_bytes())? {
            stats.modules += 1;
            let Some(module_id) = keys::module_id_from_value(&module_value) else {
                continue;
            };
            for (_, lesson_value) in
                self.prefix_entries(cf::LESSONS_BY_MODULE, module_id.as_bytes())?
            {
                if let Some(lesson) = self.get_row::<Lesson>(cf::LESSONS, &lesson_value)? {
                    stats.lessons += 1;
                    stats.duration_secs += u64::from(lesson.duration_secs);
                }
            }
        }
        Ok(stats)
    }

    // =========================================================================
    // Module Operations
    // =========================================================================

    fn next_module_position(&self, course_id: &CourseId) -> Result<u32> {
        Ok(self.max_position(cf::MODULES_BY_COURSE, course_id.as_bytes())? + 1)
    }

    fn insert_module(&self, new: NewModule) -> Result<Module> {
        let _txn = self.lock()?;

        let position = self.max_position(cf::MODULES_BY_COURSE, new.course_id.as_bytes())? + 1;
        let index_key = keys::module_position_key(&new.course_id, position);

        let cf_idx = self.cf(cf::MODULES_BY_COURSE)?;
        let occupied = self
            .db
            .get_cf(&cf_idx, &index_key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .is_some();
        if occupied {
            return Err(StoreError::Conflict);
        }

        let module = Module {
            id: ModuleId::generate(),
            course_id: new.course_id,
            title: new.title,
            position,
            created_at: chrono::Utc::now(),
        };

        let cf_modules = self.cf(cf::MODULES)?;
        let mut batch = WriteBatch::default();
        batch.put_cf(&cf_modules, module.id.as_bytes(), Self::serialize(&module)?);
        batch.put_cf(&cf_idx, &index_key, module.id.as_bytes());
        self.write(batch)?;

        Ok(module)
    }

    fn get_module(&self, id: &ModuleId) -> Result<Option<Module>> {
        self.get_row(cf::MODULES, id.as_bytes())
    }

    fn put_module(&self, module: &Module) -> Result<()> {
        self.put_row(cf::MODULES, module.id.as_bytes(), module)
    }

    fn delete_module(&self, id: &ModuleId) -> Result<()> {
        let _txn = self.lock()?;

        let module = self.get_module(id)?.ok_or_else(|| StoreError::NotFound {
            entity: "module",
            id: id.to_string(),
        })?;

        let cf_modules = self.cf(cf::MODULES)?;
        let cf_modules_idx = self.cf(cf::MODULES_BY_COURSE)?;
        let cf_lessons = self.cf(cf::LESSONS)?;
        let cf_lessons_idx = self.cf(cf::LESSONS_BY_MODULE)?;

        let mut batch = WriteBatch::default();
        for (lesson_key, lesson_value) in
            self.prefix_entries(cf::LESSONS_BY_MODULE, id.as_bytes())?
        {
            batch.delete_cf(&cf_lessons, &lesson_value);
            batch.delete_cf(&cf_lessons_idx, &lesson_key);
        }
        batch.delete_cf(
            &cf_modules_idx,
            keys::module_position_key(&module.course_id, module.position),
        );
        batch.delete_cf(&cf_modules, id.as_bytes());
        self.write(batch)
    }

    fn list_modules_page(
        &self,
        course_id: &CourseId,
        skip: usize,
        take: usize,
    ) -> Result<(u64, Vec<Module>)> {
        let _txn = self.lock()?;
        self.page_by_position(
            cf::MODULES_BY_COURSE,
            cf::MODULES,
            course_id.as_bytes(),
            skip,
            take,
        )
    }

    // =========================================================================
    // Lesson Operations
    // =========================================================================

    fn next_lesson_position(&self, module_id: &ModuleId) -> Result<u32> {
        Ok(self.max_position(cf::LESSONS_BY_MODULE, module_id.as_bytes())? + 1)
    }

    fn insert_lesson(&self, new: NewLesson) -> Result<Lesson> {
        let _txn = self.lock()?;

        let position = self.max_position(cf::LESSONS_BY_MODULE, new.module_id.as_bytes())? + 1;
        let index_key = keys::lesson_position_key(&new.module_id, position);

        let cf_idx = self.cf(cf::LESSONS_BY_MODULE)?;
        let occupied = self
            .db
            .get_cf(&cf_idx, &index_key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .is_some();
        if occupied {
            return Err(StoreError::Conflict);
        }

        let lesson = Lesson {
            id: LessonId::generate(),
            module_id: new.module_id,
            title: new.title,
            video_url: new.video_url,
            duration_secs: new.duration_secs,
            position,
            created_at: chrono::Utc::now(),
        };

        let cf_lessons = self.cf(cf::LESSONS)?;
        let mut batch = WriteBatch::default();
        batch.put_cf(&cf_lessons, lesson.id.as_bytes(), Self::serialize(&lesson)?);
        batch.put_cf(&cf_idx, &index_key, lesson.id.as_bytes());
        self.write(batch)?;

        Ok(lesson)
    }

    fn get_lesson(&self, id: &LessonId) -> Result<Option<Lesson>> {
        self.get_row(cf::LESSONS, id.as_bytes())
    }

    fn put_lesson(&self, lesson: &Lesson) -> Result<()> {
        self.put_row(cf::LESSONS, lesson.id.as_bytes(), lesson)
    }

    fn delete_lesson(&self, id: &LessonId) -> Result<()> {
        let _txn = self.lock()?;

        let lesson = self.get_lesson(id)?.ok_or_else(|| StoreError::NotFound {
            entity: "lesson",
            id: id.to_string(),
        })?;

        let cf_lessons = self.cf(cf::LESSONS)?;
        let cf_lessons_idx = self.cf(cf::LESSONS_BY_MODULE)?;

        let mut batch = WriteBatch::default();
        batch.delete_cf(
            &cf_lessons_idx,
            keys::lesson_position_key(&lesson.module_id, lesson.position),
        );
        batch.delete_cf(&cf_lessons, id.as_bytes());
        self.write(batch)
    }

    fn list_lessons_page(
        &self,
        module_id: &ModuleId,
        skip: usize,
        take: usize,
    ) -> Result<(u64, Vec<Lesson>)> {
        let _txn = self.lock()?;
        self.page_by_position(
            cf::LESSONS_BY_MODULE,
            cf::LESSONS,
            module_id.as_bytes(),
            skip,
            take,
        )
    }

    // =========================================================================
    // Purchase Ledger Operations
    // =========================================================================

    fn insert_purchase(&self, purchase: &Purchase) -> Result<()> {
        let _txn = self.lock()?;

        let pair_key = keys::purchase_pair_key(&purchase.student_id, &purchase.course_id);
        let cf_idx = self.cf(cf::PURCHASES_BY_PAIR)?;

        let exists = self
            .db
            .get_cf(&cf_idx, &pair_key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .is_some();
        if exists {
            return Err(StoreError::AlreadyPurchased {
                student_id: purchase.student_id.to_string(),
                course_id: purchase.course_id.to_string(),
            });
        }

        let cf_purchases = self.cf(cf::PURCHASES)?;
        let mut batch = WriteBatch::default();
        batch.put_cf(
            &cf_purchases,
            purchase.id.as_bytes(),
            Self::serialize(purchase)?,
        );
        batch.put_cf(&cf_idx, &pair_key, purchase.id.as_bytes());
        self.write(batch)
    }

    fn get_purchase(&self, id: &PurchaseId) -> Result<Option<Purchase>> {
        self.get_row(cf::PURCHASES, id.as_bytes())
    }

    fn find_purchase(
        &self,
        student_id: &UserId,
        course_id: &CourseId,
    ) -> Result<Option<Purchase>> {
        let pair_key = keys::purchase_pair_key(student_id, course_id);
        let cf_idx = self.cf(cf::PURCHASES_BY_PAIR)?;

        let Some(purchase_id) = self
            .db
            .get_cf(&cf_idx, &pair_key)
            .map_err(|e| StoreError::Database(e.to_string()))?
        else {
            return Ok(None);
        };
        self.get_row(cf::PURCHASES, &purchase_id)
    }

    fn refund_purchase(&self, id: &PurchaseId) -> Result<Purchase> {
        let _txn = self.lock()?;

        let mut purchase = self.get_purchase(id)?.ok_or_else(|| StoreError::NotFound {
            entity: "purchase",
            id: id.to_string(),
        })?;

        if purchase.status != PurchaseStatus::Paid {
            return Err(StoreError::NotRefundable {
                purchase_id: id.to_string(),
            });
        }

        purchase.status = PurchaseStatus::Canceled;
        self.put_row(cf::PURCHASES, purchase.id.as_bytes(), &purchase)?;

        tracing::debug!(purchase_id = %purchase.id, "purchase refunded");
        Ok(purchase)
    }

    fn list_purchases_by_student(&self, student_id: &UserId) -> Result<Vec<Purchase>> {
        let prefix = keys::purchases_of_student_prefix(student_id);

        let mut purchases = Vec::new();
        for (_, purchase_id) in self.prefix_entries(cf::PURCHASES_BY_PAIR, &prefix)? {
            if let Some(purchase) = self.get_row::<Purchase>(cf::PURCHASES, &purchase_id)? {
                purchases.push(purchase);
            }
        }
        // Transaction ids are ULIDs, so sorting by id is newest-first time
        // order.
        purchases.sort_by(|a, b| b.transaction_id.cmp(&a.transaction_id));
        Ok(purchases)
    }

    fn list_purchases_page(&self, skip: usize, take: usize) -> Result<(u64, Vec<Purchase>)> {
        let _txn = self.lock()?;
        let mut purchases: Vec<Purchase> = self.all_rows(cf::PURCHASES)?;
        purchases.sort_by(|a, b| b.transaction_id.cmp(&a.transaction_id));
        Ok(page_slice(purchases, skip, take))
    }
}
