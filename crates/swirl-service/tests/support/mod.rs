//! In-memory backends for data service tests.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use serde_json::Value;
use swirl_auth::{
    AuthCredential, AuthError, AuthResult, AuthUser, Authenticator, IdentityProvider, LoginOutcome,
    ProviderToken, ReadPermission, UiContext,
};
use swirl_database::{Database, DatabaseError, DatabasePath, DatabaseResult, Versioned};
use swirl_models::{JsonMap, UserId};
use swirl_service::DataService;
use swirl_storage::{BlobStore, ContentType, StorageError, StorageResult, UploadedBlob};

// =============================================================================
// Database
// =============================================================================

/// JSON tree with content-hash ETags.
#[derive(Default)]
pub struct MemoryDatabase {
    root: Mutex<Value>,
    calls: AtomicUsize,
    /// Values a "concurrent writer" stores just before each conditional write, which then fails.
    races: Mutex<VecDeque<Value>>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self {
            root: Mutex::new(Value::Object(JsonMap::new())),
            ..Default::default()
        }
    }

    pub fn seed(&self, path: &str, value: Value) {
        let path = DatabasePath::parse(path).unwrap();
        write_node(&mut self.root.lock().unwrap(), path.segments(), value);
    }

    pub fn read(&self, path: &str) -> Option<Value> {
        let path = DatabasePath::parse(path).unwrap();
        read_node(&self.root.lock().unwrap(), path.segments())
    }

    /// Number of trait calls served.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Make the next conditional write lose against a writer that stores `value` first.
    pub fn race_next_conditional_write(&self, value: Value) {
        self.races.lock().unwrap().push_back(value);
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

fn read_node(root: &Value, segments: &[String]) -> Option<Value> {
    let mut node = root;
    for segment in segments {
        node = match node {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    match node {
        Value::Null => None,
        other => Some(other.clone()),
    }
}

fn write_node(root: &mut Value, segments: &[String], value: Value) {
    let Some((last, parents)) = segments.split_last() else {
        *root = value;
        return;
    };
    let mut node = root;
    for segment in parents {
        if !node.is_object() {
            *node = Value::Object(JsonMap::new());
        }
        node = node
            .as_object_mut()
            .unwrap()
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(JsonMap::new()));
    }
    if !node.is_object() {
        *node = Value::Object(JsonMap::new());
    }
    let map = node.as_object_mut().unwrap();
    if value.is_null() {
        map.remove(last);
    } else {
        map.insert(last.clone(), value);
    }
}

fn etag_of(value: &Option<Value>) -> String {
    value
        .as_ref()
        .map(|v| v.to_string())
        .unwrap_or_else(|| "null".to_string())
}

#[async_trait]
impl Database for MemoryDatabase {
    async fn get(&self, path: &DatabasePath) -> DatabaseResult<Option<Value>> {
        self.touch();
        Ok(read_node(&self.root.lock().unwrap(), path.segments()))
    }

    async fn exists(&self, path: &DatabasePath) -> DatabaseResult<bool> {
        self.touch();
        Ok(read_node(&self.root.lock().unwrap(), path.segments()).is_some())
    }

    async fn set(&self, path: &DatabasePath, value: &Value) -> DatabaseResult<()> {
        self.touch();
        write_node(&mut self.root.lock().unwrap(), path.segments(), value.clone());
        Ok(())
    }

    async fn update(&self, path: &DatabasePath, children: &JsonMap) -> DatabaseResult<()> {
        self.touch();
        let mut root = self.root.lock().unwrap();
        for (key, value) in children {
            let child = key
                .split('/')
                .try_fold(path.clone(), |acc, segment| acc.child(segment))?;
            write_node(&mut root, child.segments(), value.clone());
        }
        Ok(())
    }

    async fn get_versioned(&self, path: &DatabasePath) -> DatabaseResult<Versioned> {
        self.touch();
        let value = read_node(&self.root.lock().unwrap(), path.segments());
        let etag = etag_of(&value);
        Ok(Versioned { value, etag })
    }

    async fn set_if_match(
        &self,
        path: &DatabasePath,
        value: &Value,
        etag: &str,
    ) -> DatabaseResult<()> {
        self.touch();
        let mut root = self.root.lock().unwrap();

        if let Some(race) = self.races.lock().unwrap().pop_front() {
            write_node(&mut root, path.segments(), race);
        }

        if etag_of(&read_node(&root, path.segments())) != etag {
            return Err(DatabaseError::PreconditionFailed(path.to_string()));
        }
        write_node(&mut root, path.segments(), value.clone());
        Ok(())
    }
}

// =============================================================================
// Blob storage
// =============================================================================

#[derive(Default)]
pub struct MemoryBlobStore {
    objects: Mutex<HashMap<String, (Vec<u8>, ContentType)>>,
    public_base_url: Option<String>,
    fail_uploads: bool,
}

impl MemoryBlobStore {
    /// Store serving objects from `base`.
    pub fn public(base: &str) -> Self {
        Self {
            public_base_url: Some(base.trim_end_matches('/').to_string()),
            ..Default::default()
        }
    }

    /// Store that accepts uploads but cannot produce URLs.
    pub fn private() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail_uploads: true,
            ..Default::default()
        }
    }

    pub fn object(&self, key: &str) -> Option<(Vec<u8>, ContentType)> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put_bytes(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: ContentType,
    ) -> StorageResult<UploadedBlob> {
        if self.fail_uploads {
            return Err(StorageError::upload_failed("bucket unavailable"));
        }
        let size = bytes.len() as u64;
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (bytes, content_type));
        Ok(UploadedBlob {
            key: key.to_string(),
            size,
            content_type,
            download_url: self
                .public_base_url
                .as_ref()
                .map(|base| format!("{}/{}", base, key)),
        })
    }
}

// =============================================================================
// Auth
// =============================================================================

/// Session that signs everyone in as a fixed user.
#[derive(Default)]
pub struct FakeAuthenticator {
    current: RwLock<Option<AuthUser>>,
    sign_in_as: Option<AuthUser>,
    sign_ins: AtomicUsize,
}

impl FakeAuthenticator {
    pub fn signed_out() -> Self {
        Self::default()
    }

    pub fn signed_in(uid: &str) -> Self {
        let user = AuthUser::new(UserId::from(uid));
        Self {
            current: RwLock::new(Some(user.clone())),
            sign_in_as: Some(user),
            sign_ins: AtomicUsize::new(0),
        }
    }

    /// Signed out; a sign-in yields `user`.
    pub fn accepting(user: AuthUser) -> Self {
        Self {
            sign_in_as: Some(user),
            ..Default::default()
        }
    }

    pub fn sign_ins(&self) -> usize {
        self.sign_ins.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Authenticator for FakeAuthenticator {
    fn current_user(&self) -> Option<AuthUser> {
        self.current.read().unwrap().clone()
    }

    async fn sign_in(&self, credential: &AuthCredential) -> AuthResult<AuthUser> {
        self.sign_ins.fetch_add(1, Ordering::SeqCst);
        assert_eq!(credential.provider_id(), "facebook.com");
        let user = self.sign_in_as.clone().ok_or(AuthError::Rejected {
            code: 400,
            message: "INVALID_IDP_RESPONSE".into(),
        })?;
        *self.current.write().unwrap() = Some(user.clone());
        Ok(user)
    }

    async fn sign_out(&self) {
        *self.current.write().unwrap() = None;
    }
}

pub enum Login {
    Cancel,
    Grant(&'static str),
    Fail(&'static str),
}

/// Identity provider with a scripted outcome.
pub struct FakeIdentityProvider {
    login: Login,
    requested: Mutex<Vec<Vec<ReadPermission>>>,
}

impl FakeIdentityProvider {
    pub fn new(login: Login) -> Self {
        Self {
            login,
            requested: Mutex::new(Vec::new()),
        }
    }

    /// Permission sets requested so far, one entry per login.
    pub fn requested(&self) -> Vec<Vec<ReadPermission>> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentityProvider {
    async fn log_in(
        &self,
        _ui: &UiContext,
        permissions: &[ReadPermission],
    ) -> AuthResult<LoginOutcome> {
        self.requested.lock().unwrap().push(permissions.to_vec());
        match self.login {
            Login::Cancel => Ok(LoginOutcome::Cancelled),
            Login::Grant(token) => Ok(LoginOutcome::Granted(ProviderToken::new(token))),
            Login::Fail(msg) => Err(AuthError::provider(msg)),
        }
    }
}

// =============================================================================
// Harness
// =============================================================================

pub struct Harness {
    pub database: Arc<MemoryDatabase>,
    pub storage: Arc<MemoryBlobStore>,
    pub auth: Arc<FakeAuthenticator>,
    pub identity: Arc<FakeIdentityProvider>,
    pub service: DataService,
}

impl Harness {
    pub fn new(storage: MemoryBlobStore, auth: FakeAuthenticator, login: Login) -> Self {
        let database = Arc::new(MemoryDatabase::new());
        let storage = Arc::new(storage);
        let auth = Arc::new(auth);
        let identity = Arc::new(FakeIdentityProvider::new(login));
        let service = DataService::new(
            database.clone(),
            storage.clone(),
            auth.clone(),
            identity.clone(),
        );
        Self {
            database,
            storage,
            auth,
            identity,
            service,
        }
    }

    pub fn signed_in(uid: &str) -> Self {
        Self::new(
            MemoryBlobStore::public("https://cdn.example.com"),
            FakeAuthenticator::signed_in(uid),
            Login::Cancel,
        )
    }

    pub fn signed_out() -> Self {
        Self::new(
            MemoryBlobStore::public("https://cdn.example.com"),
            FakeAuthenticator::signed_out(),
            Login::Cancel,
        )
    }
}
