//! The data service.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use swirl_auth::{
    AuthCredential, AuthUser, Authenticator, FirebaseAuth, FirebaseAuthClient, IdentityProvider,
    LoginOutcome, UiContext, READ_PERMISSIONS,
};
use swirl_database::{run_transaction, Database, DatabasePath, RealtimeDatabaseClient};
use swirl_models::{
    derive_username, placeholder_username, JsonMap, ModelResult, Post, PostId, Record, SwirlUser,
    UserId,
};
use swirl_storage::{BlobStorageClient, BlobStore, ContentType};
use tracing::{debug, info, info_span, Instrument};

use crate::config::{ServiceConfig, DEFAULT_INDEX_APPEND_ATTEMPTS};
use crate::contracts::{AuthDataServiceable, ProfileDataServiceable, SubmitPostDataServiceable};
use crate::error::{ServiceError, ServiceResult};
use crate::nodes::{DatabaseNodes, StorageNodes};

/// Facade over the database, blob storage, auth session, and identity provider.
///
/// Build one with [`DataService::new`] (explicit handles) or
/// [`DataService::connect`] (backends from configuration) and share it.
#[derive(Clone)]
pub struct DataService {
    database: Arc<dyn Database>,
    storage: Arc<dyn BlobStore>,
    auth: Arc<dyn Authenticator>,
    identity: Arc<dyn IdentityProvider>,
    index_append_attempts: u32,
}

impl DataService {
    pub fn new(
        database: Arc<dyn Database>,
        storage: Arc<dyn BlobStore>,
        auth: Arc<dyn Authenticator>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            database,
            storage,
            auth,
            identity,
            index_append_attempts: DEFAULT_INDEX_APPEND_ATTEMPTS,
        }
    }

    pub fn with_index_append_attempts(mut self, attempts: u32) -> Self {
        self.index_append_attempts = attempts.max(1);
        self
    }

    /// Wire the production backends: Firebase Auth session, Realtime Database
    /// authorized by that session, and S3-compatible blob storage.
    pub async fn connect(
        config: ServiceConfig,
        identity: Arc<dyn IdentityProvider>,
    ) -> ServiceResult<Self> {
        let session = Arc::new(FirebaseAuth::new(FirebaseAuthClient::new(config.auth)?));
        let database = Arc::new(RealtimeDatabaseClient::new(config.database, session.clone())?);
        let storage = Arc::new(BlobStorageClient::new(config.storage)?);

        info!("Data service connected");
        Ok(Self::new(database, storage, session, identity)
            .with_index_append_attempts(config.index_append_attempts))
    }

    fn session_user(&self) -> ServiceResult<AuthUser> {
        self.auth.current_user().ok_or(ServiceError::NoUser)
    }

    async fn fetch_user(&self, uid: &UserId) -> ServiceResult<SwirlUser> {
        let path = DatabaseNodes::user(uid)?;
        match self.database.get(&path).await? {
            Some(value @ Value::Object(_)) => Ok(SwirlUser::decode_value(value)?),
            _ => Err(ServiceError::no_data(&path)),
        }
    }

    /// Sign in to the backend with `credential` and make sure a user record exists.
    ///
    /// First-time users get a record with a username derived from their display
    /// name, or a random placeholder.
    pub async fn authenticate_with_firebase(
        &self,
        credential: &AuthCredential,
    ) -> ServiceResult<bool> {
        let user = self.auth.sign_in(credential).await?;
        let path = DatabaseNodes::user(&user.uid)?;

        if self.database.exists(&path).await? {
            debug!(uid = %user.uid, "Returning user");
            return Ok(true);
        }

        let username = user
            .display_name
            .as_deref()
            .and_then(derive_username)
            .unwrap_or_else(placeholder_username);
        let record = SwirlUser::new(user.uid.clone(), username);

        self.database.set(&path, &Value::Object(record.encode()?)).await?;
        info!(uid = %record.uid, username = %record.username, "Created user record");
        Ok(true)
    }

    /// Append `post_uid` to the owner's post index with a conditional write.
    async fn append_to_user_index(&self, owner: &UserId, post_uid: &PostId) -> ServiceResult<()> {
        match self.fetch_user(owner).await {
            Ok(_) => {}
            Err(ServiceError::NoData(_)) => return Err(ServiceError::NoUser),
            Err(e) => return Err(e),
        }

        let path = DatabaseNodes::user_post_uids(owner)?;
        run_transaction(
            self.database.as_ref(),
            &path,
            self.index_append_attempts,
            |current| {
                let mut uids: Vec<PostId> = match current {
                    Some(value) => serde_json::from_value(value.clone())?,
                    None => Vec::new(),
                };
                if !uids.contains(post_uid) {
                    uids.push(post_uid.clone());
                }
                Ok(serde_json::to_value(uids)?)
            },
        )
        .await?;

        Ok(())
    }
}

/// Decode an owner's post collection, in key order.
fn decode_posts(path: &DatabasePath, node: Value) -> ServiceResult<Vec<Post>> {
    match node {
        Value::Object(map) => {
            let mut children: Vec<(String, Value)> = map.into_iter().collect();
            children.sort_by(|a, b| a.0.cmp(&b.0));
            Ok(children
                .into_iter()
                .map(|(_, value)| Post::decode_value(value))
                .collect::<ModelResult<Vec<_>>>()?)
        }
        Value::Array(items) => Ok(items
            .into_iter()
            .filter(|item| !item.is_null())
            .map(Post::decode_value)
            .collect::<ModelResult<Vec<_>>>()?),
        _ => Err(ServiceError::no_data(path)),
    }
}

/// Order posts by their position in the user's index; unlisted posts keep their order at the end.
fn order_by_index(posts: &mut [Post], index: &[PostId]) {
    let rank: HashMap<&PostId, usize> = index.iter().enumerate().map(|(i, id)| (id, i)).collect();
    posts.sort_by_key(|post| rank.get(&post.uid).copied().unwrap_or(usize::MAX));
}

#[async_trait]
impl ProfileDataServiceable for DataService {
    async fn get_current_user(&self) -> ServiceResult<SwirlUser> {
        let session = self.session_user()?;
        self.fetch_user(&session.uid).await
    }

    async fn get_posts(&self, user: &SwirlUser) -> ServiceResult<Vec<Post>> {
        let path = DatabaseNodes::posts(&user.uid)?;
        let node = self
            .database
            .get(&path)
            .await?
            .ok_or_else(|| ServiceError::no_data(&path))?;

        let mut posts = decode_posts(&path, node)?;
        order_by_index(&mut posts, &user.post_uids);
        debug!(uid = %user.uid, count = posts.len(), "Loaded posts");
        Ok(posts)
    }
}

#[async_trait]
impl AuthDataServiceable for DataService {
    fn is_authenticated(&self) -> bool {
        self.auth.current_user().is_some()
    }

    async fn request_login(&self, ui: &UiContext) -> ServiceResult<bool> {
        match self.identity.log_in(ui, &READ_PERMISSIONS).await? {
            LoginOutcome::Cancelled => {
                debug!("Login cancelled");
                Ok(false)
            }
            LoginOutcome::Granted(token) => {
                let credential = AuthCredential::facebook(&token);
                self.authenticate_with_firebase(&credential).await
            }
        }
    }
}

#[async_trait]
impl SubmitPostDataServiceable for DataService {
    async fn submit_post(&self, video: &Path, title: &str) -> ServiceResult<PostId> {
        let owner = self.session_user()?.uid;
        let post_uid = PostId::new();
        let span = info_span!("submit_post", post_uid = %post_uid, owner_uid = %owner);

        async {
            debug!(video = %video.display(), "Reading video");
            let bytes = tokio::fs::read(video).await?;

            let key = StorageNodes::post_video(&post_uid);
            debug!(key = %key, size = bytes.len(), "Uploading video");
            let uploaded = self.storage.put_bytes(&key, bytes, ContentType::Video).await?;

            let url = uploaded.download_url.ok_or(ServiceError::NoDownloadUrl)?;
            debug!(url = %url, "Resolved download URL");

            let post = Post::new(post_uid.clone(), url, owner.clone(), title);
            let post = Value::Object(post.encode()?);
            let mut fan_out = JsonMap::new();
            fan_out.insert(DatabaseNodes::post(&post_uid)?.to_string(), post.clone());
            fan_out.insert(DatabaseNodes::owned_post(&owner, &post_uid)?.to_string(), post);
            self.database.update(&DatabasePath::root(), &fan_out).await?;
            debug!("Wrote post records");

            self.append_to_user_index(&owner, &post_uid).await?;
            info!("Post submitted");
            Ok::<_, ServiceError>(post_uid.clone())
        }
        .instrument(span)
        .await
    }
}
