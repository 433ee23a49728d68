//! End-to-end scenarios over the real services and pipelines, backed by in-memory stores.

use std::{
    collections::{BTreeMap, HashMap},
    sync::{Arc, Mutex},
};

use actix_web::{
    http::{
        header::{self, ContentType},
        StatusCode,
    },
    test, web, App,
};
use chrono::{DateTime, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::{
    api::error::SystemError,
    constants::{META_FILENAME, META_OWNER_ID, OWNER_RECIPIENT},
    modules::{
        download::{model::DownloadRequest, service::DownloadWorkflow},
        file::{
            repository::{DownloadRepository, FileRepository},
            schema::{download_id_prefix, DownloadRecord, FileRecord},
            service::FileService,
        },
        share::{
            model::{ShareBody, ShareRequest},
            service::ShareWorkflow,
        },
        storage::{
            repository::ObjectStore,
            schema::{ObjectMetadata, PresignedUrl},
        },
        user::{identity::IdentityProvider, model::UserInfo},
    },
    utils::Claims,
    ENV,
};

#[derive(Default)]
struct MemoryFiles {
    rows: Mutex<BTreeMap<(String, String), FileRecord>>,
}

impl MemoryFiles {
    fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl FileRepository for MemoryFiles {
    async fn find(
        &self,
        file_id: &str,
        recipient_email: &str,
    ) -> Result<Option<FileRecord>, SystemError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.get(&(file_id.to_string(), recipient_email.to_string())).cloned())
    }

    async fn find_by_file(&self, file_id: &str) -> Result<Vec<FileRecord>, SystemError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.values().filter(|r| r.file_id == file_id).cloned().collect())
    }

    async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<FileRecord>, SystemError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.values().filter(|r| r.owner_id == owner_id).cloned().collect())
    }

    async fn find_by_recipient(
        &self,
        recipient_email: &str,
    ) -> Result<Vec<FileRecord>, SystemError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.values().filter(|r| r.recipient_email == recipient_email).cloned().collect())
    }

    async fn put_many(&self, records: &[FileRecord]) -> Result<(), SystemError> {
        let mut rows = self.rows.lock().unwrap();
        for record in records {
            rows.insert((record.file_id.clone(), record.recipient_email.clone()), record.clone());
        }
        Ok(())
    }

    async fn delete_many(
        &self,
        file_id: &str,
        recipient_emails: &[String],
    ) -> Result<u64, SystemError> {
        let mut rows = self.rows.lock().unwrap();
        let mut deleted = 0;
        for email in recipient_emails {
            if rows.remove(&(file_id.to_string(), email.clone())).is_some() {
                deleted += 1;
            }
        }
        Ok(deleted)
    }
}

/// Keyed like the download table; a repeated key keeps the first row.
#[derive(Default)]
struct MemoryDownloads {
    rows: Mutex<BTreeMap<(String, String), DownloadRecord>>,
}

#[async_trait::async_trait]
impl DownloadRepository for MemoryDownloads {
    async fn create(&self, record: &DownloadRecord) -> Result<(), SystemError> {
        self.rows
            .lock()
            .unwrap()
            .entry((record.file_id.clone(), record.download_id.clone()))
            .or_insert_with(|| record.clone());
        Ok(())
    }

    async fn count(&self, file_id: &str, user_id: &str) -> Result<i64, SystemError> {
        let prefix = download_id_prefix(user_id);
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .values()
            .filter(|r| r.file_id == file_id && r.download_id.starts_with(&prefix))
            .count() as i64)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, SystemError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|_, r| r.expires_at > now);
        Ok((before - rows.len()) as u64)
    }
}

/// Signed URLs are fake; an upload only lands once `simulate_put` is called.
#[derive(Default)]
struct MemoryObjects {
    pending: Mutex<BTreeMap<String, (String, HashMap<String, String>)>>,
    objects: Mutex<BTreeMap<String, ObjectMetadata>>,
}

impl MemoryObjects {
    fn simulate_put(&self, key: &str, size: i64) {
        let (content_type, meta) =
            self.pending.lock().unwrap().remove(key).expect("no upload url issued for key");
        self.objects.lock().unwrap().insert(
            key.to_string(),
            ObjectMetadata {
                filename: meta[META_FILENAME].clone(),
                size,
                content_type,
                owner_id: meta[META_OWNER_ID].clone(),
            },
        );
    }

    fn contains(&self, key: &str) -> bool {
        self.objects.lock().unwrap().contains_key(key)
    }
}

#[async_trait::async_trait]
impl ObjectStore for MemoryObjects {
    async fn presign_upload(
        &self,
        key: &str,
        content_type: &str,
        metadata: &[(&str, &str)],
    ) -> Result<PresignedUrl, SystemError> {
        let meta = metadata.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        self.pending.lock().unwrap().insert(key.to_string(), (content_type.to_string(), meta));
        let headers = BTreeMap::from([("content-type".to_string(), content_type.to_string())]);
        Ok(PresignedUrl { url: format!("memory://put/{key}"), headers })
    }

    async fn presign_download(
        &self,
        key: &str,
        metadata: &[(&str, &str)],
    ) -> Result<PresignedUrl, SystemError> {
        let query = metadata
            .iter()
            .map(|(k, v)| format!("x-amz-meta-{k}={}", urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        Ok(PresignedUrl { url: format!("memory://get/{key}?{query}"), headers: BTreeMap::new() })
    }

    async fn head(&self, key: &str) -> Result<Option<ObjectMetadata>, SystemError> {
        Ok(self.objects.lock().unwrap().get(key).cloned())
    }

    async fn delete(&self, key: &str) -> Result<(), SystemError> {
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }
}

#[derive(Default)]
struct Directory {
    users: Mutex<HashMap<String, UserInfo>>,
}

impl Directory {
    fn add(&self, email: &str, name: &str) -> String {
        let now = Utc::now();
        let user = UserInfo {
            id: Uuid::now_v7(),
            email: email.to_string(),
            name: name.to_string(),
            email_verified: true,
            date_created: now,
            date_last_modified: now,
        };
        let id = user.id.to_string();
        self.users.lock().unwrap().insert(id.clone(), user);
        id
    }
}

#[async_trait::async_trait]
impl IdentityProvider for Directory {
    async fn get_user(&self, user_id: &str) -> Result<UserInfo, SystemError> {
        self.users
            .lock()
            .unwrap()
            .get(user_id)
            .cloned()
            .ok_or_else(|| SystemError::not_found("User not found"))
    }
}

struct Harness {
    files: Arc<MemoryFiles>,
    downloads: Arc<MemoryDownloads>,
    objects: Arc<MemoryObjects>,
    directory: Arc<Directory>,
    file_service: FileService,
    share: web::Data<ShareWorkflow>,
    download: web::Data<DownloadWorkflow>,
}

impl Harness {
    fn new() -> Self {
        let files = Arc::new(MemoryFiles::default());
        let downloads = Arc::new(MemoryDownloads::default());
        let objects = Arc::new(MemoryObjects::default());
        let directory = Arc::new(Directory::default());

        let file_service =
            FileService::with_dependencies(files.clone(), objects.clone(), directory.clone());
        let share = web::Data::new(ShareWorkflow::with_dependencies(
            files.clone(),
            objects.clone(),
            directory.clone(),
            "http://localhost:8080",
        ));
        let download = web::Data::new(DownloadWorkflow::with_dependencies(
            files.clone(),
            downloads.clone(),
            objects.clone(),
            directory.clone(),
            chrono::Duration::days(90),
        ));

        Harness { files, downloads, objects, directory, file_service, share, download }
    }

    async fn upload(&self, user_id: &str, filename: &str) -> String {
        let response = self.file_service.create_upload_url(user_id, filename).await.unwrap();
        self.objects.simulate_put(&format!("{user_id}/{}", response.file_id), 128);
        response.file_id
    }

    async fn share(
        &self,
        user_id: &str,
        file_id: &str,
        body: &str,
    ) -> Result<Vec<String>, SystemError> {
        let body: ShareBody = serde_json::from_str(body).unwrap();
        let request = ShareRequest::new(user_id.to_string(), file_id.to_string(), body);
        self.share.run(request).await.map(|r| r.recipients)
    }

    async fn download(&self, user_id: &str, file_id: &str) -> Result<String, SystemError> {
        self.download
            .run(DownloadRequest { user_id: user_id.to_string(), file_id: file_id.to_string() })
            .await
    }
}

fn is_forbidden(result: Result<impl std::fmt::Debug, SystemError>) -> bool {
    matches!(result, Err(SystemError::Forbidden(_)))
}

#[actix_web::test]
async fn test_share_without_recipients_is_rejected_before_persist() {
    let h = Harness::new();
    let owner = h.directory.add("owner@example.com", "Owner");
    let file_id = h.upload(&owner, "report.pdf").await;

    let err = h.share(&owner, &file_id, r#"{"downloadLimit": 1}"#).await.unwrap_err();
    assert!(matches!(err, SystemError::BadRequest(msg) if msg == "Share request is invalid"));
    assert_eq!(h.files.len(), 0);
}

#[actix_web::test]
async fn test_upload_share_and_list() {
    let h = Harness::new();
    let owner = h.directory.add("owner@example.com", "Owner");
    let alice = h.directory.add("a@example.com", "Alice");
    let file_id = h.upload(&owner, "report.pdf").await;

    let shared = h
        .share(
            &owner,
            &file_id,
            r#"{"recipients":[{"recipientEmail":"a@example.com","notify":true},{"recipientEmail":"b@example.com"}]}"#,
        )
        .await
        .unwrap();
    assert_eq!(shared, vec!["a@example.com", "b@example.com"]);

    let owner_record = h.files.find_owner_record(&file_id).await.unwrap().unwrap();
    assert_eq!(owner_record.recipient_email, OWNER_RECIPIENT);
    assert_eq!(owner_record.owner_email, "owner@example.com");
    assert_eq!(owner_record.owner_name, "Owner");
    assert_eq!(owner_record.filename, "report.pdf");
    assert_eq!(owner_record.content_type, "application/pdf");
    assert_eq!(owner_record.size, 128);

    let listed = h.file_service.get_shared_files(&alice).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].file.file_id, file_id);
    assert_eq!(listed[0].notify, Some(true));

    let owned = h.file_service.get_owned_files(&owner).await.unwrap();
    assert_eq!(owned.len(), 1);
    assert_eq!(owned[0].recipients.len(), 2);
}

#[actix_web::test]
async fn test_sharing_twice_replaces_the_recipient_record() {
    let h = Harness::new();
    let owner = h.directory.add("owner@example.com", "Owner");
    let alice = h.directory.add("a@example.com", "Alice");
    let file_id = h.upload(&owner, "notes.txt").await;

    h.share(&owner, &file_id, r#"{"recipients":[{"recipientEmail":"a@example.com"}]}"#)
        .await
        .unwrap();
    let first_owner = h.files.find_owner_record(&file_id).await.unwrap().unwrap();

    h.share(
        &owner,
        &file_id,
        r#"{"recipients":[{"recipientEmail":"a@example.com","downloadLimit":2},{"recipientEmail":"a@example.com","downloadLimit":7}],"downloadLimit":3}"#,
    )
    .await
    .unwrap();

    assert_eq!(h.files.len(), 2);
    assert_eq!(h.files.find_owner_record(&file_id).await.unwrap().unwrap(), first_owner);

    let shared = h.file_service.get_shared_files(&alice).await.unwrap();
    assert_eq!(shared.len(), 1);
    assert_eq!(shared[0].file.download_limit, Some(7));
}

#[actix_web::test]
async fn test_request_level_limits_apply_unless_overridden() {
    let h = Harness::new();
    let owner = h.directory.add("owner@example.com", "Owner");
    let file_id = h.upload(&owner, "notes.txt").await;

    h.share(
        &owner,
        &file_id,
        r#"{
            "recipients":[
                {"recipientEmail":"a@example.com"},
                {"recipientEmail":"b@example.com","downloadLimit":1,"expiryDate":"2040-01-01"}
            ],
            "downloadLimit":5,
            "expiryDate":"2035-01-01T00:00:00Z"
        }"#,
    )
    .await
    .unwrap();

    let a = h.files.find(&file_id, "a@example.com").await.unwrap().unwrap();
    assert_eq!(a.download_limit, Some(5));
    assert_eq!(a.expiry_date.unwrap().to_rfc3339(), "2035-01-01T00:00:00+00:00");

    let b = h.files.find(&file_id, "b@example.com").await.unwrap().unwrap();
    assert_eq!(b.download_limit, Some(1));
    assert_eq!(b.expiry_date.unwrap().to_rfc3339(), "2040-01-01T00:00:00+00:00");
    assert!(b.date_shared.is_some());
}

#[actix_web::test]
async fn test_only_the_owner_can_share() {
    let h = Harness::new();
    let owner = h.directory.add("owner@example.com", "Owner");
    let mallory = h.directory.add("m@example.com", "Mallory");
    let file_id = h.upload(&owner, "secret.txt").await;

    let result = h
        .share(&mallory, &file_id, r#"{"recipients":[{"recipientEmail":"m2@example.com"}]}"#)
        .await;
    assert!(matches!(
        result,
        Err(SystemError::Forbidden(msg)) if msg == "User is not authorized to share this file"
    ));
    assert_eq!(h.files.len(), 0);
}

#[actix_web::test]
async fn test_sharing_a_file_not_yet_uploaded_is_forbidden() {
    let h = Harness::new();
    let owner = h.directory.add("owner@example.com", "Owner");
    let response = h.file_service.create_upload_url(&owner, "later.bin").await.unwrap();

    let result = h
        .share(&owner, &response.file_id, r#"{"recipients":[{"recipientEmail":"a@example.com"}]}"#)
        .await;
    assert!(is_forbidden(result));
}

#[actix_web::test]
async fn test_unknown_requester_fails_identity_resolution() {
    let h = Harness::new();
    let result = h.download(&Uuid::now_v7().to_string(), "f1").await;
    assert!(matches!(result, Err(SystemError::NotFound(_))));
}

#[actix_web::test]
async fn test_download_limit_is_enforced() {
    let h = Harness::new();
    let owner = h.directory.add("owner@example.com", "Owner");
    let alice = h.directory.add("a@example.com", "Alice");
    let file_id = h.upload(&owner, "report.pdf").await;

    h.share(&owner, &file_id, r#"{"recipients":[{"recipientEmail":"a@example.com"}],"downloadLimit":1}"#)
        .await
        .unwrap();

    let url = h.download(&alice, &file_id).await.unwrap();
    assert!(url.starts_with(&format!("memory://get/{owner}/{file_id}?")));
    assert!(url.contains(&format!("x-amz-meta-recipient-id={alice}")));
    assert!(url.contains("x-amz-meta-recipient-email=a%40example.com"));
    assert!(url.contains("x-amz-meta-filename=report.pdf"));

    assert!(is_forbidden(h.download(&alice, &file_id).await));
    assert_eq!(h.downloads.count(&file_id, &alice).await.unwrap(), 1);
}

#[actix_web::test]
async fn test_expired_share_is_denied_regardless_of_count() {
    let h = Harness::new();
    let owner = h.directory.add("owner@example.com", "Owner");
    let alice = h.directory.add("a@example.com", "Alice");
    let file_id = h.upload(&owner, "report.pdf").await;

    h.share(
        &owner,
        &file_id,
        r#"{"recipients":[{"recipientEmail":"a@example.com","downloadLimit":10}],"expiryDate":"2000-01-01"}"#,
    )
    .await
    .unwrap();

    assert!(is_forbidden(h.download(&alice, &file_id).await));
    assert_eq!(h.downloads.count(&file_id, &alice).await.unwrap(), 0);
}

#[actix_web::test]
async fn test_owner_and_strangers() {
    let h = Harness::new();
    let owner = h.directory.add("owner@example.com", "Owner");
    let stranger = h.directory.add("s@example.com", "Stranger");
    let file_id = h.upload(&owner, "report.pdf").await;
    h.share(&owner, &file_id, r#"{"recipients":[{"recipientEmail":"a@example.com"}]}"#)
        .await
        .unwrap();

    assert!(h.download(&owner, &file_id).await.is_ok());
    assert!(h.download(&owner, &file_id).await.is_ok());
    assert!(is_forbidden(h.download(&stranger, &file_id).await));
    assert!(is_forbidden(h.download(&owner, "missing").await));
}

#[actix_web::test]
async fn test_delete_file_removes_every_trace() {
    let h = Harness::new();
    let owner = h.directory.add("owner@example.com", "Owner");
    let alice = h.directory.add("a@example.com", "Alice");
    let bob = h.directory.add("b@example.com", "Bob");
    let file_id = h.upload(&owner, "report.pdf").await;
    let kept_id = h.upload(&owner, "kept.pdf").await;

    h.share(
        &owner,
        &file_id,
        r#"{"recipients":[{"recipientEmail":"a@example.com"},{"recipientEmail":"b@example.com"}]}"#,
    )
    .await
    .unwrap();
    h.share(&owner, &kept_id, r#"{"recipients":[{"recipientEmail":"a@example.com"}]}"#)
        .await
        .unwrap();

    assert!(is_forbidden(h.file_service.delete_file(&alice, &file_id).await));

    h.file_service.delete_file(&owner, &file_id).await.unwrap();

    assert!(h.files.find_by_file(&file_id).await.unwrap().is_empty());
    assert!(!h.objects.contains(&format!("{owner}/{file_id}")));
    assert!(h.objects.contains(&format!("{owner}/{kept_id}")));

    let owned = h.file_service.get_owned_files(&owner).await.unwrap();
    assert_eq!(owned.len(), 1);
    assert_eq!(owned[0].file.file_id, kept_id);

    let alice_shared = h.file_service.get_shared_files(&alice).await.unwrap();
    assert!(alice_shared.iter().all(|f| f.file.file_id != file_id));
    assert!(h.file_service.get_shared_files(&bob).await.unwrap().is_empty());
    assert!(is_forbidden(h.download(&alice, &file_id).await));
}

#[actix_web::test]
async fn test_delete_recipients_keeps_the_file() {
    let h = Harness::new();
    let owner = h.directory.add("owner@example.com", "Owner");
    let alice = h.directory.add("a@example.com", "Alice");
    let file_id = h.upload(&owner, "report.pdf").await;
    h.share(
        &owner,
        &file_id,
        r#"{"recipients":[{"recipientEmail":"a@example.com"},{"recipientEmail":"b@example.com"}]}"#,
    )
    .await
    .unwrap();

    let denied = h
        .file_service
        .delete_recipients(&alice, &file_id, vec!["b@example.com".into()])
        .await;
    assert!(is_forbidden(denied));

    let deleted = h
        .file_service
        .delete_recipients(
            &owner,
            &file_id,
            vec!["a@example.com".into(), OWNER_RECIPIENT.into(), "nobody@example.com".into()],
        )
        .await
        .unwrap();
    assert_eq!(deleted, 1);

    assert!(h.files.find_owner_record(&file_id).await.unwrap().is_some());
    assert!(h.objects.contains(&format!("{owner}/{file_id}")));
    assert!(h.file_service.get_shared_files(&alice).await.unwrap().is_empty());
    assert!(is_forbidden(h.download(&alice, &file_id).await));
}

#[actix_web::test]
async fn test_upload_requires_a_filename() {
    let h = Harness::new();
    let owner = h.directory.add("owner@example.com", "Owner");
    let err = h.file_service.create_upload_url(&owner, "").await.unwrap_err();
    assert!(matches!(err, SystemError::BadRequest(msg) if msg == "File path parameter is missing"));

    let response = h.file_service.create_upload_url(&owner, "photo.png").await.unwrap();
    assert_eq!(response.headers["content-type"], "image/png");
    assert!(Uuid::parse_str(&response.file_id).is_ok());
}

#[actix_web::test]
async fn test_purge_drops_only_expired_downloads() {
    let downloads = MemoryDownloads::default();
    let now = Utc::now();
    downloads
        .create(&DownloadRecord::new("f1", "u1", now - chrono::Duration::days(100), chrono::Duration::days(90)))
        .await
        .unwrap();
    downloads
        .create(&DownloadRecord::new("f1", "u1", now, chrono::Duration::days(90)))
        .await
        .unwrap();

    assert_eq!(downloads.purge_expired(now).await.unwrap(), 1);
    assert_eq!(downloads.count("f1", "u1").await.unwrap(), 1);
}

#[actix_web::test]
async fn test_same_download_key_twice_is_recorded_once() {
    let downloads = MemoryDownloads::default();
    let record = DownloadRecord::new("f1", "u1", Utc::now(), chrono::Duration::days(90));

    downloads.create(&record).await.unwrap();
    downloads.create(&record).await.unwrap();

    assert_eq!(downloads.count("f1", "u1").await.unwrap(), 1);
}

#[actix_web::test]
async fn test_duplicate_recipients_are_written_once() {
    let h = Harness::new();
    let owner = h.directory.add("owner@example.com", "Owner");
    let file_id = h.upload(&owner, "notes.txt").await;

    let shared = h
        .share(
            &owner,
            &file_id,
            r#"{"recipients":[
                {"recipientEmail":"a@example.com","notify":true},
                {"recipientEmail":"b@example.com"},
                {"recipientEmail":"a@example.com","notify":false}
            ]}"#,
        )
        .await
        .unwrap();
    assert_eq!(shared, vec!["b@example.com", "a@example.com"]);

    let a = h.files.find(&file_id, "a@example.com").await.unwrap().unwrap();
    assert_eq!(a.notify, Some(false));
}

/// Signs a bearer token the authentication middleware accepts.
fn bearer(user_id: &str) -> (header::HeaderName, String) {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        for (key, value) in [
            ("SECRET_KEY", "fileshare-test-secret"),
            ("DATABASE_URL", "postgres://localhost/fileshare"),
            ("REDIS_URL", "redis://127.0.0.1:6379"),
            ("FILE_TABLE", "files"),
            ("DOWNLOAD_TABLE", "downloads"),
            ("USER_TABLE", "users"),
            ("BUCKET_NAME", "fileshare-test"),
            ("REGION", "us-east-1"),
        ] {
            if std::env::var(key).is_err() {
                std::env::set_var(key, value);
            }
        }
    });

    let id = Uuid::parse_str(user_id).unwrap();
    let token = Claims::new(&id, 600).encode(ENV.jwt_secret.as_bytes()).unwrap();
    (header::AUTHORIZATION, format!("Bearer {token}"))
}

/// The `/api` tree as mounted by the server, over the harness stores.
macro_rules! api_app {
    ($h:expr) => {
        test::init_service(
            App::new()
                .app_data(crate::utils::json_error_config())
                .app_data(web::Data::new($h.file_service.clone()))
                .app_data($h.share.clone())
                .app_data($h.download.clone())
                .service(web::scope("/api").configure(crate::api_configure)),
        )
        .await
    };
}

/// Status and JSON body, whether the handler or the middleware answered.
macro_rules! send {
    ($app:expr, $req:expr) => {{
        let res = match test::try_call_service(&$app, $req).await {
            Ok(res) => res.into_parts().1.map_into_boxed_body(),
            Err(err) => err.error_response(),
        };
        let status = res.status();
        let bytes = actix_web::body::to_bytes(res.into_body()).await.unwrap_or_default();
        let body: serde_json::Value =
            serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, body)
    }};
}

#[actix_web::test]
async fn test_http_upload_share_download() {
    let h = Harness::new();
    let owner = h.directory.add("owner@example.com", "Owner");
    let alice = h.directory.add("a@example.com", "Alice");
    let app = api_app!(h);

    let req = test::TestRequest::get()
        .uri("/api/upload/report.pdf")
        .insert_header(bearer(&owner))
        .to_request();
    let (status, body) = send!(app, req);
    assert_eq!(status, StatusCode::OK);
    let file_id = body["data"]["fileId"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["uploadUrl"], format!("memory://put/{owner}/{file_id}"));
    assert_eq!(body["data"]["headers"]["content-type"], "application/pdf");
    h.objects.simulate_put(&format!("{owner}/{file_id}"), 2048);

    let req = test::TestRequest::post()
        .uri(&format!("/api/share/{file_id}"))
        .insert_header(bearer(&owner))
        .set_json(json!({
            "recipients": [{ "recipientEmail": "a@example.com" }],
            "downloadLimit": 1
        }))
        .to_request();
    let (status, body) = send!(app, req);
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!({ "fileId": file_id, "recipients": ["a@example.com"] }));

    let req = test::TestRequest::get()
        .uri("/api/shared-files")
        .insert_header(bearer(&alice))
        .to_request();
    let (status, body) = send!(app, req);
    assert_eq!(status, StatusCode::OK);
    let shared = body["data"].as_array().unwrap();
    assert_eq!(shared.len(), 1);
    assert_eq!(shared[0]["fileId"], file_id.as_str());
    assert_eq!(shared[0]["recipientEmail"], "a@example.com");
    assert_eq!(shared[0]["size"], 2048);
    assert_eq!(shared[0]["downloadLimit"], 1);

    let download = || {
        test::TestRequest::get()
            .uri(&format!("/api/download/{file_id}"))
            .insert_header(bearer(&alice))
            .to_request()
    };
    let (status, body) = send!(app, download());
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["downloadUrl"]
        .as_str()
        .unwrap()
        .starts_with(&format!("memory://get/{owner}/{file_id}?")));

    let (status, body) = send!(app, download());
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "User is not authorized to download or file does not exist");
}

#[actix_web::test]
async fn test_http_requires_a_valid_bearer_token() {
    let h = Harness::new();
    let app = api_app!(h);

    let req = test::TestRequest::get().uri("/api/owned-files").to_request();
    let (status, body) = send!(app, req);
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token Invalid or Expired");

    let req = test::TestRequest::get()
        .uri("/api/owned-files")
        .insert_header((header::AUTHORIZATION, "Bearer not-a-token"))
        .to_request();
    let (status, _) = send!(app, req);
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn test_http_malformed_bodies_get_generic_messages() {
    let h = Harness::new();
    let owner = h.directory.add("owner@example.com", "Owner");
    let file_id = h.upload(&owner, "report.pdf").await;
    let app = api_app!(h);

    for body in [
        json!({ "recipients": [{ "notify": true }] }),
        json!({ "recipients": [{ "recipientEmail": "a@example.com", "downloadLimit": "two" }] }),
        json!({}),
    ] {
        let req = test::TestRequest::post()
            .uri(&format!("/api/share/{file_id}"))
            .insert_header(bearer(&owner))
            .set_json(body)
            .to_request();
        let (status, body) = send!(app, req);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Share request is invalid");
    }

    let req = test::TestRequest::delete()
        .uri(&format!("/api/owned-files/{file_id}/recipients"))
        .insert_header(bearer(&owner))
        .insert_header(ContentType::json())
        .set_payload("{not json")
        .to_request();
    let (status, body) = send!(app, req);
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid request");

    let req = test::TestRequest::delete()
        .uri(&format!("/api/owned-files/{file_id}/recipients"))
        .insert_header(bearer(&owner))
        .set_json(json!({ "recipients": [] }))
        .to_request();
    let (status, body) = send!(app, req);
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid request");

    assert_eq!(h.files.len(), 0);
}

#[actix_web::test]
async fn test_http_delete_file_clears_listings() {
    let h = Harness::new();
    let owner = h.directory.add("owner@example.com", "Owner");
    let alice = h.directory.add("a@example.com", "Alice");
    let file_id = h.upload(&owner, "report.pdf").await;
    h.share(&owner, &file_id, r#"{"recipients":[{"recipientEmail":"a@example.com"}]}"#)
        .await
        .unwrap();
    let app = api_app!(h);

    let req = test::TestRequest::get()
        .uri("/api/owned-files")
        .insert_header(bearer(&owner))
        .to_request();
    let (status, body) = send!(app, req);
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["fileId"], file_id.as_str());
    assert_eq!(body["data"][0]["recipients"][0]["recipientEmail"], "a@example.com");

    let req = test::TestRequest::delete()
        .uri(&format!("/api/owned-files/{file_id}"))
        .insert_header(bearer(&alice))
        .to_request();
    let (status, _) = send!(app, req);
    assert_eq!(status, StatusCode::FORBIDDEN);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/owned-files/{file_id}"))
        .insert_header(bearer(&owner))
        .to_request();
    let (status, _) = send!(app, req);
    assert_eq!(status, StatusCode::OK);

    for user in [&owner, &alice] {
        let uri = if user == &owner { "/api/owned-files" } else { "/api/shared-files" };
        let req = test::TestRequest::get().uri(uri).insert_header(bearer(user)).to_request();
        let (status, body) = send!(app, req);
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], json!([]));
    }
}
