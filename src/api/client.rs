//! HTTP client for the marketplace backend

use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::{StatusCode, Url};
use serde::Serialize;
use serde_json::{json, Value};

use crate::api::error::ApiError;
use crate::api::wire::{self, RegistrationReceipt};
use crate::core::config::Config;
use crate::core::session::{Session, SessionContext};
use crate::entities::address::AddressHierarchy;
use crate::entities::admin::{ApprovalDecision, DashboardSummary, PendingBusiness};
use crate::entities::reference::{ReferenceData, ReferenceItem, ReferenceKind};
use crate::wizard::submission::{SubmissionPayload, COVER_FIELD, REGISTRATION_FIELD};

const ADDRESS_ENDPOINT: &str = "address/getaddress";
const REGISTER_ENDPOINT: &str = "businesses/register";
const LOGIN_ENDPOINT: &str = "auth/login";
const DASHBOARD_ENDPOINT: &str = "admin/dashboard";
const PENDING_ENDPOINT: &str = "admin/pending";

/// What the registration wizard needs from a backend
pub trait RegistrationBackend {
    /// Full address tree
    fn address_hierarchy(&self) -> Result<AddressHierarchy, ApiError>;

    /// One reference list
    fn reference_list(&self, kind: ReferenceKind) -> Result<Vec<ReferenceItem>, ApiError>;

    /// Submit a registration
    fn register_business(&self, payload: &SubmissionPayload) -> Result<RegistrationReceipt, ApiError>;
}

/// Fetch every reference list. A failed fetch leaves that list empty so the
/// form stays usable; membership checks are skipped for empty lists.
pub fn load_reference_data(backend: &dyn RegistrationBackend) -> ReferenceData {
    let mut data = ReferenceData::default();
    for kind in [
        ReferenceKind::Banks,
        ReferenceKind::AccountTypes,
        ReferenceKind::BusinessTypes,
        ReferenceKind::OwnershipTypes,
    ] {
        let items = match backend.reference_list(kind) {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(list = kind.label(), error = %e, "reference list unavailable");
                Vec::new()
            }
        };
        match kind {
            ReferenceKind::Banks => data.banks = items,
            ReferenceKind::AccountTypes => data.account_types = items,
            ReferenceKind::BusinessTypes => data.business_types = items,
            ReferenceKind::OwnershipTypes => data.ownership_types = items,
        }
    }
    data
}

/// Fetch the address tree, falling back to an empty one
pub fn load_address_hierarchy(backend: &dyn RegistrationBackend) -> AddressHierarchy {
    backend.address_hierarchy().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "address hierarchy unavailable; parish will be free text");
        AddressHierarchy::default()
    })
}

/// Blocking client bound to one base URL and one session
pub struct ApiClient {
    http: Client,
    base: Url,
    session: SessionContext,
}

impl ApiClient {
    pub fn new(config: &Config, session: SessionContext) -> Result<Self, ApiError> {
        let raw = config.api_url();
        let base = Url::parse(&raw).map_err(|e| ApiError::InvalidUrl {
            url: raw.clone(),
            message: e.to_string(),
        })?;
        let http = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("innkeeper/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Network {
                endpoint: raw,
                message: e.to_string(),
            })?;
        Ok(Self { http, base, session })
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Absolute URL of an endpoint
    pub fn url(&self, endpoint: &str) -> Result<Url, ApiError> {
        self.base.join(endpoint).map_err(|e| ApiError::InvalidUrl {
            url: format!("{}{}", self.base, endpoint),
            message: e.to_string(),
        })
    }

    /// Log in and start a session
    pub fn login(&self, email: &str, password: &str) -> Result<Session, ApiError> {
        let body = self.post_json(LOGIN_ENDPOINT, &json!({ "email": email, "password": password }))?;
        let session = wire::session(body)?;
        if let Err(e) = self.session.begin(session.clone()) {
            tracing::warn!(error = %e, "session could not be saved; it will last for this run only");
        }
        Ok(session)
    }

    pub fn dashboard(&self) -> Result<DashboardSummary, ApiError> {
        self.require_session()?;
        wire::dashboard(self.get(DASHBOARD_ENDPOINT)?)
    }

    pub fn pending_businesses(&self) -> Result<Vec<PendingBusiness>, ApiError> {
        self.require_session()?;
        wire::pending_businesses(self.get(PENDING_ENDPOINT)?)
    }

    /// Approve or reject a registration, returning the server's message
    pub fn decide(&self, decision: &ApprovalDecision) -> Result<String, ApiError> {
        self.require_session()?;
        let body = self.post_json(decision.endpoint(), decision)?;
        let message = wire::message_of(&body);
        wire::unwrap_envelope(body)?;
        Ok(message.unwrap_or_else(|| format!("Business {} marked {}", decision.business_id, decision.status)))
    }

    fn require_session(&self) -> Result<(), ApiError> {
        if self.session.is_authenticated() {
            Ok(())
        } else {
            Err(ApiError::NotAuthenticated)
        }
    }

    fn get(&self, endpoint: &str) -> Result<Value, ApiError> {
        let url = self.url(endpoint)?;
        self.send(endpoint, self.http.get(url))
    }

    fn post_json<T: Serialize + ?Sized>(&self, endpoint: &str, body: &T) -> Result<Value, ApiError> {
        let url = self.url(endpoint)?;
        self.send(endpoint, self.http.post(url).json(body))
    }

    /// Attach the bearer token, send, and turn non-2xx statuses into errors.
    /// A 401 ends the session, except on login where it means bad credentials.
    fn send(&self, endpoint: &str, request: RequestBuilder) -> Result<Value, ApiError> {
        let request = match self.session.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        tracing::debug!(endpoint, "request");
        let response = request.send().map_err(|e| ApiError::Network {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED && endpoint != LOGIN_ENDPOINT {
            tracing::info!(endpoint, "session rejected by server");
            self.session.end();
            return Err(ApiError::SessionExpired);
        }

        let text = response.text().map_err(|e| ApiError::Network {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })?;
        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        if !status.is_success() {
            let message = wire::message_of(&body).unwrap_or_else(|| {
                format!(
                    "Request failed with status {}",
                    status.canonical_reason().unwrap_or(status.as_str())
                )
            });
            tracing::debug!(endpoint, status = status.as_u16(), %message, "request rejected");
            return Err(ApiError::Rejected {
                status: Some(status.as_u16()),
                message,
            });
        }
        Ok(body)
    }
}

impl RegistrationBackend for ApiClient {
    fn address_hierarchy(&self) -> Result<AddressHierarchy, ApiError> {
        wire::address_hierarchy(self.get(ADDRESS_ENDPOINT)?)
    }

    fn reference_list(&self, kind: ReferenceKind) -> Result<Vec<ReferenceItem>, ApiError> {
        wire::reference_items(kind.endpoint(), self.get(kind.endpoint())?)
    }

    fn register_business(&self, payload: &SubmissionPayload) -> Result<RegistrationReceipt, ApiError> {
        let form = multipart_form(payload)?;
        let url = self.url(REGISTER_ENDPOINT)?;
        tracing::info!(
            reference = %payload.reference,
            files = payload.files.len(),
            "submitting registration"
        );
        let body = self.send(REGISTER_ENDPOINT, self.http.post(url).multipart(form))?;
        wire::registration_receipt(body)
    }
}

/// Build the multipart body: the JSON document, the cover index, and one
/// part per file
pub fn multipart_form(payload: &SubmissionPayload) -> Result<Form, ApiError> {
    let registration = Part::text(payload.registration_json())
        .mime_str("application/json")
        .map_err(|e| ApiError::decode(REGISTER_ENDPOINT, e.to_string()))?;

    let mut form = Form::new()
        .part(REGISTRATION_FIELD, registration)
        .text(COVER_FIELD, payload.cover_image_index.to_string());

    for file in &payload.files {
        let bytes = std::fs::read(&file.path).map_err(|source| ApiError::File {
            path: file.path.clone(),
            source,
        })?;
        let part = Part::bytes(bytes)
            .file_name(file.file_name.clone())
            .mime_str(&file.content_type)
            .map_err(|e| ApiError::decode(REGISTER_ENDPOINT, e.to_string()))?;
        form = form.part(file.field, part);
    }
    Ok(form)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::session::{SessionStore, UserProfile};
    use crate::entities::address::tests::sample_hierarchy;
    use crate::wizard::submission::{FilePart, IMAGES_FIELD};
    use std::cell::RefCell;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::thread::JoinHandle;
    use tempfile::TempDir;

    /// Answer one request with `status` and a JSON body; the thread returns
    /// the raw request it received
    fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/api/", listener.local_addr().unwrap());
        let handle = std::thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);
            let mut head = String::new();
            let mut length = 0usize;
            let mut chunked = false;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                if let Some((name, value)) = line.split_once(':') {
                    if name.eq_ignore_ascii_case("content-length") {
                        length = value.trim().parse().unwrap();
                    }
                    if name.eq_ignore_ascii_case("transfer-encoding") {
                        chunked = value.trim().eq_ignore_ascii_case("chunked");
                    }
                }
                head.push_str(&line);
                if line == "\r\n" || line.is_empty() {
                    break;
                }
            }
            let mut body_bytes = Vec::new();
            if chunked {
                loop {
                    let mut size = String::new();
                    reader.read_line(&mut size).unwrap();
                    let size = usize::from_str_radix(size.trim(), 16).unwrap();
                    let mut chunk = vec![0u8; size + 2];
                    reader.read_exact(&mut chunk).unwrap();
                    if size == 0 {
                        break;
                    }
                    body_bytes.extend_from_slice(&chunk[..size]);
                }
            } else {
                body_bytes.resize(length, 0);
                reader.read_exact(&mut body_bytes).unwrap();
            }

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            reader.get_mut().write_all(response.as_bytes()).unwrap();
            head + &String::from_utf8_lossy(&body_bytes)
        });
        (url, handle)
    }

    fn client_at(url: &str, session: SessionContext) -> ApiClient {
        let config = Config {
            api_url: Some(url.to_string()),
            ..Default::default()
        };
        ApiClient::new(&config, session).unwrap()
    }

    fn stored_session(tmp: &TempDir) -> SessionContext {
        let store = SessionStore::at(tmp.path().join("session.json"));
        store
            .save(&Session {
                token: "tok-123".to_string(),
                user: UserProfile {
                    id: "7".to_string(),
                    email: "admin@stay.ug".to_string(),
                    name: "Admin".to_string(),
                    role: "ADMIN".to_string(),
                },
            })
            .unwrap();
        SessionContext::load(store)
    }

    /// In-memory backend recording submissions
    pub(crate) struct FakeBackend {
        pub reference_fails: bool,
        pub register_result: RefCell<Option<Result<RegistrationReceipt, ApiError>>>,
        pub submitted: RefCell<Vec<SubmissionPayload>>,
    }

    impl FakeBackend {
        pub(crate) fn accepting() -> Self {
            Self {
                reference_fails: false,
                register_result: RefCell::new(None),
                submitted: RefCell::new(Vec::new()),
            }
        }

        pub(crate) fn failing_with(error: ApiError) -> Self {
            let backend = Self::accepting();
            *backend.register_result.borrow_mut() = Some(Err(error));
            backend
        }
    }

    impl RegistrationBackend for FakeBackend {
        fn address_hierarchy(&self) -> Result<AddressHierarchy, ApiError> {
            Ok(sample_hierarchy())
        }

        fn reference_list(&self, kind: ReferenceKind) -> Result<Vec<ReferenceItem>, ApiError> {
            if self.reference_fails && kind == ReferenceKind::Banks {
                return Err(ApiError::Network {
                    endpoint: kind.endpoint().to_string(),
                    message: "connection refused".to_string(),
                });
            }
            Ok(vec![ReferenceItem::new("1", format!("First of {}", kind.label()))])
        }

        fn register_business(&self, payload: &SubmissionPayload) -> Result<RegistrationReceipt, ApiError> {
            self.submitted.borrow_mut().push(payload.clone());
            self.register_result.borrow_mut().take().unwrap_or_else(|| {
                Ok(RegistrationReceipt {
                    business_id: Some("B-100".to_string()),
                    message: "Business registered, pending approval".to_string(),
                })
            })
        }
    }

    #[test]
    fn test_reference_data_degrades_per_list() {
        let backend = FakeBackend {
            reference_fails: true,
            ..FakeBackend::accepting()
        };
        let data = load_reference_data(&backend);
        assert!(data.banks.is_empty());
        assert_eq!(data.account_types.len(), 1);
        assert_eq!(data.contains(ReferenceKind::Banks, "anything"), None);
        assert_eq!(data.contains(ReferenceKind::BusinessTypes, "1"), Some(true));
    }

    #[test]
    fn test_url_joins_below_base() {
        let config = Config {
            api_url: Some("https://stay.example.ug/api".to_string()),
            ..Default::default()
        };
        let client = ApiClient::new(&config, SessionContext::anonymous()).unwrap();
        assert_eq!(
            client.url("businesses/banks").unwrap().as_str(),
            "https://stay.example.ug/api/businesses/banks"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let config = Config {
            api_url: Some("not a url".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            ApiClient::new(&config, SessionContext::anonymous()),
            Err(ApiError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_admin_calls_need_a_session() {
        let client = ApiClient::new(&Config::default(), SessionContext::anonymous()).unwrap();
        assert!(matches!(client.dashboard(), Err(ApiError::NotAuthenticated)));
        assert!(matches!(
            client.decide(&ApprovalDecision::approve("9")),
            Err(ApiError::NotAuthenticated)
        ));
    }

    #[test]
    fn test_multipart_reports_missing_file() {
        let payload = SubmissionPayload {
            reference: crate::core::identity::ClientReference::new(),
            registration: json!({}),
            files: vec![crate::wizard::submission::FilePart {
                field: "images",
                path: std::path::PathBuf::from("/definitely/not/here.jpg"),
                file_name: "here.jpg".to_string(),
                content_type: "image/jpeg".to_string(),
            }],
            cover_image_index: 0,
        };
        assert!(matches!(multipart_form(&payload), Err(ApiError::File { .. })));
    }

    #[test]
    fn test_unauthorized_response_ends_the_session() {
        let tmp = TempDir::new().unwrap();
        let (url, server) = serve_once("401 Unauthorized", r#"{"message":"Token expired"}"#);
        let client = client_at(&url, stored_session(&tmp));

        assert!(matches!(client.dashboard(), Err(ApiError::SessionExpired)));
        assert!(!client.session().is_authenticated());
        assert!(!tmp.path().join("session.json").exists());

        let request = server.join().unwrap();
        assert!(request.starts_with("GET /api/admin/dashboard"));
        assert!(request.to_ascii_lowercase().contains("authorization: bearer tok-123"));
    }

    #[test]
    fn test_bad_credentials_keep_the_existing_session() {
        let tmp = TempDir::new().unwrap();
        let (url, server) = serve_once("401 Unauthorized", r#"{"message":"Invalid email or password"}"#);
        let client = client_at(&url, stored_session(&tmp));

        match client.login("a@b.ug", "wrong") {
            Err(ApiError::Rejected { status, message }) => {
                assert_eq!(status, Some(401));
                assert_eq!(message, "Invalid email or password");
            }
            other => panic!("expected a rejection, got {:?}", other),
        }
        assert!(client.session().is_authenticated());
        assert!(tmp.path().join("session.json").exists());
        assert!(server.join().unwrap().starts_with("POST /api/auth/login"));
    }

    #[test]
    fn test_login_starts_a_session() {
        let tmp = TempDir::new().unwrap();
        let (url, server) = serve_once(
            "200 OK",
            r#"{"success":true,"data":{"token":"fresh","user":{"id":3,"email":"owner@lakeside.ug","role":"BUSINESS_OWNER"}}}"#,
        );
        let store = SessionStore::at(tmp.path().join("session.json"));
        let client = client_at(&url, SessionContext::load(store.clone()));

        let session = client.login("owner@lakeside.ug", "secret").unwrap();
        assert_eq!(session.user.id, "3");
        assert_eq!(client.session().token().as_deref(), Some("fresh"));
        assert_eq!(store.load(), Some(session));

        let request = server.join().unwrap();
        assert!(request.contains(r#""email":"owner@lakeside.ug""#));
    }

    #[test]
    fn test_registration_is_sent_as_multipart() {
        let tmp = TempDir::new().unwrap();
        let front = tmp.path().join("front.jpg");
        let pool = tmp.path().join("pool.png");
        std::fs::write(&front, b"jpeg-bytes").unwrap();
        std::fs::write(&pool, b"png-bytes").unwrap();

        let payload = SubmissionPayload {
            reference: crate::core::identity::ClientReference::new(),
            registration: json!({ "business": { "legalName": "Lakeside Lodge Ltd" } }),
            files: vec![
                FilePart {
                    field: IMAGES_FIELD,
                    path: front,
                    file_name: "front.jpg".to_string(),
                    content_type: "image/jpeg".to_string(),
                },
                FilePart {
                    field: IMAGES_FIELD,
                    path: pool,
                    file_name: "pool.png".to_string(),
                    content_type: "image/png".to_string(),
                },
            ],
            cover_image_index: 1,
        };

        let (url, server) = serve_once(
            "201 Created",
            r#"{"success":true,"message":"Registered","data":{"businessId":55}}"#,
        );
        let client = client_at(&url, SessionContext::anonymous());
        let receipt = client.register_business(&payload).unwrap();
        assert_eq!(receipt.business_id.as_deref(), Some("55"));
        assert_eq!(receipt.message, "Registered");

        let request = server.join().unwrap();
        assert!(request.starts_with("POST /api/businesses/register"));
        let request = request.to_ascii_lowercase();
        assert!(request.contains("multipart/form-data; boundary="));
        assert!(request.contains(r#"name="registration""#));
        assert!(request.contains("content-type: application/json"));
        assert!(request.contains(r#""legalname":"lakeside lodge ltd""#));
        assert!(request.contains("name=\"coverimageindex\"\r\n\r\n1\r\n"));
        assert_eq!(request.matches(r#"name="images""#).count(), 2);
        assert!(request.contains(r#"filename="pool.png""#));
        assert!(request.contains("content-type: image/png"));
        assert!(request.contains("jpeg-bytes"));
    }
}
