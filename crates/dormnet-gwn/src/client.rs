//! GWN Cloud REST API client.
//!
//! Wraps reqwest with the controller's calling convention: every request is
//! authenticated with a cached access token and carries an HMAC signature
//! over its identifying parameters. One method call is one HTTP request;
//! retry policy belongs to callers.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::GwnConfig;
use crate::error::GwnError;
use crate::mac::normalize_mac;
use crate::response::VendorResponse;
use crate::sign::request_signature;
use crate::token::{AccessToken, DEFAULT_TOKEN_TTL_SECS, TokenCache, now_unix_ms};
use crate::types::{
    AccessPoint, GenerateVoucherRequest, IssuedVoucher, NetworkSummary, Ssid, VendorVoucher,
    VoucherGroup, VoucherPage, WifiClient,
};

/// GWN Cloud API client.
///
/// Cloning is cheap and clones share the underlying connection pool and
/// token cache.
#[derive(Debug, Clone)]
pub struct GwnClient {
    http: reqwest::Client,
    config: GwnConfig,
    base_url: String,
    tokens: Arc<TokenCache>,
}

impl GwnClient {
    /// Create a client with its own token cache.
    pub fn new(config: GwnConfig) -> Result<Self, GwnError> {
        Self::with_token_cache(config, Arc::new(TokenCache::new()))
    }

    /// Create a client sharing an existing token cache.
    ///
    /// Lets several clients (or the caller's tests) observe and control the
    /// cached token.
    pub fn with_token_cache(
        config: GwnConfig,
        tokens: Arc<TokenCache>,
    ) -> Result<Self, GwnError> {
        config.validate()?;

        // Ensure a TLS crypto provider is installed (reqwest uses rustls-no-provider).
        // The `Err` case just means it was already installed — safe to ignore.
        let _ = rustls::crypto::ring::default_provider().install_default();

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let base_url = config.base_url.trim_end_matches('/').to_string();
        Ok(Self {
            http,
            config,
            base_url,
            tokens,
        })
    }

    /// Build the versioned API URL for a given endpoint.
    pub(crate) fn api_url(&self, endpoint: &str) -> String {
        format!("{}/oapi/v1.0.0/{}", self.base_url, endpoint)
    }

    /// The token cache backing this client.
    pub fn token_cache(&self) -> &Arc<TokenCache> {
        &self.tokens
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Request a fresh access token and cache it.
    ///
    /// Issues exactly one HTTP request. Any failure to acquire a token,
    /// whether a vendor rejection or a network error, maps to
    /// [`GwnError::Auth`] and leaves the cache untouched.
    pub async fn login(&self) -> Result<AccessToken, GwnError> {
        let url = format!(
            "{}?grant_type=client_credentials&appID={}&secretKey={}",
            self.api_url("token"),
            self.config.app_id,
            self.config.app_secret,
        );
        debug!(app_id = %self.config.app_id, "Requesting GWN Cloud access token");

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| GwnError::Auth(format!("token request failed: {e}")))?;
        let status = resp.status().as_u16();
        let body: Value = resp
            .json()
            .await
            .map_err(|e| GwnError::Auth(format!("token response unreadable: {e}")))?;
        let response = VendorResponse::new(status, body);

        if response.status >= 400 || matches!(response.vendor_code(), Some(code) if code != 0) {
            let message = response
                .vendor_message()
                .unwrap_or("token request rejected")
                .to_string();
            warn!(status = response.status, "GWN Cloud token request failed");
            return Err(GwnError::Auth(message));
        }

        let row = response
            .data_row()
            .ok_or_else(|| GwnError::Auth("token response had no payload".into()))?;
        let token = row
            .str_field(&["access_token", "accessToken", "token"])
            .ok_or_else(|| GwnError::Auth("token response carried no access token".into()))?;
        let ttl = row
            .i64_field(&["expires_in", "expiresIn"])
            .and_then(|secs| u64::try_from(secs).ok())
            .unwrap_or(DEFAULT_TOKEN_TTL_SECS);

        let access = AccessToken::with_ttl(token, ttl);
        self.tokens.store(access.clone());
        Ok(access)
    }

    /// The token to sign the next request with: static override, then the
    /// cache, then a fresh login.
    async fn ensure_token(&self) -> Result<String, GwnError> {
        if let Some(token) = &self.config.access_token {
            return Ok(token.clone());
        }
        if let Some(cached) = self.tokens.current() {
            return Ok(cached.token);
        }
        Ok(self.login().await?.token)
    }

    // =========================================================================
    // Transport
    // =========================================================================

    /// Issue one signed request to `endpoint`.
    ///
    /// Never retries. When either the HTTP layer or the vendor code says the
    /// token was rejected, the cached token is dropped so the *next* call
    /// re-authenticates; the response is still returned for the caller to
    /// inspect.
    pub async fn call(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&Value>,
    ) -> Result<VendorResponse, GwnError> {
        let token = self.ensure_token().await?;
        let timestamp = now_unix_ms();

        let payload = match body {
            Some(value) => Some(serde_json::to_string(value).map_err(|e| {
                GwnError::Config(format!("Unserializable request body: {e}"))
            })?),
            None => None,
        };

        let signature = request_signature(
            &self.config.app_secret,
            &token,
            &self.config.app_id,
            timestamp,
            payload.as_deref(),
        )?;
        let url = format!(
            "{}?access_token={}&appID={}&timestamp={}&signature={}",
            self.api_url(endpoint),
            token,
            self.config.app_id,
            timestamp,
            signature,
        );

        debug!(endpoint, has_body = payload.is_some(), "GWN Cloud request");

        let mut request = self.http.request(method, &url);
        if let Some(json) = payload {
            request = request
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(json);
        }
        let resp = request.send().await?;
        let status = resp.status().as_u16();
        let body: Value = resp.json().await?;
        let response = VendorResponse::new(status, body);

        if Self::auth_rejected(&response) {
            warn!(
                endpoint,
                status = response.status,
                "GWN Cloud rejected the access token; dropping cached token"
            );
            self.tokens.invalidate();
        }
        Ok(response)
    }

    /// Token rejection shows up as HTTP 401 or as vendor code 401.
    fn auth_rejected(response: &VendorResponse) -> bool {
        response.status == 401 || response.vendor_code() == Some(401)
    }

    fn page_body(&self, page: u32, page_size: u32) -> Value {
        serde_json::json!({
            "networkId": self.config.network_id,
            "pageNum": page,
            "pageSize": page_size,
        })
    }

    // =========================================================================
    // Clients
    // =========================================================================

    /// List client devices, one page per call.
    pub async fn list_clients(
        &self,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<WifiClient>, GwnError> {
        let body = self.page_body(page, page_size);
        let response = self
            .call(Method::POST, "client/list", Some(&body))
            .await?
            .ensure_successful()?;
        Ok(response
            .rows()
            .iter()
            .filter_map(WifiClient::from_row)
            .collect())
    }

    /// Block or unblock a client on the controller.
    ///
    /// `device_id` is the controller's own row id for the client, when the
    /// caller happens to know it; the MAC alone is sufficient.
    pub async fn set_client_block_status(
        &self,
        mac: &str,
        device_id: Option<&str>,
        blocked: bool,
    ) -> Result<(), GwnError> {
        let mac = normalize_mac(mac)
            .ok_or_else(|| GwnError::Config(format!("Invalid MAC address: {mac}")))?;
        let mut body = serde_json::json!({
            "networkId": self.config.network_id,
            "macList": [mac],
            "block": blocked,
        });
        if let (Some(id), Some(map)) = (device_id, body.as_object_mut()) {
            map.insert("clientId".into(), Value::String(id.to_string()));
        }
        self.call(Method::POST, "client/block", Some(&body))
            .await?
            .ensure_successful()?;
        Ok(())
    }

    /// Set the display name the controller shows for a client.
    pub async fn edit_client_name(&self, mac: &str, name: &str) -> Result<(), GwnError> {
        let mac = normalize_mac(mac)
            .ok_or_else(|| GwnError::Config(format!("Invalid MAC address: {mac}")))?;
        let body = serde_json::json!({
            "networkId": self.config.network_id,
            "mac": mac,
            "name": name,
        });
        self.call(Method::POST, "client/edit", Some(&body))
            .await?
            .ensure_successful()?;
        Ok(())
    }

    // =========================================================================
    // Access points and SSIDs
    // =========================================================================

    /// List access points, one page per call.
    pub async fn list_access_points(
        &self,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<AccessPoint>, GwnError> {
        let body = self.page_body(page, page_size);
        let response = self
            .call(Method::POST, "ap/list", Some(&body))
            .await?
            .ensure_successful()?;
        Ok(response
            .rows()
            .iter()
            .filter_map(AccessPoint::from_row)
            .collect())
    }

    /// List configured SSIDs, one page per call.
    pub async fn list_ssids(&self, page: u32, page_size: u32) -> Result<Vec<Ssid>, GwnError> {
        let body = self.page_body(page, page_size);
        let response = self
            .call(Method::POST, "ssid/list", Some(&body))
            .await?
            .ensure_successful()?;
        Ok(response.rows().iter().filter_map(Ssid::from_row).collect())
    }

    // =========================================================================
    // Networks
    // =========================================================================

    /// Headline figures for the configured network.
    pub async fn network_detail(&self) -> Result<NetworkSummary, GwnError> {
        let body = serde_json::json!({ "networkId": self.config.network_id });
        let response = self
            .call(Method::POST, "network/detail", Some(&body))
            .await?
            .ensure_successful()?;
        Ok(response
            .data_row()
            .map_or_else(NetworkSummary::default, |row| {
                NetworkSummary::from_row(&row)
            }))
    }

    // =========================================================================
    // Vouchers
    // =========================================================================

    /// List voucher groups, one page per call.
    pub async fn list_voucher_groups(
        &self,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<VoucherGroup>, GwnError> {
        let body = self.page_body(page, page_size);
        let response = self
            .call(Method::POST, "voucher/group/list", Some(&body))
            .await?
            .ensure_successful()?;
        Ok(response
            .rows()
            .iter()
            .filter_map(VoucherGroup::from_row)
            .collect())
    }

    /// List the vouchers in a group, one page per call.
    ///
    /// The page keeps the controller's raw row count: rows dropped for a
    /// missing code still count, so pagers can tell a genuinely short page
    /// from a full page of unreadable rows.
    pub async fn get_group_vouchers(
        &self,
        group_id: &str,
        page: u32,
        page_size: u32,
    ) -> Result<VoucherPage, GwnError> {
        let mut body = self.page_body(page, page_size);
        if let Some(map) = body.as_object_mut() {
            map.insert("groupId".into(), Value::String(group_id.to_string()));
        }
        let response = self
            .call(Method::POST, "voucher/list", Some(&body))
            .await?
            .ensure_successful()?;
        let rows = response.rows();
        Ok(VoucherPage {
            vouchers: rows.iter().filter_map(VendorVoucher::from_row).collect(),
            row_count: rows.len(),
        })
    }

    /// Create vouchers on the controller and return the generated code.
    ///
    /// The controller owns code generation; a success that carries no code
    /// back is unusable and reported as a vendor error.
    pub async fn generate_voucher(
        &self,
        request: &GenerateVoucherRequest,
    ) -> Result<IssuedVoucher, GwnError> {
        let mut body = serde_json::json!({
            "networkId": self.config.network_id,
            "groupId": request.group_id,
            "quantity": request.quantity,
            "durationDays": request.duration_days,
            "deviceLimit": request.device_limit,
        });
        if let (Some(note), Some(map)) = (&request.note, body.as_object_mut()) {
            map.insert("note".into(), Value::String(note.clone()));
        }
        let response = self
            .call(Method::POST, "voucher/create", Some(&body))
            .await?
            .ensure_successful()?;

        Self::issued_from_response(&response).ok_or_else(|| {
            GwnError::vendor(-1, "voucher create response carried no voucher code")
        })
    }

    /// Pull the vendor id and generated code out of a create response.
    ///
    /// The code shows up either on the `data` object directly or as the
    /// first row of a `result`/`list` wrapper.
    fn issued_from_response(response: &VendorResponse) -> Option<IssuedVoucher> {
        let code_keys: &[&str] = &["code", "voucherCode", "password"];
        let id_keys: &[&str] = &["id", "voucherId"];

        if let Some(row) = response.data_row() {
            // `data.codes: ["..."]` is the bulk-create shape.
            let from_codes = row
                .get(&["codes"])
                .and_then(Value::as_array)
                .and_then(|codes| codes.first())
                .and_then(Value::as_str)
                .map(str::to_string);
            if let Some(code) = row.str_field(code_keys).or(from_codes) {
                return Some(IssuedVoucher {
                    vendor_id: row.str_field(id_keys),
                    code,
                });
            }
        }
        response.rows().first().and_then(|row| {
            row.str_field(code_keys).map(|code| IssuedVoucher {
                vendor_id: row.str_field(id_keys),
                code,
            })
        })
    }

    /// Delete a voucher on the controller.
    pub async fn delete_voucher(&self, voucher_id: &str) -> Result<(), GwnError> {
        let body = serde_json::json!({
            "networkId": self.config.network_id,
            "id": voucher_id,
        });
        self.call(Method::POST, "voucher/delete", Some(&body))
            .await?
            .ensure_successful()?;
        Ok(())
    }
}
