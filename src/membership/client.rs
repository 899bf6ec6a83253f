//! Membership Vault facade

use super::conflict::classify_activation_error;
use super::types::{Filter, ListOptions, LookupType, MembershipFields};
use crate::config::VaultConfig;
use crate::error::{Error, Result};
use crate::http::{classify, ApiResponse, HttpClient, Outcome, RequestConfig};
use crate::pagination::ResultSet;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;
use url::Url;

/// Client for one station's memberships.
///
/// Every endpoint is rooted at `{base_uri}/{station_id}/` and ends in `/`.
/// Path segments are percent-encoded.
#[derive(Debug, Clone)]
pub struct MembershipVault {
    http: HttpClient,
    station_url: Url,
}

impl MembershipVault {
    /// Build a client from validated configuration
    pub fn new(config: &VaultConfig) -> Result<Self> {
        config.validate()?;
        let http = HttpClient::with_auth(config.http_client_config(), config.auth())?;
        Self::with_http_client(http, &config.base_uri, &config.station_id)
    }

    /// Build from an existing transport.
    ///
    /// The transport is switched to returning error statuses; 404 and
    /// 4xx responses are classified here.
    pub fn with_http_client(http: HttpClient, base_uri: &str, station_id: &str) -> Result<Self> {
        let http = http.returning_error_statuses();
        let mut station_url = Url::parse(base_uri)?;
        station_url
            .path_segments_mut()
            .map_err(|()| Error::config(format!("base_uri cannot be used as a base: {base_uri}")))?
            .pop_if_empty()
            .push(station_id)
            .push("");
        debug!(station = %station_url, "membership vault client ready");
        Ok(Self { http, station_url })
    }

    /// Root URL of the station, with a trailing slash
    pub fn station_url(&self) -> &Url {
        &self.station_url
    }

    /// Underlying transport
    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    /// URL of `segments` below the station root
    pub fn endpoint(&self, segments: &[&str]) -> String {
        let mut url = self.station_url.clone();
        // station_url is always a base, checked in the constructor
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments).push("");
        }
        url.into()
    }

    // ========================================================================
    // Single records
    // ========================================================================

    /// Fetch one membership by id
    pub async fn get_membership(&self, membership_id: &str) -> Result<Value> {
        let outcome = self
            .send(Method::GET, &["memberships", membership_id], None)
            .await?;
        found(outcome, LookupType::Id, membership_id)
    }

    /// Fetch the membership holding an activation token
    pub async fn get_membership_by_token(&self, token: &str) -> Result<Value> {
        let filter = Filter::Token(token.to_string());
        let mut segments = vec!["memberships"];
        segments.extend(filter.segments());

        let outcome = self.send(Method::GET, &segments, None).await?;
        found(outcome, LookupType::Token, token)
    }

    /// Create a membership with a server-assigned id
    pub async fn create_membership(&self, fields: &MembershipFields) -> Result<Value> {
        let body = serde_json::to_value(fields)?;
        let outcome = self.send(Method::POST, &["memberships"], Some(body)).await?;
        match outcome {
            Outcome::Success(response) => response.value(),
            Outcome::NotFound(response) => {
                Err(Error::http_status(response.status, response.reason))
            }
        }
    }

    /// Create a membership under a caller-chosen id
    pub async fn add_membership(
        &self,
        membership_id: &str,
        fields: &MembershipFields,
    ) -> Result<Value> {
        let body = serde_json::to_value(fields)?;
        let outcome = self
            .send(Method::PUT, &["memberships", membership_id], Some(body))
            .await?;
        updated(outcome, membership_id)
    }

    /// Change the given fields of a membership
    pub async fn update_membership(
        &self,
        membership_id: &str,
        fields: &MembershipFields,
    ) -> Result<Value> {
        let body = serde_json::to_value(fields)?;
        let outcome = self
            .send(Method::PATCH, &["memberships", membership_id], Some(body))
            .await?;
        updated(outcome, membership_id)
    }

    /// Delete a membership
    pub async fn delete_membership(&self, membership_id: &str) -> Result<bool> {
        match self
            .send(Method::DELETE, &["memberships", membership_id], None)
            .await?
        {
            Outcome::Success(_) => Ok(true),
            Outcome::NotFound(_) => Err(Error::not_found(LookupType::Id, membership_id)),
        }
    }

    /// Associate a membership with an account.
    ///
    /// A 409 naming the conflicting membership and UID fails with
    /// [`Error::MembershipAlreadyActivated`] or
    /// [`Error::AnotherMembershipActivated`]; any other rejection is
    /// returned as is.
    pub async fn activate_membership(&self, membership_id: &str, uid: &str) -> Result<bool> {
        let body = json!({ "uid": uid });
        let outcome = self
            .send(Method::PATCH, &["memberships", membership_id], Some(body))
            .await
            .map_err(classify_activation_error)?;

        match outcome {
            Outcome::Success(_) => {
                debug!(membership_id, uid, "membership activated");
                Ok(true)
            }
            Outcome::NotFound(_) => Err(Error::not_found(LookupType::Id, membership_id)),
        }
    }

    // ========================================================================
    // Listing
    // ========================================================================

    /// List memberships, optionally restricted by a filter.
    ///
    /// Fetches the first page immediately; a rejected query fails here.
    pub async fn list(
        &self,
        filter: Option<&Filter>,
        options: &ListOptions,
    ) -> Result<ResultSet<'_>> {
        let mut segments = vec!["memberships"];
        if let Some(filter) = filter {
            segments.extend(filter.segments());
        }
        let endpoint = self.endpoint(&segments);
        ResultSet::open(&self.http, endpoint, options.to_query(), options.first_page()).await
    }

    /// All memberships
    pub async fn list_memberships(&self, options: &ListOptions) -> Result<ResultSet<'_>> {
        self.list(None, options).await
    }

    /// Active memberships
    pub async fn list_active(&self, options: &ListOptions) -> Result<ResultSet<'_>> {
        self.list(Some(&Filter::Active), options).await
    }

    /// Memberships associated with an account
    pub async fn list_activated(&self, options: &ListOptions) -> Result<ResultSet<'_>> {
        self.list(Some(&Filter::Activated), options).await
    }

    /// Provisional memberships
    pub async fn list_provisional(&self, options: &ListOptions) -> Result<ResultSet<'_>> {
        self.list(Some(&Filter::Provisional), options).await
    }

    /// Expired memberships within their grace period
    pub async fn list_grace_period(&self, options: &ListOptions) -> Result<ResultSet<'_>> {
        self.list(Some(&Filter::GracePeriod), options).await
    }

    /// Deleted memberships
    pub async fn list_deleted(&self, options: &ListOptions) -> Result<ResultSet<'_>> {
        self.list(Some(&Filter::Deleted), options).await
    }

    /// Memberships with an email address
    pub async fn list_by_email(
        &self,
        email: &str,
        options: &ListOptions,
    ) -> Result<ResultSet<'_>> {
        self.list(Some(&Filter::Email(email.to_string())), options)
            .await
    }

    /// Memberships activated by an account
    pub async fn list_by_uid(&self, uid: &str, options: &ListOptions) -> Result<ResultSet<'_>> {
        self.list(Some(&Filter::Uid(uid.to_string())), options)
            .await
    }

    async fn send(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<Value>,
    ) -> Result<Outcome> {
        let url = self.endpoint(segments);
        let mut config = RequestConfig::new();
        if let Some(body) = body {
            config = config.json(body);
        }
        let response = self.http.request(method, &url, config).await?;
        classify(response)
    }
}

/// Single record from a lookup, treating 404 and empty bodies as not found
fn found(outcome: Outcome, lookup: LookupType, value: &str) -> Result<Value> {
    let response = match outcome {
        Outcome::Success(response) => response,
        Outcome::NotFound(_) => return Err(Error::not_found(lookup, value)),
    };
    single_record(&response)?.ok_or_else(|| Error::not_found(lookup, value))
}

fn updated(outcome: Outcome, membership_id: &str) -> Result<Value> {
    match outcome {
        Outcome::Success(response) => response.value(),
        Outcome::NotFound(_) => Err(Error::not_found(LookupType::Id, membership_id)),
    }
}

/// The record in a single-object response.
///
/// Filter endpoints answer with a list envelope even for unique lookups;
/// its first object is the record.
fn single_record(response: &ApiResponse) -> Result<Option<Value>> {
    let record = match response.value()? {
        Value::Null => None,
        Value::Object(mut map) => match map.remove("objects") {
            Some(Value::Array(objects)) => objects.into_iter().next(),
            Some(other) => {
                map.insert("objects".to_string(), other);
                Some(Value::Object(map))
            }
            None if map.is_empty() => None,
            None => Some(Value::Object(map)),
        },
        Value::Array(items) => items.into_iter().next(),
        other => Some(other),
    };
    Ok(record)
}
