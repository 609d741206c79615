//! Azure DevOps REST client.
//!
//! Thin wrapper over the two provisioning endpoints. Every request is
//! authenticated with HTTP Basic using an empty username and the access
//! token as the password, which is how Azure DevOps accepts personal
//! access tokens.

use crate::error::{Error, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::blocking::{Client, Response};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::Serialize;
use serde_json::Value;

const API_VERSION: &str = "7.0";

const PIPELINES_ENDPOINT: &str = "/_apis/pipelines";
const ENVIRONMENTS_ENDPOINT: &str = "/_apis/distributedtask/environments";

/// Pipeline definitions are always YAML-backed GitHub repositories here.
const CONFIGURATION_TYPE: &str = "yaml";
const REPOSITORY_TYPE: &str = "gitHub";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineCreateRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
    pub configuration: PipelineConfiguration,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineConfiguration {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub path: String,
    pub repository: RepositoryReference,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryReference {
    pub full_name: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub connection: ConnectionReference,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionReference {
    pub id: String,
}

impl PipelineCreateRequest {
    pub fn new(
        name: impl Into<String>,
        folder: Option<String>,
        yaml_path: impl Into<String>,
        repository_full_name: impl Into<String>,
        connection_id: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            folder,
            configuration: PipelineConfiguration {
                kind: CONFIGURATION_TYPE,
                path: yaml_path.into(),
                repository: RepositoryReference {
                    full_name: repository_full_name.into(),
                    kind: REPOSITORY_TYPE,
                    connection: ConnectionReference {
                        id: connection_id.into(),
                    },
                },
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentCreateRequest {
    pub name: String,
    pub description: String,
}

/// HTTP client bound to one organization/project pair.
pub struct DevOpsClient {
    client: Client,
    base_url: String,
    auth_header: String,
}

impl DevOpsClient {
    pub fn new(organization: &str, project: &str, token: &str) -> Self {
        Self::with_base_url(
            format!("https://dev.azure.com/{}/{}", organization, project),
            token,
        )
    }

    /// Points the client at an explicit base URL instead of dev.azure.com.
    pub fn with_base_url(base_url: impl Into<String>, token: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            auth_header: basic_auth_header(token),
        }
    }

    pub fn create_pipeline(&self, request: &PipelineCreateRequest) -> Result<Value> {
        self.post(PIPELINES_ENDPOINT, request)
    }

    pub fn create_environment(&self, request: &EnvironmentCreateRequest) -> Result<Value> {
        self.post(ENVIRONMENTS_ENDPOINT, request)
    }

    fn post<T: Serialize>(&self, endpoint: &str, body: &T) -> Result<Value> {
        let url = format!("{}{}?api-version={}", self.base_url, endpoint, API_VERSION);
        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, self.auth_header.as_str())
            .header(ACCEPT, "application/json")
            .json(body)
            .send()
            .map_err(http_error)?;

        parse_response(response)
    }
}

fn http_error(e: reqwest::Error) -> Error {
    Error::http_request_failed(e.to_string())
}

/// Builds the `Authorization` header value: Basic with an empty username.
fn basic_auth_header(token: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!(":{}", token)))
}

fn parse_response(response: Response) -> Result<Value> {
    let status = response.status().as_u16();
    let body = response.text().map_err(http_error)?;
    evaluate_response(status, &body)
}

/// Maps a response's status and body to the call outcome. 200 is the only
/// success status; 203 is how dev.azure.com reports a rejected credential.
fn evaluate_response(status: u16, body: &str) -> Result<Value> {
    match status {
        200 => serde_json::from_str(body)
            .map_err(|e| Error::internal_json(e.to_string(), Some("parse response".to_string()))),
        203 => Err(Error::auth_token_rejected(status)),
        _ => Err(Error::api_request_failed(status, failure_message(body))),
    }
}

/// Failure bodies carry a `message` field; fall back to the raw body when
/// the field is missing or the body is not JSON.
fn failure_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}
