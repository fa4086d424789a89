//! Command-line interface definitions and the request-form helpers behind it.

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use http::Method;
use url::Url;

use crate::response::Response;
use crate::settings::ApiConfig;

/// Simulated REST API with request interception
#[derive(Parser)]
#[command(name = "apisim-cli")]
#[command(about = "Issue requests against a simulated REST API backend")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Issue a single request through the interceptor
    Call {
        /// HTTP method (GET, POST, PUT, DELETE)
        #[arg(short, long, default_value = "GET")]
        method: Method,
        /// Path template, e.g. /users or /users/{id}
        #[arg(long)]
        path: String,
        /// Named parameter as NAME=VALUE; substituted into the path template
        /// when `{NAME}` appears there, appended as a query parameter
        /// otherwise
        #[arg(long = "param", value_name = "NAME=VALUE")]
        params: Vec<String>,
        /// Raw JSON request body
        #[arg(long)]
        body: Option<String>,
        /// Bearer credential; defaults to the configured key
        #[arg(long)]
        api_key: Option<String>,
    },
    /// Run a scripted request sequence against the simulated API
    Demo,
}

/// Resolve a path template against named parameters.
///
/// Each `NAME=VALUE` pair is substituted into the template (URL-encoded) when
/// `{NAME}` appears there, path substitution taking precedence; the rest
/// become query parameters. Pairs with empty values are skipped.
pub fn resolve_endpoint(template: &str, params: &[String]) -> Result<(String, Vec<(String, String)>)> {
    let mut endpoint = template.to_string();
    let mut query = Vec::new();

    for pair in params {
        let (name, value) = pair
            .split_once('=')
            .ok_or_else(|| anyhow!("--param must be NAME=VALUE, got '{pair}'"))?;
        if value.is_empty() {
            continue;
        }

        let placeholder = format!("{{{name}}}");
        if endpoint.contains(&placeholder) {
            let encoded: String = url::form_urlencoded::byte_serialize(value.as_bytes()).collect();
            endpoint = endpoint.replace(&placeholder, &encoded);
        } else {
            query.push((name.to_string(), value.to_string()));
        }
    }

    Ok((endpoint, query))
}

/// Build the full request URL from the configured base, a resolved endpoint
/// and query parameters.
pub fn build_url(api: &ApiConfig, endpoint: &str, query: &[(String, String)]) -> Result<Url> {
    let base = api.base_url.trim_end_matches('/');
    let mut url = Url::parse(&format!("{base}{endpoint}"))?;
    if !query.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (name, value) in query {
            pairs.append_pair(name, value);
        }
    }
    Ok(url)
}

/// Render a response body for display: JSON bodies are re-formatted, other
/// content is shown raw, and an empty body reads "No content".
pub fn format_body(response: &Response) -> String {
    let body = response.text();
    if body.is_empty() {
        return "No content".to_string();
    }
    if response.is_json() {
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
            return serde_json::to_string_pretty(&value).unwrap_or_else(|_| body.to_string());
        }
    }
    body.to_string()
}
