//! Main entry point for the apisim CLI.

use std::sync::Arc;

use anyhow::Result;
use apisim::{
    cli,
    intercept::{HttpTransport, MockInterceptor, OfflineTransport},
    request::RequestOptions,
    response::Response,
    router::Router,
    settings::{ApiConfig, Settings},
    store::UserStore,
    telemetry,
};
use clap::Parser;
use http::Method;
use parking_lot::Mutex;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    let settings = Settings::load()?;
    telemetry::init(&settings.logging.level)?;

    let store = Arc::new(Mutex::new(UserStore::default()));
    let router = Router::new(store, settings.api.api_key.clone());
    let client = MockInterceptor::new(OfflineTransport, router, &settings.api);

    match args.command {
        cli::Commands::Call {
            method,
            path,
            params,
            body,
            api_key,
        } => {
            run_call(
                &client,
                &settings.api,
                method,
                &path,
                &params,
                body.as_deref(),
                api_key.as_deref(),
            )
            .await
        }
        cli::Commands::Demo => run_demo(&client, &settings.api).await,
    }
}

/// Collect the request form, issue the call and display the exchange.
async fn run_call<T: HttpTransport>(
    client: &T,
    api: &ApiConfig,
    method: Method,
    template: &str,
    params: &[String],
    body: Option<&str>,
    api_key: Option<&str>,
) -> Result<()> {
    let (endpoint, query) = cli::resolve_endpoint(template, params)?;
    let key = api_key.unwrap_or(&api.api_key);

    let mut options = RequestOptions::default().method(method).bearer(key);
    if let Some(body) = body {
        // Bodies are validated locally; invalid JSON never becomes a call.
        if serde_json::from_str::<serde_json::Value>(body).is_err() {
            println!("Error: Invalid JSON in request body.");
            return Ok(());
        }
        options = options.json_body(body);
    }

    let url = cli::build_url(api, &endpoint, &query)?;
    let response = client.fetch(&url, options).await?;
    print_response(&response);
    Ok(())
}

fn print_response(response: &Response) {
    println!(
        "Status: {} {}",
        response.status().as_u16(),
        response.status_text()
    );
    println!("{}", cli::format_body(response));
}

/// A scripted walk through the API: list, create, fetch, update, delete.
async fn run_demo<T: HttpTransport>(client: &T, api: &ApiConfig) -> Result<()> {
    let create_body =
        r#"{"username": "carol", "email": "carol@example.com", "password": "hunter2"}"#;
    let update_body = r#"{"email": "carol@new.example.com"}"#;

    let steps: Vec<(Method, &str, Vec<String>, Option<&str>)> = vec![
        (Method::GET, "/users", vec![], None),
        (Method::POST, "/users", vec![], Some(create_body)),
        (Method::GET, "/users/{id}", vec!["id=user_3".into()], None),
        (
            Method::PUT,
            "/users/{id}",
            vec!["id=user_3".into()],
            Some(update_body),
        ),
        (Method::DELETE, "/users/{id}", vec!["id=user_3".into()], None),
        (Method::GET, "/users", vec![], None),
    ];

    for (method, template, params, body) in steps {
        println!("==> {method} {template}");
        run_call(client, api, method, template, &params, body, None).await?;
        println!();
    }

    Ok(())
}
