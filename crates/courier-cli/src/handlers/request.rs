//! Request command handler

use super::utils::{
    build_client, parse_header, parse_pair, read_argument, report_response, ReportOptions,
};
use crate::cli::RequestArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use courier_core::{Client, RequestBuilder, RetryPolicy};
use std::time::Duration;

/// Handle the request command
pub fn handle_request(args: RequestArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let _timer = Timer::with_details("request", &format!("{} {}", args.method, args.url));

    let client = build_client(config, args.fail);
    let include_headers = args.include;
    let save_to = args.save_to.clone();

    let request = build_from_args(&client, args)?.build();
    tracing::debug!(
        method = %request.method(),
        url = %request.url(),
        retries = request.retry().retries,
        "Dispatching request"
    );

    let response = client.dispatch(request);

    report_response(
        &response,
        ReportOptions {
            include_headers,
            save_to: save_to.as_deref(),
        },
        output,
    )
}

/// Translate command-line arguments into a request on top of the client defaults
pub fn build_from_args(client: &Client, args: RequestArgs) -> Result<RequestBuilder> {
    let mut builder = client.build_request(args.method, args.url);

    for raw in &args.headers {
        let (name, value) = parse_header(raw)?;
        builder = builder.header(name, value);
    }

    if let Some(data) = &args.data {
        builder = builder.body(read_argument(data)?);
    }
    if let Some(json) = &args.json {
        let value: serde_json::Value = serde_json::from_slice(&read_argument(json)?)
            .map_err(|e| Error::invalid_args(format!("--json is not valid JSON: {}", e)))?;
        builder = builder.json_body(&value)?;
    }
    if !args.form.is_empty() {
        let fields = args
            .form
            .iter()
            .map(|raw| parse_pair(raw, "form field"))
            .collect::<Result<Vec<_>>>()?;
        builder = builder.form_data(fields);
    }

    for raw in &args.cookies {
        let (name, value) = parse_pair(raw, "cookie")?;
        builder = builder.cookie(name, value);
    }

    if let Some(user) = &args.user {
        let (username, password) = user.split_once(':').unwrap_or((user.as_str(), ""));
        builder = builder.basic_auth(username, password);
    }
    if let Some(token) = &args.bearer {
        builder = builder.bearer_auth(token.clone());
    }

    if let Some(timeout) = args.timeout {
        builder = builder.timeout(Duration::from_millis(timeout));
    }
    if args.retry.is_some() || args.retry_delay.is_some() {
        let defaults = &client.config().retry_policy;
        let retries = args.retry.unwrap_or(defaults.retries);
        let delay = args
            .retry_delay
            .map(Duration::from_millis)
            .unwrap_or(defaults.delay);
        builder = builder.retry_policy(RetryPolicy::new(retries, delay));
    }
    if args.location {
        let max = args
            .max_redirects
            .or(client.config().max_redirects)
            .unwrap_or(courier_core::http::builder::DEFAULT_MAX_REDIRECTS);
        builder = builder.follow_redirects(true, max);
    }
    if args.insecure {
        builder = builder.verify_ssl(false);
    }
    if let Some(proxy) = args.proxy {
        builder = builder.proxy(proxy);
    }
    if let Some(format) = args.format {
        builder = builder.expect_format(format.into());
    }
    if let Some(user_agent) = args.user_agent {
        builder = builder.user_agent(user_agent);
    }

    Ok(builder)
}
