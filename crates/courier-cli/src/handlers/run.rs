//! Run command handler

use super::utils::{build_client, report_response, ReportOptions};
use crate::cli::RunArgs;
use crate::config::{read_structured, Config};
use crate::error::{Error, Result};
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use courier_core::RequestConfig;
use std::path::Path;

/// Handle the run command
pub fn handle_run(args: RunArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let _timer = Timer::with_details("run", &args.request_file.display().to_string());

    let record = load_request_record(&args.request_file)?;
    output.info(&format!(
        "Running {} {}",
        record
            .method
            .map(|m| m.to_string())
            .unwrap_or_else(|| "GET".to_string()),
        record.url.as_deref().unwrap_or("")
    ))?;

    let client = build_client(config, args.fail);
    let response = client.request_from_config(record)?;

    report_response(
        &response,
        ReportOptions {
            include_headers: args.include,
            save_to: args.save_to.as_deref(),
        },
        output,
    )
}

/// Load a request record from JSON, YAML or TOML
pub fn load_request_record(path: &Path) -> Result<RequestConfig> {
    let record: RequestConfig = read_structured(path)?;
    if record.url.as_deref().map_or(true, str::is_empty) {
        return Err(Error::config(format!(
            "request record {} has no URL",
            path.display()
        )));
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_core::{Method, ResponseFormat};
    use tempfile::tempdir;

    #[test]
    fn test_yaml_record() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("request.yaml");
        std::fs::write(
            &path,
            "Method: post\nURL: http://svc/items\nHeader:\n  Accept: application/json\nJsonBody:\n  name: widget\nRetry: 2\nRetryDelay: 100\nResponseFormat: json\n",
        )
        .unwrap();

        let record = load_request_record(&path).unwrap();

        assert_eq!(record.method, Some(Method::Post));
        assert_eq!(record.url.as_deref(), Some("http://svc/items"));
        assert_eq!(record.retry, Some(2));
        assert_eq!(record.response_format, Some(ResponseFormat::Json));
        assert_eq!(record.json_body, Some(serde_json::json!({"name": "widget"})));
    }

    #[test]
    fn test_toml_record() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("request.toml");
        std::fs::write(
            &path,
            "URL = \"http://svc/login\"\nVerifySSL = false\n\n[BasicAuth]\nUsername = \"admin\"\nPassword = \"secret\"\n",
        )
        .unwrap();

        let record = load_request_record(&path).unwrap();

        assert_eq!(record.verify_ssl, Some(false));
        assert_eq!(record.basic_auth.unwrap().username, "admin");
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("request.json");
        std::fs::write(&path, r#"{"URL": "http://svc/", "Retries": 3}"#).unwrap();

        assert!(matches!(
            load_request_record(&path),
            Err(Error::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_record_without_url_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("request.json");
        std::fs::write(&path, r#"{"Method": "GET"}"#).unwrap();

        assert!(matches!(load_request_record(&path), Err(Error::Config(_))));
    }
}
