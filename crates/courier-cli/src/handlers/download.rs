//! Download command handler

use super::utils::build_client;
use crate::cli::{DownloadArgs, OutputFormat};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use serde::Serialize;
use std::path::Path;

/// Machine-readable summary of a finished download
#[derive(Debug, Serialize)]
struct DownloadReport<'a> {
    url: &'a str,
    path: &'a Path,
    bytes: u64,
}

/// Handle the download command
pub fn handle_download(
    args: DownloadArgs,
    config: &Config,
    output: &mut OutputWriter,
) -> Result<()> {
    let _timer = Timer::with_details("download", &args.url);

    let client = build_client(config, false);
    let spinner = output.spinner(&format!("Downloading {}", args.url));

    let saved = client.download(&args.url, &args.path);

    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    if !saved {
        return Err(Error::Download {
            url: args.url,
            path: args.path,
        });
    }

    let bytes = std::fs::metadata(&args.path)?.len();
    match output.format() {
        OutputFormat::Human => output.success(&format!(
            "✓ Saved {} ({} bytes) to {}",
            args.url,
            bytes,
            args.path.display()
        )),
        _ => output.data(&DownloadReport {
            url: &args.url,
            path: &args.path,
            bytes,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_unreachable_download_reports_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/file", listener.local_addr().unwrap());
        drop(listener);

        let dir = tempdir().unwrap();
        let path = dir.path().join("file.bin");
        let mut output =
            OutputWriter::with_writer(OutputFormat::Human, false, true, Box::new(std::io::sink()));

        let result = handle_download(
            DownloadArgs {
                url,
                path: path.clone(),
            },
            &Config::default(),
            &mut output,
        );

        assert!(matches!(result, Err(Error::Download { .. })));
        assert!(!path.exists());
    }
}
