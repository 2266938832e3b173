use crate::ports::outbound::RegistryError;
use crate::shared::Result;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Builds the HTTP client shared by the registry adapters.
pub(super) fn build_client(timeout: Duration, connect_timeout: Duration) -> Result<reqwest::Client> {
    let user_agent = format!("package-audit/{}", env!("CARGO_PKG_VERSION"));
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(connect_timeout)
        .user_agent(user_agent)
        .build()?;
    Ok(client)
}

/// Maps a non-success status to the registry error taxonomy.
pub(super) fn status_error(status: StatusCode) -> RegistryError {
    if status == StatusCode::NOT_FOUND {
        RegistryError::NotFound
    } else if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        RegistryError::Transient(format!("registry returned status code {}", status))
    } else {
        RegistryError::Unexpected(format!("registry returned status code {}", status))
    }
}

/// Timeouts and connection failures are worth retrying; anything else is not.
pub(super) fn transport_error(error: reqwest::Error) -> RegistryError {
    if error.is_timeout() || error.is_connect() || error.is_request() {
        RegistryError::Transient(error.to_string())
    } else {
        RegistryError::Unexpected(error.to_string())
    }
}

/// Reads and decodes a JSON body.
///
/// A body cut short is transient; a body that does not parse is not. reqwest
/// gives both the same error kind, so the read and the parse are kept apart.
pub(super) async fn read_json<T: DeserializeOwned>(
    response: reqwest::Response,
) -> std::result::Result<T, RegistryError> {
    let body = response.bytes().await.map_err(|e| {
        RegistryError::Transient(format!("failed to read registry response: {}", e))
    })?;
    serde_json::from_slice(&body)
        .map_err(|e| RegistryError::Unexpected(format!("invalid registry response: {}", e)))
}

/// Serves one response that announces more body than it sends, then hangs up.
#[cfg(test)]
pub(super) fn serve_truncated_body() -> String {
    use std::io::{Read, Write};

    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let address = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let mut request = [0u8; 4096];
            let _ = stream.read(&mut request);
            let _ = stream.write_all(
                b"HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 512\r\n\r\n[{\"number\":",
            );
        }
    });
    format!("http://{}", address)
}

/// Rejects names that could change the shape of the request URL.
pub(super) fn validate_package_name(name: &str) -> std::result::Result<(), RegistryError> {
    let unscoped = match name.strip_prefix('@') {
        Some(scoped) => match scoped.split_once('/') {
            Some((scope, rest)) if !scope.is_empty() && !rest.is_empty() => rest,
            _ => {
                return Err(RegistryError::Unexpected(format!(
                    "invalid scoped package name \"{}\"",
                    name
                )))
            }
        },
        None => name,
    };

    if name.is_empty()
        || name.contains("..")
        || unscoped.contains('/')
        || name.contains(['\\', '#', '?'])
        || name.chars().any(char::is_whitespace)
    {
        return Err(RegistryError::Unexpected(format!(
            "package name \"{}\" contains characters not allowed in a URL",
            name
        )));
    }
    Ok(())
}
