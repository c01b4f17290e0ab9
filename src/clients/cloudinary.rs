use anyhow::{Context, Result, bail};
use reqwest::Client;
use serde::Deserialize;
use sha1::{Digest, Sha1};
use tracing::{debug, warn};

use crate::config::AssetHostConfig;
use crate::models::FileKind;

/// URL and deletion handle returned by the asset host for one upload.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadedAsset {
    #[serde(rename = "secure_url")]
    pub url: String,
    pub public_id: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorBody,
}

/// Client for the Cloudinary upload API.
///
/// Uploads are signed server-side: the parameters (everything except the
/// file, the API key and the signature itself) are sorted, concatenated
/// `k=v` with `&`, suffixed with the API secret and SHA-1 hashed.
#[derive(Debug, Clone)]
pub struct CloudinaryClient {
    client: Client,
    config: AssetHostConfig,
}

impl CloudinaryClient {
    pub fn new(config: AssetHostConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.upload_timeout_seconds))
            .user_agent("Revoult/1.0")
            .build()
            .context("Failed to build HTTP client for asset host")?;

        Ok(Self { client, config })
    }

    /// Errors with the names of the unset credential keys, if any.
    pub fn ensure_configured(&self) -> Result<()> {
        let missing = self.config.missing_keys();
        if missing.is_empty() {
            Ok(())
        } else {
            bail!(
                "Missing required asset host configuration: {}",
                missing.join(", ")
            )
        }
    }

    /// Upload a file into `folder` and return its URL plus deletion handle.
    pub async fn upload(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        folder: &str,
        kind: FileKind,
    ) -> Result<UploadedAsset> {
        self.ensure_configured()?;

        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = sign_request(
            &[("folder", folder), ("timestamp", &timestamp)],
            &self.config.api_secret,
        );

        let part = reqwest::multipart::Part::bytes(bytes).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", folder.to_string())
            .text("signature", signature);

        let url = format!(
            "{}/v1_1/{}/{}/upload",
            self.config.base_url,
            self.config.cloud_name,
            kind.as_str()
        );

        debug!(folder = %folder, kind = %kind, "Uploading asset");

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .context("Asset host upload request failed")?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ApiErrorResponse>()
                .await
                .map_or_else(|_| format!("HTTP {status}"), |e| e.error.message);
            bail!("Asset host upload failed: {message}");
        }

        let asset: UploadedAsset = response
            .json()
            .await
            .context("Failed to parse asset host upload response")?;

        debug!(public_id = %asset.public_id, "Asset uploaded");
        Ok(asset)
    }

    /// Delete an asset by its public id. Callers treat failures as
    /// best-effort cleanup; this method still reports them.
    pub async fn destroy(&self, public_id: &str, kind: FileKind) -> Result<()> {
        self.ensure_configured()?;

        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = sign_request(
            &[("public_id", public_id), ("timestamp", &timestamp)],
            &self.config.api_secret,
        );

        let params = [
            ("public_id", public_id),
            ("timestamp", timestamp.as_str()),
            ("api_key", self.config.api_key.as_str()),
            ("signature", signature.as_str()),
        ];

        let url = format!(
            "{}/v1_1/{}/{}/destroy",
            self.config.base_url,
            self.config.cloud_name,
            kind.as_str()
        );

        let response = self
            .client
            .post(&url)
            .form(&params)
            .send()
            .await
            .context("Asset host destroy request failed")?;

        let status = response.status();
        if !status.is_success() {
            bail!("Asset host destroy failed: HTTP {status}");
        }

        let body: DestroyResponse = response
            .json()
            .await
            .context("Failed to parse asset host destroy response")?;

        // "not found" is fine for cleanup purposes; anything else is not.
        match body.result.as_str() {
            "ok" => Ok(()),
            "not found" => {
                warn!(public_id = %public_id, "Asset already gone at host");
                Ok(())
            }
            other => bail!("Asset host destroy returned: {other}"),
        }
    }
}

/// Sort the parameters, join `k=v` with `&`, append the secret, SHA-1 hex.
fn sign_request(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted: Vec<(&str, &str)> = params.to_vec();
    sorted.sort_by_key(|(k, _)| *k);

    let to_sign: String = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha1::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_request_sorts_params() {
        let a = sign_request(&[("timestamp", "1"), ("folder", "x")], "secret");
        let b = sign_request(&[("folder", "x"), ("timestamp", "1")], "secret");
        assert_eq!(a, b);
    }

    #[test]
    fn test_sign_request_known_digest() {
        // sha1("folder=portfolio/video-editing&timestamp=1700000000secret")
        let sig = sign_request(
            &[("folder", "portfolio/video-editing"), ("timestamp", "1700000000")],
            "secret",
        );
        assert_eq!(sig.len(), 40);
        assert!(sig.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_unconfigured_client_reports_missing_keys() {
        let client = CloudinaryClient::new(AssetHostConfig::default()).unwrap();
        let err = client.ensure_configured().unwrap_err().to_string();
        assert!(err.contains("CLOUDINARY_CLOUD_NAME"));
        assert!(err.contains("CLOUDINARY_API_KEY"));
        assert!(err.contains("CLOUDINARY_API_SECRET"));
    }
}
