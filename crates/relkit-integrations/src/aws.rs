//! AWS S3 upload and IAM Roles Anywhere credential exchange
//!
//! Both go through the `aws` and `aws_signing_helper` command line tools.
//! Credentials obtained by [`aws_auth`] are exported to every later child
//! process of the session, never to relkit's own environment.

use std::fmt;

use relkit_runner::{CommandSpec, RunOptions, RunResult, Verbosity};
use relkit_utils::{RelkitError, Session};
use serde::Deserialize;
use tracing::{debug, info};

const SIGNING_HELPER: &str = "aws_signing_helper";
const SIGNING_HELPER_INFO: &str = "Get from \
     https://github.com/aws/rolesanywhere-credential-helper/releases \
     or 'chmod +x aws_signing_helper' if it's already in the path";

/// `aws s3 cp` command for an upload with caching disabled.
#[must_use]
pub fn aws_copy_command(file: &str, s3_path: &str, content_type: Option<&str>) -> CommandSpec {
    let mut spec =
        CommandSpec::new("aws").args(["s3", "cp", "--cache-control", "max-age:no-cache"]);
    if let Some(content_type) = content_type.filter(|value| !value.is_empty()) {
        spec = spec.arg("--content-type").arg(content_type);
    }
    spec.arg(file).arg(s3_path)
}

/// Upload `file` to `s3_path` quietly.
///
/// A failed upload does not stop the script; the returned result carries the
/// exit code.
pub fn aws_copy_file(
    session: &mut Session,
    file: &str,
    s3_path: &str,
    content_type: Option<&str>,
) -> Result<RunResult, RelkitError> {
    let options = RunOptions::new()
        .verbosity(Verbosity::Silent)
        .permissive(true)
        .error_context(format!("Could not update {file} to AWS"));
    let result = session.run(&aws_copy_command(file, s3_path, content_type), &options)?;
    if !result.success() {
        debug!(file, s3_path, exit_code = result.exit_code, "aws upload failed");
    }
    Ok(result)
}

/// Inputs of `aws_signing_helper credential-process`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AwsAuthRequest {
    pub certificate: String,
    pub private_key: String,
    pub trust_anchor_arn: String,
    pub profile_arn: String,
    pub role_arn: String,
    /// Appended to the missing certificate and key messages
    pub info: String,
}

impl AwsAuthRequest {
    fn command(&self) -> CommandSpec {
        CommandSpec::new(SIGNING_HELPER).args([
            "credential-process",
            "--certificate",
            self.certificate.as_str(),
            "--private-key",
            self.private_key.as_str(),
            "--trust-anchor-arn",
            self.trust_anchor_arn.as_str(),
            "--profile-arn",
            self.profile_arn.as_str(),
            "--role-arn",
            self.role_arn.as_str(),
        ])
    }

    fn missing_message(&self, what: &str) -> String {
        if self.info.is_empty() {
            format!("Missing AWS {what} file.")
        } else {
            format!("Missing AWS {what} file. {}", self.info)
        }
    }
}

/// Temporary credentials from the signing helper.
#[derive(Clone, PartialEq, Eq)]
pub struct AwsCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
}

impl fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwsCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"***")
            .field("session_token", &"***")
            .finish()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CredentialProcessOutput {
    access_key_id: Option<String>,
    secret_access_key: Option<String>,
    session_token: Option<String>,
}

/// Parse the JSON printed by `credential-process`.
///
/// # Errors
///
/// - [`RelkitError::AwsInvalidCredentials`] when the text is not a JSON object
/// - [`RelkitError::AwsMissingKey`] for the first absent key
pub fn parse_credentials(text: &str) -> Result<AwsCredentials, RelkitError> {
    let output: CredentialProcessOutput =
        serde_json::from_str(text.trim()).map_err(|err| RelkitError::AwsInvalidCredentials {
            reason: err.to_string(),
        })?;

    let require = |value: Option<String>, key: &str| {
        value.ok_or_else(|| RelkitError::AwsMissingKey { key: key.to_string() })
    };

    Ok(AwsCredentials {
        access_key_id: require(output.access_key_id, "AccessKeyId")?,
        secret_access_key: require(output.secret_access_key, "SecretAccessKey")?,
        session_token: require(output.session_token, "SessionToken")?,
    })
}

/// Exchange an X.509 certificate for temporary credentials and export them as
/// `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY` and `AWS_SESSION_TOKEN` to
/// every later command of the session.
pub fn aws_auth(
    session: &mut Session,
    request: &AwsAuthRequest,
) -> Result<AwsCredentials, RelkitError> {
    session.required_file(&request.certificate, &request.missing_message("certificate"))?;
    session.required_file(&request.private_key, &request.missing_message("private-key"))?;
    session.required_command(SIGNING_HELPER, SIGNING_HELPER_INFO)?;

    // stderr stays out of the JSON
    let options = RunOptions::new()
        .verbosity(Verbosity::Silent)
        .merge_stderr(false);
    let result = session.run(&request.command(), &options)?;
    let credentials = parse_credentials(&result.stdout_text)?;

    let runner = session.runner_mut();
    runner.set_env("AWS_ACCESS_KEY_ID", &credentials.access_key_id);
    runner.set_env("AWS_SECRET_ACCESS_KEY", &credentials.secret_access_key);
    runner.set_env("AWS_SESSION_TOKEN", &credentials.session_token);
    info!(role_arn = %request.role_arn, "aws credentials exported");

    Ok(credentials)
}
