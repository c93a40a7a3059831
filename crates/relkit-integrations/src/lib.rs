//! Thin wrappers around external release tooling
//!
//! - [`aws`]: S3 upload and IAM Roles Anywhere credentials
//! - [`qt`]: Qt SDK layout for CMake and deployment
//! - [`archive`]: zip archives with 7-Zip
//!
//! Every helper runs its tool through a [`relkit_utils::Session`], so output,
//! failure handling and `PATH` overrides follow the session settings.

pub mod archive;
pub mod aws;
pub mod qt;

pub use archive::{zip_command, zip_it};
pub use aws::{
    AwsAuthRequest, AwsCredentials, aws_auth, aws_copy_command, aws_copy_file, parse_credentials,
};
pub use qt::QtInfo;
