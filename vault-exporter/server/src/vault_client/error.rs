use std::path::PathBuf;

use snafu::{Location, Snafu};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Invalid Vault address `{address}`: {message}"))]
    InvalidAddress { address: String, message: String },

    #[snafu(display("Unsupported scheme in Vault address `{address}`, expected http or https"))]
    UnsupportedScheme { address: String },

    #[snafu(display("Could not read file {}, error: {source}", path.display()))]
    ReadFile { path: PathBuf, source: std::io::Error },

    #[snafu(display("Failed to parse CA certificate {}, error: {source}", path.display()))]
    ParseCertificate { path: PathBuf, source: reqwest::Error },

    #[snafu(display("Failed to parse client certificate and key, error: {source}"))]
    ParseIdentity { source: reqwest::Error },

    #[snafu(display("Client certificate and client key must be configured together"))]
    IncompleteClientIdentity,

    #[snafu(display("Failed to build HTTP client, error: {source}"))]
    BuildClient { source: reqwest::Error },

    #[snafu(display("Failed to query Vault health via {url}, error: {source}, location: {location}"))]
    SendRequest {
        url: String,
        source: reqwest::Error,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display(
        "Vault health endpoint responded with status {status}, body: {body}, location: {location}"
    ))]
    UnexpectedStatus {
        status: reqwest::StatusCode,
        body: String,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("Failed to read Vault health response, error: {source}, location: {location}"))]
    ReadResponse {
        source: reqwest::Error,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("Failed to decode Vault health response, error: {source}, location: {location}"))]
    DecodeResponse {
        source: serde_json::Error,
        #[snafu(implicit)]
        location: Location,
    },
}
