use std::net::SocketAddr;

use snafu::Snafu;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Error occurs while binding metrics server on {listen_address}, error: {source}"))]
    BindTcpServer { listen_address: SocketAddr, source: std::io::Error },

    #[snafu(display("Error occurs while serving metrics server, error: {source}"))]
    ServeHttpServer { source: std::io::Error },

    #[snafu(display("Metric `{name}` is already registered"))]
    AlreadyRegistered { name: String },

    #[snafu(display("Failed to register collector, error: {source}"))]
    RegisterCollector { source: prometheus::Error },
}
