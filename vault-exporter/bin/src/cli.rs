use std::{
    io,
    io::Write,
    net::{IpAddr, SocketAddr},
    path::PathBuf,
    time::Duration,
};

use clap::{builder::BoolishValueParser, Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use vault_exporter_cli_common::config::LogFormatter;

use crate::{command::run_server, config::Config, error, shadow};

#[derive(Debug, Parser)]
#[command(author,
    version,
    long_version = shadow::CLAP_LONG_VERSION,
    about,
    long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[clap(
        long = "config",
        short = 'c',
        env = "VAULT_EXPORTER_CONFIG_FILE_PATH",
        global = true,
        help = "Specify a configuration file"
    )]
    config_file_path: Option<PathBuf>,

    #[command(flatten)]
    overrides: ConfigOverrides,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    #[clap(about = "Print version information")]
    Version,

    #[clap(about = "Output shell completion code for the specified shell (bash, zsh, fish)")]
    Completion { shell: Shell },

    #[clap(about = "Output default configuration")]
    DefaultConfig,

    #[clap(about = "Run server")]
    #[command(visible_alias = "run")]
    Server,
}

/// Settings taken from flags or environment variables, applied over the configuration file.
#[derive(Args, Clone, Debug, Default)]
pub struct ConfigOverrides {
    #[arg(
        long = "web.listen-address",
        global = true,
        value_parser = parse_listen_address,
        help = "Address to listen on for web interface and telemetry, e.g. `:9107`"
    )]
    listen_address: Option<SocketAddr>,

    #[arg(
        long = "web.telemetry-path",
        global = true,
        help = "Path under which to expose metrics"
    )]
    telemetry_path: Option<String>,

    #[arg(
        long = "log.level",
        global = true,
        value_parser = ["trace", "debug", "info", "warn", "error"],
        help = "Only log messages with the given severity or above"
    )]
    log_level: Option<String>,

    #[arg(
        long = "log.format",
        global = true,
        value_parser = parse_log_format,
        help = "Output format of log messages (pretty, json)"
    )]
    log_format: Option<LogFormatter>,

    #[arg(long = "vault.address", global = true, env = "VAULT_ADDR", help = "Vault server address")]
    vault_address: Option<String>,

    #[arg(
        long = "vault.token",
        global = true,
        env = "VAULT_TOKEN",
        hide_env_values = true,
        help = "Token sent to Vault"
    )]
    vault_token: Option<String>,

    #[arg(
        long = "vault.namespace",
        global = true,
        env = "VAULT_NAMESPACE",
        help = "Vault namespace sent with each query"
    )]
    vault_namespace: Option<String>,

    #[arg(
        long = "vault.ca-cert",
        global = true,
        env = "VAULT_CACERT",
        help = "PEM encoded CA certificate used to verify Vault"
    )]
    vault_ca_cert: Option<PathBuf>,

    #[arg(
        long = "vault.client-cert",
        global = true,
        env = "VAULT_CLIENT_CERT",
        help = "PEM encoded client certificate for TLS authentication"
    )]
    vault_client_cert: Option<PathBuf>,

    #[arg(
        long = "vault.client-key",
        global = true,
        env = "VAULT_CLIENT_KEY",
        help = "PEM encoded private key of the client certificate"
    )]
    vault_client_key: Option<PathBuf>,

    #[arg(
        long = "vault.skip-verify",
        global = true,
        env = "VAULT_SKIP_VERIFY",
        value_parser = BoolishValueParser::new(),
        num_args = 0..=1,
        default_missing_value = "true",
        help = "Disable TLS certificate verification"
    )]
    vault_skip_verify: Option<bool>,

    #[arg(
        long = "vault.timeout",
        global = true,
        env = "VAULT_CLIENT_TIMEOUT",
        value_parser = parse_duration,
        help = "Timeout of one health query, e.g. `60`, `30s`, `500ms` or `2m`"
    )]
    vault_timeout: Option<Duration>,
}

impl ConfigOverrides {
    pub fn apply(self, mut config: Config) -> Config {
        let Self {
            listen_address,
            telemetry_path,
            log_level,
            log_format,
            vault_address,
            vault_token,
            vault_namespace,
            vault_ca_cert,
            vault_client_cert,
            vault_client_key,
            vault_skip_verify,
            vault_timeout,
        } = self;

        config.log = config.log.with_level(log_level).with_formatter(log_format);

        if let Some(listen_address) = listen_address {
            config.web.listen_address = listen_address;
        }
        if let Some(telemetry_path) = telemetry_path {
            config.web.telemetry_path = telemetry_path;
        }

        let vault = &mut config.vault;
        if let Some(address) = vault_address {
            vault.address = address;
        }
        vault.token = vault_token.or(vault.token.take());
        vault.namespace = vault_namespace.or(vault.namespace.take());
        vault.ca_cert = vault_ca_cert.or(vault.ca_cert.take());
        vault.client_cert = vault_client_cert.or(vault.client_cert.take());
        vault.client_key = vault_client_key.or(vault.client_key.take());
        if let Some(skip_verify) = vault_skip_verify {
            vault.skip_verify = skip_verify;
        }
        if let Some(timeout) = vault_timeout {
            vault.timeout = timeout;
        }

        config
    }
}

impl Cli {
    pub fn run(self) -> Result<(), Box<error::Error>> {
        match self.command {
            Some(Command::Version) => {
                io::stdout()
                    .write_all(Self::command().render_long_version().as_bytes())
                    .expect("failed to write to stdout");
            }
            Some(Command::Completion { shell }) => {
                let mut command = Self::command();
                let bin_name = command.get_name().to_string();
                clap_complete::generate(shell, &mut command, bin_name, &mut io::stdout());
            }
            Some(Command::DefaultConfig) => {
                let config_text =
                    serde_yaml::to_string(&Config::default()).expect("`Config` is serializable");
                io::stdout().write_all(config_text.as_bytes()).expect("failed to write to stdout");
            }
            Some(Command::Server) | None => {
                let config = self.load_config()?;
                run_server(config)?;
            }
        }

        Ok(())
    }

    #[allow(clippy::result_large_err)]
    fn load_config(self) -> Result<Config, error::Error> {
        let config = Config::search(self.config_file_path.as_deref())?;
        Ok(self.overrides.apply(config))
    }
}

/// Parses `host:port`, where an empty host such as in `:9107` listens on all interfaces.
fn parse_listen_address(s: &str) -> Result<SocketAddr, String> {
    if let Some(port) = s.strip_prefix(':') {
        let port = port.parse::<u16>().map_err(|err| format!("invalid port `{port}`: {err}"))?;
        return Ok(SocketAddr::new(IpAddr::from([0, 0, 0, 0]), port));
    }

    s.parse().map_err(|err| format!("invalid listen address `{s}`: {err}"))
}

fn parse_log_format(s: &str) -> Result<LogFormatter, String> {
    match s.to_lowercase().as_str() {
        "json" => Ok(LogFormatter::Json),
        // `logfmt` is accepted for compatibility with other exporters.
        "pretty" | "logfmt" => Ok(LogFormatter::Pretty),
        _ => Err(format!("unknown log format `{s}`, expected `pretty` or `json`")),
    }
}

/// Parses a duration given in seconds, optionally suffixed with `ms`, `s`, `m` or `h`.
fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    let split = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    let (value, unit) = s.split_at(split);
    let value = value.parse::<u64>().map_err(|_| format!("invalid duration `{s}`"))?;

    match unit {
        "" | "s" => Ok(Duration::from_secs(value)),
        "ms" => Ok(Duration::from_millis(value)),
        "m" => Ok(Duration::from_secs(value.saturating_mul(60))),
        "h" => Ok(Duration::from_secs(value.saturating_mul(3600))),
        _ => Err(format!("invalid duration unit `{unit}` in `{s}`")),
    }
}

#[cfg(test)]
mod tests {
    use std::{net::SocketAddr, path::PathBuf, time::Duration};

    use clap::{CommandFactory, Parser};
    use vault_exporter_cli_common::config::LogFormatter;

    use super::{parse_duration, parse_listen_address, Cli, Command};
    use crate::config::Config;

    #[test]
    fn test_command() { Cli::command().debug_assert(); }

    #[test]
    fn test_server_is_default_command() {
        let cli = Cli::try_parse_from(["vault-exporter"]).unwrap();
        assert!(cli.command.is_none());

        let cli = Cli::try_parse_from(["vault-exporter", "run"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Server)));
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::try_parse_from([
            "vault-exporter",
            "server",
            "--web.listen-address",
            ":9200",
            "--web.telemetry-path",
            "/vault",
            "--log.level",
            "debug",
            "--log.format",
            "json",
            "--vault.address",
            "http://vault.internal:8200",
            "--vault.token",
            "s.token",
            "--vault.skip-verify",
            "--vault.timeout",
            "5s",
        ])
        .unwrap();

        let config = cli.overrides.apply(Config::default());

        assert_eq!(config.web.listen_address, "0.0.0.0:9200".parse::<SocketAddr>().unwrap());
        assert_eq!(config.web.telemetry_path, "/vault");
        assert_eq!(config.log.log_filters, "debug");
        assert_eq!(config.log.formatter, LogFormatter::Json);
        assert_eq!(config.vault.address, "http://vault.internal:8200");
        assert_eq!(config.vault.token.as_deref(), Some("s.token"));
        assert!(config.vault.skip_verify);
        assert_eq!(config.vault.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_overrides_keep_file_values() {
        let cli = Cli::try_parse_from(["vault-exporter", "--vault.skip-verify", "false"]).unwrap();

        let mut config = Config::default();
        config.vault.token = Some("from-file".to_string());
        config.vault.ca_cert = Some(PathBuf::from("/etc/vault/ca.pem"));
        config.vault.skip_verify = true;

        let config = cli.overrides.apply(config);
        assert!(!config.vault.skip_verify);
        assert_eq!(config.vault.ca_cert, Some(PathBuf::from("/etc/vault/ca.pem")));
        if std::env::var_os("VAULT_TOKEN").is_none() {
            assert_eq!(config.vault.token.as_deref(), Some("from-file"));
        }
    }

    #[test]
    fn test_rejects_unknown_log_level() {
        assert!(Cli::try_parse_from(["vault-exporter", "--log.level", "verbose"]).is_err());
    }

    #[test]
    fn test_parse_listen_address() {
        assert_eq!(parse_listen_address(":9107").unwrap(), "0.0.0.0:9107".parse().unwrap());
        assert_eq!(
            parse_listen_address("127.0.0.1:9000").unwrap(),
            "127.0.0.1:9000".parse::<SocketAddr>().unwrap()
        );
        assert!(parse_listen_address(":http").is_err());
        assert!(parse_listen_address("localhost").is_err());
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("60").unwrap(), Duration::from_secs(60));
        assert_eq!(parse_duration("30s").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration("500ms").unwrap(), Duration::from_millis(500));
        assert_eq!(parse_duration("2m").unwrap(), Duration::from_secs(120));
        assert!(parse_duration("").is_err());
        assert!(parse_duration("5 days").is_err());
    }
}
