use prometheus::{GaugeVec, Opts};
use vault_exporter_core::{ServerInfo, PROGRAM_NAME};

const LABELS: [&str; 4] = ["version", "revision", "branch", "rustversion"];

/// Constant `vault_exporter_build_info` gauge labeled with the build metadata.
///
/// # Errors
///
/// Returns an error if the gauge can not be created.
pub fn build_info_collector(server_info: &ServerInfo) -> prometheus::Result<GaugeVec> {
    let opts = Opts::new(
        "build_info",
        format!(
            "A metric with a constant '1' value labeled by version, revision, branch, and \
             rustversion from which {PROGRAM_NAME} was built."
        ),
    )
    .namespace(PROGRAM_NAME);

    let gauge = GaugeVec::new(opts, &LABELS)?;
    gauge
        .get_metric_with_label_values(&[
            server_info.version.as_str(),
            server_info.commit_hash.as_str(),
            server_info.branch.as_str(),
            server_info.rust_version.as_str(),
        ])?
        .set(1.0);

    Ok(gauge)
}
