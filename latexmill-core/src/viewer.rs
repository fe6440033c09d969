use tracing::info;

use crate::config::ProjectConfig;
use crate::contract::{Reporter, Toolchain};
use crate::distribution::{distribution_file, distribution_name};
use crate::error::BuildError;
use crate::request::OutputFormat;

/// Open the distributed document for `format` in the first viewer found.
pub async fn view(
    config: &ProjectConfig,
    format: OutputFormat,
    toolchain: &dyn Toolchain,
    reporter: &dyn Reporter,
) -> Result<(), BuildError> {
    let candidates = config.viewers.for_format(format);
    let Some((name, program)) = candidates
        .iter()
        .find_map(|c| toolchain.resolve(c).map(|p| (c, p)))
    else {
        return Err(BuildError::ToolUnavailable {
            executable: candidates.join(", "),
        });
    };

    let file = distribution_file(config, format);
    info!(viewer = %name, file = %file.display(), "[VIEW] Launching viewer");
    let args = vec![file.to_string_lossy().into_owned()];
    let ok = toolchain
        .interactive(&program, &args, &config.root_dir)
        .await?;
    if !ok {
        reporter.error(&format!("{name} exited with an error"));
    }
    reporter.notice(&format!(
        "Display of {format} completed for: {}.{format} in {}",
        distribution_name(config),
        config.distribution_dir.display()
    ));
    Ok(())
}
