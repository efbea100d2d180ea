use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::{ensure_config_dir, get_config_dir, get_config_path, Config};

const HEADER: &str = "# hybrid-score configuration\n\
# Every section is optional; omitted keys fall back to the values below.\n\n";

/// Write the default configuration as YAML.
///
/// Refuses to replace an existing file unless `force` is set. The write is
/// atomic, so an interrupted run never leaves a half-written config behind.
pub fn write_default_config(path: Option<&Path>, force: bool) -> Result<PathBuf> {
    let target = match path {
        Some(p) => p.to_path_buf(),
        None => get_config_path(),
    };

    if target.exists() && !force {
        anyhow::bail!(
            "Config already exists at {}. Pass --force to overwrite it",
            target.display()
        );
    }

    if target.starts_with(get_config_dir()) {
        ensure_config_dir()?;
    } else if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let yaml = serde_saphyr::to_string(&Config::default())
        .context("Failed to serialize default config")?;

    let mut file = AtomicWriteFile::open(&target)
        .with_context(|| format!("Failed to open {} for writing", target.display()))?;
    file.write_all(HEADER.as_bytes())?;
    file.write_all(yaml.as_bytes())?;
    file.commit()
        .with_context(|| format!("Failed to write config to {}", target.display()))?;

    Ok(target)
}
