//! PDF output through an external `wkhtmltopdf`.

use std::ffi::OsString;
use std::io::Write;
use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result, bail};

pub const CONVERTER: &str = "wkhtmltopdf";

/// Version banner of `program`. Fails when it cannot be run.
pub fn converter_version(program: &str) -> Result<String> {
    let out = Command::new(program)
        .arg("-V")
        .output()
        .with_context(|| format!("{program} not found; install it to use --wk-pdf"))?;
    if !out.status.success() {
        bail!(
            "{program} -V failed: {}",
            String::from_utf8_lossy(&out.stderr).trim()
        );
    }
    Ok(String::from_utf8_lossy(&out.stdout).into_owned())
}

/// Arguments for one conversion. Only the patched Qt build supports the
/// table of contents and internal links.
fn converter_args(version: &str, page: &Path, target: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = Vec::new();
    if version.contains("patched") {
        args.push("toc".into());
        args.push("--enable-internal-links".into());
    }
    args.push("--enable-local-file-access".into());
    args.push(page.into());
    args.push(target.into());
    args
}

/// Writes `html` to a temporary page and converts it to a PDF at `target`.
pub fn html_to_pdf(program: &str, html: &str, target: &Path) -> Result<()> {
    let version = converter_version(program)?;
    log::info!("converting to PDF with {}", version.trim());

    let mut page = tempfile::Builder::new()
        .prefix("roamdoc-")
        .suffix(".html")
        .tempfile()
        .context("failed to create temporary HTML file")?;
    page.write_all(html.as_bytes())
        .and_then(|()| page.flush())
        .with_context(|| format!("failed to write {}", page.path().display()))?;

    let status = Command::new(program)
        .args(converter_args(&version, page.path(), target))
        .status()
        .with_context(|| format!("failed to run {program}"))?;
    if !status.success() {
        bail!("{program} exited with {status}");
    }
    log::debug!("wrote {}", target.display());
    Ok(())
}
