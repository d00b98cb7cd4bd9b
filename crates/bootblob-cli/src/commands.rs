//! Build and inspect operations behind the `mkbootblob` binary.

use crate::config::{DEFAULT_OUTPUT, Invocation};
use crate::error::{CliError, Result};
use crate::manifest::Manifest;
use bootblob_format::{
    BlobError, BlobHeader, ComponentRegistry, Layout, SECTOR_SIZE, plan, write_image,
};
use std::fmt::Write as _;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// What a build run produced.
#[derive(Debug)]
pub struct BuildReport {
    /// Finalized layout
    pub layout: Layout,
    /// Image path, or `None` for a dry run
    pub output: Option<PathBuf>,
}

/// Gather components from the manifest and the command line, in that order.
pub fn collect_registry(invocation: &Invocation) -> Result<(ComponentRegistry, Option<PathBuf>)> {
    let mut registry = ComponentRegistry::new();
    let mut manifest_output = None;

    if let Some(path) = &invocation.cli.manifest {
        let manifest = Manifest::load(path)?;
        info!(
            "loaded {} components from {}",
            manifest.components.len(),
            path.display()
        );
        manifest.apply(&mut registry)?;
        manifest_output = manifest.output;
    }

    invocation.apply_directives(&mut registry)?;
    Ok((registry, manifest_output))
}

/// Plan the image and, unless this is a dry run, write it.
pub fn build(invocation: &Invocation) -> Result<BuildReport> {
    let (registry, manifest_output) = collect_registry(invocation)?;
    let output = invocation
        .cli
        .output
        .clone()
        .or(manifest_output)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

    let layout = plan(registry)?;

    if invocation.cli.dry_run {
        info!("dry run, not writing {}", output.display());
        return Ok(BuildReport {
            layout,
            output: None,
        });
    }

    write_image(&output, &layout)?;
    Ok(BuildReport {
        layout,
        output: Some(output),
    })
}

/// Read the header sector of an existing image.
pub fn inspect(path: &Path) -> Result<(BlobHeader, u64)> {
    let image_err = |source: std::io::Error| CliError::ImageRead {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::open(path).map_err(image_err)?;
    let file_len = file.metadata().map_err(image_err)?.len();

    let mut sector = Vec::with_capacity(SECTOR_SIZE);
    file.by_ref()
        .take(SECTOR_SIZE as u64)
        .read_to_end(&mut sector)
        .map_err(image_err)?;

    let header = BlobHeader::parse(&sector)?;
    if file_len < header.image_size() {
        warn!(
            "{} is {} bytes, header describes {} bytes",
            path.display(),
            file_len,
            header.image_size()
        );
    }
    Ok((header, file_len))
}

/// Render decoded header records as a table.
pub fn render_header(header: &BlobHeader) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "slot | destination |    size    |  lba-pos | lba-len |  type"
    );
    let _ = writeln!(out, "{}", "-".repeat(60));
    for (slot, record) in header.records.iter().enumerate() {
        let kind = match record.component_type() {
            Ok(t) => t.to_string(),
            Err(BlobError::UnknownComponentType(v)) => format!("?{v}"),
            Err(e) => e.to_string(),
        };
        let _ = writeln!(
            out,
            " {:>3} |  0x{:08x} | {:>10} | {:>8} | {:>7} | {}",
            slot,
            record.dest_addr,
            record.image_len,
            record.lba_pos,
            record.lba_len(),
            kind
        );
    }
    out
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use bootblob_format::HeaderRecord;
    use pretty_assertions::assert_eq;

    fn invocation(args: &[&str]) -> Invocation {
        let mut full = vec!["mkbootblob"];
        full.extend_from_slice(args);
        Invocation::try_parse_from(full).unwrap()
    }

    #[test]
    fn test_build_and_inspect() {
        let dir = tempfile::tempdir().expect("tempdir");
        let kernel = dir.path().join("kernel.bin");
        let logo = dir.path().join("logo.bmp");
        let output = dir.path().join("flash.bin");
        std::fs::write(&kernel, vec![1; 5000]).expect("write kernel");
        std::fs::write(&logo, vec![2; 100]).expect("write logo");

        let inv = invocation(&[
            "-f",
            kernel.to_str().unwrap(),
            "-d",
            "100000",
            "-t",
            "kernel",
            "-f",
            logo.to_str().unwrap(),
            "-d",
            "800000",
            "-t",
            "bootlogo",
            "-o",
            output.to_str().unwrap(),
        ]);
        let report = build(&inv).unwrap();
        assert_eq!(report.output.as_deref(), Some(output.as_path()));
        assert_eq!(report.layout.image_size(), 512 + 8192 + 4096);

        let (header, len) = inspect(&output).unwrap();
        assert_eq!(len, 512 + 8192 + 4096);
        assert_eq!(header.records.len(), 2);
        assert_eq!(header.records[1].lba_pos, 17);
        assert_eq!(header.records[1].dest_addr, 0x0080_0000);
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let kernel = dir.path().join("kernel.bin");
        let output = dir.path().join("flash.bin");
        std::fs::write(&kernel, vec![1; 10]).expect("write kernel");

        let inv = invocation(&[
            "--dry-run",
            "-f",
            kernel.to_str().unwrap(),
            "-t",
            "kernel",
            "-o",
            output.to_str().unwrap(),
        ]);
        let report = build(&inv).unwrap();
        assert!(report.output.is_none());
        assert_eq!(report.layout.len(), 1);
        assert!(!output.exists());
    }

    #[test]
    fn test_manifest_then_flags() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("kernel.bin"), vec![1; 10]).expect("write kernel");
        let extra = dir.path().join("extra.bin");
        std::fs::write(&extra, vec![3; 10]).expect("write extra");
        let manifest = dir.path().join("blob.json");
        std::fs::write(
            &manifest,
            r#"{ "output": "m.bin", "components": [ { "file": "kernel.bin", "type": "kernel" } ] }"#,
        )
        .expect("write manifest");

        let inv = invocation(&[
            "-m",
            manifest.to_str().unwrap(),
            "-f",
            extra.to_str().unwrap(),
            "-t",
            "binload",
        ]);
        let report = build(&inv).unwrap();
        assert_eq!(report.output, Some(dir.path().join("m.bin")));
        let paths: Vec<_> = report
            .layout
            .components()
            .iter()
            .map(|c| c.descriptor.source_path.clone())
            .collect();
        assert_eq!(paths, vec![dir.path().join("kernel.bin"), extra]);
    }

    #[test]
    fn test_inspect_short_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("tiny.bin");
        std::fs::write(&path, [0u8; 10]).expect("write image");
        assert!(matches!(
            inspect(&path),
            Err(CliError::Blob(BlobError::TruncatedHeader { actual: 10, .. }))
        ));
    }

    #[test]
    fn test_render_header() {
        let header = BlobHeader {
            records: vec![
                HeaderRecord {
                    image_len: 8192,
                    lba_pos: 1,
                    dest_addr: 0x0010_0000,
                    encoded_type: 1,
                },
                HeaderRecord {
                    image_len: 4096,
                    lba_pos: 17,
                    dest_addr: 0,
                    encoded_type: 10,
                },
                HeaderRecord {
                    image_len: 4096,
                    lba_pos: 25,
                    dest_addr: 0,
                    encoded_type: 5,
                },
            ],
        };
        let table = render_header(&header);
        let lines: Vec<_> = table.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[2].contains("0x00100000"));
        assert!(lines[2].ends_with("kernel"));
        assert!(lines[3].ends_with("arc[2]"));
        assert!(lines[4].ends_with("?5"));
    }
}
