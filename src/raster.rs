use std::path::Path;
use std::process::Command;

use crate::error::{Error, Result};

const INPUT_PLACEHOLDER: &str = "{input}";
const OUTPUT_PLACEHOLDER: &str = "{output}";

/// How `--png` turns a rendered SVG into a PNG.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PngBackend {
    /// In-process rasterization with resvg.
    Builtin,
    /// External tool; `{input}` and `{output}` in `args` are substituted.
    Command { program: String, args: Vec<String> },
}

impl Default for PngBackend {
    fn default() -> Self {
        if cfg!(feature = "png") {
            Self::Builtin
        } else {
            Self::sips()
        }
    }
}

impl PngBackend {
    pub fn sips() -> Self {
        Self::Command {
            program: "sips".to_string(),
            args: ["-s", "format", "png", INPUT_PLACEHOLDER, "--out", OUTPUT_PLACEHOLDER]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    pub fn parse(backend: &str) -> Result<Self> {
        let backend = backend.trim();
        if backend == "builtin" {
            if cfg!(feature = "png") {
                return Ok(Self::Builtin);
            }
            return Err(Error::Config(
                "builtin PNG backend requires the `png` feature".to_string(),
            ));
        }
        let mut parts = backend.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| Error::Config("empty PNG backend".to_string()))?;
        let args: Vec<String> = parts.collect();
        if !args.iter().any(|a| a.contains(OUTPUT_PLACEHOLDER)) {
            return Err(Error::Config(format!(
                "PNG command must mention {OUTPUT_PLACEHOLDER}: {backend}"
            )));
        }
        Ok(Self::Command { program, args })
    }

    /// Converts the SVG at `svg_path` (whose contents are `svg`) to `png_path`.
    pub fn convert(&self, svg: &str, svg_path: &Path, png_path: &Path) -> Result<()> {
        match self {
            Self::Builtin => rasterize(svg, png_path),
            Self::Command { program, args } => {
                let args: Vec<String> = args
                    .iter()
                    .map(|arg| {
                        arg.replace(INPUT_PLACEHOLDER, &svg_path.to_string_lossy())
                            .replace(OUTPUT_PLACEHOLDER, &png_path.to_string_lossy())
                    })
                    .collect();
                tracing::debug!(%program, ?args, "running PNG converter");
                let output = Command::new(program)
                    .args(&args)
                    .output()
                    .map_err(|err| Error::Conversion(format!("{program}: {err}")))?;
                if !output.status.success() {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    return Err(Error::Conversion(format!(
                        "{program} exited with {}: {}",
                        output.status,
                        stderr.trim()
                    )));
                }
                Ok(())
            }
        }
    }
}

#[cfg(feature = "png")]
fn rasterize(svg: &str, output: &Path) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = "Inter".to_string();
    opt.fontdb_mut().load_system_fonts();

    let tree =
        usvg::Tree::from_str(svg, &opt).map_err(|err| Error::Conversion(err.to_string()))?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| Error::Conversion("failed to allocate pixmap".to_string()))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap
        .save_png(output)
        .map_err(|err| Error::Conversion(err.to_string()))?;
    Ok(())
}

#[cfg(not(feature = "png"))]
fn rasterize(_svg: &str, _output: &Path) -> Result<()> {
    Err(Error::Conversion(
        "built without the `png` feature".to_string(),
    ))
}
