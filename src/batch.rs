//! Directory mode: render every `.json` file of a folder into `svg/`.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::engine::LayoutEngine;
use crate::error::{Error, Result};
use crate::render_json;

pub const OUTPUT_DIR: &str = "svg";

#[derive(Debug)]
pub struct FileReport {
    pub input: PathBuf,
    pub outcome: Result<Rendered>,
}

#[derive(Debug)]
pub struct Rendered {
    pub svg: PathBuf,
    /// Set when PNG conversion was requested.
    pub png: Option<Result<PathBuf>>,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub output_dir: PathBuf,
    pub files: Vec<FileReport>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.files.iter().filter(|f| f.outcome.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.files.len() - self.succeeded()
    }
}

impl fmt::Display for FileReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = file_name(&self.input);
        match &self.outcome {
            Ok(rendered) => {
                write!(f, "  ✓ {name} → {OUTPUT_DIR}/{}", file_name(&rendered.svg))?;
                match &rendered.png {
                    Some(Ok(png)) => write!(f, " + {OUTPUT_DIR}/{}", file_name(png)),
                    Some(Err(err)) => write!(f, " ({err})"),
                    None => Ok(()),
                }
            }
            Err(err) => write!(f, "  ✗ {name}: {err}"),
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// `.json` files directly inside `dir`, sorted by name, skipping
/// `package*.json` manifests.
pub fn list_inputs(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|err| Error::io(dir, err))?;
    let mut inputs = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| Error::io(dir, err))?;
        let path = entry.path();
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with("package") || !name.ends_with(".json") || !path.is_file() {
            continue;
        }
        inputs.push(path);
    }
    inputs.sort();
    Ok(inputs)
}

/// Renders each input independently. A failing file is recorded and the
/// batch moves on; only an unreadable directory aborts.
pub async fn render_dir<E: LayoutEngine>(
    dir: &Path,
    engine: &E,
    config: &Config,
    png: bool,
    on_file: impl FnMut(&FileReport),
) -> Result<BatchReport> {
    let inputs = list_inputs(dir)?;
    render_inputs(dir, inputs, engine, config, png, on_file).await
}

/// Renders `inputs` (as listed by [`list_inputs`]) into `dir/svg/`.
pub async fn render_inputs<E: LayoutEngine>(
    dir: &Path,
    inputs: Vec<PathBuf>,
    engine: &E,
    config: &Config,
    png: bool,
    mut on_file: impl FnMut(&FileReport),
) -> Result<BatchReport> {
    let output_dir = dir.join(OUTPUT_DIR);
    std::fs::create_dir_all(&output_dir).map_err(|err| Error::io(&output_dir, err))?;
    tracing::info!(dir = %dir.display(), count = inputs.len(), "rendering directory");

    let mut report = BatchReport {
        output_dir: output_dir.clone(),
        files: Vec::with_capacity(inputs.len()),
    };
    for input in inputs {
        let outcome = render_file(&input, &output_dir, engine, config, png).await;
        if let Err(err) = &outcome {
            tracing::debug!(file = %input.display(), error = %err, "render failed");
        }
        let file = FileReport { input, outcome };
        on_file(&file);
        report.files.push(file);
    }
    Ok(report)
}

async fn render_file<E: LayoutEngine>(
    input: &Path,
    output_dir: &Path,
    engine: &E,
    config: &Config,
    png: bool,
) -> Result<Rendered> {
    let text = std::fs::read_to_string(input).map_err(|err| Error::io(input, err))?;
    let svg = render_json(&text, engine, config).await?;
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    let svg_path = output_dir.join(format!("{stem}.svg"));
    std::fs::write(&svg_path, &svg).map_err(|err| Error::io(&svg_path, err))?;

    let png = png.then(|| {
        let png_path = svg_path.with_extension("png");
        config
            .png
            .convert(&svg, &svg_path, &png_path)
            .map(|()| png_path)
            .inspect_err(|err| tracing::debug!(file = %svg_path.display(), error = %err, "PNG conversion failed"))
    });
    Ok(Rendered { svg: svg_path, png })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::PrelaidEngine;
    use crate::raster::PngBackend;
    use futures::executor::block_on;

    const VALID: &str = r#"{"children":[{"id":"a","x":0,"y":0,"width":100,"height":40}]}"#;

    #[test]
    fn lists_only_json_and_skips_manifests() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.json", "a.json", "package.json", "package-lock.json", "notes.txt"] {
            std::fs::write(dir.path().join(name), "{}").unwrap();
        }
        std::fs::create_dir(dir.path().join("dir.json")).unwrap();
        let inputs = list_inputs(dir.path()).unwrap();
        let names: Vec<String> = inputs.iter().map(|p| file_name(p)).collect();
        assert_eq!(names, vec!["a.json", "b.json"]);
    }

    #[test]
    fn bad_file_does_not_abort_batch() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad.json"), "{ nope").unwrap();
        std::fs::write(dir.path().join("good.json"), VALID).unwrap();

        let mut seen = 0;
        let report = block_on(render_dir(
            dir.path(),
            &PrelaidEngine,
            &Config::default(),
            false,
            |_| seen += 1,
        ))
        .unwrap();
        assert_eq!(seen, 2);
        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failed(), 1);
        assert!(dir.path().join("svg/good.svg").is_file());
        assert!(!dir.path().join("svg/bad.svg").exists());

        let bad = &report.files[0];
        assert!(matches!(bad.outcome, Err(Error::Parse(_))));
        assert!(bad.to_string().starts_with("  ✗ bad.json"));
    }

    #[test]
    fn png_failure_keeps_svg() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("g.json"), VALID).unwrap();
        let config = Config {
            png: PngBackend::Command {
                program: "elk-svg-no-such-rasterizer".to_string(),
                args: vec!["{input}".into(), "{output}".into()],
            },
            ..Config::default()
        };

        let report =
            block_on(render_dir(dir.path(), &PrelaidEngine, &config, true, |_| {})).unwrap();
        assert_eq!(report.succeeded(), 1);
        let rendered = report.files[0].outcome.as_ref().unwrap();
        assert!(matches!(rendered.png, Some(Err(Error::Conversion(_)))));
        assert!(rendered.svg.is_file());
    }

    #[test]
    fn output_dir_may_already_exist() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(OUTPUT_DIR)).unwrap();
        let report = block_on(render_dir(
            dir.path(),
            &PrelaidEngine,
            &Config::default(),
            false,
            |_| {},
        ))
        .unwrap();
        assert!(report.files.is_empty());
    }

    #[test]
    fn missing_dir_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent");
        let result = block_on(render_dir(
            &missing,
            &PrelaidEngine,
            &Config::default(),
            false,
            |_| {},
        ));
        assert!(matches!(result, Err(Error::Io { .. })));
        assert!(!missing.exists());
    }
}
