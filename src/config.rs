use crate::error::{Error, Result};
use crate::raster::PngBackend;
use crate::theme::Theme;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Blank space around the content on every side.
    pub margin: f32,
    /// Extra canvas height reserved below the content for the legend.
    pub legend_height: f32,
    /// Estimated glyph width as a fraction of the font size.
    pub char_width_ratio: f32,
    pub font_size: f32,
    pub subtitle_font_size: f32,
    pub subtitle_line_height: f32,
    pub container_font_size: f32,
    pub title_font_size: f32,
    pub edge_label_font_size: f32,
    pub edge_stroke_width: f32,
    pub default_node_width: f32,
    pub default_node_height: f32,
    pub legend_columns: usize,
    pub legend_column_width: f32,
    pub legend_row_height: f32,
    pub legend_swatch_size: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            margin: 40.0,
            legend_height: 60.0,
            char_width_ratio: 0.58,
            font_size: 13.0,
            subtitle_font_size: 10.0,
            subtitle_line_height: 13.0,
            container_font_size: 12.0,
            title_font_size: 18.0,
            edge_label_font_size: 10.0,
            edge_stroke_width: 1.5,
            default_node_width: 120.0,
            default_node_height: 40.0,
            legend_columns: 4,
            legend_column_width: 180.0,
            legend_row_height: 18.0,
            legend_swatch_size: 12.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// `node` executable; looked up on `PATH` when unset.
    pub node: Option<PathBuf>,
    /// Searched for `elkjs` before the standard locations.
    pub search_dirs: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub theme: Theme,
    pub render: RenderConfig,
    pub engine: EngineConfig,
    pub png: PngBackend,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<ThemeFile>,
    render: Option<RenderFile>,
    engine: Option<EngineFile>,
    png: Option<PngFile>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeFile {
    font_family: Option<String>,
    background: Option<String>,
    title_color: Option<String>,
    edge_color: Option<String>,
    edge_label_color: Option<String>,
    legend_title_color: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenderFile {
    margin: Option<f32>,
    legend_height: Option<f32>,
    char_width_ratio: Option<f32>,
    font_size: Option<f32>,
    subtitle_font_size: Option<f32>,
    legend_columns: Option<usize>,
    legend_column_width: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EngineFile {
    node: Option<PathBuf>,
    search_dirs: Option<Vec<PathBuf>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PngFile {
    /// `"builtin"` or a command line with `{input}` / `{output}` placeholders.
    backend: Option<String>,
}

pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path).map_err(|err| Error::io(path, err))?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> Result<Config> {
    let parsed: ConfigFile =
        json5::from_str(contents).map_err(|err| Error::Config(err.to_string()))?;
    let mut config = Config::default();

    if let Some(theme) = parsed.theme {
        if let Some(v) = theme.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = theme.background {
            config.theme.background = v;
        }
        if let Some(v) = theme.title_color {
            config.theme.title_color = v;
        }
        if let Some(v) = theme.edge_color {
            config.theme.edge_color = v;
        }
        if let Some(v) = theme.edge_label_color {
            config.theme.edge_label_color = v;
        }
        if let Some(v) = theme.legend_title_color {
            config.theme.legend_title_color = v;
        }
    }

    if let Some(render) = parsed.render {
        if let Some(v) = render.margin {
            config.render.margin = v;
        }
        if let Some(v) = render.legend_height {
            config.render.legend_height = v;
        }
        if let Some(v) = render.char_width_ratio {
            if v <= 0.0 {
                return Err(Error::Config("charWidthRatio must be positive".to_string()));
            }
            config.render.char_width_ratio = v;
        }
        if let Some(v) = render.font_size {
            config.render.font_size = v;
        }
        if let Some(v) = render.subtitle_font_size {
            config.render.subtitle_font_size = v;
        }
        if let Some(v) = render.legend_columns {
            config.render.legend_columns = v.max(1);
        }
        if let Some(v) = render.legend_column_width {
            config.render.legend_column_width = v;
        }
    }

    if let Some(engine) = parsed.engine {
        config.engine.node = engine.node;
        if let Some(dirs) = engine.search_dirs {
            config.engine.search_dirs = dirs;
        }
    }

    if let Some(backend) = parsed.png.and_then(|png| png.backend) {
        config.png = PngBackend::parse(&backend)?;
    }

    Ok(config)
}
