pub mod batch;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod graph;
pub mod palette;
pub mod raster;
pub mod render;
pub mod text;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, load_config};
pub use engine::{ElkEngine, LayoutEngine, PrelaidEngine};
pub use error::{Error, Result};
pub use graph::{Graph, load_graph};
pub use render::render_svg;
pub use theme::Theme;

/// Parses `input`, lays it out with `engine` and renders the SVG document.
pub async fn render_json<E: LayoutEngine>(input: &str, engine: &E, config: &Config) -> Result<String> {
    let graph = load_graph(input)?;
    let laid_out = engine.layout(graph).await?;
    Ok(render_svg(&laid_out, config))
}
