//! Layout engines.
//!
//! Layout is done by elkjs running under `node`; this crate only ships the
//! adapter. `PrelaidEngine` is the identity for inputs that already carry
//! coordinates.

use std::env;
use std::ffi::OsString;
use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::graph::Graph;

/// Reads the graph JSON from stdin, lays it out with the elkjs package at
/// `argv[1]`, prints the result.
const ELK_SCRIPT: &str = r#"
const ELK = require(process.argv[1]);
let input = '';
process.stdin.setEncoding('utf8');
process.stdin.on('data', (chunk) => { input += chunk; });
process.stdin.on('end', () => {
  new ELK().layout(JSON.parse(input)).then(
    (graph) => process.stdout.write(JSON.stringify(graph)),
    (err) => { console.error(String(err && err.message || err)); process.exit(1); },
  );
});
"#;

pub trait LayoutEngine {
    /// Returns `graph` with `x`, `y`, `width`, `height` on every node and
    /// `sections` on every edge.
    fn layout(&self, graph: Graph) -> impl Future<Output = Result<Graph>>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PrelaidEngine;

impl LayoutEngine for PrelaidEngine {
    fn layout(&self, graph: Graph) -> impl Future<Output = Result<Graph>> {
        std::future::ready(Ok(graph))
    }
}

#[derive(Debug, Clone)]
pub struct ElkEngine {
    node: PathBuf,
    elkjs: PathBuf,
}

impl ElkEngine {
    /// Finds `node` and the `elkjs` package. Called once at startup.
    pub fn locate(config: &EngineConfig) -> Result<Self> {
        let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let roots = search_roots(
            config,
            &cwd,
            env::var_os("NODE_PATH"),
            env::var_os("HOME").map(PathBuf::from),
        );
        let elkjs = roots
            .iter()
            .map(|root| root.join("elkjs"))
            .find(|candidate| candidate.join("package.json").is_file());
        let node = match &config.node {
            Some(node) => Some(node.clone()).filter(|p| p.is_file()),
            None => find_on_path("node", env::var_os("PATH")),
        };

        match (node, elkjs) {
            (Some(node), Some(elkjs)) => {
                tracing::debug!(node = %node.display(), elkjs = %elkjs.display(), "located layout engine");
                Ok(Self { node, elkjs })
            }
            (None, _) => Err(Error::LayoutUnavailable {
                searched: vec![config.node.clone().unwrap_or_else(|| PathBuf::from("node (PATH)"))],
            }),
            (Some(_), None) => Err(Error::LayoutUnavailable { searched: roots }),
        }
    }

    pub fn elkjs_dir(&self) -> &Path {
        &self.elkjs
    }

    fn run(&self, graph: &Graph) -> Result<Graph> {
        let input = serde_json::to_vec(graph).map_err(|err| Error::Layout(err.to_string()))?;
        let mut child = Command::new(&self.node)
            .arg("-e")
            .arg(ELK_SCRIPT)
            .arg(&self.elkjs)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| Error::io(&self.node, err))?;

        // A child that dies early closes the pipe; its stderr explains why.
        let written = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(&input),
            None => Ok(()),
        };
        let output = child
            .wait_with_output()
            .map_err(|err| Error::io(&self.node, err))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Layout(format!(
                "{} exited with {}: {}",
                self.node.display(),
                output.status,
                stderr.trim()
            )));
        }
        written.map_err(|err| Error::io(&self.node, err))?;
        serde_json::from_slice(&output.stdout)
            .map_err(|err| Error::Layout(format!("unreadable engine output: {err}")))
    }
}

impl LayoutEngine for ElkEngine {
    async fn layout(&self, graph: Graph) -> Result<Graph> {
        tracing::debug!(nodes = graph.node_count(), "running elkjs");
        self.run(&graph)
    }
}

/// `node_modules` directories in lookup order: configured dirs, the working
/// directory and its ancestors, `NODE_PATH`, then global install locations.
pub fn search_roots(
    config: &EngineConfig,
    cwd: &Path,
    node_path: Option<OsString>,
    home: Option<PathBuf>,
) -> Vec<PathBuf> {
    let mut roots: Vec<PathBuf> = config.search_dirs.clone();
    roots.extend(cwd.ancestors().map(|dir| dir.join("node_modules")));
    if let Some(node_path) = node_path {
        roots.extend(env::split_paths(&node_path).filter(|p| !p.as_os_str().is_empty()));
    }
    roots.push(PathBuf::from("/opt/homebrew/lib/node_modules"));
    roots.push(PathBuf::from("/usr/local/lib/node_modules"));
    if let Some(home) = home {
        roots.push(home.join(".bun/install/global/node_modules"));
        roots.push(home.join(".npm-global/lib/node_modules"));
        roots.push(home.join(".local/lib/node_modules"));
    }
    roots
}

fn find_on_path(program: &str, path: Option<OsString>) -> Option<PathBuf> {
    let path = path?;
    env::split_paths(&path)
        .map(|dir| dir.join(program))
        .find(|candidate| candidate.is_file())
}
