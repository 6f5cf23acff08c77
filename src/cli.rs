//! Command line parsing exposed via the library.
use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::{Context, Result};
use structopt::StructOpt;

use crate::{
    config::BundleConfig,
    printer::{self, PrintOptions},
    Bundler, ModuleGraph,
};

/// Options shared by every command that builds a graph.
#[derive(StructOpt)]
struct ProjectArgs {
    /// Load options from a JSON config file
    #[structopt(short, long, parse(from_os_str))]
    config: Option<PathBuf>,
    /// Extension to try during resolution (repeatable)
    #[structopt(short, long = "extension")]
    extensions: Vec<String>,
    /// Process modules on a single thread
    #[structopt(long)]
    no_parallel: bool,
    /// Module entry point
    #[structopt(parse(from_os_str))]
    module: Option<PathBuf>,
}

impl ProjectArgs {
    /// Load the config file and apply the command line overrides.
    fn config(self) -> Result<BundleConfig> {
        let mut config = match self.config {
            Some(file) => BundleConfig::load(file)?,
            None => Default::default(),
        };
        if self.module.is_some() {
            config.entry = self.module;
        }
        if !self.extensions.is_empty() {
            config.extensions = self.extensions;
        }
        if self.no_parallel {
            config.parallel = false;
        }
        Ok(config)
    }
}

#[derive(StructOpt)]
#[structopt(about = "CommonJS module bundler")]
enum CinderCommands {
    /// Generate a bundle
    Bundle {
        /// Write bundle to output
        #[structopt(short, long, parse(from_os_str))]
        output: Option<PathBuf>,
        /// Assign the exports of the entry point to a variable
        #[structopt(short, long)]
        global_name: Option<String>,
        #[structopt(flatten)]
        project: ProjectArgs,
    },

    /// Print the module graph for an entry point
    Tree {
        /// Print the file name for each module
        #[structopt(short = "f", long)]
        include_file: bool,
        /// Print the identifier for each module
        #[structopt(short = "i", long)]
        include_id: bool,
        #[structopt(flatten)]
        project: ProjectArgs,
    },

    /// Print the module graph as JSON
    Graph {
        /// Include the compiled code for each module
        #[structopt(long)]
        include_code: bool,
        #[structopt(flatten)]
        project: ProjectArgs,
    },
}

/// Parse the given arguments list or `std::env::os_args` and run the program.
pub fn run<T>(argv: Option<Vec<T>>) -> Result<()>
where
    T: Into<OsString> + Clone,
{
    if std::env::var("RUST_LOG").ok().is_none() {
        std::env::set_var("RUST_LOG", "info");
    }
    let _ = pretty_env_logger::try_init();

    let app = CinderCommands::clap();
    let matches = if let Some(argv) = argv {
        app.get_matches_from(argv)
    } else {
        app.get_matches()
    };
    let args = CinderCommands::from_clap(&matches);
    match args {
        CinderCommands::Bundle {
            output,
            global_name,
            project,
        } => {
            let mut config = project.config()?;
            if output.is_some() {
                config.output = output;
            }
            if global_name.is_some() {
                config.global_name = global_name;
            }
            bundle(&config)?;
        }
        CinderCommands::Tree {
            include_file,
            include_id,
            project,
        } => {
            let graph = build_graph(&project.config()?)?;
            let options = PrintOptions {
                include_id,
                include_file,
            };
            print!("{}", printer::tree(&graph, &options));
        }
        CinderCommands::Graph {
            include_code,
            project,
        } => {
            let graph = build_graph(&project.config()?)?;
            let value = printer::graph_json(&graph, include_code)?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }
    Ok(())
}

fn build_graph(config: &BundleConfig) -> Result<ModuleGraph> {
    let entry = config.entry()?;
    let options = config.options()?;
    let graph = crate::build_graph(entry, options.graph)
        .context(format!("Failed to build graph for {}", entry.display()))?;
    Ok(graph)
}

fn bundle(config: &BundleConfig) -> Result<()> {
    let entry = config.entry()?;
    let bundler = Bundler::new(config.options()?);
    let bundle = bundler
        .bundle(entry)
        .context(format!("Failed to bundle {}", entry.display()))?;
    match &config.output {
        Some(output) => bundle
            .write(output)
            .context(format!("Unable to write {}", output.display()))?,
        None => print!("{}", bundle.code),
    }
    Ok(())
}
