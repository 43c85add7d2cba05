use crate::prelude::*;
use clap::Parser;

mod completion;
mod config;
mod error;
mod github;
mod pipeline;
mod prelude;
mod writer;

#[cfg(test)]
mod test_support;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Generate a Dockerfile for a GitHub repository with an LLM"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Fail at startup when GITHUB_TOKEN is not set
    #[clap(
        long,
        env = "DOCKGEN_REQUIRE_GITHUB_TOKEN",
        global = true,
        default_value = "false"
    )]
    require_github_token: bool,

    /// Whether to display additional information.
    #[clap(long, env = "DOCKGEN_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Fetch a repository, generate a Dockerfile and write it to disk
    Generate(crate::pipeline::GenerateOptions),

    /// Print the prompt that would be sent to the model
    Prompt(crate::pipeline::RepoOptions),
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();

    match app.command {
        SubCommands::Generate(options) => crate::pipeline::run_generate(options, app.global).await,
        SubCommands::Prompt(options) => crate::pipeline::run_prompt(options, app.global).await,
    }
    .map_err(|err: Error| {
        log::error!("dockgen failed during the {} stage", err.kind());
        eyre!(err)
    })
}
