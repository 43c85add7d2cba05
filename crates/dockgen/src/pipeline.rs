use crate::completion::CompletionClient;
use crate::config::{env_var, ApiFlavor, CompletionConfig, GitHubConfig};
use crate::github::GitHubClient;
use crate::prelude::{eprintln, println, *};
use crate::writer::{write_artifact, DEFAULT_OUTPUT};
use colored::Colorize;
use dockgen_core::dockerfile::{check_plausible, strip_code_fences};
use dockgen_core::prompt::{build_prompt, PromptStyle};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use std::path::PathBuf;

/// Repository used when none is given on the command line.
pub const DEFAULT_REPO_URL: &str = "https://github.com/heroku/node-js-getting-started";

#[derive(Debug, Clone, clap::Args)]
pub struct RepoOptions {
    /// GitHub repository URL (e.g., "https://github.com/owner/repo" or "owner/repo")
    #[clap(env = "DOCKGEN_REPO", default_value = DEFAULT_REPO_URL)]
    pub repo: String,

    /// Git ref the README is read from (default: HEAD)
    #[arg(long = "ref", value_name = "REF")]
    pub git_ref: Option<String>,

    /// README path relative to the repository root (default: README.md)
    #[arg(long)]
    pub readme_path: Option<String>,

    /// Ask for a Dockerfile without comments or surrounding prose
    #[arg(long)]
    pub no_comments: bool,
}

impl RepoOptions {
    fn style(&self) -> PromptStyle {
        if self.no_comments {
            PromptStyle::NoComments
        } else {
            PromptStyle::Standard
        }
    }
}

#[derive(Debug, Clone, clap::Args)]
pub struct GenerateOptions {
    #[clap(flatten)]
    pub repo: RepoOptions,

    /// Where to write the generated Dockerfile
    #[arg(short, long, env = "DOCKGEN_OUTPUT", default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Model name (defaults depend on --api)
    #[arg(short, long, env = "DOCKGEN_MODEL")]
    pub model: Option<String>,

    /// Completion endpoint flavour
    #[arg(long, value_enum, default_value_t = ApiFlavor::Chat)]
    pub api: ApiFlavor,

    /// Maximum number of tokens to generate
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Sampling temperature
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Remove a surrounding Markdown code fence from the model output
    #[arg(long)]
    pub strip_fences: bool,

    /// Refuse to write output that does not start with FROM or ARG
    #[arg(long)]
    pub strict: bool,
}

/// Parameters of one generation run
#[derive(Debug, Clone)]
pub struct GenerateParams {
    pub repo_url: String,
    pub output: PathBuf,
    pub style: PromptStyle,
    pub strip_fences: bool,
    pub strict: bool,
}

/// Helper to set spinner message if spinner is present
fn set_spinner_msg(spinner: Option<&ProgressBar>, msg: impl Into<String>) {
    if let Some(s) = spinner {
        s.set_message(msg.into());
    }
}

/// Spinner on stderr, only when stderr is a terminal
fn new_spinner() -> Option<ProgressBar> {
    if !std::io::stderr().is_terminal() {
        return None;
    }

    let style = ProgressStyle::default_spinner()
        .template("{spinner:.cyan} {msg}")
        .ok()?;
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(style);
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));
    Some(spinner)
}

/// Fetch the repository and build the completion prompt
pub async fn prompt_data(
    github: &GitHubClient,
    repo_url: &str,
    style: PromptStyle,
    spinner: Option<&ProgressBar>,
) -> Result<String, Error> {
    set_spinner_msg(spinner, f!("Fetching {}...", repo_url));
    let fetched = github.fetch(repo_url).await?;

    log::info!(
        "Fetched {} with {} top-level files",
        fetched.metadata.html_url,
        fetched.files.len()
    );

    Ok(build_prompt(&fetched.metadata, &fetched.files, style))
}

/// Run the whole pipeline: fetch, build the prompt, generate, write.
///
/// Returns the artifact that was written. Nothing is written when any stage
/// fails.
pub async fn generate_data(
    github: &GitHubClient,
    completion: &CompletionClient,
    params: &GenerateParams,
    spinner: Option<&ProgressBar>,
) -> Result<String, Error> {
    let prompt = prompt_data(github, &params.repo_url, params.style, spinner).await?;
    log::debug!("Prompt length: {} chars", prompt.len());

    set_spinner_msg(
        spinner,
        f!("Generating Dockerfile with {}...", completion.model()),
    );
    let mut artifact = completion.generate(&prompt).await?;

    if params.strip_fences {
        artifact = strip_code_fences(&artifact);
        if artifact.is_empty() {
            return Err(Error::Generation(
                "completion text was empty after removing code fences".to_string(),
            ));
        }
    }

    if let Err(reason) = check_plausible(&artifact) {
        if params.strict {
            return Err(Error::Generation(reason));
        }
        log::warn!("Generated output may not be a Dockerfile: {}", reason);
    }

    set_spinner_msg(spinner, f!("Writing {}...", params.output.display()));
    write_artifact(&params.output, &artifact).await?;

    Ok(artifact)
}

/// Handle the generate command
pub async fn run_generate(options: GenerateOptions, global: crate::Global) -> Result<(), Error> {
    run_generate_with(options, global, env_var).await
}

/// Handle the generate command with configuration read through `lookup`
pub async fn run_generate_with(
    options: GenerateOptions,
    global: crate::Global,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(), Error> {
    // Credentials are checked before any request is made
    let github_config = GitHubConfig::from_lookup(global.require_github_token, &lookup)?
        .with_overrides(options.repo.git_ref.clone(), options.repo.readme_path.clone());
    let completion_config = CompletionConfig::from_lookup(&lookup)?.with_overrides(
        options.api,
        options.model.clone(),
        options.max_tokens,
        options.temperature,
    );

    let github = GitHubClient::new(github_config)?;
    let completion = CompletionClient::new(completion_config)?;

    let params = GenerateParams {
        repo_url: options.repo.repo.clone(),
        output: options.output.clone(),
        style: options.repo.style(),
        strip_fences: options.strip_fences,
        strict: options.strict,
    };

    if global.verbose {
        eprintln!("Repository: {}", params.repo_url);
        eprintln!("Model: {}", completion.model());
        eprintln!("Output: {}", params.output.display());
    }

    let spinner = new_spinner();
    let result = generate_data(&github, &completion, &params, spinner.as_ref()).await;
    if let Some(s) = &spinner {
        s.finish_and_clear();
    }
    let artifact = result?;

    eprintln!(
        "{} {} ({} lines)",
        "Wrote".green().bold(),
        params.output.display().to_string().bright_white(),
        artifact.lines().count()
    );

    Ok(())
}

/// Handle the prompt command: print the prompt that generate would send
pub async fn run_prompt(options: RepoOptions, global: crate::Global) -> Result<(), Error> {
    let github_config = GitHubConfig::from_env(global.require_github_token)?
        .with_overrides(options.git_ref.clone(), options.readme_path.clone());
    let github = GitHubClient::new(github_config)?;

    if global.verbose {
        eprintln!("Repository: {}", options.repo);
    }

    let spinner = new_spinner();
    let result = prompt_data(&github, &options.repo, options.style(), spinner.as_ref()).await;
    if let Some(s) = &spinner {
        s.finish_and_clear();
    }

    println!("{}", result?);
    Ok(())
}
