//! Job spec command handlers
//!
//! Listing, creating and showing job specs.

use anyhow::{Context, Result, anyhow};
use clap::Subcommand;
use colored::*;
use specd_client::{ClientError, JobSpecResource, SpecdClient};
use specd_core::dto::job_spec::CreateJobSpec;

use crate::config::Config;
use crate::id_resolver::{fetch_all_specs, resolve_spec_id};
use crate::types::IdOrPrefix;

/// Job spec subcommands
#[derive(Subcommand)]
pub enum SpecCommands {
    /// List job specs one page at a time
    List {
        /// Page size (server default when omitted)
        #[arg(short, long)]
        size: Option<usize>,

        /// Number of specs to skip
        #[arg(short, long)]
        offset: Option<usize>,

        /// Follow next links and print every page
        #[arg(long, conflicts_with_all = ["size", "offset"])]
        all: bool,
    },
    /// Create a job spec from a JSON file
    Create {
        /// Path to the JSON document
        file: String,
    },
    /// Show a job spec and its runs
    Show {
        /// Job spec ID or unambiguous prefix
        id: String,
    },
}

pub async fn handle_spec_command(command: SpecCommands, config: &Config) -> Result<()> {
    let client = SpecdClient::new(&config.server_url);

    match command {
        SpecCommands::List { size, offset, all } => {
            if all {
                list_all_specs(&client).await
            } else {
                list_specs(&client, size, offset).await
            }
        }
        SpecCommands::Create { file } => create_spec(&client, &file).await,
        SpecCommands::Show { id } => show_spec(&client, &id).await,
    }
}

/// Print the API's messages before handing the error to anyhow
fn report(err: ClientError) -> anyhow::Error {
    if let ClientError::Api { status, messages } = &err {
        eprintln!("{}", format!("✗ Request failed ({})", status).red().bold());
        for message in messages {
            eprintln!("  - {}", message);
        }
    }
    anyhow!(err)
}

async fn list_specs(client: &SpecdClient, size: Option<usize>, offset: Option<usize>) -> Result<()> {
    let page = client.list_specs(size, offset).await.map_err(report)?;

    if page.data.is_empty() {
        println!("{}", "No job specs found.".yellow());
        return Ok(());
    }

    println!(
        "{}",
        format!(
            "Showing {} of {} job spec(s):",
            page.data.len(),
            page.meta.count
        )
        .bold()
    );
    println!();
    for spec in &page.data {
        print_spec_summary(spec);
    }

    if let Some(prev) = &page.links.prev {
        println!("  Prev: {}", prev.dimmed());
    }
    if let Some(next) = &page.links.next {
        println!("  Next: {}", next.dimmed());
    }

    Ok(())
}

async fn list_all_specs(client: &SpecdClient) -> Result<()> {
    let specs = fetch_all_specs(client).await?;

    if specs.is_empty() {
        println!("{}", "No job specs found.".yellow());
        return Ok(());
    }

    println!("{}", format!("Found {} job spec(s):", specs.len()).bold());
    println!();
    for spec in &specs {
        print_spec_summary(spec);
    }

    Ok(())
}

async fn create_spec(client: &SpecdClient, path: &str) -> Result<()> {
    let document = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read job spec file: {}", path))?;
    let candidate: CreateJobSpec = serde_json::from_str(&document)
        .with_context(|| format!("Failed to parse job spec file: {}", path))?;

    let spec = client.create_spec(&candidate).await.map_err(report)?;

    println!("{}", "✓ Job spec created successfully!".green().bold());
    println!("  ID:         {}", spec.id.to_string().cyan());
    println!("  Initiators: {}", kinds(spec.initiators.iter().map(|i| i.kind.as_str())));
    println!("  Tasks:      {}", kinds(spec.tasks.iter().map(|t| t.kind.as_str())));

    Ok(())
}

async fn show_spec(client: &SpecdClient, id: &str) -> Result<()> {
    let id_or_prefix = IdOrPrefix::parse(id);
    let uuid = resolve_spec_id(client, &id_or_prefix).await?;

    let spec = client.get_spec(uuid).await.map_err(report)?;

    print_spec_details(&spec);

    Ok(())
}

fn kinds<'a>(kinds: impl Iterator<Item = &'a str>) -> String {
    kinds.collect::<Vec<_>>().join(" → ")
}

fn print_spec_summary(spec: &JobSpecResource) {
    println!("  {} {}", "▸".cyan(), spec.id.to_string().bold());
    println!(
        "    Created: {}",
        spec.created_at
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
            .dimmed()
    );
    println!(
        "    Flow:    {} {} {}",
        kinds(spec.initiators.iter().map(|i| i.kind.as_str())).dimmed(),
        "⇒".dimmed(),
        kinds(spec.tasks.iter().map(|t| t.kind.as_str())).dimmed()
    );
    println!();
}

fn print_spec_details(spec: &JobSpecResource) {
    println!("{}", "Job Spec Details:".bold());
    println!("  ID:      {}", spec.id.to_string().cyan());
    println!("  Created: {}", spec.created_at.format("%Y-%m-%d %H:%M:%S"));
    if let Some(start_at) = spec.start_at {
        println!("  Starts:  {}", start_at.format("%Y-%m-%d %H:%M:%S"));
    }
    if let Some(end_at) = spec.end_at {
        println!("  Ends:    {}", end_at.format("%Y-%m-%d %H:%M:%S"));
    }

    println!("\n{}", "Initiators:".bold());
    for initiator in &spec.initiators {
        println!("  - {} {}", initiator.kind.cyan(), params(&initiator.params).dimmed());
    }

    println!("\n{}", "Tasks:".bold());
    for (i, task) in spec.tasks.iter().enumerate() {
        println!("  {}. {} {}", i + 1, task.kind.cyan(), params(&task.params).dimmed());
    }

    let runs = spec.runs.as_deref().unwrap_or_default();
    println!("\n{}", format!("Runs ({}):", runs.len()).bold());
    if runs.is_empty() {
        println!("  {}", "No runs yet.".dimmed());
    }
    for run in runs {
        let status = match run.status.as_str() {
            "completed" => run.status.as_str().green(),
            "errored" => run.status.as_str().red(),
            other => other.yellow(),
        };
        let finished = match run.completed_at {
            Some(at) if run.status.is_finished() => {
                format!("→ {}", at.format("%Y-%m-%d %H:%M:%S"))
            }
            _ => String::new(),
        };
        println!(
            "  {} {} {} {}",
            run.id.to_string().dimmed(),
            status,
            run.created_at.format("%Y-%m-%d %H:%M:%S"),
            finished.dimmed()
        );
    }
}

fn params(params: &serde_json::Map<String, serde_json::Value>) -> String {
    if params.is_empty() {
        String::new()
    } else {
        serde_json::Value::Object(params.clone()).to_string()
    }
}
