use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use time::Date;
use time::macros::format_description;

use tagfilter::filter::{Element, ElementType, EvalContext, FilterExpression};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Filter expression, e.g. "ways with highway and !name"
    filter: Option<String>,

    /// Filter configuration file (YAML) with named filters
    #[arg(short, long)]
    filters: Option<PathBuf>,

    /// Name of the filter to use from the configuration file
    #[arg(short, long, requires = "filters")]
    name: Option<String>,

    /// Print the compiled Overpass QL query
    #[arg(short, long)]
    query: bool,

    /// Test an element of this kind (node, way, relation) against the filter
    #[arg(short, long)]
    kind: Option<String>,

    /// Tag of the tested element, as key=value (repeatable)
    #[arg(short, long = "tag")]
    tags: Vec<String>,

    /// Last-edit date of the tested element (YYYY-MM-DD)
    #[arg(long)]
    date_edited: Option<String>,

    /// Scale factor for relative-date thresholds like "today -2 years"
    #[arg(long, env = "RESURVEY_MULTIPLIER", default_value_t = 1.0)]
    resurvey_multiplier: f64,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    let expression = load_expression(&cli)?;
    let ctx = EvalContext::with_resurvey_multiplier(cli.resurvey_multiplier);
    tracing::info!(
        "Filter selects element types: {:?}",
        expression.element_types()
    );

    if cli.query {
        println!("{}", expression.to_overpass_ql_with(&ctx));
    }

    if let Some(kind) = &cli.kind {
        let element = build_element(kind, &cli.tags, cli.date_edited.as_deref())?;
        if expression.matches_with(&element, &ctx) {
            println!("match");
        } else {
            println!("no match");
            return Ok(ExitCode::from(1));
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn load_expression(cli: &Cli) -> Result<FilterExpression> {
    if let Some(input) = &cli.filter {
        // Error offsets refer to the whitespace-normalized input
        let normalized = input.split_whitespace().collect::<Vec<_>>().join(" ");
        return tagfilter::parse(input)
            .map_err(|e| anyhow!("Invalid filter:\n{}", e.display_with_input(&normalized)));
    }
    let path = cli
        .filters
        .as_ref()
        .ok_or_else(|| anyhow!("Provide a filter expression or --filters <file>"))?;
    let config = tagfilter::config::FiltersConfig::load(path)
        .with_context(|| format!("Failed to load {}", path.display()))?;
    let name = cli
        .name
        .as_ref()
        .ok_or_else(|| anyhow!("--filters requires --name to select a filter"))?;
    config.compile_one(name)
}

fn build_element(kind: &str, tags: &[String], date_edited: Option<&str>) -> Result<Element> {
    let element_type: ElementType = kind.parse().map_err(|e: String| anyhow!(e))?;
    let mut tag_map = HashMap::with_capacity(tags.len());
    for tag in tags {
        let (key, value) = tag
            .split_once('=')
            .ok_or_else(|| anyhow!("Tag '{}' is not in key=value form", tag))?;
        tag_map.insert(key.to_string(), value.to_string());
    }
    let mut element = Element::new(element_type, tag_map);
    if let Some(date) = date_edited {
        let format = format_description!("[year]-[month]-[day]");
        let date = Date::parse(date, &format)
            .with_context(|| format!("Invalid --date-edited '{}'", date))?;
        element = element.with_date_edited(date);
    }
    Ok(element)
}
