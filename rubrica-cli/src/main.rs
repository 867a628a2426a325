use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

use rubrica::report;
use rubrica::{area_from_path, default_output_path};
use rubrica_core::scoring::{score_assessment, AssessmentResponses};
use rubrica_core::{MaturityLevel, ParsingConfig, ProcessedArea, RubricProcessor};

#[derive(Parser)]
#[command(name = "rubrica")]
#[command(about = "Parse markdown transformation rubrics into validated objective/action/section trees")]
struct Args {
    /// Path to the rubric markdown document
    #[arg(short, long)]
    input: Option<String>,

    /// Área identifier (defaults to the input file stem)
    #[arg(short, long)]
    area: Option<String>,

    /// Path to custom config file (YAML format)
    #[arg(short, long)]
    config: Option<String>,

    /// Output format: tree, flat, or profile
    #[arg(short = 'f', long, default_value = "tree")]
    output_format: String,

    /// Output file path (if not specified, auto-generated based on input)
    #[arg(short, long)]
    output: Option<String>,

    /// Validate the document and print a summary without writing output
    #[arg(long)]
    check: bool,

    /// Show the configured áreas and exit
    #[arg(long)]
    show_areas: bool,

    /// Assessment responses (JSON) to score against the parsed rubric
    #[arg(long)]
    responses: Option<String>,

    /// Target maturity level used for gap analysis
    #[arg(long, default_value = "consolidado")]
    target: MaturityLevel,

    /// Dump every pipeline stage (tree, flat, profile) to a directory
    #[arg(long)]
    dump_stages: bool,

    /// Directory for stage dump output
    #[arg(long, default_value = "test_outputs/stages")]
    stages_dir: String,

    /// Enable detailed profiling of all pipeline steps
    #[arg(long)]
    profile: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Quick reference written next to the stage dumps
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StageSummary<'a> {
    input: &'a str,
    area: &'a str,
    captured_at: String,
    schema_version: &'a str,
    source_hash: &'a str,
    stage_counts: BTreeMap<&'static str, usize>,
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(&args) {
        eprintln!("❌ {e:#}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn run(args: &Args) -> Result<()> {
    println!("🦀 Rubrica Rubric Parser");

    let config = ParsingConfig::load_with_fallback(args.config.as_deref());
    if let Some(config_path) = &args.config {
        println!("📋 Loaded config from: {}", config_path);
    } else {
        println!("📋 Using default config");
    }

    if args.show_areas {
        report::print_areas(&config);
        return Ok(());
    }

    let input = args
        .input
        .as_deref()
        .context("no input document given (use -i <file.md>)")?;
    if !Path::new(input).exists() {
        anyhow::bail!("input document not found at: {input}");
    }

    let area = match &args.area {
        Some(area) => area.clone(),
        None => area_from_path(input).context("cannot infer área from input path, use -a")?,
    };

    let processor = RubricProcessor::new(&config)?;
    println!("📄 Processing: {} (área '{}')", input, area);
    let processed = processor.process_file(Path::new(input), &area, args.profile)?;

    println!("✅ Successfully parsed rubric");
    report::print_summary(&processed);
    if let Some(timings) = &processed.timings {
        report::print_timings(timings);
    }

    if let Some(responses_path) = &args.responses {
        let responses = AssessmentResponses::load_from_file(responses_path)?;
        let score = score_assessment(&processed.parsed, &responses, args.target)?;
        report::print_score(&score);
    }

    if args.check {
        println!("\n✅ Document is valid");
        return Ok(());
    }

    if args.dump_stages {
        println!("\n🔬 Pipeline stage dump mode");
        save_stages(&processed, input, &args.stages_dir)?;
        println!("\n✅ All stages dumped to: {}", args.stages_dir);
        return Ok(());
    }

    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(input, &args.output_format));
    save_output(&processed, &output_path, &args.output_format)
}

fn save_stages(processed: &ProcessedArea, input: &str, output_dir: &str) -> Result<()> {
    use std::fs;
    fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create stage directory {output_dir}"))?;

    for (file, format) in [("tree.json", "tree"), ("flat.json", "flat"), ("profile.json", "profile")] {
        let path = format!("{}/{}", output_dir, file);
        processed.save_with_format(&path, format)?;
        println!("  💾 {}", path);
    }

    // Summary file: quick reference for validation scripts
    let summary = StageSummary {
        input,
        area: &processed.parsed.area,
        captured_at: chrono::Utc::now().to_rfc3339(),
        schema_version: &processed.profile.schema_version,
        source_hash: &processed.profile.source_hash,
        stage_counts: BTreeMap::from([
            ("objectives", processed.parsed.objectives.len()),
            ("actions", processed.parsed.action_count()),
            ("sections", processed.parsed.total_sections),
            ("flattened", processed.flattened.len()),
        ]),
    };
    let summary_path = format!("{}/summary.json", output_dir);
    fs::write(&summary_path, serde_json::to_string_pretty(&summary)?)?;
    println!("  💾 {}", summary_path);

    Ok(())
}

fn save_output(processed: &ProcessedArea, output_path: &str, format: &str) -> Result<()> {
    processed.save_with_format(output_path, format)?;

    match format {
        "flat" => println!("💾 Flat format results saved to: {}", output_path),
        "profile" => println!("💾 Profile results saved to: {}", output_path),
        "tree" => println!("💾 Tree format results saved to: {}", output_path),
        _ => {
            println!("⚠️  Unknown output format '{}', using default tree format", format);
            println!("💾 Tree format results saved to: {}", output_path);
        }
    }

    Ok(())
}
