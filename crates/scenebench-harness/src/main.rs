//! `scenebench` command-line entry point

use anyhow::{bail, Context};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use scenebench_generator::ComplexityTier;
use scenebench_harness::pipeline::{default_renders_dir, evaluate_dataset, generate_datasets};
use scenebench_harness::{logging, EvaluationRunner, HarnessConfig, OracleEditor, ReplayEditor, TierCounts};
use scenebench_metrics::{SemanticScorer, StructuralScorer};
use std::path::{Path, PathBuf};

fn cli() -> Command {
    Command::new("scenebench")
        .version(scenebench_harness::VERSION)
        .about("Procedural evaluation harness for agentic 3D scene editors")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("YAML or JSON configuration file"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Enable debug logging"),
        )
        .arg(
            Arg::new("json-logs")
                .long("json-logs")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines"),
        )
        .subcommand(
            Command::new("generate")
                .about("Generate test datasets")
                .arg(
                    Arg::new("complexity")
                        .long("complexity")
                        .default_value("all")
                        .value_parser(["simple", "medium", "complex", "all"])
                        .help("Complexity tier to generate"),
                )
                .arg(
                    Arg::new("num-cases")
                        .long("num-cases")
                        .value_parser(value_parser!(usize))
                        .help("Test cases per tier (overrides config)"),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .value_parser(value_parser!(u64))
                        .help("Random seed for reproducibility"),
                )
                .arg(
                    Arg::new("prompt-variations")
                        .long("prompt-variations")
                        .value_parser(value_parser!(usize))
                        .help("Prompt paraphrases per case"),
                )
                .arg(
                    Arg::new("output-dir")
                        .long("output-dir")
                        .value_parser(value_parser!(PathBuf))
                        .help("Directory receiving one sub-directory per tier"),
                )
                .arg(
                    Arg::new("save-scene-files")
                        .long("save-scene-files")
                        .action(ArgAction::SetTrue)
                        .help("Also write initial/target scene files per case"),
                ),
        )
        .subcommand(
            Command::new("evaluate")
                .about("Evaluate a scene editor against a dataset")
                .arg(
                    Arg::new("dataset")
                        .long("dataset")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Dataset JSON file"),
                )
                .arg(
                    Arg::new("responses")
                        .long("responses")
                        .value_parser(value_parser!(PathBuf))
                        .conflicts_with("oracle")
                        .required_unless_present("oracle")
                        .help("Directory of recorded responses (<case_id>.usda)"),
                )
                .arg(
                    Arg::new("oracle")
                        .long("oracle")
                        .action(ArgAction::SetTrue)
                        .help("Answer with the ground truth to self-check the harness"),
                )
                .arg(
                    Arg::new("limit")
                        .long("limit")
                        .value_parser(value_parser!(usize))
                        .help("Evaluate only the first N cases"),
                )
                .arg(
                    Arg::new("output-dir")
                        .long("output-dir")
                        .value_parser(value_parser!(PathBuf))
                        .help("Directory for the JSON and Markdown reports"),
                )
                .arg(
                    Arg::new("sequential")
                        .long("sequential")
                        .action(ArgAction::SetTrue)
                        .help("Evaluate cases one at a time"),
                ),
        )
        .subcommand(
            Command::new("score")
                .about("Score one generated scene against a ground truth scene")
                .arg(
                    Arg::new("ground-truth")
                        .long("ground-truth")
                        .required(true)
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("generated")
                        .long("generated")
                        .required(true)
                        .value_parser(value_parser!(PathBuf)),
                ),
        )
        .subcommand(
            Command::new("validate")
                .about("Strictly check the syntax of a scene file")
                .arg(
                    Arg::new("file")
                        .required(true)
                        .value_parser(value_parser!(PathBuf)),
                ),
        )
}

fn main() {
    let matches = cli().get_matches();
    logging::init(matches.get_flag("verbose"), matches.get_flag("json-logs"));

    match run(&matches) {
        Ok(passed) => std::process::exit(if passed { 0 } else { 1 }),
        Err(err) => {
            tracing::error!("{err:#}");
            eprintln!("error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn run(matches: &ArgMatches) -> anyhow::Result<bool> {
    let config = match matches.get_one::<PathBuf>("config") {
        Some(path) => HarnessConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => HarnessConfig::default(),
    };

    match matches.subcommand() {
        Some(("generate", args)) => generate(config, args),
        Some(("evaluate", args)) => evaluate(config, args),
        Some(("score", args)) => score(&config, args),
        Some(("validate", args)) => validate(args),
        _ => bail!("no subcommand given"),
    }
}

fn generate(config: HarnessConfig, args: &ArgMatches) -> anyhow::Result<bool> {
    let mut generation = config.generation;
    if let Some(&seed) = args.get_one::<u64>("seed") {
        generation = generation.with_seed(seed);
    }
    if let Some(&k) = args.get_one::<usize>("prompt-variations") {
        generation = generation.with_prompt_variations(k);
    }
    if let Some(&n) = args.get_one::<usize>("num-cases") {
        generation = generation.with_num_cases(TierCounts::uniform(n));
    }
    if let Some(dir) = args.get_one::<PathBuf>("output-dir") {
        generation = generation.with_output_dir(dir);
    }
    if args.get_flag("save-scene-files") {
        generation = generation.with_save_scene_files(true);
    }

    let tiers = match args.get_one::<String>("complexity").map(String::as_str) {
        Some("all") | None => generation.complexities.clone(),
        Some(name) => vec![name.parse::<ComplexityTier>()?],
    };

    let written = generate_datasets(&generation, &tiers).context("generating datasets")?;
    for dataset in &written {
        println!(
            "{}: {} test cases -> {}",
            dataset.complexity,
            dataset.num_test_cases,
            dataset.path.display()
        );
        if let Some(dir) = &dataset.scene_files {
            println!("  scene files -> {}", dir.display());
        }
    }
    Ok(true)
}

fn evaluate(config: HarnessConfig, args: &ArgMatches) -> anyhow::Result<bool> {
    let dataset_path = args
        .get_one::<PathBuf>("dataset")
        .context("--dataset is required")?;

    let mut evaluation = config.evaluation;
    if let Some(dir) = args.get_one::<PathBuf>("output-dir") {
        evaluation = evaluation.with_output_dir(dir);
    }
    if let Some(&limit) = args.get_one::<usize>("limit") {
        evaluation = evaluation.with_limit(Some(limit));
    }
    if args.get_flag("sequential") {
        evaluation = evaluation.with_parallel(false);
    }
    if evaluation.renders_dir.is_none() {
        let dir = default_renders_dir(&evaluation.output_dir, dataset_path);
        evaluation = evaluation.with_renders_dir(dir);
    }
    let output_dir = evaluation.output_dir.clone();

    let runner = match args.get_one::<PathBuf>("responses") {
        Some(dir) => EvaluationRunner::with_config(ReplayEditor::new(dir), evaluation),
        None => EvaluationRunner::with_config(OracleEditor, evaluation),
    };

    let report = evaluate_dataset(dataset_path, &runner)
        .with_context(|| format!("evaluating {}", dataset_path.display()))?;
    let paths = report.write(&output_dir).context("writing report")?;

    let aggregate = &report.aggregate_metrics;
    println!(
        "Success rate: {:.1}% ({}/{})",
        aggregate.success_rate * 100.0,
        aggregate.successful_cases,
        aggregate.total_cases
    );
    println!(
        "Structural similarity: {:.3} mean",
        aggregate.structural_similarity.mean
    );
    println!(
        "Semantic accuracy: {:.1}%",
        aggregate.semantic_correctness.accuracy * 100.0
    );
    println!("Report: {}", paths.json.display());
    println!("Summary: {}", paths.markdown.display());
    Ok(true)
}

fn score(config: &HarnessConfig, args: &ArgMatches) -> anyhow::Result<bool> {
    let ground_truth = read_scene(args, "ground-truth")?;
    let generated = read_scene(args, "generated")?;

    let structural = StructuralScorer::new()
        .with_position_threshold(config.evaluation.position_threshold)
        .with_color_threshold(config.evaluation.color_threshold)
        .compute_all_metrics(&ground_truth, &generated);
    let hallucinations = SemanticScorer::new().check_no_hallucinations(
        &scenebench_scene::decode(&ground_truth),
        &scenebench_scene::decode(&generated),
    );

    let output = serde_json::json!({
        "structural_metrics": structural,
        "hallucination_check": hallucinations,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(true)
}

fn validate(args: &ArgMatches) -> anyhow::Result<bool> {
    let path = args.get_one::<PathBuf>("file").context("file is required")?;
    let text = read_file(path)?;
    match scenebench_scene::validate_syntax(&text) {
        Ok(()) => {
            println!("{}: valid", path.display());
            Ok(true)
        }
        Err(err) => {
            println!("{}: {err}", path.display());
            Ok(false)
        }
    }
}

fn read_scene(args: &ArgMatches, name: &str) -> anyhow::Result<String> {
    let path = args
        .get_one::<PathBuf>(name)
        .with_context(|| format!("--{name} is required"))?;
    read_file(path)
}

fn read_file(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}
