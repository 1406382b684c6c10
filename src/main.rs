use anyhow::{Context, Result};
use stagehand::cli::commands::{PlanCommand, RunCommand, ValidateCommand};
use stagehand::cli::output::*;
use stagehand::cli::{Cli, Command};
use stagehand::core::config::PipelineConfig;
use stagehand::core::TriggerContext;
use stagehand::execution::{plan_pipeline, ExecutionEngine, ExecutionEvent, ShellRunner};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    // Execute command
    match &cli.command {
        Command::Run(cmd) => run_pipeline(cmd).await?,
        Command::Validate(cmd) => validate_pipeline(cmd)?,
        Command::Plan(cmd) => plan_run(cmd)?,
    }

    Ok(())
}

async fn run_pipeline(cmd: &RunCommand) -> Result<()> {
    // Load pipeline config
    let config = PipelineConfig::from_file(&cmd.file)
        .context("Failed to load pipeline config")?;

    let mut pipeline = config.to_pipeline();
    println!(
        "{} Loaded pipeline: {} ({} stage(s), {} job(s))",
        INFO,
        style(&pipeline.name).bold(),
        style(pipeline.stages.len()).cyan(),
        style(pipeline.jobs.len()).cyan()
    );

    // Build trigger context with variable overrides
    let mut context = TriggerContext::new(cmd.git_ref.clone());
    for (key, value) in &cmd.variable {
        context.set_variable(key.clone(), value.clone());
        println!(
            "{} Variable override: {} = {}",
            INFO,
            style(key).cyan(),
            style(value).dim()
        );
    }

    // Create execution engine over the configured shell
    let runner = ShellRunner::new().with_shell(&cmd.shell);
    let engine = ExecutionEngine::new(runner, cmd.strategy.into());

    // Set up event handler for console output
    let progress = create_progress_bar(pipeline.jobs.len());
    let bar = progress.clone();
    engine
        .add_event_handler(move |event| {
            bar.println(format_execution_event(&event));
            if matches!(
                event,
                ExecutionEvent::JobSucceeded { .. }
                    | ExecutionEvent::JobFailed { .. }
                    | ExecutionEvent::JobSkipped { .. }
            ) {
                bar.inc(1);
            }
        })
        .await;

    // Execute pipeline
    println!();
    let report = engine.execute(&mut pipeline, &context).await;
    progress.finish_and_clear();

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    for artifact in report.artifacts.iter().filter(|a| !a.collected) {
        println!(
            "{} Declared artifact path not found: {} ({})",
            WARN,
            style(artifact.path.display()).yellow(),
            style(&artifact.job).dim()
        );
    }

    // Print final status
    println!(
        "\n{} {} {}",
        if report.succeeded() { CHECK } else { CROSS },
        style(&pipeline.name).bold(),
        format_status(report.status)
    );
    for job in &report.jobs {
        println!(
            "  {} {} ({})",
            format_job_state(&job.state),
            job.name,
            style(&job.stage).dim()
        );
    }

    if report.succeeded() {
        Ok(())
    } else {
        if let Some(stage) = &report.failed_stage {
            println!("  Failed stage: {}", style(stage).red());
        }
        std::process::exit(1);
    }
}

fn validate_pipeline(cmd: &ValidateCommand) -> Result<()> {
    println!("{} Validating pipeline...", INFO);

    let result = PipelineConfig::from_file(&cmd.file);

    match result {
        Ok(config) => {
            println!("{} Pipeline configuration is valid!", CHECK);
            println!(
                "  Name: {}",
                style(config.name.as_deref().unwrap_or("(unnamed)")).bold()
            );
            println!("  Stages: {}", style(config.stages.join(", ")).cyan());
            println!("  Jobs: {}", style(config.jobs.len()).cyan());

            if cmd.json {
                let json = serde_json::to_string_pretty(&config)?;
                println!("\n{}", json);
            }
            Ok(())
        }
        Err(e) => {
            println!("{} Validation failed:", CROSS);
            println!("  {}", style(e).red());
            std::process::exit(1);
        }
    }
}

fn plan_run(cmd: &PlanCommand) -> Result<()> {
    let config = PipelineConfig::from_file(&cmd.file)
        .context("Failed to load pipeline config")?;
    let pipeline = config.to_pipeline();
    let context = TriggerContext::new(cmd.git_ref.clone());

    let plans = plan_pipeline(&pipeline, &context);

    if cmd.json {
        let data = serde_json::json!({
            "pipeline": pipeline.name,
            "ref": context.git_ref,
            "stages": plans,
        });
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    println!(
        "{} Plan for {} on ref {}",
        ROCKET,
        style(&pipeline.name).bold(),
        style(&context.git_ref).cyan()
    );
    for plan in &plans {
        println!("{}", format_stage_plan(plan));
    }

    Ok(())
}
