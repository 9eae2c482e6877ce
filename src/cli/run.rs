use crate::cli::RunArgs;
use crate::config::Config;
use crate::error::{ValidationError, WriteaidError};
use crate::pipeline::budget::{self, BudgetPlan, TruncationNotice};
use crate::pipeline::progress::{self, ProgressEvent, ProgressSender};
use crate::pipeline::{
    ParallelDispatchPipeline, RoundReport, RunReport, SequentialRevisionPipeline,
};
use crate::remote::{RemoteTaskClient, Revisor};
use crate::report;
use crate::request::{Dispatch, RevisionRequest};
use crate::segment::segment;
use chrono::Local;
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

pub async fn execute(args: RunArgs) -> Result<(), WriteaidError> {
    let mut config = Config::load_or_default(&args.config)?;
    if let Some(dir) = &args.report_dir {
        config.report_dir = dir.clone();
    }
    if args.budget_sec.is_some() {
        config.budget.ceiling_sec = args.budget_sec;
    }
    config.validate()?;

    let request = load_request(&args)?;
    let validated = request.validate(args.dispatch)?;
    let personas = validated.personas(&config.personas);

    let request_id = Uuid::new_v4().to_string();
    info!("Request {} accepted ({} dispatch)", request_id, args.dispatch);

    let (events, mut rx) = progress::channel();
    let collector = tokio::spawn(async move {
        let mut log = Vec::new();
        while let Some(event) = rx.recv().await {
            info!("{}", event);
            log.push(event.to_string());
        }
        log
    });

    let client = RemoteTaskClient::new(&config, events.clone())?;
    let revisor: Arc<dyn Revisor> = Arc::new(client);

    let started = std::time::Instant::now();
    let deadline = Instant::now() + Duration::from_secs(effective_deadline_sec(&config));
    progress::emit(
        &events,
        ProgressEvent::RunStarted {
            request_id: request_id.clone(),
            total_sentences: segment(&validated.paragraph).len(),
        },
    );

    let (rounds, truncation) = run_pipelines(
        args.dispatch,
        &config,
        &validated,
        &personas,
        revisor,
        events.clone(),
        deadline,
    )
    .await?;

    let final_paragraph = rounds
        .last()
        .map(|r| r.paragraph.clone())
        .unwrap_or_else(|| validated.paragraph.clone());

    let run_report = RunReport {
        request_id: request_id.clone(),
        original_paragraph: validated.paragraph.clone(),
        final_paragraph,
        rounds,
        truncation,
        duration_sec: started.elapsed().as_secs_f64(),
    };

    // Dropping the last sender lets the collector drain and finish.
    drop(events);
    let progress_log = collector.await.map_err(crate::error::PipelineError::Join)?;

    let response = report::build_response(&run_report, progress_log);
    let dated_dir = config
        .report_dir
        .join(Local::now().format("%Y-%m-%d").to_string());
    report::write_reports(&dated_dir, &response)?;
    info!("Reports written to {}", dated_dir.display());

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&response).map_err(crate::error::OutputError::Serialize)?
        );
    } else {
        print_summary(&response);
    }

    Ok(())
}

/// The budget ceiling is a promise to the caller about total duration, so
/// the hard deadline must not outlive it.
fn effective_deadline_sec(config: &Config) -> u64 {
    match config.budget.ceiling_sec {
        Some(ceiling) => ceiling.min(config.deadline_sec),
        None => config.deadline_sec,
    }
}

/// Route the request through the dispatch mode and, for sequential runs,
/// the budget guard. Returns round reports plus any truncation notice.
async fn run_pipelines(
    dispatch: Dispatch,
    config: &Config,
    validated: &crate::request::ValidatedRequest,
    personas: &crate::config::PersonaConfig,
    revisor: Arc<dyn Revisor>,
    events: ProgressSender,
    deadline: Instant,
) -> Result<(Vec<RoundReport>, Option<TruncationNotice>), WriteaidError> {
    let worker_cap = validated.worker_cap.unwrap_or(config.worker_cap);
    let launch_delay = Duration::from_millis(config.launch_delay_ms);

    if dispatch == Dispatch::Parallel {
        let rounds = run_parallel(
            &validated.paragraph,
            &personas.initial,
            revisor,
            events,
            worker_cap,
            config,
            launch_delay,
            deadline,
        )
        .await?;
        return Ok((rounds, None));
    }

    let sentences = segment(&validated.paragraph);
    let ceiling = config.budget.ceiling_sec.map(Duration::from_secs);
    let cost = Duration::from_secs(config.budget.sentence_cost_sec);
    let plan = budget::plan(sentences.len(), ceiling, cost, config.budget.overflow);

    match plan {
        BudgetPlan::Parallel => {
            // Guard-chosen parallel dispatch obeys the same rule as
            // requested parallel dispatch: no reprocessing rounds.
            if validated.rounds > 0 {
                return Err(ValidationError::RoundsWithParallelOverflow.into());
            }
            info!(
                "Projected sequential time exceeds the {}s budget; switching to parallel dispatch",
                config.budget.ceiling_sec.unwrap_or(0)
            );
            let rounds = run_parallel(
                &validated.paragraph,
                &personas.initial,
                revisor,
                events,
                worker_cap,
                config,
                launch_delay,
                deadline,
            )
            .await?;
            Ok((rounds, None))
        }
        BudgetPlan::Sequential { truncate_to: None } => {
            let pipeline = SequentialRevisionPipeline::new(revisor, events);
            let rounds = pipeline
                .run(
                    &validated.paragraph,
                    validated.direction,
                    validated.rounds,
                    personas,
                    deadline,
                )
                .await;
            Ok((rounds, None))
        }
        BudgetPlan::Sequential {
            truncate_to: Some(kept),
        } => {
            let dropped = sentences.len() - kept;
            warn!(
                "Budget allows {} of {} sentences; dropping the last {}",
                kept,
                sentences.len(),
                dropped
            );
            progress::emit(&events, ProgressEvent::Truncated { kept, dropped });

            let prefix = sentences[..kept].join(" ");
            let tail = sentences[kept..].join(" ");

            let pipeline = SequentialRevisionPipeline::new(revisor, events);
            let mut rounds = pipeline
                .run(&prefix, validated.direction, validated.rounds, personas, deadline)
                .await;

            budget::reattach_tail(&mut rounds, &tail);

            Ok((rounds, Some(TruncationNotice { kept, dropped })))
        }
    }
}

/// One parallel pass presented as a single round report.
#[allow(clippy::too_many_arguments)]
async fn run_parallel(
    paragraph: &str,
    persona: &str,
    revisor: Arc<dyn Revisor>,
    events: ProgressSender,
    worker_cap: usize,
    config: &Config,
    launch_delay: Duration,
    deadline: Instant,
) -> Result<Vec<RoundReport>, WriteaidError> {
    let pipeline = ParallelDispatchPipeline::new(
        revisor,
        events,
        worker_cap,
        config.service.concurrency_limit,
        launch_delay,
    );
    let outcomes = pipeline.run(paragraph, persona, deadline).await?;
    Ok(vec![RoundReport {
        round: 0,
        outcomes,
        // Parallel workers never mutate the shared paragraph.
        paragraph: paragraph.to_string(),
    }])
}

fn load_request(args: &RunArgs) -> Result<RevisionRequest, WriteaidError> {
    let mut request = match &args.request_file {
        Some(path) => {
            let raw = fs::read_to_string(path).map_err(|source| {
                crate::error::ConfigError::ReadFile {
                    path: path.clone(),
                    source,
                }
            })?;
            serde_json::from_str::<RevisionRequest>(&raw)
                .map_err(|e| crate::error::ValidationError::MalformedRequest(e.to_string()))?
        }
        None => RevisionRequest::default(),
    };

    if let Some(paragraph) = &args.paragraph {
        request.paragraph = paragraph.clone();
    }
    if args.direction.is_some() {
        request.direction = args.direction.clone();
    }
    if args.rounds.is_some() {
        request.rounds = args.rounds;
    }
    if args.initial_persona.is_some() {
        request.initial_persona = args.initial_persona.clone();
    }
    if args.reprocessing_persona.is_some() {
        request.reprocessing_persona = args.reprocessing_persona.clone();
    }
    if args.worker_cap.is_some() {
        request.worker_cap = args.worker_cap;
    }

    Ok(request)
}

fn print_summary(response: &report::ResponseDocument) {
    println!("Request {}", response.request_id);
    println!(
        "Sentences: {} total, {} revised or confirmed, {} failed",
        response.total_sentences, response.successful_analyses, response.failed_analyses
    );
    if let Some(t) = &response.truncation {
        println!(
            "Truncated to fit budget: {} kept, {} dropped",
            t.kept, t.dropped
        );
    }
    println!(
        "Success rate: {:.1}% in {:.1}s",
        response.summary.processing_success_rate, response.elapsed_sec
    );
    println!();
    println!("Final paragraph:");
    println!("{}", response.final_paragraph);
}
