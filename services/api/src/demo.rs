use crate::infra::{load_verified_work, seed_demo_store, DEMO_SUBMISSIONS};
use clap::Args;
use credence::config::{AppConfig, ConfigError};
use credence::credibility::{
    compute, CredibilityScore, CredibilityService, FreelancerId, PgWorkStore, ScoreSet,
    VerificationDecision, WorkHistoryId,
};
use credence::error::AppError;
use credence::telemetry;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// JSON array of verified work: delivered_on_time, quality_rating, project_complexity
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Print the score set as JSON instead of a table
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct RecalculateArgs {
    /// Work history record whose freelancer should be rescored
    #[arg(long)]
    pub(crate) work_history_id: String,
    /// Override DATABASE_URL
    #[arg(long)]
    pub(crate) database_url: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Reject the last submission of each freelancer instead of approving it
    #[arg(long)]
    pub(crate) reject_last: bool,
    /// Quality rating given with each approval (1-5)
    #[arg(long, default_value_t = 4)]
    pub(crate) rating: u8,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let work = load_verified_work(&args.input)?;
    let scores = compute(&work);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&scores)?);
    } else {
        println!("Scored {} verified work item(s)", work.len());
        render_scores(&scores);
    }
    Ok(())
}

pub(crate) async fn run_recalculate(args: RecalculateArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let url = args
        .database_url
        .or(config.database.url)
        .ok_or(ConfigError::MissingDatabaseUrl)?;
    let store = PgWorkStore::connect(&url, config.database.max_connections).await?;
    let service = CredibilityService::new(Arc::new(store));

    let score = service
        .recalculate(&WorkHistoryId(args.work_history_id))
        .await?;
    render_stored_score(&score);
    Ok(())
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let store = Arc::new(seed_demo_store()?);
    let service = CredibilityService::new(store.clone());

    println!("Credibility scoring demo");
    println!("Starting score for a freelancer with no verified work:");
    render_scores(&compute(&[]));

    let last_index = |freelancer: &str| {
        DEMO_SUBMISSIONS
            .iter()
            .rposition(|submission| submission.freelancer_id == freelancer)
    };

    println!("\nClient decisions");
    for (index, submission) in DEMO_SUBMISSIONS.iter().enumerate() {
        let decision = if args.reject_last && last_index(submission.freelancer_id) == Some(index) {
            VerificationDecision::Reject
        } else {
            VerificationDecision::Approve {
                quality_rating: args.rating,
            }
        };

        let outcome = service
            .record_decision(&WorkHistoryId::from(submission.work_history_id), decision)
            .await?;
        let score_note = match (&outcome.score, &outcome.score_error) {
            (Some(score), _) => format!("overall now {:.2}", score.overall_score()),
            (None, Some(error)) => format!("score refresh failed: {error}"),
            (None, None) => "score unchanged".to_string(),
        };
        println!(
            "- {} ({}) for {}: {}, {}",
            submission.work_history_id,
            submission.project_title,
            submission.freelancer_id,
            outcome.status,
            score_note
        );
    }

    let mut freelancers: Vec<&str> = DEMO_SUBMISSIONS
        .iter()
        .map(|submission| submission.freelancer_id)
        .collect();
    freelancers.dedup();

    println!("\nStored scores");
    for freelancer in freelancers {
        match service.score_for(&FreelancerId::from(freelancer)).await? {
            Some(score) => render_stored_score(&score),
            None => println!("{freelancer}: no verified work yet"),
        }
    }

    Ok(())
}

fn render_scores(scores: &ScoreSet) {
    println!(
        "  overall {:>6.2} ({})",
        scores.overall_score,
        scores.tier().label()
    );
    println!("  delivery {:>6.2}", scores.delivery_score);
    println!("  quality {:>6.2}", scores.quality_score);
    println!("  consistency {:>6.2}", scores.consistency_score);
    println!("  skill match {:>6.2}", scores.skill_match_score);
    println!(
        "  {} verified project(s), {} on time",
        scores.total_projects, scores.on_time_deliveries
    );
}

fn render_stored_score(score: &CredibilityScore) {
    println!(
        "{} (calculated {})",
        score.freelancer_id,
        score.last_calculated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    render_scores(&score.scores);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn demo_runs_against_the_memory_store() {
        run_demo(DemoArgs {
            reject_last: true,
            rating: 5,
        })
        .await
        .expect("demo completes");
    }

    #[tokio::test]
    async fn demo_surfaces_invalid_ratings() {
        let result = run_demo(DemoArgs {
            reject_last: false,
            rating: 9,
        })
        .await;

        assert!(matches!(result, Err(AppError::Credibility(_))));
    }
}
