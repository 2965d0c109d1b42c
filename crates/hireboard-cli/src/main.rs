use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use hireboard_client::{HttpRecordClient, RecordClientConfig};
use hireboard_core::models::{JobFilters, NewJob, UserRole};
use hireboard_core::{
    CandidateRoster, JobBoard, MemoryRecordClient, RecordClient, RecordId, Session,
};

#[derive(Parser)]
#[command(name = "hireboard", version, about = "Browse jobs, apply, and review candidates")]
struct Cli {
    /// Acting user id
    #[arg(long, global = true, env = "HIREBOARD_USER_ID")]
    user: Option<RecordId>,

    /// Acting user role (jobseeker, employer, admin)
    #[arg(long, global = true, env = "HIREBOARD_ROLE", default_value = "jobseeker")]
    role: UserRole,

    /// Serve records from a JSON fixture instead of the hosted backend
    #[arg(long, global = true, env = "HIREBOARD_FIXTURE")]
    fixture: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search active job listings
    Search {
        /// Substring of the job title
        #[arg(short, long)]
        keyword: Option<String>,

        /// Substring of the job location
        #[arg(short, long)]
        location: Option<String>,

        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        experience_level: Option<String>,

        #[arg(long)]
        employment_type: Option<String>,
    },

    /// Show one job with its employer and your saved state
    Job { id: RecordId },

    /// List your applications, newest first
    Applications,

    /// List applications to your jobs
    Candidates {
        /// Only show applications to this job
        #[arg(long)]
        job: Option<RecordId>,

        /// Emit CSV instead of JSON
        #[arg(long, default_value_t = false)]
        csv: bool,
    },

    /// List your saved jobs
    Saved,

    /// Save a job
    Save { job: RecordId },

    /// Remove a saved job
    Unsave { job: RecordId },

    /// Apply to a job
    Apply {
        job: RecordId,

        #[arg(short, long)]
        cover_letter: String,

        #[arg(long)]
        resume_url: Option<String>,
    },

    /// Post a new job as the acting employer
    PostJob {
        #[arg(long)]
        title: String,

        #[arg(long)]
        description: String,

        #[arg(long)]
        category: String,

        #[arg(long)]
        location: String,

        #[arg(long)]
        employment_type: String,

        #[arg(long)]
        experience_level: String,

        #[arg(long)]
        salary_min: Option<i64>,

        #[arg(long)]
        salary_max: Option<i64>,

        /// Comma-separated requirements
        #[arg(long, value_delimiter = ',')]
        requirements: Vec<String>,

        /// Comma-separated benefits
        #[arg(long, value_delimiter = ',')]
        benefits: Vec<String>,

        /// Expiry as YYYY-MM-DD or RFC 3339
        #[arg(long, value_parser = parse_expiry)]
        expires: Option<DateTime<Utc>>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("hireboard=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let session = cli.user.map(|user| Session::new(user, cli.role));

    match &cli.fixture {
        Some(path) => {
            let client = MemoryRecordClient::from_file(path)
                .with_context(|| format!("Failed to load fixture {}", path.display()))?;
            tracing::info!(fixture = %path.display(), "Using in-memory records");
            run(JobBoard::new(client), session, cli.command).await
        }
        None => {
            let config =
                RecordClientConfig::from_env().context("Record backend is not configured")?;
            let client = HttpRecordClient::new(&config).context("Failed to create HTTP client")?;
            run(JobBoard::new(client), session, cli.command).await
        }
    }
}

fn require(session: Option<Session>) -> Result<Session> {
    match session {
        Some(session) => Ok(session),
        None => bail!("--user (or HIREBOARD_USER_ID) is required for this command"),
    }
}

async fn run<C: RecordClient>(
    board: JobBoard<C>,
    session: Option<Session>,
    command: Commands,
) -> Result<()> {
    match command {
        Commands::Search {
            keyword,
            location,
            category,
            experience_level,
            employment_type,
        } => {
            let filters = JobFilters {
                keyword,
                location,
                category,
                experience_level,
                employment_type,
            };
            let listings = board.job_listings(&filters).await.context("Search failed")?;
            tracing::info!(count = listings.len(), "Found jobs");
            emit(&listings)
        }
        Commands::Job { id } => {
            let session = require(session)?;
            let detail = board
                .job_detail(&session, id)
                .await
                .with_context(|| format!("Failed to load job {id}"))?;
            emit(&detail)
        }
        Commands::Applications => {
            let session = require(session)?;
            let views = board
                .my_applications(&session)
                .await
                .context("Failed to load applications")?;
            emit(&views)
        }
        Commands::Candidates { job, csv } => {
            let session = require(session)?;
            let roster = board
                .candidate_roster(&session)
                .await
                .context("Failed to load candidates")?;
            if csv {
                write_roster_csv(&roster, job, std::io::stdout())
            } else {
                emit(&roster.for_job(job))
            }
        }
        Commands::Saved => {
            let session = require(session)?;
            let saved = board
                .saved_jobs(&session)
                .await
                .context("Failed to load saved jobs")?;
            emit(&saved)
        }
        Commands::Save { job } => {
            let session = require(session)?;
            let saved = board
                .bookmarks()
                .save(job, session.user_id)
                .await
                .with_context(|| format!("Failed to save job {job}"))?;
            emit(&saved)
        }
        Commands::Unsave { job } => {
            let session = require(session)?;
            board
                .bookmarks()
                .unsave(job, session.user_id)
                .await
                .with_context(|| format!("Failed to unsave job {job}"))?;
            tracing::info!(%job, "Removed from saved jobs");
            Ok(())
        }
        Commands::Apply {
            job,
            cover_letter,
            resume_url,
        } => {
            let session = require(session)?;
            let application = board
                .apply(&session, job, &cover_letter, resume_url)
                .await
                .with_context(|| format!("Failed to apply to job {job}"))?;
            emit(&application)
        }
        Commands::PostJob {
            title,
            description,
            category,
            location,
            employment_type,
            experience_level,
            salary_min,
            salary_max,
            requirements,
            benefits,
            expires,
        } => {
            let session = require(session)?;
            let mut job = NewJob::new(
                title,
                description,
                category,
                location,
                employment_type,
                experience_level,
            )
            .with_salary(salary_min, salary_max)
            .with_requirements(requirements)
            .with_benefits(benefits);
            if let Some(expires) = expires {
                job = job.with_expiry(expires);
            }

            let job = board
                .post_job(&session, job)
                .await
                .context("Failed to post job")?;
            emit(&job)
        }
    }
}

fn emit<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[derive(Serialize)]
struct RosterRow<'a> {
    application_id: i64,
    job_id: i64,
    job_title: &'a str,
    candidate: &'a str,
    skills: String,
    status: &'static str,
    applied_at: String,
}

fn write_roster_csv<W: std::io::Write>(
    roster: &CandidateRoster,
    job: Option<RecordId>,
    out: W,
) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for entry in roster.for_job(job) {
        writer.serialize(RosterRow {
            application_id: entry.application.id.get(),
            job_id: entry.application.job.get(),
            job_title: entry.job.as_ref().map_or("", |j| j.title.as_str()),
            candidate: entry.candidate.as_ref().map_or("", |c| c.full_name.as_str()),
            skills: entry
                .candidate
                .as_ref()
                .map(|c| c.skills.join("; "))
                .unwrap_or_default(),
            status: entry.application.status.as_str(),
            applied_at: entry
                .application
                .applied_at
                .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default(),
        })?;
    }
    writer.flush()?;
    Ok(())
}

fn parse_expiry(raw: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| format!("'{raw}' is not a date (YYYY-MM-DD) or RFC 3339 timestamp"))
}
