//! View-ready composites joined client-side from several repositories.
//!
//! Primary loads propagate their errors. Secondary lookups (employer,
//! candidate, saved state) degrade to `None` or a sentinel with a warning so
//! one bad item never aborts its siblings. Per-item enrichment runs
//! concurrently through `join_all`, which yields results in input order.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;

use crate::error::AppError;
use crate::fields::require_text;
use crate::id::RecordId;
use crate::models::{
    Application, Employer, Job, JobFilters, JobSeeker, NewApplication, NewJob, SavedJob, UserRole,
};
use crate::repository::{
    ApplicationRepository, EmployerRepository, JobRepository, JobSeekerRepository,
    SavedJobRepository, UserRepository,
};
use crate::session::Session;
use crate::traits::RecordClient;

/// Display name used when a job's employer cannot be resolved.
pub const UNKNOWN_COMPANY: &str = "Unknown Company";

/// A search hit with its employer's display name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobListing {
    pub job: Job,
    pub company_name: String,
    pub employer: Option<Employer>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobDetail {
    pub job: Job,
    pub employer: Option<Employer>,
    /// Whether the viewing user has bookmarked this job.
    pub saved: bool,
}

/// One of the candidate's own applications.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplicationView {
    pub application: Application,
    pub job: Option<Job>,
    pub employer: Option<Employer>,
    pub company_name: String,
}

/// An application received by the employer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RosterEntry {
    pub application: Application,
    pub job: Option<Job>,
    pub candidate: Option<JobSeeker>,
}

/// Every application to an employer's jobs, newest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CandidateRoster {
    pub jobs: Vec<Job>,
    pub entries: Vec<RosterEntry>,
}

impl CandidateRoster {
    /// Narrow the loaded roster to one job. `None` keeps every entry.
    pub fn for_job(&self, job: Option<RecordId>) -> Vec<&RosterEntry> {
        self.entries
            .iter()
            .filter(|entry| job.is_none_or(|id| entry.application.job == id))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavedJobView {
    pub saved: SavedJob,
    pub job: Job,
    pub employer: Option<Employer>,
    pub company_name: String,
}

/// Aggregation over all entity repositories sharing one record client.
#[derive(Debug, Clone)]
pub struct JobBoard<C> {
    jobs: JobRepository<C>,
    employers: EmployerRepository<C>,
    job_seekers: JobSeekerRepository<C>,
    applications: ApplicationRepository<C>,
    saved_jobs: SavedJobRepository<C>,
    users: UserRepository<C>,
}

impl<C: RecordClient> JobBoard<C> {
    pub fn new(client: C) -> Self {
        Self {
            jobs: JobRepository::new(client.clone()),
            employers: EmployerRepository::new(client.clone()),
            job_seekers: JobSeekerRepository::new(client.clone()),
            applications: ApplicationRepository::new(client.clone()),
            saved_jobs: SavedJobRepository::new(client.clone()),
            users: UserRepository::new(client),
        }
    }

    pub fn jobs(&self) -> &JobRepository<C> {
        &self.jobs
    }

    pub fn employers(&self) -> &EmployerRepository<C> {
        &self.employers
    }

    pub fn job_seekers(&self) -> &JobSeekerRepository<C> {
        &self.job_seekers
    }

    pub fn applications(&self) -> &ApplicationRepository<C> {
        &self.applications
    }

    /// The saved-job repository.
    pub fn bookmarks(&self) -> &SavedJobRepository<C> {
        &self.saved_jobs
    }

    pub fn users(&self) -> &UserRepository<C> {
        &self.users
    }

    // -- Reads --

    /// Active jobs matching `filters`, each with its employer's name.
    pub async fn job_listings(&self, filters: &JobFilters) -> Result<Vec<JobListing>, AppError> {
        let jobs = self.jobs.search(filters).await?;
        let employers = self
            .employers_by_owner(jobs.iter().filter_map(|job| job.employer))
            .await;

        tracing::debug!(jobs = jobs.len(), employers = employers.len(), "Built job listings");
        Ok(jobs
            .into_iter()
            .map(|job| {
                let employer = job.employer.and_then(|owner| employers.get(&owner).cloned());
                JobListing {
                    company_name: company_name(employer.as_ref()),
                    employer,
                    job,
                }
            })
            .collect())
    }

    /// A single job with its employer and the viewer's saved state.
    pub async fn job_detail(
        &self,
        session: &Session,
        job_id: RecordId,
    ) -> Result<JobDetail, AppError> {
        let job = self.jobs.get_by_id(job_id).await?;

        let (employer, saved) = tokio::join!(
            self.employer_of(&job),
            self.saved_jobs.is_saved(job_id, session.user_id),
        );

        Ok(JobDetail { job, employer, saved })
    }

    /// The session user's applications, newest first.
    pub async fn my_applications(
        &self,
        session: &Session,
    ) -> Result<Vec<ApplicationView>, AppError> {
        let mut applications = self
            .applications
            .get_by_candidate_id(session.user_id)
            .await?;
        applications.sort_by(|a, b| newest_first(a.applied_at, b.applied_at));

        let views = join_all(applications.into_iter().map(|application| async move {
            let job = self.job_for(&application).await;
            let employer = match &job {
                Some(job) => self.employer_of(job).await,
                None => None,
            };
            ApplicationView {
                company_name: company_name(employer.as_ref()),
                application,
                job,
                employer,
            }
        }))
        .await;

        Ok(views)
    }

    /// Applications received across every job the session user owns.
    pub async fn candidate_roster(&self, session: &Session) -> Result<CandidateRoster, AppError> {
        let (jobs, applications) = tokio::try_join!(
            self.jobs.get_by_employer_id(session.user_id),
            self.applications.get_all(),
        )?;

        let owned: HashMap<RecordId, &Job> = jobs.iter().map(|job| (job.id, job)).collect();
        let mut applications: Vec<Application> = applications
            .into_iter()
            .filter(|application| owned.contains_key(&application.job))
            .collect();
        applications.sort_by(|a, b| newest_first(a.applied_at, b.applied_at));

        let candidates = self
            .candidates_by_user(applications.iter().map(|application| application.candidate))
            .await;

        let entries = applications
            .into_iter()
            .map(|application| RosterEntry {
                job: owned.get(&application.job).map(|job| (*job).clone()),
                candidate: candidates.get(&application.candidate).cloned(),
                application,
            })
            .collect();

        Ok(CandidateRoster { jobs, entries })
    }

    /// The session user's bookmarked jobs, in bookmark order. Bookmarks of
    /// jobs that no longer exist are dropped.
    pub async fn saved_jobs(&self, session: &Session) -> Result<Vec<SavedJobView>, AppError> {
        let saved = self.saved_jobs.get_by_candidate_id(session.user_id).await?;

        let mut seen = HashSet::new();
        let saved: Vec<SavedJob> = saved.into_iter().filter(|s| seen.insert(s.job)).collect();

        let ids: Vec<RecordId> = saved.iter().map(|s| s.job).collect();
        let jobs: HashMap<RecordId, Job> = self
            .jobs
            .get_by_ids(&ids)
            .await?
            .into_iter()
            .map(|job| (job.id, job))
            .collect();
        let employers = self
            .employers_by_owner(jobs.values().filter_map(|job| job.employer))
            .await;

        Ok(saved
            .into_iter()
            .filter_map(|saved| {
                let Some(job) = jobs.get(&saved.job).cloned() else {
                    tracing::debug!(job = %saved.job, "Saved job no longer exists, skipping");
                    return None;
                };
                let employer = job.employer.and_then(|owner| employers.get(&owner).cloned());
                Some(SavedJobView {
                    company_name: company_name(employer.as_ref()),
                    saved,
                    job,
                    employer,
                })
            })
            .collect())
    }

    // -- Actions --

    /// Apply to a job as the session user.
    pub async fn apply(
        &self,
        session: &Session,
        job_id: RecordId,
        cover_letter: &str,
        resume_url: Option<String>,
    ) -> Result<Application, AppError> {
        require_text("cover letter", cover_letter)?;

        let job = self.jobs.get_by_id(job_id).await?;
        if !job.status.is_listed() {
            return Err(AppError::validation(format!(
                "job {job_id} is {} and not accepting applications",
                job.status
            )));
        }

        let mut application = NewApplication::new(job_id, session.user_id, cover_letter);
        application.resume_url = resume_url;
        let application = self.applications.create(application).await?;

        tracing::info!(
            job = %job_id,
            candidate = %session.user_id,
            id = %application.id,
            "Application submitted"
        );
        Ok(application)
    }

    /// Flip the session user's bookmark on a job. Returns the new state.
    pub async fn toggle_saved(
        &self,
        session: &Session,
        job_id: RecordId,
    ) -> Result<bool, AppError> {
        match self.saved_jobs.find(job_id, session.user_id).await? {
            Some(existing) => {
                self.saved_jobs.delete(existing.id).await?;
                tracing::info!(job = %job_id, candidate = %session.user_id, "Job unsaved");
                Ok(false)
            }
            None => {
                self.saved_jobs.save(job_id, session.user_id).await?;
                tracing::info!(job = %job_id, candidate = %session.user_id, "Job saved");
                Ok(true)
            }
        }
    }

    /// Post a job owned by the session user.
    pub async fn post_job(&self, session: &Session, job: NewJob) -> Result<Job, AppError> {
        if !matches!(session.role, UserRole::Employer | UserRole::Admin) {
            return Err(AppError::validation(format!(
                "only employers can post jobs (session role is {})",
                session.role
            )));
        }

        let job = self.jobs.create(job.with_employer(session.user_id)).await?;
        tracing::info!(id = %job.id, employer = %session.user_id, title = %job.title, "Job posted");
        Ok(job)
    }

    // -- Secondary lookups (degrade, never fail) --

    async fn job_for(&self, application: &Application) -> Option<Job> {
        self.jobs
            .get_by_id(application.job)
            .await
            .inspect_err(|e| {
                tracing::warn!(
                    application = %application.id,
                    job = %application.job,
                    error = %e,
                    "Job lookup failed"
                );
            })
            .ok()
    }

    async fn employer_of(&self, job: &Job) -> Option<Employer> {
        let owner = job.employer?;
        self.employers
            .get_by_user_id(owner)
            .await
            .inspect_err(|e| {
                tracing::warn!(job = %job.id, %owner, error = %e, "Employer lookup failed");
            })
            .ok()
    }

    /// Resolve each distinct owner concurrently. Owners whose lookup fails
    /// are absent from the map.
    async fn employers_by_owner(
        &self,
        owners: impl IntoIterator<Item = RecordId>,
    ) -> HashMap<RecordId, Employer> {
        let owners: BTreeSet<RecordId> = owners.into_iter().collect();
        let lookups = owners.into_iter().map(|owner| async move {
            let result = self.employers.get_by_user_id(owner).await;
            (owner, result)
        });

        join_all(lookups)
            .await
            .into_iter()
            .filter_map(|(owner, result)| match result {
                Ok(employer) => Some((owner, employer)),
                Err(e) => {
                    tracing::warn!(%owner, error = %e, "Employer lookup failed");
                    None
                }
            })
            .collect()
    }

    async fn candidates_by_user(
        &self,
        users: impl IntoIterator<Item = RecordId>,
    ) -> HashMap<RecordId, JobSeeker> {
        let users: BTreeSet<RecordId> = users.into_iter().collect();
        let lookups = users.into_iter().map(|user| async move {
            let result = self.job_seekers.get_by_user_id(user).await;
            (user, result)
        });

        join_all(lookups)
            .await
            .into_iter()
            .filter_map(|(user, result)| match result {
                Ok(candidate) => Some((user, candidate)),
                Err(e) => {
                    tracing::warn!(%user, error = %e, "Candidate lookup failed");
                    None
                }
            })
            .collect()
    }
}

fn company_name(employer: Option<&Employer>) -> String {
    employer
        .map(|e| e.company_name.clone())
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| UNKNOWN_COMPANY.to_string())
}

/// Descending by timestamp; entries without one sort last.
fn newest_first(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
