pub mod application;
pub mod employer;
pub mod job;
pub mod job_seeker;
pub mod saved_job;
pub mod user;

pub use application::{Application, ApplicationPatch, ApplicationStatus, NewApplication};
pub use employer::{Employer, EmployerPatch, NewEmployer};
pub use job::{Job, JobFilters, JobPatch, JobStatus, NewJob};
pub use job_seeker::{JobSeeker, JobSeekerFilters, JobSeekerPatch, NewJobSeeker};
pub use saved_job::SavedJob;
pub use user::{NewUser, User, UserPatch, UserRole};
