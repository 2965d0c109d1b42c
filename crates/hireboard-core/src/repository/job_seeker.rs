use serde::Deserialize;

use crate::error::AppError;
use crate::fields::{join_list, require_text, split_list};
use crate::id::RecordId;
use crate::models::{JobSeeker, JobSeekerFilters, JobSeekerPatch, NewJobSeeker};
use crate::query::{Condition, Query};
use crate::traits::RecordClient;

use super::{
    RecordBuilder, create_row, delete_rows, fetch_rows, field_list, get_row, lenient, update_row,
};

pub const COLLECTION: &str = "jobseeker_profile_c";

const FIELDS: &[&str] = &[
    "Id",
    "Name",
    "full_name_c",
    "phone_c",
    "location_c",
    "resume_url_c",
    "skills_c",
    "total_experience_years_c",
    "user_id_c",
];

/// Repository for candidate profiles.
#[derive(Debug, Clone)]
pub struct JobSeekerRepository<C> {
    client: C,
}

impl<C: RecordClient> JobSeekerRepository<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub async fn get_all(&self) -> Result<Vec<JobSeeker>, AppError> {
        let rows: Vec<JobSeekerRow> =
            fetch_rows(&self.client, COLLECTION, &Query::select(FIELDS)).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn get_by_id(&self, id: RecordId) -> Result<JobSeeker, AppError> {
        let row: JobSeekerRow =
            get_row(&self.client, COLLECTION, "job seeker", id, &field_list(FIELDS)).await?;
        Ok(row.into())
    }

    /// Profile owned by the given user.
    pub async fn get_by_user_id(&self, user: RecordId) -> Result<JobSeeker, AppError> {
        let query = Query::select(FIELDS).filter(Condition::eq("user_id_c", user));
        let rows: Vec<JobSeekerRow> = fetch_rows(&self.client, COLLECTION, &query).await?;
        rows.into_iter()
            .next()
            .map(Into::into)
            .ok_or_else(|| AppError::NotFound(format!("job seeker profile for user {user}")))
    }

    /// Candidates having every listed skill, optionally narrowed by
    /// location substring and minimum years of experience.
    pub async fn search(&self, filters: &JobSeekerFilters) -> Result<Vec<JobSeeker>, AppError> {
        let rows: Vec<JobSeekerRow> =
            fetch_rows(&self.client, COLLECTION, &search_query(filters)).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn create(&self, seeker: NewJobSeeker) -> Result<JobSeeker, AppError> {
        require_text("full name", &seeker.full_name)?;
        let skills = optional_list(seeker.skills)?;

        let record = RecordBuilder::new()
            .set("Name", seeker.full_name.trim())
            .set("full_name_c", seeker.full_name.trim())
            .set_opt("phone_c", seeker.phone)
            .set_opt("location_c", seeker.location)
            .set_opt("resume_url_c", seeker.resume_url)
            .set_opt("skills_c", skills)
            .set_opt("total_experience_years_c", seeker.experience_years)
            .set_opt("user_id_c", seeker.user)
            .into_value();

        let row: JobSeekerRow = create_row(&self.client, COLLECTION, "job seeker", record).await?;
        Ok(row.into())
    }

    pub async fn update(&self, id: RecordId, patch: JobSeekerPatch) -> Result<JobSeeker, AppError> {
        if let Some(name) = &patch.full_name {
            require_text("full name", name)?;
        }
        let skills = patch
            .skills
            .map(|items| join_list("skills", &items))
            .transpose()?;

        let fields = RecordBuilder::new()
            .set_opt("Name", patch.full_name.clone())
            .set_opt("full_name_c", patch.full_name)
            .set_opt("phone_c", patch.phone)
            .set_opt("location_c", patch.location)
            .set_opt("resume_url_c", patch.resume_url)
            .set_opt("skills_c", skills)
            .set_opt("total_experience_years_c", patch.experience_years)
            .set_opt("user_id_c", patch.user)
            .into_map();

        let row: JobSeekerRow =
            update_row(&self.client, COLLECTION, "job seeker", id, fields).await?;
        Ok(row.into())
    }

    pub async fn delete(&self, id: RecordId) -> Result<(), AppError> {
        delete_rows(&self.client, COLLECTION, &[id]).await
    }
}

fn optional_list(items: Vec<String>) -> Result<Option<String>, AppError> {
    if items.is_empty() {
        return Ok(None);
    }
    join_list("skills", &items).map(Some)
}

fn search_query(filters: &JobSeekerFilters) -> Query {
    let mut query = Query::select(FIELDS);
    for skill in filters.skills.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        query = query.filter(Condition::contains("skills_c", skill));
    }
    if let Some(location) = filters
        .location
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        query = query.filter(Condition::contains("location_c", location));
    }
    if let Some(years) = filters.min_experience {
        query = query.filter(Condition::gte("total_experience_years_c", years));
    }
    query
}

#[derive(Debug, Deserialize)]
struct JobSeekerRow {
    #[serde(rename = "Id")]
    id: RecordId,
    #[serde(rename = "Name", default, deserialize_with = "lenient::opt_text")]
    name: Option<String>,
    #[serde(rename = "full_name_c", default, deserialize_with = "lenient::opt_text")]
    full_name: Option<String>,
    #[serde(rename = "phone_c", default, deserialize_with = "lenient::opt_text")]
    phone: Option<String>,
    #[serde(rename = "location_c", default, deserialize_with = "lenient::opt_text")]
    location: Option<String>,
    #[serde(rename = "resume_url_c", default, deserialize_with = "lenient::opt_text")]
    resume_url: Option<String>,
    #[serde(rename = "skills_c", default, deserialize_with = "lenient::opt_text")]
    skills: Option<String>,
    #[serde(rename = "total_experience_years_c", default, deserialize_with = "lenient::opt_f64")]
    experience_years: Option<f64>,
    #[serde(rename = "user_id_c", default, deserialize_with = "lenient::opt_ref")]
    user: Option<RecordId>,
}

impl From<JobSeekerRow> for JobSeeker {
    fn from(row: JobSeekerRow) -> Self {
        JobSeeker {
            id: row.id,
            full_name: row.full_name.or(row.name).unwrap_or_default(),
            phone: row.phone,
            location: row.location,
            resume_url: row.resume_url,
            skills: row.skills.as_deref().map(split_list).unwrap_or_default(),
            experience_years: row.experience_years,
            user: row.user,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Operator;
    use crate::testutil::*;
    use serde_json::json;

    fn id(raw: i64) -> RecordId {
        RecordId::new(raw).unwrap()
    }

    fn seeded() -> (JobSeekerRepository<FlakyRecordClient>, FlakyRecordClient) {
        let client = FlakyRecordClient::new();
        client.seed(
            COLLECTION,
            vec![
                json!({"Id": 1, "full_name_c": "Ada Lovelace", "skills_c": "Rust, SQL, Tokio",
                       "location_c": "London", "total_experience_years_c": 7, "user_id_c": 500}),
                json!({"Id": 2, "full_name_c": "Grace Hopper", "skills_c": "COBOL,SQL",
                       "location_c": "New York", "total_experience_years_c": "12",
                       "user_id_c": 501}),
                json!({"Id": 3, "full_name_c": "Linus", "skills_c": "C",
                       "location_c": "Portland", "user_id_c": {"Id": 502}}),
            ],
        );
        (JobSeekerRepository::new(client.clone()), client)
    }

    #[test]
    fn search_query_adds_one_condition_per_skill() {
        let query = search_query(&JobSeekerFilters {
            skills: vec!["Rust".into(), " ".into(), "SQL".into()],
            location: Some("Lon".into()),
            min_experience: Some(5.0),
        });
        let ops: Vec<_> = query
            .conditions
            .iter()
            .map(|c| (c.field.as_str(), c.operator))
            .collect();
        assert_eq!(
            ops,
            vec![
                ("skills_c", Operator::Contains),
                ("skills_c", Operator::Contains),
                ("location_c", Operator::Contains),
                ("total_experience_years_c", Operator::GreaterThanOrEqualTo),
            ]
        );
    }

    #[tokio::test]
    async fn search_requires_every_skill() {
        let (repo, _) = seeded();
        let found = repo
            .search(&JobSeekerFilters {
                skills: vec!["sql".into(), "rust".into()],
                ..JobSeekerFilters::default()
            })
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].full_name, "Ada Lovelace");
        assert_eq!(found[0].skills, vec!["Rust", "SQL", "Tokio"]);
    }

    #[tokio::test]
    async fn search_by_minimum_experience() {
        let (repo, _) = seeded();
        let found = repo
            .search(&JobSeekerFilters {
                min_experience: Some(10.0),
                ..JobSeekerFilters::default()
            })
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].experience_years, Some(12.0));
    }

    #[tokio::test]
    async fn get_by_user_id_resolves_embedded_reference() {
        let (repo, _) = seeded();
        let seeker = repo.get_by_user_id(id(502)).await.unwrap();
        assert_eq!(seeker.id, id(3));
        assert!(repo.get_by_user_id(id(999)).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn create_and_update_round_trip_skills() {
        let (repo, client) = seeded();
        let created = repo
            .create(NewJobSeeker::new("Barbara Liskov", id(503)).with_skills(["CLU", "Argus"]))
            .await
            .unwrap();
        assert_eq!(created.skills, vec!["CLU", "Argus"]);

        let updated = repo
            .update(
                created.id,
                JobSeekerPatch {
                    location: Some("Boston".into()),
                    ..JobSeekerPatch::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.location.as_deref(), Some("Boston"));
        assert_eq!(updated.skills, vec!["CLU", "Argus"]);
        assert_eq!(
            client.last_update(),
            Some(json!({"Id": created.id.get(), "location_c": "Boston"}))
        );
    }

    #[tokio::test]
    async fn create_requires_full_name() {
        let (repo, client) = seeded();
        assert!(repo.create(NewJobSeeker::new("", id(503))).await.is_err());
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn delete_removes_profile() {
        let (repo, _) = seeded();
        repo.delete(id(3)).await.unwrap();
        assert!(repo.get_by_id(id(3)).await.unwrap_err().is_not_found());
        assert_eq!(repo.get_all().await.unwrap().len(), 2);
    }
}
