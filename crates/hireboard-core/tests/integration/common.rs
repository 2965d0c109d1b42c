use serde_json::json;

use hireboard_core::{JobBoard, MemoryRecordClient, RecordId, Session};

pub const ACME_OWNER: i64 = 100;
pub const INITECH_OWNER: i64 = 101;
pub const ADA: i64 = 500;
pub const LINUS: i64 = 501;

pub fn id(raw: i64) -> RecordId {
    RecordId::new(raw).unwrap()
}

pub fn ada() -> Session {
    Session::job_seeker(id(ADA))
}

pub fn linus() -> Session {
    Session::job_seeker(id(LINUS))
}

pub fn acme() -> Session {
    Session::employer(id(ACME_OWNER))
}

/// A small marketplace in the shape the backend stores it: `_c` fields,
/// mixed bare and embedded references, list fields as comma-joined text.
pub fn marketplace() -> (JobBoard<MemoryRecordClient>, MemoryRecordClient) {
    let client = MemoryRecordClient::from_json(json!({
        "user_c": [
            {"Id": ACME_OWNER, "email_c": "hiring@acme.test", "role_c": "employer",
             "status_c": "active"},
            {"Id": INITECH_OWNER, "email_c": "jobs@initech.test", "role_c": "employer",
             "status_c": "active"},
            {"Id": ADA, "email_c": "ada@mail.test", "role_c": "jobseeker", "status_c": "active"},
            {"Id": LINUS, "email_c": "linus@mail.test", "role_c": "jobseeker", "status_c": "active"}
        ],
        "employer_profile_c": [
            {"Id": 1, "company_name_c": "Acme", "verified_c": true, "user_id_c": ACME_OWNER},
            {"Id": 2, "company_name_c": "Initech", "verified_c": "false",
             "user_id_c": {"Id": INITECH_OWNER, "Name": "jobs@initech.test"}}
        ],
        "jobseeker_profile_c": [
            {"Id": 1, "full_name_c": "Ada Lovelace", "skills_c": "Rust, Math",
             "total_experience_years_c": 8, "user_id_c": ADA},
            {"Id": 2, "full_name_c": "Linus Torvalds", "skills_c": "C, Git",
             "total_experience_years_c": "20", "user_id_c": {"Id": LINUS}}
        ],
        "job_listing_c": [
            {"Id": 10, "title_c": "Rust Engineer", "description_c": "Systems work",
             "category_c": "Engineering", "location_c": "Remote", "employment_type_c": "full-time",
             "experience_level_c": "senior", "requirements_c": "Rust, Tokio ,Serde",
             "benefits_c": "Remote,  Equity", "status_c": "active",
             "posted_at_c": "2024-05-01T08:00:00Z", "employer_id_c": ACME_OWNER},
            {"Id": 11, "title_c": "Kernel Hacker", "description_c": "Low level",
             "category_c": "Engineering", "location_c": "Helsinki", "employment_type_c": "contract",
             "experience_level_c": "senior", "status_c": "active",
             "posted_at_c": "2024-05-02", "employer_id_c": {"Id": INITECH_OWNER}},
            {"Id": 12, "title_c": "Rust Intern", "description_c": "Learn",
             "category_c": "Engineering", "location_c": "Remote", "employment_type_c": "internship",
             "experience_level_c": "entry", "status_c": "draft", "employer_id_c": ACME_OWNER},
            {"Id": 13, "title_c": "Office Manager", "description_c": "Run the office",
             "category_c": "Operations", "location_c": "Berlin", "employment_type_c": "full-time",
             "experience_level_c": "mid", "status_c": "active", "employer_id_c": 999}
        ],
        "application_c": [
            {"Id": 20, "job_id_c": 10, "candidate_id_c": ADA, "cover_letter_c": "Hi",
             "status_c": "reviewing", "applied_at_c": "2024-05-03T10:00:00Z"},
            {"Id": 21, "job_id_c": {"Id": 11}, "candidate_id_c": ADA, "cover_letter_c": "Hello",
             "applied_at_c": "2024-05-04T10:00:00Z"},
            {"Id": 22, "job_id_c": 10, "candidate_id_c": LINUS, "cover_letter_c": "Patches welcome",
             "applied_at_c": "2024-05-05T10:00:00Z"},
            {"Id": 23, "job_id_c": 404, "candidate_id_c": ADA, "cover_letter_c": "Orphan",
             "applied_at_c": "2024-05-06T10:00:00Z"}
        ],
        "saved_job_c": [
            {"Id": 30, "job_id_c": 11, "candidate_id_c": ADA, "saved_at_c": "2024-05-02T12:00:00Z"}
        ]
    }))
    .unwrap();

    (JobBoard::new(client.clone()), client)
}
