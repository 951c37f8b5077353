//! Fixtures shared by the store's unit tests.

use civic_shared::{Role, SubmissionType};

use crate::database::Database;
use crate::models::{Agency, Category, NewAgency, NewSubmission, NewUser, Submission, User};

pub(crate) struct Seed {
    pub agency: Agency,
    pub category: Category,
    pub citizen: User,
    pub admin: User,
}

pub(crate) fn new_user(email: &str) -> NewUser {
    NewUser {
        first_name: "Asha".into(),
        last_name: "Verma".into(),
        email: email.into(),
        phone: "9876543210".into(),
        address: None,
        city: None,
        district: None,
        password_hash: "$argon2id$placeholder".into(),
        role: Role::Citizen,
        agency_id: None,
    }
}

/// An agency with one category, a citizen and an admin.
pub(crate) fn seed() -> (Database, Seed) {
    let db = Database::open_in_memory().unwrap();
    let agency = db
        .create_agency(&NewAgency {
            name: "Public Works".into(),
            ..Default::default()
        })
        .unwrap();
    let category = db.create_category("Potholes", agency.id).unwrap();
    let citizen = db.create_user(&new_user("citizen@example.org")).unwrap();
    let admin = db
        .create_user(&NewUser {
            role: Role::Admin,
            agency_id: Some(agency.id),
            ..new_user("admin@works.gov")
        })
        .unwrap();

    (
        db,
        Seed {
            agency,
            category,
            citizen,
            admin,
        },
    )
}

pub(crate) fn seed_with_submission() -> (Database, Seed, Submission) {
    let (db, seed) = seed();
    let submission = db
        .create_submission(&NewSubmission {
            title: "Pothole".into(),
            description: "Deep pothole on MG Road".into(),
            submission_type: SubmissionType::Complaint,
            location: None,
            attachment_url: None,
            user_id: seed.citizen.id,
            category_id: seed.category.id,
            agency_id: seed.agency.id,
        })
        .unwrap();
    (db, seed, submission)
}
