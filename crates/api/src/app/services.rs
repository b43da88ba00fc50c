//! Store and codec wiring shared by all handlers.

use sqlx::PgPool;

use talentbase_auth::TokenCodec;
use talentbase_infra::{
    ApplicationStore, CandidateStore, CompanyStore, JobStore, QuestionBankStore, UserStore,
};

pub struct AppServices {
    pub users: UserStore,
    pub companies: CompanyStore,
    pub jobs: JobStore,
    pub question_banks: QuestionBankStore,
    pub applications: ApplicationStore,
    pub candidates: CandidateStore,
    pub tokens: TokenCodec,
}

pub fn build_services(pool: PgPool, token_secret: &str) -> AppServices {
    AppServices {
        users: UserStore::new(pool.clone()),
        companies: CompanyStore::new(pool.clone()),
        jobs: JobStore::new(pool.clone()),
        question_banks: QuestionBankStore::new(pool.clone()),
        applications: ApplicationStore::new(pool.clone()),
        candidates: CandidateStore::new(pool),
        tokens: TokenCodec::new(token_secret.as_bytes()),
    }
}
