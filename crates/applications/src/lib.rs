//! `talentbase-applications` — applications, their lifecycle state machine,
//! and application comments.

pub mod application;
pub mod comment;

pub use application::{
    review_transition, withdraw_transition, Application, ApplicationStatus,
};
pub use comment::ApplicationComment;
