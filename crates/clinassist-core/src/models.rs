pub mod dashboard;
pub mod patient;
pub mod prediction;
pub mod seance;
pub mod therapeute;
pub mod user;

/// A backend-owned record addressed by a numeric id.
///
/// Every cached collection is keyed by this id when merging the result of a
/// successful write.
pub trait Entity {
    fn id(&self) -> i64;
}
