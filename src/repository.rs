use crate::{
    error::RepoError,
    models::{Label, LabelChanges, LabelKind, NewLabel, PostFilter, PostSummary, User},
};
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

mod memory;
mod postgres;

pub use memory::{MemoryRepository, SeedPost};
pub use postgres::PostgresRepository;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository Trait
///
/// Defines the abstract contract for all persistence operations, so handlers
/// can be driven by Postgres in production and by the in-memory store in tests
/// and local development.
///
/// Label operations are parameterised by `LabelKind`: tags and categories share
/// one layout and one set of rules. Implementations must enforce name/slug
/// uniqueness per kind and refuse to delete a label that still has posts,
/// reporting `RepoError::UniqueViolation` / `RepoError::ForeignKeyViolation`.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users ---
    async fn get_user(&self, id: Uuid) -> RepoResult<Option<User>>;

    // --- Labels ---
    /// All labels of a kind with their post counts, ordered by name.
    async fn list_labels(&self, kind: LabelKind) -> RepoResult<Vec<Label>>;
    async fn get_label(&self, kind: LabelKind, id: &str) -> RepoResult<Option<Label>>;
    /// Returns any label of `kind` other than `exclude_id` whose name equals
    /// `name` or whose slug equals `slug`. `None` criteria are ignored; with both
    /// absent nothing matches.
    async fn find_conflicting_label(
        &self,
        kind: LabelKind,
        exclude_id: Option<&str>,
        name: Option<&str>,
        slug: Option<&str>,
    ) -> RepoResult<Option<Label>>;
    async fn create_label(&self, kind: LabelKind, label: NewLabel) -> RepoResult<Label>;
    /// Applies only the supplied fields. `None` when the id does not exist.
    async fn update_label(
        &self,
        kind: LabelKind,
        id: &str,
        changes: LabelChanges,
    ) -> RepoResult<Option<Label>>;
    /// `false` when the id does not exist.
    async fn delete_label(&self, kind: LabelKind, id: &str) -> RepoResult<bool>;

    // --- Posts (read-only) ---
    /// Published posts matching `filter`, newest first.
    async fn list_published_posts(&self, filter: &PostFilter) -> RepoResult<Vec<PostSummary>>;
    async fn count_published_posts(&self) -> RepoResult<i64>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;
