#[cfg(test)]
pub mod mock;
pub mod pagination;
pub mod sqlite;
pub mod structs;
pub mod tables;

use crate::datastore::pagination::{PageRequest, Paginated};
use crate::datastore::structs::{
    Comment, Group, NewComment, NewGroup, NewPost, NewUser, Post, PostChanges, User,
};
use crate::veil::Fallible;
use async_trait::async_trait;

/// The interface for all persistent blog data.
///
/// Listings that render posts return `(Post, User)` pairs so callers never
/// chase author ids; every post listing is ordered newest first.
#[async_trait]
pub trait Store: Clone + Send + Sync + 'static {
    async fn create_user(&self, new_user: NewUser) -> Fallible<User>;
    async fn find_user(&self, username: &str) -> Fallible<Option<User>>;

    async fn create_group(&self, new_group: NewGroup) -> Fallible<Group>;
    async fn find_group(&self, slug: &str) -> Fallible<Option<Group>>;
    async fn get_group(&self, id: i32) -> Fallible<Option<Group>>;
    /// Deleting a group clears the group reference on its posts; the posts
    /// themselves survive.
    async fn delete_group(&self, slug: &str) -> Fallible<Option<Group>>;

    async fn create_post(&self, new_post: NewPost) -> Fallible<Post>;
    async fn find_post(&self, id: i32) -> Fallible<Option<(Post, User)>>;
    async fn update_post(&self, id: i32, changes: PostChanges) -> Fallible<Option<Post>>;
    async fn recent_posts(&self, page: PageRequest) -> Fallible<Paginated<(Post, User)>>;
    async fn group_posts(&self, group_id: i32, page: PageRequest)
        -> Fallible<Paginated<(Post, User)>>;
    async fn posts_by(&self, author_id: i32, page: PageRequest)
        -> Fallible<Paginated<(Post, User)>>;
    /// Posts by every author the given user follows.
    async fn feed(&self, follower_id: i32, page: PageRequest)
        -> Fallible<Paginated<(Post, User)>>;

    async fn create_comment(&self, new_comment: NewComment) -> Fallible<Comment>;
    /// A post's comments, oldest first.
    async fn post_comments(&self, post_id: i32) -> Fallible<Vec<(Comment, User)>>;

    /// Record that `user_id` follows `author_id`. The pair is unique at the
    /// storage boundary; callers check `is_following` first.
    async fn follow(&self, user_id: i32, author_id: i32) -> Fallible<()>;
    /// Idempotent: removing a follow that doesn't exist is not an error.
    async fn unfollow(&self, user_id: i32, author_id: i32) -> Fallible<()>;
    async fn is_following(&self, user_id: i32, author_id: i32) -> Fallible<bool>;
}
