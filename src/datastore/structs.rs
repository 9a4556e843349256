use crate::datastore::tables::{comments, follows, groups, posts, users};
use chrono::{offset::Utc, DateTime};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// An author or reader. Registration happens outside this service; rows
/// arrive through the admin surface.
#[derive(Queryable, Identifiable, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[diesel(table_name = users)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub joined: DateTime<Utc>,
}

/// Parameters for the database statement which inserts new users.
#[derive(Insertable, Clone, Debug)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub username: String,
    pub joined: DateTime<Utc>,
}

/// A named category posts may opt into.
#[derive(Queryable, Identifiable, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[diesel(table_name = groups)]
pub struct Group {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub description: String,
}

#[derive(Insertable, Clone, Debug)]
#[diesel(table_name = groups)]
pub struct NewGroup {
    pub title: String,
    pub slug: String,
    pub description: String,
}

/// One blog entry.
#[derive(
    Queryable, Identifiable, Associations, Serialize, Deserialize, Clone, Debug, PartialEq, Eq,
)]
#[diesel(table_name = posts)]
#[diesel(belongs_to(User, foreign_key = author_id))]
pub struct Post {
    pub id: i32,
    pub text: String,
    /// Set once at creation; every listing orders by this, newest first.
    pub pub_date: DateTime<Utc>,
    pub author_id: i32,
    pub group_id: Option<i32>,
    /// Relative path of the attachment under the media root.
    pub image: Option<String>,
}

/// Parameters for the database statement which inserts new posts.
#[derive(Insertable, Clone, Debug)]
#[diesel(table_name = posts)]
pub struct NewPost {
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub author_id: i32,
    pub group_id: Option<i32>,
    pub image: Option<String>,
}

/// The author-editable slice of a post. Outer `None` leaves a column
/// untouched; `group_id: Some(None)` clears the group.
#[derive(AsChangeset, Clone, Debug, Default)]
#[diesel(table_name = posts)]
pub struct PostChanges {
    pub text: Option<String>,
    pub group_id: Option<Option<i32>>,
    pub image: Option<String>,
}

/// A reader's note under a post.
#[derive(Queryable, Identifiable, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[diesel(table_name = comments)]
pub struct Comment {
    pub id: i32,
    /// Nullable in the schema, always set by the comment handler.
    pub post_id: Option<i32>,
    pub author_id: i32,
    pub text: String,
    pub created: DateTime<Utc>,
}

#[derive(Insertable, Clone, Debug)]
#[diesel(table_name = comments)]
pub struct NewComment {
    pub post_id: Option<i32>,
    pub author_id: i32,
    pub text: String,
    pub created: DateTime<Utc>,
}

/// A directed subscription edge. Deleting either user nulls that end of the
/// edge; the row itself stays behind.
#[derive(Queryable, Identifiable, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[diesel(table_name = follows)]
pub struct Follow {
    pub id: i32,
    pub user_id: Option<i32>,
    pub author_id: Option<i32>,
}

#[derive(Insertable, Clone, Debug)]
#[diesel(table_name = follows)]
pub struct NewFollow {
    pub user_id: Option<i32>,
    pub author_id: Option<i32>,
}
