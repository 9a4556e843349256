use crate::datastore::{
    pagination::{offset, PageRequest, Paginated, POSTS_PER_PAGE},
    sqlite::{errors::BlockingResp, SqliteStore},
    structs::{
        Comment, Group, NewComment, NewFollow, NewGroup, NewPost, NewUser, Post, PostChanges, User,
    },
    tables::{comments, follows, groups, posts, users},
    Store,
};
use crate::veil::{Cause, Describe, Error, ExternalError, Fallible};
use actix_web::web::block;
use async_trait::async_trait;
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

#[async_trait]
impl Store for SqliteStore {
    async fn create_user(&self, new_user: NewUser) -> Fallible<User> {
        let mut conn = self.pool.get()?;
        block(move || {
            conn.transaction::<_, Error, _>(|conn| {
                let taken: bool = diesel::select(exists(
                    users::table.filter(users::username.eq(&new_user.username)),
                ))
                .get_result(conn)?;
                if taken {
                    return Err(
                        anyhow::anyhow!("username {:?} is taken", new_user.username).describe(
                            ExternalError {
                                cause: Cause::Conflict,
                                text: "username is already taken",
                            },
                        ),
                    );
                }
                Ok(diesel::insert_into(users::table)
                    .values(&new_user)
                    .get_result(conn)?)
            })
        })
        .await
        .to_resp()
    }

    async fn find_user(&self, username: &str) -> Fallible<Option<User>> {
        let mut conn = self.pool.get()?;
        let username = username.to_owned();
        block(move || {
            Ok(users::table
                .filter(users::username.eq(username))
                .first(&mut conn)
                .optional()?)
        })
        .await
        .to_resp()
    }

    async fn create_group(&self, new_group: NewGroup) -> Fallible<Group> {
        let mut conn = self.pool.get()?;
        block(move || {
            conn.transaction::<_, Error, _>(|conn| {
                let taken: bool = diesel::select(exists(
                    groups::table.filter(groups::slug.eq(&new_group.slug)),
                ))
                .get_result(conn)?;
                if taken {
                    return Err(anyhow::anyhow!("slug {:?} is taken", new_group.slug).describe(
                        ExternalError {
                            cause: Cause::Conflict,
                            text: "a group with this slug already exists",
                        },
                    ));
                }
                Ok(diesel::insert_into(groups::table)
                    .values(&new_group)
                    .get_result(conn)?)
            })
        })
        .await
        .to_resp()
    }

    async fn find_group(&self, slug: &str) -> Fallible<Option<Group>> {
        let mut conn = self.pool.get()?;
        let slug = slug.to_owned();
        block(move || {
            Ok(groups::table
                .filter(groups::slug.eq(slug))
                .first(&mut conn)
                .optional()?)
        })
        .await
        .to_resp()
    }

    async fn get_group(&self, id: i32) -> Fallible<Option<Group>> {
        let mut conn = self.pool.get()?;
        block(move || Ok(groups::table.find(id).first(&mut conn).optional()?))
            .await
            .to_resp()
    }

    async fn delete_group(&self, slug: &str) -> Fallible<Option<Group>> {
        let mut conn = self.pool.get()?;
        let slug = slug.to_owned();
        block(move || {
            conn.transaction::<_, Error, _>(|conn| {
                let group: Option<Group> = groups::table
                    .filter(groups::slug.eq(&slug))
                    .first(conn)
                    .optional()?;
                let Some(group) = group else {
                    return Ok(None);
                };
                // The posts.group_id reference clears via ON DELETE SET NULL.
                diesel::delete(groups::table.find(group.id)).execute(conn)?;
                Ok(Some(group))
            })
        })
        .await
        .to_resp()
    }

    async fn create_post(&self, new_post: NewPost) -> Fallible<Post> {
        let mut conn = self.pool.get()?;
        block(move || {
            Ok(diesel::insert_into(posts::table)
                .values(&new_post)
                .get_result(&mut conn)?)
        })
        .await
        .to_resp()
    }

    async fn find_post(&self, id: i32) -> Fallible<Option<(Post, User)>> {
        let mut conn = self.pool.get()?;
        block(move || {
            Ok(posts::table
                .inner_join(users::table)
                .filter(posts::id.eq(id))
                .first(&mut conn)
                .optional()?)
        })
        .await
        .to_resp()
    }

    async fn update_post(&self, id: i32, changes: PostChanges) -> Fallible<Option<Post>> {
        let mut conn = self.pool.get()?;
        block(move || {
            Ok(diesel::update(posts::table.find(id))
                .set(&changes)
                .get_result(&mut conn)
                .optional()?)
        })
        .await
        .to_resp()
    }

    async fn recent_posts(&self, page: PageRequest) -> Fallible<Paginated<(Post, User)>> {
        let mut conn = self.pool.get()?;
        block(move || {
            let total: i64 = posts::table.count().get_result(&mut conn)?;
            let number = page.resolve(total);
            let items = posts::table
                .inner_join(users::table)
                .order((posts::pub_date.desc(), posts::id.desc()))
                .limit(POSTS_PER_PAGE)
                .offset(offset(number))
                .load(&mut conn)?;
            Ok(Paginated::new(items, number, total))
        })
        .await
        .to_resp()
    }

    async fn group_posts(
        &self,
        group_id: i32,
        page: PageRequest,
    ) -> Fallible<Paginated<(Post, User)>> {
        let mut conn = self.pool.get()?;
        block(move || {
            let total: i64 = posts::table
                .filter(posts::group_id.eq(Some(group_id)))
                .count()
                .get_result(&mut conn)?;
            let number = page.resolve(total);
            let items = posts::table
                .inner_join(users::table)
                .filter(posts::group_id.eq(Some(group_id)))
                .order((posts::pub_date.desc(), posts::id.desc()))
                .limit(POSTS_PER_PAGE)
                .offset(offset(number))
                .load(&mut conn)?;
            Ok(Paginated::new(items, number, total))
        })
        .await
        .to_resp()
    }

    async fn posts_by(
        &self,
        author_id: i32,
        page: PageRequest,
    ) -> Fallible<Paginated<(Post, User)>> {
        let mut conn = self.pool.get()?;
        block(move || {
            let total: i64 = posts::table
                .filter(posts::author_id.eq(author_id))
                .count()
                .get_result(&mut conn)?;
            let number = page.resolve(total);
            let items = posts::table
                .inner_join(users::table)
                .filter(posts::author_id.eq(author_id))
                .order((posts::pub_date.desc(), posts::id.desc()))
                .limit(POSTS_PER_PAGE)
                .offset(offset(number))
                .load(&mut conn)?;
            Ok(Paginated::new(items, number, total))
        })
        .await
        .to_resp()
    }

    async fn feed(
        &self,
        follower_id: i32,
        page: PageRequest,
    ) -> Fallible<Paginated<(Post, User)>> {
        let mut conn = self.pool.get()?;
        block(move || {
            let followed = || {
                follows::table
                    .filter(follows::user_id.eq(Some(follower_id)))
                    .select(follows::author_id.assume_not_null())
            };
            let total: i64 = posts::table
                .filter(posts::author_id.eq_any(followed()))
                .count()
                .get_result(&mut conn)?;
            let number = page.resolve(total);
            let items = posts::table
                .inner_join(users::table)
                .filter(posts::author_id.eq_any(followed()))
                .order((posts::pub_date.desc(), posts::id.desc()))
                .limit(POSTS_PER_PAGE)
                .offset(offset(number))
                .load(&mut conn)?;
            Ok(Paginated::new(items, number, total))
        })
        .await
        .to_resp()
    }

    async fn create_comment(&self, new_comment: NewComment) -> Fallible<Comment> {
        let mut conn = self.pool.get()?;
        block(move || {
            Ok(diesel::insert_into(comments::table)
                .values(&new_comment)
                .get_result(&mut conn)?)
        })
        .await
        .to_resp()
    }

    async fn post_comments(&self, post_id: i32) -> Fallible<Vec<(Comment, User)>> {
        let mut conn = self.pool.get()?;
        block(move || {
            Ok(comments::table
                .inner_join(users::table)
                .filter(comments::post_id.eq(Some(post_id)))
                .order((comments::created.asc(), comments::id.asc()))
                .load(&mut conn)?)
        })
        .await
        .to_resp()
    }

    async fn follow(&self, user_id: i32, author_id: i32) -> Fallible<()> {
        let mut conn = self.pool.get()?;
        block(move || {
            let new_follow = NewFollow {
                user_id: Some(user_id),
                author_id: Some(author_id),
            };
            diesel::insert_into(follows::table)
                .values(&new_follow)
                .execute(&mut conn)
                .map_err(|err| match err {
                    e @ DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => e
                        .describe(ExternalError {
                            cause: Cause::Conflict,
                            text: "already following this author",
                        }),
                    other => other.into(),
                })?;
            Ok(())
        })
        .await
        .to_resp()
    }

    async fn unfollow(&self, user_id: i32, author_id: i32) -> Fallible<()> {
        let mut conn = self.pool.get()?;
        block(move || {
            diesel::delete(
                follows::table
                    .filter(follows::user_id.eq(Some(user_id)))
                    .filter(follows::author_id.eq(Some(author_id))),
            )
            .execute(&mut conn)?;
            Ok(())
        })
        .await
        .to_resp()
    }

    async fn is_following(&self, user_id: i32, author_id: i32) -> Fallible<bool> {
        let mut conn = self.pool.get()?;
        block(move || {
            Ok(diesel::select(exists(
                follows::table
                    .filter(follows::user_id.eq(Some(user_id)))
                    .filter(follows::author_id.eq(Some(author_id))),
            ))
            .get_result(&mut conn)?)
        })
        .await
        .to_resp()
    }
}
