//! The user-facing handlers, one per operation, plus the view structs their
//! responses serialize. Views carry author usernames instead of row ids and
//! drop nothing else worth hiding.

use crate::api::{observe, PageQuery, State};
use crate::auth::AuthenticatedUser;
use crate::cache::Cache;
use crate::config::Settings;
use crate::datastore::pagination::{PageRequest, Paginated};
use crate::datastore::structs::{Comment, Group, NewComment, NewPost, Post, PostChanges, User};
use crate::datastore::Store;
use crate::forms::{CommentForm, FormErrors, ImageFile, PostForm};
use crate::veil::{Cause, DescribeErr, ExternalError, Fallible, OrNotFound};
use actix_web::{http::header, web, HttpResponse};
use chrono::{offset::Utc, DateTime};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

/// Cached front-page listings, one entry per page number.
pub type ListingCache = Cache<Paginated<PostView>>;

pub fn configure<S: Store>(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index::<S>))
        .route("/create", web::post().to(create_post::<S>))
        .route("/follow", web::get().to(follow_index::<S>))
        .route("/group/{slug}", web::get().to(group_posts::<S>))
        .route("/profile/{username}", web::get().to(profile::<S>))
        .route("/profile/{username}/follow", web::get().to(follow_author::<S>))
        .route(
            "/profile/{username}/unfollow",
            web::get().to(unfollow_author::<S>),
        )
        .route("/posts/{id}", web::get().to(post_detail::<S>))
        .route("/posts/{id}/edit", web::post().to(edit_post::<S>))
        .route("/posts/{id}/comment", web::post().to(add_comment::<S>));
}

/// A post as responses render it.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct PostView {
    pub id: i32,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub author: String,
    pub group_id: Option<i32>,
    pub image: Option<String>,
}

impl From<(Post, User)> for PostView {
    fn from((post, author): (Post, User)) -> Self {
        Self {
            id: post.id,
            text: post.text,
            pub_date: post.pub_date,
            author: author.username,
            group_id: post.group_id,
            image: post.image,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CommentView {
    pub id: i32,
    pub author: String,
    pub text: String,
    pub created: DateTime<Utc>,
}

impl From<(Comment, User)> for CommentView {
    fn from((comment, author): (Comment, User)) -> Self {
        Self {
            id: comment.id,
            author: author.username,
            text: comment.text,
            created: comment.created,
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct GroupPageView {
    pub group: Group,
    pub page: Paginated<PostView>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ProfileView {
    pub author: User,
    pub following: bool,
    pub post_count: i64,
    pub page: Paginated<PostView>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct PostDetailView {
    pub post: PostView,
    pub comments: Vec<CommentView>,
    /// An empty form for the comment box under the post.
    pub comment_form: CommentForm,
}

async fn index<S: Store>(
    state: web::Data<State<S>>,
    settings: web::Data<Settings>,
    cache: web::Data<ListingCache>,
    query: web::Query<PageQuery>,
) -> Fallible<HttpResponse> {
    observe("index", || async {
        let number = query.number();
        let page = cache
            .get_or_compute(&format!("index:{number}"), settings.index_ttl, || async {
                let page = state.ds.recent_posts(PageRequest::new(number)).await?;
                Ok(page.map(PostView::from))
            })
            .await?;
        Ok(HttpResponse::Ok().json(page))
    })
    .await
}

async fn group_posts<S: Store>(
    state: web::Data<State<S>>,
    slug: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Fallible<HttpResponse> {
    let slug = slug.into_inner();
    observe("group_posts", || async {
        let group = state.ds.find_group(&slug).await?.or_not_found("no such group")?;
        let page = state
            .ds
            .group_posts(group.id, PageRequest::new(query.number()))
            .await?
            .map(PostView::from);
        Ok(HttpResponse::Ok().json(GroupPageView { group, page }))
    })
    .await
}

async fn profile<S: Store>(
    state: web::Data<State<S>>,
    username: web::Path<String>,
    query: web::Query<PageQuery>,
    viewer: Option<AuthenticatedUser>,
) -> Fallible<HttpResponse> {
    let username = username.into_inner();
    observe("profile", || async {
        let author = state.ds.find_user(&username).await?.or_not_found("no such user")?;
        let page = state
            .ds
            .posts_by(author.id, PageRequest::new(query.number()))
            .await?;
        let following = match &viewer {
            Some(viewer) => state.ds.is_following(viewer.id, author.id).await?,
            None => false,
        };
        let post_count = page.total;
        Ok(HttpResponse::Ok().json(ProfileView {
            author,
            following,
            post_count,
            page: page.map(PostView::from),
        }))
    })
    .await
}

async fn post_detail<S: Store>(
    state: web::Data<State<S>>,
    id: web::Path<i32>,
) -> Fallible<HttpResponse> {
    let id = id.into_inner();
    observe("post_detail", || async {
        let found = state.ds.find_post(id).await?.or_not_found("no such post")?;
        let comments = state
            .ds
            .post_comments(id)
            .await?
            .into_iter()
            .map(CommentView::from)
            .collect();
        Ok(HttpResponse::Ok().json(PostDetailView {
            post: PostView::from(found),
            comments,
            comment_form: CommentForm::default(),
        }))
    })
    .await
}

async fn create_post<S: Store>(
    state: web::Data<State<S>>,
    settings: web::Data<Settings>,
    user: AuthenticatedUser,
    form: web::Json<PostForm>,
) -> Fallible<HttpResponse> {
    observe("create_post", || async {
        let fields = match form.into_inner().validate() {
            Ok(fields) => fields,
            Err(errors) => return Ok(HttpResponse::BadRequest().json(errors)),
        };
        if let Some(group_id) = fields.group_id {
            if state.ds.get_group(group_id).await?.is_none() {
                return Ok(HttpResponse::BadRequest().json(FormErrors::single("group", "no such group")));
            }
        }
        let image = match fields.image {
            Some(image) => Some(store_image(&settings.media_root, image)?),
            None => None,
        };
        state
            .ds
            .create_post(NewPost {
                text: fields.text,
                pub_date: Utc::now(),
                author_id: user.id,
                group_id: fields.group_id,
                image,
            })
            .await?;
        Ok(redirect(&format!("/profile/{}/", user.username)))
    })
    .await
}

async fn edit_post<S: Store>(
    state: web::Data<State<S>>,
    settings: web::Data<Settings>,
    user: AuthenticatedUser,
    id: web::Path<i32>,
    form: web::Json<PostForm>,
) -> Fallible<HttpResponse> {
    let id = id.into_inner();
    observe("edit_post", || async {
        let (post, author) = state.ds.find_post(id).await?.or_not_found("no such post")?;
        if post.author_id != user.id {
            // Non-authors land back on the detail view with nothing applied.
            return Ok(redirect(&format!("/posts/{id}/")));
        }
        let fields = match form.into_inner().validate() {
            Ok(fields) => fields,
            Err(errors) => return Ok(HttpResponse::BadRequest().json(errors)),
        };
        if let Some(group_id) = fields.group_id {
            if state.ds.get_group(group_id).await?.is_none() {
                return Ok(HttpResponse::BadRequest().json(FormErrors::single("group", "no such group")));
            }
        }
        let image = match fields.image {
            Some(image) => Some(store_image(&settings.media_root, image)?),
            None => None,
        };
        let changes = PostChanges {
            text: Some(fields.text),
            group_id: Some(fields.group_id),
            image,
        };
        let updated = state
            .ds
            .update_post(id, changes)
            .await?
            .or_not_found("no such post")?;
        Ok(HttpResponse::Ok().json(PostView::from((updated, author))))
    })
    .await
}

async fn add_comment<S: Store>(
    state: web::Data<State<S>>,
    user: AuthenticatedUser,
    id: web::Path<i32>,
    form: web::Json<CommentForm>,
) -> Fallible<HttpResponse> {
    let id = id.into_inner();
    observe("add_comment", || async {
        let (post, _author) = state.ds.find_post(id).await?.or_not_found("no such post")?;
        let detail = format!("/posts/{id}/");
        let fields = match form.into_inner().validate() {
            Ok(fields) => fields,
            // Invalid comments are dropped without a word; the client just
            // lands back on the detail view.
            Err(_) => return Ok(redirect(&detail)),
        };
        state
            .ds
            .create_comment(NewComment {
                post_id: Some(post.id),
                author_id: user.id,
                text: fields.text,
                created: Utc::now(),
            })
            .await?;
        Ok(redirect(&detail))
    })
    .await
}

async fn follow_index<S: Store>(
    state: web::Data<State<S>>,
    user: AuthenticatedUser,
    query: web::Query<PageQuery>,
) -> Fallible<HttpResponse> {
    observe("follow_index", || async {
        let page = state
            .ds
            .feed(user.id, PageRequest::new(query.number()))
            .await?
            .map(PostView::from);
        Ok(HttpResponse::Ok().json(page))
    })
    .await
}

async fn follow_author<S: Store>(
    state: web::Data<State<S>>,
    user: AuthenticatedUser,
    username: web::Path<String>,
) -> Fallible<HttpResponse> {
    let username = username.into_inner();
    observe("follow_author", || async {
        let author = state.ds.find_user(&username).await?.or_not_found("no such user")?;
        // Following yourself, or an author twice, is a no-op.
        if author.id != user.id && !state.ds.is_following(user.id, author.id).await? {
            state.ds.follow(user.id, author.id).await?;
        }
        Ok(redirect(&format!("/profile/{}/", author.username)))
    })
    .await
}

async fn unfollow_author<S: Store>(
    state: web::Data<State<S>>,
    user: AuthenticatedUser,
    username: web::Path<String>,
) -> Fallible<HttpResponse> {
    let username = username.into_inner();
    observe("unfollow_author", || async {
        let author = state.ds.find_user(&username).await?.or_not_found("no such user")?;
        state.ds.unfollow(user.id, author.id).await?;
        Ok(redirect(&format!("/profile/{}/", author.username)))
    })
    .await
}

/// Fallback for paths no route matches.
pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({ "error": "NotFound: no such page" }))
}

fn redirect(to: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, to))
        .finish()
}

const IMAGE_SAVE_FAILED: ExternalError = ExternalError {
    cause: Cause::ServerError,
    text: "could not store image",
};

/// Write an accepted attachment under the media root and hand back the
/// relative path the post will reference.
fn store_image(media_root: &Path, image: ImageFile) -> Fallible<String> {
    std::fs::create_dir_all(media_root.join("posts")).describe_err(IMAGE_SAVE_FAILED)?;
    let base_name = Path::new(&image.file_name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload");
    let relative = format!("posts/{}-{}", Uuid::new_v4(), base_name);
    std::fs::write(media_root.join(&relative), image.bytes).describe_err(IMAGE_SAVE_FAILED)?;
    Ok(relative)
}
