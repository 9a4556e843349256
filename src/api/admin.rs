//! Operator endpoints. Groups and users come from an administrative process,
//! not the public surface; deployments keep this scope off the public
//! listener.

use crate::api::{PageQuery, State};
use crate::auth;
use crate::config::Settings;
use crate::datastore::pagination::{PageRequest, Paginated};
use crate::datastore::structs::{Group, NewGroup, NewUser, User};
use crate::datastore::Store;
use crate::veil::{Fallible, OrNotFound};
use actix_web::web;
use chrono::offset::Utc;
use serde::{Deserialize, Serialize};

use super::posts::PostView;

pub fn configure<S: Store>(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/users").route(web::post().to(create_user::<S>)))
        .service(web::resource("/groups").route(web::post().to(create_group::<S>)))
        .service(web::resource("/groups/{slug}").route(web::delete().to(delete_group::<S>)))
        .service(web::resource("/posts").route(web::get().to(list_all_posts::<S>)));
}

#[derive(Serialize, Deserialize, Debug)]
pub struct CreateUserBody {
    pub username: String,
}

/// A created account plus a token the operator can hand to its owner.
#[derive(Serialize, Deserialize, Debug)]
pub struct CreatedUser {
    pub user: User,
    pub token: String,
}

async fn create_user<S: Store>(
    state: web::Data<State<S>>,
    settings: web::Data<Settings>,
    body: web::Json<CreateUserBody>,
) -> Fallible<web::Json<CreatedUser>> {
    let user = state
        .ds
        .create_user(NewUser {
            username: body.into_inner().username,
            joined: Utc::now(),
        })
        .await?;
    let token = auth::issue_token(user.id, &user.username, &settings.auth_secret)?;
    Ok(web::Json(CreatedUser { user, token }))
}

#[derive(Serialize, Deserialize, Debug)]
pub struct CreateGroupBody {
    pub title: String,
    pub slug: String,
    pub description: String,
}

async fn create_group<S: Store>(
    state: web::Data<State<S>>,
    body: web::Json<CreateGroupBody>,
) -> Fallible<web::Json<Group>> {
    let body = body.into_inner();
    let group = state
        .ds
        .create_group(NewGroup {
            title: body.title,
            slug: body.slug,
            description: body.description,
        })
        .await?;
    Ok(web::Json(group))
}

async fn delete_group<S: Store>(
    state: web::Data<State<S>>,
    slug: web::Path<String>,
) -> Fallible<web::Json<Group>> {
    let group = state
        .ds
        .delete_group(&slug)
        .await?
        .or_not_found("no such group")?;
    Ok(web::Json(group))
}

// Operator view across every author's posts.
async fn list_all_posts<S: Store>(
    state: web::Data<State<S>>,
    query: web::Query<PageQuery>,
) -> Fallible<web::Json<Paginated<PostView>>> {
    let page = state
        .ds
        .recent_posts(PageRequest::new(query.number()))
        .await?
        .map(PostView::from);
    Ok(web::Json(page))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datastore::mock;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use std::path::PathBuf;
    use std::time::Duration;

    fn admin_settings() -> Settings {
        Settings {
            auth_secret: "test-secret".to_owned(),
            disable_auth: false,
            media_root: PathBuf::from("media"),
            index_ttl: Duration::from_secs(20),
        }
    }

    macro_rules! init_app {
        ($store:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new(State { ds: $store.clone() }))
                    .app_data(web::Data::new(admin_settings()))
                    .service(web::scope("/admin").configure(configure::<mock::Client>)),
            )
            .await
        };
    }

    #[actix_rt::test]
    async fn created_users_come_with_a_working_token() {
        let store = mock::Client::default();
        let app = init_app!(store);

        let req = test::TestRequest::post()
            .uri("/admin/users")
            .set_json(CreateUserBody {
                username: "someuser".to_owned(),
            })
            .to_request();
        let created: CreatedUser = test::call_and_read_body_json(&app, req).await;
        assert_eq!(created.user.username, "someuser");
        assert!(!created.token.is_empty());

        // Same username again conflicts.
        let req = test::TestRequest::post()
            .uri("/admin/users")
            .set_json(CreateUserBody {
                username: "someuser".to_owned(),
            })
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[actix_rt::test]
    async fn groups_can_be_created_and_deleted() {
        let store = mock::Client::default();
        let app = init_app!(store);

        let body = CreateGroupBody {
            title: "A group".to_owned(),
            slug: "a-group".to_owned(),
            description: "about the group".to_owned(),
        };
        let req = test::TestRequest::post()
            .uri("/admin/groups")
            .set_json(&body)
            .to_request();
        let group: Group = test::call_and_read_body_json(&app, req).await;
        assert_eq!(group.slug, "a-group");

        let req = test::TestRequest::post()
            .uri("/admin/groups")
            .set_json(&body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let req = test::TestRequest::delete()
            .uri("/admin/groups/a-group")
            .to_request();
        let deleted: Group = test::call_and_read_body_json(&app, req).await;
        assert_eq!(deleted.id, group.id);

        let req = test::TestRequest::delete()
            .uri("/admin/groups/a-group")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
