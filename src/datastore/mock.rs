use crate::datastore::{
    pagination::{PageRequest, Paginated},
    structs::{
        Comment, Follow, Group, NewComment, NewGroup, NewPost, NewUser, Post, PostChanges, User,
    },
    Store,
};
use crate::veil::{Cause, Describe, ExternalError, Fallible};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// A mock implementation of datastore::Store for handler tests.
#[derive(Clone, Default, Debug)]
pub struct Client {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default, Debug)]
struct Inner {
    users: Vec<User>,
    groups: Vec<Group>,
    posts: Vec<Post>,
    comments: Vec<Comment>,
    follows: Vec<Follow>,
    next_id: i32,
}

impl Inner {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn user(&self, id: i32) -> User {
        self.users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .expect("user row missing")
    }

    fn posts_page(&self, page: PageRequest, keep: impl Fn(&Post) -> bool) -> Paginated<(Post, User)> {
        let mut rows: Vec<&Post> = self.posts.iter().filter(|p| keep(p)).collect();
        rows.sort_by(|a, b| (b.pub_date, b.id).cmp(&(a.pub_date, a.id)));
        let rows = rows
            .into_iter()
            .map(|p| (p.clone(), self.user(p.author_id)))
            .collect();
        Paginated::from_vec(rows, page)
    }
}

fn conflict(what: &'static str) -> crate::veil::Error {
    anyhow::anyhow!("mock conflict").describe(ExternalError {
        cause: Cause::Conflict,
        text: what,
    })
}

#[async_trait]
impl Store for Client {
    async fn create_user(&self, new_user: NewUser) -> Fallible<User> {
        let mut inner = self.inner.lock().unwrap();
        if inner.users.iter().any(|u| u.username == new_user.username) {
            return Err(conflict("username is already taken"));
        }
        let user = User {
            id: inner.next_id(),
            username: new_user.username,
            joined: new_user.joined,
        };
        inner.users.push(user.clone());
        Ok(user)
    }

    async fn find_user(&self, username: &str) -> Fallible<Option<User>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.iter().find(|u| u.username == username).cloned())
    }

    async fn create_group(&self, new_group: NewGroup) -> Fallible<Group> {
        let mut inner = self.inner.lock().unwrap();
        if inner.groups.iter().any(|g| g.slug == new_group.slug) {
            return Err(conflict("a group with this slug already exists"));
        }
        let group = Group {
            id: inner.next_id(),
            title: new_group.title,
            slug: new_group.slug,
            description: new_group.description,
        };
        inner.groups.push(group.clone());
        Ok(group)
    }

    async fn find_group(&self, slug: &str) -> Fallible<Option<Group>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.groups.iter().find(|g| g.slug == slug).cloned())
    }

    async fn get_group(&self, id: i32) -> Fallible<Option<Group>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.groups.iter().find(|g| g.id == id).cloned())
    }

    async fn delete_group(&self, slug: &str) -> Fallible<Option<Group>> {
        let mut inner = self.inner.lock().unwrap();
        let Some(position) = inner.groups.iter().position(|g| g.slug == slug) else {
            return Ok(None);
        };
        let group = inner.groups.remove(position);
        for post in &mut inner.posts {
            if post.group_id == Some(group.id) {
                post.group_id = None;
            }
        }
        Ok(Some(group))
    }

    async fn create_post(&self, new_post: NewPost) -> Fallible<Post> {
        let mut inner = self.inner.lock().unwrap();
        let post = Post {
            id: inner.next_id(),
            text: new_post.text,
            pub_date: new_post.pub_date,
            author_id: new_post.author_id,
            group_id: new_post.group_id,
            image: new_post.image,
        };
        inner.posts.push(post.clone());
        Ok(post)
    }

    async fn find_post(&self, id: i32) -> Fallible<Option<(Post, User)>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .posts
            .iter()
            .find(|p| p.id == id)
            .map(|p| (p.clone(), inner.user(p.author_id))))
    }

    async fn update_post(&self, id: i32, changes: PostChanges) -> Fallible<Option<Post>> {
        let mut inner = self.inner.lock().unwrap();
        let Some(post) = inner.posts.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        if let Some(text) = changes.text {
            post.text = text;
        }
        if let Some(group_id) = changes.group_id {
            post.group_id = group_id;
        }
        if let Some(image) = changes.image {
            post.image = Some(image);
        }
        Ok(Some(post.clone()))
    }

    async fn recent_posts(&self, page: PageRequest) -> Fallible<Paginated<(Post, User)>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.posts_page(page, |_| true))
    }

    async fn group_posts(
        &self,
        group_id: i32,
        page: PageRequest,
    ) -> Fallible<Paginated<(Post, User)>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.posts_page(page, |p| p.group_id == Some(group_id)))
    }

    async fn posts_by(
        &self,
        author_id: i32,
        page: PageRequest,
    ) -> Fallible<Paginated<(Post, User)>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.posts_page(page, |p| p.author_id == author_id))
    }

    async fn feed(
        &self,
        follower_id: i32,
        page: PageRequest,
    ) -> Fallible<Paginated<(Post, User)>> {
        let inner = self.inner.lock().unwrap();
        let followed: HashSet<i32> = inner
            .follows
            .iter()
            .filter(|f| f.user_id == Some(follower_id))
            .filter_map(|f| f.author_id)
            .collect();
        Ok(inner.posts_page(page, |p| followed.contains(&p.author_id)))
    }

    async fn create_comment(&self, new_comment: NewComment) -> Fallible<Comment> {
        let mut inner = self.inner.lock().unwrap();
        let comment = Comment {
            id: inner.next_id(),
            post_id: new_comment.post_id,
            author_id: new_comment.author_id,
            text: new_comment.text,
            created: new_comment.created,
        };
        inner.comments.push(comment.clone());
        Ok(comment)
    }

    async fn post_comments(&self, post_id: i32) -> Fallible<Vec<(Comment, User)>> {
        let inner = self.inner.lock().unwrap();
        let mut rows: Vec<&Comment> = inner
            .comments
            .iter()
            .filter(|c| c.post_id == Some(post_id))
            .collect();
        rows.sort_by(|a, b| (a.created, a.id).cmp(&(b.created, b.id)));
        Ok(rows
            .into_iter()
            .map(|c| (c.clone(), inner.user(c.author_id)))
            .collect())
    }

    async fn follow(&self, user_id: i32, author_id: i32) -> Fallible<()> {
        let mut inner = self.inner.lock().unwrap();
        let exists = inner
            .follows
            .iter()
            .any(|f| f.user_id == Some(user_id) && f.author_id == Some(author_id));
        if exists {
            return Err(conflict("already following this author"));
        }
        let follow = Follow {
            id: inner.next_id(),
            user_id: Some(user_id),
            author_id: Some(author_id),
        };
        inner.follows.push(follow);
        Ok(())
    }

    async fn unfollow(&self, user_id: i32, author_id: i32) -> Fallible<()> {
        let mut inner = self.inner.lock().unwrap();
        inner
            .follows
            .retain(|f| !(f.user_id == Some(user_id) && f.author_id == Some(author_id)));
        Ok(())
    }

    async fn is_following(&self, user_id: i32, author_id: i32) -> Fallible<bool> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .follows
            .iter()
            .any(|f| f.user_id == Some(user_id) && f.author_id == Some(author_id)))
    }
}

impl Client {
    /// Every follow edge currently stored, for test assertions.
    pub fn follow_edges(&self) -> Vec<(Option<i32>, Option<i32>)> {
        let inner = self.inner.lock().unwrap();
        inner
            .follows
            .iter()
            .map(|f| (f.user_id, f.author_id))
            .collect()
    }

    /// Total stored posts, for test assertions.
    pub fn post_count(&self) -> usize {
        self.inner.lock().unwrap().posts.len()
    }

    /// Total stored comments, for test assertions.
    pub fn comment_count(&self) -> usize {
        self.inner.lock().unwrap().comments.len()
    }
}
