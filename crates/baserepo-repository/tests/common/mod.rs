//! Shared fixtures for repository integration tests.

#![allow(dead_code)]

use baserepo_core::{attributes, Attributes, Record, Related, ResourceId, Transformer};
use baserepo_repository::{BaseRepository, InMemoryDataSource};
use serde::Serialize;

pub const USER_RESOURCE_KEY: &str = "users";
pub const POST_RESOURCE_KEY: &str = "posts";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip)]
    pub password: String,
}

impl Record for User {
    fn id(&self) -> ResourceId {
        self.id.into()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Post {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
}

impl Record for Post {
    fn id(&self) -> ResourceId {
        self.id.into()
    }
}

/// Creates a user the way a factory would.
pub fn create_test_user(id: i64, name: &str, email: &str) -> User {
    User {
        id,
        name: name.to_string(),
        email: email.to_string(),
        password: "secret".to_string(),
    }
}

/// Users `1..=count`, named `User {id}`.
pub fn create_users(count: i64) -> Vec<User> {
    (1..=count)
        .map(|id| create_test_user(id, &format!("User {id}"), &format!("user{id}@example.com")))
        .collect()
}

pub fn john_doe(id: i64) -> User {
    create_test_user(id, "John Doe", "john@doe.com")
}

pub fn user_repository(users: Vec<User>) -> BaseRepository<InMemoryDataSource<User>> {
    BaseRepository::new(InMemoryDataSource::new(users))
}

/// Emits `id`, `name` and `email`; `posts` is includable.
#[derive(Debug, Default)]
pub struct UserTransformer {
    pub posts: Vec<Post>,
}

impl UserTransformer {
    pub fn with_posts(posts: Vec<Post>) -> Self {
        Self { posts }
    }
}

impl Transformer<User> for UserTransformer {
    fn transform(&self, user: &User) -> anyhow::Result<Attributes> {
        Ok(attributes! {
            "id" => user.id,
            "name" => user.name.clone(),
            "email" => user.email.clone(),
        })
    }

    fn available_includes(&self) -> &[&'static str] {
        &["posts"]
    }

    fn include(&self, user: &User, name: &str) -> anyhow::Result<Option<Related>> {
        match name {
            "posts" => {
                let posts = self.posts.iter().filter(|post| post.user_id == user.id);
                Related::many(posts, &PostTransformer, POST_RESOURCE_KEY).map(Some)
            }
            _ => Ok(None),
        }
    }
}

pub struct PostTransformer;

impl Transformer<Post> for PostTransformer {
    fn transform(&self, post: &Post) -> anyhow::Result<Attributes> {
        Ok(attributes! { "title" => post.title.clone() })
    }
}
