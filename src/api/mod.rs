//! Typed wrappers over the gateway for the management endpoints the console
//! consumes.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::gateway::Gateway;
use crate::menu::{MenuNode, MenuSource};
use crate::session::UserProfile;

pub const LOGIN_ENDPOINT: &str = "/management/login";
pub const CHANGE_PASSWORD_ENDPOINT: &str = "/management/changepwd";
pub const MENU_ENDPOINT: &str = "/management/menus";

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginReply {
    pub token: String,
    #[serde(default, alias = "userInfo")]
    pub user_info: UserProfile,
}

/// Authenticate and return the token plus user profile. The caller decides
/// whether to store them in the session.
pub async fn login(gateway: &Gateway, username: &str, password: &str) -> Result<LoginReply> {
    let envelope = gateway
        .post::<LoginReply, _>(
            LOGIN_ENDPOINT,
            &LoginRequest {
                username: username.to_string(),
                password: password.to_string(),
            },
        )
        .await?;
    envelope.into_data()
}

#[derive(Debug, Clone, Serialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

pub async fn change_password(gateway: &Gateway, old: &str, new: &str) -> Result<()> {
    gateway
        .post::<serde_json::Value, _>(
            CHANGE_PASSWORD_ENDPOINT,
            &ChangePasswordRequest {
                old_password: old.to_string(),
                new_password: new.to_string(),
            },
        )
        .await?;
    Ok(())
}

/// Fetch the permission-scoped menu tree for the current session. Returns the
/// raw tree exactly as the server provided it; an empty tree is the caller's
/// business rule to act on.
pub async fn fetch_menus(gateway: &Gateway) -> Result<Vec<MenuNode>> {
    let envelope = gateway.get::<Vec<MenuNode>>(MENU_ENDPOINT).await?;
    Ok(envelope.data.unwrap_or_default())
}

/// Gateway-backed menu source used by the navigation guard in production
pub struct HttpMenuSource {
    gateway: Arc<Gateway>,
}

impl HttpMenuSource {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl MenuSource for HttpMenuSource {
    async fn fetch_menu(&self) -> Result<Vec<MenuNode>> {
        fetch_menus(&self.gateway).await
    }
}
