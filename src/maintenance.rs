//! One-shot maintenance commands run by `famdir-maint`.
//!
//! Each command performs a single query through the injected service and
//! writes human-readable output to `out`.

use crate::services::{CreateUserRequest, UserService};
use anyhow::Context;
use serde_json::json;
use std::io::Write;

pub async fn list_users(service: &UserService, out: &mut impl Write) -> anyhow::Result<usize> {
    let users = service
        .list_user_listings()
        .await
        .context("failed to list users")?;

    serde_json::to_writer_pretty(&mut *out, &users)?;
    writeln!(out)?;
    Ok(users.len())
}

/// Print the stored fields for one user. Returns whether the user exists.
pub async fn show_user(
    service: &UserService,
    email: &str,
    out: &mut impl Write,
) -> anyhow::Result<bool> {
    let Some(user) = service
        .find_user_by_email(email)
        .await
        .context("failed to look up user")?
    else {
        writeln!(out, "No user with email {email}")?;
        return Ok(false);
    };

    let fields = json!({
        "id": user.id,
        "email": user.email,
        "first_name": user.first_name,
        "last_name": user.last_name,
        "birthday": user.birthday,
        "profile_photo_url": user.profile_photo_url,
        "is_admin": user.is_admin,
        "created_at": user.created_at,
    });
    writeln!(out, "{}", serde_json::to_string_pretty(&fields)?)?;
    Ok(true)
}

pub async fn update_photo(
    service: &UserService,
    email: &str,
    url: &str,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let user = service
        .update_photo(email, url)
        .await
        .with_context(|| format!("failed to update photo for {email}"))?;

    writeln!(
        out,
        "Updated profile photo for {} {}",
        user.first_name, user.last_name
    )?;
    Ok(())
}

pub async fn set_admin(
    service: &UserService,
    email: &str,
    is_admin: bool,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let user = service
        .set_admin(email, is_admin)
        .await
        .with_context(|| format!("failed to change admin flag for {email}"))?;

    let verb = if user.is_admin { "granted to" } else { "revoked from" };
    writeln!(out, "Admin access {verb} {}", user.email)?;
    Ok(())
}

pub async fn create_user(
    service: &UserService,
    email: &str,
    password: String,
    is_admin: bool,
    out: &mut impl Write,
) -> anyhow::Result<i64> {
    let request = CreateUserRequest {
        email: email.to_string(),
        password,
        password_confirm: None,
        is_admin,
    };

    let user = service
        .create_user(request)
        .await
        .with_context(|| format!("failed to create {email}"))?;

    writeln!(out, "Created user {} (id {})", user.email, user.id)?;
    if user.is_admin {
        writeln!(out, "  with admin access")?;
    }
    Ok(user.id)
}
