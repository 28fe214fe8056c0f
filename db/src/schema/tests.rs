use chrono::{Duration, TimeZone};

use super::*;

const HASH: &str = "$2b$04$abcdefghijklmnopqrstuuH2rWx3j6CwWZOWZ4eSRhvrqDNNLWOOe";
const OTHER_HASH: &str = "$2y$12$zyxwvutsrqponmlkjihgfeH2rWx3j6CwWZOWZ4eSRhvrqDNNLWOOe";

fn new_user(email: &str) -> NewUser {
    NewUser {
        email: email.into(),
        password_hash: HASH.into(),
        ..Default::default()
    }
}

#[test]
fn test_build_applies_defaults() {
    let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let user = UserSchema::default()
        .build_at(new_user("alice@example.com"), now)
        .unwrap();

    assert_eq!(user.role, Role::User);
    assert!(user.is_active);
    assert_eq!(user.created_at(), now);
    assert_eq!(user.last_login_at, now);
    assert!(uuid::Uuid::parse_str(&user.refresh_token).is_ok());
}

#[test]
fn test_build_lowercases_email() {
    let user = UserSchema::default()
        .build(new_user("Alice@Example.COM"))
        .unwrap();
    assert_eq!(user.email, "alice@example.com");
}

#[test]
fn test_refresh_tokens_are_unique_per_record() {
    let schema = UserSchema::default();
    let a = schema.build(new_user("a@example.com")).unwrap();
    let b = schema.build(new_user("b@example.com")).unwrap();
    assert_ne!(a.refresh_token, b.refresh_token);
    assert_ne!(a.id, b.id);
}

#[test]
fn test_explicit_admin_role_is_preserved() {
    let user = UserSchema::default()
        .build(NewUser {
            role: Some("admin".into()),
            ..new_user("root@example.com")
        })
        .unwrap();
    assert_eq!(user.role, Role::Admin);
}

#[test]
fn test_unknown_role_is_rejected() {
    let err = UserSchema::default()
        .build(NewUser {
            role: Some("superuser".into()),
            ..new_user("root@example.com")
        })
        .unwrap_err();
    assert_eq!(err.field, "role");
}

#[test]
fn test_plaintext_password_is_rejected() {
    let err = UserSchema::default()
        .build(NewUser {
            password_hash: "hunter2".into(),
            ..new_user("alice@example.com")
        })
        .unwrap_err();
    assert_eq!(err.field, "password");
    assert_eq!(err.reason, "Invalid password hash");
}

#[test]
fn test_required_fields() {
    let schema = UserSchema::default();

    let err = schema.build(new_user("")).unwrap_err();
    assert_eq!(err.field, "email");

    let err = schema
        .build(NewUser {
            password_hash: String::new(),
            ..new_user("alice@example.com")
        })
        .unwrap_err();
    assert_eq!(err.field, "password");
    assert_eq!(err.reason, "password is required");

    let err = schema
        .build(NewUser {
            refresh_token: Some(String::new()),
            ..new_user("alice@example.com")
        })
        .unwrap_err();
    assert_eq!(err.field, "refreshToken");
}

#[test]
fn test_custom_predicate() {
    let schema = UserSchema::new(|s: &str| s.starts_with("argon2:"));

    assert!(schema
        .build(NewUser {
            password_hash: "argon2:abc".into(),
            ..new_user("alice@example.com")
        })
        .is_ok());
    assert!(schema.build(new_user("alice@example.com")).is_err());
}

struct NoExampleDomain;

impl FieldRule for NoExampleDomain {
    fn field(&self) -> &'static str {
        "email"
    }

    fn check(&self, candidate: &DbUser) -> Result<(), String> {
        if candidate.email.ends_with("@example.org") {
            return Err("example.org is not allowed".into());
        }
        Ok(())
    }
}

#[test]
fn test_extra_rules_compose() {
    let schema = UserSchema::default().with_rule(NoExampleDomain);

    assert!(schema.build(new_user("a@example.com")).is_ok());
    let err = schema.build(new_user("A@Example.ORG")).unwrap_err();
    assert_eq!(
        err,
        ValidationError::new("email", "example.org is not allowed")
    );
}

#[test]
fn test_apply_ignores_created_at() {
    let schema = UserSchema::default();
    let user = schema.build(new_user("alice@example.com")).unwrap();
    let original = user.created_at();

    let updated = schema
        .apply(
            &user,
            UserUpdate {
                created_at: Some(original - Duration::days(365)),
                is_active: Some(false),
                ..Default::default()
            },
        )
        .unwrap();

    assert_eq!(updated.created_at(), original);
    assert!(!updated.is_active);
}

#[test]
fn test_apply_revalidates() {
    let schema = UserSchema::default();
    let user = schema.build(new_user("alice@example.com")).unwrap();

    let err = schema
        .apply(
            &user,
            UserUpdate {
                password_hash: Some("plaintext".into()),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert_eq!(err.field, "password");

    let err = schema
        .apply(
            &user,
            UserUpdate {
                role: Some("owner".into()),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert_eq!(err.field, "role");
}

#[test]
fn test_apply_updates_fields() {
    let schema = UserSchema::default();
    let user = schema.build(new_user("alice@example.com")).unwrap();
    let later = user.last_login_at + Duration::hours(3);

    let updated = schema
        .apply(
            &user,
            UserUpdate {
                email: Some("Alice@New.Example".into()),
                password_hash: Some(OTHER_HASH.into()),
                role: Some("admin".into()),
                last_login_at: Some(later),
                refresh_token: Some("rt-2".into()),
                ..Default::default()
            },
        )
        .unwrap();

    assert_eq!(updated.id, user.id);
    assert_eq!(updated.email, "alice@new.example");
    assert_eq!(updated.password_hash, OTHER_HASH);
    assert_eq!(updated.role, Role::Admin);
    assert_eq!(updated.last_login_at, later);
    assert_eq!(updated.refresh_token, "rt-2");
}
