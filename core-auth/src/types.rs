use bridge_traits::{Record, UserProfile};

/// Keys of the user-profile record, in the order hosts receive them.
pub const USER_RECORD_KEYS: [&str; 5] = ["name", "email", "photoUrl", "emailVerified", "uid"];

/// Host-facing snapshot of the current user.
///
/// Without a session the record is empty, so every key reads as absent.
/// Optional profile fields are present but [`Value::Absent`](bridge_traits::Value::Absent)
/// when the backend has no value for them.
///
/// # Examples
///
/// ```
/// use bridge_traits::UserProfile;
/// use core_auth::user_record;
///
/// let mut profile = UserProfile::new("u-1");
/// profile.email = Some("ada@example.com".to_string());
///
/// let record = user_record(Some(&profile));
/// assert_eq!(record.get("uid").and_then(|v| v.as_text()), Some("u-1"));
/// assert!(record.is_absent("photoUrl"));
///
/// assert!(user_record(None).is_empty());
/// ```
pub fn user_record(profile: Option<&UserProfile>) -> Record {
    let Some(profile) = profile else {
        return Record::new();
    };

    Record::new()
        .with("name", profile.display_name.clone())
        .with("email", profile.email.clone())
        .with("photoUrl", profile.photo_url.clone())
        .with("emailVerified", profile.email_verified)
        .with("uid", profile.uid.clone())
}
